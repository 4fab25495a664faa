//! HTTP transport for the remote conversational agent
//!
//! Posts one [`AgentRequest`] per turn and hands the response body back as a
//! [`RawAgentReply`] without reading streamed bodies up front. The body's
//! `Content-Type` decides which capability the reply exposes:
//!
//! | Content-Type | Reply capability |
//! |--------------|------------------|
//! | `application/json` | probed with [`RawAgentReply::from_json`] |
//! | `application/x-ndjson`, `application/jsonl` | byte chunk sequence, one JSON event per line |
//! | anything else | byte chunk sequence over the raw body |

use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::config::AgentConfig;
use crate::error::{Error, Result};

use super::reply::{chunk_bytes, delta_text, RawAgentReply, ReplyChunk};
use super::request::AgentRequest;

/// Anything that can carry one request to the agent and return its raw reply.
///
/// Errors returned here, and errors yielded by the reply's sequences, are
/// transport failures; the conversation controller recovers them.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    async fn invoke(&self, request: &AgentRequest) -> Result<RawAgentReply>;
}

/// How a response body will be exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Ndjson,
    Raw,
}

impl BodyKind {
    fn from_content_type(content_type: &str) -> Self {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if mime.contains("ndjson") || mime.contains("jsonl") || mime.contains("json-seq") {
            BodyKind::Ndjson
        } else if mime == "application/json" || mime.ends_with("+json") {
            BodyKind::Json
        } else {
            BodyKind::Raw
        }
    }
}

/// reqwest-backed [`AgentTransport`]
pub struct HttpAgentTransport {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpAgentTransport {
    /// Create a transport from agent configuration
    ///
    /// Returns an error if the configuration is invalid or missing required fields.
    pub fn new(config: &AgentConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config.resolved_endpoint();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, application/x-ndjson, text/plain, */*"),
        );

        if let Some(api_key) = &config.api_key {
            let auth_value = format!("Bearer {}", api_key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
            );
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("companion/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .default_headers(headers);

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let http_client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Endpoint all requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn invoke_url(&self, request: &AgentRequest) -> String {
        format!(
            "{}/agents/{}/agentAliases/{}/sessions/{}/text",
            self.base_url,
            urlencoding::encode(request.agent_id()),
            urlencoding::encode(request.agent_alias_id()),
            urlencoding::encode(request.session_id())
        )
    }

    /// Check whether the endpoint answers HTTP at all
    pub async fn health_check(&self) -> Result<bool> {
        match self.http_client.get(&self.base_url).send().await {
            Ok(response) => {
                tracing::debug!(status = %response.status(), "Agent endpoint reachable");
                Ok(true)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Agent endpoint unreachable");
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl AgentTransport for HttpAgentTransport {
    async fn invoke(&self, request: &AgentRequest) -> Result<RawAgentReply> {
        let url = self.invoke_url(request);
        tracing::debug!(session_id = %request.session_id(), url = %url, "Invoking agent");

        let response = self.http_client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(Error::Transport(format!("agent error ({}): {}", status, error_text)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let kind = BodyKind::from_content_type(&content_type);
        tracing::debug!(content_type = %content_type, kind = ?kind, "Agent responded");

        match kind {
            BodyKind::Json => {
                let value: Value = response
                    .json()
                    .await
                    .map_err(|e| Error::Transport(format!("failed to parse response: {}", e)))?;
                Ok(RawAgentReply::from_json(value))
            }
            BodyKind::Ndjson => Ok(RawAgentReply::chunks(ndjson_events(response))),
            BodyKind::Raw => Ok(RawAgentReply::chunks(
                response
                    .bytes_stream()
                    .map(|next| next.map(ReplyChunk::new).map_err(Error::from)),
            )),
        }
    }
}

/// Chunk sequence over a newline-delimited JSON body.
///
/// Events may carry `chunk.bytes` or an incremental text delta; both are
/// yielded as bytes so that decoding happens once over the whole reply.
fn ndjson_events(response: reqwest::Response) -> impl Stream<Item = Result<ReplyChunk>> + Send {
    try_stream! {
        let mut body = response.bytes_stream();
        let mut pending: Vec<u8> = Vec::new();

        while let Some(next) = body.next().await {
            let bytes = next?;
            pending.extend_from_slice(&bytes);

            while let Some(pos) = pending.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = pending.drain(..=pos).collect();
                if let Some(chunk) = parse_event_line(&line) {
                    yield chunk;
                }
            }
        }

        if let Some(chunk) = parse_event_line(&pending) {
            yield chunk;
        }
    }
}

/// Parse one NDJSON line; events without readable content are skipped
fn parse_event_line(line: &[u8]) -> Option<ReplyChunk> {
    let text = String::from_utf8_lossy(line);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(event) => chunk_bytes(&event)
            .or_else(|| delta_text(&event).map(String::into_bytes))
            .map(ReplyChunk::new),
        Err(e) => {
            tracing::warn!(error = %e, line = %trimmed, "Skipping unparsable reply line");
            None
        }
    }
}
