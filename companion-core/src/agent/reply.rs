//! Raw reply shapes returned by the agent endpoint
//!
//! The endpoint answers in one of three incompatible shapes and never says
//! which:
//!
//! - a direct text field (`outputText`, `completion`, `response.outputText`)
//! - an async sequence of byte-bearing chunks (`{ chunk: { bytes } }`)
//! - an async sequence of incremental text deltas (`{ contentBlockDelta: { delta: { text } } }`)
//!
//! [`RawAgentReply`] carries whichever capabilities were found, and
//! [`RawAgentReply::shape`] resolves them in a fixed probing order so that
//! normalization is reproducible.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use bytes::Bytes;
use futures_core::Stream;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde_json::Value;

use crate::error::Result;

/// One byte-bearing element of a chunk stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyChunk {
    pub bytes: Bytes,
}

impl ReplyChunk {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

/// One incremental text element of a delta stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyDelta {
    pub text_delta: String,
}

impl ReplyDelta {
    pub fn new(text_delta: impl Into<String>) -> Self {
        Self {
            text_delta: text_delta.into(),
        }
    }
}

/// Async sequence of chunks; an `Err` item means the transport failed mid-stream
pub type ChunkStream = BoxStream<'static, Result<ReplyChunk>>;

/// Async sequence of deltas; an `Err` item means the transport failed mid-stream
pub type DeltaStream = BoxStream<'static, Result<ReplyDelta>>;

/// Which capability of a reply will be read, in probing order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    /// A non-empty direct text field
    Text,
    /// A byte chunk sequence
    Chunks,
    /// A text delta sequence
    Deltas,
    /// Nothing readable
    Empty,
}

impl ReplyShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyShape::Text => "text",
            ReplyShape::Chunks => "chunks",
            ReplyShape::Deltas => "deltas",
            ReplyShape::Empty => "empty",
        }
    }
}

impl std::fmt::Display for ReplyShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reply as received from the transport, before normalization.
#[derive(Default)]
pub struct RawAgentReply {
    /// Direct text field, if the endpoint returned one
    pub output_text: Option<String>,
    /// Byte chunk sequence, if the endpoint streamed raw bytes
    pub chunks: Option<ChunkStream>,
    /// Text delta sequence, if the endpoint streamed content deltas
    pub deltas: Option<DeltaStream>,
}

impl RawAgentReply {
    /// A reply carrying a direct text field
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            output_text: Some(text.into()),
            ..Default::default()
        }
    }

    /// A reply carrying a byte chunk sequence
    pub fn chunks<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<ReplyChunk>> + Send + 'static,
    {
        Self {
            chunks: Some(stream.boxed()),
            ..Default::default()
        }
    }

    /// A reply carrying a text delta sequence
    pub fn deltas<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<ReplyDelta>> + Send + 'static,
    {
        Self {
            deltas: Some(stream.boxed()),
            ..Default::default()
        }
    }

    /// A reply with no readable capability
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve the capability that normalization will read.
    ///
    /// Order: direct text → byte chunks → deltas → empty. An empty direct
    /// text field counts as absent.
    pub fn shape(&self) -> ReplyShape {
        if self.output_text.as_deref().is_some_and(|t| !t.is_empty()) {
            ReplyShape::Text
        } else if self.chunks.is_some() {
            ReplyShape::Chunks
        } else if self.deltas.is_some() {
            ReplyShape::Deltas
        } else {
            ReplyShape::Empty
        }
    }

    /// Probe a buffered JSON reply for any of the known shapes.
    pub fn from_json(value: Value) -> Self {
        if let Some(text) = direct_text(&value) {
            return Self::text(text);
        }

        let Some(events) = value.get("completion").and_then(Value::as_array) else {
            return Self::empty();
        };

        let chunks: Vec<ReplyChunk> = events
            .iter()
            .filter_map(chunk_bytes)
            .map(ReplyChunk::new)
            .collect();
        if !chunks.is_empty() {
            return Self::chunks(stream::iter(chunks.into_iter().map(Ok)));
        }

        let deltas: Vec<ReplyDelta> = events
            .iter()
            .filter_map(delta_text)
            .map(ReplyDelta::new)
            .collect();
        if !deltas.is_empty() {
            return Self::deltas(stream::iter(deltas.into_iter().map(Ok)));
        }

        Self::empty()
    }
}

impl std::fmt::Debug for RawAgentReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawAgentReply")
            .field("output_text", &self.output_text)
            .field("chunks", &self.chunks.is_some())
            .field("deltas", &self.deltas.is_some())
            .finish()
    }
}

/// First non-empty direct text field, in probing order
fn direct_text(value: &Value) -> Option<String> {
    ["/outputText", "/completion", "/response/outputText"]
        .iter()
        .filter_map(|pointer| value.pointer(pointer).and_then(Value::as_str))
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

/// Bytes of a `{ chunk: { bytes } }` event.
///
/// JSON carries bytes either as base64 text or as an array of byte values.
/// Text that is not valid base64 is taken as its own UTF-8 bytes.
pub(crate) fn chunk_bytes(event: &Value) -> Option<Vec<u8>> {
    match event.pointer("/chunk/bytes")? {
        Value::String(encoded) => Some(
            BASE64_STANDARD
                .decode(encoded.as_bytes())
                .unwrap_or_else(|_| encoded.as_bytes().to_vec()),
        ),
        Value::Array(values) => Some(
            values
                .iter()
                .filter_map(Value::as_u64)
                .filter_map(|b| u8::try_from(b).ok())
                .collect(),
        ),
        _ => None,
    }
}

/// Incremental text of a delta event
pub(crate) fn delta_text(event: &Value) -> Option<String> {
    ["/contentBlockDelta/delta/text", "/delta/text", "/textDelta"]
        .iter()
        .find_map(|pointer| event.pointer(pointer).and_then(Value::as_str))
        .map(str::to_string)
}
