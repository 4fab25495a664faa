//! Normalization of raw agent replies into one message text

use futures_util::StreamExt;

use crate::error::Result;

use super::reply::{RawAgentReply, ReplyShape};

/// Sentinel used when no surface-specific wording is configured
pub const DEFAULT_EMPTY_SENTINEL: &str = "The assistant responded but returned no readable text.";

/// Outcome of reading a reply to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedReply {
    /// The agent produced readable text
    Text(String),
    /// The agent was reachable but produced nothing readable
    Empty,
}

/// Reads any [`RawAgentReply`] shape into a single string.
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    empty_sentinel: String,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_EMPTY_SENTINEL)
    }
}

impl ResponseNormalizer {
    /// Create a normalizer that reports empty replies with `empty_sentinel`
    pub fn new(empty_sentinel: impl Into<String>) -> Self {
        Self {
            empty_sentinel: empty_sentinel.into(),
        }
    }

    pub fn empty_sentinel(&self) -> &str {
        &self.empty_sentinel
    }

    /// Normalize a reply, substituting the sentinel for empty replies.
    ///
    /// Fails only when a reply sequence yields an error; text read before
    /// the error is discarded.
    pub async fn normalize(&self, raw: RawAgentReply) -> Result<String> {
        Ok(match self.read(raw).await? {
            NormalizedReply::Text(text) => text,
            NormalizedReply::Empty => self.empty_sentinel.clone(),
        })
    }

    /// Read a reply to completion without substituting the sentinel.
    pub async fn read(&self, raw: RawAgentReply) -> Result<NormalizedReply> {
        let shape = raw.shape();
        let RawAgentReply {
            output_text,
            chunks,
            deltas,
        } = raw;

        let text = match (shape, output_text, chunks, deltas) {
            (ReplyShape::Text, Some(text), _, _) => text,
            (ReplyShape::Chunks, _, Some(mut chunks), _) => {
                // Decode once at the end so multi-byte characters split
                // across chunk boundaries survive intact.
                let mut buf = Vec::new();
                let mut count = 0usize;
                while let Some(chunk) = chunks.next().await {
                    buf.extend_from_slice(&chunk?.bytes);
                    count += 1;
                }
                tracing::trace!(chunks = count, bytes = buf.len(), "Chunk stream drained");
                String::from_utf8_lossy(&buf).into_owned()
            }
            (ReplyShape::Deltas, _, _, Some(mut deltas)) => {
                let mut text = String::new();
                while let Some(delta) = deltas.next().await {
                    text.push_str(&delta?.text_delta);
                }
                text
            }
            _ => String::new(),
        };

        if text.is_empty() {
            tracing::debug!(shape = %shape, "Agent reply contained no readable text");
            Ok(NormalizedReply::Empty)
        } else {
            Ok(NormalizedReply::Text(text))
        }
    }
}
