//! Reading captured host traffic
//!
//! A transcript is whatever a harness captured: a single payload, a JSON
//! array of messages, or newline-delimited JSON.

use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

use crate::message::{HostContextTracker, RpcMessage};
use crate::schema::HOST_CONTEXT_KEY;
use crate::{ConformanceError, ConformanceResult};

/// Captured host traffic, one JSON value per entry
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<Value>,
}

impl Transcript {
    /// Parse a single JSON value, a JSON array, or JSON lines
    pub fn parse(text: &str) -> ConformanceResult<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ConformanceError::InvalidTranscript {
                line: 1,
                reason: "empty input".to_string(),
            });
        }

        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            let entries = match value {
                Value::Array(items) => items,
                other => vec![other],
            };
            return Ok(Self { entries });
        }

        let mut entries = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value = serde_json::from_str(line).map_err(|e| ConformanceError::InvalidTranscript {
                line: index + 1,
                reason: e.to_string(),
            })?;
            entries.push(value);
        }
        debug!(entries = entries.len(), "Parsed newline-delimited transcript");
        Ok(Self { entries })
    }

    /// Read and parse a transcript file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConformanceResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Entries in capture order
    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    /// Fold every entry into a tracker.
    ///
    /// Bare `{hostContext}` payloads replace the context; JSON-RPC messages go
    /// through [`HostContextTracker::observe`]. Malformed messages are skipped.
    pub fn tracker(&self) -> HostContextTracker {
        let mut tracker = HostContextTracker::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.get("jsonrpc").is_none() {
                if !tracker.observe_payload(entry) {
                    debug!(index, "Transcript entry is neither a message nor a payload");
                }
                continue;
            }
            match RpcMessage::parse(entry) {
                Ok(message) => {
                    tracker.observe(&message);
                }
                Err(e) => warn!(index, "Skipping malformed message: {}", e),
            }
        }
        tracker
    }

    /// The `{ "hostContext": { .. } }` payload this transcript ends with
    pub fn host_context_payload(&self) -> Option<Value> {
        self.verbatim_payload().or_else(|| self.tracker().payload())
    }

    /// Same as [`Transcript::host_context_payload`], reusing a tracker that
    /// already folded this transcript
    pub fn host_context_payload_from(&self, tracker: &HostContextTracker) -> Option<Value> {
        self.verbatim_payload().or_else(|| tracker.payload())
    }

    /// A lone bare payload is used as-is, even with a non-object context
    fn verbatim_payload(&self) -> Option<Value> {
        match self.entries.as_slice() {
            [single] if single.get("jsonrpc").is_none() && single.get(HOST_CONTEXT_KEY).is_some() => {
                Some(single.clone())
            }
            _ => None,
        }
    }
}
