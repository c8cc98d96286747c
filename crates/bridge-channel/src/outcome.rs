//! Command outcomes and result decoding

use crate::sentinel::SentinelTable;
use serde::Serialize;
use std::time::Duration;

/// Decoded result payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", content = "data", rename_all = "snake_case")]
pub enum Payload {
    /// Result file held a JSON document
    Json(serde_json::Value),
    /// Result file held plain text
    Text(String),
}

impl Payload {
    /// Payload as text (JSON is re-serialized)
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Json(v) => v.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Outcome of one command round trip
///
/// Exactly one per command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// Editor answered with a non-sentinel payload
    Success {
        /// Decoded payload
        payload: Payload,
    },
    /// Editor answered with a failure sentinel
    Failure {
        /// Sentinel text, verbatim
        reason: String,
    },
    /// No answer within the polling ceiling; the command may or may not have run
    Timeout {
        /// Sleeps between checks before giving up
        attempts: u32,
        /// Wall-clock time spent polling
        #[serde(with = "duration_ms")]
        waited: Duration,
    },
}

impl CommandOutcome {
    /// True for `Success`
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// True for `Timeout`
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Payload of a success
    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Success { payload } => Some(payload),
            _ => None,
        }
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        #[allow(clippy::cast_possible_truncation)]
        let ms = d.as_millis() as u64;
        s.serialize_u64(ms)
    }
}

/// Decode raw result text for `verb`
///
/// JSON is tried first; anything else is plain text. Plain text matching one
/// of the verb's sentinels is a failure. A JSON string is unwrapped and
/// checked the same way.
#[must_use]
pub fn decode_result(verb: &str, raw: &str, sentinels: &SentinelTable) -> CommandOutcome {
    let text = raw.trim_end_matches(['\r', '\n']);

    let payload = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::String(s)) => Payload::Text(s),
        Ok(value) => Payload::Json(value),
        Err(_) => Payload::Text(text.to_string()),
    };

    if let Payload::Text(s) = &payload {
        if sentinels.find(verb, s).is_some() {
            return CommandOutcome::Failure {
                reason: s.trim().to_string(),
            };
        }
    }
    CommandOutcome::Success { payload }
}
