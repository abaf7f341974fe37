//! On-disk cassette layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, ordered list of recorded interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable cassette name.
    pub name: String,
    /// When the recording was written.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Recorded calls, in the order they happened.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

/// One recorded call through a port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the recording.
    pub seq: u64,
    /// Port name (e.g., `"describer"`).
    pub port: String,
    /// Method name on the port (e.g., `"describe"`).
    pub method: String,
    /// Serialized request.
    pub input: serde_json::Value,
    /// Serialized result, as `{"Ok": ...}` or `{"Err": "..."}`.
    pub output: serde_json::Value,
}
