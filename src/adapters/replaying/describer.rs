//! Replaying adapter for the `Describer` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::DescribeError;
use crate::ports::describer::{DescribeFuture, DescribeRequest, DescribeResponse, Describer};

/// Serves recorded describe results from a cassette.
pub struct ReplayingDescriber {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingDescriber {
    /// Create a replaying describer backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl Describer for ReplayingDescriber {
    fn describe(&self, _request: &DescribeRequest) -> DescribeFuture<'_> {
        let output = next_output(&self.replayer, "describer", "describe");
        Box::pin(async move {
            output
                .and_then(replay_result::<DescribeResponse>)
                .map_err(DescribeError::Replay)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use crate::compose::compose;
    use crate::form::ImageUpload;
    use chrono::Utc;
    use serde_json::json;

    fn describer(outputs: Vec<serde_json::Value>) -> ReplayingDescriber {
        let interactions = outputs
            .into_iter()
            .zip(0..)
            .map(|(output, seq)| Interaction {
                seq,
                port: "describer".into(),
                method: "describe".into(),
                input: json!({}),
                output,
            })
            .collect();
        let cassette =
            Cassette { name: "t".into(), recorded_at: Utc::now(), commit: "c".into(), interactions };
        ReplayingDescriber::new(Arc::new(Mutex::new(CassetteReplayer::new(&cassette))))
    }

    fn request() -> DescribeRequest {
        let image =
            ImageUpload { file_name: "a.png".into(), mime_type: "image/png".into(), data: vec![0] };
        compose("gemini-2.0-flash", "p".into(), image, "i")
    }

    #[tokio::test]
    async fn serves_recorded_results_in_order() {
        let replaying = describer(vec![json!({"Ok": {"text": "one"}}), json!({"Err": "boom"})]);

        let first = replaying.describe(&request()).await.unwrap();
        assert_eq!(first.text, "one");

        let second = replaying.describe(&request()).await.unwrap_err();
        assert!(matches!(second, DescribeError::Replay(ref m) if m == "boom"));
    }

    #[tokio::test]
    async fn exhausted_cassette_is_an_error() {
        let replaying = describer(vec![]);
        let err = replaying.describe(&request()).await.unwrap_err();
        assert!(err.to_string().contains("Cassette exhausted"));
    }
}
