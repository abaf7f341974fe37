//! Recording adapter for the `Describer` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::describer::{DescribeFuture, DescribeRequest, Describer};

/// Records describe calls while delegating to an inner implementation.
pub struct RecordingDescriber {
    inner: Box<dyn Describer>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingDescriber {
    /// Creates a new recording describer wrapping the given implementation.
    pub fn new(inner: Box<dyn Describer>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl Describer for RecordingDescriber {
    fn describe(&self, request: &DescribeRequest) -> DescribeFuture<'_> {
        let request_clone = request.clone();
        let recorder = Arc::clone(&self.recorder);

        Box::pin(async move {
            let result = self.inner.describe(&request_clone).await;
            record_result(&recorder, "describer", "describe", &request_clone, &result);
            result
        })
    }
}
