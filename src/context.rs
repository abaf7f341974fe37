//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::adapters::live::gemini::GeminiDescriber;
use crate::adapters::recording::describer::RecordingDescriber;
use crate::adapters::replaying::describer::ReplayingDescriber;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::{Config, API_KEY_ENV_VARS};
use crate::error::DescribeError;
use crate::ports::Describer;

/// Environment variable naming a cassette to replay instead of calling the API.
pub const REPLAY_ENV: &str = "DOC_DESCRIBE_REPLAY";

/// Environment variable that turns on cassette recording (`1` or `true`).
pub const RECORD_ENV: &str = "DOC_DESCRIBE_REC";

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Describer port, shared across requests.
    pub describer: Arc<dyn Describer>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write the cassette file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = self.recorder.lock().map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        let path = recorder.write().map_err(|e| format!("Failed to write cassette: {e}"))?;
        Ok(path.to_path_buf())
    }
}

impl ServiceContext {
    /// Pick live, recording or replaying mode from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen mode cannot be set up.
    pub fn from_env(config: &Config) -> Result<(Self, Option<RecordingSession>), DescribeError> {
        let replay_path = std::env::var(REPLAY_ENV).ok();
        let is_recording = std::env::var(RECORD_ENV).is_ok_and(|v| v == "true" || v == "1");

        if let Some(ref cassette_path) = replay_path {
            info!(cassette = %cassette_path, "replaying describer calls");
            Ok((Self::replaying(Path::new(cassette_path))?, None))
        } else if is_recording {
            let (ctx, session) = Self::recording(config)?;
            Ok((ctx, Some(session)))
        } else {
            info!("calling the Gemini API live");
            Ok((Self::live(config)?, None))
        }
    }

    /// Create a live context.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not configured.
    pub fn live(config: &Config) -> Result<Self, DescribeError> {
        let key = config
            .google_key()
            .ok_or_else(|| DescribeError::MissingApiKey { env_var: API_KEY_ENV_VARS[0].into() })?;
        Ok(Self { describer: Arc::new(GeminiDescriber::new(key)) })
    }

    /// Create a recording context that wraps a live adapter with a recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the live adapter cannot be created.
    pub fn recording(config: &Config) -> Result<(Self, RecordingSession), DescribeError> {
        let key = config
            .google_key()
            .ok_or_else(|| DescribeError::MissingApiKey { env_var: API_KEY_ENV_VARS[0].into() })?;
        let live: Box<dyn Describer> = Box::new(GeminiDescriber::new(key));

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = PathBuf::from(".doc-describe/cassettes").join(&timestamp);
        let path = output_dir.join("describer.cassette.yaml");
        info!(cassette = %path.display(), "recording describer calls");

        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-describer"),
            get_commit_hash(),
        )));

        let ctx = Self { describer: Arc::new(RecordingDescriber::new(live, Arc::clone(&recorder))) };
        Ok((ctx, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, DescribeError> {
        let replayer = load_cassette(path)
            .map_err(|e| DescribeError::Config(format!("Failed to load cassette: {e}")))?;
        let replayer = Arc::new(Mutex::new(replayer));
        Ok(Self { describer: Arc::new(ReplayingDescriber::new(replayer)) })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
