//! Unified error type for doc-describe.

use thiserror::Error;

/// Errors that can occur while configuring or calling the describer.
#[derive(Debug, Error)]
pub enum DescribeError {
    /// The API returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No API key configured.
    #[error("No Google API key. Set {env_var} or add [keys] google to the config file.")]
    MissingApiKey {
        /// The environment variable name.
        env_var: String,
    },

    /// A cassette could not serve a recorded interaction.
    #[error("Replay error: {0}")]
    Replay(String),
}
