//! Describer port for multimodal text generation APIs.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::DescribeError;

/// An image attached to a request, tagged with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePart {
    /// MIME type of the image (e.g., `"image/png"`).
    pub mime_type: String,
    /// Raw image bytes.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// A content-safety threshold sent with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    /// Harm category (e.g., `"HARM_CATEGORY_HARASSMENT"`).
    pub category: String,
    /// Blocking threshold (e.g., `"BLOCK_NONE"`).
    pub threshold: String,
}

/// A request to describe an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeRequest {
    /// The resolved model identifier (e.g., `"gemini-2.0-flash"`).
    pub model: String,
    /// The user's prompt.
    pub prompt: String,
    /// The uploaded image.
    pub image: ImagePart,
    /// Fixed instruction text sent after the image.
    pub instruction: String,
    /// Safety thresholds.
    pub safety_settings: Vec<SafetySetting>,
}

/// Text returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeResponse {
    /// The generated description.
    pub text: String,
}

/// Boxed future type returned by [`Describer::describe`].
pub type DescribeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<DescribeResponse, DescribeError>> + Send + 'a>>;

/// Turns a prompt and an image into text via an external API.
pub trait Describer: Send + Sync {
    /// Describe the image in the given request.
    fn describe(&self, request: &DescribeRequest) -> DescribeFuture<'_>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
