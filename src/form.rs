//! Collects the prompt and uploaded image, and checks both are present.

use std::path::Path;

use image::ImageFormat;
use thiserror::Error;

/// File extensions the picker accepts.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// An uploaded image whose bytes were recognized as JPEG or PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Name of the file as chosen by the user.
    pub file_name: String,
    /// MIME type detected from the image bytes.
    pub mime_type: String,
    /// Raw image bytes.
    pub data: Vec<u8>,
}

/// Why an upload was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    /// The file extension is not one of [`ACCEPTED_EXTENSIONS`].
    #[error("Unsupported file type for '{0}'. Please upload a JPG, JPEG, or PNG image.")]
    UnsupportedType(String),

    /// The bytes are not a JPEG or PNG image.
    #[error("Can't read uploaded image '{0}'.")]
    Unreadable(String),
}

impl ImageUpload {
    /// Accept an uploaded file, detecting its MIME type from the content.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not accepted or the bytes are not
    /// a JPEG or PNG image.
    pub fn new(file_name: &str, data: Vec<u8>) -> Result<Self, UploadError> {
        let extension = Path::new(file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UploadError::UnsupportedType(file_name.to_string()));
        }

        let mime_type = match image::guess_format(&data) {
            Ok(ImageFormat::Jpeg) => "image/jpeg",
            Ok(ImageFormat::Png) => "image/png",
            _ => return Err(UploadError::Unreadable(file_name.to_string())),
        };

        Ok(Self { file_name: file_name.to_string(), mime_type: mime_type.to_string(), data })
    }
}

/// Which required inputs are absent from a submission.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MissingInput {
    /// No prompt text.
    #[error("Please enter your prompt details before describing the product.")]
    Prompt,
    /// No image.
    #[error("Please upload your product image before describing the product.")]
    Image,
    /// Neither.
    #[error("Please upload your product image and prompt details before describing the product.")]
    Both,
}

/// Everything the user has provided at the moment of submission.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    /// Free-text prompt.
    pub prompt: String,
    /// The uploaded image, if one was chosen.
    pub image: Option<ImageUpload>,
}

impl FormInput {
    /// Return the prompt and image, or which of them is missing.
    ///
    /// A prompt made only of whitespace counts as missing.
    ///
    /// # Errors
    ///
    /// Returns the [`MissingInput`] case matching the absent fields.
    pub fn validate(self) -> Result<(String, ImageUpload), MissingInput> {
        let has_prompt = !self.prompt.trim().is_empty();
        match (has_prompt, self.image) {
            (true, Some(image)) => Ok((self.prompt, image)),
            (false, Some(_)) => Err(MissingInput::Prompt),
            (true, None) => Err(MissingInput::Image),
            (false, None) => Err(MissingInput::Both),
        }
    }
}
