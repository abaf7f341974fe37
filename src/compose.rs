//! Assembles the request bundle sent to the describer.

use crate::form::ImageUpload;
use crate::ports::describer::{DescribeRequest, ImagePart, SafetySetting};

/// Instruction text sent with every request.
///
/// It speaks of product descriptions and of document extraction in turn; the
/// wording is kept exactly as written.
pub const INSTRUCTION_TEMPLATE: &str = "\
Welcome to the Expert Product Image Description task.
Your expertise is crucial in understanding product images and crafting compelling descriptions.
You will receive input product images, and your role is to generate captivating product descriptions based on the visual information.

Example: Analyze the provided image of a [Product Type] and generate a detailed description.
Highlight key features, materials used, and any unique design elements.
Consider potential customer inquiries and proactively address them in your description.

Your goal is to create vivid, informative, and engaging product descriptions that resonate with our target audience. \
Maintain a professional tone and ensure that your responses are tailored to the specific details present in the image.

This prompt is tailored for extracting info not only from invoices but also from some other kind of usual documents \
in a company's financial department. However, it is not English language, it is Romanian language.
";

/// Harm categories whose blocking is switched off.
pub const SAFETY_CATEGORIES: [&str; 3] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
];

/// Threshold applied to every entry of [`SAFETY_CATEGORIES`].
pub const SAFETY_THRESHOLD: &str = "BLOCK_NONE";

/// Package a validated prompt and image into a [`DescribeRequest`].
#[must_use]
pub fn compose(
    model: &str,
    prompt: String,
    image: ImageUpload,
    instruction: &str,
) -> DescribeRequest {
    DescribeRequest {
        model: model.to_string(),
        prompt,
        image: ImagePart { mime_type: image.mime_type, data: image.data },
        instruction: instruction.to_string(),
        safety_settings: permissive_safety_settings(),
    }
}

fn permissive_safety_settings() -> Vec<SafetySetting> {
    SAFETY_CATEGORIES
        .iter()
        .map(|category| SafetySetting {
            category: (*category).to_string(),
            threshold: SAFETY_THRESHOLD.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> ImageUpload {
        ImageUpload {
            file_name: "invoice.jpg".into(),
            mime_type: "image/jpeg".into(),
            data: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01],
        }
    }

    #[test]
    fn image_bytes_pass_through_untouched() {
        let request = compose("gemini-2.0-flash", "an invoice".into(), upload(), "steer");
        assert_eq!(request.image.mime_type, "image/jpeg");
        assert_eq!(request.image.data, vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01]);
        assert_eq!(request.prompt, "an invoice");
        assert_eq!(request.model, "gemini-2.0-flash");
        assert_eq!(request.instruction, "steer");
    }

    #[test]
    fn template_is_carried_unchanged() {
        let request = compose("gemini-2.0-flash", "x".into(), upload(), INSTRUCTION_TEMPLATE);
        assert_eq!(request.instruction, INSTRUCTION_TEMPLATE);
    }

    #[test]
    fn three_permissive_safety_settings() {
        let request = compose("gemini-2.0-flash", "x".into(), upload(), INSTRUCTION_TEMPLATE);
        let categories: Vec<&str> =
            request.safety_settings.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(categories, SAFETY_CATEGORIES);
        assert!(request.safety_settings.iter().all(|s| s.threshold == "BLOCK_NONE"));
    }

    #[test]
    fn template_keeps_both_readings() {
        assert!(INSTRUCTION_TEMPLATE.contains("Expert Product Image Description"));
        assert!(INSTRUCTION_TEMPLATE.contains("Romanian language"));
    }
}
