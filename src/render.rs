//! HTML rendering of the form and of each submission outcome.

use std::fmt::Write as _;

use base64::Engine;

use crate::form::{MissingInput, ACCEPTED_EXTENSIONS};

/// Message shown for any failed describe call, whatever the cause.
pub const FAILURE_MESSAGE: &str =
    "Something went wrong while generating the description. Please try again.";

/// Text shown while a submission is in flight.
pub const BUSY_MESSAGE: &str = "Reading your product and generating description...";

/// What a submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The model's text, exactly as returned.
    Described(String),
    /// The prompt, the image, or both were missing.
    Incomplete(MissingInput),
    /// The upload or the form itself could not be accepted.
    Unreadable(String),
    /// The describe call failed.
    Failed,
}

impl Outcome {
    /// Text shown to the user for this outcome.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Described(text) => text.clone(),
            Self::Incomplete(missing) => missing.to_string(),
            Self::Unreadable(reason) => reason.clone(),
            Self::Failed => FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Everything the page needs to draw itself.
#[derive(Debug, Default)]
pub struct PageView<'a> {
    /// Prompt to pre-fill the text input with.
    pub prompt: &'a str,
    /// `data:` URI of the submitted image.
    pub preview: Option<&'a str>,
    /// Result of the last submission.
    pub outcome: Option<&'a Outcome>,
}

/// Build a `data:` URI for showing uploaded bytes inline.
#[must_use]
pub fn data_uri(mime_type: &str, data: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{mime_type};base64,{encoded}")
}

/// Escape text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render the full single page.
#[must_use]
pub fn render_page(view: &PageView<'_>) -> String {
    let accept: Vec<String> = ACCEPTED_EXTENSIONS.iter().map(|ext| format!(".{ext}")).collect();
    let mut html = String::with_capacity(4096);
    html.push_str(HEAD);

    let _ = write!(
        html,
        r#"<main>
<h1 class="title">Document Description AI</h1>
<p class="subtitle">Extracting and Describing Information from Documents</p>
<aside>
<h2>About the Document Description AI</h2>
<p>Extracting insights from documents made effortless. Accurate and insightful descriptions that help with decisions and productivity.</p>
</aside>
<div class="separator"></div>
<form method="post" action="/describe" enctype="multipart/form-data" onsubmit="document.getElementById('busy').hidden = false;">
<label for="prompt">Enter key terms and details to generate a descriptive document summary:</label>
<input id="prompt" name="prompt" type="text" value="{prompt}" placeholder="Provide details for document summarization..." title="Please enter relevant information and key terms to generate a detailed document summary.">
<label for="image">Select an image...</label>
<input id="image" name="image" type="file" accept="{accept}">
<button type="submit">Describe the Product</button>
</form>
<p id="busy" class="busy" hidden>{busy}</p>
"#,
        prompt = escape_html(view.prompt),
        accept = accept.join(","),
        busy = BUSY_MESSAGE,
    );

    if let Some(src) = view.preview {
        let _ = writeln!(
            html,
            r#"<div class="preview"><img src="{}" alt="Uploaded Image"></div>"#,
            escape_html(src)
        );
    }

    match view.outcome {
        Some(Outcome::Described(text)) => {
            let _ = write!(
                html,
                "<h2>Hey Buddy<br>Here is your product description:</h2>\n<pre class=\"description\">{}</pre>\n",
                escape_html(text)
            );
        }
        Some(other) => {
            let _ = writeln!(html, r#"<p class="error" role="alert">{}</p>"#, escape_html(&other.message()));
        }
        None => {}
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Extractor App</title>
<style>
body { background: linear-gradient(to right, #ff7e5f, #feb47b); font-family: Arial, sans-serif; margin: 0; }
main { max-width: 720px; margin: 0 auto; padding: 24px; }
.title { color: #fff; font-size: 48px; font-weight: bold; margin-bottom: 20px; text-align: center; }
.subtitle { color: #fff; font-size: 24px; font-weight: bold; margin-bottom: 20px; text-align: center; }
.separator { margin-top: 20px; margin-bottom: 20px; height: 3px; background-color: #ddd; }
form { display: flex; flex-direction: column; gap: 8px; }
.busy { font-style: italic; }
.error { background: #fde8e8; color: #8a1c1c; padding: 12px; border-radius: 6px; }
.preview { display: flex; justify-content: center; }
.preview img { width: 50%; height: auto; max-width: 500px; border-radius: 15%; border: 10px solid #ff7f0e; }
.description { white-space: pre-wrap; font-family: inherit; background: #fff; padding: 12px; border-radius: 6px; }
</style>
</head>
<body>
"#;
