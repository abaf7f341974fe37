//! Model name resolution.

/// Short name aliases for Gemini models that accept image input.
const ALIASES: &[(&str, &str)] = &[
    ("flash", "gemini-2.0-flash"),
    ("flash-lite", "gemini-2.0-flash-lite"),
    ("pro", "gemini-2.5-pro"),
    ("pro-vision", "gemini-pro-vision"),
];

/// Resolve a model name (alias or exact) to the full model identifier.
#[must_use]
pub fn resolve_model(name: &str) -> String {
    for &(alias, full) in ALIASES {
        if name == alias {
            return full.to_string();
        }
    }
    name.to_string()
}

/// Check that a resolved model name belongs to the Gemini family.
///
/// # Errors
///
/// Returns an error if the model name doesn't start with `gemini`.
pub fn validate_model(model: &str) -> Result<(), String> {
    if model.starts_with("gemini") {
        Ok(())
    } else {
        let aliases: Vec<&str> = ALIASES.iter().map(|&(alias, _)| alias).collect();
        Err(format!(
            "Unknown model '{model}'. Expected 'gemini-*' or one of: {}.",
            aliases.join(", ")
        ))
    }
}
