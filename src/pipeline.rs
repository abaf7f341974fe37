//! One submission: validate, compose, call the describer, produce an outcome.

use tracing::{debug, info, warn};

use crate::compose::{compose, INSTRUCTION_TEMPLATE};
use crate::form::FormInput;
use crate::ports::Describer;
use crate::render::Outcome;

/// Run a single form submission through the describer.
///
/// The describer is called at most once, and only when both the prompt and
/// the image are present.
pub async fn submit(describer: &dyn Describer, model: &str, input: FormInput) -> Outcome {
    let (prompt, image) = match input.validate() {
        Ok(pair) => pair,
        Err(missing) => {
            debug!(?missing, "submission incomplete");
            return Outcome::Incomplete(missing);
        }
    };

    info!(
        model,
        file = %image.file_name,
        mime_type = %image.mime_type,
        bytes = image.data.len(),
        "describing image"
    );
    let request = compose(model, prompt, image, INSTRUCTION_TEMPLATE);

    match describer.describe(&request).await {
        Ok(response) => Outcome::Described(response.text),
        Err(e) => {
            warn!(error = %e, "describe call failed");
            Outcome::Failed
        }
    }
}
