//! HTTP surface: serves the form and handles submissions.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::error::DescribeError;
use crate::form::{FormInput, ImageUpload, MissingInput};
use crate::pipeline::submit;
use crate::ports::Describer;
use crate::render::{data_uri, render_page, Outcome, PageView};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Describer used for every submission.
    pub describer: Arc<dyn Describer>,
    /// Resolved model identifier.
    pub model: Arc<str>,
}

/// Build the router.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/describe", post(describe).get(index))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn run(addr: SocketAddr, router: Router) -> Result<(), DescribeError> {
    let listener = TcpListener::bind(addr).await?;
    info!("doc-describe listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("shutting down");
        })
        .await?;
    Ok(())
}

async fn index() -> Html<String> {
    Html(render_page(&PageView::default()))
}

async fn health() -> &'static str {
    "ok"
}

async fn describe(State(state): State<AppState>, multipart: Multipart) -> Response {
    let mut input = FormInput::default();
    if let Some(reason) = read_form(multipart, &mut input).await {
        let reason = if input.prompt.trim().is_empty() {
            format!("{reason} {}", MissingInput::Prompt)
        } else {
            reason
        };
        let outcome = Outcome::Unreadable(reason);
        return page(&PageView { prompt: &input.prompt, outcome: Some(&outcome), ..PageView::default() });
    }

    let prompt = input.prompt.clone();
    let preview = input.image.as_ref().map(|image| data_uri(&image.mime_type, &image.data));
    let outcome = submit(state.describer.as_ref(), &state.model, input).await;

    page(&PageView { prompt: &prompt, preview: preview.as_deref(), outcome: Some(&outcome) })
}

/// Render the page with the status code matching its outcome.
fn page(view: &PageView<'_>) -> Response {
    let status = match view.outcome {
        Some(Outcome::Described(_)) | None => StatusCode::OK,
        Some(Outcome::Incomplete(_) | Outcome::Unreadable(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        Some(Outcome::Failed) => StatusCode::BAD_GATEWAY,
    };
    (status, Html(render_page(view))).into_response()
}

/// Collect the `prompt` and `image` fields into `input`.
///
/// Returns why the form or its upload was refused, if it was. Fields read
/// before the refusal stay in `input`. A file field with no name or no bytes
/// means nothing was picked.
async fn read_form(mut multipart: Multipart, input: &mut FormInput) -> Option<String> {
    let unreadable = |e: MultipartError| {
        debug!(error = %e, "malformed multipart body");
        format!("Could not read the submitted form: {}", e.body_text())
    };

    let mut rejected = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return rejected,
            Err(e) => return Some(unreadable(e)),
        };
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "prompt" => match field.text().await {
                Ok(prompt) => input.prompt = prompt,
                Err(e) => return Some(unreadable(e)),
            },
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = match field.bytes().await {
                    Ok(data) => data,
                    Err(e) => return Some(unreadable(e)),
                };
                if file_name.is_empty() || data.is_empty() {
                    continue;
                }
                match ImageUpload::new(&file_name, data.to_vec()) {
                    Ok(upload) => input.image = Some(upload),
                    Err(e) => {
                        debug!(error = %e, "upload rejected");
                        rejected = Some(e.to_string());
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::ports::describer::{DescribeFuture, DescribeRequest, DescribeResponse};

    const BOUNDARY: &str = "X-DOC-DESCRIBE-BOUNDARY";
    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    /// Answers from a list of canned results, counting calls.
    struct ScriptedDescriber {
        calls: AtomicUsize,
        replies: Vec<Result<String, u16>>,
    }

    impl Describer for ScriptedDescriber {
        fn describe(&self, _request: &DescribeRequest) -> DescribeFuture<'_> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.replies.get(n).cloned().unwrap_or(Err(500));
            Box::pin(async move {
                reply.map(|text| DescribeResponse { text }).map_err(|status| {
                    DescribeError::Api { status, message: "upstream said no".into() }
                })
            })
        }
    }

    fn app(replies: Vec<Result<String, u16>>) -> (Router, Arc<ScriptedDescriber>) {
        app_with_limit(replies, 1024 * 1024)
    }

    fn app_with_limit(
        replies: Vec<Result<String, u16>>,
        max_upload_bytes: usize,
    ) -> (Router, Arc<ScriptedDescriber>) {
        let describer = Arc::new(ScriptedDescriber { calls: AtomicUsize::new(0), replies });
        let state = AppState { describer: describer.clone(), model: Arc::from("gemini-2.0-flash") };
        (router(state, max_upload_bytes), describer)
    }

    fn multipart_body(prompt: Option<&str>, image: Option<(&str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(prompt) = prompt {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"prompt\"\r\n\r\n{prompt}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, data)) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn post_describe(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/describe")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn index_serves_form() {
        let (app, _) = app(vec![]);
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Describe the Product"));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app(vec![]);
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn described_text_is_rendered() {
        let (app, describer) = app(vec![Ok("A walnut side table.".into())]);
        let body = multipart_body(Some("side table"), Some(("table.png", PNG_MAGIC.as_slice())));
        let response = app.oneshot(post_describe(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Hey Buddy"));
        assert!(html.contains("<pre class=\"description\">A walnut side table.</pre>"));
        assert!(html.contains(r#"value="side table""#));
        assert!(html.contains("data:image/png;base64,"));
        assert_eq!(describer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_image_is_rejected_without_call() {
        let (app, describer) = app(vec![]);
        let response = app.oneshot(post_describe(multipart_body(Some("side table"), None))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Please upload your product image before"));
        assert_eq!(describer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_file_field_counts_as_missing() {
        let (app, describer) = app(vec![]);
        let body = multipart_body(Some(""), Some(("", b"".as_slice())));
        let response = app.oneshot(post_describe(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("image and prompt details"));
        assert_eq!(describer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_prompt_is_rejected_without_call() {
        let (app, describer) = app(vec![]);
        let body = multipart_body(None, Some(("table.png", PNG_MAGIC.as_slice())));
        let response = app.oneshot(post_describe(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("Please enter your prompt details"));
        assert_eq!(describer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unsupported_upload_is_rejected_without_call() {
        let (app, describer) = app(vec![]);
        let body = multipart_body(Some("a gif"), Some(("anim.gif", b"GIF89a".as_slice())));
        let response = app.oneshot(post_describe(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("Unsupported file type"));
        assert!(html.contains(r#"value="a gif""#));
        assert_eq!(describer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unsupported_upload_without_prompt_reports_both() {
        let (app, describer) = app(vec![]);
        let body = multipart_body(Some("  "), Some(("anim.gif", b"GIF89a".as_slice())));
        let response = app.oneshot(post_describe(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("Unsupported file type"));
        assert!(html.contains("Please enter your prompt details"));
        assert_eq!(describer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_without_call() {
        let (app, describer) = app_with_limit(vec![Ok("unused".into())], 1024);
        let mut image = PNG_MAGIC.to_vec();
        image.resize(4096, 0);
        let body = multipart_body(Some("big lamp"), Some(("lamp.png", image.as_slice())));
        let response = app.oneshot(post_describe(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("<form"));
        assert!(html.contains("Could not read the submitted form"));
        assert_eq!(describer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failure_is_generic_and_form_stays_usable() {
        let (app, describer) = app(vec![Err(429), Ok("Second try worked.".into())]);

        let body = multipart_body(Some("side table"), Some(("table.png", PNG_MAGIC.as_slice())));
        let response = app.clone().oneshot(post_describe(body.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let html = body_text(response).await;
        assert!(html.contains("Something went wrong while generating the description"));
        assert!(!html.contains("upstream said no"));
        assert!(html.contains("<form"));

        let response = app.oneshot(post_describe(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Second try worked."));
        assert_eq!(describer.calls.load(Ordering::SeqCst), 2);
    }
}
