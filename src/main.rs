//! doc-describe - describe product and document images with Gemini.

mod adapters;
mod cassette;
mod cli;
mod compose;
mod config;
mod context;
mod error;
mod form;
mod model;
mod pipeline;
mod ports;
mod render;
mod server;

use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::cli::{resolve_prompt, Cli, Command};
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::DescribeError;
use crate::form::{FormInput, ImageUpload};
use crate::model::{resolve_model, validate_model};
use crate::render::Outcome;
use crate::server::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the default filter.
fn init_tracing(cli: &Cli) {
    let filter = default_filter(&cli.command, cli.verbose);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// `describe` shares stderr with the user-facing message, so only errors
/// are logged there unless `--verbose` is given.
fn default_filter(command: &Command, verbose: bool) -> String {
    let level = match (command, verbose) {
        (_, true) => "debug",
        (Command::Serve { .. }, false) => "info",
        (Command::Describe { .. }, false) => "error",
    };
    format!("doc_describe={level},tower_http={level}")
}

async fn run(cli: Cli) -> Result<ExitCode, DescribeError> {
    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(DescribeError::Config)?;

    // Resolve model
    let requested = cli.model.as_deref().unwrap_or(&config.defaults.model);
    let model = resolve_model(requested);
    validate_model(&model).map_err(DescribeError::InvalidArgument)?;
    info!(%model, requested, "model resolved");

    // Create context based on mode (live / recording / replaying)
    let (ctx, recording_session) = ServiceContext::from_env(&config)?;

    let code = match cli.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let addr: SocketAddr = bind.parse().map_err(|e| {
                DescribeError::InvalidArgument(format!("Invalid bind address '{bind}': {e}"))
            })?;
            let state = AppState { describer: ctx.describer, model: Arc::from(model) };
            let router = server::router(state, config.server.max_upload_bytes());
            server::run(addr, router).await?;
            ExitCode::SUCCESS
        }
        Command::Describe { prompt, prompt_file, image } => {
            let prompt = resolve_prompt(prompt.as_deref(), prompt_file.as_deref())?;
            let outcome = match read_image(image.as_deref()) {
                Ok(image) => {
                    pipeline::submit(ctx.describer.as_ref(), &model, FormInput { prompt, image })
                        .await
                }
                Err(outcome) => outcome,
            };
            print_outcome(&outcome)
        }
    };

    // Finish recording if active
    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => info!(cassette = %path.display(), "cassette saved"),
            Err(e) => error!(error = %e, "failed to save cassette"),
        }
    }

    Ok(code)
}

/// Load the image given on the command line.
fn read_image(path: Option<&Path>) -> Result<Option<ImageUpload>, Outcome> {
    let Some(path) = path else {
        return Ok(None);
    };
    let data = std::fs::read(path).map_err(|e| {
        Outcome::Unreadable(format!("Can't read uploaded image '{}': {e}", path.display()))
    })?;
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    ImageUpload::new(&file_name, data).map(Some).map_err(|e| Outcome::Unreadable(e.to_string()))
}

/// Described text goes to stdout untouched; everything else to stderr.
fn print_outcome(outcome: &Outcome) -> ExitCode {
    if let Outcome::Described(text) = outcome {
        println!("{text}");
        ExitCode::SUCCESS
    } else {
        eprintln!("{}", outcome.message());
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn describe() -> Command {
        Command::Describe { prompt: None, prompt_file: None, image: None }
    }

    #[test]
    fn describe_logs_only_errors_by_default() {
        assert_eq!(default_filter(&describe(), false), "doc_describe=error,tower_http=error");
    }

    #[test]
    fn serve_logs_info_by_default() {
        let serve = Command::Serve { bind: None };
        assert_eq!(default_filter(&serve, false), "doc_describe=info,tower_http=info");
    }

    #[test]
    fn verbose_logs_debug_for_either_command() {
        assert_eq!(default_filter(&describe(), true), "doc_describe=debug,tower_http=debug");
        assert_eq!(
            default_filter(&Command::Serve { bind: None }, true),
            "doc_describe=debug,tower_http=debug"
        );
    }
}
