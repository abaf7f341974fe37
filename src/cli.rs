//! CLI argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Describe product and document images with Gemini, from a web form or the terminal.
#[derive(Parser, Debug)]
#[command(name = "doc-describe", version, about)]
pub struct Cli {
    /// What to run.
    #[command(subcommand)]
    pub command: Command,

    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Model name or short alias (defaults to the config file's value).
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the upload form over HTTP.
    Serve {
        /// Listen address (defaults to the config file's value).
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Describe one image and print the result.
    Describe {
        /// Key terms and details for the description.
        #[arg(conflicts_with = "prompt_file")]
        prompt: Option<String>,

        /// Path to a file containing the prompt text.
        #[arg(short = 'p', long, conflicts_with = "prompt")]
        prompt_file: Option<PathBuf>,

        /// JPEG or PNG image to describe.
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
}

/// Resolve the prompt from either the positional argument or the file flag.
///
/// Neither being given is not an error here; the form validation reports it.
///
/// # Errors
///
/// Returns an error if the prompt file cannot be read.
pub fn resolve_prompt(
    prompt: Option<&str>,
    prompt_file: Option<&std::path::Path>,
) -> Result<String, std::io::Error> {
    if let Some(text) = prompt {
        Ok(text.to_string())
    } else if let Some(path) = prompt_file {
        std::fs::read_to_string(path)
    } else {
        Ok(String::new())
    }
}
