//! Command-line tool for smoke-testing Gemini API inference.
//!
//! This binary verifies connectivity and credentials against a named model,
//! independent of any chat session state. It sends a single non-streamed
//! prompt using the endpoint defaults and prints the result.
//!
//! # Usage
//!
//! ```bash
//! # Check the default model
//! castor-check --prompt "Say hello"
//!
//! # Check a specific model
//! castor-check --prompt "Say hello" --model gemini-2.5-pro
//! ```
//!
//! The GEMINI_API_KEY environment variable must be set; the check fails fast
//! with a descriptive message before any request if it is absent. Results and
//! errors both go to stdout: this is an operator-facing diagnostic, not a
//! library call.

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use castor::{Content, GenerateContentRequest, GenerationClient, Gemini, Model, Role};

/// The model checked when none is named.
const DEFAULT_CHECK_MODEL: &str = "gemini-1.5-flash";

/// Command-line arguments for the castor-check tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
struct Args {
    /// The prompt to send to the model.
    #[arrrg(optional, "The prompt to send to the model (required)", "PROMPT")]
    prompt: Option<String>,

    /// The model name to check.
    #[arrrg(optional, "The model name to check (default: gemini-1.5-flash)", "MODEL")]
    model: Option<String>,
}

/// Main entry point for the castor-check command-line tool.
#[tokio::main]
async fn main() {
    let (args, _) = Args::from_command_line_relaxed("castor-check --prompt <PROMPT> [--model MODEL]");

    let Some(prompt) = args.prompt.filter(|p| !p.trim().is_empty()) else {
        eprintln!("Error: Must specify a prompt with --prompt");
        std::process::exit(1);
    };
    let model = Model::from(
        args.model
            .unwrap_or_else(|| DEFAULT_CHECK_MODEL.to_string()),
    );

    let client = match Gemini::new(None) {
        Ok(client) => client,
        Err(err) => {
            println!("Error: {}", err);
            return;
        }
    };

    println!("--- Checking model: {} ---", model);

    // Endpoint defaults throughout: no system instruction, no sampling
    // overrides.
    let request =
        GenerateContentRequest::new(vec![Content::with_role(Role::User, prompt.clone())], model);

    match client.generate(request).await {
        Ok(response) => {
            println!("\n[Prompt]");
            println!("{}", prompt);
            println!("\n[Model Response]");
            println!("{}", response.text());
            println!("\n--- Check complete ---");
        }
        Err(err) => {
            println!("An error occurred during the inference check: {}", err);
        }
    }
}
