//! Command-line interface parsing and dispatch.

pub mod ask;
pub mod chat;
pub mod context;
pub mod quiz;
pub mod render;
pub mod settings;
pub mod upload;

#[cfg(test)]
mod tests;

use std::error::Error;
use std::path::PathBuf;

use clap::builder::RangedU64ValueParser;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::cli::ask::run_ask;
use crate::cli::chat::run_chat;
use crate::cli::context::CliContext;
use crate::cli::quiz::run_quiz;
use crate::cli::render::run_render;
use crate::cli::settings::{run_set, run_unset};
use crate::cli::upload::run_upload;
use crate::core::config::data::DEFAULT_QUIZ_COUNT;
use crate::core::config::ConfigOrchestrator;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "eda")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Chat with your documents and turn them into flashcard quizzes")]
#[command(
    long_about = "Eda uploads a document to a retrieval backend, answers questions about it \
with an OpenAI-compatible model, and generates flashcard quizzes from it.\n\n\
Environment Variables:\n\
  OPENAI_API_KEY    Key for the chat model endpoint\n\
  GROQ_API_KEY      Key for the quiz model endpoint\n\
  CHROMA_API_KEY    Token forwarded to the backend as x-chroma-token\n\
  EDA_BACKEND_URL   Backend base URL (overrides the backend-url setting)\n\
  RUST_LOG          Diagnostic log filter (overrides -v)\n\n\
Chat commands:\n\
  /upload <path>    Upload a document\n\
  /search <text>    Query the uploaded collection\n\
  /copy [N]         Copy code block N of the last answer\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Append the chat transcript to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Increase diagnostic output on stderr (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start an interactive chat (default)
    Chat {
        /// Upload this document before the first question
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Ask one question and print the answer
    Ask {
        /// Document to answer from
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Read --file locally as plain text instead of uploading it
        #[arg(long, requires = "file")]
        local: bool,
        /// Return the backend's search results instead of a model answer
        #[arg(long, conflicts_with = "local")]
        search: bool,
        /// The question
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// Upload a document to the backend and show the receipt
    Upload {
        file: PathBuf,
    },
    /// Generate a flashcard quiz from a PDF or TXT document
    Quiz {
        file: PathBuf,
        /// Number of questions to ask for
        #[arg(
            short = 'n',
            long,
            default_value_t = DEFAULT_QUIZ_COUNT,
            value_parser = RangedU64ValueParser::<usize>::new().range(1..=50)
        )]
        count: usize,
        /// Print the cards as JSON instead of quizzing interactively
        #[arg(long)]
        json: bool,
    },
    /// Render a markdown file (or stdin) as chat answers are rendered
    Render {
        /// Markdown file; reads stdin when omitted or "-"
        file: Option<PathBuf>,
        /// Print the repaired markdown instead of rendering it
        #[arg(long, conflicts_with = "no_repair")]
        repair_only: bool,
        /// Render without repairing split list markers
        #[arg(long)]
        no_repair: bool,
    },
    /// Set a configuration value, or show the configuration when no key is given
    Set {
        key: Option<String>,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Reset a configuration value to its default
    Unset {
        key: String,
    },
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let command = args.command.unwrap_or(Commands::Chat { file: None });
    if let Err(err) = dispatch(command, args.log).await {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn dispatch(command: Commands, log: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Set { key, value } => Ok(run_set(&ConfigOrchestrator::for_user()?, key, value)?),
        Commands::Unset { key } => Ok(run_unset(&ConfigOrchestrator::for_user()?, key)?),
        Commands::Chat { file } => run_chat(&CliContext::load()?, file, log).await,
        Commands::Ask {
            file,
            local,
            search,
            prompt,
        } => run_ask(&CliContext::load()?, prompt, file, local, search).await,
        Commands::Upload { file } => run_upload(&CliContext::load()?, file).await,
        Commands::Quiz { file, count, json } => {
            run_quiz(&CliContext::load()?, file, count, json).await
        }
        Commands::Render {
            file,
            repair_only,
            no_repair,
        } => run_render(&CliContext::load()?, file, repair_only, no_repair).await,
    }
}
