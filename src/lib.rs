//! Eda is a terminal client for asking questions about uploaded documents and
//! turning them into flashcard quizzes.
//!
//! The crate is organized in a few layers:
//! - [`markdown`] repairs streamed model output (split list markers) and
//!   renders it to styled terminal lines.
//! - [`core`] owns the conversation, the per-session document context,
//!   configuration, streaming chat and quiz generation.
//! - [`api`] defines wire payloads and the HTTP client for the document
//!   backend and the completion endpoints.
//! - [`ui`] holds the color themes and the styled line printer.
//! - [`cli`] parses arguments and runs the subcommands.
//!
//! The binary (`src/main.rs`) routes straight into [`cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod markdown;
pub mod ui;
pub mod utils;
