//! One-shot question against a document, printed to stdout.

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::context::CliContext;
use crate::cli::upload::{load_session, SessionSource};
use crate::core::chat_stream::{build_chat_messages, ChatStreamService, StreamMessage, StreamParams};
use crate::core::message::Message;
use crate::core::session::SessionContext;

/// How a streamed answer ended.
pub enum StreamOutcome {
    Complete(String),
    /// Ctrl-C; holds whatever arrived before the cancel.
    Cancelled(String),
    Failed(String),
}

/// Stream an answer for `question`, echoing raw chunks when markdown is off.
pub async fn stream_answer(
    ctx: &CliContext,
    question: &str,
    session: &SessionContext,
    stream_id: u64,
) -> Result<StreamOutcome, Box<dyn Error>> {
    let endpoint = ctx.config.chat_endpoint();
    let cancel_token = CancellationToken::new();
    let (stream_service, mut rx) = ChatStreamService::new();
    stream_service.spawn_stream(StreamParams {
        client: ctx.client.clone(),
        base_url: endpoint.base_url,
        api_key: endpoint.api_key,
        model: endpoint.model,
        api_messages: build_chat_messages(question, session),
        cancel_token: cancel_token.clone(),
        stream_id,
    });

    let echo_raw = !ctx.config.markdown_enabled();
    let mut full_response = String::new();
    let mut error: Option<String> = None;

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some((_, id)) if id != stream_id => continue,
                Some((StreamMessage::Chunk(content), _)) => {
                    full_response.push_str(&content);
                    if echo_raw {
                        print!("{content}");
                        io::stdout().flush()?;
                    }
                }
                Some((StreamMessage::Error(err), _)) => error = Some(err),
                Some((StreamMessage::End, _)) | None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                cancel_token.cancel();
                debug!(stream_id, "cancelled by user");
                if echo_raw {
                    println!();
                }
                return Ok(StreamOutcome::Cancelled(full_response));
            }
        }
    }

    if echo_raw && !full_response.is_empty() {
        println!();
    }
    Ok(match error {
        Some(err) => StreamOutcome::Failed(err),
        None => StreamOutcome::Complete(full_response),
    })
}

pub async fn run_ask(
    ctx: &CliContext,
    prompt: Vec<String>,
    file: Option<PathBuf>,
    local: bool,
    search: bool,
) -> Result<(), Box<dyn Error>> {
    let question = prompt.join(" ");
    if question.trim().is_empty() {
        eprintln!("Usage: eda ask [--file <document> [--local]] <question>");
        std::process::exit(1);
    }

    let source = file.map(|path| {
        if local {
            SessionSource::Local(path)
        } else {
            SessionSource::Upload(path)
        }
    });
    let session = load_session(ctx, source).await?;

    if search {
        let results = ctx.backend().search(&question).await?;
        ctx.print_message(&Message::assistant(1, results))?;
        return Ok(());
    }

    if !session.has_document() {
        eprintln!("⚠️  No document loaded; the answer will not be grounded in a file.");
    }

    match stream_answer(ctx, &question, &session, 1).await? {
        StreamOutcome::Complete(answer) | StreamOutcome::Cancelled(answer) => {
            if ctx.config.markdown_enabled() {
                ctx.print_message(&Message::assistant(1, answer))?;
            }
            Ok(())
        }
        StreamOutcome::Failed(err) => {
            ctx.print_error(&format!("❌ {err}"))?;
            std::process::exit(1);
        }
    }
}
