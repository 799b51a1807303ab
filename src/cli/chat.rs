//! Line-oriented chat session with an uploaded document.

use std::error::Error;
use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Local;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::warn;

use crate::cli::ask::{stream_answer, StreamOutcome};
use crate::cli::context::CliContext;
use crate::cli::upload::{describe_receipt, upload_file};
use crate::core::message::Conversation;
use crate::core::session::SessionContext;
use crate::markdown::code_blocks;
use crate::utils::clipboard::copy_to_clipboard;
use crate::utils::logging::TranscriptLog;

const HELP: &str = "Commands:
  /upload <path>   Upload a PDF, TXT, DOC or DOCX file and chat about it
  /search <text>   Query the uploaded collection through the backend
  /copy [N]        Copy code block N of the last answer (or the whole answer)
  /clear           Forget the conversation (the document stays loaded)
  /status          Show the loaded document and transcript log
  /help            Show this help
  /quit            Leave the chat";

#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand {
    Upload(PathBuf),
    Search(String),
    Copy(Option<usize>),
    Clear,
    Status,
    Help,
    Quit,
}

/// Parse a slash command. Returns `None` for ordinary chat input.
pub fn parse_command(input: &str) -> Option<Result<ChatCommand, String>> {
    let rest = input.trim().strip_prefix('/')?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "upload" if arg.is_empty() => Err("Usage: /upload <path>".to_string()),
        "upload" => Ok(ChatCommand::Upload(PathBuf::from(arg))),
        "search" if arg.is_empty() => Err("Usage: /search <text>".to_string()),
        "search" => Ok(ChatCommand::Search(arg.to_string())),
        "copy" if arg.is_empty() => Ok(ChatCommand::Copy(None)),
        "copy" => match arg.parse::<usize>() {
            Ok(n) if n > 0 => Ok(ChatCommand::Copy(Some(n))),
            _ => Err(format!("Invalid code block number: {arg}")),
        },
        "clear" => Ok(ChatCommand::Clear),
        "status" => Ok(ChatCommand::Status),
        "help" | "?" => Ok(ChatCommand::Help),
        "quit" | "exit" | "q" => Ok(ChatCommand::Quit),
        other => Err(format!("Unknown command: /{other} (try /help)")),
    };
    Some(command)
}

/// Pick the text `/copy` should put on the clipboard.
pub fn copy_target(answer: &str, block: Option<usize>) -> Result<String, String> {
    match block {
        None => Ok(answer.to_string()),
        Some(n) => {
            let blocks = code_blocks(answer);
            blocks
                .into_iter()
                .nth(n - 1)
                .map(|b| b.code)
                .ok_or_else(|| format!("The last answer has no code block #{n}"))
        }
    }
}

struct ChatSession<'a> {
    ctx: &'a CliContext,
    conversation: Conversation,
    session: SessionContext,
    transcript: TranscriptLog,
    pending_attachment: Option<String>,
    next_stream_id: u64,
}

impl<'a> ChatSession<'a> {
    fn info(&self, text: &str) {
        eprintln!("{text}");
    }

    async fn handle_command(&mut self, command: ChatCommand) -> Result<bool, Box<dyn Error>> {
        match command {
            ChatCommand::Quit => return Ok(false),
            ChatCommand::Help => self.info(HELP),
            ChatCommand::Status => {
                self.info(&format!("Document: {}", self.session.describe()));
                self.info(&format!("Transcript log: {}", self.transcript.status()));
                self.info(&format!("Messages: {}", self.conversation.len()));
            }
            ChatCommand::Clear => {
                self.conversation.clear();
                self.transcript.log_note("Conversation cleared")?;
                self.info("Conversation cleared.");
            }
            ChatCommand::Upload(path) => match upload_file(self.ctx, &path).await {
                Ok((receipt, upload)) => {
                    for line in describe_receipt(&receipt, &upload) {
                        self.info(&line);
                    }
                    self.session.adopt_upload(&receipt, &upload.file_name);
                    self.pending_attachment = self.session.filename.clone();
                    self.transcript
                        .log_note(&format!("Uploaded {}", self.session.describe()))?;
                }
                Err(err) => self.info(&format!("❌ {err}")),
            },
            ChatCommand::Search(text) => match self.ctx.backend().search(&text).await {
                Ok(results) => {
                    let message = self.conversation.push_assistant(results).clone();
                    self.ctx.print_message(&message)?;
                    self.transcript.log_message(&message)?;
                }
                Err(err) => self.info(&format!("❌ {err}")),
            },
            ChatCommand::Copy(block) => {
                let Some(answer) = self.conversation.last_assistant() else {
                    self.info("Nothing to copy yet.");
                    return Ok(true);
                };
                match copy_target(&answer.content, block).and_then(|text| copy_to_clipboard(&text))
                {
                    Ok(()) => self.info("📋 Copied to clipboard."),
                    Err(err) => self.info(&format!("❌ {err}")),
                }
            }
        }
        Ok(true)
    }

    async fn ask(&mut self, question: String) -> Result<(), Box<dyn Error>> {
        let attachment = self.pending_attachment.take();
        let user = self.conversation.push_user(question.clone(), attachment).clone();
        self.transcript.log_message(&user)?;

        self.next_stream_id += 1;
        let outcome = stream_answer(self.ctx, &question, &self.session, self.next_stream_id).await?;
        let content = match outcome {
            StreamOutcome::Complete(answer) => answer,
            StreamOutcome::Cancelled(partial) => {
                self.info("⏹ Cancelled.");
                partial
            }
            StreamOutcome::Failed(err) => {
                warn!("chat answer failed");
                format!("❌ {err}")
            }
        };
        if content.is_empty() {
            return Ok(());
        }

        let failed = content.starts_with('❌');
        let message = self.conversation.push_assistant(content).clone();
        if failed {
            self.ctx.print_error(&message.content)?;
        } else if self.ctx.config.markdown_enabled() {
            let blocks = self.ctx.print_message(&message)?;
            if blocks > 0 {
                self.info(&format!("({blocks} code block(s); /copy N to copy one)"));
            }
        }
        self.transcript.log_message(&message)?;
        Ok(())
    }
}

/// What the prompt produced.
#[derive(Debug, PartialEq)]
pub enum PromptInput {
    Line(String),
    Interrupted,
    Eof,
}

/// Read the next prompt line, giving up when `interrupt` fires first.
pub async fn next_input<R, F>(lines: &mut Lines<R>, interrupt: F) -> io::Result<PromptInput>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = io::Result<()>>,
{
    tokio::select! {
        biased;
        signal = interrupt => {
            signal?;
            Ok(PromptInput::Interrupted)
        }
        line = lines.next_line() => Ok(match line? {
            Some(line) => PromptInput::Line(line),
            None => PromptInput::Eof,
        }),
    }
}

pub async fn run_chat(
    ctx: &CliContext,
    file: Option<PathBuf>,
    log: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let transcript = TranscriptLog::new(log)?;
    transcript.log_note(&format!(
        "Session started {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ))?;

    let mut chat = ChatSession {
        ctx,
        conversation: Conversation::new(),
        session: SessionContext::new(),
        transcript,
        pending_attachment: None,
        next_stream_id: 0,
    };

    eprintln!("Eda chat. Type a question, or /help for commands.");
    if let Some(path) = file {
        chat.handle_command(ChatCommand::Upload(path)).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let line = match next_input(&mut lines, tokio::signal::ctrl_c()).await? {
            PromptInput::Line(line) => line,
            PromptInput::Interrupted => {
                println!();
                eprintln!("Interrupted; leaving chat.");
                break;
            }
            PromptInput::Eof => {
                println!();
                break;
            }
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match parse_command(input) {
            Some(Ok(command)) => {
                if !chat.handle_command(command).await? {
                    break;
                }
            }
            Some(Err(usage)) => chat.info(&usage),
            None => {
                if let Err(err) = chat.ask(input.to_string()).await {
                    chat.info(&format!("❌ {err}"));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prompt_returns_lines_then_eof() {
        let mut lines = BufReader::new(&b"first question\n"[..]).lines();
        assert_eq!(
            next_input(&mut lines, std::future::pending()).await.expect("read"),
            PromptInput::Line("first question".into())
        );
        assert_eq!(
            next_input(&mut lines, std::future::pending()).await.expect("read"),
            PromptInput::Eof
        );
    }

    #[tokio::test]
    async fn interrupt_at_prompt_ends_input() {
        let mut lines = BufReader::new(&b"ignored\n"[..]).lines();
        assert_eq!(
            next_input(&mut lines, std::future::ready(Ok(()))).await.expect("read"),
            PromptInput::Interrupted
        );
        // The pending line is still there for a later read
        assert_eq!(
            next_input(&mut lines, std::future::pending()).await.expect("read"),
            PromptInput::Line("ignored".into())
        );
    }

    #[test]
    fn plain_input_is_not_a_command() {
        assert!(parse_command("what is chapter two about?").is_none());
        assert!(parse_command("  and/or").is_none());
    }

    #[test]
    fn commands_parse_with_arguments() {
        assert_eq!(
            parse_command("/upload ~/docs/My Notes.pdf"),
            Some(Ok(ChatCommand::Upload(PathBuf::from("~/docs/My Notes.pdf"))))
        );
        assert_eq!(
            parse_command("/search  cell division "),
            Some(Ok(ChatCommand::Search("cell division".into())))
        );
        assert_eq!(parse_command("/copy"), Some(Ok(ChatCommand::Copy(None))));
        assert_eq!(parse_command("/copy 2"), Some(Ok(ChatCommand::Copy(Some(2)))));
        assert_eq!(parse_command("/QUIT"), Some(Ok(ChatCommand::Quit)));
    }

    #[test]
    fn bad_commands_report_usage() {
        assert!(matches!(parse_command("/upload"), Some(Err(_))));
        assert!(matches!(parse_command("/copy 0"), Some(Err(_))));
        assert!(matches!(parse_command("/copy x"), Some(Err(_))));
        let Some(Err(message)) = parse_command("/frobnicate") else {
            panic!("expected an error");
        };
        assert!(message.contains("/frobnicate"));
    }

    #[test]
    fn copy_target_selects_numbered_block() {
        let answer = "Intro\n\n```rust\nfn a() {}\n```\n\n```sh\nls\n```\n";
        assert_eq!(copy_target(answer, None).as_deref(), Ok(answer));
        assert_eq!(copy_target(answer, Some(2)).as_deref(), Ok("ls"));
        assert!(copy_target(answer, Some(3)).is_err());
    }
}
