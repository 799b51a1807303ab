use crate::core::message::{Message, Role};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Appends the chat transcript to a plain-text file, one block per message.
pub struct TranscriptLog {
    file_path: Option<PathBuf>,
}

impl TranscriptLog {
    /// Open the log, checking up front that the file is writable.
    pub fn new(log_file: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(path) = &log_file {
            OpenOptions::new().create(true).append(true).open(path)?;
        }
        Ok(Self {
            file_path: log_file,
        })
    }

    pub fn disabled() -> Self {
        Self { file_path: None }
    }

    pub fn is_active(&self) -> bool {
        self.file_path.is_some()
    }

    pub fn log_message(&self, message: &Message) -> Result<(), Box<dyn std::error::Error>> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);
        write_message(&mut writer, message)?;
        writer.flush()?;
        Ok(())
    }

    /// Add a `## ` marker line, used for uploads and session boundaries.
    pub fn log_note(&self, note: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "## {note}")?;
        writeln!(file)?;
        Ok(())
    }

    pub fn status(&self) -> String {
        match &self.file_path {
            None => "disabled".to_string(),
            Some(path) => format!(
                "active ({})",
                path.file_name().unwrap_or_default().to_string_lossy()
            ),
        }
    }
}

fn write_message(writer: &mut impl Write, message: &Message) -> std::io::Result<()> {
    match message.role {
        Role::User => {
            for line in format!("You: {}", message.content).lines() {
                writeln!(writer, "{line}")?;
            }
            if let Some(attachment) = &message.attachment {
                writeln!(writer, "📎 {attachment}")?;
            }
        }
        Role::Assistant => {
            if message.content.is_empty() {
                return Ok(());
            }
            for line in message.content.lines() {
                writeln!(writer, "{line}")?;
            }
        }
    }
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn messages_are_appended_with_spacing() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("chat.log");
        let log = TranscriptLog::new(Some(path.clone())).expect("open log");

        log.log_message(&Message::user(1, "Hello".into(), Some("notes.pdf".into())))
            .expect("log user");
        log.log_message(&Message::assistant(2, "Line 1\nLine 2".into()))
            .expect("log assistant");
        log.log_note("uploaded notes.pdf").expect("log note");

        let content = std::fs::read_to_string(&path).expect("read log");
        assert_eq!(
            content,
            "You: Hello\n📎 notes.pdf\n\nLine 1\nLine 2\n\n## uploaded notes.pdf\n\n"
        );
    }

    #[test]
    fn disabled_log_is_a_no_op() {
        let log = TranscriptLog::disabled();
        assert!(!log.is_active());
        assert_eq!(log.status(), "disabled");
        log.log_message(&Message::assistant(1, "x".into()))
            .expect("no-op");
    }
}
