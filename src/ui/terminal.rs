//! Terminal front end: a [`ChatView`] over any writer plus line commands.

use std::io::Write;

use tracing::warn;

use crate::exchange::QuickAction;
use crate::session::{Sender, SessionId, SessionSummary};

use super::render::{Block, MessageView};
use super::view::{ChatView, ErrorNotice};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\r\x1b[2K";

pub const HELP_TEXT: &str = "\
Type a message and press Enter to send it.
  /new            start a new chat
  /list           show saved chats
  /open <n>       open chat number n from /list
  /delete <n>     delete chat number n from /list
  /retry          resend the last message after an error
  /dismiss        close the error notice
  /quick <name>   headache | fever | stomach | firstaid
  /help           show this help
  /quit           exit";

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text to submit.
    Say(String),
    New,
    List,
    /// 1-based position in the last shown list.
    Open(usize),
    Delete(usize),
    Retry,
    Dismiss,
    Quick(QuickAction),
    Help,
    Quit,
    /// Unrecognized or malformed command, with a hint for the user.
    Invalid(String),
}

impl Command {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Self::Say(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        match (name, arg) {
            ("new", None) => Self::New,
            ("list", None) => Self::List,
            ("retry", None) => Self::Retry,
            ("dismiss", None) => Self::Dismiss,
            ("help", None) => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            ("open", Some(n)) => parse_index(n).map_or_else(Self::Invalid, Self::Open),
            ("delete", Some(n)) => parse_index(n).map_or_else(Self::Invalid, Self::Delete),
            ("quick", Some(action)) => action
                .parse::<QuickAction>()
                .map_or_else(|e| Self::Invalid(e.to_string()), Self::Quick),
            _ => Self::Invalid(format!("unknown command: {trimmed} (try /help)")),
        }
    }
}

fn parse_index(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a chat number from /list, got {raw:?}")),
    }
}

/// Writes the conversation as plain lines.
#[derive(Debug)]
pub struct TerminalView<W: Write> {
    out: W,
    history: Vec<SessionSummary>,
    input_enabled: bool,
}

impl TerminalView<std::io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            history: Vec::new(),
            input_enabled: true,
        }
    }

    /// Id of the `n`th (1-based) session of the last rendered list.
    #[must_use]
    pub fn session_at(&self, n: usize) -> Option<SessionId> {
        n.checked_sub(1)
            .and_then(|i| self.history.get(i))
            .map(|s| s.id.clone())
    }

    /// Print the session list.
    pub fn print_history(&mut self) {
        let text = if self.history.is_empty() {
            "Nothing here yet\nYour health consultations will appear here".to_string()
        } else {
            self.history
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let marker = if s.active { '*' } else { ' ' };
                    format!("{marker}{:>3}. {}  ({})", i + 1, s.title, s.created)
                })
                .collect::<Vec<_>>()
                .join("\n")
        };
        self.line(&text);
    }

    /// Print a free-form line, e.g. help or a command hint.
    pub fn notice(&mut self, text: &str) {
        self.line(text);
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        self.write(&format!("{text}\n"));
    }

    fn write(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            warn!(name: "terminal.write_failed", error = %e, "Could not write to terminal");
        }
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn show_message(&mut self, message: &MessageView) {
        let mut text = String::new();
        for block in &message.blocks {
            match block {
                Block::Verbatim(t) | Block::Paragraph(t) => text.push_str(t),
                Block::Section { line, .. } => {
                    text.push_str(BOLD);
                    text.push_str(line);
                    text.push_str(RESET);
                }
            }
            text.push('\n');
        }
        let prefix = match message.sender {
            Sender::User => "you> ",
            Sender::Assistant => "cura> ",
        };
        self.write(&format!("{prefix}{text}"));
    }

    fn clear_transcript(&mut self) {
        self.line("──────────────────────────────");
    }

    fn show_typing(&mut self) {
        self.write("cura is typing...");
    }

    fn hide_typing(&mut self) {
        self.write(CLEAR_LINE);
    }

    fn show_error(&mut self, notice: &ErrorNotice) {
        if notice.retryable {
            self.line(&format!("! {} (/retry to resend, /dismiss to close)", notice.message));
        } else {
            self.line(&format!("! {}", notice.message));
        }
    }

    fn clear_error(&mut self) {}

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn focus_input(&mut self) {
        if self.input_enabled {
            self.write("> ");
        }
    }

    fn clear_input(&mut self) {}

    fn render_history(&mut self, sessions: &[SessionSummary]) {
        self.history = sessions.to_vec();
    }
}
