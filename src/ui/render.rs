//! Pure projection of messages into display structure.
//!
//! Nothing here touches session state or performs output; hosts take a
//! [`MessageView`] and paint it however they like. [`MessageView::to_html`]
//! is provided for HTML surfaces and escapes every piece of text.

use std::fmt::Write as _;

use crate::session::{Message, Sender, Session};

/// Line prefixes that mark a section of a structured reply.
pub const SECTION_LABELS: [&str; 4] = [
    "Possible Cause:",
    "Recommended Steps:",
    "Medications:",
    "When to See a Doctor:",
];

/// One display block of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// User text, shown exactly as typed.
    Verbatim(String),
    /// Emphasized reply line starting with one of [`SECTION_LABELS`].
    Section {
        label: &'static str,
        line: String,
    },
    /// Ordinary reply line.
    Paragraph(String),
}

/// Display structure for a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub sender: Sender,
    pub blocks: Vec<Block>,
}

/// Project a message into display blocks.
#[must_use]
pub fn render_message(message: &Message) -> MessageView {
    let blocks = match message.sender {
        Sender::User => vec![Block::Verbatim(message.text.clone())],
        Sender::Assistant => format_reply(&message.text),
    };
    MessageView {
        sender: message.sender,
        blocks,
    }
}

/// Project every message of a session, in order.
#[must_use]
pub fn render_transcript(session: &Session) -> Vec<MessageView> {
    session.messages().iter().map(render_message).collect()
}

fn format_reply(text: &str) -> Vec<Block> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| match section_label(line) {
            Some(label) => Block::Section {
                label,
                line: line.to_string(),
            },
            None => Block::Paragraph(line.to_string()),
        })
        .collect()
}

fn section_label(line: &str) -> Option<&'static str> {
    SECTION_LABELS
        .iter()
        .copied()
        .find(|label| line.starts_with(label))
}

impl MessageView {
    /// CSS class of the message row.
    #[must_use]
    pub fn css_class(&self) -> &'static str {
        match self.sender {
            Sender::User => "user",
            Sender::Assistant => "ai",
        }
    }

    /// Serialize as an HTML fragment. All text is escaped.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = format!(
            r#"<div class="chat-message {}"><div class="message-content">"#,
            self.css_class()
        );
        for block in &self.blocks {
            // Writing to a String cannot fail.
            let _ = match block {
                Block::Verbatim(text) => write!(out, "{}", escape_html(text)),
                Block::Section { line, .. } => {
                    write!(out, "<p><strong>{}</strong></p>", escape_html(line))
                }
                Block::Paragraph(line) => write!(out, "<p>{}</p>", escape_html(line)),
            };
        }
        out.push_str("</div></div>");
        out
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_sections_and_paragraphs() {
        let reply = "I'm sorry to hear that.\n\nPossible Cause: Tension headache\nRecommended Steps: Rest, fluids\n   \nMedications: Paracetamol 500mg\nWhen to See a Doctor: If it lasts more than 3 days\nFeel better soon.";
        let view = render_message(&Message::assistant(reply));

        assert_eq!(view.sender, Sender::Assistant);
        assert_eq!(
            view.blocks,
            vec![
                Block::Paragraph("I'm sorry to hear that.".into()),
                Block::Section {
                    label: "Possible Cause:",
                    line: "Possible Cause: Tension headache".into()
                },
                Block::Section {
                    label: "Recommended Steps:",
                    line: "Recommended Steps: Rest, fluids".into()
                },
                Block::Section {
                    label: "Medications:",
                    line: "Medications: Paracetamol 500mg".into()
                },
                Block::Section {
                    label: "When to See a Doctor:",
                    line: "When to See a Doctor: If it lasts more than 3 days".into()
                },
                Block::Paragraph("Feel better soon.".into()),
            ]
        );
    }

    #[test]
    fn test_label_must_start_the_line() {
        let view = render_message(&Message::assistant("  Medications: none\nSee Medications: below"));
        assert!(view.blocks.iter().all(|b| matches!(b, Block::Paragraph(_))));
    }

    #[test]
    fn test_user_text_is_verbatim() {
        let text = "Possible Cause: me\n<b>bold</b>";
        let view = render_message(&Message::user(text));
        assert_eq!(view.blocks, vec![Block::Verbatim(text.into())]);
    }

    #[test]
    fn test_html_escapes_user_markup() {
        let view = render_message(&Message::user(r#"<script>alert("x")</script> & co"#));
        let html = view.to_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; co"));
        assert!(html.starts_with(r#"<div class="chat-message user">"#));
    }

    #[test]
    fn test_html_reply_structure() {
        let view = render_message(&Message::assistant("Possible Cause: <flu>\nDrink water"));
        assert_eq!(
            view.to_html(),
            r#"<div class="chat-message ai"><div class="message-content"><p><strong>Possible Cause: &lt;flu&gt;</strong></p><p>Drink water</p></div></div>"#
        );
    }

    #[test]
    fn test_crlf_reply_lines() {
        let view = render_message(&Message::assistant("Medications: none\r\nRest"));
        assert_eq!(view.blocks.len(), 2);
        assert_eq!(view.blocks[1], Block::Paragraph("Rest".into()));
    }
}
