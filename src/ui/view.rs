//! The side-effecting half of rendering.

use crate::session::SessionSummary;

use super::render::MessageView;

/// Text of the notice shown when an exchange fails.
pub const EXCHANGE_ERROR_TEXT: &str = "Sorry, there was an error. Please try again.";

/// Dismissible notice shown after a failed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub message: String,
    /// Whether a retry action is offered.
    pub retryable: bool,
}

impl ErrorNotice {
    #[must_use]
    pub fn exchange_failed() -> Self {
        Self {
            message: EXCHANGE_ERROR_TEXT.to_string(),
            retryable: true,
        }
    }
}

/// Surface the exchange controller paints on.
///
/// Implementations perform the actual insertion (terminal, DOM, test
/// recorder). They receive finished display structure and never see the
/// session store.
pub trait ChatView {
    /// Append a message to the transcript.
    fn show_message(&mut self, message: &MessageView);

    /// Remove every message from the transcript.
    fn clear_transcript(&mut self);

    /// Show the "reply is being typed" indicator.
    fn show_typing(&mut self);

    fn hide_typing(&mut self);

    fn show_error(&mut self, notice: &ErrorNotice);

    fn clear_error(&mut self);

    fn set_input_enabled(&mut self, enabled: bool);

    fn focus_input(&mut self);

    /// Empty the input field after a submission was accepted.
    fn clear_input(&mut self);

    /// Replace the session list.
    fn render_history(&mut self, sessions: &[SessionSummary]);
}

/// Everything a [`RecordingView`] was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Message(MessageView),
    TranscriptCleared,
    Typing(bool),
    Error(ErrorNotice),
    ErrorCleared,
    InputEnabled(bool),
    Focused,
    InputCleared,
    History(Vec<SessionSummary>),
}

/// Headless view that records every call and tracks the resulting screen state.
#[derive(Debug, Default)]
pub struct RecordingView {
    events: Vec<ViewEvent>,
    transcript: Vec<MessageView>,
    error: Option<ErrorNotice>,
    typing: bool,
    input_enabled: bool,
    history: Vec<SessionSummary>,
}

impl RecordingView {
    #[must_use]
    pub fn new() -> Self {
        Self {
            input_enabled: true,
            ..Self::default()
        }
    }

    /// Calls received so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[ViewEvent] {
        &self.events
    }

    /// Messages currently on screen.
    #[must_use]
    pub fn transcript(&self) -> &[MessageView] {
        &self.transcript
    }

    #[must_use]
    pub fn error(&self) -> Option<&ErrorNotice> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    #[must_use]
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    #[must_use]
    pub fn history(&self) -> &[SessionSummary] {
        &self.history
    }
}

impl ChatView for RecordingView {
    fn show_message(&mut self, message: &MessageView) {
        self.transcript.push(message.clone());
        self.events.push(ViewEvent::Message(message.clone()));
    }

    fn clear_transcript(&mut self) {
        self.transcript.clear();
        self.events.push(ViewEvent::TranscriptCleared);
    }

    fn show_typing(&mut self) {
        self.typing = true;
        self.events.push(ViewEvent::Typing(true));
    }

    fn hide_typing(&mut self) {
        self.typing = false;
        self.events.push(ViewEvent::Typing(false));
    }

    fn show_error(&mut self, notice: &ErrorNotice) {
        self.error = Some(notice.clone());
        self.events.push(ViewEvent::Error(notice.clone()));
    }

    fn clear_error(&mut self) {
        self.error = None;
        self.events.push(ViewEvent::ErrorCleared);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        self.events.push(ViewEvent::InputEnabled(enabled));
    }

    fn focus_input(&mut self) {
        self.events.push(ViewEvent::Focused);
    }

    fn clear_input(&mut self) {
        self.events.push(ViewEvent::InputCleared);
    }

    fn render_history(&mut self, sessions: &[SessionSummary]) {
        self.history = sessions.to_vec();
        self.events.push(ViewEvent::History(sessions.to_vec()));
    }
}
