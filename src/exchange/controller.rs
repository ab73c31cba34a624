//! The exchange state machine.
//!
//! One exchange is: accept a submission, append and paint the user message
//! right away, call the reply service, then append and paint the reply or
//! show a retryable error. At most one exchange is in flight; submissions
//! arriving meanwhile are dropped by the gate.
//!
//! The controller is split at the network boundary. [`ExchangeController::begin_submit`]
//! performs everything up to dispatch and hands back a [`Dispatch`];
//! [`ExchangeController::request`] produces the call as a `'static` future
//! that borrows nothing from the controller; [`ExchangeController::complete`]
//! applies the result. A host event loop can therefore keep feeding UI events
//! to the controller while the call runs. [`ExchangeController::submit`]
//! chains the three for sequential callers.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::error::ExchangeError;
use crate::session::{Message, Sender, SessionId, SessionStore};
use crate::ui::{ChatView, ErrorNotice, render_message, render_transcript};

use super::gate::InputGate;
use super::quick::QuickAction;
use super::service::ReplyService;

/// Where the controller is in the exchange cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExchangeState {
    #[default]
    Idle,
    AwaitingReply,
}

/// Why a submission was not accepted. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Input was empty after trimming.
    Empty,
    /// A reply is still pending.
    AwaitingReply,
    /// The input gate is closed.
    InputDisabled,
    /// Retry was requested but the active session has no user message.
    NothingToRetry,
}

/// Result of a full submit/retry cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(RejectReason),
    /// The reply was appended.
    Replied(String),
    /// The exchange failed and an error notice is showing.
    Failed,
}

/// An accepted submission whose request has not completed yet.
#[derive(Debug)]
pub struct Dispatch {
    session_id: SessionId,
    message: String,
}

impl Dispatch {
    /// Text sent to the service.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Session the reply belongs to.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

/// Mediates between UI events, the session store and the reply service.
pub struct ExchangeController<V: ChatView> {
    sessions: SessionStore,
    service: Arc<dyn ReplyService>,
    view: V,
    state: ExchangeState,
    gate: InputGate,
    reply_delay: Duration,
    error_visible: bool,
}

impl<V: ChatView + std::fmt::Debug> std::fmt::Debug for ExchangeController<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeController")
            .field("sessions", &self.sessions)
            .field("view", &self.view)
            .field("state", &self.state)
            .field("gate", &self.gate)
            .field("reply_delay", &self.reply_delay)
            .field("error_visible", &self.error_visible)
            .finish_non_exhaustive()
    }
}

impl<V: ChatView> ExchangeController<V> {
    #[must_use]
    pub fn new(sessions: SessionStore, service: Arc<dyn ReplyService>, view: V) -> Self {
        Self {
            sessions,
            service,
            view,
            state: ExchangeState::Idle,
            gate: InputGate::Enabled,
            reply_delay: Duration::ZERO,
            error_visible: false,
        }
    }

    /// Hold every successful reply back for `delay` before showing it.
    #[must_use]
    pub fn with_reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    #[must_use]
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    #[must_use]
    pub fn gate(&self) -> InputGate {
        self.gate
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Whether an error notice is currently showing.
    #[must_use]
    pub fn error_visible(&self) -> bool {
        self.error_visible
    }

    // ─────────────────────────────────────────────────────────────────────
    // Exchange
    // ─────────────────────────────────────────────────────────────────────

    /// Submit, wait for the service and apply the result.
    pub async fn submit(&mut self, text: &str) -> SubmitOutcome {
        match self.begin_submit(text) {
            Ok(dispatch) => self.run(dispatch).await,
            Err(reason) => SubmitOutcome::Rejected(reason),
        }
    }

    /// Resend the last user message of the active session.
    pub async fn retry(&mut self) -> SubmitOutcome {
        match self.begin_retry() {
            Ok(dispatch) => self.run(dispatch).await,
            Err(reason) => SubmitOutcome::Rejected(reason),
        }
    }

    /// Submit the canned message of `action`.
    pub async fn quick_action(&mut self, action: QuickAction) -> SubmitOutcome {
        self.submit(action.message()).await
    }

    /// Accept a submission and prepare its request.
    ///
    /// On success the user message is already appended and painted, the input
    /// is cleared and disabled, and the controller is awaiting a reply.
    pub fn begin_submit(&mut self, text: &str) -> Result<Dispatch, RejectReason> {
        self.admit(text, true)
    }

    /// Accept a retry of the last user message.
    ///
    /// The current error notice is removed first. A message that is still
    /// waiting for its reply is not appended again.
    pub fn begin_retry(&mut self) -> Result<Dispatch, RejectReason> {
        if self.state == ExchangeState::AwaitingReply {
            return Err(self.reject(RejectReason::AwaitingReply));
        }
        self.dismiss_error();

        let Some(session) = self.sessions.active_session() else {
            return Err(self.reject(RejectReason::NothingToRetry));
        };
        let Some(text) = session.last_user_message().map(str::to_string) else {
            return Err(self.reject(RejectReason::NothingToRetry));
        };
        let append = !session.awaits_reply();

        info!(name: "exchange.retry", "Retrying last message");
        self.admit(&text, append)
    }

    /// The service call for `dispatch`, including the reply delay.
    pub fn request(&self, dispatch: &Dispatch) -> BoxFuture<'static, Result<String, ExchangeError>> {
        let service = Arc::clone(&self.service);
        let message = dispatch.message.clone();
        let delay = self.reply_delay;
        Box::pin(async move {
            let reply = service.send(&message).await?;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(reply)
        })
    }

    /// Apply the result of a dispatched request and return to idle.
    pub fn complete(
        &mut self,
        dispatch: Dispatch,
        result: Result<String, ExchangeError>,
    ) -> SubmitOutcome {
        self.view.hide_typing();

        let outcome = match result {
            Ok(reply) => {
                info!(name: "exchange.replied", session_id = %dispatch.session_id, "Reply received");
                self.sessions
                    .append_message(&dispatch.session_id, Sender::Assistant, reply.clone());
                // The user may have switched chats while waiting.
                if self.sessions.active_id() == Some(&dispatch.session_id) {
                    let message = Message::assistant(reply.clone());
                    self.view.show_message(&render_message(&message));
                }
                self.refresh_history();
                SubmitOutcome::Replied(reply)
            }
            Err(e) => {
                warn!(
                    name: "exchange.failed",
                    session_id = %dispatch.session_id,
                    status = e.status(),
                    error = %e,
                    "Exchange failed"
                );
                self.view.show_error(&ErrorNotice::exchange_failed());
                self.error_visible = true;
                SubmitOutcome::Failed
            }
        };

        self.state = ExchangeState::Idle;
        self.gate.enable(&mut self.view);
        outcome
    }

    async fn run(&mut self, dispatch: Dispatch) -> SubmitOutcome {
        let result = self.request(&dispatch).await;
        self.complete(dispatch, result)
    }

    fn admit(&mut self, text: &str, append: bool) -> Result<Dispatch, RejectReason> {
        if self.state == ExchangeState::AwaitingReply {
            return Err(self.reject(RejectReason::AwaitingReply));
        }
        if !self.gate.is_enabled() {
            return Err(self.reject(RejectReason::InputDisabled));
        }
        let message = text.trim();
        if message.is_empty() {
            return Err(self.reject(RejectReason::Empty));
        }

        let session_id = match self.sessions.active_id() {
            Some(id) => id.clone(),
            None => self.start_session(),
        };

        if append {
            self.sessions
                .append_message(&session_id, Sender::User, message);
            self.view
                .show_message(&render_message(&Message::user(message)));
        }
        self.view.clear_input();

        self.state = ExchangeState::AwaitingReply;
        self.gate.disable(&mut self.view);
        self.view.show_typing();

        info!(name: "exchange.dispatched", session_id = %session_id, "Message dispatched");
        Ok(Dispatch {
            session_id,
            message: message.to_string(),
        })
    }

    fn reject(&self, reason: RejectReason) -> RejectReason {
        debug!(name: "exchange.rejected", reason = ?reason, "Submission rejected");
        reason
    }

    // ─────────────────────────────────────────────────────────────────────
    // UI affordances
    // ─────────────────────────────────────────────────────────────────────

    /// Start an empty chat and make it active.
    pub fn new_chat(&mut self) -> SessionId {
        let id = self.start_session();
        self.view.focus_input();
        id
    }

    /// Switch to an existing chat and repaint its transcript.
    pub fn select_session(&mut self, id: &SessionId) -> bool {
        if !self.sessions.select_session(id) {
            return false;
        }
        self.dismiss_error();
        self.view.clear_transcript();
        if let Some(session) = self.sessions.get_session(id) {
            for message in render_transcript(session) {
                self.view.show_message(&message);
            }
        }
        self.refresh_history();
        true
    }

    /// Delete a chat. Deleting the active one leaves no chat active; the next
    /// submission starts a fresh one.
    pub fn delete_session(&mut self, id: &SessionId) -> bool {
        let was_active = self.sessions.active_id() == Some(id);
        if !self.sessions.delete_session(id) {
            return false;
        }
        if was_active {
            self.dismiss_error();
            self.view.clear_transcript();
        }
        self.refresh_history();
        true
    }

    /// Remove the error notice, if one is showing.
    pub fn dismiss_error(&mut self) {
        if self.error_visible {
            self.view.clear_error();
            self.error_visible = false;
        }
    }

    /// Repaint the session list.
    pub fn refresh_history(&mut self) {
        let summaries = self.sessions.list_sessions();
        self.view.render_history(&summaries);
    }

    fn start_session(&mut self) -> SessionId {
        let id = self.sessions.create_session();
        self.dismiss_error();
        self.view.clear_transcript();
        self.refresh_history();
        id
    }
}
