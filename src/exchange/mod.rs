//! Request/response lifecycle with the reply service.
//!
//! # Overview
//!
//! The [`ExchangeController`] owns the [`SessionStore`](crate::session::SessionStore),
//! the [`InputGate`] and a [`ChatView`](crate::ui::ChatView), and drives one
//! exchange at a time against a [`ReplyService`].
//!
//! # Services
//!
//! - [`HttpReplyService`]: `POST /chat` over reqwest with a request timeout

pub mod controller;
pub mod gate;
pub mod quick;
pub mod service;

pub use controller::{Dispatch, ExchangeController, ExchangeState, RejectReason, SubmitOutcome};
pub use gate::InputGate;
pub use quick::{QuickAction, UnknownQuickAction};
pub use service::{HttpReplyService, ReplyService};
