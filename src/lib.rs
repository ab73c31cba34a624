//! Cura chat client
//!
//! Session and message lifecycle manager for a conversational health
//! assistant: locally persisted chat sessions, rendering of the exchange
//! between user and reply service, and the request/response lifecycle with
//! typing latency, error display and retry.
//!
//! # Architecture
//!
//! - **Persistence**: the session collection as one blob in a key/value store
//! - **Sessions**: owned, ordered collection with active-session tracking
//! - **Rendering**: pure message projection plus a view seam for insertion
//! - **Exchange**: input gate and the request/response state machine
//!
//! # Modules
//!
//! - [`config`]: layered client configuration
//! - [`error`]: storage and exchange error types
//! - [`exchange`]: exchange controller, input gate, reply service client
//! - [`persistence`]: key/value stores and history storage
//! - [`session`]: sessions, messages and the session store
//! - [`ui`]: message rendering and display surfaces

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::implicit_hasher)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod error;
pub mod exchange;
pub mod persistence;
pub mod session;
pub mod ui;
