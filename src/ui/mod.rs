//! Rendering and display surfaces.
//!
//! Rendering is split in two: [`render`] turns messages into display
//! structure without side effects, and a [`ChatView`] performs the insertion.
//!
//! # Structure
//!
//! - [`render`]: pure message projection and HTML serialization
//! - [`view`]: the [`ChatView`] seam and a recording implementation
//! - [`terminal`]: line-oriented front end used by the binary

pub mod render;
pub mod terminal;
pub mod view;

pub use render::{Block, MessageView, render_message, render_transcript};
pub use terminal::{Command, TerminalView};
pub use view::{ChatView, ErrorNotice, RecordingView, ViewEvent};
