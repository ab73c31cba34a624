//! Input gate.

use crate::ui::ChatView;

/// Whether the input surface accepts submissions.
///
/// Submissions made while disabled are dropped, not queued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputGate {
    #[default]
    Enabled,
    Disabled,
}

impl InputGate {
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }

    pub fn disable(&mut self, view: &mut impl ChatView) {
        *self = Self::Disabled;
        view.set_input_enabled(false);
    }

    /// Enable input and give it focus.
    pub fn enable(&mut self, view: &mut impl ChatView) {
        *self = Self::Enabled;
        view.set_input_enabled(true);
        view.focus_input();
    }
}
