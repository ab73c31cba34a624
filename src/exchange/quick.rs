//! Canned quick-action messages.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Shortcut that submits a fixed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickAction {
    Headache,
    Fever,
    Stomach,
    FirstAid,
}

impl QuickAction {
    pub const ALL: [Self; 4] = [Self::Headache, Self::Fever, Self::Stomach, Self::FirstAid];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Headache => "headache",
            Self::Fever => "fever",
            Self::Stomach => "stomach",
            Self::FirstAid => "firstaid",
        }
    }

    /// Message submitted by this action.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Headache => "I have a headache",
            Self::Fever => "I have a fever",
            Self::Stomach => "I have stomach pain",
            Self::FirstAid => "I need a first aid kit",
        }
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown quick action {0:?} (expected headache, fever, stomach or firstaid)")]
pub struct UnknownQuickAction(pub String);

impl FromStr for QuickAction {
    type Err = UnknownQuickAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| UnknownQuickAction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for action in QuickAction::ALL {
            assert_eq!(action.name().parse::<QuickAction>(), Ok(action));
        }
        assert_eq!("Fever".parse::<QuickAction>(), Ok(QuickAction::Fever));
        assert!("cough".parse::<QuickAction>().is_err());
    }

    #[test]
    fn test_messages() {
        assert_eq!(QuickAction::Stomach.message(), "I have stomach pain");
        assert_eq!(QuickAction::FirstAid.message(), "I need a first aid kit");
    }
}
