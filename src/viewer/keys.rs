// Keyboard navigation

use super::navigator::Direction;
use serde::Deserialize;

/// What had keyboard focus when a key was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
    Input,
    Textarea,
    Editable,
    #[default]
    #[serde(other)]
    Other,
}

impl Focus {
    /// Text-entry targets keep their arrow keys for the caret
    fn captures_arrows(self) -> bool {
        matches!(self, Focus::Input | Focus::Textarea | Focus::Editable)
    }
}

/// ArrowLeft/ArrowRight navigate, unless focus is in a text-entry element
pub fn direction_for_key(key: &str, focus: Focus) -> Option<Direction> {
    if focus.captures_arrows() {
        return None;
    }
    match key {
        "ArrowLeft" => Some(Direction::Previous),
        "ArrowRight" => Some(Direction::Next),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrows_navigate() {
        assert_eq!(direction_for_key("ArrowLeft", Focus::Other), Some(Direction::Previous));
        assert_eq!(direction_for_key("ArrowRight", Focus::Other), Some(Direction::Next));
        assert_eq!(direction_for_key("ArrowUp", Focus::Other), None);
        assert_eq!(direction_for_key("Enter", Focus::Other), None);
    }

    #[test]
    fn test_text_entry_focus_suppresses_navigation() {
        for focus in [Focus::Input, Focus::Textarea, Focus::Editable] {
            assert_eq!(direction_for_key("ArrowLeft", focus), None);
            assert_eq!(direction_for_key("ArrowRight", focus), None);
        }
    }

    #[test]
    fn test_unknown_focus_deserializes_as_other() {
        let focus: Focus = serde_json::from_str(r#""select""#).unwrap();
        assert_eq!(focus, Focus::Other);
        let focus: Focus = serde_json::from_str(r#""textarea""#).unwrap();
        assert_eq!(focus, Focus::Textarea);
    }
}
