//! Commands and types shared by command sources and the board.
//!
//! [`Command`] describes every input the board reacts to: pointer-drag
//! events, page navigation, widget activation and context-menu actions.
//! Commands arrive as JSON (see [`ipc::listener`](crate::ipc::listener)), so
//! the vocabulary is deliberately lenient where humans type it (directions
//! are case-insensitive).

use crate::widget::WidgetId;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Horizontal page navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    Left,
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

/// Parse a direction string (case-insensitive; `"prev"`/`"next"` accepted).
fn parse_direction(s: &str) -> Option<Direction> {
    match s.trim().to_lowercase().as_str() {
        "left" | "prev" | "previous" => Some(Direction::Left),
        "right" | "next" => Some(Direction::Right),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_direction(&s).ok_or_else(|| DeError::custom(format!("invalid direction: {:?}", s)))
    }
}

/// Every input the [`Board`](crate::board::Board) can handle.
///
/// Pointer coordinates (`x`, `y`) are in the same space as
/// [`Surface::page_rect`](crate::traits::Surface::page_rect).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// A drag gesture started on a widget.
    DragStart { widget: WidgetId },

    /// The pointer moved over page `page` during a drag.  Only updates the
    /// placeholder preview.
    DragOver { page: usize, x: f64, y: f64 },

    /// The dragged widget was released over page `page`.
    Drop { page: usize, x: f64, y: f64 },

    /// The drag gesture ended without a drop (or after one).
    DragEnd,

    /// Scroll one page in the given direction.
    Go(Direction),

    /// Scroll to an absolute page index (clamped).
    GoTo(usize),

    /// A plain click on a widget.
    Activate { widget: WidgetId },

    /// Open the context menu for a widget at screen position `(x, y)`.
    ShowMenu { widget: WidgetId, x: f64, y: f64 },

    /// Close the context menu.
    HideMenu,

    /// A context-menu entry was chosen; applies to the menu's widget.
    MenuAction(String),

    /// Navigate to the page of the first widget whose name matches.
    Reveal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_display() {
        assert_eq!(Direction::Left.to_string(), "left");
        assert_eq!(Direction::Right.to_string(), "right");
    }

    #[test]
    fn direction_parsing_is_lenient() {
        let d: Direction = serde_json::from_str(r#""RIGHT""#).unwrap();
        assert_eq!(d, Direction::Right);
        let d: Direction = serde_json::from_str(r#"" prev ""#).unwrap();
        assert_eq!(d, Direction::Left);
        assert!(serde_json::from_str::<Direction>(r#""up""#).is_err());
    }

    #[test]
    fn drag_commands_from_json() {
        let cmd: Command = serde_json::from_str(r#"{"DragStart":{"widget":"mail"}}"#).unwrap();
        assert_eq!(
            cmd,
            Command::DragStart {
                widget: WidgetId::from("mail")
            }
        );
        let cmd: Command =
            serde_json::from_str(r#"{"DragOver":{"page":1,"x":12.5,"y":40.0}}"#).unwrap();
        assert_eq!(
            cmd,
            Command::DragOver {
                page: 1,
                x: 12.5,
                y: 40.0
            }
        );
        let cmd: Command = serde_json::from_str(r#""DragEnd""#).unwrap();
        assert_eq!(cmd, Command::DragEnd);
    }

    #[test]
    fn navigation_and_menu_commands_from_json() {
        let cmd: Command = serde_json::from_str(r#"{"Go":"left"}"#).unwrap();
        assert_eq!(cmd, Command::Go(Direction::Left));
        let cmd: Command = serde_json::from_str(r#"{"GoTo":3}"#).unwrap();
        assert_eq!(cmd, Command::GoTo(3));
        let cmd: Command = serde_json::from_str(r#"{"MenuAction":"delete"}"#).unwrap();
        assert_eq!(cmd, Command::MenuAction("delete".into()));
    }
}
