//! Core traits that decouple dashgrd from any specific rendering toolkit or
//! transport mechanism.
//!
//! Every concrete backend (a DOM bridge, a GTK canvas, the
//! [`HeadlessSurface`](crate::headless::HeadlessSurface), a Unix-socket
//! listener, a test harness, …) implements one of these traits.  The
//! [`Board`](crate::board::Board) only depends on these abstractions.

use crate::command::Command;
use crate::drag::Rect;
use crate::grid::Area;
use crate::widget::{Position, WidgetId, WidgetKind, WidgetMeta};
use std::fmt;
use std::sync::mpsc;

/// Opaque reference to a visual object owned by a [`Surface`].
///
/// The board never looks inside a handle; it only passes it back to the
/// surface that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub u64);

/// Severity of a user-visible notice (a toast).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Info => write!(f, "info"),
            NoticeLevel::Success => write!(f, "success"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// Abstraction over whatever draws pages, widgets, notices and menus.
///
/// The surface owns every visual object; the board holds [`Handle`]s and
/// tells the surface where each one goes.  Implementations are expected to
/// be infallible from the board's point of view: a surface that cannot draw
/// something should log and carry on, because the board's occupancy state
/// is authoritative either way.
pub trait Surface {
    /// Create the visual container for page `page`.
    fn create_container(&mut self, page: usize) -> Handle;

    /// Create the visual for a widget.  Called exactly once per widget.
    fn create_visual(&mut self, id: &WidgetId, kind: &WidgetKind, meta: &WidgetMeta) -> Handle;

    /// Insert `visual` into `container`, covering `area`.
    ///
    /// If the visual is already attached elsewhere it moves.
    fn attach(&mut self, visual: Handle, container: Handle, area: Area);

    /// Remove `visual` from whatever container holds it.
    fn detach(&mut self, visual: Handle);

    /// On-screen rectangle of a page container, in the same coordinate
    /// space as pointer events.  `None` if the container is not laid out.
    fn page_rect(&self, container: Handle) -> Option<Rect>;

    /// Show (or move) the drop placeholder inside `container`.
    fn show_placeholder(&mut self, container: Handle, area: Area);

    /// Remove the drop placeholder, if shown.
    fn hide_placeholder(&mut self);

    /// Bring the page owning `container` into view.
    fn scroll_to(&mut self, container: Handle);

    /// Show a transient notice to the user.
    fn notify(&mut self, level: NoticeLevel, message: &str);

    /// Ask the user a yes/no question and return the answer.
    fn confirm(&mut self, message: &str) -> bool;

    /// Open the widget context menu at screen position `(x, y)`.
    fn show_menu(&mut self, x: f64, y: f64);

    /// Close the widget context menu.
    fn hide_menu(&mut self);
}

//  Board events

/// Events sent from the [`Board`](crate::board::Board) to any listener over
/// an [`mpsc`](std::sync::mpsc) channel.
///
/// The board holds an `Option<mpsc::Sender<BoardEvent>>`; a send error
/// (receiver gone) is ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    /// A new page was appended to the registry.
    PageCreated(usize),
    /// A widget received its initial position.
    Placed { id: WidgetId, at: Position },
    /// A widget moved to a free destination.
    Moved {
        id: WidgetId,
        from: Position,
        to: Position,
    },
    /// Two equally sized widgets exchanged positions.
    Swapped { a: WidgetId, b: WidgetId },
    /// A widget was removed from the board.
    Removed(WidgetId),
    /// A saved layout was applied; `restored` widgets were repositioned.
    LayoutRestored { restored: usize },
    /// The visible page changed.
    PageChanged(usize),
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport (a Unix socket, a UI bridge,
/// an in-memory channel, …) and forward parsed commands into the provided
/// [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Direction;

    #[derive(Debug, thiserror::Error)]
    #[error("mock error")]
    struct MockError;

    /// A test double that emits a fixed sequence of commands.
    struct MockSource {
        commands: Vec<Command>,
    }

    impl CommandSource for MockSource {
        type Error = MockError;

        fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), MockError> {
            for cmd in self.commands.drain(..) {
                let _ = sink.send(cmd);
            }
            Ok(())
        }
    }

    #[test]
    fn mock_source_emits_commands() {
        let mut src = MockSource {
            commands: vec![
                Command::Go(Direction::Right),
                Command::DragStart {
                    widget: WidgetId::from("a"),
                },
            ],
        };
        let (tx, rx) = mpsc::channel();
        src.run(tx).unwrap();
        let cmds: Vec<Command> = rx.try_iter().collect();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0], Command::Go(Direction::Right));
    }

    #[test]
    fn notice_level_display() {
        assert_eq!(NoticeLevel::Info.to_string(), "info");
        assert_eq!(NoticeLevel::Success.to_string(), "success");
        assert_eq!(NoticeLevel::Error.to_string(), "error");
    }
}
