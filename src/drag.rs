//! Pointer-drag state machine.
//!
//! # States
//!
//! | State      | Meaning                                                  |
//! |------------|----------------------------------------------------------|
//! | `Idle`     | No drag in progress                                      |
//! | `Dragging` | A widget is the active subject; a placeholder previews   |
//! |            | the candidate drop cell                                  |
//!
//! Drop resolution happens inside a single call
//! ([`Board::handle`](crate::board::Board::handle) with
//! [`Command::Drop`](crate::command::Command::Drop)), so the transient
//! *resolving* step is never observable from outside.
//!
//! The controller itself only tracks state and converts pointer
//! coordinates to cells; the board applies the drop policy.

use crate::grid::{GRID_COLS, GRID_ROWS};
use crate::widget::{Span, WidgetId};

/// On-screen rectangle of a page, in pointer coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    fn is_usable(&self) -> bool {
        [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Convert a pointer position into the 0-indexed anchor cell for a widget
/// of the given span.
///
/// The page rectangle is split into `GRID_ROWS × GRID_COLS` equal cells, the
/// pointer offset is floored by the cell size, and the result is clamped so
/// the whole span stays on the grid.  Returns `None` for a degenerate
/// rectangle or non-finite pointer coordinates.
pub fn cell_from_pointer(rect: Rect, x: f64, y: f64, span: Span) -> Option<(usize, usize)> {
    if !rect.is_usable() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    let cell_w = rect.width / GRID_COLS as f64;
    let cell_h = rect.height / GRID_ROWS as f64;
    let col = clamp_cell(((x - rect.left) / cell_w).floor(), GRID_COLS, span.cols);
    let row = clamp_cell(((y - rect.top) / cell_h).floor(), GRID_ROWS, span.rows);
    Some((row, col))
}

fn clamp_cell(raw: f64, cells: usize, span: usize) -> usize {
    let max = cells.saturating_sub(span) as f64;
    raw.clamp(0.0, max) as usize
}

/// A candidate drop location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub page: usize,
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging {
        subject: WidgetId,
        target: Option<DropTarget>,
    },
}

/// Tracks the single active drag, if any.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The widget being dragged.
    pub fn subject(&self) -> Option<&WidgetId> {
        match &self.state {
            DragState::Dragging { subject, .. } => Some(subject),
            DragState::Idle => None,
        }
    }

    /// The last previewed drop target.
    pub fn target(&self) -> Option<DropTarget> {
        match &self.state {
            DragState::Dragging { target, .. } => *target,
            DragState::Idle => None,
        }
    }

    /// Idle → Dragging.  Returns `false` (and changes nothing) if a drag is
    /// already active.
    pub fn begin(&mut self, subject: WidgetId) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.state = DragState::Dragging {
            subject,
            target: None,
        };
        true
    }

    /// Dragging → Dragging with a new candidate.  Ignored while idle.
    pub fn hover(&mut self, candidate: DropTarget) -> bool {
        match &mut self.state {
            DragState::Dragging { target, .. } => {
                *target = Some(candidate);
                true
            }
            DragState::Idle => false,
        }
    }

    /// Dragging → Idle.  Returns the subject and the last hovered target.
    pub fn finish(&mut self) -> Option<(WidgetId, Option<DropTarget>)> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging { subject, target } => Some((subject, target)),
            DragState::Idle => None,
        }
    }

    /// Drop any reference to `id` (used when the subject is removed
    /// mid-drag).  Returns whether a drag was cancelled.
    pub fn forget(&mut self, id: &WidgetId) -> bool {
        if self.subject() == Some(id) {
            self.state = DragState::Idle;
            return true;
        }
        false
    }
}
