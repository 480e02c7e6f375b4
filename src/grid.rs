//! Per-page occupancy grid.
//!
//! The [`Grid`] struct is a fixed `GRID_ROWS × GRID_COLS` matrix.  Every cell
//! is either empty or holds the [`WidgetId`] of the widget covering it.  A
//! widget anchored at `(row, col)` with a `col_span × row_span` footprint
//! owns exactly the cells of that rectangle and nothing else.
//!
//! All coordinates in this module are **0-indexed**.  Widgets carry 1-based
//! positions (see [`Widget`](crate::widget::Widget)); conversion happens in
//! [`Widget::area`](crate::widget::Widget::area).

use crate::widget::WidgetId;

/// Number of rows on every page.
pub const GRID_ROWS: usize = 5;
/// Number of columns on every page.
pub const GRID_COLS: usize = 5;

/// A rectangular region of cells, anchored at its top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Area {
    /// Anchor row (0-indexed).
    pub row: usize,
    /// Anchor column (0-indexed).
    pub col: usize,
    /// Height in cells.
    pub row_span: usize,
    /// Width in cells.
    pub col_span: usize,
}

impl Area {
    pub fn new(row: usize, col: usize, col_span: usize, row_span: usize) -> Self {
        Self {
            row,
            col,
            row_span,
            col_span,
        }
    }

    /// Whether every cell of the area lies inside the grid.
    pub fn in_bounds(&self) -> bool {
        (1..=GRID_ROWS).contains(&self.row_span)
            && (1..=GRID_COLS).contains(&self.col_span)
            && self.row <= GRID_ROWS - self.row_span
            && self.col <= GRID_COLS - self.col_span
    }

    /// Iterate over every `(row, col)` covered by the area, in row-major
    /// order.  Cells outside the grid are included; ranges stop at
    /// `usize::MAX` instead of wrapping.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let Area {
            row,
            col,
            row_span,
            col_span,
        } = *self;
        (row..row.saturating_add(row_span))
            .flat_map(move |r| (col..col.saturating_add(col_span)).map(move |c| (r, c)))
    }
}

/// Whether [`Grid::occupy`] writes or clears cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupyMode {
    Add,
    Remove,
}

/// Occupancy matrix of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: [[Option<WidgetId>; GRID_COLS]; GRID_ROWS],
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self {
            cells: std::array::from_fn(|_| std::array::from_fn(|_| None)),
        }
    }

    /// Mark (or clear) every in-bounds cell of `area`.
    ///
    /// Cells outside the grid are skipped.  In [`OccupyMode::Remove`] the
    /// cells are cleared unconditionally, whatever they currently hold.
    pub fn occupy(&mut self, id: &WidgetId, area: Area, mode: OccupyMode) {
        for (r, c) in area.cells() {
            if r >= GRID_ROWS || c >= GRID_COLS {
                continue;
            }
            self.cells[r][c] = match mode {
                OccupyMode::Add => Some(id.clone()),
                OccupyMode::Remove => None,
            };
        }
    }

    /// Whether `area` lies inside the grid and every covered cell is empty
    /// or held by `ignore`.
    pub fn is_free(&self, area: Area, ignore: Option<&WidgetId>) -> bool {
        if !area.in_bounds() {
            return false;
        }
        area.cells().all(|(r, c)| match &self.cells[r][c] {
            None => true,
            Some(id) => Some(id) == ignore,
        })
    }

    /// The widget occupying `(row, col)`, or `None` for empty or
    /// out-of-bounds cells.
    pub fn widget_at(&self, row: usize, col: usize) -> Option<&WidgetId> {
        self.cells.get(row)?.get(col)?.as_ref()
    }

    /// Distinct widget ids found inside `area`, in row-major order of first
    /// appearance.  Out-of-bounds cells are ignored.
    pub fn occupants(&self, area: Area) -> Vec<&WidgetId> {
        let mut found: Vec<&WidgetId> = Vec::new();
        for (r, c) in area.cells() {
            if let Some(id) = self.widget_at(r, c) {
                if !found.contains(&id) {
                    found.push(id);
                }
            }
        }
        found
    }

    /// Every `(row, col)` currently holding `id`, in row-major order.
    pub fn cells_of(&self, id: &WidgetId) -> Vec<(usize, usize)> {
        Area::new(0, 0, GRID_COLS, GRID_ROWS)
            .cells()
            .filter(|&(r, c)| self.cells[r][c].as_ref() == Some(id))
            .collect()
    }

    /// Whether no cell is occupied.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_none)
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> WidgetId {
        WidgetId::from(s)
    }

    #[test]
    fn new_grid_is_empty() {
        let g = Grid::new();
        assert!(g.is_empty());
        assert_eq!(g.widget_at(0, 0), None);
        assert_eq!(g.widget_at(4, 4), None);
    }

    #[test]
    fn occupy_marks_exact_rectangle() {
        let mut g = Grid::new();
        g.occupy(&id("a"), Area::new(1, 2, 2, 3), OccupyMode::Add);
        assert_eq!(
            g.cells_of(&id("a")),
            vec![(1, 2), (1, 3), (2, 2), (2, 3), (3, 2), (3, 3)]
        );
    }

    #[test]
    fn occupy_remove_clears_cells() {
        let mut g = Grid::new();
        let area = Area::new(0, 0, 2, 2);
        g.occupy(&id("a"), area, OccupyMode::Add);
        g.occupy(&id("a"), area, OccupyMode::Remove);
        assert!(g.is_empty());
    }

    #[test]
    fn occupy_skips_out_of_bounds_cells() {
        let mut g = Grid::new();
        g.occupy(&id("a"), Area::new(4, 4, 2, 2), OccupyMode::Add);
        assert_eq!(g.cells_of(&id("a")), vec![(4, 4)]);
    }

    #[test]
    fn is_free_rejects_out_of_bounds() {
        let g = Grid::new();
        assert!(!g.is_free(Area::new(4, 4, 2, 1), None));
        assert!(!g.is_free(Area::new(0, 0, 6, 1), None));
        assert!(g.is_free(Area::new(4, 3, 2, 1), None));
    }

    #[test]
    fn far_away_anchors_are_out_of_bounds() {
        let g = Grid::new();
        let far = Area::new(usize::MAX, 0, 1, 2);
        assert!(!far.in_bounds());
        assert!(!g.is_free(far, None));
        assert!(!Area::new(0, usize::MAX - 1, 3, 1).in_bounds());
        assert!(!Area::new(0, 0, usize::MAX, 1).in_bounds());
        assert_eq!(far.cells().count(), 0);
    }

    #[test]
    fn occupy_ignores_far_away_anchors() {
        let mut g = Grid::new();
        g.occupy(&id("a"), Area::new(usize::MAX - 1, 3, 1, 2), OccupyMode::Add);
        assert!(g.is_empty());
        assert!(g.occupants(Area::new(usize::MAX, usize::MAX, 2, 2)).is_empty());
    }

    #[test]
    fn is_free_respects_ignore_id() {
        let mut g = Grid::new();
        g.occupy(&id("a"), Area::new(0, 0, 1, 1), OccupyMode::Add);
        let area = Area::new(0, 0, 2, 1);
        assert!(!g.is_free(area, None));
        assert!(!g.is_free(area, Some(&id("b"))));
        assert!(g.is_free(area, Some(&id("a"))));
    }

    #[test]
    fn widget_at_out_of_bounds_is_none() {
        let mut g = Grid::new();
        g.occupy(&id("a"), Area::new(0, 0, 5, 5), OccupyMode::Add);
        assert_eq!(g.widget_at(5, 0), None);
        assert_eq!(g.widget_at(0, 5), None);
        assert_eq!(g.widget_at(2, 2), Some(&id("a")));
    }

    #[test]
    fn occupants_are_distinct() {
        let mut g = Grid::new();
        g.occupy(&id("a"), Area::new(0, 0, 2, 1), OccupyMode::Add);
        g.occupy(&id("b"), Area::new(1, 0, 1, 1), OccupyMode::Add);
        let found = g.occupants(Area::new(0, 0, 2, 2));
        assert_eq!(found, vec![&id("a"), &id("b")]);
    }
}
