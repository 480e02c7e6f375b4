//! First-fit slot search.

use crate::grid::{Area, Grid, GRID_COLS, GRID_ROWS};

/// Find the first free anchor for a `col_span × row_span` widget.
///
/// Anchors are scanned in row-major order, so the top-left-most free slot
/// wins.  Returns `None` when nothing fits (including spans larger than the
/// grid).
pub fn find_slot(grid: &Grid, col_span: usize, row_span: usize) -> Option<Area> {
    if col_span == 0 || row_span == 0 || col_span > GRID_COLS || row_span > GRID_ROWS {
        return None;
    }
    (0..=GRID_ROWS - row_span)
        .flat_map(|row| (0..=GRID_COLS - col_span).map(move |col| (row, col)))
        .map(|(row, col)| Area::new(row, col, col_span, row_span))
        .find(|area| grid.is_free(*area, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::OccupyMode;
    use crate::widget::WidgetId;

    #[test]
    fn empty_grid_returns_origin() {
        let g = Grid::new();
        let slot = find_slot(&g, 2, 1).unwrap();
        assert_eq!((slot.row, slot.col), (0, 0));
    }

    #[test]
    fn skips_occupied_origin() {
        let mut g = Grid::new();
        g.occupy(&WidgetId::from("a"), Area::new(0, 0, 1, 1), OccupyMode::Add);
        let slot = find_slot(&g, 2, 1).unwrap();
        assert_eq!((slot.row, slot.col), (0, 1));
    }

    #[test]
    fn wraps_to_next_row_when_row_is_too_narrow() {
        let mut g = Grid::new();
        g.occupy(&WidgetId::from("a"), Area::new(0, 0, 4, 1), OccupyMode::Add);
        let slot = find_slot(&g, 2, 1).unwrap();
        assert_eq!((slot.row, slot.col), (1, 0));
    }

    #[test]
    fn full_grid_has_no_slot() {
        let mut g = Grid::new();
        g.occupy(&WidgetId::from("a"), Area::new(0, 0, 5, 5), OccupyMode::Add);
        assert_eq!(find_slot(&g, 1, 1), None);
    }

    #[test]
    fn oversized_span_has_no_slot() {
        let g = Grid::new();
        assert_eq!(find_slot(&g, 6, 1), None);
        assert_eq!(find_slot(&g, 1, 0), None);
    }

    #[test]
    fn full_page_span_fits_only_on_empty_grid() {
        let g = Grid::new();
        assert_eq!(find_slot(&g, 5, 5), Some(Area::new(0, 0, 5, 5)));
    }
}
