/// Lines taken by one card, borders included
pub const CARD_HEIGHT: u16 = 5;

/// Header, section title and status bar
const CHROME_ROWS: u16 = 3;

/// Card columns for a terminal width, narrowest first
pub fn columns_for_width(width: u16) -> usize {
    match width {
        w if w >= 160 => 4,
        w if w >= 120 => 3,
        w if w >= 80 => 2,
        _ => 1,
    }
}

/// Geometry of the card grid
///
/// Cards are laid out row by row, `columns` per row. The sentinel is the line right
/// below the last card row; the feed loads the next page while it is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub columns: usize,
    /// Lines available to the grid
    pub height: u16,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            columns: 1,
            height: 0,
        }
    }
}

impl Grid {
    pub fn for_terminal(width: u16, height: u16) -> Self {
        Self {
            columns: columns_for_width(width),
            height: height.saturating_sub(CHROME_ROWS),
        }
    }

    /// Card rows that fit entirely, at least one
    pub fn full_rows(&self) -> usize {
        ((self.height / CARD_HEIGHT) as usize).max(1)
    }

    pub fn card_rows(&self, len: usize) -> usize {
        len.div_ceil(self.columns)
    }

    pub fn row_of(&self, index: usize) -> usize {
        index / self.columns
    }

    /// Largest scroll offset; one past the last card row so the sentinel can be reached
    pub fn max_offset(&self, len: usize) -> usize {
        (self.card_rows(len) + 1).saturating_sub(self.full_rows())
    }

    /// Line of the sentinel relative to the top of the grid
    pub fn sentinel_line(&self, len: usize, row_offset: usize) -> usize {
        self.card_rows(len).saturating_sub(row_offset) * CARD_HEIGHT as usize
    }

    pub fn sentinel_visible(&self, len: usize, row_offset: usize) -> bool {
        row_offset <= self.card_rows(len)
            && self.sentinel_line(len, row_offset) < self.height as usize
    }

    /// Smallest change to `row_offset` that brings the row of `selected` into view
    pub fn scroll_into_view(&self, row_offset: usize, selected: usize) -> usize {
        let row = self.row_of(selected);
        let full_rows = self.full_rows();
        if row < row_offset {
            row
        } else if row >= row_offset + full_rows {
            row + 1 - full_rows
        } else {
            row_offset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_follow_breakpoints() {
        assert_eq!(columns_for_width(60), 1);
        assert_eq!(columns_for_width(80), 2);
        assert_eq!(columns_for_width(119), 2);
        assert_eq!(columns_for_width(120), 3);
        assert_eq!(columns_for_width(200), 4);
    }

    #[test]
    fn terminal_chrome_is_subtracted() {
        let grid = Grid::for_terminal(160, 43);
        assert_eq!(grid.columns, 4);
        assert_eq!(grid.height, 40);
        assert_eq!(grid.full_rows(), 8);
    }

    #[test]
    fn card_rows_round_up() {
        let grid = Grid::for_terminal(120, 40);
        assert_eq!(grid.card_rows(0), 0);
        assert_eq!(grid.card_rows(8), 3);
        assert_eq!(grid.card_rows(9), 3);
        assert_eq!(grid.card_rows(10), 4);
    }

    #[test]
    fn sentinel_visible_when_cards_fit() {
        // 4 columns, 8 rows of room: 8 cards take two rows
        let grid = Grid::for_terminal(160, 43);
        assert!(grid.sentinel_visible(8, 0));
    }

    #[test]
    fn sentinel_hidden_below_the_fold() {
        // 1 column, 2 full rows: 8 cards run far past the bottom
        let grid = Grid::for_terminal(60, 13);
        assert!(!grid.sentinel_visible(8, 0));
        assert!(grid.sentinel_visible(8, grid.max_offset(8)));
    }

    #[test]
    fn sentinel_hidden_on_exact_fit_until_overscroll() {
        // 2 rows of room exactly filled by 2 card rows
        let grid = Grid {
            columns: 1,
            height: CARD_HEIGHT * 2,
        };
        assert!(!grid.sentinel_visible(2, 0));
        assert_eq!(grid.max_offset(2), 1);
        assert!(grid.sentinel_visible(2, 1));
    }

    #[test]
    fn unsized_grid_never_shows_sentinel() {
        let grid = Grid::default();
        assert!(!grid.sentinel_visible(0, 0));
        assert!(!grid.sentinel_visible(8, 0));
    }

    #[test]
    fn scroll_into_view_moves_minimally() {
        let grid = Grid {
            columns: 2,
            height: CARD_HEIGHT * 3,
        };
        // rows 0..3 visible
        assert_eq!(grid.scroll_into_view(0, 5), 0);
        // index 6 is row 3
        assert_eq!(grid.scroll_into_view(0, 6), 1);
        assert_eq!(grid.scroll_into_view(4, 2), 1);
    }
}
