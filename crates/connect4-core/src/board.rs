//! Connect-Four board rules.
//!
//! The grid is row-major with row 0 at the top; pieces fall to the highest
//! row index with an empty cell. Cell values: 0 = empty, 1/2 = owning player.

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// An empty cell.
pub const EMPTY: u8 = 0;

/// The full 7×6 grid. Fixed-size on purpose: serde rejects snapshots with
/// any other dimensions.
pub type Grid = [[u8; COLS]; ROWS];

pub fn empty_grid() -> Grid {
    [[EMPTY; COLS]; ROWS]
}

/// Whether the column has room for another piece.
pub fn column_open(grid: &Grid, col: usize) -> bool {
    col < COLS && grid[0][col] == EMPTY
}

/// Drop a piece for `player` into `col`, returning the row it landed in.
///
/// Returns `None` for an out-of-range or full column; the grid is untouched
/// in that case.
pub fn drop_piece(grid: &mut Grid, col: usize, player: u8) -> Option<usize> {
    if !column_open(grid, col) {
        return None;
    }
    for row in (0..ROWS).rev() {
        if grid[row][col] == EMPTY {
            grid[row][col] = player;
            return Some(row);
        }
    }
    None
}

/// Whether the piece at (`row`, `col`) completes a run of four.
///
/// Only the four lines through the last move are scanned, so this is meant
/// to be called right after [`drop_piece`].
pub fn is_winning_move(grid: &Grid, row: usize, col: usize) -> bool {
    let player = grid[row][col];
    if player == EMPTY {
        return false;
    }

    // Horizontal and vertical: the full row / column through the move.
    if has_run(grid, player, (0..COLS).map(|c| (row, c))) {
        return true;
    }
    if has_run(grid, player, (0..ROWS).map(|r| (r, col))) {
        return true;
    }

    let (row, col) = (row as isize, col as isize);
    let (rows, cols) = (ROWS as isize, COLS as isize);

    // Diagonal, top-left to bottom-right.
    let start = -row.min(col);
    let end = (rows - row).min(cols - col);
    if has_run(
        grid,
        player,
        (start..end).map(|d| ((row + d) as usize, (col + d) as usize)),
    ) {
        return true;
    }

    // Diagonal, top-right to bottom-left.
    let start = -row.min(cols - 1 - col);
    let end = (rows - row).min(col + 1);
    has_run(
        grid,
        player,
        (start..end).map(|d| ((row + d) as usize, (col - d) as usize)),
    )
}

/// Whether every cell is occupied (a draw, if nobody has won).
pub fn is_full(grid: &Grid) -> bool {
    grid.iter().flatten().all(|&cell| cell != EMPTY)
}

fn has_run(grid: &Grid, player: u8, cells: impl Iterator<Item = (usize, usize)>) -> bool {
    let mut run = 0;
    for (r, c) in cells {
        run = if grid[r][c] == player { run + 1 } else { 0 };
        if run >= 4 {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drop a sequence of (col, player) moves, panicking on a rejected one.
    fn play(grid: &mut Grid, moves: &[(usize, u8)]) -> (usize, usize) {
        let mut last = (0, 0);
        for &(col, player) in moves {
            let row = drop_piece(grid, col, player).expect("legal move");
            last = (row, col);
        }
        last
    }

    #[test]
    fn pieces_stack_from_the_bottom() {
        let mut grid = empty_grid();
        assert_eq!(drop_piece(&mut grid, 3, 1), Some(5));
        assert_eq!(drop_piece(&mut grid, 3, 2), Some(4));
        assert_eq!(drop_piece(&mut grid, 3, 1), Some(3));
        assert_eq!(grid[5][3], 1);
        assert_eq!(grid[4][3], 2);
        assert_eq!(grid[3][3], 1);
    }

    #[test]
    fn out_of_range_column_is_rejected() {
        let mut grid = empty_grid();
        assert_eq!(drop_piece(&mut grid, COLS, 1), None);
        assert_eq!(grid, empty_grid());
    }

    #[test]
    fn full_column_is_rejected() {
        let mut grid = empty_grid();
        for i in 0..ROWS {
            assert!(drop_piece(&mut grid, 0, 1 + (i % 2) as u8).is_some());
        }
        assert!(!column_open(&grid, 0));
        assert_eq!(drop_piece(&mut grid, 0, 1), None);
    }

    #[test]
    fn horizontal_win() {
        let mut grid = empty_grid();
        let (row, col) = play(
            &mut grid,
            &[(0, 1), (0, 2), (1, 1), (1, 2), (2, 1), (2, 2), (3, 1)],
        );
        assert!(is_winning_move(&grid, row, col));
    }

    #[test]
    fn vertical_win() {
        let mut grid = empty_grid();
        let (row, col) = play(
            &mut grid,
            &[(0, 1), (1, 2), (0, 1), (1, 2), (0, 1), (1, 2), (0, 1)],
        );
        assert!(is_winning_move(&grid, row, col));
    }

    #[test]
    fn anti_diagonal_win() {
        let mut grid = empty_grid();
        // Player 1 builds (5,0) (4,1) (3,2) (2,3) with player 2 as filler.
        let (row, col) = play(
            &mut grid,
            &[
                (0, 1),
                (1, 2),
                (1, 1),
                (2, 2),
                (2, 2),
                (3, 2),
                (2, 1),
                (3, 2),
                (3, 2),
                (6, 2),
                (3, 1),
            ],
        );
        assert_eq!((row, col), (2, 3));
        assert!(is_winning_move(&grid, row, col));
    }

    #[test]
    fn main_diagonal_win() {
        let mut grid = empty_grid();
        // Player 1 builds (5,6) (4,5) (3,4) (2,3).
        let (row, col) = play(
            &mut grid,
            &[
                (6, 1),
                (5, 2),
                (5, 1),
                (4, 2),
                (4, 2),
                (3, 2),
                (4, 1),
                (3, 2),
                (3, 2),
                (0, 2),
                (3, 1),
            ],
        );
        assert_eq!((row, col), (2, 3));
        assert!(is_winning_move(&grid, row, col));
    }

    #[test]
    fn three_in_a_row_is_not_a_win() {
        let mut grid = empty_grid();
        let (row, col) = play(&mut grid, &[(0, 1), (1, 1), (2, 1)]);
        assert!(!is_winning_move(&grid, row, col));
    }

    #[test]
    fn full_grid_is_detected() {
        let mut grid = empty_grid();
        assert!(!is_full(&grid));
        // Column pattern that fills the board without any four-in-a-row
        // mattering here; we only care about fullness.
        for col in 0..COLS {
            for i in 0..ROWS {
                let player = 1 + ((i + col) % 2) as u8;
                assert!(drop_piece(&mut grid, col, player).is_some());
            }
        }
        assert!(is_full(&grid));
    }
}
