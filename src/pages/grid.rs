use super::PageTable;

pub const GRID_ROWS: usize = 256;
pub const GRID_COLS: usize = 256;

/// Fixed 256×256 layout of page counts.
///
/// Page `p` lands at row `(p >> 8) & 0xFF`, column `p & 0xFF`. Only the low 16
/// bits of the page index select a cell, so pages that share them are summed
/// into the same cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridProjection {
    cells: Vec<u64>,
}

impl GridProjection {
    pub fn from_table(table: &PageTable) -> Self {
        let mut cells = vec![0u64; GRID_ROWS * GRID_COLS];
        for (page, count) in table.iter() {
            let (row, col) = Self::cell_of(page);
            cells[row * GRID_COLS + col] += count;
        }
        Self { cells }
    }

    /// Grid cell `(row, col)` a page index projects to
    #[inline]
    pub fn cell_of(page: u64) -> (usize, usize) {
        (((page >> 8) & 0xFF) as usize, (page & 0xFF) as usize)
    }

    pub fn get(&self, row: usize, col: usize) -> u64 {
        self.cells[row * GRID_COLS + col]
    }

    pub fn max(&self) -> u64 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().sum()
    }

    pub fn nonzero_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c > 0).count()
    }

    /// Rows of the grid, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[u64]> {
        self.cells.chunks_exact(GRID_COLS)
    }

    /// Sum the grid into a coarser `rows × cols` matrix (row-major).
    ///
    /// Each source cell contributes to exactly one output cell, so the total is
    /// preserved. Dimensions are clamped to `1..=256`.
    pub fn downsample(&self, rows: usize, cols: usize) -> Vec<u64> {
        let rows = rows.clamp(1, GRID_ROWS);
        let cols = cols.clamp(1, GRID_COLS);
        let mut out = vec![0u64; rows * cols];
        for (r, row) in self.rows().enumerate() {
            let out_r = r * rows / GRID_ROWS;
            for (c, &count) in row.iter().enumerate() {
                let out_c = c * cols / GRID_COLS;
                out[out_r * cols + out_c] += count;
            }
        }
        out
    }
}
