//! Page bucketing and access-count aggregation.

mod grid;
mod rank;
mod table;

pub use grid::{GRID_COLS, GRID_ROWS, GridProjection};
pub use rank::HotPage;
pub use table::PageTable;

/// 4 KiB pages
pub const PAGE_SHIFT: u32 = 12;
pub const PAGE_SIZE: u64 = 1 << PAGE_SHIFT;

/// Page index of a physical address (in-page offset discarded)
#[inline]
pub fn page_index(addr: u64) -> u64 {
    addr >> PAGE_SHIFT
}

/// First byte address of a page
#[inline]
pub fn page_base(page: u64) -> u64 {
    page << PAGE_SHIFT
}
