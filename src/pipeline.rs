use crate::config::LoaderConfig;
use crate::error::Result;
use crate::pages::PageTable;
use crate::trace::{EmptyResult, LoadStats, TraceLoader};
use std::path::Path;

/// Page table of one trace together with the loader counters
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub table: PageTable,
    pub stats: LoadStats,
}

impl Aggregation {
    /// Why there is nothing to render, if the table is empty
    pub fn empty_reason(&self) -> Option<EmptyResult> {
        if self.table.is_empty() {
            Some(
                self.stats
                    .empty_reason()
                    .unwrap_or(EmptyResult::NoValidAddresses),
            )
        } else {
            None
        }
    }
}

/// Stream `path` straight into a page table without buffering the addresses
pub fn aggregate_trace(path: &Path, config: &LoaderConfig) -> Result<Aggregation> {
    let loader = TraceLoader::new(config.clone());
    let mut table = PageTable::new();
    let stats = loader.for_each_address(path, |addr| table.record(addr))?;

    tracing::info!(
        "Total processed {} memory addresses ({} rows excluded)",
        stats.accepted,
        stats.excluded()
    );
    tracing::info!("Found {} different memory pages", table.len());
    debug_assert_eq!(table.total(), stats.accepted);

    Ok(Aggregation { table, stats })
}
