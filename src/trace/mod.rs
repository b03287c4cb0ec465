mod address;
mod loader;

pub use address::{AddressRejection, MAX_PHYS_ADDR, parse_phys_addr};
pub use loader::{EmptyResult, LoadStats, LoadedTrace, TraceLoader};
