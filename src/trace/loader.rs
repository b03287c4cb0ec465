use super::address::{AddressRejection, parse_phys_addr};
use crate::config::LoaderConfig;
use crate::error::{Error, Result};
use csv::ByteRecord;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Per-run counters of included and excluded rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows seen (header and blank lines excluded)
    pub rows: u64,
    /// Rows whose PID is not in the filter
    pub filtered_out: u64,
    /// Rows whose PID field is not an integer (only checked when filtering)
    pub bad_pid: u64,
    /// Rows with fewer fields than the configured columns need
    pub short_rows: u64,
    pub missing_prefix: u64,
    pub invalid_hex: u64,
    pub out_of_range: u64,
    /// Rows that produced a valid address
    pub accepted: u64,
    pub filter_applied: bool,
}

/// Why a loaded trace produced no addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyResult {
    /// A PID filter was given and no row matched it
    NoRowsForFilter,
    /// Rows passed the filter (or there was none) but no address was valid
    NoValidAddresses,
}

impl fmt::Display for EmptyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyResult::NoRowsForFilter => write!(f, "no rows match the requested PID filter"),
            EmptyResult::NoValidAddresses => write!(f, "no valid memory address data found"),
        }
    }
}

impl LoadStats {
    /// Rows passing the PID filter (all rows when unfiltered)
    pub fn matched(&self) -> u64 {
        self.rows - self.filtered_out - self.bad_pid - self.short_rows
    }

    pub fn rejected_addresses(&self) -> u64 {
        self.missing_prefix + self.invalid_hex + self.out_of_range
    }

    pub fn excluded(&self) -> u64 {
        self.filtered_out + self.bad_pid + self.short_rows + self.rejected_addresses()
    }

    pub fn empty_reason(&self) -> Option<EmptyResult> {
        if self.accepted > 0 {
            None
        } else if self.filter_applied && self.matched() == 0 {
            Some(EmptyResult::NoRowsForFilter)
        } else {
            Some(EmptyResult::NoValidAddresses)
        }
    }

    fn reject(&mut self, reason: AddressRejection) {
        match reason {
            AddressRejection::MissingPrefix => self.missing_prefix += 1,
            AddressRejection::InvalidHex => self.invalid_hex += 1,
            AddressRejection::OutOfRange => self.out_of_range += 1,
        }
    }
}

/// Valid addresses of a trace in source order
#[derive(Debug, Clone)]
pub struct LoadedTrace {
    pub addresses: Vec<u64>,
    pub stats: LoadStats,
}

/// Streams a delimited trace file, reading only the address and PID columns
pub struct TraceLoader {
    config: LoaderConfig,
}

impl TraceLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load all valid addresses of `path` into memory
    pub fn load(&self, path: &Path) -> Result<LoadedTrace> {
        let mut addresses = Vec::new();
        let stats = self.for_each_address(path, |addr| addresses.push(addr))?;
        Ok(LoadedTrace { addresses, stats })
    }

    /// Call `sink` with every valid, filtered address of `path`, in row order
    pub fn for_each_address<F>(&self, path: &Path, sink: F) -> Result<LoadStats>
    where
        F: FnMut(u64),
    {
        let file = File::open(path).map_err(|source| Error::InputUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        self.scan(file, sink).map_err(|e| match e {
            Error::Io(source) => Error::InputUnreadable {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Same as [`for_each_address`](Self::for_each_address) over any reader
    pub fn scan<R, F>(&self, reader: R, mut sink: F) -> Result<LoadStats>
    where
        R: Read,
        F: FnMut(u64),
    {
        let cfg = &self.config;
        tracing::debug!(
            address_col = cfg.address_col,
            pid_col = cfg.pid_col,
            "Loading trace columns"
        );

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(cfg.delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut stats = LoadStats {
            filter_applied: cfg.pid_filter.is_some(),
            ..LoadStats::default()
        };
        let mut record = ByteRecord::new();
        let mut first = true;

        while reader.read_byte_record(&mut record).map_err(read_error)? {
            if first {
                first = false;
                let columns = record.len();
                check_column("address", cfg.address_col, columns)?;
                check_column("pid", cfg.pid_col, columns)?;
                tracing::debug!(columns, "Detected column count");
                if cfg.has_header {
                    continue;
                }
            }

            stats.rows += 1;
            let (Some(addr_field), Some(pid_field)) =
                (record.get(cfg.address_col), record.get(cfg.pid_col))
            else {
                stats.short_rows += 1;
                continue;
            };

            if let Some(filter) = &cfg.pid_filter {
                match String::from_utf8_lossy(pid_field).parse::<i64>() {
                    Ok(pid) if filter.contains(pid) => {}
                    Ok(_) => {
                        stats.filtered_out += 1;
                        continue;
                    }
                    Err(_) => {
                        stats.bad_pid += 1;
                        continue;
                    }
                }
            }

            match parse_phys_addr(&String::from_utf8_lossy(addr_field)) {
                Ok(addr) => {
                    stats.accepted += 1;
                    sink(addr);
                }
                Err(reason) => stats.reject(reason),
            }
        }

        if let Some(filter) = &cfg.pid_filter {
            tracing::debug!(
                pids = %filter,
                matched = stats.matched(),
                "After filtering"
            );
        }
        tracing::debug!(
            rows = stats.rows,
            accepted = stats.accepted,
            excluded = stats.excluded(),
            "Trace loaded"
        );

        Ok(stats)
    }
}

fn check_column(which: &'static str, index: usize, columns: usize) -> Result<()> {
    if index >= columns {
        return Err(Error::ColumnOutOfRange {
            which,
            index,
            columns,
        });
    }
    Ok(())
}

/// Byte records never fail UTF-8 checks, so anything but I/O is malformed framing
fn read_error(err: csv::Error) -> Error {
    match err.into_kind() {
        csv::ErrorKind::Io(source) => Error::Io(source),
        other => Error::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("malformed trace record: {other:?}"),
        )),
    }
}
