use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_DELIMITER: u8 = b',';
pub const DEFAULT_ADDRESS_COL: usize = 6;
pub const DEFAULT_PID_COL: usize = 1;
pub const DEFAULT_TOP_N: usize = 50;
pub const DEFAULT_DPI: u32 = 300;
pub const DPI_RANGE: std::ops::RangeInclusive<u32> = 10..=2400;

/// Set of process IDs a trace is restricted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PidFilter {
    pids: BTreeSet<i64>,
}

impl PidFilter {
    /// Build a filter from a PID list. Returns `None` for an empty list,
    /// since "no PIDs given" means "no filter".
    pub fn new(pids: impl IntoIterator<Item = i64>) -> Option<Self> {
        let pids: BTreeSet<i64> = pids.into_iter().collect();
        if pids.is_empty() {
            None
        } else {
            Some(Self { pids })
        }
    }

    pub fn contains(&self, pid: i64) -> bool {
        self.pids.contains(&pid)
    }

    /// PIDs in ascending order
    pub fn pids(&self) -> impl Iterator<Item = i64> + '_ {
        self.pids.iter().copied()
    }

    /// Suffix used in output file names, e.g. `_pid_1_2`
    pub fn file_suffix(&self) -> String {
        let joined: Vec<String> = self.pids().map(|p| p.to_string()).collect();
        format!("_pid_{}", joined.join("_"))
    }
}

impl fmt::Display for PidFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.pids().map(|p| p.to_string()).collect();
        write!(f, "{}", joined.join(", "))
    }
}

/// How to read the trace table
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub delimiter: u8,
    pub has_header: bool,
    pub address_col: usize,
    pub pid_col: usize,
    pub pid_filter: Option<PidFilter>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            has_header: false,
            address_col: DEFAULT_ADDRESS_COL,
            pid_col: DEFAULT_PID_COL,
            pid_filter: None,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpg,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Svg => "svg",
        }
    }

    /// Whether the format is a pixel grid rather than vector markup
    pub fn is_raster(self) -> bool {
        !matches!(self, ImageFormat::Svg)
    }
}

/// Where and how saved renders are written
#[derive(Debug, Clone)]
pub struct OutputTarget {
    pub dir: PathBuf,
    pub format: ImageFormat,
    pub dpi: u32,
}

impl OutputTarget {
    pub fn new(dir: PathBuf, format: ImageFormat, dpi: u32) -> Result<Self> {
        if !DPI_RANGE.contains(&dpi) {
            return Err(Error::InvalidArgument(format!(
                "DPI must be between {} and {}, got {}",
                DPI_RANGE.start(),
                DPI_RANGE.end(),
                dpi
            )));
        }
        Ok(Self { dir, format, dpi })
    }
}

/// Full configuration of one `analyze` run
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub loader: LoaderConfig,
    /// Top-N for the bar chart, `None` when no bar chart was requested
    pub bar: Option<usize>,
    /// Save target, `None` for the interactive viewer
    pub output: Option<OutputTarget>,
}

impl AnalysisConfig {
    pub fn new(
        input: PathBuf,
        loader: LoaderConfig,
        bar: Option<usize>,
        output: Option<OutputTarget>,
    ) -> Result<Self> {
        if bar == Some(0) {
            return Err(Error::InvalidArgument("Top-N must be at least 1".to_string()));
        }
        Ok(Self {
            input,
            loader,
            bar,
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pid_list_is_no_filter() {
        assert!(PidFilter::new(Vec::new()).is_none());
    }

    #[test]
    fn test_pid_filter_sorted_and_deduplicated() {
        let filter = PidFilter::new([42, 7, 42]).unwrap();
        assert!(filter.contains(7));
        assert!(!filter.contains(8));
        assert_eq!(filter.pids().collect::<Vec<_>>(), vec![7, 42]);
        assert_eq!(filter.to_string(), "7, 42");
        assert_eq!(filter.file_suffix(), "_pid_7_42");
    }

    #[test]
    fn test_dpi_bounds() {
        assert!(OutputTarget::new(PathBuf::from("."), ImageFormat::Svg, 300).is_ok());
        assert!(OutputTarget::new(PathBuf::from("."), ImageFormat::Svg, 0).is_err());
        assert!(OutputTarget::new(PathBuf::from("."), ImageFormat::Svg, 5000).is_err());
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(ImageFormat::default(), ImageFormat::Png);
        assert_eq!(ImageFormat::Png.extension(), "png");
        assert_eq!(ImageFormat::Jpg.extension(), "jpg");
        assert_eq!(ImageFormat::Svg.extension(), "svg");
        assert!(ImageFormat::Jpg.is_raster());
        assert!(!ImageFormat::Svg.is_raster());
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let err = AnalysisConfig::new(
            PathBuf::from("t.csv"),
            LoaderConfig::default(),
            Some(0),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
