//! Turning a page table into image artifacts.
//!
//! Renderers only produce bytes; [`save`] is the single place that touches
//! the filesystem, and it never creates directories.

pub mod color;
mod raster;
mod svg;

pub use raster::RasterRenderer;
pub use svg::SvgRenderer;

use crate::config::{ImageFormat, PidFilter};
use crate::error::{Error, Result};
use crate::pages::{GridProjection, HotPage};
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A backend able to draw both views
pub trait Renderer {
    fn format(&self) -> ImageFormat;

    /// Density image of the 256×256 grid
    fn heatmap(&self, grid: &GridProjection, pids: Option<&PidFilter>) -> Result<Vec<u8>>;

    /// Bar chart of already-ranked pages
    fn bar_chart(
        &self,
        pages: &[HotPage],
        top_n: usize,
        pids: Option<&PidFilter>,
    ) -> Result<Vec<u8>>;
}

/// Backend producing `format` at `dpi`
pub fn renderer_for(format: ImageFormat, dpi: u32) -> Box<dyn Renderer> {
    if format.is_raster() {
        Box::new(RasterRenderer::new(format, dpi))
    } else {
        Box::new(SvgRenderer::new(dpi))
    }
}

/// Title lines of the heat map
pub fn heatmap_title(pids: Option<&PidFilter>) -> [String; 2] {
    let first = match pids {
        Some(p) => format!("Physical Address Heatmap (PID: {})", p),
        None => "Physical Address Heatmap".to_string(),
    };
    [first, "4 KiB/page in 0x0–0xFFFFFFFFFF".to_string()]
}

/// Title lines of the bar chart
pub fn bar_title(top_n: usize, pids: Option<&PidFilter>) -> [String; 2] {
    let first = match pids {
        Some(p) => format!("Top-{} Hottest Memory Pages (PID: {})", top_n, p),
        None => format!("Top-{} Hottest Memory Pages", top_n),
    };
    [first, "4 KiB per page".to_string()]
}

/// File names for one run's renders, unique per filter and second
pub struct OutputNames {
    suffix: String,
    timestamp: String,
}

impl OutputNames {
    pub fn new(pids: Option<&PidFilter>, now: DateTime<Local>) -> Self {
        let suffix = pids
            .map(|p| p.file_suffix())
            .unwrap_or_else(|| "_all".to_string());
        Self {
            suffix,
            timestamp: now.format("%Y%m%d_%H%M%S").to_string(),
        }
    }

    pub fn heatmap(&self, format: ImageFormat) -> String {
        format!(
            "memory_heatmap{}_{}.{}",
            self.suffix,
            self.timestamp,
            format.extension()
        )
    }

    pub fn bar_chart(&self, top_n: usize, format: ImageFormat) -> String {
        format!(
            "memory_bar_top{}{}_{}.{}",
            top_n,
            self.suffix,
            self.timestamp,
            format.extension()
        )
    }
}

/// Write a rendered artifact. The parent directory must already exist.
pub fn save(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let unwritable = |source| Error::OutputUnwritable {
        path: path.to_path_buf(),
        source,
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if !parent.is_dir() {
        return Err(unwritable(io::Error::new(
            io::ErrorKind::NotFound,
            format!("directory {} does not exist", parent.display()),
        )));
    }

    fs::write(path, bytes).map_err(unwritable)?;
    Ok(path.to_path_buf())
}
