use crate::config::{AnalysisConfig, OutputTarget};
use crate::error::{Error, Result};
use crate::pipeline::{Aggregation, aggregate_trace};
use crate::render::{self, OutputNames, Renderer};
use crate::trace::EmptyResult;
use crate::tui;
use chrono::{DateTime, Local};
use std::fs;
use std::path::PathBuf;

/// How an `analyze` run ended
#[derive(Debug)]
pub enum Outcome {
    /// Images written to disk
    Saved(SavedRenders),
    /// Shown in the interactive viewer
    Viewed,
    /// Nothing to draw
    Empty(EmptyResult),
}

#[derive(Debug)]
pub struct SavedRenders {
    pub heatmap: PathBuf,
    pub bar_chart: Option<PathBuf>,
}

pub fn run(config: &AnalysisConfig) -> Result<Outcome> {
    let agg = aggregate_trace(&config.input, &config.loader)?;

    if let Some(reason) = agg.empty_reason() {
        match (&config.loader.pid_filter, reason) {
            (Some(pids), EmptyResult::NoRowsForFilter) => {
                tracing::warn!("No data found for PID {}, nothing to render", pids)
            }
            _ => tracing::warn!("{}, nothing to render", capitalize(&reason.to_string())),
        }
        return Ok(Outcome::Empty(reason));
    }

    match &config.output {
        Some(target) => {
            // The output directory is ours to create; renderers never do it
            fs::create_dir_all(&target.dir).map_err(|source| Error::OutputUnwritable {
                path: target.dir.clone(),
                source,
            })?;
            let renderer = render::renderer_for(target.format, target.dpi);
            let saved = save_renders(&agg, config, target, renderer.as_ref(), Local::now())?;
            tracing::info!("All images saved to directory: {}", target.dir.display());
            Ok(Outcome::Saved(saved))
        }
        None => {
            tui::run(&agg, config)?;
            Ok(Outcome::Viewed)
        }
    }
}

/// Render and write the heat map, plus the bar chart when one was requested
pub fn save_renders(
    agg: &Aggregation,
    config: &AnalysisConfig,
    target: &OutputTarget,
    renderer: &dyn Renderer,
    now: DateTime<Local>,
) -> Result<SavedRenders> {
    let pids = config.loader.pid_filter.as_ref();
    let names = OutputNames::new(pids, now);

    let heatmap_path = target.dir.join(names.heatmap(renderer.format()));
    let heatmap = render::save(&heatmap_path, &renderer.heatmap(&agg.table.grid(), pids)?)?;
    tracing::info!("Heatmap saved to: {}", heatmap.display());

    let bar_chart = match config.bar {
        Some(top_n) => {
            let pages = agg.table.ranked(top_n);
            let path = target.dir.join(names.bar_chart(top_n, renderer.format()));
            let saved = render::save(&path, &renderer.bar_chart(&pages, top_n, pids)?)?;
            tracing::info!("Bar chart saved to: {}", saved.display());
            Some(saved)
        }
        None => None,
    };

    Ok(SavedRenders { heatmap, bar_chart })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImageFormat, LoaderConfig, PidFilter};
    use chrono::TimeZone;
    use std::io::Write;

    fn setup(contents: &str, pids: &[i64], bar: Option<usize>) -> (tempfile::TempDir, AnalysisConfig) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("trace.csv");
        fs::File::create(&input)
            .unwrap()
            .write_all(contents.as_bytes())
            .unwrap();
        let loader = LoaderConfig {
            address_col: 1,
            pid_col: 0,
            pid_filter: PidFilter::new(pids.iter().copied()),
            ..LoaderConfig::default()
        };
        let output = OutputTarget::new(dir.path().join("out"), ImageFormat::Svg, 72).unwrap();
        let config = AnalysisConfig::new(input, loader, bar, Some(output)).unwrap();
        (dir, config)
    }

    #[test]
    fn test_saves_both_views() {
        let (_dir, config) = setup("1,0x1000\n1,0x1000\n1,0x5000\n", &[1], Some(50));
        let Outcome::Saved(saved) = run(&config).unwrap() else {
            panic!("expected saved renders");
        };
        let name = saved.heatmap.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("memory_heatmap_pid_1_"));
        assert!(name.ends_with(".svg"));
        let bar = saved.bar_chart.unwrap();
        assert!(
            bar.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("memory_bar_top50_pid_1_")
        );
        let svg = fs::read_to_string(bar).unwrap();
        assert!(svg.find("0x0000001000").unwrap() < svg.find("0x0000005000").unwrap());
    }

    #[test]
    fn test_heatmap_only_without_bar() {
        let (_dir, config) = setup("1,0x1000\n", &[], None);
        let Outcome::Saved(saved) = run(&config).unwrap() else {
            panic!("expected saved renders");
        };
        assert!(saved.bar_chart.is_none());
        assert!(saved.heatmap.to_string_lossy().contains("_all_"));
    }

    #[test]
    fn test_empty_filter_skips_rendering() {
        let (dir, config) = setup("1,0x1000\n2,0x2000\n", &[999], Some(10));
        let outcome = run(&config).unwrap();
        assert!(matches!(outcome, Outcome::Empty(EmptyResult::NoRowsForFilter)));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let (dir, config) = setup("1,0x1000\n", &[], None);
        let agg = aggregate_trace(&config.input, &config.loader).unwrap();
        let target = OutputTarget::new(dir.path().join("missing"), ImageFormat::Svg, 72).unwrap();
        let now = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let renderer = render::SvgRenderer::new(72);
        let err = save_renders(&agg, &config, &target, &renderer, now).unwrap_err();
        assert!(matches!(err, Error::OutputUnwritable { .. }));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("no rows"), "No rows");
        assert_eq!(capitalize(""), "");
    }
}
