use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::pages::{GridProjection, HotPage};
use crate::pipeline::Aggregation;
use crate::render::{bar_title, heatmap_title};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, prelude::*};
use std::io::{self, stdout};
use std::time::Duration;

use super::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Heatmap,
    HotPages,
}

/// Static viewer over one aggregation result
pub struct App {
    pub(super) view_mode: ViewMode,
    pub(super) grid: GridProjection,
    /// Ranked pages, empty when no bar chart was requested
    pub(super) hot_pages: Vec<HotPage>,
    pub(super) heatmap_title: [String; 2],
    pub(super) bar_title: Option<[String; 2]>,
    pub(super) file_name: String,
    pub(super) total_accesses: u64,
    pub(super) distinct_pages: usize,
    /// First bar shown in the hot-page view
    pub(super) bar_offset: usize,
    running: bool,
}

impl App {
    pub fn new(agg: &Aggregation, config: &AnalysisConfig) -> Self {
        let pids = config.loader.pid_filter.as_ref();
        let file_name = config
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| config.input.display().to_string());

        Self {
            view_mode: ViewMode::Heatmap,
            grid: agg.table.grid(),
            hot_pages: config.bar.map(|n| agg.table.ranked(n)).unwrap_or_default(),
            heatmap_title: heatmap_title(pids),
            bar_title: config.bar.map(|n| bar_title(n, pids)),
            file_name,
            total_accesses: agg.table.total(),
            distinct_pages: agg.table.len(),
            bar_offset: 0,
            running: true,
        }
    }

    pub fn has_bar_chart(&self) -> bool {
        self.bar_title.is_some()
    }

    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        terminal.draw(|frame| ui::render(frame, self))?;
        while self.running {
            if !event::poll(Duration::from_millis(100))? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    self.handle_key(key.code, key.modifiers);
                    terminal.draw(|frame| ui::render(frame, self))?;
                }
                Event::Resize(_, _) => {
                    terminal.draw(|frame| ui::render(frame, self))?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub(super) fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match key {
            KeyCode::Char('c') if ctrl => self.running = false,
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,

            KeyCode::Tab | KeyCode::Char('m') if self.has_bar_chart() => {
                self.view_mode = match self.view_mode {
                    ViewMode::Heatmap => ViewMode::HotPages,
                    ViewMode::HotPages => ViewMode::Heatmap,
                };
            }
            KeyCode::Char('1') => self.view_mode = ViewMode::Heatmap,
            KeyCode::Char('2') if self.has_bar_chart() => self.view_mode = ViewMode::HotPages,

            KeyCode::Char('l') | KeyCode::Right if self.view_mode == ViewMode::HotPages => {
                self.scroll_bars(1);
            }
            KeyCode::Char('h') | KeyCode::Left if self.view_mode == ViewMode::HotPages => {
                self.scroll_bars(-1);
            }
            KeyCode::Char('g') | KeyCode::Home => self.bar_offset = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.bar_offset = self.hot_pages.len().saturating_sub(1);
            }
            _ => {}
        }
    }

    fn scroll_bars(&mut self, delta: isize) {
        let max = self.hot_pages.len().saturating_sub(1);
        self.bar_offset = self.bar_offset.saturating_add_signed(delta).min(max);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LoaderConfig, PidFilter};
    use crate::pages::PageTable;
    use crate::trace::LoadStats;
    use std::path::PathBuf;

    fn app(bar: Option<usize>) -> App {
        let table = PageTable::from_addresses([0x1000, 0x1000, 0x2000, 0x3000]);
        let agg = Aggregation {
            stats: LoadStats {
                rows: 4,
                accepted: 4,
                ..LoadStats::default()
            },
            table,
        };
        let loader = LoaderConfig {
            pid_filter: PidFilter::new([5]),
            ..LoaderConfig::default()
        };
        let config =
            AnalysisConfig::new(PathBuf::from("/tmp/trace.csv"), loader, bar, None).unwrap();
        App::new(&agg, &config)
    }

    #[test]
    fn test_summary_fields() {
        let app = app(Some(2));
        assert_eq!(app.file_name, "trace.csv");
        assert_eq!(app.total_accesses, 4);
        assert_eq!(app.distinct_pages, 3);
        assert_eq!(app.hot_pages.len(), 2);
        assert_eq!(app.hot_pages[0], HotPage { page: 1, count: 2 });
        assert!(app.heatmap_title[0].contains("PID: 5"));
    }

    #[test]
    fn test_view_switching_needs_bar_chart() {
        let mut without = app(None);
        without.handle_key(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(without.view_mode, ViewMode::Heatmap);

        let mut with = app(Some(10));
        with.handle_key(KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(with.view_mode, ViewMode::HotPages);
        with.handle_key(KeyCode::Char('1'), KeyModifiers::NONE);
        assert_eq!(with.view_mode, ViewMode::Heatmap);
    }

    #[test]
    fn test_bar_scrolling_is_clamped() {
        let mut app = app(Some(10));
        app.handle_key(KeyCode::Char('2'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(app.bar_offset, 0);
        for _ in 0..10 {
            app.handle_key(KeyCode::Right, KeyModifiers::NONE);
        }
        assert_eq!(app.bar_offset, 2);
    }

    #[test]
    fn test_quit_keys() {
        let mut a = app(None);
        a.handle_key(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(!a.is_running());

        let mut b = app(None);
        b.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(!b.is_running());
    }
}
