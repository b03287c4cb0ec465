mod app;
mod ui;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::pipeline::Aggregation;

pub use app::App;

/// Show the heat map (and hot pages, if requested) in the terminal
pub fn run(agg: &Aggregation, config: &AnalysisConfig) -> Result<()> {
    let mut app = App::new(agg, config);
    app.run()
}
