use crate::config::{
    DEFAULT_ADDRESS_COL, DEFAULT_DPI, DEFAULT_PID_COL, DEFAULT_TOP_N, DPI_RANGE, ImageFormat,
    LoaderConfig, PidFilter,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pageheat")]
#[command(about = "Physical memory page heat map and hot-page ranking for access traces")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// More diagnostics (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print warnings and errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Draw the page access heat map (and optionally the Top-N bar chart)
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Also draw the Top-N bar chart
        #[arg(long)]
        bar: bool,

        /// Number of pages in the bar chart
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,

        /// Save images instead of opening the interactive viewer
        #[arg(long)]
        save: bool,

        /// Output directory for saved images (created if missing)
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Resolution of saved images
        #[arg(long, default_value_t = DEFAULT_DPI)]
        dpi: u32,

        /// Image format
        #[arg(long, value_enum, default_value = "png")]
        format: ImageFormat,
    },

    /// Print the hottest pages as a table
    Top {
        #[command(flatten)]
        input: InputArgs,

        /// Number of pages to print
        #[arg(long, short = 'n', default_value = "20")]
        top: usize,

        /// Output as JSON
        #[arg(long, conflicts_with = "csv")]
        json: bool,

        /// Output as CSV
        #[arg(long)]
        csv: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Options describing the trace file
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Trace CSV path
    #[arg(value_name = "CSV")]
    pub trace: PathBuf,

    /// Field delimiter (single character, `\t` for tab)
    #[arg(long, short = 'd', default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// First row is a header
    #[arg(long)]
    pub header: bool,

    /// Physical address column (0-based)
    #[arg(long, short = 'i', default_value_t = DEFAULT_ADDRESS_COL)]
    pub index: usize,

    /// PID column (0-based)
    #[arg(long, default_value_t = DEFAULT_PID_COL)]
    pub pid_index: usize,

    /// Only keep rows of these PIDs
    #[arg(long, num_args = 1.., allow_negative_numbers = true)]
    pub pid: Vec<i64>,
}

impl InputArgs {
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            delimiter: self.delimiter,
            has_header: self.header,
            address_col: self.index,
            pid_col: self.pid_index,
            pid_filter: PidFilter::new(self.pid.iter().copied()),
        }
    }
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() && c != '\n' && c != '\r' => Ok(c as u8),
                _ => Err(format!(
                    "Invalid delimiter '{}'. Use a single ASCII character, e.g. ',' ';' '\\t'",
                    s
                )),
            }
        }
    }
}

impl Cli {
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Analyze { top, dpi, .. } => {
                if *top == 0 {
                    return Err("--top must be at least 1".to_string());
                }
                if !DPI_RANGE.contains(dpi) {
                    return Err(format!(
                        "DPI must be between {} and {}, got {}",
                        DPI_RANGE.start(),
                        DPI_RANGE.end(),
                        dpi
                    ));
                }
            }
            Command::Top { top, .. } => {
                if *top == 0 {
                    return Err("--top must be at least 1".to_string());
                }
            }
            Command::Completions { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_delimiter_parsing() {
        assert_eq!(parse_delimiter(","), Ok(b','));
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert!(parse_delimiter(",,").is_err());
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::try_parse_from(["pageheat", "analyze", "trace.csv"]).unwrap();
        let Command::Analyze {
            input,
            top,
            dpi,
            bar,
            save,
            format,
            ..
        } = cli.command
        else {
            panic!("expected analyze");
        };
        let cfg = input.loader_config();
        assert_eq!(cfg.address_col, 6);
        assert_eq!(cfg.pid_col, 1);
        assert_eq!(cfg.delimiter, b',');
        assert!(cfg.pid_filter.is_none());
        assert_eq!((top, dpi, bar, save), (50, 300, false, false));
        assert_eq!(format, ImageFormat::Png);
    }

    #[test]
    fn test_multiple_pids() {
        let cli = Cli::try_parse_from([
            "pageheat", "analyze", "trace.csv", "--pid", "12", "7", "--bar",
        ])
        .unwrap();
        let Command::Analyze { input, bar, .. } = cli.command else {
            panic!("expected analyze");
        };
        assert!(bar);
        let filter = input.loader_config().pid_filter.unwrap();
        assert_eq!(filter.pids().collect::<Vec<_>>(), vec![7, 12]);
    }

    #[test]
    fn test_validate_rejects_zero_top() {
        let cli = Cli::try_parse_from(["pageheat", "top", "trace.csv", "-n", "0"]).unwrap();
        assert!(cli.validate().is_err());
    }
}
