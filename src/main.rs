use anyhow::Context;
use clap::Parser;
use pageheat::cli::{Cli, Command};
use pageheat::commands::analyze::Outcome;
use pageheat::commands::top::TopFormat;
use pageheat::config::{AnalysisConfig, OutputTarget};
use pageheat::error::exit_code;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS as u8),
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(err) = e.downcast_ref::<pageheat::Error>() {
                ExitCode::from(err.exit_code() as u8)
            } else {
                ExitCode::from(exit_code::GENERAL_ERROR as u8)
            }
        }
    }
}

/// Initialize tracing subscriber for diagnostics on stderr
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(msg) = cli.validate() {
        return Err(pageheat::Error::InvalidArgument(msg)).context("Invalid arguments");
    }

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Analyze {
            input,
            bar,
            top,
            save,
            output_dir,
            dpi,
            format,
        } => {
            let output = if save {
                Some(OutputTarget::new(output_dir, format, dpi)?)
            } else {
                None
            };
            let config = AnalysisConfig::new(
                input.trace.clone(),
                input.loader_config(),
                bar.then_some(top),
                output,
            )?;

            if let Outcome::Empty(reason) = pageheat::commands::analyze::run(&config)? {
                tracing::debug!(?reason, "Rendering skipped");
            }
        }
        Command::Top {
            input,
            top,
            json,
            csv,
        } => {
            let format = TopFormat::from_flags(json, csv);
            pageheat::commands::top::run(&input.trace, &input.loader_config(), top, format)?;
        }
        Command::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "pageheat", &mut std::io::stdout());
        }
    }

    Ok(())
}
