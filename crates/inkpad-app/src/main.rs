//! Main application entry point (native).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use inkpad_app::{AppError, ReplayOptions, run_replay};

/// Inkpad headless host.
#[derive(Parser, Debug)]
#[command(name = "inkpad", version, about = "Replay Inkpad drawing sessions without a window")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a recorded device-event script.
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// Script file (JSON).
    #[arg(value_name = "SCRIPT.json")]
    script: PathBuf,

    /// Surface configuration file (JSON).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stroke document to start from.
    #[arg(long, value_name = "FILE")]
    load: Option<PathBuf>,

    /// Write the final frame as SVG.
    #[arg(long, value_name = "FILE")]
    svg: Option<PathBuf>,

    /// Write the final stroke document.
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,
}

impl From<ReplayArgs> for ReplayOptions {
    fn from(args: ReplayArgs) -> Self {
        Self {
            script: args.script,
            config: args.config,
            load: args.load,
            svg: args.svg,
            save: args.save,
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Replay(args) => {
            let report = run_replay(&args.into())?;
            println!(
                "{} events, {} outgoing changes, {} strokes",
                report.events,
                report.outgoing.len(),
                report.strokes.len()
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Inkpad");

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
