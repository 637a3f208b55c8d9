use clap::{Parser, Subcommand};
use flexi_logger::{AdaptiveFormat, Logger};

use self::{advise::AdviseArg, detect::DetectArg, simulate::SimulateArg};

mod advise;
mod detect;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log specification (e.g. `info`, `debug`, `gtrcoach_evaluator=trace`)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Rank the placements of the current pair on a board
    Advise(#[clap(flatten)] AdviseArg),
    /// Detect the fold on a board and print its score record
    Detect(#[clap(flatten)] DetectArg),
    /// Follow the advice over random pair sequences and report how often the fold is built
    Simulate(#[clap(flatten)] SimulateArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let _logger = Logger::try_with_env_or_str(&args.log_level)?
        .log_to_stderr()
        .adaptive_format_for_stderr(AdaptiveFormat::Default)
        .start()?;

    match args.mode {
        Mode::Advise(arg) => advise::run(&arg)?,
        Mode::Detect(arg) => detect::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
    }
    Ok(())
}
