use std::path::PathBuf;

use gtrcoach_evaluator::pattern_detector::PatternDetector;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DetectArg {
    /// Board file (text rows top to bottom, or a JSON array of rows)
    #[arg(long)]
    board: PathBuf,
    /// Output file path for the JSON score record
    #[arg(long)]
    output: Option<PathBuf>,
    /// Scoring configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

pub(crate) fn run(arg: &DetectArg) -> anyhow::Result<()> {
    let board = util::read_board_file(&arg.board)?;
    let config = util::read_scoring_config(arg.config.as_deref())?;
    let detector = PatternDetector::new(config.pattern);

    let score = detector.detect(&board);
    eprintln!("{score}");
    Output::save_json(&score, arg.output.clone())
}
