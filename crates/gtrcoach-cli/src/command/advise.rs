use std::path::PathBuf;

use gtrcoach_engine::Piece;
use gtrcoach_evaluator::advisor::{PlacementAdvice, PlacementAdvisor};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AdviseArg {
    /// Board file (text rows top to bottom, or a JSON array of rows)
    #[arg(long)]
    board: PathBuf,
    /// Pair in play, primary first (e.g. `RG`)
    #[arg(long)]
    current: Piece,
    /// Pair after the current one, enables lookahead
    #[arg(long)]
    next: Option<Piece>,
    /// Number of ranked placements to show
    #[arg(long, default_value_t = 5)]
    top: usize,
    /// Print the full advice as JSON
    #[arg(long)]
    json: bool,
    /// Scoring configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

pub(crate) fn run(arg: &AdviseArg) -> anyhow::Result<()> {
    let board = util::read_board_file(&arg.board)?;
    let config = util::read_scoring_config(arg.config.as_deref())?;
    let advisor = PlacementAdvisor::from_config(&config);

    let advice = advisor.advise(&board, &arg.current, arg.next.as_ref());
    if arg.json {
        return Output::stdout().write_json(&advice);
    }

    print!("{board}");
    println!();
    print_advice(&advice, arg.top);
    Ok(())
}

fn print_advice(advice: &PlacementAdvice, top: usize) {
    println!("Phase: {} ({})", advice.phase, advice.phase_message);
    if advice.best.is_none() {
        println!("No placement fits the current pair.");
        return;
    }

    println!(
        "{:>4} {:>6} {:>8} {:>15} {:>8} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7}",
        "rank", "column", "rotation", "landing", "total", "fold", "tail", "conn", "height",
        "chain", "look"
    );
    for (rank, candidate) in advice.ranked.iter().take(top).enumerate() {
        let [primary, secondary] = candidate.landing.positions();
        let landing = format!(
            "({},{}) ({},{})",
            primary.x, primary.y, secondary.x, secondary.y
        );
        let terms = &candidate.terms;
        println!(
            "{:>4} {:>6} {:>8} {:>15} {:>8.1} {:>7.1} {:>7.1} {:>7.1} {:>7.1} {:>7.1} {:>7.1}",
            rank + 1,
            candidate.placement.column(),
            candidate.placement.rotation().as_u8(),
            landing,
            candidate.total_score,
            terms.fold_progress,
            terms.chain_tail,
            terms.connectivity,
            terms.height,
            terms.chain_simulation,
            terms.lookahead,
        );
    }
}
