use std::{collections::BTreeMap, path::PathBuf};

use chrono::{DateTime, Utc};
use gtrcoach_engine::{GameField, PairSeed};
use gtrcoach_evaluator::{
    advisor::PlacementAdvisor,
    config::ScoringConfig,
    session::{FailureCategory, SessionOutcome},
};
use rand::Rng as _;
use serde::Serialize;

use crate::util::{self, Output};

const PROGRESS_INTERVAL: usize = 100;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Number of games to play
    #[arg(long, default_value_t = 100)]
    games: usize,
    /// Pairs per game before giving up on the fold
    #[arg(long, default_value_t = 15)]
    turns: usize,
    /// Master seed (32 hex digits); random when omitted
    #[arg(long)]
    seed: Option<PairSeed>,
    /// Output file path for the JSON report
    #[arg(long)]
    output: Option<PathBuf>,
    /// Scoring configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    generated_at: DateTime<Utc>,
    seed: PairSeed,
    games: usize,
    turn_limit: usize,
    successes: usize,
    success_rate: f64,
    /// Mean turn of fold completion over successful games.
    mean_turns_to_fold: Option<f64>,
    burst_games: usize,
    game_overs: usize,
    failures: BTreeMap<FailureCategory, usize>,
    config: ScoringConfig,
}

#[derive(Debug, Default)]
struct Tally {
    games: usize,
    successes: usize,
    turns_to_fold: usize,
    burst_games: usize,
    game_overs: usize,
    failures: BTreeMap<FailureCategory, usize>,
}

impl Tally {
    fn record(&mut self, outcome: &SessionOutcome) {
        self.games += 1;
        if let Some(turn) = outcome.fold_completed_at() {
            self.successes += 1;
            self.turns_to_fold += turn;
        }
        if outcome.burst_count() > 0 {
            self.burst_games += 1;
        }
        if outcome.is_game_over() {
            self.game_overs += 1;
        }
        if let Some(failure) = outcome.failure() {
            *self.failures.entry(failure.category).or_default() += 1;
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn success_rate(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.successes as f64 / self.games as f64
    }

    #[expect(clippy::cast_precision_loss)]
    fn mean_turns_to_fold(&self) -> Option<f64> {
        (self.successes > 0).then(|| self.turns_to_fold as f64 / self.successes as f64)
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let config = util::read_scoring_config(arg.config.as_deref())?;
    let advisor = PlacementAdvisor::from_config(&config);
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    log::info!(
        "Simulating {} games of {} turns (seed {seed})",
        arg.games,
        arg.turns
    );

    let mut seeds = seed.rng();
    let mut tally = Tally::default();
    for game in 1..=arg.games {
        let game_seed: PairSeed = seeds.random();
        let mut field = GameField::with_seed(game_seed);
        let outcome = advisor.play_session(&mut field, arg.turns);
        log::debug!(
            "game {game} (seed {game_seed}): {}",
            match outcome.fold_completed_at() {
                Some(turn) => format!("fold on turn {turn}"),
                None => "no fold".to_owned(),
            }
        );
        tally.record(&outcome);
        if game % PROGRESS_INTERVAL == 0 {
            log::info!("{game}/{} games, {} folds", arg.games, tally.successes);
        }
    }

    log::info!(
        "Success rate: {}/{} ({:.1}%)",
        tally.successes,
        tally.games,
        tally.success_rate() * 100.0
    );
    if let Some(mean) = tally.mean_turns_to_fold() {
        log::info!("Mean turns to fold: {mean:.1}");
    }
    for (category, count) in &tally.failures {
        log::info!("  {category}: {count}");
    }

    let report = SimulationReport {
        generated_at: Utc::now(),
        seed,
        games: tally.games,
        turn_limit: arg.turns,
        successes: tally.successes,
        success_rate: tally.success_rate(),
        mean_turns_to_fold: tally.mean_turns_to_fold(),
        burst_games: tally.burst_games,
        game_overs: tally.game_overs,
        failures: tally.failures,
        config,
    };
    Output::save_json(&report, arg.output.clone())
}
