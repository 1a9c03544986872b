use std::path::PathBuf;

use pongevo_engine::Side;
use pongevo_evaluator::{
    cancel::{Aborted, CancellationToken},
    controller::{Controller, TrackingController},
    match_simulator::MatchReport,
};
use rand::Rng as _;
use serde::Serialize;

use crate::{command::SimulationArg, quit, util};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
enum Seat {
    Left,
    Right,
}

impl From<Seat> for Side {
    fn from(seat: Seat) -> Self {
        match seat {
            Seat::Left => Side::Left,
            Seat::Right => Side::Right,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Path to the champion file (JSON format)
    model_path: PathBuf,
    /// Champion to play against; a ball-tracking paddle if omitted
    #[clap(long)]
    opponent: Option<PathBuf>,
    /// Paddle the champion controls
    #[clap(long, default_value = "left")]
    side: Seat,
    /// Dead zone of the ball-tracking opponent, in pixels
    #[clap(long, default_value_t = 2.0)]
    dead_zone: f64,
    /// Seed for the serves; random if omitted
    #[clap(long)]
    seed: Option<u64>,
    /// Output file path for the match report
    #[clap(long)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    simulation: SimulationArg,
}

#[derive(Debug, Serialize)]
struct PlayReport<'a> {
    champion: &'a str,
    opponent: &'a str,
    champion_side: Side,
    seed: u64,
    report: MatchReport,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let simulator = arg.simulation.simulator()?;
    let champion = util::read_champion_file(&arg.model_path)?;
    let opponent_model = arg
        .opponent
        .as_ref()
        .map(util::read_champion_file)
        .transpose()?;
    let tracker = TrackingController::new(
        simulator.arena_config().paddle_height,
        arg.dead_zone,
    );
    let (opponent_name, opponent): (&str, &dyn Controller) = match &opponent_model {
        Some(model) => (model.name.as_str(), &model.network as &dyn Controller),
        None => ("tracker", &tracker as &dyn Controller),
    };

    let side = Side::from(arg.side);
    let (left, right) = match side {
        Side::Left => (&champion.network as &dyn Controller, opponent),
        Side::Right => (opponent, &champion.network as &dyn Controller),
    };

    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let cancel = CancellationToken::new();
    quit::watch_stdin(cancel.clone());

    let report = match simulator.play(left, right, seed, &cancel) {
        Ok(report) => report,
        Err(Aborted) => {
            eprintln!("Match aborted");
            return Ok(());
        }
    };

    eprintln!(
        "{} ({side:?}) vs {opponent_name} ({:?}): {:?} after {} ticks",
        champion.name,
        side.opponent(),
        report.terminal,
        report.ticks
    );
    eprintln!("  Champion fitness: {:.3}", report.fitness(side));
    eprintln!("  Opponent fitness: {:.3}", report.fitness(side.opponent()));

    util::emit_json(
        &PlayReport {
            champion: &champion.name,
            opponent: opponent_name,
            champion_side: side,
            seed,
            report,
        },
        arg.output.as_deref(),
    )
}
