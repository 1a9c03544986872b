use anyhow::Context as _;
use clap::{Parser, Subcommand};
use pongevo_engine::ArenaConfig;
use pongevo_evaluator::match_simulator::{DurationMode, MatchConfig, MatchSimulator};

use self::{play::PlayArg, tournament::TournamentArg, train::TrainArg};

mod play;
mod tournament;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve paddle networks, resuming from the latest checkpoint
    Train(#[clap(flatten)] TrainArg),
    /// Play one headless match with a trained champion
    Play(#[clap(flatten)] PlayArg),
    /// Rank trained champions in a round-robin tournament
    Tournament(#[clap(flatten)] TournamentArg),
}

/// Match rules shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulationArg {
    /// Left-paddle hits that end a rally
    #[clap(long, default_value_t = 50)]
    max_hits: u32,
    /// Measure match duration in simulated ticks at this rate instead of wall-clock seconds
    #[clap(long)]
    ticks_per_second: Option<f64>,
}

impl SimulationArg {
    pub(crate) fn simulator(&self) -> anyhow::Result<MatchSimulator> {
        let config = MatchConfig {
            max_hits: self.max_hits,
            duration: match self.ticks_per_second {
                Some(ticks_per_second) => DurationMode::Ticks { ticks_per_second },
                None => DurationMode::WallClock,
            },
        };
        MatchSimulator::new(ArenaConfig::default(), config)
            .context("Invalid simulation configuration")
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Tournament(arg) => tournament::run(&arg)?,
    }
    Ok(())
}
