use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::ensure;
use pongevo_evaluator::{
    cancel::{Aborted, CancellationToken},
    controller::Controller,
    tournament::{Entrant, RoundSummary, TournamentConfig, TournamentEvaluator},
};
use pongevo_training::network::Network;
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{command::SimulationArg, quit, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TournamentArg {
    /// Champion files (JSON format) taking part
    #[clap(required = true, num_args = 2..)]
    model_paths: Vec<PathBuf>,
    /// Worker threads used to play the matches
    #[clap(long, default_value = "1")]
    threads: NonZeroUsize,
    /// Seed for the serves; random if omitted
    #[clap(long)]
    seed: Option<u64>,
    /// Output file path for the standings
    #[clap(long)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    simulation: SimulationArg,
}

#[derive(Debug)]
struct ModelEntrant {
    name: String,
    path: PathBuf,
    network: Network,
    fitness: f64,
}

impl Entrant for ModelEntrant {
    fn controller(&self) -> &dyn Controller {
        &self.network
    }

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

#[derive(Debug, Serialize)]
struct Standing {
    rank: usize,
    name: String,
    path: PathBuf,
    fitness: f64,
}

#[derive(Debug, Serialize)]
struct Standings {
    seed: u64,
    summary: RoundSummary,
    standings: Vec<Standing>,
}

pub(crate) fn run(arg: &TournamentArg) -> anyhow::Result<()> {
    ensure!(
        arg.model_paths.len() >= 2,
        "a tournament needs at least two champions"
    );
    let simulator = arg.simulation.simulator()?;

    let mut entrants = arg
        .model_paths
        .iter()
        .map(|path| {
            let model = util::read_champion_file(path)?;
            Ok(ModelEntrant {
                name: model.name,
                path: path.clone(),
                network: model.network,
                fitness: 0.0,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = Pcg32::seed_from_u64(seed);
    let cancel = CancellationToken::new();
    quit::watch_stdin(cancel.clone());

    let evaluator = TournamentEvaluator::new(
        simulator,
        TournamentConfig {
            threads: arg.threads,
        },
    );
    let summary = match evaluator.evaluate(&mut entrants, &mut rng, &cancel) {
        Ok(summary) => summary,
        Err(Aborted) => {
            eprintln!("Tournament aborted");
            return Ok(());
        }
    };

    entrants.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    eprintln!("Standings ({} matches):", summary.matches);
    for (i, entrant) in entrants.iter().enumerate() {
        eprintln!(
            "  {:2}: {} ({}) => {:.3}",
            i + 1,
            entrant.name,
            entrant.path.display(),
            entrant.fitness
        );
    }

    let standings = Standings {
        seed,
        summary,
        standings: entrants
            .into_iter()
            .enumerate()
            .map(|(i, entrant)| Standing {
                rank: i + 1,
                name: entrant.name,
                path: entrant.path,
                fitness: entrant.fitness,
            })
            .collect(),
    };
    util::emit_json(&standings, arg.output.as_deref())
}
