use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::ensure;
use pongevo_evaluator::{
    cancel::CancellationToken,
    tournament::{TournamentConfig, TournamentEvaluator},
};
use pongevo_training::{
    checkpoint::JsonCheckpointStore,
    genetic::{GeneticSchedule, NetworkPopulation, NetworkPopulationSettings},
    orchestrator::{Trainer, TrainingOutcome},
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{command::SimulationArg, quit};

// A resumed checkpoint keeps its own population size, hidden width and GA
// parameters. The population and GA flags below only shape a fresh run.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of generations the run should reach, counting checkpointed ones
    #[clap(long, default_value_t = 50)]
    generations: usize,
    /// Number of networks per generation
    #[clap(long, default_value_t = 20)]
    population: usize,
    /// Width of the hidden layer of each network
    #[clap(long, default_value_t = 6)]
    hidden: usize,
    /// Networks copied unchanged into the next generation
    #[clap(long, default_value_t = 2)]
    elite_count: usize,
    /// Networks sampled per parent selection
    #[clap(long, default_value_t = 2)]
    tournament_size: usize,
    /// BLX-α crossover range expansion
    #[clap(long, default_value_t = 0.2)]
    blx_alpha: f64,
    /// Probability of mutating each weight
    #[clap(long, default_value_t = 0.3)]
    mutation_rate: f64,
    /// Worker threads used to play the matches of a round
    #[clap(long, default_value = "1")]
    threads: NonZeroUsize,
    /// Directory holding per-generation checkpoints
    #[clap(long, default_value = "checkpoints")]
    checkpoint_dir: PathBuf,
    /// Where to save the best network of the run
    #[clap(long, default_value = "models/champion.json")]
    output: PathBuf,
    /// Name recorded in the saved champion
    #[clap(long, default_value = "champion")]
    name: String,
    /// Seed for serves and breeding; random if omitted
    #[clap(long)]
    seed: Option<u64>,
    #[clap(flatten)]
    simulation: SimulationArg,
}

impl TrainArg {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.generations > 0, "--generations must be at least 1");
        ensure!(self.population >= 2, "--population must be at least 2");
        ensure!(self.hidden > 0, "--hidden must be at least 1");
        ensure!(
            self.elite_count < self.population,
            "--elite-count must be smaller than --population"
        );
        ensure!(
            (1..=self.population).contains(&self.tournament_size),
            "--tournament-size must be between 1 and --population"
        );
        ensure!(
            self.blx_alpha.is_finite() && self.blx_alpha >= 0.0,
            "--blx-alpha must be a non-negative number"
        );
        ensure!(
            (0.0..=1.0).contains(&self.mutation_rate),
            "--mutation-rate must be between 0 and 1"
        );
        Ok(())
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    arg.validate()?;
    let simulator = arg.simulation.simulator()?;

    let settings = NetworkPopulationSettings {
        size: arg.population,
        hidden: arg.hidden,
        schedule: GeneticSchedule {
            elite_count: arg.elite_count,
            tournament_size: arg.tournament_size,
            blx_alpha: arg.blx_alpha,
            mutation_rate: arg.mutation_rate,
        },
    };
    let evaluator = TournamentEvaluator::new(
        simulator,
        TournamentConfig {
            threads: arg.threads,
        },
    );

    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    log::info!("training seed: {seed}");
    let mut rng = Pcg32::seed_from_u64(seed);

    let cancel = CancellationToken::new();
    quit::watch_stdin(cancel.clone());

    let mut store = JsonCheckpointStore::new(&arg.checkpoint_dir, &arg.output, &arg.name);
    let trainer = Trainer::new(evaluator, arg.generations, cancel);
    let outcome = trainer.run::<NetworkPopulation, _, _>(&mut store, &settings, &mut rng)?;

    eprintln!();
    match outcome {
        TrainingOutcome::AlreadyComplete { last_generation } => {
            eprintln!(
                "Checkpoint for generation {last_generation} already reaches {} generations; nothing to train",
                arg.generations
            );
        }
        TrainingOutcome::Aborted {
            generation,
            generations_run,
        } => {
            eprintln!("Training aborted during generation {generation}");
            eprintln!("  Completed this run: {generations_run} generations");
            eprintln!("  Checkpoints: {}", store.directory().display());
        }
        TrainingOutcome::Completed {
            generations_run,
            champion,
        } => {
            eprintln!("Training completed ({generations_run} generations this run)");
            if let Some(champion) = champion {
                eprintln!("Model saved successfully");
                eprintln!("  Path: {}", store.champion_path().display());
                eprintln!("  Name: {}", arg.name);
                eprintln!("  Generation: {}", champion.generation);
                eprintln!("  Fitness: {:.3}", champion.fitness);
                eprintln!("  Hidden neurons: {}", champion.member.network().hidden());
            }
        }
    }

    Ok(())
}
