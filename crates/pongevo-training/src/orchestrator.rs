//! Generation loop with checkpoint resume.
//!
//! Generations are numbered from zero. A run targeting `T` generations
//! evaluates generations `0..T`. When the store already holds a checkpoint
//! for generation `g`:
//!
//! - if `g + 1 >= T`, nothing is evaluated and the run is already complete;
//! - otherwise the checkpointed population is evaluated as generation `g + 1`
//!   and the run continues to `T - 1`, i.e. `T - (g + 1)` more generations.
//!
//! A checkpoint that cannot be restored is discarded with a warning and the run
//! starts from a fresh population.

use chrono::Utc;
use pongevo_evaluator::{
    cancel::{Aborted, CancellationToken},
    tournament::{Entrant, TournamentEvaluator},
};
use rand::Rng;

use crate::{
    checkpoint::{Champion, Checkpoint, CheckpointStore, TrainingError},
    genetic::FitnessStats,
    population::Population,
};

#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum TrainingOutcome<M> {
    /// The latest checkpoint already covers the target generation count.
    AlreadyComplete { last_generation: usize },
    Completed {
        generations_run: usize,
        champion: Option<Champion<M>>,
    },
    /// An abort was requested while `generation` was being evaluated.
    Aborted {
        generation: usize,
        generations_run: usize,
    },
}

/// Per-run training context.
#[derive(Debug, Clone)]
pub struct Trainer {
    evaluator: TournamentEvaluator,
    target_generations: usize,
    cancel: CancellationToken,
}

impl Trainer {
    #[must_use]
    pub fn new(
        evaluator: TournamentEvaluator,
        target_generations: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            evaluator,
            target_generations,
            cancel,
        }
    }

    #[must_use]
    pub fn target_generations(&self) -> usize {
        self.target_generations
    }

    /// Number of generations still to evaluate after a checkpoint for `last_generation`.
    #[must_use]
    pub fn remaining_after(&self, last_generation: usize) -> usize {
        self.target_generations
            .saturating_sub(last_generation + 1)
    }

    pub fn run<P, S, R>(
        &self,
        store: &mut S,
        settings: &P::Settings,
        rng: &mut R,
    ) -> Result<TrainingOutcome<P::Member>, TrainingError>
    where
        P: Population,
        S: CheckpointStore<P>,
        R: Rng + ?Sized,
    {
        let (mut population, start, mut best) = match store.find_latest() {
            Some((_, last_generation)) if self.remaining_after(last_generation) == 0 => {
                log::info!(
                    "checkpoint for generation {last_generation} reaches target of {} generations, nothing to do",
                    self.target_generations
                );
                return Ok(TrainingOutcome::AlreadyComplete { last_generation });
            }
            Some((handle, last_generation)) => match store.restore(&handle) {
                Ok(checkpoint) => {
                    log::info!(
                        "resuming from generation {last_generation}, {} generations remaining",
                        self.remaining_after(last_generation)
                    );
                    if !checkpoint.population.matches_settings(settings) {
                        log::info!(
                            "population settings differ from the checkpoint, keeping the checkpointed population"
                        );
                    }
                    (checkpoint.population, last_generation + 1, checkpoint.best)
                }
                Err(e) => {
                    log::warn!("discarding checkpoint for generation {last_generation}: {e}");
                    (P::new_population(settings, rng), 0, None)
                }
            },
            None => {
                log::info!("no checkpoint found, starting from a fresh population");
                (P::new_population(settings, rng), 0, None)
            }
        };

        for generation in start..self.target_generations {
            let summary = match self
                .evaluator
                .evaluate(population.members_mut(), rng, &self.cancel)
            {
                Ok(summary) => summary,
                Err(Aborted) => {
                    log::warn!("training aborted during generation {generation}");
                    return Ok(TrainingOutcome::Aborted {
                        generation,
                        generations_run: generation - start,
                    });
                }
            };

            if let Some(stats) = FitnessStats::new(population.members().iter().map(Entrant::fitness))
            {
                log::info!(
                    "generation {generation}: {} matches, fitness min {:.3} max {:.3} mean {:.3} std {:.3}",
                    summary.matches,
                    stats.min,
                    stats.max,
                    stats.mean,
                    stats.std_dev,
                );
            }
            log::debug!(
                "generation {generation}: {} left scored, {} right scored, {} hit cap, {} ticks",
                summary.left_scored,
                summary.right_scored,
                summary.hit_cap,
                summary.total_ticks,
            );

            let leader = population
                .members()
                .iter()
                .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
                .filter(|leader| best.as_ref().is_none_or(|b| leader.fitness() > b.fitness));
            if let Some(leader) = leader {
                best = Some(Champion {
                    generation,
                    fitness: leader.fitness(),
                    member: leader.clone(),
                });
            }

            let checkpoint = Checkpoint {
                generation,
                saved_at: Utc::now(),
                population: population.next_generation(generation, rng),
                best,
            };
            store.save(&checkpoint)?;
            population = checkpoint.population;
            best = checkpoint.best;
        }

        if let Some(champion) = &best {
            store.persist_best(champion)?;
            log::info!(
                "best fitness {:.3} from generation {}",
                champion.fitness,
                champion.generation
            );
        }
        Ok(TrainingOutcome::Completed {
            generations_run: self.target_generations.saturating_sub(start),
            champion: best,
        })
    }
}
