//! Round-robin tournament evaluation of a population of controllers.
//!
//! A round plays every unordered pair `(i, j)` with `i < j` exactly once, with
//! entrant `i` on the left paddle and entrant `j` on the right. Each entrant's
//! fitness is reset to zero the first time the round touches it, then every
//! finished match adds its [`MatchReport`] deltas to both participants.
//!
//! # Abort Semantics
//!
//! The cancellation token is checked before every match and on every tick. An
//! abort ends the round with [`Aborted`]: matches that finished before the
//! abort keep their fitness, the interrupted match contributes nothing.
//!
//! # Parallel Rounds
//!
//! With more than one worker thread, matches run on scoped threads and the
//! finished reports are committed afterwards in pair order. Per-match seeds are
//! drawn before any match starts, so with [`DurationMode::Ticks`] a parallel
//! round produces exactly the same fitness as a sequential one. With
//! [`DurationMode::WallClock`] the duration is still measured per match.
//!
//! [`DurationMode::Ticks`]: crate::match_simulator::DurationMode::Ticks
//! [`DurationMode::WallClock`]: crate::match_simulator::DurationMode::WallClock

use std::{
    num::NonZeroUsize,
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc,
    },
    thread,
};

use pongevo_engine::Side;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    cancel::{Aborted, CancellationToken},
    controller::Controller,
    match_simulator::{MatchReport, MatchSimulator, Terminal},
};

/// A population member taking part in a tournament.
///
/// The tournament only reads the controller and writes the fitness
/// accumulator; it never inspects anything else about the entrant.
pub trait Entrant: Send + Sync {
    fn controller(&self) -> &dyn Controller;
    fn fitness(&self) -> f64;
    fn set_fitness(&mut self, fitness: f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Number of worker threads; `1` runs matches sequentially.
    pub threads: NonZeroUsize,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            threads: NonZeroUsize::MIN,
        }
    }
}

/// Aggregate figures of one completed round.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub matches: usize,
    pub left_scored: usize,
    pub right_scored: usize,
    pub hit_cap: usize,
    pub total_ticks: u64,
}

impl RoundSummary {
    fn record(&mut self, report: &MatchReport) {
        self.matches += 1;
        self.total_ticks += report.ticks;
        match report.terminal {
            Terminal::LeftScored => self.left_scored += 1,
            Terminal::RightScored => self.right_scored += 1,
            Terminal::HitCap => self.hit_cap += 1,
        }
    }
}

/// Returns every unordered pair `(i, j)` with `i < j < count`, in row order.
#[must_use]
pub fn round_robin_pairs(count: usize) -> Vec<(usize, usize)> {
    (0..count)
        .flat_map(|i| (i + 1..count).map(move |j| (i, j)))
        .collect()
}

/// Adds the fitness deltas of `report` to the two entrants of match `(i, j)`.
pub fn apply_report<E>(entrants: &mut [E], (i, j): (usize, usize), report: &MatchReport)
where
    E: Entrant,
{
    let left = &mut entrants[i];
    left.set_fitness(left.fitness() + report.fitness(Side::Left));
    let right = &mut entrants[j];
    right.set_fitness(right.fitness() + report.fitness(Side::Right));
}

/// Tracks which entrants have already had their fitness reset this round.
struct FirstTouch(Vec<bool>);

impl FirstTouch {
    fn new(count: usize) -> Self {
        Self(vec![false; count])
    }

    fn touch<E>(&mut self, entrants: &mut [E], index: usize)
    where
        E: Entrant,
    {
        if !self.0[index] {
            self.0[index] = true;
            entrants[index].set_fitness(0.0);
        }
    }
}

/// Runs full round-robin rounds over a population.
#[derive(Debug, Clone, Default)]
pub struct TournamentEvaluator {
    simulator: MatchSimulator,
    config: TournamentConfig,
}

impl TournamentEvaluator {
    #[must_use]
    pub fn new(simulator: MatchSimulator, config: TournamentConfig) -> Self {
        Self { simulator, config }
    }

    #[must_use]
    pub fn simulator(&self) -> &MatchSimulator {
        &self.simulator
    }

    /// Evaluates one round, leaving each entrant's fitness set to its total
    /// over all of its matches in the round.
    pub fn evaluate<E, R>(
        &self,
        entrants: &mut [E],
        rng: &mut R,
        cancel: &CancellationToken,
    ) -> Result<RoundSummary, Aborted>
    where
        E: Entrant,
        R: Rng + ?Sized,
    {
        let pairs = round_robin_pairs(entrants.len());
        let seeds = pairs.iter().map(|_| rng.random()).collect::<Vec<u64>>();
        if self.config.threads.get() == 1 || pairs.len() < 2 {
            self.evaluate_sequential(entrants, &seeds, cancel)
        } else {
            self.evaluate_parallel(entrants, &pairs, &seeds, cancel)
        }
    }

    fn evaluate_sequential<E>(
        &self,
        entrants: &mut [E],
        seeds: &[u64],
        cancel: &CancellationToken,
    ) -> Result<RoundSummary, Aborted>
    where
        E: Entrant,
    {
        let count = entrants.len();
        let mut touched = FirstTouch::new(count);
        let mut summary = RoundSummary::default();
        let mut pair_index = 0;

        for i in 0..count {
            log::debug!("round progress: {}%", i * 100 / count);
            cancel.check()?;
            touched.touch(entrants, i);
            for j in i + 1..count {
                cancel.check()?;
                let report = self.simulator.play(
                    entrants[i].controller(),
                    entrants[j].controller(),
                    seeds[pair_index],
                    cancel,
                )?;
                pair_index += 1;
                log::debug!(
                    "match ({i}, {j}): {:?} after {} ticks, fitness {:.3} / {:.3}",
                    report.terminal,
                    report.ticks,
                    report.left_fitness,
                    report.right_fitness,
                );
                touched.touch(entrants, j);
                apply_report(entrants, (i, j), &report);
                summary.record(&report);
            }
        }

        Ok(summary)
    }

    fn evaluate_parallel<E>(
        &self,
        entrants: &mut [E],
        pairs: &[(usize, usize)],
        seeds: &[u64],
        cancel: &CancellationToken,
    ) -> Result<RoundSummary, Aborted>
    where
        E: Entrant,
    {
        let worker_count = self.config.threads.get().min(pairs.len());
        let next_pair = AtomicUsize::new(0);
        let (result_tx, result_rx) = mpsc::channel::<(usize, MatchReport)>();

        {
            let shared: &[E] = entrants;
            thread::scope(|scope| {
                for _ in 0..worker_count {
                    let result_tx = result_tx.clone();
                    let next_pair = &next_pair;
                    scope.spawn(move || {
                        loop {
                            if cancel.is_cancelled() {
                                break;
                            }
                            let index = next_pair.fetch_add(1, Ordering::Relaxed);
                            let Some(&(i, j)) = pairs.get(index) else {
                                break;
                            };
                            let Ok(report) = self.simulator.play(
                                shared[i].controller(),
                                shared[j].controller(),
                                seeds[index],
                                cancel,
                            ) else {
                                break;
                            };
                            if result_tx.send((index, report)).is_err() {
                                break;
                            }
                        }
                    });
                }
            });
        }
        drop(result_tx);

        let mut reports: Vec<Option<MatchReport>> = vec![None; pairs.len()];
        for (index, report) in result_rx {
            reports[index] = Some(report);
        }
        let completed = reports.iter().all(Option::is_some);

        let mut touched = FirstTouch::new(entrants.len());
        let mut summary = RoundSummary::default();
        for (&(i, j), report) in pairs.iter().zip(&reports) {
            let Some(report) = report else {
                continue;
            };
            touched.touch(entrants, i);
            touched.touch(entrants, j);
            apply_report(entrants, (i, j), report);
            summary.record(report);
        }

        if !completed {
            log::warn!(
                "round aborted after {} of {} matches",
                summary.matches,
                pairs.len()
            );
            return Err(Aborted);
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pongevo_engine::ArenaConfig;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{
        controller::{Decision, FixedController, Observation, TrackingController},
        match_simulator::{DurationMode, MatchConfig},
    };

    /// Slow controller that cancels the round on its `limit`-th decision.
    #[derive(Debug)]
    struct CancelAfter {
        calls: AtomicUsize,
        limit: usize,
        token: CancellationToken,
    }

    impl Controller for CancelAfter {
        fn decide(&self, _observation: &Observation) -> [f64; 3] {
            thread::sleep(Duration::from_millis(10));
            if self.calls.fetch_add(1, Ordering::Relaxed) + 1 >= self.limit {
                self.token.cancel();
            }
            [1.0, 0.0, 0.0]
        }
    }

    #[derive(Debug)]
    struct TestEntrant {
        controller: Box<dyn Controller>,
        fitness: f64,
    }

    impl TestEntrant {
        fn new(controller: impl Controller + 'static) -> Self {
            Self {
                controller: Box::new(controller),
                fitness: 1234.0,
            }
        }
    }

    impl Entrant for TestEntrant {
        fn controller(&self) -> &dyn Controller {
            self.controller.as_ref()
        }

        fn fitness(&self) -> f64 {
            self.fitness
        }

        fn set_fitness(&mut self, fitness: f64) {
            self.fitness = fitness;
        }
    }

    fn evaluator(threads: usize) -> TournamentEvaluator {
        let simulator = MatchSimulator::new(
            ArenaConfig::default(),
            MatchConfig {
                max_hits: 50,
                duration: DurationMode::Ticks {
                    ticks_per_second: 60.0,
                },
            },
        )
        .unwrap();
        TournamentEvaluator::new(
            simulator,
            TournamentConfig {
                threads: NonZeroUsize::new(threads).unwrap(),
            },
        )
    }

    fn population() -> Vec<TestEntrant> {
        vec![
            TestEntrant::new(TrackingController::new(100.0, 2.0)),
            TestEntrant::new(FixedController::always(Decision::Stay)),
            TestEntrant::new(FixedController::always(Decision::Up)),
            TestEntrant::new(TrackingController::new(100.0, 10.0)),
            TestEntrant::new(FixedController::always(Decision::Down)),
        ]
    }

    #[test]
    fn test_pairs_cover_each_unordered_pair_once() {
        assert_eq!(
            round_robin_pairs(4),
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
        assert!(round_robin_pairs(1).is_empty());
        assert!(round_robin_pairs(0).is_empty());
    }

    #[test]
    fn test_round_plays_every_pair_and_resets_fitness() {
        let mut entrants = population();
        let mut rng = Pcg32::seed_from_u64(0);
        let summary = evaluator(1)
            .evaluate(&mut entrants, &mut rng, &CancellationToken::new())
            .unwrap();
        assert_eq!(summary.matches, 10);
        assert_eq!(
            summary.left_scored + summary.right_scored + summary.hit_cap,
            10
        );
        // The stale starting fitness must be gone.
        assert!(entrants.iter().all(|e| e.fitness < 1000.0));
    }

    #[test]
    fn test_fitness_is_sum_of_match_reports() {
        let mut entrants = population();
        let eval = evaluator(1);
        let mut rng = Pcg32::seed_from_u64(9);
        eval.evaluate(&mut entrants, &mut rng, &CancellationToken::new())
            .unwrap();

        // Replay every match with the same seeds.
        let mut rng = Pcg32::seed_from_u64(9);
        let pairs = round_robin_pairs(entrants.len());
        let seeds = pairs.iter().map(|_| rng.random()).collect::<Vec<u64>>();
        let mut expected = vec![0.0; entrants.len()];
        for (&(i, j), &seed) in pairs.iter().zip(&seeds) {
            let report = eval
                .simulator()
                .play(
                    entrants[i].controller(),
                    entrants[j].controller(),
                    seed,
                    &CancellationToken::new(),
                )
                .unwrap();
            expected[i] += report.left_fitness;
            expected[j] += report.right_fitness;
        }
        for (entrant, expected) in entrants.iter().zip(expected) {
            assert!((entrant.fitness - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_accumulation_is_order_independent() {
        let eval = evaluator(1);
        let cancel = CancellationToken::new();
        let mut entrants = population();
        let ab = eval
            .simulator()
            .play(entrants[0].controller(), entrants[1].controller(), 5, &cancel)
            .unwrap();
        let ac = eval
            .simulator()
            .play(entrants[0].controller(), entrants[2].controller(), 6, &cancel)
            .unwrap();

        entrants[0].fitness = 0.0;
        apply_report(&mut entrants, (0, 1), &ab);
        apply_report(&mut entrants, (0, 2), &ac);
        let forward = entrants[0].fitness;

        entrants[0].fitness = 0.0;
        apply_report(&mut entrants, (0, 2), &ac);
        apply_report(&mut entrants, (0, 1), &ab);
        let backward = entrants[0].fitness;

        assert!((forward - backward).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_round_matches_sequential_round() {
        let mut sequential = population();
        let mut parallel = population();
        let cancel = CancellationToken::new();
        let a = evaluator(1)
            .evaluate(&mut sequential, &mut Pcg32::seed_from_u64(4), &cancel)
            .unwrap();
        let b = evaluator(4)
            .evaluate(&mut parallel, &mut Pcg32::seed_from_u64(4), &cancel)
            .unwrap();
        assert_eq!(a, b);
        for (s, p) in sequential.iter().zip(&parallel) {
            assert!((s.fitness - p.fitness).abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_entrant_gets_zero_fitness() {
        let mut entrants = vec![TestEntrant::new(FixedController::always(Decision::Stay))];
        let summary = evaluator(1)
            .evaluate(
                &mut entrants,
                &mut Pcg32::seed_from_u64(0),
                &CancellationToken::new(),
            )
            .unwrap();
        assert_eq!(summary.matches, 0);
        assert_eq!(entrants[0].fitness, 0.0);
    }

    #[test]
    fn test_aborted_round_commits_nothing_further() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        for threads in [1, 3] {
            let mut entrants = population();
            let result = evaluator(threads).evaluate(
                &mut entrants,
                &mut Pcg32::seed_from_u64(0),
                &cancel,
            );
            assert_eq!(result, Err(Aborted));
            assert!(entrants.iter().all(|e| e.fitness == 1234.0));
        }
    }

    #[test]
    fn test_abort_keeps_finished_matches_only() {
        for threads in [1, 3] {
            let cancel = CancellationToken::new();
            let mut entrants = vec![
                TestEntrant::new(FixedController::always(Decision::Stay)),
                TestEntrant::new(TrackingController::new(100.0, 2.0)),
                TestEntrant::new(CancelAfter {
                    calls: AtomicUsize::new(0),
                    limit: 5,
                    token: cancel.clone(),
                }),
            ];
            let eval = evaluator(threads);
            let result = eval.evaluate(&mut entrants, &mut Pcg32::seed_from_u64(8), &cancel);
            assert_eq!(result, Err(Aborted));

            // Only match (0, 1) finished; it used the first seed of the round.
            let seed = Pcg32::seed_from_u64(8).random();
            let finished = eval
                .simulator()
                .play(
                    entrants[0].controller(),
                    entrants[1].controller(),
                    seed,
                    &CancellationToken::new(),
                )
                .unwrap();
            assert!((entrants[0].fitness - finished.left_fitness).abs() < 1e-9);
            assert!((entrants[1].fitness - finished.right_fitness).abs() < 1e-9);
            assert_eq!(entrants[2].fitness, 1234.0);
        }
    }
}
