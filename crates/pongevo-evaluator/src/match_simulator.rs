//! Match simulation: one arena, two controllers, run until a terminal condition.
//!
//! # Tick Order
//!
//! Every tick performs, in order:
//!
//! 1. Abort check on the [`CancellationToken`]
//! 2. [`Arena::step`] (ball movement, collisions, scoring)
//! 3. Left controller decision, then right controller decision
//! 4. Terminal check on the counters returned by the step
//!
//! # Terminal Conditions
//!
//! Checked in this order, the first one that holds ends the match:
//!
//! - `left_score >= 1` ([`Terminal::LeftScored`])
//! - `right_score >= 1` ([`Terminal::RightScored`])
//! - `left_hits >= max_hits` ([`Terminal::HitCap`])
//!
//! Only the left hit count is capped. Since the ball alternates between the
//! paddles, the right hit count can never run more than one ahead of it, so
//! the cap still bounds every rally.
//!
//! # Fitness
//!
//! Each side earns its decision penalties (see [`crate::controller`]) plus,
//! when the match ends normally, `hits + duration`. An aborted match returns
//! [`Aborted`] and produces no fitness at all.

use std::time::Instant;

use pongevo_engine::{Arena, ArenaConfig, ConfigError, MatchState, Side, ensure_positive};
use serde::{Deserialize, Serialize};

use crate::{
    cancel::{Aborted, CancellationToken},
    controller::{Controller, ControllerAdapter},
};

/// How the duration component of the fitness is measured.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DurationMode {
    /// Seconds of wall-clock time since the match started.
    #[default]
    WallClock,
    /// Simulated seconds: ticks divided by `ticks_per_second`.
    Ticks { ticks_per_second: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// The match ends once the left paddle has hit the ball this many times.
    pub max_hits: u32,
    pub duration: DurationMode,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_hits: 50,
            duration: DurationMode::WallClock,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("max_hits", f64::from(self.max_hits))?;
        if let DurationMode::Ticks { ticks_per_second } = self.duration {
            ensure_positive("ticks_per_second", ticks_per_second)?;
        }
        Ok(())
    }

    /// Returns the terminal condition reached by `state`, if any.
    #[must_use]
    pub fn terminal(&self, state: &MatchState) -> Option<Terminal> {
        if state.left_score >= 1 {
            Some(Terminal::LeftScored)
        } else if state.right_score >= 1 {
            Some(Terminal::RightScored)
        } else if state.left_hits >= self.max_hits {
            Some(Terminal::HitCap)
        } else {
            None
        }
    }
}

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
pub enum Terminal {
    LeftScored,
    RightScored,
    HitCap,
}

/// Final counters of a match that ended normally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub left_hits: u32,
    pub right_hits: u32,
    pub left_score: u32,
    pub right_score: u32,
    /// Match length in seconds, measured per [`DurationMode`].
    pub duration: f64,
}

impl MatchOutcome {
    /// End-of-match reward for `side`: its hit count plus the match duration.
    #[must_use]
    pub fn reward(&self, side: Side) -> f64 {
        let hits = match side {
            Side::Left => self.left_hits,
            Side::Right => self.right_hits,
        };
        f64::from(hits) + self.duration
    }
}

/// Everything a finished match contributes to the evaluation round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub outcome: MatchOutcome,
    pub terminal: Terminal,
    pub ticks: u64,
    /// Total fitness delta for the left controller (penalties and reward).
    pub left_fitness: f64,
    /// Total fitness delta for the right controller (penalties and reward).
    pub right_fitness: f64,
}

impl MatchReport {
    #[must_use]
    pub fn fitness(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left_fitness,
            Side::Right => self.right_fitness,
        }
    }
}

#[derive(Debug)]
struct MatchClock {
    mode: DurationMode,
    started_at: Instant,
    ticks: u64,
}

impl MatchClock {
    fn start(mode: DurationMode) -> Self {
        Self {
            mode,
            started_at: Instant::now(),
            ticks: 0,
        }
    }

    fn tick(&mut self) {
        self.ticks += 1;
    }

    #[expect(clippy::cast_precision_loss)]
    fn elapsed_secs(&self) -> f64 {
        match self.mode {
            DurationMode::WallClock => self.started_at.elapsed().as_secs_f64(),
            DurationMode::Ticks { ticks_per_second } => self.ticks as f64 / ticks_per_second,
        }
    }
}

/// Runs single matches between two controllers.
#[derive(Debug, Clone, Default)]
pub struct MatchSimulator {
    arena_config: ArenaConfig,
    config: MatchConfig,
}

impl MatchSimulator {
    /// Creates a simulator after checking that both configurations are playable.
    pub fn new(arena_config: ArenaConfig, config: MatchConfig) -> Result<Self, ConfigError> {
        arena_config.validate()?;
        config.validate()?;
        Ok(Self {
            arena_config,
            config,
        })
    }

    #[must_use]
    pub fn arena_config(&self) -> &ArenaConfig {
        &self.arena_config
    }

    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Plays one match with `left` on the left paddle and `right` on the right.
    ///
    /// `seed` determines every serve of the match. Returns [`Aborted`] as soon
    /// as `cancel` is observed at a tick boundary.
    pub fn play(
        &self,
        left: &dyn Controller,
        right: &dyn Controller,
        seed: u64,
        cancel: &CancellationToken,
    ) -> Result<MatchReport, Aborted> {
        let mut arena = Arena::with_seed(self.arena_config, seed);
        let left_adapter = ControllerAdapter::new(Side::Left, left);
        let right_adapter = ControllerAdapter::new(Side::Right, right);
        let mut clock = MatchClock::start(self.config.duration);
        let mut left_penalty = 0.0;
        let mut right_penalty = 0.0;

        loop {
            cancel.check()?;

            let state = arena.step();
            clock.tick();
            left_penalty += left_adapter.act(&mut arena);
            right_penalty += right_adapter.act(&mut arena);

            if let Some(terminal) = self.config.terminal(&state) {
                let outcome = MatchOutcome {
                    left_hits: state.left_hits,
                    right_hits: state.right_hits,
                    left_score: state.left_score,
                    right_score: state.right_score,
                    duration: clock.elapsed_secs(),
                };
                return Ok(MatchReport {
                    outcome,
                    terminal,
                    ticks: clock.ticks,
                    left_fitness: left_penalty + outcome.reward(Side::Left),
                    right_fitness: right_penalty + outcome.reward(Side::Right),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::controller::{Decision, FixedController, Observation, TrackingController};

    const TICKS: DurationMode = DurationMode::Ticks {
        ticks_per_second: 60.0,
    };

    fn simulator(arena_config: ArenaConfig) -> MatchSimulator {
        MatchSimulator::new(
            arena_config,
            MatchConfig {
                max_hits: 50,
                duration: TICKS,
            },
        )
        .unwrap()
    }

    /// Paddles tall enough that no ball can get past them.
    fn wall_config() -> ArenaConfig {
        ArenaConfig {
            paddle_height: 499.0,
            ..ArenaConfig::default()
        }
    }

    #[derive(Debug)]
    struct CancelAfter {
        calls: AtomicUsize,
        limit: usize,
        token: CancellationToken,
    }

    impl Controller for CancelAfter {
        fn decide(&self, _observation: &Observation) -> [f64; 3] {
            if self.calls.fetch_add(1, Ordering::Relaxed) + 1 >= self.limit {
                self.token.cancel();
            }
            [1.0, 0.0, 0.0]
        }
    }

    #[test]
    fn test_validate_rejects_zero_hit_cap() {
        let config = MatchConfig {
            max_hits: 0,
            ..MatchConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                name: "max_hits",
                ..
            })
        ));
        assert_eq!(MatchConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_new_rejects_unplayable_configs() {
        let arena_config = ArenaConfig {
            serve_half_angle_deg: 0,
            ..ArenaConfig::default()
        };
        assert_eq!(
            MatchSimulator::new(arena_config, MatchConfig::default()).unwrap_err(),
            ConfigError::ServeAngleOutOfRange { degrees: 0 }
        );

        let config = MatchConfig {
            duration: DurationMode::Ticks {
                ticks_per_second: 0.0,
            },
            ..MatchConfig::default()
        };
        assert!(matches!(
            MatchSimulator::new(ArenaConfig::default(), config),
            Err(ConfigError::NonPositive {
                name: "ticks_per_second",
                ..
            })
        ));

        let sim = MatchSimulator::new(ArenaConfig::default(), MatchConfig::default()).unwrap();
        assert_eq!(sim.arena_config(), &ArenaConfig::default());
    }

    #[test]
    fn test_terminal_order() {
        let config = MatchConfig::default();
        let mut state = MatchState::default();
        assert_eq!(config.terminal(&state), None);
        state.left_hits = 49;
        state.right_hits = 120;
        assert_eq!(config.terminal(&state), None);
        state.left_hits = 50;
        assert_eq!(config.terminal(&state), Some(Terminal::HitCap));
        state.right_score = 1;
        assert_eq!(config.terminal(&state), Some(Terminal::RightScored));
        state.left_score = 1;
        assert_eq!(config.terminal(&state), Some(Terminal::LeftScored));
    }

    #[test]
    fn test_hit_cap_ends_endless_rally() {
        let sim = simulator(wall_config());
        let stay = FixedController::always(Decision::Stay);
        for seed in 0..10 {
            let report = sim
                .play(&stay, &stay, seed, &CancellationToken::new())
                .unwrap();
            assert_eq!(report.terminal, Terminal::HitCap);
            assert_eq!(report.outcome.left_hits, 50);
            assert!(report.outcome.right_hits >= 49 && report.outcome.right_hits <= 50);
            assert_eq!(report.outcome.left_score + report.outcome.right_score, 0);
        }
    }

    #[test]
    fn test_match_ends_at_first_terminal_tick() {
        let sim = simulator(ArenaConfig::default());
        let up = FixedController::always(Decision::Up);
        let tracker = TrackingController::new(100.0, 2.0);
        for seed in 0..20 {
            let report = sim
                .play(&up, &tracker, seed, &CancellationToken::new())
                .unwrap();

            // Replay the same match by hand and find the first terminal tick.
            let mut arena = Arena::with_seed(ArenaConfig::default(), seed);
            let left = ControllerAdapter::new(Side::Left, &up);
            let right = ControllerAdapter::new(Side::Right, &tracker);
            let mut ticks = 0;
            let terminal = loop {
                let state = arena.step();
                ticks += 1;
                left.act(&mut arena);
                right.act(&mut arena);
                if let Some(terminal) = sim.config().terminal(&state) {
                    break terminal;
                }
            };
            assert_eq!(report.ticks, ticks);
            assert_eq!(report.terminal, terminal);
        }
    }

    #[test]
    fn test_fitness_combines_penalties_hits_and_duration() {
        let sim = simulator(wall_config());
        let stay = FixedController::always(Decision::Stay);
        let report = sim
            .play(&stay, &stay, 3, &CancellationToken::new())
            .unwrap();

        #[expect(clippy::cast_precision_loss)]
        let ticks = report.ticks as f64;
        let duration = ticks / 60.0;
        assert!((report.outcome.duration - duration).abs() < 1e-9);

        let expected_left = -0.01 * ticks + f64::from(report.outcome.left_hits) + duration;
        let expected_right = -0.01 * ticks + f64::from(report.outcome.right_hits) + duration;
        assert!((report.left_fitness - expected_left).abs() < 1e-6);
        assert!((report.right_fitness - expected_right).abs() < 1e-6);
        assert_eq!(report.fitness(Side::Left), report.left_fitness);
    }

    #[test]
    fn test_rejected_moves_are_charged_per_tick() {
        let sim = simulator(wall_config());
        let up = FixedController::always(Decision::Up);
        let down = FixedController::always(Decision::Down);
        let report = sim.play(&up, &down, 1, &CancellationToken::new()).unwrap();
        // A 499-high paddle starts at y = 0.5 and can never move by 4.
        #[expect(clippy::cast_precision_loss)]
        let penalties = -(report.ticks as f64);
        let expected = penalties + f64::from(report.outcome.left_hits) + report.outcome.duration;
        assert!((report.left_fitness - expected).abs() < 1e-6);
    }

    #[test]
    fn test_same_seed_same_report() {
        let sim = simulator(ArenaConfig::default());
        let tracker = TrackingController::new(100.0, 2.0);
        let a = sim
            .play(&tracker, &tracker, 11, &CancellationToken::new())
            .unwrap();
        let b = sim
            .play(&tracker, &tracker, 11, &CancellationToken::new())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_abort_before_start() {
        let sim = simulator(ArenaConfig::default());
        let stay = FixedController::always(Decision::Stay);
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(sim.play(&stay, &stay, 0, &token), Err(Aborted));
    }

    #[test]
    fn test_abort_mid_match() {
        let sim = simulator(wall_config());
        let token = CancellationToken::new();
        let quitter = CancelAfter {
            calls: AtomicUsize::new(0),
            limit: 10,
            token: token.clone(),
        };
        let stay = FixedController::always(Decision::Stay);
        assert_eq!(sim.play(&quitter, &stay, 0, &token), Err(Aborted));
        assert_eq!(quitter.calls.load(Ordering::Relaxed), 10);
    }
}
