//! Controllers and the adapter between them and the arena.
//!
//! A [`Controller`] is any policy that maps three observed scalars to three
//! action scores. The [`ControllerAdapter`] builds the observation for one
//! side of the arena, turns the scores into a [`Decision`], applies it to the
//! paddle, and reports the fitness shaping for that decision:
//!
//! | Decision | Arena result | Fitness delta |
//! |----------|--------------|---------------|
//! | [`Decision::Stay`] | - | [`IDLE_PENALTY`] |
//! | [`Decision::Up`] / [`Decision::Down`] | accepted | `0.0` |
//! | [`Decision::Up`] / [`Decision::Down`] | rejected | [`REJECTED_MOVE_PENALTY`] |
//!
//! Accepted moves earn nothing immediately; hits and survival time are
//! rewarded when the match ends (see [`crate::match_simulator`]).

use std::fmt;

use pongevo_engine::{Arena, Direction, Side};
use serde::{Deserialize, Serialize};

/// Fitness change for choosing not to move.
pub const IDLE_PENALTY: f64 = -0.01;

/// Fitness change for a move the arena rejects because it would leave the field.
pub const REJECTED_MOVE_PENALTY: f64 = -1.0;

/// A decision-making policy queried once per tick.
pub trait Controller: fmt::Debug + Send + Sync {
    /// Returns scores for `[stay, up, down]`.
    fn decide(&self, observation: &Observation) -> [f64; 3];
}

/// What a controller sees of the arena, from the point of view of its own paddle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Top edge of the observing paddle.
    pub paddle_y: f64,
    /// Horizontal distance between the observing paddle and the ball center.
    pub ball_distance_x: f64,
    pub ball_y: f64,
}

impl Observation {
    #[must_use]
    pub fn from_arena(arena: &Arena, side: Side) -> Self {
        let paddle = arena.paddle(side);
        let ball = arena.ball();
        Self {
            paddle_y: paddle.y(),
            ball_distance_x: (paddle.x() - ball.x()).abs(),
            ball_y: ball.y(),
        }
    }

    #[must_use]
    pub fn to_array(&self) -> [f64; 3] {
        [self.paddle_y, self.ball_distance_x, self.ball_y]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum Decision {
    Stay,
    Up,
    Down,
}

impl Decision {
    /// Picks the decision with the highest score.
    ///
    /// Ties go to the earliest index, and a `NaN` score never wins against an
    /// earlier one.
    #[must_use]
    pub fn from_scores(scores: [f64; 3]) -> Self {
        let mut best = 0;
        for (i, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = i;
            }
        }
        match best {
            0 => Decision::Stay,
            1 => Decision::Up,
            _ => Decision::Down,
        }
    }

    #[must_use]
    pub fn direction(self) -> Option<Direction> {
        match self {
            Decision::Stay => None,
            Decision::Up => Some(Direction::Up),
            Decision::Down => Some(Direction::Down),
        }
    }
}

/// Connects a controller to one paddle of an arena.
#[derive(Debug, Clone, Copy)]
pub struct ControllerAdapter<'a> {
    side: Side,
    controller: &'a dyn Controller,
}

impl<'a> ControllerAdapter<'a> {
    #[must_use]
    pub fn new(side: Side, controller: &'a dyn Controller) -> Self {
        Self { side, controller }
    }

    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Queries the controller and applies its decision to the paddle.
    ///
    /// Returns the fitness delta earned by the decision.
    pub fn act(&self, arena: &mut Arena) -> f64 {
        let observation = Observation::from_arena(arena, self.side);
        let decision = Decision::from_scores(self.controller.decide(&observation));
        match decision.direction() {
            None => IDLE_PENALTY,
            Some(direction) => {
                if arena.move_paddle(self.side, direction) {
                    0.0
                } else {
                    REJECTED_MOVE_PENALTY
                }
            }
        }
    }
}

/// A controller that always returns the same scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedController {
    scores: [f64; 3],
}

impl FixedController {
    #[must_use]
    pub const fn new(scores: [f64; 3]) -> Self {
        Self { scores }
    }

    #[must_use]
    pub const fn always(decision: Decision) -> Self {
        let scores = match decision {
            Decision::Stay => [1.0, 0.0, 0.0],
            Decision::Up => [0.0, 1.0, 0.0],
            Decision::Down => [0.0, 0.0, 1.0],
        };
        Self { scores }
    }
}

impl Controller for FixedController {
    fn decide(&self, _observation: &Observation) -> [f64; 3] {
        self.scores
    }
}

/// A scripted controller that keeps the paddle center level with the ball.
///
/// `paddle_height` is needed to locate the center, since the observation only
/// carries the top edge of the paddle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingController {
    paddle_height: f64,
    dead_zone: f64,
}

impl TrackingController {
    #[must_use]
    pub const fn new(paddle_height: f64, dead_zone: f64) -> Self {
        Self {
            paddle_height,
            dead_zone,
        }
    }
}

impl Controller for TrackingController {
    fn decide(&self, observation: &Observation) -> [f64; 3] {
        let offset = observation.ball_y - (observation.paddle_y + self.paddle_height / 2.0);
        if offset < -self.dead_zone {
            [0.0, 1.0, 0.0]
        } else if offset > self.dead_zone {
            [0.0, 0.0, 1.0]
        } else {
            [1.0, 0.0, 0.0]
        }
    }
}
