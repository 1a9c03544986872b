use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{ArenaConfig, Ball, Direction, Paddle};

/// One of the two paddles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Scores and hit counters of a match.
///
/// All counters are non-decreasing while a match runs and return to zero on
/// [`Arena::reset`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub left_hits: u32,
    pub right_hits: u32,
    pub left_score: u32,
    pub right_score: u32,
}

/// Read-only copy of the whole arena, for display or reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSnapshot {
    pub ball: Ball,
    pub left_paddle: Paddle,
    pub right_paddle: Paddle,
    pub state: MatchState,
}

/// The game field: one ball, two paddles, and the match counters.
///
/// Each [`Arena::step`] performs, in order:
///
/// 1. Ball movement
/// 2. Wall bounce (top and bottom)
/// 3. Paddle bounce, testing only the paddle the ball is moving toward
/// 4. Scoring, when the ball center leaves the field horizontally
///
/// Serves are drawn from the arena's own RNG, so two arenas built with the
/// same seed and driven by the same paddle moves evolve identically.
#[derive(Debug, Clone)]
pub struct Arena {
    config: ArenaConfig,
    ball: Ball,
    left_paddle: Paddle,
    right_paddle: Paddle,
    state: MatchState,
    rng: Pcg32,
}

impl Arena {
    /// Creates an arena whose serves are seeded from the thread RNG.
    #[must_use]
    pub fn new(config: ArenaConfig) -> Self {
        Self::with_seed(config, rand::rng().random())
    }

    /// Creates an arena with reproducible serves.
    #[must_use]
    pub fn with_seed(config: ArenaConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let paddle_y = config.height / 2.0 - config.paddle_height / 2.0;
        let paddle = |x| {
            Paddle::new(
                x,
                paddle_y,
                config.paddle_width,
                config.paddle_height,
                config.paddle_step,
            )
        };
        let left_paddle = paddle(config.paddle_inset);
        let right_paddle = paddle(config.width - config.paddle_inset - config.paddle_width);
        let ball = Ball::new(config.width / 2.0, config.height / 2.0, &config, &mut rng);
        Self {
            config,
            ball,
            left_paddle,
            right_paddle,
            state: MatchState::default(),
            rng,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    #[must_use]
    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    #[must_use]
    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Left => &self.left_paddle,
            Side::Right => &self.right_paddle,
        }
    }

    fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        match side {
            Side::Left => &mut self.left_paddle,
            Side::Right => &mut self.right_paddle,
        }
    }

    #[must_use]
    pub fn state(&self) -> MatchState {
        self.state
    }

    #[must_use]
    pub fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot {
            ball: self.ball.clone(),
            left_paddle: self.left_paddle.clone(),
            right_paddle: self.right_paddle.clone(),
            state: self.state,
        }
    }

    /// Moves the paddle on `side` one step, if the result stays on the field.
    ///
    /// Returns `false` and leaves the paddle untouched when the new position
    /// would fall outside `[0, height - paddle_height]`. A rejected move is
    /// ordinary game feedback, not an error.
    pub fn move_paddle(&mut self, side: Side, direction: Direction) -> bool {
        let max_y = self.config.paddle_max_y();
        let paddle = self.paddle_mut(side);
        let new_y = paddle.shifted_y(direction);
        if !(0.0..=max_y).contains(&new_y) {
            return false;
        }
        paddle.shift(direction);
        true
    }

    /// Advances the game by one tick and returns the updated counters.
    pub fn step(&mut self) -> MatchState {
        self.ball.advance();
        self.resolve_collisions();

        if self.ball.x < 0.0 {
            self.ball.reset(&mut self.rng);
            self.state.right_score += 1;
        } else if self.ball.x > self.config.width {
            self.ball.reset(&mut self.rng);
            self.state.left_score += 1;
        }

        self.state
    }

    /// Serves a new ball, restores both paddles, and zeroes all counters.
    pub fn reset(&mut self) {
        self.ball.reset(&mut self.rng);
        self.left_paddle.reset();
        self.right_paddle.reset();
        self.state = MatchState::default();
    }

    fn resolve_collisions(&mut self) {
        let ball = &mut self.ball;

        if ball.y + ball.radius() >= self.config.height || ball.y - ball.radius() <= 0.0 {
            ball.bounce_off_wall();
        }

        if ball.x_vel < 0.0 {
            let paddle = &self.left_paddle;
            if paddle.spans(ball.y) && ball.x - ball.radius() <= paddle.x + paddle.width() {
                ball.bounce_off_paddle(paddle);
                self.state.left_hits += 1;
            }
        } else {
            let paddle = &self.right_paddle;
            if paddle.spans(ball.y) && ball.x + ball.radius() >= paddle.x {
                ball.bounce_off_paddle(paddle);
                self.state.right_hits += 1;
            }
        }
    }
}
