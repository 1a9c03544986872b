use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{ArenaConfig, Paddle};

/// The ball: a circle moving at constant velocity between collisions.
///
/// # Speed Invariant
///
/// Every serve sets the velocity to a vector of magnitude `max_speed`, and
/// every paddle bounce recomputes `y_vel` so the vertical component never
/// exceeds `max_speed`. Wall bounces only negate `y_vel`, so they leave the
/// speed unchanged.
///
/// # Serve Direction
///
/// The first serve picks a random horizontal direction. Every later serve
/// ([`Ball::reset`]) reverses the horizontal direction the ball had when it
/// left the field, so the ball is sent back across the arena toward the side
/// it just came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) x_vel: f64,
    pub(crate) y_vel: f64,
    radius: f64,
    max_speed: f64,
    serve_half_angle_deg: i32,
    original_x: f64,
    original_y: f64,
}

impl Ball {
    /// Creates a ball at `(x, y)` and serves it in a random direction.
    ///
    /// A serve half-angle below one degree is treated as one degree, so an
    /// unvalidated config still serves.
    pub fn new<R>(x: f64, y: f64, config: &ArenaConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let serve_half_angle_deg = i32::try_from(config.serve_half_angle_deg)
            .unwrap_or(i32::MAX)
            .max(1);
        let angle = random_serve_angle(rng, serve_half_angle_deg);
        let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        Self {
            x,
            y,
            x_vel: sign * (angle.cos() * config.ball_max_speed).abs(),
            y_vel: angle.sin() * config.ball_max_speed,
            radius: config.ball_radius,
            max_speed: config.ball_max_speed,
            serve_half_angle_deg,
            original_x: x,
            original_y: y,
        }
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn x_vel(&self) -> f64 {
        self.x_vel
    }

    #[must_use]
    pub fn y_vel(&self) -> f64 {
        self.y_vel
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Returns the magnitude of the current velocity.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.x_vel.hypot(self.y_vel)
    }

    /// Advances the position by one tick of the current velocity.
    pub fn advance(&mut self) {
        self.x += self.x_vel;
        self.y += self.y_vel;
    }

    /// Returns the ball to its original position and serves it again.
    ///
    /// The new serve angle is a whole number of degrees, never exactly zero.
    /// The horizontal speed is recomputed from that angle, and its sign is the
    /// opposite of the horizontal direction before the reset.
    pub fn reset<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.x = self.original_x;
        self.y = self.original_y;
        let angle = random_serve_angle(rng, self.serve_half_angle_deg);
        let sign = if self.x_vel < 0.0 { 1.0 } else { -1.0 };
        self.x_vel = sign * (angle.cos() * self.max_speed).abs();
        self.y_vel = angle.sin() * self.max_speed;
    }

    pub(crate) fn bounce_off_wall(&mut self) {
        self.y_vel = -self.y_vel;
    }

    /// Reflects the ball off `paddle`.
    ///
    /// The horizontal direction flips. The vertical velocity depends only on
    /// where the ball meets the paddle: zero at the paddle center, and
    /// `max_speed` in magnitude at either end.
    pub(crate) fn bounce_off_paddle(&mut self, paddle: &Paddle) {
        self.x_vel = -self.x_vel;
        let reduction_factor = (paddle.height() / 2.0) / self.max_speed;
        self.y_vel = (paddle.center_y() - self.y) / reduction_factor;
    }
}

/// Draws a serve angle in radians from whole degrees in `[-half, half)`, skipping zero.
fn random_serve_angle<R>(rng: &mut R, half_angle_deg: i32) -> f64
where
    R: Rng + ?Sized,
{
    loop {
        let degrees = rng.random_range(-half_angle_deg..half_angle_deg);
        if degrees != 0 {
            return f64::from(degrees).to_radians();
        }
    }
}
