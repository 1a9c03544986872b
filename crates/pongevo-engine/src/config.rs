use serde::{Deserialize, Serialize};

/// Error returned when a configuration value cannot produce a playable game.
///
/// Configuration is validated once at startup so that invalid values never
/// surface in the middle of a simulation.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("{name} must be a positive finite number (got {value})")]
    NonPositive { name: &'static str, value: f64 },
    #[display("paddle height {paddle_height} does not fit in arena height {arena_height}")]
    PaddleTallerThanArena {
        paddle_height: f64,
        arena_height: f64,
    },
    #[display("paddle step {step} must be smaller than paddle height {paddle_height}")]
    PaddleStepTooLarge { step: f64, paddle_height: f64 },
    #[display("ball with radius {radius} does not fit between the paddles")]
    BallDoesNotFit { radius: f64 },
    #[display("serve half-angle must be within 1..=89 degrees (got {degrees})")]
    ServeAngleOutOfRange { degrees: u32 },
}

/// Dimensions and speeds of the arena and its entities.
///
/// The default values reproduce the reference game exactly:
///
/// | Entity | Value |
/// |--------|-------|
/// | Arena | 700 × 500 |
/// | Paddle | 20 × 100, step 4, inset 10 from the side walls |
/// | Ball | radius 7, max speed 5 |
/// | Serve | whole degrees in `[-30, 30)`, never 0 |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub width: f64,
    pub height: f64,
    pub paddle_width: f64,
    pub paddle_height: f64,
    /// Distance a paddle travels per accepted move.
    pub paddle_step: f64,
    /// Horizontal gap between a side wall and the outer edge of its paddle.
    pub paddle_inset: f64,
    pub ball_radius: f64,
    /// Speed magnitude of the ball after every serve and paddle bounce.
    pub ball_max_speed: f64,
    /// Serve angles are drawn from `[-serve_half_angle_deg, serve_half_angle_deg)`.
    pub serve_half_angle_deg: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 700.0,
            height: 500.0,
            paddle_width: 20.0,
            paddle_height: 100.0,
            paddle_step: 4.0,
            paddle_inset: 10.0,
            ball_radius: 7.0,
            ball_max_speed: 5.0,
            serve_half_angle_deg: 30,
        }
    }
}

impl ArenaConfig {
    /// Checks that the configuration describes a playable arena.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("paddle_step", self.paddle_step),
            ("ball_radius", self.ball_radius),
            ("ball_max_speed", self.ball_max_speed),
        ] {
            ensure_positive(name, value)?;
        }
        if !self.paddle_inset.is_finite() || self.paddle_inset < 0.0 {
            return Err(ConfigError::NonPositive {
                name: "paddle_inset",
                value: self.paddle_inset,
            });
        }
        if self.paddle_height >= self.height {
            return Err(ConfigError::PaddleTallerThanArena {
                paddle_height: self.paddle_height,
                arena_height: self.height,
            });
        }
        if self.paddle_step >= self.paddle_height {
            return Err(ConfigError::PaddleStepTooLarge {
                step: self.paddle_step,
                paddle_height: self.paddle_height,
            });
        }
        let inner_width = self.width - 2.0 * (self.paddle_inset + self.paddle_width);
        if 2.0 * self.ball_radius >= inner_width || 2.0 * self.ball_radius >= self.height {
            return Err(ConfigError::BallDoesNotFit {
                radius: self.ball_radius,
            });
        }
        if !(1..=89).contains(&self.serve_half_angle_deg) {
            return Err(ConfigError::ServeAngleOutOfRange {
                degrees: self.serve_half_angle_deg,
            });
        }
        Ok(())
    }

    /// Highest `y` a paddle may occupy.
    #[must_use]
    pub fn paddle_max_y(&self) -> f64 {
        self.height - self.paddle_height
    }
}

/// Rejects zero, negative, and non-finite values.
pub fn ensure_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(ArenaConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_paddle_max_y() {
        assert_eq!(ArenaConfig::default().paddle_max_y(), 400.0);
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        let config = ArenaConfig {
            width: 0.0,
            ..ArenaConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { name: "width", .. })
        ));

        let config = ArenaConfig {
            ball_max_speed: f64::NAN,
            ..ArenaConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                name: "ball_max_speed",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_oversized_paddle() {
        let config = ArenaConfig {
            paddle_height: 500.0,
            ..ArenaConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PaddleTallerThanArena { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_serve_angle() {
        let config = ArenaConfig {
            serve_half_angle_deg: 0,
            ..ArenaConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ServeAngleOutOfRange { degrees: 0 })
        );
    }

    #[test]
    fn test_serde_roundtrip_keeps_values() {
        let config = ArenaConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ArenaConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
