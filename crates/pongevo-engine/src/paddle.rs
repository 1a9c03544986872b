use serde::{Deserialize, Serialize};

/// Vertical direction of a paddle move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum Direction {
    Up,
    Down,
}

/// A paddle: an axis-aligned rectangle moving vertically in fixed steps.
///
/// The paddle itself does not know the arena bounds. [`Paddle::shift`] always
/// applies the move; [`Arena::move_paddle`](crate::Arena::move_paddle) checks
/// the prospective position first and only then shifts the paddle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub(crate) x: f64,
    pub(crate) y: f64,
    width: f64,
    height: f64,
    step: f64,
    original_x: f64,
    original_y: f64,
}

impl Paddle {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64, step: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            step,
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
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Returns `true` if `y` lies within the vertical span of the paddle (inclusive).
    #[must_use]
    pub fn spans(&self, y: f64) -> bool {
        self.y <= y && y <= self.y + self.height
    }

    /// Returns the `y` the paddle would have after moving one step in `direction`.
    #[must_use]
    pub fn shifted_y(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Up => self.y - self.step,
            Direction::Down => self.y + self.step,
        }
    }

    /// Moves one step in `direction` without any bounds check.
    pub fn shift(&mut self, direction: Direction) {
        self.y = self.shifted_y(direction);
    }

    pub fn reset(&mut self) {
        self.x = self.original_x;
        self.y = self.original_y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_is_unconditional() {
        let mut paddle = Paddle::new(10.0, 0.0, 20.0, 100.0, 4.0);
        paddle.shift(Direction::Up);
        assert_eq!(paddle.y(), -4.0);
        paddle.shift(Direction::Down);
        paddle.shift(Direction::Down);
        assert_eq!(paddle.y(), 4.0);
    }

    #[test]
    fn test_spans_is_inclusive() {
        let paddle = Paddle::new(10.0, 200.0, 20.0, 100.0, 4.0);
        assert!(paddle.spans(200.0));
        assert!(paddle.spans(300.0));
        assert!(!paddle.spans(199.9));
        assert!(!paddle.spans(300.1));
        assert_eq!(paddle.center_y(), 250.0);
    }

    #[test]
    fn test_reset_restores_original_position() {
        let mut paddle = Paddle::new(670.0, 200.0, 20.0, 100.0, 4.0);
        for _ in 0..10 {
            paddle.shift(Direction::Down);
        }
        paddle.reset();
        assert_eq!((paddle.x(), paddle.y()), (670.0, 200.0));
    }
}
