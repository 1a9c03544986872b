//! Deterministic two-paddle ball game simulation.
//!
//! This crate owns the physics of the arena used to train and evaluate paddle
//! controllers. It is deliberately small: axis-aligned paddles, a circular ball,
//! and a fixed-size rectangular field.
//!
//! - [`Ball`] - Position, velocity and serve logic of the ball
//! - [`Paddle`] - Position and fixed-step vertical motion of a paddle
//! - [`Arena`] - Owns one ball and two paddles, resolves collisions, tracks
//!   scores and hits, and advances the game one tick at a time
//! - [`ArenaConfig`] - Dimensions and speeds of all entities
//!
//! # Game Flow
//!
//! 1. Create an [`Arena`] (optionally from a seed for reproducible serves)
//! 2. Each tick, call [`Arena::step`] to move the ball and resolve collisions
//! 3. Move paddles with [`Arena::move_paddle`]; a move that would leave the
//!    field is rejected and reported as `false`
//! 4. Read the returned [`MatchState`] to decide whether the match is over
//!
//! # Example
//!
//! ```
//! use pongevo_engine::{Arena, ArenaConfig, Direction, Side};
//!
//! let mut arena = Arena::with_seed(ArenaConfig::default(), 42);
//!
//! let state = arena.step();
//! assert_eq!(state.left_score + state.right_score, 0);
//!
//! // The left paddle starts centered, so moving up is accepted.
//! assert!(arena.move_paddle(Side::Left, Direction::Up));
//! ```

pub use self::{arena::*, ball::*, config::*, paddle::*};

mod arena;
mod ball;
mod config;
mod paddle;
