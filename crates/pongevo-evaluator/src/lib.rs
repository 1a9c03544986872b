//! Match and tournament evaluation of paddle controllers.
//!
//! This crate implements a three-level evaluation architecture:
//!
//! 1. **Decision Shaping** ([`controller`]) - Turns a controller's scores into a
//!    paddle move and a per-tick fitness delta.
//!
//! 2. **Match Simulation** ([`match_simulator`]) - Plays one match between two
//!    controllers until a point is scored or the hit cap is reached, and
//!    produces a fitness for both sides.
//!
//! 3. **Tournament Evaluation** ([`tournament`]) - Plays a full round-robin over
//!    a population and accumulates each entrant's fitness.
//!
//! # Architecture
//!
//! ```text
//! Tournament Evaluation (fitness for training)
//!     ↓ uses
//! Match Simulation (one match, two sides)
//!     ↓ uses
//! Decision Shaping (one decision, one paddle)
//! ```
//!
//! Every level accepts a [`cancel::CancellationToken`]. An abort is reported as
//! [`cancel::Aborted`] and never leaves partial results of an unfinished match
//! behind.

pub mod cancel;
pub mod controller;
pub mod match_simulator;
pub mod tournament;
