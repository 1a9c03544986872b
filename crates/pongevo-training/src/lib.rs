//! Resumable training of paddle controllers with a genetic algorithm.
//!
//! This crate drives repeated tournament rounds over a population, breeds
//! each evaluated generation into the next, checkpoints after every
//! generation, and saves the best controller when the run completes.
//!
//! # How Training Works
//!
//! 1. **Resume** - Find the latest checkpoint, or start a fresh population
//! 2. **Evaluation** - Every member plays every other member once
//!    ([`pongevo_evaluator::tournament`])
//! 3. **Selection & Reproduction** - The GA breeds the next generation
//!    ([`genetic`])
//! 4. **Checkpoint** - The bred population and the best member so far are saved
//!    ([`checkpoint`])
//! 5. **Repeat** until the target generation count is reached, then persist
//!    the champion ([`model::ChampionModel`])
//!
//! # Architecture
//!
//! ```text
//! Trainer (orchestrator)
//!     ↓ evaluates with
//! TournamentEvaluator (pongevo-evaluator)
//!     ↓ assigns fitness to
//! Population members (genetic::Individual wrapping network::Network)
//!     ↓ bred by
//! PopulationEvolver
//!     ↓ saved through
//! CheckpointStore
//! ```
//!
//! The orchestrator only depends on the [`population::Population`] and
//! [`checkpoint::CheckpointStore`] traits, so other population kinds or
//! storage backends can be plugged in.
//!
//! # Current Limitations
//!
//! - **Fixed topology**: networks have one hidden layer of fixed width; the
//!   structure itself never evolves
//! - **No speciation**: the whole population competes in one pool

pub mod checkpoint;
pub mod genetic;
pub mod model;
pub mod network;
pub mod orchestrator;
pub mod population;
pub mod weights;
