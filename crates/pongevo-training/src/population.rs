//! The population collaborator consumed by the training orchestrator.

use pongevo_evaluator::tournament::Entrant;
use rand::Rng;

/// An ordered set of controllers that can be evaluated and bred.
///
/// Member order defines the pairing order of a tournament round, not a
/// ranking.
pub trait Population: Sized {
    type Member: Entrant + Clone;
    type Settings;

    /// Creates a fresh population for a run without a usable checkpoint.
    fn new_population<R>(settings: &Self::Settings, rng: &mut R) -> Self
    where
        R: Rng + ?Sized;

    /// Returns whether `settings` describe this population.
    ///
    /// A resumed population keeps its own settings, so a mismatch only gets
    /// reported.
    fn matches_settings(&self, settings: &Self::Settings) -> bool;

    fn members(&self) -> &[Self::Member];

    fn members_mut(&mut self) -> &mut [Self::Member];

    /// Breeds the population evaluated in `generation` into the next one.
    fn next_generation<R>(&self, generation: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized;
}
