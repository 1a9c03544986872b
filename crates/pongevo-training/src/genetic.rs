//! Genetic algorithm evolving populations of paddle networks.
//!
//! The GA uses elitism, tournament selection, BLX-α crossover and Gaussian
//! mutation over each network's flat genome.
//!
//! # Algorithm Overview
//!
//! 1. **Evaluate Fitness** - A tournament round sets every individual's fitness
//! 2. **Elite Selection** - Top performers are copied unchanged
//! 3. **Tournament Selection** - Parents are the fittest of small random samples
//! 4. **Crossover (BLX-α)** - Two parent genomes are blended into a child
//! 5. **Mutation** - Gaussian noise is added to some of the child's weights
//!
//! # Evolution Schedule
//!
//! Mutation strength and the weight bound depend on the generation through
//! [`EvolutionPhase`]. Early generations explore with large steps and a tight
//! weight bound, later ones fine-tune with small steps inside a wider bound.
//!
//! | Phase | Generations | Weight bound | Mutation σ |
//! |-------|-------------|--------------|------------|
//! | [`EvolutionPhase::Exploration`] | `0..30` | 2.0 | 0.5 |
//! | [`EvolutionPhase::Transition`] | `30..80` | 3.0 | 0.2 |
//! | [`EvolutionPhase::Convergence`] | `80..` | 4.0 | 0.05 |

use std::cmp::Ordering;

use pongevo_evaluator::{controller::Controller, tournament::Entrant};
use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{network::Network, population::Population, weights};

/// A single network together with its fitness from the latest round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    network: Network,
    fitness: f64,
}

impl Individual {
    #[must_use]
    pub fn new(network: Network) -> Self {
        Self {
            network,
            fitness: 0.0,
        }
    }

    pub fn random<R>(rng: &mut R, max_weight: f64, hidden: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        let genome = weights::random(rng, max_weight, Network::genome_len(hidden));
        Self::new(Network::from_parent_genome(hidden, genome))
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[must_use]
    pub fn into_network(self) -> Network {
        self.network
    }
}

impl Entrant for Individual {
    fn controller(&self) -> &dyn Controller {
        &self.network
    }

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionPhase {
    #[default]
    Exploration,
    Transition,
    Convergence,
}

impl EvolutionPhase {
    #[must_use]
    pub fn from_generation(generation: usize) -> Self {
        match generation {
            0..30 => Self::Exploration,
            30..80 => Self::Transition,
            _ => Self::Convergence,
        }
    }

    #[must_use]
    pub const fn max_weight(self) -> f64 {
        match self {
            Self::Exploration => 2.0,
            Self::Transition => 3.0,
            Self::Convergence => 4.0,
        }
    }

    #[must_use]
    pub const fn mutation_sigma(self) -> f64 {
        match self {
            Self::Exploration => 0.5,
            Self::Transition => 0.2,
            Self::Convergence => 0.05,
        }
    }
}

/// Phase-independent GA parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneticSchedule {
    pub elite_count: usize,
    pub tournament_size: usize,
    pub blx_alpha: f64,
    pub mutation_rate: f64,
}

impl Default for GeneticSchedule {
    fn default() -> Self {
        Self {
            elite_count: 2,
            tournament_size: 2,
            blx_alpha: 0.2,
            mutation_rate: 0.3,
        }
    }
}

impl GeneticSchedule {
    #[must_use]
    pub fn evolver(&self, phase: EvolutionPhase) -> PopulationEvolver {
        PopulationEvolver {
            elite_count: self.elite_count,
            tournament_size: self.tournament_size,
            max_weight: phase.max_weight(),
            mutation_sigma: phase.mutation_sigma(),
            blx_alpha: self.blx_alpha,
            mutation_rate: self.mutation_rate,
        }
    }
}

/// Controls how one generation is bred into the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationEvolver {
    /// Number of top individuals preserved unchanged
    pub elite_count: usize,
    /// Weights are clamped to `[-max_weight, max_weight]`
    pub max_weight: f64,
    /// Larger tournaments mean stronger selection pressure
    pub tournament_size: usize,
    pub mutation_sigma: f64,
    pub blx_alpha: f64,
    /// Probability of mutating each weight
    pub mutation_rate: f64,
}

impl PopulationEvolver {
    /// Breeds `individuals` into a new generation of the same size.
    ///
    /// The input does not need to be sorted. Offspring start with zero fitness;
    /// elites keep theirs until the next round resets it.
    #[must_use]
    pub fn evolve<R>(&self, individuals: &[Individual], rng: &mut R) -> Vec<Individual>
    where
        R: Rng + ?Sized,
    {
        let mut ranked = individuals.iter().collect::<Vec<_>>();
        ranked.sort_by(|a, b| compare_fitness(b, a));

        let mut next_individuals = ranked
            .iter()
            .take(self.elite_count)
            .map(|ind| (*ind).clone())
            .collect::<Vec<_>>();

        while next_individuals.len() < individuals.len() {
            let p1 = tournament_select(&ranked, self.tournament_size, rng);
            let p2 = tournament_select(&ranked, self.tournament_size, rng);

            let mut child = weights::blx_alpha(
                p1.network.genome(),
                p2.network.genome(),
                self.blx_alpha,
                self.max_weight,
                rng,
            );
            weights::mutate(
                &mut child,
                self.mutation_sigma,
                self.max_weight,
                self.mutation_rate,
                rng,
            );

            next_individuals.push(Individual::new(Network::from_parent_genome(
                p1.network.hidden(),
                child,
            )));
        }

        next_individuals
    }
}

fn compare_fitness(a: &Individual, b: &Individual) -> Ordering {
    a.fitness.total_cmp(&b.fitness)
}

/// Returns the fittest of `tournament_size` randomly chosen individuals.
fn tournament_select<'a, R>(
    population: &[&'a Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0);
    population
        .choose_multiple(rng, tournament_size)
        .copied()
        .max_by(|a, b| compare_fitness(a, b))
        .expect("tournament over a non-empty population")
}

/// Settings for creating a fresh [`NetworkPopulation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkPopulationSettings {
    pub size: usize,
    pub hidden: usize,
    pub schedule: GeneticSchedule,
}

/// A population of networks bred with the GA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkPopulation {
    schedule: GeneticSchedule,
    individuals: Vec<Individual>,
}

impl NetworkPopulation {
    #[must_use]
    pub fn new(schedule: GeneticSchedule, individuals: Vec<Individual>) -> Self {
        Self {
            schedule,
            individuals,
        }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    #[must_use]
    pub fn schedule(&self) -> &GeneticSchedule {
        &self.schedule
    }
}

impl Population for NetworkPopulation {
    type Member = Individual;
    type Settings = NetworkPopulationSettings;

    fn new_population<R>(settings: &Self::Settings, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let max_weight = EvolutionPhase::default().max_weight();
        let individuals = (0..settings.size)
            .map(|_| Individual::random(rng, max_weight, settings.hidden))
            .collect();
        Self::new(settings.schedule, individuals)
    }

    fn matches_settings(&self, settings: &Self::Settings) -> bool {
        self.schedule == settings.schedule
            && self.individuals.len() == settings.size
            && self
                .individuals
                .iter()
                .all(|ind| ind.network().hidden() == settings.hidden)
    }

    fn members(&self) -> &[Individual] {
        &self.individuals
    }

    fn members_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    fn next_generation<R>(&self, generation: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let phase = EvolutionPhase::from_generation(generation);
        let evolver = self.schedule.evolver(phase);
        Self::new(self.schedule, evolver.evolve(&self.individuals, rng))
    }
}

/// Summary of the fitness distribution of one round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl FitnessStats {
    /// Returns `None` for an empty input.
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values.into_iter().collect::<Vec<_>>();
        if values.is_empty() {
            return None;
        }
        #[expect(clippy::cast_precision_loss)]
        let len = values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / len;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / len;
        Some(Self {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
        })
    }
}
