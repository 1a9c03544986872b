use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{checkpoint::Champion, genetic::Individual, network::Network};

/// The best network of a completed training run, as saved to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Generation in which the network reached `fitness`.
    pub generation: usize,
    pub fitness: f64,
    pub network: Network,
}

impl ChampionModel {
    #[must_use]
    pub fn from_champion(name: &str, champion: &Champion<Individual>) -> Self {
        Self {
            name: name.to_owned(),
            trained_at: Utc::now(),
            generation: champion.generation,
            fitness: champion.fitness,
            network: champion.member.network().clone(),
        }
    }
}
