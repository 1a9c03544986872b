//! Checkpoint persistence for resumable training runs.
//!
//! A checkpoint is written after every evaluated generation. It carries the
//! generation index, the population already bred for the next generation, and
//! the best member seen so far. [`CheckpointStore`] is the seam the
//! orchestrator talks to; [`JsonCheckpointStore`] keeps one pretty-printed
//! JSON file per generation in a directory:
//!
//! ```text
//! checkpoints/
//!   pongevo-checkpoint-0.json
//!   pongevo-checkpoint-1.json
//!   ...
//! ```
//!
//! The latest checkpoint is the one with the highest generation index in its
//! file name. Files whose names do not carry an index are ignored.

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    genetic::{Individual, NetworkPopulation},
    model::ChampionModel,
    population::Population,
};

pub const CHECKPOINT_PREFIX: &str = "pongevo-checkpoint-";
pub const CHECKPOINT_EXTENSION: &str = "json";

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TrainingError {
    #[display("failed to access {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to read or write JSON in {}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A population member together with the round that produced its fitness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion<M> {
    pub generation: usize,
    pub fitness: f64,
    pub member: M,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint<P, M> {
    /// Index of the last fully evaluated generation.
    pub generation: usize,
    pub saved_at: DateTime<Utc>,
    /// Population to evaluate in `generation + 1`.
    pub population: P,
    pub best: Option<Champion<M>>,
}

/// Storage for checkpoints and the final champion of a run.
pub trait CheckpointStore<P>
where
    P: Population,
{
    type Handle;

    /// Returns the most recent checkpoint and its generation index, if any.
    fn find_latest(&self) -> Option<(Self::Handle, usize)>;

    fn restore(&self, handle: &Self::Handle) -> Result<Checkpoint<P, P::Member>, TrainingError>;

    fn save(&mut self, checkpoint: &Checkpoint<P, P::Member>) -> Result<(), TrainingError>;

    fn persist_best(&mut self, champion: &Champion<P::Member>) -> Result<(), TrainingError>;
}

/// Returns the generation index encoded in a checkpoint file name.
#[must_use]
pub fn parse_generation(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix(CHECKPOINT_PREFIX)?
        .strip_suffix(CHECKPOINT_EXTENSION)?
        .strip_suffix('.')?
        .parse()
        .ok()
}

#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    directory: PathBuf,
    champion_path: PathBuf,
    model_name: String,
}

impl JsonCheckpointStore {
    pub fn new<D, C>(directory: D, champion_path: C, model_name: &str) -> Self
    where
        D: Into<PathBuf>,
        C: Into<PathBuf>,
    {
        Self {
            directory: directory.into(),
            champion_path: champion_path.into(),
            model_name: model_name.to_owned(),
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    #[must_use]
    pub fn champion_path(&self) -> &Path {
        &self.champion_path
    }

    #[must_use]
    pub fn checkpoint_path(&self, generation: usize) -> PathBuf {
        self.directory
            .join(format!("{CHECKPOINT_PREFIX}{generation}.{CHECKPOINT_EXTENSION}"))
    }
}

impl CheckpointStore<NetworkPopulation> for JsonCheckpointStore {
    type Handle = PathBuf;

    fn find_latest(&self) -> Option<(PathBuf, usize)> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!(
                    "no checkpoint directory at {}: {e}",
                    self.directory.display()
                );
                return None;
            }
        };
        entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let generation = parse_generation(entry.file_name().to_str()?)?;
                Some((entry.path(), generation))
            })
            .max_by_key(|(_, generation)| *generation)
    }

    fn restore(
        &self,
        handle: &PathBuf,
    ) -> Result<Checkpoint<NetworkPopulation, Individual>, TrainingError> {
        read_json(handle)
    }

    fn save(
        &mut self,
        checkpoint: &Checkpoint<NetworkPopulation, Individual>,
    ) -> Result<(), TrainingError> {
        let path = self.checkpoint_path(checkpoint.generation);
        write_json(&path, checkpoint)?;
        log::debug!("saved checkpoint {}", path.display());
        Ok(())
    }

    fn persist_best(&mut self, champion: &Champion<Individual>) -> Result<(), TrainingError> {
        let model = ChampionModel::from_champion(&self.model_name, champion);
        write_json(&self.champion_path, &model)
    }
}

pub fn read_json<T>(path: &Path) -> Result<T, TrainingError>
where
    T: DeserializeOwned,
{
    let file = File::open(path).map_err(|source| TrainingError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| TrainingError::Json {
        path: path.to_owned(),
        source,
    })
}

/// Writes `value` as pretty JSON, replacing `path` only once the write succeeded.
pub fn write_json<T>(path: &Path, value: &T) -> Result<(), TrainingError>
where
    T: Serialize,
{
    let io_error = |source| TrainingError::Io {
        path: path.to_owned(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let mut writer = BufWriter::new(File::create(&temp_path).map_err(io_error)?);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| TrainingError::Json {
        path: path.to_owned(),
        source,
    })?;
    writeln!(writer).map_err(io_error)?;
    writer.flush().map_err(io_error)?;
    drop(writer);

    fs::rename(&temp_path, path).map_err(io_error)
}
