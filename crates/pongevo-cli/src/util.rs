use std::{
    io::{self, Write as _},
    path::Path,
};

use anyhow::Context as _;
use pongevo_training::{checkpoint, model::ChampionModel};
use serde::Serialize;

/// Prints `value` as pretty JSON to `output`, or to stdout when no path is given.
pub(crate) fn emit_json<T>(value: &T, output: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    if let Some(path) = output {
        checkpoint::write_json(path, value)
            .with_context(|| format!("Failed to save output file: {}", path.display()))?;
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("Failed to write JSON to stdout")?;
    writeln!(stdout).context("Failed to write JSON to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}

pub(crate) fn read_champion_file<P>(path: P) -> anyhow::Result<ChampionModel>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    checkpoint::read_json(path)
        .with_context(|| format!("Failed to load champion file: {}", path.display()))
}
