use std::{fs, path::Path};

use anyhow::{Context, Result};
use harvest_fleet_core::Tuning;

/// Loads tuning from a TOML file, falling back to defaults when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning file at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid tuning file {}", path.display()))
}

fn parse(contents: &str) -> Result<Tuning> {
    let tuning: Tuning = toml::from_str(contents).context("failed to parse tuning toml")?;
    tuning.validate()?;
    Ok(tuning)
}
