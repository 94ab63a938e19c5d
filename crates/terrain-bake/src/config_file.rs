//! Terrain configuration files.

use std::path::Path;

use terrain::config::TerrainConfig;

use crate::errors::BakeError;

/// Reads and validates a JSON terrain configuration. Missing fields take
/// their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<TerrainConfig, BakeError> {
    let text = std::fs::read_to_string(path)?;
    parse_config(&text)
}

pub fn parse_config(text: &str) -> Result<TerrainConfig, BakeError> {
    let config: TerrainConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
}
