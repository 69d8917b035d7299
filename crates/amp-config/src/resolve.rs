//! Config resolution: explicit path → `AMPUTE_CONFIG` env var → defaults.

use std::path::{Path, PathBuf};

use amp_common::Result;

use crate::amputer::AmputerConfig;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "AMPUTE_CONFIG";

/// Where a resolved configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Environment(PathBuf),
    Defaults,
}

/// Read and parse a JSON config file.
pub fn load_config(path: &Path) -> Result<AmputerConfig> {
    let raw = std::fs::read_to_string(path)?;
    AmputerConfig::from_json_str(&raw)
}

/// Resolve the configuration to use.
///
/// An explicit path wins; otherwise `AMPUTE_CONFIG` is consulted; otherwise
/// built-in defaults apply. A named file that cannot be read is an error.
pub fn resolve_config(explicit: Option<&Path>) -> Result<(AmputerConfig, ConfigSource)> {
    resolve_with_env(explicit, std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
}

fn resolve_with_env(
    explicit: Option<&Path>,
    env_path: Option<PathBuf>,
) -> Result<(AmputerConfig, ConfigSource)> {
    if let Some(path) = explicit {
        return Ok((load_config(path)?, ConfigSource::Explicit(path.to_path_buf())));
    }
    if let Some(path) = env_path.filter(|p| !p.as_os_str().is_empty()) {
        let config = load_config(&path)?;
        return Ok((config, ConfigSource::Environment(path)));
    }
    Ok((AmputerConfig::default(), ConfigSource::Defaults))
}
