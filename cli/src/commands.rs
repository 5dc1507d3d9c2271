pub mod list;
pub mod show;

use anyhow::Result;
use catchment::EngineConfig;

use crate::cli::Cli;

/// Config from `--config`, or the defaults.
pub(crate) fn load_config(cli: &Cli) -> Result<EngineConfig> {
    match &cli.config {
        Some(path) => EngineConfig::from_json_file(path),
        None => Ok(EngineConfig::default()),
    }
}
