//! Configuration loading
//!
//! An optional TOML file, overridden by `MEDIA_PLAYER_*` environment
//! variables with `__` between nested keys (e.g. `MEDIA_PLAYER_AUDIO__GAIN=2`).

use anyhow::{Context, Result};
use media_player::PlayerConfig;
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "MEDIA_PLAYER";

/// Load and validate the player configuration
pub fn load_config(path: Option<&Path>) -> Result<PlayerConfig> {
    let mut settings = config::Config::builder();

    if let Some(path) = path {
        settings = settings.add_source(config::File::from(path.to_path_buf()));
    }

    settings = settings.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config: PlayerConfig = settings
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
