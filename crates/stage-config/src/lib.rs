mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Returns the config directory, e.g. `~/.config/shadow-stage/`.
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("shadow-stage");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Returns the config file path: `<config dir>/shadow-stage/config.toml`.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load config from the default location, or return defaults if not found.
pub fn load_config() -> Result<StageConfig> {
    load_config_from(&config_path()?)
}

/// Load and validate config from `path`. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<StageConfig> {
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let config: StageConfig = toml::from_str(&contents)?;
        config.validate()?;
        info!(?path, "Loaded config");
        Ok(config)
    } else {
        info!("No config found, using defaults");
        Ok(StageConfig::default())
    }
}

/// Save config to the default location.
pub fn save_config(config: &StageConfig) -> Result<()> {
    save_config_to(&config_path()?, config)
}

/// Save config to `path`.
pub fn save_config_to(path: &Path, config: &StageConfig) -> Result<()> {
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    info!(?path, "Saved config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.orientation.mode, OrientationMode::RelativeTiltDelta);
        assert!((config.portal.surface.width - 0.8).abs() < 1e-6);
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = StageConfig::default();
        config.orientation.mode = OrientationMode::AbsoluteDeviceOrientation;
        config.orientation.alpha_offset_radians = 0.25;
        config.orientation.tilt.dead_zone_degrees = 1.5;
        config.portal.far = 12.0;
        save_config_to(&path, &config).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(
            loaded.orientation.mode,
            OrientationMode::AbsoluteDeviceOrientation
        );
        assert!((loaded.orientation.alpha_offset_radians - 0.25).abs() < 1e-6);
        assert!((loaded.orientation.tilt.dead_zone_degrees - 1.5).abs() < 1e-6);
        assert!((loaded.portal.far - 12.0).abs() < 1e-6);
        assert!(loaded
            .portal
            .surface
            .rotation
            .abs_diff_eq(config.portal.surface.rotation, 1e-6));
    }

    #[test]
    fn invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = StageConfig::default();
        config.orientation.tilt.smoothing = 1.5;
        save_config_to(&path, &config).unwrap();

        assert!(load_config_from(&path).is_err());
    }
}
