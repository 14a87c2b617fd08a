use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::{sanitize_config, Config};

const CONFIG_DIR_NAME: &str = "creature-stumbler";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Returns `<config dir>/creature-stumbler/config.toml`.
pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|config_dir| config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or_else(|| "could not determine the user config directory".to_string())
}

/// Writes a default config file when `path` does not exist yet.
pub fn ensure_config_file(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    if let Some(config_root) = path.parent() {
        std::fs::create_dir_all(config_root).map_err(|err| {
            format!(
                "Failed to create config directory {}: {}",
                config_root.display(),
                err
            )
        })?;
    }
    info!(
        "Config file not found. Creating default config. path={}",
        path.display()
    );
    let default_text = toml::to_string(&Config::default())
        .map_err(|err| format!("failed to serialize default config: {}", err))?;
    std::fs::write(path, default_text)
        .map_err(|err| format!("Failed to write config to {}: {}", path.display(), err))
}

/// Parses config text, falling back to defaults when the text is not a valid config.
pub fn parse_config_text(config_text: &str, source: &Path) -> Config {
    match toml::from_str::<Config>(config_text) {
        Ok(config) => sanitize_config(config),
        Err(err) => {
            warn!(
                "Failed to parse config file {}. Using defaults. error={}",
                source.display(),
                err
            );
            sanitize_config(Config::default())
        }
    }
}

/// Loads the config at `path`, creating it with defaults on first run.
pub fn load_or_create_config(path: &Path) -> Result<Config, String> {
    ensure_config_file(path)?;
    let config_text = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read config {}: {}", path.display(), err))?;
    Ok(parse_config_text(&config_text, path))
}
