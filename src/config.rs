use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tokio::fs;
use tokio::fs::try_exists;
use tracing::warn;

use crate::constants::CONFIG_FILE_NAME;
use crate::models::{CaptionSettings, CaptionerConfig, Theme};

/// The config file lives beside the executable.
pub fn default_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

/// Loads the configuration, falling back to defaults when the file is
/// missing, unreadable, or malformed. Never fails.
pub async fn load(path: &Path) -> CaptionerConfig {
    match try_exists(path).await {
        Ok(true) => {}
        Ok(false) => return CaptionerConfig::default(),
        Err(err) => {
            warn!("Failed to check config file '{}': {}", path.display(), err);
            return CaptionerConfig::default();
        }
    }

    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) => {
            warn!("Unable to read config file '{}': {}", path.display(), err);
            return CaptionerConfig::default();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(config) => config,
        Err(err) => {
            warn!("Unable to parse config file '{}': {}", path.display(), err);
            CaptionerConfig::default()
        }
    }
}

/// Persists the captioning settings, leaving other fields (theme, anything
/// written by other tools) untouched. Best effort: failures are logged.
pub async fn save_settings(path: &Path, settings: &CaptionSettings) {
    let mut fields = Map::new();
    fields.insert(
        "server_url".to_string(),
        Value::String(settings.server_url.clone()),
    );
    fields.insert(
        "folder_path".to_string(),
        Value::String(settings.folder_path.clone()),
    );
    fields.insert(
        "system_instruction".to_string(),
        Value::String(settings.system_instruction.clone()),
    );
    fields.insert("prompt".to_string(), Value::String(settings.prompt.clone()));

    if let Err(err) = merge_into_file(path, fields).await {
        warn!("Could not save config: {err}");
    }
}

/// Persists only the theme choice.
pub async fn save_theme(path: &Path, theme: Theme) {
    let mut fields = Map::new();
    fields.insert(
        "theme".to_string(),
        Value::String(theme.as_str().to_string()),
    );

    if let Err(err) = merge_into_file(path, fields).await {
        warn!("Could not save config: {err}");
    }
}

async fn merge_into_file(path: &Path, fields: Map<String, Value>) -> Result<()> {
    let mut data = read_existing_object(path).await;
    for (key, value) in fields {
        data.insert(key, value);
    }

    let payload = serde_json::to_string_pretty(&Value::Object(data))
        .context("Unable to serialise configuration")?;

    fs::write(path, payload)
        .await
        .with_context(|| format!("Unable to write config file '{}'", path.display()))
}

/// An unreadable or malformed file counts as empty so a save can still
/// proceed.
async fn read_existing_object(path: &Path) -> Map<String, Value> {
    let Ok(contents) = fs::read_to_string(path).await else {
        return Map::new();
    };

    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
