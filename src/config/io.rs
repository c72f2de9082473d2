//! Config I/O operations: load and save.

use std::path::PathBuf;

use super::types::Config;

pub fn get_config_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_default()
        .join("voice-orb-assistant");
    let _ = std::fs::create_dir_all(&config_dir);
    config_dir.join("config_v1.json")
}

pub fn load_config() -> Config {
    let path = get_config_path();
    let mut config = if path.exists() {
        let data = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&data).unwrap_or_default()
    } else {
        Config::default()
    };

    // Out-of-range values from hand-edited files get clamped rather than rejected
    config.brightness = config.brightness.clamp(0.2, 1.0);
    if config.agent_id.trim().is_empty() {
        config.agent_id = Config::default().agent_id;
    }
    config
}

pub fn save_config(config: &Config) {
    let path = get_config_path();
    if let Ok(json) = serde_json::to_string_pretty(config) {
        if let Err(e) = std::fs::write(&path, json) {
            crate::log_info!("Failed to save config to {:?}: {}", path, e);
        }
    }
}
