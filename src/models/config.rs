use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;
pub const MAX_LEADERBOARD_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HuntConfig {
    /// Directory holding `state.json` and `submissions.jsonl`.
    pub data_dir: PathBuf,
    pub leaderboard_size: usize,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            data_dir: get_config_dir(),
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
        }
    }
}

impl HuntConfig {
    /// Config file first, then `LEOHUNT_*` environment overrides.
    pub fn load() -> Self {
        let mut config = load_config_file();

        if let Ok(dir) = env::var("LEOHUNT_DATA_DIR") {
            info!("LEOHUNT_DATA_DIR set, using {dir}");
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(raw) = env::var("LEOHUNT_LEADERBOARD_SIZE") {
            match raw.parse::<usize>() {
                Ok(size) => config.leaderboard_size = size,
                Err(e) => warn!("Invalid LEOHUNT_LEADERBOARD_SIZE value '{raw}': {e}"),
            }
        }

        config.leaderboard_size = clamp_size(config.leaderboard_size);
        config
    }
}

/// Normalises a configured leaderboard size into [1, 100].
pub fn clamp_size(size: usize) -> usize {
    clamp_top_n(i64::try_from(size).unwrap_or(i64::MAX), DEFAULT_LEADERBOARD_SIZE)
}

/// `top_n < 1` falls back to `default`; anything above 100 is capped.
pub fn clamp_top_n(top_n: i64, default: usize) -> usize {
    if top_n < 1 {
        return default.clamp(1, MAX_LEADERBOARD_SIZE);
    }
    (top_n as u64).min(MAX_LEADERBOARD_SIZE as u64) as usize
}

pub fn get_config_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".config").join("leohunt"),
        None => {
            warn!("Could not determine home directory, using current directory");
            PathBuf::from(".leohunt")
        }
    }
}

pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.json")
}

fn load_config_file() -> HuntConfig {
    let path = get_config_path();
    if !path.exists() {
        return HuntConfig::default();
    }

    match fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!("Failed to parse {}: {e}", path.display());
            HuntConfig::default()
        }),
        Err(e) => {
            warn!("Failed to read {}: {e}", path.display());
            HuntConfig::default()
        }
    }
}
