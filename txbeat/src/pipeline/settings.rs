// Read once at startup, never written. Patterns are not stored anywhere;
// this only holds defaults the user wants every session.
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::sequencer::timing::{DEFAULT_BPM, DEFAULT_SWING};

const TXBEAT_DIR: &str = ".txbeat";
const SETTINGS_FILE: &str = "settings.json";

pub const DEFAULT_HOME_URL: &str = "https://example.com/";
pub const DEFAULT_RECIPIENT: &str = "0x1111111111111111111111111111111111111111";
pub const USDC_ON_BASE: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bpm: u32,
    pub swing: u32,
    pub home_url: String, // base for share links
    pub recipient: String, // who receives tips
    pub token_contract: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            swing: DEFAULT_SWING,
            home_url: DEFAULT_HOME_URL.to_string(),
            recipient: DEFAULT_RECIPIENT.to_string(),
            token_contract: USDC_ON_BASE.to_string(),
        }
    }
}

// <dir>/.txbeat/settings.json
fn settings_file_path(dir: &Path) -> PathBuf {
    dir.join(TXBEAT_DIR).join(SETTINGS_FILE)
}

fn read_settings(path: &Path) -> anyhow::Result<Settings> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let settings = serde_json::from_str(&data)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(settings)
}

/// Settings from `dir`, or defaults if the file is missing or broken.
pub fn load_settings(dir: &Path) -> Settings {
    let path = settings_file_path(dir);
    if !path.exists() {
        log::debug!("no settings at {}, using defaults", path.display());
        return Settings::default();
    }
    match read_settings(&path) {
        Ok(settings) => {
            log::info!("loaded settings from {}", path.display());
            settings
        }
        Err(e) => {
            log::warn!("ignoring settings: {e:#}");
            Settings::default()
        }
    }
}
