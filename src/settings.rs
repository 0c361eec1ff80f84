use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

/// The xDrip+ local web server default, so a paired phone works without
/// any configuration.
pub const DEFAULT_NIGHTSCOUT_URL: &str = "http://127.0.0.1:17580/sgv.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightscoutSettings {
    pub url: String,
    /// Empty means no auth headers are sent.
    pub api_token: String,
}

impl Default for NightscoutSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_NIGHTSCOUT_URL.into(),
            api_token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserSettings {
    nightscout: NightscoutSettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            nightscout: NightscoutSettings::default(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn nightscout(&self) -> NightscoutSettings {
        self.data.read().unwrap().nightscout.clone()
    }

    pub fn update_nightscout(&self, settings: NightscoutSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            guard.nightscout = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    /// Re-read the file, picking up edits made outside this process.
    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: UserSettings = serde_json::from_str(&contents)?;
        let mut guard = self.data.write().unwrap();
        *guard = data;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
