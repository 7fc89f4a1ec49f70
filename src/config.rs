use crate::assessment::{Percent, PERFECT};
use crate::error::TrainerResult;
use crate::key_set::KeySetName;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// How mismatched keystrokes are presented to the user. Read by the display
/// layer; the session core treats every mode the same.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
pub enum ErrorHandlingMode {
    /// Wrong keys are left selected and overwritten by the next keystroke.
    Ignore,
    /// Wrong keys must be removed with backspace before continuing.
    #[default]
    Backspace,
}

/// User-editable configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub key_set_name: KeySetName,
    pub shift_enabled: bool,
    pub control_enabled: bool,
    pub alt_enabled: bool,
    pub error_handling_mode: ErrorHandlingMode,
    pub difficulty_target: Percent,
    pub difficulty_auto_adjust: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_set_name: KeySetName::HomeKeys,
            shift_enabled: false,
            control_enabled: false,
            alt_enabled: false,
            error_handling_mode: ErrorHandlingMode::Backspace,
            difficulty_target: PERFECT,
            difficulty_auto_adjust: false,
        }
    }
}

impl Config {
    /// Whether switching from `self` to `other` changes which keys can be
    /// prompted.
    pub fn changes_prompt_pool(&self, other: &Config) -> bool {
        self.key_set_name != other.key_set_name
            || self.shift_enabled != other.shift_enabled
            || self.control_enabled != other.control_enabled
            || self.alt_enabled != other.alt_enabled
            || self.difficulty_target != other.difficulty_target
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> TrainerResult<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "keydrill") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("keydrill_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Ignoring unreadable config at {:?}: {}", self.path, e);
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> TrainerResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
