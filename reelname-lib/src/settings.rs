//! User settings stored at `<config dir>/reelname/settings.toml`.
//!
//! Settings are read once at startup and turned into explicit configuration
//! values ([`PipelineConfig`], [`ScanOptions`], a [`StateStore`]) that are
//! passed to each component. Nothing reads them from global state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reelname_core::{ConflictStrategy, MediaKind};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::journal::{StateStore, default_journal_path};
use crate::pipeline::{DEFAULT_CONCURRENCY, PipelineConfig};
use crate::rate_limit::RateLimiter;
use crate::scanner::ScanOptions;

const APP_DIR: &str = "reelname";
const SETTINGS_FILE: &str = "settings.toml";

/// Keys accepted by [`Settings::set_value`].
pub const SETTABLE_KEYS: &[&str] = &[
    "concurrency",
    "conflict_strategy",
    "requests_per_second",
    "provider_timeout_secs",
    "journal_path",
];

/// Canonical path to the settings file.
pub fn settings_path() -> Result<PathBuf, SettingsError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
        .ok_or(SettingsError::NoConfigDir)
}

/// A media directory to scan by default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub path: PathBuf,
    #[serde(default, with = "kind_name")]
    pub kind: MediaKind,
    #[serde(default = "default_true")]
    pub recursive: bool,
    /// Overrides the global conflict strategy for files under this directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_strategy: Option<ConflictStrategy>,
}

impl DirectoryConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: MediaKind::Unknown,
            recursive: true,
            conflict_strategy: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Directory kinds are written as `auto`, `movie` or `tv`.
mod kind_name {
    use reelname_core::MediaKind;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(kind: &MediaKind, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(match kind {
            MediaKind::Movie => "movie",
            MediaKind::Episode => "tv",
            MediaKind::Unknown => "auto",
        })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<MediaKind, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub concurrency: usize,
    pub conflict_strategy: ConflictStrategy,
    /// Provider calls per second. `0` disables rate limiting.
    pub requests_per_second: f64,
    /// Per-file provider time budget. `0` waits indefinitely.
    pub provider_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_path: Option<PathBuf>,
    pub directories: Vec<DirectoryConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            conflict_strategy: ConflictStrategy::AppendNumber,
            requests_per_second: 4.0,
            provider_timeout_secs: 60,
            journal_path: None,
            directories: Vec::new(),
        }
    }
}

impl Settings {
    /// Load from the canonical path. A missing file gives defaults.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let settings: Settings = toml::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&settings_path()?)
    }

    /// The settings as they would be written to disk.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write atomically through a sibling temp file.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;
        let serialized = self.to_toml()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, serialized)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.concurrency == 0 {
            return Err(SettingsError::invalid("concurrency", "must be at least 1"));
        }
        if !self.requests_per_second.is_finite() || self.requests_per_second < 0.0 {
            return Err(SettingsError::invalid(
                "requests_per_second",
                "must be zero or a positive number",
            ));
        }
        if self.requests_per_second > 0.0 && RateLimiter::per_second(self.requests_per_second).is_none() {
            return Err(SettingsError::invalid(
                "requests_per_second",
                "is too small to schedule; use 0 to disable rate limiting",
            ));
        }
        if let Some(i) = self.directories.iter().position(|d| d.path.as_os_str().is_empty()) {
            return Err(SettingsError::invalid(
                "directories",
                format!("entry {} has an empty path", i + 1),
            ));
        }
        Ok(())
    }

    /// Update one scalar setting from its string form, then re-validate.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut next = self.clone();
        match key {
            "concurrency" => {
                next.concurrency = value
                    .parse()
                    .map_err(|_| SettingsError::invalid(key, format!("'{value}' is not a count")))?;
            }
            "conflict_strategy" => {
                next.conflict_strategy = value
                    .parse()
                    .map_err(|e| SettingsError::invalid(key, format!("{e}")))?;
            }
            "requests_per_second" => {
                next.requests_per_second = value
                    .parse()
                    .map_err(|_| SettingsError::invalid(key, format!("'{value}' is not a number")))?;
            }
            "provider_timeout_secs" => {
                next.provider_timeout_secs = value
                    .parse()
                    .map_err(|_| SettingsError::invalid(key, format!("'{value}' is not a duration in seconds")))?;
            }
            "journal_path" => {
                next.journal_path = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            other => return Err(SettingsError::UnknownKey(other.to_string())),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            concurrency: self.concurrency,
            item_timeout: (self.provider_timeout_secs > 0)
                .then(|| Duration::from_secs(self.provider_timeout_secs)),
        }
    }

    pub fn rate_limiter(&self) -> Option<RateLimiter> {
        RateLimiter::per_second(self.requests_per_second)
    }

    /// Scan options for a configured directory, falling back to the global strategy.
    pub fn scan_options(&self, dir: &DirectoryConfig) -> ScanOptions {
        ScanOptions {
            recursive: dir.recursive,
            kind: dir.kind,
            strategy: dir.conflict_strategy.unwrap_or(self.conflict_strategy),
        }
    }

    pub fn journal_store(&self) -> Result<StateStore, SettingsError> {
        match &self.journal_path {
            Some(path) => Ok(StateStore::new(path)),
            None => default_journal_path()
                .map(StateStore::new)
                .map_err(|_| SettingsError::NoConfigDir),
        }
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
