//! User settings with injected persistence
//!
//! [`SettingsStore`] reads once when created and writes through on every
//! change. Where the settings live is up to the [`SettingsPersistence`]
//! adapter.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for settings persistence
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Settings file could not be read or written
    #[error("Settings I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored settings could not be parsed or serialized
    #[error("Invalid settings data: {0}")]
    Format(#[from] serde_json::Error),
}

impl Serialize for SettingsError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Light or dark appearance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Persisted user settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub theme: ThemeMode,
}

/// Storage port for [`Settings`]
pub trait SettingsPersistence {
    /// Stored settings, or `None` if nothing was saved yet
    ///
    /// # Errors
    /// Storage or format failures.
    fn load(&self) -> Result<Option<Settings>, SettingsError>;

    /// Replace the stored settings
    ///
    /// # Errors
    /// Storage or format failures.
    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// In-process storage, lost on exit
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    stored: Mutex<Option<Settings>>,
}

impl MemoryPersistence {
    /// Storage pre-filled with `settings`
    pub fn with(settings: Settings) -> Self {
        Self {
            stored: Mutex::new(Some(settings)),
        }
    }

    /// Last saved settings
    pub fn stored(&self) -> Option<Settings> {
        *self.stored.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SettingsPersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<Settings>, SettingsError> {
        Ok(self.stored())
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        *self.stored.lock().unwrap_or_else(|e| e.into_inner()) = Some(*settings);
        Ok(())
    }
}

/// JSON file storage
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    /// Store settings at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsPersistence for JsonFilePersistence {
    fn load(&self) -> Result<Option<Settings>, SettingsError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }
}

/// Settings held in memory and written through to persistence
#[derive(Debug)]
pub struct SettingsStore<P> {
    persistence: P,
    current: Settings,
}

impl<P: SettingsPersistence> SettingsStore<P> {
    /// Read stored settings, falling back to defaults
    ///
    /// Unreadable storage is logged and treated as empty.
    pub fn new(persistence: P) -> Self {
        let current = match persistence.load() {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "could not read settings, using defaults");
                Settings::default()
            }
        };
        debug!(?current, "settings loaded");
        Self {
            persistence,
            current,
        }
    }

    /// Current theme
    pub fn theme(&self) -> ThemeMode {
        self.current.theme
    }

    /// Change the theme and save
    ///
    /// # Errors
    /// Storage failures; the in-memory value is updated regardless.
    pub fn set_theme(&mut self, theme: ThemeMode) -> Result<ThemeMode, SettingsError> {
        self.current.theme = theme;
        self.persistence.save(&self.current)?;
        Ok(theme)
    }

    /// Flip between light and dark and save
    ///
    /// # Errors
    /// Storage failures; the in-memory value is updated regardless.
    pub fn toggle_theme(&mut self) -> Result<ThemeMode, SettingsError> {
        self.set_theme(self.current.theme.toggled())
    }

    /// Underlying storage adapter
    pub fn persistence(&self) -> &P {
        &self.persistence
    }
}
