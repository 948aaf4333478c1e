//! Light/dark preference, persisted between runs.

use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl Display for ThemePreference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(ValidationError::InvalidTheme {
                value: value.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to access theme preference at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Storage backing a [`ThemeContext`].
pub trait PreferenceStore {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<ThemePreference>, PreferenceError>;

    fn save(&self, theme: ThemePreference) -> Result<(), PreferenceError>;
}

/// Stores the preference as a single word in a text file.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> PreferenceError {
        PreferenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Option<ThemePreference>, PreferenceError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents.parse()?)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(self.io_error(error)),
        }
    }

    fn save(&self, theme: ThemePreference) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|error| self.io_error(error))?;
        }
        fs::write(&self.path, theme.as_str()).map_err(|error| self.io_error(error))
    }
}

#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    value: Mutex<Option<ThemePreference>>,
}

impl MemoryPreferenceStore {
    pub fn with_value(theme: ThemePreference) -> Self {
        Self {
            value: Mutex::new(Some(theme)),
        }
    }

    pub fn stored(&self) -> Option<ThemePreference> {
        *self.value.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Option<ThemePreference>, PreferenceError> {
        Ok(self.stored())
    }

    fn save(&self, theme: ThemePreference) -> Result<(), PreferenceError> {
        *self.value.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(theme);
        Ok(())
    }
}

/// Current theme plus the store it writes through to.
#[derive(Debug)]
pub struct ThemeContext<P> {
    store: P,
    current: ThemePreference,
}

impl<P: PreferenceStore> ThemeContext<P> {
    /// Starts from the stored preference. A missing or unreadable value
    /// falls back to light.
    pub fn load(store: P) -> Self {
        let current = match store.load() {
            Ok(stored) => stored.unwrap_or_default(),
            Err(error) => {
                warn!(%error, "ignoring unreadable theme preference");
                ThemePreference::default()
            }
        };
        Self { store, current }
    }

    pub fn current(&self) -> ThemePreference {
        self.current
    }

    pub fn set(&mut self, theme: ThemePreference) -> Result<ThemePreference, PreferenceError> {
        self.store.save(theme)?;
        self.current = theme;
        Ok(theme)
    }

    pub fn toggle(&mut self) -> Result<ThemePreference, PreferenceError> {
        self.set(self.current.toggled())
    }

    pub fn store(&self) -> &P {
        &self.store
    }
}
