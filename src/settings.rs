//! Persisted user preferences.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{NebulaError, NebulaResult};

/// User-facing theme preferences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Dark theme: the backdrop clears to an opaque background. Light theme clears to
    /// transparent so page content behind the canvas shows through.
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { dark_mode: true }
    }
}

/// JSON file holding [`Settings`].
///
/// Nothing is cached: every [`SettingsStore::load`] reads the file and every
/// [`SettingsStore::save`] rewrites it.
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read settings; a missing file yields defaults.
    pub fn load(&self) -> NebulaResult<Settings> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no settings file; using defaults");
                return Ok(Settings::default());
            }
            Err(e) => {
                return Err(NebulaError::Other(anyhow::Error::new(e).context(format!(
                    "read settings '{}'",
                    self.path.display()
                ))));
            }
        };
        serde_json::from_str(&text).map_err(|e| {
            NebulaError::serde(format!("parse settings '{}': {e}", self.path.display()))
        })
    }

    /// Write settings, creating parent directories as needed.
    pub fn save(&self, settings: &Settings) -> NebulaResult<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("create settings dir '{}'", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| NebulaError::serde(format!("serialize settings: {e}")))?;
        fs::write(&self.path, json)
            .with_context(|| format!("write settings '{}'", self.path.display()))?;
        tracing::debug!(
            path = %self.path.display(),
            dark_mode = settings.dark_mode,
            "settings saved"
        );
        Ok(())
    }

    /// Set the theme flag and persist it.
    pub fn set_dark_mode(&self, dark_mode: bool) -> NebulaResult<Settings> {
        let mut settings = self.load()?;
        settings.dark_mode = dark_mode;
        self.save(&settings)?;
        Ok(settings)
    }

    /// Flip the theme flag and persist it.
    pub fn toggle_dark_mode(&self) -> NebulaResult<Settings> {
        let current = self.load()?;
        self.set_dark_mode(!current.dark_mode)
    }
}

#[cfg(test)]
#[path = "../tests/unit/settings.rs"]
mod tests;
