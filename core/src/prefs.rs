// Client preferences
//
// Theme and language survive restarts in a small TOML file. All changes go
// through `PreferenceStore::update`, which persists before returning.

use crate::{DashError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_PREFS_FILE: &str = "dasturxon_prefs.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Uzbek
    #[default]
    Uz,
    /// Russian
    Ru,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Uz => "uz",
            Language::Ru => "ru",
        }
    }

    /// Name of the language in itself, as shown in the language menu
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Uz => "O'zbek",
            Language::Ru => "Русский",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uz" => Ok(Language::Uz),
            "ru" => Ok(Language::Ru),
            other => Err(DashError::ConfigError(format!("unknown language: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
    pub language: Language,
}

/// Preferences backed by a file
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    current: Preferences,
}

impl PreferenceStore {
    /// Path from `DASTURXON_PREFS`, else `./dasturxon_prefs.toml`
    pub fn default_path() -> PathBuf {
        std::env::var("DASTURXON_PREFS")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PREFS_FILE))
    }

    /// Read preferences from `path`. A missing or unreadable file yields the
    /// defaults; nothing is written until the first update.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<Preferences>(&text) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!(target: "prefs", path = %path.display(), error = %e, "Invalid preferences file; using defaults");
                    Preferences::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(target: "prefs", path = %path.display(), "No preferences file; using defaults");
                Preferences::default()
            }
            Err(e) => {
                warn!(target: "prefs", path = %path.display(), error = %e, "Failed to read preferences; using defaults");
                Preferences::default()
            }
        };
        Self { path, current }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Preferences {
        self.current
    }

    /// Apply `change` and persist the result.
    /// On a write failure the in-memory value is left unchanged.
    pub fn update(&mut self, change: impl FnOnce(&mut Preferences)) -> Result<Preferences> {
        let mut next = self.current;
        change(&mut next);

        let text = toml::to_string(&next)
            .map_err(|e| DashError::ConfigError(format!("Failed to encode preferences: {e}")))?;
        std::fs::write(&self.path, text)?;

        info!(
            target: "prefs",
            theme = ?next.theme,
            language = next.language.code(),
            "Preferences saved"
        );
        self.current = next;
        Ok(next)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme> {
        self.update(|p| p.theme = p.theme.toggled()).map(|p| p.theme)
    }

    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.update(|p| p.language = language).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_prefs(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "dasturxon_prefs_{}_{}.toml",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let store = PreferenceStore::load(temp_prefs("missing"));
        assert_eq!(store.current(), Preferences::default());
        assert_eq!(store.current().theme, Theme::Light);
        assert_eq!(store.current().language, Language::Uz);
    }

    #[test]
    fn test_update_persists() {
        let path = temp_prefs("persist");
        let mut store = PreferenceStore::load(&path);
        assert_eq!(store.toggle_theme().unwrap(), Theme::Dark);
        store.set_language(Language::Ru).unwrap();

        let reloaded = PreferenceStore::load(&path);
        assert_eq!(
            reloaded.current(),
            Preferences {
                theme: Theme::Dark,
                language: Language::Ru
            }
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let path = temp_prefs("invalid");
        std::fs::write(&path, "theme = \"purple\"").unwrap();
        let store = PreferenceStore::load(&path);
        assert_eq!(store.current(), Preferences::default());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let path = temp_prefs("partial");
        std::fs::write(&path, "language = \"ru\"\n").unwrap();
        let store = PreferenceStore::load(&path);
        assert_eq!(store.current().language, Language::Ru);
        assert_eq!(store.current().theme, Theme::Light);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let dir = std::env::temp_dir().join(format!("dasturxon_no_such_dir_{}", std::process::id()));
        let mut store = PreferenceStore::load(dir.join("prefs.toml"));
        assert!(store.toggle_theme().is_err());
        assert_eq!(store.current().theme, Theme::Light);
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("RU".parse::<Language>().unwrap(), Language::Ru);
        assert!("en".parse::<Language>().is_err());
    }
}
