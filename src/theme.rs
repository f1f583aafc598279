//! Persisted light/dark preference with a terminal fallback

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
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

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Interpret a `COLORFGBG` value (`fg;bg` or `fg;x;bg`).
    ///
    /// Background indices 0-6 and 8 are the dark ANSI colors.
    pub fn from_colorfgbg(value: &str) -> Option<Self> {
        let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
        match bg {
            0..=6 | 8 => Some(Theme::Dark),
            _ => Some(Theme::Light),
        }
    }

    /// What the terminal says it prefers, if anything
    pub fn system_preference() -> Option<Self> {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|v| Self::from_colorfgbg(&v))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => anyhow::bail!("Unknown theme '{other}' (expected 'light' or 'dark')"),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<Theme>,
}

/// Reads and writes `preferences.json` in the state directory
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join(PREFERENCES_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored choice, or `None` when the user never picked one
    pub fn stored(&self) -> Result<Option<Theme>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents =
            fs::read_to_string(&self.path).context("Failed to read preferences file")?;
        let prefs: Preferences =
            serde_json::from_str(&contents).context("Failed to parse preferences file")?;
        Ok(prefs.theme)
    }

    /// Stored choice, then the terminal preference, then `default`
    pub fn resolve(&self, default: Theme) -> Theme {
        self.resolve_with(Theme::system_preference(), default)
    }

    fn resolve_with(&self, system: Option<Theme>, default: Theme) -> Theme {
        let stored = self.stored().unwrap_or_else(|e| {
            tracing::warn!(error = %e, path = %self.path.display(), "Ignoring unreadable theme preference");
            None
        });
        stored.or(system).unwrap_or(default)
    }

    pub fn save(&self, theme: Theme) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create state directory")?;
        }
        let contents = serde_json::to_string_pretty(&Preferences { theme: Some(theme) })?;
        fs::write(&self.path, contents).context("Failed to write preferences file")?;
        tracing::debug!(theme = %theme, "Saved theme preference");
        Ok(())
    }

    /// Flip `current` and persist the result
    pub fn toggle(&self, current: Theme) -> Result<Theme> {
        let next = current.toggled();
        self.save(next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_colorfgbg_parsing() {
        assert_eq!(Theme::from_colorfgbg("15;0"), Some(Theme::Dark));
        assert_eq!(Theme::from_colorfgbg("15;default;8"), Some(Theme::Dark));
        assert_eq!(Theme::from_colorfgbg("0;15"), Some(Theme::Light));
        assert_eq!(Theme::from_colorfgbg("0;7"), Some(Theme::Light));
        assert_eq!(Theme::from_colorfgbg("garbage"), None);
    }

    #[test]
    fn test_parse_theme_name() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" light ".parse::<Theme>().unwrap(), Theme::Light);
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let store = ThemeStore::new(dir.path());
        assert_eq!(store.stored().unwrap(), None);
        assert_eq!(store.resolve_with(Some(Theme::Dark), Theme::Light), Theme::Dark);
        assert_eq!(store.resolve_with(None, Theme::Light), Theme::Light);
    }

    #[test]
    fn test_stored_choice_wins() {
        let dir = TempDir::new().unwrap();
        let store = ThemeStore::new(dir.path());
        store.save(Theme::Light).unwrap();
        assert_eq!(store.resolve_with(Some(Theme::Dark), Theme::Dark), Theme::Light);
    }

    #[test]
    fn test_toggle_persists() {
        let dir = TempDir::new().unwrap();
        let store = ThemeStore::new(&dir.path().join("nested"));
        let next = store.toggle(Theme::Light).unwrap();
        assert_eq!(next, Theme::Dark);
        assert_eq!(store.stored().unwrap(), Some(Theme::Dark));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"theme\": \"dark\""));

        store.toggle(next).unwrap();
        assert_eq!(store.stored().unwrap(), Some(Theme::Light));
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let store = ThemeStore::new(dir.path());
        fs::write(store.path(), "{not json").unwrap();
        assert!(store.stored().is_err());
        assert_eq!(store.resolve_with(None, Theme::Dark), Theme::Dark);
    }
}
