use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ParseGeometryError, SettingsError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
}

impl ThemeChoice {
    pub fn toggled(self) -> Self {
        match self {
            ThemeChoice::Dark => ThemeChoice::Light,
            ThemeChoice::Light => ThemeChoice::Dark,
        }
    }
}

/// Everything remembered between runs. Unknown or missing keys fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: ThemeChoice,
    pub output_dir: String,
    /// `WxH+X+Y`, empty until the window has been closed once.
    pub window_geometry: String,
    pub is_maximized: bool,
}

impl Settings {
    /// Read settings from `path`. Any problem yields the defaults.
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::debug!("No settings at {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Settings loaded from: {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Failed to parse settings file: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::debug!("Settings saved to: {}", path.display());
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> ThemeChoice {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        if self.output_dir.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.output_dir))
        }
    }

    pub fn geometry(&self) -> Option<WindowGeometry> {
        self.window_geometry.parse().ok()
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|d| d.join(".multicompare").join("settings.json"))
}

/// Window size and position in the `WxH+X+Y` notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
}

impl fmt::Display for WindowGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}{:+}{:+}", self.width, self.height, self.x, self.y)
    }
}

impl FromStr for WindowGeometry {
    type Err = ParseGeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseGeometryError(s.to_string());
        let (width, rest) = s.split_once('x').ok_or_else(bad)?;
        // position offsets each carry their own sign
        let sign_at = rest.find(['+', '-']).ok_or_else(bad)?;
        let (height, offsets) = rest.split_at(sign_at);
        let second = offsets
            .char_indices()
            .skip(1)
            .find(|&(i, c)| matches!(c, '+' | '-') && offsets.as_bytes()[i - 1].is_ascii_digit())
            .map(|(i, _)| i)
            .ok_or_else(bad)?;
        let (x, y) = offsets.split_at(second);

        Ok(WindowGeometry {
            width: width.parse().map_err(|_| bad())?,
            height: height.parse().map_err(|_| bad())?,
            x: parse_offset(x).ok_or_else(bad)?,
            y: parse_offset(y).ok_or_else(bad)?,
        })
    }
}

// Tk writes negative positions as "+-5".
fn parse_offset(s: &str) -> Option<i32> {
    let s = s.strip_prefix("+-").map_or(s.to_string(), |rest| format!("-{rest}"));
    s.parse().ok()
}
