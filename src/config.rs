//! Configuration loading and validation.
//!
//! A small optional YAML file; every field has a default and the CLI can
//! override each one. Validation happens up front; the frame loop never
//! sees an unchecked name.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::game::{preset_by_name, GamePreset, FLOATY};
use crate::source::SourceSpec;
use crate::theme::Theme;

pub const DEFAULT_CONFIG_FILE: &str = "kiosk.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChoice {
    Dark,
    Light,
    Auto,
}

impl ThemeChoice {
    pub fn from_keyword(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(ThemeChoice::Dark),
            "light" => Ok(ThemeChoice::Light),
            "auto" => Ok(ThemeChoice::Auto),
            other => bail!("invalid theme '{other}' (allowed: dark, light, auto)"),
        }
    }

    /// `auto` reads the COLORFGBG convention some terminals export;
    /// anything ambiguous lands on dark.
    pub fn resolve(self) -> Theme {
        match self {
            ThemeChoice::Dark => Theme::Dark,
            ThemeChoice::Light => Theme::Light,
            ThemeChoice::Auto => detect_terminal_theme(),
        }
    }
}

fn detect_terminal_theme() -> Theme {
    let Ok(value) = std::env::var("COLORFGBG") else {
        return Theme::Dark;
    };
    match value.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()) {
        Some(bg) if bg >= 7 && bg != 8 => Theme::Light,
        _ => Theme::Dark,
    }
}

#[derive(Debug, Clone)]
pub struct KioskConfig {
    pub theme: ThemeChoice,
    pub source: SourceSpec,
    /// Cover still for the game overlay; `None` grabs frame 0 of the
    /// active source.
    pub cover: Option<PathBuf>,
    pub preset: &'static GamePreset,
    pub game_seed: Option<u32>,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            theme: ThemeChoice::Auto,
            source: SourceSpec::Clip(crate::clip::ClipKind::Drift),
            cover: None,
            preset: &FLOATY,
            game_seed: None,
        }
    }
}

// YAML schema, every field optional.

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    theme: Option<String>,
    source: Option<String>,
    cover: Option<PathBuf>,
    #[serde(default)]
    game: RawGame,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGame {
    preset: Option<String>,
    seed: Option<u32>,
}

/// Load a config file and validate every field. An explicit `path` must
/// exist; the default path is optional and silently absent.
pub fn load_and_validate_config(path: Option<&Path>) -> Result<KioskConfig> {
    let raw = match path {
        Some(path) => read_raw(path)?,
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default.exists() {
                read_raw(&default)?
            } else {
                RawConfig::default()
            }
        }
    };
    validate(raw)
}

fn read_raw(path: &Path) -> Result<RawConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn validate(raw: RawConfig) -> Result<KioskConfig> {
    let defaults = KioskConfig::default();

    let theme = match raw.theme {
        Some(value) => ThemeChoice::from_keyword(&value)?,
        None => defaults.theme,
    };
    let source = match raw.source {
        Some(value) => SourceSpec::parse(&value)?,
        None => defaults.source,
    };
    let preset = match raw.game.preset {
        Some(name) => preset_by_name(&name).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown game preset '{name}' (allowed: {})",
                crate::game::PRESETS
                    .iter()
                    .map(|p| p.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })?,
        None => defaults.preset,
    };

    Ok(KioskConfig {
        theme,
        source,
        cover: raw.cover,
        preset,
        game_seed: raw.game.seed,
    })
}
