use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ratatui::prelude::Color;
use serde::Deserialize;

use super::theme::Theme;
use super::vars::Settings;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub(crate) theme: Option<String>,
    pub(crate) colors: Option<ColorOverride>,
    pub(crate) settings: Settings,
}

impl Config {
    /// Named theme with any `[colors]` overrides applied.
    pub fn build_theme(&self) -> Theme {
        let mut theme = self
            .theme
            .as_deref()
            .and_then(Theme::from_name)
            .unwrap_or_else(Theme::default_theme);
        if let Some(colors) = &self.colors {
            apply_color_overrides(&mut theme, colors);
        }
        theme
    }
}

pub fn load_config() -> Result<Config> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    candidates.push(PathBuf::from("uvi.toml"));
    candidates.push(PathBuf::from(".uvi.toml"));
    if let Ok(home) = std::env::var("HOME") {
        candidates.push(PathBuf::from(home).join(".config/uvi/config.toml"));
    }

    for path in candidates {
        if !path.exists() {
            continue;
        }
        return read_config(&path);
    }
    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let cfg: Config =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}

#[derive(Debug, Deserialize, Default, Clone)]
pub(crate) struct ColorOverride {
    pub(crate) text_fg: Option<String>,
    pub(crate) status_fg: Option<String>,
    pub(crate) status_bg: Option<String>,
    pub(crate) error_fg: Option<String>,
    pub(crate) nonprint_fg: Option<String>,
    pub(crate) tilde_fg: Option<String>,
    pub(crate) panel_border: Option<String>,
}

pub(crate) fn apply_color_overrides(theme: &mut Theme, overrides: &ColorOverride) {
    let slots = [
        (&overrides.text_fg, &mut theme.text_fg),
        (&overrides.status_fg, &mut theme.status_fg),
        (&overrides.status_bg, &mut theme.status_bg),
        (&overrides.error_fg, &mut theme.error_fg),
        (&overrides.nonprint_fg, &mut theme.nonprint_fg),
        (&overrides.tilde_fg, &mut theme.tilde_fg),
        (&overrides.panel_border, &mut theme.panel_border),
    ];
    for (value, slot) in slots {
        if let Some(color) = value.as_deref().and_then(parse_color) {
            *slot = color;
        }
    }
}

fn parse_color(value: &str) -> Option<Color> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}
