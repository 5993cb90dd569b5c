//! Demo configuration file handling (letters.toml)

use anyhow::{Context, Result};
use letters_animation::{Easing, PresetKind, SpringParams, TextAnimationConfig, TextStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "letters.toml";

const STARTER_HEADER: &str = "\
# Moving letters demo configuration
#
# [demo]            text, frame rate and wrap width used by `letters play`
# [style]           text style shared by every preset
# [presets.<name>]  per-preset overrides; omitted keys keep the preset default
#
# Durations are in milliseconds.

";

/// Top-level demo configuration (letters.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LettersConfig {
    #[serde(default)]
    pub demo: DemoConfig,
    /// Style shared by every preset
    #[serde(default)]
    pub style: Option<TextStyle>,
    /// Per-preset overrides, keyed by preset name
    #[serde(default)]
    pub presets: BTreeMap<String, PresetOverride>,
}

/// Playback surface settings
#[derive(Debug, Deserialize, Serialize)]
pub struct DemoConfig {
    #[serde(default = "default_text")]
    pub text: String,
    /// Frames printed per second
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Wrap width in layout units; no wrapping when unset
    #[serde(default)]
    pub wrap_width: Option<f32>,
    /// Delay between mounting and starting, like a screen transition
    #[serde(default = "default_start_delay")]
    pub start_delay_ms: u64,
}

fn default_text() -> String {
    "Moving Letters".to_string()
}

fn default_fps() -> u32 {
    30
}

fn default_start_delay() -> u64 {
    200
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            text: default_text(),
            fps: default_fps(),
            wrap_width: None,
            start_delay_ms: default_start_delay(),
        }
    }
}

/// Fields a preset section may override; unset fields keep preset defaults
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct PresetOverride {
    #[serde(default)]
    pub easing: Option<Easing>,
    #[serde(default)]
    pub animation_duration_ms: Option<u64>,
    #[serde(default)]
    pub intermediate_duration_ms: Option<u64>,
    #[serde(default)]
    pub animate_on_mount: Option<bool>,
    #[serde(default)]
    pub spring: Option<SpringParams>,
    #[serde(default)]
    pub style: Option<TextStyle>,
}

impl PresetOverride {
    fn apply(&self, mut config: TextAnimationConfig) -> TextAnimationConfig {
        if let Some(easing) = self.easing {
            config.easing = easing;
        }
        if let Some(ms) = self.animation_duration_ms {
            config.animation_duration_ms = ms;
        }
        if let Some(ms) = self.intermediate_duration_ms {
            config.intermediate_duration_ms = ms;
        }
        if let Some(animate) = self.animate_on_mount {
            config.animate_on_mount = animate;
        }
        if let Some(spring) = self.spring {
            config.spring = Some(spring);
        }
        if let Some(style) = &self.style {
            config.style = style.clone();
        }
        config
    }
}

impl LettersConfig {
    /// Load an explicit config file, or `letters.toml` in the working
    /// directory when present, or built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) if path.is_dir() => path.join(CONFIG_FILE),
            Some(path) => path.to_path_buf(),
            None => {
                let local = Path::new(CONFIG_FILE);
                if !local.exists() {
                    return Ok(Self::default());
                }
                local.to_path_buf()
            }
        };

        if !config_path.exists() {
            anyhow::bail!(
                "No {} found at {}. Run `letters init` to create one.",
                CONFIG_FILE,
                config_path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: LettersConfig = toml::from_str(content)?;
        for name in config.presets.keys() {
            name.parse::<PresetKind>()
                .with_context(|| format!("Invalid section [presets.{}]", name))?;
        }
        Ok(config)
    }

    /// Effective animation config for a preset: defaults, shared style, override
    pub fn preset_config(&self, kind: PresetKind) -> TextAnimationConfig {
        let mut config = kind.default_config();
        if let Some(style) = &self.style {
            config.style = style.clone();
        }
        match self.presets.get(kind.name()) {
            Some(overrides) => overrides.apply(config),
            None => config,
        }
    }

    /// Configuration written by `letters init`
    pub fn starter() -> Self {
        let mut presets = BTreeMap::new();
        for kind in PresetKind::ALL {
            let defaults = kind.default_config();
            presets.insert(
                kind.name().to_string(),
                PresetOverride {
                    easing: Some(defaults.easing),
                    animation_duration_ms: Some(defaults.animation_duration_ms),
                    intermediate_duration_ms: Some(defaults.intermediate_duration_ms),
                    spring: defaults.spring,
                    ..PresetOverride::default()
                },
            );
        }
        Self {
            demo: DemoConfig::default(),
            style: Some(TextStyle {
                font_size: 57.0,
                line_height: Some(64.0),
                ..TextStyle::default()
            }),
            presets,
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Write the starter config into `dir`
    pub fn write_starter(dir: &Path, force: bool) -> Result<std::path::PathBuf> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() && !force {
            anyhow::bail!(
                "{} already exists. Use --force to overwrite it.",
                path.display()
            );
        }
        let content = format!("{}{}", STARTER_HEADER, Self::starter().to_toml()?);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}
