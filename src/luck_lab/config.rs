//! Lab configuration
//!
//! Every tunable the lab uses lives in [`LabConfig`]: size slider range,
//! history length, animation timings, glow settings, model locators and the
//! theme table. The config can be read from a RON or JSON file; any field
//! left out falls back to its default.

use std::collections::BTreeMap;
use std::f32::consts::FRAC_PI_2;
use std::fs;
use std::path::Path;

use bevy::math::curve::{Curve, EaseFunction, EasingCurve};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{LabError, LabResult};
use super::types::ModelKey;

pub const DEFAULT_THEME_KEY: &str = "default";

// ============================================================================
// Easing
// ============================================================================

/// Easing profile of a tween phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TweenEase {
    Linear,
    QuadraticIn,
    #[default]
    QuadraticOut,
    QuadraticInOut,
}

impl TweenEase {
    pub fn ease_function(self) -> EaseFunction {
        match self {
            TweenEase::Linear => EaseFunction::Linear,
            TweenEase::QuadraticIn => EaseFunction::QuadraticIn,
            TweenEase::QuadraticOut => EaseFunction::QuadraticOut,
            TweenEase::QuadraticInOut => EaseFunction::QuadraticInOut,
        }
    }

    /// Map linear progress in `[0, 1]` to eased progress.
    pub fn sample(self, t: f32) -> f32 {
        EasingCurve::new(0.0, 1.0, self.ease_function()).sample_clamped(t.clamp(0.0, 1.0))
    }
}

// ============================================================================
// Animation / size / glow tuning
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTuning {
    /// Duration of a single part's tween, in seconds.
    pub duration: f32,
    /// Start offset between consecutive parts, in seconds.
    pub stagger: f32,
    pub ease: TweenEase,
}

impl PhaseTuning {
    /// Total wall time of a phase over `part_count` parts.
    pub fn total_duration(&self, part_count: usize) -> f32 {
        self.duration + part_count.saturating_sub(1) as f32 * self.stagger
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationTuning {
    pub explode: PhaseTuning,
    pub reassemble: PhaseTuning,
    /// Dramatic beat between the explosion and reassembly.
    pub pause_seconds: f32,
    /// Outward travel of each part at a size multiplier of 1.0.
    pub explosion_strength: f32,
    /// Largest per-axis orientation perturbation while exploded, in radians.
    pub max_tilt: f32,
}

impl Default for AnimationTuning {
    fn default() -> Self {
        Self {
            explode: PhaseTuning {
                duration: 0.8,
                stagger: 0.05,
                ease: TweenEase::QuadraticOut,
            },
            reassemble: PhaseTuning {
                duration: 0.7,
                stagger: 0.04,
                ease: TweenEase::QuadraticIn,
            },
            pause_seconds: 0.5,
            explosion_strength: 1.5,
            max_tilt: FRAC_PI_2,
        }
    }
}

/// Bounds of the user size multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub step: f32,
}

impl Default for SizeRange {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 2.0,
            default: 1.0,
            step: 0.1,
        }
    }
}

impl SizeRange {
    pub fn clamp(&self, multiplier: f32) -> f32 {
        if multiplier.is_finite() {
            multiplier.clamp(self.min, self.max)
        } else {
            self.default
        }
    }

    /// Clamp a slider position and round it to the nearest step.
    pub fn snap(&self, value: f32) -> f32 {
        let value = self.clamp(value);
        if self.step <= 0.0 {
            return value;
        }
        let steps = ((value - self.min) / self.step).round();
        self.clamp(self.min + steps * self.step)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowSettings {
    /// Point light intensity in lumens.
    pub light_intensity: f32,
    pub light_range: f32,
    /// Light height above the model center, as a fraction of model height.
    pub height_factor: f32,
    /// Yaw speed in radians per second.
    pub spin_speed: f32,
}

impl Default for GlowSettings {
    fn default() -> Self {
        Self {
            light_intensity: 40_000.0,
            light_range: 5.0,
            height_factor: 0.6,
            spin_speed: 1.5,
        }
    }
}

/// Asset locators for the three supported models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    pub d6: String,
    pub d12: String,
    pub coin: String,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            d6: "models/die6.glb".to_string(),
            d12: "models/die12.glb".to_string(),
            coin: "models/coin.glb".to_string(),
        }
    }
}

// ============================================================================
// Themes
// ============================================================================

/// Serializable theme bundle. Colors are CSS color strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeSettings {
    pub name: String,
    pub background: String,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub directional_color: String,
    pub bloom_strength: f32,
    pub bloom_radius: f32,
    pub bloom_threshold: f32,
    pub glow_color: String,
}

/// A theme with its colors parsed, ready to hand to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTheme {
    pub name: String,
    pub background: Color,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub directional_color: Color,
    pub bloom_strength: f32,
    pub bloom_radius: f32,
    pub bloom_threshold: f32,
    pub glow_color: Color,
}

fn parse_color(field: &str, value: &str) -> LabResult<Color> {
    let c = csscolorparser::parse(value).map_err(|e| LabError::Config {
        path: field.to_string(),
        reason: format!("'{value}': {e}"),
    })?;
    Ok(Color::srgba(c.r, c.g, c.b, c.a))
}

impl ThemeSettings {
    pub fn resolve(&self) -> LabResult<ResolvedTheme> {
        Ok(ResolvedTheme {
            name: self.name.clone(),
            background: parse_color("theme.background", &self.background)?,
            ambient_intensity: self.ambient_intensity,
            directional_intensity: self.directional_intensity,
            directional_color: parse_color("theme.directional_color", &self.directional_color)?,
            bloom_strength: self.bloom_strength,
            bloom_radius: self.bloom_radius,
            bloom_threshold: self.bloom_threshold,
            glow_color: parse_color("theme.glow_color", &self.glow_color)?,
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn theme(
    name: &str,
    background: &str,
    ambient_intensity: f32,
    directional_intensity: f32,
    directional_color: &str,
    bloom: (f32, f32, f32),
    glow_color: &str,
) -> ThemeSettings {
    ThemeSettings {
        name: name.to_string(),
        background: background.to_string(),
        ambient_intensity,
        directional_intensity,
        directional_color: directional_color.to_string(),
        bloom_strength: bloom.0,
        bloom_radius: bloom.1,
        bloom_threshold: bloom.2,
        glow_color: glow_color.to_string(),
    }
}

pub fn default_themes() -> BTreeMap<String, ThemeSettings> {
    let mut themes = BTreeMap::new();
    themes.insert(
        DEFAULT_THEME_KEY.to_string(),
        theme("Default Lab", "#e0e0e0", 0.8, 1.5, "#ffffff", (0.4, 0.3, 0.9), "#ffaa33"),
    );
    themes.insert(
        "fantasy".to_string(),
        theme("Mystical Grove", "#3d5a3d", 0.6, 1.0, "#ffe0b0", (0.6, 0.5, 0.75), "#7ec488"),
    );
    themes.insert(
        "scifi".to_string(),
        theme("Cyber Punk Alley", "#1a1a2e", 0.4, 1.8, "#00ffff", (0.8, 0.4, 0.65), "#00ffff"),
    );
    themes
}

// ============================================================================
// LabConfig
// ============================================================================

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub history_limit: usize,
    pub size: SizeRange,
    pub fate_interval_seconds: f32,
    pub animation: AnimationTuning,
    pub glow: GlowSettings,
    /// How long a particle burst lives before it is despawned.
    pub particle_lifetime_seconds: f32,
    pub models: ModelPaths,
    pub music_path: String,
    pub default_theme: String,
    pub themes: BTreeMap<String, ThemeSettings>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            history_limit: 5,
            size: SizeRange::default(),
            fate_interval_seconds: 10.0,
            animation: AnimationTuning::default(),
            glow: GlowSettings::default(),
            particle_lifetime_seconds: 2.0,
            models: ModelPaths::default(),
            music_path: "audio/background.mp3".to_string(),
            default_theme: DEFAULT_THEME_KEY.to_string(),
            themes: default_themes(),
        }
    }
}

impl LabConfig {
    /// Load a config file. `.json` files are read as JSON, everything else as RON.
    pub fn load_from_path(path: &Path) -> LabResult<Self> {
        let display_path = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|e| LabError::Config {
            path: display_path.clone(),
            reason: e.to_string(),
        })?;

        let config: LabConfig = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&text).map_err(|e| LabError::Config {
                path: display_path.clone(),
                reason: e.to_string(),
            })?,
            _ => ron::from_str(&text).map_err(|e| LabError::Config {
                path: display_path.clone(),
                reason: e.to_string(),
            })?,
        };

        config.validate()?;
        info!("Loaded lab config from {}", display_path);
        Ok(config)
    }

    pub fn validate(&self) -> LabResult<()> {
        let invalid = |reason: String| LabError::Config {
            path: "LabConfig".to_string(),
            reason,
        };

        if !(self.size.min > 0.0 && self.size.min <= self.size.max) {
            return Err(invalid(format!(
                "size range [{}, {}] is empty or non-positive",
                self.size.min, self.size.max
            )));
        }
        if !(self.size.min..=self.size.max).contains(&self.size.default) {
            return Err(invalid(format!(
                "default size {} lies outside [{}, {}]",
                self.size.default, self.size.min, self.size.max
            )));
        }
        if self.fate_interval_seconds <= 0.0 {
            return Err(invalid("fate interval must be positive".to_string()));
        }
        if !self.themes.contains_key(&self.default_theme) {
            return Err(LabError::UnknownThemeKey(self.default_theme.clone()));
        }
        for theme in self.themes.values() {
            theme.resolve()?;
        }
        Ok(())
    }

    pub fn model_path(&self, key: ModelKey) -> &str {
        match key {
            ModelKey::D6 => &self.models.d6,
            ModelKey::D12 => &self.models.d12,
            ModelKey::Coin => &self.models.coin,
        }
    }

    pub fn theme(&self, key: &str) -> LabResult<ResolvedTheme> {
        self.themes
            .get(key)
            .ok_or_else(|| LabError::UnknownThemeKey(key.to_string()))?
            .resolve()
    }
}
