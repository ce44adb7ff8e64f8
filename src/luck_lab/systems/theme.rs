//! Themes and scene lighting

use bevy::post_process::bloom::Bloom;
use bevy::prelude::*;

use crate::luck_lab::config::{LabConfig, ResolvedTheme};
use crate::luck_lab::types::*;

use super::modes::GlowLight;

/// Ambient brightness for one unit of theme ambient intensity.
pub const AMBIENT_BRIGHTNESS_PER_UNIT: f32 = 400.0;
/// Directional illuminance (lux) for one unit of theme directional intensity.
pub const DIRECTIONAL_LUX_PER_UNIT: f32 = 6_000.0;
/// Bloom intensity for one unit of theme bloom strength.
pub const BLOOM_INTENSITY_PER_UNIT: f32 = 0.3;

/// The theme currently applied to the scene.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ActiveTheme {
    pub key: String,
    pub theme: ResolvedTheme,
}

impl Default for ActiveTheme {
    fn default() -> Self {
        Self::from_config(&LabConfig::default())
    }
}

impl ActiveTheme {
    /// The config's default theme, or a plain neutral theme if it won't resolve.
    pub fn from_config(config: &LabConfig) -> Self {
        match config.theme(&config.default_theme) {
            Ok(theme) => Self {
                key: config.default_theme.clone(),
                theme,
            },
            Err(e) => {
                error!("{e}; falling back to a neutral theme");
                Self {
                    key: config.default_theme.clone(),
                    theme: ResolvedTheme {
                        name: "Neutral".to_string(),
                        background: Color::srgb(0.1, 0.1, 0.1),
                        ambient_intensity: 0.5,
                        directional_intensity: 1.0,
                        directional_color: Color::WHITE,
                        bloom_strength: 0.0,
                        bloom_radius: 0.0,
                        bloom_threshold: 1.0,
                        glow_color: Color::WHITE,
                    },
                }
            }
        }
    }
}

/// Switch themes. Unknown keys are logged and ignored.
pub fn handle_theme_selection(
    mut requests: MessageReader<SelectTheme>,
    config: Res<LabConfig>,
    mut active: ResMut<ActiveTheme>,
    mut glow_lights: Query<&mut PointLight, With<GlowLight>>,
) {
    for request in requests.read() {
        if request.key == active.key {
            continue;
        }
        match config.theme(&request.key) {
            Ok(theme) => {
                info!("Theme changed to {}", theme.name);
                for mut light in &mut glow_lights {
                    light.color = theme.glow_color;
                }
                active.key = request.key.clone();
                active.theme = theme;
            }
            Err(e) => warn!("{e}"),
        }
    }
}

/// Flip the scene toggles in response to their requests.
pub fn handle_scene_toggles(
    mut ambient: MessageReader<ToggleAmbientLight>,
    mut directional: MessageReader<ToggleDirectionalLight>,
    mut wireframe: MessageReader<ToggleWireframe>,
    mut music: MessageReader<ToggleMusic>,
    mut toggles: ResMut<SceneToggles>,
) {
    for _ in ambient.read() {
        toggles.ambient_light = !toggles.ambient_light;
        info!("Ambient light {}", on_off(toggles.ambient_light));
    }
    for _ in directional.read() {
        toggles.directional_light = !toggles.directional_light;
        info!("Directional light {}", on_off(toggles.directional_light));
    }
    for _ in wireframe.read() {
        toggles.wireframe = !toggles.wireframe;
        info!("Wireframe {}", on_off(toggles.wireframe));
    }
    for _ in music.read() {
        toggles.music_playing = !toggles.music_playing;
        info!("Music {}", if toggles.music_playing { "playing" } else { "paused" });
    }
}

pub(crate) fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

/// Push the active theme and light toggles into the renderer.
pub fn apply_active_theme(
    active: Res<ActiveTheme>,
    toggles: Res<SceneToggles>,
    mut clear_color: ResMut<ClearColor>,
    mut cameras: Query<(&mut AmbientLight, &mut Bloom), With<MainCamera>>,
    mut key_lights: Query<&mut DirectionalLight, With<KeyLight>>,
) {
    if !active.is_changed() && !toggles.is_changed() {
        return;
    }
    let theme = &active.theme;

    clear_color.0 = theme.background;
    for (mut ambient, mut bloom) in &mut cameras {
        ambient.brightness = if toggles.ambient_light {
            theme.ambient_intensity * AMBIENT_BRIGHTNESS_PER_UNIT
        } else {
            0.0
        };
        bloom.intensity = theme.bloom_strength * BLOOM_INTENSITY_PER_UNIT;
        bloom.low_frequency_boost = theme.bloom_radius.clamp(0.0, 1.0);
        bloom.prefilter.threshold = theme.bloom_threshold;
    }
    for mut light in &mut key_lights {
        light.color = theme.directional_color;
        light.illuminance = if toggles.directional_light {
            theme.directional_intensity * DIRECTIONAL_LUX_PER_UNIT
        } else {
            0.0
        };
    }
}
