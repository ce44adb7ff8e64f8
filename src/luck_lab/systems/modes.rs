//! Fate Mode and Glow & Spin

use bevy::prelude::*;

use crate::luck_lab::config::LabConfig;
use crate::luck_lab::types::*;

use super::normalize::ModelGeometry;
use super::theme::ActiveTheme;

// ============================================================================
// Fate Mode
// ============================================================================

/// Repeating timer that issues a roll request every interval while enabled.
#[derive(Resource, Debug)]
pub struct FateMode {
    pub timer: Timer,
}

impl Default for FateMode {
    fn default() -> Self {
        Self::with_interval(10.0)
    }
}

impl FateMode {
    pub fn with_interval(seconds: f32) -> Self {
        Self {
            timer: Timer::from_seconds(seconds, TimerMode::Repeating),
        }
    }
}

pub fn handle_fate_toggle(
    mut requests: MessageReader<SetFateMode>,
    mut flags: ResMut<LabFlags>,
    mut fate: ResMut<FateMode>,
) {
    for request in requests.read() {
        if request.enabled == flags.fate_mode_enabled {
            continue;
        }
        if request.enabled && !flags.can_interact() {
            warn!("Fate Mode can't start while a roll or glow & spin is running");
            continue;
        }

        flags.fate_mode_enabled = request.enabled;
        fate.timer.reset();
        info!(
            "Fate Mode {}",
            if request.enabled { "enabled" } else { "disabled" }
        );
    }
}

/// Issue a roll request for every elapsed interval.
pub fn tick_fate_mode(
    time: Res<Time>,
    flags: Res<LabFlags>,
    mut fate: ResMut<FateMode>,
    mut rolls: MessageWriter<RollRequested>,
) {
    if !flags.fate_mode_enabled {
        return;
    }
    fate.timer.tick(time.delta());
    for _ in 0..fate.timer.times_finished_this_tick() {
        debug!("Fate Mode interval elapsed");
        rolls.write(RollRequested {
            source: RollSource::Fate,
        });
    }
}

// ============================================================================
// Glow & Spin
// ============================================================================

/// Glow light currently attached to the model, if glowing.
#[derive(Resource, Debug, Default)]
pub struct GlowSpin {
    pub light: Option<Entity>,
}

/// Marker for the point light spawned by Glow & Spin.
#[derive(Component)]
pub struct GlowLight;

/// Switch Glow & Spin off. Returns false when it was not on.
pub fn stop_glow(commands: &mut Commands, flags: &mut LabFlags, glow: &mut GlowSpin) -> bool {
    let was_glowing = flags.is_glowing_and_spinning;
    flags.is_glowing_and_spinning = false;
    if let Some(light) = glow.light.take() {
        commands.entity(light).despawn();
    }
    if was_glowing {
        info!("Glow & Spin stopped");
    }
    was_glowing
}

#[allow(clippy::too_many_arguments)]
pub fn handle_glow_toggle(
    mut commands: Commands,
    mut requests: MessageReader<ToggleGlowSpin>,
    mut flags: ResMut<LabFlags>,
    mut glow: ResMut<GlowSpin>,
    registry: Res<PartRegistry>,
    theme: Res<ActiveTheme>,
    config: Res<LabConfig>,
    transforms: Query<&mut Transform>,
    geometry: ModelGeometry,
) {
    for _ in requests.read() {
        if flags.is_glowing_and_spinning {
            stop_glow(&mut commands, &mut flags, &mut glow);
            continue;
        }
        if flags.is_animating {
            warn!("Glow & Spin can't start during a roll");
            continue;
        }
        let Some(root) = registry.root() else {
            warn!("Glow & Spin needs a loaded model");
            continue;
        };
        let Ok(root_transform) = transforms.get(root) else {
            continue;
        };

        let position = match geometry.measure(root, root_transform, &transforms) {
            Some(bounds) => {
                bounds.center() + Vec3::Y * bounds.size().y * config.glow.height_factor
            }
            None => root_transform.translation + Vec3::Y,
        };

        let light = commands
            .spawn((
                PointLight {
                    color: theme.theme.glow_color,
                    intensity: config.glow.light_intensity,
                    range: config.glow.light_range,
                    ..default()
                },
                Transform::from_translation(position),
                GlowLight,
                Name::new("GlowLight"),
            ))
            .id();
        glow.light = Some(light);
        flags.is_glowing_and_spinning = true;
        info!("Glow & Spin started");
    }
}

pub fn spin_glowing_model(
    time: Res<Time>,
    flags: Res<LabFlags>,
    config: Res<LabConfig>,
    registry: Res<PartRegistry>,
    mut roots: Query<&mut Transform, With<LabModel>>,
) {
    if !flags.is_glowing_and_spinning {
        return;
    }
    let Some(root) = registry.root() else {
        return;
    };
    if let Ok(mut transform) = roots.get_mut(root) {
        transform.rotate_y(config.glow.spin_speed * time.delta_secs());
    }
}
