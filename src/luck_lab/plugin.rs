//! Lab plugins
//!
//! [`LuckLabCorePlugin`] holds the lab state machine and runs headless.
//! [`LuckLabPlugin`] adds the glTF scene, camera, UI, theme, audio and
//! particle layers on top for the windowed app.

use bevy::pbr::wireframe::WireframePlugin;
use bevy::prelude::*;
use bevy_hanabi::prelude::HanabiPlugin;
use bevy_material_ui::prelude::MaterialUiPlugin;

use super::config::LabConfig;
use super::hanabi_fx::init_hanabi_burst;
use super::particles::{despawn_expired_bursts, ParticleHooks};
use super::systems::*;
use super::types::*;

/// What the lab loads and switches on at startup.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    pub model: ModelKey,
    pub theme: Option<String>,
    pub size: Option<f32>,
    pub fate: bool,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            model: ModelKey::D6,
            theme: None,
            size: None,
            fate: false,
        }
    }
}

pub fn request_launch_state(
    launch: Res<LaunchOptions>,
    mut load: MessageWriter<LoadModelRequested>,
    mut theme: MessageWriter<SelectTheme>,
    mut size: MessageWriter<SetSizeMultiplier>,
    mut fate: MessageWriter<SetFateMode>,
) {
    load.write(LoadModelRequested {
        key: launch.model.key().to_string(),
    });
    if let Some(key) = &launch.theme {
        theme.write(SelectTheme { key: key.clone() });
    }
    if let Some(multiplier) = launch.size {
        size.write(SetSizeMultiplier { multiplier });
    }
    if launch.fate {
        fate.write(SetFateMode { enabled: true });
    }
}

/// Lab state, requests, tweens and modes. Needs only `Time` and `Assets<Mesh>`.
#[derive(Debug, Clone, Default)]
pub struct LuckLabCorePlugin {
    pub config: LabConfig,
    /// Fixed RNG seed for reproducible outcomes.
    pub seed: Option<u64>,
    pub launch: LaunchOptions,
}

impl Plugin for LuckLabCorePlugin {
    fn build(&self, app: &mut App) {
        let config = self.config.clone();
        let rng = match self.seed {
            Some(seed) => LabRng::seeded(seed),
            None => LabRng::default(),
        };

        app.insert_resource(RollHistory::with_limit(config.history_limit))
            .insert_resource(RollLifecycle::with_pause(config.animation.pause_seconds))
            .insert_resource(FateMode::with_interval(config.fate_interval_seconds))
            .insert_resource(ModelScale {
                base: 1.0,
                multiplier: config.size.clamp(config.size.default),
            })
            .insert_resource(ActiveTheme::from_config(&config))
            .insert_resource(SelectedModel {
                key: self.launch.model,
            })
            .insert_resource(rng)
            .insert_resource(self.launch.clone())
            .insert_resource(config)
            .init_resource::<LabFlags>()
            .init_resource::<ControlAvailability>()
            .init_resource::<LabStatus>()
            .init_resource::<PartRegistry>()
            .init_resource::<TweenScheduler>()
            .init_resource::<GlowSpin>()
            .init_resource::<SceneToggles>()
            .init_resource::<ParticleHooks>()
            .add_message::<RollRequested>()
            .add_message::<LoadModelRequested>()
            .add_message::<ResetRequested>()
            .add_message::<SetFateMode>()
            .add_message::<ToggleGlowSpin>()
            .add_message::<SetSizeMultiplier>()
            .add_message::<SelectTheme>()
            .add_message::<ToggleWireframe>()
            .add_message::<ResetCameraView>()
            .add_message::<ToggleMusic>()
            .add_message::<ToggleAmbientLight>()
            .add_message::<ToggleDirectionalLight>()
            .add_message::<SpawnModel>()
            .add_message::<ModelReady>()
            .add_message::<ModelLoadFailed>()
            .add_message::<PhaseFinished>()
            .add_message::<RollCompleted>()
            .configure_sets(
                Update,
                (
                    LabSet::Input,
                    LabSet::Requests,
                    LabSet::Animate,
                    LabSet::Present,
                )
                    .chain(),
            )
            .add_systems(Startup, request_launch_state)
            .add_systems(
                Update,
                (
                    // Model swaps run first: they force both modes off.
                    begin_model_swap,
                    finish_model_load,
                    handle_model_load_failures,
                    handle_reset_requests,
                    handle_size_changes,
                    handle_theme_selection,
                    handle_scene_toggles,
                    handle_fate_toggle,
                    tick_fate_mode,
                    handle_glow_toggle,
                    start_roll_on_request,
                )
                    .chain()
                    .in_set(LabSet::Requests),
            )
            .add_systems(
                Update,
                (
                    advance_part_tweens,
                    advance_roll_lifecycle,
                    resolve_roll_outcome,
                    spin_glowing_model,
                    despawn_expired_bursts,
                )
                    .chain()
                    .in_set(LabSet::Animate),
            )
            .add_systems(
                Update,
                refresh_control_availability.in_set(LabSet::Present),
            );
    }
}

/// The full windowed lab.
#[derive(Debug, Clone, Default)]
pub struct LuckLabPlugin {
    pub core: LuckLabCorePlugin,
}

impl Plugin for LuckLabPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            self.core.clone(),
            MaterialUiPlugin,
            HanabiPlugin,
            WireframePlugin::default(),
        ))
        .add_systems(Startup, (setup_scene, setup_ui, init_hanabi_burst))
        .add_systems(
            Update,
            (
                handle_lab_buttons,
                handle_size_slider,
                handle_keyboard_shortcuts,
                orbit_camera,
            )
                .in_set(LabSet::Input),
        )
        .add_systems(
            Update,
            (
                spawn_requested_models,
                poll_pending_models,
                handle_reset_view,
                apply_active_theme,
                sync_wireframe,
                sync_music_playback,
                update_result_text,
                update_loading_indicator,
                update_history_list,
                update_size_text,
                sync_size_slider,
                update_lab_buttons,
            )
                .in_set(LabSet::Present)
                .after(refresh_control_availability),
        );
    }
}
