//! UI components and scene-level toggles

use bevy::prelude::*;

use super::lifecycle::{ControlAvailability, LabFlags};
use super::model::ModelKey;

/// What a lab button does when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabAction {
    Roll,
    ToggleFate,
    ToggleGlow,
    SelectModel(ModelKey),
    SelectTheme(String),
    ToggleWireframe,
    ResetView,
    ToggleAmbientLight,
    ToggleDirectionalLight,
    ToggleMusic,
    Reset,
}

impl LabAction {
    /// Whether the control behind this action is currently usable.
    pub fn is_enabled(&self, controls: &ControlAvailability) -> bool {
        match self {
            LabAction::Roll => controls.roll,
            LabAction::ToggleFate => controls.fate_toggle,
            LabAction::ToggleGlow => controls.glow_toggle,
            LabAction::SelectModel(_) => controls.model_select,
            LabAction::SelectTheme(_) => controls.theme_select,
            LabAction::ToggleWireframe => controls.wireframe,
            LabAction::ResetView => controls.reset_view,
            LabAction::ToggleAmbientLight | LabAction::ToggleDirectionalLight => controls.lights,
            LabAction::ToggleMusic => controls.music,
            LabAction::Reset => controls.reset,
        }
    }

    /// True for the model or theme option that is already active.
    pub fn is_current(&self, model: ModelKey, theme_key: &str) -> bool {
        match self {
            LabAction::SelectModel(key) => *key == model,
            LabAction::SelectTheme(key) => key == theme_key,
            _ => false,
        }
    }

    /// Button caption for toggles whose text tracks state; `None` keeps the
    /// caption the button was spawned with.
    pub fn dynamic_label(&self, flags: &LabFlags, toggles: &SceneToggles) -> Option<&'static str> {
        let label = match self {
            LabAction::ToggleFate if flags.fate_mode_enabled => "Fate Mode: ON",
            LabAction::ToggleFate => "Fate Mode: OFF",
            LabAction::ToggleGlow if flags.is_glowing_and_spinning => "Stop Glowing",
            LabAction::ToggleGlow => "Glow & Spin",
            LabAction::ToggleWireframe if toggles.wireframe => "Hide Wireframe",
            LabAction::ToggleWireframe => "View Wireframe",
            LabAction::ToggleAmbientLight if toggles.ambient_light => "Ambient Light ON",
            LabAction::ToggleAmbientLight => "Ambient Light OFF",
            LabAction::ToggleDirectionalLight if toggles.directional_light => "Directional Light ON",
            LabAction::ToggleDirectionalLight => "Directional Light OFF",
            LabAction::ToggleMusic if toggles.music_playing => "Pause Music",
            LabAction::ToggleMusic => "Play Music",
            _ => return None,
        };
        Some(label)
    }
}

/// Component attached to every lab button.
#[derive(Component, Debug, Clone)]
pub struct LabButton(pub LabAction);

/// Marker for the roll result text.
#[derive(Component)]
pub struct ResultText;

/// One of the history list entries, newest at index 0.
#[derive(Component, Debug, Clone, Copy)]
pub struct HistorySlot(pub usize);

/// Marker for the size percentage text.
#[derive(Component)]
pub struct SizeText;

/// Marker for the size multiplier slider.
#[derive(Component)]
pub struct SizeSlider;

/// Marker for the control panel root.
#[derive(Component)]
pub struct LabPanel;

/// Marker for the loading / load-error indicator.
#[derive(Component)]
pub struct LoadingIndicator;

/// Text child of a [`LabButton`], refreshed when its label changes.
#[derive(Component)]
pub struct LabButtonLabel;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Orbit parameters of the main camera around its target.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl OrbitCamera {
    pub const MIN_DISTANCE: f32 = 0.5;
    pub const MAX_DISTANCE: f32 = 20.0;
    pub const HOME_POSITION: Vec3 = Vec3::new(0.0, 1.2, 3.0);

    pub fn from_position(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let distance = offset.length().max(Self::MIN_DISTANCE);
        Self {
            target,
            yaw: offset.x.atan2(offset.z),
            pitch: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            distance,
        }
    }

    pub fn home() -> Self {
        Self::from_position(Self::HOME_POSITION, Vec3::ZERO)
    }

    pub fn position(&self) -> Vec3 {
        let horizontal = self.distance * self.pitch.cos();
        self.target
            + Vec3::new(
                horizontal * self.yaw.sin(),
                self.distance * self.pitch.sin(),
                horizontal * self.yaw.cos(),
            )
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position()).looking_at(self.target, Vec3::Y)
    }
}

/// Marker for the theme-driven directional light.
#[derive(Component)]
pub struct KeyLight;

/// Marker for the looping background music player.
#[derive(Component)]
pub struct BackgroundMusic;

/// Scene toggles that live outside the roll lifecycle.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneToggles {
    pub wireframe: bool,
    pub ambient_light: bool,
    pub directional_light: bool,
    pub music_playing: bool,
}

impl Default for SceneToggles {
    fn default() -> Self {
        Self {
            wireframe: false,
            ambient_light: true,
            directional_light: true,
            music_playing: false,
        }
    }
}
