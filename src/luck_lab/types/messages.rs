//! Messages exchanged between the UI, the mode controllers and the roll
//! lifecycle controller.

use bevy::prelude::*;

use super::lifecycle::TweenPhaseId;
use super::model::{ModelKey, RollOutcome};

/// Who asked for a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollSource {
    Manual,
    Fate,
}

/// Ask the controller to start an explode/reassemble roll.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollRequested {
    pub source: RollSource,
}

/// Swap in a model by key (`d6`, `d12`, `coin`).
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct LoadModelRequested {
    pub key: String,
}

/// Interrupt everything and return to idle.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ResetRequested;

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetFateMode {
    pub enabled: bool,
}

#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ToggleGlowSpin;

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct SetSizeMultiplier {
    pub multiplier: f32,
}

#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct SelectTheme {
    pub key: String,
}

#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ToggleWireframe;

#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ResetCameraView;

#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ToggleMusic;

#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ToggleAmbientLight;

#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ToggleDirectionalLight;

/// Posted after a model swap has torn down the old model; the scene layer
/// answers with [`ModelReady`] or [`ModelLoadFailed`].
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct SpawnModel {
    pub key: ModelKey,
    pub path: String,
}

/// The model hierarchy under `root` is spawned and its meshes are loaded.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelReady {
    pub root: Entity,
}

#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct ModelLoadFailed {
    pub key: ModelKey,
    pub path: String,
    pub reason: String,
}

/// Every tween of a phase has reached its target.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseFinished {
    pub phase: TweenPhaseId,
}

/// A roll reached its outcome.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollCompleted {
    pub outcome: RollOutcome,
}
