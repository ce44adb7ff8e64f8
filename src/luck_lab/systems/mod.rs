//! Lab systems
//!
//! Core systems (registry, normalizer, tweens, lifecycle, modes) run without
//! an asset server or renderer. The scene systems (model spawning, camera,
//! UI, theme, audio) are only added by the full plugin.

mod camera;
mod lab_control;
mod lifecycle;
mod model_loading;
mod modes;
mod normalize;
mod part_registry;
mod setup;
mod theme;
mod tween;
mod ui;

pub use camera::*;
pub use lab_control::*;
pub use lifecycle::*;
pub use model_loading::*;
pub use modes::*;
pub use normalize::*;
pub use part_registry::*;
pub use setup::*;
pub use theme::*;
pub use tween::*;
pub use ui::*;

use bevy::prelude::*;

/// Frame ordering of the lab: input becomes requests, requests start or stop
/// tweens, tweens advance, and the UI reflects the result.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabSet {
    Input,
    Requests,
    Animate,
    Present,
}
