//! Roll lifecycle state, lab flags and control availability

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::model::RollOutcome;

/// Text shown in the result display when no roll is in progress.
pub const IDLE_RESULT_TEXT: &str = "-";
pub const EXPLODING_TEXT: &str = "Exploding...";
pub const REASSEMBLING_TEXT: &str = "Reassembling...";
pub const LOAD_ERROR_TEXT: &str = "Error loading model.";

/// Phases of a single roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RollPhase {
    #[default]
    Idle,
    Exploding,
    PausedBeforeReassemble,
    Reassembling,
    ResolvingOutcome,
}

/// Identifies one group of concurrently scheduled part tweens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenPhaseId(pub u64);

/// Resource tracking the roll state machine.
#[derive(Resource, Debug)]
pub struct RollLifecycle {
    pub phase: RollPhase,
    /// Tween phase the controller is waiting on, if any.
    pub awaiting: Option<TweenPhaseId>,
    /// Timer for the pause between explosion and reassembly.
    pub pause: Timer,
    pub completed_rolls: u64,
    pub last_outcome: Option<RollOutcome>,
}

impl Default for RollLifecycle {
    fn default() -> Self {
        Self::with_pause(0.5)
    }
}

impl RollLifecycle {
    pub fn with_pause(seconds: f32) -> Self {
        Self {
            phase: RollPhase::Idle,
            awaiting: None,
            pause: Timer::from_seconds(seconds.max(0.0), TimerMode::Once),
            completed_rolls: 0,
            last_outcome: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == RollPhase::Idle
    }

    /// Abandon whatever phase is in flight.
    pub fn reset(&mut self) {
        self.phase = RollPhase::Idle;
        self.awaiting = None;
        self.pause.reset();
    }
}

/// The three orthogonal lab flags.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabFlags {
    /// Explode/pause/reassemble in progress.
    pub is_animating: bool,
    pub is_glowing_and_spinning: bool,
    pub fate_mode_enabled: bool,
}

impl LabFlags {
    /// True when neither a roll nor Glow & Spin holds the lab.
    pub fn can_interact(&self) -> bool {
        !self.is_animating && !self.is_glowing_and_spinning
    }
}

/// Which controls the UI should offer right now.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlAvailability {
    pub roll: bool,
    pub fate_toggle: bool,
    pub glow_toggle: bool,
    pub model_select: bool,
    pub theme_select: bool,
    pub size: bool,
    pub wireframe: bool,
    pub reset_view: bool,
    pub lights: bool,
    pub music: bool,
    pub reset: bool,
    pub camera_orbit: bool,
}

impl Default for ControlAvailability {
    fn default() -> Self {
        Self::evaluate(&LabFlags::default(), false)
    }
}

impl ControlAvailability {
    /// Derive control enablement from the lab flags.
    ///
    /// `model_ready` is true once a model with at least one part is loaded.
    pub fn evaluate(flags: &LabFlags, model_ready: bool) -> Self {
        let can_interact = flags.can_interact();
        let manual = can_interact && !flags.fate_mode_enabled;
        Self {
            roll: manual && model_ready,
            fate_toggle: can_interact,
            glow_toggle: !flags.is_animating && !flags.fate_mode_enabled,
            model_select: manual,
            theme_select: manual,
            size: manual,
            wireframe: manual,
            reset_view: manual,
            lights: manual,
            music: manual,
            // Reset is the interruption path, so it is never locked.
            reset: true,
            camera_orbit: !flags.is_animating || flags.fate_mode_enabled,
        }
    }
}

/// Text and indicators the UI displays.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LabStatus {
    pub result_text: String,
    pub loading: bool,
    pub load_error: Option<String>,
}

impl Default for LabStatus {
    fn default() -> Self {
        Self {
            result_text: IDLE_RESULT_TEXT.to_string(),
            loading: false,
            load_error: None,
        }
    }
}

/// Random source for outcomes and explosion perturbations.
#[derive(Resource)]
pub struct LabRng(pub StdRng);

impl Default for LabRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl LabRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}
