//! Roll lifecycle: explode, pause, reassemble, resolve
//!
//! ```text
//! Idle -> Exploding -> PausedBeforeReassemble -> Reassembling -> ResolvingOutcome -> Idle
//! ```
//!
//! Phase changes are driven by [`PhaseFinished`] messages from the tween
//! scheduler and by the pause timer. Interruption (reset, model swap) lives
//! in `lab_control`.

use bevy::prelude::*;
use rand::Rng;

use crate::luck_lab::config::{AnimationTuning, LabConfig};
use crate::luck_lab::error::LabError;
use crate::luck_lab::particles::ParticleHooks;
use crate::luck_lab::types::*;

use super::part_registry::parent_to_model;
use super::tween::{schedule_phase, PlannedTween, TweenScheduler};

/// Below this length a part's position gives no usable explosion direction.
pub const MIN_DIRECTION_LENGTH: f32 = 1e-3;

fn random_unit_vector(rng: &mut impl Rng) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let theta: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Exploded pose of a part: pushed `travel` units away from the model origin
/// and tilted by up to `max_tilt` radians on each Euler axis.
///
/// `to_model` maps the part's parent space into model-root space. The
/// direction and distance are measured there and the target is mapped back
/// into the part's own local space.
pub fn explosion_target(
    original: &PartPose,
    to_model: Mat4,
    travel: f32,
    max_tilt: f32,
    rng: &mut impl Rng,
) -> PartPose {
    let position = to_model.transform_point3(original.translation);
    let direction = if position.length() < MIN_DIRECTION_LENGTH {
        random_unit_vector(rng)
    } else {
        position.normalize()
    };
    let pushed = position + direction * travel;
    let translation = if to_model.determinant().abs() > f32::EPSILON {
        to_model.inverse().transform_point3(pushed)
    } else {
        original.translation + direction * travel
    };

    let mut tilt = || {
        if max_tilt > 0.0 {
            rng.gen_range(-max_tilt..=max_tilt)
        } else {
            0.0
        }
    };
    let (x, y, z) = original.rotation.to_euler(EulerRot::XYZ);
    let rotation = Quat::from_euler(EulerRot::XYZ, x + tilt(), y + tilt(), z + tilt());

    PartPose {
        translation,
        rotation,
    }
}

/// Plan the outward phase for every part that has a recorded rest pose.
///
/// `parent_frame` gives each part's parent-to-model matrix.
pub fn plan_explosion(
    registry: &PartRegistry,
    tuning: &AnimationTuning,
    size_multiplier: f32,
    parent_frame: impl Fn(Entity) -> Mat4,
    rng: &mut impl Rng,
) -> Vec<PlannedTween> {
    let travel = tuning.explosion_strength * size_multiplier;
    let mut planned = Vec::with_capacity(registry.parts().len());
    for (index, &part) in registry.parts().iter().enumerate() {
        let Some(original) = registry.original(part) else {
            warn!("{}; part stays put", LabError::MissingOriginalState(part));
            continue;
        };
        planned.push(PlannedTween {
            part,
            start: *original,
            end: explosion_target(original, parent_frame(part), travel, tuning.max_tilt, rng),
            delay: index as f32 * tuning.explode.stagger,
        });
    }
    planned
}

/// Plan the return phase from each part's current pose back to its rest pose.
pub fn plan_reassembly(
    registry: &PartRegistry,
    current: &Query<&Transform, With<LabPart>>,
    stagger: f32,
) -> Vec<PlannedTween> {
    let mut planned = Vec::with_capacity(registry.parts().len());
    for (index, &part) in registry.parts().iter().enumerate() {
        let Some(original) = registry.original(part) else {
            warn!("{}; part stays put", LabError::MissingOriginalState(part));
            continue;
        };
        let start = current
            .get(part)
            .map(PartPose::from_transform)
            .unwrap_or(*original);
        planned.push(PlannedTween {
            part,
            start,
            end: *original,
            delay: index as f32 * stagger,
        });
    }
    planned
}

/// Accept roll requests while the lab is idle, has parts and is not glowing.
#[allow(clippy::too_many_arguments)]
pub fn start_roll_on_request(
    mut commands: Commands,
    mut requests: MessageReader<RollRequested>,
    mut lifecycle: ResMut<RollLifecycle>,
    mut flags: ResMut<LabFlags>,
    mut scheduler: ResMut<TweenScheduler>,
    mut rng: ResMut<LabRng>,
    mut status: ResMut<LabStatus>,
    registry: Res<PartRegistry>,
    scale: Res<ModelScale>,
    config: Res<LabConfig>,
    parents: Query<&ChildOf>,
    transforms: Query<&Transform>,
) {
    for request in requests.read() {
        if !lifecycle.is_idle() || flags.is_animating {
            warn!("Dropping {:?} roll request: a roll is in progress", request.source);
            continue;
        }
        if flags.is_glowing_and_spinning {
            warn!("Dropping {:?} roll request: glow & spin is active", request.source);
            continue;
        }
        let Some(root) = registry.root().filter(|_| !registry.is_empty()) else {
            warn!("Dropping {:?} roll request: no model parts", request.source);
            continue;
        };

        info!(
            "Starting {:?} roll with {} parts",
            request.source,
            registry.parts().len()
        );
        flags.is_animating = true;
        status.result_text = EXPLODING_TEXT.to_string();

        let planned = plan_explosion(
            &registry,
            &config.animation,
            scale.multiplier,
            |part| parent_to_model(part, root, &parents, &transforms),
            &mut rng.0,
        );
        match schedule_phase(
            &mut commands,
            &mut scheduler,
            planned,
            &config.animation.explode,
        ) {
            Some(phase) => {
                lifecycle.phase = RollPhase::Exploding;
                lifecycle.awaiting = Some(phase);
            }
            None => enter_pause(&mut lifecycle, &mut status),
        }
    }
}

fn enter_pause(lifecycle: &mut RollLifecycle, status: &mut LabStatus) {
    lifecycle.phase = RollPhase::PausedBeforeReassemble;
    lifecycle.awaiting = None;
    lifecycle.pause.reset();
    status.result_text = REASSEMBLING_TEXT.to_string();
}

/// Move the roll through its phases as tween phases complete.
#[allow(clippy::too_many_arguments)]
pub fn advance_roll_lifecycle(
    mut commands: Commands,
    time: Res<Time>,
    mut finished: MessageReader<PhaseFinished>,
    mut lifecycle: ResMut<RollLifecycle>,
    mut scheduler: ResMut<TweenScheduler>,
    mut status: ResMut<LabStatus>,
    registry: Res<PartRegistry>,
    config: Res<LabConfig>,
    parts: Query<&Transform, With<LabPart>>,
) {
    for message in finished.read() {
        if lifecycle.awaiting != Some(message.phase) {
            debug!("Ignoring completion of stale tween phase {:?}", message.phase);
            continue;
        }
        match lifecycle.phase {
            RollPhase::Exploding => {
                debug!("Explosion finished; pausing before reassembly");
                enter_pause(&mut lifecycle, &mut status);
            }
            RollPhase::Reassembling => {
                lifecycle.awaiting = None;
                lifecycle.phase = RollPhase::ResolvingOutcome;
            }
            other => {
                warn!("Tween phase {:?} finished during {:?}", message.phase, other);
                lifecycle.awaiting = None;
            }
        }
    }

    if lifecycle.phase != RollPhase::PausedBeforeReassemble {
        return;
    }
    lifecycle.pause.tick(time.delta());
    if !lifecycle.pause.just_finished() {
        return;
    }

    debug!("Pause over; reassembling");
    let planned = plan_reassembly(&registry, &parts, config.animation.reassemble.stagger);
    match schedule_phase(
        &mut commands,
        &mut scheduler,
        planned,
        &config.animation.reassemble,
    ) {
        Some(phase) => {
            lifecycle.phase = RollPhase::Reassembling;
            lifecycle.awaiting = Some(phase);
        }
        None => {
            lifecycle.awaiting = None;
            lifecycle.phase = RollPhase::ResolvingOutcome;
        }
    }
}

/// Draw the outcome once every part is back in place and return to idle.
#[allow(clippy::too_many_arguments)]
pub fn resolve_roll_outcome(
    mut commands: Commands,
    time: Res<Time>,
    mut lifecycle: ResMut<RollLifecycle>,
    mut flags: ResMut<LabFlags>,
    mut rng: ResMut<LabRng>,
    mut history: ResMut<RollHistory>,
    mut status: ResMut<LabStatus>,
    mut completed: MessageWriter<RollCompleted>,
    selected: Res<SelectedModel>,
    hooks: Res<ParticleHooks>,
    config: Res<LabConfig>,
    registry: Res<PartRegistry>,
    roots: Query<&Transform, With<LabModel>>,
) {
    if lifecycle.phase != RollPhase::ResolvingOutcome {
        return;
    }

    let outcome = selected.key.roll(&mut rng.0);
    info!("Roll result: {}", outcome);

    status.result_text = outcome.to_string();
    history.record(outcome.history_label());
    lifecycle.last_outcome = Some(outcome);
    lifecycle.completed_rolls += 1;
    lifecycle.phase = RollPhase::Idle;
    flags.is_animating = false;

    let origin = registry
        .root()
        .and_then(|root| roots.get(root).ok())
        .map(|t| t.translation + Vec3::Y * 0.5)
        .unwrap_or(Vec3::Y * 0.5);
    hooks.spawn_burst(
        &mut commands,
        origin,
        time.elapsed_secs(),
        config.particle_lifetime_seconds,
    );

    completed.write(RollCompleted { outcome });
}

/// Keep [`ControlAvailability`] in sync with the lab flags.
pub fn refresh_control_availability(
    flags: Res<LabFlags>,
    registry: Res<PartRegistry>,
    mut controls: ResMut<ControlAvailability>,
) {
    controls.set_if_neq(ControlAvailability::evaluate(&flags, !registry.is_empty()));
}
