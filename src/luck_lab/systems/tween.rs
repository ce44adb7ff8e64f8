//! Per-part pose tweens grouped into phases
//!
//! A phase is a batch of [`PartTween`]s started together. When the last
//! tween of the active phase lands, a single [`PhaseFinished`] message is
//! written. Cancelling the phase drops its tweens without a completion.

use bevy::prelude::*;

use crate::luck_lab::config::{PhaseTuning, TweenEase};
use crate::luck_lab::types::{PartPose, PhaseFinished, TweenPhaseId};

/// Pose animation of one part.
#[derive(Component, Debug, Clone)]
pub struct PartTween {
    pub phase: TweenPhaseId,
    pub start: PartPose,
    pub end: PartPose,
    /// Seconds to wait before moving.
    pub delay: f32,
    pub duration: f32,
    pub ease: TweenEase,
    pub elapsed: f32,
}

impl PartTween {
    /// Step the tween by `dt` seconds.
    ///
    /// Returns `None` while still inside the start delay, otherwise the new
    /// pose and whether the tween has finished.
    pub fn advance(&mut self, dt: f32) -> Option<(PartPose, bool)> {
        self.elapsed += dt;
        let active = self.elapsed - self.delay;
        if active < 0.0 {
            return None;
        }
        if self.duration <= 0.0 || active >= self.duration {
            return Some((self.end, true));
        }
        let t = self.ease.sample(active / self.duration);
        Some((self.start.interpolate(&self.end, t), false))
    }
}

/// A tween to schedule: move `part` from `start` to `end`, starting after `delay`.
#[derive(Debug, Clone, Copy)]
pub struct PlannedTween {
    pub part: Entity,
    pub start: PartPose,
    pub end: PartPose,
    pub delay: f32,
}

#[derive(Debug, Clone, Copy)]
struct ActivePhase {
    id: TweenPhaseId,
    remaining: usize,
}

/// Tracks the phase currently in flight.
#[derive(Resource, Debug, Default)]
pub struct TweenScheduler {
    next_id: u64,
    active: Option<ActivePhase>,
}

impl TweenScheduler {
    /// Open a new phase expecting `tween_count` completions.
    ///
    /// Any phase still in flight is superseded.
    pub fn begin(&mut self, tween_count: usize) -> TweenPhaseId {
        let id = TweenPhaseId(self.next_id);
        self.next_id += 1;
        self.active = Some(ActivePhase {
            id,
            remaining: tween_count,
        });
        id
    }

    /// Drop the active phase. Its tweens stop and it never reports completion.
    pub fn cancel(&mut self) -> Option<TweenPhaseId> {
        self.active.take().map(|phase| phase.id)
    }

    pub fn active_phase(&self) -> Option<TweenPhaseId> {
        self.active.map(|phase| phase.id)
    }

    pub fn is_active(&self, id: TweenPhaseId) -> bool {
        self.active_phase() == Some(id)
    }

    /// Count one tween of `id` as done. Returns true when that was the last one.
    fn complete_one(&mut self, id: TweenPhaseId) -> bool {
        let Some(phase) = self.active.as_mut() else {
            return false;
        };
        if phase.id != id {
            return false;
        }
        phase.remaining = phase.remaining.saturating_sub(1);
        if phase.remaining == 0 {
            self.active = None;
            true
        } else {
            false
        }
    }
}

/// Start a phase made of `planned` tweens.
///
/// Returns `None` when nothing was planned; such a phase is complete at once
/// and no completion message will follow.
pub fn schedule_phase(
    commands: &mut Commands,
    scheduler: &mut TweenScheduler,
    planned: Vec<PlannedTween>,
    tuning: &PhaseTuning,
) -> Option<TweenPhaseId> {
    if planned.is_empty() {
        scheduler.cancel();
        return None;
    }

    let id = scheduler.begin(planned.len());
    for plan in planned {
        commands.entity(plan.part).insert(PartTween {
            phase: id,
            start: plan.start,
            end: plan.end,
            delay: plan.delay,
            duration: tuning.duration,
            ease: tuning.ease,
            elapsed: 0.0,
        });
    }
    Some(id)
}

/// Advance every running tween and report finished phases.
pub fn advance_part_tweens(
    mut commands: Commands,
    time: Res<Time>,
    mut scheduler: ResMut<TweenScheduler>,
    mut tweens: Query<(Entity, &mut Transform, &mut PartTween)>,
    mut finished: MessageWriter<PhaseFinished>,
) {
    let dt = time.delta_secs();
    for (entity, mut transform, mut tween) in &mut tweens {
        if !scheduler.is_active(tween.phase) {
            commands.entity(entity).remove::<PartTween>();
            continue;
        }

        let Some((pose, done)) = tween.advance(dt) else {
            continue;
        };
        pose.apply_to(&mut transform);

        if done {
            commands.entity(entity).remove::<PartTween>();
            if scheduler.complete_one(tween.phase) {
                debug!("Tween phase {:?} finished", tween.phase);
                finished.write(PhaseFinished { phase: tween.phase });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tween(delay: f32, duration: f32) -> PartTween {
        PartTween {
            phase: TweenPhaseId(0),
            start: PartPose {
                translation: Vec3::ZERO,
                rotation: Quat::IDENTITY,
            },
            end: PartPose {
                translation: Vec3::X * 2.0,
                rotation: Quat::from_rotation_y(1.0),
            },
            delay,
            duration,
            ease: TweenEase::Linear,
            elapsed: 0.0,
        }
    }

    #[test]
    fn test_tween_waits_for_delay() {
        let mut t = tween(0.5, 1.0);
        assert!(t.advance(0.25).is_none());
        let (pose, done) = t.advance(0.75).expect("past delay");
        assert!(!done);
        assert!((pose.translation.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_tween_lands_exactly_on_end() {
        let mut t = tween(0.0, 1.0);
        let (pose, done) = t.advance(5.0).expect("running");
        assert!(done);
        assert_eq!(pose, t.end);
    }

    #[test]
    fn test_zero_duration_finishes_at_once() {
        let mut t = tween(0.0, 0.0);
        let (pose, done) = t.advance(0.0).expect("running");
        assert!(done);
        assert_eq!(pose, t.end);
    }

    #[test]
    fn test_scheduler_reports_last_completion_once() {
        let mut scheduler = TweenScheduler::default();
        let id = scheduler.begin(2);
        assert!(scheduler.is_active(id));
        assert!(!scheduler.complete_one(id));
        assert!(scheduler.complete_one(id));
        assert!(!scheduler.complete_one(id));
        assert_eq!(scheduler.active_phase(), None);
    }

    #[test]
    fn test_cancelled_phase_never_completes() {
        let mut scheduler = TweenScheduler::default();
        let old = scheduler.begin(1);
        assert_eq!(scheduler.cancel(), Some(old));
        assert!(!scheduler.complete_one(old));

        let new = scheduler.begin(1);
        assert_ne!(old, new);
        assert!(!scheduler.complete_one(old));
        assert!(scheduler.complete_one(new));
    }
}
