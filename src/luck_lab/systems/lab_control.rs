//! Interruption, model swaps and rescaling
//!
//! Reset and model loading share one interruption path,
//! [`LabControl::interrupt`]: in-flight tweens are cancelled, both modes are
//! forced off, parts go back to their rest poses and the model is
//! re-normalized, leaving the lab idle.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::luck_lab::config::LabConfig;
use crate::luck_lab::error::LabError;
use crate::luck_lab::particles::ParticleBurstInstance;
use crate::luck_lab::types::*;

use super::modes::{stop_glow, FateMode, GlowSpin};
use super::normalize::{apply_scale, base_scale_for, ModelBounds, ModelGeometry};
use super::part_registry::{capture_parts, resnapshot, restore, snapshot};
use super::tween::{PartTween, TweenScheduler};

/// Everything the interruption path touches.
#[derive(SystemParam)]
pub struct LabControl<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub config: Res<'w, LabConfig>,
    pub flags: ResMut<'w, LabFlags>,
    pub lifecycle: ResMut<'w, RollLifecycle>,
    pub scheduler: ResMut<'w, TweenScheduler>,
    pub registry: ResMut<'w, PartRegistry>,
    pub scale: ResMut<'w, ModelScale>,
    pub status: ResMut<'w, LabStatus>,
    pub fate: ResMut<'w, FateMode>,
    pub glow: ResMut<'w, GlowSpin>,
    pub transforms: Query<'w, 's, &'static mut Transform>,
    pub geometry: ModelGeometry<'w, 's>,
    tweening: Query<'w, 's, Entity, With<PartTween>>,
    bursts: Query<'w, 's, Entity, With<ParticleBurstInstance>>,
}

impl LabControl<'_, '_> {
    /// Stop everything in flight and return the model to rest.
    pub fn interrupt(&mut self) {
        if let Some(phase) = self.scheduler.cancel() {
            debug!("Cancelled tween phase {:?}", phase);
        }
        for entity in &self.tweening {
            self.commands.entity(entity).remove::<PartTween>();
        }
        self.lifecycle.reset();
        self.flags.is_animating = false;

        stop_glow(&mut self.commands, &mut self.flags, &mut self.glow);
        if self.flags.fate_mode_enabled {
            self.flags.fate_mode_enabled = false;
            info!("Fate Mode disabled");
        }
        self.fate.timer.reset();

        if let Some(root) = self.registry.root() {
            if self.registry.originals().is_empty() {
                debug!("No rest poses recorded; re-centering model root");
                if let Ok(mut transform) = self.transforms.get_mut(root) {
                    transform.translation = Vec3::ZERO;
                    transform.rotation = Quat::IDENTITY;
                }
            } else {
                restore(&self.registry, &mut self.transforms);
            }
            // Undo any glow spin on the root.
            if let Ok(mut transform) = self.transforms.get_mut(root) {
                transform.rotation = Quat::IDENTITY;
            }
            self.rescale();
        }

        for entity in &self.bursts {
            self.commands.entity(entity).despawn();
        }
        self.status.result_text = IDLE_RESULT_TEXT.to_string();
    }

    /// Re-apply the current scale to the model and record the parts' new rest poses.
    pub fn rescale(&mut self) -> Option<ModelBounds> {
        let root = self.registry.root()?;
        let bounds = apply_scale(root, &self.scale, &mut self.transforms, &self.geometry);
        resnapshot(&mut self.registry, &self.transforms);
        bounds
    }
}

pub fn handle_reset_requests(mut requests: MessageReader<ResetRequested>, mut lab: LabControl) {
    if requests.read().count() == 0 {
        return;
    }
    info!("Resetting lab");
    lab.interrupt();
}

/// Tear down the current model and ask the scene layer for the requested one.
pub fn begin_model_swap(
    mut requests: MessageReader<LoadModelRequested>,
    mut lab: LabControl,
    mut selected: ResMut<SelectedModel>,
    mut spawns: MessageWriter<SpawnModel>,
    models: Query<Entity, With<LabModel>>,
) {
    // Only the newest valid request in a frame matters.
    let Some(key) = requests
        .read()
        .filter_map(|request| match ModelKey::parse(&request.key) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("{e}");
                None
            }
        })
        .last()
    else {
        return;
    };

    lab.interrupt();
    for entity in &models {
        lab.commands.entity(entity).despawn();
    }
    lab.registry.clear();
    lab.scale.base = 1.0;

    selected.key = key;
    lab.status.loading = true;
    lab.status.load_error = None;

    let path = lab.config.model_path(key).to_string();
    info!("Loading {} from {}", key.label(), path);
    spawns.write(SpawnModel { key, path });
}

/// Install a freshly spawned model: normalize it and capture its parts.
pub fn finish_model_load(
    mut ready: MessageReader<ModelReady>,
    mut lab: LabControl,
    selected: Res<SelectedModel>,
    models: Query<&LabModel>,
    children: Query<&Children>,
    renderables: Query<(), With<Mesh3d>>,
) {
    for message in ready.read() {
        let root = message.root;
        match models.get(root) {
            Ok(model) if model.key == selected.key => {}
            _ => {
                debug!("Ignoring stale model {:?}", root);
                continue;
            }
        }

        let Ok(current) = lab.transforms.get(root) else {
            continue;
        };
        let mut unit = *current;
        unit.translation = Vec3::ZERO;
        unit.scale = Vec3::ONE;
        let natural = lab.geometry.measure(root, &unit, &lab.transforms);
        lab.scale.base = base_scale_for(natural);

        let (parts, _) = capture_parts(root, &children, &renderables);
        if parts.is_empty() {
            warn!("Model {:?} has no renderable parts", root);
        }
        let originals = snapshot(&parts, &lab.transforms);
        for (index, &part) in parts.iter().enumerate() {
            lab.commands.entity(part).insert(LabPart { index });
        }
        let part_count = parts.len();
        lab.registry.install(root, parts, originals);
        lab.rescale();

        lab.status.loading = false;
        lab.status.load_error = None;
        info!(
            "Model {} ready with {} parts (base scale {:.3})",
            selected.key.label(),
            part_count,
            lab.scale.base
        );
    }
}

pub fn handle_model_load_failures(
    mut failures: MessageReader<ModelLoadFailed>,
    mut status: ResMut<LabStatus>,
) {
    for failure in failures.read() {
        let error = LabError::AssetLoadFailure {
            key: failure.key.key().to_string(),
            path: failure.path.clone(),
            reason: failure.reason.clone(),
        };
        error!("{error}");
        status.loading = false;
        status.load_error = Some(error.to_string());
        status.result_text = LOAD_ERROR_TEXT.to_string();
    }
}

/// Apply size multiplier changes. Only honored while the size control would
/// be offered: not mid-roll, not while glowing and not under Fate Mode.
pub fn handle_size_changes(mut requests: MessageReader<SetSizeMultiplier>, mut lab: LabControl) {
    for request in requests.read() {
        if !lab.flags.can_interact() || lab.flags.fate_mode_enabled {
            warn!(
                "Ignoring size change to {}: size is locked right now",
                request.multiplier
            );
            continue;
        }
        let multiplier = lab.config.size.clamp(request.multiplier);
        if multiplier == lab.scale.multiplier {
            continue;
        }
        lab.scale.multiplier = multiplier;
        lab.rescale();
        debug!("Size multiplier set to {}", lab.scale.label());
    }
}
