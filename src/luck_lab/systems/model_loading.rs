//! glTF model spawning for the windowed app
//!
//! Answers [`SpawnModel`] by spawning the model's glTF scene and reports
//! [`ModelReady`] once the scene instance is in the world, or
//! [`ModelLoadFailed`] if the asset or any asset it depends on (meshes,
//! textures, buffers) could not be loaded.

use bevy::asset::{LoadState, RecursiveDependencyLoadState};
use bevy::prelude::*;

use crate::luck_lab::types::*;

/// A model root whose scene has not finished spawning yet.
#[derive(Component, Debug, Clone)]
pub struct PendingModel {
    pub handle: Handle<Scene>,
    pub path: String,
}

pub fn spawn_requested_models(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut requests: MessageReader<SpawnModel>,
) {
    for request in requests.read() {
        let handle: Handle<Scene> =
            asset_server.load(GltfAssetLabel::Scene(0).from_asset(request.path.clone()));
        commands.spawn((
            SceneRoot(handle.clone()),
            Transform::default(),
            LabModel { key: request.key },
            PendingModel {
                handle,
                path: request.path.clone(),
            },
            Name::new(format!("LabModel({})", request.key.label())),
        ));
    }
}

/// Reason a pending model can never become ready, if any.
pub fn load_failure(
    load: &LoadState,
    dependencies: &RecursiveDependencyLoadState,
) -> Option<String> {
    match (load, dependencies) {
        (LoadState::Failed(err), _) => Some(err.to_string()),
        (_, RecursiveDependencyLoadState::Failed(err)) => {
            Some(format!("a dependency failed to load: {err}"))
        }
        _ => None,
    }
}

pub fn poll_pending_models(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    pending: Query<(Entity, &LabModel, &PendingModel, Option<&Children>)>,
    mut ready: MessageWriter<ModelReady>,
    mut failed: MessageWriter<ModelLoadFailed>,
) {
    for (entity, model, pending, children) in &pending {
        let failure = load_failure(
            &asset_server.load_state(&pending.handle),
            &asset_server.recursive_dependency_load_state(&pending.handle),
        );
        if let Some(reason) = failure {
            failed.write(ModelLoadFailed {
                key: model.key,
                path: pending.path.clone(),
                reason,
            });
            commands.entity(entity).despawn();
            continue;
        }

        // The scene instance lands under the root a frame or more after the asset loads.
        let spawned = children.is_some_and(|c| !c.is_empty());
        if asset_server.is_loaded_with_dependencies(&pending.handle) && spawned {
            commands.entity(entity).remove::<PendingModel>();
            ready.write(ModelReady { root: entity });
        }
    }
}
