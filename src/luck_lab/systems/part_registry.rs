//! Part capture, snapshot and restore

use std::collections::HashMap;

use bevy::prelude::*;

use crate::luck_lab::error::LabError;
use crate::luck_lab::types::{OriginalState, PartPose, PartRegistry};

use super::normalize::local_matrix;

/// How a loaded model is split into independently animated parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompositionStrategy {
    /// Every renderable descendant that has no children, in depth-first order.
    RenderableLeaves,
    /// The root alone, when it is renderable itself.
    RootItself,
    /// Renderable direct children of the root.
    ImmediateChildren,
}

/// Strategies tried in order; the first one that yields parts wins.
pub const DECOMPOSITION_POLICY: [DecompositionStrategy; 3] = [
    DecompositionStrategy::RenderableLeaves,
    DecompositionStrategy::RootItself,
    DecompositionStrategy::ImmediateChildren,
];

impl DecompositionStrategy {
    pub fn collect(
        self,
        root: Entity,
        children: &Query<&Children>,
        renderables: &Query<(), With<Mesh3d>>,
    ) -> Vec<Entity> {
        match self {
            DecompositionStrategy::RenderableLeaves => {
                let mut found = Vec::new();
                // Children are pushed reversed so they pop in declaration order.
                let mut stack: Vec<Entity> = match children.get(root) {
                    Ok(ch) => ch.to_vec(),
                    Err(_) => Vec::new(),
                };
                stack.reverse();
                while let Some(e) = stack.pop() {
                    let kids: Vec<Entity> = match children.get(e) {
                        Ok(ch) => ch.to_vec(),
                        Err(_) => Vec::new(),
                    };
                    if kids.is_empty() && renderables.contains(e) {
                        found.push(e);
                    }
                    stack.extend(kids.into_iter().rev());
                }
                found
            }
            DecompositionStrategy::RootItself => {
                if renderables.contains(root) {
                    vec![root]
                } else {
                    Vec::new()
                }
            }
            DecompositionStrategy::ImmediateChildren => match children.get(root) {
                Ok(ch) => ch
                    .to_vec()
                    .into_iter()
                    .filter(|e| renderables.contains(*e))
                    .collect(),
                Err(_) => Vec::new(),
            },
        }
    }
}

/// Decompose `root` into parts using [`DECOMPOSITION_POLICY`].
///
/// Returns an empty list (and no strategy) when nothing renderable was found.
pub fn capture_parts(
    root: Entity,
    children: &Query<&Children>,
    renderables: &Query<(), With<Mesh3d>>,
) -> (Vec<Entity>, Option<DecompositionStrategy>) {
    for strategy in DECOMPOSITION_POLICY {
        let parts = strategy.collect(root, children, renderables);
        if !parts.is_empty() {
            debug!("Captured {} parts using {:?}", parts.len(), strategy);
            return (parts, Some(strategy));
        }
    }
    (Vec::new(), None)
}

/// Record the current local pose of every part.
pub fn snapshot(
    parts: &[Entity],
    transforms: &Query<&mut Transform>,
) -> HashMap<Entity, OriginalState> {
    parts
        .iter()
        .filter_map(|&part| {
            transforms
                .get(part)
                .ok()
                .map(|t| (part, PartPose::from_transform(t)))
        })
        .collect()
}

/// Put every part back to its recorded pose. Returns how many were restored.
pub fn restore(registry: &PartRegistry, transforms: &mut Query<&mut Transform>) -> usize {
    let mut restored = 0;
    for &part in registry.parts() {
        let Some(original) = registry.original(part) else {
            warn!("{}", LabError::MissingOriginalState(part));
            continue;
        };
        if let Ok(mut transform) = transforms.get_mut(part) {
            original.apply_to(&mut transform);
            restored += 1;
        }
    }
    restored
}

/// Guards the parent walk against malformed hierarchies.
const MAX_HIERARCHY_DEPTH: usize = 64;

/// Matrix taking points in `part`'s parent space into the model root's space.
///
/// glTF scenes put node offsets on intermediate entities and spawn mesh
/// primitives beneath them at identity, so a part's own translation says
/// nothing about where it sits in the model. Parts that are the root, or
/// that are not under it, get the identity.
pub fn parent_to_model(
    part: Entity,
    root: Entity,
    parents: &Query<&ChildOf>,
    transforms: &Query<&Transform>,
) -> Mat4 {
    if part == root {
        return Mat4::IDENTITY;
    }
    let mut matrix = Mat4::IDENTITY;
    let mut current = match parents.get(part) {
        Ok(child_of) => child_of.parent(),
        Err(_) => return Mat4::IDENTITY,
    };
    for _ in 0..MAX_HIERARCHY_DEPTH {
        if current == root {
            return matrix;
        }
        let Ok(transform) = transforms.get(current) else {
            return Mat4::IDENTITY;
        };
        matrix = local_matrix(transform) * matrix;
        current = match parents.get(current) {
            Ok(child_of) => child_of.parent(),
            Err(_) => return Mat4::IDENTITY,
        };
    }
    Mat4::IDENTITY
}

/// Overwrite each part's recorded pose with its current pose.
pub fn resnapshot(registry: &mut PartRegistry, transforms: &Query<&mut Transform>) {
    let parts = registry.parts().to_vec();
    for part in parts {
        if let Ok(transform) = transforms.get(part) {
            registry
                .originals_mut()
                .insert(part, PartPose::from_transform(transform));
        }
    }
}
