//! Parts of the loaded model and their rest poses

use std::collections::HashMap;

use bevy::prelude::*;

use super::model::ModelKey;

/// Marker for the root entity of the currently loaded model.
#[derive(Component, Debug, Clone, Copy)]
pub struct LabModel {
    pub key: ModelKey,
}

/// Attached to every captured part; `index` is its position in the part list.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabPart {
    pub index: usize,
}

/// Local position and orientation of a part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartPose {
    pub translation: Vec3,
    pub rotation: Quat,
}

/// The rest pose a part returns to after reassembly.
pub type OriginalState = PartPose;

impl PartPose {
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            translation: transform.translation,
            rotation: transform.rotation,
        }
    }

    pub fn apply_to(&self, transform: &mut Transform) {
        transform.translation = self.translation;
        transform.rotation = self.rotation;
    }

    /// Interpolate position linearly and orientation spherically.
    pub fn interpolate(&self, to: &PartPose, t: f32) -> PartPose {
        PartPose {
            translation: self.translation.lerp(to.translation, t),
            rotation: self.rotation.slerp(to.rotation, t),
        }
    }

    pub fn approx_eq(&self, other: &PartPose, tolerance: f32) -> bool {
        self.translation.abs_diff_eq(other.translation, tolerance)
            // q and -q are the same orientation
            && self.rotation.dot(other.rotation).abs() >= 1.0 - tolerance
    }
}

/// Resource holding the parts of the current model and their rest poses.
///
/// Every part in `parts` has exactly one entry in `originals`. The registry is
/// cleared when the model is swapped and re-snapshotted whenever the model is
/// rescaled.
#[derive(Resource, Debug, Default)]
pub struct PartRegistry {
    root: Option<Entity>,
    parts: Vec<Entity>,
    originals: HashMap<Entity, OriginalState>,
}

impl PartRegistry {
    pub fn install(
        &mut self,
        root: Entity,
        parts: Vec<Entity>,
        originals: HashMap<Entity, OriginalState>,
    ) {
        self.root = Some(root);
        self.parts = parts;
        self.originals = originals;
    }

    /// Forget the current model entirely.
    pub fn clear(&mut self) {
        self.root = None;
        self.parts.clear();
        self.originals.clear();
    }

    pub fn root(&self) -> Option<Entity> {
        self.root
    }

    pub fn parts(&self) -> &[Entity] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn original(&self, part: Entity) -> Option<&OriginalState> {
        self.originals.get(&part)
    }

    pub fn originals(&self) -> &HashMap<Entity, OriginalState> {
        &self.originals
    }

    pub fn originals_mut(&mut self) -> &mut HashMap<Entity, OriginalState> {
        &mut self.originals
    }
}

/// Base normalization scale and the user's size multiplier.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ModelScale {
    /// Derived from the model bounds at load time.
    pub base: f32,
    /// Slider-controlled, range-bounded.
    pub multiplier: f32,
}

impl Default for ModelScale {
    fn default() -> Self {
        Self {
            base: 1.0,
            multiplier: 1.0,
        }
    }
}

impl ModelScale {
    pub fn effective(&self) -> f32 {
        self.base * self.multiplier
    }

    /// Size display text, e.g. `1.5x`.
    pub fn label(&self) -> String {
        format!("{:.1}x", self.multiplier)
    }
}
