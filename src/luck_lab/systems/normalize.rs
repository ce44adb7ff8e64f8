//! Scale and center normalization of the loaded model
//!
//! Bounds are computed from mesh vertex positions composed through the local
//! transforms of the hierarchy, so they are valid on the same frame a
//! transform was written (no wait for transform propagation).

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_mesh::{Mesh, VertexAttributeValues};

use crate::luck_lab::error::LabError;
use crate::luck_lab::types::ModelScale;

/// Extents at or below this are treated as zero.
pub const MIN_EXTENT: f32 = 1e-6;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl ModelBounds {
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.max_dimension() > MIN_EXTENT)
    }

    pub fn union(&self, other: &ModelBounds) -> ModelBounds {
        ModelBounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn translated(&self, offset: Vec3) -> ModelBounds {
        ModelBounds {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Bounds of this box's eight corners after `matrix` is applied.
    pub fn transformed(&self, matrix: Mat4) -> ModelBounds {
        let (lo, hi) = (self.min, self.max);
        let corners = [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ];

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for c in corners {
            let p = matrix.transform_point3(c);
            min = min.min(p);
            max = max.max(p);
        }
        ModelBounds { min, max }
    }
}

pub(crate) fn local_matrix(transform: &Transform) -> Mat4 {
    Mat4::from_scale_rotation_translation(transform.scale, transform.rotation, transform.translation)
}

/// Bounds of a mesh in its own local space.
pub fn mesh_local_bounds(mesh: &Mesh) -> Option<ModelBounds> {
    let Some(VertexAttributeValues::Float32x3(positions)) = mesh.attribute(Mesh::ATTRIBUTE_POSITION)
    else {
        return None;
    };
    if positions.is_empty() {
        return None;
    }

    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for p in positions {
        let v = Vec3::new(p[0], p[1], p[2]);
        min = min.min(v);
        max = max.max(v);
    }
    Some(ModelBounds { min, max })
}

/// Read access to the hierarchy and meshes of a model.
#[derive(SystemParam)]
pub struct ModelGeometry<'w, 's> {
    children: Query<'w, 's, &'static Children>,
    mesh_handles: Query<'w, 's, &'static Mesh3d>,
    meshes: Res<'w, Assets<Mesh>>,
}

impl ModelGeometry<'_, '_> {
    /// Bounds of the model under `root` if the root were placed at
    /// `root_transform`, in the root's parent space.
    ///
    /// Returns `None` when no mesh in the hierarchy has positions yet.
    pub fn measure(
        &self,
        root: Entity,
        root_transform: &Transform,
        transforms: &Query<&mut Transform>,
    ) -> Option<ModelBounds> {
        let mut bounds = None;
        let mut stack = vec![(root, local_matrix(root_transform))];
        while let Some((entity, parent_from_entity)) = stack.pop() {
            if let Some(local) = self
                .mesh_handles
                .get(entity)
                .ok()
                .and_then(|handle| self.meshes.get(&handle.0))
                .and_then(mesh_local_bounds)
            {
                let placed = local.transformed(parent_from_entity);
                bounds = Some(match bounds {
                    Some(b) => placed.union(&b),
                    None => placed,
                });
            }

            let Ok(children) = self.children.get(entity) else {
                continue;
            };
            for child in children.to_vec() {
                let child_matrix = transforms
                    .get(child)
                    .map(local_matrix)
                    .unwrap_or(Mat4::IDENTITY);
                stack.push((child, parent_from_entity * child_matrix));
            }
        }
        bounds
    }
}

/// Scale that fits the largest dimension of `bounds` into one unit.
///
/// Missing or degenerate bounds fall back to 1.
pub fn base_scale_for(bounds: Option<ModelBounds>) -> f32 {
    match bounds {
        Some(b) if !b.is_degenerate() => 1.0 / b.max_dimension(),
        _ => {
            warn!("{}; using base scale 1", LabError::DegenerateBounds);
            1.0
        }
    }
}

/// Scale the root uniformly by `scale.effective()` and move it so its bounds
/// are centered on X/Z with the bottom resting on y = 0.
///
/// Returns the bounds after placement.
pub fn apply_scale(
    root: Entity,
    scale: &ModelScale,
    transforms: &mut Query<&mut Transform>,
    geometry: &ModelGeometry,
) -> Option<ModelBounds> {
    let Ok(current) = transforms.get(root) else {
        return None;
    };
    let mut placed = *current;
    placed.scale = Vec3::splat(scale.effective());
    placed.translation = Vec3::ZERO;

    let bounds = geometry.measure(root, &placed, transforms);
    match bounds {
        Some(b) if !b.is_degenerate() => {
            let center = b.center();
            placed.translation = Vec3::new(-center.x, -b.min.y, -center.z);
        }
        _ => debug!("Model bounds unavailable; leaving root at origin"),
    }

    if let Ok(mut transform) = transforms.get_mut(root) {
        *transform = placed;
    }
    bounds.map(|b| b.translated(placed.translation))
}
