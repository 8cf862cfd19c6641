use glam::{Quat, Vec3};

use crate::assets::MeshRecord;
use crate::renderer::geometry::Geometry;

/// PBR material scalars for one mesh.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub diffuse: Vec3,
    pub roughness: f32,
    pub metallic: f32,
}

/// One drawable object: a static transform, an uploaded geometry batch, a
/// material, and optionally the name of the keyframe action that drives its
/// per-mesh animation offset.
pub struct Mesh {
    pub location: Vec3,
    pub rotation: Quat,
    pub geometry: Geometry,
    pub material: Material,
    pub animation: Option<String>,
}

impl Mesh {
    #[must_use]
    pub fn new(record: &MeshRecord, geometry: Geometry, animation: Option<String>) -> Self {
        let [x, y, z, w] = record.transform.rotation;
        Self {
            location: Vec3::from_array(record.transform.location),
            rotation: Quat::from_xyzw(x, y, z, w),
            geometry,
            material: Material {
                diffuse: Vec3::from_array(record.material.color),
                roughness: record.material.roughness,
                metallic: record.material.metallic,
            },
            animation,
        }
    }
}
