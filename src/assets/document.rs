//! Scene asset document.
//!
//! The host hands the renderer a JSON array of mesh records; this module is
//! the serde schema for it plus file/slice entry points.

use std::path::Path;

use serde::Deserialize;

use crate::errors::Result;

/// The whole scene asset: a flat list of mesh records.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct SceneDocument {
    pub meshes: Vec<MeshRecord>,
}

impl SceneDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_slice(&bytes)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeshRecord {
    pub transform: TransformRecord,
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u16>,
    pub material: MaterialRecord,
    /// `{}` in the document means "no animation".
    #[serde(default)]
    pub animation: AnimationRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformRecord {
    pub location: [f32; 3],
    /// Quaternion components `[x, y, z, w]`.
    pub rotation: [f32; 4],
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialRecord {
    pub color: [f32; 3],
    pub roughness: f32,
    pub metallic: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimationRecord {
    #[serde(default)]
    pub keyframes: Vec<f32>,
}

impl AnimationRecord {
    /// Whether this record actually carries an animation.
    #[must_use]
    pub fn has_keyframes(&self) -> bool {
        !self.keyframes.is_empty()
    }
}
