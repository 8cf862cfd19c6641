//! Scene State
//!
//! One camera, one flat mesh list, one environment. Deliberately not a
//! scene graph.

pub mod camera;
pub mod mesh;

pub use camera::Camera;
pub use mesh::{Material, Mesh};

use crate::animation::{Action, ActionManager, IntroAction, KeyframeAction, OrbitAction};
use crate::assets::SceneDocument;
use crate::errors::Result;
use crate::renderer::geometry::Geometry;

/// Name of the entrance animation in the action manager.
pub const INTRO_ACTION: &str = "intro";
/// Name of the persistent orbit interaction.
pub const ORBIT_ACTION: &str = "orbit";

/// Everything the frame orchestrator draws.
pub struct Scene {
    pub camera: Camera,
    pub meshes: Vec<Mesh>,
}

impl Scene {
    /// Builds the scene from a parsed document, uploading one [`Geometry`]
    /// per mesh record and registering the timeline actions it implies:
    /// the intro and orbit actions always, plus one keyframe action named
    /// `mesh.<index>` per animated record.
    pub fn from_document(
        device: &wgpu::Device,
        document: &SceneDocument,
        aspect: f32,
        actions: &mut ActionManager,
    ) -> Result<Self> {
        actions.insert(INTRO_ACTION, Action::Intro(IntroAction::new()));
        actions.insert_persistent(ORBIT_ACTION, Action::Orbit(OrbitAction::new()));

        let mut meshes = Vec::with_capacity(document.meshes.len());
        for (index, record) in document.meshes.iter().enumerate() {
            let animation = if record.animation.has_keyframes() {
                let name = format!("mesh.{index}");
                actions.insert(
                    name.clone(),
                    Action::Keyframe(KeyframeAction::new(record.animation.keyframes.clone())),
                );
                Some(name)
            } else {
                None
            };

            let geometry = Geometry::from_record(device, &format!("mesh.{index}"), record)?;
            meshes.push(Mesh::new(record, geometry, animation));
        }

        Ok(Self {
            camera: Camera::showcase(aspect),
            meshes,
        })
    }
}
