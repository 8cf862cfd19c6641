//! Asset Decoding
//!
//! CPU-side decoders for everything the renderer consumes from the host:
//! the Radiance RGBE environment panorama and the JSON scene document.
//! All decoding is synchronous and happens during startup; any failure
//! aborts initialization before the render loop starts.

pub mod document;
pub mod rgbe;

pub use document::{AnimationRecord, MaterialRecord, MeshRecord, SceneDocument, TransformRecord};
pub use rgbe::HdrImage;
