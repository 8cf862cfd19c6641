#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod app;
pub mod assets;
pub mod errors;
pub mod renderer;
pub mod scene;
pub mod utils;

pub use animation::{Action, ActionManager, InputSample, IntroAction, KeyframeAction, OrbitAction};
pub use app::App;
pub use assets::{HdrImage, MeshRecord, SceneDocument};
pub use errors::{Result, VitrineError};
pub use renderer::Renderer;
pub use renderer::context::GpuContext;
pub use scene::{Camera, Material, Mesh, Scene};
