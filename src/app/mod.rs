//! Application shell.
//!
//! Owns the winit event loop, the startup sequence, and the per-frame
//! tick → draw cycle. Startup is the only suspension point: scene and
//! environment assets are read and decoded, the GPU context comes up, and
//! the IBL maps are precomputed before the first frame; any failure aborts
//! instead of entering the render loop with incomplete state.

pub mod input;
pub mod tick;

use std::path::PathBuf;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::animation::ActionManager;
use crate::assets::{SceneDocument, rgbe};
use crate::errors::Result;
use crate::renderer::Renderer;
use crate::renderer::context::GpuContext;
use crate::renderer::profiler::{CpuTimer, timing_report};
use crate::scene::{INTRO_ACTION, Scene};
use crate::utils::Timer;
use input::InputState;
use tick::{TickDriver, TickPolicy};

/// How many frames between debug timing reports.
const TIMING_LOG_INTERVAL: u64 = 15;

/// Everything that exists only after startup succeeds.
struct Stage {
    renderer: Renderer,
    scene: Scene,
    actions: ActionManager,
}

pub struct App {
    title: String,
    scene_path: PathBuf,
    hdr_path: PathBuf,

    window: Option<Arc<Window>>,
    stage: Option<Stage>,

    input: InputState,
    timer: Timer,
    ticker: TickDriver,
    cpu_timer: CpuTimer,
}

impl App {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        scene_path: impl Into<PathBuf>,
        hdr_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            title: title.into(),
            scene_path: scene_path.into(),
            hdr_path: hdr_path.into(),
            window: None,
            stage: None,
            input: InputState::new(1280, 720),
            timer: Timer::new(),
            ticker: TickDriver::new(TickPolicy::PerDisplayFrame),
            cpu_timer: CpuTimer::new(),
        }
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    /// The startup sequence: load + decode assets, bring up the GPU,
    /// precompute the IBL maps, register the timeline.
    fn init_stage(&mut self, window: Arc<Window>) -> Result<Stage> {
        let document = SceneDocument::from_path(&self.scene_path)?;
        let hdr_bytes = std::fs::read(&self.hdr_path)?;
        let panorama = rgbe::decode(&hdr_bytes)?;
        log::info!(
            "loaded scene ({} meshes) and {}x{} environment",
            document.meshes.len(),
            panorama.width,
            panorama.height
        );

        let size = window.inner_size();
        let ctx = pollster::block_on(GpuContext::new(window, size.width, size.height))?;

        let mut actions = ActionManager::new();
        let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;
        let scene = Scene::from_document(&ctx.device, &document, aspect, &mut actions)?;
        actions.play(INTRO_ACTION);

        let renderer = Renderer::new(ctx, &scene, &panorama)?;
        Ok(Stage {
            renderer,
            scene,
            actions,
        })
    }

    /// Left click replays every mesh's keyframe animation from the start.
    fn replay_mesh_animations(stage: &mut Stage) {
        for mesh in &stage.scene.meshes {
            let Some(name) = mesh.animation.as_deref() else {
                continue;
            };
            if let Some(action) = stage.actions.get_mut(name) {
                action.reset();
            }
            stage.actions.play(name);
        }
    }

    fn redraw(&mut self) {
        let Some(stage) = &mut self.stage else { return };

        self.timer.tick();
        let ticks = self.ticker.advance(self.timer.dt_seconds() * 1000.0);

        let input = &mut self.input;
        let actions = &mut stage.actions;
        self.cpu_timer.with("tick", || {
            for _ in 0..ticks {
                let sample = input.sample();
                actions.tick(&sample);
            }
        });

        let draw_start = std::time::Instant::now();
        stage
            .renderer
            .render(&stage.scene, &stage.actions, &mut self.cpu_timer);
        self.cpu_timer
            .record("root-draw", draw_start.elapsed().as_secs_f32() * 1000.0);

        if self.timer.frame_count % TIMING_LOG_INTERVAL == 0 && log::log_enabled!(log::Level::Debug)
        {
            for row in timing_report(&self.cpu_timer, stage.renderer.gpu_timer()) {
                log::debug!(
                    "{:>16} | gpu {} | cpu {}",
                    row.name,
                    row.gpu_ms.map_or_else(|| "  ----".into(), |ms| format!("{ms:6.2}")),
                    row.cpu_ms.map_or_else(|| "  ----".into(), |ms| format!("{ms:6.2}")),
                );
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let size = window.inner_size();
        self.input.handle_resize(size.width, size.height);

        log::info!("initializing renderer backend");
        match self.init_stage(window) {
            Ok(stage) => self.stage = Some(stage),
            Err(e) => {
                log::error!("fatal startup error: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.input.handle_resize(size.width, size.height);
                if let Some(stage) = &mut self.stage {
                    stage
                        .renderer
                        .resize(&mut stage.scene.camera, size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.handle_cursor_move(position.x, position.y);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if let Some(stage) = &mut self.stage {
                    Self::replay_mesh_animations(stage);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
