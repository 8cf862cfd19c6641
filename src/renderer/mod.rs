//! Renderer
//!
//! GPU resource wrappers, the offscreen IBL pipeline, and the per-frame
//! orchestrator. The IBL passes run once at startup (and again on
//! environment reload); every frame after that advances the timeline,
//! rebuilds the per-mesh model matrices, and issues one depth-tested mesh
//! pass. No other pass uses depth.

pub mod buffer;
pub mod context;
pub mod geometry;
pub mod passes;
pub mod profiler;
pub mod shader;
pub mod texture;

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::animation::{Action, ActionManager, IntroAction, KeyframeAction, OrbitAction};
use crate::assets::HdrImage;
use crate::errors::Result;
use crate::scene::{Camera, INTRO_ACTION, ORBIT_ACTION, Scene};
use context::GpuContext;
use geometry::Geometry;
use passes::{BrdfLutPass, EquirectPass, IrradiancePass, MipmapChain, PrefilterPass};
use profiler::{CpuTimer, GpuTimer};
use shader::{
    SamplerSlot, ShaderDefine, ShaderProgram, ShaderProgramDesc, UniformBlockDesc, UniformMember,
    UniformType,
};
use texture::GpuTexture;

/// Edge size of the environment cubemap the panorama is projected onto.
pub const ENVIRONMENT_SIZE: u32 = 1024;
/// Edge size of the irradiance convolution cubemap.
pub const IRRADIANCE_SIZE: u32 = 32;
/// Edge size of mip 0 of the specular prefilter cubemap.
pub const PREFILTER_SIZE: u32 = 128;
/// Edge size of the BRDF lookup table.
pub const BRDF_LUT_SIZE: u32 = 512;

/// Fixed base orientation every mesh shares; orbit input perturbs it.
pub const BASE_ROTATION: Vec3 = Vec3::new(-1.0, 0.5, 0.0);
/// Key light direction.
pub const LIGHT_DIRECTION: Vec3 = Vec3::new(0.2, -0.25, -1.0);

const MESH_PASS: &str = "mesh-pass";

/// The precomputed image-based-lighting set consumed by every frame.
pub struct IblMaps {
    pub environment: GpuTexture,
    pub irradiance: GpuTexture,
    pub prefilter: GpuTexture,
    pub brdf_lut: GpuTexture,
}

/// Builds one mesh's model matrix from its static transform and the
/// timeline outputs, in the documented composition order: entrance
/// interpolation, static rotation, orbit rotation about the mesh's own
/// origin, then the per-mesh animation Z offset.
#[must_use]
pub fn compose_model_matrix(
    location: Vec3,
    rotation: Quat,
    intro_eased: f32,
    orbit_offset: Vec2,
    animation_offset: f32,
    scale: f32,
) -> Mat4 {
    let entry_offset = Vec3::new(0.0, 0.0, 1.0).lerp(Vec3::ZERO, intro_eased);
    let translation = Mat4::from_translation(location) * Mat4::from_translation(entry_offset);
    let model = translation * Mat4::from_quat(rotation);

    let orbit = Quat::from_rotation_x(BASE_ROTATION.x + orbit_offset.y * 0.1)
        * Quat::from_rotation_y(BASE_ROTATION.y + orbit_offset.x * 0.1)
        * Quat::from_rotation_z(BASE_ROTATION.z);
    let about_origin = rotate_scale_about(orbit, Vec3::splat(scale), -location);

    model * about_origin * Mat4::from_translation(Vec3::new(0.0, 0.0, animation_offset))
}

/// Rotation and scale applied about an arbitrary origin:
/// `T(origin) * R * S * T(-origin)`.
#[must_use]
pub fn rotate_scale_about(rotation: Quat, scale: Vec3, origin: Vec3) -> Mat4 {
    Mat4::from_translation(origin)
        * Mat4::from_quat(rotation)
        * Mat4::from_scale(scale)
        * Mat4::from_translation(-origin)
}

/// Per-frame draw loop plus the startup IBL precompute.
pub struct Renderer {
    ctx: GpuContext,
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
    ibl: IblMaps,
    gpu_timer: GpuTimer,
    pub object_scale: f32,
}

impl Renderer {
    /// Runs the whole texture pipeline and compiles the mesh program. Any
    /// failure here aborts startup; the render loop never starts with
    /// incomplete state.
    pub fn new(ctx: GpuContext, scene: &Scene, panorama_image: &HdrImage) -> Result<Self> {
        let device = &ctx.device;
        let queue = &ctx.queue;

        let mut equirect = EquirectPass::new(device)?;
        let mipmaps = MipmapChain::new(device)?;
        let mut irradiance_pass = IrradiancePass::new(device)?;
        let prefilter_mips = ctx
            .prefilter_mip_count()
            .clamp(2, PREFILTER_SIZE.ilog2() + 1);
        let mut prefilter_pass = PrefilterPass::new(device, prefilter_mips)?;
        let mut brdf_pass = BrdfLutPass::new(device)?;

        let panorama = GpuTexture::from_panorama(device, queue, "panorama", panorama_image);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("ibl precompute"),
        });
        let environment_mips = ENVIRONMENT_SIZE.ilog2() + 1;
        let environment = equirect.run(
            device,
            queue,
            &mut encoder,
            &panorama,
            ENVIRONMENT_SIZE,
            environment_mips,
        )?;
        mipmaps.generate(device, &mut encoder, &environment)?;
        let irradiance =
            irradiance_pass.run(device, queue, &mut encoder, &environment, IRRADIANCE_SIZE)?;
        let prefilter =
            prefilter_pass.run(device, queue, &mut encoder, &environment, PREFILTER_SIZE)?;
        let brdf_lut = brdf_pass.run(device, &mut encoder, BRDF_LUT_SIZE)?;
        queue.submit(std::iter::once(encoder.finish()));
        log::info!(
            "IBL precompute encoded: {ENVIRONMENT_SIZE} env, {IRRADIANCE_SIZE} irradiance, \
             {PREFILTER_SIZE}x{prefilter_mips} prefilter, {BRDF_LUT_SIZE} brdf lut"
        );

        let mut program = ShaderProgram::new(
            device,
            &ShaderProgramDesc {
                label: "pbr",
                source: include_str!("shaders/pbr.wgsl"),
                defines: vec![ShaderDefine::float(
                    "MAX_MIP_LEVEL",
                    (prefilter_mips - 1) as f32,
                )],
                blocks: vec![
                    UniformBlockDesc {
                        name: "CameraBlock",
                        var: "camera",
                        binding: 0,
                        members: vec![
                            UniformMember::new("proj", UniformType::Mat4),
                            UniformMember::new("view", UniformType::Mat4),
                            UniformMember::new("view_vector", UniformType::Vec3),
                            UniformMember::new("camera_position", UniformType::Vec3),
                        ],
                        array_len: 1,
                    },
                    UniformBlockDesc {
                        name: "LightBlock",
                        var: "light",
                        binding: 1,
                        members: vec![UniformMember::new("light_direction", UniformType::Vec3)],
                        array_len: 1,
                    },
                    UniformBlockDesc {
                        name: "ObjectBlock",
                        var: "object",
                        binding: 2,
                        members: vec![
                            UniformMember::new("model", UniformType::Mat4),
                            UniformMember::new("diffuse_color", UniformType::Vec3),
                            UniformMember::new("roughness", UniformType::Float),
                            UniformMember::new("metallic", UniformType::Float),
                        ],
                        array_len: (scene.meshes.len() as u32).max(1),
                    },
                ],
                samplers: vec![
                    SamplerSlot {
                        name: "irradiance",
                        dimension: wgpu::TextureViewDimension::Cube,
                    },
                    SamplerSlot {
                        name: "prefilter",
                        dimension: wgpu::TextureViewDimension::Cube,
                    },
                    SamplerSlot {
                        name: "brdf_lut",
                        dimension: wgpu::TextureViewDimension::D2,
                    },
                ],
            },
        )?;
        let pipeline = program.render_pipeline(
            device,
            "pbr",
            &Geometry::vertex_layouts(),
            ctx.color_format(),
            Some(ctx.depth_format),
        );

        let light = program.block_mut("LightBlock").expect("LightBlock");
        light.set_vec3(0, "light_direction", LIGHT_DIRECTION);

        let gpu_timer = GpuTimer::new(device, queue, &[MESH_PASS]);

        let mut renderer = Self {
            ctx,
            program,
            pipeline,
            ibl: IblMaps {
                environment,
                irradiance,
                prefilter,
                brdf_lut,
            },
            gpu_timer,
            object_scale: 1.0,
        };
        renderer.update_camera(&scene.camera);
        Ok(renderer)
    }

    /// Writes the camera block. Call after anything moves the camera or
    /// changes the projection.
    pub fn update_camera(&mut self, camera: &Camera) {
        let block = self.program.block_mut("CameraBlock").expect("CameraBlock");
        block.set_mat4(0, "proj", camera.projection_matrix());
        block.set_mat4(0, "view", camera.view_matrix());
        block.set_vec3(0, "view_vector", camera.direction());
        block.set_vec3(0, "camera_position", camera.location);
    }

    /// Viewport resize: reconfigure the surface and the camera projection.
    pub fn resize(&mut self, camera: &mut Camera, width: u32, height: u32) {
        self.ctx.resize(width, height);
        camera.resize(width, height);
        self.update_camera(camera);
    }

    #[must_use]
    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    #[must_use]
    pub fn gpu_timer(&self) -> &GpuTimer {
        &self.gpu_timer
    }

    /// Draws one frame: read the timeline outputs, pack the per-mesh
    /// uniforms, then issue one draw per mesh inside a single depth-tested
    /// pass. Frame-wide bindings (camera, light, IBL samplers) are set once
    /// per frame, not per mesh.
    pub fn render(&mut self, scene: &Scene, actions: &ActionManager, cpu: &mut CpuTimer) {
        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => return,
            other => {
                log::error!("surface acquire failed: {other:?}");
                return;
            }
        };
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let intro_eased = actions
            .get(INTRO_ACTION)
            .and_then(Action::as_intro)
            .map_or(1.0, IntroAction::eased);
        let orbit_offset = actions
            .get(ORBIT_ACTION)
            .and_then(Action::as_orbit)
            .map_or(Vec2::ZERO, OrbitAction::offset);

        cpu.with("set-uniform", || {
            let object = self.program.block_mut("ObjectBlock").expect("ObjectBlock");
            for (index, mesh) in scene.meshes.iter().enumerate() {
                let animation_offset = mesh
                    .animation
                    .as_deref()
                    .and_then(|name| actions.get(name))
                    .and_then(Action::as_keyframe)
                    .map_or(0.0, KeyframeAction::value);
                let model = compose_model_matrix(
                    mesh.location,
                    mesh.rotation,
                    intro_eased,
                    orbit_offset,
                    animation_offset,
                    self.object_scale,
                );
                let slot = index as u32;
                object.set_mat4(slot, "model", model);
                object.set_vec3(slot, "diffuse_color", mesh.material.diffuse);
                object.set_f32(slot, "roughness", mesh.material.roughness);
                object.set_f32(slot, "metallic", mesh.material.metallic);
            }
            self.program.flush_blocks(&self.ctx.queue);
        });

        let (samplers, ()) = self.program.with(&self.ctx.device, |scope| {
            scope.bind("irradiance", &self.ibl.irradiance);
            scope.bind("prefilter", &self.ibl.prefilter);
            scope.bind("brdf_lut", &self.ibl.brdf_lut);
        });

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame"),
            });

        cpu.with("all-meshes-draw", || {
            let object_stride = self
                .program
                .block("ObjectBlock")
                .expect("ObjectBlock")
                .stride();
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(MESH_PASS),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.ctx.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: self.gpu_timer.pass_timestamps(MESH_PASS),
                occlusion_query_set: None,
                multiview_mask: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(1, &samplers, &[]);
            for (index, mesh) in scene.meshes.iter().enumerate() {
                rpass.set_bind_group(
                    0,
                    self.program.block_bind_group(),
                    &[index as u32 * object_stride],
                );
                mesh.geometry.draw(&mut rpass);
            }
        });

        self.gpu_timer.resolve(&mut encoder);
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.gpu_timer.poll(&self.ctx.device);
    }
}
