use crate::errors::Result;
use crate::renderer::passes::{IBL_FORMAT, color_pass, face_block};
use crate::renderer::shader::{SamplerSlot, ShaderProgram, ShaderProgramDesc};
use crate::renderer::texture::GpuTexture;

/// Projects the decoded equirectangular panorama onto the six faces of the
/// environment cubemap.
pub struct EquirectPass {
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
}

impl EquirectPass {
    pub fn new(device: &wgpu::Device) -> Result<Self> {
        let program = ShaderProgram::new(
            device,
            &ShaderProgramDesc {
                label: "equirect-to-cube",
                source: concat!(
                    include_str!("../shaders/fullscreen.wgsl"),
                    "\n",
                    include_str!("../shaders/equirect_to_cube.wgsl"),
                ),
                defines: Vec::new(),
                blocks: vec![face_block(6)],
                samplers: vec![SamplerSlot {
                    name: "panorama",
                    dimension: wgpu::TextureViewDimension::D2,
                }],
            },
        )?;
        let pipeline = program.render_pipeline(device, "equirect-to-cube", &[], IBL_FORMAT, None);
        Ok(Self { program, pipeline })
    }

    /// Renders all six faces of a fresh cubemap (mip 0 only; the caller
    /// runs the mip chain afterward).
    pub fn run(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        panorama: &GpuTexture,
        size: u32,
        mip_level_count: u32,
    ) -> Result<GpuTexture> {
        let cube = GpuTexture::new_cube(
            device,
            "environment cubemap",
            size,
            IBL_FORMAT,
            mip_level_count,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );

        let block = self.program.block_mut("FaceBlock").expect("FaceBlock");
        for face in 0..6u32 {
            block.set_i32(face, "current_face", face as i32);
        }
        let stride = block.stride();
        self.program.flush_blocks(queue);

        let (samplers, ()) = self.program.with(device, |scope| {
            scope.bind("panorama", panorama);
        });

        for face in 0..6u32 {
            let view = cube.attachment_view(face, 0)?;
            let mut rpass = color_pass(encoder, "equirect face", &view);
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, self.program.block_bind_group(), &[face * stride]);
            rpass.set_bind_group(1, &samplers, &[]);
            rpass.draw(0..3, 0..1);
        }

        Ok(cube)
    }
}
