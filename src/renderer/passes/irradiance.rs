use crate::errors::Result;
use crate::renderer::passes::{IBL_FORMAT, color_pass, face_block};
use crate::renderer::shader::{SamplerSlot, ShaderProgram, ShaderProgramDesc};
use crate::renderer::texture::GpuTexture;

/// Convolves the environment cubemap into a small diffuse-irradiance
/// cubemap.
pub struct IrradiancePass {
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
}

impl IrradiancePass {
    pub fn new(device: &wgpu::Device) -> Result<Self> {
        let program = ShaderProgram::new(
            device,
            &ShaderProgramDesc {
                label: "irradiance",
                source: concat!(
                    include_str!("../shaders/fullscreen.wgsl"),
                    "\n",
                    include_str!("../shaders/irradiance.wgsl"),
                ),
                defines: Vec::new(),
                blocks: vec![face_block(6)],
                samplers: vec![SamplerSlot {
                    name: "hdri",
                    dimension: wgpu::TextureViewDimension::Cube,
                }],
            },
        )?;
        let pipeline = program.render_pipeline(device, "irradiance", &[], IBL_FORMAT, None);
        Ok(Self { program, pipeline })
    }

    pub fn run(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        environment: &GpuTexture,
        size: u32,
    ) -> Result<GpuTexture> {
        let cube = GpuTexture::new_cube(
            device,
            "irradiance cubemap",
            size,
            IBL_FORMAT,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );

        let block = self.program.block_mut("FaceBlock").expect("FaceBlock");
        for face in 0..6u32 {
            block.set_i32(face, "current_face", face as i32);
        }
        let stride = block.stride();
        self.program.flush_blocks(queue);

        let (samplers, ()) = self.program.with(device, |scope| {
            scope.bind("hdri", environment);
        });

        for face in 0..6u32 {
            let view = cube.attachment_view(face, 0)?;
            let mut rpass = color_pass(encoder, "irradiance face", &view);
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, self.program.block_bind_group(), &[face * stride]);
            rpass.set_bind_group(1, &samplers, &[]);
            rpass.draw(0..3, 0..1);
        }

        Ok(cube)
    }
}
