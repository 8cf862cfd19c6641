use crate::errors::Result;
use crate::renderer::passes::{IBL_FORMAT, color_pass};
use crate::renderer::shader::{SamplerSlot, ShaderProgram, ShaderProgramDesc};
use crate::renderer::texture::{GpuTexture, TextureKind};

/// Generates the mip pyramid of a render-target texture by blitting each
/// level from the one above it, layer by layer.
pub struct MipmapChain {
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
}

impl MipmapChain {
    pub fn new(device: &wgpu::Device) -> Result<Self> {
        let program = ShaderProgram::new(
            device,
            &ShaderProgramDesc {
                label: "mipmap-blit",
                source: concat!(
                    include_str!("../shaders/fullscreen.wgsl"),
                    "\n",
                    include_str!("../shaders/blit.wgsl"),
                ),
                defines: Vec::new(),
                blocks: Vec::new(),
                samplers: vec![SamplerSlot {
                    name: "source",
                    dimension: wgpu::TextureViewDimension::D2,
                }],
            },
        )?;
        let pipeline = program.render_pipeline(device, "mipmap-blit", &[], IBL_FORMAT, None);
        Ok(Self { program, pipeline })
    }

    pub fn generate(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        texture: &GpuTexture,
    ) -> Result<()> {
        if texture.mip_level_count() < 2 {
            return Ok(());
        }
        let layers = match texture.kind() {
            TextureKind::D2 => 1,
            TextureKind::Cube => 6,
        };

        for layer in 0..layers {
            for mip in 1..texture.mip_level_count() {
                let src = texture.sample_view(layer, mip - 1);
                let dst = texture.attachment_view(layer, mip)?;

                let (samplers, ()) = self.program.with(device, |scope| {
                    scope.bind_view("source", &src, texture.sampler());
                });

                let mut rpass = color_pass(encoder, "mip blit", &dst);
                rpass.set_pipeline(&self.pipeline);
                rpass.set_bind_group(0, self.program.block_bind_group(), &[]);
                rpass.set_bind_group(1, &samplers, &[]);
                rpass.draw(0..3, 0..1);
            }
        }
        Ok(())
    }
}
