use crate::errors::Result;
use crate::renderer::passes::color_pass;
use crate::renderer::shader::{ShaderProgram, ShaderProgramDesc};
use crate::renderer::texture::GpuTexture;

/// Precomputes the split-sum BRDF integration table. Material independent,
/// computed once and shared across all draws.
pub struct BrdfLutPass {
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
}

const LUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg16Float;

impl BrdfLutPass {
    pub fn new(device: &wgpu::Device) -> Result<Self> {
        let program = ShaderProgram::new(
            device,
            &ShaderProgramDesc {
                label: "brdf-lut",
                source: concat!(
                    include_str!("../shaders/fullscreen.wgsl"),
                    "\n",
                    include_str!("../shaders/brdf_lut.wgsl"),
                ),
                defines: Vec::new(),
                blocks: Vec::new(),
                samplers: Vec::new(),
            },
        )?;
        let pipeline = program.render_pipeline(device, "brdf-lut", &[], LUT_FORMAT, None);
        Ok(Self { program, pipeline })
    }

    pub fn run(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        size: u32,
    ) -> Result<GpuTexture> {
        let lut = GpuTexture::new_2d(
            device,
            "brdf lut",
            size,
            size,
            LUT_FORMAT,
            1,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );

        let (samplers, ()) = self.program.with(device, |_scope| {});

        let view = lut.attachment_view(0, 0)?;
        let mut rpass = color_pass(encoder, "brdf lut", &view);
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, self.program.block_bind_group(), &[]);
        rpass.set_bind_group(1, &samplers, &[]);
        rpass.draw(0..3, 0..1);

        Ok(lut)
    }
}
