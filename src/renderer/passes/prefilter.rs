use crate::errors::Result;
use crate::renderer::passes::{IBL_FORMAT, color_pass};
use crate::renderer::shader::{
    SamplerSlot, ShaderProgram, ShaderProgramDesc, UniformBlockDesc, UniformMember, UniformType,
};
use crate::renderer::texture::GpuTexture;

/// GGX importance-sampled specular prefilter: one roughness level per mip,
/// `roughness = mip / (mip_count - 1)`.
pub struct PrefilterPass {
    program: ShaderProgram,
    pipeline: wgpu::RenderPipeline,
    mip_count: u32,
}

impl PrefilterPass {
    /// `mip_count` fixes the roughness chain length (and the uniform slot
    /// count), derived by the caller from device capability.
    pub fn new(device: &wgpu::Device, mip_count: u32) -> Result<Self> {
        let program = ShaderProgram::new(
            device,
            &ShaderProgramDesc {
                label: "prefilter",
                source: concat!(
                    include_str!("../shaders/fullscreen.wgsl"),
                    "\n",
                    include_str!("../shaders/prefilter.wgsl"),
                ),
                defines: Vec::new(),
                blocks: vec![UniformBlockDesc {
                    name: "PrefilterParams",
                    var: "params",
                    binding: 0,
                    members: vec![
                        UniformMember::new("current_face", UniformType::Int),
                        UniformMember::new("roughness", UniformType::Float),
                        UniformMember::new("resolution", UniformType::Float),
                    ],
                    array_len: mip_count * 6,
                }],
                samplers: vec![SamplerSlot {
                    name: "hdri",
                    dimension: wgpu::TextureViewDimension::Cube,
                }],
            },
        )?;
        let pipeline = program.render_pipeline(device, "prefilter", &[], IBL_FORMAT, None);
        Ok(Self {
            program,
            pipeline,
            mip_count,
        })
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
            "prefilter cubemap",
            size,
            IBL_FORMAT,
            self.mip_count,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );

        let roughness_steps = (self.mip_count - 1).max(1);
        let block = self.program.block_mut("PrefilterParams").expect("PrefilterParams");
        for mip in 0..self.mip_count {
            for face in 0..6u32 {
                let slot = mip * 6 + face;
                block.set_i32(slot, "current_face", face as i32);
                block.set_f32(slot, "roughness", mip as f32 / roughness_steps as f32);
                block.set_f32(slot, "resolution", size as f32);
            }
        }
        let stride = block.stride();
        self.program.flush_blocks(queue);

        let (samplers, ()) = self.program.with(device, |scope| {
            scope.bind("hdri", environment);
        });

        for mip in 0..self.mip_count {
            for face in 0..6u32 {
                let view = cube.attachment_view(face, mip)?;
                let mut rpass = color_pass(encoder, "prefilter face", &view);
                rpass.set_pipeline(&self.pipeline);
                let slot = mip * 6 + face;
                rpass.set_bind_group(0, self.program.block_bind_group(), &[slot * stride]);
                rpass.set_bind_group(1, &samplers, &[]);
                rpass.draw(0..3, 0..1);
            }
        }

        Ok(cube)
    }
}
