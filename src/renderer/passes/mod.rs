//! Offscreen pipeline passes.
//!
//! Each pass owns its shader program and pipeline; `run` encodes the
//! full-screen triangle draws that fill the target texture. The passes
//! execute strictly ordered, once per environment load: equirect
//! projection → mip chain → irradiance convolution → specular prefilter →
//! BRDF LUT.

pub mod brdf_lut;
pub mod equirect;
pub mod irradiance;
pub mod mipmap;
pub mod prefilter;

pub use brdf_lut::BrdfLutPass;
pub use equirect::EquirectPass;
pub use irradiance::IrradiancePass;
pub use mipmap::MipmapChain;
pub use prefilter::PrefilterPass;

use crate::renderer::shader::{UniformBlockDesc, UniformMember, UniformType};

/// Color format shared by every IBL cubemap.
pub const IBL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// The per-face uniform block used by the cubemap passes, with one
/// dynamically-offset slot per draw.
pub(crate) fn face_block(slots: u32) -> UniformBlockDesc {
    UniformBlockDesc {
        name: "FaceBlock",
        var: "face",
        binding: 0,
        members: vec![UniformMember::new("current_face", UniformType::Int)],
        array_len: slots,
    }
}

/// Boilerplate for a one-attachment offscreen pass.
pub(crate) fn color_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}
