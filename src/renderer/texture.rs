use crate::assets::HdrImage;
use crate::errors::{Result, VitrineError};

/// Texture variant: a plain 2D image or a six-face cubemap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    D2,
    Cube,
}

/// One GPU texture plus the default sampling view and sampler for it.
///
/// Cubemap textures expose each (face, mip) pair as an independent render
/// attachment through [`GpuTexture::attachment_view`]; the bounds/usage
/// validation there is the completeness check every offscreen pass runs
/// before drawing.
#[derive(Debug)]
pub struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    kind: TextureKind,
    width: u32,
    height: u32,
    mip_level_count: u32,
}

impl GpuTexture {
    /// Creates a 2D texture. `usage` must include everything later passes
    /// need; nothing is added implicitly.
    #[must_use]
    pub fn new_2d(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        mip_level_count: u32,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Self::clamped_sampler(device, label);
        Self {
            texture,
            view,
            sampler,
            kind: TextureKind::D2,
            width,
            height,
            mip_level_count,
        }
    }

    /// Creates a cubemap (a 6-layer 2D texture viewed as a cube).
    #[must_use]
    pub fn new_cube(
        device: &wgpu::Device,
        label: &str,
        size: u32,
        format: wgpu::TextureFormat,
        mip_level_count: u32,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 6,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = Self::clamped_sampler(device, label);
        Self {
            texture,
            view,
            sampler,
            kind: TextureKind::Cube,
            width: size,
            height: size,
            mip_level_count,
        }
    }

    /// Uploads a decoded equirectangular panorama as an RGBA8 2D texture.
    #[must_use]
    pub fn from_panorama(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &HdrImage,
    ) -> Self {
        let texture = Self::new_2d(
            device,
            label,
            image.width,
            image.height,
            wgpu::TextureFormat::Rgba8Unorm,
            1,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * 4),
                rows_per_image: Some(image.height),
            },
            wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
        );
        texture
    }

    fn clamped_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        })
    }

    /// A render-attachment view of one face and mip level.
    ///
    /// Fails fast with [`VitrineError::ResourceCreation`] when the requested
    /// attachment cannot be complete: face or mip out of range, or a texture
    /// that was not created as a render target.
    pub fn attachment_view(&self, face: u32, mip: u32) -> Result<wgpu::TextureView> {
        let layers = match self.kind {
            TextureKind::D2 => 1,
            TextureKind::Cube => 6,
        };
        if face >= layers || mip >= self.mip_level_count {
            return Err(VitrineError::ResourceCreation(format!(
                "attachment face {face} mip {mip} out of range ({layers} layers, {} mips)",
                self.mip_level_count
            )));
        }
        if !self.texture.usage().contains(wgpu::TextureUsages::RENDER_ATTACHMENT) {
            return Err(VitrineError::ResourceCreation(
                "texture was not created with render-attachment usage".into(),
            ));
        }
        Ok(self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("attachment"),
            format: None,
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::All,
            base_mip_level: mip,
            mip_level_count: Some(1),
            base_array_layer: face,
            array_layer_count: Some(1),
            usage: Some(wgpu::TextureUsages::RENDER_ATTACHMENT),
        }))
    }

    /// A single-face, single-mip sampling view (used by the mip blit chain).
    #[must_use]
    pub fn sample_view(&self, face: u32, mip: u32) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("sample"),
            format: None,
            dimension: Some(wgpu::TextureViewDimension::D2),
            aspect: wgpu::TextureAspect::All,
            base_mip_level: mip,
            mip_level_count: Some(1),
            base_array_layer: face,
            array_layer_count: Some(1),
            usage: Some(wgpu::TextureUsages::TEXTURE_BINDING),
        })
    }

    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[must_use]
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    #[must_use]
    pub fn raw(&self) -> &wgpu::Texture {
        &self.texture
    }

    #[must_use]
    pub fn kind(&self) -> TextureKind {
        self.kind
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn mip_level_count(&self) -> u32 {
        self.mip_level_count
    }

    /// Edge length of `mip`, never below 1.
    #[must_use]
    pub fn mip_size(&self, mip: u32) -> u32 {
        (self.width >> mip).max(1)
    }
}
