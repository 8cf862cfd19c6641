//! wgpu Context
//!
//! The [`GpuContext`] is the capability-abstracted device handle every
//! resource constructor receives explicitly: device, queue, surface,
//! surface configuration, and the capability limits the IBL pipeline
//! derives its mip counts from. There is no global context.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::errors::{Result, VitrineError};

/// Core wgpu context holding GPU handles.
///
/// Also owns the depth buffer, which is recreated on resize.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,

    /// Depth buffer format used by the mesh pass.
    pub depth_format: wgpu::TextureFormat,
    /// Depth buffer view (recreated on resize).
    pub depth_texture_view: wgpu::TextureView,
    /// Clear color for the frame.
    pub clear_color: wgpu::Color,

    /// Device limit the prefilter mip chain is derived from.
    pub max_texture_size: u32,
}

impl GpuContext {
    pub async fn new<W>(window: W, width: u32, height: u32) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(|e| VitrineError::AdapterRequestFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| VitrineError::AdapterRequestFailed(e.to_string()))?;

        // Timestamp queries are optional: when the adapter lacks them the
        // GPU timer degrades to a no-op instead of failing device creation.
        let required_features =
            adapter.features() & wgpu::Features::TIMESTAMP_QUERY;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let mut config = surface
            .get_default_config(&adapter, width, height)
            .ok_or_else(|| {
                VitrineError::AdapterRequestFailed("Surface not supported by adapter".to_string())
            })?;
        config.present_mode = wgpu::PresentMode::AutoVsync;
        surface.configure(&device, &config);

        let depth_format = wgpu::TextureFormat::Depth32Float;
        let depth_texture_view = Self::create_depth_texture(&device, &config, depth_format);
        let max_texture_size = device.limits().max_texture_dimension_2d;

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_format,
            depth_texture_view,
            clear_color: wgpu::Color::TRANSPARENT,
            max_texture_size,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture_view =
                Self::create_depth_texture(&self.device, &self.config, self.depth_format);
        }
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        format: wgpu::TextureFormat,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Returns the surface color format.
    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the depth texture view (recreated on resize).
    #[inline]
    #[must_use]
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_texture_view
    }

    /// Returns the current surface dimensions.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Full mip pyramid depth the device can address.
    #[must_use]
    pub fn max_mip_level(&self) -> u32 {
        (self.max_texture_size as f32).log2().floor() as u32
    }

    /// Mip count of the specular prefilter chain, derived from capability.
    #[must_use]
    pub fn prefilter_mip_count(&self) -> u32 {
        ((self.max_mip_level() as f32) * 0.5).floor() as u32
    }
}
