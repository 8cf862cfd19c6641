use bytemuck::Pod;
use wgpu::util::DeviceExt;

use crate::errors::{Result, VitrineError};

/// What a buffer is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
    Uniform,
}

/// One GPU memory allocation.
///
/// Vertex and index buffers derive their size from the first write and are
/// fixed afterward; uniform buffers take an explicit size at construction
/// and are updated in place, never resized. Nothing here is explicitly
/// freed — allocations live for the process lifetime.
#[derive(Debug)]
pub struct GpuBuffer {
    raw: wgpu::Buffer,
    kind: BufferKind,
    /// Element count for vertex/index buffers; 0 for uniform buffers.
    len: u32,
    size: u64,
}

impl GpuBuffer {
    /// Creates and fills a vertex buffer; `len` records the element count.
    pub fn vertex<T: Pod>(device: &wgpu::Device, label: Option<&str>, data: &[T]) -> Self {
        let contents = bytemuck::cast_slice(data);
        let raw = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label,
            contents,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            raw,
            kind: BufferKind::Vertex,
            len: data.len() as u32,
            size: contents.len() as u64,
        }
    }

    /// Creates and fills a `u16` index buffer. The backing allocation is
    /// padded to the 4-byte copy alignment; `len` stays the true index
    /// count.
    pub fn index(device: &wgpu::Device, label: Option<&str>, indices: &[u16]) -> Self {
        let mut contents = bytemuck::cast_slice::<u16, u8>(indices).to_vec();
        while contents.len() % wgpu::COPY_BUFFER_ALIGNMENT as usize != 0 {
            contents.push(0);
        }
        let size = contents.len() as u64;
        let raw = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label,
            contents: &contents,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            raw,
            kind: BufferKind::Index,
            len: indices.len() as u32,
            size,
        }
    }

    /// Creates a uniform buffer of a fixed byte size. Unlike vertex/index
    /// buffers there is no first write to derive a size from, so a missing
    /// size is a hard error.
    pub fn uniform(device: &wgpu::Device, label: Option<&str>, size: u64) -> Result<Self> {
        if size == 0 {
            return Err(VitrineError::ResourceCreation(format!(
                "uniform buffer {label:?} requires an explicit non-zero size"
            )));
        }
        let raw = device.create_buffer(&wgpu::BufferDescriptor {
            label,
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Ok(Self {
            raw,
            kind: BufferKind::Uniform,
            len: 0,
            size,
        })
    }

    /// In-place update starting at `offset` bytes. The write must stay
    /// inside the allocation; the buffer never grows.
    pub fn write<T: Pod>(&self, queue: &wgpu::Queue, offset: u64, data: &[T]) {
        let bytes = bytemuck::cast_slice(data);
        debug_assert!(
            offset + bytes.len() as u64 <= self.size,
            "write of {} bytes at {offset} overflows buffer of {} bytes",
            bytes.len(),
            self.size
        );
        queue.write_buffer(&self.raw, offset, bytes);
    }

    #[must_use]
    pub fn raw(&self) -> &wgpu::Buffer {
        &self.raw
    }

    #[must_use]
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    /// Element count recorded by the filling constructor.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocation size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }
}
