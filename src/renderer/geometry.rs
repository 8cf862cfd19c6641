use crate::assets::MeshRecord;
use crate::errors::{Result, VitrineError};
use crate::renderer::buffer::GpuBuffer;

/// An ordered set of vertex buffers plus an optional index buffer.
///
/// The attribute binding slot of each buffer equals its position in the
/// list; `draw_count` comes from the index buffer when present, otherwise
/// from the first vertex buffer.
pub struct Geometry {
    vertex_buffers: Vec<GpuBuffer>,
    index_buffer: Option<GpuBuffer>,
    draw_count: u32,
}

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

impl Geometry {
    /// Uploads a mesh record: positions in slot 0, normals in slot 1, and
    /// the `u16` index list when non-empty.
    pub fn from_record(device: &wgpu::Device, label: &str, record: &MeshRecord) -> Result<Self> {
        if record.vertices.len() % 3 != 0 {
            return Err(VitrineError::AssetDecode(format!(
                "{label}: vertex array length {} is not a multiple of 3",
                record.vertices.len()
            )));
        }
        if record.normals.len() != record.vertices.len() {
            return Err(VitrineError::AssetDecode(format!(
                "{label}: normal count {} does not match vertex count {}",
                record.normals.len() / 3,
                record.vertices.len() / 3
            )));
        }

        let positions = GpuBuffer::vertex(device, Some(label), &record.vertices);
        let normals = GpuBuffer::vertex(device, Some(label), &record.normals);

        let vertex_count = positions.len() / 3;
        let (index_buffer, draw_count) = if record.indices.is_empty() {
            (None, vertex_count)
        } else {
            let indices = GpuBuffer::index(device, Some(label), &record.indices);
            let count = indices.len();
            (Some(indices), count)
        };

        Ok(Self {
            vertex_buffers: vec![positions, normals],
            index_buffer,
            draw_count,
        })
    }

    /// Vertex buffer layouts matching the slot order above.
    #[must_use]
    pub fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
        [
            wgpu::VertexBufferLayout {
                array_stride: 12,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &POSITION_ATTRIBUTES,
            },
            wgpu::VertexBufferLayout {
                array_stride: 12,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &NORMAL_ATTRIBUTES,
            },
        ]
    }

    #[must_use]
    pub fn draw_count(&self) -> u32 {
        self.draw_count
    }

    /// Binds every buffer at its slot and issues the draw.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        for (slot, buffer) in self.vertex_buffers.iter().enumerate() {
            rpass.set_vertex_buffer(slot as u32, buffer.raw().slice(..));
        }
        if let Some(indices) = &self.index_buffer {
            rpass.set_index_buffer(indices.raw().slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..self.draw_count, 0, 0..1);
        } else {
            rpass.draw(0..self.draw_count, 0..1);
        }
    }
}
