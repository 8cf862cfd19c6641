//! Shader program abstraction.
//!
//! A [`ShaderProgram`] is built from a WGSL body plus three generated
//! prologue sections, in order: constant defines, uniform-block
//! declarations (group 0), and texture/sampler declarations (group 1).
//! Each uniform block owns a dedicated [`GpuBuffer`] and a member-name →
//! byte-offset table computed once at construction; sampler units are
//! allocated scope-locally in binding order so unit numbering is
//! deterministic regardless of call order across frames.

use std::num::NonZeroU64;

use rustc_hash::FxHashMap;

use crate::errors::{Result, VitrineError};
use crate::renderer::buffer::GpuBuffer;
use crate::renderer::texture::GpuTexture;

// ============================================================================
// Uniform member layout
// ============================================================================

/// Scalar/vector/matrix types a uniform-block member can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Float,
    Int,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformType {
    #[must_use]
    pub fn wgsl_name(self) -> &'static str {
        match self {
            UniformType::Float => "f32",
            UniformType::Int => "i32",
            UniformType::Vec2 => "vec2<f32>",
            UniformType::Vec3 => "vec3<f32>",
            UniformType::Vec4 => "vec4<f32>",
            UniformType::Mat4 => "mat4x4<f32>",
        }
    }

    #[must_use]
    pub fn align(self) -> u32 {
        match self {
            UniformType::Float | UniformType::Int => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec3 | UniformType::Vec4 | UniformType::Mat4 => 16,
        }
    }

    #[must_use]
    pub fn size(self) -> u32 {
        match self {
            UniformType::Float | UniformType::Int => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec3 => 12,
            UniformType::Vec4 => 16,
            UniformType::Mat4 => 64,
        }
    }
}

/// One named member of a uniform block.
#[derive(Debug, Clone, Copy)]
pub struct UniformMember {
    pub name: &'static str,
    pub ty: UniformType,
}

impl UniformMember {
    #[must_use]
    pub const fn new(name: &'static str, ty: UniformType) -> Self {
        Self { name, ty }
    }
}

const fn round_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

/// Byte offsets of every member of a uniform block, laid out by the WGSL
/// uniform address-space rules. Computed once; locations never change after
/// the program links.
#[derive(Debug)]
pub struct UniformLayout {
    offsets: FxHashMap<&'static str, (UniformType, u32)>,
    size: u32,
}

impl UniformLayout {
    #[must_use]
    pub fn new(members: &[UniformMember]) -> Self {
        let mut offsets = FxHashMap::default();
        let mut cursor = 0u32;
        let mut max_align = 16u32;
        for member in members {
            let offset = round_up(cursor, member.ty.align());
            offsets.insert(member.name, (member.ty, offset));
            cursor = offset + member.ty.size();
            max_align = max_align.max(member.ty.align());
        }
        Self {
            offsets,
            size: round_up(cursor, max_align),
        }
    }

    #[must_use]
    pub fn offset_of(&self, name: &str) -> Option<u32> {
        self.offsets.get(name).map(|&(_, offset)| offset)
    }

    #[must_use]
    pub fn type_of(&self, name: &str) -> Option<UniformType> {
        self.offsets.get(name).map(|&(ty, _)| ty)
    }

    /// Struct size, padded to the block alignment.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }
}

// ============================================================================
// Program description
// ============================================================================

/// A generated `const` line in the shader prologue.
#[derive(Debug, Clone)]
pub struct ShaderDefine {
    pub name: String,
    pub ty: &'static str,
    pub value: String,
}

impl ShaderDefine {
    #[must_use]
    pub fn float(name: &str, value: f32) -> Self {
        Self {
            name: name.to_string(),
            ty: "f32",
            value: format!("{value:?}"),
        }
    }

    #[must_use]
    pub fn uint(name: &str, value: u32) -> Self {
        Self {
            name: name.to_string(),
            ty: "u32",
            value: format!("{value}u"),
        }
    }
}

/// Declaration of one uniform block: struct name, variable name, binding
/// index inside group 0, members, and how many dynamically-offset slots the
/// backing buffer holds (1 = a plain block).
#[derive(Debug, Clone)]
pub struct UniformBlockDesc {
    pub name: &'static str,
    pub var: &'static str,
    pub binding: u32,
    pub members: Vec<UniformMember>,
    pub array_len: u32,
}

/// Declaration of one sampler slot in group 1. Slots are bound in order;
/// the unit index a texture receives equals the slot's position.
#[derive(Debug, Clone, Copy)]
pub struct SamplerSlot {
    pub name: &'static str,
    pub dimension: wgpu::TextureViewDimension,
}

/// Everything needed to build a [`ShaderProgram`].
pub struct ShaderProgramDesc<'a> {
    pub label: &'a str,
    /// WGSL body with `vs_main`/`fs_main` entry points.
    pub source: &'a str,
    pub defines: Vec<ShaderDefine>,
    pub blocks: Vec<UniformBlockDesc>,
    pub samplers: Vec<SamplerSlot>,
}

/// Composes the final WGSL: math constants, defines, uniform blocks,
/// sampler declarations, then the body — in that order.
#[must_use]
pub fn compose_source(desc: &ShaderProgramDesc<'_>) -> String {
    let mut out = String::new();

    out.push_str("const MATH_PI: f32 = 3.1415926535897931;\n");
    out.push_str("const MATH_INV_PI: f32 = 1.0 / MATH_PI;\n");
    for define in &desc.defines {
        out.push_str(&format!(
            "const {}: {} = {};\n",
            define.name, define.ty, define.value
        ));
    }
    out.push('\n');

    for block in &desc.blocks {
        out.push_str(&format!("struct {} {{\n", block.name));
        for member in &block.members {
            out.push_str(&format!("    {}: {},\n", member.name, member.ty.wgsl_name()));
        }
        out.push_str("}\n");
        out.push_str(&format!(
            "@group(0) @binding({}) var<uniform> {}: {};\n\n",
            block.binding, block.var, block.name
        ));
    }

    for (unit, slot) in desc.samplers.iter().enumerate() {
        let texture_ty = match slot.dimension {
            wgpu::TextureViewDimension::Cube => "texture_cube<f32>",
            _ => "texture_2d<f32>",
        };
        out.push_str(&format!(
            "@group(1) @binding({}) var t_{}: {};\n",
            unit * 2,
            slot.name,
            texture_ty
        ));
        out.push_str(&format!(
            "@group(1) @binding({}) var s_{}: sampler;\n",
            unit * 2 + 1,
            slot.name
        ));
    }
    out.push('\n');

    out.push_str(desc.source);
    out
}

// ============================================================================
// Uniform blocks at runtime
// ============================================================================

/// A linked uniform block: the offset table, the backing buffer, and a CPU
/// shadow the member setters write into until [`UniformBlock::flush`]
/// uploads it.
pub struct UniformBlock {
    layout: UniformLayout,
    buffer: GpuBuffer,
    shadow: Vec<u8>,
    stride: u32,
    array_len: u32,
    dirty: bool,
}

impl UniformBlock {
    fn new(device: &wgpu::Device, label: &str, desc: &UniformBlockDesc, min_align: u32) -> Result<Self> {
        let layout = UniformLayout::new(&desc.members);
        let stride = if desc.array_len > 1 {
            round_up(layout.size(), min_align)
        } else {
            layout.size()
        };
        let total = u64::from(stride) * u64::from(desc.array_len);
        let buffer = GpuBuffer::uniform(device, Some(label), total)?;
        Ok(Self {
            layout,
            shadow: vec![0; total as usize],
            buffer,
            stride,
            array_len: desc.array_len,
            dirty: false,
        })
    }

    /// Byte stride between dynamically-offset slots.
    #[must_use]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    #[must_use]
    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    fn write_member(&mut self, index: u32, name: &str, expected: UniformType, bytes: &[u8]) {
        debug_assert!(index < self.array_len, "block slot {index} out of range");
        let Some(offset) = self.layout.offset_of(name) else {
            debug_assert!(false, "unknown uniform member {name:?}");
            log::error!("write to unknown uniform member {name:?} skipped");
            return;
        };
        debug_assert_eq!(self.layout.type_of(name), Some(expected), "type mismatch for {name:?}");
        let start = (index * self.stride + offset) as usize;
        self.shadow[start..start + bytes.len()].copy_from_slice(bytes);
        self.dirty = true;
    }

    pub fn set_f32(&mut self, index: u32, name: &str, value: f32) {
        self.write_member(index, name, UniformType::Float, &value.to_le_bytes());
    }

    pub fn set_i32(&mut self, index: u32, name: &str, value: i32) {
        self.write_member(index, name, UniformType::Int, &value.to_le_bytes());
    }

    pub fn set_vec2(&mut self, index: u32, name: &str, value: glam::Vec2) {
        self.write_member(index, name, UniformType::Vec2, bytemuck::bytes_of(&value));
    }

    pub fn set_vec3(&mut self, index: u32, name: &str, value: glam::Vec3) {
        self.write_member(index, name, UniformType::Vec3, bytemuck::bytes_of(&value));
    }

    pub fn set_vec4(&mut self, index: u32, name: &str, value: glam::Vec4) {
        self.write_member(index, name, UniformType::Vec4, bytemuck::bytes_of(&value));
    }

    pub fn set_mat4(&mut self, index: u32, name: &str, value: glam::Mat4) {
        self.write_member(index, name, UniformType::Mat4, bytemuck::bytes_of(&value));
    }

    /// Uploads the shadow if any member changed since the last flush.
    pub fn flush(&mut self, queue: &wgpu::Queue) {
        if self.dirty {
            self.buffer.write(queue, 0, &self.shadow);
            self.dirty = false;
        }
    }
}

// ============================================================================
// Sampler allocation
// ============================================================================

/// Hands out texture units 0, 1, 2, … in allocation order. Reset at the
/// start of every `with` scope so numbering is scope-local.
#[derive(Debug, Default)]
pub struct SamplerAllocator {
    next: u32,
}

impl SamplerAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> u32 {
        let unit = self.next;
        self.next += 1;
        unit
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }

    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.next
    }
}

/// Scope handed to the closure passed to [`ShaderProgram::with`]. Collects
/// texture bindings in call order; the unit returned by `bind` is the slot
/// the texture will occupy in the pass's sampler bind group.
pub struct SamplerScope<'a> {
    slots: &'a [SamplerSlot],
    allocator: SamplerAllocator,
    bound: Vec<(&'a wgpu::TextureView, &'a wgpu::Sampler)>,
}

impl<'a> SamplerScope<'a> {
    /// Binds `texture` to the next free unit. The slot name must match the
    /// program's declaration order.
    pub fn bind(&mut self, name: &str, texture: &'a GpuTexture) -> u32 {
        self.bind_view(name, texture.view(), texture.sampler())
    }

    /// Variant taking a raw view, for passes that sample a specific
    /// face/mip rather than the texture's default view.
    pub fn bind_view(
        &mut self,
        name: &str,
        view: &'a wgpu::TextureView,
        sampler: &'a wgpu::Sampler,
    ) -> u32 {
        let unit = self.allocator.allocate();
        debug_assert!(
            self.slots.get(unit as usize).is_some_and(|s| s.name == name),
            "sampler {name:?} bound out of declaration order (unit {unit})"
        );
        self.bound.push((view, sampler));
        unit
    }
}

// ============================================================================
// ShaderProgram
// ============================================================================

/// A compiled shader module plus its uniform blocks and sampler layout.
pub struct ShaderProgram {
    label: String,
    module: wgpu::ShaderModule,
    block_layout: wgpu::BindGroupLayout,
    sampler_layout: wgpu::BindGroupLayout,
    block_bind_group: wgpu::BindGroup,
    blocks: Vec<(&'static str, UniformBlock)>,
    samplers: Vec<SamplerSlot>,
}

impl ShaderProgram {
    /// Compiles the composed source and builds the block buffers and bind
    /// group layouts. Validation failures come back as
    /// [`VitrineError::Compile`] instead of an unusable program.
    pub fn new(device: &wgpu::Device, desc: &ShaderProgramDesc<'_>) -> Result<Self> {
        let source = compose_source(desc);

        let error_scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(error) = pollster::block_on(error_scope.pop()) {
            return Err(VitrineError::Compile {
                stage: desc.label.to_string(),
                log: error.to_string(),
            });
        }

        let mut blocks = Vec::with_capacity(desc.blocks.len());
        let mut block_entries = Vec::with_capacity(desc.blocks.len());
        let min_align = device.limits().min_uniform_buffer_offset_alignment;
        for block_desc in &desc.blocks {
            let block = UniformBlock::new(
                device,
                &format!("{}.{}", desc.label, block_desc.name),
                block_desc,
                min_align,
            )?;
            block_entries.push(wgpu::BindGroupLayoutEntry {
                binding: block_desc.binding,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: block_desc.array_len > 1,
                    min_binding_size: NonZeroU64::new(u64::from(block.layout.size())),
                },
                count: None,
            });
            blocks.push((block_desc.name, block));
        }

        let block_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} blocks", desc.label)),
            entries: &block_entries,
        });

        let bind_entries: Vec<wgpu::BindGroupEntry<'_>> = desc
            .blocks
            .iter()
            .zip(&blocks)
            .map(|(block_desc, (_, block))| wgpu::BindGroupEntry {
                binding: block_desc.binding,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: block.buffer.raw(),
                    offset: 0,
                    size: NonZeroU64::new(u64::from(block.layout.size())),
                }),
            })
            .collect();
        let block_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} blocks", desc.label)),
            layout: &block_layout,
            entries: &bind_entries,
        });

        let mut sampler_entries = Vec::with_capacity(desc.samplers.len() * 2);
        for (unit, slot) in desc.samplers.iter().enumerate() {
            sampler_entries.push(wgpu::BindGroupLayoutEntry {
                binding: (unit * 2) as u32,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: slot.dimension,
                    multisampled: false,
                },
                count: None,
            });
            sampler_entries.push(wgpu::BindGroupLayoutEntry {
                binding: (unit * 2 + 1) as u32,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }
        let sampler_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} samplers", desc.label)),
            entries: &sampler_entries,
        });

        Ok(Self {
            label: desc.label.to_string(),
            module,
            block_layout,
            sampler_layout,
            block_bind_group,
            blocks,
            samplers: desc.samplers.clone(),
        })
    }

    /// Establishes a sampler-binding scope: the counter starts at 0 on
    /// entry, units are handed out in bind order, and the scope ends when
    /// the closure returns, yielding the bind group for the draw.
    pub fn with<'a, R>(
        &'a self,
        device: &wgpu::Device,
        f: impl FnOnce(&mut SamplerScope<'a>) -> R,
    ) -> (wgpu::BindGroup, R) {
        let mut scope = SamplerScope {
            slots: &self.samplers,
            allocator: SamplerAllocator::new(),
            bound: Vec::with_capacity(self.samplers.len()),
        };
        let result = f(&mut scope);
        debug_assert_eq!(
            scope.allocator.allocated() as usize,
            self.samplers.len(),
            "{}: every declared sampler slot must be bound",
            self.label
        );

        let mut entries = Vec::with_capacity(scope.bound.len() * 2);
        for (unit, (view, sampler)) in scope.bound.iter().copied().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: (unit * 2) as u32,
                resource: wgpu::BindingResource::TextureView(view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: (unit * 2 + 1) as u32,
                resource: wgpu::BindingResource::Sampler(sampler),
            });
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} samplers", self.label)),
            layout: &self.sampler_layout,
            entries: &entries,
        });
        (bind_group, result)
    }

    #[must_use]
    pub fn block(&self, name: &str) -> Option<&UniformBlock> {
        self.blocks.iter().find(|(n, _)| *n == name).map(|(_, b)| b)
    }

    pub fn block_mut(&mut self, name: &str) -> Option<&mut UniformBlock> {
        self.blocks
            .iter_mut()
            .find(|(n, _)| *n == name)
            .map(|(_, b)| b)
    }

    /// Uploads every dirty block shadow.
    pub fn flush_blocks(&mut self, queue: &wgpu::Queue) {
        for (_, block) in &mut self.blocks {
            block.flush(queue);
        }
    }

    #[must_use]
    pub fn block_bind_group(&self) -> &wgpu::BindGroup {
        &self.block_bind_group
    }

    /// Builds a render pipeline over this program's bind group layouts.
    #[must_use]
    pub fn render_pipeline(
        &self,
        device: &wgpu::Device,
        label: &str,
        vertex_layouts: &[wgpu::VertexBufferLayout<'_>],
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[Some(&self.block_layout), Some(&self.sampler_layout)],
            immediate_size: 0,
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &self.module,
                entry_point: Some("vs_main"),
                buffers: vertex_layouts,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::LessEqual),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}
