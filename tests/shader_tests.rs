//! Shader Composition Tests
//!
//! Tests for:
//! - WGSL uniform-layout offsets (the member offset table)
//! - Source composition order (defines → blocks → samplers → body)
//! - Scope-local sampler unit allocation

use vitrine::renderer::shader::{
    SamplerAllocator, SamplerSlot, ShaderDefine, ShaderProgramDesc, UniformLayout, UniformMember,
    UniformType, compose_source,
};

fn member(name: &'static str, ty: UniformType) -> UniformMember {
    UniformMember::new(name, ty)
}

// ============================================================================
// Uniform layout
// ============================================================================

#[test]
fn camera_block_layout_matches_wgsl_rules() {
    let layout = UniformLayout::new(&[
        member("proj", UniformType::Mat4),
        member("view", UniformType::Mat4),
        member("view_vector", UniformType::Vec3),
        member("camera_position", UniformType::Vec3),
    ]);

    assert_eq!(layout.offset_of("proj"), Some(0));
    assert_eq!(layout.offset_of("view"), Some(64));
    assert_eq!(layout.offset_of("view_vector"), Some(128));
    assert_eq!(layout.offset_of("camera_position"), Some(144));
    assert_eq!(layout.size(), 160);
}

#[test]
fn scalars_pack_after_a_vec3_without_padding() {
    let layout = UniformLayout::new(&[
        member("model", UniformType::Mat4),
        member("diffuse_color", UniformType::Vec3),
        member("roughness", UniformType::Float),
        member("metallic", UniformType::Float),
    ]);

    assert_eq!(layout.offset_of("model"), Some(0));
    assert_eq!(layout.offset_of("diffuse_color"), Some(64));
    // f32 aligns to 4, so it slots into the vec3's tail padding.
    assert_eq!(layout.offset_of("roughness"), Some(76));
    assert_eq!(layout.offset_of("metallic"), Some(80));
    assert_eq!(layout.size(), 96);
}

#[test]
fn vec2_and_int_alignment() {
    let layout = UniformLayout::new(&[
        member("current_face", UniformType::Int),
        member("uv_scale", UniformType::Vec2),
        member("strength", UniformType::Float),
    ]);

    assert_eq!(layout.offset_of("current_face"), Some(0));
    assert_eq!(layout.offset_of("uv_scale"), Some(8));
    assert_eq!(layout.offset_of("strength"), Some(16));
    assert_eq!(layout.size(), 32);
    assert_eq!(layout.offset_of("missing"), None);
}

// ============================================================================
// Source composition
// ============================================================================

#[test]
fn composed_source_orders_prologue_sections() {
    use vitrine::renderer::shader::UniformBlockDesc;

    let desc = ShaderProgramDesc {
        label: "test",
        source: "@fragment fn fs_main() {}",
        defines: vec![ShaderDefine::float("MAX_MIP_LEVEL", 4.0)],
        blocks: vec![UniformBlockDesc {
            name: "FaceBlock",
            var: "face",
            binding: 0,
            members: vec![member("current_face", UniformType::Int)],
            array_len: 6,
        }],
        samplers: vec![
            SamplerSlot {
                name: "hdri",
                dimension: wgpu::TextureViewDimension::Cube,
            },
            SamplerSlot {
                name: "brdf_lut",
                dimension: wgpu::TextureViewDimension::D2,
            },
        ],
    };

    let source = compose_source(&desc);

    let define_at = source.find("const MAX_MIP_LEVEL: f32 = 4.0;").unwrap();
    let block_at = source.find("struct FaceBlock {").unwrap();
    let var_at = source
        .find("@group(0) @binding(0) var<uniform> face: FaceBlock;")
        .unwrap();
    let body_at = source.find("@fragment fn fs_main()").unwrap();

    assert!(source.starts_with("const MATH_PI: f32"));
    assert!(define_at < block_at && block_at < var_at && var_at < body_at);

    // Samplers take paired bindings in declaration order.
    assert!(source.contains("@group(1) @binding(0) var t_hdri: texture_cube<f32>;"));
    assert!(source.contains("@group(1) @binding(1) var s_hdri: sampler;"));
    assert!(source.contains("@group(1) @binding(2) var t_brdf_lut: texture_2d<f32>;"));
    assert!(source.contains("@group(1) @binding(3) var s_brdf_lut: sampler;"));
}

// ============================================================================
// Sampler unit allocation
// ============================================================================

#[test]
fn sampler_units_allocate_in_binding_order() {
    let mut allocator = SamplerAllocator::new();
    assert_eq!(allocator.allocate(), 0);
    assert_eq!(allocator.allocate(), 1);
    assert_eq!(allocator.allocate(), 2);
    assert_eq!(allocator.allocated(), 3);
}

#[test]
fn fresh_scope_restarts_numbering_at_zero() {
    let mut allocator = SamplerAllocator::new();
    allocator.allocate();
    allocator.allocate();
    allocator.allocate();

    // A new `with` scope resets the counter on entry.
    allocator.reset();
    assert_eq!(allocator.allocate(), 0);
    assert_eq!(allocator.allocate(), 1);
}
