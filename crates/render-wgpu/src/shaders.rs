/// WGSL shader for textured scene objects.
///
/// Group 0 holds the per-draw matrices (bound with a dynamic offset), group 1
/// the object's texture and sampler.
pub const SCENE_SHADER: &str = r#"
struct DrawUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> draw: DrawUniforms;

@group(1) @binding(0)
var object_texture: texture_2d<f32>;
@group(1) @binding(1)
var object_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = draw.projection * draw.view * draw.model * vec4<f32>(vertex.position, 1.0);
    out.uv = vertex.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Vertex color is carried in the mesh but the surface is texture only.
    return textureSample(object_texture, object_sampler, in.uv);
}
"#;
