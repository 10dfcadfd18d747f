//! WGSL for nodes and links.
//!
//! One module, two pipelines: `vs_point`/`fs_point` draw a camera-facing disc
//! per node (instanced), `vs_line`/`fs_line` draw the link list. Colours are
//! written premultiplied so the window can be composited over the desktop.

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct Uniforms {
    pub proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub point_color: [f32; 4],
    pub line_color: [f32; 4],
    pub point_size: f32,
    pub _padding: [f32; 3],
}

pub(crate) const FIELD_SHADER: &str = r#"
struct Uniforms {
    proj: mat4x4<f32>,
    view: mat4x4<f32>,
    model: mat4x4<f32>,
    point_color: vec4<f32>,
    line_color: vec4<f32>,
    point_size: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct PointOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_point(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) node: vec3<f32>,
) -> PointOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let corner = corners[vertex_index];

    // Billboard in view space so the disc shrinks with depth
    var view_pos = uniforms.view * uniforms.model * vec4<f32>(node, 1.0);
    view_pos = vec4<f32>(view_pos.xy + corner * uniforms.point_size * 0.5, view_pos.zw);

    var out: PointOutput;
    out.clip_position = uniforms.proj * view_pos;
    out.uv = corner;
    return out;
}

@fragment
fn fs_point(in: PointOutput) -> @location(0) vec4<f32> {
    let dist = length(in.uv);
    if dist > 1.0 {
        discard;
    }
    let alpha = uniforms.point_color.a * (1.0 - smoothstep(0.75, 1.0, dist));
    return vec4<f32>(uniforms.point_color.rgb * alpha, alpha);
}

@vertex
fn vs_line(@location(0) endpoint: vec3<f32>) -> @builtin(position) vec4<f32> {
    return uniforms.proj * uniforms.view * uniforms.model * vec4<f32>(endpoint, 1.0);
}

@fragment
fn fs_line() -> @location(0) vec4<f32> {
    let alpha = uniforms.line_color.a;
    return vec4<f32>(uniforms.line_color.rgb * alpha, alpha);
}
"#;
