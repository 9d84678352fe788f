use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Compiles one of the built-in GLSL shaders through naga's GLSL frontend.
pub(crate) fn compile_glsl(
    device: &wgpu::Device,
    label: &str,
    source: &'static str,
    stage: ShaderStage,
) -> wgpu::ShaderModule {
    tracing::debug!(label, ?stage, "compiling shader");
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage,
            defines: &[],
        },
    })
}

/// Point cloud vertex shader.
///
/// Every instance is one point slot; six vertices expand it into a
/// screen-aligned square. The uniform block layout must match
/// `MorphUniforms` in `gpu/uniforms.rs`.
pub(crate) const POINT_VERTEX_GLSL: &str = r"#version 450
layout(location = 0) in vec2 grid_position;
layout(location = 1) in vec2 source_coord;
layout(location = 2) in vec2 target_coord;

layout(location = 0) out vec3 v_color;

layout(std140, set = 0, binding = 0) uniform MorphParams {
    mat4 view;
    mat4 projection;
    vec2 dimensions;
    vec2 viewport;
    float blend;
    float point_size;
    float stagger;
    float arc_height;
} params;

layout(set = 1, binding = 0) uniform texture2D source_texture;
layout(set = 1, binding = 1) uniform texture2D target_texture;
layout(set = 1, binding = 2) uniform sampler image_sampler;

const float PI = 3.14159265358979;

const vec2 corners[6] = vec2[6](
    vec2(-1.0, -1.0),
    vec2(1.0, -1.0),
    vec2(1.0, 1.0),
    vec2(-1.0, -1.0),
    vec2(1.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    vec2 corner = corners[uint(gl_VertexIndex) % 6u];
    vec2 dims = params.dimensions;

    // Later slots start later; every slot still lands exactly at blend 0 and 1.
    float slot = grid_position.y * dims.x + grid_position.x;
    float slots = max(dims.x * dims.y, 1.0);
    float progress = clamp(
        (1.0 + params.stagger) * params.blend - params.stagger * slot / slots,
        0.0,
        1.0
    );

    vec2 delta = target_coord - source_coord;
    vec2 pixel = source_coord + delta * (0.5 - 0.5 * cos(progress * PI));
    float lift = params.arc_height * length(delta) / dims.x * sin(progress * PI);

    vec2 plane = (pixel + vec2(0.5) - 0.5 * dims) / dims.x;
    vec4 eye = params.view * vec4(plane.x, -plane.y, lift, 1.0);
    vec4 clip = params.projection * eye;

    float size_px = params.point_size * 2.0 / max(-eye.z, 0.0001);
    vec2 offset = corner * size_px / params.viewport * clip.w;
    gl_Position = vec4(clip.x + offset.x, clip.y + offset.y, clip.z, clip.w);

    vec2 source_uv = (source_coord + vec2(0.5)) / dims;
    vec2 target_uv = (target_coord + vec2(0.5)) / dims;
    vec3 source_color = textureLod(sampler2D(source_texture, image_sampler), source_uv, 0.0).rgb;
    vec3 target_color = textureLod(sampler2D(target_texture, image_sampler), target_uv, 0.0).rgb;
    v_color = mix(source_color, target_color, progress);
}
";

pub(crate) const POINT_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec3 v_color;
layout(location = 0) out vec4 out_color;

void main() {
    out_color = vec4(v_color, 1.0);
}
";

/// Thumbnail quad vertex shader; `rect` is `(left, top, right, bottom)` in NDC.
pub(crate) const STRIP_VERTEX_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

layout(std140, set = 0, binding = 0) uniform ThumbnailParams {
    vec4 rect;
    vec4 tint;
} thumb;

const vec2 corners[6] = vec2[6](
    vec2(0.0, 0.0),
    vec2(1.0, 0.0),
    vec2(1.0, 1.0),
    vec2(0.0, 0.0),
    vec2(1.0, 1.0),
    vec2(0.0, 1.0)
);

void main() {
    vec2 corner = corners[uint(gl_VertexIndex) % 6u];
    v_uv = corner;
    float x = mix(thumb.rect.x, thumb.rect.z, corner.x);
    float y = mix(thumb.rect.y, thumb.rect.w, corner.y);
    gl_Position = vec4(x, y, 0.0, 1.0);
}
";

/// Thumbnail fragment shader; `tint.rgb` dims the image and `tint.a` is the
/// highlight border width in UV units.
pub(crate) const STRIP_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;

layout(std140, set = 0, binding = 0) uniform ThumbnailParams {
    vec4 rect;
    vec4 tint;
} thumb;

layout(set = 0, binding = 1) uniform texture2D thumb_texture;
layout(set = 0, binding = 2) uniform sampler thumb_sampler;

void main() {
    vec3 color = texture(sampler2D(thumb_texture, thumb_sampler), v_uv).rgb * thumb.tint.rgb;
    vec2 edge = min(v_uv, vec2(1.0) - v_uv);
    float border = step(min(edge.x, edge.y), thumb.tint.a);
    out_color = vec4(mix(color, vec3(1.0), border), 1.0);
}
";

#[cfg(test)]
mod tests {
    use wgpu::naga::front::glsl::{Frontend, Options};

    use super::*;

    fn parse(source: &str, stage: ShaderStage) {
        let mut frontend = Frontend::default();
        if let Err(errors) = frontend.parse(&Options::from(stage), source) {
            panic!("shader failed to parse: {errors:?}");
        }
    }

    #[test]
    fn point_shaders_parse() {
        parse(POINT_VERTEX_GLSL, ShaderStage::Vertex);
        parse(POINT_FRAGMENT_GLSL, ShaderStage::Fragment);
    }

    #[test]
    fn strip_shaders_parse() {
        parse(STRIP_VERTEX_GLSL, ShaderStage::Vertex);
        parse(STRIP_FRAGMENT_GLSL, ShaderStage::Fragment);
    }

    #[test]
    fn point_shader_declares_instance_attributes_in_slot_order() {
        let grid = POINT_VERTEX_GLSL
            .find("location = 0) in vec2 grid_position")
            .expect("grid attribute");
        let source = POINT_VERTEX_GLSL
            .find("location = 1) in vec2 source_coord")
            .expect("source attribute");
        let target = POINT_VERTEX_GLSL
            .find("location = 2) in vec2 target_coord")
            .expect("target attribute");
        assert!(grid < source && source < target);
    }
}
