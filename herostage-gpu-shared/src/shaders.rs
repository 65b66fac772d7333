/// Embedded WGSL shader source for the HeroStage mesh pipeline.
/// Shared between the wgpu renderer and anything that wants to validate it.

pub const MESH_SHADER: &str = include_str!("../shaders/mesh.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_points_present() {
        assert!(MESH_SHADER.contains(&format!("fn {VERTEX_ENTRY}(")));
        assert!(MESH_SHADER.contains(&format!("fn {FRAGMENT_ENTRY}(")));
    }

    #[test]
    fn test_light_array_matches_uniform_layout() {
        let decl = format!(
            "array<vec4<f32>, {}>",
            crate::uniforms::MAX_DIRECTIONAL_LIGHTS
        );
        assert!(MESH_SHADER.contains(&decl), "WGSL light arrays out of sync with FrameUniforms");
    }
}
