use bytemuck::{Pod, Zeroable};

/// Directional lights the mesh shader can take in one frame.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

/// Interleaved mesh vertex (matches `VertexInput` in mesh.wgsl).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Per-frame camera and lighting block, bind group 0.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// rgb = ambient color * intensity
    pub ambient: [f32; 4],
    /// xyz = direction towards the light
    pub light_directions: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    /// rgb = light color * intensity
    pub light_colors: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    /// x = active light count
    pub light_count: [u32; 4],
}

/// Per-draw transform block, bind group 1 (dynamic offset).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
}

/// Per-mesh material block, bind group 2.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniforms {
    pub base_color: [f32; 4],
    /// rgb = specular color, a = shininess
    pub specular: [f32; 4],
}
