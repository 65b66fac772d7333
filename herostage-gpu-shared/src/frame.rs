use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::color::Color;
use crate::math::normal_matrix;
use crate::uniforms::{FrameUniforms, MaterialUniforms, ObjectUniforms, Vertex, MAX_DIRECTIONAL_LIGHTS};

/// Opaque handle to a mesh uploaded to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// CPU-side triangle mesh, ready for upload.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Interleave attributes into the vertex layout the pipeline expects.
    /// Missing normals and UVs read as zero.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex {
                position,
                normal: self.normals.get(i).copied().unwrap_or([0.0; 3]),
                uv: self.uvs.get(i).copied().unwrap_or([0.0; 2]),
            })
            .collect()
    }

    /// Area-weighted vertex normals accumulated from the triangle faces.
    pub fn compute_vertex_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            if a >= accum.len() || b >= accum.len() || c >= accum.len() {
                continue;
            }
            let pa = Vec3::from_array(self.positions[a]);
            let pb = Vec3::from_array(self.positions[b]);
            let pc = Vec3::from_array(self.positions[c]);
            let face = (pb - pa).cross(pc - pa);
            accum[a] += face;
            accum[b] += face;
            accum[c] += face;
        }
        self.normals = accum
            .into_iter()
            .map(|n| n.normalize_or_zero().to_array())
            .collect();
    }
}

/// Decoded RGBA8 texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Surface description for one mesh.
#[derive(Debug, Clone)]
pub struct MaterialData {
    /// Linear RGBA.
    pub base_color: [f32; 4],
    pub specular: [f32; 3],
    pub shininess: f32,
    pub base_color_texture: Option<Arc<TextureData>>,
}

impl MaterialData {
    /// Phong-style material with the given color.
    pub fn phong(color: Color) -> Self {
        Self {
            base_color: color.with_alpha(1.0),
            ..Self::default()
        }
    }

    pub fn uniforms(&self) -> MaterialUniforms {
        MaterialUniforms {
            base_color: self.base_color,
            specular: [self.specular[0], self.specular[1], self.specular[2], self.shininess],
        }
    }
}

impl Default for MaterialData {
    fn default() -> Self {
        // 0x111111 specular, shininess 30
        let spec = Color::from_hex(0x111111);
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            specular: spec.to_array(),
            shininess: 30.0,
            base_color_texture: None,
        }
    }
}

/// Directional light as the shader sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLightDesc {
    /// Direction towards the light.
    pub direction: [f32; 3],
    /// Color premultiplied by intensity.
    pub color: [f32; 3],
}

/// One mesh instance to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshHandle,
    pub model: Mat4,
}

impl DrawItem {
    pub fn uniforms(&self) -> ObjectUniforms {
        ObjectUniforms {
            model: self.model.to_cols_array_2d(),
            normal: normal_matrix(&self.model).to_cols_array_2d(),
        }
    }
}

/// Renderer-agnostic description of a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDesc {
    pub clear_color: [f64; 4],
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub ambient: [f32; 3],
    pub directional_lights: Vec<DirectionalLightDesc>,
    pub draws: Vec<DrawItem>,
}

impl FrameDesc {
    /// Pack camera and lighting into the uniform block. Lights beyond
    /// `MAX_DIRECTIONAL_LIGHTS` are dropped.
    pub fn frame_uniforms(&self) -> FrameUniforms {
        let mut light_directions = [[0.0; 4]; MAX_DIRECTIONAL_LIGHTS];
        let mut light_colors = [[0.0; 4]; MAX_DIRECTIONAL_LIGHTS];
        let count = self.directional_lights.len().min(MAX_DIRECTIONAL_LIGHTS);
        for (i, light) in self.directional_lights.iter().take(count).enumerate() {
            let [dx, dy, dz] = light.direction;
            let [r, g, b] = light.color;
            light_directions[i] = [dx, dy, dz, 0.0];
            light_colors[i] = [r, g, b, 0.0];
        }

        let [ar, ag, ab] = self.ambient;
        FrameUniforms {
            view_proj: self.view_proj.to_cols_array_2d(),
            camera_position: self.camera_position.extend(1.0).to_array(),
            ambient: [ar, ag, ab, 0.0],
            light_directions,
            light_colors,
            light_count: [count as u32, 0, 0, 0],
        }
    }
}
