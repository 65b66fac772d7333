use std::collections::HashMap;
use std::sync::Arc;

use glam::{Quat, Vec3};
use gltf::animation::util::ReadOutputs;

use herostage_gpu_shared::frame::{MaterialData, MeshData, TextureData};

use crate::animation::{AnimationChannel, AnimationClip, Interpolation, TargetProperty};
use crate::error::LoadError;
use crate::scene::Transform;

/// A node of the parsed asset, before any GPU upload.
#[derive(Debug, Clone)]
pub struct AssetNode {
    pub name: Option<String>,
    /// Index of the parent in [`LoadedAsset::nodes`]; parents come first.
    pub parent: Option<usize>,
    pub transform: Transform,
    pub meshes: Vec<(MeshData, MaterialData)>,
}

/// CPU-side result of parsing a GLB/glTF payload.
#[derive(Debug, Clone, Default)]
pub struct LoadedAsset {
    pub nodes: Vec<AssetNode>,
    pub clips: Vec<AnimationClip>,
}

type BufferSlices<'a> = &'a [gltf::buffer::Data];

/// Parse a self-contained glTF asset (GLB, or glTF with embedded buffers).
pub fn parse_asset(bytes: &[u8]) -> Result<LoadedAsset, LoadError> {
    let (document, buffers, images) = gltf::import_slice(bytes)?;

    log::debug!(
        "glTF: {} scenes, {} nodes, {} meshes, {} animations",
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count(),
        document.animations().count(),
    );

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(LoadError::EmptyScene)?;

    let mut textures: HashMap<usize, Option<Arc<TextureData>>> = HashMap::new();
    let mut nodes = Vec::new();
    let mut index_map = HashMap::new();

    for root in scene.nodes() {
        process_node(
            &root,
            None,
            &buffers,
            &images,
            &mut textures,
            &mut nodes,
            &mut index_map,
        );
    }

    let clips = document
        .animations()
        .enumerate()
        .map(|(i, animation)| read_clip(&animation, i, &buffers, &index_map))
        .collect();

    Ok(LoadedAsset { nodes, clips })
}

/// Depth-first walk; appends `node` and its subtree to `out` parents-first.
fn process_node(
    node: &gltf::Node,
    parent: Option<usize>,
    buffers: BufferSlices,
    images: &[gltf::image::Data],
    textures: &mut HashMap<usize, Option<Arc<TextureData>>>,
    out: &mut Vec<AssetNode>,
    index_map: &mut HashMap<usize, usize>,
) {
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Transform {
        translation: Vec3::from_array(translation),
        rotation: Quat::from_array(rotation),
        scale: Vec3::from_array(scale),
    };

    let meshes = node
        .mesh()
        .map(|mesh| read_mesh(&mesh, buffers, images, textures))
        .unwrap_or_default();

    let arena_index = out.len();
    index_map.insert(node.index(), arena_index);
    out.push(AssetNode {
        name: node.name().map(str::to_string),
        parent,
        transform,
        meshes,
    });

    for child in node.children() {
        process_node(
            &child,
            Some(arena_index),
            buffers,
            images,
            textures,
            out,
            index_map,
        );
    }
}

fn read_mesh(
    mesh: &gltf::Mesh,
    buffers: BufferSlices,
    images: &[gltf::image::Data],
    textures: &mut HashMap<usize, Option<Arc<TextureData>>>,
) -> Vec<(MeshData, MaterialData)> {
    let mut out = Vec::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Skipping {:?} primitive in mesh {:?}",
                primitive.mode(),
                mesh.name()
            );
            continue;
        }

        let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));

        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<[f32; 3]> = positions.collect();
        if positions.is_empty() {
            continue;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|uv| uv.into_f32().collect())
            .unwrap_or_default();

        let mut data = MeshData {
            positions,
            normals: Vec::new(),
            uvs,
            indices,
        };

        match reader.read_normals() {
            Some(normals) => data.normals = normals.collect(),
            None => data.compute_vertex_normals(),
        }

        let material = read_material(&primitive.material(), images, textures);
        out.push((data, material));
    }

    out
}

fn read_material(
    material: &gltf::Material,
    images: &[gltf::image::Data],
    textures: &mut HashMap<usize, Option<Arc<TextureData>>>,
) -> MaterialData {
    let pbr = material.pbr_metallic_roughness();

    let base_color_texture = pbr.base_color_texture().and_then(|info| {
        let image_index = info.texture().source().index();
        textures
            .entry(image_index)
            .or_insert_with(|| {
                let image = images.get(image_index)?;
                let texture = image_to_rgba(image.format, image.width, image.height, &image.pixels);
                if texture.is_none() {
                    log::warn!("Unsupported texture format {:?}", image.format);
                }
                texture.map(Arc::new)
            })
            .clone()
    });

    MaterialData {
        base_color: pbr.base_color_factor(),
        base_color_texture,
        ..MaterialData::default()
    }
}

/// Expand 8-bit image data to RGBA8. Other formats yield `None`.
pub fn image_to_rgba(
    format: gltf::image::Format,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Option<TextureData> {
    use gltf::image::Format;

    let rgba: Vec<u8> = match format {
        Format::R8G8B8A8 => pixels.to_vec(),
        Format::R8G8B8 => pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[1], 0, 255])
            .collect(),
        Format::R8 => pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        _ => return None,
    };

    if rgba.len() != (width as usize) * (height as usize) * 4 {
        return None;
    }

    Some(TextureData {
        width,
        height,
        rgba,
    })
}

fn read_clip(
    animation: &gltf::Animation,
    index: usize,
    buffers: BufferSlices,
    index_map: &HashMap<usize, usize>,
) -> AnimationClip {
    let mut channels = Vec::new();

    for channel in animation.channels() {
        let target = channel.target();
        let Some(&target_node) = index_map.get(&target.node().index()) else {
            continue;
        };

        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Step => Interpolation::Step,
            gltf::animation::Interpolation::Linear => Interpolation::Linear,
            gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };

        let reader = channel.reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
        let Some(inputs) = reader.read_inputs() else {
            continue;
        };
        let times: Vec<f32> = inputs.collect();

        let (property, values): (TargetProperty, Vec<f32>) = match reader.read_outputs() {
            Some(ReadOutputs::Translations(it)) => {
                (TargetProperty::Translation, it.flatten().collect())
            }
            Some(ReadOutputs::Rotations(it)) => {
                (TargetProperty::Rotation, it.into_f32().flatten().collect())
            }
            Some(ReadOutputs::Scales(it)) => (TargetProperty::Scale, it.flatten().collect()),
            // Morph targets are not rendered
            Some(ReadOutputs::MorphTargetWeights(_)) | None => continue,
        };

        channels.push(AnimationChannel {
            target_node,
            property,
            interpolation,
            times,
            values,
        });
    }

    let name = animation
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("clip_{index}"));

    AnimationClip::new(name, channels)
}
