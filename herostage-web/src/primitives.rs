//! Procedural geometry for the fallback model.

use glam::Vec3;

use herostage_gpu_shared::frame::MeshData;

/// Outward normal plus the in-plane axes of each cube face, with
/// `u.cross(v) == normal` so corners wind counter-clockwise from outside.
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    // +X
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    // -X
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    // +Y
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    // -Y
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    // +Z
    (Vec3::Z, Vec3::X, Vec3::Y),
    // -Z
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

/// Axis-aligned cube of edge length `size` centered at the origin.
///
/// Four vertices per face so every face gets a flat normal and its own
/// 0..1 UV square.
pub fn box_geometry(size: f32) -> MeshData {
    let half = size * 0.5;
    let mut data = MeshData::default();

    for (normal, u, v) in CUBE_FACES {
        let base = data.positions.len() as u32;
        let center = normal * half;

        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = center + u * (su * half) + v * (sv * half);
            data.positions.push(p.to_array());
            data.normals.push(normal.to_array());
            data.uvs.push([(su + 1.0) * 0.5, (1.0 - sv) * 0.5]);
        }

        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}
