use glam::{Mat4, Quat, Vec3};

use herostage_gpu_shared::color::Color;
use herostage_gpu_shared::frame::{DirectionalLightDesc, DrawItem, FrameDesc, MaterialData, MeshHandle};
use herostage_gpu_shared::math;

use crate::camera::PerspectiveCamera;

/// Local transform of a graph node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn matrix(&self) -> Mat4 {
        math::compose_trs(self.translation, self.rotation, self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// XYZ-ordered Euler angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Euler {
    pub fn to_quat(self) -> Quat {
        math::euler_xyz(self.x, self.y, self.z)
    }
}

/// A drawable piece of a node: uploaded geometry plus the material it was
/// uploaded with.
#[derive(Debug, Clone)]
pub struct Primitive {
    pub mesh: MeshHandle,
    pub material: MaterialData,
}

/// A graph node inside an [`Object3D`].
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    /// Parent node index; `None` means the object root. Parents always come
    /// before their children.
    pub parent: Option<usize>,
    pub transform: Transform,
    /// Computed by `transform::compute_world_transforms`.
    pub world: Mat4,
    pub primitives: Vec<Primitive>,
}

impl Node {
    pub fn new(name: Option<String>, parent: Option<usize>, transform: Transform) -> Self {
        Self {
            name,
            parent,
            transform,
            world: Mat4::IDENTITY,
            primitives: Vec::new(),
        }
    }
}

/// A top-level scene object: a root transform with a node hierarchy under it.
#[derive(Debug, Clone)]
pub struct Object3D {
    pub name: String,
    pub position: Vec3,
    pub rotation: Euler,
    pub scale: Vec3,
    pub nodes: Vec<Node>,
}

impl Object3D {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vec3::ZERO,
            rotation: Euler::default(),
            scale: Vec3::ONE,
            nodes: Vec::new(),
        }
    }

    pub fn root_matrix(&self) -> Mat4 {
        math::compose_trs(self.position, self.rotation.to_quat(), self.scale)
    }

    pub fn primitives(&self) -> impl Iterator<Item = (&Node, &Primitive)> {
        self.nodes
            .iter()
            .flat_map(|node| node.primitives.iter().map(move |p| (node, p)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    /// Shines from `position` towards `target`.
    Directional {
        color: Color,
        intensity: f32,
        position: Vec3,
        target: Vec3,
    },
}

/// Index of an object inside its [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

/// The scene: background, lights and top-level objects.
#[derive(Debug, Clone)]
pub struct Scene {
    pub background: Color,
    lights: Vec<Light>,
    objects: Vec<Object3D>,
}

impl Scene {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            lights: Vec::new(),
            objects: Vec::new(),
        }
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn add(&mut self, object: Object3D) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn objects(&self) -> &[Object3D] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [Object3D] {
        &mut self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id.0)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id.0)
    }

    /// Sum of ambient light contributions.
    pub fn ambient_irradiance(&self) -> [f32; 3] {
        self.lights.iter().fold([0.0; 3], |acc, light| match light {
            Light::Ambient { color, intensity } => {
                let [r, g, b] = color.scaled(*intensity);
                [acc[0] + r, acc[1] + g, acc[2] + b]
            }
            Light::Directional { .. } => acc,
        })
    }

    pub fn directional_lights(&self) -> Vec<DirectionalLightDesc> {
        self.lights
            .iter()
            .filter_map(|light| match light {
                Light::Directional {
                    color,
                    intensity,
                    position,
                    target,
                } => Some(DirectionalLightDesc {
                    direction: (*position - *target).normalize_or_zero().to_array(),
                    color: color.scaled(*intensity),
                }),
                Light::Ambient { .. } => None,
            })
            .collect()
    }

    /// Draw list for the current world transforms, seen from `camera`.
    pub fn frame_desc(&self, camera: &PerspectiveCamera) -> FrameDesc {
        let draws = self
            .objects
            .iter()
            .flat_map(|object| object.primitives())
            .map(|(node, primitive)| DrawItem {
                mesh: primitive.mesh,
                model: node.world,
            })
            .collect();

        FrameDesc {
            clear_color: [
                self.background.r as f64,
                self.background.g as f64,
                self.background.b as f64,
                1.0,
            ],
            view_proj: camera.view_projection(),
            camera_position: camera.position,
            ambient: self.ambient_irradiance(),
            directional_lights: self.directional_lights(),
            draws,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn object_with_primitives(count: usize) -> Object3D {
        let mut object = Object3D::new("test");
        let mut node = Node::new(None, None, Transform::IDENTITY);
        for i in 0..count {
            node.primitives.push(Primitive {
                mesh: MeshHandle(i as u64 + 1),
                material: MaterialData::default(),
            });
        }
        object.nodes.push(node);
        object
    }

    // ── Light aggregation ──

    #[test]
    fn test_ambient_irradiance_sums_ambient_only() {
        let mut scene = Scene::new(Color::BLACK);
        scene.add_light(Light::Ambient {
            color: Color::WHITE,
            intensity: 1.5,
        });
        scene.add_light(Light::Directional {
            color: Color::WHITE,
            intensity: 2.5,
            position: Vec3::splat(5.0),
            target: Vec3::ZERO,
        });
        assert_eq!(scene.ambient_irradiance(), [1.5, 1.5, 1.5]);
    }

    #[test]
    fn test_directional_points_towards_light() {
        let mut scene = Scene::new(Color::BLACK);
        scene.add_light(Light::Directional {
            color: Color::WHITE,
            intensity: 2.5,
            position: Vec3::splat(5.0),
            target: Vec3::ZERO,
        });
        let lights = scene.directional_lights();
        assert_eq!(lights.len(), 1);
        let inv_sqrt3 = 1.0 / 3f32.sqrt();
        for c in lights[0].direction {
            assert!(approx_eq(c, inv_sqrt3));
        }
        assert_eq!(lights[0].color, [2.5, 2.5, 2.5]);
    }

    // ── Objects & draw list ──

    #[test]
    fn test_add_returns_stable_ids() {
        let mut scene = Scene::new(Color::BLACK);
        let a = scene.add(Object3D::new("a"));
        let b = scene.add(Object3D::new("b"));
        assert_ne!(a, b);
        assert_eq!(scene.object(a).map(|o| o.name.as_str()), Some("a"));
        assert_eq!(scene.object(b).map(|o| o.name.as_str()), Some("b"));
        assert_eq!(scene.objects().len(), 2);
    }

    #[test]
    fn test_frame_desc_emits_one_draw_per_primitive() {
        let mut scene = Scene::new(Color::BLACK);
        scene.add(object_with_primitives(2));
        scene.add(object_with_primitives(1));
        let camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0);
        let frame = scene.frame_desc(&camera);
        assert_eq!(frame.draws.len(), 3);
        assert_eq!(frame.clear_color, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_root_matrix_applies_euler_y() {
        let mut object = Object3D::new("spin");
        object.rotation.y = std::f32::consts::FRAC_PI_2;
        let p = object.root_matrix().transform_point3(Vec3::X);
        // +X rotated a quarter turn about +Y lands on -Z
        assert!(approx_eq(p.x, 0.0));
        assert!(approx_eq(p.z, -1.0));
    }
}
