use glam::Vec3;

use herostage_gpu_shared::color::Color;
use herostage_gpu_shared::frame::{MaterialData, MeshData};
use herostage_gpu_shared::math;

use crate::animation::AnimationDriver;
use crate::backend::RenderBackend;
use crate::camera::PerspectiveCamera;
use crate::clock::Clock;
use crate::config::StageConfig;
use crate::error::{LoadError, StageError};
use crate::loader::LoadedAsset;
use crate::primitives;
use crate::scene::{Light, Node, Object3D, ObjectId, Primitive, Scene, Transform};
use crate::transform;

/// How the model moves each frame. A clip driver replaces idle rotation.
#[derive(Debug)]
enum Motion {
    Idle,
    Clip(AnimationDriver),
}

/// Owns the scene, camera and renderer of one mounted hero stage.
pub struct SceneController<B: RenderBackend> {
    config: StageConfig,
    scene: Scene,
    camera: PerspectiveCamera,
    renderer: B,
    model: Option<ObjectId>,
    motion: Motion,
    clock: Clock,
}

impl<B: RenderBackend> SceneController<B> {
    /// Set up scene, lights and camera around an already sized renderer.
    pub fn new(config: StageConfig, renderer: B) -> Self {
        let mut scene = Scene::new(Color::from_hex(config.background));

        let ambient = &config.ambient_light;
        scene.add_light(Light::Ambient {
            color: Color::from_hex(ambient.color),
            intensity: ambient.intensity,
        });

        let directional = &config.directional_light;
        scene.add_light(Light::Directional {
            color: Color::from_hex(directional.color),
            intensity: directional.intensity,
            position: Vec3::from_array(directional.position),
            target: Vec3::ZERO,
        });

        let (width, height) = renderer.size();
        let aspect = math::aspect_ratio(width, height).unwrap_or(1.0);
        let cam = &config.camera;
        let mut camera = PerspectiveCamera::new(cam.fov, aspect, cam.near, cam.far);
        camera.position = Vec3::from_array(cam.position);

        Self {
            config,
            scene,
            camera,
            renderer,
            model: None,
            motion: Motion::Idle,
            clock: Clock::new(),
        }
    }

    /// Match camera and drawing buffer to the container's new size. A zero
    /// height keeps the previous aspect ratio.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(aspect) = math::aspect_ratio(width, height) {
            self.camera.aspect = aspect;
            self.camera.update_projection_matrix();
        }
        self.renderer.set_size(width, height);
    }

    /// Attach the loaded model, or the fallback cube if loading failed.
    /// Can only succeed once per controller.
    pub fn finish_load(&mut self, result: Result<LoadedAsset, LoadError>) -> Result<(), StageError> {
        if self.model.is_some() {
            return Err(StageError::AlreadyLoaded);
        }

        let object = match result {
            Ok(asset) => self.attach_asset(asset),
            Err(e) => {
                log::error!("Failed to load model {}: {e}", self.config.asset_url);
                self.fallback_cube()
            }
        };

        self.model = Some(self.scene.add(object));
        transform::update_world_transforms(&mut self.scene);
        Ok(())
    }

    fn attach_asset(&mut self, asset: LoadedAsset) -> Object3D {
        let mut object = Object3D::new("model");
        object.scale = Vec3::splat(self.config.model.scale);
        object.position = Vec3::from_array(self.config.model.position);

        let mut uploaded = 0usize;
        for asset_node in asset.nodes {
            let mut node = Node::new(asset_node.name, asset_node.parent, asset_node.transform);
            for (mesh, material) in asset_node.meshes {
                if let Some(primitive) = self.upload(&mesh, material) {
                    node.primitives.push(primitive);
                    uploaded += 1;
                }
            }
            object.nodes.push(node);
        }

        let clip_count = asset.clips.len();
        if clip_count > 1 {
            log::debug!("Asset has {clip_count} clips; playing the first");
        }
        if let Some(clip) = asset.clips.into_iter().next() {
            log::info!("Playing clip {:?} ({:.2}s)", clip.name, clip.duration);
            self.motion = Motion::Clip(AnimationDriver::new(clip));
        }

        log::info!(
            "Loaded model: {} nodes, {} meshes",
            object.nodes.len(),
            uploaded
        );
        object
    }

    fn fallback_cube(&mut self) -> Object3D {
        let fallback = &self.config.fallback;
        let mesh = primitives::box_geometry(fallback.size);
        let material = MaterialData::phong(Color::from_hex(fallback.color));

        let mut object = Object3D::new("fallback");
        let mut node = Node::new(None, None, Transform::IDENTITY);
        if let Some(primitive) = self.upload(&mesh, material) {
            node.primitives.push(primitive);
        }
        object.nodes.push(node);
        object
    }

    fn upload(&mut self, mesh: &MeshData, material: MaterialData) -> Option<Primitive> {
        match self.renderer.upload_mesh(mesh, &material) {
            Ok(handle) => Some(Primitive {
                mesh: handle,
                material,
            }),
            Err(e) => {
                log::warn!("Skipping mesh: {e}");
                None
            }
        }
    }

    /// One iteration of the render loop, fed the frame callback timestamp.
    pub fn frame(&mut self, timestamp_ms: f64) -> Result<(), StageError> {
        let delta = self.clock.tick(timestamp_ms);

        if let Some(object) = self.model.and_then(|id| self.scene.object_mut(id)) {
            match &mut self.motion {
                Motion::Idle => object.rotation.y += self.config.idle_rotation_step,
                Motion::Clip(driver) => driver.update(delta, object),
            }
        }

        transform::update_world_transforms(&mut self.scene);
        let frame = self.scene.frame_desc(&self.camera);
        self.renderer.render(&frame).map_err(StageError::Render)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn renderer(&self) -> &B {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut B {
        &mut self.renderer
    }

    pub fn model(&self) -> Option<&Object3D> {
        self.model.and_then(|id| self.scene.object(id))
    }

    pub fn animation_driver(&self) -> Option<&AnimationDriver> {
        match &self.motion {
            Motion::Clip(driver) => Some(driver),
            Motion::Idle => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationChannel, AnimationClip, Interpolation, TargetProperty};
    use crate::loader::AssetNode;
    use crate::test_support::RecordingBackend;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn controller() -> SceneController<RecordingBackend> {
        SceneController::new(StageConfig::default(), RecordingBackend::sized(800, 400))
    }

    fn single_mesh_asset(clips: Vec<AnimationClip>) -> LoadedAsset {
        LoadedAsset {
            nodes: vec![AssetNode {
                name: Some("helmet".into()),
                parent: None,
                transform: Transform::IDENTITY,
                meshes: vec![(primitives::box_geometry(0.2), MaterialData::default())],
            }],
            clips,
        }
    }

    fn bob_clip() -> AnimationClip {
        AnimationClip::new(
            "bob",
            vec![AnimationChannel {
                target_node: 0,
                property: TargetProperty::Translation,
                interpolation: Interpolation::Linear,
                times: vec![0.0, 1.0],
                values: vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            }],
        )
    }

    // ── Initialize ──

    #[test]
    fn test_new_configures_camera_and_lights() {
        let c = controller();
        assert!(approx_eq(c.camera().aspect, 2.0));
        assert!(approx_eq(c.camera().fov, 75.0));
        assert_eq!(c.camera().position, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(c.scene().lights().len(), 2);
        assert_eq!(c.scene().background, Color::BLACK);
        assert!(c.scene().objects().is_empty());
        assert!(!c.is_loaded());
    }

    #[test]
    fn test_new_with_zero_height_uses_unit_aspect() {
        let c = SceneController::new(StageConfig::default(), RecordingBackend::sized(300, 0));
        assert!(approx_eq(c.camera().aspect, 1.0));
        assert!(c.camera().projection_matrix().is_finite());
    }

    // ── OnResize ──

    #[test]
    fn test_resize_updates_aspect_and_renderer() {
        let mut c = controller();
        let before = c.camera().projection_matrix();
        c.on_resize(600, 600);
        assert!(approx_eq(c.camera().aspect, 1.0));
        assert_ne!(c.camera().projection_matrix(), before);
        assert_eq!(c.renderer().size, (600, 600));
    }

    #[test]
    fn test_resize_to_zero_height_keeps_aspect() {
        let mut c = controller();
        c.on_resize(640, 0);
        assert!(approx_eq(c.camera().aspect, 2.0));
        assert_eq!(c.renderer().size, (640, 0));
    }

    // ── Load ──

    #[test]
    fn test_failed_load_attaches_green_unit_cube() {
        let mut c = controller();
        c.finish_load(Err(LoadError::Fetch("offline".into()))).unwrap();

        assert_eq!(c.scene().objects().len(), 1);
        let model = c.model().unwrap();
        assert_eq!(model.name, "fallback");
        assert_eq!(model.scale, Vec3::ONE);
        assert!(c.animation_driver().is_none());

        let (vertices, material) = &c.renderer().uploads[0];
        assert_eq!(*vertices, 24);
        assert_eq!(material.base_color, Color::from_hex(0x00ff00).with_alpha(1.0));
    }

    #[test]
    fn test_successful_load_scales_model() {
        let mut c = controller();
        c.finish_load(Ok(single_mesh_asset(Vec::new()))).unwrap();

        let model = c.model().unwrap();
        assert_eq!(model.scale, Vec3::splat(10.0));
        assert_eq!(model.position, Vec3::ZERO);
        assert_eq!(model.nodes.len(), 1);
        assert_eq!(model.nodes[0].primitives.len(), 1);
        assert!(c.animation_driver().is_none());
    }

    #[test]
    fn test_first_clip_only_drives_model() {
        let mut second = bob_clip();
        second.name = "ignored".into();
        let mut c = controller();
        c.finish_load(Ok(single_mesh_asset(vec![bob_clip(), second])))
            .unwrap();
        assert_eq!(c.animation_driver().map(|d| d.clip().name.as_str()), Some("bob"));
    }

    #[test]
    fn test_second_load_is_rejected() {
        let mut c = controller();
        c.finish_load(Ok(single_mesh_asset(Vec::new()))).unwrap();
        let again = c.finish_load(Err(LoadError::EmptyScene));
        assert!(matches!(again, Err(StageError::AlreadyLoaded)));
        assert_eq!(c.scene().objects().len(), 1);
    }

    #[test]
    fn test_upload_failure_still_attaches_model() {
        let mut backend = RecordingBackend::sized(100, 100);
        backend.fail_upload = true;
        let mut c = SceneController::new(StageConfig::default(), backend);
        c.finish_load(Ok(single_mesh_asset(Vec::new()))).unwrap();
        assert!(c.is_loaded());
        assert!(c.model().unwrap().nodes[0].primitives.is_empty());
    }

    // ── Animate ──

    #[test]
    fn test_idle_rotation_is_fixed_per_frame() {
        let mut c = controller();
        c.finish_load(Ok(single_mesh_asset(Vec::new()))).unwrap();

        // Uneven frame spacing must not change the increment
        for (i, ts) in [0.0, 16.0, 100.0, 101.0].into_iter().enumerate() {
            c.frame(ts).unwrap();
            let expected = 0.005 * (i + 1) as f32;
            assert!(approx_eq(c.model().unwrap().rotation.y, expected));
        }
        assert_eq!(c.renderer().frames.len(), 4);
    }

    #[test]
    fn test_clip_advances_by_delta_without_rotating() {
        let mut c = controller();
        c.finish_load(Ok(single_mesh_asset(vec![bob_clip()]))).unwrap();

        c.frame(1000.0).unwrap();
        c.frame(1250.0).unwrap();
        c.frame(1500.0).unwrap();

        let driver = c.animation_driver().unwrap();
        assert!(approx_eq(driver.current_time(), 0.5));
        let model = c.model().unwrap();
        assert_eq!(model.rotation.y, 0.0);
        assert!(approx_eq(model.nodes[0].transform.translation.y, 0.5));
    }

    #[test]
    fn test_frame_renders_from_camera() {
        let mut c = controller();
        c.finish_load(Err(LoadError::EmptyScene)).unwrap();
        c.frame(0.0).unwrap();

        let frame = &c.renderer().frames[0];
        assert_eq!(frame.draws.len(), 1);
        assert_eq!(frame.camera_position, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(frame.directional_lights.len(), 1);
        assert_eq!(frame.ambient, [1.5, 1.5, 1.5]);
    }

    #[test]
    fn test_frame_before_load_renders_empty_scene() {
        let mut c = controller();
        c.frame(0.0).unwrap();
        assert!(c.renderer().frames[0].draws.is_empty());
    }

    #[test]
    fn test_render_failure_surfaces_as_stage_error() {
        let mut backend = RecordingBackend::sized(100, 100);
        backend.fail_render = true;
        let mut c = SceneController::new(StageConfig::default(), backend);
        assert!(matches!(c.frame(0.0), Err(StageError::Render(_))));
    }
}
