use serde::Deserialize;

use crate::error::StageError;

/// Runtime configuration. Every field has a default, so a page can pass a
/// partial JSON object (or nothing at all).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Id of the element the canvas is appended to.
    pub container_id: String,
    /// Relative URL of the GLB/glTF asset.
    pub asset_url: String,
    /// `0xRRGGBB` clear color.
    pub background: u32,
    pub camera: CameraConfig,
    pub ambient_light: LightConfig,
    pub directional_light: DirectionalLightConfig,
    pub model: ModelConfig,
    /// Radians added to the model's Y rotation every frame when no clip plays.
    pub idle_rotation_step: f32,
    pub fallback: FallbackConfig,
    pub renderer: RendererConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub color: u32,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DirectionalLightConfig {
    pub color: u32,
    pub intensity: f32,
    /// The light points from here towards the origin.
    pub position: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub scale: f32,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub color: u32,
    /// Edge length of the fallback cube.
    pub size: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub antialias: bool,
    /// Overrides `window.devicePixelRatio` when set.
    pub pixel_ratio: Option<f64>,
}

impl StageConfig {
    pub fn from_json(json: &str) -> Result<Self, StageError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            container_id: "three-container".to_string(),
            asset_url: "./models/DamagedHelmet.glb".to_string(),
            background: 0x000000,
            camera: CameraConfig::default(),
            ambient_light: LightConfig::default(),
            directional_light: DirectionalLightConfig::default(),
            model: ModelConfig::default(),
            idle_rotation_step: 0.005,
            fallback: FallbackConfig::default(),
            renderer: RendererConfig::default(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 0.0, 3.0],
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            intensity: 1.5,
        }
    }
}

impl Default for DirectionalLightConfig {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            intensity: 2.5,
            position: [5.0, 5.0, 5.0],
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            scale: 10.0,
            position: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            color: 0x00ff00,
            size: 1.0,
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            pixel_ratio: None,
        }
    }
}
