//! HeroStage WASM Web Runtime
//!
//! Mounts a decorative 3D scene into a page's hero container: a glTF model
//! (or a fallback cube when loading fails) lit by an ambient and a
//! directional light, idly rotating or playing its first animation clip,
//! rendered with WebGPU/WebGL2 through wgpu.

#[cfg(target_arch = "wasm32")]
mod app;
pub mod animation;
pub mod backend;
pub mod camera;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod frame_loop;
pub mod host;
pub mod loader;
pub mod primitives;
pub mod scene;
pub mod stage;
pub mod transform;

#[cfg(test)]
mod test_support;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub use app::HeroStage;

/// Entry point: called when the WASM module loads.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("HeroStage runtime initialized");
}

/// Mount the hero scene. `config_json` is an optional partial
/// configuration object; omitted fields take their defaults.
///
/// Resolves to a `HeroStage`, or `undefined` when the container element is
/// missing.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn mount(config_json: Option<String>) -> Result<JsValue, JsValue> {
    let config = match config_json {
        Some(json) => config::StageConfig::from_json(&json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => config::StageConfig::default(),
    };

    Ok(match app::mount(config).await? {
        Some(stage) => stage.into(),
        None => JsValue::UNDEFINED,
    })
}
