//! HeroStage shared GPU types.
//!
//! Everything the wgpu renderer and the WASM runtime have to agree on lives
//! here: uniform layouts, the WGSL source, camera math, color conversion and
//! the per-frame draw list.

pub mod color;
pub mod frame;
pub mod math;
pub mod shaders;
pub mod uniforms;
