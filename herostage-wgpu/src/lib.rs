//! HeroStage wgpu backend.
//!
//! Owns the device, the canvas surface and every GPU resource the hero scene
//! needs. The runtime describes each frame with a `FrameDesc` and hands it to
//! [`Renderer::render`].

mod backend;
mod handle;

pub use backend::{Renderer, RendererOptions};
pub use handle::HandleStore;
pub use wgpu;
