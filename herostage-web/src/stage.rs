use crate::backend::RenderBackend;
use crate::controller::SceneController;
use crate::error::{LoadError, StageError};
use crate::frame_loop::{FrameLoop, FrameScheduler};
use crate::loader::LoadedAsset;

/// A scene controller together with the loop that drives it.
pub struct Stage<B: RenderBackend, S: FrameScheduler> {
    controller: SceneController<B>,
    frame_loop: FrameLoop<S>,
}

impl<B: RenderBackend, S: FrameScheduler> Stage<B, S> {
    pub fn new(controller: SceneController<B>, frame_loop: FrameLoop<S>) -> Self {
        Self {
            controller,
            frame_loop,
        }
    }

    /// Load has settled: attach the model (or fallback) and start the loop.
    /// Returns whether the loop was started by this call; a stage stopped
    /// before the load settled stays stopped.
    pub fn settle_load(
        &mut self,
        result: Result<LoadedAsset, LoadError>,
    ) -> Result<bool, StageError> {
        self.controller.finish_load(result)?;
        self.frame_loop.start()
    }

    /// Body of one frame callback. The next frame is requested before the
    /// scene is advanced and rendered. Returns `false` when the frame was
    /// skipped.
    pub fn run_frame(&mut self, timestamp_ms: f64) -> Result<bool, StageError> {
        if !self.frame_loop.begin_frame()? {
            return Ok(false);
        }
        self.controller.frame(timestamp_ms)?;
        Ok(true)
    }

    /// Container resized. `pixel_ratio` is applied first so the new drawing
    /// buffer is sized once for both changes.
    pub fn resize(&mut self, width: u32, height: u32, pixel_ratio: Option<f64>) {
        if let Some(ratio) = pixel_ratio {
            self.controller.renderer_mut().set_pixel_ratio(ratio);
        }
        self.controller.on_resize(width, height);
    }

    pub fn stop(&mut self) {
        self.frame_loop.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    pub fn controller(&self) -> &SceneController<B> {
        &self.controller
    }

    pub fn frame_loop_mut(&mut self) -> &mut FrameLoop<S> {
        &mut self.frame_loop
    }
}
