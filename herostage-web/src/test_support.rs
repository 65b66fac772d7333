//! In-memory stand-ins for the browser renderer and frame scheduler.

use herostage_gpu_shared::frame::{FrameDesc, MaterialData, MeshData, MeshHandle};

use crate::backend::RenderBackend;
use crate::error::StageError;
use crate::frame_loop::FrameScheduler;

/// Records every call the controller makes.
#[derive(Default)]
pub struct RecordingBackend {
    pub size: (u32, u32),
    pub pixel_ratio: Option<f64>,
    pub uploads: Vec<(usize, MaterialData)>,
    pub frames: Vec<FrameDesc>,
    pub fail_upload: bool,
    pub fail_render: bool,
}

impl RecordingBackend {
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ..Default::default()
        }
    }
}

impl RenderBackend for RecordingBackend {
    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        self.pixel_ratio = Some(pixel_ratio);
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn upload_mesh(
        &mut self,
        mesh: &MeshData,
        material: &MaterialData,
    ) -> Result<MeshHandle, String> {
        if self.fail_upload {
            return Err("out of memory".into());
        }
        self.uploads.push((mesh.vertex_count(), material.clone()));
        Ok(MeshHandle(self.uploads.len() as u64))
    }

    fn render(&mut self, frame: &FrameDesc) -> Result<(), String> {
        if self.fail_render {
            return Err("surface lost".into());
        }
        self.frames.push(frame.clone());
        Ok(())
    }
}

/// Hands out sequential request ids and tracks which are outstanding.
#[derive(Default)]
pub struct CountingScheduler {
    next_id: u32,
    pub outstanding: Vec<u32>,
    pub requested: usize,
    pub cancelled: Vec<u32>,
    /// Refuse every request once `requested` reaches this count.
    pub fail_after: Option<usize>,
}

impl CountingScheduler {
    /// Grants `granted` requests, then refuses every later one.
    pub fn failing_after(granted: usize) -> Self {
        Self {
            fail_after: Some(granted),
            ..Default::default()
        }
    }

    /// Simulate the browser firing the oldest outstanding callback.
    pub fn fire(&mut self) {
        if !self.outstanding.is_empty() {
            self.outstanding.remove(0);
        }
    }
}

impl FrameScheduler for CountingScheduler {
    type Request = u32;

    fn request_frame(&mut self) -> Result<u32, StageError> {
        if self.fail_after.is_some_and(|limit| self.requested >= limit) {
            return Err(StageError::Scheduler("no window".into()));
        }
        self.next_id += 1;
        self.requested += 1;
        self.outstanding.push(self.next_id);
        Ok(self.next_id)
    }

    fn cancel_frame(&mut self, request: u32) {
        self.outstanding.retain(|&id| id != request);
        self.cancelled.push(request);
    }
}
