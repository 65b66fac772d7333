use herostage_gpu_shared::frame::{FrameDesc, MaterialData, MeshData, MeshHandle};

/// The slice of a GPU renderer the scene controller drives.
pub trait RenderBackend {
    /// Resize the drawing surface, in CSS pixels.
    fn set_size(&mut self, width: u32, height: u32);

    /// Device pixels per CSS pixel for the drawing buffer.
    fn set_pixel_ratio(&mut self, pixel_ratio: f64);

    /// Current size in CSS pixels.
    fn size(&self) -> (u32, u32);

    fn upload_mesh(&mut self, mesh: &MeshData, material: &MaterialData)
        -> Result<MeshHandle, String>;

    fn render(&mut self, frame: &FrameDesc) -> Result<(), String>;
}
