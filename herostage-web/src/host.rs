//! The page a stage is mounted into.
//!
//! [`place_canvas`] touches the page only when the container exists, and the
//! returned [`Placement`] takes the canvas back out unless the mount commits.

use crate::error::StageError;

/// DOM operations needed to mount a stage.
pub trait HostPage {
    type Container;
    type Canvas: Clone;

    fn find_container(&self, id: &str) -> Option<Self::Container>;

    /// Layout size of the container in CSS pixels.
    fn container_size(&self, container: &Self::Container) -> (u32, u32);

    /// Create a canvas and append it as the container's last child.
    fn append_canvas(&self, container: &Self::Container) -> Result<Self::Canvas, StageError>;

    fn remove_canvas(&self, canvas: &Self::Canvas);
}

/// A canvas appended for a mount that is still in progress. Dropping it
/// without [`Placement::commit`] removes the canvas from the page.
pub struct Placement<'a, H: HostPage> {
    host: &'a H,
    canvas: H::Canvas,
    size: (u32, u32),
    committed: bool,
}

impl<H: HostPage> Placement<'_, H> {
    pub fn canvas(&self) -> &H::Canvas {
        &self.canvas
    }

    /// Container size at the time the canvas was placed.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Keep the canvas in the page.
    pub fn commit(mut self) -> H::Canvas {
        self.committed = true;
        self.canvas.clone()
    }
}

impl<H: HostPage> Drop for Placement<'_, H> {
    fn drop(&mut self) {
        if !self.committed {
            log::warn!("Mount failed; removing canvas");
            self.host.remove_canvas(&self.canvas);
        }
    }
}

/// Append a canvas to the container named `container_id`. Returns `None`
/// without touching the page when there is no such container.
pub fn place_canvas<'a, H: HostPage>(
    host: &'a H,
    container_id: &str,
) -> Result<Option<Placement<'a, H>>, StageError> {
    let Some(container) = host.find_container(container_id) else {
        return Ok(None);
    };

    let size = host.container_size(&container);
    let canvas = host.append_canvas(&container)?;
    Ok(Some(Placement {
        host,
        canvas,
        size,
        committed: false,
    }))
}
