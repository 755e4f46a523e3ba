/// Backend trait
///
/// One implementation per graphics API. A backend reports its capabilities
/// once, then turns validated buffer layouts and texture descriptors into
/// device resources.

use std::sync::Arc;
use crate::buffer::Buffer;
use crate::capabilities::Capabilities;
use crate::error::Result;
use crate::backend::{BufferResource, TextureDesc, TextureResource};

/// Graphics API adapter
///
/// Resources are reference counted and freed when the last handle drops.
pub trait Backend: Send + Sync {
    /// Short identifier ("vulkan", "mock", ...)
    fn name(&self) -> &str;

    /// Features and limits of the device behind this backend
    fn capabilities(&self) -> &Capabilities;

    /// Allocate device memory for a validated layout
    ///
    /// # Arguments
    ///
    /// * `layout` - Buffer produced by the layout engine against `capabilities()`
    /// * `data` - Optional initial contents, at most `layout.size()` bytes
    fn create_buffer(&mut self, layout: &Buffer, data: Option<&[u8]>) -> Result<Arc<dyn BufferResource>>;

    /// Create a 2D texture, uploading level 0 when `desc.data` is set
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn TextureResource>>;
}
