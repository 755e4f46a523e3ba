/// Device-side buffer trait

use std::ops::Range;
use crate::error::Result;

/// Device memory backing a Buffer layout
///
/// Implemented by backend-specific buffer types (e.g., VulkanBuffer).
/// The memory is released when dropped.
pub trait BufferResource: Send + Sync {
    /// Allocated size in bytes
    fn size(&self) -> u64;

    /// Write bytes at `offset`
    ///
    /// Callers check the range against the layout first; backends may
    /// still reject a write that runs past `size()`.
    fn upload(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Make host writes in `range` visible to the device
    fn flush(&self, range: Range<u64>) -> Result<()>;
}
