/// A validated buffer layout bound to its device memory.
///
/// Writes are checked against the layout before they reach the backend:
/// element writes must be exactly one stride, member writes exactly one
/// member, raw writes must stay inside the buffer.

use std::ops::Range;
use std::sync::Arc;
use crate::backend::BufferResource;
use crate::buffer::Buffer;
use crate::error::{Error, Result};

const SOURCE: &str = "lumen::Buffer";

fn invalid<T>(message: String) -> Result<T> {
    crate::engine_warn!(SOURCE, "{}", message);
    Err(Error::InvalidArgument(message))
}

/// Buffer layout plus backend allocation
pub struct GpuBuffer {
    layout: Buffer,
    resource: Arc<dyn BufferResource>,
}

impl GpuBuffer {
    pub(crate) fn new(layout: Buffer, resource: Arc<dyn BufferResource>) -> Self {
        Self { layout, resource }
    }

    // ===== ACCESSORS =====

    /// Layout produced by the layout engine
    pub fn layout(&self) -> &Buffer { &self.layout }

    /// Get the underlying backend buffer
    pub fn resource(&self) -> &Arc<dyn BufferResource> { &self.resource }

    pub fn size(&self) -> u64 { self.layout.size() }

    pub fn array_length(&self) -> u64 { self.layout.array_length() }

    pub fn array_stride(&self) -> u64 { self.layout.array_stride() }

    /// Get member index by name
    pub fn data_member_index(&self, name: &str) -> Option<usize> {
        self.layout.data_member_index(name)
    }

    // ===== SAFE UPDATE METHODS =====

    /// Replace a whole element at index
    pub fn update_element(&self, index: u64, data: &[u8]) -> Result<()> {
        if index >= self.layout.array_length() {
            return invalid(format!(
                "Element index {} out of bounds (array length: {})",
                index, self.layout.array_length()
            ));
        }
        if data.len() as u64 != self.layout.array_stride() {
            return invalid(format!(
                "Data size {} doesn't match stride {}", data.len(), self.layout.array_stride()
            ));
        }
        self.resource.upload(index * self.layout.array_stride(), data)
    }

    /// Update one member of one element
    pub fn update_member(&self, index: u64, member: usize, data: &[u8]) -> Result<()> {
        if index >= self.layout.array_length() {
            return invalid(format!(
                "Element index {} out of bounds (array length: {})",
                index, self.layout.array_length()
            ));
        }
        let Some(member) = self.layout.data_member(member) else {
            return invalid(format!(
                "Member index {} out of bounds ({} members)",
                member, self.layout.data_members().len()
            ));
        };
        if data.len() as u64 != member.size {
            return invalid(format!(
                "Data size {} doesn't match size {} of member '{}'",
                data.len(), member.size, member.name()
            ));
        }
        self.resource.upload(index * self.layout.array_stride() + member.offset, data)
    }

    /// Update raw bytes at arbitrary offset
    pub fn update_raw(&self, offset: u64, data: &[u8]) -> Result<()> {
        self.layout.check_range(offset, data.len() as u64)?;
        self.resource.upload(offset, data)
    }

    /// Write consecutive elements starting at `first` from a plain-data slice
    ///
    /// `T` must have exactly the element stride as its size.
    pub fn write_elements<T: bytemuck::Pod>(&self, first: u64, elements: &[T]) -> Result<()> {
        let element_size = std::mem::size_of::<T>() as u64;
        if element_size != self.layout.array_stride() {
            return invalid(format!(
                "Element type is {} bytes but buffer stride is {}",
                element_size, self.layout.array_stride()
            ));
        }
        let end = first.checked_add(elements.len() as u64);
        if end.map_or(true, |end| end > self.layout.array_length()) {
            return invalid(format!(
                "Writing {} elements at {} exceeds array length {}",
                elements.len(), first, self.layout.array_length()
            ));
        }
        self.resource.upload(first * element_size, bytemuck::cast_slice(elements))
    }

    // ===== MAPPING =====

    pub fn is_mapped(&self) -> bool { self.layout.is_mapped() }

    /// Start tracking modified ranges
    ///
    /// No host pointer is exposed: writes still go through the update
    /// methods, and `unmap` flushes the tracked range.
    pub fn map(&mut self) {
        self.layout.map();
    }

    pub fn set_mapped_range_modified(&mut self, offset: u64, len: u64) -> Result<()> {
        self.layout.set_mapped_range_modified(offset, len)
    }

    /// Unmap and flush the modified range through the backend
    ///
    /// Returns the flushed range, if any.
    pub fn unmap(&mut self) -> Result<Option<Range<u64>>> {
        let range = self.layout.unmap();
        if let Some(range) = &range {
            self.resource.flush(range.clone())?;
        }
        Ok(range)
    }
}

impl std::fmt::Debug for GpuBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuBuffer")
            .field("layout", &self.layout)
            .field("resource_size", &self.resource.size())
            .finish()
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
