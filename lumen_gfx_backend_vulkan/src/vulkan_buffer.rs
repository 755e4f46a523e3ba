/// Buffer - Vulkan implementation of the BufferResource trait

use lumen_gfx::lumen::{
    Result,
    render::BufferResource,
};
use lumen_gfx::{engine_bail, engine_err, engine_trace};
use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::ops::Range;
use std::sync::Arc;

use crate::vulkan_context::{GpuContext, SOURCE};

/// Vulkan buffer implementation
pub struct Buffer {
    /// Shared GPU context (device, allocator, queue, command pool)
    ctx: Arc<GpuContext>,
    /// Vulkan buffer
    pub(crate) buffer: vk::Buffer,
    /// GPU memory allocation
    pub(crate) allocation: Option<Allocation>,
    /// Typed view for texel buffers
    pub(crate) texel_view: Option<vk::BufferView>,
    /// Buffer size
    pub(crate) size: u64,
}

impl Buffer {
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        buffer: vk::Buffer,
        allocation: Allocation,
        size: u64,
    ) -> Self {
        Self {
            ctx,
            buffer,
            allocation: Some(allocation),
            texel_view: None,
            size,
        }
    }

    /// Create the typed view shaders read a texel buffer through
    pub(crate) fn create_texel_view(&mut self, format: vk::Format) -> Result<()> {
        let view_info = vk::BufferViewCreateInfo::default()
            .buffer(self.buffer)
            .format(format)
            .offset(0)
            .range(vk::WHOLE_SIZE);

        let view = unsafe {
            self.ctx.device.create_buffer_view(&view_info, None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create texel buffer view ({:?}): {:?}", format, e))?
        };
        self.texel_view = Some(view);
        Ok(())
    }

    /// Raw Vulkan handle (for binding in draw code)
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    /// Texel view, present only for texel buffers
    pub fn texel_view(&self) -> Option<vk::BufferView> {
        self.texel_view
    }

    /// True when writes go straight through a host mapping
    pub fn is_host_visible(&self) -> bool {
        self.allocation.as_ref().and_then(|a| a.mapped_ptr()).is_some()
    }
}

impl BufferResource for Buffer {
    fn size(&self) -> u64 {
        self.size
    }

    fn upload(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset.checked_add(data.len() as u64);
        if end.map_or(true, |end| end > self.size) {
            engine_bail!(
                SOURCE,
                "Buffer upload of {} bytes at offset {} exceeds buffer size {}",
                data.len(), offset, self.size
            );
        }
        if data.is_empty() {
            return Ok(());
        }

        let Some(allocation) = &self.allocation else {
            engine_bail!(SOURCE, "Buffer upload failed: no GPU allocation");
        };

        match allocation.mapped_ptr() {
            // Host-visible memory: copy directly
            Some(ptr) => unsafe {
                let mapped_ptr = ptr.as_ptr() as *mut u8;
                std::ptr::copy_nonoverlapping(
                    data.as_ptr(),
                    mapped_ptr.add(offset as usize),
                    data.len(),
                );
                Ok(())
            },
            // Device-local memory: go through a staging copy
            None => {
                let dst = self.buffer;
                self.ctx.upload_via_staging(data, |device, command_buffer, staging| unsafe {
                    let region = vk::BufferCopy::default()
                        .src_offset(0)
                        .dst_offset(offset)
                        .size(data.len() as u64);
                    device.cmd_copy_buffer(command_buffer, staging, dst, &[region]);
                })
            }
        }
    }

    fn flush(&self, range: Range<u64>) -> Result<()> {
        // Host-visible allocations are coherent and staged copies have
        // completed by the time upload returns
        engine_trace!(SOURCE, "Flushed buffer range {}..{} ({} bytes)", range.start, range.end, self.size);
        Ok(())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            if let Some(view) = self.texel_view.take() {
                self.ctx.device.destroy_buffer_view(view, None);
            }

            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                self.ctx.free_allocation(allocation);
            }

            // Destroy buffer
            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
