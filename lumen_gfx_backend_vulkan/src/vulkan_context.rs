/// GpuContext - Shared device state for all Vulkan resources
///
/// Contains everything a resource needs after creation:
/// - Device for Vulkan API calls
/// - Allocator for memory management
/// - Queue and command pool for one-shot transfer submissions
///
/// Every buffer, texture and sampler cache holds an `Arc<GpuContext>`, so the
/// device outlives all of its resources and is destroyed with the last one.

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator};
use gpu_allocator::MemoryLocation;
use lumen_gfx::lumen::{Error, Result};
use lumen_gfx::{engine_err, engine_error};
use std::mem::ManuallyDrop;
use std::sync::{Mutex, MutexGuard};

pub(crate) const SOURCE: &str = "lumen::vulkan";

/// Shared GPU context
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator
    /// Wrapped in ManuallyDrop so its memory pages are freed BEFORE the device is destroyed
    allocator: ManuallyDrop<Mutex<Allocator>>,

    /// Queue used for transfers and mipmap blits
    pub queue: vk::Queue,

    /// Queue family index of `queue`
    pub queue_family: u32,

    /// Reusable command pool for one-shot uploads
    /// (created with TRANSIENT + RESET_COMMAND_BUFFER flags)
    upload_command_pool: Mutex<vk::CommandPool>,

    /// Selected physical device
    pub physical_device: vk::PhysicalDevice,

    /// Device limits queried at startup
    pub limits: vk::PhysicalDeviceLimits,

    /// True if the samplerAnisotropy feature was enabled on the device
    pub anisotropy_enabled: bool,

    pub(crate) instance: ash::Instance,

    /// Loader must outlive the instance
    _entry: ash::Entry,

    /// Debug utils loader (when validation is enabled)
    debug_utils_loader: Option<ash::ext::debug_utils::Instance>,

    /// Debug messenger handle
    debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

/// Everything GpuContext::new takes ownership of
pub(crate) struct GpuContextParts {
    pub entry: ash::Entry,
    pub instance: ash::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device: ash::Device,
    pub allocator: Allocator,
    pub queue: vk::Queue,
    pub queue_family: u32,
    pub upload_command_pool: vk::CommandPool,
    pub limits: vk::PhysicalDeviceLimits,
    pub anisotropy_enabled: bool,
    pub debug_utils_loader: Option<ash::ext::debug_utils::Instance>,
    pub debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl GpuContext {
    pub(crate) fn new(parts: GpuContextParts) -> Self {
        Self {
            device: parts.device,
            allocator: ManuallyDrop::new(Mutex::new(parts.allocator)),
            queue: parts.queue,
            queue_family: parts.queue_family,
            upload_command_pool: Mutex::new(parts.upload_command_pool),
            physical_device: parts.physical_device,
            limits: parts.limits,
            anisotropy_enabled: parts.anisotropy_enabled,
            instance: parts.instance,
            _entry: parts.entry,
            debug_utils_loader: parts.debug_utils_loader,
            debug_messenger: parts.debug_messenger,
        }
    }

    /// Lock the allocator
    pub(crate) fn lock_allocator(&self) -> Result<MutexGuard<'_, Allocator>> {
        self.allocator
            .lock()
            .map_err(|_| engine_err!(SOURCE, "GPU allocator lock poisoned"))
    }

    /// Allocate and bind memory for a buffer
    ///
    /// Allocation failures are reported as `Error::OutOfMemory`.
    pub(crate) fn allocate_buffer_memory(
        &self,
        buffer: vk::Buffer,
        name: &str,
        location: MemoryLocation,
    ) -> Result<Allocation> {
        unsafe {
            let requirements = self.device.get_buffer_memory_requirements(buffer);

            let allocation = self.lock_allocator()?
                .allocate(&AllocationCreateDesc {
                    name,
                    requirements,
                    location,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|_e| {
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    engine_error!(SOURCE, "Out of GPU memory for {} (required: {:.2} MB)", name, size_mb);
                    Error::OutOfMemory
                })?;

            if let Err(e) = self.device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset()) {
                self.free_allocation(allocation);
                return Err(engine_err!(SOURCE, "Failed to bind {} memory: {:?}", name, e));
            }

            Ok(allocation)
        }
    }

    /// Allocate and bind device-local memory for an image
    pub(crate) fn allocate_image_memory(&self, image: vk::Image, name: &str) -> Result<Allocation> {
        unsafe {
            let requirements = self.device.get_image_memory_requirements(image);

            let allocation = self.lock_allocator()?
                .allocate(&AllocationCreateDesc {
                    name,
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|_e| {
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    engine_error!(SOURCE, "Out of GPU memory for {} (required: {:.2} MB)", name, size_mb);
                    Error::OutOfMemory
                })?;

            if let Err(e) = self.device.bind_image_memory(image, allocation.memory(), allocation.offset()) {
                self.free_allocation(allocation);
                return Err(engine_err!(SOURCE, "Failed to bind {} memory: {:?}", name, e));
            }

            Ok(allocation)
        }
    }

    /// Return an allocation to the allocator
    ///
    /// Never fails: called from Drop impls, a poisoned lock leaks the block.
    pub(crate) fn free_allocation(&self, allocation: Allocation) {
        if let Ok(mut allocator) = self.allocator.lock() {
            allocator.free(allocation).ok();
        }
    }

    /// Record commands into a one-shot command buffer and wait for completion
    ///
    /// The upload pool lock is held for the whole submission.
    pub(crate) fn submit_one_shot<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        let pool = self.upload_command_pool
            .lock()
            .map_err(|_| engine_err!(SOURCE, "Upload command pool lock poisoned"))?;

        unsafe {
            let alloc_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(*pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffer = self.device.allocate_command_buffers(&alloc_info)
                .map_err(|e| engine_err!(SOURCE, "Failed to allocate upload command buffer: {:?}", e))?[0];

            let result = self.record_and_submit(command_buffer, record);

            self.device.free_command_buffers(*pool, &[command_buffer]);
            result
        }
    }

    unsafe fn record_and_submit<F>(&self, command_buffer: vk::CommandBuffer, record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer),
    {
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        self.device.begin_command_buffer(command_buffer, &begin_info)
            .map_err(|e| engine_err!(SOURCE, "Failed to begin upload command buffer: {:?}", e))?;

        record(&self.device, command_buffer);

        self.device.end_command_buffer(command_buffer)
            .map_err(|e| engine_err!(SOURCE, "Failed to end upload command buffer: {:?}", e))?;

        let command_buffers = [command_buffer];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);

        self.device.queue_submit(self.queue, &[submit_info], vk::Fence::null())
            .map_err(|e| engine_err!(SOURCE, "Failed to submit upload commands: {:?}", e))?;

        self.device.queue_wait_idle(self.queue)
            .map_err(|e| engine_err!(SOURCE, "Failed to wait for upload completion: {:?}", e))?;

        Ok(())
    }

    /// Copy `data` into a host-visible staging buffer, then run `record`
    /// with that buffer as transfer source in a one-shot submission
    pub(crate) fn upload_via_staging<F>(&self, data: &[u8], record: F) -> Result<()>
    where
        F: FnOnce(&ash::Device, vk::CommandBuffer, vk::Buffer),
    {
        let staging = StagingBuffer::new(self, data)?;
        let buffer = staging.buffer;
        self.submit_one_shot(|device, command_buffer| record(device, command_buffer, buffer))
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            // 1. Upload command pool
            if let Ok(pool) = self.upload_command_pool.get_mut() {
                if *pool != vk::CommandPool::null() {
                    self.device.destroy_command_pool(*pool, None);
                    *pool = vk::CommandPool::null();
                }
            }

            // 2. Allocator: free VkDeviceMemory pages BEFORE destroying the device
            ManuallyDrop::drop(&mut self.allocator);

            // 3. Debug messenger BEFORE device and instance
            if let (Some(debug_utils), Some(messenger)) = (&self.debug_utils_loader, self.debug_messenger) {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            // 4. Device and instance
            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}

// ===== STAGING BUFFER =====

/// Host-visible transfer source, freed on drop
struct StagingBuffer<'a> {
    ctx: &'a GpuContext,
    buffer: vk::Buffer,
    allocation: Option<Allocation>,
}

impl<'a> StagingBuffer<'a> {
    fn new(ctx: &'a GpuContext, data: &[u8]) -> Result<Self> {
        unsafe {
            let create_info = vk::BufferCreateInfo::default()
                .size(data.len().max(1) as u64)
                .usage(vk::BufferUsageFlags::TRANSFER_SRC)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = ctx.device.create_buffer(&create_info, None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create staging buffer of {} bytes: {:?}", data.len(), e))?;

            let mut staging = Self { ctx, buffer, allocation: None };
            staging.allocation = Some(ctx.allocate_buffer_memory(buffer, "staging_buffer", MemoryLocation::CpuToGpu)?);

            let mapped_ptr = staging.allocation
                .as_ref()
                .and_then(|allocation| allocation.mapped_ptr())
                .ok_or_else(|| engine_err!(SOURCE, "Staging buffer is not CPU-accessible"))?
                .as_ptr() as *mut u8;
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped_ptr, data.len());

            Ok(staging)
        }
    }
}

impl Drop for StagingBuffer<'_> {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.take() {
            self.ctx.free_allocation(allocation);
        }
        unsafe {
            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
