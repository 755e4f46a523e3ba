/// VulkanBackend - Vulkan implementation of the lumen Backend trait
///
/// Headless: no surface or swapchain, one queue family with graphics
/// support for transfers and mipmap blits.

use lumen_gfx::lumen::{
    Capabilities, Error, Features, Limit, Result,
    buffer::{Buffer as BufferLayout, TypeFlags},
    render::{Backend, BufferResource, TextureDesc, TextureInfo, TextureResource},
};
use lumen_gfx::{engine_bail, engine_err, engine_info, engine_warn};
use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use std::ffi::CString;
use std::sync::{Arc, Mutex};

use crate::vulkan_buffer::Buffer;
use crate::vulkan_context::{GpuContext, GpuContextParts, SOURCE};
use crate::vulkan_debug;
use crate::vulkan_format::{
    data_format_to_vk, pixel_format_to_vk, type_flags_to_vk, usage_to_memory_location,
};
use crate::vulkan_sampler::SamplerCache;
use crate::vulkan_texture::{Texture, TextureParts};

const VALIDATION_LAYER: &std::ffi::CStr = c"VK_LAYER_KHRONOS_validation";

/// Vulkan backend configuration
#[derive(Debug, Clone)]
pub struct VulkanConfig {
    /// Application name reported to the driver
    pub app_name: String,
    /// Request VK_LAYER_KHRONOS_validation (skipped with a warning if absent)
    pub enable_validation: bool,
    /// Prefer a discrete GPU over integrated ones
    pub prefer_discrete_gpu: bool,
}

impl Default for VulkanConfig {
    fn default() -> Self {
        Self {
            app_name: "Lumen Application".to_string(),
            enable_validation: cfg!(debug_assertions),
            prefer_discrete_gpu: true,
        }
    }
}

/// Vulkan backend
pub struct VulkanBackend {
    ctx: Arc<GpuContext>,
    samplers: Arc<Mutex<SamplerCache>>,
    capabilities: Capabilities,
    device_name: String,
}

impl VulkanBackend {
    /// Create a headless Vulkan backend
    ///
    /// # Errors
    ///
    /// `BackendError` if the loader, instance, device or allocator cannot
    /// be created, or if no GPU with a graphics queue is found.
    pub fn new(config: VulkanConfig) -> Result<Self> {
        unsafe {
            // Create Vulkan Entry
            let entry = ash::Entry::load()
                .map_err(|e| engine_err!(SOURCE, "Failed to load Vulkan library: {:?}", e))?;

            // Application Info
            let app_name = CString::new(config.app_name.as_str())
                .map_err(|e| engine_err!(SOURCE, "Invalid application name: {}", e))?;
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, 1, 0, 0))
                .engine_name(c"Lumen")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_1);

            // Validation layers
            let mut enable_validation = config.enable_validation || cfg!(feature = "vulkan-validation");
            if enable_validation && !Self::validation_layer_available(&entry) {
                engine_warn!(SOURCE, "Validation requested but {:?} is not installed", VALIDATION_LAYER);
                enable_validation = false;
            }

            let layer_names = if enable_validation { vec![VALIDATION_LAYER.as_ptr()] } else { vec![] };
            let extension_names = if enable_validation {
                vec![ash::ext::debug_utils::NAME.as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create Vulkan instance: {:?}", e))?;

            // Setup debug messenger if validation is enabled
            let (debug_utils_loader, debug_messenger) = if enable_validation {
                let debug_utils = ash::ext::debug_utils::Instance::new(&entry, &instance);
                let messenger = debug_utils
                    .create_debug_utils_messenger(&vulkan_debug::messenger_create_info(), None)
                    .map_err(|e| engine_err!(SOURCE, "Failed to create debug messenger: {:?}", e))?;
                (Some(debug_utils), Some(messenger))
            } else {
                (None, None)
            };

            // Pick Physical Device
            let physical_devices = instance
                .enumerate_physical_devices()
                .map_err(|e| engine_err!(SOURCE, "Failed to enumerate physical devices: {:?}", e))?;

            let candidates: Vec<DeviceCandidate> = physical_devices
                .iter()
                .map(|&physical_device| {
                    let properties = instance.get_physical_device_properties(physical_device);
                    let queue_family = instance
                        .get_physical_device_queue_family_properties(physical_device)
                        .iter()
                        .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                        .map(|i| i as u32);
                    DeviceCandidate { device_type: properties.device_type, queue_family }
                })
                .collect();

            let Some(selected) = pick_device(&candidates, config.prefer_discrete_gpu) else {
                engine_bail!(SOURCE, "No Vulkan-capable GPU with a graphics queue found");
            };
            let physical_device = physical_devices[selected];
            let Some(queue_family) = candidates[selected].queue_family else {
                engine_bail!(SOURCE, "Selected GPU has no graphics queue family");
            };

            let properties = instance.get_physical_device_properties(physical_device);
            let device_name = properties
                .device_name_as_c_str()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "unknown device".to_string());

            // Create Logical Device
            let supported_features = instance.get_physical_device_features(physical_device);
            let anisotropy_enabled = supported_features.sampler_anisotropy == vk::TRUE;

            let queue_priorities = [1.0];
            let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
                .queue_family_index(queue_family)
                .queue_priorities(&queue_priorities)];

            let device_features = vk::PhysicalDeviceFeatures::default()
                .sampler_anisotropy(anisotropy_enabled);

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_features(&device_features);

            let device = instance
                .create_device(physical_device, &device_create_info, None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create logical device: {:?}", e))?;

            let queue = device.get_device_queue(queue_family, 0);

            // Create GPU allocator
            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            })
            .map_err(|e| engine_err!(SOURCE, "Failed to create GPU allocator: {:?}", e))?;

            // Create upload command pool (TRANSIENT + RESET for reusable one-shot uploads)
            let upload_pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(queue_family)
                .flags(vk::CommandPoolCreateFlags::TRANSIENT | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let upload_command_pool = device.create_command_pool(&upload_pool_create_info, None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create upload command pool: {:?}", e))?;

            // GpuContext owns device, instance, and debug messenger destruction
            let ctx = Arc::new(GpuContext::new(GpuContextParts {
                entry,
                instance,
                physical_device,
                device,
                allocator,
                queue,
                queue_family,
                upload_command_pool,
                limits: properties.limits,
                anisotropy_enabled,
                debug_utils_loader,
                debug_messenger,
            }));

            let capabilities = capabilities_from_limits(&properties.limits);
            let samplers = Arc::new(Mutex::new(SamplerCache::new(Arc::clone(&ctx))));

            engine_info!(
                SOURCE,
                "Vulkan backend ready on {} (queue family: {}, validation: {}, max texel buffer elements: {})",
                device_name,
                ctx.queue_family,
                enable_validation,
                capabilities.limit(Limit::TexelBufferSize)
            );

            Ok(Self {
                ctx,
                samplers,
                capabilities,
                device_name,
            })
        }
    }

    fn validation_layer_available(entry: &ash::Entry) -> bool {
        unsafe { entry.enumerate_instance_layer_properties() }
            .map(|layers| {
                layers
                    .iter()
                    .any(|layer| layer.layer_name_as_c_str().map_or(false, |name| name == VALIDATION_LAYER))
            })
            .unwrap_or(false)
    }

    /// Name reported by the selected physical device
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Number of distinct samplers created so far
    /// Queue family every submission goes to
    pub fn queue_family(&self) -> u32 {
        self.ctx.queue_family
    }

    pub fn sampler_count(&self) -> usize {
        self.samplers.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    fn format_features(&self, format: vk::Format) -> vk::FormatProperties {
        unsafe {
            self.ctx.instance.get_physical_device_format_properties(self.ctx.physical_device, format)
        }
    }

    fn lock_samplers(&self) -> Result<std::sync::MutexGuard<'_, SamplerCache>> {
        self.samplers
            .lock()
            .map_err(|_| engine_err!(SOURCE, "Sampler cache lock poisoned"))
    }
}

impl Backend for VulkanBackend {
    fn name(&self) -> &str {
        "vulkan"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn create_buffer(&mut self, layout: &BufferLayout, data: Option<&[u8]>) -> Result<Arc<dyn BufferResource>> {
        if let Some(data) = data {
            if data.len() as u64 > layout.size() {
                engine_warn!(SOURCE, "Initial data ({} bytes) larger than buffer ({} bytes)", data.len(), layout.size());
                return Err(Error::InvalidArgument(format!(
                    "Initial data ({} bytes) larger than buffer ({} bytes)",
                    data.len(),
                    layout.size()
                )));
            }
        }

        // Texel buffers need a view format the device can read
        let texel_format = if layout.type_flags().contains(TypeFlags::TEXEL) {
            let Some(format) = layout.data_member(0).and_then(|member| data_format_to_vk(member.format())) else {
                engine_warn!(SOURCE, "Texel buffer member format has no Vulkan equivalent");
                return Err(Error::InvalidFormat(
                    "Texel buffer member format has no Vulkan equivalent".to_string(),
                ));
            };
            let features = self.format_features(format).buffer_features;
            if !features.contains(vk::FormatFeatureFlags::UNIFORM_TEXEL_BUFFER) {
                engine_warn!(SOURCE, "Device cannot read {:?} through a texel buffer", format);
                return Err(Error::UnsupportedFeature(format!(
                    "Device cannot read {:?} through a texel buffer",
                    format
                )));
            }
            Some(format)
        } else {
            None
        };

        unsafe {
            // Create buffer
            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(layout.size())
                .usage(type_flags_to_vk(layout.type_flags()))
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = self.ctx.device.create_buffer(&buffer_create_info, None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create buffer of size {} bytes: {:?}", layout.size(), e))?;

            // Allocate and bind memory
            let location = usage_to_memory_location(layout.usage());
            let allocation = match self.ctx.allocate_buffer_memory(buffer, "buffer", location) {
                Ok(allocation) => allocation,
                Err(e) => {
                    self.ctx.device.destroy_buffer(buffer, None);
                    return Err(e);
                }
            };

            // From here on, Drop releases everything
            let mut gpu_buffer = Buffer::new(Arc::clone(&self.ctx), buffer, allocation, layout.size());

            if let Some(format) = texel_format {
                gpu_buffer.create_texel_view(format)?;
            }
            if let Some(data) = data {
                gpu_buffer.upload(0, data)?;
            }

            Ok(Arc::new(gpu_buffer))
        }
    }

    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn TextureResource>> {
        let format = pixel_format_to_vk(desc.format);
        let info = TextureInfo::from_desc(&desc);
        let default_sampler = self.lock_samplers()?.get(Default::default(), Default::default())?;

        let blit_filter = if self
            .format_features(format)
            .optimal_tiling_features
            .contains(vk::FormatFeatureFlags::SAMPLED_IMAGE_FILTER_LINEAR)
        {
            vk::Filter::LINEAR
        } else {
            vk::Filter::NEAREST
        };

        let mut usage_flags = vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST;
        if info.has_mipmaps() {
            usage_flags |= vk::ImageUsageFlags::TRANSFER_SRC;
        }

        let texture = unsafe {
            // Create image
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(format)
                .extent(vk::Extent3D {
                    width: desc.width,
                    height: desc.height,
                    depth: 1,
                })
                .mip_levels(info.mip_levels)
                .array_layers(1)
                .samples(vk::SampleCountFlags::TYPE_1)
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(usage_flags)
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);

            let image = self.ctx.device.create_image(&image_create_info, None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create texture image: {:?}", e))?;

            let allocation = match self.ctx.allocate_image_memory(image, "texture") {
                Ok(allocation) => allocation,
                Err(e) => {
                    self.ctx.device.destroy_image(image, None);
                    return Err(e);
                }
            };

            // Create image view
            let view_create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .components(vk::ComponentMapping {
                    r: vk::ComponentSwizzle::IDENTITY,
                    g: vk::ComponentSwizzle::IDENTITY,
                    b: vk::ComponentSwizzle::IDENTITY,
                    a: vk::ComponentSwizzle::IDENTITY,
                })
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    base_mip_level: 0,
                    level_count: info.mip_levels,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            let view = match self.ctx.device.create_image_view(&view_create_info, None) {
                Ok(view) => view,
                Err(e) => {
                    self.ctx.free_allocation(allocation);
                    self.ctx.device.destroy_image(image, None);
                    engine_bail!(SOURCE, "Failed to create texture image view: {:?}", e);
                }
            };

            Texture::new(
                Arc::clone(&self.ctx),
                Arc::clone(&self.samplers),
                TextureParts {
                    image,
                    view,
                    allocation,
                    info,
                    blit_filter,
                    clamp_zero_supported: self.capabilities.supports(Features::CLAMP_ZERO),
                    default_sampler,
                },
            )
        };

        texture.initialize_layout()?;
        if let Some(data) = &desc.data {
            texture.upload(0, data)?;
            if desc.mipmaps {
                texture.generate_mipmaps()?;
            }
        }

        Ok(Arc::new(texture))
    }
}

impl Drop for VulkanBackend {
    fn drop(&mut self) {
        // Resources still alive keep the device through their GpuContext
        unsafe {
            self.ctx.device.device_wait_idle().ok();
        }
    }
}

// ===== DEVICE SELECTION =====

/// What device selection needs to know about a physical device
#[derive(Debug, Clone, Copy)]
pub(crate) struct DeviceCandidate {
    pub device_type: vk::PhysicalDeviceType,
    /// First queue family with graphics support
    pub queue_family: Option<u32>,
}

/// Index of the device to use
///
/// Devices without a graphics queue are skipped. With `prefer_discrete`,
/// the first discrete GPU wins; otherwise the first usable device.
pub(crate) fn pick_device(candidates: &[DeviceCandidate], prefer_discrete: bool) -> Option<usize> {
    let mut usable = candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| candidate.queue_family.is_some());

    if prefer_discrete {
        let discrete = usable
            .clone()
            .find(|(_, candidate)| candidate.device_type == vk::PhysicalDeviceType::DISCRETE_GPU);
        if let Some((index, _)) = discrete {
            return Some(index);
        }
    }
    usable.next().map(|(index, _)| index)
}

// ===== CAPABILITIES =====

/// Capability snapshot for a Vulkan device
///
/// Every optional lumen feature is core in Vulkan 1.1; limits come from
/// VkPhysicalDeviceLimits.
pub(crate) fn capabilities_from_limits(limits: &vk::PhysicalDeviceLimits) -> Capabilities {
    Capabilities::new()
        .with_features(
            Features::GLSL3
                | Features::GLSL4
                | Features::TEXEL_BUFFER
                | Features::INSTANCING
                | Features::COPY_BUFFER
                | Features::CLAMP_ZERO,
        )
        .with_limit(Limit::TexelBufferSize, limits.max_texel_buffer_elements as u64)
        .with_limit(Limit::TextureSize, limits.max_image_dimension2_d as u64)
        .with_limit(Limit::VertexAttributes, limits.max_vertex_input_attributes as u64)
        .with_limit(Limit::PointSize, limits.point_size_range[1] as u64)
}
