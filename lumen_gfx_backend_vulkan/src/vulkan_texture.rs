/// Texture - Vulkan implementation of the TextureResource trait
///
/// Between operations every mip level sits in SHADER_READ_ONLY_OPTIMAL.
/// Uploads and mipmap generation move the levels they touch to transfer
/// layouts inside a one-shot submission and put them back before returning.

use lumen_gfx::lumen::{
    Error,
    Result,
    render::{Filter, TextureInfo, TextureResource, Wrap},
};
use lumen_gfx::{engine_trace, engine_warn};
use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::sync::{Arc, Mutex, PoisonError};

use crate::vulkan_context::{GpuContext, SOURCE};
use crate::vulkan_sampler::SamplerCache;

/// Current sampler state of a texture
struct SamplerState {
    filter: Filter,
    wrap: Wrap,
    sampler: vk::Sampler,
}

/// Vulkan texture implementation
pub struct Texture {
    /// Shared GPU context
    ctx: Arc<GpuContext>,
    /// Sampler cache shared with the backend
    samplers: Arc<Mutex<SamplerCache>>,
    /// Vulkan image
    pub(crate) image: vk::Image,
    /// Vulkan image view (all mip levels)
    pub(crate) view: vk::ImageView,
    /// GPU memory allocation
    pub(crate) allocation: Option<Allocation>,
    /// Read-only texture properties
    pub(crate) info: TextureInfo,
    /// Filter used by the mipmap blit chain
    blit_filter: vk::Filter,
    /// Device can sample a transparent black border
    clamp_zero_supported: bool,
    state: Mutex<SamplerState>,
}

/// Construction parameters for Texture::new
pub(crate) struct TextureParts {
    pub image: vk::Image,
    pub view: vk::ImageView,
    pub allocation: Allocation,
    pub info: TextureInfo,
    pub blit_filter: vk::Filter,
    pub clamp_zero_supported: bool,
    /// Sampler for the default filter and wrap state
    pub default_sampler: vk::Sampler,
}

impl Texture {
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        samplers: Arc<Mutex<SamplerCache>>,
        parts: TextureParts,
    ) -> Self {
        Self {
            ctx,
            samplers,
            image: parts.image,
            view: parts.view,
            allocation: Some(parts.allocation),
            info: parts.info,
            blit_filter: parts.blit_filter,
            clamp_zero_supported: parts.clamp_zero_supported,
            state: Mutex::new(SamplerState {
                filter: Filter::default(),
                wrap: Wrap::default(),
                sampler: parts.default_sampler,
            }),
        }
    }

    /// Raw Vulkan image
    pub fn image(&self) -> vk::Image {
        self.image
    }

    /// Image view covering every mip level
    pub fn view(&self) -> vk::ImageView {
        self.view
    }

    /// Sampler matching the current filter and wrap state
    pub fn sampler(&self) -> vk::Sampler {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).sampler
    }

    /// Move every mip level from UNDEFINED to SHADER_READ_ONLY_OPTIMAL
    pub(crate) fn initialize_layout(&self) -> Result<()> {
        let image = self.image;
        let levels = self.info.mip_levels;
        self.ctx.submit_one_shot(|device, command_buffer| unsafe {
            image_barrier(
                device,
                command_buffer,
                image,
                0..levels,
                (vk::ImageLayout::UNDEFINED, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL),
                (vk::AccessFlags::empty(), vk::AccessFlags::SHADER_READ),
                (vk::PipelineStageFlags::TOP_OF_PIPE, vk::PipelineStageFlags::FRAGMENT_SHADER),
            );
        })
    }

    fn set_state(&self, filter: Filter, wrap: Wrap) -> Result<()> {
        let sampler = lock_cache(&self.samplers)?.get(filter, wrap)?;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = SamplerState { filter, wrap, sampler };
        Ok(())
    }
}

fn lock_cache(samplers: &Mutex<SamplerCache>) -> Result<std::sync::MutexGuard<'_, SamplerCache>> {
    samplers
        .lock()
        .map_err(|_| lumen_gfx::engine_err!(SOURCE, "Sampler cache lock poisoned"))
}

fn invalid<T>(message: String) -> Result<T> {
    engine_warn!(SOURCE, "{}", message);
    Err(Error::InvalidArgument(message))
}

/// Record a layout transition for a range of mip levels
unsafe fn image_barrier(
    device: &ash::Device,
    command_buffer: vk::CommandBuffer,
    image: vk::Image,
    levels: std::ops::Range<u32>,
    layouts: (vk::ImageLayout, vk::ImageLayout),
    access: (vk::AccessFlags, vk::AccessFlags),
    stages: (vk::PipelineStageFlags, vk::PipelineStageFlags),
) {
    let barrier = vk::ImageMemoryBarrier::default()
        .old_layout(layouts.0)
        .new_layout(layouts.1)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: levels.start,
            level_count: levels.end - levels.start,
            base_array_layer: 0,
            layer_count: 1,
        })
        .src_access_mask(access.0)
        .dst_access_mask(access.1);

    device.cmd_pipeline_barrier(
        command_buffer,
        stages.0,
        stages.1,
        vk::DependencyFlags::empty(),
        &[],
        &[],
        &[barrier],
    );
}

fn level_extent(info: &TextureInfo, level: u32) -> (u32, u32) {
    ((info.width >> level).max(1), (info.height >> level).max(1))
}

impl TextureResource for Texture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn upload(&self, level: u32, data: &[u8]) -> Result<()> {
        let Some(expected) = self.info.level_size(level) else {
            return invalid(format!(
                "Mip level {} out of range (texture has {} levels)",
                level, self.info.mip_levels
            ));
        };
        if data.len() as u64 != expected {
            return invalid(format!(
                "Mip level {} expects {} bytes, got {}",
                level, expected, data.len()
            ));
        }

        let image = self.image;
        let (width, height) = level_extent(&self.info, level);

        self.ctx.upload_via_staging(data, |device, command_buffer, staging| unsafe {
            image_barrier(
                device,
                command_buffer,
                image,
                level..level + 1,
                (vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL, vk::ImageLayout::TRANSFER_DST_OPTIMAL),
                (vk::AccessFlags::SHADER_READ, vk::AccessFlags::TRANSFER_WRITE),
                (vk::PipelineStageFlags::FRAGMENT_SHADER, vk::PipelineStageFlags::TRANSFER),
            );

            let region = vk::BufferImageCopy::default()
                .buffer_offset(0)
                .buffer_row_length(0)
                .buffer_image_height(0)
                .image_subresource(vk::ImageSubresourceLayers {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    mip_level: level,
                    base_array_layer: 0,
                    layer_count: 1,
                })
                .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
                .image_extent(vk::Extent3D { width, height, depth: 1 });

            device.cmd_copy_buffer_to_image(
                command_buffer,
                staging,
                image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );

            image_barrier(
                device,
                command_buffer,
                image,
                level..level + 1,
                (vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL),
                (vk::AccessFlags::TRANSFER_WRITE, vk::AccessFlags::SHADER_READ),
                (vk::PipelineStageFlags::TRANSFER, vk::PipelineStageFlags::FRAGMENT_SHADER),
            );
        })?;

        engine_trace!(SOURCE, "Uploaded mip level {} ({}x{}, {} bytes)", level, width, height, data.len());
        Ok(())
    }

    fn generate_mipmaps(&self) -> Result<()> {
        if !self.info.has_mipmaps() {
            return invalid("Cannot generate mipmaps for a texture created without mipmaps".to_string());
        }

        let image = self.image;
        let info = self.info.clone();
        let mip_levels = info.mip_levels;
        let blit_filter = self.blit_filter;

        self.ctx.submit_one_shot(|device, command_buffer| unsafe {
            // All levels become blit targets
            image_barrier(
                device,
                command_buffer,
                image,
                0..mip_levels,
                (vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL, vk::ImageLayout::TRANSFER_DST_OPTIMAL),
                (vk::AccessFlags::SHADER_READ, vk::AccessFlags::TRANSFER_WRITE),
                (vk::PipelineStageFlags::FRAGMENT_SHADER, vk::PipelineStageFlags::TRANSFER),
            );

            for mip in 1..mip_levels {
                let src_mip = mip - 1;
                let (src_width, src_height) = level_extent(&info, src_mip);
                let (dst_width, dst_height) = level_extent(&info, mip);

                // Source level becomes a blit source
                image_barrier(
                    device,
                    command_buffer,
                    image,
                    src_mip..mip,
                    (vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::TRANSFER_SRC_OPTIMAL),
                    (vk::AccessFlags::TRANSFER_WRITE, vk::AccessFlags::TRANSFER_READ),
                    (vk::PipelineStageFlags::TRANSFER, vk::PipelineStageFlags::TRANSFER),
                );

                let blit = vk::ImageBlit::default()
                    .src_subresource(vk::ImageSubresourceLayers {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        mip_level: src_mip,
                        base_array_layer: 0,
                        layer_count: 1,
                    })
                    .src_offsets([
                        vk::Offset3D { x: 0, y: 0, z: 0 },
                        vk::Offset3D { x: src_width as i32, y: src_height as i32, z: 1 },
                    ])
                    .dst_subresource(vk::ImageSubresourceLayers {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        mip_level: mip,
                        base_array_layer: 0,
                        layer_count: 1,
                    })
                    .dst_offsets([
                        vk::Offset3D { x: 0, y: 0, z: 0 },
                        vk::Offset3D { x: dst_width as i32, y: dst_height as i32, z: 1 },
                    ]);

                device.cmd_blit_image(
                    command_buffer,
                    image,
                    vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                    image,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    &[blit],
                    blit_filter,
                );

                // Done with the source level
                image_barrier(
                    device,
                    command_buffer,
                    image,
                    src_mip..mip,
                    (vk::ImageLayout::TRANSFER_SRC_OPTIMAL, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL),
                    (vk::AccessFlags::TRANSFER_READ, vk::AccessFlags::SHADER_READ),
                    (vk::PipelineStageFlags::TRANSFER, vk::PipelineStageFlags::FRAGMENT_SHADER),
                );
            }

            // Last level was only written to
            image_barrier(
                device,
                command_buffer,
                image,
                mip_levels - 1..mip_levels,
                (vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL),
                (vk::AccessFlags::TRANSFER_WRITE, vk::AccessFlags::SHADER_READ),
                (vk::PipelineStageFlags::TRANSFER, vk::PipelineStageFlags::FRAGMENT_SHADER),
            );
        })?;

        engine_trace!(SOURCE, "Generated {} mip levels for {}x{} texture", mip_levels, info.width, info.height);
        Ok(())
    }

    fn set_filter(&self, filter: Filter) -> Result<()> {
        let wrap = self.wrap();
        self.set_state(filter, wrap)
    }

    fn set_wrap(&self, wrap: Wrap) -> Result<bool> {
        let (wrap, unchanged) = if self.clamp_zero_supported {
            (wrap, true)
        } else {
            wrap.without_clamp_zero()
        };
        let filter = self.filter();
        self.set_state(filter, wrap)?;
        Ok(unchanged)
    }

    fn filter(&self) -> Filter {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).filter
    }

    fn wrap(&self) -> Wrap {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).wrap
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            // Destroy image view
            self.ctx.device.destroy_image_view(self.view, None);

            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                self.ctx.free_allocation(allocation);
            }

            // Destroy image
            self.ctx.device.destroy_image(self.image, None);
        }
    }
}
