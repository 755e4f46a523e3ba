/// SamplerCache - internal VkSampler management for the Vulkan backend
///
/// Textures keep their filter and wrap state as plain values; the matching
/// VkSampler is created on first use and shared by every texture with the
/// same state. Applications typically touch a handful of combinations.

use crate::vulkan_context::{GpuContext, SOURCE};
use crate::vulkan_format::{filter_mode_to_vk, mipmap_mode_to_vk, wrap_mode_to_vk};
use ash::vk;
use lumen_gfx::engine_err;
use lumen_gfx::lumen::render::{Filter, Wrap, WrapMode};
use lumen_gfx::lumen::Result;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Sampler state key
pub(crate) type SamplerKey = (Filter, Wrap);

/// Max LOD when mipmap filtering is off: sampling stays on level 0
const NO_MIPMAP_MAX_LOD: f32 = 0.25;

/// Internal sampler cache - creates VkSampler on first use, destroys on drop
pub(crate) struct SamplerCache {
    ctx: Arc<GpuContext>,
    cache: FxHashMap<SamplerKey, vk::Sampler>,
}

impl SamplerCache {
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Self {
        Self {
            ctx,
            cache: FxHashMap::default(),
        }
    }

    /// Get or create the VkSampler for a filter/wrap pair
    pub(crate) fn get(&mut self, filter: Filter, wrap: Wrap) -> Result<vk::Sampler> {
        if let Some(&sampler) = self.cache.get(&(filter, wrap)) {
            return Ok(sampler);
        }

        let create_info = sampler_create_info(
            filter,
            wrap,
            self.ctx.anisotropy_enabled,
            self.ctx.limits.max_sampler_anisotropy,
        );

        let sampler = unsafe {
            self.ctx.device.create_sampler(&create_info, None)
                .map_err(|e| engine_err!(SOURCE, "Failed to create VkSampler for {:?} {:?}: {:?}", filter, wrap, e))?
        };
        self.cache.insert((filter, wrap), sampler);
        Ok(sampler)
    }

    /// Number of distinct samplers created so far
    pub(crate) fn len(&self) -> usize {
        self.cache.len()
    }
}

impl Drop for SamplerCache {
    fn drop(&mut self) {
        for (_, sampler) in self.cache.drain() {
            unsafe { self.ctx.device.destroy_sampler(sampler, None); }
        }
    }
}

/// Build the create info for a filter/wrap pair
///
/// Anisotropy is clamped to the device maximum and disabled when the
/// device feature is off or the requested level is 1.
pub(crate) fn sampler_create_info(
    filter: Filter,
    wrap: Wrap,
    anisotropy_supported: bool,
    max_device_anisotropy: f32,
) -> vk::SamplerCreateInfo<'static> {
    let max_lod = if filter.mipmap.is_some() { vk::LOD_CLAMP_NONE } else { NO_MIPMAP_MAX_LOD };

    // Only ClampZero samples the border
    let uses_border = wrap.s == WrapMode::ClampZero || wrap.t == WrapMode::ClampZero;
    let border = if uses_border {
        vk::BorderColor::FLOAT_TRANSPARENT_BLACK
    } else {
        vk::BorderColor::FLOAT_OPAQUE_BLACK
    };

    let create_info = vk::SamplerCreateInfo::default()
        .mag_filter(filter_mode_to_vk(filter.mag))
        .min_filter(filter_mode_to_vk(filter.min))
        .mipmap_mode(mipmap_mode_to_vk(filter.mipmap))
        .address_mode_u(wrap_mode_to_vk(wrap.s))
        .address_mode_v(wrap_mode_to_vk(wrap.t))
        .address_mode_w(vk::SamplerAddressMode::CLAMP_TO_EDGE)
        .mip_lod_bias(0.0)
        .min_lod(0.0)
        .max_lod(max_lod)
        .border_color(border)
        .compare_enable(false)
        .compare_op(vk::CompareOp::ALWAYS)
        .unnormalized_coordinates(false);

    let anisotropy = (filter.max_anisotropy as f32).min(max_device_anisotropy);
    if anisotropy_supported && anisotropy > 1.0 {
        create_info.anisotropy_enable(true).max_anisotropy(anisotropy)
    } else {
        create_info.anisotropy_enable(false).max_anisotropy(1.0)
    }
}
