/// Conversions from lumen types to Vulkan enums and flags
///
/// Pure functions, testable without a device.

use ash::vk;
use gpu_allocator::MemoryLocation;
use lumen_gfx::lumen::buffer::{BufferUsage, TypeFlags};
use lumen_gfx::lumen::format::DataFormat;
use lumen_gfx::lumen::render::{FilterMode, PixelFormat, WrapMode};

/// Vulkan format of a buffer member (vertex attribute or texel)
///
/// Matrix and bool formats have no Vulkan buffer format and map to None;
/// the layout engine never lets them into vertex or texel buffers.
pub(crate) fn data_format_to_vk(format: DataFormat) -> Option<vk::Format> {
    let vk_format = match format {
        // Float formats
        DataFormat::Float => vk::Format::R32_SFLOAT,
        DataFormat::FloatVec2 => vk::Format::R32G32_SFLOAT,
        DataFormat::FloatVec3 => vk::Format::R32G32B32_SFLOAT,
        DataFormat::FloatVec4 => vk::Format::R32G32B32A32_SFLOAT,
        // 32-bit integer formats
        DataFormat::Int32 => vk::Format::R32_SINT,
        DataFormat::Int32Vec2 => vk::Format::R32G32_SINT,
        DataFormat::Int32Vec3 => vk::Format::R32G32B32_SINT,
        DataFormat::Int32Vec4 => vk::Format::R32G32B32A32_SINT,
        DataFormat::Uint32 => vk::Format::R32_UINT,
        DataFormat::Uint32Vec2 => vk::Format::R32G32_UINT,
        DataFormat::Uint32Vec3 => vk::Format::R32G32B32_UINT,
        DataFormat::Uint32Vec4 => vk::Format::R32G32B32A32_UINT,
        // Byte formats
        DataFormat::Snorm8Vec4 => vk::Format::R8G8B8A8_SNORM,
        DataFormat::Unorm8Vec4 => vk::Format::R8G8B8A8_UNORM,
        DataFormat::Int8Vec4 => vk::Format::R8G8B8A8_SINT,
        DataFormat::Uint8Vec4 => vk::Format::R8G8B8A8_UINT,
        // Short formats
        DataFormat::Snorm16Vec2 => vk::Format::R16G16_SNORM,
        DataFormat::Snorm16Vec4 => vk::Format::R16G16B16A16_SNORM,
        DataFormat::Unorm16Vec2 => vk::Format::R16G16_UNORM,
        DataFormat::Unorm16Vec4 => vk::Format::R16G16B16A16_UNORM,
        DataFormat::Int16Vec2 => vk::Format::R16G16_SINT,
        DataFormat::Int16Vec4 => vk::Format::R16G16B16A16_SINT,
        DataFormat::Uint16 => vk::Format::R16_UINT,
        DataFormat::Uint16Vec2 => vk::Format::R16G16_UINT,
        DataFormat::Uint16Vec4 => vk::Format::R16G16B16A16_UINT,

        DataFormat::FloatMat2x2
        | DataFormat::FloatMat2x3
        | DataFormat::FloatMat2x4
        | DataFormat::FloatMat3x2
        | DataFormat::FloatMat3x3
        | DataFormat::FloatMat3x4
        | DataFormat::FloatMat4x2
        | DataFormat::FloatMat4x3
        | DataFormat::FloatMat4x4
        | DataFormat::Bool
        | DataFormat::BoolVec2
        | DataFormat::BoolVec3
        | DataFormat::BoolVec4 => return None,
    };
    Some(vk_format)
}

/// Convert PixelFormat to Vulkan format
pub(crate) fn pixel_format_to_vk(format: PixelFormat) -> vk::Format {
    match format {
        PixelFormat::R8Unorm => vk::Format::R8_UNORM,
        PixelFormat::Rg8Unorm => vk::Format::R8G8_UNORM,
        PixelFormat::Rgba8Unorm => vk::Format::R8G8B8A8_UNORM,
        PixelFormat::Rgba8Srgb => vk::Format::R8G8B8A8_SRGB,
        PixelFormat::Rgba16Float => vk::Format::R16G16B16A16_SFLOAT,
        PixelFormat::Rgba32Float => vk::Format::R32G32B32A32_SFLOAT,
    }
}

/// Buffer usage flags for the roles a buffer serves
///
/// TRANSFER_DST is always set so static buffers can be filled by copy.
pub(crate) fn type_flags_to_vk(flags: TypeFlags) -> vk::BufferUsageFlags {
    let mut usage = vk::BufferUsageFlags::TRANSFER_DST;
    if flags.contains(TypeFlags::INDEX) {
        usage |= vk::BufferUsageFlags::INDEX_BUFFER;
    }
    if flags.contains(TypeFlags::VERTEX) {
        usage |= vk::BufferUsageFlags::VERTEX_BUFFER;
    }
    if flags.contains(TypeFlags::TEXEL) {
        usage |= vk::BufferUsageFlags::UNIFORM_TEXEL_BUFFER;
    }
    usage
}

/// Memory location for an update-frequency hint
pub(crate) fn usage_to_memory_location(usage: BufferUsage) -> MemoryLocation {
    match usage {
        BufferUsage::Stream | BufferUsage::Dynamic => MemoryLocation::CpuToGpu,
        BufferUsage::Static => MemoryLocation::GpuOnly,
    }
}

pub(crate) fn filter_mode_to_vk(mode: FilterMode) -> vk::Filter {
    match mode {
        FilterMode::Linear => vk::Filter::LINEAR,
        FilterMode::Nearest => vk::Filter::NEAREST,
    }
}

/// Mipmap mode; without mipmap filtering, sampling stays on level 0
pub(crate) fn mipmap_mode_to_vk(mode: Option<FilterMode>) -> vk::SamplerMipmapMode {
    match mode {
        Some(FilterMode::Linear) => vk::SamplerMipmapMode::LINEAR,
        Some(FilterMode::Nearest) | None => vk::SamplerMipmapMode::NEAREST,
    }
}

pub(crate) fn wrap_mode_to_vk(mode: WrapMode) -> vk::SamplerAddressMode {
    match mode {
        WrapMode::Clamp => vk::SamplerAddressMode::CLAMP_TO_EDGE,
        WrapMode::ClampZero => vk::SamplerAddressMode::CLAMP_TO_BORDER,
        WrapMode::Repeat => vk::SamplerAddressMode::REPEAT,
        WrapMode::MirroredRepeat => vk::SamplerAddressMode::MIRRORED_REPEAT,
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
