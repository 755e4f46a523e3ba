//! Unit tests for Vulkan format conversion functions
//!
//! Tests pure conversion functions without requiring GPU.

use super::*;

// ============================================================================
// DATA FORMAT CONVERSION TESTS
// ============================================================================

#[test]
fn test_data_format_to_vk_float_formats() {
    assert_eq!(data_format_to_vk(DataFormat::Float), Some(vk::Format::R32_SFLOAT));
    assert_eq!(data_format_to_vk(DataFormat::FloatVec2), Some(vk::Format::R32G32_SFLOAT));
    assert_eq!(data_format_to_vk(DataFormat::FloatVec3), Some(vk::Format::R32G32B32_SFLOAT));
    assert_eq!(data_format_to_vk(DataFormat::FloatVec4), Some(vk::Format::R32G32B32A32_SFLOAT));
}

#[test]
fn test_data_format_to_vk_integer_formats() {
    assert_eq!(data_format_to_vk(DataFormat::Int32Vec3), Some(vk::Format::R32G32B32_SINT));
    assert_eq!(data_format_to_vk(DataFormat::Uint32), Some(vk::Format::R32_UINT));
    assert_eq!(data_format_to_vk(DataFormat::Int8Vec4), Some(vk::Format::R8G8B8A8_SINT));
    assert_eq!(data_format_to_vk(DataFormat::Uint16), Some(vk::Format::R16_UINT));
    assert_eq!(data_format_to_vk(DataFormat::Int16Vec2), Some(vk::Format::R16G16_SINT));
}

#[test]
fn test_data_format_to_vk_normalized_formats() {
    assert_eq!(data_format_to_vk(DataFormat::Unorm8Vec4), Some(vk::Format::R8G8B8A8_UNORM));
    assert_eq!(data_format_to_vk(DataFormat::Snorm8Vec4), Some(vk::Format::R8G8B8A8_SNORM));
    assert_eq!(data_format_to_vk(DataFormat::Unorm16Vec2), Some(vk::Format::R16G16_UNORM));
    assert_eq!(data_format_to_vk(DataFormat::Snorm16Vec4), Some(vk::Format::R16G16B16A16_SNORM));
}

#[test]
fn test_data_format_to_vk_unmapped_formats() {
    for format in DataFormat::ALL {
        let info = format.info();
        let unmapped = info.is_matrix || info.base_type == lumen_gfx::lumen::format::DataBaseType::Bool;
        assert_eq!(data_format_to_vk(format).is_none(), unmapped, "{}", format);
    }
}

// ============================================================================
// PIXEL FORMAT CONVERSION TESTS
// ============================================================================

#[test]
fn test_pixel_format_to_vk() {
    assert_eq!(pixel_format_to_vk(PixelFormat::R8Unorm), vk::Format::R8_UNORM);
    assert_eq!(pixel_format_to_vk(PixelFormat::Rg8Unorm), vk::Format::R8G8_UNORM);
    assert_eq!(pixel_format_to_vk(PixelFormat::Rgba8Unorm), vk::Format::R8G8B8A8_UNORM);
    assert_eq!(pixel_format_to_vk(PixelFormat::Rgba8Srgb), vk::Format::R8G8B8A8_SRGB);
    assert_eq!(pixel_format_to_vk(PixelFormat::Rgba16Float), vk::Format::R16G16B16A16_SFLOAT);
    assert_eq!(pixel_format_to_vk(PixelFormat::Rgba32Float), vk::Format::R32G32B32A32_SFLOAT);
}

// ============================================================================
// BUFFER USAGE TESTS
// ============================================================================

#[test]
fn test_type_flags_to_vk() {
    assert_eq!(
        type_flags_to_vk(TypeFlags::VERTEX),
        vk::BufferUsageFlags::VERTEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST
    );
    assert_eq!(
        type_flags_to_vk(TypeFlags::INDEX),
        vk::BufferUsageFlags::INDEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST
    );

    let combined = type_flags_to_vk(TypeFlags::VERTEX | TypeFlags::TEXEL);
    assert!(combined.contains(vk::BufferUsageFlags::VERTEX_BUFFER));
    assert!(combined.contains(vk::BufferUsageFlags::UNIFORM_TEXEL_BUFFER));
    assert!(!combined.contains(vk::BufferUsageFlags::INDEX_BUFFER));
}

#[test]
fn test_usage_to_memory_location() {
    assert_eq!(usage_to_memory_location(BufferUsage::Stream), MemoryLocation::CpuToGpu);
    assert_eq!(usage_to_memory_location(BufferUsage::Dynamic), MemoryLocation::CpuToGpu);
    assert_eq!(usage_to_memory_location(BufferUsage::Static), MemoryLocation::GpuOnly);
}

// ============================================================================
// SAMPLER STATE TESTS
// ============================================================================

#[test]
fn test_filter_mode_to_vk() {
    assert_eq!(filter_mode_to_vk(FilterMode::Linear), vk::Filter::LINEAR);
    assert_eq!(filter_mode_to_vk(FilterMode::Nearest), vk::Filter::NEAREST);
    assert_eq!(mipmap_mode_to_vk(Some(FilterMode::Linear)), vk::SamplerMipmapMode::LINEAR);
    assert_eq!(mipmap_mode_to_vk(None), vk::SamplerMipmapMode::NEAREST);
}

#[test]
fn test_wrap_mode_to_vk() {
    assert_eq!(wrap_mode_to_vk(WrapMode::Clamp), vk::SamplerAddressMode::CLAMP_TO_EDGE);
    assert_eq!(wrap_mode_to_vk(WrapMode::ClampZero), vk::SamplerAddressMode::CLAMP_TO_BORDER);
    assert_eq!(wrap_mode_to_vk(WrapMode::Repeat), vk::SamplerAddressMode::REPEAT);
    assert_eq!(wrap_mode_to_vk(WrapMode::MirroredRepeat), vk::SamplerAddressMode::MIRRORED_REPEAT);
}
