/// Texture descriptor, texture info, sampler state and the texture trait

use crate::error::Result;

// ===== PIXEL FORMAT =====

/// Texel formats accepted by `Backend::create_texture`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    R8Unorm,
    Rg8Unorm,
    Rgba8Unorm,
    Rgba8Srgb,
    Rgba16Float,
    Rgba32Float,
}

impl PixelFormat {
    /// Bytes per texel
    pub fn bytes_per_pixel(self) -> u64 {
        match self {
            PixelFormat::R8Unorm => 1,
            PixelFormat::Rg8Unorm => 2,
            PixelFormat::Rgba8Unorm | PixelFormat::Rgba8Srgb => 4,
            PixelFormat::Rgba16Float => 8,
            PixelFormat::Rgba32Float => 16,
        }
    }
}

/// Number of levels in a full mip chain: floor(log2(max(w, h))) + 1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

/// Byte size of one mip level
pub fn level_size(width: u32, height: u32, level: u32, format: PixelFormat) -> u64 {
    let w = (width >> level).max(1) as u64;
    let h = (height >> level).max(1) as u64;
    w * h * format.bytes_per_pixel()
}

// ===== SAMPLER STATE =====

/// Texel interpolation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    #[default]
    Linear,
    Nearest,
}

/// Minification, magnification and mipmap filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Filter {
    pub min: FilterMode,
    pub mag: FilterMode,
    /// None disables sampling between mip levels
    pub mipmap: Option<FilterMode>,
    /// 1 disables anisotropic filtering
    pub max_anisotropy: u16,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            min: FilterMode::Linear,
            mag: FilterMode::Linear,
            mipmap: None,
            max_anisotropy: 1,
        }
    }
}

/// Addressing outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    #[default]
    Clamp,
    /// Clamp to transparent black (needs `Features::CLAMP_ZERO`)
    ClampZero,
    Repeat,
    MirroredRepeat,
}

/// Wrap mode per texture axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Wrap {
    pub s: WrapMode,
    pub t: WrapMode,
}

impl Wrap {
    pub fn new(s: WrapMode, t: WrapMode) -> Self {
        Self { s, t }
    }

    /// Replace ClampZero by Clamp; the bool is true if nothing changed
    pub fn without_clamp_zero(self) -> (Self, bool) {
        let downgrade = |mode| if mode == WrapMode::ClampZero { WrapMode::Clamp } else { mode };
        let wrap = Self::new(downgrade(self.s), downgrade(self.t));
        (wrap, wrap == self)
    }
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: PixelFormat,
    /// Allocate a full mip chain
    pub mipmaps: bool,
    /// Optional level 0 pixels, exactly width * height * bytes_per_pixel
    pub data: Option<Vec<u8>>,
}

// ===== TEXTURE INFO =====

/// Read-only properties of a created texture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// 1 when created without mipmaps
    pub mip_levels: u32,
}

impl TextureInfo {
    pub fn from_desc(desc: &TextureDesc) -> Self {
        Self {
            width: desc.width,
            height: desc.height,
            format: desc.format,
            mip_levels: if desc.mipmaps { mip_level_count(desc.width, desc.height) } else { 1 },
        }
    }

    pub fn has_mipmaps(&self) -> bool {
        self.mip_levels > 1
    }

    /// Byte size of `level`, or None past the last level
    pub fn level_size(&self, level: u32) -> Option<u64> {
        (level < self.mip_levels).then(|| level_size(self.width, self.height, level, self.format))
    }
}

// ===== TEXTURE TRAIT =====

/// Device texture with mutable sampler state
///
/// Implemented by backend-specific texture types (e.g., VulkanTexture).
/// The texture is destroyed when dropped.
pub trait TextureResource: Send + Sync {
    fn info(&self) -> &TextureInfo;

    /// Replace one mip level with tightly packed pixels
    fn upload(&self, level: u32, data: &[u8]) -> Result<()>;

    /// Rebuild levels 1.. from level 0
    ///
    /// Fails with `InvalidArgument` on a texture without mipmaps.
    fn generate_mipmaps(&self) -> Result<()>;

    fn set_filter(&self, filter: Filter) -> Result<()>;

    /// Change wrap modes
    ///
    /// Returns `Ok(false)` when a mode the device lacks was replaced by a
    /// supported one.
    fn set_wrap(&self, wrap: Wrap) -> Result<bool>;

    fn filter(&self) -> Filter;

    fn wrap(&self) -> Wrap;
}

#[cfg(test)]
#[path = "backend_texture_tests.rs"]
mod tests;
