/// Buffer type flags, usage hint and map flags

use bitflags::bitflags;

bitflags! {
    /// GPU binding roles a buffer may serve (combinable)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        /// Index buffer (uint16 / uint32 indices)
        const INDEX = 1 << 0;
        /// Vertex attribute buffer
        const VERTEX = 1 << 1;
        /// Texel buffer (shader-readable 1-D typed array)
        const TEXEL = 1 << 2;
    }
}

bitflags! {
    /// How mapped memory is accessed
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct MapFlags: u32 {
        /// Only ranges reported through set_mapped_range_modified are flushed on unmap
        const EXPLICIT_RANGE_MODIFY = 1 << 0;
        /// Mapped memory is read back from the GPU
        const READ = 1 << 1;
    }
}

/// Update-frequency hint, used by backends to pick a memory location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Rewritten every frame
    Stream,
    /// Rewritten occasionally
    Dynamic,
    /// Written once
    #[default]
    Static,
}

/// Role, usage and mapping settings for a new buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSettings {
    pub type_flags: TypeFlags,
    pub usage: BufferUsage,
    pub map_flags: MapFlags,
}

impl BufferSettings {
    pub fn new(type_flags: TypeFlags, usage: BufferUsage) -> Self {
        Self {
            type_flags,
            usage,
            map_flags: MapFlags::empty(),
        }
    }

    pub fn with_map_flags(mut self, map_flags: MapFlags) -> Self {
        self.map_flags = map_flags;
        self
    }
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self::new(TypeFlags::VERTEX, BufferUsage::Static)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = BufferSettings::default();
        assert_eq!(settings.type_flags, TypeFlags::VERTEX);
        assert_eq!(settings.usage, BufferUsage::Static);
        assert!(settings.map_flags.is_empty());
    }

    #[test]
    fn test_type_flags_combine() {
        let flags = TypeFlags::VERTEX | TypeFlags::TEXEL;
        assert!(flags.contains(TypeFlags::VERTEX));
        assert!(flags.contains(TypeFlags::TEXEL));
        assert!(!flags.contains(TypeFlags::INDEX));
    }

    #[test]
    fn test_with_map_flags() {
        let settings = BufferSettings::new(TypeFlags::INDEX, BufferUsage::Dynamic)
            .with_map_flags(MapFlags::EXPLICIT_RANGE_MODIFY);
        assert_eq!(settings.usage, BufferUsage::Dynamic);
        assert!(settings.map_flags.contains(MapFlags::EXPLICIT_RANGE_MODIFY));
        assert!(!settings.map_flags.contains(MapFlags::READ));
    }
}
