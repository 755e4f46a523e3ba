/// Backend capability snapshot (feature flags + numeric limits)
///
/// Reported once by a backend and borrowed read-only by the layout engine.

use bitflags::bitflags;
use rustc_hash::FxHashMap;

bitflags! {
    /// Optional features a backend may support
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Features: u32 {
        /// GLSL 3 level shaders (integer vertex attributes)
        const GLSL3 = 1 << 0;
        /// GLSL 4 level shaders
        const GLSL4 = 1 << 1;
        /// Buffers readable in shaders as 1-D typed arrays
        const TEXEL_BUFFER = 1 << 2;
        /// Instanced draws
        const INSTANCING = 1 << 3;
        /// Buffer-to-buffer copies
        const COPY_BUFFER = 1 << 4;
        /// Clamp-to-transparent-black texture wrap mode
        const CLAMP_ZERO = 1 << 5;
    }
}

/// Numeric limits a backend reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limit {
    /// Maximum number of values in a texel buffer
    TexelBufferSize,
    /// Maximum 2D texture width/height
    TextureSize,
    /// Maximum number of vertex attributes
    VertexAttributes,
    /// Maximum point size
    PointSize,
}

/// Features and limits of a graphics backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub features: Features,
    limits: FxHashMap<Limit, u64>,
}

impl Capabilities {
    /// Empty snapshot: no features, every limit 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Add features (builder style)
    pub fn with_features(mut self, features: Features) -> Self {
        self.features |= features;
        self
    }

    /// Set a limit (builder style)
    pub fn with_limit(mut self, limit: Limit, value: u64) -> Self {
        self.limits.insert(limit, value);
        self
    }

    /// Set a limit in place
    pub fn set_limit(&mut self, limit: Limit, value: u64) {
        self.limits.insert(limit, value);
    }

    /// True if every flag in `features` is supported
    pub fn supports(&self, features: Features) -> bool {
        self.features.contains(features)
    }

    /// Value of a limit (0 when the backend did not report it)
    pub fn limit(&self, limit: Limit) -> u64 {
        self.limits.get(&limit).copied().unwrap_or(0)
    }
}
