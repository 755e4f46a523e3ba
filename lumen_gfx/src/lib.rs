/*!
# Lumen GFX

Backend-agnostic GPU buffer layer for the Lumen framework.

This crate validates client-declared vertex, index and texel buffer formats
and lays them out into a plain descriptor that graphics backends (Vulkan,
Metal, etc.) turn into device resources.

## Architecture

- **DataFormat**: scalar/vector/matrix format tags and their static metadata
- **Buffer**: the layout engine (validation, offsets, stride, size)
- **CommonFormat**: canonical vertex layouts (position, texcoord, color)
- **Capabilities**: backend-reported features and limits
- **Backend**: trait implemented once per graphics API
- **Graphics**: owns a backend and produces validated GPU buffers

Backend implementations live in their own crates and implement the
[`lumen::render::Backend`] trait.
*/

// Internal modules
mod error;
pub mod log;
pub mod format;
pub mod capabilities;
pub mod buffer;
pub mod backend;
pub mod resource;
pub mod graphics;

// Main lumen namespace module
pub mod lumen {
    // Error types
    pub use crate::error::{Error, Result};

    // Graphics context
    pub use crate::graphics::Graphics;

    // Capability snapshot
    pub use crate::capabilities::{Capabilities, Features, Limit};

    // Logging sub-module (types and configuration, NOT macros)
    pub mod log {
        pub use crate::log::{
            Logger, LogEntry, LogSeverity, DefaultLogger,
            set_logger, reset_logger, set_min_severity, min_severity,
            emit, emit_detailed,
        };
    }

    // Data formats and their catalog
    pub mod format {
        pub use crate::format::*;
    }

    // Layout engine types
    pub mod buffer {
        pub use crate::buffer::*;
    }

    // Backend adapter traits and texture state types
    pub mod render {
        pub use crate::backend::*;
    }

    // GPU resources produced by the graphics context
    pub mod resource {
        pub use crate::resource::*;
    }
}
