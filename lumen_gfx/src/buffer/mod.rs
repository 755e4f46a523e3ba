/// Buffer module - layout engine and everything it consumes

// Module declarations
pub mod settings;
pub mod declaration;
pub mod buffer;
pub mod common_format;

// Re-export everything from buffer.rs
pub use buffer::*;

// Re-export from other modules
pub use settings::*;
pub use declaration::*;
pub use common_format::*;
