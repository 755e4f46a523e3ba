/// Backend module - adapter traits every graphics API implements

// Module declarations
pub mod backend;
pub mod backend_buffer;
pub mod backend_texture;
#[cfg(test)]
pub mod mock_backend;

// Re-export everything from backend.rs
pub use backend::*;

// Re-export from other modules
pub use backend_buffer::*;
pub use backend_texture::*;
