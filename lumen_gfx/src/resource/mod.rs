//! GPU resources handed out by the graphics context

pub mod buffer;

pub use buffer::GpuBuffer;
