/// Graphics context: owns a backend and hands out validated resources
///
/// The context snapshots the backend's capabilities once, runs the layout
/// engine against that snapshot, and only then asks the backend to allocate.
/// Nothing reaches the device unless validation succeeded.

use std::sync::{Arc, Mutex, MutexGuard};
use crate::backend::{Backend, TextureDesc, TextureInfo, TextureResource};
use crate::buffer::{Buffer, BufferSettings, CommonFormat, DataDeclaration};
use crate::capabilities::{Capabilities, Limit};
use crate::error::{Error, Result};
use crate::resource::GpuBuffer;

const SOURCE: &str = "lumen::Graphics";

/// Resource factory bound to one backend
pub struct Graphics {
    backend: Arc<Mutex<dyn Backend>>,
    capabilities: Capabilities,
    backend_name: String,
}

impl Graphics {
    /// Take ownership of a backend
    pub fn new<B: Backend + 'static>(backend: B) -> Self {
        let capabilities = backend.capabilities().clone();
        let backend_name = backend.name().to_string();
        crate::engine_info!(SOURCE, "Using '{}' backend (features: {:?})", backend_name, capabilities.features);
        Self {
            backend: Arc::new(Mutex::new(backend)),
            capabilities,
            backend_name,
        }
    }

    /// Share a backend that other owners also hold
    pub fn with_shared(backend: Arc<Mutex<dyn Backend>>) -> Result<Self> {
        let (capabilities, backend_name) = {
            let guard = backend.lock().map_err(|_| Self::log_and_return_error(
                Error::BackendError("Backend lock poisoned".to_string())
            ))?;
            (guard.capabilities().clone(), guard.name().to_string())
        };
        crate::engine_info!(SOURCE, "Using shared '{}' backend", backend_name);
        Ok(Self { backend, capabilities, backend_name })
    }

    /// Log an error and return it (for use with map_err / ok_or_else)
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::BackendError(msg) => {
                crate::engine_error!(SOURCE, "Backend error: {}", msg);
            }
            _ => {
                crate::engine_warn!(SOURCE, "{}", error);
            }
        }
        error
    }

    fn lock_backend(&self) -> Result<MutexGuard<'_, dyn Backend + 'static>> {
        self.backend.lock().map_err(|_| Self::log_and_return_error(
            Error::BackendError("Backend lock poisoned".to_string())
        ))
    }

    // ===== ACCESSORS =====

    /// Capability snapshot taken when the context was created
    pub fn capabilities(&self) -> &Capabilities { &self.capabilities }

    pub fn backend_name(&self) -> &str { &self.backend_name }

    pub fn backend(&self) -> &Arc<Mutex<dyn Backend>> { &self.backend }

    // ===== BUFFERS =====

    /// Validate a layout and allocate it
    ///
    /// # Arguments
    ///
    /// * `size` - Byte size (rounded up to whole elements), or 0 to use `array_length`
    /// * `data` - Optional initial contents, no longer than the final size
    pub fn new_buffer(
        &self,
        settings: &BufferSettings,
        declarations: &[DataDeclaration],
        size: u64,
        array_length: u64,
        data: Option<&[u8]>,
    ) -> Result<GpuBuffer> {
        let layout = Buffer::new(&self.capabilities, settings, declarations, size, array_length)?;

        if let Some(data) = data {
            if data.len() as u64 > layout.size() {
                return Err(Self::log_and_return_error(Error::InvalidArgument(format!(
                    "Initial data is {} bytes but the buffer holds {}",
                    data.len(), layout.size()
                ))));
            }
        }

        // Backends log their own failures
        let resource = self.lock_backend()?.create_buffer(&layout, data)?;

        crate::engine_debug!(
            SOURCE,
            "Created {:?} buffer: {} x {} bytes ({:?})",
            layout.type_flags(), layout.array_length(), layout.array_stride(), layout.usage()
        );

        Ok(GpuBuffer::new(layout, resource))
    }

    /// Allocate a vertex buffer with a predefined layout
    pub fn new_common_buffer(
        &self,
        settings: &BufferSettings,
        format: CommonFormat,
        array_length: u64,
        data: Option<&[u8]>,
    ) -> Result<GpuBuffer> {
        self.new_buffer(settings, &format.declarations(), 0, array_length, data)
    }

    // ===== TEXTURES =====

    /// Validate a texture descriptor against device limits and create it
    pub fn new_texture(&self, desc: TextureDesc) -> Result<Arc<dyn TextureResource>> {
        if desc.width == 0 || desc.height == 0 {
            return Err(Self::log_and_return_error(Error::InvalidArgument(format!(
                "Texture dimensions must be nonzero ({}x{})", desc.width, desc.height
            ))));
        }

        let max_size = self.capabilities.limit(Limit::TextureSize);
        let largest = desc.width.max(desc.height) as u64;
        if largest > max_size {
            return Err(Self::log_and_return_error(Error::ResourceLimitExceeded {
                resource: format!("texture dimension ({}x{})", desc.width, desc.height),
                attempted: largest,
                limit: max_size,
            }));
        }

        if let Some(data) = &desc.data {
            let expected = TextureInfo::from_desc(&desc).level_size(0).unwrap_or(0);
            if data.len() as u64 != expected {
                return Err(Self::log_and_return_error(Error::InvalidArgument(format!(
                    "Texture data is {} bytes, expected {}", data.len(), expected
                ))));
            }
        }

        let (width, height) = (desc.width, desc.height);
        let texture = self.lock_backend()?.create_texture(desc)?;

        crate::engine_debug!(SOURCE, "Created {}x{} texture ({} levels)", width, height, texture.info().mip_levels);
        Ok(texture)
    }
}

#[cfg(test)]
#[path = "graphics_tests.rs"]
mod tests;
