/// Mock backend for unit tests (no GPU required)
///
/// Keeps buffer and texture contents in host memory and records every
/// allocation, upload and flush so tests can inspect what a backend was
/// asked to do.

use std::ops::Range;
use std::sync::{Arc, Mutex};
use crate::backend::{
    Backend, BufferResource, TextureResource, TextureDesc, TextureInfo,
    Filter, Wrap,
};
use crate::buffer::{Buffer, BufferUsage, TypeFlags};
use crate::capabilities::{Capabilities, Features, Limit};
use crate::error::{Error, Result};

// ============================================================================
// Mock Buffer
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub type_flags: TypeFlags,
    pub usage: BufferUsage,
    pub contents: Mutex<Vec<u8>>,
    pub uploads: Mutex<Vec<Range<u64>>>,
    pub flushes: Mutex<Vec<Range<u64>>>,
}

impl MockBuffer {
    pub fn new(layout: &Buffer) -> Self {
        Self {
            type_flags: layout.type_flags(),
            usage: layout.usage(),
            contents: Mutex::new(vec![0; layout.size() as usize]),
            uploads: Mutex::new(Vec::new()),
            flushes: Mutex::new(Vec::new()),
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        self.contents.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<Range<u64>> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn flushes(&self) -> Vec<Range<u64>> {
        self.flushes.lock().unwrap().clone()
    }
}

impl BufferResource for MockBuffer {
    fn size(&self) -> u64 {
        self.contents.lock().unwrap().len() as u64
    }

    fn upload(&self, offset: u64, data: &[u8]) -> Result<()> {
        let mut contents = self.contents.lock().unwrap();
        let end = offset as usize + data.len();
        if end > contents.len() {
            return Err(Error::InvalidArgument(format!(
                "Mock upload of {} bytes at {} overruns {} bytes",
                data.len(), offset, contents.len()
            )));
        }
        contents[offset as usize..end].copy_from_slice(data);
        self.uploads.lock().unwrap().push(offset..end as u64);
        Ok(())
    }

    fn flush(&self, range: Range<u64>) -> Result<()> {
        self.flushes.lock().unwrap().push(range);
        Ok(())
    }
}

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
    pub levels: Mutex<Vec<Vec<u8>>>,
    pub mipmap_generations: Mutex<u32>,
    filter: Mutex<Filter>,
    wrap: Mutex<Wrap>,
    clamp_zero: bool,
}

impl MockTexture {
    pub fn new(desc: &TextureDesc, clamp_zero: bool) -> Self {
        let info = TextureInfo::from_desc(desc);
        let levels = (0..info.mip_levels)
            .map(|level| vec![0; info.level_size(level).unwrap_or(0) as usize])
            .collect();
        Self {
            info,
            levels: Mutex::new(levels),
            mipmap_generations: Mutex::new(0),
            filter: Mutex::new(Filter::default()),
            wrap: Mutex::new(Wrap::default()),
            clamp_zero,
        }
    }

    pub fn level(&self, level: u32) -> Vec<u8> {
        self.levels.lock().unwrap()[level as usize].clone()
    }

    pub fn mipmap_generations(&self) -> u32 {
        *self.mipmap_generations.lock().unwrap()
    }
}

impl TextureResource for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }

    fn upload(&self, level: u32, data: &[u8]) -> Result<()> {
        match self.info.level_size(level) {
            Some(expected) if expected == data.len() as u64 => {
                self.levels.lock().unwrap()[level as usize] = data.to_vec();
                Ok(())
            }
            Some(expected) => Err(Error::InvalidArgument(format!(
                "Mip level {} expects {} bytes, got {}", level, expected, data.len()
            ))),
            None => Err(Error::InvalidArgument(format!(
                "Mip level {} out of range ({} levels)", level, self.info.mip_levels
            ))),
        }
    }

    fn generate_mipmaps(&self) -> Result<()> {
        if !self.info.has_mipmaps() {
            return Err(Error::InvalidArgument(
                "Texture was created without mipmaps".to_string(),
            ));
        }
        *self.mipmap_generations.lock().unwrap() += 1;
        Ok(())
    }

    fn set_filter(&self, filter: Filter) -> Result<()> {
        *self.filter.lock().unwrap() = filter;
        Ok(())
    }

    fn set_wrap(&self, wrap: Wrap) -> Result<bool> {
        let (wrap, unchanged) = if self.clamp_zero {
            (wrap, true)
        } else {
            wrap.without_clamp_zero()
        };
        *self.wrap.lock().unwrap() = wrap;
        Ok(unchanged)
    }

    fn filter(&self) -> Filter {
        *self.filter.lock().unwrap()
    }

    fn wrap(&self) -> Wrap {
        *self.wrap.lock().unwrap()
    }
}

// ============================================================================
// Mock Backend
// ============================================================================

/// Mock backend that tracks created resources without GPU
#[derive(Debug)]
pub struct MockBackend {
    pub capabilities: Capabilities,
    pub created_buffers: Vec<Arc<MockBuffer>>,
    pub created_textures: Vec<Arc<MockTexture>>,
    /// Make the next allocation fail with OutOfMemory
    pub fail_next_allocation: bool,
}

impl MockBackend {
    /// Mock with every feature and generous limits
    pub fn new() -> Self {
        Self::with_capabilities(
            Capabilities::new()
                .with_features(Features::all())
                .with_limit(Limit::TexelBufferSize, 65536)
                .with_limit(Limit::TextureSize, 4096)
                .with_limit(Limit::VertexAttributes, 16)
                .with_limit(Limit::PointSize, 64),
        )
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            created_buffers: Vec::new(),
            created_textures: Vec::new(),
            fail_next_allocation: false,
        }
    }

    fn take_failure(&mut self) -> Result<()> {
        if std::mem::take(&mut self.fail_next_allocation) {
            crate::engine_error!("lumen::mock", "Injected allocation failure");
            return Err(Error::OutOfMemory);
        }
        Ok(())
    }
}

impl Backend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn create_buffer(&mut self, layout: &Buffer, data: Option<&[u8]>) -> Result<Arc<dyn BufferResource>> {
        self.take_failure()?;
        let buffer = Arc::new(MockBuffer::new(layout));
        if let Some(data) = data {
            buffer.upload(0, data)?;
        }
        self.created_buffers.push(buffer.clone());
        Ok(buffer)
    }

    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn TextureResource>> {
        self.take_failure()?;
        let texture = Arc::new(MockTexture::new(&desc, self.capabilities.supports(Features::CLAMP_ZERO)));
        if let Some(data) = &desc.data {
            texture.upload(0, data)?;
        }
        self.created_textures.push(texture.clone());
        Ok(texture)
    }
}

#[cfg(test)]
#[path = "mock_backend_tests.rs"]
mod tests;
