/*!
# Lumen GFX - Vulkan Backend

Vulkan implementation of the lumen_gfx [`Backend`](lumen_gfx::lumen::render::Backend) trait.

Uses the Ash library for Vulkan bindings and gpu-allocator for memory
management. The backend is headless: it creates device buffers and sampled
textures from validated layouts, without any surface or swapchain.

```no_run
use lumen_gfx::lumen::Graphics;
use lumen_gfx_backend_vulkan::{VulkanBackend, VulkanConfig};

# fn main() -> lumen_gfx::lumen::Result<()> {
let graphics = Graphics::new(VulkanBackend::new(VulkanConfig::default())?);
println!("{}", graphics.backend_name());
# Ok(())
# }
```
*/

// Vulkan implementation modules
mod vulkan_backend;
mod vulkan_buffer;
mod vulkan_context;
mod vulkan_debug;
mod vulkan_format;
mod vulkan_sampler;
mod vulkan_texture;

pub use vulkan_backend::{VulkanBackend, VulkanConfig};
pub use vulkan_buffer::Buffer as VulkanBuffer;
pub use vulkan_texture::Texture as VulkanTexture;
