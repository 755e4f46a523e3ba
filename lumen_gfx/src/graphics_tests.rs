use super::*;
use crate::backend::mock_backend::MockBackend;
use crate::backend::PixelFormat;
use crate::buffer::{BufferUsage, TypeFlags};
use crate::capabilities::Features;
use crate::format::DataFormat;

// ============================================================================
// Helpers
// ============================================================================

fn create_shared_mock() -> (Graphics, Arc<Mutex<MockBackend>>) {
    let mock = Arc::new(Mutex::new(MockBackend::new()));
    let graphics = Graphics::with_shared(mock.clone()).unwrap();
    (graphics, mock)
}

fn texture_desc(width: u32, height: u32) -> TextureDesc {
    TextureDesc {
        width,
        height,
        format: PixelFormat::Rgba8Unorm,
        mipmaps: false,
        data: None,
    }
}

// ============================================================================
// Context tests
// ============================================================================

#[test]
fn test_capabilities_snapshot() {
    let caps = Capabilities::new().with_features(Features::GLSL3);
    let graphics = Graphics::new(MockBackend::with_capabilities(caps.clone()));

    assert_eq!(graphics.capabilities(), &caps);
    assert_eq!(graphics.backend_name(), "mock");
}

// ============================================================================
// Buffer tests
// ============================================================================

#[test]
fn test_new_buffer_allocates_validated_layout() {
    let (graphics, mock) = create_shared_mock();
    let buffer = graphics.new_buffer(
        &BufferSettings::new(TypeFlags::VERTEX, BufferUsage::Stream),
        &[DataDeclaration::new("position", DataFormat::FloatVec3)],
        100,
        0,
        None,
    ).unwrap();

    assert_eq!(buffer.size(), 108);
    let backend = mock.lock().unwrap();
    assert_eq!(backend.created_buffers.len(), 1);
    assert_eq!(backend.created_buffers[0].usage, BufferUsage::Stream);
    assert_eq!(backend.created_buffers[0].contents().len(), 108);
}

#[test]
fn test_invalid_layout_never_reaches_backend() {
    let (graphics, mock) = create_shared_mock();
    let result = graphics.new_buffer(
        &BufferSettings::new(TypeFlags::INDEX, BufferUsage::Static),
        &[DataDeclaration::new("", DataFormat::Float)],
        0,
        6,
        None,
    );

    assert!(matches!(result, Err(Error::InvalidFormat(_))));
    assert!(mock.lock().unwrap().created_buffers.is_empty());
}

#[test]
fn test_new_buffer_with_initial_data() {
    let (graphics, mock) = create_shared_mock();
    let indices: [u16; 6] = [0, 1, 2, 2, 3, 0];
    graphics.new_buffer(
        &BufferSettings::new(TypeFlags::INDEX, BufferUsage::Static),
        &[DataDeclaration::new("", DataFormat::Uint16)],
        0,
        6,
        Some(bytemuck::cast_slice(&indices)),
    ).unwrap();

    let contents = mock.lock().unwrap().created_buffers[0].contents();
    assert_eq!(contents, bytemuck::cast_slice::<u16, u8>(&indices));
}

#[test]
fn test_new_buffer_rejects_oversized_data() {
    let (graphics, mock) = create_shared_mock();
    let result = graphics.new_buffer(
        &BufferSettings::default(),
        &[DataDeclaration::new("position", DataFormat::FloatVec2)],
        0,
        1,
        Some(&[0; 9]),
    );

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert!(mock.lock().unwrap().created_buffers.is_empty());
}

#[test]
fn test_new_buffer_propagates_backend_failure() {
    let (graphics, mock) = create_shared_mock();
    mock.lock().unwrap().fail_next_allocation = true;

    let result = graphics.new_common_buffer(&BufferSettings::default(), CommonFormat::XYf, 4, None);
    assert!(matches!(result, Err(Error::OutOfMemory)));
}

#[test]
fn test_new_common_buffer() {
    let (graphics, _) = create_shared_mock();
    let buffer = graphics.new_common_buffer(
        &BufferSettings::default(),
        CommonFormat::XYf_STf_RGBAub,
        4,
        None,
    ).unwrap();

    assert_eq!(buffer.array_stride(), 20);
    assert_eq!(buffer.size(), 80);
    assert_eq!(buffer.data_member_index("texcoord"), Some(1));
}

#[test]
fn test_new_common_buffer_none_fails() {
    let (graphics, _) = create_shared_mock();
    let result = graphics.new_common_buffer(&BufferSettings::default(), CommonFormat::None, 4, None);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

// ============================================================================
// Texture tests
// ============================================================================

#[test]
fn test_new_texture() {
    let (graphics, mock) = create_shared_mock();
    let mut desc = texture_desc(16, 8);
    desc.mipmaps = true;
    desc.data = Some(vec![1; 16 * 8 * 4]);

    let texture = graphics.new_texture(desc).unwrap();
    assert_eq!(texture.info().mip_levels, 5);
    assert_eq!(mock.lock().unwrap().created_textures[0].level(0), vec![1; 512]);
}

#[test]
fn test_new_texture_zero_size_fails() {
    let (graphics, _) = create_shared_mock();
    assert!(matches!(graphics.new_texture(texture_desc(0, 8)), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_new_texture_limit() {
    let (graphics, _) = create_shared_mock();
    assert!(graphics.new_texture(texture_desc(4096, 1)).is_ok());

    match graphics.new_texture(texture_desc(4097, 1)) {
        Err(Error::ResourceLimitExceeded { attempted, limit, .. }) => {
            assert_eq!(attempted, 4097);
            assert_eq!(limit, 4096);
        }
        other => panic!("Expected ResourceLimitExceeded, got {:?}", other.map(|t| t.info().clone())),
    }
}

#[test]
fn test_new_texture_data_size_mismatch() {
    let (graphics, _) = create_shared_mock();
    let mut desc = texture_desc(4, 4);
    desc.data = Some(vec![0; 63]);
    assert!(matches!(graphics.new_texture(desc), Err(Error::InvalidArgument(_))));
}
