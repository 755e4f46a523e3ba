use super::*;
use crate::backend::mock_backend::{MockBackend, MockBuffer};
use crate::backend::Backend;
use crate::buffer::{BufferSettings, BufferUsage, DataDeclaration, MapFlags, TypeFlags};
use crate::format::DataFormat;

// ============================================================================
// Helpers
// ============================================================================

/// position: floatvec2 (offset 0), color: unorm8vec4 (offset 8), stride 12
fn create_test_buffer(elements: u64, map_flags: MapFlags) -> (GpuBuffer, Arc<MockBuffer>) {
    let mut backend = MockBackend::new();
    let settings = BufferSettings::new(TypeFlags::VERTEX, BufferUsage::Dynamic)
        .with_map_flags(map_flags);
    let layout = Buffer::new(
        backend.capabilities(),
        &settings,
        &[
            DataDeclaration::new("position", DataFormat::FloatVec2),
            DataDeclaration::new("color", DataFormat::Unorm8Vec4),
        ],
        0,
        elements,
    ).unwrap();
    let resource = backend.create_buffer(&layout, None).unwrap();
    let mock = backend.created_buffers[0].clone();
    (GpuBuffer::new(layout, resource), mock)
}

// ============================================================================
// Update tests
// ============================================================================

#[test]
fn test_accessors() {
    let (buffer, _) = create_test_buffer(4, MapFlags::empty());
    assert_eq!(buffer.size(), 48);
    assert_eq!(buffer.array_length(), 4);
    assert_eq!(buffer.array_stride(), 12);
    assert_eq!(buffer.resource().size(), 48);
    assert_eq!(buffer.data_member_index("color"), Some(1));
}

#[test]
fn test_update_element() {
    let (buffer, mock) = create_test_buffer(4, MapFlags::empty());
    buffer.update_element(2, &[1; 12]).unwrap();

    let contents = mock.contents();
    assert_eq!(&contents[24..36], &[1; 12]);
    assert_eq!(mock.uploads(), vec![24..36]);
}

#[test]
fn test_update_element_out_of_bounds() {
    let (buffer, _) = create_test_buffer(4, MapFlags::empty());
    assert!(matches!(buffer.update_element(4, &[1; 12]), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_update_element_wrong_size() {
    let (buffer, _) = create_test_buffer(4, MapFlags::empty());
    assert!(buffer.update_element(0, &[1; 8]).is_err());
    assert!(buffer.update_element(0, &[1; 16]).is_err());
}

#[test]
fn test_update_member() {
    let (buffer, mock) = create_test_buffer(4, MapFlags::empty());
    buffer.update_member(1, 1, &[255, 0, 0, 255]).unwrap();

    assert_eq!(mock.uploads(), vec![20..24]);
    assert_eq!(&mock.contents()[20..24], &[255, 0, 0, 255]);
}

#[test]
fn test_update_member_errors() {
    let (buffer, _) = create_test_buffer(4, MapFlags::empty());
    assert!(buffer.update_member(4, 0, &[0; 8]).is_err());
    assert!(buffer.update_member(0, 2, &[0; 4]).is_err());
    assert!(buffer.update_member(0, 0, &[0; 4]).is_err());
}

#[test]
fn test_update_raw() {
    let (buffer, mock) = create_test_buffer(4, MapFlags::empty());
    buffer.update_raw(40, &[3; 8]).unwrap();
    assert_eq!(&mock.contents()[40..48], &[3; 8]);

    assert!(buffer.update_raw(41, &[3; 8]).is_err());
    assert!(buffer.update_raw(u64::MAX, &[3; 2]).is_err());
}

#[test]
fn test_write_elements() {
    let (buffer, mock) = create_test_buffer(4, MapFlags::empty());
    let elements: [[u32; 3]; 2] = [[1, 2, 3], [4, 5, 6]];
    buffer.write_elements(1, &elements).unwrap();

    assert_eq!(mock.uploads(), vec![12..36]);
    let contents = mock.contents();
    assert_eq!(&contents[12..16], &1u32.to_ne_bytes());
    assert_eq!(&contents[32..36], &6u32.to_ne_bytes());
}

#[test]
fn test_write_elements_checks_stride_and_length() {
    let (buffer, _) = create_test_buffer(4, MapFlags::empty());
    assert!(buffer.write_elements(0, &[[0u32; 4]]).is_err());
    assert!(buffer.write_elements(3, &[[0u32; 3], [0u32; 3]]).is_err());
    assert!(buffer.write_elements(3, &[[0u32; 3]]).is_ok());
}

// ============================================================================
// Mapping tests
// ============================================================================

#[test]
fn test_unmap_flushes_whole_buffer() {
    let (mut buffer, mock) = create_test_buffer(4, MapFlags::empty());
    buffer.map();
    assert!(buffer.is_mapped());

    assert_eq!(buffer.unmap().unwrap(), Some(0..48));
    assert_eq!(mock.flushes(), vec![0..48]);
    assert!(!buffer.is_mapped());
}

#[test]
fn test_unmap_flushes_explicit_range() {
    let (mut buffer, mock) = create_test_buffer(4, MapFlags::EXPLICIT_RANGE_MODIFY);
    buffer.map();
    buffer.set_mapped_range_modified(12, 12).unwrap();
    buffer.set_mapped_range_modified(36, 4).unwrap();

    assert_eq!(buffer.unmap().unwrap(), Some(12..40));
    assert_eq!(mock.flushes(), vec![12..40]);
}

#[test]
fn test_map_only_tracks_ranges() {
    let (mut buffer, mock) = create_test_buffer(4, MapFlags::EXPLICIT_RANGE_MODIFY);
    buffer.map();
    buffer.set_mapped_range_modified(12, 12).unwrap();
    assert!(mock.uploads().is_empty());
    assert!(mock.flushes().is_empty());

    buffer.update_element(1, &[7; 12]).unwrap();
    assert_eq!(buffer.unmap().unwrap(), Some(12..24));
    assert_eq!(mock.uploads(), vec![12..24]);
    assert_eq!(mock.flushes(), vec![12..24]);
    assert_eq!(&mock.contents()[12..24], &[7; 12]);
}

#[test]
fn test_unmap_without_changes_flushes_nothing() {
    let (mut buffer, mock) = create_test_buffer(4, MapFlags::EXPLICIT_RANGE_MODIFY);
    assert_eq!(buffer.unmap().unwrap(), None);

    buffer.map();
    assert_eq!(buffer.unmap().unwrap(), None);
    assert!(mock.flushes().is_empty());
}
