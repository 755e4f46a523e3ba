/// Buffer layout engine.
///
/// A Buffer is the validated, backend-agnostic description of a GPU buffer:
/// an ordered list of data members with byte offsets, the element stride,
/// the element count and the total size. Backends allocate device memory
/// from it; the layout itself never changes after construction.
///
/// Layout rules:
/// - Members are packed tightly in declaration order (no alignment padding)
/// - Stride = sum of member sizes
/// - A requested byte size is rounded up to a whole number of elements
/// - size == stride * array_length always holds

use std::ops::Range;
use crate::capabilities::{Capabilities, Features, Limit};
use crate::error::{Error, Result};
use crate::format::{DataBaseType, DataFormat};
use crate::buffer::{BufferSettings, BufferUsage, DataDeclaration, DataMember, MapFlags, TypeFlags};

const SOURCE: &str = "lumen::Buffer";

/// Log a rejected request and hand the error back
fn reject<T>(error: Error) -> Result<T> {
    crate::engine_warn!(SOURCE, "{}", error);
    Err(error)
}

// ===== BUFFER =====

/// Validated buffer layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    data_members: Vec<DataMember>,
    array_stride: u64,
    array_length: u64,
    size: u64,
    type_flags: TypeFlags,
    usage: BufferUsage,
    map_flags: MapFlags,
    mapped: bool,
    modified_range: Option<Range<u64>>,
}

impl Buffer {
    /// Validate declarations against the active buffer types and lay them out
    ///
    /// Exactly one of `size` (bytes) and `array_length` (elements) drives the
    /// other: a nonzero `size` wins and is rounded up to a multiple of the
    /// stride. Fails without building anything if any check fails.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument`: both sizes zero, no declarations, no type flag
    /// - `UnsupportedFeature`: texel buffers or integer attributes unsupported
    /// - `InvalidFormat`: a declaration breaks an index/vertex/texel rule
    /// - `ResourceLimitExceeded`: too many texel buffer values
    pub fn new(
        caps: &Capabilities,
        settings: &BufferSettings,
        declarations: &[DataDeclaration],
        size: u64,
        array_length: u64,
    ) -> Result<Self> {
        // ========== VALIDATION ==========
        if size == 0 && array_length == 0 {
            return reject(Error::InvalidArgument(
                "Size or array length must be specified".to_string(),
            ));
        }
        if declarations.is_empty() {
            return reject(Error::InvalidArgument(
                "Data format must contain values".to_string(),
            ));
        }

        let index_buffer = settings.type_flags.contains(TypeFlags::INDEX);
        let vertex_buffer = settings.type_flags.contains(TypeFlags::VERTEX);
        let texel_buffer = settings.type_flags.contains(TypeFlags::TEXEL);

        if !index_buffer && !vertex_buffer && !texel_buffer {
            return reject(Error::InvalidArgument(
                "Buffer must be created with at least one buffer type (index, vertex, or texel)".to_string(),
            ));
        }
        if texel_buffer && !caps.supports(Features::TEXEL_BUFFER) {
            return reject(Error::UnsupportedFeature(
                "Texel buffers are not supported on this system".to_string(),
            ));
        }

        let supports_glsl3 = caps.supports(Features::GLSL3);
        let first_format = declarations[0].format;

        // ========== COMPUTE LAYOUT ==========
        let mut data_members = Vec::with_capacity(declarations.len());
        let mut offset: u64 = 0;

        for decl in declarations {
            let info = decl.format.info();

            if index_buffer {
                if !matches!(decl.format, DataFormat::Uint16 | DataFormat::Uint32) {
                    return reject(Error::InvalidFormat(
                        "Index buffers only support uint16 and uint32 data types".to_string(),
                    ));
                }
                if declarations.len() > 1 {
                    return reject(Error::InvalidFormat(
                        "Index buffers only support a single value per element".to_string(),
                    ));
                }
                if decl.array_length > 0 {
                    return reject(Error::InvalidFormat(
                        "Arrays are not supported in index buffers".to_string(),
                    ));
                }
            }

            if vertex_buffer {
                if decl.array_length > 0 {
                    return reject(Error::InvalidFormat(
                        "Arrays are not supported in vertex buffers".to_string(),
                    ));
                }
                if info.is_matrix {
                    return reject(Error::InvalidFormat(
                        "Matrix types are not supported in vertex buffers".to_string(),
                    ));
                }
                if info.base_type == DataBaseType::Bool {
                    return reject(Error::InvalidFormat(
                        "Bool types are not supported in vertex buffers".to_string(),
                    ));
                }
                if info.base_type.is_integer() && !supports_glsl3 {
                    return reject(Error::UnsupportedFeature(format!(
                        "Integer vertex attribute data types require GLSL 3 support (attribute '{}' is {})",
                        decl.name, decl.format
                    )));
                }
                if decl.name.is_empty() {
                    return reject(Error::InvalidFormat(
                        "Vertex buffer attributes must have a name".to_string(),
                    ));
                }
            }

            if texel_buffer {
                if decl.format != first_format {
                    return reject(Error::InvalidFormat(
                        "All values in a texel buffer must have the same format".to_string(),
                    ));
                }
                if decl.array_length > 0 {
                    return reject(Error::InvalidFormat(
                        "Arrays are not supported in texel buffers".to_string(),
                    ));
                }
                if info.is_matrix {
                    return reject(Error::InvalidFormat(
                        "Matrix types are not supported in texel buffers".to_string(),
                    ));
                }
                if info.base_type == DataBaseType::Bool {
                    return reject(Error::InvalidFormat(
                        "Bool types are not supported in texel buffers".to_string(),
                    ));
                }
                if info.components == 3 {
                    return reject(Error::InvalidFormat(
                        "3-component formats are not supported in texel buffers".to_string(),
                    ));
                }
                if info.base_type == DataBaseType::Snorm {
                    return reject(Error::InvalidFormat(
                        "Signed normalized formats are not supported in texel buffers".to_string(),
                    ));
                }
            }

            // No alignment: members are packed back to back
            let member = DataMember::new(decl.clone(), offset);
            offset += member.size;
            data_members.push(member);
        }

        let stride = offset;

        // ========== SIZE RESOLUTION ==========
        let (size, array_length) = if size != 0 {
            let elements = size.div_ceil(stride);
            match elements.checked_mul(stride) {
                Some(rounded) => (rounded, elements),
                None => {
                    return reject(Error::InvalidArgument(format!(
                        "Buffer size {} cannot be rounded up to a multiple of stride {}",
                        size, stride
                    )));
                }
            }
        } else {
            match array_length.checked_mul(stride) {
                Some(total) => (total, array_length),
                None => {
                    return reject(Error::InvalidArgument(format!(
                        "Buffer of {} elements with stride {} overflows",
                        array_length, stride
                    )));
                }
            }
        };

        if texel_buffer {
            let max_values = caps.limit(Limit::TexelBufferSize);
            let values = array_length.saturating_mul(data_members.len() as u64);
            if values > max_values {
                return reject(Error::ResourceLimitExceeded {
                    resource: format!(
                        "texel buffer values ({} members x {} elements)",
                        data_members.len(),
                        array_length
                    ),
                    attempted: values,
                    limit: max_values,
                });
            }
        }

        crate::engine_trace!(
            SOURCE,
            "Laid out {} members: stride {} bytes, {} elements, {} bytes",
            data_members.len(),
            stride,
            array_length,
            size
        );

        Ok(Self {
            data_members,
            array_stride: stride,
            array_length,
            size,
            type_flags: settings.type_flags,
            usage: settings.usage,
            map_flags: settings.map_flags,
            mapped: false,
            modified_range: None,
        })
    }

    // ===== ACCESSORS =====

    /// Total size in bytes (multiple of the stride)
    pub fn size(&self) -> u64 { self.size }

    /// Bytes per element
    pub fn array_stride(&self) -> u64 { self.array_stride }

    /// Number of elements
    pub fn array_length(&self) -> u64 { self.array_length }

    pub fn type_flags(&self) -> TypeFlags { self.type_flags }

    pub fn usage(&self) -> BufferUsage { self.usage }

    pub fn map_flags(&self) -> MapFlags { self.map_flags }

    /// Members in declaration order
    pub fn data_members(&self) -> &[DataMember] { &self.data_members }

    pub fn data_member(&self, index: usize) -> Option<&DataMember> {
        self.data_members.get(index)
    }

    /// Byte offset of a member inside an element
    pub fn member_offset(&self, index: usize) -> Option<u64> {
        self.data_members.get(index).map(|member| member.offset)
    }

    /// Position of the first member called `name`
    pub fn data_member_index(&self, name: &str) -> Option<usize> {
        self.data_members.iter().position(|member| member.decl.name == name)
    }

    // ===== RANGE CHECKS =====

    /// Fail unless `offset..offset + len` lies inside the buffer
    pub fn check_range(&self, offset: u64, len: u64) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.size => Ok(()),
            _ => reject(Error::InvalidArgument(format!(
                "Range at offset {} with size {} exceeds buffer size {}",
                offset, len, self.size
            ))),
        }
    }

    // ===== MAPPING =====

    pub fn is_mapped(&self) -> bool { self.mapped }

    /// Enter the mapped state (no-op if already mapped)
    pub fn map(&mut self) {
        if self.mapped {
            return;
        }
        self.mapped = true;
        self.modified_range = None;
    }

    /// Record a modified byte range while mapped
    ///
    /// Only tracked for EXPLICIT_RANGE_MODIFY buffers; other buffers flush
    /// everything on unmap and ignore the call once the range is validated.
    pub fn set_mapped_range_modified(&mut self, offset: u64, len: u64) -> Result<()> {
        if !self.mapped {
            return reject(Error::InvalidArgument(
                "Buffer must be mapped before marking a modified range".to_string(),
            ));
        }
        self.check_range(offset, len)?;

        if !self.map_flags.contains(MapFlags::EXPLICIT_RANGE_MODIFY) || len == 0 {
            return Ok(());
        }

        let range = offset..offset + len;
        self.modified_range = Some(match self.modified_range.take() {
            Some(existing) => existing.start.min(range.start)..existing.end.max(range.end),
            None => range,
        });
        Ok(())
    }

    /// Leave the mapped state and return the byte range to flush
    ///
    /// `None` if the buffer was not mapped, or if an EXPLICIT_RANGE_MODIFY
    /// buffer recorded no modification.
    pub fn unmap(&mut self) -> Option<Range<u64>> {
        if !self.mapped {
            return None;
        }
        self.mapped = false;

        if self.map_flags.contains(MapFlags::EXPLICIT_RANGE_MODIFY) {
            self.modified_range.take()
        } else {
            Some(0..self.size)
        }
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
