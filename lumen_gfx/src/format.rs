/// Data formats for buffer members and their static metadata catalog
///
/// Every DataFormat has exactly one DataFormatInfo entry. The catalog is a
/// static table indexed by the enum discriminant, so lookups never fail.

use std::fmt;
use std::str::FromStr;
use crate::error::Error;

// ===== BASE TYPE =====

/// Scalar class of a format's components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataBaseType {
    Float,
    Int,
    Uint,
    /// Signed normalized integer ([-1, 1] in shaders)
    Snorm,
    /// Unsigned normalized integer ([0, 1] in shaders)
    Unorm,
    Bool,
}

impl DataBaseType {
    /// True for Int and Uint (integer attributes need GLSL 3)
    pub fn is_integer(&self) -> bool {
        matches!(self, DataBaseType::Int | DataBaseType::Uint)
    }
}

// ===== DATA FORMAT =====

/// Scalar, vector and matrix formats usable in buffer declarations
///
/// Matrix names are columns x rows: `FloatMat2x3` has 2 columns of 3 rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    Float,
    FloatVec2,
    FloatVec3,
    FloatVec4,

    FloatMat2x2,
    FloatMat2x3,
    FloatMat2x4,
    FloatMat3x2,
    FloatMat3x3,
    FloatMat3x4,
    FloatMat4x2,
    FloatMat4x3,
    FloatMat4x4,

    Int32,
    Int32Vec2,
    Int32Vec3,
    Int32Vec4,

    Uint32,
    Uint32Vec2,
    Uint32Vec3,
    Uint32Vec4,

    Snorm8Vec4,
    Unorm8Vec4,
    Int8Vec4,
    Uint8Vec4,

    Snorm16Vec2,
    Snorm16Vec4,
    Unorm16Vec2,
    Unorm16Vec4,
    Int16Vec2,
    Int16Vec4,

    Uint16,
    Uint16Vec2,
    Uint16Vec4,

    Bool,
    BoolVec2,
    BoolVec3,
    BoolVec4,
}

/// Number of DataFormat variants
pub const DATA_FORMAT_COUNT: usize = 38;

impl DataFormat {
    /// Every format, in declaration order
    pub const ALL: [DataFormat; DATA_FORMAT_COUNT] = [
        DataFormat::Float,
        DataFormat::FloatVec2,
        DataFormat::FloatVec3,
        DataFormat::FloatVec4,
        DataFormat::FloatMat2x2,
        DataFormat::FloatMat2x3,
        DataFormat::FloatMat2x4,
        DataFormat::FloatMat3x2,
        DataFormat::FloatMat3x3,
        DataFormat::FloatMat3x4,
        DataFormat::FloatMat4x2,
        DataFormat::FloatMat4x3,
        DataFormat::FloatMat4x4,
        DataFormat::Int32,
        DataFormat::Int32Vec2,
        DataFormat::Int32Vec3,
        DataFormat::Int32Vec4,
        DataFormat::Uint32,
        DataFormat::Uint32Vec2,
        DataFormat::Uint32Vec3,
        DataFormat::Uint32Vec4,
        DataFormat::Snorm8Vec4,
        DataFormat::Unorm8Vec4,
        DataFormat::Int8Vec4,
        DataFormat::Uint8Vec4,
        DataFormat::Snorm16Vec2,
        DataFormat::Snorm16Vec4,
        DataFormat::Unorm16Vec2,
        DataFormat::Unorm16Vec4,
        DataFormat::Int16Vec2,
        DataFormat::Int16Vec4,
        DataFormat::Uint16,
        DataFormat::Uint16Vec2,
        DataFormat::Uint16Vec4,
        DataFormat::Bool,
        DataFormat::BoolVec2,
        DataFormat::BoolVec3,
        DataFormat::BoolVec4,
    ];

    /// Static metadata for this format
    pub fn info(self) -> &'static DataFormatInfo {
        &CATALOG[self as usize]
    }

    /// Size in bytes (shortcut for `info().size`)
    pub fn size_bytes(self) -> u64 {
        self.info().size
    }

    /// Constant name used by the scripting binding layer
    pub fn name(self) -> &'static str {
        match self {
            DataFormat::Float => "float",
            DataFormat::FloatVec2 => "floatvec2",
            DataFormat::FloatVec3 => "floatvec3",
            DataFormat::FloatVec4 => "floatvec4",
            DataFormat::FloatMat2x2 => "floatmat2x2",
            DataFormat::FloatMat2x3 => "floatmat2x3",
            DataFormat::FloatMat2x4 => "floatmat2x4",
            DataFormat::FloatMat3x2 => "floatmat3x2",
            DataFormat::FloatMat3x3 => "floatmat3x3",
            DataFormat::FloatMat3x4 => "floatmat3x4",
            DataFormat::FloatMat4x2 => "floatmat4x2",
            DataFormat::FloatMat4x3 => "floatmat4x3",
            DataFormat::FloatMat4x4 => "floatmat4x4",
            DataFormat::Int32 => "int32",
            DataFormat::Int32Vec2 => "int32vec2",
            DataFormat::Int32Vec3 => "int32vec3",
            DataFormat::Int32Vec4 => "int32vec4",
            DataFormat::Uint32 => "uint32",
            DataFormat::Uint32Vec2 => "uint32vec2",
            DataFormat::Uint32Vec3 => "uint32vec3",
            DataFormat::Uint32Vec4 => "uint32vec4",
            DataFormat::Snorm8Vec4 => "snorm8vec4",
            DataFormat::Unorm8Vec4 => "unorm8vec4",
            DataFormat::Int8Vec4 => "int8vec4",
            DataFormat::Uint8Vec4 => "uint8vec4",
            DataFormat::Snorm16Vec2 => "snorm16vec2",
            DataFormat::Snorm16Vec4 => "snorm16vec4",
            DataFormat::Unorm16Vec2 => "unorm16vec2",
            DataFormat::Unorm16Vec4 => "unorm16vec4",
            DataFormat::Int16Vec2 => "int16vec2",
            DataFormat::Int16Vec4 => "int16vec4",
            DataFormat::Uint16 => "uint16",
            DataFormat::Uint16Vec2 => "uint16vec2",
            DataFormat::Uint16Vec4 => "uint16vec4",
            DataFormat::Bool => "bool",
            DataFormat::BoolVec2 => "boolvec2",
            DataFormat::BoolVec3 => "boolvec3",
            DataFormat::BoolVec4 => "boolvec4",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataFormat::ALL
            .iter()
            .copied()
            .find(|format| format.name() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("Invalid data format '{}'", s)))
    }
}

// ===== DATA FORMAT INFO =====

/// Read-only metadata for a DataFormat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFormatInfo {
    pub base_type: DataBaseType,
    pub is_matrix: bool,
    /// Vector length, or rows * columns for matrices
    pub components: u32,
    /// 0 for non-matrix formats
    pub matrix_rows: u32,
    /// 0 for non-matrix formats
    pub matrix_columns: u32,
    /// Bytes per component
    pub component_size: u64,
    /// Bytes for the whole value (tightly packed)
    pub size: u64,
}

impl DataFormatInfo {
    const fn vector(base_type: DataBaseType, components: u32, component_size: u64) -> Self {
        Self {
            base_type,
            is_matrix: false,
            components,
            matrix_rows: 0,
            matrix_columns: 0,
            component_size,
            size: component_size * components as u64,
        }
    }

    const fn matrix(columns: u32, rows: u32) -> Self {
        Self {
            base_type: DataBaseType::Float,
            is_matrix: true,
            components: columns * rows,
            matrix_rows: rows,
            matrix_columns: columns,
            component_size: 4,
            size: 4 * (columns * rows) as u64,
        }
    }
}

// Indexed by `DataFormat as usize`; order must follow the enum.
static CATALOG: [DataFormatInfo; DATA_FORMAT_COUNT] = [
    DataFormatInfo::vector(DataBaseType::Float, 1, 4), // Float
    DataFormatInfo::vector(DataBaseType::Float, 2, 4), // FloatVec2
    DataFormatInfo::vector(DataBaseType::Float, 3, 4), // FloatVec3
    DataFormatInfo::vector(DataBaseType::Float, 4, 4), // FloatVec4

    DataFormatInfo::matrix(2, 2), // FloatMat2x2
    DataFormatInfo::matrix(2, 3), // FloatMat2x3
    DataFormatInfo::matrix(2, 4), // FloatMat2x4
    DataFormatInfo::matrix(3, 2), // FloatMat3x2
    DataFormatInfo::matrix(3, 3), // FloatMat3x3
    DataFormatInfo::matrix(3, 4), // FloatMat3x4
    DataFormatInfo::matrix(4, 2), // FloatMat4x2
    DataFormatInfo::matrix(4, 3), // FloatMat4x3
    DataFormatInfo::matrix(4, 4), // FloatMat4x4

    DataFormatInfo::vector(DataBaseType::Int, 1, 4), // Int32
    DataFormatInfo::vector(DataBaseType::Int, 2, 4), // Int32Vec2
    DataFormatInfo::vector(DataBaseType::Int, 3, 4), // Int32Vec3
    DataFormatInfo::vector(DataBaseType::Int, 4, 4), // Int32Vec4

    DataFormatInfo::vector(DataBaseType::Uint, 1, 4), // Uint32
    DataFormatInfo::vector(DataBaseType::Uint, 2, 4), // Uint32Vec2
    DataFormatInfo::vector(DataBaseType::Uint, 3, 4), // Uint32Vec3
    DataFormatInfo::vector(DataBaseType::Uint, 4, 4), // Uint32Vec4

    DataFormatInfo::vector(DataBaseType::Snorm, 4, 1), // Snorm8Vec4
    DataFormatInfo::vector(DataBaseType::Unorm, 4, 1), // Unorm8Vec4
    DataFormatInfo::vector(DataBaseType::Int, 4, 1),   // Int8Vec4
    DataFormatInfo::vector(DataBaseType::Uint, 4, 1),  // Uint8Vec4

    DataFormatInfo::vector(DataBaseType::Snorm, 2, 2), // Snorm16Vec2
    DataFormatInfo::vector(DataBaseType::Snorm, 4, 2), // Snorm16Vec4
    DataFormatInfo::vector(DataBaseType::Unorm, 2, 2), // Unorm16Vec2
    DataFormatInfo::vector(DataBaseType::Unorm, 4, 2), // Unorm16Vec4
    DataFormatInfo::vector(DataBaseType::Int, 2, 2),   // Int16Vec2
    DataFormatInfo::vector(DataBaseType::Int, 4, 2),   // Int16Vec4

    DataFormatInfo::vector(DataBaseType::Uint, 1, 2), // Uint16
    DataFormatInfo::vector(DataBaseType::Uint, 2, 2), // Uint16Vec2
    DataFormatInfo::vector(DataBaseType::Uint, 4, 2), // Uint16Vec4

    DataFormatInfo::vector(DataBaseType::Bool, 1, 4), // Bool
    DataFormatInfo::vector(DataBaseType::Bool, 2, 4), // BoolVec2
    DataFormatInfo::vector(DataBaseType::Bool, 3, 4), // BoolVec3
    DataFormatInfo::vector(DataBaseType::Bool, 4, 4), // BoolVec4
];

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
