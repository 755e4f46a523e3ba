/// Data declarations (caller input) and data members (resolved layout)

use crate::format::{DataFormat, DataFormatInfo};

/// A named field request
///
/// `array_length` is 0 for a plain value. No buffer type currently accepts
/// arrays, but the field is carried so the layout engine can reject them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataDeclaration {
    pub name: String,
    pub format: DataFormat,
    pub array_length: u32,
}

impl DataDeclaration {
    pub fn new(name: impl Into<String>, format: DataFormat) -> Self {
        Self {
            name: name.into(),
            format,
            array_length: 0,
        }
    }

    pub fn with_array_length(mut self, array_length: u32) -> Self {
        self.array_length = array_length;
        self
    }
}

/// A declaration with its position inside one buffer element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMember {
    pub decl: DataDeclaration,
    pub info: &'static DataFormatInfo,
    /// Bytes from the start of the element
    pub offset: u64,
    /// Bytes occupied by the member
    pub size: u64,
}

impl DataMember {
    pub(crate) fn new(decl: DataDeclaration, offset: u64) -> Self {
        let info = decl.format.info();
        Self {
            decl,
            info,
            offset,
            size: info.size,
        }
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn format(&self) -> DataFormat {
        self.decl.format
    }
}
