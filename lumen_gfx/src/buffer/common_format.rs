/// Canonical vertex layouts and built-in attribute names
///
/// Tags read as attribute groups: XY/XYZ = position, ST/STP = texcoord,
/// RGBA = color; the suffix is the component type (f = float,
/// ub = unsigned normalized byte, us = unsigned normalized short).

use std::fmt;
use std::str::FromStr;
use crate::error::Error;
use crate::format::DataFormat;
use crate::buffer::DataDeclaration;

// ===== BUILTIN ATTRIBUTES =====

/// Attribute names shaders bind common layouts by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinAttribute {
    Position,
    TexCoord,
    Color,
}

impl BuiltinAttribute {
    pub const ALL: [BuiltinAttribute; 3] = [
        BuiltinAttribute::Position,
        BuiltinAttribute::TexCoord,
        BuiltinAttribute::Color,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinAttribute::Position => "position",
            BuiltinAttribute::TexCoord => "texcoord",
            BuiltinAttribute::Color => "color",
        }
    }

    fn declare(self, format: DataFormat) -> DataDeclaration {
        DataDeclaration::new(self.name(), format)
    }
}

impl fmt::Display for BuiltinAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinAttribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuiltinAttribute::ALL
            .iter()
            .copied()
            .find(|attribute| attribute.name() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("Invalid built-in attribute '{}'", s)))
    }
}

// ===== COMMON FORMAT =====

/// Predefined vertex layouts
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonFormat {
    None,
    XYf,
    XYZf,
    RGBAub,
    STf_RGBAub,
    STPf_RGBAub,
    XYf_STf,
    XYf_STPf,
    XYf_STf_RGBAub,
    XYf_STus_RGBAub,
    XYf_STPf_RGBAub,
}

impl CommonFormat {
    pub const ALL: [CommonFormat; 11] = [
        CommonFormat::None,
        CommonFormat::XYf,
        CommonFormat::XYZf,
        CommonFormat::RGBAub,
        CommonFormat::STf_RGBAub,
        CommonFormat::STPf_RGBAub,
        CommonFormat::XYf_STf,
        CommonFormat::XYf_STPf,
        CommonFormat::XYf_STf_RGBAub,
        CommonFormat::XYf_STus_RGBAub,
        CommonFormat::XYf_STPf_RGBAub,
    ];

    /// Ordered declarations for this layout (empty for `None`)
    pub fn declarations(self) -> Vec<DataDeclaration> {
        use BuiltinAttribute::{Color, Position, TexCoord};

        match self {
            CommonFormat::None => Vec::new(),
            CommonFormat::XYf => vec![Position.declare(DataFormat::FloatVec2)],
            CommonFormat::XYZf => vec![Position.declare(DataFormat::FloatVec3)],
            CommonFormat::RGBAub => vec![Color.declare(DataFormat::Unorm8Vec4)],
            CommonFormat::STf_RGBAub => vec![
                TexCoord.declare(DataFormat::FloatVec2),
                Color.declare(DataFormat::Unorm8Vec4),
            ],
            CommonFormat::STPf_RGBAub => vec![
                TexCoord.declare(DataFormat::FloatVec3),
                Color.declare(DataFormat::Unorm8Vec4),
            ],
            CommonFormat::XYf_STf => vec![
                Position.declare(DataFormat::FloatVec2),
                TexCoord.declare(DataFormat::FloatVec2),
            ],
            CommonFormat::XYf_STPf => vec![
                Position.declare(DataFormat::FloatVec2),
                TexCoord.declare(DataFormat::FloatVec3),
            ],
            CommonFormat::XYf_STf_RGBAub => vec![
                Position.declare(DataFormat::FloatVec2),
                TexCoord.declare(DataFormat::FloatVec2),
                Color.declare(DataFormat::Unorm8Vec4),
            ],
            CommonFormat::XYf_STus_RGBAub => vec![
                Position.declare(DataFormat::FloatVec2),
                TexCoord.declare(DataFormat::Unorm16Vec2),
                Color.declare(DataFormat::Unorm8Vec4),
            ],
            // Two-component texcoord despite the name
            CommonFormat::XYf_STPf_RGBAub => vec![
                Position.declare(DataFormat::FloatVec2),
                TexCoord.declare(DataFormat::FloatVec2),
                Color.declare(DataFormat::Unorm8Vec4),
            ],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CommonFormat::None => "none",
            CommonFormat::XYf => "XYf",
            CommonFormat::XYZf => "XYZf",
            CommonFormat::RGBAub => "RGBAub",
            CommonFormat::STf_RGBAub => "STf_RGBAub",
            CommonFormat::STPf_RGBAub => "STPf_RGBAub",
            CommonFormat::XYf_STf => "XYf_STf",
            CommonFormat::XYf_STPf => "XYf_STPf",
            CommonFormat::XYf_STf_RGBAub => "XYf_STf_RGBAub",
            CommonFormat::XYf_STus_RGBAub => "XYf_STus_RGBAub",
            CommonFormat::XYf_STPf_RGBAub => "XYf_STPf_RGBAub",
        }
    }
}

impl fmt::Display for CommonFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CommonFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommonFormat::ALL
            .iter()
            .copied()
            .find(|format| format.name() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("Invalid common format '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Buffer, BufferSettings};
    use crate::capabilities::Capabilities;

    fn formats(format: CommonFormat) -> Vec<(String, DataFormat)> {
        format.declarations().into_iter().map(|d| (d.name, d.format)).collect()
    }

    #[test]
    fn test_none_is_empty() {
        assert!(CommonFormat::None.declarations().is_empty());
    }

    #[test]
    fn test_none_is_rejected_by_layout() {
        let result = Buffer::new(
            &Capabilities::new(),
            &BufferSettings::default(),
            &CommonFormat::None.declarations(),
            0,
            4,
        );
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_xyf_stf_rgbaub() {
        assert_eq!(
            formats(CommonFormat::XYf_STf_RGBAub),
            vec![
                ("position".to_string(), DataFormat::FloatVec2),
                ("texcoord".to_string(), DataFormat::FloatVec2),
                ("color".to_string(), DataFormat::Unorm8Vec4),
            ]
        );
    }

    #[test]
    fn test_stp_texcoord_components() {
        assert_eq!(formats(CommonFormat::XYf_STPf)[1].1, DataFormat::FloatVec3);
        assert_eq!(formats(CommonFormat::STPf_RGBAub)[0].1, DataFormat::FloatVec3);
        assert_eq!(formats(CommonFormat::XYf_STPf_RGBAub)[1].1, DataFormat::FloatVec2);
        assert_eq!(formats(CommonFormat::XYf_STus_RGBAub)[1].1, DataFormat::Unorm16Vec2);
    }

    #[test]
    fn test_xy_stp_rgba_stride_matches_st_rgba() {
        let caps = Capabilities::new();
        let settings = BufferSettings::default();
        let stp = Buffer::new(&caps, &settings, &CommonFormat::XYf_STPf_RGBAub.declarations(), 0, 4).unwrap();
        let st = Buffer::new(&caps, &settings, &CommonFormat::XYf_STf_RGBAub.declarations(), 0, 4).unwrap();
        assert_eq!(stp.array_stride(), 20);
        assert_eq!(stp.size(), 80);
        assert_eq!(stp.array_stride(), st.array_stride());
    }

    #[test]
    fn test_every_layout_except_none_is_valid_vertex_data() {
        let caps = Capabilities::new();
        for format in CommonFormat::ALL.into_iter().filter(|f| *f != CommonFormat::None) {
            let buffer = Buffer::new(&caps, &BufferSettings::default(), &format.declarations(), 0, 1);
            assert!(buffer.is_ok(), "{} rejected", format);
        }
    }

    #[test]
    fn test_common_format_name_round_trip() {
        for format in CommonFormat::ALL {
            assert_eq!(format.to_string().parse::<CommonFormat>().unwrap(), format);
        }
        assert!("XYZWf".parse::<CommonFormat>().is_err());
    }

    #[test]
    fn test_builtin_attribute_names() {
        assert_eq!(BuiltinAttribute::Position.to_string(), "position");
        assert_eq!("texcoord".parse::<BuiltinAttribute>().unwrap(), BuiltinAttribute::TexCoord);
        assert_eq!("color".parse::<BuiltinAttribute>().unwrap(), BuiltinAttribute::Color);
        assert!("normal".parse::<BuiltinAttribute>().is_err());
    }
}
