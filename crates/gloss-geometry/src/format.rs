//! Vertex format descriptors.
//!
//! A descriptor is a compact string such as `v3f:c4f:t3f` or `3f:4f:3f`.
//! Each `:`-separated block is one attribute laid out contiguously per vertex:
//! an optional semantic letter, a component count (1 to 4) and a component
//! type letter. Blocks without a semantic letter take their meaning from their
//! position (position, color, tex coord, then generic attributes).
//!
//! | Semantic | Meaning         | Type | Component |
//! |----------|-----------------|------|-----------|
//! | `v`      | position        | `b`  | `i8`      |
//! | `c`      | color           | `B`  | `u8`      |
//! | `t`      | tex coord       | `s`  | `i16`     |
//! | `n`      | normal          | `S`  | `u16`     |
//! | `f`      | fog coord       | `i`  | `i32`     |
//! | `s`      | secondary color | `I`  | `u32`     |
//! | `e`      | edge flag       | `f`  | `f32`     |
//! |          |                 | `d`  | `f64`     |

use crate::error::{GeometryError, GeometryResult};
use bitflags::bitflags;
use std::fmt;

/// Scalar type of one attribute component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl ComponentType {
    fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'b' => ComponentType::I8,
            'B' => ComponentType::U8,
            's' => ComponentType::I16,
            'S' => ComponentType::U16,
            'i' => ComponentType::I32,
            'I' => ComponentType::U32,
            'f' => ComponentType::F32,
            'd' => ComponentType::F64,
            _ => return None,
        })
    }

    /// Descriptor letter for this type.
    pub fn code(self) -> char {
        match self {
            ComponentType::I8 => 'b',
            ComponentType::U8 => 'B',
            ComponentType::I16 => 's',
            ComponentType::U16 => 'S',
            ComponentType::I32 => 'i',
            ComponentType::U32 => 'I',
            ComponentType::F32 => 'f',
            ComponentType::F64 => 'd',
        }
    }

    /// Size of one component in bytes.
    pub fn size(self) -> usize {
        match self {
            ComponentType::I8 | ComponentType::U8 => 1,
            ComponentType::I16 | ComponentType::U16 => 2,
            ComponentType::I32 | ComponentType::U32 | ComponentType::F32 => 4,
            ComponentType::F64 => 8,
        }
    }
}

/// What an attribute feeds in the vertex stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Position,
    Color,
    TexCoord,
    Normal,
    FogCoord,
    SecondaryColor,
    EdgeFlag,
    /// Unnamed attribute, numbered in declaration order.
    Generic(u8),
}

impl AttributeKind {
    fn from_letter(letter: char) -> Option<Self> {
        Some(match letter {
            'v' => AttributeKind::Position,
            'c' => AttributeKind::Color,
            't' => AttributeKind::TexCoord,
            'n' => AttributeKind::Normal,
            'f' => AttributeKind::FogCoord,
            's' => AttributeKind::SecondaryColor,
            'e' => AttributeKind::EdgeFlag,
            _ => return None,
        })
    }

    fn positional(slot: usize) -> Self {
        match slot {
            0 => AttributeKind::Position,
            1 => AttributeKind::Color,
            2 => AttributeKind::TexCoord,
            n => AttributeKind::Generic((n - 3) as u8),
        }
    }

    /// Semantic letter, `None` for generic attributes.
    pub fn letter(self) -> Option<char> {
        match self {
            AttributeKind::Position => Some('v'),
            AttributeKind::Color => Some('c'),
            AttributeKind::TexCoord => Some('t'),
            AttributeKind::Normal => Some('n'),
            AttributeKind::FogCoord => Some('f'),
            AttributeKind::SecondaryColor => Some('s'),
            AttributeKind::EdgeFlag => Some('e'),
            AttributeKind::Generic(_) => None,
        }
    }

    /// The mask bit selecting this attribute.
    pub fn mask(self) -> AttributeMask {
        match self {
            AttributeKind::Position => AttributeMask::POSITION,
            AttributeKind::Color => AttributeMask::COLOR,
            AttributeKind::TexCoord => AttributeMask::TEX_COORD,
            AttributeKind::Normal => AttributeMask::NORMAL,
            AttributeKind::FogCoord => AttributeMask::FOG_COORD,
            AttributeKind::SecondaryColor => AttributeMask::SECONDARY_COLOR,
            AttributeKind::EdgeFlag => AttributeMask::EDGE_FLAG,
            AttributeKind::Generic(_) => AttributeMask::GENERIC,
        }
    }
}

bitflags! {
    /// Subset of attributes to bind for a draw.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttributeMask: u8 {
        const POSITION = 1 << 0;
        const COLOR = 1 << 1;
        const TEX_COORD = 1 << 2;
        const NORMAL = 1 << 3;
        const FOG_COORD = 1 << 4;
        const SECONDARY_COLOR = 1 << 5;
        const EDGE_FLAG = 1 << 6;
        const GENERIC = 1 << 7;
    }
}

impl AttributeMask {
    /// Build a mask from semantic letters, e.g. `"vtc"`.
    ///
    /// `g` selects generic attributes; unknown letters are ignored.
    pub fn from_letters(letters: &str) -> Self {
        letters.chars().fold(AttributeMask::empty(), |mask, letter| {
            let bit = match letter {
                'g' => AttributeMask::GENERIC,
                other => AttributeKind::from_letter(other)
                    .map(AttributeKind::mask)
                    .unwrap_or(AttributeMask::empty()),
            };
            mask | bit
        })
    }
}

impl Default for AttributeMask {
    fn default() -> Self {
        AttributeMask::all()
    }
}

/// One attribute of a vertex format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub kind: AttributeKind,
    pub components: u8,
    pub component_type: ComponentType,
    /// Byte offset from the start of the vertex.
    pub offset: usize,
}

impl VertexAttribute {
    /// Size of the attribute in bytes.
    pub fn size(&self) -> usize {
        self.components as usize * self.component_type.size()
    }

    fn same_layout(&self, other: &VertexAttribute) -> bool {
        self.components == other.components
            && self.component_type == other.component_type
            && self.offset == other.offset
    }
}

/// A parsed vertex format: attributes in declaration order plus stride.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexFormat {
    attributes: Vec<VertexAttribute>,
    stride: usize,
}

impl VertexFormat {
    /// Parse a descriptor string.
    pub fn parse(descriptor: &str) -> GeometryResult<Self> {
        let invalid = |reason: String| GeometryError::InvalidFormat {
            descriptor: descriptor.to_string(),
            reason,
        };

        if descriptor.trim().is_empty() {
            return Err(invalid("descriptor is empty".to_string()));
        }

        let mut attributes: Vec<VertexAttribute> = Vec::new();
        let mut offset = 0;

        for (slot, block) in descriptor.split(':').enumerate() {
            let block = block.trim();
            if !block.is_ascii() {
                return Err(invalid(format!("malformed block '{}'", block)));
            }

            let (kind, rest) = match block.chars().next() {
                Some(first) if first.is_ascii_alphabetic() => {
                    let kind = AttributeKind::from_letter(first).ok_or_else(|| {
                        invalid(format!("unknown attribute semantic '{}'", first))
                    })?;
                    (kind, &block[1..])
                }
                Some(_) => (AttributeKind::positional(slot), block),
                None => return Err(invalid("empty attribute block".to_string())),
            };

            let digits = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            let (count, code) = rest.split_at(digits);

            let components: u8 = count
                .parse()
                .map_err(|_| invalid(format!("missing component count in '{}'", block)))?;
            if !(1..=4).contains(&components) {
                return Err(invalid(format!(
                    "component count {} in '{}' is not between 1 and 4",
                    components, block
                )));
            }

            let mut code_chars = code.chars();
            let component_type = match (code_chars.next(), code_chars.next()) {
                (Some(code), None) => ComponentType::from_code(code)
                    .ok_or_else(|| invalid(format!("unknown component type '{}'", code)))?,
                _ => return Err(invalid(format!("malformed block '{}'", block))),
            };

            validate_kind(kind, components).map_err(invalid)?;

            if attributes.iter().any(|a| a.kind == kind) {
                return Err(invalid(format!("attribute {:?} declared twice", kind)));
            }

            let attribute = VertexAttribute {
                kind,
                components,
                component_type,
                offset,
            };
            offset += attribute.size();
            attributes.push(attribute);
        }

        Ok(Self {
            attributes,
            stride: offset,
        })
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Size of one vertex in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Look up the attribute with the given semantic.
    pub fn attribute(&self, kind: AttributeKind) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.kind == kind)
    }

    /// The attributes selected by `mask`, in declaration order.
    pub fn select(&self, mask: AttributeMask) -> Vec<VertexAttribute> {
        self.attributes
            .iter()
            .filter(|a| mask.contains(a.kind.mask()))
            .copied()
            .collect()
    }

    /// Whether vertex data laid out as `other` can be stored in this format.
    ///
    /// Only byte layout matters: stride, and per attribute the component
    /// count, component type and offset. Semantics may differ.
    pub fn is_compatible(&self, other: &VertexFormat) -> bool {
        self.stride == other.stride
            && self.attributes.len() == other.attributes.len()
            && self
                .attributes
                .iter()
                .zip(&other.attributes)
                .all(|(a, b)| a.same_layout(b))
    }
}

impl fmt::Display for VertexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attribute) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            if let Some(letter) = attribute.kind.letter() {
                write!(f, "{}", letter)?;
            }
            write!(
                f,
                "{}{}",
                attribute.components,
                attribute.component_type.code()
            )?;
        }
        Ok(())
    }
}

impl std::str::FromStr for VertexFormat {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VertexFormat::parse(s)
    }
}

fn validate_kind(kind: AttributeKind, components: u8) -> Result<(), String> {
    match kind {
        AttributeKind::Position if components < 2 => {
            Err("position needs 2, 3 or 4 components".to_string())
        }
        AttributeKind::Color | AttributeKind::SecondaryColor if components < 3 => {
            Err("colors need 3 or 4 components".to_string())
        }
        AttributeKind::Normal if components != 3 => Err("normals need 3 components".to_string()),
        AttributeKind::EdgeFlag if components != 1 => {
            Err("edge flags need 1 component".to_string())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_format() {
        let format = VertexFormat::parse("v3f:c4f:t3f").unwrap();
        assert_eq!(format.stride(), 40);
        assert_eq!(format.attributes().len(), 3);

        let tex = format.attribute(AttributeKind::TexCoord).unwrap();
        assert_eq!(tex.offset, 28);
        assert_eq!(tex.components, 3);
        assert_eq!(tex.component_type, ComponentType::F32);
    }

    #[test]
    fn test_positional_semantics() {
        let format = VertexFormat::parse("3f:4f:4f").unwrap();
        let kinds: Vec<_> = format.attributes().iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AttributeKind::Position,
                AttributeKind::Color,
                AttributeKind::TexCoord
            ]
        );
        assert_eq!(format.stride(), 44);
        assert_eq!(format.to_string(), "v3f:c4f:t4f");
    }

    #[test]
    fn test_generic_attributes_follow_positional_ones() {
        let format = VertexFormat::parse("2f:4B:2f:1f").unwrap();
        assert_eq!(format.attributes()[3].kind, AttributeKind::Generic(0));
        assert_eq!(format.stride(), 8 + 4 + 8 + 4);
    }

    #[test]
    fn test_mixed_types_offsets() {
        let format = VertexFormat::parse("v2d:c4B").unwrap();
        assert_eq!(format.attributes()[1].offset, 16);
        assert_eq!(format.stride(), 20);
    }

    #[test]
    fn test_rejects_bad_descriptors() {
        for bad in ["", "v3x", "v5f", "q3f", "v3f:c4f:", "v3ff", "v0f", "v3f:v3f", "c2f"] {
            assert!(
                matches!(
                    VertexFormat::parse(bad),
                    Err(GeometryError::InvalidFormat { .. })
                ),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_compatibility_ignores_semantics() {
        let named = VertexFormat::parse("v3f:c4f:t3f").unwrap();
        let plain = VertexFormat::parse("3f:4f:3f").unwrap();
        let wider = VertexFormat::parse("3f:4f:4f").unwrap();
        assert!(named.is_compatible(&plain));
        assert!(!named.is_compatible(&wider));
    }

    #[test]
    fn test_mask_from_letters() {
        let mask = AttributeMask::from_letters("vtc");
        assert_eq!(
            mask,
            AttributeMask::POSITION | AttributeMask::TEX_COORD | AttributeMask::COLOR
        );

        let format = VertexFormat::parse("v3f:c4f:t3f").unwrap();
        let selected = format.select(AttributeMask::from_letters("vt"));
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[1].kind, AttributeKind::TexCoord);
    }
}
