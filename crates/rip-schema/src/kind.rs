//! Field kinds.

use std::fmt;
use std::str::FromStr;

/// Declared kind of a field, as written in schema tables.
///
/// Anything that is not a primitive or `array<...>` names a record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Bool,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    String,
    Bytes,
    PPtr,
    Array(Box<FieldKind>),
    Record(String),
}

impl FieldKind {
    /// Whether the kind is a fixed-width integer.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::U8 | Self::I16 | Self::U16 | Self::I32 | Self::U32 | Self::I64 | Self::U64
        )
    }

    /// Whether values of this kind may be read through another wire primitive.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        self.is_integer() || matches!(self, Self::Bool | Self::F32)
    }

    /// Whether a field of this kind may be read from `wire`.
    #[must_use]
    pub fn accepts_wire(&self, wire: &Self) -> bool {
        self == wire || (self.is_integer() && wire.is_integer())
    }

    /// Encoded width of a scalar kind in bytes.
    #[must_use]
    pub const fn width(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 => Some(1),
            Self::I16 | Self::U16 => Some(2),
            Self::I32 | Self::U32 | Self::F32 => Some(4),
            Self::I64 | Self::U64 => Some(8),
            _ => None,
        }
    }

    /// Whether `value` is representable in this integer kind.
    ///
    /// 64-bit unsigned values are stored bit-for-bit in an `i64`, so every
    /// `i64` fits a `u64` field.
    #[must_use]
    pub fn fits(&self, value: i64) -> bool {
        match self {
            Self::U8 => u8::try_from(value).is_ok(),
            Self::I16 => i16::try_from(value).is_ok(),
            Self::U16 => u16::try_from(value).is_ok(),
            Self::I32 => i32::try_from(value).is_ok(),
            Self::U32 => u32::try_from(value).is_ok(),
            Self::I64 | Self::U64 => true,
            _ => false,
        }
    }

    /// Record type this kind refers to, looking through arrays.
    #[must_use]
    pub fn record_name(&self) -> Option<&str> {
        match self {
            Self::Record(name) => Some(name),
            Self::Array(inner) => inner.record_name(),
            _ => None,
        }
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(inner) = s.strip_prefix("array<").and_then(|rest| rest.strip_suffix('>')) {
            return Ok(Self::Array(Box::new(inner.parse()?)));
        }
        let kind = match s {
            "bool" => Self::Bool,
            "u8" => Self::U8,
            "i16" => Self::I16,
            "u16" => Self::U16,
            "i32" => Self::I32,
            "u32" => Self::U32,
            "i64" => Self::I64,
            "u64" => Self::U64,
            "f32" => Self::F32,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            "pptr" => Self::PPtr,
            name if is_type_name(name) => Self::Record(name.to_string()),
            other => return Err(format!("`{other}` is not a field kind")),
        };
        Ok(kind)
    }
}

fn is_type_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::U8 => f.write_str("u8"),
            Self::I16 => f.write_str("i16"),
            Self::U16 => f.write_str("u16"),
            Self::I32 => f.write_str("i32"),
            Self::U32 => f.write_str("u32"),
            Self::I64 => f.write_str("i64"),
            Self::U64 => f.write_str("u64"),
            Self::F32 => f.write_str("f32"),
            Self::String => f.write_str("string"),
            Self::Bytes => f.write_str("bytes"),
            Self::PPtr => f.write_str("pptr"),
            Self::Array(inner) => write!(f, "array<{inner}>"),
            Self::Record(name) => f.write_str(name),
        }
    }
}
