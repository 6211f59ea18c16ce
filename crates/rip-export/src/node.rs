//! The export tree.

use serde::Serialize;

/// A leaf value, already narrowed to its declared width.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f32),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceStyle {
    /// One `- item` per line.
    Block,
    /// `[a, b]`.
    Flow,
    /// Byte items written as one run of hex digits.
    RawHex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStyle {
    Block,
    /// `{key: value, ...}`.
    Flow,
}

/// Ordered export node. Key and item order is significant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum ExportNode {
    Scalar { value: Scalar },
    Sequence {
        style: SequenceStyle,
        items: Vec<ExportNode>,
    },
    Mapping {
        style: MappingStyle,
        entries: Vec<(String, ExportNode)>,
    },
}

impl ExportNode {
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        Self::Scalar {
            value: value.into(),
        }
    }

    #[must_use]
    pub fn bytes(bytes: &[u8]) -> Self {
        Self::Sequence {
            style: SequenceStyle::RawHex,
            items: bytes
                .iter()
                .map(|byte| Self::scalar(i64::from(*byte)))
                .collect(),
        }
    }

    #[must_use]
    pub const fn mapping(style: MappingStyle, entries: Vec<(String, ExportNode)>) -> Self {
        Self::Mapping { style, entries }
    }

    /// Value under `key` when this node is a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ExportNode> {
        match self {
            Self::Mapping { entries, .. } => entries
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, node)| node),
            _ => None,
        }
    }

    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Self::Mapping { entries, .. } => entries.iter().map(|(name, _)| name.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar { value } => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}
