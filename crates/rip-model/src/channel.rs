//! Vertex channel descriptor.
//!
//! A channel is a fixed four-byte record `(stream, offset, format,
//! dimension)` with no version gating. Its stride is the element size of
//! the format times the dimension; a channel with dimension 0 is unset.

use std::fmt;

use crate::error::{ModelError, Result};
use crate::value::Record;

/// Element format of a vertex channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChannelFormat {
    Float = 0,
    Float16 = 1,
    Color = 2,
    Byte = 3,
    UInt32 = 4,
}

impl ChannelFormat {
    pub const ALL: [Self; 5] = [
        Self::Float,
        Self::Float16,
        Self::Color,
        Self::Byte,
        Self::UInt32,
    ];

    /// Byte size of one element.
    #[must_use]
    pub const fn size(self) -> u8 {
        match self {
            Self::Float | Self::UInt32 => 4,
            Self::Float16 => 2,
            Self::Color | Self::Byte => 1,
        }
    }
}

impl TryFrom<u8> for ChannelFormat {
    type Error = ModelError;

    fn try_from(format: u8) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| *candidate as u8 == format)
            .ok_or(ModelError::UnknownFormat { format })
    }
}

/// Stream/offset/format/dimension descriptor of one vertex channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChannelInfo {
    pub stream: u8,
    pub offset: u8,
    pub format: u8,
    pub dimension: u8,
}

impl ChannelInfo {
    #[must_use]
    pub const fn new(stream: u8, offset: u8, format: ChannelFormat, dimension: u8) -> Self {
        Self {
            stream,
            offset,
            format: format as u8,
            dimension,
        }
    }

    /// Stride of `dimension` elements of `format`.
    #[must_use]
    pub const fn calculate_stride(format: ChannelFormat, dimension: u8) -> u32 {
        format.size() as u32 * dimension as u32
    }

    pub fn channel_format(&self) -> Result<ChannelFormat> {
        ChannelFormat::try_from(self.format)
    }

    /// Byte stride of this channel.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownFormat`] when the format byte is not in the table.
    pub fn stride(&self) -> Result<u32> {
        Ok(Self::calculate_stride(self.channel_format()?, self.dimension))
    }

    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.dimension > 0
    }
}

impl TryFrom<&Record> for ChannelInfo {
    type Error = ModelError;

    fn try_from(record: &Record) -> Result<Self> {
        let byte = |field: &str| -> Result<u8> {
            u8::try_from(record.int(field)?).map_err(|_| ModelError::FieldType {
                field: field.to_string(),
                expected: "a byte",
            })
        };
        Ok(Self {
            stream: byte("stream")?,
            offset: byte("offset")?,
            format: byte("format")?,
            dimension: byte("dimension")?,
        })
    }
}

impl fmt::Display for ChannelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S[{}];\tO[{}];\tF[{}];\tD[{}]",
            self.stream, self.offset, self.format, self.dimension
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn stride_uses_element_size() {
        let position = ChannelInfo::new(0, 0, ChannelFormat::Float, 3);
        assert_eq!(position.stride().unwrap(), 12);

        let color = ChannelInfo::new(0, 24, ChannelFormat::Color, 4);
        assert_eq!(color.stride().unwrap(), 4);

        let half_uv = ChannelInfo::new(1, 0, ChannelFormat::Float16, 2);
        assert_eq!(half_uv.stride().unwrap(), 4);
    }

    #[test]
    fn unset_channel() {
        let channel = ChannelInfo::default();
        assert!(!channel.is_set());
        assert_eq!(channel.stride().unwrap(), 0);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let channel = ChannelInfo {
            format: 9,
            dimension: 1,
            ..ChannelInfo::default()
        };
        assert!(matches!(
            channel.stride(),
            Err(ModelError::UnknownFormat { format: 9 })
        ));
    }

    #[test]
    fn converts_from_record() {
        let record = Record::new("ChannelInfo")
            .with("stream", Value::Int(1))
            .with("offset", Value::Int(12))
            .with("format", Value::Int(0))
            .with("dimension", Value::Int(2));
        let channel = ChannelInfo::try_from(&record).unwrap();
        assert_eq!(channel, ChannelInfo::new(1, 12, ChannelFormat::Float, 2));
    }
}
