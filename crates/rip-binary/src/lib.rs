//! Version-aware cursors over serialized asset buffers.
//!
//! Every primitive the engine needs to decode or encode an object lives here:
//! fixed-width integers, floats, booleans, length-prefixed strings and byte
//! arrays, count-prefixed arrays, weak references and alignment padding.
//!
//! Both cursors carry the engine [`Version`] of the buffer. The only layout
//! decision made at this level is the width of a reference's path id, which
//! grew from 32 to 64 bits in 5.0.
//!
//! # Example
//!
//! ```
//! use rip_binary::{AssetReader, AssetWriter};
//!
//! let version = "5.5.0f3".parse().unwrap();
//! let mut writer = AssetWriter::new(version);
//! writer.write_bool(true).unwrap();
//! writer.align4().unwrap();
//! writer.write_string("Hero").unwrap();
//!
//! let bytes = writer.into_inner();
//! let mut reader = AssetReader::new(&bytes, version);
//! assert!(reader.read_bool().unwrap());
//! reader.align4().unwrap();
//! assert_eq!(reader.read_string().unwrap(), "Hero");
//! assert!(reader.is_at_end());
//! ```

#![deny(unsafe_code)]

mod error;
mod reader;
mod writer;

use rip_model::Version;

pub use error::{BinaryError, Result};
pub use reader::AssetReader;
pub use writer::AssetWriter;

/// Byte order of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// Round `position` up to the next multiple of `alignment`.
///
/// `alignment` must be a non-zero power of two.
pub fn align_offset(position: usize, alignment: usize) -> Result<usize> {
    if !alignment.is_power_of_two() {
        return Err(BinaryError::InvalidAlignment { alignment });
    }
    let mask = alignment - 1;
    position
        .checked_add(mask)
        .map(|end| end & !mask)
        .ok_or(BinaryError::LengthOverflow { length: position })
}

/// Whether references in buffers of this version carry a 64-bit path id.
#[must_use]
pub fn is_long_path_id(version: &Version) -> bool {
    version.is_greater_equal((5, 0))
}
