//! Sequential buffer reader.
//!
//! The reader walks an in-memory buffer front to back and carries the
//! buffer's engine [`Version`] so layout predicates can consult it.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use rip_model::{PPtr, Version};

use crate::error::{BinaryError, Result};
use crate::{Endian, align_offset, is_long_path_id};

/// Cursor over a serialized object buffer.
#[derive(Debug, Clone)]
pub struct AssetReader<'a> {
    data: &'a [u8],
    position: usize,
    version: Version,
    endian: Endian,
}

impl<'a> AssetReader<'a> {
    /// Create a little-endian reader positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8], version: Version) -> Self {
        Self {
            data,
            position: 0,
            version,
            endian: Endian::default(),
        }
    }

    /// Use the given byte order.
    #[must_use]
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    #[must_use]
    pub const fn endian(&self) -> Endian {
        self.endian
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    #[must_use]
    pub const fn is_at_end(&self) -> bool {
        self.position == self.data.len()
    }

    /// Consume `count` bytes.
    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let available = self.remaining();
        if count > available {
            return Err(BinaryError::BufferUnderrun {
                offset: self.position,
                needed: count,
                available,
            });
        }
        let data = self.data;
        let bytes = &data[self.position..self.position + count];
        self.position += count;
        Ok(bytes)
    }

    fn read_ordered<T>(
        &mut self,
        size: usize,
        little: fn(&[u8]) -> T,
        big: fn(&[u8]) -> T,
    ) -> Result<T> {
        let endian = self.endian;
        let bytes = self.take(size)?;
        Ok(match endian {
            Endian::Little => little(bytes),
            Endian::Big => big(bytes),
        })
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a one-byte boolean; any non-zero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_ordered(2, LittleEndian::read_i16, BigEndian::read_i16)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_ordered(2, LittleEndian::read_u16, BigEndian::read_u16)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_ordered(4, LittleEndian::read_i32, BigEndian::read_i32)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_ordered(4, LittleEndian::read_u32, BigEndian::read_u32)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.read_ordered(8, LittleEndian::read_i64, BigEndian::read_i64)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_ordered(8, LittleEndian::read_u64, BigEndian::read_u64)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_ordered(4, LittleEndian::read_f32, BigEndian::read_f32)
    }

    /// Read an `i32` length prefix.
    pub fn read_length(&mut self) -> Result<usize> {
        let offset = self.position;
        let length = self.read_i32()?;
        usize::try_from(length).map_err(|_| BinaryError::NegativeLength { offset, length })
    }

    /// Read a length-prefixed byte array.
    pub fn read_byte_array(&mut self) -> Result<Vec<u8>> {
        let length = self.read_length()?;
        Ok(self.take(length)?.to_vec())
    }

    /// Read a length-prefixed UTF-8 string. Alignment is left to the caller.
    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_length()?;
        let offset = self.position;
        let bytes = self.take(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| BinaryError::InvalidUtf8 { offset })
    }

    /// Read a count-prefixed array, calling `read` once per element.
    pub fn read_array<T, F>(&mut self, mut read: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        let count = self.read_length()?;
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(read(self)?);
        }
        Ok(items)
    }

    /// Read a weak reference; the path id is 64-bit from 5.0 onward.
    pub fn read_pptr(&mut self) -> Result<PPtr> {
        let file_id = self.read_i32()?;
        let path_id = if is_long_path_id(&self.version) {
            self.read_i64()?
        } else {
            i64::from(self.read_i32()?)
        };
        Ok(PPtr::new(file_id, path_id))
    }

    /// Advance to the next multiple of `alignment` (a power of two).
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let target = align_offset(self.position, alignment)?;
        let needed = target - self.position;
        self.take(needed)?;
        Ok(())
    }

    /// Shorthand for the common four-byte alignment.
    pub fn align4(&mut self) -> Result<()> {
        self.align(4)
    }
}
