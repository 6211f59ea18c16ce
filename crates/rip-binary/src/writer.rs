//! Sequential buffer writer.
//!
//! Mirrors [`AssetReader`](crate::AssetReader): every read operation has a
//! write counterpart that produces the bytes the reader consumes.

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use rip_model::{PPtr, Version};

use crate::error::{BinaryError, Result};
use crate::{Endian, align_offset, is_long_path_id};

/// Growable output buffer carrying the target engine version.
#[derive(Debug, Clone)]
pub struct AssetWriter {
    buffer: Vec<u8>,
    version: Version,
    endian: Endian,
}

impl AssetWriter {
    /// Create an empty little-endian writer.
    #[must_use]
    pub fn new(version: Version) -> Self {
        Self {
            buffer: Vec::new(),
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
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.buffer.push(value);
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(u8::from(value))
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        match self.endian {
            Endian::Little => self.buffer.write_i16::<LittleEndian>(value)?,
            Endian::Big => self.buffer.write_i16::<BigEndian>(value)?,
        }
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        match self.endian {
            Endian::Little => self.buffer.write_u16::<LittleEndian>(value)?,
            Endian::Big => self.buffer.write_u16::<BigEndian>(value)?,
        }
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        match self.endian {
            Endian::Little => self.buffer.write_i32::<LittleEndian>(value)?,
            Endian::Big => self.buffer.write_i32::<BigEndian>(value)?,
        }
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        match self.endian {
            Endian::Little => self.buffer.write_u32::<LittleEndian>(value)?,
            Endian::Big => self.buffer.write_u32::<BigEndian>(value)?,
        }
        Ok(())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        match self.endian {
            Endian::Little => self.buffer.write_i64::<LittleEndian>(value)?,
            Endian::Big => self.buffer.write_i64::<BigEndian>(value)?,
        }
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        match self.endian {
            Endian::Little => self.buffer.write_u64::<LittleEndian>(value)?,
            Endian::Big => self.buffer.write_u64::<BigEndian>(value)?,
        }
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        match self.endian {
            Endian::Little => self.buffer.write_f32::<LittleEndian>(value)?,
            Endian::Big => self.buffer.write_f32::<BigEndian>(value)?,
        }
        Ok(())
    }

    /// Write an `i32` length prefix.
    pub fn write_length(&mut self, length: usize) -> Result<()> {
        let prefix = i32::try_from(length).map_err(|_| BinaryError::LengthOverflow { length })?;
        self.write_i32(prefix)
    }

    pub fn write_byte_array(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_length(bytes.len())?;
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_byte_array(value.as_bytes())
    }

    /// Write a count-prefixed array, calling `write` once per element.
    pub fn write_array<T, F>(&mut self, items: &[T], mut write: F) -> Result<()>
    where
        F: FnMut(&mut Self, &T) -> Result<()>,
    {
        self.write_length(items.len())?;
        for item in items {
            write(self, item)?;
        }
        Ok(())
    }

    /// Write a weak reference; the path id is 64-bit from 5.0 onward.
    pub fn write_pptr(&mut self, pptr: PPtr) -> Result<()> {
        self.write_i32(pptr.file_id)?;
        if is_long_path_id(&self.version) {
            self.write_i64(pptr.path_id)
        } else {
            let path_id = i32::try_from(pptr.path_id).map_err(|_| BinaryError::PathIdOverflow {
                path_id: pptr.path_id,
            })?;
            self.write_i32(path_id)
        }
    }

    /// Pad with zero bytes up to the next multiple of `alignment`.
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        let target = align_offset(self.buffer.len(), alignment)?;
        self.buffer.resize(target, 0);
        Ok(())
    }

    pub fn align4(&mut self) -> Result<()> {
        self.align(4)
    }
}
