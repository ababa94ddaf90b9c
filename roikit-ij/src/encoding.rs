//! Byte-order aware field access and the packed float parameter.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Byte order of multi-byte record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ByteOrder {
    /// ImageJ's native order.
    #[default]
    Big,
    Little,
}

macro_rules! read_fn {
    ($name:ident, $ty:ty, $n:expr) => {
        #[doc = concat!("Reads a `", stringify!($ty), "` at `offset`.")]
        pub fn $name(&self, offset: usize) -> Result<$ty> {
            let bytes: [u8; $n] = self.array(offset)?;
            Ok(match self.order {
                ByteOrder::Big => <$ty>::from_be_bytes(bytes),
                ByteOrder::Little => <$ty>::from_le_bytes(bytes),
            })
        }
    };
}

macro_rules! write_fn {
    ($name:ident, $ty:ty) => {
        #[doc = concat!("Writes a `", stringify!($ty), "` at `offset`, growing the buffer.")]
        pub fn $name(&mut self, offset: usize, value: $ty) {
            let bytes = match self.order {
                ByteOrder::Big => value.to_be_bytes(),
                ByteOrder::Little => value.to_le_bytes(),
            };
            self.put_bytes(offset, &bytes);
        }
    };
}

/// Bounds-checked reader over a record's bytes.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    order: ByteOrder,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader.
    #[must_use]
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self { data, order }
    }

    /// Total length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if there are no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::Truncated`] if the range is out of bounds.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or(Error::Truncated { offset, len })
    }

    fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.slice(offset, N)?);
        Ok(out)
    }

    /// Reads a byte at `offset`.
    ///
    /// # Errors
    /// Returns [`Error::Truncated`] if `offset` is out of bounds.
    pub fn u8(&self, offset: usize) -> Result<u8> {
        Ok(self.array::<1>(offset)?[0])
    }

    read_fn!(u16, u16, 2);
    read_fn!(i16, i16, 2);
    read_fn!(i32, i32, 4);
    read_fn!(f32, f32, 4);
}

/// Growable writer that places fields at absolute offsets.
#[derive(Debug, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
    order: ByteOrder,
}

impl ByteWriter {
    /// Creates a zero-filled writer of `len` bytes.
    #[must_use]
    pub fn with_len(len: usize, order: ByteOrder) -> Self {
        Self {
            buf: vec![0; len],
            order,
        }
    }

    /// Copies `bytes` to `offset`, zero-filling any gap.
    pub fn put_bytes(&mut self, offset: usize, bytes: &[u8]) {
        let end = offset + bytes.len();
        if self.buf.len() < end {
            self.buf.resize(end, 0);
        }
        self.buf[offset..end].copy_from_slice(bytes);
    }

    /// Writes a byte at `offset`.
    pub fn put_u8(&mut self, offset: usize, value: u8) {
        self.put_bytes(offset, &[value]);
    }

    write_fn!(put_u16, u16);
    write_fn!(put_i16, i16);
    write_fn!(put_i32, i32);
    write_fn!(put_f32, f32);

    /// Returns the written bytes.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Packs a float into the three legacy fields at header offset 52.
///
/// ImageJ stores the ellipse aspect ratio and the rotated-rectangle width as
/// one 32-bit float over the arrow style byte, the arrow head size byte and
/// the rounded-rect arc size short. The float's bytes are reinterpreted
/// as-is in the given byte order.
#[must_use]
pub fn encode_rotated_roi_width(width: f32, order: ByteOrder) -> (u8, u8, i16) {
    let bytes = match order {
        ByteOrder::Big => width.to_be_bytes(),
        ByteOrder::Little => width.to_le_bytes(),
    };
    let tail = [bytes[2], bytes[3]];
    let arc = match order {
        ByteOrder::Big => i16::from_be_bytes(tail),
        ByteOrder::Little => i16::from_le_bytes(tail),
    };
    (bytes[0], bytes[1], arc)
}

/// Inverse of [`encode_rotated_roi_width`].
#[must_use]
pub fn decode_rotated_roi_width(fields: (u8, u8, i16), order: ByteOrder) -> f32 {
    let (style, head, arc) = fields;
    let tail = match order {
        ByteOrder::Big => arc.to_be_bytes(),
        ByteOrder::Little => arc.to_le_bytes(),
    };
    let bytes = [style, head, tail[0], tail[1]];
    match order {
        ByteOrder::Big => f32::from_be_bytes(bytes),
        ByteOrder::Little => f32::from_le_bytes(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_packing_big_endian() {
        // 0.5f32 = 0x3F000000
        assert_eq!(encode_rotated_roi_width(0.5, ByteOrder::Big), (0x3F, 0x00, 0));
        // 12.25f32 = 0x41440000
        assert_eq!(
            encode_rotated_roi_width(12.25, ByteOrder::Big),
            (0x41, 0x44, 0)
        );
        // 0.1f32 = 0x3DCCCCCD, tail 0xCCCD read as a signed short
        let packed = encode_rotated_roi_width(0.1, ByteOrder::Big);
        assert_eq!(packed, (0x3D, 0xCC, i16::from_be_bytes([0xCC, 0xCD])));
        assert!(packed.2 < 0);
    }

    #[test]
    fn test_width_packing_little_endian() {
        // little-endian bytes of 0.1f32: CD CC CC 3D
        let packed = encode_rotated_roi_width(0.1, ByteOrder::Little);
        assert_eq!(packed, (0xCD, 0xCC, i16::from_le_bytes([0xCC, 0x3D])));
    }

    #[test]
    fn test_width_packing_is_bit_exact() {
        for order in [ByteOrder::Big, ByteOrder::Little] {
            for value in [0.0f32, 1.0, 0.333_333_34, 57.125, -3.5, f32::MIN_POSITIVE] {
                let back = decode_rotated_roi_width(encode_rotated_roi_width(value, order), order);
                assert_eq!(back.to_bits(), value.to_bits());
            }
        }
    }

    #[test]
    fn test_reader_bounds() {
        let data = [0x00, 0xE4, 0x3F, 0x80, 0x00, 0x00];
        let reader = ByteReader::new(&data, ByteOrder::Big);
        assert_eq!(reader.u16(0).unwrap(), 228);
        assert_eq!(reader.f32(2).unwrap(), 1.0);
        assert!(matches!(
            reader.i32(4),
            Err(Error::Truncated { offset: 4, len: 4 })
        ));
    }

    #[test]
    fn test_writer_grows() {
        let mut writer = ByteWriter::with_len(2, ByteOrder::Little);
        writer.put_i16(4, -2);
        assert_eq!(writer.into_inner(), vec![0, 0, 0, 0, 0xFE, 0xFF]);
    }
}
