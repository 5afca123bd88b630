//! Bounds-checked byte cursor over a borrowed datagram.

use crate::DecodeError;

/// Sequential reader over a byte slice.
///
/// Every read either returns the decoded value and advances the position, or
/// fails with [`DecodeError::TruncatedPacket`] and leaves the position where
/// it was. Floats that decode to NaN or infinity are normalised to `0.0`.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

macro_rules! int_readers {
    ($($le:ident, $be:ident => $ty:ty;)*) => {
        $(
            #[inline]
            pub fn $le(&mut self) -> Result<$ty, DecodeError> {
                self.array().map(<$ty>::from_le_bytes)
            }

            #[inline]
            pub fn $be(&mut self) -> Result<$ty, DecodeError> {
                self.array().map(<$ty>::from_be_bytes)
            }
        )*
    };
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn truncated(&self, needed: usize) -> DecodeError {
        DecodeError::TruncatedPacket {
            offset: self.pos,
            needed,
            remaining: self.remaining(),
        }
    }

    /// Borrow the next `len` bytes.
    pub fn fixed_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let data: &'a [u8] = self.data;
        let slice = self
            .pos
            .checked_add(len)
            .and_then(|end| data.get(self.pos..end));
        match slice {
            Some(bytes) => {
                self.pos = self.pos.saturating_add(len);
                Ok(bytes)
            }
            None => Err(self.truncated(len)),
        }
    }

    pub fn skip(&mut self, len: usize) -> Result<(), DecodeError> {
        self.fixed_bytes(len).map(|_| ())
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let bytes = self.fixed_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a NUL-padded string field of `len` bytes.
    ///
    /// Content after the first NUL is ignored and invalid UTF-8 is replaced
    /// lossily, so a garbled name never fails the whole packet.
    pub fn fixed_string(&mut self, len: usize) -> Result<String, DecodeError> {
        let bytes = self.fixed_bytes(len)?;
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        let text = bytes.get(..end).unwrap_or_default();
        Ok(String::from_utf8_lossy(text).trim().to_string())
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        self.array::<1>().map(|[b]| b)
    }

    #[inline]
    pub fn i8(&mut self) -> Result<i8, DecodeError> {
        self.array().map(i8::from_le_bytes)
    }

    int_readers! {
        u16_le, u16_be => u16;
        i16_le, i16_be => i16;
        u32_le, u32_be => u32;
        i32_le, i32_be => i32;
        u64_le, u64_be => u64;
    }

    #[inline]
    pub fn f32_le(&mut self) -> Result<f32, DecodeError> {
        let value = self.array().map(f32::from_le_bytes)?;
        Ok(if value.is_finite() { value } else { 0.0 })
    }

    #[inline]
    pub fn f64_le(&mut self) -> Result<f64, DecodeError> {
        let value = self.array().map(f64::from_le_bytes)?;
        Ok(if value.is_finite() { value } else { 0.0 })
    }

    /// Read `N` consecutive values with `read`.
    pub fn read_array<T, const N: usize, F>(&mut self, mut read: F) -> Result<[T; N], DecodeError>
    where
        T: Copy + Default,
        F: FnMut(&mut Self) -> Result<T, DecodeError>,
    {
        let mut out = [T::default(); N];
        for slot in &mut out {
            *slot = read(self)?;
        }
        Ok(out)
    }

    pub fn u8_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        self.array()
    }

    pub fn i8_array<const N: usize>(&mut self) -> Result<[i8; N], DecodeError> {
        self.read_array(Self::i8)
    }

    pub fn u16_le_array<const N: usize>(&mut self) -> Result<[u16; N], DecodeError> {
        self.read_array(Self::u16_le)
    }

    pub fn i16_le_array<const N: usize>(&mut self) -> Result<[i16; N], DecodeError> {
        self.read_array(Self::i16_le)
    }

    pub fn f32_le_array<const N: usize>(&mut self) -> Result<[f32; N], DecodeError> {
        self.read_array(Self::f32_le)
    }
}
