//! Little-endian wire codec.
//!
//! Every multi-byte integer in archive data is stored little-endian. The
//! [`LittleEndian`] trait converts between that wire order and host values;
//! the typed read/write extensions in [`crate::traits`] are built on it.

/// A fixed-width integer with a little-endian wire representation.
pub trait LittleEndian: Sized + Copy {
    /// Width of the wire representation in bytes.
    const SIZE: usize;

    /// Decode from the first `SIZE` bytes of `bytes`.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than `SIZE`.
    fn from_le_slice(bytes: &[u8]) -> Self;

    /// Encode into the first `SIZE` bytes of `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than `SIZE`.
    fn write_le(self, out: &mut [u8]);
}

macro_rules! impl_little_endian {
    ($($ty:ty),* $(,)?) => {
        $(
            impl LittleEndian for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_le_bytes(raw)
                }

                #[inline]
                fn write_le(self, out: &mut [u8]) {
                    out[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_little_endian!(u8, i8, u16, i16, u32, i32, u64, i64);

/// Read a little-endian `u16` from the start of `bytes`.
#[inline]
pub fn le_u16(bytes: &[u8]) -> u16 {
    u16::from_le_slice(bytes)
}

/// Read a little-endian `u32` from the start of `bytes`.
#[inline]
pub fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_slice(bytes)
}

/// Encode `value` as a little-endian byte vector.
pub fn to_le_vec<T: LittleEndian>(value: T) -> Vec<u8> {
    let mut out = vec![0u8; T::SIZE];
    value.write_le(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_widths() {
        let bytes = [0x78, 0x56, 0x34, 0x12, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(u8::from_le_slice(&bytes), 0x78);
        assert_eq!(le_u16(&bytes), 0x5678);
        assert_eq!(le_u32(&bytes), 0x1234_5678);
        assert_eq!(i32::from_le_slice(&bytes[4..]), -1);
        assert_eq!(i16::from_le_slice(&bytes[4..]), -1);
        assert_eq!(u64::from_le_slice(&bytes), 0xFFFF_FFFF_1234_5678);
    }

    #[test]
    fn test_encode() {
        assert_eq!(to_le_vec(0x0201u16), vec![0x01, 0x02]);
        assert_eq!(to_le_vec(-2i32), vec![0xFE, 0xFF, 0xFF, 0xFF]);

        let mut out = [0u8; 6];
        0xAABBCCDDu32.write_le(&mut out[2..]);
        assert_eq!(out, [0, 0, 0xDD, 0xCC, 0xBB, 0xAA]);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(<i8 as LittleEndian>::SIZE, 1);
        assert_eq!(<u16 as LittleEndian>::SIZE, 2);
        assert_eq!(<i64 as LittleEndian>::SIZE, 8);
    }
}
