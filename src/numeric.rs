//! Numeric encode/decode primitives shared by every record codec.
//!
//! Camera payload integers are little-endian; the presence bitmap of a conditional record is
//! the one big-endian quantity on the wire. Every read goes through [`ByteReader`], which
//! checks the remaining length before consuming anything.

use crate::error::CodecError;
use byteorder::{BigEndian, ByteOrder, LittleEndian};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

/// Bounds-checked cursor over a borrowed buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ByteReader { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Consume exactly `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let available = self.remaining();
        if n > available {
            return Err(CodecError::Truncated {
                offset: self.pos,
                needed: n,
                available,
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self, endianness: Endianness) -> Result<u16, CodecError> {
        let b = self.take(2)?;
        Ok(match endianness {
            Endianness::Big => BigEndian::read_u16(b),
            Endianness::Little => LittleEndian::read_u16(b),
        })
    }

    pub fn read_u32(&mut self, endianness: Endianness) -> Result<u32, CodecError> {
        let b = self.take(4)?;
        Ok(match endianness {
            Endianness::Big => BigEndian::read_u32(b),
            Endianness::Little => LittleEndian::read_u32(b),
        })
    }
}

/// Inclusive value range of an integer of `width` bytes.
pub(crate) fn int_range(width: usize, signed: bool) -> Result<(i64, i64), CodecError> {
    let bits = match width {
        1 | 2 | 4 => (width * 8) as u32,
        other => return Err(CodecError::UnsupportedWidth(other)),
    };
    Ok(if signed {
        (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
    } else {
        (0, (1i64 << bits) - 1)
    })
}

/// Decode a `width`-byte integer (1, 2 or 4) from the start of `bytes`.
pub fn decode_int(
    bytes: &[u8],
    width: usize,
    signed: bool,
    endianness: Endianness,
) -> Result<i64, CodecError> {
    int_range(width, signed)?;
    let b = ByteReader::new(bytes).take(width)?;
    let raw = match (width, endianness) {
        (1, _) => b[0] as u32,
        (2, Endianness::Big) => BigEndian::read_u16(b) as u32,
        (2, Endianness::Little) => LittleEndian::read_u16(b) as u32,
        (_, Endianness::Big) => BigEndian::read_u32(b),
        (_, Endianness::Little) => LittleEndian::read_u32(b),
    };
    Ok(match (width, signed) {
        (1, true) => raw as u8 as i8 as i64,
        (2, true) => raw as u16 as i16 as i64,
        (4, true) => raw as i32 as i64,
        _ => raw as i64,
    })
}

/// Encode `value` as a `width`-byte integer. Values outside the width's range are rejected.
pub fn encode_int(
    value: i64,
    width: usize,
    signed: bool,
    endianness: Endianness,
) -> Result<Vec<u8>, CodecError> {
    let (min, max) = int_range(width, signed)?;
    if value < min || value > max {
        return Err(CodecError::OutOfRange {
            field: format!("{}{}", if signed { "i" } else { "u" }, width * 8),
            value: value.to_string(),
        });
    }
    let mut buf = vec![0u8; width];
    match (width, endianness) {
        (1, _) => buf[0] = value as u8,
        (2, Endianness::Big) => BigEndian::write_u16(&mut buf, value as u16),
        (2, Endianness::Little) => LittleEndian::write_u16(&mut buf, value as u16),
        (_, Endianness::Big) => BigEndian::write_u32(&mut buf, value as u32),
        (_, Endianness::Little) => LittleEndian::write_u32(&mut buf, value as u32),
    }
    Ok(buf)
}

pub fn decode_f32(bytes: &[u8], endianness: Endianness) -> Result<f32, CodecError> {
    let b = ByteReader::new(bytes).take(4)?;
    Ok(match endianness {
        Endianness::Big => BigEndian::read_f32(b),
        Endianness::Little => LittleEndian::read_f32(b),
    })
}

pub fn encode_f32(value: f32, endianness: Endianness) -> [u8; 4] {
    let mut buf = [0u8; 4];
    match endianness {
        Endianness::Big => BigEndian::write_f32(&mut buf, value),
        Endianness::Little => LittleEndian::write_f32(&mut buf, value),
    }
    buf
}

pub fn decode_f64(bytes: &[u8], endianness: Endianness) -> Result<f64, CodecError> {
    let b = ByteReader::new(bytes).take(8)?;
    Ok(match endianness {
        Endianness::Big => BigEndian::read_f64(b),
        Endianness::Little => LittleEndian::read_f64(b),
    })
}

pub fn encode_f64(value: f64, endianness: Endianness) -> [u8; 8] {
    let mut buf = [0u8; 8];
    match endianness {
        Endianness::Big => BigEndian::write_f64(&mut buf, value),
        Endianness::Little => LittleEndian::write_f64(&mut buf, value),
    }
    buf
}

/// Decode a numerator/denominator pair of 4-byte integers.
pub fn decode_rational(
    bytes: &[u8],
    signed: bool,
    endianness: Endianness,
) -> Result<(i64, i64), CodecError> {
    let b = ByteReader::new(bytes).take(8)?;
    let num = decode_int(&b[..4], 4, signed, endianness)?;
    let den = decode_int(&b[4..], 4, signed, endianness)?;
    Ok((num, den))
}

pub fn encode_rational(
    num: i64,
    den: i64,
    signed: bool,
    endianness: Endianness,
) -> Result<Vec<u8>, CodecError> {
    let mut out = encode_int(num, 4, signed, endianness)?;
    out.extend(encode_int(den, 4, signed, endianness)?);
    Ok(out)
}

/// Unsigned 16-bit fixed-point number: integer part in the high bits, `fraction_bits` of
/// fraction in the low bits.
///
/// Encoding truncates toward zero on both parts; it never rounds to nearest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPoint {
    fraction_bits: u32,
}

impl FixedPoint {
    /// `fraction_bits` must be below 16.
    pub const fn new(fraction_bits: u32) -> Self {
        assert!(fraction_bits < 16);
        FixedPoint { fraction_bits }
    }

    pub fn fraction_bits(&self) -> u32 {
        self.fraction_bits
    }

    fn mask(&self) -> u32 {
        (1u32 << self.fraction_bits) - 1
    }

    pub fn decode(&self, raw: u16) -> f64 {
        let raw = raw as u32;
        let mask = self.mask();
        (raw >> self.fraction_bits) as f64 + (raw & mask) as f64 / (mask + 1) as f64
    }

    pub fn encode(&self, value: f64) -> Result<u16, CodecError> {
        let out_of_range = || CodecError::OutOfRange {
            field: format!("fixed-point/{}", self.fraction_bits),
            value: value.to_string(),
        };
        if !value.is_finite() || value < 0.0 {
            return Err(out_of_range());
        }
        let mask = self.mask() as i64;
        let integer = value.trunc() as i64;
        let fraction = (value * (mask + 1) as f64).trunc() as i64 & mask;
        let raw = (integer << self.fraction_bits) | fraction;
        u16::try_from(raw).map_err(|_| out_of_range())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_reports_truncation_offset() {
        let mut r = ByteReader::new(&[1, 2, 3]);
        assert_eq!(r.read_u16(Endianness::Little).unwrap(), 0x0201);
        match r.read_u16(Endianness::Little) {
            Err(CodecError::Truncated { offset, needed, available }) => {
                assert_eq!((offset, needed, available), (2, 2, 1));
            }
            other => panic!("expected truncation, got {:?}", other),
        }
        // a failed read consumes nothing
        assert_eq!(r.read_u8().unwrap(), 3);
    }

    #[test]
    fn int_width_and_sign() {
        assert_eq!(decode_int(&[0xff], 1, true, Endianness::Little).unwrap(), -1);
        assert_eq!(decode_int(&[0xff], 1, false, Endianness::Little).unwrap(), 255);
        assert_eq!(decode_int(&[0x6b, 0x03], 2, false, Endianness::Little).unwrap(), 0x036b);
        assert_eq!(decode_int(&[0x03, 0x6b], 2, false, Endianness::Big).unwrap(), 0x036b);
        assert_eq!(decode_int(&[0xfe, 0xff, 0xff, 0xff], 4, true, Endianness::Little).unwrap(), -2);
        assert!(matches!(
            decode_int(&[0; 8], 3, false, Endianness::Little),
            Err(CodecError::UnsupportedWidth(3))
        ));
    }

    #[test]
    fn encode_int_checks_range() {
        assert_eq!(encode_int(-1, 1, true, Endianness::Little).unwrap(), vec![0xff]);
        assert_eq!(encode_int(0x1234, 2, false, Endianness::Big).unwrap(), vec![0x12, 0x34]);
        assert_eq!(encode_int(0x1234, 2, false, Endianness::Little).unwrap(), vec![0x34, 0x12]);
        assert!(encode_int(256, 1, false, Endianness::Little).is_err());
        assert!(encode_int(-1, 2, false, Endianness::Little).is_err());
        assert!(encode_int(128, 1, true, Endianness::Little).is_err());
    }

    #[test]
    fn float_and_rational() {
        let f = decode_f32(&[0x52, 0xb8, 0x9e, 0x3f], Endianness::Little).unwrap();
        assert!((f - 1.24).abs() < 1e-6);
        assert_eq!(encode_f32(f, Endianness::Little), [0x52, 0xb8, 0x9e, 0x3f]);
        let bytes = encode_rational(-3, 4, true, Endianness::Little).unwrap();
        assert_eq!(decode_rational(&bytes, true, Endianness::Little).unwrap(), (-3, 4));
        assert!(encode_rational(-3, 4, false, Endianness::Little).is_err());
    }

    #[test]
    fn fixed_point_focal_lengths() {
        let fp = FixedPoint::new(4);
        assert_eq!(fp.encode(45.0).unwrap(), 0x02d0);
        assert_eq!(fp.decode(0x02d0), 45.0);
        assert_eq!(fp.decode(0x0d00), 208.0);
        assert_eq!(fp.decode(0x00c8), 12.5);
    }

    #[test]
    fn fixed_point_truncates() {
        let fp = FixedPoint::new(4);
        // 12.99 * 16 = 207.84 -> 207 & 0xf = 15
        assert_eq!(fp.encode(12.99).unwrap(), (12 << 4) | 15);
        assert_eq!(fp.decode((12 << 4) | 15), 12.9375);
        assert!(fp.encode(-1.0).is_err());
        assert!(fp.encode(-0.5).is_err());
        assert!(fp.encode(-0.01).is_err());
        assert_eq!(fp.encode(0.0).unwrap(), 0);
        assert!(fp.encode(4096.0).is_err());
        assert!(fp.encode(f64::NAN).is_err());
    }
}
