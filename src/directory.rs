//! Directory-entry (TLV) codec.
//!
//! ## Wire format
//!
//! ```text
//! [DataLength u32][DirectoryCount u32]          header, 8 bytes
//! [Tag u16][Type u16][Count u32][Value 4 bytes]  entry, 12 bytes, repeated
//! [data section]                                 out-of-line payloads
//! ```
//!
//! All integers are little-endian. An entry whose payload (`Count * element size`) fits in four
//! bytes stores it left-justified in `Value`; otherwise `Value` is a `u32` offset from the start
//! of the structure to the payload.
//!
//! The camera is known to report a `DirectoryCount` that does not match the index section, and
//! to send payloads past `DataLength`. Decoding therefore parses entries greedily up to the end
//! of the buffer, keeps `min(parsed, DirectoryCount)` of them and checks every payload against
//! the buffer length. `DataLength` is informational.

use crate::error::CodecError;
use crate::numeric::{ByteReader, Endianness};
use crate::value::Value;
use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, trace, warn};

/// Size of the `DataLength` + `DirectoryCount` header.
pub const HEADER_LEN: usize = 8;
/// Size of one index entry.
pub const ENTRY_LEN: usize = 12;

/// Element type of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    UInt8,
    String,
    UInt16,
    UInt32,
    URational,
    Int8,
    /// Opaque bytes; decoded like `UInt8`.
    Any8,
    Int16,
    Int32,
    Rational,
    Float32,
    Float64,
}

impl ElementType {
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            0x01 => ElementType::UInt8,
            0x02 => ElementType::String,
            0x03 => ElementType::UInt16,
            0x04 => ElementType::UInt32,
            0x05 => ElementType::URational,
            0x06 => ElementType::Int8,
            0x07 => ElementType::Any8,
            0x08 => ElementType::Int16,
            0x09 => ElementType::Int32,
            0x0a => ElementType::Rational,
            0x0b => ElementType::Float32,
            0x0c => ElementType::Float64,
            _ => return None,
        })
    }

    pub fn code(self) -> u16 {
        match self {
            ElementType::UInt8 => 0x01,
            ElementType::String => 0x02,
            ElementType::UInt16 => 0x03,
            ElementType::UInt32 => 0x04,
            ElementType::URational => 0x05,
            ElementType::Int8 => 0x06,
            ElementType::Any8 => 0x07,
            ElementType::Int16 => 0x08,
            ElementType::Int32 => 0x09,
            ElementType::Rational => 0x0a,
            ElementType::Float32 => 0x0b,
            ElementType::Float64 => 0x0c,
        }
    }

    /// Bytes per element. Strings are counted in bytes including the NUL terminator.
    pub fn element_size(self) -> usize {
        match self {
            ElementType::UInt8 | ElementType::Int8 | ElementType::Any8 | ElementType::String => 1,
            ElementType::UInt16 | ElementType::Int16 => 2,
            ElementType::UInt32 | ElementType::Int32 | ElementType::Float32 => 4,
            ElementType::URational | ElementType::Rational | ElementType::Float64 => 8,
        }
    }
}

/// Typed payload of a directory entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    UInt8(Vec<u8>),
    Any8(Vec<u8>),
    Int8(Vec<i8>),
    UInt16(Vec<u16>),
    Int16(Vec<i16>),
    UInt32(Vec<u32>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    URational(Vec<(u32, u32)>),
    Rational(Vec<(i32, i32)>),
    /// ASCII text without its NUL terminator.
    Str(String),
}

impl EntryValue {
    pub fn element_type(&self) -> ElementType {
        match self {
            EntryValue::UInt8(_) => ElementType::UInt8,
            EntryValue::Any8(_) => ElementType::Any8,
            EntryValue::Int8(_) => ElementType::Int8,
            EntryValue::UInt16(_) => ElementType::UInt16,
            EntryValue::Int16(_) => ElementType::Int16,
            EntryValue::UInt32(_) => ElementType::UInt32,
            EntryValue::Int32(_) => ElementType::Int32,
            EntryValue::Float32(_) => ElementType::Float32,
            EntryValue::Float64(_) => ElementType::Float64,
            EntryValue::URational(_) => ElementType::URational,
            EntryValue::Rational(_) => ElementType::Rational,
            EntryValue::Str(_) => ElementType::String,
        }
    }

    /// Wire `Count`: number of elements, or string length plus terminator.
    pub fn count(&self) -> usize {
        match self {
            EntryValue::UInt8(v) | EntryValue::Any8(v) => v.len(),
            EntryValue::Int8(v) => v.len(),
            EntryValue::UInt16(v) => v.len(),
            EntryValue::Int16(v) => v.len(),
            EntryValue::UInt32(v) => v.len(),
            EntryValue::Int32(v) => v.len(),
            EntryValue::Float32(v) => v.len(),
            EntryValue::Float64(v) => v.len(),
            EntryValue::URational(v) => v.len(),
            EntryValue::Rational(v) => v.len(),
            EntryValue::Str(s) => s.len() + 1,
        }
    }

    /// One [`Value`] per element; a string yields a single [`Value::Str`].
    pub fn elements(&self) -> Vec<Value> {
        match self {
            EntryValue::UInt8(v) | EntryValue::Any8(v) => v.iter().map(|x| Value::U8(*x)).collect(),
            EntryValue::Int8(v) => v.iter().map(|x| Value::I8(*x)).collect(),
            EntryValue::UInt16(v) => v.iter().map(|x| Value::U16(*x)).collect(),
            EntryValue::Int16(v) => v.iter().map(|x| Value::I16(*x)).collect(),
            EntryValue::UInt32(v) => v.iter().map(|x| Value::U32(*x)).collect(),
            EntryValue::Int32(v) => v.iter().map(|x| Value::I32(*x)).collect(),
            EntryValue::Float32(v) => v.iter().map(|x| Value::Float(*x)).collect(),
            EntryValue::Float64(v) => v.iter().map(|x| Value::Double(*x)).collect(),
            EntryValue::URational(v) => v.iter().map(|(n, d)| Value::URational(*n, *d)).collect(),
            EntryValue::Rational(v) => v.iter().map(|(n, d)| Value::Rational(*n, *d)).collect(),
            EntryValue::Str(s) => vec![Value::Str(s.clone())],
        }
    }

    fn decode(tag: u16, ty: ElementType, payload: &[u8]) -> Result<Self, CodecError> {
        let size = ty.element_size();
        let chunks = payload.chunks_exact(size);
        Ok(match ty {
            ElementType::UInt8 => EntryValue::UInt8(payload.to_vec()),
            ElementType::Any8 => EntryValue::Any8(payload.to_vec()),
            ElementType::Int8 => EntryValue::Int8(payload.iter().map(|b| *b as i8).collect()),
            ElementType::UInt16 => EntryValue::UInt16(chunks.map(LittleEndian::read_u16).collect()),
            ElementType::Int16 => EntryValue::Int16(chunks.map(LittleEndian::read_i16).collect()),
            ElementType::UInt32 => EntryValue::UInt32(chunks.map(LittleEndian::read_u32).collect()),
            ElementType::Int32 => EntryValue::Int32(chunks.map(LittleEndian::read_i32).collect()),
            ElementType::Float32 => EntryValue::Float32(chunks.map(LittleEndian::read_f32).collect()),
            ElementType::Float64 => EntryValue::Float64(chunks.map(LittleEndian::read_f64).collect()),
            ElementType::URational => EntryValue::URational(
                chunks
                    .map(|c| (LittleEndian::read_u32(&c[..4]), LittleEndian::read_u32(&c[4..])))
                    .collect(),
            ),
            ElementType::Rational => EntryValue::Rational(
                chunks
                    .map(|c| (LittleEndian::read_i32(&c[..4]), LittleEndian::read_i32(&c[4..])))
                    .collect(),
            ),
            ElementType::String => {
                let end = payload.iter().position(|b| *b == 0).unwrap_or(payload.len());
                let text = std::str::from_utf8(&payload[..end])
                    .ok()
                    .filter(|s| s.is_ascii())
                    .ok_or(CodecError::InvalidString { tag })?;
                EntryValue::Str(text.to_string())
            }
        })
    }

    fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.count() * self.element_type().element_size());
        match self {
            EntryValue::UInt8(v) | EntryValue::Any8(v) => out.extend_from_slice(v),
            EntryValue::Int8(v) => out.extend(v.iter().map(|x| *x as u8)),
            EntryValue::UInt16(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            EntryValue::Int16(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            EntryValue::UInt32(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            EntryValue::Int32(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            EntryValue::Float32(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            EntryValue::Float64(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            EntryValue::URational(v) => v.iter().for_each(|(n, d)| {
                out.extend_from_slice(&n.to_le_bytes());
                out.extend_from_slice(&d.to_le_bytes());
            }),
            EntryValue::Rational(v) => v.iter().for_each(|(n, d)| {
                out.extend_from_slice(&n.to_le_bytes());
                out.extend_from_slice(&d.to_le_bytes());
            }),
            EntryValue::Str(s) => {
                out.extend_from_slice(s.as_bytes());
                out.push(0);
            }
        }
        out
    }
}

/// A decoded directory entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    pub tag: u16,
    pub value: EntryValue,
}

impl DirectoryEntry {
    pub fn new(tag: u16, value: EntryValue) -> Self {
        DirectoryEntry { tag, value }
    }

    pub fn element_type(&self) -> ElementType {
        self.value.element_type()
    }
}

/// One 12-byte index entry as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEntry {
    pub tag: u16,
    pub type_code: u16,
    pub count: u32,
    pub value: [u8; 4],
    /// Position of `value` in the parsed buffer.
    value_at: usize,
}

impl RawEntry {
    pub fn element_type(&self) -> Option<ElementType> {
        ElementType::from_code(self.type_code)
    }

    pub fn payload_len(&self) -> Result<usize, CodecError> {
        let ty = self.element_type().ok_or(CodecError::UnknownElementType {
            tag: self.tag,
            code: self.type_code,
        })?;
        Ok((self.count as usize).saturating_mul(ty.element_size()))
    }

    /// `Value` read as an offset; meaningful only for out-of-line payloads.
    pub fn offset(&self) -> u32 {
        u32::from_le_bytes(self.value)
    }
}

/// Parsed header and index section of a directory array, borrowing the original buffer.
#[derive(Debug, Clone)]
pub struct DirectoryArray<'a> {
    pub data_length: u32,
    pub directory_count: u32,
    /// Every 12-byte entry that fits in the buffer, before clipping to `directory_count`.
    pub entries: Vec<RawEntry>,
    buf: &'a [u8],
}

impl<'a> DirectoryArray<'a> {
    pub fn parse(buf: &'a [u8]) -> Result<Self, CodecError> {
        let mut r = ByteReader::new(buf);
        let data_length = r.read_u32(Endianness::Little)?;
        let directory_count = r.read_u32(Endianness::Little)?;

        let mut entries = Vec::with_capacity(r.remaining() / ENTRY_LEN);
        while r.remaining() >= ENTRY_LEN {
            let tag = r.read_u16(Endianness::Little)?;
            let type_code = r.read_u16(Endianness::Little)?;
            let count = r.read_u32(Endianness::Little)?;
            let value_at = r.position();
            let mut value = [0u8; 4];
            value.copy_from_slice(r.take(4)?);
            entries.push(RawEntry { tag, type_code, count, value, value_at });
        }

        let parsed = entries.len();
        if (parsed as u64) < directory_count as u64 {
            warn!(
                directory_count,
                parsed,
                "DirectoryCount exceeds entries present in buffer; clipping"
            );
        }
        debug!(data_length, directory_count, parsed, len = buf.len(), "parsed directory index");
        Ok(DirectoryArray { data_length, directory_count, entries, buf })
    }

    /// Entries the structure actually declares: `min(parsed, DirectoryCount)`.
    pub fn declared(&self) -> &[RawEntry] {
        let n = self.entries.len().min(self.directory_count as usize);
        &self.entries[..n]
    }

    /// Payload bytes of `entry`, inline or from the data section.
    pub fn payload(&self, entry: &RawEntry) -> Result<&'a [u8], CodecError> {
        let length = entry.payload_len()?;
        let start = if length <= 4 { entry.value_at } else { entry.offset() as usize };
        let end = start.checked_add(length).filter(|end| *end <= self.buf.len());
        match end {
            Some(end) => Ok(&self.buf[start..end]),
            None => Err(CodecError::OffsetOutOfBounds {
                tag: entry.tag,
                offset: start,
                length,
                available: self.buf.len(),
            }),
        }
    }

    /// Decode every declared entry.
    pub fn decode(&self) -> Result<Vec<DirectoryEntry>, CodecError> {
        self.declared()
            .iter()
            .map(|raw| {
                let ty = raw.element_type().ok_or(CodecError::UnknownElementType {
                    tag: raw.tag,
                    code: raw.type_code,
                })?;
                let value = EntryValue::decode(raw.tag, ty, self.payload(raw)?)?;
                trace!(tag = raw.tag, ?ty, count = raw.count, "decoded directory entry");
                Ok(DirectoryEntry { tag: raw.tag, value })
            })
            .collect()
    }
}

/// Decode a directory array into its entries.
pub fn decode_entries(bytes: &[u8]) -> Result<Vec<DirectoryEntry>, CodecError> {
    DirectoryArray::parse(bytes)?.decode()
}

/// Encode entries as a directory array.
///
/// Payloads are zero-padded to a multiple of four bytes; those of at most four bytes go inline,
/// the rest are appended to the data section in entry order.
pub fn encode_entries(entries: &[DirectoryEntry]) -> Result<Vec<u8>, CodecError> {
    let too_large = |what: &str, n: usize| CodecError::OutOfRange {
        field: what.to_string(),
        value: n.to_string(),
    };
    let index_size = HEADER_LEN + ENTRY_LEN * entries.len();
    let mut index = Vec::with_capacity(index_size - HEADER_LEN);
    let mut data = Vec::new();

    for e in entries {
        if let EntryValue::Str(text) = &e.value {
            if !text.is_ascii() || text.contains('\0') {
                return Err(CodecError::InvalidString { tag: e.tag });
            }
        }
        let mut payload = e.value.payload();
        let count = e.value.count();
        let count = u32::try_from(count).map_err(|_| too_large("count", count))?;
        payload.resize(payload.len().div_ceil(4) * 4, 0);

        let mut value = [0u8; 4];
        if payload.len() <= 4 {
            value[..payload.len()].copy_from_slice(&payload);
        } else {
            let at = index_size + data.len();
            value = u32::try_from(at).map_err(|_| too_large("offset", at))?.to_le_bytes();
            data.extend_from_slice(&payload);
        }

        index.extend_from_slice(&e.tag.to_le_bytes());
        index.extend_from_slice(&e.element_type().code().to_le_bytes());
        index.extend_from_slice(&count.to_le_bytes());
        index.extend_from_slice(&value);
    }

    let total = index_size + data.len();
    let data_length = u32::try_from(total).map_err(|_| too_large("DataLength", total))?;
    let directory_count =
        u32::try_from(entries.len()).map_err(|_| too_large("DirectoryCount", entries.len()))?;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&data_length.to_le_bytes());
    out.extend_from_slice(&directory_count.to_le_bytes());
    out.extend(index);
    out.extend(data);
    debug!(entries = entries.len(), len = out.len(), "encoded directory");
    Ok(out)
}
