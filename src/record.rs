//! Conditional (presence-bitmap) record codec.
//!
//! ## Wire format
//!
//! ```text
//! [header u8][presence u16 BE][field 0]...[field n][trailer u8]
//! ```
//!
//! - **Presence**: a big-endian `u16`; each slot of the schema owns one mask bit. A field is on
//!   the wire iff its bit is set. Absent fields consume zero bytes.
//! - **Fields**: little-endian, laid out in schema order. The wire order walks the high byte
//!   first (`0x0100` .. `0x8000`) and then the low byte (`0x0001` .. `0x0080`).
//! - **Groups**: one bit gates several members. Members are all-present or all-absent; on encode
//!   a group with at least one given member is written in full, missing members as `0`.
//! - **Reserved**: a reserved bit that is set carries one opaque byte. It is kept in
//!   [`ConditionalRecord::reserved`] and never produced by [`encode`].
//! - **Envelope**: header and trailer follow [`crate::frame`].
//!
//! Schemas are static tables (see [`crate::schema::groups`]); one routine serves every record.

use crate::error::CodecError;
use crate::frame;
use crate::numeric::{ByteReader, Endianness, FixedPoint};
use crate::value::{FieldValues, Value};
use tracing::{debug, trace};

/// Wire encoding of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCodec {
    U8,
    I8,
    U16,
    I16,
    U32,
    /// Unsigned 16-bit fixed point, decoded to [`Value::Double`].
    FixedPoint(FixedPoint),
}

impl FieldCodec {
    /// Bytes on the wire.
    pub fn width(&self) -> usize {
        match self {
            FieldCodec::U8 | FieldCodec::I8 => 1,
            FieldCodec::U16 | FieldCodec::I16 | FieldCodec::FixedPoint(_) => 2,
            FieldCodec::U32 => 4,
        }
    }

    /// Value written for a group member the caller left out.
    pub fn default_value(&self) -> Value {
        match self {
            FieldCodec::U8 => Value::U8(0),
            FieldCodec::I8 => Value::I8(0),
            FieldCodec::U16 => Value::U16(0),
            FieldCodec::I16 => Value::I16(0),
            FieldCodec::U32 => Value::U32(0),
            FieldCodec::FixedPoint(_) => Value::Double(0.0),
        }
    }

    fn read(&self, r: &mut ByteReader<'_>) -> Result<Value, CodecError> {
        let le = Endianness::Little;
        Ok(match self {
            FieldCodec::U8 => Value::U8(r.read_u8()?),
            FieldCodec::I8 => Value::I8(r.read_u8()? as i8),
            FieldCodec::U16 => Value::U16(r.read_u16(le)?),
            FieldCodec::I16 => Value::I16(r.read_u16(le)? as i16),
            FieldCodec::U32 => Value::U32(r.read_u32(le)?),
            FieldCodec::FixedPoint(fp) => Value::Double(fp.decode(r.read_u16(le)?)),
        })
    }

    fn write(&self, name: &str, v: &Value, out: &mut Vec<u8>) -> Result<(), CodecError> {
        let mismatch = || CodecError::TypeMismatch {
            field: name.to_string(),
            expected: self.expected(),
        };
        match (self, v) {
            (FieldCodec::U8, Value::U8(x)) => out.push(*x),
            (FieldCodec::I8, Value::I8(x)) => out.push(*x as u8),
            (FieldCodec::U16, Value::U16(x)) => out.extend_from_slice(&x.to_le_bytes()),
            (FieldCodec::I16, Value::I16(x)) => out.extend_from_slice(&x.to_le_bytes()),
            (FieldCodec::U32, Value::U32(x)) => out.extend_from_slice(&x.to_le_bytes()),
            (FieldCodec::FixedPoint(fp), Value::Double(x)) => {
                let raw = fp.encode(*x).map_err(|_| CodecError::OutOfRange {
                    field: name.to_string(),
                    value: x.to_string(),
                })?;
                out.extend_from_slice(&raw.to_le_bytes());
            }
            _ => return Err(mismatch()),
        }
        Ok(())
    }

    /// `Value` variant accepted on encode, as named in `TypeMismatch`.
    fn expected(&self) -> &'static str {
        match self {
            FieldCodec::U8 => "U8",
            FieldCodec::I8 => "I8",
            FieldCodec::U16 => "U16",
            FieldCodec::I16 => "I16",
            FieldCodec::U32 => "U32",
            FieldCodec::FixedPoint(_) => "Double",
        }
    }
}

/// A named member of a group slot.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub codec: FieldCodec,
}

impl FieldDef {
    pub const fn new(name: &'static str, codec: FieldCodec) -> Self {
        FieldDef { name, codec }
    }
}

/// What a presence bit gates.
#[derive(Debug, Clone, Copy)]
pub enum SlotLayout {
    Field(FieldCodec),
    Group(&'static [FieldDef]),
    Reserved,
}

/// One bit of the presence bitmap and the bytes it gates.
#[derive(Debug, Clone, Copy)]
pub struct PresenceSlot {
    /// Field name, group flag name or reserved-bit name.
    pub name: &'static str,
    pub mask: u16,
    pub layout: SlotLayout,
}

impl PresenceSlot {
    pub const fn field(name: &'static str, mask: u16, codec: FieldCodec) -> Self {
        PresenceSlot { name, mask, layout: SlotLayout::Field(codec) }
    }

    pub const fn group(name: &'static str, mask: u16, members: &'static [FieldDef]) -> Self {
        PresenceSlot { name, mask, layout: SlotLayout::Group(members) }
    }

    pub const fn reserved(name: &'static str, mask: u16) -> Self {
        PresenceSlot { name, mask, layout: SlotLayout::Reserved }
    }

    /// Fields written when this slot is present, in wire order.
    pub fn members(&self) -> Vec<FieldDef> {
        match self.layout {
            SlotLayout::Field(codec) => vec![FieldDef::new(self.name, codec)],
            SlotLayout::Group(members) => members.to_vec(),
            SlotLayout::Reserved => Vec::new(),
        }
    }
}

/// Presence table of one conditional record type, slots in wire order.
#[derive(Debug)]
pub struct RecordSchema {
    pub name: &'static str,
    pub slots: &'static [PresenceSlot],
}

impl RecordSchema {
    /// Slot and codec of a declared field (reserved slots are not fields).
    pub fn field(&self, name: &str) -> Option<(&PresenceSlot, FieldCodec)> {
        self.slots.iter().find_map(|slot| match slot.layout {
            SlotLayout::Field(codec) if slot.name == name => Some((slot, codec)),
            SlotLayout::Group(members) => members
                .iter()
                .find(|m| m.name == name)
                .map(|m| (slot, m.codec)),
            _ => None,
        })
    }

    pub fn slot(&self, name: &str) -> Option<&PresenceSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    /// Every declared field name in wire order.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.slots
            .iter()
            .flat_map(|s| s.members().into_iter().map(|m| m.name))
            .collect()
    }

    /// Union of all slot masks.
    pub fn covered_mask(&self) -> u16 {
        self.slots.iter().fold(0, |acc, s| acc | s.mask)
    }
}

/// Decoded presence bitmap. Bits the schema does not know about are kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresenceBitmap(pub u16);

impl PresenceBitmap {
    pub fn bits(&self) -> u16 {
        self.0
    }

    pub fn contains(&self, mask: u16) -> bool {
        self.0 & mask != 0
    }

    /// Whether the named slot (field, group flag or reserved bit) is set.
    pub fn is_set(&self, schema: &RecordSchema, slot: &str) -> Option<bool> {
        schema.slot(slot).map(|s| self.contains(s.mask))
    }
}

/// A decoded conditional record.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalRecord {
    pub schema: &'static str,
    /// Placeholder; the camera writes the body length.
    pub header: u8,
    pub presence: PresenceBitmap,
    /// Present fields only. A missing key means the field was absent.
    pub fields: FieldValues,
    /// Opaque bytes of set reserved bits, in wire order.
    pub reserved: Vec<(&'static str, u8)>,
    pub checksum: u8,
    pub checksum_ok: bool,
}

impl ConditionalRecord {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }
}

/// Decode a conditional record.
///
/// Only fields whose bit is set are read. Trailing bytes after the trailer are ignored.
pub fn decode(schema: &RecordSchema, bytes: &[u8]) -> Result<ConditionalRecord, CodecError> {
    let mut r = ByteReader::new(bytes);
    let header = r.read_u8()?;
    let presence = PresenceBitmap(r.read_u16(Endianness::Big)?);
    let unknown = presence.bits() & !schema.covered_mask();
    if unknown != 0 {
        debug!(record = schema.name, bits = unknown, "presence bits outside schema");
    }

    let mut fields = FieldValues::new();
    let mut reserved = Vec::new();
    for slot in schema.slots {
        if !presence.contains(slot.mask) {
            continue;
        }
        match slot.layout {
            SlotLayout::Field(codec) => {
                let v = codec.read(&mut r)?;
                trace!(record = schema.name, field = slot.name, value = %v, "decoded field");
                fields.insert(slot.name.to_string(), v);
            }
            SlotLayout::Group(members) => {
                for m in members {
                    let v = m.codec.read(&mut r)?;
                    trace!(record = schema.name, field = m.name, value = %v, "decoded group member");
                    fields.insert(m.name.to_string(), v);
                }
            }
            SlotLayout::Reserved => reserved.push((slot.name, r.read_u8()?)),
        }
    }

    let covered = r.position();
    let checksum = r.read_u8()?;
    let checksum_ok = frame::verify_trailer(schema.name, &bytes[..covered], checksum);
    if r.remaining() > 0 {
        debug!(record = schema.name, extra = r.remaining(), "bytes after trailer ignored");
    }
    debug!(record = schema.name, presence = presence.bits(), fields = fields.len(), "decoded record");

    Ok(ConditionalRecord {
        schema: schema.name,
        header,
        presence,
        fields,
        reserved,
        checksum,
        checksum_ok,
    })
}

/// Encode a conditional record from the given fields.
///
/// The presence bitmap is derived from which fields are given. Names that are not declared
/// fields of `schema` (including reserved slots) are rejected before any byte is produced.
pub fn encode(schema: &RecordSchema, values: &FieldValues) -> Result<Vec<u8>, CodecError> {
    if let Some(unknown) = values.keys().find(|k| schema.field(k).is_none()) {
        return Err(CodecError::UnknownField {
            record: schema.name.to_string(),
            field: unknown.clone(),
        });
    }

    let mut bitmap = 0u16;
    let mut payload = Vec::new();
    for slot in schema.slots {
        let members = slot.members();
        if !members.iter().any(|m| values.contains_key(m.name)) {
            continue;
        }
        bitmap |= slot.mask;
        for m in &members {
            match values.get(m.name) {
                Some(v) => m.codec.write(m.name, v, &mut payload)?,
                None => m.codec.write(m.name, &m.codec.default_value(), &mut payload)?,
            }
        }
    }

    let mut body = Vec::with_capacity(payload.len() + 2);
    body.extend_from_slice(&bitmap.to_be_bytes());
    body.extend(payload);
    debug!(record = schema.name, presence = bitmap, len = body.len(), "encoded record");
    frame::seal(&body)
}
