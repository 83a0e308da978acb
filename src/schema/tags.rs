//! Tag tables of the directory-array records (`ApiConfig`, `CamDataGroupFocus`).
//!
//! A table maps tags to field names and says how a decoded entry becomes a [`Value`]. Tags
//! missing from a buffer leave the field absent; tags missing from the table are kept under a
//! synthetic `Tag0x....` name.

use crate::directory::{DirectoryEntry, ElementType, EntryValue};
use crate::error::CodecError;
use crate::value::{FieldValues, Value};
use tracing::debug;

/// How an entry maps to a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagShape {
    /// A single-element array reduces to its element.
    Scalar,
    /// Always a [`Value::List`].
    Array,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagDef {
    pub tag: u16,
    pub name: &'static str,
    pub element_type: ElementType,
    pub shape: TagShape,
}

impl TagDef {
    pub const fn new(tag: u16, name: &'static str, element_type: ElementType, shape: TagShape) -> Self {
        TagDef { tag, name, element_type, shape }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct TagTable {
    pub name: &'static str,
    pub tags: &'static [TagDef],
}

pub static API_CONFIG: TagTable = TagTable {
    name: "ApiConfig",
    tags: &[
        TagDef::new(0x01, "CameraModel", ElementType::String, TagShape::Text),
        TagDef::new(0x02, "SerialNumber", ElementType::String, TagShape::Text),
        TagDef::new(0x03, "FirmwareVersion", ElementType::String, TagShape::Text),
        TagDef::new(0x05, "CommunicationVersion", ElementType::Float32, TagShape::Scalar),
    ],
};

pub static CAM_DATA_GROUP_FOCUS: TagTable = TagTable {
    name: "CamDataGroupFocus",
    tags: &[
        TagDef::new(0x01, "FocusMode", ElementType::UInt8, TagShape::Scalar),
        TagDef::new(0x02, "AFLock", ElementType::UInt8, TagShape::Scalar),
        TagDef::new(0x03, "FaceEyeAF", ElementType::UInt8, TagShape::Scalar),
        TagDef::new(0x04, "FaceEyeAFStatus", ElementType::UInt8, TagShape::Scalar),
        TagDef::new(0x0a, "FocusArea", ElementType::UInt8, TagShape::Scalar),
        TagDef::new(0x0b, "OnePointSelection", ElementType::UInt8, TagShape::Scalar),
        TagDef::new(0x0c, "DistanceMeasurementFrameMovement", ElementType::UInt8, TagShape::Scalar),
        TagDef::new(0x0d, "FocusFramePosition", ElementType::Any8, TagShape::Array),
        TagDef::new(0x0e, "FocusFrameSize", ElementType::Any8, TagShape::Array),
        TagDef::new(0x33, "PreConstAF", ElementType::UInt8, TagShape::Scalar),
        TagDef::new(0x34, "FocusLimit", ElementType::UInt8, TagShape::Scalar),
    ],
};

fn synthetic_name(tag: u16) -> String {
    format!("Tag{:#06x}", tag)
}

impl TagTable {
    pub fn by_tag(&self, tag: u16) -> Option<&TagDef> {
        self.tags.iter().find(|d| d.tag == tag)
    }

    pub fn by_name(&self, name: &str) -> Option<&TagDef> {
        self.tags.iter().find(|d| d.name == name)
    }

    /// Map decoded entries to named fields.
    pub fn to_fields(&self, entries: &[DirectoryEntry]) -> FieldValues {
        let mut out = FieldValues::new();
        for e in entries {
            let def = self.by_tag(e.tag);
            let shape = def.map(|d| d.shape).unwrap_or(TagShape::Array);
            let mut elements = e.value.elements();
            let value = match (shape, &e.value) {
                (_, EntryValue::Str(s)) => Value::Str(s.clone()),
                (TagShape::Scalar, _) if elements.len() == 1 => elements.remove(0),
                _ => Value::List(elements),
            };
            let name = match def {
                Some(d) => d.name.to_string(),
                None => {
                    debug!(table = self.name, tag = e.tag, "tag not in table");
                    synthetic_name(e.tag)
                }
            };
            out.insert(name, value);
        }
        out
    }

    /// Build entries from named fields, in table order.
    pub fn to_entries(&self, values: &FieldValues) -> Result<Vec<DirectoryEntry>, CodecError> {
        if let Some(unknown) = values.keys().find(|k| self.by_name(k).is_none()) {
            return Err(CodecError::UnknownField {
                record: self.name.to_string(),
                field: unknown.clone(),
            });
        }
        self.tags
            .iter()
            .filter_map(|d| values.get(d.name).map(|v| (d, v)))
            .map(|(d, v)| Ok(DirectoryEntry::new(d.tag, entry_value(d, v)?)))
            .collect()
    }
}

fn entry_value(def: &TagDef, v: &Value) -> Result<EntryValue, CodecError> {
    let mismatch = |expected| CodecError::TypeMismatch { field: def.name.to_string(), expected };
    let out_of_range = |x: &Value| CodecError::OutOfRange {
        field: def.name.to_string(),
        value: x.to_string(),
    };
    let items: &[Value] = match v.as_list() {
        Some(list) => list,
        None => std::slice::from_ref(v),
    };

    macro_rules! ints {
        ($variant:ident, $t:ty) => {
            EntryValue::$variant(
                items
                    .iter()
                    .map(|x| {
                        let n = x.as_i64().ok_or_else(|| mismatch("integer"))?;
                        <$t>::try_from(n).map_err(|_| out_of_range(x))
                    })
                    .collect::<Result<_, _>>()?,
            )
        };
    }
    macro_rules! floats {
        ($variant:ident, $t:ty) => {
            EntryValue::$variant(
                items
                    .iter()
                    .map(|x| x.as_f64().map(|f| f as $t).ok_or_else(|| mismatch("number")))
                    .collect::<Result<_, _>>()?,
            )
        };
    }

    Ok(match def.element_type {
        ElementType::String => {
            let s = v.as_str().ok_or_else(|| mismatch("string"))?;
            EntryValue::Str(s.to_string())
        }
        ElementType::UInt8 => ints!(UInt8, u8),
        ElementType::Any8 => ints!(Any8, u8),
        ElementType::Int8 => ints!(Int8, i8),
        ElementType::UInt16 => ints!(UInt16, u16),
        ElementType::Int16 => ints!(Int16, i16),
        ElementType::UInt32 => ints!(UInt32, u32),
        ElementType::Int32 => ints!(Int32, i32),
        ElementType::Float32 => floats!(Float32, f32),
        ElementType::Float64 => floats!(Float64, f64),
        ElementType::URational => EntryValue::URational(
            items
                .iter()
                .map(|x| match x {
                    Value::URational(n, d) => Ok((*n, *d)),
                    _ => Err(mismatch("unsigned rational")),
                })
                .collect::<Result<_, _>>()?,
        ),
        ElementType::Rational => EntryValue::Rational(
            items
                .iter()
                .map(|x| match x {
                    Value::Rational(n, d) => Ok((*n, *d)),
                    _ => Err(mismatch("rational")),
                })
                .collect::<Result<_, _>>()?,
        ),
    })
}
