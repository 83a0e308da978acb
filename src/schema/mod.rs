//! Record schemas of the camera-control extension.
//!
//! - [`groups`]: presence tables of the conditional `CamDataGroup` records
//! - [`tags`]: tag tables of the directory-array records
//! - [`fixed`]: fixed-layout records
//! - [`enums`]: enumerated field values

pub mod enums;
pub mod fixed;
pub mod groups;
pub mod tags;

use crate::directory;
use crate::error::CodecError;
use crate::record::{self, ConditionalRecord, RecordSchema};
use crate::value::FieldValues;
use fixed::{CamCaptStatus, PictFileInfo2};
use tags::TagTable;

/// Every record type that can be decoded from a raw buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    CamDataGroup1,
    CamDataGroup2,
    CamDataGroup3,
    CamDataGroup4,
    CamDataGroup5,
    CamDataGroupFocus,
    ApiConfig,
    CamCaptStatus,
    PictFileInfo2,
}

impl RecordKind {
    pub const ALL: [RecordKind; 9] = [
        RecordKind::CamDataGroup1,
        RecordKind::CamDataGroup2,
        RecordKind::CamDataGroup3,
        RecordKind::CamDataGroup4,
        RecordKind::CamDataGroup5,
        RecordKind::CamDataGroupFocus,
        RecordKind::ApiConfig,
        RecordKind::CamCaptStatus,
        RecordKind::PictFileInfo2,
    ];

    /// Short name used on the command line.
    pub fn short_name(self) -> &'static str {
        match self {
            RecordKind::CamDataGroup1 => "group1",
            RecordKind::CamDataGroup2 => "group2",
            RecordKind::CamDataGroup3 => "group3",
            RecordKind::CamDataGroup4 => "group4",
            RecordKind::CamDataGroup5 => "group5",
            RecordKind::CamDataGroupFocus => "focus",
            RecordKind::ApiConfig => "api-config",
            RecordKind::CamCaptStatus => "capt-status",
            RecordKind::PictFileInfo2 => "pict-file-info2",
        }
    }

    pub fn from_short_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.short_name() == name)
    }

    pub fn schema(self) -> Option<&'static RecordSchema> {
        match self {
            RecordKind::CamDataGroup1 => Some(&groups::CAM_DATA_GROUP1),
            RecordKind::CamDataGroup2 => Some(&groups::CAM_DATA_GROUP2),
            RecordKind::CamDataGroup3 => Some(&groups::CAM_DATA_GROUP3),
            RecordKind::CamDataGroup4 => Some(&groups::CAM_DATA_GROUP4),
            RecordKind::CamDataGroup5 => Some(&groups::CAM_DATA_GROUP5),
            _ => None,
        }
    }

    pub fn tag_table(self) -> Option<&'static TagTable> {
        match self {
            RecordKind::CamDataGroupFocus => Some(&tags::CAM_DATA_GROUP_FOCUS),
            RecordKind::ApiConfig => Some(&tags::API_CONFIG),
            _ => None,
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<Decoded, CodecError> {
        if let Some(schema) = self.schema() {
            return record::decode(schema, bytes).map(Decoded::Conditional);
        }
        if let Some(table) = self.tag_table() {
            let entries = directory::decode_entries(bytes)?;
            return Ok(Decoded::Directory { table, fields: table.to_fields(&entries) });
        }
        match self {
            RecordKind::CamCaptStatus => CamCaptStatus::decode(bytes).map(Decoded::CaptStatus),
            _ => PictFileInfo2::decode(bytes).map(Decoded::PictFileInfo2),
        }
    }
}

/// A decoded record of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Conditional(ConditionalRecord),
    Directory { table: &'static TagTable, fields: FieldValues },
    CaptStatus(CamCaptStatus),
    PictFileInfo2(PictFileInfo2),
}

impl Decoded {
    pub fn name(&self) -> &'static str {
        match self {
            Decoded::Conditional(r) => r.schema,
            Decoded::Directory { table, .. } => table.name,
            Decoded::CaptStatus(_) => "CamCaptStatus",
            Decoded::PictFileInfo2(_) => "PictFileInfo2",
        }
    }

    /// Field values of the record, whatever its layout.
    pub fn fields(&self) -> FieldValues {
        match self {
            Decoded::Conditional(r) => r.fields.clone(),
            Decoded::Directory { fields, .. } => fields.clone(),
            Decoded::CaptStatus(s) => s.to_fields(),
            Decoded::PictFileInfo2(p) => p.to_fields(),
        }
    }
}
