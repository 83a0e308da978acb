//! Fixed-layout records: every field is always on the wire.

use crate::error::CodecError;
use crate::frame;
use crate::numeric::{ByteReader, Endianness};
use crate::schema::enums::{CaptStatus, CaptureMode, DestToSave, WireEnum};
use crate::value::{FieldValues, Value};

/// Shooting result, polled after a `SnapCommand`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CamCaptStatus {
    pub image_id: u8,
    pub image_db_head: u8,
    pub image_db_tail: u8,
    pub capt_status: CaptStatus,
    pub dest_to_save: DestToSave,
    pub checksum_ok: bool,
}

impl CamCaptStatus {
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = ByteReader::new(bytes);
        let _header = r.read_u8()?;
        let image_id = r.read_u8()?;
        let image_db_head = r.read_u8()?;
        let image_db_tail = r.read_u8()?;
        let capt_status = CaptStatus::from_raw(r.read_u16(Endianness::Little)?);
        let dest_to_save = DestToSave::from_raw(r.read_u8()?);
        let covered = r.position();
        let trailer = r.read_u8()?;
        Ok(CamCaptStatus {
            image_id,
            image_db_head,
            image_db_tail,
            capt_status,
            dest_to_save,
            checksum_ok: frame::verify_trailer("CamCaptStatus", &bytes[..covered], trailer),
        })
    }

    pub fn to_fields(&self) -> FieldValues {
        [
            ("ImageId", Value::U8(self.image_id)),
            ("ImageDBHead", Value::U8(self.image_db_head)),
            ("ImageDBTail", Value::U8(self.image_db_tail)),
            ("CaptStatus", self.capt_status.into()),
            ("DestToSave", self.dest_to_save.into()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

/// Shooting instruction sent to the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapCommand {
    pub capture_mode: CaptureMode,
    /// Number of continuous shots.
    pub capture_amount: u8,
}

impl Default for SnapCommand {
    fn default() -> Self {
        SnapCommand { capture_mode: CaptureMode::GeneralCapt, capture_amount: 1 }
    }
}

impl SnapCommand {
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        frame::seal(&[self.capture_mode.to_raw(), self.capture_amount])
    }
}

/// Location and format of the last shot image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictFileInfo2 {
    pub file_address: u32,
    pub file_size: u32,
    pub path_name_offset: u32,
    pub file_name_offset: u32,
    /// e.g. `"JPG"`, `"DNG"`.
    pub picture_format: String,
    pub size_x: u16,
    pub size_y: u16,
    pub path_name: String,
    pub file_name: String,
}

/// Read a NUL-terminated string. A missing terminator is a truncation.
fn read_cstring(r: &mut ByteReader<'_>) -> Result<String, CodecError> {
    let mut raw = Vec::new();
    loop {
        match r.read_u8()? {
            0 => break,
            b => raw.push(b),
        }
    }
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

impl PictFileInfo2 {
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let le = Endianness::Little;
        let mut r = ByteReader::new(bytes);
        r.take(12)?;
        let file_address = r.read_u32(le)?;
        let file_size = r.read_u32(le)?;
        let path_name_offset = r.read_u32(le)?;
        let file_name_offset = r.read_u32(le)?;
        let format = r.take(4)?;
        let end = format.iter().position(|b| *b == 0).unwrap_or(format.len());
        let picture_format = String::from_utf8_lossy(&format[..end]).into_owned();
        let size_x = r.read_u16(le)?;
        let size_y = r.read_u16(le)?;
        let path_name = read_cstring(&mut r)?;
        let file_name = read_cstring(&mut r)?;
        Ok(PictFileInfo2 {
            file_address,
            file_size,
            path_name_offset,
            file_name_offset,
            picture_format,
            size_x,
            size_y,
            path_name,
            file_name,
        })
    }

    pub fn to_fields(&self) -> FieldValues {
        [
            ("FileAddress", Value::U32(self.file_address)),
            ("FileSize", Value::U32(self.file_size)),
            ("PictureFormat", Value::Str(self.picture_format.clone())),
            ("SizeX", Value::U16(self.size_x)),
            ("SizeY", Value::U16(self.size_y)),
            ("PathName", Value::Str(self.path_name.clone())),
            ("FileName", Value::Str(self.file_name.clone())),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

/// One chunk of an image file download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigPartialPictFile {
    pub acquired_size: u32,
    pub data: Vec<u8>,
}

impl BigPartialPictFile {
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut r = ByteReader::new(bytes);
        let acquired_size = r.read_u32(Endianness::Little)?;
        let data = r.take(r.remaining())?.to_vec();
        Ok(BigPartialPictFile { acquired_size, data })
    }
}
