//! Command layer: typed camera operations on top of a [`Transport`].
//!
//! The transport owns the USB session (transaction ids, bulk chunking, retries). This module
//! only builds the outgoing payloads and decodes what comes back.
//!
//! ```no_run
//! use sigma_ptp_codec::camera::{Group3Settings, SigmaCamera, Transport};
//! use sigma_ptp_codec::schema::enums::DestToSave;
//! use sigma_ptp_codec::schema::fixed::SnapCommand;
//!
//! fn shoot<T: Transport>(transport: T) -> Result<(), sigma_ptp_codec::CodecError> {
//!     let mut camera = SigmaCamera::new(transport);
//!     let config = camera.config_api()?;
//!     println!("connected to {:?}", config.camera_model);
//!     camera.set_cam_data_group3(&Group3Settings {
//!         dest_to_save: Some(DestToSave::InComputer),
//!         ..Default::default()
//!     })?;
//!     camera.snap_command(SnapCommand::default())?;
//!     let status = camera.get_cam_capt_status()?;
//!     println!("{}", status.capt_status);
//!     Ok(())
//! }
//! ```

use crate::apex::{self, ApexStep};
use crate::directory;
use crate::error::CodecError;
use crate::opcode::OpCode;
use crate::record::{self, ConditionalRecord, RecordSchema};
use crate::schema::enums::*;
use crate::schema::fixed::{BigPartialPictFile, CamCaptStatus, PictFileInfo2, SnapCommand};
use crate::schema::groups;
use crate::schema::tags;
use crate::value::{FieldValues, Value};
use tracing::debug;

/// Largest chunk `GetBigPartialPictFile` may request.
pub const MAX_PARTIAL_LENGTH: u32 = 0x0800_0000;

/// Bytes of `GetViewFrame` data preceding the JPEG stream.
const VIEW_FRAME_PREFIX: usize = 10;

/// Bytes of a payload shown in debug logs.
const LOG_PREVIEW: usize = 128;

/// Picture-transfer session the camera commands run on.
pub trait Transport {
    /// Data-in transaction: issue `opcode` with `params` and return the data phase.
    fn receive(&mut self, opcode: OpCode, params: &[u32]) -> Result<Vec<u8>, CodecError>;

    /// Data-out transaction: issue `opcode` with `params` and send `payload`.
    fn send(&mut self, opcode: OpCode, params: &[u32], payload: &[u8]) -> Result<(), CodecError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn receive(&mut self, opcode: OpCode, params: &[u32]) -> Result<Vec<u8>, CodecError> {
        (**self).receive(opcode, params)
    }

    fn send(&mut self, opcode: OpCode, params: &[u32], payload: &[u8]) -> Result<(), CodecError> {
        (**self).send(opcode, params, payload)
    }
}

fn preview(data: &[u8]) -> String {
    hex::encode(&data[..data.len().min(LOG_PREVIEW)])
}

/// Identification returned by `ConfigApi`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiConfig {
    pub camera_model: Option<String>,
    pub serial_number: Option<String>,
    pub firmware_version: Option<String>,
    pub communication_version: Option<f32>,
}

impl ApiConfig {
    pub fn from_fields(fields: &FieldValues) -> Self {
        let text = |name: &str| fields.get(name).and_then(Value::as_str).map(str::to_string);
        ApiConfig {
            camera_model: text("CameraModel"),
            serial_number: text("SerialNumber"),
            firmware_version: text("FirmwareVersion"),
            communication_version: fields
                .get("CommunicationVersion")
                .and_then(Value::as_f64)
                .map(|v| v as f32),
        }
    }
}

/// A settable conditional record.
pub trait GroupSettings {
    const SCHEMA: &'static RecordSchema;
    const OPCODE: OpCode;

    /// Fields to send. Unset options stay absent.
    fn to_fields(&self) -> Result<FieldValues, CodecError>;
}

fn put<V: Into<Value>>(out: &mut FieldValues, name: &str, v: Option<V>) {
    if let Some(v) = v {
        out.insert(name.to_string(), v.into());
    }
}

/// Settable part of `CamDataGroup1`. APEX fields take raw 8-bit codes; the `with_*` helpers
/// pick the nearest code for a physical value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group1Settings {
    pub shutter_speed: Option<u8>,
    pub aperture: Option<u8>,
    pub program_shift: Option<ProgramShift>,
    pub iso_auto: Option<IsoAuto>,
    pub iso_speed: Option<u8>,
    pub exp_compensation: Option<u8>,
    pub ab_value: Option<u8>,
    pub ab_setting: Option<AbSetting>,
    /// Millimetres.
    pub current_lens_focal_length: Option<f64>,
}

impl Group1Settings {
    pub fn with_shutter_speed(mut self, seconds: f64, step: ApexStep) -> Self {
        self.shutter_speed = apex::shutter_speed(step).encode(seconds);
        self
    }

    pub fn with_aperture(mut self, f_number: f64, step: ApexStep) -> Self {
        self.aperture = apex::aperture(step).encode(f_number);
        self
    }

    pub fn with_iso_speed(mut self, iso: f64) -> Self {
        self.iso_speed = apex::ISO_SPEED.encode(iso);
        self
    }

    pub fn with_exp_compensation(mut self, ev: f64, step: ApexStep) -> Self {
        self.exp_compensation = apex::exposure_compensation(step).encode(ev);
        self
    }
}

impl GroupSettings for Group1Settings {
    const SCHEMA: &'static RecordSchema = &groups::CAM_DATA_GROUP1;
    const OPCODE: OpCode = OpCode::SetCamDataGroup1;

    fn to_fields(&self) -> Result<FieldValues, CodecError> {
        let mut f = FieldValues::new();
        put(&mut f, "ShutterSpeed", self.shutter_speed);
        put(&mut f, "Aperture", self.aperture);
        // signed on the wire
        put(&mut f, "ProgramShift", self.program_shift.map(|p| p.to_raw() as i8));
        put(&mut f, "ISOAuto", self.iso_auto);
        put(&mut f, "ISOSpeed", self.iso_speed);
        put(&mut f, "ExpCompensation", self.exp_compensation);
        put(&mut f, "ABValue", self.ab_value);
        put(&mut f, "ABSetting", self.ab_setting);
        put(&mut f, "CurrentLensFocalLength", self.current_lens_focal_length);
        Ok(f)
    }
}

/// Settable part of `CamDataGroup2`. `FlashType` is read only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group2Settings {
    pub drive_mode: Option<DriveMode>,
    pub special_mode: Option<SpecialMode>,
    pub exposure_mode: Option<ExposureMode>,
    pub ae_metering_mode: Option<AeMeteringMode>,
    pub flash_mode: Option<FlashMode>,
    pub flash_setting: Option<FlashSetting>,
    pub white_balance: Option<WhiteBalance>,
    pub resolution: Option<Resolution>,
    pub image_quality: Option<ImageQuality>,
}

impl GroupSettings for Group2Settings {
    const SCHEMA: &'static RecordSchema = &groups::CAM_DATA_GROUP2;
    const OPCODE: OpCode = OpCode::SetCamDataGroup2;

    fn to_fields(&self) -> Result<FieldValues, CodecError> {
        let mut f = FieldValues::new();
        put(&mut f, "DriveMode", self.drive_mode);
        put(&mut f, "SpecialMode", self.special_mode);
        put(&mut f, "ExposureMode", self.exposure_mode);
        put(&mut f, "AEMeteringMode", self.ae_metering_mode);
        put(&mut f, "FlashMode", self.flash_mode);
        put(&mut f, "FlashSetting", self.flash_setting);
        put(&mut f, "WhiteBalance", self.white_balance);
        put(&mut f, "Resolution", self.resolution);
        put(&mut f, "ImageQuality", self.image_quality);
        Ok(f)
    }
}

/// Settable part of `CamDataGroup3`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group3Settings {
    pub color_space: Option<ColorSpace>,
    pub color_mode: Option<ColorMode>,
    pub af_aux_light: Option<AfAuxLight>,
    pub af_beep: Option<u8>,
    pub timer_sound: Option<u8>,
    pub dest_to_save: Option<DestToSave>,
}

impl GroupSettings for Group3Settings {
    const SCHEMA: &'static RecordSchema = &groups::CAM_DATA_GROUP3;
    const OPCODE: OpCode = OpCode::SetCamDataGroup3;

    fn to_fields(&self) -> Result<FieldValues, CodecError> {
        let mut f = FieldValues::new();
        put(&mut f, "ColorSpace", self.color_space);
        put(&mut f, "ColorMode", self.color_mode);
        put(&mut f, "AFAuxLight", self.af_aux_light);
        put(&mut f, "AFBeep", self.af_beep);
        put(&mut f, "TimerSound", self.timer_sound);
        put(&mut f, "DestToSave", self.dest_to_save);
        Ok(f)
    }
}

/// Settable part of `CamDataGroup4`.
///
/// The `loc_*` members share one presence bit: setting any of them sends all six, the others
/// as `0` (`Null`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group4Settings {
    pub dc_crop_mode: Option<DcCropMode>,
    pub lv_magnify_ratio: Option<LvMagnifyRatio>,
    pub high_iso_ext: Option<HighIsoExt>,
    pub cont_shoot_speed: Option<ContShootSpeed>,
    pub hdr: Option<Hdr>,
    pub dng_quality: Option<DngQuality>,
    pub fill_light: Option<u8>,
    pub loc_distortion: Option<LocDistortion>,
    pub loc_chromatic_aberration: Option<LocChromaticAberration>,
    pub loc_diffraction: Option<LocDiffraction>,
    pub loc_vignetting: Option<LocVignetting>,
    pub loc_color_shade: Option<LocColorShade>,
    pub loc_color_shade_acq: Option<LocColorShadeAcq>,
    pub e_image_stab: Option<EImageStab>,
    pub shutter_sound: Option<u8>,
}

impl GroupSettings for Group4Settings {
    const SCHEMA: &'static RecordSchema = &groups::CAM_DATA_GROUP4;
    const OPCODE: OpCode = OpCode::SetCamDataGroup4;

    fn to_fields(&self) -> Result<FieldValues, CodecError> {
        let mut f = FieldValues::new();
        put(&mut f, "DCCropMode", self.dc_crop_mode);
        put(&mut f, "LVMagnifyRatio", self.lv_magnify_ratio);
        put(&mut f, "HighISOExt", self.high_iso_ext);
        put(&mut f, "ContShootSpeed", self.cont_shoot_speed);
        put(&mut f, "HDR", self.hdr);
        put(&mut f, "DNGQuality", self.dng_quality);
        put(&mut f, "FillLight", self.fill_light);
        put(&mut f, "LOCDistortion", self.loc_distortion);
        put(&mut f, "LOCChromaticAberration", self.loc_chromatic_aberration);
        put(&mut f, "LOCDiffraction", self.loc_diffraction);
        put(&mut f, "LOCVignetting", self.loc_vignetting);
        put(&mut f, "LOCColorShade", self.loc_color_shade);
        put(&mut f, "LOCColorShadeAcq", self.loc_color_shade_acq);
        put(&mut f, "EImageStab", self.e_image_stab);
        put(&mut f, "ShutterSound", self.shutter_sound);
        Ok(f)
    }
}

/// Settable part of `CamDataGroup5`.
///
/// The interval timer is set with both `interval_timer_second` and `interval_timer_frame`;
/// giving only one of them is rejected. The countdown members are read only and go out as `0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group5Settings {
    pub interval_timer_second: Option<u16>,
    pub interval_timer_frame: Option<u8>,
    /// Kelvin.
    pub color_temp: Option<u16>,
    pub aspect_ratio: Option<AspectRatio>,
    pub tone_effect: Option<ToneEffect>,
    pub af_aux_light_ef: Option<AfAuxLightEf>,
}

impl GroupSettings for Group5Settings {
    const SCHEMA: &'static RecordSchema = &groups::CAM_DATA_GROUP5;
    const OPCODE: OpCode = OpCode::SetCamDataGroup5;

    fn to_fields(&self) -> Result<FieldValues, CodecError> {
        match (self.interval_timer_second, self.interval_timer_frame) {
            (Some(_), None) => {
                return Err(CodecError::MissingCorrelatedField {
                    given: "IntervalTimerSecond".into(),
                    missing: "IntervalTimerFrame".into(),
                })
            }
            (None, Some(_)) => {
                return Err(CodecError::MissingCorrelatedField {
                    given: "IntervalTimerFrame".into(),
                    missing: "IntervalTimerSecond".into(),
                })
            }
            _ => {}
        }
        let mut f = FieldValues::new();
        put(&mut f, "IntervalTimerSecond", self.interval_timer_second);
        put(&mut f, "IntervalTimerFrame", self.interval_timer_frame);
        put(&mut f, "ColorTemp", self.color_temp);
        put(&mut f, "AspectRatio", self.aspect_ratio);
        put(&mut f, "ToneEffect", self.tone_effect);
        put(&mut f, "AFAuxLightEF", self.af_aux_light_ef);
        Ok(f)
    }
}

/// A camera reached through `T`.
#[derive(Debug)]
pub struct SigmaCamera<T: Transport> {
    transport: T,
}

impl<T: Transport> SigmaCamera<T> {
    pub fn new(transport: T) -> Self {
        SigmaCamera { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    fn receive(&mut self, opcode: OpCode, params: &[u32]) -> Result<Vec<u8>, CodecError> {
        let data = self.transport.receive(opcode, params)?;
        debug!(op = %opcode, len = data.len(), data = %preview(&data), "RECV");
        Ok(data)
    }

    fn send(&mut self, opcode: OpCode, params: &[u32], payload: &[u8]) -> Result<(), CodecError> {
        debug!(op = %opcode, len = payload.len(), data = %preview(payload), "SEND");
        self.transport.send(opcode, params, payload)
    }

    /// First command of an application session. The camera resets its settings to defaults
    /// and answers with its identification.
    pub fn config_api(&mut self) -> Result<ApiConfig, CodecError> {
        let data = self.receive(OpCode::ConfigApi, &[0])?;
        let entries = directory::decode_entries(&data)?;
        Ok(ApiConfig::from_fields(&tags::API_CONFIG.to_fields(&entries)))
    }

    fn get_group(&mut self, opcode: OpCode, schema: &RecordSchema) -> Result<ConditionalRecord, CodecError> {
        let data = self.receive(opcode, &[])?;
        record::decode(schema, &data)
    }

    pub fn get_cam_data_group1(&mut self) -> Result<ConditionalRecord, CodecError> {
        self.get_group(OpCode::GetCamDataGroup1, &groups::CAM_DATA_GROUP1)
    }

    pub fn get_cam_data_group2(&mut self) -> Result<ConditionalRecord, CodecError> {
        self.get_group(OpCode::GetCamDataGroup2, &groups::CAM_DATA_GROUP2)
    }

    pub fn get_cam_data_group3(&mut self) -> Result<ConditionalRecord, CodecError> {
        self.get_group(OpCode::GetCamDataGroup3, &groups::CAM_DATA_GROUP3)
    }

    pub fn get_cam_data_group4(&mut self) -> Result<ConditionalRecord, CodecError> {
        self.get_group(OpCode::GetCamDataGroup4, &groups::CAM_DATA_GROUP4)
    }

    pub fn get_cam_data_group5(&mut self) -> Result<ConditionalRecord, CodecError> {
        self.get_group(OpCode::GetCamDataGroup5, &groups::CAM_DATA_GROUP5)
    }

    /// Encode and send any settable group. Nothing is sent when encoding fails.
    pub fn set_cam_data_group<S: GroupSettings>(&mut self, settings: &S) -> Result<(), CodecError> {
        let payload = record::encode(S::SCHEMA, &settings.to_fields()?)?;
        self.send(S::OPCODE, &[], &payload)
    }

    pub fn set_cam_data_group1(&mut self, settings: &Group1Settings) -> Result<(), CodecError> {
        self.set_cam_data_group(settings)
    }

    pub fn set_cam_data_group2(&mut self, settings: &Group2Settings) -> Result<(), CodecError> {
        self.set_cam_data_group(settings)
    }

    pub fn set_cam_data_group3(&mut self, settings: &Group3Settings) -> Result<(), CodecError> {
        self.set_cam_data_group(settings)
    }

    pub fn set_cam_data_group4(&mut self, settings: &Group4Settings) -> Result<(), CodecError> {
        self.set_cam_data_group(settings)
    }

    pub fn set_cam_data_group5(&mut self, settings: &Group5Settings) -> Result<(), CodecError> {
        self.set_cam_data_group(settings)
    }

    /// Focus state as named fields (see [`tags::CAM_DATA_GROUP_FOCUS`]).
    pub fn get_cam_data_group_focus(&mut self) -> Result<FieldValues, CodecError> {
        let data = self.receive(OpCode::GetCamDataGroupFocus, &[])?;
        let entries = directory::decode_entries(&data)?;
        Ok(tags::CAM_DATA_GROUP_FOCUS.to_fields(&entries))
    }

    /// Shooting result of the current capture.
    pub fn get_cam_capt_status(&mut self) -> Result<CamCaptStatus, CodecError> {
        let data = self.receive(OpCode::GetCamCaptStatus, &[0])?;
        CamCaptStatus::decode(&data)
    }

    pub fn snap_command(&mut self, command: SnapCommand) -> Result<(), CodecError> {
        let payload = command.encode()?;
        self.send(OpCode::SnapCommand, &[], &payload)
    }

    /// Location and format of the last image shot in camera-control mode.
    pub fn get_pict_file_info2(&mut self) -> Result<PictFileInfo2, CodecError> {
        let data = self.receive(OpCode::GetPictFileInfo2, &[])?;
        PictFileInfo2::decode(&data)
    }

    /// Download `max_length` bytes of the image stored at `store_address`, starting at
    /// `start_address` within the file.
    pub fn get_big_partial_pict_file(
        &mut self,
        store_address: u32,
        start_address: u32,
        max_length: u32,
    ) -> Result<BigPartialPictFile, CodecError> {
        if max_length > MAX_PARTIAL_LENGTH {
            return Err(CodecError::OutOfRange {
                field: "max_length".into(),
                value: format!("{:#x}", max_length),
            });
        }
        let data = self.receive(
            OpCode::GetBigPartialPictFile,
            &[store_address, start_address, max_length],
        )?;
        BigPartialPictFile::decode(&data)
    }

    /// Live view JPEG. The frame carries no usable checksum.
    pub fn get_view_frame(&mut self) -> Result<Vec<u8>, CodecError> {
        let mut data = self.transport.receive(OpCode::GetViewFrame, &[])?;
        if data.len() < VIEW_FRAME_PREFIX {
            return Err(CodecError::Truncated {
                offset: 0,
                needed: VIEW_FRAME_PREFIX,
                available: data.len(),
            });
        }
        Ok(data.split_off(VIEW_FRAME_PREFIX))
    }
}
