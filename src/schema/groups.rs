//! Presence tables of the `CamDataGroup1`..`CamDataGroup5` records.
//!
//! Slots are listed in wire order; slot *i* owns mask `1 << ((i + 8) % 16)`. Every table
//! covers all sixteen bits, with `_ReservedN` slots for the bits the camera does not document.

use crate::numeric::FixedPoint;
use crate::record::{FieldCodec, FieldDef, PresenceSlot, RecordSchema};

/// Focal lengths are `u16` with four fraction bits.
const FOCAL_LENGTH: FieldCodec = FieldCodec::FixedPoint(FixedPoint::new(4));

/// Exposure and status block: APEX codes, media and battery state.
pub static CAM_DATA_GROUP1: RecordSchema = RecordSchema {
    name: "CamDataGroup1",
    slots: &[
        PresenceSlot::field("ShutterSpeed", 0x0100, FieldCodec::U8),
        PresenceSlot::field("Aperture", 0x0200, FieldCodec::U8),
        PresenceSlot::field("ProgramShift", 0x0400, FieldCodec::I8),
        PresenceSlot::field("ISOAuto", 0x0800, FieldCodec::U8),
        PresenceSlot::field("ISOSpeed", 0x1000, FieldCodec::U8),
        PresenceSlot::field("ExpCompensation", 0x2000, FieldCodec::U8),
        PresenceSlot::field("ABValue", 0x4000, FieldCodec::U8),
        PresenceSlot::field("ABSetting", 0x8000, FieldCodec::U8),
        PresenceSlot::field("FrameBufferState", 0x0001, FieldCodec::U8),
        PresenceSlot::field("MediaFreeSpace", 0x0002, FieldCodec::U16),
        PresenceSlot::field("MediaStatus", 0x0004, FieldCodec::U8),
        PresenceSlot::field("CurrentLensFocalLength", 0x0008, FOCAL_LENGTH),
        PresenceSlot::field("BatteryState", 0x0010, FieldCodec::U8),
        PresenceSlot::field("ABShotRemainNumber", 0x0020, FieldCodec::U8),
        PresenceSlot::field("ExpCompExcludeAB", 0x0040, FieldCodec::U8),
        PresenceSlot::reserved("_Reserved0", 0x0080),
    ],
};

/// Drive, exposure, flash and image settings.
pub static CAM_DATA_GROUP2: RecordSchema = RecordSchema {
    name: "CamDataGroup2",
    slots: &[
        PresenceSlot::field("DriveMode", 0x0100, FieldCodec::U8),
        PresenceSlot::field("SpecialMode", 0x0200, FieldCodec::U8),
        PresenceSlot::field("ExposureMode", 0x0400, FieldCodec::U8),
        PresenceSlot::field("AEMeteringMode", 0x0800, FieldCodec::U8),
        PresenceSlot::reserved("_Reserved0", 0x1000),
        PresenceSlot::reserved("_Reserved1", 0x2000),
        PresenceSlot::reserved("_Reserved2", 0x4000),
        PresenceSlot::reserved("_Reserved3", 0x8000),
        PresenceSlot::field("FlashType", 0x0001, FieldCodec::U8),
        PresenceSlot::reserved("_Reserved4", 0x0002),
        PresenceSlot::field("FlashMode", 0x0004, FieldCodec::U8),
        PresenceSlot::field("FlashSetting", 0x0008, FieldCodec::U8),
        PresenceSlot::reserved("_Reserved5", 0x0010),
        PresenceSlot::field("WhiteBalance", 0x0020, FieldCodec::U8),
        PresenceSlot::field("Resolution", 0x0040, FieldCodec::U8),
        PresenceSlot::field("ImageQuality", 0x0080, FieldCodec::U8),
    ],
};

/// Color, lens range, battery kind and sound settings.
pub static CAM_DATA_GROUP3: RecordSchema = RecordSchema {
    name: "CamDataGroup3",
    slots: &[
        PresenceSlot::reserved("_Reserved0", 0x0100),
        PresenceSlot::reserved("_Reserved1", 0x0200),
        PresenceSlot::reserved("_Reserved2", 0x0400),
        PresenceSlot::field("ColorSpace", 0x0800, FieldCodec::U8),
        PresenceSlot::field("ColorMode", 0x1000, FieldCodec::U8),
        PresenceSlot::field("BatteryKind", 0x2000, FieldCodec::U8),
        PresenceSlot::field("LensWideFocalLength", 0x4000, FOCAL_LENGTH),
        PresenceSlot::field("LensTeleFocalLength", 0x8000, FOCAL_LENGTH),
        PresenceSlot::field("AFAuxLight", 0x0001, FieldCodec::U8),
        PresenceSlot::field("AFBeep", 0x0002, FieldCodec::U8),
        PresenceSlot::reserved("_Reserved3", 0x0004),
        PresenceSlot::reserved("_Reserved4", 0x0008),
        PresenceSlot::reserved("_Reserved5", 0x0010),
        PresenceSlot::field("TimerSound", 0x0020, FieldCodec::U8),
        PresenceSlot::reserved("_Reserved6", 0x0040),
        PresenceSlot::field("DestToSave", 0x0080, FieldCodec::U8),
    ],
};

/// Lens optics compensation, gated by the single `LOC` bit.
pub static LOC_MEMBERS: [FieldDef; 6] = [
    FieldDef::new("LOCDistortion", FieldCodec::U8),
    FieldDef::new("LOCChromaticAberration", FieldCodec::U8),
    FieldDef::new("LOCDiffraction", FieldCodec::U8),
    FieldDef::new("LOCVignetting", FieldCodec::U8),
    FieldDef::new("LOCColorShade", FieldCodec::U8),
    FieldDef::new("LOCColorShadeAcq", FieldCodec::U8),
];

/// Crop, live view, HDR and lens compensation settings.
pub static CAM_DATA_GROUP4: RecordSchema = RecordSchema {
    name: "CamDataGroup4",
    slots: &[
        PresenceSlot::reserved("_Reserved0", 0x0100),
        PresenceSlot::reserved("_Reserved1", 0x0200),
        PresenceSlot::reserved("_Reserved2", 0x0400),
        PresenceSlot::reserved("_Reserved3", 0x0800),
        PresenceSlot::field("DCCropMode", 0x1000, FieldCodec::U8),
        PresenceSlot::field("LVMagnifyRatio", 0x2000, FieldCodec::U8),
        PresenceSlot::field("HighISOExt", 0x4000, FieldCodec::U8),
        PresenceSlot::field("ContShootSpeed", 0x8000, FieldCodec::U8),
        PresenceSlot::field("HDR", 0x0001, FieldCodec::U8),
        PresenceSlot::field("DNGQuality", 0x0002, FieldCodec::U8),
        PresenceSlot::field("FillLight", 0x0004, FieldCodec::U8),
        PresenceSlot::group("LOC", 0x0008, &LOC_MEMBERS),
        PresenceSlot::field("EImageStab", 0x0010, FieldCodec::U8),
        PresenceSlot::field("ShutterSound", 0x0020, FieldCodec::U8),
        PresenceSlot::reserved("_Reserved4", 0x0040),
        PresenceSlot::reserved("_Reserved5", 0x0080),
    ],
};

/// Interval timer settings and countdown, gated by the single `IntervalTimer` bit.
pub static INTERVAL_TIMER_MEMBERS: [FieldDef; 4] = [
    FieldDef::new("IntervalTimerSecond", FieldCodec::U16),
    FieldDef::new("IntervalTimerFrame", FieldCodec::U8),
    FieldDef::new("IntervalTimerSecondRemain", FieldCodec::U16),
    FieldDef::new("IntervalTimerFrameRemain", FieldCodec::U8),
];

/// Interval timer, color temperature and aspect ratio.
pub static CAM_DATA_GROUP5: RecordSchema = RecordSchema {
    name: "CamDataGroup5",
    slots: &[
        PresenceSlot::group("IntervalTimer", 0x0100, &INTERVAL_TIMER_MEMBERS),
        PresenceSlot::field("ColorTemp", 0x0200, FieldCodec::U16),
        PresenceSlot::reserved("_Reserved0", 0x0400),
        PresenceSlot::field("AspectRatio", 0x0800, FieldCodec::U8),
        PresenceSlot::reserved("_Reserved1", 0x1000),
        PresenceSlot::field("ToneEffect", 0x2000, FieldCodec::U8),
        PresenceSlot::field("AFAuxLightEF", 0x4000, FieldCodec::U8),
        PresenceSlot::reserved("_Reserved2", 0x8000),
        PresenceSlot::reserved("_Reserved3", 0x0001),
        PresenceSlot::reserved("_Reserved4", 0x0002),
        PresenceSlot::reserved("_Reserved5", 0x0004),
        PresenceSlot::reserved("_Reserved6", 0x0008),
        PresenceSlot::reserved("_Reserved7", 0x0010),
        PresenceSlot::reserved("_Reserved8", 0x0020),
        PresenceSlot::reserved("_Reserved9", 0x0040),
        PresenceSlot::reserved("_Reserved10", 0x0080),
    ],
};

/// All conditional record schemas.
pub static ALL: [&RecordSchema; 5] = [
    &CAM_DATA_GROUP1,
    &CAM_DATA_GROUP2,
    &CAM_DATA_GROUP3,
    &CAM_DATA_GROUP4,
    &CAM_DATA_GROUP5,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_follow_wire_order_and_cover_all_bits() {
        for schema in ALL {
            assert_eq!(schema.slots.len(), 16, "{}", schema.name);
            assert_eq!(schema.covered_mask(), 0xffff, "{}", schema.name);
            for (i, slot) in schema.slots.iter().enumerate() {
                assert_eq!(slot.mask, 1 << ((i + 8) % 16), "{}.{}", schema.name, slot.name);
            }
        }
    }

    #[test]
    fn field_names_are_unique() {
        for schema in ALL {
            let mut names = schema.field_names();
            let n = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), n, "{}", schema.name);
        }
    }
}
