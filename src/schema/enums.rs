//! Enumerated field values.
//!
//! Every enum keeps an `Unknown(raw)` variant: the firmware emits codes outside the documented
//! sets, and `from_raw`/`to_raw` must round-trip them unchanged.

use crate::value::Value;

/// Common interface of the generated wire enums.
pub trait WireEnum: Copy + Sized {
    type Raw: Copy;

    fn from_raw(raw: Self::Raw) -> Self;
    fn to_raw(self) -> Self::Raw;
    /// Variant name, or `None` for an unrecognized code.
    fn label(self) -> Option<&'static str>;
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident : $repr:ty {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Code outside the documented set.
            Unknown($repr),
        }

        impl WireEnum for $name {
            type Raw = $repr;

            fn from_raw(raw: $repr) -> Self {
                match raw {
                    $( $value => $name::$variant, )+
                    other => $name::Unknown(other),
                }
            }

            fn to_raw(self) -> $repr {
                match self {
                    $( $name::$variant => $value, )+
                    $name::Unknown(raw) => raw,
                }
            }

            fn label(self) -> Option<&'static str> {
                match self {
                    $( $name::$variant => Some(stringify!($variant)), )+
                    $name::Unknown(_) => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self.label() {
                    Some(label) => f.write_str(label),
                    None => write!(f, "Unknown({:#x})", self.to_raw()),
                }
            }
        }

        impl From<$name> for Value {
            fn from(v: $name) -> Value {
                Value::from(v.to_raw())
            }
        }
    };
}

wire_enum! {
    /// Program shift dial step. The camera does not report the dial position.
    ProgramShift: u8 { Null = 0x00, Plus = 0x01, Minus = 0xff }
}

wire_enum! {
    IsoAuto: u8 { Manual = 0, Auto = 1 }
}

wire_enum! {
    /// Auto bracket sequence.
    AbSetting: u8 {
        Null = 0x00,
        Ab3ZeroMinusPlus = 0x01,
        Ab3MinusZeroPlus = 0x02,
        Ab3PlusZeroMinus = 0x03,
        Ab5ZeroMinusPlus = 0x04,
        Ab5MinusZeroPlus = 0x05,
        Ab5PlusZeroMinus = 0x06,
    }
}

wire_enum! {
    DriveMode: u8 {
        Null = 0,
        SingleCapture = 1,
        ContinuousCapture = 2,
        TwoSecondsSelfTimer = 3,
        TenSecondsSelfTimer = 4,
        IntervalTimer = 7,
    }
}

wire_enum! {
    SpecialMode: u8 {
        Null = 0x00,
        /// Live view is displayed on the host.
        LiveView = 0x02,
    }
}

wire_enum! {
    ExposureMode: u8 {
        Null = 0,
        ProgramAuto = 1,
        AperturePriority = 2,
        ShutterPriority = 3,
        Manual = 4,
        C1 = 0x10,
        C2 = 0x20,
        C3 = 0x40,
        Star = 0x80,
    }
}

wire_enum! {
    AeMeteringMode: u8 {
        Null = 0,
        Evaluative = 1,
        CenterWeightedAverage = 2,
        CenterArea = 3,
        Spot = 4,
    }
}

wire_enum! {
    FlashType: u8 { Null = 0, InternalPopupFlash = 1, ExternalFlash = 2 }
}

wire_enum! {
    FlashMode: u8 {
        Normal = 0,
        RedEyeReduction = 0x01,
        FpEmission = 0x02,
        MultiFlash = 0x04,
        WirelessFlash1 = 0x08,
        WirelessFlash2 = 0x10,
        WirelessFlash3 = 0x20,
        SlowSync = 0x40,
    }
}

wire_enum! {
    FlashSetting: u8 {
        Null = 0,
        TtlAuto = 0x01,
        TtlManual = 0x02,
        /// Read only: charging.
        EmissionDisabled = 0x80,
        /// Read only.
        ExposureWarning = 0x81,
    }
}

wire_enum! {
    WhiteBalance: u8 {
        Null = 0x00,
        Auto = 0x01,
        Sunlight = 0x02,
        Shade = 0x03,
        Overcast = 0x04,
        Incandescent = 0x05,
        Fluorescent = 0x06,
        Flash = 0x07,
        Custom1 = 0x08,
        CustomCapt1 = 0x09,
        Custom2 = 0x0a,
        CustomCapt2 = 0x0b,
        Custom3 = 0x0c,
        CustomCapt3 = 0x0d,
        ColorTemp = 0x0e,
        /// Auto, light source priority.
        LightSource = 0x0f,
    }
}

wire_enum! {
    Resolution: u8 { Null = 0x0, High = 0x1, Medium = 0x2, Low = 0x4 }
}

wire_enum! {
    ImageQuality: u8 {
        JpegFine = 0x02,
        JpegNormal = 0x04,
        JpegBasic = 0x08,
        Dng = 0x10,
        DngAndJpeg = 0x12,
    }
}

wire_enum! {
    ColorSpace: u8 { Null = 0x00, Srgb = 0x01, AdobeRgb = 0x02 }
}

wire_enum! {
    ColorMode: u8 {
        Normal = 0x00,
        Sepia = 0x01,
        Monochrome = 0x02,
        Standard = 0x03,
        Vivid = 0x04,
        Neutral = 0x05,
        Portrait = 0x06,
        Landscape = 0x07,
        FovClassicBlue = 0x08,
        Sunset = 0x09,
        Forest = 0x0a,
        Cinema = 0x0b,
        FovClassicYellow = 0x0c,
    }
}

wire_enum! {
    BatteryKind: u8 { Null = 0x00, BodyBattery = 0x01, AcAdapter = 0x02 }
}

wire_enum! {
    AfAuxLight: u8 { Null = 0x00, On = 0x01, Off = 0x02 }
}

wire_enum! {
    CaptureMode: u8 {
        Null = 0x00,
        GeneralCapt = 0x01,
        NonAfCapt = 0x02,
        AfDriveOnly = 0x03,
        StartAf = 0x04,
        StopAf = 0x05,
        StartCapt = 0x06,
        StopCapt = 0x07,
        StartRecMovieAf = 0x10,
        StartRecMovie = 0x20,
        StopRecMovie = 0x30,
    }
}

wire_enum! {
    /// Shooting result reported by `CamCaptStatus`.
    CaptStatus: u16 {
        Cleared = 0x0000,
        ShootInProgress = 0x0001,
        ShootSuccess = 0x0002,
        ImageGenInProgress = 0x0004,
        ImageGenCompleted = 0x0005,
        StopMovieRec = 0x0006,
        MovieGenCompleted = 0x0007,
        AfSuccess = 0x8001,
        CwbSuccess = 0x8002,
        ImageDataStorageCompleted = 0x8003,
        Interrupted = 0x8004,
        AfFailed = 0x6001,
        BufferFull = 0x6002,
        CwbFailed = 0x6003,
        ImageGenFailed = 0x6004,
        Failed = 0x6005,
    }
}

impl CaptStatus {
    /// Capture finished, successfully or not; polling can stop.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CaptStatus::ImageGenCompleted
                | CaptStatus::MovieGenCompleted
                | CaptStatus::AfSuccess
                | CaptStatus::CwbSuccess
                | CaptStatus::ImageDataStorageCompleted
                | CaptStatus::Interrupted
        ) || self.is_failure()
    }

    pub fn is_failure(self) -> bool {
        (0x6001..=0x6005).contains(&self.to_raw())
    }
}

wire_enum! {
    DestToSave: u8 { Null = 0x00, InCamera = 0x01, InComputer = 0x02, Both = 0x03 }
}

wire_enum! {
    DcCropMode: u8 { Auto = 0x00, Off = 0x01, On = 0x02 }
}

wire_enum! {
    LvMagnifyRatio: u8 { Null = 0x00, X1 = 0x01, X4 = 0x02, X8 = 0x03 }
}

wire_enum! {
    HighIsoExt: u8 { Auto = 0x00, Off = 0x01, On = 0x02 }
}

wire_enum! {
    ContShootSpeed: u8 { Auto = 0x00, High = 0x01, Medium = 0x02, Low = 0x03 }
}

wire_enum! {
    Hdr: u8 {
        Null = 0x00,
        Off = 0xff,
        Auto = 0xfe,
        PlusMinus1 = 0x01,
        PlusMinus2 = 0x02,
        PlusMinus3 = 0x03,
    }
}

wire_enum! {
    DngQuality: u8 { Q12Bit = 12, Q14Bit = 14 }
}

wire_enum! {
    LocDistortion: u8 { Null = 0x00, Auto = 0x01, Off = 0x02 }
}

wire_enum! {
    LocChromaticAberration: u8 { Null = 0x00, Auto = 0x01, Off = 0x02 }
}

wire_enum! {
    LocDiffraction: u8 { Null = 0x00, On = 0x01, Off = 0x02 }
}

wire_enum! {
    LocVignetting: u8 { Null = 0x00, Auto = 0x01, Off = 0x02 }
}

wire_enum! {
    LocColorShade: u8 {
        Null = 0x00,
        Auto = 0xff,
        Off = 0xfe,
        No1 = 0x01,
        No2 = 0x02,
        No3 = 0x03,
        No4 = 0x04,
        No5 = 0x05,
        No6 = 0x06,
        No7 = 0x07,
        No8 = 0x08,
        No9 = 0x09,
        No10 = 0x0a,
    }
}

wire_enum! {
    /// Keep `On` while the color-shading capture menu is open.
    LocColorShadeAcq: u8 { Null = 0x00, On = 0x01, Off = 0x02 }
}

wire_enum! {
    EImageStab: u8 { Null = 0x00, On = 0x01, Off = 0x02 }
}

wire_enum! {
    AspectRatio: u8 {
        Null = 0x00,
        W21H9 = 0x01,
        W16H9 = 0x02,
        W3H2 = 0x03,
        W4H3 = 0x04,
        W7H6 = 0x05,
        W1H1 = 0x06,
        WSqrt2H1 = 0x07,
    }
}

wire_enum! {
    /// Tone in monochrome mode.
    ToneEffect: u8 { Null = 0x00, BAndW = 0x01 }
}

wire_enum! {
    /// Auxiliary light of an external flash.
    AfAuxLightEf: u8 { Null = 0x00, On = 0x01, Off = 0x02 }
}

wire_enum! {
    FocusMode: u8 { Mf = 1, Af = 2, AfS = 3, AfC = 4 }
}

wire_enum! {
    AfLock: u8 { Off = 0, On = 1 }
}

wire_enum! {
    FaceEyeAf: u8 { Off = 0, FaceOnly = 1, FaceEyeAuto = 2 }
}

wire_enum! {
    FaceEyeAfStatus: u8 { NonDetection = 0, Detection = 1 }
}

wire_enum! {
    FocusArea: u8 { MultiAutoFocusPoints = 1, OnePointSelection = 2, Tracking = 3 }
}

wire_enum! {
    OnePointSelection: u8 { Free = 0, X49 = 49 }
}

wire_enum! {
    PreConstAf: u8 { Off = 0, On = 1 }
}

wire_enum! {
    FocusLimit: u8 { Off = 0, On = 1 }
}

/// Label of an enumerated field value, by record field name.
///
/// Signed values are taken as their byte pattern (`ProgramShift` is read as `i8`).
pub fn label_for(field: &str, value: &Value) -> Option<&'static str> {
    let raw = value.as_i64()?;
    let byte = u8::try_from(raw)
        .ok()
        .or_else(|| i8::try_from(raw).ok().map(|v| v as u8));

    macro_rules! by_byte {
        ($($field:literal => $ty:ty),+ $(,)?) => {
            match field {
                $( $field => byte.map(<$ty>::from_raw).and_then(WireEnum::label), )+
                "CaptStatus" => u16::try_from(raw).ok().map(CaptStatus::from_raw).and_then(WireEnum::label),
                _ => None,
            }
        };
    }

    by_byte! {
        "ProgramShift" => ProgramShift,
        "ISOAuto" => IsoAuto,
        "ABSetting" => AbSetting,
        "DriveMode" => DriveMode,
        "SpecialMode" => SpecialMode,
        "ExposureMode" => ExposureMode,
        "AEMeteringMode" => AeMeteringMode,
        "FlashType" => FlashType,
        "FlashMode" => FlashMode,
        "FlashSetting" => FlashSetting,
        "WhiteBalance" => WhiteBalance,
        "Resolution" => Resolution,
        "ImageQuality" => ImageQuality,
        "ColorSpace" => ColorSpace,
        "ColorMode" => ColorMode,
        "BatteryKind" => BatteryKind,
        "AFAuxLight" => AfAuxLight,
        "CaptureMode" => CaptureMode,
        "DestToSave" => DestToSave,
        "DCCropMode" => DcCropMode,
        "LVMagnifyRatio" => LvMagnifyRatio,
        "HighISOExt" => HighIsoExt,
        "ContShootSpeed" => ContShootSpeed,
        "HDR" => Hdr,
        "DNGQuality" => DngQuality,
        "LOCDistortion" => LocDistortion,
        "LOCChromaticAberration" => LocChromaticAberration,
        "LOCDiffraction" => LocDiffraction,
        "LOCVignetting" => LocVignetting,
        "LOCColorShade" => LocColorShade,
        "LOCColorShadeAcq" => LocColorShadeAcq,
        "EImageStab" => EImageStab,
        "AspectRatio" => AspectRatio,
        "ToneEffect" => ToneEffect,
        "AFAuxLightEF" => AfAuxLightEf,
        "FocusMode" => FocusMode,
        "AFLock" => AfLock,
        "FaceEyeAF" => FaceEyeAf,
        "FaceEyeAFStatus" => FaceEyeAfStatus,
        "FocusArea" => FocusArea,
        "OnePointSelection" => OnePointSelection,
        "PreConstAF" => PreConstAf,
        "FocusLimit" => FocusLimit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_pass_through() {
        assert_eq!(DriveMode::from_raw(7), DriveMode::IntervalTimer);
        assert_eq!(DriveMode::from_raw(9), DriveMode::Unknown(9));
        assert_eq!(DriveMode::Unknown(9).to_raw(), 9);
        assert_eq!(CaptStatus::from_raw(0x6002), CaptStatus::BufferFull);
        assert_eq!(CaptStatus::Unknown(0x1234).to_string(), "Unknown(0x1234)");
        assert_eq!(Hdr::Off.to_string(), "Off");
    }

    #[test]
    fn capt_status_terminal_states() {
        assert!(!CaptStatus::ShootInProgress.is_terminal());
        assert!(!CaptStatus::ImageGenInProgress.is_terminal());
        assert!(CaptStatus::ImageGenCompleted.is_terminal());
        assert!(CaptStatus::Failed.is_terminal());
        assert!(CaptStatus::AfFailed.is_failure());
    }

    #[test]
    fn labels_by_field_name() {
        assert_eq!(label_for("ProgramShift", &Value::I8(-1)), Some("Minus"));
        assert_eq!(label_for("WhiteBalance", &Value::U8(6)), Some("Fluorescent"));
        assert_eq!(label_for("CaptStatus", &Value::U16(4)), Some("ImageGenInProgress"));
        assert_eq!(label_for("ShutterSpeed", &Value::U8(16)), None);
        assert_eq!(label_for("DriveMode", &Value::U8(9)), None);
        assert_eq!(Value::from(ExposureMode::Manual), Value::U8(4));
    }
}
