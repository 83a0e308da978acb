//! Vendor operation codes of the camera-control extension.

/// Operation code sent with every transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum OpCode {
    GetCamDataGroup1 = 0x9012,
    GetCamDataGroup2 = 0x9013,
    GetCamDataGroup3 = 0x9014,
    GetCamCaptStatus = 0x9015,
    SetCamDataGroup1 = 0x9016,
    SetCamDataGroup2 = 0x9017,
    SetCamDataGroup3 = 0x9018,
    SnapCommand = 0x901b,
    ClearImageDbSingle = 0x901c,
    GetBigPartialPictFile = 0x9022,
    GetCamDataGroup4 = 0x9023,
    SetCamDataGroup4 = 0x9024,
    GetCamDataGroup5 = 0x9027,
    SetCamDataGroup5 = 0x9028,
    GetViewFrame = 0x902b,
    GetPictFileInfo2 = 0x902d,
    GetCamCanSetInfo5 = 0x9030,
    GetCamDataGroupFocus = 0x9031,
    GetCamDataGroupMovie = 0x9033,
    SetCamDataGroupMovie = 0x9034,
    ConfigApi = 0x9035,
    GetMovieFileInfo = 0x9036,
    GetPartialMovieFile = 0x9037,
}

impl OpCode {
    pub const ALL: [OpCode; 23] = [
        OpCode::GetCamDataGroup1,
        OpCode::GetCamDataGroup2,
        OpCode::GetCamDataGroup3,
        OpCode::GetCamCaptStatus,
        OpCode::SetCamDataGroup1,
        OpCode::SetCamDataGroup2,
        OpCode::SetCamDataGroup3,
        OpCode::SnapCommand,
        OpCode::ClearImageDbSingle,
        OpCode::GetBigPartialPictFile,
        OpCode::GetCamDataGroup4,
        OpCode::SetCamDataGroup4,
        OpCode::GetCamDataGroup5,
        OpCode::SetCamDataGroup5,
        OpCode::GetViewFrame,
        OpCode::GetPictFileInfo2,
        OpCode::GetCamCanSetInfo5,
        OpCode::GetCamDataGroupFocus,
        OpCode::GetCamDataGroupMovie,
        OpCode::SetCamDataGroupMovie,
        OpCode::ConfigApi,
        OpCode::GetMovieFileInfo,
        OpCode::GetPartialMovieFile,
    ];

    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({:#06x})", self, self.code())
    }
}
