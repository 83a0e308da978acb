//! # Camera command layer over a scripted transport
//!
//! `ScriptedTransport` answers data-in operations from a table of recorded responses and
//! keeps every transaction it sees, so each test can check the opcode, the parameters and
//! the exact bytes a command put on the wire.
//!
//! ## Test index (expected behaviour)
//!
//! | Test | Behaviour |
//! |------|-----------|
//! | `config_api_identifies_camera` | `ConfigApi` with param 0 → model, serial, firmware, version |
//! | `get_groups_decode_responses` | `GetCamDataGroup1/5` responses decoded with the right schema |
//! | `set_group1_from_physical_values` | Nearest APEX codes, bitmap `0x1300`, sealed payload |
//! | `set_group4_sends_whole_loc_group` | One LOC member → all six on the wire |
//! | `rejected_settings_send_nothing` | Half an interval timer → error, no transaction |
//! | `capture_sequence` | Snap, poll status, file info, partial download |
//! | `partial_download_limit` | `max_length` above 128 MiB rejected before the transport |
//! | `view_frame_strips_prefix` | Ten-byte prefix removed; short frame → `Truncated` |
//! | `transport_errors_propagate` | Missing response surfaces as `CodecError::Transport` |

use sigma_ptp_codec::camera::{
    Group1Settings, Group4Settings, Group5Settings, GroupSettings, SigmaCamera, Transport,
    MAX_PARTIAL_LENGTH,
};
use sigma_ptp_codec::schema::enums::{CaptStatus, DestToSave, LocDiffraction, ToneEffect};
use sigma_ptp_codec::schema::fixed::SnapCommand;
use sigma_ptp_codec::{ApexStep, CodecError, OpCode, Value};
use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Install a `tracing` subscriber once so the RECV/SEND debug lines show with `--nocapture`.
fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .without_time()
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Clone, PartialEq)]
struct Transaction {
    opcode: OpCode,
    params: Vec<u32>,
    /// Data-out payload; `None` for data-in transactions.
    payload: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
struct ScriptedTransport {
    responses: Vec<(OpCode, Vec<u8>)>,
    log: Vec<Transaction>,
}

impl ScriptedTransport {
    fn with(mut self, opcode: OpCode, hex_response: &str) -> Self {
        let bytes = hex::decode(hex_response).expect("valid hex");
        self.responses.push((opcode, bytes));
        self
    }
}

impl Transport for ScriptedTransport {
    fn receive(&mut self, opcode: OpCode, params: &[u32]) -> Result<Vec<u8>, CodecError> {
        self.log.push(Transaction { opcode, params: params.to_vec(), payload: None });
        self.responses
            .iter()
            .find(|(op, _)| *op == opcode)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| CodecError::Transport(format!("no response scripted for {}", opcode)))
    }

    fn send(&mut self, opcode: OpCode, params: &[u32], payload: &[u8]) -> Result<(), CodecError> {
        self.log.push(Transaction {
            opcode,
            params: params.to_vec(),
            payload: Some(payload.to_vec()),
        });
        Ok(())
    }
}

const API_CONFIG: &str = "4a0000000400000001000200090000003c00000002000200090000004500000003000200\
                          040000005638320005000b000100000052b89e3f000000005349474d4120667000393134\
                          303230383100a9";
const GROUP1: &str = "13ff7f20200001f8000001096b0301d0020800001d";
const GROUP5: &str = "0c2b000a0001000001581b0301ba";
const CAPT_STATUS_GENERATING: &str = "060000010400030e";
const PICT_FILE_INFO2: &str = "38000000010000000c00000080050057423e0a00240000002d0000004a50470070\
                               17a00f3130305349474d41005344494d303030312e4a5047000300";

#[test]
fn config_api_identifies_camera() {
    init_tracing();
    let mut camera = SigmaCamera::new(ScriptedTransport::default().with(OpCode::ConfigApi, API_CONFIG));
    let config = camera.config_api().expect("config_api");
    assert_eq!(config.camera_model.as_deref(), Some("SIGMA fp"));
    assert_eq!(config.serial_number.as_deref(), Some("91402081"));
    assert_eq!(config.firmware_version.as_deref(), Some("V82"));
    let version = config.communication_version.expect("version");
    assert!((version - 1.24).abs() < 1e-6);

    let log = &camera.transport().log;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0], Transaction { opcode: OpCode::ConfigApi, params: vec![0], payload: None });
}

#[test]
fn get_groups_decode_responses() {
    init_tracing();
    let transport = ScriptedTransport::default()
        .with(OpCode::GetCamDataGroup1, GROUP1)
        .with(OpCode::GetCamDataGroup5, GROUP5);
    let mut camera = SigmaCamera::new(transport);

    let g1 = camera.get_cam_data_group1().expect("group1");
    assert_eq!(g1.schema, "CamDataGroup1");
    assert_eq!(g1.get_f64("CurrentLensFocalLength"), Some(45.0));
    assert_eq!(g1.get("MediaFreeSpace"), Some(&Value::U16(0x036b)));

    let g5 = camera.get_cam_data_group5().expect("group5");
    assert_eq!(g5.get("ColorTemp"), Some(&Value::U16(7000)));
    assert_eq!(g5.get("ToneEffect"), Some(&Value::from(ToneEffect::BAndW)));

    let ops: Vec<OpCode> = camera.into_inner().log.into_iter().map(|t| t.opcode).collect();
    assert_eq!(ops, vec![OpCode::GetCamDataGroup1, OpCode::GetCamDataGroup5]);
}

#[test]
fn set_group1_from_physical_values() {
    init_tracing();
    let settings = Group1Settings::default()
        .with_shutter_speed(1.0 / 125.0, ApexStep::Third)
        .with_aperture(5.6, ApexStep::Third)
        .with_iso_speed(100.0);
    assert_eq!(settings.shutter_speed, Some(112));
    assert_eq!(settings.aperture, Some(48));
    assert_eq!(settings.iso_speed, Some(32));

    let mut camera = SigmaCamera::new(ScriptedTransport::default());
    camera.set_cam_data_group1(&settings).expect("set group1");
    let log = &camera.transport().log;
    assert_eq!(log[0].opcode, OpCode::SetCamDataGroup1);
    assert!(log[0].params.is_empty());
    assert_eq!(
        log[0].payload.as_deref(),
        Some(&[0x05, 0x13, 0x00, 0x70, 0x30, 0x20, 0xd8][..])
    );
}

#[test]
fn set_group4_sends_whole_loc_group() {
    let settings = Group4Settings {
        loc_diffraction: Some(LocDiffraction::Off),
        ..Default::default()
    };
    assert_eq!(settings.to_fields().expect("fields").len(), 1);

    let mut camera = SigmaCamera::new(ScriptedTransport::default());
    camera.set_cam_data_group4(&settings).expect("set group4");
    let sent = camera.transport().log[0].clone();
    assert_eq!(sent.opcode, OpCode::SetCamDataGroup4);
    assert_eq!(
        sent.payload,
        Some(vec![0x08, 0x00, 0x08, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x12])
    );
}

#[test]
fn rejected_settings_send_nothing() {
    let mut camera = SigmaCamera::new(ScriptedTransport::default());
    let err = camera
        .set_cam_data_group5(&Group5Settings {
            interval_timer_second: Some(30),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::MissingCorrelatedField { ref missing, .. } if missing == "IntervalTimerFrame"
    ));
    assert!(camera.transport().log.is_empty());

    camera
        .set_cam_data_group5(&Group5Settings {
            interval_timer_second: Some(30),
            interval_timer_frame: Some(5),
            ..Default::default()
        })
        .expect("complete timer");
    let payload = camera.transport().log[0].payload.clone().expect("data-out");
    // bitmap 0x0100, then second, frame and the two zeroed countdown members
    assert_eq!(payload, vec![0x08, 0x01, 0x00, 0x1e, 0x00, 0x05, 0x00, 0x00, 0x00, 0x2c]);
}

#[test]
fn capture_sequence() {
    init_tracing();
    let transport = ScriptedTransport::default()
        .with(OpCode::GetCamCaptStatus, CAPT_STATUS_GENERATING)
        .with(OpCode::GetPictFileInfo2, PICT_FILE_INFO2)
        .with(OpCode::GetBigPartialPictFile, "04000000ffd8ffe0");
    let mut camera = SigmaCamera::new(transport);

    camera.snap_command(SnapCommand::default()).expect("snap");
    let status = camera.get_cam_capt_status().expect("status");
    assert_eq!(status.capt_status, CaptStatus::ImageGenInProgress);
    assert!(!status.capt_status.is_terminal());
    assert_eq!(status.dest_to_save, DestToSave::Both);
    assert_eq!(status.image_db_tail, 1);
    assert!(status.checksum_ok);

    let info = camera.get_pict_file_info2().expect("file info");
    assert_eq!(info.file_address, 0x5700_0580);
    assert_eq!(info.file_size, 0x000a_3e42);
    assert_eq!(info.picture_format, "JPG");
    assert_eq!((info.size_x, info.size_y), (6000, 4000));
    assert_eq!(info.path_name, "100SIGMA");
    assert_eq!(info.file_name, "SDIM0001.JPG");

    let chunk = camera
        .get_big_partial_pict_file(info.file_address, 0, 0x0010_0000)
        .expect("chunk");
    assert_eq!(chunk.acquired_size, 4);
    assert_eq!(chunk.data, vec![0xff, 0xd8, 0xff, 0xe0]);

    let log = camera.into_inner().log;
    assert_eq!(
        log[0],
        Transaction {
            opcode: OpCode::SnapCommand,
            params: vec![],
            payload: Some(vec![0x02, 0x01, 0x01, 0x04]),
        }
    );
    assert_eq!(log[1].params, vec![0]);
    assert_eq!(log[3].params, vec![0x5700_0580, 0, 0x0010_0000]);
}

#[test]
fn partial_download_limit() {
    let mut camera = SigmaCamera::new(ScriptedTransport::default());
    let err = camera
        .get_big_partial_pict_file(0, 0, MAX_PARTIAL_LENGTH + 1)
        .unwrap_err();
    assert!(matches!(err, CodecError::OutOfRange { .. }));
    assert!(camera.transport().log.is_empty());
}

#[test]
fn view_frame_strips_prefix() {
    let transport = ScriptedTransport::default().with(OpCode::GetViewFrame, "00010203040506070809ffd8ffd9");
    let mut camera = SigmaCamera::new(transport);
    assert_eq!(camera.get_view_frame().expect("frame"), vec![0xff, 0xd8, 0xff, 0xd9]);

    camera.transport_mut().responses = vec![(OpCode::GetViewFrame, vec![0u8; 4])];
    assert!(matches!(
        camera.get_view_frame(),
        Err(CodecError::Truncated { needed: 10, available: 4, .. })
    ));
}

#[test]
fn transport_errors_propagate() {
    let mut transport = ScriptedTransport::default();
    {
        let mut camera = SigmaCamera::new(&mut transport);
        let err = camera.get_cam_data_group_focus().unwrap_err();
        assert!(matches!(err, CodecError::Transport(ref m) if m.contains("GetCamDataGroupFocus(0x9031)")));
        assert!(!err.is_malformed_input());
    }
    assert_eq!(transport.log.len(), 1);
}
