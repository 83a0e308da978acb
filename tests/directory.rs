//! # Directory arrays (TLV) — `ApiConfig` and `CamDataGroupFocus`
//!
//! ## Wire format
//!
//! - Header: `DataLength u32`, `DirectoryCount u32` (little-endian)
//! - Entry: `Tag u16`, `Type u16`, `Count u32`, `Value [u8; 4]`
//! - Payloads of at most four bytes are inline in `Value`; larger ones sit at the absolute
//!   offset stored in `Value`.
//! - Entries are parsed greedily to the end of the buffer; only `min(parsed, DirectoryCount)`
//!   are decoded.
//!
//! ## Test index (expected behaviour)
//!
//! | Test | Behaviour |
//! |------|-----------|
//! | `api_config_recorded_response` | Model, serial, firmware, protocol version; extra parsed entry dropped |
//! | `focus_response_with_bad_offset_fails` | Out-of-line payload past the buffer → `OffsetOutOfBounds` |
//! | `directory_count_larger_than_index` | Count 11, ten entries present → ten decoded |
//! | `unknown_element_type_fails` | Declared entry with type 0 → `UnknownElementType` |
//! | `short_header_is_truncated` | Fewer than eight bytes → `Truncated` |
//! | `encode_rejects_unrepresentable_strings` | Non-ASCII text or an interior NUL → `InvalidString` |
//! | `encode_then_decode_entries` | Mixed inline/out-of-line entries survive the wire |
//! | `tag_table_fields_round_trip` | Named focus fields → entries → bytes → named fields |

use sigma_ptp_codec::directory::{decode_entries, encode_entries, DirectoryArray, ENTRY_LEN, HEADER_LEN};
use sigma_ptp_codec::schema::tags::{API_CONFIG, CAM_DATA_GROUP_FOCUS};
use sigma_ptp_codec::{CodecError, DirectoryEntry, ElementType, EntryValue, FieldValues, Value};

const API_CONFIG_RESPONSE: &[u8] = &[
    0x4a, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00, 0x09, 0x00, 0x00,
    0x00, 0x3c, 0x00, 0x00, 0x00, 0x02, 0x00, 0x02, 0x00, 0x09, 0x00, 0x00, 0x00, 0x45, 0x00,
    0x00, 0x00, 0x03, 0x00, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x56, 0x38, 0x32, 0x00, 0x05,
    0x00, 0x0b, 0x00, 0x01, 0x00, 0x00, 0x00, 0x52, 0xb8, 0x9e, 0x3f, 0x00, 0x00, 0x00, 0x00,
    0x53, 0x49, 0x47, 0x4d, 0x41, 0x20, 0x66, 0x70, 0x00, 0x39, 0x31, 0x34, 0x30, 0x32, 0x30,
    0x38, 0x31, 0x00, 0xa9,
];

const FOCUS_RESPONSE: &[u8] = &[
    0x94, 0x00, 0x00, 0x00, 0x0b, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00,
    0x00, 0x03, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x03, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04,
    0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0a, 0x00, 0x01, 0x00,
    0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x0b, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x0d, 0x00, 0x07, 0x00, 0x04, 0x00, 0x00, 0x00, 0x54, 0x01, 0x00, 0x02, 0x0e,
    0x00, 0x07, 0x00, 0x08, 0x00, 0x00, 0x00, 0x90, 0x00, 0x00, 0x00, 0x33, 0x00, 0x01, 0x00,
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Index of the `FocusFrameSize` (tag 0x0e) entry in [`FOCUS_RESPONSE`].
const FRAME_SIZE_ENTRY: usize = 8;

#[test]
fn api_config_recorded_response() {
    let dir = DirectoryArray::parse(API_CONFIG_RESPONSE).expect("parse");
    assert_eq!(dir.data_length, 0x4a);
    assert_eq!(dir.directory_count, 4);
    assert_eq!(dir.entries.len(), 5);
    assert_eq!(dir.declared().len(), 4);
    assert_eq!(dir.declared()[0].offset(), 0x3c);
    assert_eq!(dir.declared()[1].offset(), 0x45);
    assert_eq!(dir.declared()[3].element_type(), Some(ElementType::Float32));

    let entries = dir.decode().expect("decode");
    assert_eq!(entries[0], DirectoryEntry::new(0x01, EntryValue::Str("SIGMA fp".into())));
    assert_eq!(entries[1], DirectoryEntry::new(0x02, EntryValue::Str("91402081".into())));
    assert_eq!(entries[2], DirectoryEntry::new(0x03, EntryValue::Str("V82".into())));

    let fields = API_CONFIG.to_fields(&entries);
    assert_eq!(fields["CameraModel"], Value::Str("SIGMA fp".into()));
    assert_eq!(fields["SerialNumber"], Value::Str("91402081".into()));
    assert_eq!(fields["FirmwareVersion"], Value::Str("V82".into()));
    let version = fields["CommunicationVersion"].as_f64().expect("number");
    assert!((version - 1.24).abs() < 1e-6, "{}", version);
}

#[test]
fn focus_response_with_bad_offset_fails() {
    let dir = DirectoryArray::parse(FOCUS_RESPONSE).expect("parse");
    assert_eq!(dir.directory_count, 11);
    assert_eq!(dir.entries.len(), 10);
    assert_eq!(dir.declared().len(), 10);

    let raw = &dir.declared()[FRAME_SIZE_ENTRY];
    assert_eq!(raw.tag, 0x0e);
    assert_eq!(raw.payload_len().expect("known type"), 8);

    let err = decode_entries(FOCUS_RESPONSE).unwrap_err();
    match err {
        CodecError::OffsetOutOfBounds { tag, offset, length, available } => {
            assert_eq!(tag, 0x0e);
            assert_eq!(offset, 0x90);
            assert_eq!(length, 8);
            assert_eq!(available, FOCUS_RESPONSE.len());
        }
        other => panic!("expected OffsetOutOfBounds, got {:?}", other),
    }
    assert!(err_is_malformed(FOCUS_RESPONSE));
}

fn err_is_malformed(bytes: &[u8]) -> bool {
    decode_entries(bytes).map_or_else(|e| e.is_malformed_input(), |_| false)
}

#[test]
fn directory_count_larger_than_index() {
    // Shrink FocusFrameSize to four inline bytes so every entry resolves.
    let mut bytes = FOCUS_RESPONSE.to_vec();
    let at = HEADER_LEN + FRAME_SIZE_ENTRY * ENTRY_LEN;
    bytes[at + 4..at + 8].copy_from_slice(&4u32.to_le_bytes());
    bytes[at + 8..at + 12].copy_from_slice(&[0x10, 0x20, 0x30, 0x40]);

    let entries = decode_entries(&bytes).expect("decode");
    assert_eq!(entries.len(), 10);

    let fields = CAM_DATA_GROUP_FOCUS.to_fields(&entries);
    assert_eq!(fields.len(), 10);
    assert_eq!(fields["FocusMode"], Value::U8(3));
    assert_eq!(fields["AFLock"], Value::U8(0));
    assert_eq!(fields["FocusArea"], Value::U8(1));
    assert_eq!(
        fields["FocusFramePosition"],
        Value::List(vec![Value::U8(0x54), Value::U8(0x01), Value::U8(0x00), Value::U8(0x02)])
    );
    assert_eq!(
        fields["FocusFrameSize"],
        Value::List(vec![Value::U8(0x10), Value::U8(0x20), Value::U8(0x30), Value::U8(0x40)])
    );
    assert_eq!(fields["PreConstAF"], Value::U8(0));
    assert!(!fields.contains_key("FocusLimit"));
}

#[test]
fn unknown_element_type_fails() {
    let mut bytes = encode_entries(&[DirectoryEntry::new(0x01, EntryValue::UInt8(vec![3]))])
        .expect("encode");
    bytes[HEADER_LEN + 2] = 0x00;
    assert!(matches!(
        decode_entries(&bytes),
        Err(CodecError::UnknownElementType { tag: 0x01, code: 0 })
    ));
}

#[test]
fn short_header_is_truncated() {
    assert!(matches!(DirectoryArray::parse(&[0x08, 0, 0, 0]), Err(CodecError::Truncated { .. })));
    let empty = DirectoryArray::parse(&[0x08, 0, 0, 0, 0, 0, 0, 0]).expect("header only");
    assert!(empty.declared().is_empty());
}

#[test]
fn encode_rejects_unrepresentable_strings() {
    for text in ["a\0b", "\u{e9}", "fp\0"] {
        let entries = [
            DirectoryEntry::new(0x03, EntryValue::Str("V82".into())),
            DirectoryEntry::new(0x01, EntryValue::Str(text.into())),
        ];
        assert!(
            matches!(encode_entries(&entries), Err(CodecError::InvalidString { tag: 0x01 })),
            "{:?}",
            text
        );
    }
    let empty = encode_entries(&[DirectoryEntry::new(0x01, EntryValue::Str(String::new()))]).expect("encode");
    assert_eq!(
        decode_entries(&empty).expect("decode"),
        vec![DirectoryEntry::new(0x01, EntryValue::Str(String::new()))]
    );
}

#[test]
fn encode_then_decode_entries() {
    let entries = vec![
        DirectoryEntry::new(0x01, EntryValue::Str("SIGMA fp".into())),
        DirectoryEntry::new(0x05, EntryValue::Float32(vec![1.25])),
        DirectoryEntry::new(0x10, EntryValue::Int16(vec![-2, 7, 300])),
        DirectoryEntry::new(0x11, EntryValue::URational(vec![(1, 125)])),
        DirectoryEntry::new(0x12, EntryValue::Rational(vec![(-1, 3), (2, 3)])),
        DirectoryEntry::new(0x13, EntryValue::Float64(vec![0.5])),
        DirectoryEntry::new(0x14, EntryValue::Int8(vec![-1])),
        DirectoryEntry::new(0x15, EntryValue::UInt32(vec![0xdead_beef])),
    ];
    let bytes = encode_entries(&entries).expect("encode");
    assert_eq!(bytes.len() % 4, 0);
    let dir = DirectoryArray::parse(&bytes).expect("parse");
    assert_eq!(dir.data_length as usize, bytes.len());
    assert_eq!(dir.directory_count as usize, entries.len());
    assert_eq!(dir.decode().expect("decode"), entries);
}

#[test]
fn tag_table_fields_round_trip() {
    let mut values = FieldValues::new();
    values.insert("FocusMode".into(), Value::U8(2));
    values.insert("FocusArea".into(), Value::U8(3));
    values.insert(
        "FocusFramePosition".into(),
        Value::List(vec![Value::U8(0x54), Value::U8(0x01), Value::U8(0x00), Value::U8(0x02)]),
    );
    values.insert("FocusFrameSize".into(), Value::List(vec![Value::U8(0x20); 8]));

    let entries = CAM_DATA_GROUP_FOCUS.to_entries(&values).expect("entries");
    let bytes = encode_entries(&entries).expect("encode");
    let decoded = decode_entries(&bytes).expect("decode");
    assert_eq!(CAM_DATA_GROUP_FOCUS.to_fields(&decoded), values);

    let mut api = FieldValues::new();
    api.insert("CameraModel".into(), Value::from("SIGMA fp"));
    api.insert("CommunicationVersion".into(), Value::Float(1.24));
    let bytes = encode_entries(&API_CONFIG.to_entries(&api).expect("entries")).expect("encode");
    assert_eq!(API_CONFIG.to_fields(&decode_entries(&bytes).expect("decode")), api);
}
