//! # sigma-ptp-codec — Binary record codecs for the SIGMA camera-control PTP extension
//!
//! The camera answers vendor operations with small self-describing records. This crate
//! decodes and encodes them; the USB/PTP session itself is left to a [`camera::Transport`].
//!
//! ## Record shapes
//!
//! - **Conditional records** (`CamDataGroup1`..`5`): a big-endian presence bitmap followed by
//!   the little-endian fields whose bit is set ([`record`], tables in [`schema::groups`])
//! - **Directory arrays** (`ApiConfig`, `CamDataGroupFocus`): tag/type/count/value entries with
//!   payloads inline or at an absolute offset ([`directory`], tables in [`schema::tags`])
//! - **Fixed records** (`CamCaptStatus`, `SnapCommand`, `PictFileInfo2`): [`schema::fixed`]
//!
//! Conditional and fixed records share a `[length][body][checksum]` envelope ([`frame`]).
//!
//! ## Numeric encodings
//!
//! - Integers of width 1, 2 and 4, IEEE floats and rational pairs ([`numeric`])
//! - `u16` fixed point with four fraction bits for focal lengths ([`numeric::FixedPoint`])
//! - 8-bit APEX codes for shutter speed, aperture, ISO and exposure compensation ([`apex`])
//!
//! ## Example
//!
//! ```
//! use sigma_ptp_codec::{record, schema::groups, Value};
//!
//! let bytes = [0x04, 0x00, 0x08, 0x00, 0x0d, 0x19];
//! let rec = record::decode(&groups::CAM_DATA_GROUP1, &bytes).unwrap();
//! assert_eq!(rec.get("CurrentLensFocalLength"), Some(&Value::Double(208.0)));
//! assert!(rec.get("ShutterSpeed").is_none());
//! ```

pub mod apex;
pub mod camera;
pub mod directory;
pub mod dump;
pub mod error;
pub mod frame;
pub mod numeric;
pub mod opcode;
pub mod record;
pub mod schema;
pub mod value;

pub use apex::{ApexConverter, ApexStep};
pub use camera::{SigmaCamera, Transport};
pub use directory::{decode_entries, encode_entries, DirectoryArray, DirectoryEntry, ElementType, EntryValue};
pub use error::CodecError;
pub use numeric::{Endianness, FixedPoint};
pub use opcode::OpCode;
pub use record::{ConditionalRecord, PresenceBitmap, RecordSchema};
pub use schema::{Decoded, RecordKind};
pub use value::{FieldValues, Value};
