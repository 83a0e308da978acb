//! Format decoded records for display. APEX codes are shown with their physical value and
//! enumerated codes with their label; the raw value always follows in parentheses.

use crate::apex::{self, ApexStep};
use crate::record::ConditionalRecord;
use crate::schema::enums::label_for;
use crate::schema::tags::TagTable;
use crate::schema::{Decoded, RecordKind};
use crate::value::{FieldValues, Value};
use std::fmt::Write;

/// Shutter speed: `1/125`, `0.7"`, `30"`.
pub fn format_shutter_speed(seconds: f64) -> String {
    if seconds < 0.6 && seconds > 0.0 {
        format!("1/{}", (1.0 / seconds).round())
    } else {
        format!("{}\"", seconds)
    }
}

/// Physical rendering of an APEX-coded field, or `None` for other fields and unmapped codes.
pub fn apex_value(field: &str, value: &Value, step: ApexStep) -> Option<String> {
    let code = u8::try_from(value.as_u64()?).ok()?;
    match field {
        "ShutterSpeed" => apex::shutter_speed(step).decode(code).map(format_shutter_speed),
        "Aperture" => apex::aperture(step).decode(code).map(|f| format!("F{}", f)),
        "ISOSpeed" => apex::ISO_SPEED.decode(code).map(|iso| format!("ISO {}", iso)),
        "ExpCompensation" | "ABValue" => apex::exposure_compensation(step)
            .decode(code)
            .map(|ev| format!("{:+.1} EV", ev)),
        _ => None,
    }
}

fn format_raw(v: &Value) -> String {
    match v {
        Value::U8(x) => format!("{:#04x}", x),
        Value::U16(x) => format!("{:#06x}", x),
        Value::U32(x) => format!("{:#010x}", x),
        other => other.to_string(),
    }
}

/// One field as `Name = rendering`.
pub fn format_field(field: &str, value: &Value, step: ApexStep) -> String {
    if let Some(physical) = apex_value(field, value, step) {
        return format!("{} = {} ({})", field, physical, format_raw(value));
    }
    if let Some(label) = label_for(field, value) {
        return format!("{} = {} ({})", field, label, format_raw(value));
    }
    if field.ends_with("FocalLength") {
        return format!("{} = {} mm", field, value);
    }
    format!("{} = {}", field, value)
}

/// A conditional record, fields in wire order, then the reserved bytes it carried.
pub fn render_record(record: &ConditionalRecord, step: ApexStep) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} (presence {:#06x}, checksum {})",
        record.schema,
        record.presence.bits(),
        if record.checksum_ok { "ok" } else { "mismatch" }
    );
    let order: Vec<&'static str> = RecordKind::ALL
        .iter()
        .filter_map(|k| k.schema())
        .find(|s| s.name == record.schema)
        .map(|s| s.field_names())
        .unwrap_or_default();
    for name in &order {
        if let Some(v) = record.get(name) {
            let _ = writeln!(out, "  {}", format_field(name, v, step));
        }
    }
    let mut rest: Vec<_> = record
        .fields
        .keys()
        .filter(|k| !order.iter().any(|o| *o == k.as_str()))
        .collect();
    rest.sort();
    for name in rest {
        let _ = writeln!(out, "  {}", format_field(name, &record.fields[name], step));
    }
    for (slot, byte) in &record.reserved {
        let _ = writeln!(out, "  {} = {:#04x} (reserved)", slot, byte);
    }
    out
}

/// Named fields of a directory record, in table order; unknown tags last.
pub fn render_fields(table: &TagTable, fields: &FieldValues, step: ApexStep) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", table.name);
    for def in table.tags {
        if let Some(v) = fields.get(def.name) {
            let _ = writeln!(out, "  {}", format_field(def.name, v, step));
        }
    }
    let mut rest: Vec<_> = fields.keys().filter(|k| table.by_name(k).is_none()).collect();
    rest.sort();
    for name in rest {
        let _ = writeln!(out, "  {} = {}", name, fields[name]);
    }
    out
}

fn render_plain(name: &str, order: &[&str], fields: &FieldValues, step: ApexStep) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", name);
    for field in order {
        if let Some(v) = fields.get(*field) {
            let _ = writeln!(out, "  {}", format_field(field, v, step));
        }
    }
    out
}

/// Any decoded record.
pub fn render(decoded: &Decoded, step: ApexStep) -> String {
    match decoded {
        Decoded::Conditional(r) => render_record(r, step),
        Decoded::Directory { table, fields } => render_fields(table, fields, step),
        Decoded::CaptStatus(s) => render_plain(
            decoded.name(),
            &["ImageId", "ImageDBHead", "ImageDBTail", "CaptStatus", "DestToSave"],
            &s.to_fields(),
            step,
        ),
        Decoded::PictFileInfo2(p) => render_plain(
            decoded.name(),
            &["FileAddress", "FileSize", "PictureFormat", "SizeX", "SizeY", "PathName", "FileName"],
            &p.to_fields(),
            step,
        ),
    }
}
