//! Decoder fuzz target: feed arbitrary bytes to every record decoder.
//! No decoder may panic; each returns Ok(record) or Err(CodecError).
//! The first byte selects the record kind. Build with: cargo fuzz run decode_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    use sigma_ptp_codec::{dump, ApexStep, RecordKind};

    let Some((selector, bytes)) = data.split_first() else {
        return;
    };
    let kind = RecordKind::ALL[*selector as usize % RecordKind::ALL.len()];
    if let Ok(decoded) = kind.decode(bytes) {
        let _ = dump::render(&decoded, ApexStep::Half);
    }
    let _ = sigma_ptp_codec::DirectoryArray::parse(bytes);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
