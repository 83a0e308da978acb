//! Record envelope shared by every fixed and conditional device record.
//!
//! On the wire a record is `[header][body][trailer]`. The camera writes `body.len()` into the
//! header and the byte sum of everything before the trailer into the trailer. The camera accepts
//! any header or trailer value, so decoders only report a mismatch and never fail on it.

use crate::error::CodecError;
use tracing::debug;

/// Additive checksum: sum of `bytes` modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Wrap `body` in a length header and checksum trailer.
pub fn seal(body: &[u8]) -> Result<Vec<u8>, CodecError> {
    let header = u8::try_from(body.len()).map_err(|_| CodecError::RecordTooLarge(body.len()))?;
    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(header);
    out.extend_from_slice(body);
    out.push(checksum(&out));
    Ok(out)
}

/// Compare a received trailer with the checksum of the bytes preceding it.
///
/// `covered` is every byte of the record up to, not including, the trailer.
pub fn verify_trailer(record: &'static str, covered: &[u8], trailer: u8) -> bool {
    let expected = checksum(covered);
    if expected != trailer {
        debug!(record, expected, trailer, "record checksum mismatch (ignored)");
    }
    expected == trailer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_writes_length_and_sum() {
        let sealed = seal(&[0x01, 0x00, 0x10]).unwrap();
        assert_eq!(sealed, vec![0x03, 0x01, 0x00, 0x10, 0x14]);
        assert!(verify_trailer("test", &sealed[..4], sealed[4]));
        assert!(!verify_trailer("test", &sealed[..4], 0x00));
    }

    #[test]
    fn checksum_wraps() {
        assert_eq!(checksum(&[0xff, 0x02]), 0x01);
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn oversized_body_is_rejected() {
        assert!(matches!(seal(&[0u8; 256]), Err(CodecError::RecordTooLarge(256))));
        assert_eq!(seal(&[0u8; 255]).unwrap()[0], 255);
    }
}
