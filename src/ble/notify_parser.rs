//! Motion-notification payload decode.
//!
//! The wearable's notification payload is opaque apart from one rule: the
//! first byte equal to ASCII `'0'` or `'1'` carries the motion flag. All
//! other bytes are framing or chatter and are skipped. A payload with no
//! such byte decodes to nothing and is dropped by the caller.

use crate::ble::MotionFlag;

/// Scan `payload` left to right for the first ASCII `'0'`/`'1'` byte.
pub fn decode_flag(payload: &[u8]) -> Option<MotionFlag> {
    payload.iter().find_map(|&b| match b {
        b'0' => Some(MotionFlag::Still),
        b'1' => Some(MotionFlag::Moving),
        _ => None,
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests (run on host, not embedded)
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_decodes_to_nothing() {
        assert_eq!(decode_flag(&[]), None);
    }

    #[test]
    fn payload_without_flag_bytes_is_skipped() {
        // '3' and '7' are digits but not flags.
        assert_eq!(decode_flag(b"battery:37"), None);
    }

    #[test]
    fn first_flag_byte_wins() {
        assert_eq!(decode_flag(b"moving=1;ok"), Some(MotionFlag::Moving));
        assert_eq!(decode_flag(b"0 then 1"), Some(MotionFlag::Still));
        assert_eq!(decode_flag(b"1 then 0"), Some(MotionFlag::Moving));
    }

    #[test]
    fn bare_flag_bytes() {
        assert_eq!(decode_flag(b"0"), Some(MotionFlag::Still));
        assert_eq!(decode_flag(b"1"), Some(MotionFlag::Moving));
    }

    #[test]
    fn non_ascii_bytes_are_ignored() {
        assert_eq!(decode_flag(&[0x00, 0x01, 0xFF]), None);
        // Raw 0x31 is ASCII '1' regardless of surrounding garbage.
        assert_eq!(decode_flag(&[0xFE, 0x31, 0x30]), Some(MotionFlag::Moving));
    }
}
