//! Packed binary-coded-decimal helpers.
//!
//! Every time and alarm register of the DS3231 stores its value as two BCD
//! digits: the tens digit in bits 7-4 and the ones digit in bits 3-0. Callers
//! mask off any control bits (alarm mask bits, DY/DT, 12/24 hour select)
//! before decoding and OR them back in after encoding.

/// Decodes a packed BCD byte into its decimal value.
///
/// Nibbles above 9 are not rejected; they simply produce a value outside the
/// range the chip documents for the register.
#[must_use]
pub const fn decode(byte: u8) -> u8 {
    (byte >> 4) * 10 + (byte & 0x0F)
}

/// Encodes a decimal value in `0..=99` as a packed BCD byte.
///
/// Values above 99 are not truncated here, the tens digit overflows into the
/// upper bits instead. Range policy (such as keeping only the last two digits
/// of a year) belongs to the caller.
#[must_use]
pub const fn encode(value: u8) -> u8 {
    let tens = value / 10;
    let ones = value - tens * 10;
    (tens << 4) | ones
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_values() {
        assert_eq!(decode(0x00), 0);
        assert_eq!(decode(0x09), 9);
        assert_eq!(decode(0x10), 10);
        assert_eq!(decode(0x59), 59);
        assert_eq!(decode(0x99), 99);
    }

    #[test]
    fn test_encode_known_values() {
        assert_eq!(encode(0), 0x00);
        assert_eq!(encode(7), 0x07);
        assert_eq!(encode(10), 0x10);
        assert_eq!(encode(23), 0x23);
        assert_eq!(encode(99), 0x99);
    }

    #[test]
    fn test_round_trip_all_two_digit_values() {
        for value in 0..=99 {
            assert_eq!(decode(encode(value)), value, "value {}", value);
        }
    }

    #[test]
    fn test_encode_leaves_bit_seven_clear_below_80() {
        // tens digit 8 and 9 use bit 7 (encode(80) == 0x80)
        for value in 0..=79 {
            assert_eq!(encode(value) & 0x80, 0, "value {}", value);
        }
        assert_eq!(encode(80), 0x80);
    }

    #[test]
    fn test_seconds_and_minutes_survive_mask_bit() {
        for value in 0..=59 {
            let raw = (encode(value) & 0x7F) | 0x80;
            assert_eq!(decode(raw & 0x7F), value, "value {}", value);
            assert_eq!(raw & 0x80, 0x80);
        }
    }

    #[test]
    fn test_decode_does_not_validate_nibbles() {
        // 0xAF is not BCD; the arithmetic result is passed through as-is
        assert_eq!(decode(0xAF), 10 * 10 + 15);
        assert_eq!(decode(0xFF), 165);
    }

    #[test]
    fn test_encode_does_not_truncate() {
        // 119 has tens digit 11 which spills into bit 7 and beyond
        assert_eq!(encode(119), ((11u8 << 4) | 9));
        assert_ne!(decode(encode(119)), 19);
    }

    #[test]
    fn test_year_truncation_before_encode() {
        let year: u16 = 119;
        let truncated = u8::try_from(year % 100).unwrap();
        assert_eq!(decode(encode(truncated)), 19);
    }
}
