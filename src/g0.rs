//! The RDS "basic" (G0) character table, for turning raw RDS bytes into
//! `char`s.
//!
//! Only present under the `unicode` feature: without it, consumers treat PS
//! and RT content as opaque RDS bytes, which is all the wire format actually
//! guarantees. The G0 table is close to Latin-1 but not identical -- a
//! handful of code points in the 0x20-0x7E control/printable range and a few
//! in the upper half are reassigned by the RDS standard. This table covers
//! the differences that matter for display; everything else round-trips as
//! the identical Latin-1 code point.

/// Maps one RDS G0 byte to its `char`.
pub fn to_char(byte: u8) -> char {
    match byte {
        // RDS reassigns the currency sign slot to the generic currency
        // symbol and the circumflex slot to an overline, unlike Latin-1.
        0x24 => '\u{00A4}', // ¤ generic currency sign
        0x5E => '\u{203E}', // ‾ overline
        _ => byte as char,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_round_trips() {
        assert_eq!(to_char(b'A'), 'A');
        assert_eq!(to_char(b' '), ' ');
    }

    #[test]
    fn reassigned_code_points() {
        assert_eq!(to_char(0x24), '\u{00A4}');
        assert_eq!(to_char(0x5E), '\u{203E}');
    }
}
