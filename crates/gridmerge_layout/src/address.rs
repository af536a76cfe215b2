//! Column letter addressing.
//!
//! Columns use the bijective base-26 letter system (`A`..`Z`, `AA`..`ZZ`,
//! `AAA`..). The encoder works on zero-based indices; cell and range
//! references take the 1-based coordinates used by placed cells.

const N_LETTERS: u64 = 26;

/// Encode a zero-based column index as letters (`0 -> "A"`, `26 -> "AA"`).
pub fn encode_column(index: u32) -> String {
    let mut n_rem = u64::from(index) + 1;
    let mut l_letters = Vec::with_capacity(4);
    while n_rem > 0 {
        n_rem -= 1;
        l_letters.push(char::from(b'A' + (n_rem % N_LETTERS) as u8));
        n_rem /= N_LETTERS;
    }
    l_letters.iter().rev().collect()
}

/// Decode column letters back to a zero-based index.
///
/// Case-insensitive. Returns `None` for empty input, non-letters, or values
/// past `u32::MAX`.
pub fn decode_column(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }

    let mut n_value: u64 = 0;
    for chr in letters.chars() {
        if !chr.is_ascii_alphabetic() {
            return None;
        }
        let n_digit = u64::from(chr.to_ascii_uppercase() as u8 - b'A') + 1;
        n_value = n_value.checked_mul(N_LETTERS)?.checked_add(n_digit)?;
        if n_value > u64::from(u32::MAX) + 1 {
            return None;
        }
    }
    u32::try_from(n_value - 1).ok()
}

/// A1 reference for 1-based `(row, col)`.
pub fn format_cell_ref(row: u32, col: u32) -> String {
    debug_assert!(row >= 1 && col >= 1, "cell references are 1-based");
    format!("{}{row}", encode_column(col.saturating_sub(1)))
}

/// A1 range reference for 1-based inclusive bounds.
pub fn format_range_ref(row_first: u32, col_first: u32, row_last: u32, col_last: u32) -> String {
    format!(
        "{}:{}",
        format_cell_ref(row_first, col_first),
        format_cell_ref(row_last, col_last)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_matches_spreadsheet_sequence() {
        assert_eq!(encode_column(0), "A");
        assert_eq!(encode_column(25), "Z");
        assert_eq!(encode_column(26), "AA");
        assert_eq!(encode_column(51), "AZ");
        assert_eq!(encode_column(52), "BA");
        assert_eq!(encode_column(701), "ZZ");
        assert_eq!(encode_column(702), "AAA");
        assert_eq!(encode_column(16_383), "XFD");
        assert_eq!(encode_column(18_277), "ZZZ");
        assert_eq!(encode_column(18_278), "AAAA");
    }

    #[test]
    fn decode_inverts_encode() {
        for n_idx in 0..20_000 {
            assert_eq!(decode_column(&encode_column(n_idx)), Some(n_idx));
        }
        assert_eq!(decode_column(&encode_column(u32::MAX)), Some(u32::MAX));
    }

    #[test]
    fn decode_is_case_insensitive_and_rejects_garbage() {
        assert_eq!(decode_column("xfd"), Some(16_383));
        assert_eq!(decode_column(""), None);
        assert_eq!(decode_column("A1"), None);
        assert_eq!(decode_column("ZZZZZZZZ"), None);
    }

    #[test]
    fn references_are_one_based() {
        assert_eq!(format_cell_ref(1, 1), "A1");
        assert_eq!(format_cell_ref(7, 28), "AB7");
        assert_eq!(format_range_ref(1, 1, 1, 3), "A1:C1");
    }
}
