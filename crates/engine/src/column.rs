//! Spreadsheet column letters.
//!
//! Columns are addressed two ways: a 1-based index (what the comparator and
//! the column pickers count in) and letter notation (what users see and
//! type). The mapping is bijective base-26 with no zero digit:
//! A=1 … Z=26, AA=27 … AZ=52, BA=53 … ZZ=702, AAA=703.

/// Convert a 1-based column index to letters (1 → "A", 27 → "AA").
///
/// Index 0 has no letter form and yields an empty string.
pub fn index_to_letters(index: u32) -> String {
    let mut result = String::new();
    let mut n = index;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        result.insert(0, (b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    result
}

/// Parse column letters back to a 1-based index ("A" → 1, "AA" → 27).
///
/// Case-insensitive. A single leading `$` (absolute reference marker) is
/// accepted. Returns `None` for empty input, any non-letter, or overflow.
pub fn letters_to_index(letters: &str) -> Option<u32> {
    let letters = letters.strip_prefix('$').unwrap_or(letters);
    if letters.is_empty() {
        return None;
    }

    let mut index: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index)
}

/// Convert a 0-based column offset (the grid's internal addressing) to letters.
#[inline]
pub fn col_to_letters(col: u32) -> String {
    index_to_letters(col + 1)
}

/// Letters for columns 1..=count, in order. Feeds the column pickers.
pub fn column_options(count: u32) -> Vec<String> {
    (1..=count).map(index_to_letters).collect()
}

/// A1-style address for a 0-based (row, col).
pub fn cell_address(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letters(col), row + 1)
}
