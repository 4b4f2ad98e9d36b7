/// Last column a worksheet can address (`XFD`).
pub const MAX_COLUMN: u32 = 16_384;

/// Longest column name accepted (`XFD` is three letters).
const MAX_COLUMN_LETTERS: usize = 3;

/// Converts a 1-based column index to its letters (1 -> A, 27 -> AA).
/// Index 0 has no letters and yields an empty string.
#[must_use]
pub fn index_to_col_name(index: u32) -> String {
    let mut col_name = String::with_capacity(MAX_COLUMN_LETTERS);
    let mut n = index;

    while n > 0 {
        let remainder = (n - 1) % 26;
        col_name.insert(0, char::from(b'A' + remainder as u8));
        n = (n - 1) / 26;
    }

    col_name
}

/// Converts column letters (case-insensitive) to a 1-based index.
///
/// Returns `None` for empty input, non-letters, or anything past `XFD`.
#[must_use]
pub fn col_name_to_index(name: &str) -> Option<u32> {
    if name.is_empty() || name.len() > MAX_COLUMN_LETTERS {
        return None;
    }

    let mut result: u32 = 0;

    for c in name.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }

        let val = u32::from(c.to_ascii_uppercase() as u8 - b'A' + 1);
        result = result * 26 + val;
    }

    (result <= MAX_COLUMN).then_some(result)
}
