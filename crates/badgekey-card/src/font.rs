//! Built-in 5×7 bitmap font.
//!
//! Covers printable ASCII from space to underscore. Lowercase letters render
//! as their uppercase glyph; anything else renders as `?`.

/// Glyph width in font pixels.
pub const GLYPH_WIDTH: u32 = 5;

/// Glyph height in font pixels.
pub const GLYPH_HEIGHT: u32 = 7;

/// Horizontal advance per character in font pixels (glyph plus one column gap).
pub const ADVANCE: u32 = GLYPH_WIDTH + 1;

const FIRST: u8 = b' ';
const LAST: u8 = b'_';

// One byte per row, top to bottom; bit 4 is the leftmost column.
#[rustfmt::skip]
const GLYPHS: [[u8; 7]; (LAST - FIRST + 1) as usize] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x04, 0x04, 0x04, 0x04, 0x00, 0x00, 0x04], // '!'
    [0x0A, 0x0A, 0x0A, 0x00, 0x00, 0x00, 0x00], // '"'
    [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A], // '#'
    [0x04, 0x0F, 0x14, 0x0E, 0x05, 0x1E, 0x04], // '$'
    [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03], // '%'
    [0x0C, 0x12, 0x14, 0x08, 0x15, 0x12, 0x0D], // '&'
    [0x0C, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00], // '\''
    [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02], // '('
    [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08], // ')'
    [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00], // '*'
    [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00], // '+'
    [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08], // ','
    [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00], // '-'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C], // '.'
    [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00], // '/'
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // '0'
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // '1'
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // '2'
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // '3'
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // '4'
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // '5'
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // '6'
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // '7'
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // '8'
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // '9'
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00], // ':'
    [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x04, 0x08], // ';'
    [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02], // '<'
    [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00], // '='
    [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08], // '>'
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04], // '?'
    [0x0E, 0x11, 0x01, 0x0D, 0x15, 0x15, 0x0E], // '@'
    [0x0E, 0x11, 0x11, 0x11, 0x1F, 0x11, 0x11], // 'A'
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // 'B'
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // 'C'
    [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C], // 'D'
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // 'E'
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // 'F'
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // 'G'
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // 'H'
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // 'I'
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // 'J'
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // 'K'
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // 'L'
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // 'M'
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11], // 'N'
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // 'O'
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // 'P'
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // 'Q'
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // 'R'
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // 'S'
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // 'T'
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // 'U'
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // 'V'
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // 'W'
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // 'X'
    [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04], // 'Y'
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // 'Z'
    [0x0E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0E], // '['
    [0x00, 0x10, 0x08, 0x04, 0x02, 0x01, 0x00], // '\\'
    [0x0E, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0E], // ']'
    [0x04, 0x0A, 0x11, 0x00, 0x00, 0x00, 0x00], // '^'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F], // '_'
];

/// Map a character onto the glyph that will be drawn for it.
///
/// # Examples
///
/// ```
/// use badgekey_card::font::printable;
///
/// assert_eq!(printable('a'), 'A');
/// assert_eq!(printable('@'), '@');
/// assert_eq!(printable('é'), '?');
/// ```
pub fn printable(c: char) -> char {
    let upper = c.to_ascii_uppercase();
    if upper.is_ascii() && (FIRST..=LAST).contains(&(upper as u8)) {
        upper
    } else {
        '?'
    }
}

/// Row bitmaps for a character.
pub fn glyph(c: char) -> &'static [u8; 7] {
    let index = (printable(c) as u8 - FIRST) as usize;
    &GLYPHS[index]
}

/// Whether the font pixel at (`col`, `row`) is set for `c`.
pub fn is_set(c: char, col: u32, row: u32) -> bool {
    if col >= GLYPH_WIDTH || row >= GLYPH_HEIGHT {
        return false;
    }
    glyph(c)[row as usize] & (0x10 >> col) != 0
}

/// Width in pixels of `chars` characters drawn at `scale`, without trailing gap.
pub fn text_width(chars: usize, scale: u32) -> u32 {
    match chars {
        0 => 0,
        n => (n as u32 * ADVANCE - 1) * scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_space_is_blank() {
        assert!(glyph(' ').iter().all(|row| *row == 0));
    }

    #[rstest]
    #[case('a', 'A')]
    #[case('z', 'Z')]
    #[case('0', '0')]
    #[case('~', '?')]
    #[case('\n', '?')]
    #[case('ç', '?')]
    fn test_printable_mapping(#[case] input: char, #[case] expected: char) {
        assert_eq!(printable(input), expected);
    }

    #[test]
    fn test_glyph_shapes() {
        // Top bar of 'T'.
        assert!((0..5).all(|col| is_set('T', col, 0)));
        // Stem of 'T'.
        assert!(is_set('T', 2, 6));
        assert!(!is_set('T', 0, 6));
        // Out of range is never set.
        assert!(!is_set('T', 5, 0));
        assert!(!is_set('T', 0, 7));
    }

    #[test]
    fn test_glyphs_fit_five_columns() {
        assert!(GLYPHS.iter().flatten().all(|row| *row < 0x20));
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width(0, 3), 0);
        assert_eq!(text_width(1, 1), 5);
        assert_eq!(text_width(3, 2), 34);
    }
}
