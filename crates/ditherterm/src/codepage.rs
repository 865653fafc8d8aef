// SPDX-License-Identifier: MIT
//
// Code page 437, the single-byte glyph set of the platform console.
//
// The console backend stores one byte per cell. Printable ASCII maps to
// itself; anything else is looked up in the full table (box drawing, shades,
// block elements, Latin-1 letters, the 0x01–0x1F pictographs) and falls back
// to '?' when the glyph has no code.

/// Glyph for each byte value.
#[rustfmt::skip]
pub const CP437: [char; 256] = [
    '\0', '☺', '☻', '♥', '♦', '♣', '♠', '•', '◘', '○', '◙', '♂', '♀', '♪', '♫', '☼',
    '►', '◄', '↕', '‼', '¶', '§', '▬', '↨', '↑', '↓', '→', '←', '∟', '↔', '▲', '▼',
    ' ', '!', '"', '#', '$', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?',
    '@', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O',
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '[', '\\', ']', '^', '_',
    '`', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '{', '|', '}', '~', '⌂',
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// Byte used for glyphs with no code page 437 encoding.
pub const REPLACEMENT: u8 = b'?';

/// Code page 437 byte for `ch`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn encode(ch: char) -> u8 {
    if (' '..='~').contains(&ch) {
        return ch as u8;
    }
    CP437
        .iter()
        .position(|&c| c == ch)
        .map_or(REPLACEMENT, |i| i as u8)
}

/// Glyph for a code page 437 byte.
#[inline]
#[must_use]
pub const fn decode(byte: u8) -> char {
    CP437[byte as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_ascii_is_identity() {
        for b in 0x20u8..=0x7E {
            assert_eq!(encode(char::from(b)), b);
            assert_eq!(decode(b), char::from(b));
        }
    }

    #[test]
    fn shade_and_block_glyphs() {
        assert_eq!(encode('░'), 0xB0);
        assert_eq!(encode('▒'), 0xB1);
        assert_eq!(encode('▓'), 0xB2);
        assert_eq!(encode('█'), 0xDB);
        assert_eq!(encode('─'), 0xC4);
    }

    #[test]
    fn pictographs_below_space() {
        assert_eq!(encode('☺'), 0x01);
        assert_eq!(encode('▼'), 0x1F);
        assert_eq!(decode(0x03), '♥');
    }

    #[test]
    fn unknown_glyphs_become_question_mark() {
        assert_eq!(encode('中'), b'?');
        assert_eq!(encode('🔥'), b'?');
        assert_eq!(encode('\n'), b'?');
    }

    #[test]
    fn every_byte_decodes_back() {
        for b in 1u8..=255 {
            assert_eq!(encode(decode(b)), b, "byte {b:#04x}");
        }
    }
}
