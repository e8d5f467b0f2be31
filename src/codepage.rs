//! Windows-1251 text decoding.
//!
//! SA-MP servers send names and rule values in the host's 8-bit codepage,
//! which for the bulk of deployed servers is Windows-1251. Bytes below 0x80
//! are plain ASCII; the upper half maps through a fixed table.

/// 0x80..=0xBF. 0x98 is unassigned in the codepage and decodes to U+FFFD.
static UPPER_TABLE: [char; 64] = [
    '\u{0402}', '\u{0403}', '\u{201A}', '\u{0453}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{20AC}', '\u{2030}', '\u{0409}', '\u{2039}', '\u{040A}', '\u{040C}', '\u{040B}', '\u{040F}',
    '\u{0452}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{FFFD}', '\u{2122}', '\u{0459}', '\u{203A}', '\u{045A}', '\u{045C}', '\u{045B}', '\u{045F}',
    '\u{00A0}', '\u{040E}', '\u{045E}', '\u{0408}', '\u{00A4}', '\u{0490}', '\u{00A6}', '\u{00A7}',
    '\u{0401}', '\u{00A9}', '\u{0404}', '\u{00AB}', '\u{00AC}', '\u{00AD}', '\u{00AE}', '\u{0407}',
    '\u{00B0}', '\u{00B1}', '\u{0406}', '\u{0456}', '\u{0491}', '\u{00B5}', '\u{00B6}', '\u{00B7}',
    '\u{0451}', '\u{2116}', '\u{0454}', '\u{00BB}', '\u{0458}', '\u{0405}', '\u{0455}', '\u{0457}',
];

/// 0xC0..=0xFF is the contiguous block А..я.
const CYRILLIC_BASE: u32 = 0x0410;

/// Map a single codepage byte to its character.
pub fn decode_byte(byte: u8) -> char {
    match byte {
        0x00..=0x7F => char::from(byte),
        0x80..=0xBF => UPPER_TABLE[usize::from(byte - 0x80)],
        _ => char::from_u32(CYRILLIC_BASE + u32::from(byte - 0xC0)).unwrap_or('\u{FFFD}'),
    }
}

pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().copied().map(decode_byte).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_through() {
        assert_eq!(decode(b"Grand Larceny"), "Grand Larceny");
    }

    #[test]
    fn cyrillic_block() {
        // "Привет" in Windows-1251
        assert_eq!(decode(&[0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2]), "Привет");
        assert_eq!(decode_byte(0xC0), 'А');
        assert_eq!(decode_byte(0xFF), 'я');
    }

    #[test]
    fn upper_table_spot_checks() {
        assert_eq!(decode_byte(0x88), '€');
        assert_eq!(decode_byte(0xA8), 'Ё');
        assert_eq!(decode_byte(0xB8), 'ё');
        assert_eq!(decode_byte(0xB9), '№');
        assert_eq!(decode_byte(0x98), '\u{FFFD}');
    }
}
