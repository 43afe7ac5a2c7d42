/// Formats `buffer` as 16-byte lines, addressed from `base`.
pub fn hexdump(buffer: &[u8], base: u32) -> String {
    let mut str = String::new();

    for (i, chunk) in buffer.chunks(16).enumerate() {
        let mut line = format!("{:06x}: ", base.wrapping_add(16 * i as u32));
        let mut chars = String::new();

        for &byte in chunk {
            line.push_str(&format!("{:02x} ", byte));
            chars.push(printable(byte));
        }

        let dump_line = format!("{:<56} {}\n", line, chars);
        str.push_str(&dump_line);
    }

    str
}

/// The byte as a character, or '.' if it has no visible glyph.
pub fn printable(byte: u8) -> char {
    let c = byte as char;
    if c.is_ascii_graphic() || c == ' ' {
        c
    } else {
        '.'
    }
}

#[inline]
pub fn hi_lo(hi: u8, lo: u8) -> u16 {
    (hi as u16) << 8 | lo as u16
}

/// Byte of a bus word a byte access at `addr` sees. Even addresses use the
/// upper data lines.
#[inline]
pub fn byte_of(word: u16, addr: u32) -> u8 {
    if addr & 1 == 0 {
        (word >> 8) as u8
    } else {
        word as u8
    }
}

/// 32-bit FNV-1a hash.
pub fn fnv_1a_32(data: &[u8]) -> u32 {
    const OFFSET_BASIS: u32 = 0x811C9DC5;
    const PRIME: u32 = 0x01000193;

    data.iter().fold(OFFSET_BASIS, |hash, &byte| {
        (hash ^ byte as u32).wrapping_mul(PRIME)
    })
}
