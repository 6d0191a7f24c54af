use std::io;
use std::io::Read;
use thiserror::Error;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// how much RAM we have
pub const RAM_SIZE: usize = 4096;

/// where programs are loaded
pub const PROGRAM_ADDR: u16 = 0x0200;

/// where the font glyphs live; digit `d` starts at `FONT_ADDR + 5 * d`
pub const FONT_ADDR: u16 = 0x0000;

/// Errors raised while getting a ROM into memory. Either one is fatal at
/// startup; the machine never starts with partially loaded memory.
#[derive(Debug, Error)]
pub enum RomError {
    #[error("failed to read ROM: {0}")]
    Io(#[from] io::Error),
    #[error("ROM is {size} bytes but only {max} fit above {PROGRAM_ADDR:#05x}")]
    TooLarge { size: usize, max: usize },
}

/// The CHIP-8 memory map:
///   0x000-0x04f  font table (16 glyphs x 5 bytes)
///   0x050-0x1ff  reserved (the interpreter lived here on real hardware)
///   0x200-0xfff  program
///
/// Nothing below 0x200 is ever executed; it is only read through `I` for
/// font sprites and BCD scratch space.
pub struct Ram {
    bytes: [u8; RAM_SIZE],
}

impl Ram {
    pub fn new() -> Self {
        let mut bytes = [0u8; RAM_SIZE];
        let font = FONT_ADDR as usize;
        bytes[font..font + FONT.len()].copy_from_slice(&FONT);
        Ram { bytes }
    }

    /// Copy a program verbatim to 0x200. ROMs that would run past the end of
    /// RAM are rejected outright rather than truncated.
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, RomError> {
        let mut buf = Vec::new();
        let size = reader.read_to_end(&mut buf)?;
        let base = PROGRAM_ADDR as usize;
        let max = RAM_SIZE - base;
        if size > max {
            return Err(RomError::TooLarge { size, max });
        }
        self.bytes[base..base + size].copy_from_slice(&buf);
        Ok(size)
    }

    // only the low 12 bits of an address are meaningful
    fn index(addr: u16) -> usize {
        (addr & 0x0fff) as usize
    }

    pub fn read(&self, addr: u16) -> u8 {
        self.bytes[Self::index(addr)]
    }

    pub fn write(&mut self, addr: u16, byte: u8) {
        self.bytes[Self::index(addr)] = byte;
    }

    /// Big-endian compose the two bytes at `addr` into an opcode word.
    pub fn word(&self, addr: u16) -> u16 {
        (self.read(addr) as u16) << 8 | self.read(addr + 1) as u16
    }
}

pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed_above_font() {
        let m = Ram::new();
        // NB. the first 80 bytes hold the baked-in font
        assert_eq!(m.bytes[FONT.len()..], [0; RAM_SIZE - 80]);
    }

    #[test]
    fn test_font_at_base() {
        let m = Ram::new();
        assert_eq!(m.read(FONT_ADDR), 0xF0);
        // glyph for digit 1 starts five bytes in
        assert_eq!(m.read(FONT_ADDR + 5), 0x20);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), RomError> {
        let mut m = Ram::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        let size = m.load_program(&mut prog)?;
        assert_eq!(size, 2);
        assert_eq!(m.read(0x200), 0x00);
        assert_eq!(m.read(0x201), 0xe0);
        Ok(())
    }

    #[test]
    fn test_program_load_rejects_oversized_rom() {
        let mut m = Ram::new();
        let rom = vec![0u8; RAM_SIZE - PROGRAM_ADDR as usize + 1];
        match m.load_program(&mut rom.as_slice()) {
            Err(RomError::TooLarge { size, max }) => {
                assert_eq!(size, 3585);
                assert_eq!(max, 3584);
            }
            other => panic!("expected TooLarge, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_read_word_is_big_endian() {
        let mut m = Ram::new();
        m.write(0x204, 0x12);
        m.write(0x205, 0x34);
        assert_eq!(m.word(0x204), 0x1234);
    }

    #[test]
    fn test_addresses_wrap_at_12_bits() {
        let mut m = Ram::new();
        m.write(0x1003, 0xab);
        assert_eq!(m.read(0x003), 0xab);
    }
}
