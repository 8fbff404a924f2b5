// SPDX-License-Identifier: MIT

//! Text driver for an SSD1306 128x64 OLED on I2C.
//!
//! Only what the reporting loop needs: initialize, clear, and place a short
//! ASCII string at a character cell. Characters render from a 5x7 font into
//! 6-pixel-wide cells, giving 21 columns by 8 rows in page addressing mode.
//!
//! Generic over any blocking `embedded-hal` I2C bus. Must only be driven from
//! the foreground loop; transfers block for milliseconds, far too long for
//! interrupt context.

use embedded_hal::blocking::i2c;

/// Default 7-bit bus address (SA0 low).
pub const SSD1306_I2C_ADDRESS: u8 = 0x3C;

pub const WIDTH: u8 = 128;
pub const HEIGHT: u8 = 64;

/// Character cell geometry: 5 font columns plus 1 blank.
pub const CELL_WIDTH: u8 = 6;

// Command bytes (SSD1306 datasheet, section 9).
const SETCONTRAST: u8 = 0x81;
const DISPLAYALLON_RESUME: u8 = 0xA4;
const NORMALDISPLAY: u8 = 0xA6;
const DISPLAYOFF: u8 = 0xAE;
const DISPLAYON: u8 = 0xAF;
const SETDISPLAYOFFSET: u8 = 0xD3;
const SETCOMPINS: u8 = 0xDA;
const SETVCOMDETECT: u8 = 0xDB;
const SETDISPLAYCLOCKDIV: u8 = 0xD5;
const SETPRECHARGE: u8 = 0xD9;
const SETMULTIPLEX: u8 = 0xA8;
const SETSTARTLINE: u8 = 0x40;
const MEMORYMODE: u8 = 0x20;
const COLUMNADDR: u8 = 0x21;
const PAGEADDR: u8 = 0x22;
const COMSCANDEC: u8 = 0xC8;
const SEGREMAP: u8 = 0xA0;
const CHARGEPUMP: u8 = 0x8D;
const DEACTIVATE_SCROLL: u8 = 0x2E;

// Control bytes prefixing each transfer.
const CTRL_COMMAND: u8 = 0x00;
const CTRL_DATA: u8 = 0x40;

pub struct Ssd1306<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C: i2c::Write> Ssd1306<I2C> {
    /// Wrap a bus at the default address. The panel is untouched until
    /// [`init`](Self::init).
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            addr: SSD1306_I2C_ADDRESS,
        }
    }

    /// Run the charge-pump power-up sequence and switch the panel on.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        for cmd in [
            DISPLAYOFF,
            SETDISPLAYCLOCKDIV,
            0x80,
            SETMULTIPLEX,
            HEIGHT - 1,
            SETDISPLAYOFFSET,
            0x00,
            SETSTARTLINE,
            CHARGEPUMP,
            0x14, // internal charge pump
            MEMORYMODE,
            0x00, // horizontal addressing
            SEGREMAP | 0x01,
            COMSCANDEC,
            SETCOMPINS,
            0x12,
            SETCONTRAST,
            0xCF,
            SETPRECHARGE,
            0xF1,
            SETVCOMDETECT,
            0x40,
            DEACTIVATE_SCROLL,
            DISPLAYALLON_RESUME,
            NORMALDISPLAY,
            DISPLAYON,
        ] {
            self.command(cmd)?;
        }
        Ok(())
    }

    /// Zero the entire display RAM and leave the cursor at the top left.
    pub fn clear(&mut self) -> Result<(), I2C::Error> {
        self.set_window(0, 0)?;
        const ZEROS: [u8; 16] = [0; 16];
        for _ in 0..(WIDTH as usize * HEIGHT as usize / 8 / ZEROS.len()) {
            self.data(&ZEROS)?;
        }
        self.set_window(0, 0)
    }

    /// Render `text` starting at character cell (`col`, `row`).
    ///
    /// `col` is in 6-pixel cells (0..21), `row` in 8-pixel pages (0..8).
    /// Output past the right edge is dropped; bytes outside the printable
    /// ASCII range render as a fallback glyph.
    pub fn write_text(&mut self, col: u8, row: u8, text: &str) -> Result<(), I2C::Error> {
        if row >= HEIGHT / 8 || col >= WIDTH / CELL_WIDTH {
            return Ok(());
        }
        self.set_window(col * CELL_WIDTH, row)?;

        let cells_left = (WIDTH / CELL_WIDTH - col) as usize;
        for byte in text.bytes().take(cells_left) {
            let glyph = match byte {
                0x20..=0x7E => &FONT_5X7[(byte - 0x20) as usize],
                _ => &FONT_5X7[(b'?' - 0x20) as usize],
            };
            let cell = [glyph[0], glyph[1], glyph[2], glyph[3], glyph[4], 0x00];
            self.data(&cell)?;
        }
        Ok(())
    }

    /// Release the bus.
    pub fn free(self) -> I2C {
        self.i2c
    }

    /// Point the RAM window at pixel column `x`, page `page`, extending to
    /// the right edge.
    fn set_window(&mut self, x: u8, page: u8) -> Result<(), I2C::Error> {
        self.command(PAGEADDR)?;
        self.command(page)?;
        self.command(HEIGHT / 8 - 1)?;
        self.command(COLUMNADDR)?;
        self.command(x)?;
        self.command(WIDTH - 1)
    }

    fn command(&mut self, cmd: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.addr, &[CTRL_COMMAND, cmd])
    }

    fn data(&mut self, bytes: &[u8]) -> Result<(), I2C::Error> {
        // One transfer per cell-or-smaller chunk keeps the stack buffer tiny.
        let mut buf = [CTRL_DATA; 17];
        for chunk in bytes.chunks(buf.len() - 1) {
            buf[1..=chunk.len()].copy_from_slice(chunk);
            self.i2c.write(self.addr, &buf[..=chunk.len()])?;
        }
        Ok(())
    }
}

/// Column-major 5x7 font, ASCII 0x20..=0x7E. Bit 0 is the top pixel row.
const FONT_5X7: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // '!'
    [0x00, 0x07, 0x00, 0x07, 0x00], // '"'
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // '#'
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // '$'
    [0x23, 0x13, 0x08, 0x64, 0x62], // '%'
    [0x36, 0x49, 0x55, 0x22, 0x50], // '&'
    [0x00, 0x05, 0x03, 0x00, 0x00], // '\''
    [0x00, 0x1C, 0x22, 0x41, 0x00], // '('
    [0x00, 0x41, 0x22, 0x1C, 0x00], // ')'
    [0x14, 0x08, 0x3E, 0x08, 0x14], // '*'
    [0x08, 0x08, 0x3E, 0x08, 0x08], // '+'
    [0x00, 0x50, 0x30, 0x00, 0x00], // ','
    [0x08, 0x08, 0x08, 0x08, 0x08], // '-'
    [0x00, 0x60, 0x60, 0x00, 0x00], // '.'
    [0x20, 0x10, 0x08, 0x04, 0x02], // '/'
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // '0'
    [0x00, 0x42, 0x7F, 0x40, 0x00], // '1'
    [0x42, 0x61, 0x51, 0x49, 0x46], // '2'
    [0x21, 0x41, 0x45, 0x4B, 0x31], // '3'
    [0x18, 0x14, 0x12, 0x7F, 0x10], // '4'
    [0x27, 0x45, 0x45, 0x45, 0x39], // '5'
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // '6'
    [0x01, 0x71, 0x09, 0x05, 0x03], // '7'
    [0x36, 0x49, 0x49, 0x49, 0x36], // '8'
    [0x06, 0x49, 0x49, 0x29, 0x1E], // '9'
    [0x00, 0x36, 0x36, 0x00, 0x00], // ':'
    [0x00, 0x56, 0x36, 0x00, 0x00], // ';'
    [0x08, 0x14, 0x22, 0x41, 0x00], // '<'
    [0x14, 0x14, 0x14, 0x14, 0x14], // '='
    [0x00, 0x41, 0x22, 0x14, 0x08], // '>'
    [0x02, 0x01, 0x51, 0x09, 0x06], // '?'
    [0x32, 0x49, 0x79, 0x41, 0x3E], // '@'
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // 'A'
    [0x7F, 0x49, 0x49, 0x49, 0x36], // 'B'
    [0x3E, 0x41, 0x41, 0x41, 0x22], // 'C'
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // 'D'
    [0x7F, 0x49, 0x49, 0x49, 0x41], // 'E'
    [0x7F, 0x09, 0x09, 0x09, 0x01], // 'F'
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // 'G'
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // 'H'
    [0x00, 0x41, 0x7F, 0x41, 0x00], // 'I'
    [0x20, 0x40, 0x41, 0x3F, 0x01], // 'J'
    [0x7F, 0x08, 0x14, 0x22, 0x41], // 'K'
    [0x7F, 0x40, 0x40, 0x40, 0x40], // 'L'
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // 'M'
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // 'N'
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // 'O'
    [0x7F, 0x09, 0x09, 0x09, 0x06], // 'P'
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // 'Q'
    [0x7F, 0x09, 0x19, 0x29, 0x46], // 'R'
    [0x46, 0x49, 0x49, 0x49, 0x31], // 'S'
    [0x01, 0x01, 0x7F, 0x01, 0x01], // 'T'
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // 'U'
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // 'V'
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // 'W'
    [0x63, 0x14, 0x08, 0x14, 0x63], // 'X'
    [0x07, 0x08, 0x70, 0x08, 0x07], // 'Y'
    [0x61, 0x51, 0x49, 0x45, 0x43], // 'Z'
    [0x00, 0x7F, 0x41, 0x41, 0x00], // '['
    [0x02, 0x04, 0x08, 0x10, 0x20], // '\\'
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ']'
    [0x04, 0x02, 0x01, 0x02, 0x04], // '^'
    [0x40, 0x40, 0x40, 0x40, 0x40], // '_'
    [0x00, 0x01, 0x02, 0x04, 0x00], // '`'
    [0x20, 0x54, 0x54, 0x54, 0x78], // 'a'
    [0x7F, 0x48, 0x44, 0x44, 0x38], // 'b'
    [0x38, 0x44, 0x44, 0x44, 0x20], // 'c'
    [0x38, 0x44, 0x44, 0x48, 0x7F], // 'd'
    [0x38, 0x54, 0x54, 0x54, 0x18], // 'e'
    [0x08, 0x7E, 0x09, 0x01, 0x02], // 'f'
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // 'g'
    [0x7F, 0x08, 0x04, 0x04, 0x78], // 'h'
    [0x00, 0x44, 0x7D, 0x40, 0x00], // 'i'
    [0x20, 0x40, 0x44, 0x3D, 0x00], // 'j'
    [0x7F, 0x10, 0x28, 0x44, 0x00], // 'k'
    [0x00, 0x41, 0x7F, 0x40, 0x00], // 'l'
    [0x7C, 0x04, 0x18, 0x04, 0x78], // 'm'
    [0x7C, 0x08, 0x04, 0x04, 0x78], // 'n'
    [0x38, 0x44, 0x44, 0x44, 0x38], // 'o'
    [0x7C, 0x14, 0x14, 0x14, 0x08], // 'p'
    [0x08, 0x14, 0x14, 0x18, 0x7C], // 'q'
    [0x7C, 0x08, 0x04, 0x04, 0x08], // 'r'
    [0x48, 0x54, 0x54, 0x54, 0x20], // 's'
    [0x04, 0x3F, 0x44, 0x40, 0x20], // 't'
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // 'u'
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // 'v'
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // 'w'
    [0x44, 0x28, 0x10, 0x28, 0x44], // 'x'
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // 'y'
    [0x44, 0x64, 0x54, 0x4C, 0x44], // 'z'
    [0x00, 0x08, 0x36, 0x41, 0x00], // '{'
    [0x00, 0x00, 0x7F, 0x00, 0x00], // '|'
    [0x00, 0x41, 0x36, 0x08, 0x00], // '}'
    [0x08, 0x08, 0x2A, 0x1C, 0x08], // '~'
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    /// Records every I2C write so tests can check what went on the bus.
    struct BusLog {
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl BusLog {
        fn new() -> Self {
            Self { writes: Vec::new() }
        }
    }

    impl i2c::Write for BusLog {
        type Error = core::convert::Infallible;

        fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), Self::Error> {
            self.writes.push((addr, bytes.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn commands_use_the_command_control_byte() {
        let mut disp = Ssd1306::new(BusLog::new());
        disp.init().unwrap();

        let log = disp.free();
        assert!(!log.writes.is_empty());
        for (addr, bytes) in &log.writes {
            assert_eq!(*addr, SSD1306_I2C_ADDRESS);
            assert_eq!(bytes[0], CTRL_COMMAND);
            assert_eq!(bytes.len(), 2);
        }
        // Sequence ends by switching the panel on.
        assert_eq!(log.writes.last().unwrap().1[1], DISPLAYON);
    }

    #[test]
    fn write_text_emits_one_cell_per_char() {
        let mut disp = Ssd1306::new(BusLog::new());
        disp.write_text(0, 1, "RPM").unwrap();

        let log = disp.free();
        let cells: Vec<_> = log
            .writes
            .iter()
            .filter(|(_, bytes)| bytes[0] == CTRL_DATA)
            .collect();
        assert_eq!(cells.len(), 3);
        for (_, bytes) in &cells {
            assert_eq!(bytes.len(), 1 + CELL_WIDTH as usize);
            // Blank spacer column after the glyph.
            assert_eq!(*bytes.last().unwrap(), 0x00);
        }
    }

    #[test]
    fn out_of_range_cells_write_nothing() {
        let mut disp = Ssd1306::new(BusLog::new());
        disp.write_text(0, 8, "x").unwrap();
        disp.write_text(21, 0, "x").unwrap();
        assert!(disp.free().writes.is_empty());
    }
}
