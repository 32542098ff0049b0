/// One fetched 16-bit instruction word, with accessors for the
/// fields the decoder cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode(u16);

impl Opcode {
    /// Combine two consecutive memory bytes big-endian.
    pub fn from_bytes(high: u8, low: u8) -> Opcode {
        Opcode(((high as u16) << 8) | low as u16)
    }

    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// The four nibbles, most significant first.
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        (
            ((self.0 >> 12) & 0xF) as u8,
            ((self.0 >> 8) & 0xF) as u8,
            ((self.0 >> 4) & 0xF) as u8,
            (self.0 & 0xF) as u8,
        )
    }

    /// The low 12 bits, an address operand.
    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }

    /// The low byte, an 8-bit constant operand.
    pub fn nn(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Opcode {
        Opcode(word)
    }
}
