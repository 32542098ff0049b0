use crate::emulator::opcode::Opcode;

/// A wrapper for addresses.
#[derive(Debug, PartialEq, Eq)]
pub struct Addr(pub u16);

/// A wrapper for register indices.
#[derive(Debug, PartialEq, Eq)]
pub struct Reg(pub u8);

/// A wrapper for constants.
#[derive(Debug, PartialEq, Eq)]
pub struct Const(pub u8);

/// A single instruction from the CHIP-8 instruction set.
///
/// The opcode patterns use the conventional field names:
/// - NNN: 12-bit address
/// - NN: 8-bit constant
/// - N: 4-bit constant
/// - X and Y: 4-bit register indices
#[derive(Debug, PartialEq, Eq)]
pub enum Instruction {
    ClearScreen,               // 00E0
    Return,                    // 00EE
    Jump(Addr),                // 1NNN
    Call(Addr),                // 2NNN
    SkipEqConst(Reg, Const),   // 3XNN
    SkipNeqConst(Reg, Const),  // 4XNN
    SkipEqReg(Reg, Reg),       // 5XY0
    SetConst(Reg, Const),      // 6XNN
    AddConst(Reg, Const),      // 7XNN
    Copy(Reg, Reg),            // 8XY0
    Or(Reg, Reg),              // 8XY1
    And(Reg, Reg),             // 8XY2
    Xor(Reg, Reg),             // 8XY3
    AddReg(Reg, Reg),          // 8XY4
    SubReg(Reg, Reg),          // 8XY5
    ShiftRight(Reg),           // 8XY6
    SubFrom(Reg, Reg),         // 8XY7
    ShiftLeft(Reg),            // 8XYE
    SkipNeqReg(Reg, Reg),      // 9XY0
    SetIndex(Addr),            // ANNN
    JumpOffset(Addr),          // BNNN
    Random(Reg, Const),        // CXNN
    Draw(Reg, Reg, Const),     // DXYN
    SkipKeyPressed(Reg),       // EX9E
    SkipKeyReleased(Reg),      // EXA1
    ReadDelay(Reg),            // FX07
    WaitKey(Reg),              // FX0A
    SetDelay(Reg),             // FX15
    SetSound(Reg),             // FX18
    AddIndex(Reg),             // FX1E
    GlyphAddr(Reg),            // FX29
    StoreBcd(Reg),             // FX33
    StoreRegs(Reg),            // FX55
    LoadRegs(Reg),             // FX65
}

impl Instruction {
    /// Decode an opcode word, dispatching on the top nibble and then on
    /// the trailing nibble or byte for the 0x0, 0x8, 0xE and 0xF families.
    ///
    /// Returns `None` for words outside the instruction set; the executor
    /// treats those as non-fatal and skips over them.
    pub fn decode(opcode: Opcode) -> Option<Instruction> {
        let instruction = match opcode.nibbles() {
            (0, 0, 0xE, 0) => Instruction::ClearScreen,
            (0, 0, 0xE, 0xE) => Instruction::Return,
            (1, _, _, _) => Instruction::Jump(Addr(opcode.nnn())),
            (2, _, _, _) => Instruction::Call(Addr(opcode.nnn())),
            (3, x, _, _) => Instruction::SkipEqConst(Reg(x), Const(opcode.nn())),
            (4, x, _, _) => Instruction::SkipNeqConst(Reg(x), Const(opcode.nn())),
            (5, x, y, 0) => Instruction::SkipEqReg(Reg(x), Reg(y)),
            (6, x, _, _) => Instruction::SetConst(Reg(x), Const(opcode.nn())),
            (7, x, _, _) => Instruction::AddConst(Reg(x), Const(opcode.nn())),
            (8, x, y, 0) => Instruction::Copy(Reg(x), Reg(y)),
            (8, x, y, 1) => Instruction::Or(Reg(x), Reg(y)),
            (8, x, y, 2) => Instruction::And(Reg(x), Reg(y)),
            (8, x, y, 3) => Instruction::Xor(Reg(x), Reg(y)),
            (8, x, y, 4) => Instruction::AddReg(Reg(x), Reg(y)),
            (8, x, y, 5) => Instruction::SubReg(Reg(x), Reg(y)),
            (8, x, _, 6) => Instruction::ShiftRight(Reg(x)),
            (8, x, y, 7) => Instruction::SubFrom(Reg(x), Reg(y)),
            (8, x, _, 0xE) => Instruction::ShiftLeft(Reg(x)),
            (9, x, y, 0) => Instruction::SkipNeqReg(Reg(x), Reg(y)),
            (0xA, _, _, _) => Instruction::SetIndex(Addr(opcode.nnn())),
            (0xB, _, _, _) => Instruction::JumpOffset(Addr(opcode.nnn())),
            (0xC, x, _, _) => Instruction::Random(Reg(x), Const(opcode.nn())),
            (0xD, x, y, n) => Instruction::Draw(Reg(x), Reg(y), Const(n)),
            (0xE, x, 9, 0xE) => Instruction::SkipKeyPressed(Reg(x)),
            (0xE, x, 0xA, 1) => Instruction::SkipKeyReleased(Reg(x)),
            (0xF, x, 0, 7) => Instruction::ReadDelay(Reg(x)),
            (0xF, x, 0, 0xA) => Instruction::WaitKey(Reg(x)),
            (0xF, x, 1, 5) => Instruction::SetDelay(Reg(x)),
            (0xF, x, 1, 8) => Instruction::SetSound(Reg(x)),
            (0xF, x, 1, 0xE) => Instruction::AddIndex(Reg(x)),
            (0xF, x, 2, 9) => Instruction::GlyphAddr(Reg(x)),
            (0xF, x, 3, 3) => Instruction::StoreBcd(Reg(x)),
            (0xF, x, 5, 5) => Instruction::StoreRegs(Reg(x)),
            (0xF, x, 6, 5) => Instruction::LoadRegs(Reg(x)),
            _ => return None,
        };
        Some(instruction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn decode(word: u16) -> Option<Instruction> {
        Instruction::decode(Opcode::from(word))
    }

    #[test]
    fn opcodes_are_decoded_correctly() {
        assert_eq!(Some(Instruction::ClearScreen), decode(0x00E0));
        assert_eq!(Some(Instruction::Return), decode(0x00EE));
        assert_eq!(Some(Instruction::Jump(Addr(0x025))), decode(0x1025));
        assert_eq!(Some(Instruction::Call(Addr(0x037))), decode(0x2037));
        assert_eq!(Some(Instruction::SkipEqConst(Reg(0xA), Const(8))), decode(0x3A08));
        assert_eq!(Some(Instruction::SkipNeqConst(Reg(0xA), Const(8))), decode(0x4A08));
        assert_eq!(Some(Instruction::SkipEqReg(Reg(0xA), Reg(0xB))), decode(0x5AB0));
        assert_eq!(Some(Instruction::SetConst(Reg(0xB), Const(0x23))), decode(0x6B23));
        assert_eq!(Some(Instruction::AddConst(Reg(0xC), Const(0xA1))), decode(0x7CA1));
        assert_eq!(Some(Instruction::Copy(Reg(0xA), Reg(0xB))), decode(0x8AB0));
        assert_eq!(Some(Instruction::Or(Reg(0xD), Reg(0xE))), decode(0x8DE1));
        assert_eq!(Some(Instruction::And(Reg(0xD), Reg(0xE))), decode(0x8DE2));
        assert_eq!(Some(Instruction::Xor(Reg(0xD), Reg(0xE))), decode(0x8DE3));
        assert_eq!(Some(Instruction::AddReg(Reg(0xA), Reg(0xB))), decode(0x8AB4));
        assert_eq!(Some(Instruction::SubReg(Reg(0xA), Reg(0xB))), decode(0x8AB5));
        assert_eq!(Some(Instruction::ShiftRight(Reg(0xA))), decode(0x8AB6));
        assert_eq!(Some(Instruction::SubFrom(Reg(0xA), Reg(0xB))), decode(0x8AB7));
        assert_eq!(Some(Instruction::ShiftLeft(Reg(0xA))), decode(0x8A0E));
        assert_eq!(Some(Instruction::SkipNeqReg(Reg(0xA), Reg(0xB))), decode(0x9AB0));
        assert_eq!(Some(Instruction::SetIndex(Addr(0x025))), decode(0xA025));
        assert_eq!(Some(Instruction::JumpOffset(Addr(0x025))), decode(0xB025));
        assert_eq!(Some(Instruction::Random(Reg(0xA), Const(0x23))), decode(0xCA23));
        assert_eq!(Some(Instruction::Draw(Reg(0xA), Reg(0xB), Const(0xC))), decode(0xDABC));
        assert_eq!(Some(Instruction::SkipKeyPressed(Reg(0xA))), decode(0xEA9E));
        assert_eq!(Some(Instruction::SkipKeyReleased(Reg(0xA))), decode(0xEAA1));
        assert_eq!(Some(Instruction::ReadDelay(Reg(0xA))), decode(0xFA07));
        assert_eq!(Some(Instruction::WaitKey(Reg(0xA))), decode(0xFA0A));
        assert_eq!(Some(Instruction::SetDelay(Reg(0xA))), decode(0xFA15));
        assert_eq!(Some(Instruction::SetSound(Reg(0xA))), decode(0xFA18));
        assert_eq!(Some(Instruction::AddIndex(Reg(0xA))), decode(0xFA1E));
        assert_eq!(Some(Instruction::GlyphAddr(Reg(0xA))), decode(0xFA29));
        assert_eq!(Some(Instruction::StoreBcd(Reg(0xA))), decode(0xFA33));
        assert_eq!(Some(Instruction::StoreRegs(Reg(0xA))), decode(0xFA55));
        assert_eq!(Some(Instruction::LoadRegs(Reg(0xA))), decode(0xFA65));
    }

    #[test]
    fn out_of_set_words_decode_to_none() {
        assert_eq!(None, decode(0x0000));
        assert_eq!(None, decode(0x00E1));
        assert_eq!(None, decode(0x5AB1));
        assert_eq!(None, decode(0x8AB8));
        assert_eq!(None, decode(0xE000));
        assert_eq!(None, decode(0xFFFF));
    }

    proptest! {
        // Every 16-bit word either decodes or is rejected; decoding never panics.
        #[test]
        fn decode_is_total(word in 0u16..=0xFFFF) {
            let _ = decode(word);
        }

        #[test]
        fn register_fields_stay_in_range(word in 0u16..=0xFFFF) {
            if let Some(Instruction::Draw(Reg(x), Reg(y), Const(n))) = decode(word) {
                prop_assert!(x < 16 && y < 16 && n < 16);
            }
        }
    }
}
