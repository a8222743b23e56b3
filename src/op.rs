use crate::error::{Chip8Error, Result};
use std::convert::TryFrom;

/// The 35 CHIP-8 instructions. Register operands (`x`, `y`) are guaranteed to be
/// between 0x0 and 0xF, `n` is a nibble, `kk` a byte and `addr` a 12-bit address.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Op {
    // 0XXX
    // 00E0     CLS         clear the display
    Cls,
    // 00EE     RET         return from a subroutine
    Ret,

    // 1NNN     JP addr
    Jp { addr: u16 },
    // 2NNN     CALL addr
    Call { addr: u16 },
    // 3XKK     SE Vx, byte
    SeByte { x: u8, kk: u8 },
    // 4XKK     SNE Vx, byte
    SneByte { x: u8, kk: u8 },
    // 5XY0     SE Vx, Vy
    SeReg { x: u8, y: u8 },
    // 6XKK     LD Vx, byte
    LdByte { x: u8, kk: u8 },
    // 7XKK     ADD Vx, byte
    AddByte { x: u8, kk: u8 },

    // 8XXX
    LdReg { x: u8, y: u8 },
    Or { x: u8, y: u8 },
    And { x: u8, y: u8 },
    Xor { x: u8, y: u8 },
    AddReg { x: u8, y: u8 },
    Sub { x: u8, y: u8 },
    Shr { x: u8 },
    Subn { x: u8, y: u8 },
    Shl { x: u8 },

    // 9XY0     SNE Vx, Vy
    SneReg { x: u8, y: u8 },
    // ANNN     LD I, addr
    LdI { addr: u16 },
    // BNNN     JP V0, addr
    JpV0 { addr: u16 },
    // CXKK     RND Vx, byte
    Rnd { x: u8, kk: u8 },
    // DXYN     DRW Vx, Vy, nibble
    Drw { x: u8, y: u8, n: u8 },

    // EXXX
    Skp { x: u8 },
    Sknp { x: u8 },

    // FXXX
    LdVxDt { x: u8 },
    LdVxK { x: u8 },
    LdDtVx { x: u8 },
    LdStVx { x: u8 },
    AddI { x: u8 },
    LdF { x: u8 },
    LdB { x: u8 },
    StoreRegs { x: u8 },
    LoadRegs { x: u8 },
}

/// Reassemble the low three nibbles of an instruction word into a 12-bit address
pub fn three_nibbles_to_address(n1: u8, n2: u8, n3: u8) -> u16 {
    (u16::from(n1) << 8) | (u16::from(n2) << 4) | u16::from(n3)
}

impl Op {
    /// Decode a big-endian instruction word. Words matching no instruction are
    /// rejected with [`Chip8Error::UnknownOpcode`].
    pub fn decode(word: u16) -> Result<Op> {
        let mask = 0xF;

        // the 4 nibbles of word, where n1 is the most significant
        let n1 = ((word >> 12) & mask) as u8;
        let n2 = ((word >> 8) & mask) as u8;
        let n3 = ((word >> 4) & mask) as u8;
        let n4 = (word & mask) as u8;

        let addr = three_nibbles_to_address(n2, n3, n4);
        let kk = (word & 0xFF) as u8;
        let (x, y) = (n2, n3);

        let op = match [n1, n2, n3, n4] {
            // the whole 0 family is keyed on its last nibble
            [0x0, _, _, 0x0] => Op::Cls,
            [0x0, _, _, 0xE] => Op::Ret,
            [0x1, ..] => Op::Jp { addr },
            [0x2, ..] => Op::Call { addr },
            [0x3, ..] => Op::SeByte { x, kk },
            [0x4, ..] => Op::SneByte { x, kk },
            [0x5, ..] => Op::SeReg { x, y },
            [0x6, ..] => Op::LdByte { x, kk },
            [0x7, ..] => Op::AddByte { x, kk },
            [0x8, .., 0x0] => Op::LdReg { x, y },
            [0x8, .., 0x1] => Op::Or { x, y },
            [0x8, .., 0x2] => Op::And { x, y },
            [0x8, .., 0x3] => Op::Xor { x, y },
            [0x8, .., 0x4] => Op::AddReg { x, y },
            [0x8, .., 0x5] => Op::Sub { x, y },
            [0x8, .., 0x6] => Op::Shr { x },
            [0x8, .., 0x7] => Op::Subn { x, y },
            [0x8, .., 0xE] => Op::Shl { x },
            [0x9, ..] => Op::SneReg { x, y },
            [0xA, ..] => Op::LdI { addr },
            [0xB, ..] => Op::JpV0 { addr },
            [0xC, ..] => Op::Rnd { x, kk },
            [0xD, .., n] => Op::Drw { x, y, n },
            [0xE, _, 0x9, 0xE] => Op::Skp { x },
            [0xE, _, 0xA, 0x1] => Op::Sknp { x },
            [0xF, _, 0x0, 0x7] => Op::LdVxDt { x },
            [0xF, _, 0x0, 0xA] => Op::LdVxK { x },
            [0xF, _, 0x1, 0x5] => Op::LdDtVx { x },
            [0xF, _, 0x1, 0x8] => Op::LdStVx { x },
            [0xF, _, 0x1, 0xE] => Op::AddI { x },
            [0xF, _, 0x2, 0x9] => Op::LdF { x },
            [0xF, _, 0x3, 0x3] => Op::LdB { x },
            [0xF, _, 0x5, 0x5] => Op::StoreRegs { x },
            [0xF, _, 0x6, 0x5] => Op::LoadRegs { x },
            _ => return Err(Chip8Error::UnknownOpcode { opcode: word }),
        };

        Ok(op)
    }

    /// True for the ops that can change the display buffer
    pub fn is_display_op(&self) -> bool {
        matches!(self, Op::Cls | Op::Drw { .. })
    }
}

impl TryFrom<u16> for Op {
    type Error = Chip8Error;

    fn try_from(word: u16) -> Result<Self> {
        Op::decode(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(word: u16) -> Op {
        Op::decode(word).unwrap()
    }

    #[test]
    fn convert_opcodes() {
        assert_eq!(op(0x00E0), Op::Cls);
        assert_eq!(op(0x00EE), Op::Ret);
        assert_eq!(op(0x1000), Op::Jp { addr: 0x000 });
        assert_eq!(op(0x2AAA), Op::Call { addr: 0xAAA });
        assert_eq!(op(0x3FAA), Op::SeByte { x: 0xF, kk: 0xAA });
        assert_eq!(op(0x4FAA), Op::SneByte { x: 0xF, kk: 0xAA });
        assert_eq!(op(0x5FA0), Op::SeReg { x: 0xF, y: 0xA });
        assert_eq!(op(0x6FAB), Op::LdByte { x: 0xF, kk: 0xAB });
        assert_eq!(op(0x7FAB), Op::AddByte { x: 0xF, kk: 0xAB });
        assert_eq!(op(0x8FA0), Op::LdReg { x: 0xF, y: 0xA });
        assert_eq!(op(0x8FA1), Op::Or { x: 0xF, y: 0xA });
        assert_eq!(op(0x8FA2), Op::And { x: 0xF, y: 0xA });
        assert_eq!(op(0x8FA3), Op::Xor { x: 0xF, y: 0xA });
        assert_eq!(op(0x8FA4), Op::AddReg { x: 0xF, y: 0xA });
        assert_eq!(op(0x8FA5), Op::Sub { x: 0xF, y: 0xA });
        assert_eq!(op(0x8FA6), Op::Shr { x: 0xF });
        assert_eq!(op(0x8FA7), Op::Subn { x: 0xF, y: 0xA });
        assert_eq!(op(0x8FAE), Op::Shl { x: 0xF });
        assert_eq!(op(0x9FA0), Op::SneReg { x: 0xF, y: 0xA });
        assert_eq!(op(0xAFAB), Op::LdI { addr: 0xFAB });
        assert_eq!(op(0xBFAB), Op::JpV0 { addr: 0xFAB });
        assert_eq!(op(0xCFAB), Op::Rnd { x: 0xF, kk: 0xAB });
        assert_eq!(op(0xDFAB), Op::Drw { x: 0xF, y: 0xA, n: 0xB });
        assert_eq!(op(0xEF9E), Op::Skp { x: 0xF });
        assert_eq!(op(0xEFA1), Op::Sknp { x: 0xF });
        assert_eq!(op(0xF907), Op::LdVxDt { x: 0x9 });
        assert_eq!(op(0xF90A), Op::LdVxK { x: 0x9 });
        assert_eq!(op(0xF915), Op::LdDtVx { x: 0x9 });
        assert_eq!(op(0xF918), Op::LdStVx { x: 0x9 });
        assert_eq!(op(0xF91E), Op::AddI { x: 0x9 });
        assert_eq!(op(0xF929), Op::LdF { x: 0x9 });
        assert_eq!(op(0xF933), Op::LdB { x: 0x9 });
        assert_eq!(op(0xF955), Op::StoreRegs { x: 0x9 });
        assert_eq!(op(0xF965), Op::LoadRegs { x: 0x9 });
    }

    #[test]
    fn zero_family_keyed_on_last_nibble() {
        assert_eq!(op(0x0000), Op::Cls);
        assert_eq!(op(0x0120), Op::Cls);
        assert_eq!(op(0x0FFE), Op::Ret);
    }

    #[test]
    fn skip_families_ignore_last_nibble() {
        assert_eq!(op(0x512F), Op::SeReg { x: 0x1, y: 0x2 });
        assert_eq!(op(0x9127), Op::SneReg { x: 0x1, y: 0x2 });
    }

    #[test]
    fn unknown_opcodes() {
        for word in &[0x0123u16, 0x8DEF, 0x8008, 0xED9F, 0xE000, 0xFDEF, 0xF000] {
            match Op::decode(*word) {
                Err(Chip8Error::UnknownOpcode { opcode }) => assert_eq!(opcode, *word),
                other => panic!("{:04X} decoded to {:?}", word, other),
            }
        }
    }

    #[test]
    fn try_from_matches_decode() {
        assert_eq!(Op::try_from(0xA123).unwrap(), Op::LdI { addr: 0x123 });
        assert!(Op::try_from(0x800F).is_err());
    }

    #[test]
    fn display_ops() {
        assert!(op(0x00E0).is_display_op());
        assert!(op(0xD125).is_display_op());
        assert!(!op(0x6005).is_display_op());
    }

    #[test]
    fn three_nibbles_to_address_test() {
        assert_eq!(three_nibbles_to_address(0x0, 0xF, 0xA), 0x0FA);
        assert_eq!(three_nibbles_to_address(0xF, 0xF, 0xF), 0xFFF);
    }
}
