
use strum_macros::{Display, EnumIter, IntoStaticStr};

// Useful constants for specifying bit masks
const HEX_0: u16 = 0x000F;
const HEX_1: u16 = 0x00F0;
const HEX_2: u16 = 0x0F00;
const HEX_3: u16 = 0xF000;
const HEX_01: u16 = HEX_0 | HEX_1;    // 0x00FF
const HEX_012: u16 = HEX_01 | HEX_2;  // 0x0FFF

/// A bit field of a 16-bit opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum Field {
    /// Top nibble, selects the instruction family. Kept in place (not shifted).
    #[strum(serialize = "operation")]
    Operation,
    /// `NNN`, a 12-bit address or constant.
    #[strum(serialize = "address")]
    Address,
    /// `X`, register index in the second nibble.
    #[strum(serialize = "vx")]
    RegisterX,
    /// `Y`, register index in the third nibble.
    #[strum(serialize = "vy")]
    RegisterY,
    /// `NN`, the low byte.
    #[strum(serialize = "byte")]
    Byte,
    /// `N`, the low nibble.
    #[strum(serialize = "nibble")]
    Nibble,
}

impl Field {
    pub const fn mask(self) -> u16 {
        match self {
            Field::Operation => HEX_3,
            Field::Address => HEX_012,
            Field::RegisterX => HEX_2,
            Field::RegisterY => HEX_1,
            Field::Byte => HEX_01,
            Field::Nibble => HEX_0,
        }
    }

    /// Number of bits the masked value is shifted right by.
    pub const fn shift(self) -> u32 {
        match self {
            Field::Operation => 0,
            _ => self.mask().trailing_zeros(),
        }
    }

    /// Extract this field from an opcode via its bitmask.
    pub const fn extract(self, opcode: u16) -> u16 {
        (opcode & self.mask()) >> self.shift()
    }
}

/// Assemble a big endian (most significant byte first) opcode from two bytes.
pub const fn word(msb: u8, lsb: u8) -> u16 {
    ((msb as u16) << u8::BITS) | lsb as u16
}

/// Upper nibble of an opcode, left in place: `0x124E` gives `0x1000`.
pub const fn operation_code(opcode: u16) -> u16 {
    Field::Operation.extract(opcode)
}

pub const fn address(opcode: u16) -> u16 {
    Field::Address.extract(opcode)
}

pub const fn register_x(opcode: u16) -> u8 {
    Field::RegisterX.extract(opcode) as u8
}

pub const fn register_y(opcode: u16) -> u8 {
    Field::RegisterY.extract(opcode) as u8
}

pub const fn immediate_byte(opcode: u16) -> u8 {
    Field::Byte.extract(opcode) as u8
}

pub const fn nibble(opcode: u16) -> u8 {
    Field::Nibble.extract(opcode) as u8
}
