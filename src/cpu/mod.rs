
pub mod disassembler;
pub mod fields;
pub mod store;
pub mod writer;

use std::fmt;

use fields::Field;

/// Number of bytes in every CHIP-8 instruction.
pub const INSTRUCTION_WIDTH: u16 = 2;

/// Name of the label attached to an address, e.g. `lbl_0x024e`.
pub fn label_name(address: u16) -> String {
    format!("lbl_{:#06x}", address)
}

/// What an instruction does to the flow of control once decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Execution continues with the next instruction.
    Sequential,
    /// Unconditional transfer: the target is a label and a new entry point, and
    /// nothing after the instruction is reached from it.
    Jump,
    /// Subroutine call: the target is a label and a new entry point, and control
    /// comes back to the next instruction.
    ///
    /// Unlike every other row that admits a context, a call does not end the
    /// context it was decoded in.
    Call,
    /// Loads an address into `I`. The target is a label but is data, not code.
    LoadAddress,
}

impl Flow {
    /// Whether the instruction's address operand names a label.
    pub fn has_label(self) -> bool {
        !matches!(self, Flow::Sequential)
    }

    /// Whether the instruction's target starts a new decode context.
    pub fn is_control_transfer(self) -> bool {
        matches!(self, Flow::Jump | Flow::Call)
    }

    pub fn falls_through(self) -> bool {
        !matches!(self, Flow::Jump)
    }
}

/// An operand slot in an instruction's textual form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Register `VX`.
    Vx,
    /// Register `VY`.
    Vy,
    /// Immediate byte `NN`.
    Byte,
    /// Immediate nibble `N`.
    Nibble,
    /// Address `NNN`, rendered as a label.
    Target,
    /// The index register `I`. Not encoded in the opcode.
    Index,
}

impl Operand {
    pub const fn field(self) -> Option<Field> {
        match self {
            Operand::Vx => Some(Field::RegisterX),
            Operand::Vy => Some(Field::RegisterY),
            Operand::Byte => Some(Field::Byte),
            Operand::Nibble => Some(Field::Nibble),
            Operand::Target => Some(Field::Address),
            Operand::Index => None,
        }
    }

    fn render(self, value: u16) -> String {
        match self {
            Operand::Vx | Operand::Vy => format!("V{:X}", value),
            Operand::Byte => format!("{:#04x}", value),
            Operand::Nibble => format!("{:#x}", value),
            Operand::Target => label_name(value),
            Operand::Index => "I".to_string(),
        }
    }
}

/// Decoding rule for one operation code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Operation code this rule matches (`opcode & 0xF000`).
    pub operation: u16,
    pub name: &'static str,
    pub operands: &'static [Operand],
    pub flow: Flow,
}

impl Instruction {
    /// Extract all encoded arguments from an instruction, in operand order.
    pub fn args(&self, opcode: u16) -> Vec<(Field, u16)> {
        self.operands
            .iter()
            .filter_map(|operand| operand.field())
            .map(|field| (field, field.extract(opcode)))
            .collect()
    }

    /// Address referenced by the instruction, if its flow makes it a label.
    pub fn target(&self, opcode: u16) -> Option<u16> {
        if self.flow.has_label() {
            Some(fields::address(opcode))
        } else {
            None
        }
    }

    /// Textual form of the instruction, e.g. `LD V7, 0x03`.
    pub fn render(&self, opcode: u16) -> String {
        let args = self
            .operands
            .iter()
            .map(|operand| {
                let value = operand.field().map_or(0, |field| field.extract(opcode));
                operand.render(value)
            })
            .collect::<Vec<_>>();

        if args.is_empty() {
            self.name.to_string()
        } else {
            format!("{} {}", self.name, args.join(", "))
        }
    }
}

/// Maps each operation code (the top nibble of an opcode) to at most one
/// decoding rule. Built once, read-only while decoding.
#[derive(Clone, Debug)]
pub struct OpcodeTable {
    rows: [Option<Instruction>; 16],
}

impl OpcodeTable {
    /// A table with no rows. Every opcode decodes as unknown.
    pub fn empty() -> Self {
        Self { rows: [None; 16] }
    }

    /// The CHIP-8 rows this disassembler understands.
    pub fn chip8() -> Self {
        use Operand::*;

        Self::empty()
            .with(Instruction { // 1NNN
                operation: 0x1000,
                name: "JP",
                operands: &[Target],
                flow: Flow::Jump,
            })
            .with(Instruction { // 2NNN
                operation: 0x2000,
                name: "CALL",
                operands: &[Target],
                flow: Flow::Call,
            })
            .with(Instruction { // 3XNN
                operation: 0x3000,
                name: "SE",
                operands: &[Vx, Byte],
                flow: Flow::Sequential,
            })
            .with(Instruction { // 4XNN
                operation: 0x4000,
                name: "SNE",
                operands: &[Vx, Byte],
                flow: Flow::Sequential,
            })
            .with(Instruction { // 5XY0
                operation: 0x5000,
                name: "SE",
                operands: &[Vx, Vy],
                flow: Flow::Sequential,
            })
            .with(Instruction { // 6XNN
                operation: 0x6000,
                name: "LD",
                operands: &[Vx, Byte],
                flow: Flow::Sequential,
            })
            .with(Instruction { // 7XNN
                operation: 0x7000,
                name: "ADD",
                operands: &[Vx, Byte],
                flow: Flow::Sequential,
            })
            .with(Instruction { // ANNN
                operation: 0xA000,
                name: "LD",
                operands: &[Index, Target],
                flow: Flow::LoadAddress,
            })
            .with(Instruction { // CXNN
                operation: 0xC000,
                name: "RND",
                operands: &[Vx, Byte],
                flow: Flow::Sequential,
            })
            .with(Instruction { // DXYN
                operation: 0xD000,
                name: "DRW",
                operands: &[Vx, Vy, Nibble],
                flow: Flow::Sequential,
            })
    }

    /// Add a row, replacing any existing rule for the same operation code.
    pub fn with(mut self, instruction: Instruction) -> Self {
        let index = Self::index(instruction.operation);
        self.rows[index] = Some(instruction);
        self
    }

    /// Look up the rule for an opcode by its operation code.
    pub fn decode(&self, opcode: u16) -> Option<&Instruction> {
        self.rows[Self::index(opcode)].as_ref()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Instruction> {
        self.rows.iter().flatten()
    }

    fn index(opcode: u16) -> usize {
        (fields::operation_code(opcode) >> 12) as usize
    }
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::chip8()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pattern = format!("{:X}", self.operation >> 12);
        for operand in self.operands {
            pattern.push_str(match operand {
                Operand::Vx => "X",
                Operand::Vy => "Y",
                Operand::Byte => "NN",
                Operand::Nibble => "N",
                Operand::Target => "NNN",
                Operand::Index => "",
            });
        }
        write!(f, "{:0<4} {}", pattern, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_names_are_zero_padded() {
        assert_eq!(label_name(0x24E), "lbl_0x024e");
        assert_eq!(label_name(0x200), "lbl_0x0200");
        assert_eq!(label_name(0xFFF), "lbl_0x0fff");
    }

    #[test]
    fn canonical_rows_render() {
        let table = OpcodeTable::chip8();

        let jp = table.decode(0x124E).unwrap();
        assert_eq!(jp.render(0x124E), "JP lbl_0x024e");
        assert_eq!(jp.target(0x124E), Some(0x24E));
        assert!(jp.flow.is_control_transfer());
        assert!(!jp.flow.falls_through());

        let ld = table.decode(0x6703).unwrap();
        assert_eq!(ld.render(0x6703), "LD V7, 0x03");
        assert_eq!(ld.target(0x6703), None);

        let ldi = table.decode(0xA202).unwrap();
        assert_eq!(ldi.render(0xA202), "LD I, lbl_0x0202");
        assert_eq!(ldi.target(0xA202), Some(0x202));
        assert!(!ldi.flow.is_control_transfer());
        assert!(ldi.flow.falls_through());
    }

    #[test]
    fn other_rows_render() {
        let table = OpcodeTable::chip8();
        let render = |opcode| table.decode(opcode).unwrap().render(opcode);

        assert_eq!(render(0x2300), "CALL lbl_0x0300");
        assert_eq!(render(0x3A1F), "SE VA, 0x1f");
        assert_eq!(render(0x4B00), "SNE VB, 0x00");
        assert_eq!(render(0x51E0), "SE V1, VE");
        assert_eq!(render(0x7F01), "ADD VF, 0x01");
        assert_eq!(render(0xC0FF), "RND V0, 0xff");
        assert_eq!(render(0xD125), "DRW V1, V2, 0x5");
    }

    #[test]
    fn unmapped_operation_codes() {
        let table = OpcodeTable::chip8();
        for opcode in [0x00E0, 0x8120, 0x994E, 0xB200, 0xE19E, 0xFFFF] {
            assert!(table.decode(opcode).is_none(), "{:#06x}", opcode);
        }
    }

    #[test]
    fn args_follow_operand_order() {
        let table = OpcodeTable::chip8();
        let drw = table.decode(0xD125).unwrap();
        assert_eq!(
            drw.args(0xD125),
            vec![(Field::RegisterX, 1), (Field::RegisterY, 2), (Field::Nibble, 5)]
        );

        let ldi = table.decode(0xA202).unwrap();
        assert_eq!(ldi.args(0xA202), vec![(Field::Address, 0x202)]);
    }

    #[test]
    fn adding_a_row_extends_the_table() {
        let table = OpcodeTable::chip8().with(Instruction { // 9XY0
            operation: 0x9000,
            name: "SNE",
            operands: &[Operand::Vx, Operand::Vy],
            flow: Flow::Sequential,
        });

        assert_eq!(table.decode(0x9120).unwrap().render(0x9120), "SNE V1, V2");
        assert_eq!(table.rows().count(), OpcodeTable::chip8().rows().count() + 1);
        assert!(OpcodeTable::empty().decode(0x124E).is_none());
    }

    #[test]
    fn rows_display_their_pattern() {
        let table = OpcodeTable::chip8();
        assert_eq!(table.decode(0x6000).unwrap().to_string(), "6XNN LD");
        assert_eq!(table.decode(0xA000).unwrap().to_string(), "ANNN LD");
        assert_eq!(table.decode(0x5000).unwrap().to_string(), "5XY0 SE");
    }
}
