//! Optional observer of decoding steps.
//!
//! An [`Insight`] is told about every value the decoder computes. It can only
//! look: nothing it does feeds back into decoding.

use std::io::{self, Write};

use bitvec::prelude::*;
use owo_colors::{OwoColorize, Style};

use crate::cpu::fields::Field;

/// Receives each decoding step. Every method defaults to doing nothing.
pub trait Insight {
    /// A context is about to decode `opcode` at `address`.
    fn execution_context(&mut self, _address: u16, _opcode: u16, _operation: u16) {}

    /// Two bytes were assembled into an opcode.
    fn opcode(&mut self, _bytes: [u8; 2], _opcode: u16) {}

    /// The operation code was masked out of an opcode.
    fn operation(&mut self, _opcode: u16, _operation: u16) {}

    /// An operand field was extracted.
    fn field(&mut self, _opcode: u16, _field: Field, _value: u16) {}

    /// No rule matches the opcode at `address`.
    fn unknown_opcode(&mut self, _address: u16, _opcode: u16) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInsight;

impl Insight for NoInsight {}

impl<T: Insight + ?Sized> Insight for &mut T {
    fn execution_context(&mut self, address: u16, opcode: u16, operation: u16) {
        (**self).execution_context(address, opcode, operation)
    }

    fn opcode(&mut self, bytes: [u8; 2], opcode: u16) {
        (**self).opcode(bytes, opcode)
    }

    fn operation(&mut self, opcode: u16, operation: u16) {
        (**self).operation(opcode, operation)
    }

    fn field(&mut self, opcode: u16, field: Field, value: u16) {
        (**self).field(opcode, field, value)
    }

    fn unknown_opcode(&mut self, address: u16, opcode: u16) {
        (**self).unknown_opcode(address, opcode)
    }
}

/// Prints a bit level breakdown of each step to a writer.
pub struct BitInsight<W: Write> {
    out: W,
    color: bool,
}

impl BitInsight<io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> BitInsight<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn heading(&mut self, text: &str) {
        let styled = self.paint(text, Style::new().cyan().bold());
        let _ = writeln!(self.out, "\n{}", styled);
    }

    /// One row: the bits right aligned to 16 columns, then a caption.
    fn row(&mut self, bits: String, caption: &str) {
        let styled = self.paint(&format!("{:>16}", bits), Style::new().yellow().bold());
        let _ = writeln!(self.out, "{}\t{}", styled, caption);
    }

    fn rule(&mut self, caption: &str) {
        let _ = writeln!(self.out, "{}\t{}", "-".repeat(16), caption);
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Binary digits of `value`, most significant first, without leading zeros
/// beyond `min_width`.
fn binary(value: u16, min_width: usize) -> String {
    let bits = value.view_bits::<Msb0>();
    let first = bits.first_one().unwrap_or(bits.len() - 1);
    let start = first.min(bits.len().saturating_sub(min_width));

    bits[start..]
        .iter()
        .by_vals()
        .map(|bit| if bit { '1' } else { '0' })
        .collect()
}

impl<W: Write> Insight for BitInsight<W> {
    fn execution_context(&mut self, address: u16, opcode: u16, operation: u16) {
        let styled = self.paint("\n== DECODING ==", Style::new().green().bold());
        let _ = writeln!(self.out, "{}", styled);
        let _ = writeln!(self.out, "\tAddress: {:#06x}", address);
        let _ = writeln!(self.out, "\tOpcode: {:#06x}", opcode);
        let _ = writeln!(self.out, "\tOperation: {:#06x}", operation);
    }

    fn opcode(&mut self, bytes: [u8; 2], opcode: u16) {
        let [msb, lsb] = bytes;

        self.heading("Opcode");
        self.row(binary(msb as u16, 8), "Address offset");
        self.row(binary((msb as u16) << 8, 16), "Address offset (shifted 8)");
        self.row(binary(lsb as u16, 8), "Address offset (+ 1)");
        self.rule("");
        self.row(binary(opcode, 16), &format!("{} ({:#06x})", opcode, opcode));
    }

    fn operation(&mut self, opcode: u16, operation: u16) {
        let mask = Field::Operation.mask();

        self.heading("Operation");
        self.row(binary(opcode, 16), "opcode");
        self.row(binary(mask, 16), &format!("{:#06X}", mask));
        self.rule(&format!("opcode & {:#06X}", mask));
        self.row(binary(operation, 16), &format!("{} ({:#x})", operation, operation));
    }

    fn field(&mut self, opcode: u16, field: Field, value: u16) {
        let mask = field.mask();
        let shift = field.shift();

        let name: &'static str = field.into();
        self.heading(name);
        self.row(binary(opcode, 16), "opcode");
        self.row(binary(mask, 16), &format!("{:#X}", mask));
        self.rule(&format!("opcode & {:#X}", mask));
        if shift > 0 {
            self.row(binary(opcode & mask, 16), "");
            self.rule(&format!("(opcode & {:#X}) >> {}", mask, shift));
        }
        self.row(binary(value, 16), &format!("{} ({:#x})", value, value));
    }

    fn unknown_opcode(&mut self, address: u16, opcode: u16) {
        let styled = self.paint(
            &format!("Unknown opcode: {:#06x}", opcode),
            Style::new().red().bold(),
        );
        let _ = writeln!(self.out, "\n{} at {:#06x}", styled, address);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(insight: BitInsight<Vec<u8>>) -> String {
        String::from_utf8(insight.into_inner()).unwrap()
    }

    #[test]
    fn binary_digits() {
        assert_eq!(binary(0x12, 8), "00010010");
        assert_eq!(binary(0x1200, 16), "0001001000000000");
        assert_eq!(binary(0x124E, 16), "0001001001001110");
        assert_eq!(binary(0, 1), "0");
        assert_eq!(binary(0xF000, 1), "1111000000000000");
    }

    #[test]
    fn opcode_breakdown() {
        let mut insight = BitInsight::new(Vec::new(), false);
        insight.opcode([0x12, 0x4E], 0x124E);
        let text = output(insight);

        assert!(text.contains("Opcode"));
        assert!(text.contains("        00010010\tAddress offset\n"));
        assert!(text.contains("0001001001001110\t4686 (0x124e)"));
    }

    #[test]
    fn field_breakdown_shows_shift() {
        let mut insight = BitInsight::new(Vec::new(), false);
        insight.field(0x6703, Field::RegisterX, 7);
        let text = output(insight);

        assert!(text.contains("vx"));
        assert!(text.contains("opcode & 0xF00"));
        assert!(text.contains("(opcode & 0xF00) >> 8"));
        assert!(text.contains("7 (0x7)"));
    }

    #[test]
    fn plain_output_has_no_escapes() {
        let mut insight = BitInsight::new(Vec::new(), false);
        insight.unknown_opcode(0x200, 0x994E);
        let text = output(insight);

        assert!(text.contains("Unknown opcode: 0x994e at 0x0200"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn colored_output_uses_escapes() {
        let mut insight = BitInsight::new(Vec::new(), true);
        insight.operation(0x124E, 0x1000);
        assert!(output(insight).contains('\u{1b}'));
    }
}
