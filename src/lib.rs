//! Static disassembler for CHIP-8 programs.
//!
//! A program image is decoded by following its control flow from the load
//! address: jump and call targets become new entry points, addresses loaded
//! into `I` become labels, and anything never reached is left as data. The
//! result is written out as a label-annotated listing.
//!
//! ```
//! use c8dasm::{disassemble, DisassemblyOptions};
//!
//! let listing = disassemble(&[0x67, 0x03, 0x12, 0x00], DisassemblyOptions::default()).unwrap();
//! assert_eq!(listing, "lbl_0x0200:\nLD V7, 0x03\nJP lbl_0x0200\n");
//! ```

pub mod cpu;
pub mod image;
pub mod insight;

pub use cpu::disassembler::{
    disassemble, ContextTrace, Disassembler, DisassemblyOptions, Termination,
};
pub use cpu::fields::Field;
pub use cpu::store::Disassembly;
pub use cpu::writer::ListingWriter;
pub use cpu::{label_name, Flow, Instruction, OpcodeTable, Operand, INSTRUCTION_WIDTH};
pub use image::{ByteImage, LoadError};
pub use insight::{BitInsight, Insight, NoInsight};

/// Address CHIP-8 programs are loaded at.
pub const BASE_ADDRESS: u16 = 0x200;
