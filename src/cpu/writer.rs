
use std::fmt::Write;

use super::disassembler::DisassemblyOptions;
use super::store::Disassembly;
use super::{label_name, INSTRUCTION_WIDTH};
use crate::image::ByteImage;

/// Turns a finished [`Disassembly`] into a linear text listing.
///
/// The image is walked from its first to its last address. A label line comes
/// first at any labeled address, then the instruction decoded there, if any.
/// Labels that point outside the image are listed before (lower addresses) or
/// after (higher addresses) the walk, so every label gets exactly one line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListingWriter {
    /// Write undecoded bytes as `DB 0xNN` lines instead of skipping them.
    pub data_directives: bool,
}

impl From<DisassemblyOptions> for ListingWriter {
    fn from(options: DisassemblyOptions) -> Self {
        Self {
            data_directives: options.data_directives,
        }
    }
}

impl ListingWriter {
    pub fn write(&self, image: &ByteImage, store: &Disassembly) -> String {
        let mut out = String::new();
        let start = image.base() as u32;
        let end = image.end();

        for label in store.labels().filter(|&label| (label as u32) < start) {
            Self::label(&mut out, label);
        }

        let mut cursor = start;
        // One past the last byte of the furthest reaching instruction written so far.
        let mut covered_until = start;
        while cursor < end {
            let address = cursor as u16;

            if store.is_label(address) {
                Self::label(&mut out, address);
            }

            match store.get(address) {
                Some(text) => {
                    let _ = writeln!(out, "{}", text);
                    covered_until = covered_until.max(cursor + INSTRUCTION_WIDTH as u32);
                    cursor += Self::step(store, cursor, end);
                }
                None => {
                    if self.data_directives && cursor >= covered_until {
                        if let Some(byte) = image.byte_at(address) {
                            let _ = writeln!(out, "DB {:#04x}", byte);
                        }
                    }
                    cursor += 1;
                }
            }
        }

        for label in store.labels().filter(|&label| (label as u32) >= end) {
            Self::label(&mut out, label);
        }

        out
    }

    fn label(out: &mut String, address: u16) {
        let _ = writeln!(out, "{}:", label_name(address));
    }

    /// Bytes to advance past the instruction at `cursor`. A label or another
    /// decoded instruction starting inside it stops the cursor there instead.
    fn step(store: &Disassembly, cursor: u32, end: u32) -> u32 {
        let width = INSTRUCTION_WIDTH as u32;
        let inner = (cursor + 1..cursor + width)
            .take_while(|&address| address < end)
            .find(|&address| {
                let address = address as u16;
                store.is_label(address) || store.get(address).is_some()
            });

        match inner {
            Some(address) => address - cursor,
            None => width,
        }
    }
}
