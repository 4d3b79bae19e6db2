
use bitvec::prelude::*;

use super::*;
use super::store::Disassembly;
use super::writer::ListingWriter;
use crate::image::{ByteImage, LoadError};
use crate::insight::{Insight, NoInsight};

const ADDRESS_SPACE: usize = 0x1_0000;

/// Settings for a whole decode-and-write run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisassemblyOptions {
    /// Address the first byte of the image is loaded at.
    pub base_address: u16,
    /// Write bytes that were never decoded as `DB` lines.
    pub data_directives: bool,
}

impl Default for DisassemblyOptions {
    fn default() -> Self {
        Self {
            base_address: crate::BASE_ADDRESS,
            data_directives: false,
        }
    }
}

/// Why a context stopped decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The next opcode would need bytes outside the image.
    EndOfImage,
    /// No table row matches the opcode.
    UnknownOpcode { opcode: u16 },
    /// An unconditional transfer of control to `target`.
    Transfer { target: u16 },
}

/// One finished straight-line decode run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextTrace {
    pub entry: u16,
    /// Address the context stopped at.
    pub end: u16,
    pub termination: Termination,
}

/// A decode session over one image.
///
/// Decoding explores the program's control flow depth first. Each entry point
/// is decoded linearly until it runs off the image, hits an opcode the table
/// does not know, or makes an unconditional jump. Jump and call targets found
/// on the way become new entry points, each admitted at most once.
pub struct Disassembler<I: Insight = NoInsight> {
    image: ByteImage,
    table: OpcodeTable,
    insight: I,
    store: Disassembly,
    contexts: BitVec<usize, Lsb0>,
    worklist: Vec<u16>,
    traces: Vec<ContextTrace>,
}

impl Disassembler {
    pub fn new(image: ByteImage) -> Self {
        Self {
            image,
            table: OpcodeTable::default(),
            insight: NoInsight,
            store: Disassembly::new(),
            contexts: bitvec![usize, Lsb0; 0; ADDRESS_SPACE],
            worklist: Vec::new(),
            traces: Vec::new(),
        }
    }
}

impl<I: Insight> Disassembler<I> {
    /// Replace the opcode table used for decoding.
    pub fn with_table(mut self, table: OpcodeTable) -> Self {
        self.table = table;
        self
    }

    /// Attach an observer that is shown every decoding step.
    pub fn with_insight<J: Insight>(self, insight: J) -> Disassembler<J> {
        Disassembler {
            image: self.image,
            table: self.table,
            insight,
            store: self.store,
            contexts: self.contexts,
            worklist: self.worklist,
            traces: self.traces,
        }
    }

    /// Decode everything reachable from the image's base address.
    pub fn run(&mut self) -> &Disassembly {
        let entry = self.image.base();
        log::info!(
            "Disassembling {} bytes starting at {:#06x}",
            self.image.len(),
            entry
        );

        self.schedule(entry);
        while let Some(address) = self.worklist.pop() {
            let trace = self.decode_context(address);
            self.traces.push(trace);
        }

        log::info!(
            "Decoded {} instructions with {} labels in {} contexts",
            self.store.len(),
            self.store.label_count(),
            self.traces.len()
        );

        &self.store
    }

    /// Admit `address` as an entry point unless it already was one.
    fn schedule(&mut self, address: u16) -> bool {
        let seen = self.contexts.replace(address as usize, true);
        if seen {
            log::trace!("context {:#06x} already scheduled", address);
        } else {
            self.worklist.push(address);
        }
        !seen
    }

    fn decode_context(&mut self, entry: u16) -> ContextTrace {
        log::debug!("Decoding context at {:#06x}", entry);

        let mut address = entry;
        let termination = loop {
            let Some(bytes) = self.image.bytes_at(address) else {
                break Termination::EndOfImage;
            };

            let opcode = fields::word(bytes[0], bytes[1]);
            let operation = fields::operation_code(opcode);
            self.insight.execution_context(address, opcode, operation);
            self.insight.opcode(bytes, opcode);
            self.insight.operation(opcode, operation);

            let Some(instruction) = self.table.decode(opcode).copied() else {
                log::warn!("Unknown opcode {:#06x} at {:#06x}", opcode, address);
                self.insight.unknown_opcode(address, opcode);
                break Termination::UnknownOpcode { opcode };
            };

            for (field, value) in instruction.args(opcode) {
                self.insight.field(opcode, field, value);
            }

            let text = instruction.render(opcode);
            log::trace!("{:#06x}: {:04x}  {}", address, opcode, text);
            self.store.record(address, text);

            if let Some(target) = instruction.target(opcode) {
                self.store.mark_label(target);

                if instruction.flow.is_control_transfer() {
                    self.schedule(target);
                }
                if !instruction.flow.falls_through() {
                    break Termination::Transfer { target };
                }
            }

            match address.checked_add(INSTRUCTION_WIDTH) {
                Some(next) => address = next,
                None => break Termination::EndOfImage,
            }
        };

        log::debug!(
            "Context {:#06x} ended at {:#06x}: {:?}",
            entry,
            address,
            termination
        );

        ContextTrace {
            entry,
            end: address,
            termination,
        }
    }

    pub fn image(&self) -> &ByteImage {
        &self.image
    }

    pub fn disassembly(&self) -> &Disassembly {
        &self.store
    }

    pub fn into_disassembly(self) -> Disassembly {
        self.store
    }

    /// Every address ever admitted as an entry point, in address order.
    pub fn contexts(&self) -> impl Iterator<Item = u16> + '_ {
        self.contexts.iter_ones().map(|index| index as u16)
    }

    /// Finished contexts, in the order they were decoded.
    pub fn traces(&self) -> &[ContextTrace] {
        &self.traces
    }

    /// Render the listing of what has been decoded so far.
    pub fn listing(&self, writer: &ListingWriter) -> String {
        writer.write(&self.image, &self.store)
    }
}

/// Decode `data` loaded at `options.base_address` and return the listing.
pub fn disassemble(data: &[u8], options: DisassemblyOptions) -> Result<String, LoadError> {
    let image = ByteImage::new(data.to_vec(), options.base_address)?;
    let mut dasm = Disassembler::new(image);
    dasm.run();

    Ok(dasm.listing(&ListingWriter::from(options)))
}
