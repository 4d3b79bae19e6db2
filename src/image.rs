//! Program images and loading them from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::cpu::fields;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not read ROM file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image of {len} bytes does not fit in the address space ({max} bytes available)")]
    TooLarge { len: usize, max: usize },
}

/// A program's bytes, mapped starting at a base address. Never mutated after
/// construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteImage {
    data: Vec<u8>,
    base: u16,
}

impl ByteImage {
    /// Read a ROM file. No CHIP-8 specific validation is performed.
    pub fn load<P: AsRef<Path>>(path: P, base: u16) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("Loaded {} bytes from {}", data.len(), path.display());
        Self::new(data, base)
    }

    /// Wrap bytes already in memory. Fails if the last byte would lie past
    /// address `0xFFFF`.
    pub fn new(data: Vec<u8>, base: u16) -> Result<Self, LoadError> {
        let max = 0x1_0000 - base as usize;
        if data.len() > max {
            return Err(LoadError::TooLarge { len: data.len(), max });
        }

        Ok(Self { data, base })
    }

    /// Build an image at the CHIP-8 program start address.
    pub fn from_bytes(data: &[u8]) -> Result<Self, LoadError> {
        Self::new(data.to_vec(), crate::BASE_ADDRESS)
    }

    pub fn base(&self) -> u16 {
        self.base
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// One past the last mapped address.
    pub fn end(&self) -> u32 {
        self.base as u32 + self.data.len() as u32
    }

    pub fn contains(&self, address: u16) -> bool {
        (address as u32) >= self.base as u32 && (address as u32) < self.end()
    }

    pub fn byte_at(&self, address: u16) -> Option<u8> {
        let offset = self.offset(address)?;
        self.data.get(offset).copied()
    }

    /// The two bytes of the instruction at `address`, or `None` when either
    /// lies outside the image.
    pub fn bytes_at(&self, address: u16) -> Option<[u8; 2]> {
        let offset = self.offset(address)?;
        match self.data.get(offset..offset + 2) {
            Some(&[msb, lsb]) => Some([msb, lsb]),
            _ => None,
        }
    }

    /// Fetches a raw 16-bit opcode. Opcodes are stored in big endian (most
    /// significant byte first).
    pub fn opcode_at(&self, address: u16) -> Option<u16> {
        self.bytes_at(address).map(|[msb, lsb]| fields::word(msb, lsb))
    }

    fn offset(&self, address: u16) -> Option<usize> {
        address.checked_sub(self.base).map(usize::from)
    }
}
