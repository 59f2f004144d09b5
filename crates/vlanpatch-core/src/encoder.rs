//! Write table opcode stream
//!
//! The on-image write table is a sequence of little-endian records:
//!
//! ```text
//! opcode 1: u8 opcode, u8 addr, u16 value    (4 bytes)  page select or 8/16-bit write
//! opcode 2: u8 opcode, u8 addr, u32 value    (6 bytes)  32-bit write
//! opcode 4: u8 opcode, u8 addr, u64 value   (10 bytes)  64-bit write
//! ```
//!
//! An opcode 1 record with address [`PAGE_SELECT_ADDR`] switches the page
//! that subsequent writes apply to. The opcode equals the size of the value
//! field in 16-bit words, so every record is a whole number of words.

use alloc::vec::Vec;

use crate::error::FormatError;
use crate::op::{Operation, Width};

/// Address reserved for the page select pseudo-register
pub const PAGE_SELECT_ADDR: u8 = 0xFF;

/// Size of the opcode/address prefix of every record
const RECORD_HEADER_SIZE: usize = 2;

/// Stateful encoder tracking the currently selected page
#[derive(Debug, Default)]
pub struct Encoder {
    current_page: Option<u8>,
    out: Vec<u8>,
}

impl Encoder {
    /// Create an encoder with no page selected
    ///
    /// The first operation pushed always emits a page select, since nothing
    /// is known about the page left selected by the existing table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode one operation, selecting its page first if needed
    pub fn push(&mut self, op: &Operation) {
        if self.current_page != Some(op.page) {
            self.record(1, PAGE_SELECT_ADDR, &u16::from(op.page).to_le_bytes());
            self.current_page = Some(op.page);
        }

        match op.width {
            Width::Bits8 | Width::Bits16 => {
                self.record(1, op.addr, &(op.value as u16).to_le_bytes())
            }
            Width::Bits32 => self.record(2, op.addr, &(op.value as u32).to_le_bytes()),
            Width::Bits64 => self.record(4, op.addr, &op.value.to_le_bytes()),
        }
    }

    fn record(&mut self, opcode: u8, addr: u8, value: &[u8]) {
        self.out.push(opcode);
        self.out.push(addr);
        self.out.extend_from_slice(value);
    }

    /// Finish encoding and return the byte stream
    pub fn finish(self) -> Vec<u8> {
        debug_assert!(self.out.len() % 2 == 0);
        self.out
    }
}

/// Encode a sequence of operations into the opcode stream
pub fn encode<'a, I>(ops: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a Operation>,
{
    let mut encoder = Encoder::new();
    for op in ops {
        encoder.push(op);
    }
    encoder.finish()
}

/// Decode an opcode stream back into operations
///
/// Page select records are folded into the page of the following writes.
/// Writes that appear before any page select are attributed to page 0.
pub fn decode(data: &[u8]) -> Result<Vec<Operation>, FormatError> {
    let mut ops = Vec::new();
    let mut page = 0u8;
    let mut pos = 0;

    while pos < data.len() {
        if pos + RECORD_HEADER_SIZE > data.len() {
            return Err(FormatError::TruncatedImage {
                needed: pos + RECORD_HEADER_SIZE,
                len: data.len(),
            });
        }

        let opcode = data[pos];
        let addr = data[pos + 1];
        let width = Width::from_opcode(opcode)
            .ok_or(FormatError::UnknownOpcode { opcode, offset: pos })?;

        let start = pos + RECORD_HEADER_SIZE;
        let end = start + width.value_bytes();
        if end > data.len() {
            return Err(FormatError::TruncatedImage {
                needed: end,
                len: data.len(),
            });
        }

        let mut value = [0u8; 8];
        value[..width.value_bytes()].copy_from_slice(&data[start..end]);
        let value = u64::from_le_bytes(value);

        if opcode == 1 && addr == PAGE_SELECT_ADDR {
            page = value as u8;
        } else {
            ops.push(Operation::new(page, addr, value, width));
        }

        pos = end;
    }

    Ok(ops)
}
