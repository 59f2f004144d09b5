//! Register write operations
//!
//! An [`Operation`] is a single "write `value` into register `addr` on page
//! `page`" request. Operations are collected in an [`OperationLog`] in the
//! order they must be executed by the switch; the log is later flushed to
//! the on-image opcode stream by [`crate::encoder`].

use alloc::vec::Vec;

/// Register width of a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// 8-bit register
    Bits8,
    /// 16-bit register
    Bits16,
    /// 32-bit register
    Bits32,
    /// 64-bit register
    Bits64,
}

impl Width {
    /// Register width in bits
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
            Self::Bits32 => 32,
            Self::Bits64 => 64,
        }
    }

    /// Opcode used to encode a write of this width
    ///
    /// The opcode is the size of the encoded value field in 16-bit words.
    /// 8-bit writes share the 16-bit encoding.
    pub const fn opcode(self) -> u8 {
        match self {
            Self::Bits8 | Self::Bits16 => 1,
            Self::Bits32 => 2,
            Self::Bits64 => 4,
        }
    }

    /// Size of the encoded value field in bytes
    pub const fn value_bytes(self) -> usize {
        self.opcode() as usize * 2
    }

    /// Width class for an encoded opcode
    ///
    /// Opcode 1 decodes as [`Width::Bits16`] since the encoding does not
    /// distinguish 8-bit from 16-bit writes.
    pub const fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            1 => Some(Self::Bits16),
            2 => Some(Self::Bits32),
            4 => Some(Self::Bits64),
            _ => None,
        }
    }

    /// Width for a size given in bits
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(Self::Bits8),
            16 => Some(Self::Bits16),
            32 => Some(Self::Bits32),
            64 => Some(Self::Bits64),
            _ => None,
        }
    }
}

/// A single register write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    /// Register page
    pub page: u8,
    /// Register address within the page
    pub addr: u8,
    /// Value to write, truncated to the encoded field on flush
    pub value: u64,
    /// Register width
    pub width: Width,
}

impl Operation {
    /// Create a new operation
    pub const fn new(page: u8, addr: u8, value: u64, width: Width) -> Self {
        Self {
            page,
            addr,
            value,
            width,
        }
    }
}

/// Ordered, append-only list of register writes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationLog {
    ops: Vec<Operation>,
}

impl OperationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Append a write of `value` to `page`/`addr`
    pub fn append(&mut self, page: u8, addr: u8, value: u64, width: Width) {
        log::debug!(
            "setting 0x{:02x} / 0x{:02x} to 0x{:x} ({})",
            page,
            addr,
            value,
            width.bits()
        );
        self.ops.push(Operation::new(page, addr, value, width));
    }

    /// Append an 8-bit write
    pub fn set8(&mut self, page: u8, addr: u8, value: u8) {
        self.append(page, addr, value.into(), Width::Bits8);
    }

    /// Append a 16-bit write
    pub fn set16(&mut self, page: u8, addr: u8, value: u16) {
        self.append(page, addr, value.into(), Width::Bits16);
    }

    /// Append a 32-bit write
    pub fn set32(&mut self, page: u8, addr: u8, value: u32) {
        self.append(page, addr, value.into(), Width::Bits32);
    }

    /// Append a 64-bit write
    pub fn set64(&mut self, page: u8, addr: u8, value: u64) {
        self.append(page, addr, value, Width::Bits64);
    }

    /// Drop every operation appended so far
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// All operations, in insertion order
    pub fn as_slice(&self) -> &[Operation] {
        &self.ops
    }

    /// Iterate over the operations in insertion order
    pub fn iter(&self) -> core::slice::Iter<'_, Operation> {
        self.ops.iter()
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if the log holds no operations
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl<'a> IntoIterator for &'a OperationLog {
    type Item = &'a Operation;
    type IntoIter = core::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
