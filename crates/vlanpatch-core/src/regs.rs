//! Switch register map
//!
//! Registers are addressed by a `(page, addr)` pair. Only the registers
//! needed for VLAN programming are listed here; per-port registers are
//! reached from their base with [`Register::offset`].

use crate::op::{OperationLog, Width};

/// A register location and width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
    /// Register page
    pub page: u8,
    /// Register address within the page
    pub addr: u8,
    /// Register width
    pub width: Width,
}

impl Register {
    /// Create a register descriptor
    pub const fn new(page: u8, addr: u8, width: Width) -> Self {
        Self { page, addr, width }
    }

    /// The register `bytes` further along the same page
    pub const fn offset(self, bytes: u8) -> Self {
        Self {
            addr: self.addr.wrapping_add(bytes),
            ..self
        }
    }

    /// Append a write of `value` to this register
    ///
    /// `value` is not range-checked; it is truncated when the log is encoded.
    pub fn set(&self, log: &mut OperationLog, value: u64) {
        log.append(self.page, self.addr, value, self.width);
    }
}

// ============================================================================
// Page 0x00: Control
// ============================================================================

/// Control register page
pub const PAGE_CONTROL: u8 = 0x00;

/// Switch mode
pub const SWITCH_MODE: Register = Register::new(PAGE_CONTROL, 0x0B, Width::Bits8);

// ============================================================================
// Page 0x05: Table access
// ============================================================================

/// Table access page
pub const PAGE_TABLE_ACCESS: u8 = 0x05;

/// VLAN table read/write control (bit 7 starts the access)
pub const VLAN_TABLE_CONTROL: Register = Register::new(PAGE_TABLE_ACCESS, 0x80, Width::Bits8);
/// VLAN table index (VLAN id)
pub const VLAN_TABLE_INDEX: Register = Register::new(PAGE_TABLE_ACCESS, 0x81, Width::Bits16);
/// VLAN table entry (member and untagged port masks)
pub const VLAN_TABLE_ENTRY: Register = Register::new(PAGE_TABLE_ACCESS, 0x83, Width::Bits32);

// ============================================================================
// Page 0x34: IEEE 802.1Q VLAN
// ============================================================================

/// IEEE 802.1Q VLAN page
pub const PAGE_IEEE_VLAN: u8 = 0x34;

/// 802.1Q global control
pub const VLAN_GLOBAL_CONTROL: Register = Register::new(PAGE_IEEE_VLAN, 0x00, Width::Bits8);
/// VLAN control 1
pub const VLAN_CONTROL1: Register = Register::new(PAGE_IEEE_VLAN, 0x01, Width::Bits8);
/// VLAN control 2
pub const VLAN_CONTROL2: Register = Register::new(PAGE_IEEE_VLAN, 0x02, Width::Bits8);
/// VLAN control 3 (per-port "drop untagged ingress" mask)
pub const VLAN_CONTROL3: Register = Register::new(PAGE_IEEE_VLAN, 0x03, Width::Bits16);
/// VLAN control 4
pub const VLAN_CONTROL4: Register = Register::new(PAGE_IEEE_VLAN, 0x05, Width::Bits8);
/// VLAN control 5
pub const VLAN_CONTROL5: Register = Register::new(PAGE_IEEE_VLAN, 0x06, Width::Bits8);
/// Default 802.1Q tag of port 1; port `n` is at `offset((n - 1) * 2)`
pub const DEFAULT_TAG: Register = Register::new(PAGE_IEEE_VLAN, 0x10, Width::Bits16);

// ============================================================================
// Page 0x40: Jumbo frame control
// ============================================================================

/// Jumbo frame control page
pub const PAGE_JUMBO: u8 = 0x40;

/// Ports allowed to receive jumbo frames
pub const JUMBO_PORT_MASK: Register = Register::new(PAGE_JUMBO, 0x01, Width::Bits32);

/// Named registers, for lookup by name
pub const REGISTERS: &[(&str, Register)] = &[
    ("SWITCH_MODE", SWITCH_MODE),
    ("VLAN_TABLE_CONTROL", VLAN_TABLE_CONTROL),
    ("VLAN_TABLE_INDEX", VLAN_TABLE_INDEX),
    ("VLAN_TABLE_ENTRY", VLAN_TABLE_ENTRY),
    ("VLAN_GLOBAL_CONTROL", VLAN_GLOBAL_CONTROL),
    ("VLAN_CONTROL1", VLAN_CONTROL1),
    ("VLAN_CONTROL2", VLAN_CONTROL2),
    ("VLAN_CONTROL3", VLAN_CONTROL3),
    ("VLAN_CONTROL4", VLAN_CONTROL4),
    ("VLAN_CONTROL5", VLAN_CONTROL5),
    ("DEFAULT_TAG", DEFAULT_TAG),
    ("JUMBO_PORT_MASK", JUMBO_PORT_MASK),
];

/// Look up a register by name (case-insensitive)
pub fn resolve(name: &str) -> Option<Register> {
    REGISTERS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, reg)| reg)
}
