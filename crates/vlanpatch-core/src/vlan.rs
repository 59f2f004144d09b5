//! 802.1Q VLAN programming
//!
//! Turns a [`VlanTopology`] into the register writes that configure the
//! switch's VLAN table. The sequence is:
//!
//! 1. [`enable_vlan`]: put the switch into 802.1Q mode.
//! 2. Per port: program the default tag of every port that has an untagged
//!    VLAN, and drop untagged ingress on every port that has none.
//! 3. Per VLAN: write the member and untagged port masks into the VLAN
//!    table.
//!
//! Step 3 consumes the untagged masks collected in step 2, so the order is
//! fixed.

use alloc::collections::{BTreeMap, BTreeSet};

use bitflags::bitflags;

use crate::op::OperationLog;
use crate::regs;

/// Port number, 1-based
pub type PortId = u8;

/// 802.1Q VLAN identifier
pub type VlanId = u16;

/// Number of physical ports
pub const NUM_PORTS: PortId = 8;

/// Highest usable VLAN id (4095 is reserved)
pub const MAX_VLAN_ID: VlanId = 4094;

/// Bit position of the untagged mask in a VLAN table entry
const ENTRY_UNTAGGED_SHIFT: u32 = 9;

/// Bit position of the priority field in a default tag
const DEFAULT_TAG_QOS_SHIFT: u32 = 13;

/// Value that commits the VLAN table index/entry pair
const VLAN_TABLE_WRITE: u64 = 0x80;

bitflags! {
    /// Set of switch ports
    ///
    /// Port `n` is bit `n - 1`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PortMask: u16 {
        /// Port 1
        const PORT1 = 1 << 0;
        /// Port 2
        const PORT2 = 1 << 1;
        /// Port 3
        const PORT3 = 1 << 2;
        /// Port 4
        const PORT4 = 1 << 3;
        /// Port 5
        const PORT5 = 1 << 4;
        /// Port 6
        const PORT6 = 1 << 5;
        /// Port 7
        const PORT7 = 1 << 6;
        /// Port 8
        const PORT8 = 1 << 7;
    }
}

impl Default for PortMask {
    fn default() -> Self {
        PortMask::empty()
    }
}

impl PortMask {
    /// Mask with only `port` set
    ///
    /// Ports outside `1..=8` yield an empty mask.
    pub fn port(port: PortId) -> Self {
        if (1..=NUM_PORTS).contains(&port) {
            Self::from_bits_truncate(1 << (port - 1))
        } else {
            Self::empty()
        }
    }

    /// Mask of all ports in `ports`
    pub fn from_ports<'a, I>(ports: I) -> Self
    where
        I: IntoIterator<Item = &'a PortId>,
    {
        ports
            .into_iter()
            .fold(Self::empty(), |mask, &port| mask | Self::port(port))
    }
}

/// VLAN assignment of the switch ports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VlanTopology {
    /// Ports participating in each VLAN, tagged or untagged
    pub membership: BTreeMap<VlanId, BTreeSet<PortId>>,
    /// Untagged (default) VLAN of each port, if any
    pub default_vlan: BTreeMap<PortId, VlanId>,
}

impl VlanTopology {
    /// Create an empty topology
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `port` to `vid` as a tagged member
    pub fn add_tagged(&mut self, port: PortId, vid: VlanId) {
        self.membership.entry(vid).or_default().insert(port);
    }

    /// Make `vid` the untagged VLAN of `port`
    ///
    /// Returns the previous default VLAN of the port, if there was one.
    pub fn set_untagged(&mut self, port: PortId, vid: VlanId) -> Option<VlanId> {
        self.membership.entry(vid).or_default().insert(port);
        self.default_vlan.insert(port, vid)
    }

    /// Member ports of `vid`
    pub fn members(&self, vid: VlanId) -> PortMask {
        self.membership
            .get(&vid)
            .map(PortMask::from_ports)
            .unwrap_or_default()
    }

    /// Check if `port` carries `vid` tagged
    pub fn is_tagged(&self, port: PortId, vid: VlanId) -> bool {
        self.default_vlan.get(&port) != Some(&vid)
            && self
                .membership
                .get(&vid)
                .is_some_and(|ports| ports.contains(&port))
    }

    /// Check if the topology has no VLANs
    pub fn is_empty(&self) -> bool {
        self.membership.is_empty()
    }
}

/// Switch the chip into 802.1Q VLAN mode
pub fn enable_vlan(log: &mut OperationLog) {
    // Jumbo frames have to be off for the VLAN table to take effect
    regs::JUMBO_PORT_MASK.set(log, 0x00);

    regs::SWITCH_MODE.set(log, 0x06);

    regs::VLAN_GLOBAL_CONTROL.set(log, 0xE3);
    regs::VLAN_CONTROL1.set(log, 0x0E);
    regs::VLAN_CONTROL4.set(log, 0x40);
    regs::VLAN_CONTROL5.set(log, 0x18);
}

/// Set the default tag of `port` (1-based)
///
/// `qos` is the 802.1p priority given to untagged ingress frames.
pub fn set_default_vlan(log: &mut OperationLog, port: PortId, vid: VlanId, qos: u8) {
    debug_assert!((1..=NUM_PORTS).contains(&port));
    let reg = regs::DEFAULT_TAG.offset((port - 1) * 2);
    reg.set(
        log,
        (u64::from(qos) << DEFAULT_TAG_QOS_SHIFT) | u64::from(vid),
    );
}

/// Drop untagged frames received on `ports`
pub fn block_untagged(log: &mut OperationLog, ports: PortMask) {
    regs::VLAN_CONTROL3.set(log, ports.bits().into());
}

/// Write one VLAN table entry
pub fn configure_vlan(log: &mut OperationLog, vid: VlanId, members: PortMask, untagged: PortMask) {
    regs::VLAN_TABLE_INDEX.set(log, vid.into());
    regs::VLAN_TABLE_ENTRY.set(
        log,
        (u64::from(untagged.bits()) << ENTRY_UNTAGGED_SHIFT) | u64::from(members.bits()),
    );
    regs::VLAN_TABLE_CONTROL.set(log, VLAN_TABLE_WRITE);
}

/// Program port defaults and the VLAN table for `topology`
pub fn apply_config(log: &mut OperationLog, topology: &VlanTopology) {
    let mut untagged: BTreeMap<VlanId, PortMask> = BTreeMap::new();
    let mut untag_blocked = PortMask::empty();

    for port in 1..=NUM_PORTS {
        match topology.default_vlan.get(&port) {
            Some(&vid) => {
                set_default_vlan(log, port, vid, 0);
                *untagged.entry(vid).or_default() |= PortMask::port(port);
            }
            // The default tag only applies to untagged ingress, which is
            // dropped on this port, so it is left as is
            None => untag_blocked |= PortMask::port(port),
        }
    }

    block_untagged(log, untag_blocked);

    for (&vid, ports) in &topology.membership {
        configure_vlan(
            log,
            vid,
            PortMask::from_ports(ports),
            untagged.get(&vid).copied().unwrap_or_default(),
        );
    }
}

/// Enable VLAN mode and apply `topology`
pub fn program(log: &mut OperationLog, topology: &VlanTopology) {
    log::info!(
        "Programming {} VLANs, {} ports with a default VLAN",
        topology.membership.len(),
        topology.default_vlan.len()
    );
    enable_vlan(log);
    apply_config(log, topology);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{Operation, Width};
    use alloc::vec::Vec;

    fn writes_to(log: &OperationLog, reg: regs::Register) -> Vec<u64> {
        log.iter()
            .filter(|op| op.page == reg.page && op.addr == reg.addr)
            .map(|op| op.value)
            .collect()
    }

    #[test]
    fn test_port_mask() {
        assert_eq!(PortMask::port(1), PortMask::PORT1);
        assert_eq!(PortMask::port(8).bits(), 0x80);
        assert!(PortMask::port(0).is_empty());
        assert!(PortMask::port(9).is_empty());
        assert_eq!(PortMask::from_ports(&[1, 2, 8]).bits(), 0b1000_0011);
    }

    #[test]
    fn test_enable_vlan_preamble() {
        let mut log = OperationLog::new();
        enable_vlan(&mut log);
        let ops: Vec<(u8, u8, u64)> = log.iter().map(|op| (op.page, op.addr, op.value)).collect();
        assert_eq!(
            ops,
            [
                (0x40, 0x01, 0x00),
                (0x00, 0x0b, 0x06),
                (0x34, 0x00, 0xe3),
                (0x34, 0x01, 0x0e),
                (0x34, 0x05, 0x40),
                (0x34, 0x06, 0x18),
            ]
        );
    }

    #[test]
    fn test_default_vlan_register() {
        let mut log = OperationLog::new();
        set_default_vlan(&mut log, 3, 100, 5);
        assert_eq!(
            log.as_slice(),
            [Operation::new(0x34, 0x14, (5 << 13) | 100, Width::Bits16)]
        );
    }

    #[test]
    fn test_apply_config() {
        let mut topo = VlanTopology::new();
        topo.set_untagged(1, 10);
        topo.add_tagged(2, 10);
        topo.add_tagged(2, 20);

        let mut log = OperationLog::new();
        apply_config(&mut log, &topo);

        assert_eq!(writes_to(&log, regs::DEFAULT_TAG), [10]);
        for port in 2..=NUM_PORTS {
            assert!(writes_to(&log, regs::DEFAULT_TAG.offset((port - 1) * 2)).is_empty());
        }
        assert_eq!(writes_to(&log, regs::VLAN_CONTROL3), [0b1111_1110]);
        assert_eq!(writes_to(&log, regs::VLAN_TABLE_INDEX), [10, 20]);
        assert_eq!(
            writes_to(&log, regs::VLAN_TABLE_ENTRY),
            [(0b01 << 9) | 0b11, 0b10]
        );
        assert_eq!(writes_to(&log, regs::VLAN_TABLE_CONTROL), [0x80, 0x80]);
    }

    #[test]
    fn test_vlan_triplets_not_interleaved() {
        let mut topo = VlanTopology::new();
        for port in 1..=4 {
            topo.set_untagged(port, u16::from(port) * 100);
            topo.add_tagged(port, 1);
        }

        let mut log = OperationLog::new();
        apply_config(&mut log, &topo);

        // 4 default tags + untag block, then 5 triplets
        let table: Vec<u8> = log.iter().skip(5).map(|op| op.addr).collect();
        assert_eq!(table.len(), 5 * 3);
        for triplet in table.chunks(3) {
            assert_eq!(triplet, [0x81, 0x83, 0x80]);
        }
    }

    #[test]
    fn test_program_starts_with_preamble() {
        let mut preamble = OperationLog::new();
        enable_vlan(&mut preamble);

        let mut log = OperationLog::new();
        program(&mut log, &VlanTopology::new());

        assert_eq!(&log.as_slice()[..preamble.len()], preamble.as_slice());
        // No default VLANs: every port drops untagged frames
        assert_eq!(log.as_slice()[preamble.len()].value, 0xFF);
        assert_eq!(log.len(), preamble.len() + 1);
    }

    #[test]
    fn test_is_tagged() {
        let mut topo = VlanTopology::new();
        topo.set_untagged(1, 10);
        topo.add_tagged(1, 20);
        assert!(!topo.is_tagged(1, 10));
        assert!(topo.is_tagged(1, 20));
        assert!(!topo.is_tagged(2, 20));
        assert_eq!(topo.members(10), PortMask::PORT1);
        assert!(topo.members(30).is_empty());
    }
}
