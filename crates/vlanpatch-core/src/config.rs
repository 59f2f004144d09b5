//! VLAN configuration file parsing
//!
//! The configuration lists, for each port, the VLANs it belongs to:
//!
//! ```text
//! # port: vlans
//! 1: 10
//! 2: 10t 20t
//! 3: 20 10t
//! ```
//!
//! A VLAN id followed by `t` is carried tagged on the port. A bare VLAN id
//! is the port's untagged (default) VLAN; a port has at most one. Blank
//! lines and lines starting with `#` are ignored.

use alloc::collections::{BTreeMap, BTreeSet};

use crate::error::ConfigError;
use crate::vlan::{PortId, VlanId, VlanTopology, MAX_VLAN_ID, NUM_PORTS};

/// Parse a VLAN configuration
pub fn parse_config(text: &str) -> Result<VlanTopology, ConfigError> {
    let mut topology = VlanTopology::new();
    // Tagged VLANs of each port, across all lines naming the port
    let mut tagged: BTreeMap<PortId, BTreeSet<VlanId>> = BTreeMap::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (port, vlans) = line
            .split_once(':')
            .filter(|(_, rest)| !rest.contains(':'))
            .ok_or(ConfigError::MissingColon { line: line_no })?;

        let port = parse_port(port, line_no)?;

        for token in vlans.split_whitespace() {
            let (vlan, is_tagged) = match token.strip_suffix('t') {
                Some(vlan) => (vlan, true),
                None => (token, false),
            };
            let vid = parse_vlan(vlan, line_no)?;

            if is_tagged {
                topology.add_tagged(port, vid);
                tagged.entry(port).or_default().insert(vid);
            } else if topology.default_vlan.contains_key(&port) {
                return Err(ConfigError::DuplicateDefaultVlan {
                    line: line_no,
                    port,
                });
            } else {
                topology.set_untagged(port, vid);
            }
        }

        if let Some(&vid) = topology.default_vlan.get(&port) {
            if tagged.get(&port).is_some_and(|vids| vids.contains(&vid)) {
                return Err(ConfigError::DefaultVlanAlsoTagged {
                    line: line_no,
                    port,
                    vlan: vid,
                });
            }
        }
    }

    Ok(topology)
}

fn parse_number(s: &str, line: usize) -> Result<i64, ConfigError> {
    s.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { line })
}

fn parse_port(s: &str, line: usize) -> Result<PortId, ConfigError> {
    let port = parse_number(s, line)?;
    if !(1..=i64::from(NUM_PORTS)).contains(&port) {
        return Err(ConfigError::PortOutOfRange { line, port });
    }
    Ok(port as PortId)
}

fn parse_vlan(s: &str, line: usize) -> Result<VlanId, ConfigError> {
    let vlan = parse_number(s, line)?;
    // VLAN 4095 is reserved
    if !(0..=i64::from(MAX_VLAN_ID)).contains(&vlan) {
        return Err(ConfigError::VlanOutOfRange { line, vlan });
    }
    Ok(vlan as VlanId)
}

/// Read and parse a VLAN configuration file
#[cfg(feature = "std")]
pub fn parse_config_file(path: impl AsRef<std::path::Path>) -> crate::Result<VlanTopology> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_config(&text)?)
}
