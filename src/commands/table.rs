//! VLAN table rendering

use std::fmt::Write;

use vlanpatch_core::vlan::{VlanTopology, NUM_PORTS};

/// Render the port × VLAN matrix of `topology`
///
/// `t` marks a tagged member, `*` the port's untagged VLAN.
pub fn format_vlan_table(topology: &VlanTopology) -> String {
    let vids: Vec<u16> = topology.membership.keys().copied().collect();
    let border = format!("+-------------+{}", "-------+".repeat(vids.len()));

    let mut out = String::new();
    let _ = writeln!(out, "{}", border);
    let _ = write!(out, "| Port \\ VLAN |");
    for vid in &vids {
        let _ = write!(out, " {:>5} |", vid);
    }
    out.push('\n');
    let _ = writeln!(out, "{}", border);

    for port in 1..=NUM_PORTS {
        let _ = write!(out, "|      {}      |", port);
        for &vid in &vids {
            let mark = if topology.default_vlan.get(&port) == Some(&vid) {
                '*'
            } else if topology.is_tagged(port, vid) {
                't'
            } else {
                ' '
            };
            let _ = write!(out, "   {}   |", mark);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "{}", border);
    out.push_str("(t) tagged, (*) untagged\n");
    out
}

/// Print the port × VLAN matrix of `topology`
pub fn print_vlan_table(topology: &VlanTopology) {
    print!("{}", format_vlan_table(topology));
}
