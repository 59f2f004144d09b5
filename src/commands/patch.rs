//! Patch command implementation

use std::path::Path;

use vlanpatch_core::config;
use vlanpatch_core::image::Image;
use vlanpatch_core::vlan;

use super::table::print_vlan_table;

/// Parse `config`, program it into the image at `input` and write `output`
///
/// The configuration is parsed before the image is read, so nothing is
/// touched when it is invalid.
pub fn run(input: &Path, config: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let topology = config::parse_config_file(config)?;

    println!("Generated VLAN table:");
    print_vlan_table(&topology);
    println!();

    println!("Applying config");
    let mut img = Image::from_file(input)?;
    if !img.offset_source().is_verified() {
        println!(
            "Warning: no firmware marker found, using data offset 0x{:x} (unverified)",
            img.data_offset()
        );
    }

    match img.existing_table() {
        Ok(table) => log::debug!("Existing write table holds {} operations", table.len()),
        Err(e) => log::debug!("Could not decode existing write table: {}", e),
    }

    vlan::program(img.ops_mut(), &topology);
    img.save_to_file(output)?;
    log::info!("Wrote {} operations to {:?}", img.ops().len(), output);

    println!("Done");
    Ok(())
}
