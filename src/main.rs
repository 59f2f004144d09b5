//! vlanpatch - Patch VLAN tables into managed switch firmware
//!
//! The switch replays a table of register writes stored in its firmware
//! image at boot. vlanpatch appends the writes that enable 802.1Q VLANs and
//! program the VLAN table described by a small configuration file, and
//! writes the result to a new image.
//!
//! # Exit codes
//!
//! - `0` - image written (or `--help`/`--version`)
//! - `1` - usage error, invalid configuration, unusable image or I/O error

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not errors
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    if let Err(e) = commands::patch::run(&cli.input, &cli.config, &cli.output) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
