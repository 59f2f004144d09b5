//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vlanpatch")]
#[command(author, version, about = "Patch a VLAN table into a switch firmware image", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Firmware image to patch
    pub input: PathBuf,

    /// VLAN configuration file (lines of `port: vlan[t] ...`)
    pub config: PathBuf,

    /// Where to write the patched image
    pub output: PathBuf,
}

impl Cli {
    /// Default log filter for the requested verbosity
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
