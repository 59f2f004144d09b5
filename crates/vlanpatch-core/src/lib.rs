//! vlanpatch-core - Core library for patching switch firmware images
//!
//! This crate implements the on-image register write table used by a family
//! of managed switches, and the translation from a VLAN topology into the
//! register writes that program it. It is `no_std` compatible (it needs
//! `alloc`); the `std` feature adds file I/O and `std::error::Error` impls.
//!
//! # Features
//!
//! - `std` - Enable standard library support (file helpers, error traits)
//!
//! # Example
//!
//! ```ignore
//! use vlanpatch_core::{config, image::Image, vlan};
//!
//! let topology = config::parse_config("1: 10\n2: 10t 20\n")?;
//! let mut img = Image::from_file("switch.img")?;
//! vlan::program(img.ops_mut(), &topology);
//! img.save_to_file("patched.img")?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod encoder;
pub mod error;
pub mod image;
pub mod integrity;
pub mod op;
pub mod regs;
pub mod vlan;

pub use error::{ConfigError, Error, FormatError, Result};
