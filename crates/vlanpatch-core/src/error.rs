//! Error types for vlanpatch-core
//!
//! `FormatError` and `ConfigError` are small `Copy` enums usable without
//! `std`. With the `std` feature they gain `Display` and
//! `std::error::Error` through `thiserror`, and the umbrella [`Error`] gets
//! an I/O variant.

/// Errors raised while validating or patching a firmware image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum FormatError {
    /// The header word does not carry the `0b10101` magic in its top bits
    #[cfg_attr(
        feature = "std",
        error("invalid magic 0x{header:04X} found at offset 0x{offset:x}")
    )]
    BadMagic {
        /// Offset of the header word
        offset: usize,
        /// The header word that was found
        header: u16,
    },

    /// The data offset points past the end of the image
    #[cfg_attr(
        feature = "std",
        error("data offset (0x{offset:x}) points past end of image ({len} bytes)")
    )]
    OffsetOutOfRange {
        /// Data offset that was selected
        offset: usize,
        /// Image length in bytes
        len: usize,
    },

    /// The image, or a record in it, ends before the data it must hold
    #[cfg_attr(
        feature = "std",
        error("image truncated: need {needed} bytes, have {len}")
    )]
    TruncatedImage {
        /// Number of bytes required
        needed: usize,
        /// Number of bytes available
        len: usize,
    },

    /// The new entry count no longer fits the 10-bit header field
    #[cfg_attr(
        feature = "std",
        error("write table overflow: {entries} entries exceed the maximum of {max}")
    )]
    TableOverflow {
        /// Entry count that would have been written
        entries: usize,
        /// Largest representable entry count
        max: u16,
    },

    /// A record in the write table uses an opcode this crate does not know
    #[cfg_attr(
        feature = "std",
        error("unknown opcode {opcode} at table offset 0x{offset:x}")
    )]
    UnknownOpcode {
        /// Offending opcode byte
        opcode: u8,
        /// Byte offset of the record within the decoded stream
        offset: usize,
    },
}

/// Errors raised while parsing a VLAN configuration
///
/// Every variant carries the 1-based line number of the offending line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum ConfigError {
    /// The line is not of the form `port: vlans`
    #[cfg_attr(feature = "std", error("colon missing in line {line}"))]
    MissingColon {
        /// Line number
        line: usize,
    },

    /// A port or VLAN token is not an integer
    #[cfg_attr(feature = "std", error("invalid number in line {line}"))]
    InvalidNumber {
        /// Line number
        line: usize,
    },

    /// Port number outside 1..=8
    #[cfg_attr(
        feature = "std",
        error("port number {port} out of range in line {line}")
    )]
    PortOutOfRange {
        /// Line number
        line: usize,
        /// Port number as written
        port: i64,
    },

    /// VLAN id outside 0..=4094
    #[cfg_attr(feature = "std", error("invalid vlan id {vlan} in line {line}"))]
    VlanOutOfRange {
        /// Line number
        line: usize,
        /// VLAN id as written
        vlan: i64,
    },

    /// A port was given a second untagged VLAN
    #[cfg_attr(
        feature = "std",
        error("port {port} has more than one untagged vlan (line {line})")
    )]
    DuplicateDefaultVlan {
        /// Line number
        line: usize,
        /// Port number
        port: u8,
    },

    /// A port's untagged VLAN is also listed as tagged on that port
    #[cfg_attr(
        feature = "std",
        error("untagged vlan {vlan} also present as tagged vlan on port {port} (line {line})")
    )]
    DefaultVlanAlsoTagged {
        /// Line number
        line: usize,
        /// Port number
        port: u8,
        /// VLAN id
        vlan: u16,
    },
}

impl ConfigError {
    /// Line number the error was found on
    pub fn line(&self) -> usize {
        match *self {
            Self::MissingColon { line }
            | Self::InvalidNumber { line }
            | Self::PortOutOfRange { line, .. }
            | Self::VlanOutOfRange { line, .. }
            | Self::DuplicateDefaultVlan { line, .. }
            | Self::DefaultVlanAlsoTagged { line, .. } => line,
        }
    }
}

/// Any error produced by this crate
#[derive(Debug)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum Error {
    /// The firmware image is malformed or cannot hold the patch
    #[cfg_attr(feature = "std", error("image format error: {0}"))]
    Format(FormatError),

    /// The VLAN configuration is invalid
    #[cfg_attr(feature = "std", error("configuration error: {0}"))]
    Config(ConfigError),

    /// Reading or writing a file failed
    #[cfg(feature = "std")]
    #[cfg_attr(feature = "std", error("I/O error: {0}"))]
    Io(std::io::Error),
}

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Error::Format(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Result type alias using the umbrella [`Error`]
pub type Result<T> = core::result::Result<T, Error>;
