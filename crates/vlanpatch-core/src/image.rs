//! Firmware image handling
//!
//! The image carries a register write table that the switch replays at
//! boot. The table starts with a 16-bit little-endian header word:
//!
//! ```text
//!  15      11   10    9                 0
//! +----------+-------+-------------------+
//! |  10101b  | speed |      entries      |
//! +----------+-------+-------------------+
//! ```
//!
//! followed by `entries` 16-bit words of opcode records (see
//! [`crate::encoder`]). New operations are appended directly after the
//! existing records and the entry count is bumped accordingly.

use alloc::vec::Vec;

use crate::encoder;
use crate::error::FormatError;
use crate::integrity::{self, ImageCheck};
use crate::op::{Operation, OperationLog, Width};

/// Offset of the firmware marker byte
pub const MARKER_OFFSET: usize = 0x104;

/// Value of the firmware marker byte
pub const MARKER: u8 = 0xA5;

/// Data offset used when the firmware marker is present
pub const LATE_DATA_OFFSET: usize = 0x5000;

/// Magic value in the top 5 bits of the header word
pub const HEADER_MAGIC: u16 = 0x15;

/// Largest entry count the 10-bit header field can hold
pub const MAX_ENTRIES: u16 = 0x3FF;

/// Size of the header word
const HEADER_SIZE: usize = 2;

/// How the data offset was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOffset {
    /// The firmware marker was found; the table is at [`LATE_DATA_OFFSET`]
    Marker,
    /// No marker; the table is assumed to start at offset 0
    ///
    /// This layout has not been verified on hardware.
    Fallback,
}

impl DataOffset {
    /// Byte offset of the write table header
    pub const fn offset(self) -> usize {
        match self {
            Self::Marker => LATE_DATA_OFFSET,
            Self::Fallback => 0,
        }
    }

    /// Check if this offset was confirmed by the firmware marker
    pub const fn is_verified(self) -> bool {
        matches!(self, Self::Marker)
    }
}

/// A loaded firmware image and the operations pending for it
#[derive(Debug, Clone)]
pub struct Image {
    raw: Vec<u8>,
    offset_source: DataOffset,
    entries: u16,
    speed_mode: bool,
    check: ImageCheck,
    ops: OperationLog,
}

impl Image {
    /// Validate a raw image and take ownership of it
    pub fn load(raw: Vec<u8>) -> Result<Self, FormatError> {
        if raw.len() <= MARKER_OFFSET {
            return Err(FormatError::TruncatedImage {
                needed: MARKER_OFFSET + 1,
                len: raw.len(),
            });
        }

        let check = integrity::check_image(&raw);
        if let ImageCheck::Unknown { digest } = &check {
            log::warn!(
                "Unknown image (sha256 {}); it has not been tested and may not boot after patching",
                digest
            );
        }

        let offset_source = if raw[MARKER_OFFSET] == MARKER {
            log::info!("Firmware marker found, using late data offset");
            DataOffset::Marker
        } else {
            log::warn!("No firmware marker found, assuming data starts at 0. This is untested.");
            DataOffset::Fallback
        };

        let data_offset = offset_source.offset();
        if data_offset + HEADER_SIZE >= raw.len() {
            return Err(FormatError::OffsetOutOfRange {
                offset: data_offset,
                len: raw.len(),
            });
        }

        let header = u16::from_le_bytes([raw[data_offset], raw[data_offset + 1]]);
        if header >> 11 != HEADER_MAGIC {
            return Err(FormatError::BadMagic {
                offset: data_offset,
                header,
            });
        }

        let entries = header & MAX_ENTRIES;
        let speed_mode = (header >> 10) & 1 == 1;
        log::info!(
            "Found valid data header with {} entries and speed mode {}",
            entries,
            u8::from(speed_mode)
        );

        Ok(Self {
            raw,
            offset_source,
            entries,
            speed_mode,
            check,
            ops: OperationLog::new(),
        })
    }

    /// Byte offset of the write table header
    pub fn data_offset(&self) -> usize {
        self.offset_source.offset()
    }

    /// How the data offset was determined
    pub fn offset_source(&self) -> DataOffset {
        self.offset_source
    }

    /// Number of 16-bit words in the existing write table
    pub fn entries(&self) -> u16 {
        self.entries
    }

    /// Speed mode flag from the header
    pub fn speed_mode(&self) -> bool {
        self.speed_mode
    }

    /// Result of the known-image check done at load time
    pub fn check(&self) -> &ImageCheck {
        &self.check
    }

    /// The image as loaded
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Operations pending for this image
    pub fn ops(&self) -> &OperationLog {
        &self.ops
    }

    /// Mutable access to the pending operations
    pub fn ops_mut(&mut self) -> &mut OperationLog {
        &mut self.ops
    }

    /// Queue a register write
    pub fn set(&mut self, page: u8, addr: u8, value: u64, width: Width) {
        self.ops.append(page, addr, value, width);
    }

    /// Queue an 8-bit register write
    pub fn set8(&mut self, page: u8, addr: u8, value: u8) {
        self.ops.set8(page, addr, value);
    }

    /// Queue a 16-bit register write
    pub fn set16(&mut self, page: u8, addr: u8, value: u16) {
        self.ops.set16(page, addr, value);
    }

    /// Queue a 32-bit register write
    pub fn set32(&mut self, page: u8, addr: u8, value: u32) {
        self.ops.set32(page, addr, value);
    }

    /// Queue a 64-bit register write
    pub fn set64(&mut self, page: u8, addr: u8, value: u64) {
        self.ops.set64(page, addr, value);
    }

    /// Discard all queued operations
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Byte range of the existing write table records
    fn table_range(&self) -> core::ops::Range<usize> {
        let start = self.data_offset() + HEADER_SIZE;
        start..start + usize::from(self.entries) * 2
    }

    /// Decode the records already present in the image
    pub fn existing_table(&self) -> Result<Vec<Operation>, FormatError> {
        let range = self.table_range();
        let table = self.raw.get(range.clone()).ok_or(FormatError::TruncatedImage {
            needed: range.end,
            len: self.raw.len(),
        })?;
        encoder::decode(table)
    }

    /// Build the patched image
    ///
    /// The queued operations are encoded and written directly after the
    /// existing table, overwriting whatever the image holds there; the
    /// image is never grown. The loaded image itself is left untouched.
    pub fn save(&self) -> Result<Vec<u8>, FormatError> {
        let encoded = encoder::encode(&self.ops);
        log::debug!("appending {} bytes of new data", encoded.len());

        let new_entries = usize::from(self.entries) + encoded.len() / 2;
        if new_entries > usize::from(MAX_ENTRIES) {
            return Err(FormatError::TableOverflow {
                entries: new_entries,
                max: MAX_ENTRIES,
            });
        }

        let append_at = self.table_range().end;
        let append_end = append_at + encoded.len();
        if append_end > self.raw.len() {
            return Err(FormatError::TruncatedImage {
                needed: append_end,
                len: self.raw.len(),
            });
        }

        let header = (HEADER_MAGIC << 11) | (u16::from(self.speed_mode) << 10) | new_entries as u16;

        let mut img = self.raw.clone();
        let data_offset = self.data_offset();
        img[data_offset..data_offset + HEADER_SIZE].copy_from_slice(&header.to_le_bytes());
        img[append_at..append_end].copy_from_slice(&encoded);

        Ok(img)
    }
}

#[cfg(feature = "std")]
impl Image {
    /// Load and validate an image file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let raw = std::fs::read(path)?;
        Ok(Self::load(raw)?)
    }

    /// Write the patched image to a file
    ///
    /// The complete image is assembled in memory before the file is opened.
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> crate::Result<()> {
        let img = self.save()?;
        std::fs::write(path, img)?;
        Ok(())
    }
}
