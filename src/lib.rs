/*
    edskit
    https://github.com/dbalsom/edskit

    Copyright 2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------
*/

//! # edskit
//!
//! edskit is a Rust library for archiving and inspecting floppy disk images in
//! the Amstrad CPC DSK and Extended DSK (EDSK) container formats.
//!
//! It parses a container into an immutable sector index with per-sector FDC
//! health (ST1/ST2 status registers, truncation, missing tracks), projects the
//! physical sector layout into a flat LBA stream, and walks any FAT12
//! filesystem layered inside - including long filename reassembly and a
//! best-effort undelete pass over tombstoned directory entries.
//!
//! The main interface is a [`DiskImage`], created by loading a container byte
//! buffer. A [`DiskCache`] keyed by image filename sits in front of parsing
//! for server-style callers, and the `acquisition` feature adds a
//! [`acquisition::Greaseweazle`] coordinator that drives the external `gw`
//! tool to capture fresh images from physical media.

mod boot_sector;
mod cache;
mod chs;
pub mod fdc;
pub mod file_parsers;
pub mod file_system;
mod sector_view;
pub mod util;

#[cfg(feature = "acquisition")]
pub mod acquisition;

use thiserror::Error;

/// Size of the disk information block at the head of a DSK/EDSK container.
pub const DISK_HEADER_SIZE: usize = 256;
/// Size of the track information block at the head of every formatted track.
pub const TRACK_HEADER_SIZE: usize = 256;
pub const MAXIMUM_SECTOR_SIZE: usize = 8192;
pub const DEFAULT_SECTOR_SIZE: usize = 512;

#[derive(Clone, Debug, Error)]
pub enum DiskImageError {
    #[error("An IO error occurred reading or writing the disk image: {0}")]
    IoError(String),
    #[error("The disk image is empty")]
    EmptyImage,
    #[error("The header does not match a DSK or Extended DSK signature")]
    UnknownSignature,
    #[error("The disk header declares zero tracks or zero sides")]
    InvalidGeometry,
    #[error("Track data extends past the end of the image")]
    OutOfBounds,
    #[error("A track's declared size is smaller than its header")]
    TrackHeaderTooSmall,
}

// Manually implement `From<io::Error>` for `DiskImageError`
impl From<std::io::Error> for DiskImageError {
    fn from(err: std::io::Error) -> Self {
        DiskImageError::IoError(err.to_string())
    }
}

// Manually implement `From<binrw::Error>` for `DiskImageError`
impl From<binrw::Error> for DiskImageError {
    fn from(err: binrw::Error) -> Self {
        DiskImageError::IoError(err.to_string())
    }
}

pub use crate::{
    boot_sector::{detect_filesystem, bpb::BiosParameterBlock, DiskFilesystem},
    cache::DiskCache,
    chs::{DiskCh, SectorId},
    file_parsers::{
        dsk::{DiskImage, SectorEntry, TrackEntry, TrackInfo},
        format_from_ext,
        supported_extensions,
        DiskImageFileFormat,
        TrackDataEncoding,
        TrackDataRate,
    },
    file_system::{fat12::Fat12Volume, DeletedEntry, DirEntry, FatAttributes, FileSystemError},
    sector_view::FlatImage,
};

pub mod prelude {
    pub use crate::{
        detect_filesystem,
        fdc::{St1Flags, St2Flags},
        BiosParameterBlock,
        DeletedEntry,
        DirEntry,
        DiskCache,
        DiskCh,
        DiskFilesystem,
        DiskImage,
        DiskImageError,
        DiskImageFileFormat,
        Fat12Volume,
        FatAttributes,
        FileSystemError,
        FlatImage,
        SectorEntry,
        SectorId,
        TrackEntry,
    };

    #[cfg(feature = "acquisition")]
    pub use crate::acquisition::{AcquisitionError, CancelToken, Greaseweazle, ReadOptions};
}
