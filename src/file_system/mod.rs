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
use bitflags::bitflags;
use thiserror::Error;

use crate::file_system::date_time::FsDateTime;

pub mod date_time;
pub mod fat12;

#[derive(Clone, Debug, Error)]
pub enum FileSystemError {
    #[error("The image does not contain a FAT filesystem")]
    NotFatFilesystem,
    #[error("Invalid cluster {0}")]
    InvalidCluster(u16),
}

bitflags! {
    /// FAT directory entry attribute bits.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[rustfmt::skip]
    pub struct FatAttributes: u8 {
        const READ_ONLY     = 0b0000_0001;
        const HIDDEN        = 0b0000_0010;
        const SYSTEM        = 0b0000_0100;
        const VOLUME_LABEL  = 0b0000_1000;
        const DIRECTORY     = 0b0001_0000;
        const ARCHIVE       = 0b0010_0000;
    }
}

/// A logical directory entry. `name` is the long filename when one was
/// recorded, the 8.3 short name otherwise. `path` is the fully qualified
/// location within the disk, `/`-joined, with no leading slash for root
/// entries.
#[derive(Clone, Debug)]
pub struct DirEntry {
    pub name: String,
    pub short_name: String,
    pub long_name: Option<String>,
    pub attributes: FatAttributes,
    pub size: u32,
    /// First cluster of the entry's chain.
    pub cluster: u16,
    pub modified: FsDateTime,
    pub path: String,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.attributes.contains(FatAttributes::DIRECTORY)
    }

    pub fn is_hidden(&self) -> bool {
        self.attributes.contains(FatAttributes::HIDDEN)
    }

    pub fn is_system(&self) -> bool {
        self.attributes.contains(FatAttributes::SYSTEM)
    }

    pub fn is_read_only(&self) -> bool {
        self.attributes.contains(FatAttributes::READ_ONLY)
    }

    pub fn is_volume_label(&self) -> bool {
        self.attributes.contains(FatAttributes::VOLUME_LABEL)
    }

    /// True for the `.` and `..` bookkeeping entries a subdirectory starts
    /// with.
    pub fn is_synthetic(&self) -> bool {
        self.short_name == "." || self.short_name == ".."
    }
}

/// A tombstoned directory entry, as found by the undelete scan. The first
/// character of the short name was destroyed by deletion and is shown as
/// `?`.
#[derive(Clone, Debug)]
pub struct DeletedEntry {
    pub entry: DirEntry,
    /// Whether the contiguous-allocation heuristic judges the file
    /// recoverable.
    pub recoverable: bool,
    /// Human-readable verdict, e.g. "3 clusters free" or
    /// "Only 1/3 clusters free".
    pub reason: String,
}
