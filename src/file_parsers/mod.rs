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
use std::fmt::{self, Display, Formatter};

pub mod dsk;

/// The container format a disk image was parsed from. Both variants share the
/// same 256-byte disk information block; they differ in how per-track sizes
/// are declared and in per-sector size overrides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiskImageFileFormat {
    /// Standard CPCEMU DSK: one uniform track size for the whole image.
    Dsk,
    /// Extended CPC DSK: per-track size table, variable sector sizes, and
    /// missing (unformatted) track slots.
    Edsk,
}

impl Display for DiskImageFileFormat {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            DiskImageFileFormat::Dsk => write!(f, "DSK (CPCEMU)"),
            DiskImageFileFormat::Edsk => write!(f, "Extended DSK"),
        }
    }
}

/// Data rate byte from the track information block. Zero is common in the
/// wild; the field was a late addition to the format.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TrackDataRate {
    #[default]
    Unknown,
    Rate250Kbps,
    Rate500Kbps,
    Rate1000Kbps,
}

impl From<u8> for TrackDataRate {
    fn from(byte: u8) -> Self {
        match byte {
            1 => TrackDataRate::Rate250Kbps,
            2 => TrackDataRate::Rate500Kbps,
            3 => TrackDataRate::Rate1000Kbps,
            _ => TrackDataRate::Unknown,
        }
    }
}

impl Display for TrackDataRate {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TrackDataRate::Unknown => write!(f, "Unknown"),
            TrackDataRate::Rate250Kbps => write!(f, "250Kbps"),
            TrackDataRate::Rate500Kbps => write!(f, "500Kbps"),
            TrackDataRate::Rate1000Kbps => write!(f, "1000Kbps"),
        }
    }
}

/// Recording mode byte from the track information block.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TrackDataEncoding {
    #[default]
    Unknown,
    Fm,
    Mfm,
}

impl From<u8> for TrackDataEncoding {
    fn from(byte: u8) -> Self {
        match byte {
            1 => TrackDataEncoding::Fm,
            2 => TrackDataEncoding::Mfm,
            _ => TrackDataEncoding::Unknown,
        }
    }
}

impl Display for TrackDataEncoding {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TrackDataEncoding::Unknown => write!(f, "Unknown"),
            TrackDataEncoding::Fm => write!(f, "FM"),
            TrackDataEncoding::Mfm => write!(f, "MFM"),
        }
    }
}

/// Returns a list of advertised file extensions for images this library can
/// load. This is a convenience function for file dialogs and directory scans -
/// detection itself is based on content, not extension.
pub fn supported_extensions() -> Vec<&'static str> {
    dsk::DskFormat::extensions()
}

/// Returns the container format suggested by a file extension, if the
/// extension is recognized. `.img`/`.ima` dumps of CPC media are DSK
/// containers in practice.
pub fn format_from_ext(ext: &str) -> Option<DiskImageFileFormat> {
    match ext.to_lowercase().as_str() {
        "edsk" => Some(DiskImageFileFormat::Edsk),
        "dsk" | "img" | "ima" => Some(DiskImageFileFormat::Dsk),
        _ => None,
    }
}
