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

//! Boot sector inspection: classify what filesystem, if any, lives on a
//! parsed disk image.

pub mod bpb;

use std::io::Cursor;

use binrw::BinReaderExt;

use crate::{boot_sector::bpb::BiosParameterBlock, chs::DiskCh, DiskImage};

/// CPC data-format disks number their sectors 0xC1-0xC9.
const CPC_DATA_SECTOR_RANGE: std::ops::RangeInclusive<u8> = 0xC1..=0xC9;

/// What lives on a disk, as far as the boot sector tells.
#[derive(Clone, Debug)]
pub enum DiskFilesystem {
    /// A FAT boot sector with a decoded BIOS Parameter Block.
    Fat(BiosParameterBlock),
    /// CPC/AMSDOS sector numbering; identification only, not parsed further.
    Cpc { note: String },
    Unknown,
}

impl DiskFilesystem {
    pub fn is_fat(&self) -> bool {
        matches!(self, DiskFilesystem::Fat(_))
    }
}

/// Classify the filesystem on an image by inspecting the first sector of
/// track 0, side 0.
///
/// An x86 jump opcode (0xEB or 0xE9) at byte 0 marks a DOS boot sector and
/// the BPB is decoded from it. Otherwise, CPC-style sector numbering on
/// track 0 tags the disk as CPC. Anything else is unknown.
pub fn detect_filesystem(image: &DiskImage) -> DiskFilesystem {
    let Some(track) = image.track(DiskCh::new(0, 0)) else {
        return DiskFilesystem::Unknown;
    };

    let boot = track.sectors.first().and_then(|s| image.sector_data(s));

    if let Some(boot) = boot {
        if matches!(boot.first(), Some(0xEB) | Some(0xE9)) {
            let sector = &boot[..boot.len().min(512)];
            let mut reader = Cursor::new(sector);
            reader.set_position(bpb::OEM_OFFSET);
            match reader.read_le::<BiosParameterBlock>() {
                Ok(bpb) => {
                    log::debug!(
                        "detect_filesystem: FAT boot sector, oem {:?}, {} sectors",
                        bpb.oem(),
                        bpb.total_sectors()
                    );
                    return DiskFilesystem::Fat(bpb);
                }
                Err(e) => {
                    log::warn!("detect_filesystem: jump opcode but BPB unreadable: {}", e);
                }
            }
        }
    }

    if track.sectors.iter().any(|s| CPC_DATA_SECTOR_RANGE.contains(&s.id.r())) {
        return DiskFilesystem::Cpc {
            note: "CPC data-format sector ids (0xC1-0xC9); AMSDOS/CP-M not decoded".to_string(),
        };
    }

    DiskFilesystem::Unknown
}
