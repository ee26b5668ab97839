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

    src/boot_sector/bpb.rs

    The BIOS Parameter Block. This structure was present from DOS 2.0
    onwards, although it was expanded with almost every DOS release. The BPB
    encodes the media geometry and filesystem layout; every FAT12 offset
    computation in this crate derives from it.
*/

use crate::util::ascii_field;
use binrw::binrw;

/// Offset of the OEM name in the boot sector; the BPB proper follows it.
pub const OEM_OFFSET: u64 = 0x03;

/// The boot sector fields from the OEM name through the DOS 3.31/4.0
/// extended boot signature block, decoded at the DOS-standard offsets.
#[derive(Clone, Debug, Default)]
#[binrw]
#[brw(little)]
pub struct BiosParameterBlock {
    pub(crate) oem: [u8; 8],
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_count: u8,
    pub root_entries: u16,
    pub(crate) total_sectors_16: u16,
    pub media_descriptor: u8,
    pub sectors_per_fat: u16,
    pub sectors_per_track: u16,
    pub heads: u16,
    pub hidden_sectors: u32,
    pub(crate) total_sectors_32: u32,
    pub drive_number: u8,
    #[allow(dead_code)]
    pub(crate) reserved: u8,
    pub boot_signature: u8,
    pub volume_id: u32,
    pub(crate) volume_label: [u8; 11],
    pub(crate) fs_type: [u8; 8],
}

impl BiosParameterBlock {
    /// Total sector count, folding the 16-bit field with its 32-bit fallback
    /// (the 16-bit field reads zero on larger media).
    pub fn total_sectors(&self) -> u32 {
        if self.total_sectors_16 != 0 {
            self.total_sectors_16 as u32
        }
        else {
            self.total_sectors_32
        }
    }

    pub fn oem(&self) -> String {
        ascii_field(&self.oem)
    }

    pub fn volume_label(&self) -> String {
        ascii_field(&self.volume_label)
    }

    pub fn fs_type(&self) -> String {
        ascii_field(&self.fs_type)
    }

    /// Perform a sanity check on the BPB parameters. This should return true
    /// for any standard floppy format from 160K to 2.88MB.
    pub fn is_valid(&self) -> bool {
        if self.bytes_per_sector < 128 || self.bytes_per_sector > 4096 {
            return false;
        }
        if self.sectors_per_cluster == 0 {
            return false;
        }
        if self.fat_count == 0 || self.fat_count > 2 {
            return false;
        }
        if self.root_entries == 0 {
            return false;
        }
        if self.total_sectors() == 0 || self.total_sectors() > 5760 {
            return false;
        }
        if self.sectors_per_fat < 1 || self.sectors_per_fat > 9 {
            return false;
        }
        true
    }
}
