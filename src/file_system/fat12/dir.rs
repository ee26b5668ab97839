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

    src/file_system/fat12/dir.rs

    Directory record parsing. A directory is a buffer of 32-byte records:
    short-name entries, VFAT long-filename fragments (attribute 0x0F)
    preceding the short entry they decorate, 0xE5 tombstones, and a 0x00
    end marker.
*/

use crate::{
    file_system::{date_time::FsDateTime, DirEntry, FatAttributes},
    util::ascii_field,
};

pub(crate) const DIR_RECORD_LEN: usize = 32;
pub(crate) const DELETED_MARKER: u8 = 0xE5;
pub(crate) const END_MARKER: u8 = 0x00;
/// The attribute combination (RO|HIDDEN|SYSTEM|VOLUME) marking a VFAT long
/// filename fragment.
pub(crate) const LFN_ATTRIBUTES: u8 = 0x0F;

/// Reassembles long filenames from VFAT fragment records. Fragments appear
/// on disk in descending sequence order, the last (highest) fragment first
/// with bit 6 of its sequence byte set.
#[derive(Default)]
pub(crate) struct LfnAccumulator {
    slots: Vec<Option<String>>,
}

impl LfnAccumulator {
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }

    /// Record one fragment from its raw 32-byte record.
    pub(crate) fn push_fragment(&mut self, record: &[u8]) {
        let sequence = (record[0] & 0x3F) as usize;
        let is_last = record[0] & 0x40 != 0;

        if sequence == 0 {
            // Sequence numbers are 1-based; zero is malformed.
            return;
        }
        if is_last {
            // A fresh name starts with its final fragment; drop anything in
            // flight.
            self.clear();
        }

        if self.slots.len() < sequence {
            self.slots.resize(sequence, None);
        }
        self.slots[sequence - 1] = Some(lfn_fragment_text(record));
    }

    /// Concatenate the accumulated fragments in ascending sequence order and
    /// reset. Returns `None` when nothing was accumulated.
    pub(crate) fn take(&mut self) -> Option<String> {
        if self.slots.is_empty() {
            return None;
        }
        let name: String = self.slots.drain(..).flatten().collect();
        if name.is_empty() {
            None
        }
        else {
            Some(name)
        }
    }
}

/// Extract the UTF-16LE characters of one LFN fragment. The thirteen code
/// units live in three disjoint ranges of the record; 0x0000 terminates and
/// 0xFFFF pads.
fn lfn_fragment_text(record: &[u8]) -> String {
    let mut units: Vec<u16> = Vec::with_capacity(13);

    'outer: for range in [(1usize, 11usize), (14, 26), (28, 32)] {
        let mut offset = range.0;
        while offset < range.1 {
            let unit = u16::from_le_bytes([record[offset], record[offset + 1]]);
            if unit == 0x0000 || unit == 0xFFFF {
                break 'outer;
            }
            units.push(unit);
            offset += 2;
        }
    }

    String::from_utf16_lossy(&units)
}

/// Decode the 8.3 name of a short entry: name bytes 0-7, extension 8-10,
/// both space padded.
pub(crate) fn short_name(record: &[u8]) -> String {
    let name = ascii_field(&record[0..8]);
    let ext = ascii_field(&record[8..11]);
    if ext.is_empty() {
        name
    }
    else {
        format!("{}.{}", name, ext)
    }
}

/// Build a [DirEntry] from a short-name record. `path` is filled in by the
/// caller once its directory prefix is known.
pub(crate) fn parse_short_entry(record: &[u8], long_name: Option<String>) -> DirEntry {
    let short = short_name(record);
    let attributes = FatAttributes::from_bits_truncate(record[11]);
    let time = u16::from_le_bytes([record[22], record[23]]);
    let date = u16::from_le_bytes([record[24], record[25]]);
    let cluster = u16::from_le_bytes([record[26], record[27]]);
    let size = u32::from_le_bytes([record[28], record[29], record[30], record[31]]);

    DirEntry {
        name: long_name.clone().unwrap_or_else(|| short.clone()),
        short_name: short,
        long_name,
        attributes,
        size,
        cluster,
        modified: FsDateTime::from_dos(date, time),
        path: String::new(),
    }
}

/// Parse the live entries of a directory buffer, in record order. Long
/// filenames are reassembled onto the short entry that follows their
/// fragments. The `.` and `..` bookkeeping entries are included; consumers
/// that walk the tree filter them.
pub(crate) fn parse_directory(buf: &[u8]) -> Vec<DirEntry> {
    let mut entries = Vec::new();
    let mut lfn = LfnAccumulator::default();

    for record in buf.chunks_exact(DIR_RECORD_LEN) {
        match record[0] {
            END_MARKER => break,
            DELETED_MARKER => {
                // Tombstone. Any pending fragments belonged to it.
                lfn.clear();
            }
            _ if record[11] == LFN_ATTRIBUTES => {
                lfn.push_fragment(record);
            }
            _ => {
                let long_name = lfn.take();
                entries.push(parse_short_entry(record, long_name));
            }
        }
    }

    entries
}
