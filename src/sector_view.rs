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

    src/sector_view.rs

    Projects the physical CHS layout of a parsed container into a contiguous
    logical byte stream, addressed as if by LBA:

        lba = (track * sides + side) * sectors_per_track + (r - r_min)

    Filesystems assume dense LBA addressing. Sectors are sorted by record id
    within each track, missing tracks are replaced by zero fill, and sectors
    without a placement contribute zero fill of their declared size, so every
    downstream byte offset stays aligned and partial images still produce
    partial results.
*/

use crate::DiskImage;

/// A materialized flat view of a disk image. Geometry (sector size and
/// sectors per track) is taken from the first formatted track that has at
/// least one sector; heterogeneous images are not faithfully flattened.
pub struct FlatImage {
    data: Vec<u8>,
    sector_bytes: usize,
    sectors_per_track: usize,
}

impl FlatImage {
    pub fn from_image(image: &DiskImage) -> FlatImage {
        let Some(reference) = image
            .track_entries()
            .iter()
            .find(|t| !t.missing && !t.sectors.is_empty())
        else {
            log::debug!("from_image: no formatted track with sectors; empty flat image");
            return FlatImage {
                data: Vec::new(),
                sector_bytes: 0,
                sectors_per_track: 0,
            };
        };

        let sector_bytes = reference.sectors[0].size;
        let sectors_per_track = reference.info.as_ref().map_or(reference.sectors.len(), |i| i.sector_ct as usize);

        let mut data = Vec::with_capacity(image.track_entries().len() * sectors_per_track * sector_bytes);

        for track in image.track_entries() {
            if track.missing {
                // Keep LBA alignment across the gap.
                data.resize(data.len() + sectors_per_track * sector_bytes, 0);
                continue;
            }

            let mut sectors = track.sectors.clone();
            sectors.sort_by_key(|s| s.id.r());

            for sector in &sectors {
                match image.sector_data(sector) {
                    Some(slice) => data.extend_from_slice(slice),
                    None => data.resize(data.len() + sector.size, 0),
                }
            }
        }

        FlatImage {
            data,
            sector_bytes,
            sectors_per_track,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sector size of the reference track, in bytes.
    pub fn sector_bytes(&self) -> usize {
        self.sector_bytes
    }

    /// Sector count of the reference track.
    pub fn sectors_per_track(&self) -> usize {
        self.sectors_per_track
    }
}
