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

    src/file_parsers/dsk.rs

    Parser for the CPCEMU DSK and Extended DSK (EDSK) container formats.

    A container is a 256-byte disk information block followed by concatenated
    tracks. Each formatted track is a 256-byte track information block holding
    up to 29 eight-byte sector descriptors, followed by the sector payloads in
    declaration order. EDSK adds a per-track size table (zero = unformatted
    slot) and per-sector actual sizes for weak and oversized sectors.

    The parser builds an index over the source buffer; sector payloads are
    handed out as borrowed slices, never copied.
*/
use std::io::{Cursor, Seek, SeekFrom};

use binrw::{binrw, BinReaderExt};

use crate::{
    chs::{DiskCh, SectorId},
    fdc::{status_flag_names, St1Flags, St2Flags},
    file_parsers::DiskImageFileFormat,
    util::ascii_field,
    DiskImageError,
    DISK_HEADER_SIZE,
    TRACK_HEADER_SIZE,
};

pub const EDSK_SIGNATURE: &str = "EXTENDED CPC DSK File";
pub const DSK_SIGNATURE: &str = "MV - CPC";

/// Offset of the EDSK per-track size table within the disk information block.
const TRACK_SIZE_TABLE_OFFSET: usize = 0x34;
/// At most 29 eight-byte sector descriptors fit a 256-byte track header.
const MAX_TRACK_SECTORS: usize = (TRACK_HEADER_SIZE - 0x18) / 8;

pub struct DskFormat;

#[derive(Debug)]
#[binrw]
#[brw(little)]
struct DiskInfoBlock {
    signature:  [u8; 34],
    creator:    [u8; 14],
    tracks:     u8,
    sides:      u8,
    track_size: u16,
}

#[derive(Debug)]
#[binrw]
#[brw(little)]
struct TrackInfoBlock {
    signature: [u8; 12],
    #[allow(dead_code)]
    unused: [u8; 4],
    track: u8,
    side: u8,
    data_rate: u8,
    recording_mode: u8,
    sector_size: u8,
    sector_ct: u8,
    gap3: u8,
    filler: u8,
}

#[derive(Debug)]
#[binrw]
#[brw(little)]
struct SectorInfoBlock {
    c: u8,
    h: u8,
    r: u8,
    n: u8,
    st1: u8,
    st2: u8,
    actual_size: u16,
}

/// Per-track parameters decoded from a track information block.
#[derive(Clone, Debug)]
pub struct TrackInfo {
    /// Track number as written by the formatter (informational).
    pub track: u8,
    /// Side number as written by the formatter (informational).
    pub side: u8,
    pub data_rate: crate::file_parsers::TrackDataRate,
    pub recording_mode: crate::file_parsers::TrackDataEncoding,
    /// Default sector size code (N) for the track.
    pub sector_size_code: u8,
    pub sector_ct: u8,
    pub gap3: u8,
    pub filler: u8,
}

/// One sector descriptor, with its payload located by absolute offset into
/// the image buffer.
#[derive(Clone, Debug)]
pub struct SectorEntry {
    /// The CHRN quartet from the sector's ID field.
    pub id: SectorId,
    pub st1: St1Flags,
    pub st2: St2Flags,
    /// Effective payload size in bytes. EDSK records an actual size that
    /// overrides the size implied by N; zero falls back to `128 << N`.
    pub size: usize,
    /// Absolute offset of the payload in the image buffer. `None` when the
    /// sector could not be placed (a prior sector overran the track).
    pub data_offset: Option<usize>,
    /// Set when this sector's payload crosses its track boundary.
    pub truncated: bool,
}

impl SectorEntry {
    /// The size implied by the descriptor's N size code.
    pub fn expected_size(&self) -> usize {
        self.id.n_size()
    }

    /// True if the FDC recorded any error bit for this sector.
    pub fn has_error(&self) -> bool {
        !self.st1.is_empty() || !self.st2.is_empty()
    }

    /// Names of all recorded status bits, for listings.
    pub fn error_flags(&self) -> Vec<&'static str> {
        status_flag_names(self.st1, self.st2)
    }
}

/// One physical track slot of the container, in `(track, side)` row-major
/// order with side varying fastest.
#[derive(Clone, Debug)]
pub struct TrackEntry {
    pub ch: DiskCh,
    /// True for an unformatted EDSK slot (size table byte of zero). Missing
    /// tracks occupy no bytes in the container.
    pub missing: bool,
    /// Absolute offset of the track information block, when present.
    pub offset: Option<usize>,
    /// Raw size of the track slot including its 256-byte header.
    pub size: usize,
    pub info: Option<TrackInfo>,
    pub sectors: Vec<SectorEntry>,
}

/// A parsed DSK/EDSK container: an immutable index over the source buffer.
/// Sector payloads are borrowed from the buffer via [`DiskImage::sector_data`]
/// and [`DiskImage::read_sector`].
pub struct DiskImage {
    format: DiskImageFileFormat,
    creator: String,
    tracks: u8,
    sides: u8,
    track_entries: Vec<TrackEntry>,
    data: Vec<u8>,
}

impl DiskImage {
    /// Detect the container format from a signature prefix without parsing.
    pub fn detect_format(buf: &[u8]) -> Result<DiskImageFileFormat, DiskImageError> {
        if buf.is_empty() {
            return Err(DiskImageError::EmptyImage);
        }
        DskFormat::detect(buf).ok_or(DiskImageError::UnknownSignature)
    }

    /// Parse a container, taking ownership of the buffer.
    pub fn load(buf: Vec<u8>) -> Result<DiskImage, DiskImageError> {
        DskFormat::load_image(buf)
    }

    pub fn format(&self) -> DiskImageFileFormat {
        self.format
    }

    /// The creator string from the disk information block, NUL-stripped and
    /// trimmed.
    pub fn creator(&self) -> &str {
        &self.creator
    }

    pub fn tracks(&self) -> u8 {
        self.tracks
    }

    pub fn sides(&self) -> u8 {
        self.sides
    }

    /// All track slots in `(track, side)` row-major order, side fastest.
    pub fn track_entries(&self) -> &[TrackEntry] {
        &self.track_entries
    }

    /// The raw image buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Find the track entry for an exact physical track and side.
    pub fn track(&self, ch: DiskCh) -> Option<&TrackEntry> {
        self.track_entries.iter().find(|t| t.ch == ch)
    }

    /// The payload slice for a sector entry, when it was placed within the
    /// image.
    pub fn sector_data(&self, sector: &SectorEntry) -> Option<&[u8]> {
        let offset = sector.data_offset?;
        let end = offset.checked_add(sector.size)?;
        self.data.get(offset..end)
    }

    /// Read a sector by physical track, side and record id. Returns the first
    /// sector on the track whose R matches; C/H mismatches in the ID field are
    /// deliberately not filtered, as copy-protected disks lie about them.
    pub fn read_sector(&self, ch: DiskCh, r: u8) -> Option<&[u8]> {
        let track = self.track(ch)?;
        let sector = track.sectors.iter().find(|s| s.id.r() == r)?;
        self.sector_data(sector)
    }
}

impl DskFormat {
    pub fn extensions() -> Vec<&'static str> {
        vec!["dsk", "edsk", "img", "ima"]
    }

    /// Match the signature prefix at the head of the disk information block.
    pub fn detect(buf: &[u8]) -> Option<DiskImageFileFormat> {
        let sig_len = EDSK_SIGNATURE.len().min(buf.len());
        let sig = ascii_field(&buf[0..sig_len]);
        if sig.starts_with(EDSK_SIGNATURE) {
            Some(DiskImageFileFormat::Edsk)
        }
        else if sig.starts_with(DSK_SIGNATURE) {
            Some(DiskImageFileFormat::Dsk)
        }
        else {
            None
        }
    }

    pub fn load_image(buf: Vec<u8>) -> Result<DiskImage, DiskImageError> {
        if buf.is_empty() {
            return Err(DiskImageError::EmptyImage);
        }
        if buf.len() < DISK_HEADER_SIZE {
            return Err(DiskImageError::UnknownSignature);
        }

        let mut reader = Cursor::new(&buf);
        let header: DiskInfoBlock = reader.read_le()?;

        let signature = ascii_field(&header.signature);
        let format = if signature.starts_with(EDSK_SIGNATURE) {
            DiskImageFileFormat::Edsk
        }
        else if signature.starts_with(DSK_SIGNATURE) {
            DiskImageFileFormat::Dsk
        }
        else {
            log::debug!("load_image: Unrecognized signature: {:?}", signature);
            return Err(DiskImageError::UnknownSignature);
        };

        if header.tracks == 0 || header.sides == 0 {
            return Err(DiskImageError::InvalidGeometry);
        }

        let creator = ascii_field(&header.creator);
        let slot_ct = header.tracks as usize * header.sides as usize;

        log::debug!(
            "load_image: {} creator: {:?} tracks: {} sides: {}",
            format,
            creator,
            header.tracks,
            header.sides
        );

        // Per-slot sizes. EDSK stores one byte per slot (a multiplier of 256,
        // zero meaning an unformatted track); standard DSK stores a single
        // uniform multiplier for every slot.
        let slot_sizes: Vec<usize> = match format {
            DiskImageFileFormat::Edsk => (0..slot_ct)
                .map(|i| {
                    buf.get(TRACK_SIZE_TABLE_OFFSET + i)
                        .map_or(0, |&b| b as usize * 256)
                })
                .collect(),
            DiskImageFileFormat::Dsk => {
                vec![header.track_size as usize * 256; slot_ct]
            }
        };

        let mut track_entries = Vec::with_capacity(slot_ct);
        let mut cursor = DISK_HEADER_SIZE;

        for (slot, &slot_size) in slot_sizes.iter().enumerate() {
            let ch = DiskCh::new((slot / header.sides as usize) as u8, (slot % header.sides as usize) as u8);

            if slot_size == 0 {
                // Unformatted slot. Occupies no bytes; the cursor does not
                // advance.
                track_entries.push(TrackEntry {
                    ch,
                    missing: true,
                    offset: None,
                    size: 0,
                    info: None,
                    sectors: Vec::new(),
                });
                continue;
            }

            if slot_size < TRACK_HEADER_SIZE {
                log::error!("load_image: Track {} declares {} bytes", ch, slot_size);
                return Err(DiskImageError::TrackHeaderTooSmall);
            }
            if cursor + slot_size > buf.len() {
                log::error!(
                    "load_image: Track {} at {:X} ({} bytes) extends past EOF ({})",
                    ch,
                    cursor,
                    slot_size,
                    buf.len()
                );
                return Err(DiskImageError::OutOfBounds);
            }

            let entry = Self::parse_track(&buf, ch, cursor, slot_size)?;
            track_entries.push(entry);
            cursor += slot_size;
        }

        Ok(DiskImage {
            format,
            creator,
            tracks: header.tracks,
            sides: header.sides,
            track_entries,
            data: buf,
        })
    }

    fn parse_track(
        buf: &[u8],
        ch: DiskCh,
        track_offset: usize,
        slot_size: usize,
    ) -> Result<TrackEntry, DiskImageError> {
        let mut reader = Cursor::new(buf);
        reader.seek(SeekFrom::Start(track_offset as u64))?;
        let header: TrackInfoBlock = reader.read_le()?;

        // The Track-Info signature is informational; note its absence but
        // keep parsing.
        if !header.signature.starts_with(b"Track-Info") {
            log::warn!("parse_track: {} header lacks Track-Info signature", ch);
        }

        log::trace!(
            "parse_track: {} @ {:X}: declared c:{} h:{} sectors: {}",
            ch,
            track_offset,
            header.track,
            header.side,
            header.sector_ct
        );

        let mut sector_ct = header.sector_ct as usize;
        if sector_ct > MAX_TRACK_SECTORS {
            log::warn!(
                "parse_track: {} declares {} sectors; clamping to {}",
                ch,
                sector_ct,
                MAX_TRACK_SECTORS
            );
            sector_ct = MAX_TRACK_SECTORS;
        }

        let mut sectors = Vec::with_capacity(sector_ct);
        let track_end = track_offset + slot_size;
        let mut data_cursor = track_offset + TRACK_HEADER_SIZE;
        let mut placing = true;

        for _ in 0..sector_ct {
            let desc: SectorInfoBlock = reader.read_le()?;
            let id = SectorId::new(desc.c, desc.h, desc.r, desc.n);

            // EDSK records an actual size per sector, used for weak and
            // variable-length sectors; zero falls back to the N size code.
            let size = if desc.actual_size != 0 {
                desc.actual_size as usize
            }
            else {
                id.n_size()
            };

            let mut entry = SectorEntry {
                id,
                st1: St1Flags::from_bits_truncate(desc.st1),
                st2: St2Flags::from_bits_truncate(desc.st2),
                size,
                data_offset: None,
                truncated: false,
            };

            if placing {
                entry.data_offset = Some(data_cursor);
                if data_cursor + size > track_end {
                    // This sector's payload crosses the track boundary; it and
                    // everything after it have no reliable placement.
                    log::warn!("parse_track: {} sector {} truncated at track boundary", ch, id);
                    entry.truncated = true;
                    placing = false;
                }
                else {
                    data_cursor += size;
                }
            }

            if entry.has_error() {
                log::trace!("parse_track: {} sector {} flags: {:?}", ch, id, entry.error_flags());
            }

            sectors.push(entry);
        }

        Ok(TrackEntry {
            ch,
            missing: false,
            offset: Some(track_offset),
            size: slot_size,
            info: Some(TrackInfo {
                track: header.track,
                side: header.side,
                data_rate: header.data_rate.into(),
                recording_mode: header.recording_mode.into(),
                sector_size_code: header.sector_size,
                sector_ct: header.sector_ct,
                gap3: header.gap3,
                filler: header.filler,
            }),
            sectors,
        })
    }
}
