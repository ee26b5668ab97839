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

    tests/common/mod.rs

    Support routines for tests: synthetic DSK/EDSK containers and a 720KB
    FAT12 fixture volume, all built in memory.
*/
#![allow(dead_code)]

pub const STANDARD_SIGNATURE: &[u8] = b"MV - CPCEMU Disk-File\r\nDisk-Info\r\n";
pub const EXTENDED_SIGNATURE: &[u8] = b"EXTENDED CPC DSK File\r\nDisk-Info\r\n";

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One sector to place on a synthetic track: its CHRN id, FDC status bytes
/// and payload.
#[derive(Clone)]
pub struct SectorSpec {
    pub c: u8,
    pub h: u8,
    pub r: u8,
    pub n: u8,
    pub st1: u8,
    pub st2: u8,
    pub data: Vec<u8>,
}

impl SectorSpec {
    pub fn new(c: u8, h: u8, r: u8, n: u8, data: Vec<u8>) -> SectorSpec {
        SectorSpec {
            c,
            h,
            r,
            n,
            st1: 0,
            st2: 0,
            data,
        }
    }
}

/// A run of `count` sectors with ascending record ids and identical fill.
pub fn uniform_sectors(c: u8, h: u8, first_r: u8, count: u8, n: u8, fill: u8) -> Vec<SectorSpec> {
    (0..count)
        .map(|i| SectorSpec::new(c, h, first_r + i, n, vec![fill; 128 << n as usize]))
        .collect()
}

/// Build a 256-byte track information block plus sector payloads in
/// declaration order, padded with zeros to `block_size`. When
/// `declared_sizes` is false the per-sector actual size words are left zero
/// (standard DSK style) and readers fall back to the N size code.
pub fn track_block(track: u8, side: u8, sectors: &[SectorSpec], block_size: usize, declared_sizes: bool) -> Vec<u8> {
    let mut block = vec![0u8; 256];
    block[0..12].copy_from_slice(b"Track-Info\r\n");
    block[0x10] = track;
    block[0x11] = side;
    block[0x12] = 1; // data rate: SD/DD
    block[0x13] = 2; // recording mode: MFM
    block[0x14] = sectors.first().map_or(2, |s| s.n);
    block[0x15] = sectors.len() as u8;
    block[0x16] = 0x4E;
    block[0x17] = 0xE5;

    for (i, sector) in sectors.iter().enumerate() {
        let off = 0x18 + i * 8;
        block[off] = sector.c;
        block[off + 1] = sector.h;
        block[off + 2] = sector.r;
        block[off + 3] = sector.n;
        block[off + 4] = sector.st1;
        block[off + 5] = sector.st2;
        if declared_sizes {
            let size = sector.data.len() as u16;
            block[off + 6..off + 8].copy_from_slice(&size.to_le_bytes());
        }
    }

    for sector in sectors {
        block.extend_from_slice(&sector.data);
    }

    assert!(block.len() <= block_size, "sector data overflows track block");
    block.resize(block_size, 0);
    block
}

/// Build a standard DSK container with one uniform track block size.
/// `block_size` must be a multiple of 256; the size word stores it as a
/// 256-byte multiplier.
pub fn standard_dsk(
    tracks: u8,
    sides: u8,
    block_size: usize,
    sectors_for: impl Fn(u8, u8) -> Vec<SectorSpec>,
) -> Vec<u8> {
    let mut image = vec![0u8; 256];
    image[0..STANDARD_SIGNATURE.len()].copy_from_slice(STANDARD_SIGNATURE);
    image[0x22..0x22 + 6].copy_from_slice(b"edskit");
    image[0x30] = tracks;
    image[0x31] = sides;
    image[0x32..0x34].copy_from_slice(&((block_size / 256) as u16).to_le_bytes());

    for track in 0..tracks {
        for side in 0..sides {
            let sectors = sectors_for(track, side);
            image.extend_from_slice(&track_block(track, side, &sectors, block_size, false));
        }
    }

    image
}

/// Build an extended DSK container from per-slot track contents, in
/// `(track, side)` row-major order. `None` slots are unformatted: a zero in
/// the size table and no bytes in the body.
pub fn extended_dsk(sides: u8, slots: &[Option<Vec<SectorSpec>>]) -> Vec<u8> {
    assert_eq!(slots.len() % sides as usize, 0);
    let tracks = (slots.len() / sides as usize) as u8;

    let blocks: Vec<Option<Vec<u8>>> = slots
        .iter()
        .enumerate()
        .map(|(slot, sectors)| {
            sectors.as_ref().map(|sectors| {
                let data_len: usize = sectors.iter().map(|s| s.data.len()).sum();
                let block_size = (256 + data_len).div_ceil(256) * 256;
                let track = (slot / sides as usize) as u8;
                let side = (slot % sides as usize) as u8;
                track_block(track, side, sectors, block_size, true)
            })
        })
        .collect();

    let mut image = vec![0u8; 256];
    image[0..EXTENDED_SIGNATURE.len()].copy_from_slice(EXTENDED_SIGNATURE);
    image[0x22..0x22 + 6].copy_from_slice(b"edskit");
    image[0x30] = tracks;
    image[0x31] = sides;
    for (i, block) in blocks.iter().enumerate() {
        image[0x34 + i] = block.as_ref().map_or(0, |b| (b.len() / 256) as u8);
    }

    for block in blocks.into_iter().flatten() {
        image.extend_from_slice(&block);
    }

    image
}

// ---------------------------------------------------------------------------
// FAT12 fixture: a 720KB volume with a subdirectory, a long filename, a
// cyclic chain and three tombstoned files in various states of
// recoverability.
// ---------------------------------------------------------------------------

pub const BYTES_PER_SECTOR: usize = 512;
pub const SECTORS_PER_CLUSTER: usize = 2;
pub const SECTORS_PER_TRACK: usize = 9;
pub const TOTAL_SECTORS: usize = 1440;
pub const CLUSTER_BYTES: usize = BYTES_PER_SECTOR * SECTORS_PER_CLUSTER;
pub const FAT_START: usize = 512;
pub const FAT2_START: usize = FAT_START + 3 * BYTES_PER_SECTOR;
pub const ROOT_START: usize = 3584;
pub const DATA_START: usize = 7168;

pub fn cluster_offset(cluster: u16) -> usize {
    DATA_START + (cluster as usize - 2) * CLUSTER_BYTES
}

/// Write one 12-bit FAT entry into both FAT copies.
pub fn set_fat12(flat: &mut [u8], cluster: u16, value: u16) {
    for fat_start in [FAT_START, FAT2_START] {
        let offset = fat_start + (cluster as usize * 3) / 2;
        if cluster % 2 == 0 {
            flat[offset] = (value & 0xFF) as u8;
            flat[offset + 1] = (flat[offset + 1] & 0xF0) | ((value >> 8) & 0x0F) as u8;
        }
        else {
            flat[offset] = (flat[offset] & 0x0F) | ((value & 0x0F) << 4) as u8;
            flat[offset + 1] = (value >> 4) as u8;
        }
    }
}

/// Build a 32-byte short-name directory record.
pub fn dir_record(name: &str, ext: &str, attr: u8, cluster: u16, size: u32) -> [u8; 32] {
    let mut record = [0u8; 32];
    record[0..8].copy_from_slice(format!("{:<8}", name).as_bytes());
    record[8..11].copy_from_slice(format!("{:<3}", ext).as_bytes());
    record[11] = attr;
    // 1994-05-17 14:32:06
    let time: u16 = (14 << 11) | (32 << 5) | 3;
    let date: u16 = ((1994 - 1980) << 9) | (5 << 5) | 17;
    record[22..24].copy_from_slice(&time.to_le_bytes());
    record[24..26].copy_from_slice(&date.to_le_bytes());
    record[26..28].copy_from_slice(&cluster.to_le_bytes());
    record[28..32].copy_from_slice(&size.to_le_bytes());
    record
}

/// A short-name record tombstoned by deletion: the first name byte is the
/// 0xE5 marker, the rest of the record is intact.
pub fn deleted_record(name_tail: &str, ext: &str, attr: u8, cluster: u16, size: u32) -> [u8; 32] {
    let mut record = dir_record(&format!("X{}", name_tail), ext, attr, cluster, size);
    record[0] = 0xE5;
    record
}

/// Checksum of an 8.3 name, stored in every LFN fragment of the entry.
pub fn lfn_checksum(short: &[u8; 11]) -> u8 {
    short
        .iter()
        .fold(0u8, |sum, &b| (sum >> 1).wrapping_add((sum & 1) << 7).wrapping_add(b))
}

/// Build one VFAT long-filename fragment record.
pub fn lfn_record(sequence: u8, is_last: bool, text: &str, checksum: u8) -> [u8; 32] {
    let mut record = [0u8; 32];
    record[0] = sequence | if is_last { 0x40 } else { 0 };
    record[11] = 0x0F;
    record[13] = checksum;

    let mut units: Vec<u16> = text.encode_utf16().collect();
    assert!(units.len() <= 13);
    if units.len() < 13 {
        units.push(0x0000);
    }
    while units.len() < 13 {
        units.push(0xFFFF);
    }

    let offsets = (1..11).step_by(2).chain((14..26).step_by(2)).chain((28..32).step_by(2));
    for (unit, offset) in units.iter().zip(offsets) {
        record[offset..offset + 2].copy_from_slice(&unit.to_le_bytes());
    }
    record
}

fn put(flat: &mut [u8], offset: usize, bytes: &[u8]) -> usize {
    flat[offset..offset + bytes.len()].copy_from_slice(bytes);
    offset + bytes.len()
}

/// The flat 720KB FAT12 volume used by the filesystem tests.
///
/// Layout: root holds a volume label, HELLO.TXT (cluster 2, one cluster),
/// directory SUB (cluster 3) containing NESTED.BIN (cluster 4), the LFN
/// file "Très_Long_Name.TXT" as TRES_L~1.TXT (cluster 5), LOOP.BIN whose
/// chain cycles between clusters 12 and 13, and three deleted files:
/// ?ONE.TXT (cluster 6, 3000 bytes, clusters 6-8 free), ?TWO.TXT
/// (cluster 9, 2000 bytes, but cluster 10 reallocated) and ?GONE.TXT
/// (cluster 11, whose own FAT entry was reallocated).
pub fn fat12_flat() -> Vec<u8> {
    let mut flat = vec![0u8; TOTAL_SECTORS * BYTES_PER_SECTOR];

    // Boot sector.
    flat[0] = 0xEB;
    flat[1] = 0x3C;
    flat[2] = 0x90;
    put(&mut flat, 3, b"EDSKTEST");
    put(&mut flat, 11, &(BYTES_PER_SECTOR as u16).to_le_bytes());
    flat[13] = SECTORS_PER_CLUSTER as u8;
    put(&mut flat, 14, &1u16.to_le_bytes()); // reserved sectors
    flat[16] = 2; // fat count
    put(&mut flat, 17, &112u16.to_le_bytes());
    put(&mut flat, 19, &(TOTAL_SECTORS as u16).to_le_bytes());
    flat[21] = 0xF9;
    put(&mut flat, 22, &3u16.to_le_bytes()); // sectors per fat
    put(&mut flat, 24, &(SECTORS_PER_TRACK as u16).to_le_bytes());
    put(&mut flat, 26, &2u16.to_le_bytes()); // heads
    flat[38] = 0x29;
    put(&mut flat, 39, &0x1234_5678u32.to_le_bytes());
    put(&mut flat, 43, b"EXAMPLE    ");
    put(&mut flat, 54, b"FAT12   ");
    flat[510] = 0x55;
    flat[511] = 0xAA;

    // FAT: media/reserved slots, then the fixture chains.
    set_fat12(&mut flat, 0, 0xFF9);
    set_fat12(&mut flat, 1, 0xFFF);
    set_fat12(&mut flat, 2, 0xFFF); // HELLO.TXT
    set_fat12(&mut flat, 3, 0xFFF); // SUB
    set_fat12(&mut flat, 4, 0xFFF); // NESTED.BIN
    set_fat12(&mut flat, 5, 0xFFF); // TRES_L~1.TXT
    // 6..=9 stay free (deleted data).
    set_fat12(&mut flat, 10, 0xFFF); // reallocated: blocks ?TWO.TXT
    set_fat12(&mut flat, 11, 0xFFF); // reallocated: blocks ?GONE.TXT
    set_fat12(&mut flat, 12, 13); // LOOP.BIN: 12 -> 13 -> 12 cycle
    set_fat12(&mut flat, 13, 12);

    // Root directory.
    let mut offset = ROOT_START;
    offset = put(&mut flat, offset, &dir_record("EXAMPLE", "", 0x08, 0, 0));
    offset = put(&mut flat, offset, &dir_record("HELLO", "TXT", 0x20, 2, CLUSTER_BYTES as u32));
    offset = put(&mut flat, offset, &dir_record("SUB", "", 0x10, 3, 0));

    let short: [u8; 11] = *b"TRES_L~1TXT";
    let checksum = lfn_checksum(&short);
    offset = put(&mut flat, offset, &lfn_record(2, true, "e.TXT", checksum));
    offset = put(&mut flat, offset, &lfn_record(1, false, "Très_Long_Nam", checksum));
    offset = put(&mut flat, offset, &dir_record("TRES_L~1", "TXT", 0x20, 5, 20));

    offset = put(&mut flat, offset, &deleted_record("ONE", "TXT", 0x20, 6, 3000));
    offset = put(&mut flat, offset, &deleted_record("TWO", "TXT", 0x20, 9, 2000));
    offset = put(&mut flat, offset, &deleted_record("GONE", "TXT", 0x20, 11, 500));
    put(&mut flat, offset, &dir_record("LOOP", "BIN", 0x20, 12, 10000));

    // SUB directory content.
    let mut offset = cluster_offset(3);
    offset = put(&mut flat, offset, &dir_record(".", "", 0x10, 3, 0));
    offset = put(&mut flat, offset, &dir_record("..", "", 0x10, 0, 0));
    put(&mut flat, offset, &dir_record("NESTED", "BIN", 0x20, 4, 100));

    // File payloads.
    for i in 0..CLUSTER_BYTES {
        flat[cluster_offset(2) + i] = b'A';
    }
    for i in 0..100 {
        flat[cluster_offset(4) + i] = b'N';
    }
    for i in 0..20 {
        flat[cluster_offset(5) + i] = b'L';
    }
    for i in 0..3000 {
        flat[cluster_offset(6) + i] = (i & 0xFF) as u8;
    }
    for i in 0..(2 * CLUSTER_BYTES) {
        flat[cluster_offset(12) + i] = b'X';
    }

    flat
}

/// Wrap a flat volume into a standard DSK container: 80 cylinders, 2 heads,
/// 9 sectors of 512 bytes per track, record ids 1-9. Sectors are declared in
/// an interleaved order so the flat imager's R sort is exercised.
pub fn wrap_flat_in_dsk(flat: &[u8]) -> Vec<u8> {
    assert_eq!(flat.len(), TOTAL_SECTORS * BYTES_PER_SECTOR);
    let block_size = 256 + SECTORS_PER_TRACK * BYTES_PER_SECTOR;
    let interleave: [u8; 9] = [1, 4, 7, 2, 5, 8, 3, 6, 9];

    standard_dsk(80, 2, block_size, |track, side| {
        let track_lba = (track as usize * 2 + side as usize) * SECTORS_PER_TRACK;
        interleave
            .iter()
            .map(|&r| {
                let lba = track_lba + (r as usize - 1);
                let start = lba * BYTES_PER_SECTOR;
                SectorSpec::new(track, side, r, 2, flat[start..start + BYTES_PER_SECTOR].to_vec())
            })
            .collect()
    })
}
