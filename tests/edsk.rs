mod common;

use common::*;
use edskit::prelude::*;

fn four_sector_track(track: u8, side: u8, fill: u8) -> Vec<SectorSpec> {
    uniform_sectors(track, side, 1, 4, 2, fill)
}

/// An EDSK with one unformatted slot: the entry is recorded as missing, the
/// byte cursor does not advance past it, and later track offsets are packed
/// without a gap.
#[test]
fn test_missing_track_slot() {
    init();
    let slots: Vec<Option<Vec<SectorSpec>>> = (0..40u8)
        .map(|t| {
            if t == 20 {
                None
            }
            else {
                Some(four_sector_track(t, 0, t))
            }
        })
        .collect();
    let image = DiskImage::load(extended_dsk(1, &slots)).unwrap();

    assert_eq!(image.track_entries().len(), 40);

    let missing = &image.track_entries()[20];
    assert!(missing.missing);
    assert_eq!(missing.size, 0);
    assert!(missing.offset.is_none());
    assert!(missing.sectors.is_empty());

    // Block size per formatted track: 256 header + 4 x 512 data = 2304.
    // Slot 21 sits immediately after slot 19's bytes.
    assert_eq!(image.track_entries()[19].offset, Some(256 + 19 * 2304));
    assert_eq!(image.track_entries()[21].offset, Some(256 + 20 * 2304));
}

/// Flat imaging zero-fills the missing slot at its LBA position and keeps
/// the total length invariant.
#[test]
fn test_flat_image_zero_fills_missing_track() {
    init();
    let slots: Vec<Option<Vec<SectorSpec>>> = (0..40u8)
        .map(|t| {
            if t == 20 {
                None
            }
            else {
                Some(four_sector_track(t, 0, t + 1))
            }
        })
        .collect();
    let image = DiskImage::load(extended_dsk(1, &slots)).unwrap();
    let flat = FlatImage::from_image(&image);

    assert_eq!(flat.sector_bytes(), 512);
    assert_eq!(flat.sectors_per_track(), 4);
    assert_eq!(flat.len(), 40 * 4 * 512);

    let track_bytes = 4 * 512;
    let slot20 = &flat.data()[20 * track_bytes..21 * track_bytes];
    assert!(slot20.iter().all(|&b| b == 0));

    let slot21 = &flat.data()[21 * track_bytes..22 * track_bytes];
    assert!(slot21.iter().all(|&b| b == 22));
}

/// The flat imager orders sectors by record id regardless of declaration
/// order.
#[test]
fn test_flat_image_sorts_by_record_id() {
    init();
    let sectors = vec![
        SectorSpec::new(0, 0, 3, 2, vec![3; 512]),
        SectorSpec::new(0, 0, 1, 2, vec![1; 512]),
        SectorSpec::new(0, 0, 2, 2, vec![2; 512]),
    ];
    let image = DiskImage::load(extended_dsk(1, &[Some(sectors)])).unwrap();
    let flat = FlatImage::from_image(&image);

    assert_eq!(flat.len(), 3 * 512);
    assert!(flat.data()[0..512].iter().all(|&b| b == 1));
    assert!(flat.data()[512..1024].iter().all(|&b| b == 2));
    assert!(flat.data()[1024..1536].iter().all(|&b| b == 3));
}

#[test]
fn test_flat_image_empty_when_unformatted() {
    init();
    let image = DiskImage::load(extended_dsk(1, &[None, None])).unwrap();
    let flat = FlatImage::from_image(&image);
    assert!(flat.is_empty());
}

/// EDSK per-sector actual sizes override the N size code.
#[test]
fn test_variable_sector_sizes() {
    init();
    let sectors = vec![
        SectorSpec::new(0, 0, 1, 2, vec![0xAA; 512]),
        // N says 512 but the declared actual size is 1024 (a weak sector
        // recorded twice, say).
        SectorSpec::new(0, 0, 2, 2, vec![0xBB; 1024]),
        SectorSpec::new(0, 0, 3, 1, vec![0xCC; 256]),
    ];
    let image = DiskImage::load(extended_dsk(1, &[Some(sectors)])).unwrap();
    let track = &image.track_entries()[0];

    assert_eq!(track.sectors[0].size, 512);
    assert_eq!(track.sectors[1].size, 1024);
    assert_eq!(track.sectors[1].expected_size(), 512);
    assert_eq!(track.sectors[2].size, 256);

    // Placement is sequential over the declared sizes.
    let base = track.offset.unwrap() + 256;
    assert_eq!(track.sectors[0].data_offset, Some(base));
    assert_eq!(track.sectors[1].data_offset, Some(base + 512));
    assert_eq!(track.sectors[2].data_offset, Some(base + 512 + 1024));

    assert_eq!(image.read_sector(DiskCh::new(0, 0), 2).unwrap().len(), 1024);
}

/// A sector whose declared size crosses its track boundary is flagged
/// truncated; sectors after it are left unplaced.
#[test]
fn test_truncated_sector() {
    init();
    // Build a track declaring three 512-byte sectors, then shrink its block
    // to hold only one sector's payload.
    let sectors = vec![
        SectorSpec::new(0, 0, 1, 2, vec![0x11; 512]),
        SectorSpec::new(0, 0, 2, 2, vec![0x22; 512]),
        SectorSpec::new(0, 0, 3, 2, vec![0x33; 512]),
    ];
    let mut image_buf = extended_dsk(1, &[Some(sectors)]);
    // Original block: 256 + 3*512 = 1792 bytes (size byte 7). Rewrite to
    // 768 (size byte 3) and drop the rest of the body.
    image_buf[0x34] = 3;
    image_buf.truncate(256 + 768);

    let image = DiskImage::load(image_buf).unwrap();
    let track = &image.track_entries()[0];

    assert!(!track.sectors[0].truncated);
    assert!(track.sectors[0].data_offset.is_some());

    assert!(track.sectors[1].truncated);
    assert!(track.sectors[1].data_offset.is_some());

    assert!(!track.sectors[2].truncated);
    assert!(track.sectors[2].data_offset.is_none());
}
