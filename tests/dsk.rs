mod common;

use common::*;
use edskit::prelude::*;

#[test]
fn test_empty_image() {
    init();
    assert!(matches!(DiskImage::load(Vec::new()), Err(DiskImageError::EmptyImage)));
    assert!(matches!(
        DiskImage::detect_format(&[]),
        Err(DiskImageError::EmptyImage)
    ));
}

#[test]
fn test_unknown_signature() {
    init();
    let buf = vec![0u8; 512];
    assert!(matches!(DiskImage::load(buf), Err(DiskImageError::UnknownSignature)));
}

#[test]
fn test_invalid_geometry() {
    init();
    let mut buf = vec![0u8; 256];
    buf[0..STANDARD_SIGNATURE.len()].copy_from_slice(STANDARD_SIGNATURE);
    buf[0x30] = 0; // zero tracks
    buf[0x31] = 1;
    assert!(matches!(DiskImage::load(buf), Err(DiskImageError::InvalidGeometry)));
}

#[test]
fn test_detect_format() {
    init();
    let dsk = standard_dsk(1, 1, 2304, |t, s| uniform_sectors(t, s, 1, 4, 2, 0));
    assert_eq!(DiskImage::detect_format(&dsk).unwrap(), DiskImageFileFormat::Dsk);

    let edsk = extended_dsk(1, &[Some(uniform_sectors(0, 0, 1, 4, 2, 0))]);
    assert_eq!(DiskImage::detect_format(&edsk).unwrap(), DiskImageFileFormat::Edsk);
}

/// The concrete scenario from the format documentation: 40 tracks, one
/// side, uniform 2304-byte track blocks. Track offsets advance by 2304
/// starting at 256.
#[test]
fn test_standard_dsk_offsets() {
    init();
    let buf = standard_dsk(40, 1, 2304, |t, s| uniform_sectors(t, s, 1, 4, 2, t));
    let image = DiskImage::load(buf).unwrap();

    assert_eq!(image.format(), DiskImageFileFormat::Dsk);
    assert_eq!(image.creator(), "edskit");
    assert_eq!(image.tracks(), 40);
    assert_eq!(image.sides(), 1);
    assert_eq!(image.track_entries().len(), 40);

    for (i, track) in image.track_entries().iter().enumerate() {
        assert!(!track.missing);
        assert_eq!(track.size, 2304);
        assert_eq!(track.offset, Some(256 + i * 2304));
        assert_eq!(track.sectors.len(), 4);
    }
}

/// Track entries appear in (track, side) row-major order with side varying
/// fastest, and the entry count is tracks x sides.
#[test]
fn test_geometry_row_major() {
    init();
    let buf = standard_dsk(3, 2, 2304, |t, s| uniform_sectors(t, s, 1, 4, 2, t * 2 + s));
    let image = DiskImage::load(buf).unwrap();

    assert_eq!(image.track_entries().len(), 6);
    let order: Vec<(u8, u8)> = image.track_entries().iter().map(|t| t.ch.get()).collect();
    assert_eq!(order, vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);
}

#[test]
fn test_out_of_bounds_track() {
    init();
    let mut buf = standard_dsk(2, 1, 2304, |t, s| uniform_sectors(t, s, 1, 4, 2, 0));
    // Drop the second track's bytes; the header still declares two tracks.
    buf.truncate(256 + 2304);
    assert!(matches!(DiskImage::load(buf), Err(DiskImageError::OutOfBounds)));
}

#[test]
fn test_track_header_too_small() {
    init();
    // A DSK whose uniform track size is below the 256-byte header.
    let mut buf = vec![0u8; 512];
    buf[0..STANDARD_SIGNATURE.len()].copy_from_slice(STANDARD_SIGNATURE);
    buf[0x30] = 1;
    buf[0x31] = 1;
    buf[0x32..0x34].copy_from_slice(&0u16.to_le_bytes());
    assert!(matches!(
        DiskImage::load(buf),
        Err(DiskImageError::TrackHeaderTooSmall)
    ));
}

/// Placement reconstruction: walking every track header and its sectors in
/// declaration order reproduces the container byte-for-byte after the disk
/// header.
#[test]
fn test_placement_reconstruction() {
    init();
    let buf = standard_dsk(40, 1, 2304, |t, s| uniform_sectors(t, s, 1, 4, 2, t ^ 0x5A));
    let image = DiskImage::load(buf).unwrap();

    let mut rebuilt = Vec::new();
    for track in image.track_entries() {
        let offset = track.offset.unwrap();
        rebuilt.extend_from_slice(&image.data()[offset..offset + 256]);
        for sector in &track.sectors {
            rebuilt.extend_from_slice(image.sector_data(sector).unwrap());
        }
    }

    assert_eq!(rebuilt, image.data()[256..]);
}

/// Sector placement invariant: every placed, non-truncated sector lies
/// entirely within its track slot, after the track header.
#[test]
fn test_sector_placement_invariant() {
    init();
    let buf = standard_dsk(10, 2, 2304, |t, s| uniform_sectors(t, s, 1, 4, 2, t + s));
    let image = DiskImage::load(buf).unwrap();

    for track in image.track_entries() {
        let track_offset = track.offset.unwrap();
        for sector in &track.sectors {
            assert!(!sector.truncated);
            let data_offset = sector.data_offset.unwrap();
            assert!(data_offset >= track_offset + 256);
            assert!(data_offset + sector.size <= track_offset + track.size);
        }
    }
}

#[test]
fn test_read_sector_by_record_id() {
    init();
    let buf = standard_dsk(2, 1, 2304, |t, s| {
        vec![
            SectorSpec::new(t, s, 0xC1, 2, vec![0x11; 512]),
            SectorSpec::new(t, s, 0xC5, 2, vec![0x55; 512]),
            // An ID field claiming a different cylinder; R matching is not
            // filtered on C/H.
            SectorSpec::new(99, 1, 0xC9, 2, vec![0x99; 512]),
            SectorSpec::new(t, s, 0xC3, 2, vec![0x33; 512]),
        ]
    });
    let image = DiskImage::load(buf).unwrap();

    let data = image.read_sector(DiskCh::new(1, 0), 0xC5).unwrap();
    assert_eq!(data.len(), 512);
    assert!(data.iter().all(|&b| b == 0x55));

    // C/H mismatch in the ID field does not hide the sector.
    assert!(image.read_sector(DiskCh::new(0, 0), 0xC9).is_some());

    // Absent record id, absent track.
    assert!(image.read_sector(DiskCh::new(0, 0), 0xC8).is_none());
    assert!(image.read_sector(DiskCh::new(7, 0), 0xC1).is_none());
}

#[test]
fn test_fdc_status_flags() {
    init();
    let buf = standard_dsk(1, 1, 2304, |t, s| {
        let mut sectors = uniform_sectors(t, s, 1, 4, 2, 0);
        sectors[1].st1 = 0x20; // data error in ID
        sectors[1].st2 = 0x20; // data error in data
        sectors[2].st2 = 0x01; // missing data mark
        sectors
    });
    let image = DiskImage::load(buf).unwrap();
    let track = &image.track_entries()[0];

    assert!(!track.sectors[0].has_error());
    assert!(track.sectors[1].has_error());
    assert_eq!(track.sectors[1].st1, St1Flags::DATA_ERROR_IN_ID);
    assert_eq!(track.sectors[1].st2, St2Flags::DATA_ERROR_IN_DATA);
    assert!(track.sectors[1].error_flags().contains(&"DATA_ERROR_IN_ID"));
    assert!(track.sectors[2].error_flags().contains(&"MISSING_DATA_MARK"));
}
