mod common;

use common::*;
use edskit::prelude::*;

fn mounted() -> (Vec<u8>, DiskImage) {
    let flat = fat12_flat();
    let image = DiskImage::load(wrap_flat_in_dsk(&flat)).unwrap();
    (flat, image)
}

fn find<'a>(deleted: &'a [DeletedEntry], name: &str) -> &'a DeletedEntry {
    deleted
        .iter()
        .find(|d| d.entry.name == name)
        .unwrap_or_else(|| panic!("{} not in deleted scan", name))
}

/// The deletion marker destroys the first character; the scan shows it as
/// `?` and never reports directories, labels or empty files.
#[test]
fn test_deleted_scan_names() {
    init();
    let (_, image) = mounted();
    let volume = Fat12Volume::mount(&image).unwrap();
    let deleted = volume.deleted_entries();

    assert_eq!(deleted.len(), 3);
    assert!(deleted.iter().all(|d| d.entry.name.starts_with('?')));
    assert!(deleted.iter().all(|d| d.entry.cluster >= 2 && d.entry.size > 0));

    // Timestamps survive deletion.
    assert_eq!(find(&deleted, "?ONE.TXT").entry.modified.to_string(), "1994/05/17 14:32");
}

/// Recoverability truth table: a full free run qualifies, a blocked run
/// reports how much of it was free, and a reallocated start cluster
/// disqualifies outright.
#[test]
fn test_recoverability_scoring() {
    init();
    let (_, image) = mounted();
    let volume = Fat12Volume::mount(&image).unwrap();
    let deleted = volume.deleted_entries();

    // 3000 bytes over 1024-byte clusters needs 3 clusters; 6, 7 and 8 are
    // free.
    let one = find(&deleted, "?ONE.TXT");
    assert!(one.recoverable);
    assert_eq!(one.reason, "3 clusters free");

    // 2000 bytes needs clusters 9 and 10, but 10 was reallocated.
    let two = find(&deleted, "?TWO.TXT");
    assert!(!two.recoverable);
    assert_eq!(two.reason, "Only 1/2 clusters free");

    // Cluster 11 itself carries a live FAT entry now.
    let gone = find(&deleted, "?GONE.TXT");
    assert!(!gone.recoverable);
    assert_eq!(gone.reason, "Start cluster reallocated");
}

/// Recovery reads consecutive clusters, ignoring the zeroed FAT, truncated
/// to the recorded size.
#[test]
fn test_recover_deleted_file() {
    init();
    let (flat, image) = mounted();
    let volume = Fat12Volume::mount(&image).unwrap();

    let bytes = volume.recover_file(6, 3000).unwrap();
    assert_eq!(bytes.len(), 3000);

    let mut expected = Vec::new();
    expected.extend_from_slice(&flat[cluster_offset(6)..cluster_offset(6) + 1024]);
    expected.extend_from_slice(&flat[cluster_offset(7)..cluster_offset(7) + 1024]);
    expected.extend_from_slice(&flat[cluster_offset(8)..cluster_offset(8) + 952]);
    assert_eq!(bytes, expected);
}

#[test]
fn test_recover_rejects_invalid_clusters() {
    init();
    let (_, image) = mounted();
    let volume = Fat12Volume::mount(&image).unwrap();

    assert!(matches!(
        volume.recover_file(0, 100),
        Err(FileSystemError::InvalidCluster(0))
    ));
    assert!(matches!(
        volume.recover_file(1, 100),
        Err(FileSystemError::InvalidCluster(1))
    ));
    assert!(matches!(
        volume.recover_file(5000, 100),
        Err(FileSystemError::InvalidCluster(5000))
    ));
}

/// A single-cluster deleted file reports its run in the singular.
#[test]
fn test_single_cluster_reason() {
    init();
    let mut flat = fat12_flat();
    // Shrink ?ONE.TXT to fit one cluster: patch its size field in the root
    // record (record index 6, size at +28).
    let record = ROOT_START + 6 * 32;
    flat[record + 28..record + 32].copy_from_slice(&800u32.to_le_bytes());

    let image = DiskImage::load(wrap_flat_in_dsk(&flat)).unwrap();
    let volume = Fat12Volume::mount(&image).unwrap();
    let deleted = volume.deleted_entries();

    let one = find(&deleted, "?ONE.TXT");
    assert!(one.recoverable);
    assert_eq!(one.reason, "1 cluster free");
}
