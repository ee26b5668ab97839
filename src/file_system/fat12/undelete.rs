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

    src/file_system/fat12/undelete.rs

    The undelete scan. Deleting a FAT file overwrites the first character of
    its directory record with 0xE5 and zeroes its cluster chain, but leaves
    the rest of the record and the file's data clusters in place. DOS
    allocated files contiguously whenever it could, so a deleted file whose
    clusters have not been reused is usually a straight run starting at the
    record's first cluster.
*/

use crate::{
    file_system::{
        fat12::{
            dir::{parse_short_entry, DELETED_MARKER, DIR_RECORD_LEN, LFN_ATTRIBUTES},
            table::Fat12Table,
        },
        DeletedEntry,
    },
    util::ascii_field,
};

/// Scan one directory buffer for tombstoned records and judge each one's
/// recoverability against the FAT. Deleted LFN fragments are not
/// reconstructed - their sequence byte was itself overwritten by the 0xE5
/// marker, so ordering is ambiguous.
pub(crate) fn scan_directory(
    buf: &[u8],
    table: &Fat12Table,
    cluster_bytes: usize,
) -> Vec<DeletedEntry> {
    let mut deleted = Vec::new();

    for record in buf.chunks_exact(DIR_RECORD_LEN) {
        if record[0] != DELETED_MARKER {
            continue;
        }
        if record[11] == LFN_ATTRIBUTES {
            continue;
        }

        let mut entry = parse_short_entry(record, None);
        if entry.is_dir() || entry.is_volume_label() {
            continue;
        }
        if entry.cluster < 2 || entry.size == 0 {
            continue;
        }

        // The deletion marker destroyed the first character of the name.
        let name = format!("?{}", reconstructed_tail(record));
        entry.name = name.clone();
        entry.short_name = name;

        let (recoverable, reason) = judge(entry.cluster, entry.size, table, cluster_bytes);
        log::debug!(
            "scan_directory: deleted entry {:?} cluster {} size {}: {}",
            entry.name,
            entry.cluster,
            entry.size,
            reason
        );

        deleted.push(DeletedEntry {
            entry,
            recoverable,
            reason,
        });
    }

    deleted
}

/// The short name minus its destroyed first character.
fn reconstructed_tail(record: &[u8]) -> String {
    let name = ascii_field(&record[1..8]);
    let ext = ascii_field(&record[8..11]);
    if ext.is_empty() {
        name
    }
    else {
        format!("{}.{}", name, ext)
    }
}

/// The contiguous-allocation heuristic: a deleted file is recoverable when
/// its start cluster was not reallocated and enough consecutive free FAT
/// entries follow it to hold the recorded size.
fn judge(start_cluster: u16, size: u32, table: &Fat12Table, cluster_bytes: usize) -> (bool, String) {
    let clusters_needed = (size as usize).div_ceil(cluster_bytes.max(1));

    // A non-zero FAT entry means the cluster now belongs to a live chain
    // (or is marked bad); either way the original data is gone or suspect.
    match table.get(start_cluster) {
        Some(0) => {}
        _ => return (false, "Start cluster reallocated".to_string()),
    }

    let free_run = table.free_run_len(start_cluster);
    if free_run >= clusters_needed {
        let reason = if clusters_needed == 1 {
            "1 cluster free".to_string()
        }
        else {
            format!("{} clusters free", clusters_needed)
        };
        (true, reason)
    }
    else {
        (false, format!("Only {}/{} clusters free", free_run, clusters_needed))
    }
}
