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

//! The FAT12 traversal engine: table decoding, cluster-chain reads, the
//! recursive directory walk, and the undelete pass.
//!
//! Mounting builds a flat LBA view of the container once and reuses it for
//! every operation on the volume. All reads are best-effort: bounds
//! violations and table inconsistencies degrade to empty or partial results
//! rather than errors, which suits archival inspection of damaged media.

pub(crate) mod dir;
pub mod table;
mod undelete;

use std::collections::HashSet;

use crate::{
    boot_sector::{bpb::BiosParameterBlock, detect_filesystem, DiskFilesystem},
    file_system::{
        fat12::{
            dir::{parse_directory, DIR_RECORD_LEN},
            table::{Fat12Table, FAT12_EOC_MIN},
        },
        DeletedEntry,
        DirEntry,
        FileSystemError,
    },
    sector_view::FlatImage,
    DiskImage,
};

/// A mounted FAT12 volume over a parsed disk image.
pub struct Fat12Volume {
    bpb: BiosParameterBlock,
    flat: FlatImage,
    table: Fat12Table,
}

impl Fat12Volume {
    /// Mount the FAT12 filesystem on an image. Fails with
    /// [FileSystemError::NotFatFilesystem] when the boot sector does not
    /// carry a FAT BPB.
    pub fn mount(image: &DiskImage) -> Result<Fat12Volume, FileSystemError> {
        let DiskFilesystem::Fat(bpb) = detect_filesystem(image) else {
            return Err(FileSystemError::NotFatFilesystem);
        };

        let flat = FlatImage::from_image(image);
        let cluster_ct = bpb.total_sectors() as usize / bpb.sectors_per_cluster.max(1) as usize + 2;
        let fat_start = bpb.reserved_sectors as usize * bpb.bytes_per_sector as usize;
        let table = Fat12Table::decode(flat.data(), fat_start, cluster_ct);

        log::debug!(
            "mount: oem {:?} {} clusters of {} bytes, root at {:#X}, data at {:#X}",
            bpb.oem(),
            cluster_ct,
            bpb.bytes_per_sector as usize * bpb.sectors_per_cluster as usize,
            (bpb.reserved_sectors as usize + bpb.fat_count as usize * bpb.sectors_per_fat as usize)
                * bpb.bytes_per_sector as usize,
            Fat12Volume::data_start_for(&bpb),
        );

        Ok(Fat12Volume { bpb, flat, table })
    }

    pub fn bpb(&self) -> &BiosParameterBlock {
        &self.bpb
    }

    pub fn table(&self) -> &Fat12Table {
        &self.table
    }

    pub fn flat(&self) -> &FlatImage {
        &self.flat
    }

    /// Byte offset of the first FAT copy.
    pub fn fat_start(&self) -> usize {
        self.bpb.reserved_sectors as usize * self.bpb.bytes_per_sector as usize
    }

    /// Byte offset of the root directory.
    pub fn root_start(&self) -> usize {
        (self.bpb.reserved_sectors as usize + self.bpb.fat_count as usize * self.bpb.sectors_per_fat as usize)
            * self.bpb.bytes_per_sector as usize
    }

    /// Byte length of the root directory region.
    pub fn root_byte_count(&self) -> usize {
        self.bpb.root_entries as usize * DIR_RECORD_LEN
    }

    /// Byte offset of the data area (cluster 2).
    pub fn data_start(&self) -> usize {
        Fat12Volume::data_start_for(&self.bpb)
    }

    fn data_start_for(bpb: &BiosParameterBlock) -> usize {
        let bps = bpb.bytes_per_sector as usize;
        if bps == 0 {
            return 0;
        }
        let root_sectors = (bpb.root_entries as usize * DIR_RECORD_LEN).div_ceil(bps);
        (bpb.reserved_sectors as usize + bpb.fat_count as usize * bpb.sectors_per_fat as usize + root_sectors) * bps
    }

    /// Bytes per cluster.
    pub fn cluster_bytes(&self) -> usize {
        self.bpb.bytes_per_sector as usize * self.bpb.sectors_per_cluster as usize
    }

    fn cluster_offset(&self, cluster: u16) -> usize {
        self.data_start() + (cluster as usize - 2) * self.cluster_bytes()
    }

    /// Collect the cluster chain starting at `start`. Terminates on the
    /// end-of-chain sentinels, free entries, out-of-range pointers, and
    /// revisits, so a corrupt table with cycles cannot hang traversal.
    fn chain_clusters(&self, start: u16) -> Vec<u16> {
        let mut clusters = Vec::new();
        let mut visited: HashSet<u16> = HashSet::new();
        let mut cluster = start;

        while (2..FAT12_EOC_MIN).contains(&cluster) {
            if !visited.insert(cluster) {
                log::warn!("chain_clusters: cycle at cluster {}; terminating chain", cluster);
                break;
            }
            clusters.push(cluster);

            cluster = match self.table.get(cluster) {
                // Out of table range.
                None => break,
                // A free entry mid-chain is corruption; stop.
                Some(0) => break,
                Some(value) if Fat12Table::is_end_of_chain(value) => break,
                Some(value) => value,
            };
        }

        clusters
    }

    /// Follow a cluster chain, reading at most `size` bytes. Returns
    /// whatever prefix is readable.
    pub fn read_chain(&self, start_cluster: u16, size: usize) -> Vec<u8> {
        let cluster_bytes = self.cluster_bytes();
        let flat = self.flat.data();
        let mut bytes = Vec::with_capacity(size.min(self.flat.len()));
        let mut remaining = size;

        for cluster in self.chain_clusters(start_cluster) {
            if remaining == 0 {
                break;
            }
            let offset = self.cluster_offset(cluster);
            if offset >= flat.len() {
                break;
            }
            let want = cluster_bytes.min(remaining);
            let take = want.min(flat.len() - offset);
            bytes.extend_from_slice(&flat[offset..offset + take]);
            remaining -= take;
            if take < want {
                // Flat image ended mid-cluster.
                break;
            }
        }

        bytes
    }

    /// Read a file's bytes from its directory entry.
    pub fn read_file(&self, entry: &DirEntry) -> Vec<u8> {
        self.read_chain(entry.cluster, entry.size as usize)
    }

    /// A directory's full content. Directories have no recorded size; the
    /// chain is read to its end.
    fn directory_bytes(&self, start_cluster: u16) -> Vec<u8> {
        let cluster_bytes = self.cluster_bytes();
        let flat = self.flat.data();
        let mut bytes = Vec::new();

        for cluster in self.chain_clusters(start_cluster) {
            let offset = self.cluster_offset(cluster);
            if offset >= flat.len() {
                break;
            }
            let take = cluster_bytes.min(flat.len() - offset);
            bytes.extend_from_slice(&flat[offset..offset + take]);
        }

        bytes
    }

    fn root_directory_bytes(&self) -> &[u8] {
        let start = self.root_start().min(self.flat.len());
        let end = (self.root_start() + self.root_byte_count()).min(self.flat.len());
        &self.flat.data()[start..end]
    }

    /// Parse one directory level without paths: the root when `cluster` is
    /// `None`, a subdirectory chain otherwise. The `.` and `..` entries are
    /// included.
    pub fn directory(&self, cluster: Option<u16>) -> Vec<DirEntry> {
        match cluster {
            None => parse_directory(self.root_directory_bytes()),
            Some(cluster) => parse_directory(&self.directory_bytes(cluster)),
        }
    }

    /// Recursively walk the volume, producing a flattened list of entries
    /// with `/`-joined paths. Root entries have no leading slash; the `.`
    /// and `..` bookkeeping entries are filtered.
    pub fn walk(&self) -> Vec<DirEntry> {
        let mut entries = Vec::new();
        let mut visited: HashSet<u16> = HashSet::new();
        let root = self.root_directory_bytes().to_vec();
        self.walk_directory(&root, "", &mut visited, &mut entries);
        entries
    }

    fn walk_directory(&self, buf: &[u8], prefix: &str, visited: &mut HashSet<u16>, out: &mut Vec<DirEntry>) {
        for mut entry in parse_directory(buf) {
            if entry.is_synthetic() {
                continue;
            }

            entry.path = join_path(prefix, &entry.name);
            let descend = entry.is_dir() && entry.cluster >= 2;
            let cluster = entry.cluster;
            let path = entry.path.clone();
            out.push(entry);

            // The visited set keeps a corrupt directory graph from
            // recursing forever.
            if descend && visited.insert(cluster) {
                let sub = self.directory_bytes(cluster);
                self.walk_directory(&sub, &path, visited, out);
            }
        }
    }

    /// Scan the volume for deleted entries, recursing through live
    /// subdirectories, and judge each one's recoverability.
    pub fn deleted_entries(&self) -> Vec<DeletedEntry> {
        let mut deleted = Vec::new();
        let mut visited: HashSet<u16> = HashSet::new();
        let root = self.root_directory_bytes().to_vec();
        self.scan_deleted(&root, "", &mut visited, &mut deleted);
        deleted
    }

    fn scan_deleted(&self, buf: &[u8], prefix: &str, visited: &mut HashSet<u16>, out: &mut Vec<DeletedEntry>) {
        for mut del in undelete::scan_directory(buf, &self.table, self.cluster_bytes()) {
            del.entry.path = join_path(prefix, &del.entry.name);
            out.push(del);
        }

        for entry in parse_directory(buf) {
            if entry.is_synthetic() || !entry.is_dir() || entry.cluster < 2 {
                continue;
            }
            if visited.insert(entry.cluster) {
                let sub = self.directory_bytes(entry.cluster);
                self.scan_deleted(&sub, &join_path(prefix, &entry.name), visited, out);
            }
        }
    }

    /// Read a deleted file back from consecutive clusters starting at
    /// `start_cluster`, ignoring the FAT - deletion zeroed the chain. Reads
    /// `size` bytes or whatever prefix the flat image still holds.
    pub fn recover_file(&self, start_cluster: u16, size: u32) -> Result<Vec<u8>, FileSystemError> {
        if start_cluster < 2 || start_cluster as usize >= self.table.len() {
            return Err(FileSystemError::InvalidCluster(start_cluster));
        }
        if self.cluster_offset(start_cluster) >= self.flat.len() {
            return Err(FileSystemError::InvalidCluster(start_cluster));
        }

        let cluster_bytes = self.cluster_bytes();
        let flat = self.flat.data();
        let mut bytes = Vec::with_capacity(size as usize);
        let mut remaining = size as usize;
        let mut cluster = start_cluster;

        while remaining > 0 {
            let offset = self.cluster_offset(cluster);
            if offset >= flat.len() {
                break;
            }
            let take = cluster_bytes.min(remaining).min(flat.len() - offset);
            bytes.extend_from_slice(&flat[offset..offset + take]);
            remaining -= take;
            cluster += 1;
        }

        Ok(bytes)
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    }
    else {
        format!("{}/{}", prefix, name)
    }
}
