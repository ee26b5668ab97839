/*
    edtool
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
use anyhow::Error;

use crate::args::{GlobalOptions, InfoParams};
use edskit::{detect_filesystem, DiskFilesystem};

pub(crate) fn run(_global: &GlobalOptions, params: &InfoParams) -> Result<(), Error> {
    let image = crate::load_image(&params.in_file)?;

    println!("Format:  {}", image.format());
    println!("Creator: {}", image.creator());
    println!("Tracks:  {} Sides: {}", image.tracks(), image.sides());

    match detect_filesystem(&image) {
        DiskFilesystem::Fat(bpb) => {
            println!(
                "Filesystem: FAT ({}), {} bytes/sector, {} sectors, volume {:?}",
                bpb.fs_type(),
                bpb.bytes_per_sector,
                bpb.total_sectors(),
                bpb.volume_label()
            );
        }
        DiskFilesystem::Cpc { note } => println!("Filesystem: {}", note),
        DiskFilesystem::Unknown => println!("Filesystem: unknown"),
    }

    println!();
    for track in image.track_entries() {
        if track.missing {
            println!("{}: missing", track.ch);
            continue;
        }

        let errors = track.sectors.iter().filter(|s| s.has_error()).count();
        let truncated = track.sectors.iter().filter(|s| s.truncated).count();
        print!(
            "{}: {} sectors, {} bytes @ {:#X}",
            track.ch,
            track.sectors.len(),
            track.size,
            track.offset.unwrap_or(0)
        );
        if errors > 0 {
            print!(", {} with FDC errors", errors);
        }
        if truncated > 0 {
            print!(", {} truncated", truncated);
        }
        println!();

        if params.sectors {
            for sector in &track.sectors {
                print!("    {} {} bytes", sector.id, sector.size);
                if sector.has_error() {
                    print!("  [{}]", sector.error_flags().join(" "));
                }
                if sector.truncated {
                    print!("  [TRUNCATED]");
                }
                println!();
            }
        }
    }

    Ok(())
}
