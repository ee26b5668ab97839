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

use crate::args::{DirParams, GlobalOptions};
use edskit::Fat12Volume;

pub(crate) fn run_dir(_global: &GlobalOptions, params: &DirParams) -> Result<(), Error> {
    let image = crate::load_image(&params.in_file)?;
    let volume = Fat12Volume::mount(&image)?;

    for entry in volume.walk() {
        if entry.is_volume_label() {
            println!("Volume label: {}", entry.name);
            continue;
        }
        let kind = if entry.is_dir() { "<DIR>" } else { "     " };
        println!("{} {} {:>9}  {}", entry.modified, kind, entry.size, entry.path);
    }

    Ok(())
}

pub(crate) fn run_deleted(_global: &GlobalOptions, params: &DirParams) -> Result<(), Error> {
    let image = crate::load_image(&params.in_file)?;
    let volume = Fat12Volume::mount(&image)?;

    let deleted = volume.deleted_entries();
    if deleted.is_empty() {
        println!("No deleted entries found.");
        return Ok(());
    }

    for del in deleted {
        let verdict = if del.recoverable { "recoverable" } else { "lost" };
        println!(
            "{} {:>9}  {:<24} {} ({})",
            del.entry.modified, del.entry.size, del.entry.path, verdict, del.reason
        );
    }

    Ok(())
}
