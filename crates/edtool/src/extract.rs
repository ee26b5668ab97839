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
use anyhow::{anyhow, Error};

use crate::args::{ExtractParams, GlobalOptions};
use edskit::Fat12Volume;

pub(crate) fn run(global: &GlobalOptions, params: &ExtractParams) -> Result<(), Error> {
    let image = crate::load_image(&params.in_file)?;
    let volume = Fat12Volume::mount(&image)?;

    let entry = volume
        .walk()
        .into_iter()
        .find(|e| !e.is_dir() && e.path.eq_ignore_ascii_case(&params.path))
        .ok_or_else(|| anyhow!("No file {:?} in {}", params.path, params.in_file.display()))?;

    let bytes = volume.read_file(&entry);
    if bytes.len() < entry.size as usize {
        log::warn!(
            "extract: {} is {} bytes on disk but only {} readable",
            entry.path,
            entry.size,
            bytes.len()
        );
    }

    std::fs::write(&params.out_file, &bytes)?;
    if !global.silent {
        println!("Wrote {} bytes to {}", bytes.len(), params.out_file.display());
    }

    Ok(())
}
