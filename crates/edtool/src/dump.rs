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

use crate::args::{DumpParams, GlobalOptions};
use edskit::{util::dump_sector, DiskCh};

pub(crate) fn run(_global: &GlobalOptions, params: &DumpParams) -> Result<(), Error> {
    let image = crate::load_image(&params.in_file)?;
    let ch = DiskCh::new(params.cylinder, params.head);

    let track = image.track(ch).ok_or_else(|| anyhow!("No track {}", ch))?;
    let sector = track
        .sectors
        .iter()
        .find(|s| s.id.r() == params.sector)
        .ok_or_else(|| anyhow!("Sector {:#04X} not found on {}", params.sector, ch))?;
    let data = image
        .sector_data(sector)
        .ok_or_else(|| anyhow!("Sector {:#04X} on {} has no recorded data", params.sector, ch))?;

    println!("Track {}:", ch);
    dump_sector(sector, data, std::io::stdout().lock())?;

    Ok(())
}
