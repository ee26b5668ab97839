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

pub mod args;
mod device;
mod dir;
mod dump;
mod extract;
mod info;

use anyhow::{anyhow, Error};
use std::path::Path;

use args::{command_parser, Command};
use edskit::DiskImage;

fn main() -> Result<(), Error> {
    env_logger::init();

    let app_params = command_parser().run();

    let command_result = match &app_params.command {
        Command::Version => {
            println!("edtool v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Info(params) => info::run(&app_params.global, params),
        Command::Dump(params) => dump::run(&app_params.global, params),
        Command::Dir(params) => dir::run_dir(&app_params.global, params),
        Command::Deleted(params) => dir::run_deleted(&app_params.global, params),
        Command::Extract(params) => extract::run(&app_params.global, params),
        Command::Read(params) => device::run_read(&app_params.global, params),
        Command::Rpm(params) => device::run_rpm(&app_params.global, params),
    };

    match command_result {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("Command '{}' failed: {}", app_params.command, e);
            for cause in e.chain().skip(1) {
                eprintln!("Caused by: {}", cause);
            }
            std::process::exit(1);
        }
    }
}

pub(crate) fn load_image(path: &Path) -> Result<DiskImage, Error> {
    let buffer = std::fs::read(path)?;
    DiskImage::load(buffer).map_err(|e| anyhow!("Loading {}: {}", path.display(), e))
}
