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

    Greaseweazle commands. These spin up a small tokio runtime; the rest of
    edtool stays synchronous.
*/
use anyhow::Error;

use crate::args::{GlobalOptions, ReadParams, RpmParams};
use edskit::acquisition::{CancelToken, Greaseweazle, ReadOptions};

fn runtime() -> Result<tokio::runtime::Runtime, Error> {
    Ok(tokio::runtime::Builder::new_current_thread().enable_all().build()?)
}

fn coordinator(gw: &Option<String>) -> Greaseweazle {
    match gw {
        Some(command) => Greaseweazle::with_command(command),
        None => Greaseweazle::new(),
    }
}

pub(crate) fn run_read(global: &GlobalOptions, params: &ReadParams) -> Result<(), Error> {
    let gw = coordinator(&params.gw);
    let options = ReadOptions {
        format: params.format.clone(),
        tracks: params.tracks.clone(),
        revs: params.revs,
        retries: params.retries,
    };

    let silent = global.silent;
    let progress: Box<dyn Fn(&str) + Send + Sync> = Box::new(move |line: &str| {
        if !silent {
            println!("{}", line);
        }
    });

    let cancel = CancelToken::new();
    let ctrl_c_cancel = cancel.clone();

    let last_line = runtime()?.block_on(async move {
        // Ctrl-C aborts the read and lets the coordinator report Cancelled.
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c_cancel.cancel();
            }
        });

        gw.read(&params.out_file, options, progress, cancel).await
    })?;

    if !global.silent {
        println!("Read complete: {}", last_line);
    }
    Ok(())
}

pub(crate) fn run_rpm(_global: &GlobalOptions, params: &RpmParams) -> Result<(), Error> {
    let gw = coordinator(&params.gw);
    let rpm = runtime()?.block_on(async { gw.rpm().await })?;
    println!("{:.1} RPM", rpm);
    Ok(())
}
