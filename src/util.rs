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

//! The `util` module provides various utility functions.

use std::io::Write;

use crate::{DiskImageError, SectorEntry};

fn is_printable(byte: u8) -> bool {
    (0x20..0x7F).contains(&byte)
}

fn glyph(byte: u8) -> char {
    if is_printable(byte) {
        byte as char
    }
    else {
        '.'
    }
}

/// Decode a fixed-width ASCII field as found in disk headers and boot
/// sectors: printable characters only, NUL padding stripped, surrounding
/// whitespace trimmed.
pub fn ascii_field(bytes: &[u8]) -> String {
    let mut string = String::new();
    for &b in bytes {
        if b == 0 {
            break;
        }
        if is_printable(b) {
            string.push(b as char);
        }
    }
    string.trim().to_string()
}

/// Write a hex + ASCII dump of a byte slice, `width` bytes per row,
/// addressed from `base`.
pub fn hex_dump<W: Write>(data: &[u8], base: usize, width: usize, mut out: W) -> Result<(), DiskImageError> {
    let width = width.max(1);

    for (row, chunk) in data.chunks(width).enumerate() {
        write!(out, "{:05X} | ", base + row * width)?;
        for col in 0..width {
            match chunk.get(col) {
                Some(byte) => write!(out, "{:02X} ", byte)?,
                None => write!(out, "   ")?,
            }
        }
        write!(out, "| ")?;
        for &byte in chunk {
            write!(out, "{}", glyph(byte))?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Dump one sector: an ID line carrying the CHRN quartet, truncation state
/// and any recorded FDC status bits, followed by the payload in hex.
pub fn dump_sector<W: Write>(sector: &SectorEntry, data: &[u8], mut out: W) -> Result<(), DiskImageError> {
    write!(out, "{} {} bytes", sector.id, data.len())?;
    if sector.truncated {
        write!(out, " (truncated)")?;
    }
    if sector.has_error() {
        write!(out, " [{}]", sector.error_flags().join(" "))?;
    }
    writeln!(out)?;

    hex_dump(data, 0, 16, out)
}
