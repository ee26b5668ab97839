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

use crate::MAXIMUM_SECTOR_SIZE;
use std::fmt::Display;

/// A physical track address: cylinder and head. DSK containers store both as
/// single bytes in the track information block.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Default)]
pub struct DiskCh {
    c: u8,
    h: u8,
}

impl From<(u8, u8)> for DiskCh {
    fn from((c, h): (u8, u8)) -> Self {
        Self { c, h }
    }
}

impl Display for DiskCh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[c:{} h:{}]", self.c, self.h)
    }
}

impl DiskCh {
    pub fn new(c: u8, h: u8) -> Self {
        Self { c, h }
    }

    pub fn get(&self) -> (u8, u8) {
        (self.c, self.h)
    }
    pub fn c(&self) -> u8 {
        self.c
    }
    pub fn h(&self) -> u8 {
        self.h
    }
}

/// A sector address as recorded in the FDC ID field: Cylinder, Head, Record
/// and size code N. The record id (R) is the value software addresses sectors
/// by; C and H merely echo what the formatter wrote and may disagree with the
/// physical track on copy-protected disks.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Default)]
pub struct SectorId {
    c: u8,
    h: u8,
    r: u8,
    n: u8,
}

impl From<(u8, u8, u8, u8)> for SectorId {
    fn from((c, h, r, n): (u8, u8, u8, u8)) -> Self {
        Self { c, h, r, n }
    }
}

impl Display for SectorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[c:{} h:{} r:{:#04X} n:{}]", self.c, self.h, self.r, self.n)
    }
}

#[allow(dead_code)]
impl SectorId {
    pub fn new(c: u8, h: u8, r: u8, n: u8) -> Self {
        Self { c, h, r, n }
    }

    pub fn get(&self) -> (u8, u8, u8, u8) {
        (self.c, self.h, self.r, self.n)
    }
    pub fn c(&self) -> u8 {
        self.c
    }
    pub fn h(&self) -> u8 {
        self.h
    }
    pub fn r(&self) -> u8 {
        self.r
    }
    pub fn n(&self) -> u8 {
        self.n
    }

    /// Return the size in bytes implied by the 'n' parameter.
    /// The formula for calculating size from n is (128 * 2^n)
    /// We enforce a maximum size of 8192 bytes for a single sector.
    pub fn n_size(&self) -> usize {
        Self::n_to_bytes(self.n)
    }

    pub fn n_to_bytes(n: u8) -> usize {
        std::cmp::min(MAXIMUM_SECTOR_SIZE, 128usize.overflowing_shl(n as u32).0)
    }

    pub fn bytes_to_n(size: usize) -> u8 {
        let mut n = 0;
        let mut size = size;
        while size > 128 {
            size >>= 1;
            n += 1;
        }
        n
    }
}
