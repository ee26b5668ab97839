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

    src/fdc.rs

    NEC µPD765 status register decoding. DSK containers record the ST1 and
    ST2 registers the controller reported when each sector was read; a
    non-zero register usually marks a weak, protected or damaged sector.
*/

use bitflags::bitflags;

bitflags! {
    /// Bits of the FDC ST1 status register, as recorded per sector.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[rustfmt::skip]
    pub struct St1Flags: u8 {
        #[doc = "End of Cylinder: the controller ran past the final sector of the track"]
        const END_OF_CYLINDER       = 0b1000_0000;
        #[doc = "Data Error: CRC failure in the ID field"]
        const DATA_ERROR_IN_ID      = 0b0010_0000;
        #[doc = "No Data: the addressed sector was not found"]
        const NO_DATA               = 0b0000_0100;
        #[doc = "Not Writable: the medium was write protected"]
        const NOT_WRITABLE          = 0b0000_0010;
        #[doc = "Missing Address Mark"]
        const MISSING_ADDRESS_MARK  = 0b0000_0001;
    }
}

bitflags! {
    /// Bits of the FDC ST2 status register, as recorded per sector.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[rustfmt::skip]
    pub struct St2Flags: u8 {
        #[doc = "Control Mark: a deleted data address mark was encountered"]
        const CONTROL_MARK          = 0b0100_0000;
        #[doc = "Data Error: CRC failure in the data field"]
        const DATA_ERROR_IN_DATA    = 0b0010_0000;
        #[doc = "Wrong Cylinder: the ID field cylinder did not match the seek position"]
        const WRONG_CYLINDER        = 0b0000_0100;
        #[doc = "Bad Cylinder: the ID field cylinder read 0xFF"]
        const BAD_CYLINDER          = 0b0000_0010;
        #[doc = "Missing Data Address Mark"]
        const MISSING_DATA_MARK     = 0b0000_0001;
    }
}

/// Collect the names of all set bits across both status registers, for
/// display in listings and sector health reports.
pub fn status_flag_names(st1: St1Flags, st2: St2Flags) -> Vec<&'static str> {
    let mut names = Vec::new();
    for (name, _) in st1.iter_names() {
        names.push(name);
    }
    for (name, _) in st2.iter_names() {
        names.push(name);
    }
    names
}
