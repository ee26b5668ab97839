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

//! Incremental line splitting for subprocess output. The `gw` tool redraws
//! progress in place with bare carriage returns, so `\r`, `\n` and `\r\n`
//! must all count as line breaks, across arbitrary chunk boundaries.

#[derive(Default)]
pub(crate) struct LineSplitter {
    pending: Vec<u8>,
    last_was_cr: bool,
}

impl LineSplitter {
    /// Feed one chunk of raw output, returning the lines it completed.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        for &byte in chunk {
            match byte {
                b'\r' => {
                    lines.push(self.take_pending());
                    self.last_was_cr = true;
                }
                b'\n' => {
                    // The \n of a \r\n pair was already split on the \r.
                    if !self.last_was_cr {
                        lines.push(self.take_pending());
                    }
                    self.last_was_cr = false;
                }
                _ => {
                    self.pending.push(byte);
                    self.last_was_cr = false;
                }
            }
        }

        lines
    }

    /// Return any unterminated trailing line.
    pub(crate) fn flush(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        }
        else {
            Some(self.take_pending())
        }
    }

    fn take_pending(&mut self) -> String {
        String::from_utf8_lossy(&std::mem::take(&mut self.pending)).into_owned()
    }
}
