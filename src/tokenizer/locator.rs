use std::io::{self, BufRead, Read};

use crate::error::ParseLocation;

/// `BufRead` adapter that records where lines start as bytes are consumed,
/// so byte offsets reported by the tokenizer map back to line and column.
pub(super) struct LineTracker<R> {
    inner: R,
    consumed: u64,
    newlines: Vec<u64>,
}

impl<R: BufRead> LineTracker<R> {
    pub(super) fn new(inner: R) -> Self {
        Self {
            inner,
            consumed: 0,
            newlines: Vec::new(),
        }
    }

    /// Map a byte offset (no greater than what has been consumed) to a
    /// 1-based line and column.
    pub(super) fn locate(&self, offset: u64) -> ParseLocation {
        let offset = offset.min(self.consumed);
        let preceding = self.newlines.partition_point(|&newline| newline < offset);
        let line_start = match preceding {
            0 => 0,
            n => self.newlines[n - 1] + 1,
        };
        ParseLocation {
            line: preceding as u64 + 1,
            column: offset - line_start + 1,
        }
    }
}

impl<R: BufRead> Read for LineTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = {
            let available = self.fill_buf()?;
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            n
        };
        self.consume(n);
        Ok(n)
    }
}

impl<R: BufRead> BufRead for LineTracker<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        if amt > 0 {
            // The buffer already holds at least `amt` bytes, so this does no I/O.
            if let Ok(buffered) = self.inner.fill_buf() {
                let taken = &buffered[..amt.min(buffered.len())];
                let base = self.consumed;
                self.newlines
                    .extend(memchr::memchr_iter(b'\n', taken).map(|i| base + i as u64));
            }
        }
        self.consumed += amt as u64;
        self.inner.consume(amt);
    }
}
