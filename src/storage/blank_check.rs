//! Blank-check scanner
//!
//! Walks a flash range in 16-byte chunks and reports the chunks holding any
//! non-erased byte. Dirty chunks are produced lazily so long blank stretches
//! cost nothing beyond the read, while every offending byte is still counted.
//!
//! # Example
//!
//! ```ignore
//! let mut scan = BlankScan::new(&flash, 0..0x20_0000)?;
//! for chunk in &mut scan {
//!     let chunk = chunk?;
//!     render_dump_line(chunk.address, &chunk.bytes);
//! }
//! let result = scan.finish()?;
//! ```

use crate::platform::traits::{FlashInterface, ERASED_BYTE};
use crate::platform::{FlashError, PlatformError, Result};
use core::ops::Range;

/// Bytes classified together as blank or dirty
pub const CHUNK_SIZE: usize = 16;

/// A 16-byte run holding at least one non-erased byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirtyChunk {
    /// Flash offset of the first byte
    pub address: u32,
    /// Raw chunk content
    pub bytes: [u8; CHUNK_SIZE],
}

impl DirtyChunk {
    /// Number of non-erased bytes in the chunk
    pub fn mismatches(&self) -> u32 {
        count_dirty(&self.bytes)
    }
}

/// Final tally of a completed scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlankCheckResult {
    /// First offset scanned
    pub start: u32,
    /// One past the last offset scanned
    pub end: u32,
    /// Chunks read
    pub chunks_scanned: u32,
    /// Chunks with at least one non-erased byte
    pub dirty_chunks: u32,
    /// Non-erased bytes across the whole range
    pub total_mismatches: u64,
}

impl BlankCheckResult {
    /// Whether every byte in the range was erased
    pub fn is_blank(&self) -> bool {
        self.total_mismatches == 0
    }
}

fn count_dirty(bytes: &[u8]) -> u32 {
    bytes.iter().filter(|&&b| b != ERASED_BYTE).count() as u32
}

/// Single-pass scan over a flash range
///
/// Iterating yields only dirty chunks. A read failure is yielded once and ends
/// the scan. [`finish`](Self::finish) drains whatever is left and returns the
/// totals.
pub struct BlankScan<'a, F> {
    flash: &'a F,
    start: u32,
    next: u32,
    end: u32,
    chunks_scanned: u32,
    dirty_chunks: u32,
    total_mismatches: u64,
    failed: bool,
}

impl<'a, F: FlashInterface> BlankScan<'a, F> {
    /// Prepare a scan of `range`
    ///
    /// The start is rounded down and the end rounded up to a chunk boundary, so
    /// a scan can be restarted from any aligned offset.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Flash(FlashError::InvalidAddress)` if the range is
    /// reversed or extends past the flash capacity.
    pub fn new(flash: &'a F, range: Range<u32>) -> Result<Self> {
        let chunk = CHUNK_SIZE as u32;
        if range.start > range.end || range.end > flash.capacity() {
            return Err(PlatformError::Flash(FlashError::InvalidAddress));
        }

        let start = range.start - range.start % chunk;
        if start != range.start {
            crate::log_warn!(
                "Blank check start {:#x} not chunk-aligned, starting at {:#x}",
                range.start,
                start
            );
        }
        let end = range.end.div_ceil(chunk) * chunk;

        Ok(Self {
            flash,
            start,
            next: start,
            end,
            chunks_scanned: 0,
            dirty_chunks: 0,
            total_mismatches: 0,
            failed: false,
        })
    }

    /// Offset of the next chunk to be read
    pub fn position(&self) -> u32 {
        self.next
    }

    /// Drain the remaining chunks and return the totals
    ///
    /// # Errors
    ///
    /// Propagates the first read failure.
    pub fn finish(mut self) -> Result<BlankCheckResult> {
        for chunk in &mut self {
            chunk?;
        }
        Ok(BlankCheckResult {
            start: self.start,
            end: self.end,
            chunks_scanned: self.chunks_scanned,
            dirty_chunks: self.dirty_chunks,
            total_mismatches: self.total_mismatches,
        })
    }
}

impl<F: FlashInterface> Iterator for BlankScan<'_, F> {
    type Item = Result<DirtyChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.failed && self.next < self.end {
            let address = self.next;
            let mut bytes = [0u8; CHUNK_SIZE];
            if let Err(e) = self.flash.read(address, &mut bytes) {
                self.failed = true;
                return Some(Err(e));
            }

            self.next += CHUNK_SIZE as u32;
            self.chunks_scanned += 1;

            let dirty = count_dirty(&bytes);
            if dirty > 0 {
                self.dirty_chunks += 1;
                self.total_mismatches += u64::from(dirty);
                return Some(Ok(DirtyChunk { address, bytes }));
            }
        }
        None
    }
}
