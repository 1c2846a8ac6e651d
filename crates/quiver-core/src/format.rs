//! Engine state blob format
//!
//! Every engine blob starts with the same fixed header; engine-specific data
//! follows it.
//!
//! ```text
//! Offset   Size    Type        Description
//! ─────────────────────────────────────────────
//! 0x00     8       [u8; 8]     Magic: "QVRHNSW1" | "QVRFLAT1"
//! 0x08     4       u32 LE      D: Dimensions
//! 0x0C     8       u64 LE      Capacity (max elements)
//! 0x14     8       u64 LE      N: Number of elements
//! 0x1C     4       u32 LE      ef_search
//! 0x20     1       u8          Metric (0 cosine, 1 l2, 2 inner product)
//! 0x21     ...                 Engine body
//! ```
//!
//! All integers and floats are little endian. The trailing version digit in
//! the magic is bumped on any layout change; old blobs are rejected rather
//! than guessed at.

use crate::error::EngineError;
use crate::metric::Metric;

/// Magic bytes for an HNSW graph blob
pub const HNSW_MAGIC: [u8; 8] = *b"QVRHNSW1";

/// Magic bytes for a flat (exact) index blob
pub const FLAT_MAGIC: [u8; 8] = *b"QVRFLAT1";

/// Header size in bytes: 8 + 4 + 8 + 8 + 4 + 1
pub const HEADER_SIZE: usize = 33;

/// Common header shared by all engine blobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateHeader {
    pub magic: [u8; 8],
    pub dim: usize,
    pub capacity: usize,
    pub count: usize,
    pub ef_search: usize,
    pub metric: Metric,
}

impl StateHeader {
    pub(crate) fn write(&self, w: &mut StateWriter) {
        w.put_bytes(&self.magic);
        w.put_u32(self.dim as u32);
        w.put_u64(self.capacity as u64);
        w.put_u64(self.count as u64);
        w.put_u32(self.ef_search as u32);
        w.put_u8(self.metric.to_byte());
    }

    /// Read and sanity-check a header, requiring `expected` magic.
    pub(crate) fn read(r: &mut StateReader<'_>, expected: [u8; 8]) -> Result<Self, EngineError> {
        let magic: [u8; 8] = r
            .take(8)?
            .try_into()
            .map_err(|_| EngineError::InvalidState("short magic".into()))?;
        if magic != expected {
            return Err(EngineError::InvalidState(format!(
                "invalid magic: expected {}, got {:?}",
                String::from_utf8_lossy(&expected),
                String::from_utf8_lossy(&magic)
            )));
        }

        let dim = r.u32()? as usize;
        let capacity = r.u64()? as usize;
        let count = r.u64()? as usize;
        let ef_search = r.u32()? as usize;
        let metric_byte = r.u8()?;
        let metric = Metric::from_byte(metric_byte)
            .ok_or_else(|| EngineError::InvalidState(format!("unknown metric tag {metric_byte}")))?;

        if dim == 0 {
            return Err(EngineError::InvalidState("dimension is zero".into()));
        }
        if count > capacity {
            return Err(EngineError::InvalidState(format!(
                "element count {count} exceeds capacity {capacity}"
            )));
        }
        // Each element carries at least its vector; reject counts the blob cannot hold.
        let min_body = count.saturating_mul(dim.saturating_mul(4));
        if min_body > r.remaining() {
            return Err(EngineError::InvalidState(format!(
                "blob too short for {count} elements of dimension {dim}"
            )));
        }

        Ok(Self {
            magic,
            dim,
            capacity,
            count,
            ef_search,
            metric,
        })
    }
}

/// Append-only little-endian writer over a byte buffer
pub(crate) struct StateWriter {
    buf: Vec<u8>,
}

impl StateWriter {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub(crate) fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub(crate) fn put_vector(&mut self, v: &[f32]) {
        for x in v {
            self.buf.extend_from_slice(&x.to_le_bytes());
        }
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Bounds-checked little-endian reader. Never panics on malformed input.
pub(crate) struct StateReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> StateReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], EngineError> {
        if n > self.remaining() {
            return Err(EngineError::InvalidState(format!(
                "unexpected end of data at offset {} (wanted {} bytes, {} left)",
                self.pos,
                n,
                self.remaining()
            )));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, EngineError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u32(&mut self) -> Result<u32, EngineError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    pub(crate) fn u64(&mut self) -> Result<u64, EngineError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    pub(crate) fn vector(&mut self, dim: usize) -> Result<Vec<f32>, EngineError> {
        let bytes = self.take(dim.saturating_mul(4))?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Fail if any bytes are left over.
    pub(crate) fn finish(self) -> Result<(), EngineError> {
        if self.remaining() != 0 {
            return Err(EngineError::InvalidState(format!(
                "{} trailing bytes after engine state",
                self.remaining()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> StateHeader {
        StateHeader {
            magic: FLAT_MAGIC,
            dim: 3,
            capacity: 10,
            count: 0,
            ef_search: 50,
            metric: Metric::L2,
        }
    }

    #[test]
    fn test_header_size() {
        let mut w = StateWriter::with_capacity(HEADER_SIZE);
        header().write(&mut w);
        assert_eq!(w.finish().len(), HEADER_SIZE);
    }

    #[test]
    fn test_header_roundtrip() {
        let mut w = StateWriter::with_capacity(HEADER_SIZE);
        header().write(&mut w);
        let bytes = w.finish();

        let mut r = StateReader::new(&bytes);
        let parsed = StateHeader::read(&mut r, FLAT_MAGIC).unwrap();
        assert_eq!(parsed, header());
        r.finish().unwrap();
    }

    #[test]
    fn test_wrong_magic() {
        let mut w = StateWriter::with_capacity(HEADER_SIZE);
        header().write(&mut w);
        let bytes = w.finish();

        let mut r = StateReader::new(&bytes);
        let err = StateHeader::read(&mut r, HNSW_MAGIC).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
    }

    #[test]
    fn test_truncated_reads_fail_cleanly() {
        let mut r = StateReader::new(&[1, 2, 3]);
        assert!(r.u32().is_err());
        assert_eq!(r.u8().unwrap(), 1);
        assert!(r.vector(1).is_err());
    }

    #[test]
    fn test_count_larger_than_blob_is_rejected() {
        let mut h = header();
        h.count = 5;
        let mut w = StateWriter::with_capacity(HEADER_SIZE);
        h.write(&mut w);
        let bytes = w.finish();

        let mut r = StateReader::new(&bytes);
        assert!(StateHeader::read(&mut r, FLAT_MAGIC).is_err());
    }
}
