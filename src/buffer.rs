use std::io::Write;

use crate::error::{Error, Result};

/// The growable byte store every write call appends to.
///
/// Offsets handed out by [`OutputBuffer::size`] are absolute for the whole session: flushing
/// discards the buffered bytes but does not move the offsets of the bytes that follow. Integers
/// are always written little-endian.
#[derive(Debug, Default)]
pub(crate) struct OutputBuffer {
    bytes: Vec<u8>,

    /// Number of bytes already handed to a sink.
    flushed: usize,

    /// Whether flushing keeps the allocation of `bytes` for the bytes that follow.
    reuse: bool,
}

impl OutputBuffer {
    /// Start a session on top of storage recycled from a previous one.
    pub(crate) fn with_storage(mut storage: Vec<u8>, reuse: bool) -> Self {
        storage.clear();
        Self {
            bytes: storage,
            flushed: 0,
            reuse,
        }
    }

    /// The absolute offset of the next byte to be written.
    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.flushed + self.bytes.len()
    }

    /// The bytes that have not been flushed yet.
    #[inline]
    pub(crate) fn pending(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub(crate) fn append_byte(&mut self, b: u8) {
        self.bytes.push(b);
    }

    #[inline]
    pub(crate) fn append_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    #[inline]
    pub(crate) fn append_i32(&mut self, val: i32) {
        self.bytes.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub(crate) fn append_i64(&mut self, val: i64) {
        self.bytes.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub(crate) fn append_f64(&mut self, val: f64) {
        self.bytes.extend_from_slice(&val.to_le_bytes());
    }

    /// Append the UTF-8 bytes of `s`, returning how many were written.
    #[inline]
    pub(crate) fn append_utf8(&mut self, s: &str) -> usize {
        self.bytes.extend_from_slice(s.as_bytes());
        s.len()
    }

    /// Append `s` as UTF-16 code units, returning how many bytes were written.
    pub(crate) fn append_utf16(&mut self, s: &str) -> usize {
        let start = self.bytes.len();
        for unit in s.encode_utf16() {
            self.bytes.extend_from_slice(&unit.to_le_bytes());
        }
        self.bytes.len() - start
    }

    /// Overwrite the byte at an earlier absolute offset without moving the cursor.
    pub(crate) fn patch_byte(&mut self, offset: usize, b: u8) -> Result<()> {
        let at = self.local(offset, 1)?;
        self.bytes[at] = b;
        Ok(())
    }

    /// Overwrite four bytes at an earlier absolute offset without moving the cursor.
    pub(crate) fn patch_i32(&mut self, offset: usize, val: i32) -> Result<()> {
        let at = self.local(offset, 4)?;
        self.bytes[at..at + 4].copy_from_slice(&val.to_le_bytes());
        Ok(())
    }

    fn local(&self, offset: usize, width: usize) -> Result<usize> {
        if offset < self.flushed {
            return Err(Error::flushed_region(offset));
        }
        let at = offset - self.flushed;
        if at + width > self.bytes.len() {
            return Err(Error::protocol_violation(format!(
                "patch of {width} bytes at offset {offset} is past the end of the buffer ({})",
                self.size()
            )));
        }
        Ok(at)
    }

    /// Write the buffered bytes to `sink` and discard them.
    pub(crate) fn flush_to<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<()> {
        if self.bytes.is_empty() {
            return Ok(());
        }
        sink.write_all(&self.bytes)?;
        self.flushed += self.bytes.len();
        if self.reuse {
            self.bytes.clear();
        } else {
            self.bytes = Vec::new();
        }
        Ok(())
    }

    /// Drop every buffered byte without writing it anywhere.
    pub(crate) fn clear(&mut self) {
        self.flushed += self.bytes.len();
        self.bytes.clear();
    }

    /// Give back the underlying storage, emptied, so another session can reuse it.
    pub(crate) fn into_storage(mut self) -> Vec<u8> {
        self.bytes.clear();
        self.bytes
    }
}
