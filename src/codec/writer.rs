//! Offset-tracking message writer.
//!
//! Several WSP sub-structures must start at a 4- or 8-byte-aligned offset
//! relative to the *message start*, header included. `MessageWriter` wraps a
//! [`bytes::BytesMut`] and tracks that absolute offset so padding can be
//! inserted correctly even though the 16-byte frame header is prepended
//! later. Length fields whose value depends on content written after them
//! are reserved and backpatched.
//!
//! # Example
//!
//! ```
//! use wsp_client::codec::MessageWriter;
//!
//! // Payload writer for a framed message: offsets start after the header.
//! let mut w = MessageWriter::with_base_offset(16);
//! w.put_u32(7);
//! let pad = w.align_to(8);
//! assert_eq!(pad, 4);
//! assert_eq!(w.offset() % 8, 0);
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

use crate::error::{Result, WspError};

/// Growable little-endian byte writer with message-relative offset tracking.
#[derive(Debug, Default)]
pub struct MessageWriter {
    buf: BytesMut,
    base: usize,
}

impl MessageWriter {
    /// Create a writer whose first byte sits at message offset 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer whose first byte sits at `base` bytes from the
    /// message start (16 for payloads written after the frame header).
    pub fn with_base_offset(base: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            base,
        }
    }

    /// Current offset from the message start, padding included.
    #[inline]
    pub fn offset(&self) -> usize {
        self.base + self.buf.len()
    }

    /// Number of bytes written so far (excluding the base offset).
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Insert zero bytes until the next write lands on a `boundary`-byte
    /// boundary relative to the message start. Returns the padding length.
    pub fn align_to(&mut self, boundary: usize) -> usize {
        let misalign = self.offset() % boundary;
        if misalign == 0 {
            return 0;
        }
        let pad = boundary - misalign;
        self.buf.put_bytes(0, pad);
        pad
    }

    #[inline]
    pub fn put_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    #[inline]
    pub fn put_u16(&mut self, v: u16) {
        self.buf.put_u16_le(v);
    }

    #[inline]
    pub fn put_i32(&mut self, v: i32) {
        self.buf.put_i32_le(v);
    }

    #[inline]
    pub fn put_u32(&mut self, v: u32) {
        self.buf.put_u32_le(v);
    }

    #[inline]
    pub fn put_i64(&mut self, v: i64) {
        self.buf.put_i64_le(v);
    }

    #[inline]
    pub fn put_u64(&mut self, v: u64) {
        self.buf.put_u64_le(v);
    }

    #[inline]
    pub fn put_f32(&mut self, v: f32) {
        self.buf.put_f32_le(v);
    }

    #[inline]
    pub fn put_f64(&mut self, v: f64) {
        self.buf.put_f64_le(v);
    }

    #[inline]
    pub fn put_slice(&mut self, v: &[u8]) {
        self.buf.put_slice(v);
    }

    /// Write `n` zero bytes.
    #[inline]
    pub fn put_zeros(&mut self, n: usize) {
        self.buf.put_bytes(0, n);
    }

    /// Write a GUID in Windows wire order: the first three fields
    /// little-endian, the final eight bytes verbatim.
    pub fn put_guid(&mut self, guid: &Uuid) {
        let (d1, d2, d3, d4) = guid.as_fields();
        self.buf.put_u32_le(d1);
        self.buf.put_u16_le(d2);
        self.buf.put_u16_le(d3);
        self.buf.put_slice(d4);
    }

    /// Write a string as UTF-16LE code units, without a terminator.
    pub fn put_unicode(&mut self, s: &str) {
        for unit in s.encode_utf16() {
            self.buf.put_u16_le(unit);
        }
    }

    /// Write a null-terminated UTF-16LE string.
    pub fn put_unicode_z(&mut self, s: &str) {
        self.put_unicode(s);
        self.buf.put_u16_le(0);
    }

    /// Reserve a u32 slot (written as 0) and return its position for a
    /// later [`patch_u32`](Self::patch_u32).
    pub fn reserve_u32(&mut self) -> usize {
        let pos = self.buf.len();
        self.buf.put_u32_le(0);
        pos
    }

    /// Overwrite a previously reserved u32 slot.
    pub fn patch_u32(&mut self, pos: usize, value: u32) -> Result<()> {
        if pos + 4 > self.buf.len() {
            return Err(WspError::Build(format!(
                "patch position {} out of bounds (len {})",
                pos,
                self.buf.len()
            )));
        }
        self.buf[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Freeze the written bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    /// Borrow the written bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::uuid;

    #[test]
    fn test_alignment_padding_lengths() {
        // For every starting offset 0..7 the padding must be (8 - off) % 8.
        for off in 0..8usize {
            let mut w = MessageWriter::new();
            w.put_zeros(off);
            let pad = w.align_to(8);
            assert_eq!(pad, (8 - off) % 8, "offset {}", off);
            assert_eq!(w.offset() % 8, 0);
        }
    }

    #[test]
    fn test_alignment_counts_base_offset() {
        let mut w = MessageWriter::with_base_offset(16);
        w.put_u32(1);
        assert_eq!(w.offset(), 20);
        assert_eq!(w.align_to(8), 4);
        assert_eq!(w.offset(), 24);
        // Already aligned: no padding.
        assert_eq!(w.align_to(8), 0);
    }

    #[test]
    fn test_patch_u32_roundtrip() {
        let mut w = MessageWriter::new();
        let pos = w.reserve_u32();
        w.put_u32(0xAABBCCDD);
        w.patch_u32(pos, 42).unwrap();
        let bytes = w.into_bytes();
        assert_eq!(&bytes[0..4], &42u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &0xAABBCCDDu32.to_le_bytes());
    }

    #[test]
    fn test_patch_out_of_bounds_rejected() {
        let mut w = MessageWriter::new();
        assert!(w.patch_u32(0, 1).is_err());
    }

    #[test]
    fn test_guid_wire_order() {
        let guid = uuid!("a9bd1526-6a80-11d0-8c9d-0020af1d740e");
        let mut w = MessageWriter::new();
        w.put_guid(&guid);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 16);
        // First field little-endian.
        assert_eq!(&bytes[0..4], &[0x26, 0x15, 0xBD, 0xA9]);
        assert_eq!(&bytes[4..6], &[0x80, 0x6A]);
        assert_eq!(&bytes[6..8], &[0xD0, 0x11]);
        // Trailing eight bytes verbatim.
        assert_eq!(
            &bytes[8..16],
            &[0x8C, 0x9D, 0x00, 0x20, 0xAF, 0x1D, 0x74, 0x0E]
        );
    }

    #[test]
    fn test_unicode_z_terminator() {
        let mut w = MessageWriter::new();
        w.put_unicode_z("ab");
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..], &[b'a', 0, b'b', 0, 0, 0]);
    }
}
