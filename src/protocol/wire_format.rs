//! Wire format: the 16-byte message header and the checksummed framer.
//!
//! Every request starts with four little-endian u32 fields:
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┐
//! │ msg      │ status   │ checksum │ reserved │
//! │ 4 bytes  │ 4 bytes  │ 4 bytes  │ 4 bytes  │
//! └──────────┴──────────┴──────────┴──────────┘
//! ```
//! Requests always carry status = 0 and reserved = 0. The checksum is
//! computed only for the allow-listed message types; everything else
//! carries checksum = 0.

use crate::protocol::consts::CHECKSUM_XOR_VALUE;

/// Header size in bytes (fixed, exactly 16).
pub const HEADER_SIZE: usize = 16;

/// Message type codes for every request this builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MessageType {
    ConnectIn = 0x000000C8,
    Disconnect = 0x000000C9,
    CreateQueryIn = 0x000000CA,
    FreeCursorIn = 0x000000CB,
    GetRowsIn = 0x000000CC,
    RatioFinishedIn = 0x000000CD,
    CompareBmkIn = 0x000000CE,
    GetApproximatePositionIn = 0x000000CF,
    SetBindingsIn = 0x000000D0,
    GetNotify = 0x000000D1,
    GetQueryStatusIn = 0x000000D7,
    CiStateInOut = 0x000000D9,
    FetchValueIn = 0x000000E4,
    UpdateDocumentsIn = 0x000000E6,
    GetQueryStatusExIn = 0x000000E7,
    RestartPositionIn = 0x000000E8,
    GetRowsetNotifyIn = 0x000000F1,
    FindIndicesIn = 0x000000F2,
    SetScopePrioritizationIn = 0x000000F3,
    GetScopeStatisticsIn = 0x000000F4,
}

impl MessageType {
    /// The raw 32-bit message code.
    #[inline]
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Look up a message code.
    pub fn from_code(code: u32) -> Option<Self> {
        let ty = match code {
            0xC8 => MessageType::ConnectIn,
            0xC9 => MessageType::Disconnect,
            0xCA => MessageType::CreateQueryIn,
            0xCB => MessageType::FreeCursorIn,
            0xCC => MessageType::GetRowsIn,
            0xCD => MessageType::RatioFinishedIn,
            0xCE => MessageType::CompareBmkIn,
            0xCF => MessageType::GetApproximatePositionIn,
            0xD0 => MessageType::SetBindingsIn,
            0xD1 => MessageType::GetNotify,
            0xD7 => MessageType::GetQueryStatusIn,
            0xD9 => MessageType::CiStateInOut,
            0xE4 => MessageType::FetchValueIn,
            0xE6 => MessageType::UpdateDocumentsIn,
            0xE7 => MessageType::GetQueryStatusExIn,
            0xE8 => MessageType::RestartPositionIn,
            0xF1 => MessageType::GetRowsetNotifyIn,
            0xF2 => MessageType::FindIndicesIn,
            0xF3 => MessageType::SetScopePrioritizationIn,
            0xF4 => MessageType::GetScopeStatisticsIn,
            _ => return None,
        };
        Some(ty)
    }

    /// Whether this message type carries a header checksum.
    pub fn requires_checksum(self) -> bool {
        matches!(
            self,
            MessageType::ConnectIn
                | MessageType::CreateQueryIn
                | MessageType::SetBindingsIn
                | MessageType::GetRowsIn
                | MessageType::FetchValueIn
        )
    }
}

/// Decoded message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub msg: u32,
    pub status: u32,
    pub checksum: u32,
    pub reserved: u32,
}

impl Header {
    /// Encode the header to bytes (little-endian).
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.msg.to_le_bytes());
        buf[4..8].copy_from_slice(&self.status.to_le_bytes());
        buf[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        buf[12..16].copy_from_slice(&self.reserved.to_le_bytes());
        buf
    }

    /// Decode a header from bytes. Returns `None` if the buffer is short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            msg: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            status: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
            checksum: u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]),
            reserved: u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]),
        })
    }
}

/// Compute the header checksum for a payload.
///
/// The payload is treated as if zero-padded to a 4-byte boundary; the
/// little-endian u32 words are summed with wraparound, XOR'd with the
/// protocol constant, and the message code is subtracted with wraparound.
pub fn checksum(msg: MessageType, payload: &[u8]) -> u32 {
    let mut sum: u32 = 0;
    let mut chunks = payload.chunks_exact(4);
    for word in &mut chunks {
        sum = sum.wrapping_add(u32::from_le_bytes([word[0], word[1], word[2], word[3]]));
    }
    let rem = chunks.remainder();
    if !rem.is_empty() {
        let mut last = [0u8; 4];
        last[..rem.len()].copy_from_slice(rem);
        sum = sum.wrapping_add(u32::from_le_bytes(last));
    }
    (sum ^ CHECKSUM_XOR_VALUE).wrapping_sub(msg.code())
}

/// Frame a payload: prepend the header, computing the checksum for
/// allow-listed message types. Checksummed payloads are zero-padded to a
/// 4-byte boundary before framing, and the padding is part of the message.
pub fn frame(msg: MessageType, payload: &[u8]) -> Vec<u8> {
    let pad = if msg.requires_checksum() {
        (4 - payload.len() % 4) % 4
    } else {
        0
    };
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len() + pad);
    out.extend_from_slice(&[0u8; HEADER_SIZE]);
    out.extend_from_slice(payload);
    out.resize(HEADER_SIZE + payload.len() + pad, 0);

    let ck = if msg.requires_checksum() {
        checksum(msg, &out[HEADER_SIZE..])
    } else {
        0
    };
    let header = Header {
        msg: msg.code(),
        status: 0,
        checksum: ck,
        reserved: 0,
    };
    out[..HEADER_SIZE].copy_from_slice(&header.encode());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_encode_decode_roundtrip() {
        let original = Header {
            msg: 0xCC,
            status: 0,
            checksum: 0x1234_5678,
            reserved: 0,
        };
        let decoded = Header::decode(&original.encode()).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_header_little_endian_byte_order() {
        let header = Header {
            msg: 0x01020304,
            status: 0x05060708,
            checksum: 0x090A0B0C,
            reserved: 0x0D0E0F10,
        };
        let bytes = header.encode();
        assert_eq!(&bytes[0..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[4..8], &[0x08, 0x07, 0x06, 0x05]);
        assert_eq!(&bytes[8..12], &[0x0C, 0x0B, 0x0A, 0x09]);
        assert_eq!(&bytes[12..16], &[0x10, 0x0F, 0x0E, 0x0D]);
    }

    #[test]
    fn test_decode_too_short_buffer() {
        assert!(Header::decode(&[0u8; 15]).is_none());
    }

    #[test]
    fn test_checksum_allow_list() {
        assert!(MessageType::ConnectIn.requires_checksum());
        assert!(MessageType::CreateQueryIn.requires_checksum());
        assert!(MessageType::SetBindingsIn.requires_checksum());
        assert!(MessageType::GetRowsIn.requires_checksum());
        assert!(MessageType::FetchValueIn.requires_checksum());

        assert!(!MessageType::Disconnect.requires_checksum());
        assert!(!MessageType::GetQueryStatusIn.requires_checksum());
        assert!(!MessageType::FreeCursorIn.requires_checksum());
        assert!(!MessageType::GetNotify.requires_checksum());
    }

    #[test]
    fn test_checksum_formula() {
        // One word: sum = 1, XOR with the constant, minus the message code.
        let payload = 1u32.to_le_bytes();
        let expected = (1u32 ^ CHECKSUM_XOR_VALUE).wrapping_sub(MessageType::GetRowsIn.code());
        assert_eq!(checksum(MessageType::GetRowsIn, &payload), expected);
    }

    #[test]
    fn test_checksum_pads_trailing_bytes_with_zeros() {
        // A 5-byte payload checksums like the same payload padded to 8.
        let short = [0x11, 0x22, 0x33, 0x44, 0x55];
        let padded = [0x11, 0x22, 0x33, 0x44, 0x55, 0, 0, 0];
        assert_eq!(
            checksum(MessageType::ConnectIn, &short),
            checksum(MessageType::ConnectIn, &padded)
        );
    }

    #[test]
    fn test_checksum_deterministic_and_bit_sensitive() {
        let payload = b"search scope payload".to_vec();
        let a = checksum(MessageType::CreateQueryIn, &payload);
        let b = checksum(MessageType::CreateQueryIn, &payload);
        assert_eq!(a, b);

        let mut flipped = payload.clone();
        flipped[3] ^= 0x01;
        assert_ne!(a, checksum(MessageType::CreateQueryIn, &flipped));
    }

    #[test]
    fn test_frame_checksummed_message() {
        let payload = [1, 2, 3, 4, 5];
        let framed = frame(MessageType::GetRowsIn, &payload);
        // Padded to a 4-byte boundary.
        assert_eq!(framed.len(), HEADER_SIZE + 8);
        let header = Header::decode(&framed).unwrap();
        assert_eq!(header.msg, MessageType::GetRowsIn.code());
        assert_eq!(header.status, 0);
        assert_eq!(header.reserved, 0);
        assert_eq!(
            header.checksum,
            checksum(MessageType::GetRowsIn, &framed[HEADER_SIZE..])
        );
    }

    #[test]
    fn test_frame_unchecksummed_message_carries_zero() {
        let framed = frame(MessageType::FreeCursorIn, &7u32.to_le_bytes());
        let header = Header::decode(&framed).unwrap();
        assert_eq!(header.checksum, 0);
        assert_eq!(framed.len(), HEADER_SIZE + 4);
    }

    #[test]
    fn test_frame_bare_header() {
        let framed = frame(MessageType::Disconnect, &[]);
        assert_eq!(framed.len(), HEADER_SIZE);
        let header = Header::decode(&framed).unwrap();
        assert_eq!(header.msg, 0xC9);
    }

    #[test]
    fn test_message_type_code_roundtrip() {
        for ty in [
            MessageType::ConnectIn,
            MessageType::Disconnect,
            MessageType::CreateQueryIn,
            MessageType::GetRowsIn,
            MessageType::SetBindingsIn,
            MessageType::GetScopeStatisticsIn,
            MessageType::CiStateInOut,
        ] {
            assert_eq!(MessageType::from_code(ty.code()), Some(ty));
        }
        assert_eq!(MessageType::from_code(0xDEAD), None);
    }
}
