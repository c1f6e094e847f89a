//! Row layout structures: column bindings, column selection, seek
//! descriptions, and rowset properties.
//!
//! Binding offsets are caller-supplied and trusted verbatim: the builder
//! never checks that the declared row width actually fits the bindings.
//! Deliberately inconsistent widths are a negative-test affordance; the
//! remote server, not this codec, is the one that must reject them.

use bytes::Bytes;

use crate::codec::{AddressingMode, MessageWriter, VType};
use crate::error::{Result, WspError};
use crate::protocol::restriction::FullPropSpec;

/// Aggregation applied to a bound column. Only pass-through is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum AggregateKind {
    #[default]
    ByNone = 0,
}

/// A single column binding: where a column's value, status, and length land
/// inside a fixed-width row buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBinding {
    pub prop: FullPropSpec,
    pub vtype: VType,
    pub aggregate: AggregateKind,
    pub value_offset: u16,
    pub status_offset: u16,
    /// 0 means no length slot is bound.
    pub length_offset: u16,
}

impl ColumnBinding {
    fn encode_into(&self, w: &mut MessageWriter, mode: AddressingMode) {
        self.prop.encode_into(w);
        w.put_u32(self.vtype.code() as u32);
        w.put_u8(self.aggregate as u8);
        // Value slot: used flag, 2-aligned offset, storage size.
        w.put_u8(1);
        w.align_to(2);
        w.put_u16(self.value_offset);
        w.put_u16(self.vtype.size(mode));
        // Status slot.
        w.put_u8(1);
        w.align_to(2);
        w.put_u16(self.status_offset);
        // Length slot only when bound.
        if self.length_offset != 0 {
            w.put_u8(1);
            w.align_to(2);
            w.put_u16(self.length_offset);
        } else {
            w.put_u8(0);
        }
    }
}

/// Serialize a binding table for embedding at `table_offset` bytes from the
/// message start. Returns the encoded columns and the count.
///
/// GUID alignment inside each propspec is relative to the message start,
/// header included, so the embed offset must be threaded through.
pub fn build_column_bindings(
    bindings: &[ColumnBinding],
    mode: AddressingMode,
    table_offset: usize,
) -> Result<(Bytes, u32)> {
    let mut w = MessageWriter::with_base_offset(table_offset);
    for binding in bindings {
        w.align_to(4);
        binding.encode_into(&mut w, mode);
    }
    Ok((w.into_bytes(), bindings.len() as u32))
}

/// Positional column selection: the first `n` pid-mapper entries.
pub fn build_column_selection(n: u32) -> Vec<u32> {
    (0..n).collect()
}

/// Encode a column selection as a counted index list.
pub fn encode_column_set(w: &mut MessageWriter, indexes: &[u32]) {
    w.put_u32(indexes.len() as u32);
    for &idx in indexes {
        w.put_u32(idx);
    }
}

/// Row seek modes for a get-rows request. Exactly one per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDescription {
    /// Skip `skip` rows forward from the current position.
    Next { skip: u32 },
    /// Seek to a bookmark, then skip within a region.
    At { bookmark: u32, skip: u32, region: u32 },
    /// Seek to a fractional position within a region.
    AtRatio {
        numerator: u32,
        denominator: u32,
        region: u32,
    },
}

impl SeekDescription {
    /// The seek mode tag on the wire.
    pub fn code(&self) -> u32 {
        match self {
            SeekDescription::Next { .. } => 1,
            SeekDescription::At { .. } => 2,
            SeekDescription::AtRatio { .. } => 3,
        }
    }

    /// Build the default seek description for a raw mode tag, as scenario
    /// parameters do. Any tag outside the fixed enumeration is an
    /// unsupported mode.
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            1 => Ok(SeekDescription::Next { skip: 0 }),
            2 => Ok(SeekDescription::At {
                bookmark: 2,
                skip: 2,
                region: 0,
            }),
            3 => Ok(SeekDescription::AtRatio {
                numerator: 1,
                denominator: 2,
                region: 0,
            }),
            other => Err(WspError::UnsupportedMode(other)),
        }
    }

    /// Encoded byte length.
    pub fn encoded_len(&self) -> u32 {
        match self {
            SeekDescription::Next { .. } => 4,
            SeekDescription::At { .. } | SeekDescription::AtRatio { .. } => 12,
        }
    }

    pub fn encode_into(&self, w: &mut MessageWriter) {
        match self {
            SeekDescription::Next { skip } => w.put_u32(*skip),
            SeekDescription::At {
                bookmark,
                skip,
                region,
            } => {
                w.put_u32(*bookmark);
                w.put_u32(*skip);
                w.put_u32(*region);
            }
            SeekDescription::AtRatio {
                numerator,
                denominator,
                region,
            } => {
                w.put_u32(*numerator);
                w.put_u32(*denominator);
                w.put_u32(*region);
            }
        }
    }
}

/// Boolean option bits for rowset properties.
pub mod boolean_options {
    pub const SCROLLABLE: u32 = 0x0000_0002;
    pub const ENABLE_ROWSET_EVENTS: u32 = 0x0080_0000;
}

/// Cursor behavior requested at query creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsetProperties {
    pub boolean_options: u32,
    pub max_open_rows: u32,
    pub memory_usage: u32,
    pub max_results: u32,
    pub command_timeout: u32,
}

impl RowsetProperties {
    /// Scrollable cursor, optionally with rowset events enabled.
    pub fn new(enable_rowset_events: bool) -> Self {
        let mut options = boolean_options::SCROLLABLE;
        if enable_rowset_events {
            options |= boolean_options::ENABLE_ROWSET_EVENTS;
        }
        Self {
            boolean_options: options,
            max_open_rows: 0,
            memory_usage: 0,
            max_results: 0,
            command_timeout: crate::protocol::consts::COMMAND_TIMEOUT,
        }
    }

    pub fn encode_into(&self, w: &mut MessageWriter) {
        w.put_u32(self.boolean_options);
        w.put_u32(self.max_open_rows);
        w.put_u32(self.memory_usage);
        w.put_u32(self.max_results);
        w.put_u32(self.command_timeout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::consts::STORAGE_GUID;

    fn binding(value_offset: u16, length_offset: u16) -> ColumnBinding {
        ColumnBinding {
            prop: FullPropSpec::by_id(STORAGE_GUID, 10),
            vtype: VType::Lpwstr,
            aggregate: AggregateKind::ByNone,
            value_offset,
            status_offset: value_offset + 8,
            length_offset,
        }
    }

    #[test]
    fn test_column_selection_is_positional() {
        assert_eq!(build_column_selection(2), vec![0, 1]);
        assert_eq!(build_column_selection(5), vec![0, 1, 2, 3, 4]);
        assert!(build_column_selection(0).is_empty());
    }

    #[test]
    fn test_binding_table_count() {
        let (bytes, count) = build_column_bindings(
            &[binding(0, 0), binding(16, 24)],
            AddressingMode::Bits64,
            0,
        )
        .unwrap();
        assert_eq!(count, 2);
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_binding_encodes_offsets_verbatim() {
        // Offsets are trusted, even nonsensical overlapping ones.
        let (bytes, _) =
            build_column_bindings(&[binding(4, 2)], AddressingMode::Bits64, 0).unwrap();
        // propspec: guid(16) kind(4) id(4) = 24, vtype u32 at 24..28.
        assert_eq!(&bytes[24..28], &(VType::Lpwstr.code() as u32).to_le_bytes());
        assert_eq!(bytes[28], 0, "aggregate ByNone");
        assert_eq!(bytes[29], 1, "value used");
        assert_eq!(&bytes[30..32], &4u16.to_le_bytes(), "value offset");
        assert_eq!(&bytes[32..34], &0u16.to_le_bytes(), "lpwstr storage size");
        assert_eq!(bytes[34], 1, "status used");
        // one pad byte to realign, then the status offset
        assert_eq!(&bytes[36..38], &12u16.to_le_bytes());
        assert_eq!(bytes[38], 1, "length used");
        assert_eq!(&bytes[40..42], &2u16.to_le_bytes(), "length offset");
    }

    #[test]
    fn test_binding_without_length_slot() {
        let (bytes, _) = build_column_bindings(
            &[ColumnBinding {
                prop: FullPropSpec::by_id(STORAGE_GUID, 2),
                vtype: VType::I4,
                aggregate: AggregateKind::ByNone,
                value_offset: 0,
                status_offset: 4,
                length_offset: 0,
            }],
            AddressingMode::Bits64,
            0,
        )
        .unwrap();
        assert_eq!(*bytes.last().unwrap(), 0, "length unused flag terminates");
        assert_eq!(&bytes[32..34], &4u16.to_le_bytes(), "i4 storage size");
    }

    #[test]
    fn test_table_alignment_follows_embed_offset() {
        // Embedded at message offset 36 (36 mod 8 = 4), the first propspec
        // GUID must pad out to message offset 40.
        let (bytes, _) =
            build_column_bindings(&[binding(0, 0)], AddressingMode::Bits64, 36).unwrap();
        assert_eq!(&bytes[0..4], &[0, 0, 0, 0], "padding to the 8-aligned guid");
        assert_eq!(&bytes[4..8], &[0x30, 0xF1, 0x25, 0xB7], "storage guid");
    }

    #[test]
    fn test_seek_mode_codes() {
        assert_eq!(SeekDescription::Next { skip: 0 }.code(), 1);
        assert_eq!(
            SeekDescription::At {
                bookmark: 2,
                skip: 2,
                region: 0
            }
            .code(),
            2
        );
        assert_eq!(
            SeekDescription::AtRatio {
                numerator: 1,
                denominator: 2,
                region: 0
            }
            .code(),
            3
        );
    }

    #[test]
    fn test_seek_from_code_defaults() {
        assert_eq!(
            SeekDescription::from_code(1).unwrap(),
            SeekDescription::Next { skip: 0 }
        );
        assert_eq!(
            SeekDescription::from_code(3).unwrap(),
            SeekDescription::AtRatio {
                numerator: 1,
                denominator: 2,
                region: 0
            }
        );
    }

    #[test]
    fn test_unknown_seek_mode_rejected() {
        for code in [0u32, 4, 5, 0xFFFF_FFFF] {
            match SeekDescription::from_code(code) {
                Err(WspError::UnsupportedMode(c)) => assert_eq!(c, code),
                other => panic!("expected UnsupportedMode, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_seek_encoded_len_matches_encoding() {
        for seek in [
            SeekDescription::Next { skip: 7 },
            SeekDescription::At {
                bookmark: 2,
                skip: 2,
                region: 0,
            },
            SeekDescription::AtRatio {
                numerator: 1,
                denominator: 2,
                region: 0,
            },
        ] {
            let mut w = MessageWriter::new();
            seek.encode_into(&mut w);
            assert_eq!(w.len() as u32, seek.encoded_len());
        }
    }

    #[test]
    fn test_rowset_properties_options() {
        let plain = RowsetProperties::new(false);
        assert_eq!(plain.boolean_options, boolean_options::SCROLLABLE);
        let events = RowsetProperties::new(true);
        assert_eq!(
            events.boolean_options,
            boolean_options::SCROLLABLE | boolean_options::ENABLE_ROWSET_EVENTS
        );
        assert_eq!(events.command_timeout, 0x1E);
    }
}
