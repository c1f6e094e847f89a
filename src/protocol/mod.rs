//! Protocol module - wire header, framing, and message sub-structures.
//!
//! This module implements the request side of the search protocol:
//! - 16-byte checksummed header encoding/decoding and framing
//! - property sets for the connection handshake
//! - restriction trees for query creation
//! - row bindings, column selection, and seek descriptions
//! - the immutable protocol constant table

pub mod consts;
mod propset;
mod restriction;
mod rowset;
mod wire_format;

pub use propset::{
    connect_propset_one, connect_propset_two, ext_propset_catalog, ext_propset_flags,
    ext_propset_locale, ext_propset_server, ColumnId, Property, PropertySet,
};
pub use restriction::{
    BoolOp, FullPropSpec, GenerateMethod, PropSpec, Relop, RestrictionArray, RestrictionNode,
};
pub use rowset::{
    boolean_options, build_column_bindings, build_column_selection, encode_column_set,
    AggregateKind, ColumnBinding, RowsetProperties, SeekDescription,
};
pub use wire_format::{checksum, frame, Header, MessageType, HEADER_SIZE};
