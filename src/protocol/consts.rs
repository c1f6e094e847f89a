//! Immutable protocol constant table.
//!
//! Checksum and restriction constants plus the well-known GUIDs used at
//! connect and query time. These never change at runtime.

use uuid::{uuid, Uuid};

use super::restriction::FullPropSpec;

/// Value XOR'd into the header checksum.
pub const CHECKSUM_XOR_VALUE: u32 = 0x5953_3959;

/// Fixed relevance weight carried by every restriction node.
pub const NODE_WEIGHT: u32 = 1000;

/// Command timeout written into rowset properties.
pub const COMMAND_TIMEOUT: u32 = 0x1E;

/// All-zero GUID used for empty column references.
pub const EMPTY_GUID: Uuid = Uuid::nil();

/// File-system content index framework property set (connect set 1).
pub const DBPROPSET_FSCIFRMWRK_EXT: Uuid = uuid!("a9bd1526-6a80-11d0-8c9d-0020af1d740e");

/// Content index framework core property set (connect set 2).
pub const DBPROPSET_CIFRMWRKCORE_EXT: Uuid = uuid!("afafaca5-b5d1-11d0-8c62-00c04fc2db8d");

/// Indexing service rowset extension property set.
pub const DBPROPSET_MSIDXS_ROWSETEXT: Uuid = uuid!("aa6ee6b0-e828-11d0-b23e-00aa0047fc01");

/// Query extension property set.
pub const DBPROPSET_QUERYEXT: Uuid = uuid!("a7ac77ed-f8d7-11ce-a798-0020f8008025");

/// Storage property set: the GUID behind the well-known column specs below.
pub const STORAGE_GUID: Uuid = uuid!("b725f130-47ef-101a-a5f1-02608c9eebac");

/// System.ItemName column.
pub fn system_item_name() -> FullPropSpec {
    FullPropSpec::by_id(STORAGE_GUID, 10)
}

/// System.ItemFolderNameDisplay column.
pub fn system_item_folder_name_display() -> FullPropSpec {
    FullPropSpec::by_id(STORAGE_GUID, 2)
}

/// System.Search.Scope restriction target.
pub fn system_search_scope() -> FullPropSpec {
    FullPropSpec::by_id(STORAGE_GUID, 22)
}

/// System.Search.Contents restriction target.
pub fn system_search_contents() -> FullPropSpec {
    FullPropSpec::by_id(STORAGE_GUID, 19)
}
