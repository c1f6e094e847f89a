//! Client-side message construction for the Windows Search remote query
//! protocol.
//!
//! The crate builds the request messages a conformance-test client sends to
//! a search service: the connect handshake, query creation with restriction
//! trees, row-layout negotiation, row fetching, and the smaller cursor
//! bookkeeping requests. Every builder returns a complete framed byte
//! sequence; checksums are computed for the message types that carry them.
//!
//! Building is pure. I/O lives behind the [`transport::Transport`] trait,
//! and per-query server handles are tracked in [`SessionState`] by whatever
//! drives the exchange.
//!
//! ```
//! use wsp_client::{BuilderConfig, MessageBuilder};
//! use wsp_client::protocol::SeekDescription;
//!
//! # fn main() -> wsp_client::Result<()> {
//! # let json = r#"{
//! #   "catalog_name": "Windows\\SystemIndex",
//! #   "client_machine_name": "client", "server_machine_name": "server",
//! #   "user_name": "tester", "language_locale": "en-US", "lcid": 1033,
//! #   "each_row_size": 72, "rows_to_transfer": 40, "read_buffer_size": 16384,
//! #   "propset_one_ids": [2, 3, 4, 7], "propset_two_ids": [2],
//! #   "ext_propset_one_guid": "aa6ee6b0-e828-11d0-b23e-00aa0047fc01",
//! #   "ext_propset_one_ids": [2, 3, 4, 5, 6, 7],
//! #   "ext_propset_two_guid": "a7ac77ed-f8d7-11ce-a798-0020f8008025",
//! #   "ext_propset_two_ids": [2, 3, 4, 5, 6, 8, 10, 12, 13, 14],
//! #   "ext_propset_three_guid": "a9bd1526-6a80-11d0-8c9d-0020af1d740e",
//! #   "ext_propset_three_ids": [2],
//! #   "ext_propset_four_guid": "afafaca5-b5d1-11d0-8c62-00c04fc2db8d",
//! #   "ext_propset_four_ids": [2, 3, 4],
//! #   "columns": []
//! # }"#;
//! let config = BuilderConfig::from_json_str(json)?;
//! let builder = MessageBuilder::new(config);
//!
//! let connect = builder.connect_in(0x00000102, true, "tester", "client")?;
//! let query = builder.create_query_in("C:\\corpus", "quick fox", false)?;
//! let rows = builder.get_rows_in(7, 40, 72, 16384, 0, false, SeekDescription::Next { skip: 0 })?;
//! assert_eq!(&connect[..4], &0xC8u32.to_le_bytes());
//! # let _ = (query, rows);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;

pub use builder::MessageBuilder;
pub use config::{BuilderConfig, ColumnConfig};
pub use error::{Result, WspError};
pub use session::SessionState;
