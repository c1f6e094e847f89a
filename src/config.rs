//! Per-environment builder configuration.
//!
//! The configuration is an opaque parameter object supplied by the test
//! harness; this crate never reads files or environment variables itself.
//! A JSON helper is provided for harnesses that keep deployment parameters
//! in JSON form.

use serde::Deserialize;
use uuid::Uuid;

use crate::codec::AddressingMode;
use crate::error::Result;

/// Description of one column binding, as configured per deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
    pub guid: Uuid,
    pub property_id: u32,
    /// Raw variant type code; validated when bindings are built.
    pub vtype: u16,
    pub value_offset: u16,
    pub status_offset: u16,
    #[serde(default)]
    pub length_offset: u16,
}

/// Scenario-independent parameters for the message builder.
#[derive(Debug, Clone, Deserialize)]
pub struct BuilderConfig {
    pub catalog_name: String,
    pub client_machine_name: String,
    pub server_machine_name: String,
    pub user_name: String,
    /// Locale string sent in the handshake (e.g. "en-US").
    pub language_locale: String,
    /// Numeric locale id used by restrictions and query creation.
    pub lcid: u32,
    #[serde(default)]
    pub addressing: AddressingMode,
    /// Declared row width for set-bindings requests.
    pub each_row_size: u32,
    #[serde(default)]
    pub client_base: u32,
    pub rows_to_transfer: u32,
    pub read_buffer_size: u32,

    /// Ordered property id selections for the two connect-time sets.
    pub propset_one_ids: Vec<u32>,
    pub propset_two_ids: Vec<u32>,

    /// GUIDs and id selections for the four extension sets.
    pub ext_propset_one_guid: Uuid,
    pub ext_propset_one_ids: Vec<u32>,
    pub ext_propset_two_guid: Uuid,
    pub ext_propset_two_ids: Vec<u32>,
    pub ext_propset_three_guid: Uuid,
    pub ext_propset_three_ids: Vec<u32>,
    pub ext_propset_four_guid: Uuid,
    pub ext_propset_four_ids: Vec<u32>,

    /// Columns bound by set-bindings requests.
    pub columns: Vec<ColumnConfig>,
}

impl BuilderConfig {
    /// Deserialize a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
