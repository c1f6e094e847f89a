//! Request message builders.
//!
//! One method per protocol request, Connect through Disconnect. Each method
//! is a pure function of its arguments and the configuration: it assembles
//! the payload from codec/protocol parts, frames it (checksummed where the
//! allow-list says so), and returns the complete byte sequence. Nothing
//! here performs I/O or mutates session state; cursor/chapter handles are
//! plain arguments fed back from server replies by the caller.

use crate::codec::MessageWriter;
use crate::config::BuilderConfig;
use crate::error::Result;
use crate::protocol::consts::system_item_name;
use crate::protocol::{
    build_column_bindings, build_column_selection, connect_propset_one, connect_propset_two,
    encode_column_set, ext_propset_catalog, ext_propset_flags, ext_propset_locale,
    ext_propset_server, frame, AggregateKind, ColumnBinding, FullPropSpec, MessageType,
    RestrictionArray, RestrictionNode, RowsetProperties, SeekDescription, HEADER_SIZE,
};

/// Fixed reserved word carried by every get-rows request.
const GETROWS_RESERVED: u32 = 256;

/// Byte size of the CI state block returned by the server.
const CI_STATE_SIZE: u32 = 0x3C;

/// Builds request messages for one configured deployment.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    config: BuilderConfig,
}

impl MessageBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    /// The configuration this builder was created with.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Payload writer positioned just past the frame header.
    fn payload_writer() -> MessageWriter {
        MessageWriter::with_base_offset(HEADER_SIZE)
    }

    fn finish(msg: MessageType, w: MessageWriter) -> Vec<u8> {
        let framed = frame(msg, w.as_slice());
        tracing::debug!(msg = ?msg, len = framed.len(), "built request");
        framed
    }

    /// Column bindings from the configured column table. Surfaces
    /// `UnsupportedType` for type codes outside the closed set.
    pub fn bindings_from_config(&self) -> Result<Vec<ColumnBinding>> {
        self.config
            .columns
            .iter()
            .map(|col| {
                Ok(ColumnBinding {
                    prop: FullPropSpec::by_id(col.guid, col.property_id),
                    vtype: crate::codec::VType::from_code(col.vtype)?,
                    aggregate: AggregateKind::ByNone,
                    value_offset: col.value_offset,
                    status_offset: col.status_offset,
                    length_offset: col.length_offset,
                })
            })
            .collect()
    }

    /// Connect request: client identity plus the handshake property sets.
    pub fn connect_in(
        &self,
        client_version: u32,
        is_remote: bool,
        user_name: &str,
        machine_name: &str,
    ) -> Result<Vec<u8>> {
        let c = &self.config;
        let mut w = Self::payload_writer();

        w.put_u32(client_version);
        w.put_u32(is_remote as u32);
        let cb_blob1 = w.reserve_u32();
        w.align_to(8);
        let cb_blob2 = w.reserve_u32();
        w.put_zeros(12);

        w.put_unicode_z(machine_name);
        w.put_unicode_z(user_name);

        // Blob 1: the two connect-time property sets.
        w.align_to(8);
        let blob1_start = w.offset();
        w.put_u32(2);
        connect_propset_one(&c.propset_one_ids, &c.catalog_name).encode_into(&mut w)?;
        connect_propset_two(&c.propset_two_ids, &c.server_machine_name).encode_into(&mut w)?;
        let blob1_len = (w.offset() - blob1_start) as u32;

        // Blob 2: the four extension sets.
        w.align_to(8);
        let blob2_start = w.offset();
        w.put_u32(4);
        ext_propset_locale(c.ext_propset_one_guid, &c.ext_propset_one_ids, &c.language_locale)
            .encode_into(&mut w)?;
        ext_propset_flags(c.ext_propset_two_guid, &c.ext_propset_two_ids).encode_into(&mut w)?;
        ext_propset_server(
            c.ext_propset_three_guid,
            &c.ext_propset_three_ids,
            &c.server_machine_name,
        )
        .encode_into(&mut w)?;
        ext_propset_catalog(c.ext_propset_four_guid, &c.ext_propset_four_ids, &c.catalog_name)
            .encode_into(&mut w)?;
        let blob2_len = (w.offset() - blob2_start) as u32;

        w.patch_u32(cb_blob1, blob1_len)?;
        w.patch_u32(cb_blob2, blob2_len)?;
        Ok(Self::finish(MessageType::ConnectIn, w))
    }

    /// Create-query request: column selection, the scope+content
    /// restriction, rowset properties, and the pid mapper.
    pub fn create_query_in(
        &self,
        scope: &str,
        query_text: &str,
        enable_rowset_events: bool,
    ) -> Result<Vec<u8>> {
        let c = &self.config;
        let mut w = Self::payload_writer();

        let size_pos = w.reserve_u32();

        // Column selection over the pid mapper, positional.
        w.put_u8(1);
        w.align_to(4);
        let column_count = c.columns.len().max(2) as u32;
        encode_column_set(&mut w, &build_column_selection(column_count));

        // Restriction array.
        w.put_u8(1);
        let tree = RestrictionNode::scope_and_content(query_text, scope, c.lcid);
        RestrictionArray(tree).encode_into(&mut w)?;

        // No sort set, no categorization set.
        w.put_u8(0);
        w.put_u8(0);
        w.align_to(4);

        RowsetProperties::new(enable_rowset_events).encode_into(&mut w);

        // Pid mapper: the well-known columns, selection indexes point here.
        let specs = pid_mapper_specs();
        w.put_u32(specs.len() as u32);
        for spec in &specs {
            spec.encode_into(&mut w);
        }

        // Empty column group array.
        w.put_u32(0);

        w.put_u32(c.lcid);

        // Total message size, header included.
        let total = w.offset() as u32;
        w.patch_u32(size_pos, total)?;
        Ok(Self::finish(MessageType::CreateQueryIn, w))
    }

    /// Set-bindings request. The declared row width is encoded verbatim,
    /// even when it is smaller than the width the bindings imply. The
    /// server is the one that must reject that.
    pub fn set_bindings_in(
        &self,
        cursor: u32,
        declared_row_width: u32,
        bindings: &[ColumnBinding],
    ) -> Result<Vec<u8>> {
        let mut w = Self::payload_writer();

        w.put_u32(cursor);
        w.put_u32(declared_row_width);
        let cb_desc = w.reserve_u32();
        w.put_u32(0); // reserved

        let desc_start = w.offset();
        w.put_u32(bindings.len() as u32);
        // GUID alignment inside the table counts from the message start.
        let (table, _) = build_column_bindings(bindings, self.config.addressing, w.offset())?;
        w.put_slice(&table);
        let desc_len = (w.offset() - desc_start) as u32;

        w.patch_u32(cb_desc, desc_len)?;
        Ok(Self::finish(MessageType::SetBindingsIn, w))
    }

    /// Get-rows request against a previously obtained cursor.
    ///
    /// `chapter` is the sub-range handle (0 = whole rowset);
    /// `backward_fetch` selects the fetch direction.
    pub fn get_rows_in(
        &self,
        cursor: u32,
        rows_to_transfer: u32,
        row_width: u32,
        read_buffer: u32,
        chapter: u32,
        backward_fetch: bool,
        seek: SeekDescription,
    ) -> Result<Vec<u8>> {
        let mut w = Self::payload_writer();

        w.put_u32(cursor);
        w.put_u32(rows_to_transfer);
        w.put_u32(row_width);
        w.put_u32(seek.encoded_len());
        w.put_u32(GETROWS_RESERVED);
        w.put_u32(read_buffer);
        w.put_u32(self.config.client_base);
        w.put_u32(backward_fetch as u32);
        w.put_u32(seek.code());
        w.put_u32(chapter);
        seek.encode_into(&mut w);

        Ok(Self::finish(MessageType::GetRowsIn, w))
    }

    /// Query status for a cursor.
    pub fn get_query_status_in(&self, cursor: u32) -> Vec<u8> {
        let mut w = Self::payload_writer();
        w.put_u32(cursor);
        Self::finish(MessageType::GetQueryStatusIn, w)
    }

    /// Extended query status for a cursor and bookmark.
    pub fn get_query_status_ex_in(&self, cursor: u32, bookmark: u32) -> Vec<u8> {
        let mut w = Self::payload_writer();
        w.put_u32(cursor);
        w.put_u32(bookmark);
        Self::finish(MessageType::GetQueryStatusExIn, w)
    }

    /// Completion ratio for a query. `quick` is unused by servers but part
    /// of the wire shape.
    pub fn ratio_finished_in(&self, cursor: u32, quick: u32) -> Vec<u8> {
        let mut w = Self::payload_writer();
        w.put_u32(cursor);
        w.put_u32(quick);
        Self::finish(MessageType::RatioFinishedIn, w)
    }

    /// Fetch a (possibly chunked) property value for a document.
    pub fn fetch_value_in(&self, work_id: u32, cb_so_far: u32, cb_chunk: u32) -> Result<Vec<u8>> {
        let mut w = Self::payload_writer();
        w.put_u32(work_id);
        w.put_u32(cb_so_far);
        let cb_prop_spec = w.reserve_u32();
        w.put_u32(cb_chunk);

        let spec_start = w.offset();
        system_item_name().encode_into(&mut w);
        let spec_len = (w.offset() - spec_start) as u32;
        w.align_to(4);

        w.patch_u32(cb_prop_spec, spec_len)?;
        Ok(Self::finish(MessageType::FetchValueIn, w))
    }

    /// Compare two bookmarks within a chapter.
    pub fn compare_bmk_in(&self, cursor: u32, chapter: u32, bmk_first: u32, bmk_second: u32) -> Vec<u8> {
        let mut w = Self::payload_writer();
        w.put_u32(cursor);
        w.put_u32(chapter);
        w.put_u32(bmk_first);
        w.put_u32(bmk_second);
        Self::finish(MessageType::CompareBmkIn, w)
    }

    /// Approximate position of a bookmark.
    pub fn get_approximate_position_in(&self, cursor: u32, chapter: u32, bookmark: u32) -> Vec<u8> {
        let mut w = Self::payload_writer();
        w.put_u32(cursor);
        w.put_u32(chapter);
        w.put_u32(bookmark);
        Self::finish(MessageType::GetApproximatePositionIn, w)
    }

    /// Move a chapter's fetch position back to the start.
    pub fn restart_position_in(&self, cursor: u32, chapter: u32) -> Vec<u8> {
        let mut w = Self::payload_writer();
        w.put_u32(cursor);
        w.put_u32(chapter);
        Self::finish(MessageType::RestartPositionIn, w)
    }

    /// Release a cursor.
    pub fn free_cursor_in(&self, cursor: u32) -> Vec<u8> {
        let mut w = Self::payload_writer();
        w.put_u32(cursor);
        Self::finish(MessageType::FreeCursorIn, w)
    }

    /// Request an index update for a path.
    pub fn update_documents_in(&self, flag: u32, flag_root_path: u32, root_path: &str) -> Vec<u8> {
        let mut w = Self::payload_writer();
        w.put_u32(flag);
        w.put_u32(flag_root_path);
        w.put_unicode(root_path);
        Self::finish(MessageType::UpdateDocumentsIn, w)
    }

    /// Look up rowset positions for previously returned documents.
    pub fn find_indices_in(&self, c_wids: u32, c_depth_prev: u32) -> Vec<u8> {
        let mut w = Self::payload_writer();
        w.put_u32(c_wids);
        w.put_u32(c_depth_prev);
        w.put_zeros(c_wids as usize * 4);
        w.put_zeros(c_depth_prev as usize * 4);
        Self::finish(MessageType::FindIndicesIn, w)
    }

    /// Poll for the next rowset event.
    pub fn get_rowset_notify_in(&self) -> Vec<u8> {
        let mut w = Self::payload_writer();
        w.put_u32(0);
        Self::finish(MessageType::GetRowsetNotifyIn, w)
    }

    /// Prioritize indexing of the scopes behind a query.
    pub fn set_scope_prioritization_in(&self, priority: u32, event_frequency: u32) -> Vec<u8> {
        let mut w = Self::payload_writer();
        w.put_u32(priority);
        w.put_u32(event_frequency);
        Self::finish(MessageType::SetScopePrioritizationIn, w)
    }

    /// Register for change notification (bare header).
    pub fn get_notify(&self) -> Vec<u8> {
        Self::finish(MessageType::GetNotify, Self::payload_writer())
    }

    /// Scope statistics for the current query.
    pub fn get_scope_statistics_in(&self) -> Vec<u8> {
        let mut w = Self::payload_writer();
        w.put_u32(0);
        Self::finish(MessageType::GetScopeStatisticsIn, w)
    }

    /// Content-index state snapshot request.
    pub fn ci_state_in_out(&self) -> Vec<u8> {
        let mut w = Self::payload_writer();
        w.put_u32(CI_STATE_SIZE);
        w.put_zeros(CI_STATE_SIZE as usize - 4);
        Self::finish(MessageType::CiStateInOut, w)
    }

    /// End the session (bare header).
    pub fn disconnect(&self) -> Vec<u8> {
        Self::finish(MessageType::Disconnect, Self::payload_writer())
    }
}

/// The well-known columns the pid mapper exposes; column-selection indexes
/// refer to positions in this list.
fn pid_mapper_specs() -> Vec<FullPropSpec> {
    use crate::protocol::consts::{
        system_item_folder_name_display, system_item_name, system_search_contents,
        system_search_scope,
    };
    vec![
        system_item_name(),
        system_item_folder_name_display(),
        system_search_scope(),
        system_search_contents(),
    ]
}
