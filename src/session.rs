//! Session-scoped query state.
//!
//! Cursor and chapter handles are issued by the server; the negotiated row
//! layout comes from the set-bindings exchange. This state advances only
//! when the external response-observing layer calls the transition
//! functions; the message builders themselves never mutate it.

use crate::protocol::ColumnBinding;

/// Mutable state for one protocol session (Connect through Disconnect).
///
/// Owned exclusively by one orchestrating caller; the codec layer only
/// reads from it.
#[derive(Debug, Default)]
pub struct SessionState {
    cursor: u32,
    chapter: u32,
    row_width: u32,
    bindings: Vec<ColumnBinding>,
}

impl SessionState {
    /// Fresh state with no cursor, no chapter, and no negotiated layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cursor handle from the last create-query reply (0 = none).
    #[inline]
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// The chapter handle for sub-range operations (0 = whole rowset).
    #[inline]
    pub fn chapter(&self) -> u32 {
        self.chapter
    }

    /// The declared row width from the last accepted bindings.
    #[inline]
    pub fn row_width(&self) -> u32 {
        self.row_width
    }

    /// Bindings in effect for the current cursor.
    pub fn bindings(&self) -> &[ColumnBinding] {
        &self.bindings
    }

    /// Record the cursor handle observed in a create-query reply.
    pub fn advance_cursor(&mut self, handle: u32) {
        tracing::debug!(old = self.cursor, new = handle, "advance cursor");
        self.cursor = handle;
    }

    /// Record a chapter handle observed in a server reply.
    pub fn advance_chapter(&mut self, handle: u32) {
        tracing::debug!(old = self.chapter, new = handle, "advance chapter");
        self.chapter = handle;
    }

    /// Record the row width accepted by the server.
    pub fn set_row_width(&mut self, width: u32) {
        tracing::debug!(width, "set row width");
        self.row_width = width;
    }

    /// Record the bindings sent with an accepted set-bindings request.
    /// They persist until the cursor is freed.
    pub fn record_bindings(&mut self, bindings: Vec<ColumnBinding>) {
        tracing::debug!(count = bindings.len(), "record bindings");
        self.bindings = bindings;
    }

    /// Drop per-query state when the cursor is freed.
    pub fn free_cursor(&mut self) {
        tracing::debug!(cursor = self.cursor, "free cursor");
        self.cursor = 0;
        self.chapter = 0;
        self.row_width = 0;
        self.bindings.clear();
    }

    /// Reset everything at disconnect.
    pub fn reset(&mut self) {
        tracing::debug!("reset session state");
        *self = Self::default();
    }
}
