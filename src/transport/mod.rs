//! Transport seam.
//!
//! Message building is pure; delivery is behind this trait so test
//! harnesses can plug in named pipes, TCP, or capture mocks without the
//! builder knowing. Each call is one request/response exchange; the
//! protocol is strictly client-driven.

use crate::error::Result;

/// One synchronous request/response exchange with the server.
pub trait Transport {
    /// Send a complete framed request and return the raw server response.
    fn send(&mut self, request: &[u8]) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, request: &[u8]) -> Result<Vec<u8>> {
        (**self).send(request)
    }
}
