// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The external application collaborator contract. The core (accept loop,
//! framing, backpressure, timeouts) is payload-agnostic; everything it
//! knows about application semantics flows through this trait.

use crate::net::{frame::PacketType, session::SessionId};

/// Callbacks the session layer invokes into the hosting application.
///
/// All three methods run synchronously on the session's own task and
/// **must not block** — any long-running work has to be off-loaded by the
/// implementation to its own workers (e.g. `tokio::spawn`), matching the
/// "handler callbacks run synchronously on the executor" rule from the
/// concurrency model.
///
/// Ordering guarantees the session layer provides to implementations:
/// `on_connect(id)` happens-before the first `on_recv(id, ..)`;
/// `on_recv(id, ..)` happens-before `on_disconnect(id)`; `on_disconnect(id)`
/// fires exactly once.
pub trait Handler: Send + Sync + 'static {
    /// Called after the session is registered in the table and before any
    /// inbound frames are delivered. May call `send`/`broadcast` through
    /// the session table.
    fn on_connect(&self, id: SessionId);

    /// Called after a fully validated inbound frame: `body_size` in
    /// `[1, MAX_PACKET_SIZE]` and `type` in the inbound-legal set.
    /// `payload` borrows the session's reusable body buffer and is only
    /// valid for the duration of the call — implementations that need to
    /// retain the bytes must copy them.
    fn on_recv(&self, id: SessionId, type_tag: PacketType, payload: &[u8]);

    /// Called exactly once per session, after the session has already
    /// been removed from the session table.
    fn on_disconnect(&self, id: SessionId);
}
