// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The shared registry of live sessions: a concurrent map from
//! [`SessionId`] to its `Arc<Session>`, plus the fan-out operations
//! (`broadcast`, `disconnect_all`) applications use instead of reaching
//! into the map themselves.
//!
//! Every fan-out here follows the same snapshot-then-release discipline:
//! collect the `Arc<Session>`s to act on into a `Vec` while holding the
//! map's internal shard locks only for the duration of the iteration, then
//! drop the guard and act on the snapshot. The table's own lock is never
//! held while a session's `send`/`disconnect` runs, so a slow or
//! misbehaving session can't stall every other connection's traffic.

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use tracing::warn;

use crate::net::session::{Session, SessionId};

/// Concurrent session registry. Cheaply cloneable (`Arc` internally via
/// `DashMap`'s own sharding); the acceptor holds one instance and hands
/// clones to application code that needs to broadcast or enumerate.
#[derive(Default, Clone)]
pub struct SessionTable {
    sessions: Arc<DashMap<SessionId, Arc<Session>>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session. Called by the acceptor before `on_connect`
    /// fires, so a handler that broadcasts from within `on_connect` always
    /// finds its own session already present.
    pub(crate) fn insert(&self, session: Arc<Session>) {
        self.sessions.insert(session.id(), session);
    }

    /// Removes a session. Called once, from the session's disconnect
    /// path, before `on_disconnect` is invoked.
    pub(crate) fn remove(&self, id: SessionId) -> Option<Arc<Session>> {
        self.sessions.remove(&id).map(|(_, session)| session)
    }

    /// Number of currently registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Looks up a session and enqueues `frame` on it. Logs a warning if
    /// `id` is not (or no longer) registered.
    ///
    /// The lookup clones the `Arc<Session>` out of the map and drops the
    /// shard guard before calling `send`, matching `broadcast`/
    /// `disconnect_all`'s snapshot-then-release discipline: `Session::send`
    /// can disconnect the session synchronously, which re-enters this table
    /// via `remove`, and that would deadlock against a guard this call was
    /// still holding.
    pub fn send(&self, id: SessionId, frame: Bytes) {
        let session = self.sessions.get(&id).map(|e| Arc::clone(e.value()));
        match session {
            Some(session) => session.send(frame),
            None => warn!(session_id = id, "send to unknown session"),
        }
    }

    /// Enqueues the same frame on every currently registered session.
    /// `frame` is a cheap `Bytes` clone per recipient, not a copy of the
    /// underlying bytes.
    pub fn broadcast(&self, frame: Bytes) {
        let snapshot: Vec<Arc<Session>> = self.sessions.iter().map(|e| Arc::clone(e.value())).collect();
        for session in snapshot {
            session.send(frame.clone());
        }
    }

    /// Disconnects every currently registered session. Used by
    /// `Server::stop` to tear down remaining connections after the
    /// acceptor itself has stopped taking new ones.
    pub fn disconnect_all(&self) {
        let snapshot: Vec<Arc<Session>> = self.sessions.iter().map(|e| Arc::clone(e.value())).collect();
        for session in snapshot {
            session.disconnect(None);
        }
    }
}
