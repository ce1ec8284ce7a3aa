// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! A broadcast chat room: every inbound chat message is echoed to every
//! connected session, tagged with its sender's id. Connects and
//! disconnects are themselves announced as chat messages from session 0.
//!
//! Inbound `C2S_CHAT` payloads are raw UTF-8 text — the core leaves
//! payload schema out of scope, so this picks the simplest possible
//! inbound shape rather than fabricating a protobuf dependency the
//! example corpus does not otherwise use. Outbound `S2C_CHAT` payloads
//! are `serde_json`-encoded `{ session_id, message }`, since the reply
//! needs to carry the sender's id alongside the text and `serde`/
//! `serde_json` are already part of the dependency graph.

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::net::frame::{self, C2S_CHAT, PacketType, S2C_CHAT};
use crate::net::handler::Handler;
use crate::net::session::SessionId;
use crate::net::table::SessionTable;

/// Session id used for system-originated announcements (join/leave).
const SYSTEM_SESSION_ID: SessionId = 0;

#[derive(Debug, Serialize)]
struct ServerChat {
    session_id: SessionId,
    message: String,
}

impl ServerChat {
    fn encode(&self) -> Option<Bytes> {
        match serde_json::to_vec(self) {
            Ok(body) => Some(frame::encode(S2C_CHAT, &body)),
            Err(e) => {
                warn!(error = %e, "failed to encode chat broadcast");
                None
            }
        }
    }
}

/// A [`Handler`] that turns every session into a participant in one
/// shared chat room.
pub struct ChatHandler {
    table: SessionTable,
}

impl ChatHandler {
    pub fn new(table: SessionTable) -> Self {
        Self { table }
    }

    fn broadcast(&self, session_id: SessionId, message: String) {
        let chat = ServerChat { session_id, message };
        if let Some(frame) = chat.encode() {
            self.table.broadcast(frame);
        }
    }
}

impl Handler for ChatHandler {
    fn on_connect(&self, id: SessionId) {
        info!(session_id = id, "session connected");
        self.broadcast(SYSTEM_SESSION_ID, format!("session {id} joined"));
    }

    fn on_recv(&self, id: SessionId, type_tag: PacketType, payload: &[u8]) {
        if type_tag != C2S_CHAT {
            return;
        }
        let message = match std::str::from_utf8(payload) {
            Ok(text) => text.to_string(),
            Err(e) => {
                warn!(session_id = id, error = %e, "chat payload is not valid utf-8");
                return;
            }
        };
        info!(session_id = id, message = %message, "chat message");
        self.broadcast(id, message);
    }

    fn on_disconnect(&self, id: SessionId) {
        info!(session_id = id, "session disconnected");
        self.broadcast(SYSTEM_SESSION_ID, format!("session {id} left"));
    }
}
