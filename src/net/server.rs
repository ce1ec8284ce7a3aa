// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The acceptor: binds a listener, assigns each accepted socket a
//! [`SessionId`], and wires it into a [`Session`] registered in a shared
//! [`SessionTable`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cfg::config::Config;
use crate::net::handler::Handler;
use crate::net::session::Session;
use crate::net::table::SessionTable;

/// Owns the listening socket and the session table for one running
/// server instance.
pub struct Server {
    cfg: Config,
    listener: TcpListener,
    handler: Arc<dyn Handler>,
    table: SessionTable,
    next_id: AtomicU32,
    cancel: CancellationToken,
}

impl Server {
    /// Binds `127.0.0.1:{cfg.port}` and returns a `Server` ready for
    /// [`Server::run`]. Binding on `0.0.0.0` is left to deployments that
    /// need it; this favors the narrower default and lets callers widen
    /// it explicitly.
    ///
    /// `build_handler` receives the server's own [`SessionTable`] so a
    /// handler that needs to broadcast (like [`crate::app::chat::ChatHandler`])
    /// can be built around the same table the acceptor populates, without
    /// the caller having to construct a table by hand and risk wiring it
    /// to the wrong server.
    pub async fn bind(
        cfg: Config,
        build_handler: impl FnOnce(SessionTable) -> Arc<dyn Handler>,
    ) -> Result<Self> {
        let addr = format!("127.0.0.1:{}", cfg.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind listener on {addr}"))?;
        info!(addr = %addr, "listening");
        let table = SessionTable::new();
        let handler = build_handler(table.clone());
        Ok(Self {
            cfg,
            listener,
            handler,
            table,
            next_id: AtomicU32::new(1),
            cancel: CancellationToken::new(),
        })
    }

    /// The session table backing this server. Applications hold a clone
    /// to broadcast or target individual sessions from outside the
    /// accept loop (e.g. from a timer task or an admin command).
    pub fn session_table(&self) -> SessionTable {
        self.table.clone()
    }

    /// The listener's bound local address. Mainly useful for tests that
    /// bind on port 0 and need the OS-assigned ephemeral port.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// A token that becomes cancelled once [`Server::stop`] is called.
    /// Exposed so callers can fold server shutdown into their own
    /// `tokio::select!` alongside a signal handler.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Accepts connections until cancelled. Each accepted socket is given
    /// a monotonically increasing [`SessionId`], registered in the table,
    /// announced via `handler.on_connect`, and only then started — so a
    /// handler that immediately broadcasts from `on_connect` always finds
    /// its own session in the table and never races the session's own
    /// read/write tasks starting.
    ///
    /// A transient accept error (the common case: the peer reset the
    /// connection before `accept()` returned it) is logged and the loop
    /// continues; it never tears down the listener.
    pub async fn run(&self) {
        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    info!("accept loop stopping");
                    break;
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer_addr)) => self.spawn_session(stream, peer_addr),
                        Err(e) => {
                            warn!(error = %e, "transient accept error");
                        }
                    }
                }
            }
        }
    }

    fn spawn_session(&self, stream: tokio::net::TcpStream, peer_addr: std::net::SocketAddr) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(session_id = id, peer = %peer_addr, "accepted connection");

        let table = self.table.clone();
        let handler = Arc::clone(&self.handler);
        let on_disconnect_handler = Arc::clone(&self.handler);
        let on_disconnect = Arc::new(move |disconnected_id| {
            table.remove(disconnected_id);
            on_disconnect_handler.on_disconnect(disconnected_id);
        });

        let (session, send_rx) = Session::new(id, self.cfg, handler, on_disconnect);
        self.table.insert(Arc::clone(&session));
        self.handler.on_connect(id);
        session.start(stream, send_rx);
    }

    /// Stops the accept loop and disconnects every currently registered
    /// session. Idempotent: cancelling an already-cancelled token is a
    /// no-op, and [`Session::disconnect`] is itself idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
        self.table.disconnect_all();
    }
}
