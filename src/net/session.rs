// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The per-connection state machine: a read loop, a write loop, an idle
//! timeout, and a disconnect-once latch.
//!
//! A session owns no shared mutable read/write state: the read half and
//! write half are each driven exclusively by one `tokio::spawn`ed task, so
//! "at most one concurrent inbound read" and "at most one concurrent
//! outbound write" per session fall out of ordinary ownership rather than a
//! manual `reading`/`writing` flag. This is the one deliberate structural
//! departure from a callback-chain event loop: a callback chain needs a
//! `writing` flag to avoid re-entrant writes, but an `async fn` loop that
//! simply `.await`s each write already serializes itself.
//!
//! The outbound queue cap is likewise enforced by the channel itself:
//! `send` is a bounded `mpsc::Sender::try_send`, so capacity bookkeeping
//! never has to be reproduced by hand.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cfg::config::Config;
use crate::net::error::SessionError;
use crate::net::frame::{self, HEADER_SIZE, PacketHeader};
use crate::net::handler::Handler;

/// Identifies a session for the lifetime of its connection. Assigned by
/// the acceptor from a monotonic counter; never reused while the process
/// runs, so a stale id from a disconnected session is always a harmless
/// no-op rather than a silent hit on a newer, unrelated connection.
pub type SessionId = u32;

/// Invoked exactly once per session, after it has already been removed
/// from the session table (see [`crate::net::server::Server`]).
pub type OnDisconnect = Arc<dyn Fn(SessionId) + Send + Sync>;

/// A single accepted connection: frame codec, idle timeout, outbound
/// backpressure, and the disconnect-once latch, all in one place.
pub struct Session {
    id: SessionId,
    cfg: Config,
    disconnected: AtomicBool,
    cancel: CancellationToken,
    send_tx: mpsc::Sender<Bytes>,
    handler: Arc<dyn Handler>,
    on_disconnect: OnDisconnect,
}

impl Session {
    /// Builds a session around an accepted socket. Does not start its
    /// tasks; call [`Session::start`] once the session is visible in the
    /// table and `handler.on_connect` has run, per the ordering the
    /// acceptor guarantees.
    pub(crate) fn new(
        id: SessionId,
        cfg: Config,
        handler: Arc<dyn Handler>,
        on_disconnect: OnDisconnect,
    ) -> (Arc<Self>, mpsc::Receiver<Bytes>) {
        let (send_tx, send_rx) = mpsc::channel(cfg.max_send_queue_size);
        let session = Arc::new(Self {
            id,
            cfg,
            disconnected: AtomicBool::new(false),
            cancel: CancellationToken::new(),
            send_tx,
            handler,
            on_disconnect,
        });
        (session, send_rx)
    }

    /// Spawns the read and write tasks for an accepted socket and returns
    /// immediately; the session keeps itself alive via the `Arc` clones
    /// each task captures.
    pub(crate) fn start(self: &Arc<Self>, stream: TcpStream, send_rx: mpsc::Receiver<Bytes>) {
        let (read_half, write_half) = stream.into_split();

        let reader_session = Arc::clone(self);
        tokio::spawn(async move {
            read_loop(reader_session, read_half).await;
        });

        let writer_session = Arc::clone(self);
        tokio::spawn(async move {
            write_loop(writer_session, write_half, send_rx).await;
        });
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Whether [`Session::disconnect`] has already run for this session.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }

    /// Enqueues `frame` for the write task. Silently dropped if the
    /// session is already disconnected. If the outbound queue is already
    /// at `max_send_queue_size`, the frame is dropped and the session is
    /// torn down — callers never block and never see a partial send.
    pub fn send(&self, frame: Bytes) {
        if self.is_disconnected() {
            return;
        }
        match self.send_tx.try_send(frame) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.disconnect(Some(SessionError::ResourceExhausted(format!(
                    "outbound queue exceeded {} frames",
                    self.cfg.max_send_queue_size
                ))));
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }

    /// Idempotent teardown: the first caller wins the latch, cancels the
    /// session's tasks, logs at a level matching `reason`, and invokes
    /// `on_disconnect` exactly once. Later callers (including a racing
    /// read-error and write-error on the same session) are no-ops.
    pub fn disconnect(&self, reason: Option<SessionError>) {
        if self
            .disconnected
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        self.cancel.cancel();

        match &reason {
            None => info!(session_id = self.id, "session disconnected"),
            Some(e @ (SessionError::Eof | SessionError::OrderlyShutdown(_))) => {
                info!(session_id = self.id, reason = %e, "session disconnected");
            }
            Some(
                e @ (SessionError::Timeout
                | SessionError::Protocol(_)
                | SessionError::ResourceExhausted(_)),
            ) => {
                warn!(session_id = self.id, reason = %e, "session disconnected");
            }
            Some(e @ SessionError::Transport(_)) => {
                tracing::error!(session_id = self.id, reason = %e, "session disconnected");
            }
        }

        (self.on_disconnect)(self.id);
    }
}

/// Drives inbound frames: `READ_HEADER -> READ_BODY -> dispatch -> repeat`.
/// The idle deadline is rearmed only after a complete, validated frame, so
/// a peer stalled mid-header or mid-body for `idle_timeout` is disconnected
/// just as a peer that never sends anything at all.
async fn read_loop(session: Arc<Session>, mut reader: OwnedReadHalf) {
    let mut deadline = Instant::now() + session.cfg.idle_timeout;
    let mut body_buf: Vec<u8> = Vec::new();

    loop {
        let mut header_buf = [0u8; HEADER_SIZE];
        match read_with_deadline(&session, &mut reader, &mut header_buf, deadline).await {
            ReadStep::Cancelled => return,
            ReadStep::Err(e) => {
                session.disconnect(Some(e));
                return;
            }
            ReadStep::Ok => {}
        }

        let header = PacketHeader::decode(&header_buf);
        if !header.fits_within(session.cfg.max_packet_size) {
            session.disconnect(Some(SessionError::Protocol(format!(
                "body_size {} out of range [1, {}]",
                header.body_size(),
                session.cfg.max_packet_size
            ))));
            return;
        }

        let body_size = header.body_size() as usize;
        body_buf.clear();
        body_buf.resize(body_size, 0);
        match read_with_deadline(&session, &mut reader, &mut body_buf, deadline).await {
            ReadStep::Cancelled => return,
            ReadStep::Err(e) => {
                session.disconnect(Some(e));
                return;
            }
            ReadStep::Ok => {}
        }

        let type_tag = header.packet_type();
        if !frame::is_valid_inbound_type(type_tag) {
            session.disconnect(Some(SessionError::Protocol(format!(
                "unknown inbound type {type_tag}"
            ))));
            return;
        }

        deadline = Instant::now() + session.cfg.idle_timeout;
        session.handler.on_recv(session.id, type_tag, &body_buf);
    }
}

enum ReadStep {
    Ok,
    Cancelled,
    Err(SessionError),
}

/// Races a single `read_exact` against the session's cancellation token
/// and its idle deadline, translating the three possible outcomes
/// (cancelled, timed out, completed) into one [`ReadStep`].
async fn read_with_deadline(
    session: &Arc<Session>,
    reader: &mut OwnedReadHalf,
    buf: &mut [u8],
    deadline: Instant,
) -> ReadStep {
    tokio::select! {
        biased;
        () = session.cancel.cancelled() => ReadStep::Cancelled,
        res = timeout_at(deadline, reader.read_exact(buf)) => match res {
            Err(_elapsed) => ReadStep::Err(SessionError::Timeout),
            Ok(Ok(_)) => ReadStep::Ok,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                ReadStep::Err(SessionError::Eof)
            }
            Ok(Err(e)) => ReadStep::Err(SessionError::Transport(e)),
        },
    }
}

/// Drains the outbound channel and writes each frame in order. The
/// channel's bounded capacity (`max_send_queue_size`) is the only
/// backpressure mechanism; this loop just consumes it serially.
async fn write_loop(
    session: Arc<Session>,
    mut writer: OwnedWriteHalf,
    mut rx: mpsc::Receiver<Bytes>,
) {
    loop {
        let frame = tokio::select! {
            biased;
            () = session.cancel.cancelled() => None,
            frame = rx.recv() => frame,
        };
        let Some(frame) = frame else {
            break;
        };
        if let Err(e) = writer.write_all(&frame).await {
            session.disconnect(Some(SessionError::Transport(e)));
            break;
        }
    }
    let _ = writer.shutdown().await;
}
