// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Typed error taxonomy for the session layer.
//!
//! Everything above the session boundary keeps using `anyhow::Result`;
//! `SessionError` exists so the handful of call sites that care about
//! *which kind* of failure
//! occurred (transport vs. protocol vs. resource exhaustion vs. orderly
//! shutdown) can match on it instead of string-sniffing an `anyhow::Error`.

use thiserror::Error;

/// Why a session was terminated.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The peer closed its write side cleanly (`read_exact` hit EOF with
    /// zero bytes consumed into a fresh header). Not an error condition.
    #[error("peer closed the connection")]
    Eof,

    /// No complete inbound frame arrived within the configured idle
    /// timeout.
    #[error("idle timeout")]
    Timeout,

    /// A read or write failed at the transport layer for a reason other
    /// than clean EOF.
    #[error("transport error: {0}")]
    Transport(std::io::Error),

    /// The peer sent something that violates the framing protocol
    /// (out-of-range `body_size`, unknown inbound `type`). Treated as
    /// hostile input: the session is torn down without notifying the
    /// peer.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// A resource limit was hit (outbound queue at capacity, payload
    /// buffer allocation failure). The session is terminated; the server
    /// continues running.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The connection ended as an expected consequence of a server-side
    /// shutdown, not an error: an "operation aborted" following
    /// `Server::stop()`.
    #[error("orderly shutdown: {0}")]
    OrderlyShutdown(String),
}
