// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Session I/O engine for a length-prefixed TCP game server.
//!
//! [`cfg`] handles configuration, CLI parsing, logging, and shutdown
//! signals. [`net`] is the payload-agnostic core: accept loop, frame
//! codec, per-session backpressure and idle timeouts, and the session
//! table. [`app`] hosts the sample chat application built on top of it.

pub mod app;
pub mod cfg;
pub mod net;
