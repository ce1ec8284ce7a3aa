// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use anyhow::{Result, ensure};

/// Lowest listen port the CLI surface accepts.
pub const MIN_PORT: u16 = 1024;
/// Default listen port when none is given on the command line.
pub const DEFAULT_PORT: u16 = 7777;
/// Hard cap on a single session's outbound FIFO queue. Exceeding it
/// terminates the session.
pub const MAX_SEND_QUEUE_SIZE: usize = 256;
/// Idle-timeout duration: a session with no fully-validated inbound frame
/// for this long is disconnected.
pub const TIMEOUT_SEC: u64 = 30;

/// Runtime parameters for one server instance.
///
/// Everything here is either a wire-protocol limit
/// (`max_send_queue_size`, `max_packet_size`) or derived from the CLI
/// surface (`port`). Kept as a plain validated struct rather than
/// threaded through as loose function arguments.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// TCP port the acceptor binds on, IPv4.
    pub port: u16,
    /// Outbound queue cap per session.
    pub max_send_queue_size: usize,
    /// Idle-timeout duration, rearmed after every complete inbound frame.
    pub idle_timeout: Duration,
    /// Maximum accepted `body_size`, inclusive.
    pub max_packet_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_send_queue_size: MAX_SEND_QUEUE_SIZE,
            idle_timeout: Duration::from_secs(TIMEOUT_SEC),
            max_packet_size: crate::net::frame::MAX_PACKET_SIZE,
        }
    }
}

impl Config {
    /// Builds a config for the given port, applying all other defaults.
    pub fn with_port(port: u16) -> Result<Self> {
        let cfg = Self {
            port,
            ..Self::default()
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates invariants.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.port >= MIN_PORT,
            "port {} out of range: must be in [{MIN_PORT}, 65535]",
            self.port
        );
        ensure!(
            self.max_send_queue_size > 0,
            "max_send_queue_size must be > 0"
        );
        ensure!(self.max_packet_size > 0, "max_packet_size must be > 0");
        Ok(())
    }
}
