// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result, bail};

use crate::cfg::config::{Config, DEFAULT_PORT, MIN_PORT};

/// Parses the single optional positional CLI argument (the listen port)
/// out of an arbitrary argument iterator, so tests can feed it a fixed
/// `Vec<String>` instead of real `std::env::args()`.
///
/// Small, fallible, `anyhow::Context`-annotated, and deliberately free of
/// a CLI-parsing dependency for a single positional integer.
pub fn parse_port<I, S>(mut args: I) -> Result<u16>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let Some(raw) = args.next() else {
        return Ok(DEFAULT_PORT);
    };
    let raw = raw.as_ref();

    let port: u16 = raw
        .parse()
        .with_context(|| format!("port argument {raw:?} is not a valid integer"))?;
    if port < MIN_PORT {
        bail!("port {port} out of range: must be in [{MIN_PORT}, 65535]");
    }
    if args.next().is_some() {
        bail!("unexpected extra command-line argument after port");
    }
    Ok(port)
}

/// Parses `std::env::args()` (skipping argv[0]) into a validated [`Config`].
pub fn parse_config_from_env() -> Result<Config> {
    let port = parse_port(std::env::args().skip(1))?;
    Config::with_port(port)
}
