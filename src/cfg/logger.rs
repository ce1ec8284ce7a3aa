// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, registry::Registry};

/// Initializes the global `tracing` subscriber: a non-blocking stdout
/// writer behind a human-readable `fmt` layer, gated by an `EnvFilter`
/// that defaults to `info` and otherwise honors `RUST_LOG`.
///
/// The returned [`WorkerGuard`] must be kept alive for the life of the
/// process — dropping it flushes and stops the background writer thread.
pub fn init_logger() -> Result<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_writer(writer).with_target(true);

    let subscriber = Registry::default().with(env_filter).with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set global default tracing subscriber")?;

    Ok(guard)
}
