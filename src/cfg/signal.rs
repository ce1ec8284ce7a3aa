// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Waits for a termination signal (`SIGINT`/Ctrl-C, and on Unix `SIGTERM`)
/// and cancels `token` once one arrives.
///
/// Spawned as its own task at startup; the main run loop selects on
/// `token.cancelled()` alongside the accept loop so shutdown is
/// cooperative rather than a hard process kill. `SIGKILL` cannot be
/// caught and is expected to terminate the process abruptly regardless
/// of this task.
pub async fn wait_for_shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            },
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            },
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }

    token.cancel();
}
