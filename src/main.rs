// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use anyhow::{Context, Result};
use yiso_net::{
    app::chat::ChatHandler,
    cfg::{cli::parse_config_from_env, logger::init_logger, signal::wait_for_shutdown_signal},
    net::Server,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _logger_guard = init_logger().context("failed to initialize logging")?;

    let cfg = parse_config_from_env().context("failed to resolve configuration")?;
    info!(port = cfg.port, "starting server");

    let server = Server::bind(cfg, |table| {
        Arc::new(ChatHandler::new(table)) as Arc<dyn yiso_net::net::Handler>
    })
    .await
    .context("failed to bind listener")?;

    let shutdown_token = server.cancellation_token();
    tokio::spawn(wait_for_shutdown_signal(shutdown_token.clone()));

    tokio::select! {
        () = server.run() => {}
        () = shutdown_token.cancelled() => {
            server.stop();
        }
    }

    info!("server stopped");
    Ok(())
}
