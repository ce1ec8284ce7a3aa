// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use tokio::io::AsyncReadExt;

use super::common::{TestServer, read_frame, wait_until};

#[tokio::test]
async fn stop_disconnects_connected_sessions() {
    let ts = TestServer::start(|_| {}).await;

    let mut client = ts.connect().await;
    ts.wait_until_sessions(1).await;
    let _ = read_frame(&mut client).await; // own join announcement

    ts.server.stop();
    wait_until(|| ts.server.session_table().is_empty()).await;

    // The peer observes a clean EOF on its read side, not a reset or a
    // hang.
    let mut buf = [0u8; 1];
    let n = tokio::time::timeout(std::time::Duration::from_secs(1), client.read(&mut buf))
        .await
        .expect("read should complete promptly after shutdown")
        .expect("read should not error, just return 0 at EOF");
    assert_eq!(n, 0, "socket should be closed after graceful shutdown");
}

#[tokio::test]
async fn stop_is_idempotent() {
    let ts = TestServer::start(|_| {}).await;
    let _client = ts.connect().await;
    ts.wait_until_sessions(1).await;

    ts.server.stop();
    wait_until(|| ts.server.session_table().is_empty()).await;
    ts.server.stop(); // must not panic
}
