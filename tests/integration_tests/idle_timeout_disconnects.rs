// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use super::common::{TestServer, read_frame};

#[tokio::test]
async fn a_session_that_sends_nothing_is_disconnected_after_the_idle_timeout() {
    let ts = TestServer::start(|cfg| cfg.idle_timeout = Duration::from_millis(100)).await;

    let mut client = ts.connect().await;
    ts.wait_until_sessions(1).await;
    let _ = read_frame(&mut client).await; // own join announcement

    ts.wait_until_sessions(0).await;

    ts.stop().await;
}

#[tokio::test]
async fn sending_a_frame_before_the_deadline_rearms_the_timeout() {
    let ts = TestServer::start(|cfg| cfg.idle_timeout = Duration::from_millis(150)).await;

    let mut client = ts.connect().await;
    ts.wait_until_sessions(1).await;
    let _ = read_frame(&mut client).await; // own join announcement

    // Send one frame partway through the window; the session should still
    // be alive immediately afterward, well before two full windows elapse.
    tokio::time::sleep(Duration::from_millis(80)).await;
    super::common::write_frame(&mut client, yiso_net::net::frame::C2S_CHAT, b"still here").await;
    let _ = read_frame(&mut client).await; // echo of our own message

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(ts.server.session_table().len(), 1);

    ts.stop().await;
}
