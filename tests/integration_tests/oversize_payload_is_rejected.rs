// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use yiso_net::net::frame::C2S_CHAT;

use super::common::{TestServer, read_frame, try_read_frame, write_frame};

#[tokio::test]
async fn body_size_over_the_configured_cap_disconnects_without_a_response() {
    let ts = TestServer::start(|cfg| cfg.max_packet_size = 64).await;

    let mut client = ts.connect().await;
    ts.wait_until_sessions(1).await;
    let _ = read_frame(&mut client).await; // own join announcement

    write_frame(&mut client, C2S_CHAT, &vec![0u8; 65]).await;

    ts.wait_until_sessions(0).await;
    assert!(
        try_read_frame(&mut client, std::time::Duration::from_millis(200))
            .await
            .is_none(),
        "an oversize frame must not get a reply before the session is torn down"
    );

    ts.stop().await;
}

#[tokio::test]
async fn unknown_inbound_type_disconnects_the_session() {
    let ts = TestServer::start(|_| {}).await;

    let mut client = ts.connect().await;
    ts.wait_until_sessions(1).await;
    let _ = read_frame(&mut client).await; // own join announcement

    // type 9999 is not in the inbound-legal set.
    write_frame(&mut client, 9999, b"{}").await;

    ts.wait_until_sessions(0).await;

    ts.stop().await;
}
