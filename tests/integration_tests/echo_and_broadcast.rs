// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use yiso_net::net::frame::{C2S_CHAT, S2C_CHAT};

use super::common::{TestServer, read_frame, write_frame};

#[tokio::test]
async fn chat_message_is_broadcast_to_every_connected_session() {
    let ts = TestServer::start(|_| {}).await;

    let mut alice = ts.connect().await;
    ts.wait_until_sessions(1).await;
    // Alice's own join announcement.
    let (join_type, _) = read_frame(&mut alice).await;
    assert_eq!(join_type, S2C_CHAT);

    let mut bob = ts.connect().await;
    ts.wait_until_sessions(2).await;
    // Both sessions see Bob's join announcement.
    let (bob_join_type, _) = read_frame(&mut alice).await;
    assert_eq!(bob_join_type, S2C_CHAT);
    let _ = read_frame(&mut bob).await;

    write_frame(&mut alice, C2S_CHAT, b"hello room").await;

    let (alice_echo_type, alice_echo_body) = read_frame(&mut alice).await;
    assert_eq!(alice_echo_type, S2C_CHAT);
    let alice_text = String::from_utf8(alice_echo_body).expect("payload should be utf8 json");
    assert!(alice_text.contains("hello room"));

    let (bob_echo_type, bob_echo_body) = read_frame(&mut bob).await;
    assert_eq!(bob_echo_type, S2C_CHAT);
    let bob_text = String::from_utf8(bob_echo_body).expect("payload should be utf8 json");
    assert_eq!(bob_text, alice_text);

    ts.stop().await;
}

#[tokio::test]
async fn disconnect_announcement_reaches_remaining_sessions() {
    let ts = TestServer::start(|_| {}).await;

    let mut alice = ts.connect().await;
    ts.wait_until_sessions(1).await;
    let _ = read_frame(&mut alice).await; // alice's own join

    let bob = ts.connect().await;
    ts.wait_until_sessions(2).await;
    let _ = read_frame(&mut alice).await; // bob's join, seen by alice

    drop(bob);
    ts.wait_until_sessions(1).await;

    let (leave_type, leave_body) = read_frame(&mut alice).await;
    assert_eq!(leave_type, S2C_CHAT);
    let text = String::from_utf8(leave_body).expect("payload should be utf8 json");
    assert!(text.contains("left"));

    ts.stop().await;
}
