// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use yiso_net::app::chat::ChatHandler;
use yiso_net::cfg::config::Config;
use yiso_net::net::frame::{HEADER_SIZE, PacketHeader, PacketType};
use yiso_net::net::{Handler, Server};

/// Binds a real chat server on an ephemeral loopback port, spawns its
/// accept loop as a background task, and returns everything a test needs
/// to drive it with real `TcpStream`s and tear it down afterward.
pub struct TestServer {
    pub addr: SocketAddr,
    pub server: Arc<Server>,
    accept_task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(cfg_override: impl FnOnce(&mut Config)) -> Self {
        let mut cfg = Config {
            port: 0,
            ..Config::default()
        };
        cfg_override(&mut cfg);

        let server = Arc::new(
            Server::bind(cfg, |table| Arc::new(ChatHandler::new(table)) as Arc<dyn Handler>)
                .await
                .expect("test server should bind"),
        );
        let addr = server.local_addr().expect("bound listener has a local addr");

        let run_server = Arc::clone(&server);
        let accept_task = tokio::spawn(async move { run_server.run().await });

        Self {
            addr,
            server,
            accept_task,
        }
    }

    pub async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr)
            .await
            .expect("client should connect to the test server")
    }

    pub async fn stop(self) {
        self.server.stop();
        let _ = tokio::time::timeout(Duration::from_secs(2), self.accept_task).await;
    }

    pub async fn wait_until_sessions(&self, count: usize) {
        wait_until(|| self.server.session_table().len() == count).await;
    }
}

/// Polls `predicate` until it's true or a short deadline elapses. Used in
/// place of a fixed `sleep` so tests aren't tied to an arbitrary delay.
pub async fn wait_until(mut predicate: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !predicate() {
        if tokio::time::Instant::now() >= deadline {
            panic!("condition not met within deadline");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Reads exactly one frame off `stream`, returning `(type, payload)`.
pub async fn read_frame(stream: &mut TcpStream) -> (PacketType, Vec<u8>) {
    let mut header_buf = [0u8; HEADER_SIZE];
    stream
        .read_exact(&mut header_buf)
        .await
        .expect("reading header should succeed");
    let header = PacketHeader::decode(&header_buf);
    let mut body = vec![0u8; header.body_size() as usize];
    stream
        .read_exact(&mut body)
        .await
        .expect("reading body should succeed");
    (header.packet_type(), body)
}

/// Reads one frame with a bounded wait, returning `None` on timeout
/// instead of panicking — used where "nothing arrives" is itself the
/// assertion.
pub async fn try_read_frame(
    stream: &mut TcpStream,
    within: Duration,
) -> Option<(PacketType, Vec<u8>)> {
    tokio::time::timeout(within, read_frame(stream)).await.ok()
}

pub async fn write_frame(stream: &mut TcpStream, type_tag: PacketType, payload: &[u8]) {
    let frame = yiso_net::net::frame::encode(type_tag, payload);
    stream
        .write_all(&frame)
        .await
        .expect("writing frame should succeed");
}
