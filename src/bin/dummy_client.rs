// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Interactive test client: connects, echoes chat broadcasts to stdout,
//! and sends each line typed on stdin as a chat message. Reuses the
//! crate's own frame codec rather than re-deriving it.

use std::io::BufRead;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use yiso_net::net::frame::{self, C2S_CHAT, HEADER_SIZE, PacketHeader, S2C_CHAT};

#[derive(Debug, Deserialize)]
struct ServerChat {
    session_id: u32,
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let port: u16 = args
        .next()
        .map(|p| p.parse())
        .transpose()
        .context("port argument is not a valid integer")?
        .unwrap_or(7777);

    let stream = TcpStream::connect((host.as_str(), port))
        .await
        .with_context(|| format!("failed to connect to {host}:{port}"))?;
    println!("[Client] Connected to {host}:{port}");
    println!("[Client] Type a message and press Enter:");

    let (mut read_half, mut write_half) = stream.into_split();
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();

    let reader_task = tokio::spawn(async move {
        loop {
            let mut header_buf = [0u8; HEADER_SIZE];
            if read_half.read_exact(&mut header_buf).await.is_err() {
                eprintln!("[Client] connection closed");
                return;
            }
            let header = PacketHeader::decode(&header_buf);
            let mut body = vec![0u8; header.body_size() as usize];
            if read_half.read_exact(&mut body).await.is_err() {
                eprintln!("[Client] connection closed mid-frame");
                return;
            }
            if header.packet_type() != S2C_CHAT {
                continue;
            }
            match serde_json::from_slice::<ServerChat>(&body) {
                Ok(msg) => println!("[Session {}] {}", msg.session_id, msg.message),
                Err(e) => eprintln!("[Client] failed to decode broadcast: {e}"),
            }
        }
    });

    // stdin is blocking; read it on a dedicated thread and hand lines
    // over to the async writer through a channel.
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.is_empty() {
                continue;
            }
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let writer_task = tokio::spawn(async move {
        while let Some(line) = line_rx.recv().await {
            let frame = frame::encode(C2S_CHAT, line.as_bytes());
            if write_half.write_all(&frame).await.is_err() {
                return;
            }
        }
    });

    tokio::select! {
        _ = reader_task => {}
        _ = writer_task => {}
    }

    Ok(())
}
