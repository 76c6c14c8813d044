/*
 * socket_in.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use std::time::Duration;

use log::debug;
use log::trace;
use log::warn;

use crate::pipeline::SharedSocket;
use crate::sync::BlockingQueue;
use crate::wire::jupyter_message::Message;

/// How long to wait for input while holding the socket lock
const POLL_TIMEOUT_MS: i64 = 10;

/// Pause between polls so the writer can take the socket lock
const IDLE_BACKOFF: Duration = Duration::from_millis(1);

/// First stage: reads frames from the shell socket and parses them.
pub struct SocketIn {
    socket: SharedSocket,
    output: BlockingQueue<Message>,
}

impl SocketIn {
    pub fn new(socket: SharedSocket, output: BlockingQueue<Message>) -> Self {
        Self { socket, output }
    }

    /// Runs until the socket is closed.
    pub fn run(&self) {
        loop {
            let frames = {
                let socket = self.socket.lock().unwrap();
                match socket.poll_incoming(POLL_TIMEOUT_MS) {
                    Ok(true) => socket.recv_multipart(),
                    Ok(false) => {
                        drop(socket);
                        std::thread::sleep(IDLE_BACKOFF);
                        continue;
                    },
                    Err(err) => Err(err),
                }
            };

            let frames = match frames {
                Ok(frames) => frames,
                Err(err) if err.is_socket_closed() => {
                    debug!("Shell socket closed; no longer reading");
                    return;
                },
                Err(err) => {
                    warn!("Could not read from shell socket: {err}");
                    continue;
                },
            };

            match Message::from_frames(frames) {
                Ok(message) => {
                    trace!(
                        "Received '{}' message {}",
                        message.describe(),
                        message.header.msg_id
                    );
                    self.output.add(message);
                },
                Err(err) => warn!("Discarding unreadable shell message: {err}"),
            }
        }
    }
}
