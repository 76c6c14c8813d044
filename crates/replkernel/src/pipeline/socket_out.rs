/*
 * socket_out.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use log::debug;
use log::warn;

use crate::pipeline::SharedSocket;
use crate::sync::BlockingQueue;
use crate::wire::jupyter_message::Message;

/// Last stage: writes signed replies back to the peers that asked.
pub struct SocketOut {
    socket: SharedSocket,
    input: BlockingQueue<Message>,
}

impl SocketOut {
    pub fn new(socket: SharedSocket, input: BlockingQueue<Message>) -> Self {
        Self { socket, input }
    }

    /// Runs until the socket is closed.
    pub fn run(&self) {
        loop {
            let message = self.input.take();
            let result = self.socket.lock().unwrap().send_message(&message);
            match result {
                Ok(()) => {},
                Err(err) if err.is_socket_closed() => {
                    debug!("Shell socket closed; no longer writing");
                    return;
                },
                Err(err) => warn!("Could not send '{}' message: {err}", message.describe()),
            }
        }
    }
}
