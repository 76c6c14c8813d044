/*
 * heartbeat.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use log::debug;
use log::trace;
use log::warn;

use crate::socket::socket::Socket;

/// Structure used for heartbeat messages
pub struct Heartbeat {
    socket: Socket,
}

impl Heartbeat {
    /// Create a new heartbeat handler from the given heartbeat socket
    pub fn new(socket: Socket) -> Self {
        Self { socket }
    }

    /// Listen for heartbeats; returns only once the socket is closed
    pub fn listen(&self) {
        debug!("Listening for heartbeats");
        loop {
            let mut msg = zmq::Message::new();
            if let Err(err) = self.socket.recv(&mut msg) {
                if err.is_socket_closed() {
                    debug!("Heartbeat socket closed");
                    return;
                }
                warn!("Error receiving heartbeat: {}", err);

                // Wait 1s before trying to receive another heartbeat. This
                // keeps us from flooding the logs when recv() isn't working.
                std::thread::sleep(std::time::Duration::from_secs(1));
                continue;
            } else {
                trace!("Heartbeat message: {:?}", msg);
            }

            // Echo the message right back!
            if let Err(err) = self.socket.send(msg) {
                warn!("Error replying to heartbeat: {}", err);
            } else {
                trace!("Heartbeat message replied");
            }
        }
    }
}
