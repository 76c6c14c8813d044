/*
 * iopub.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use log::debug;
use log::trace;
use log::warn;

use crate::session::Session;
use crate::socket::socket::Socket;
use crate::sync::BlockingQueue;
use crate::wire::jupyter_message::Message;

/// Publishes broadcast messages. Messages are produced on other threads and
/// queued; this worker signs and sends them in queue order.
pub struct IOPub {
    /// The underlying IOPub socket
    socket: Socket,

    /// Session carrying the signing key
    session: Session,

    /// Messages waiting to be published
    queue: BlockingQueue<Message>,
}

impl IOPub {
    pub fn new(socket: Socket, session: Session, queue: BlockingQueue<Message>) -> Self {
        Self {
            socket,
            session,
            queue,
        }
    }

    /// Main loop for the IOPub thread; returns only once the socket is closed
    pub fn listen(&self) {
        loop {
            let mut message = self.queue.take();
            trace!("Publishing '{}'", message.describe());

            if let Err(err) = message.sign(&self.session) {
                warn!("Could not sign '{}' message: {}", message.describe(), err);
                continue;
            }

            if let Err(err) = self.socket.send_message(&message) {
                if err.is_socket_closed() {
                    debug!("IOPub socket closed");
                    return;
                }
                warn!("Could not publish '{}' message: {}", message.describe(), err);
            }
        }
    }
}
