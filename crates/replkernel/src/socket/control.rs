/*
 * control.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use crossbeam::channel::Sender;
use log::debug;
use log::error;
use log::info;
use log::trace;
use log::warn;
use stdext::ResultExt;

use crate::error::Error;
use crate::kernel::KernelEvent;
use crate::session::Session;
use crate::socket::socket::Socket;
use crate::sync::ConcurrentArray;
use crate::wire::content::Content;
use crate::wire::jupyter_message::Message;
use crate::wire::jupyter_message::Status;
use crate::wire::shutdown_reply::ShutdownReply;

/// How long to wait for control traffic before doing housekeeping
const HOUSEKEEPING_INTERVAL_MS: i64 = 1000;

pub struct Control {
    socket: Socket,
    session: Session,

    /// Frames of the message currently being received
    frames: ConcurrentArray<Vec<u8>>,

    /// Where to announce a shutdown request
    events_tx: Sender<KernelEvent>,
}

impl Control {
    pub fn new(socket: Socket, session: Session, events_tx: Sender<KernelEvent>) -> Self {
        Self {
            socket,
            session,
            frames: ConcurrentArray::new(),
            events_tx,
        }
    }

    /// Main loop for the Control thread; to be invoked by the kernel. Returns
    /// after a shutdown request or once the socket is closed.
    pub fn listen(&self) {
        loop {
            trace!("Waiting for control messages");
            match self.socket.poll_incoming(HOUSEKEEPING_INTERVAL_MS) {
                Ok(true) => {},
                Ok(false) => {
                    self.housekeeping();
                    continue;
                },
                Err(err) => {
                    if self.closed(&err) {
                        return;
                    }
                    continue;
                },
            }

            // Read frames one by one until the last of the message
            let mut part = zmq::Message::new();
            if let Err(err) = self.socket.recv(&mut part) {
                if self.closed(&err) {
                    return;
                }
                continue;
            }
            let more = part.get_more();
            self.frames.append(part.to_vec());
            if more {
                continue;
            }

            let frames = self.frames.drain();
            let message = match Message::from_frames(frames) {
                Ok(message) => message,
                Err(err) => {
                    warn!("Could not read message from control socket: {}", err);
                    continue;
                },
            };
            if let Err(err) = message.verify(&self.session) {
                warn!(
                    "Dropping '{}' control message: {}",
                    message.header.msg_type, err
                );
                continue;
            }

            if self.handle(message) {
                return;
            }
        }
    }

    /// Returns true when the control loop should stop.
    fn handle(&self, message: Message) -> bool {
        match &message.content {
            Content::ShutdownRequest(req) => {
                info!("Received shutdown request, shutting down kernel: {:?}", req);

                let content = ShutdownReply {
                    status: Status::Ok,
                    restart: req.restart,
                };
                let mut reply = Message::create_reply(&message, content, &self.session);
                let sent = reply
                    .sign(&self.session)
                    .and_then(|_| self.socket.send_message(&reply));
                if let Err(err) = sent {
                    warn!("Failed to send shutdown reply: {}", err);
                }

                let event = KernelEvent::Shutdown {
                    restart: req.restart,
                };
                self.events_tx
                    .send(event)
                    .on_err(|err| error!("Failed to announce shutdown: {:?}", err));
                true
            },
            _ => {
                info!(
                    "Ignoring '{}' message on control socket",
                    message.header.msg_type
                );
                false
            },
        }
    }

    /// Drops the frames of a message that never completed, e.g. from a sender
    /// that died mid-message. Any leftover would be read as routing identities
    /// of the next message.
    fn housekeeping(&self) {
        let dropped = self.frames.remove_all();
        if dropped > 0 {
            debug!("Dropped {dropped} stale control frame(s)");
        }
    }

    fn closed(&self, err: &Error) -> bool {
        if err.is_socket_closed() {
            debug!("Control socket closed");
            return true;
        }
        warn!("Error on control socket: {}", err);
        false
    }
}
