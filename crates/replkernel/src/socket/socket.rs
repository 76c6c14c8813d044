/*
 * socket.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use log::trace;

use crate::error::Error;
use crate::wire::jupyter_message::Message;

/// A named ZeroMQ socket carrying Jupyter messages. The name is used only to
/// give context to log messages and errors.
pub struct Socket {
    pub name: String,

    /// The underlying ZeroMQ socket
    pub socket: zmq::Socket,
}

impl Socket {
    /// Create a new Socket on the given ZeroMQ context. Kernel-side socket
    /// types bind to `endpoint`; client-side types connect to it.
    pub fn new(
        ctx: &zmq::Context,
        name: String,
        kind: zmq::SocketType,
        endpoint: String,
    ) -> Result<Self, Error> {
        // Create the underlying ZeroMQ socket
        let socket = match ctx.socket(kind) {
            Ok(s) => s,
            Err(err) => return Err(Error::CreateSocketFailed(name, err)),
        };

        // IOPub is the busiest channel; raise the "high water mark" from the
        // default of 1k so slow subscribers don't cause dropped messages. This
        // has to be set before the call to `bind()`.
        if name == "IOPub" {
            if let Err(error) = socket.set_sndhwm(100000) {
                return Err(Error::CreateSocketFailed(name, error));
            }
        }

        // One side of a socket must `bind()` to its endpoint, and the other
        // side must `connect()` to the same endpoint. The `bind()` side
        // will be the server, and the `connect()` side will be the client.
        match kind {
            zmq::SocketType::ROUTER | zmq::SocketType::PUB | zmq::SocketType::REP => {
                trace!("Binding to ZeroMQ '{}' socket at {}", name, endpoint);
                if let Err(err) = socket.bind(&endpoint) {
                    return Err(Error::SocketBindError(name, endpoint, err));
                }
            },
            zmq::SocketType::DEALER | zmq::SocketType::SUB | zmq::SocketType::REQ => {
                trace!("Connecting to ZeroMQ '{}' socket at {}", name, endpoint);
                if let Err(err) = socket.connect(&endpoint) {
                    return Err(Error::SocketConnectError(name, endpoint, err));
                }
            },
            _ => return Err(Error::UnsupportedSocketType(kind)),
        }

        Ok(Self { socket, name })
    }

    /// The port the socket ended up bound or connected to. Resolves ports
    /// that were requested as `*`.
    pub fn port(&self) -> Result<u16, Error> {
        let endpoint = match self.socket.get_last_endpoint() {
            Ok(Ok(endpoint)) => endpoint,
            Ok(Err(raw)) => String::from_utf8_lossy(&raw).to_string(),
            Err(err) => return Err(Error::ZmqError(self.name.clone(), err)),
        };
        endpoint
            .rsplit(':')
            .next()
            .and_then(|port| port.parse::<u16>().ok())
            .ok_or_else(|| {
                crate::anyhow!("Can't find port of '{}' socket in '{endpoint}'", self.name)
            })
    }

    /// Receive a message from the socket.
    ///
    /// **Note**: This will block until a message is delivered on the socket.
    pub fn recv(&self, msg: &mut zmq::Message) -> Result<(), Error> {
        if let Err(err) = self.socket.recv(msg, 0) {
            Err(Error::ZmqError(self.name.clone(), err))
        } else {
            Ok(())
        }
    }

    /// Receive a multi-part message from the socket.
    ///
    /// **Note**: This will block until a message is delivered on the socket.
    pub fn recv_multipart(&self) -> Result<Vec<Vec<u8>>, Error> {
        match self.socket.recv_multipart(0) {
            Ok(data) => Ok(data),
            Err(err) => Err(Error::ZmqError(self.name.clone(), err)),
        }
    }

    /// Send a message on the socket.
    pub fn send(&self, msg: zmq::Message) -> Result<(), Error> {
        match self.socket.send(msg, 0) {
            Ok(data) => Ok(data),
            Err(err) => Err(Error::ZmqError(self.name.clone(), err)),
        }
    }

    /// Send a multi-part message on the socket. Every frame but the last is
    /// flagged as "more".
    pub fn send_multipart(&self, data: &Vec<Vec<u8>>) -> Result<(), Error> {
        match self.socket.send_multipart(data, 0) {
            Ok(data) => Ok(data),
            Err(err) => Err(Error::ZmqError(self.name.clone(), err)),
        }
    }

    /// Serialize a Jupyter message and send it. The message should already be
    /// signed.
    pub fn send_message(&self, message: &Message) -> Result<(), Error> {
        match &message.parent_header {
            Some(parent) => {
                trace!(
                    "Sending '{}' message (reply to '{}') via {} socket",
                    message.describe(),
                    parent.msg_type,
                    self.name
                );
            },
            None => {
                trace!(
                    "Sending '{}' message via {} socket",
                    message.describe(),
                    self.name
                );
            },
        }
        self.send_multipart(&message.to_frames()?)
    }

    /// Receive and parse a Jupyter message. The signature is not checked.
    pub fn recv_message(&self) -> Result<Message, Error> {
        Message::from_frames(self.recv_multipart()?)
    }

    pub fn poll_incoming(&self, timeout_ms: i64) -> Result<bool, Error> {
        match self.socket.poll(zmq::PollEvents::POLLIN, timeout_ms) {
            Ok(n) => Ok(n != 0),
            Err(err) => Err(Error::ZmqError(self.name.clone(), err)),
        }
    }

    /// Subscribes a SUB socket to all the published messages from a PUB socket.
    ///
    /// Note that this needs to be called *after* the socket connection is
    /// established on both ends.
    pub fn subscribe(&self) -> Result<(), Error> {
        match self.socket.set_subscribe(b"") {
            Ok(_) => Ok(()),
            Err(err) => Err(Error::ZmqError(self.name.clone(), err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ephemeral_port_is_resolved() {
        let ctx = zmq::Context::new();
        let socket = Socket::new(
            &ctx,
            String::from("Heartbeat"),
            zmq::REP,
            String::from("tcp://127.0.0.1:*"),
        )
        .unwrap();
        assert_ne!(socket.port().unwrap(), 0);
    }

    #[test]
    fn test_unsupported_socket_type() {
        let ctx = zmq::Context::new();
        let result = Socket::new(
            &ctx,
            String::from("Pair"),
            zmq::PAIR,
            String::from("tcp://127.0.0.1:*"),
        );
        assert!(matches!(result, Err(Error::UnsupportedSocketType(_))));
    }
}
