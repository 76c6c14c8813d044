/*
 * mod.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

//! The shell pipeline. Requests flow through five stages, each on its own
//! thread and connected by queues:
//!
//! `SocketIn` -> `Decoder` -> `Dispatcher` -> `Encoder` -> `SocketOut`
//!
//! Broadcasts produced by the dispatcher go to a separate IOPub queue.

pub mod decoder;
pub mod dispatcher;
pub mod encoder;
pub mod socket_in;
pub mod socket_out;

use std::sync::Arc;
use std::sync::Mutex;

use crate::pipeline::decoder::Decoder;
use crate::pipeline::dispatcher::Dispatcher;
use crate::pipeline::encoder::Encoder;
use crate::pipeline::socket_in::SocketIn;
use crate::pipeline::socket_out::SocketOut;
use crate::session::Session;
use crate::socket::socket::Socket;
use crate::sync::BlockingQueue;
use crate::sync::TaskFactory;
use crate::wire::jupyter_message::Message;

/// The shell socket, shared by the reading and writing stages
pub type SharedSocket = Arc<Mutex<Socket>>;

/// The queues between the stages.
#[derive(Clone, Default)]
pub struct Queues {
    /// Parsed, not yet verified
    pub decode: BlockingQueue<Message>,

    /// Verified requests
    pub dispatch: BlockingQueue<Message>,

    /// Unsigned replies
    pub encode: BlockingQueue<Message>,

    /// Signed replies
    pub write: BlockingQueue<Message>,
}

/// Starts the five stages on `tasks`. The dispatcher must have been built
/// with `queues.dispatch` as input and `queues.encode` as output.
pub fn start(
    tasks: &TaskFactory,
    socket: SharedSocket,
    session: &Session,
    queues: &Queues,
    dispatcher: Dispatcher,
) {
    let socket_in = SocketIn::new(socket.clone(), queues.decode.clone());
    tasks.start_new("socket-in", move || socket_in.run());

    let decoder = Decoder::new(
        session.clone(),
        queues.decode.clone(),
        queues.dispatch.clone(),
    );
    tasks.start_new("decoder", move || decoder.run());

    tasks.start_new("dispatcher", move || dispatcher.run());

    let encoder = Encoder::new(session.clone(), queues.encode.clone(), queues.write.clone());
    tasks.start_new("encoder", move || encoder.run());

    let socket_out = SocketOut::new(socket, queues.write.clone());
    tasks.start_new("socket-out", move || socket_out.run());
}
