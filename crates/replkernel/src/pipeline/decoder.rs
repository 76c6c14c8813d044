/*
 * decoder.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use log::warn;

use crate::session::Session;
use crate::sync::BlockingQueue;
use crate::wire::jupyter_message::Message;

/// Second stage: lets through only messages signed with the session key.
pub struct Decoder {
    session: Session,
    input: BlockingQueue<Message>,
    output: BlockingQueue<Message>,
}

impl Decoder {
    pub fn new(
        session: Session,
        input: BlockingQueue<Message>,
        output: BlockingQueue<Message>,
    ) -> Self {
        Self {
            session,
            input,
            output,
        }
    }

    pub fn run(&self) {
        loop {
            let message = self.input.take();
            if let Some(message) = self.decode(message) {
                self.output.add(message);
            }
        }
    }

    /// Returns the message if its signature checks out.
    pub fn decode(&self, message: Message) -> Option<Message> {
        match message.verify(&self.session) {
            Ok(()) => Some(message),
            Err(err) => {
                warn!(
                    "Dropping '{}' message {}: {err}",
                    message.header.msg_type, message.header.msg_id
                );
                None
            },
        }
    }
}
