/*
 * encoder.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use log::warn;

use crate::session::Session;
use crate::sync::BlockingQueue;
use crate::wire::jupyter_message::Message;

/// Fourth stage: signs replies with the session key.
pub struct Encoder {
    session: Session,
    input: BlockingQueue<Message>,
    output: BlockingQueue<Message>,
}

impl Encoder {
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
            let mut message = self.input.take();
            match message.sign(&self.session) {
                Ok(()) => self.output.add(message),
                Err(err) => warn!("Could not sign '{}' message: {err}", message.describe()),
            }
        }
    }
}
