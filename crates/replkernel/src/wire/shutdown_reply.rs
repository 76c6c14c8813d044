/*
 * shutdown_reply.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;

use crate::wire::content::MessageContent;
use crate::wire::jupyter_message::Status;
use crate::wire::message_type::MessageType;

/// Represents reply from the kernel to a shutdown request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ShutdownReply {
    /// Error flag
    pub status: Status,

    /// False if final shutdown; true if shutdown precedes a restart
    pub restart: bool,
}

impl MessageContent for ShutdownReply {
    fn message_type() -> MessageType {
        MessageType::ShutdownReply
    }
}
