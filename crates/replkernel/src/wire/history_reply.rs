/*
 * history_reply.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::wire::content::MessageContent;
use crate::wire::jupyter_message::Status;
use crate::wire::message_type::MessageType;

/// Represents a reply to a history_request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HistoryReply {
    pub status: Status,

    /// `(session, line_number, input)` entries; always empty
    pub history: Vec<Value>,
}

impl Default for HistoryReply {
    fn default() -> Self {
        Self {
            status: Status::Ok,
            history: Vec::new(),
        }
    }
}

impl MessageContent for HistoryReply {
    fn message_type() -> MessageType {
        MessageType::HistoryReply
    }
}
