/*
 * is_complete_reply.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;

use crate::wire::content::MessageContent;
use crate::wire::message_type::MessageType;

/// Possible answers to an is_complete_request
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum IsComplete {
    Complete,
    Incomplete,
    Invalid,
    Unknown,
}

/// Represents a reply to an is_complete_request.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IsCompleteReply {
    pub status: IsComplete,

    /// Characters to indent the next line with, when `status` is "incomplete"
    pub indent: Option<String>,
}

impl MessageContent for IsCompleteReply {
    fn message_type() -> MessageType {
        MessageType::IsCompleteReply
    }
}
