/*
 * is_complete_request.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;

use crate::wire::content::MessageContent;
use crate::wire::message_type::MessageType;

/// Represents a request from the frontend to test a code fragment to for
/// completeness.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IsCompleteRequest {
    pub code: String,
}

impl MessageContent for IsCompleteRequest {
    fn message_type() -> MessageType {
        MessageType::IsCompleteRequest
    }
}
