/*
 * shutdown_request.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;

use crate::wire::content::MessageContent;
use crate::wire::message_type::MessageType;

/// Represents a request from the frontend to shut the kernel down.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ShutdownRequest {
    /// False if final shutdown; true if shutdown precedes a restart
    #[serde(default)]
    pub restart: bool,
}

impl MessageContent for ShutdownRequest {
    fn message_type() -> MessageType {
        MessageType::ShutdownRequest
    }
}
