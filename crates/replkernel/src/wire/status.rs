/*
 * status.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;

use crate::wire::content::MessageContent;
use crate::wire::message_type::MessageType;

/// Represents a message the frontend sends to all clients to indicate the
/// kernel's execution status.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct KernelStatus {
    pub execution_state: ExecutionState,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionState {
    /// The kernel is starting up (sent only once)
    Starting,

    /// The kernel is processing a request
    Busy,

    /// The kernel is waiting for work
    Idle,

    /// The kernel's interpreter has gone away
    Dead,
}

impl MessageContent for KernelStatus {
    fn message_type() -> MessageType {
        MessageType::Status
    }
}
