/*
 * execute_request.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::wire::content::MessageContent;
use crate::wire::message_type::MessageType;

/// Represents a request from the frontend to execute code
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExecuteRequest {
    /// The code to be executed
    pub code: String,

    /// Whether the code should be executed silently (not shown to the user)
    #[serde(default)]
    pub silent: bool,

    /// Whether the code should be stored in history
    #[serde(default)]
    pub store_history: bool,

    /// Mapping of user expressions to be evaluated after code is executed.
    #[serde(default)]
    pub user_expressions: Value,

    /// Whether to allow the kernel to send stdin requests
    #[serde(default)]
    pub allow_stdin: bool,

    /// Whether the kernel should discard the execution queue if evaluating the
    /// code results in an error
    #[serde(default)]
    pub stop_on_error: bool,
}

impl MessageContent for ExecuteRequest {
    fn message_type() -> MessageType {
        MessageType::ExecuteRequest
    }
}
