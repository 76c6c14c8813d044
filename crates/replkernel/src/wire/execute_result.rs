/*
 * execute_result.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;

use crate::wire::content::MessageContent;
use crate::wire::message_type::MessageType;

/// Represents the result of an execution, broadcast on IOPub
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExecuteResult {
    /// The data giving the result of the execution
    pub data: Value,

    /// A monotonically increasing execution counter
    pub execution_count: u32,

    /// Optional additional metadata
    pub metadata: Value,
}

impl ExecuteResult {
    /// A plain-text result.
    pub fn plain(execution_count: u32, text: String) -> Self {
        Self {
            data: json!({ "text/plain": text }),
            execution_count,
            metadata: json!({}),
        }
    }
}

impl MessageContent for ExecuteResult {
    fn message_type() -> MessageType {
        MessageType::ExecuteResult
    }
}
