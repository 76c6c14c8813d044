/*
 * execute_reply.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::wire::content::MessageContent;
use crate::wire::jupyter_message::Status;
use crate::wire::message_type::MessageType;

/// Represents a reply from an execute_request message
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExecuteReply {
    /// The status of the request
    pub status: Status,

    /// Monotonically increasing execution counter
    pub execution_count: u32,

    /// Results for user expressions
    pub user_expressions: Value,

    /// The name of the error, when `status` is "error"
    pub ename: Option<String>,

    /// The error message, when `status` is "error"
    pub evalue: Option<String>,

    /// The traceback frames, when `status` is "error"
    pub traceback: Option<Vec<String>>,
}

impl ExecuteReply {
    pub fn ok(execution_count: u32) -> Self {
        Self {
            status: Status::Ok,
            execution_count,
            user_expressions: Value::Object(serde_json::Map::new()),
            ename: None,
            evalue: None,
            traceback: None,
        }
    }

    pub fn error(execution_count: u32, ename: String, evalue: String) -> Self {
        Self {
            status: Status::Error,
            execution_count,
            user_expressions: Value::Object(serde_json::Map::new()),
            traceback: Some(vec![evalue.clone()]),
            ename: Some(ename),
            evalue: Some(evalue),
        }
    }
}

impl MessageContent for ExecuteReply {
    fn message_type() -> MessageType {
        MessageType::ExecuteReply
    }
}
