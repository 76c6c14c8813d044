/*
 * history_request.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;

use crate::wire::content::MessageContent;
use crate::wire::message_type::MessageType;

/// Represents a request from the frontend for past inputs. All fields are
/// optional since the kernel keeps no history to filter.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct HistoryRequest {
    /// Whether to include outputs
    pub output: bool,

    /// Whether to return raw input rather than transformed input
    pub raw: bool,

    /// One of "range", "tail" or "search"
    pub hist_access_type: Option<String>,

    pub session: Option<i64>,
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub n: Option<i64>,
    pub pattern: Option<String>,
    pub unique: Option<bool>,
}

impl MessageContent for HistoryRequest {
    fn message_type() -> MessageType {
        MessageType::HistoryRequest
    }
}
