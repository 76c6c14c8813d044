/*
 * message_type.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use strum_macros::AsRefStr;
use strum_macros::Display;
use strum_macros::EnumIter;
use strum_macros::EnumString;

/// The closed set of message types the kernel can parse or produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum MessageType {
    KernelInfoRequest,
    KernelInfoReply,
    ExecuteRequest,
    ExecuteReply,
    HistoryRequest,
    HistoryReply,
    IsCompleteRequest,
    IsCompleteReply,
    ShutdownRequest,
    ShutdownReply,
    Status,
    ExecuteResult,
}

impl MessageType {
    /// The reply the Shell channel sends for a request of this type, if it
    /// answers this type at all.
    pub fn reply_type(&self) -> Option<MessageType> {
        match self {
            MessageType::KernelInfoRequest => Some(MessageType::KernelInfoReply),
            MessageType::ExecuteRequest => Some(MessageType::ExecuteReply),
            MessageType::HistoryRequest => Some(MessageType::HistoryReply),
            MessageType::IsCompleteRequest => Some(MessageType::IsCompleteReply),
            _ => None,
        }
    }
}
