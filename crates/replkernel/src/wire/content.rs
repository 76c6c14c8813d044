/*
 * content.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Error;
use crate::wire::execute_reply::ExecuteReply;
use crate::wire::execute_request::ExecuteRequest;
use crate::wire::execute_result::ExecuteResult;
use crate::wire::history_reply::HistoryReply;
use crate::wire::history_request::HistoryRequest;
use crate::wire::is_complete_reply::IsCompleteReply;
use crate::wire::is_complete_request::IsCompleteRequest;
use crate::wire::kernel_info_reply::KernelInfoReply;
use crate::wire::kernel_info_request::KernelInfoRequest;
use crate::wire::message_type::MessageType;
use crate::wire::shutdown_reply::ShutdownReply;
use crate::wire::shutdown_request::ShutdownRequest;
use crate::wire::status::KernelStatus;

/// Trait implemented by every message body, tying it to its wire type.
pub trait MessageContent: Serialize + DeserializeOwned + Clone {
    fn message_type() -> MessageType;
}

/// The body of a message; one variant per supported message type.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    KernelInfoRequest(KernelInfoRequest),
    KernelInfoReply(KernelInfoReply),
    ExecuteRequest(ExecuteRequest),
    ExecuteReply(ExecuteReply),
    HistoryRequest(HistoryRequest),
    HistoryReply(HistoryReply),
    IsCompleteRequest(IsCompleteRequest),
    IsCompleteReply(IsCompleteReply),
    ShutdownRequest(ShutdownRequest),
    ShutdownReply(ShutdownReply),
    Status(KernelStatus),
    ExecuteResult(ExecuteResult),
}

type ContentParser = fn(Value) -> Result<Content, serde_json::Error>;

/// The one place mapping a message type to the parser for its body.
fn parser(kind: MessageType) -> ContentParser {
    match kind {
        MessageType::KernelInfoRequest => parse_as::<KernelInfoRequest>,
        MessageType::KernelInfoReply => parse_as::<KernelInfoReply>,
        MessageType::ExecuteRequest => parse_as::<ExecuteRequest>,
        MessageType::ExecuteReply => parse_as::<ExecuteReply>,
        MessageType::HistoryRequest => parse_as::<HistoryRequest>,
        MessageType::HistoryReply => parse_as::<HistoryReply>,
        MessageType::IsCompleteRequest => parse_as::<IsCompleteRequest>,
        MessageType::IsCompleteReply => parse_as::<IsCompleteReply>,
        MessageType::ShutdownRequest => parse_as::<ShutdownRequest>,
        MessageType::ShutdownReply => parse_as::<ShutdownReply>,
        MessageType::Status => parse_as::<KernelStatus>,
        MessageType::ExecuteResult => parse_as::<ExecuteResult>,
    }
}

fn parse_as<T>(value: Value) -> Result<Content, serde_json::Error>
where
    T: MessageContent,
    Content: From<T>,
{
    serde_json::from_value::<T>(value).map(Content::from)
}

impl Content {
    /// Parses a message body of the given type.
    pub fn parse(kind: MessageType, value: Value) -> crate::Result<Content> {
        match parser(kind)(value.clone()) {
            Ok(content) => Ok(content),
            Err(err) => Err(Error::InvalidMessage(kind.to_string(), value, err)),
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Content::KernelInfoRequest(_) => KernelInfoRequest::message_type(),
            Content::KernelInfoReply(_) => KernelInfoReply::message_type(),
            Content::ExecuteRequest(_) => ExecuteRequest::message_type(),
            Content::ExecuteReply(_) => ExecuteReply::message_type(),
            Content::HistoryRequest(_) => HistoryRequest::message_type(),
            Content::HistoryReply(_) => HistoryReply::message_type(),
            Content::IsCompleteRequest(_) => IsCompleteRequest::message_type(),
            Content::IsCompleteReply(_) => IsCompleteReply::message_type(),
            Content::ShutdownRequest(_) => ShutdownRequest::message_type(),
            Content::ShutdownReply(_) => ShutdownReply::message_type(),
            Content::Status(_) => KernelStatus::message_type(),
            Content::ExecuteResult(_) => ExecuteResult::message_type(),
        }
    }

    pub fn to_value(&self) -> crate::Result<Value> {
        let value = match self {
            Content::KernelInfoRequest(content) => serde_json::to_value(content),
            Content::KernelInfoReply(content) => serde_json::to_value(content),
            Content::ExecuteRequest(content) => serde_json::to_value(content),
            Content::ExecuteReply(content) => serde_json::to_value(content),
            Content::HistoryRequest(content) => serde_json::to_value(content),
            Content::HistoryReply(content) => serde_json::to_value(content),
            Content::IsCompleteRequest(content) => serde_json::to_value(content),
            Content::IsCompleteReply(content) => serde_json::to_value(content),
            Content::ShutdownRequest(content) => serde_json::to_value(content),
            Content::ShutdownReply(content) => serde_json::to_value(content),
            Content::Status(content) => serde_json::to_value(content),
            Content::ExecuteResult(content) => serde_json::to_value(content),
        };
        value.map_err(Error::CannotSerialize)
    }
}

macro_rules! content_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Content {
                fn from(content: $ty) -> Self {
                    Content::$variant(content)
                }
            }
        )*
    };
}

content_from!(
    KernelInfoRequest(KernelInfoRequest),
    KernelInfoReply(KernelInfoReply),
    ExecuteRequest(ExecuteRequest),
    ExecuteReply(ExecuteReply),
    HistoryRequest(HistoryRequest),
    HistoryReply(HistoryReply),
    IsCompleteRequest(IsCompleteRequest),
    IsCompleteReply(IsCompleteReply),
    ShutdownRequest(ShutdownRequest),
    ShutdownReply(ShutdownReply),
    Status(KernelStatus),
    ExecuteResult(ExecuteResult),
);
