/*
 * kernel_info_reply.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;

use crate::wire::content::MessageContent;
use crate::wire::header::PROTOCOL_VERSION;
use crate::wire::jupyter_message::Status;
use crate::wire::language_info::LanguageInfo;
use crate::wire::message_type::MessageType;

/// Name reported as the kernel implementation
pub const IMPLEMENTATION: &str = "replkernel";

/// Represents a reply to a kernel_info_request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct KernelInfoReply {
    /// The execution status ("ok" or "error")
    pub status: Status,

    /// Version of messaging protocol
    pub protocol_version: String,

    /// The kernel implementation name
    pub implementation: String,

    /// The kernel implementation version
    pub implementation_version: String,

    /// Information about the language the kernel supports
    pub language_info: LanguageInfo,

    /// A startup banner
    pub banner: String,

    /// A list of help links
    pub help_links: Vec<HelpLink>,
}

/// A link to documentation shown in the frontend's help menu
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HelpLink {
    pub text: String,
    pub url: String,
}

impl KernelInfoReply {
    /// Describes this kernel driving a REPL for the given language.
    pub fn new(language_info: LanguageInfo, banner: String) -> Self {
        Self {
            status: Status::Ok,
            protocol_version: String::from(PROTOCOL_VERSION),
            implementation: String::from(IMPLEMENTATION),
            implementation_version: String::from(env!("CARGO_PKG_VERSION")),
            language_info,
            banner,
            help_links: Vec::new(),
        }
    }
}

impl MessageContent for KernelInfoReply {
    fn message_type() -> MessageType {
        MessageType::KernelInfoReply
    }
}
