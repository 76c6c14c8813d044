/*
 * kernel_info_request.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;

use crate::wire::content::MessageContent;
use crate::wire::message_type::MessageType;

/// Represents a request from the frontend to describe the kernel
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct KernelInfoRequest {}

impl MessageContent for KernelInfoRequest {
    fn message_type() -> MessageType {
        MessageType::KernelInfoRequest
    }
}
