/*
 * mod.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

pub mod content;
pub mod execute_reply;
pub mod execute_request;
pub mod execute_result;
pub mod header;
pub mod history_reply;
pub mod history_request;
pub mod is_complete_reply;
pub mod is_complete_request;
pub mod jupyter_message;
pub mod kernel_info_reply;
pub mod kernel_info_request;
pub mod language_info;
pub mod message_type;
pub mod shutdown_reply;
pub mod shutdown_request;
pub mod status;
pub mod wire_message;
