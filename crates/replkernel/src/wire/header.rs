/*
 * header.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use std::str::FromStr;

use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Error;
use crate::wire::message_type::MessageType;

/// The protocol version stamped on headers the kernel creates
pub const PROTOCOL_VERSION: &str = "5.0";

/// Represents the header of a Jupyter message
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JupyterHeader {
    /// The message identifier; must be unique per message
    pub msg_id: String,

    /// Session ID; must be unique per session
    pub session: String,

    /// Username; must be unique per user
    pub username: String,

    /// Date/time when message was created (ISO 8601)
    pub date: String,

    /// Message type, as it appears on the wire. Kept as a string so that
    /// headers of unknown messages can still be parsed and logged.
    pub msg_type: String,

    /// Message protocol version
    pub version: String,
}

impl JupyterHeader {
    /// Creates a new header with a fresh message ID and timestamp.
    pub fn create(msg_type: MessageType, session: String, username: String) -> Self {
        Self {
            msg_id: Uuid::new_v4().to_string(),
            session,
            username,
            date: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            msg_type: msg_type.to_string(),
            version: String::from(PROTOCOL_VERSION),
        }
    }

    /// Creates the header of a message answering (or caused by) `parent`.
    /// The session is inherited so the frontend can correlate the two.
    pub fn create_child(msg_type: MessageType, parent: &JupyterHeader, username: String) -> Self {
        Self::create(msg_type, parent.session.clone(), username)
    }

    /// Looks up the message type in the closed set the kernel understands.
    pub fn message_type(&self) -> crate::Result<MessageType> {
        MessageType::from_str(&self.msg_type)
            .map_err(|_| Error::UnknownMessageType(self.msg_type.clone()))
    }
}
