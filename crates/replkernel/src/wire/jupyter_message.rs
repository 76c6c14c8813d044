/*
 * jupyter_message.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::Error;
use crate::session::Session;
use crate::wire::content::Content;
use crate::wire::header::JupyterHeader;
use crate::wire::message_type::MessageType;
use crate::wire::wire_message::SignedParts;
use crate::wire::wire_message::WireMessage;

/// Represents a Jupyter message
#[derive(Debug, Clone)]
pub struct Message {
    /// The ZeroMQ identities (for ROUTER sockets)
    pub zmq_identities: Vec<Vec<u8>>,

    /// Hex-encoded HMAC signature; empty until the message is signed
    pub signature: String,

    /// The header for this message
    pub header: JupyterHeader,

    /// The header of the message from which this message originated. Optional;
    /// not all messages have a parent.
    pub parent_header: Option<JupyterHeader>,

    /// Additional metadata
    pub metadata: Map<String, Value>,

    /// The body (payload) of the message
    pub content: Content,

    /// Binary buffers trailing the content
    pub buffers: Vec<Vec<u8>>,

    /// Exact bytes of the signed parts, captured when the message was read
    /// from the wire or signed for sending. Verification runs over these so
    /// that it matches what the peer signed.
    parts: Option<SignedParts>,
}

/// Represents status returned from kernel inside messages.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Error,
}

impl Message {
    /// Create a new message originated by the kernel. With a parent, the
    /// message joins the parent's session; otherwise it uses the kernel's own.
    pub fn create(
        content: impl Into<Content>,
        parent: Option<&JupyterHeader>,
        session: &Session,
    ) -> Message {
        let content = content.into();
        let header = match parent {
            Some(parent) => JupyterHeader::create_child(
                content.message_type(),
                parent,
                session.username.clone(),
            ),
            None => JupyterHeader::create(
                content.message_type(),
                session.session_id.clone(),
                session.username.clone(),
            ),
        };
        Message {
            zmq_identities: Vec::new(),
            signature: String::new(),
            header,
            parent_header: parent.cloned(),
            metadata: Map::new(),
            content,
            buffers: Vec::new(),
            parts: None,
        }
    }

    /// Create a reply to `request`, routed back to the same peer.
    pub fn create_reply(
        request: &Message,
        content: impl Into<Content>,
        session: &Session,
    ) -> Message {
        let mut reply = Self::create(content, Some(&request.header), session);
        reply.zmq_identities = request.zmq_identities.clone();
        reply
    }

    /// Parse a Jupyter message from the frames of a ZeroMQ message. The
    /// signature is not checked here; see `verify()`.
    pub fn from_frames(frames: Vec<Vec<u8>>) -> crate::Result<Message> {
        Message::try_from(WireMessage::from_frames(frames)?)
    }

    /// Serializes the message into ZeroMQ frames. A message that was signed
    /// (or read from the wire) is written with the exact bytes covered by its
    /// signature.
    pub fn to_frames(&self) -> crate::Result<Vec<Vec<u8>>> {
        Ok(self.to_wire()?.into_frames())
    }

    pub fn message_type(&self) -> MessageType {
        self.content.message_type()
    }

    /// Signs the message with the session key. Must be the last change made to
    /// the message before it is sent.
    pub fn sign(&mut self, session: &Session) -> crate::Result<()> {
        let parts = self.serialize_parts()?;
        self.signature = parts.sign(&session.hmac);
        self.parts = Some(parts);
        Ok(())
    }

    /// Checks the signature against the session key.
    pub fn verify(&self, session: &Session) -> crate::Result<()> {
        match &self.parts {
            Some(parts) => parts.verify(self.signature.as_bytes(), &session.hmac),
            None => self
                .serialize_parts()?
                .verify(self.signature.as_bytes(), &session.hmac),
        }
    }

    /// A short description of the message for logs, e.g. `status/busy`.
    pub fn describe(&self) -> String {
        match &self.content {
            Content::Status(status) => {
                let state = serde_json::to_value(status.execution_state).unwrap_or_default();
                format!("status/{}", state.as_str().unwrap_or("unknown"))
            },
            _ => self.header.msg_type.clone(),
        }
    }

    fn to_wire(&self) -> crate::Result<WireMessage> {
        let parts = match &self.parts {
            Some(parts) => parts.clone(),
            None => self.serialize_parts()?,
        };
        Ok(WireMessage {
            zmq_identities: self.zmq_identities.clone(),
            signature: self.signature.as_bytes().to_vec(),
            parts,
            buffers: self.buffers.clone(),
        })
    }

    fn serialize_parts(&self) -> crate::Result<SignedParts> {
        // The Jupyter protocol states that orphan messages should have an
        // empty dict as parent.
        let parent_header = match &self.parent_header {
            Some(parent) => to_vec(parent)?,
            None => to_vec(&Map::<String, Value>::new())?,
        };

        Ok(SignedParts {
            header: to_vec(&self.header)?,
            parent_header,
            metadata: to_vec(&self.metadata)?,
            content: to_vec(&self.content.to_value()?)?,
        })
    }
}

/// Conversion from the untyped wire form; used on messages we receive over
/// the wire to parse into the correct type.
impl TryFrom<WireMessage> for Message {
    type Error = crate::error::Error;

    fn try_from(msg: WireMessage) -> Result<Message, Error> {
        // Parse the message header
        let header_val = parse_buffer("header", &msg.parts.header)?;
        let header: JupyterHeader = match serde_json::from_value(header_val.clone()) {
            Ok(h) => h,
            Err(err) => return Err(Error::InvalidPart(String::from("header"), header_val, err)),
        };

        // The header parses even for unknown types, but the content cannot
        let kind = header.message_type()?;

        // If there is no meaningful content in the parent header buffer, we
        // have no parent message, which is OK per the wire protocol.
        let parent_header = match parse_object("parent header", &msg.parts.parent_header)? {
            None => None,
            Some(parent_val) => {
                let parent_val = Value::Object(parent_val);
                match serde_json::from_value(parent_val.clone()) {
                    Ok(h) => Some(h),
                    Err(err) => {
                        return Err(Error::InvalidPart(
                            String::from("parent header"),
                            parent_val,
                            err,
                        ))
                    },
                }
            },
        };

        let metadata = parse_object("metadata", &msg.parts.metadata)?.unwrap_or_default();
        let content = Content::parse(kind, parse_buffer("content", &msg.parts.content)?)?;

        Ok(Message {
            zmq_identities: msg.zmq_identities,
            signature: String::from_utf8_lossy(&msg.signature).to_string(),
            header,
            parent_header,
            metadata,
            content,
            buffers: msg.buffers,
            parts: Some(msg.parts),
        })
    }
}

fn to_vec<T: Serialize>(value: &T) -> crate::Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(Error::CannotSerialize)
}

/// Parse raw buffer data from a single part of a multipart ZeroMQ message
/// into a JSON value.
fn parse_buffer(desc: &str, buf: &[u8]) -> crate::Result<Value> {
    // Convert the raw byte sequence from the ZeroMQ message into UTF-8
    let str = match std::str::from_utf8(buf) {
        Ok(s) => s,
        Err(err) => return Err(Error::Utf8Error(String::from(desc), buf.to_vec(), err)),
    };

    // Parse the UTF-8 string as JSON
    match serde_json::from_str(str) {
        Ok(v) => Ok(v),
        Err(err) => Err(Error::JsonParseError(
            String::from(desc),
            String::from(str),
            err,
        )),
    }
}

/// Parse a part that must be a JSON object. Empty frames and empty objects
/// both yield `None`.
fn parse_object(desc: &str, buf: &[u8]) -> crate::Result<Option<Map<String, Value>>> {
    if buf.is_empty() {
        return Ok(None);
    }
    let value = parse_buffer(desc, buf)?;
    match serde_json::from_value::<Map<String, Value>>(value.clone()) {
        Ok(map) if map.is_empty() => Ok(None),
        Ok(map) => Ok(Some(map)),
        Err(err) => Err(Error::InvalidPart(String::from(desc), value, err)),
    }
}
