/*
 * error.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use std::fmt;

/// Type representing all errors that can occur inside the kernel.
#[derive(Debug)]
pub enum Error {
    MissingDelimiter,
    InsufficientParts(usize, usize),
    InvalidHmac(Vec<u8>, hex::FromHexError),
    BadSignature(Vec<u8>, hmac::digest::MacError),
    Utf8Error(String, Vec<u8>, std::str::Utf8Error),
    JsonParseError(String, String, serde_json::Error),
    InvalidPart(String, serde_json::Value, serde_json::Error),
    InvalidMessage(String, serde_json::Value, serde_json::Error),
    UnknownMessageType(String),
    CannotSerialize(serde_json::Error),
    CreateSocketFailed(String, zmq::Error),
    SocketBindError(String, String, zmq::Error),
    SocketConnectError(String, String, zmq::Error),
    UnsupportedSocketType(zmq::SocketType),
    ZmqError(String, zmq::Error),
    HmacKeyInvalid(String, hmac::digest::InvalidLength),
    UnsupportedSignatureScheme(String),
    CannotReadConnectionFile(String, std::io::Error),
    InvalidConnectionFile(String, serde_json::Error),
    InvalidPromptPattern(String, regex::Error),
    ReplSpawnFailed(String, std::io::Error),
    ReplPtyError(nix::Error),
    ReplIoError(std::io::Error),
    ReplProcessTerminated(String),
    Timeout(std::time::Duration),
    Anyhow(anyhow::Error),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingDelimiter => {
                write!(
                    f,
                    "ZeroMQ message did not include expected <IDS|MSG> delimiter"
                )
            },
            Error::InsufficientParts(found, expected) => {
                write!(
                    f,
                    "ZeroMQ message did not contain sufficient parts (found {}, expected {})",
                    found, expected
                )
            },
            Error::InvalidHmac(data, err) => {
                write!(
                    f,
                    "ZeroMQ message HMAC signature {:?} is not a valid hexadecimal value: {}",
                    data, err
                )
            },
            Error::BadSignature(sig, err) => {
                write!(
                    f,
                    "ZeroMQ message HMAC signature {:?} is incorrect: {}",
                    sig, err
                )
            },
            Error::Utf8Error(part, data, err) => {
                write!(
                    f,
                    "Message part '{}' was not valid UTF-8: {} (raw: {:?})",
                    part, err, data
                )
            },
            Error::JsonParseError(part, str, err) => {
                write!(
                    f,
                    "Message part '{}' is invalid JSON: {} (raw: {})",
                    part, err, str
                )
            },
            Error::InvalidPart(part, json, err) => {
                write!(
                    f,
                    "Message part '{}' does not match schema: {} (raw: {})",
                    part, err, json
                )
            },
            Error::InvalidMessage(kind, json, err) => {
                write!(f, "Invalid '{}' message: {} (raw: {})", kind, err, json)
            },
            Error::UnknownMessageType(kind) => {
                write!(f, "Unknown message type '{}'", kind)
            },
            Error::CannotSerialize(err) => {
                write!(f, "Cannot serialize message: {}", err)
            },
            Error::CreateSocketFailed(name, err) => {
                write!(f, "Could not create ZeroMQ socket '{}': {}", name, err)
            },
            Error::SocketBindError(name, endpoint, err) => {
                write!(
                    f,
                    "Could not bind to ZeroMQ socket '{}' at '{}': {}",
                    name, endpoint, err
                )
            },
            Error::SocketConnectError(name, endpoint, err) => {
                write!(
                    f,
                    "Could not connect to ZeroMQ socket '{}' at '{}': {}",
                    name, endpoint, err
                )
            },
            Error::UnsupportedSocketType(kind) => {
                write!(f, "Unsupported ZeroMQ socket type: {:?}", kind)
            },
            Error::ZmqError(name, err) => {
                write!(f, "ZeroMQ protocol error on {} socket: {}", name, err)
            },
            Error::HmacKeyInvalid(str, err) => {
                write!(
                    f,
                    "The HMAC supplied signing key '{}' ({} bytes) cannot be used: {}",
                    str,
                    str.len(),
                    err
                )
            },
            Error::UnsupportedSignatureScheme(scheme) => {
                write!(
                    f,
                    "Unsupported signature scheme '{}' (only 'hmac-sha256' is supported)",
                    scheme
                )
            },
            Error::CannotReadConnectionFile(path, err) => {
                write!(f, "Could not read connection file '{}': {}", path, err)
            },
            Error::InvalidConnectionFile(path, err) => {
                write!(f, "Connection file '{}' is invalid: {}", path, err)
            },
            Error::InvalidPromptPattern(pattern, err) => {
                write!(f, "Prompt pattern '{}' is not a valid regex: {}", pattern, err)
            },
            Error::ReplSpawnFailed(command, err) => {
                write!(f, "Could not start REPL process '{}': {}", command, err)
            },
            Error::ReplPtyError(err) => {
                write!(f, "Could not set up pseudo-terminal for REPL: {}", err)
            },
            Error::ReplIoError(err) => {
                write!(f, "Could not communicate with REPL process: {}", err)
            },
            Error::ReplProcessTerminated(status) => {
                write!(f, "REPL process terminated ({})", status)
            },
            Error::Timeout(duration) => {
                write!(f, "Timed out after {:?}", duration)
            },
            Error::Anyhow(err) => {
                write!(f, "{err:?}")
            },
        }
    }
}

impl Error {
    /// Whether the error means the socket (or its context) is gone for good,
    /// as opposed to a failure affecting a single message.
    pub fn is_socket_closed(&self) -> bool {
        matches!(
            self,
            Error::ZmqError(_, zmq::Error::ETERM) | Error::ZmqError(_, zmq::Error::ENOTSOCK)
        )
    }
}

impl From<anyhow::Error> for Error {
    fn from(error: anyhow::Error) -> Self {
        Self::Anyhow(error)
    }
}

#[macro_export]
macro_rules! anyhow {
    ($($rest: expr),*) => {{
        let message = anyhow::anyhow!($($rest, )*);
        $crate::error::Error::Anyhow(message)
    }}
}
