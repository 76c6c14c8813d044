/*
 * wire_message.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;

use crate::error::Error;

/// This delimiter separates the ZeroMQ socket identities (IDS) from the message
/// body payload (MSG).
pub const MSG_DELIM: &[u8] = b"<IDS|MSG>";

/// Number of frames after the delimiter: signature plus the four signed parts
const MIN_PARTS: usize = 5;

/// The four JSON parts of a message covered by the HMAC signature, as the
/// exact bytes that travel on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedParts {
    pub header: Vec<u8>,
    pub parent_header: Vec<u8>,
    pub metadata: Vec<u8>,
    pub content: Vec<u8>,
}

impl SignedParts {
    fn iter(&self) -> impl Iterator<Item = &Vec<u8>> {
        [&self.header, &self.parent_header, &self.metadata, &self.content].into_iter()
    }

    /// Computes the hex-encoded HMAC-SHA256 signature of the parts. Without a
    /// key the signature is empty.
    pub fn sign(&self, hmac_key: &Option<Hmac<Sha256>>) -> String {
        let Some(key) = hmac_key else {
            return String::new();
        };
        let mut sig = key.clone();
        for part in self.iter() {
            sig.update(part);
        }
        hex::encode(sig.finalize().into_bytes().as_slice())
    }

    /// Validates a hex-encoded signature against the parts. The comparison
    /// runs in constant time.
    pub fn verify(&self, signature: &[u8], hmac_key: &Option<Hmac<Sha256>>) -> crate::Result<()> {
        // It is acceptable (per Jupyter spec) to have an empty connection key,
        // which indicates that no HMAC signatures are to be validated.
        let Some(key) = hmac_key else {
            return Ok(());
        };

        // Decode the hexadecimal representation of the signature
        let decoded = match hex::decode(signature) {
            Ok(decoded_bytes) => decoded_bytes,
            Err(error) => return Err(Error::InvalidHmac(signature.to_vec(), error)),
        };

        // Compute the real signature according to our own key
        let mut hmac_validator = key.clone();
        for part in self.iter() {
            hmac_validator.update(part);
        }

        if let Err(err) = hmac_validator.verify_slice(&decoded) {
            return Err(Error::BadSignature(decoded, err));
        }

        Ok(())
    }
}

/// Represents an untyped Jupyter message exactly as framed on the wire.
/// Typically its header will be examined and it will be converted into a
/// typed `Message`.
#[derive(Debug, Clone, PartialEq)]
pub struct WireMessage {
    /// The ZeroMQ identities. These store the peer identity for messages
    /// delivered request-reply style over ROUTER sockets (like the shell)
    pub zmq_identities: Vec<Vec<u8>>,

    /// Hex-encoded HMAC signature
    pub signature: Vec<u8>,

    /// Header, parent header, metadata and content
    pub parts: SignedParts,

    /// Extra binary buffers following the content
    pub buffers: Vec<Vec<u8>>,
}

impl WireMessage {
    /// Splits the frames of a ZeroMQ multipart message into a WireMessage.
    pub fn from_frames(mut frames: Vec<Vec<u8>>) -> crate::Result<WireMessage> {
        // Find the position of the <IDS|MSG> delimiter in the message, which
        // separates the socket identities (IDS) from the body of the message
        // (MSG).
        let pos = match frames.iter().position(|buf| &buf[..] == MSG_DELIM) {
            Some(p) => p,
            None => return Err(Error::MissingDelimiter),
        };

        // Form a collection of the remaining parts, and remove the delimiter.
        let parts: Vec<_> = frames.drain(pos + 1..).collect();
        frames.pop();

        // We expect to have at least 5 parts left (the HMAC + 4 message frames)
        if parts.len() < MIN_PARTS {
            return Err(Error::InsufficientParts(parts.len(), MIN_PARTS));
        }

        let mut parts = parts.into_iter();
        let mut next = || parts.next().unwrap_or_default();
        let signature = next();
        let signed = SignedParts {
            header: next(),
            parent_header: next(),
            metadata: next(),
            content: next(),
        };

        Ok(Self {
            zmq_identities: frames,
            signature,
            parts: signed,
            buffers: parts.collect(),
        })
    }

    /// Lays the message out as ZeroMQ frames: identities, delimiter,
    /// signature, the four signed parts, then buffers.
    pub fn into_frames(self) -> Vec<Vec<u8>> {
        let mut frames = self.zmq_identities;
        frames.reserve(MIN_PARTS + 1 + self.buffers.len());
        frames.push(MSG_DELIM.to_vec());
        frames.push(self.signature);
        frames.push(self.parts.header);
        frames.push(self.parts.parent_header);
        frames.push(self.parts.metadata);
        frames.push(self.parts.content);
        frames.extend(self.buffers);
        frames
    }

    /// Checks the signature against the received parts.
    pub fn verify(&self, hmac_key: &Option<Hmac<Sha256>>) -> crate::Result<()> {
        self.parts.verify(&self.signature, hmac_key)
    }
}
