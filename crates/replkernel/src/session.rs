/*
 * session.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;
use uuid::Uuid;

use crate::error::Error;

/// Kernel-side session information: the HMAC signing key shared with the
/// frontend and the identity the kernel stamps on messages it originates.
#[derive(Clone)]
pub struct Session {
    /// Signing key as an HMAC, or None if message signing is disabled
    pub hmac: Option<Hmac<Sha256>>,

    /// The username to use for messages created by the kernel
    pub username: String,

    /// The session ID used for messages not tied to a client request
    pub session_id: String,
}

impl Session {
    /// Create a new Session from a signing key.
    ///
    /// Per the Jupyter protocol an empty key disables signing altogether.
    pub fn create(key: &str) -> crate::Result<Self> {
        let hmac_key = match key.len() {
            0 => None,
            _ => {
                let result = match Hmac::<Sha256>::new_from_slice(key.as_bytes()) {
                    Ok(hmac) => hmac,
                    Err(err) => return Err(Error::HmacKeyInvalid(String::from(key), err)),
                };
                Some(result)
            },
        };
        Ok(Self {
            hmac: hmac_key,
            session_id: Uuid::new_v4().to_string(),
            username: String::from("kernel"),
        })
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the key
        f.debug_struct("Session")
            .field("signed", &self.hmac.is_some())
            .field("username", &self.username)
            .field("session_id", &self.session_id)
            .finish()
    }
}
