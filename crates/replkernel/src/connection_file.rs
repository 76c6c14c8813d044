/*
 * connection_file.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;

/// The only signature scheme the kernel knows how to produce
pub const SIGNATURE_SCHEME: &str = "hmac-sha256";

/// The contents of the Connection File as listed in the Jupyter specfication;
/// directly parsed from JSON.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConnectionFile {
    /// ZeroMQ ports; a port of 0 lets ZeroMQ pick a free one
    pub control_port: u16,
    pub shell_port: u16,
    pub stdin_port: u16,
    pub iopub_port: u16,
    pub hb_port: u16,

    /// The transport type to use for ZeroMQ; generally "tcp"
    pub transport: String,

    /// The signature scheme to use for messages; generally "hmac-sha256"
    pub signature_scheme: String,

    /// The IP address to bind to
    pub ip: String,

    /// The HMAC-256 signing key, or an empty string for an unauthenticated
    /// connection
    pub key: String,
}

impl ConnectionFile {
    /// Create a ConnectionFile by parsing the contents of a connection file.
    pub fn from_file<P: AsRef<Path>>(connection_file: P) -> crate::Result<ConnectionFile> {
        let path = connection_file.as_ref().to_string_lossy().to_string();
        let contents = match std::fs::read_to_string(connection_file.as_ref()) {
            Ok(contents) => contents,
            Err(err) => return Err(Error::CannotReadConnectionFile(path, err)),
        };
        Self::parse(&contents, path)
    }

    /// Create a ConnectionFile from raw JSON.
    pub fn from_json(raw: &str) -> crate::Result<ConnectionFile> {
        Self::parse(raw, String::from("<json>"))
    }

    fn parse(raw: &str, origin: String) -> crate::Result<ConnectionFile> {
        let connection: ConnectionFile = match serde_json::from_str(raw) {
            Ok(connection) => connection,
            Err(err) => return Err(Error::InvalidConnectionFile(origin, err)),
        };

        // An empty scheme goes with an empty key (no signing)
        let supported = match connection.signature_scheme.as_str() {
            "" => connection.key.is_empty(),
            scheme => scheme == SIGNATURE_SCHEME,
        };
        if !supported {
            return Err(Error::UnsupportedSignatureScheme(
                connection.signature_scheme,
            ));
        }

        Ok(connection)
    }

    /// Given a port, return a URI-like string that can be used to connect to
    /// the port, given the other parameters in the connection file.
    ///
    /// Example: `32` => `"tcp://127.0.0.1:32"`
    pub fn endpoint(&self, port: u16) -> String {
        if port == 0 {
            // Let ZeroMQ choose an ephemeral port for us
            return format!("{}://{}:*", self.transport, self.ip);
        }
        format!("{}://{}:{}", self.transport, self.ip, port)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const CONNECTION: &str = r#"{
        "transport": "tcp",
        "ip": "127.0.0.1",
        "shell_port": 5555,
        "iopub_port": 5556,
        "stdin_port": 5557,
        "control_port": 5558,
        "hb_port": 5559,
        "signature_scheme": "hmac-sha256",
        "key": "abc"
    }"#;

    #[test]
    fn test_from_json() {
        let connection = ConnectionFile::from_json(CONNECTION).unwrap();
        assert_eq!(connection.shell_port, 5555);
        assert_eq!(connection.key, "abc");
        assert_eq!(connection.endpoint(connection.shell_port), "tcp://127.0.0.1:5555");
        assert_eq!(connection.endpoint(0), "tcp://127.0.0.1:*");
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let raw = r#"{ "transport": "tcp", "ip": "127.0.0.1" }"#;
        assert_matches!(
            ConnectionFile::from_json(raw),
            Err(Error::InvalidConnectionFile(_, _))
        );
    }

    #[test]
    fn test_unknown_signature_scheme_is_rejected() {
        let raw = CONNECTION.replace("hmac-sha256", "hmac-md5");
        assert_matches!(
            ConnectionFile::from_json(&raw),
            Err(Error::UnsupportedSignatureScheme(scheme)) => {
                assert_eq!(scheme, "hmac-md5");
            }
        );
    }

    #[test]
    fn test_empty_scheme_requires_empty_key() {
        let raw = CONNECTION.replace("hmac-sha256", "");
        assert_matches!(
            ConnectionFile::from_json(&raw),
            Err(Error::UnsupportedSignatureScheme(scheme)) => {
                assert!(scheme.is_empty());
            }
        );

        let raw = raw.replace(r#""key": "abc""#, r#""key": """#);
        let connection = ConnectionFile::from_json(&raw).unwrap();
        assert!(connection.key.is_empty());
    }

    #[test]
    fn test_missing_file_is_rejected() {
        assert_matches!(
            ConnectionFile::from_file("/nonexistent/connection.json"),
            Err(Error::CannotReadConnectionFile(_, _))
        );
    }
}
