/*
 * kernel_spec.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use std::error;
use std::fmt;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use log::trace;
use serde::Deserialize;
use serde::Serialize;

use crate::kernel_dirs;

/// From the Jupyter documentation for [Kernel Specs](https://jupyter-client.readthedocs.io/en/stable/kernels.html#kernel-specs).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KernelSpec {
    /// List of command line arguments to be used to start the kernel
    pub argv: Vec<String>,

    // The kernel name as it should be displayed in the UI
    pub display_name: String,

    // The kernel's language
    pub language: String,

    // Environment variables to set for the kernel
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub env: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug)]
pub enum InstallError {
    NoInstallDir,
    CreateDirFailed(std::io::Error),
    JsonSerializeFailed(serde_json::Error),
    CreateSpecFailed(std::io::Error),
    WriteSpecFailed(std::io::Error),
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InstallError::NoInstallDir => {
                write!(f, "No Jupyter installation directory found.")
            },
            InstallError::CreateDirFailed(err) => {
                write!(f, "Could not create directory: {err}")
            },
            InstallError::JsonSerializeFailed(err) => {
                write!(f, "Could not serialize kernel spec to JSON: {err}")
            },
            InstallError::CreateSpecFailed(err) => {
                write!(f, "Could not create kernel spec file: {err}")
            },
            InstallError::WriteSpecFailed(err) => {
                write!(f, "Could not write kernel spec file: {err}")
            },
        }
    }
}

impl error::Error for InstallError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            InstallError::NoInstallDir => None,
            InstallError::CreateDirFailed(e) => Some(e),
            InstallError::JsonSerializeFailed(e) => Some(e),
            InstallError::WriteSpecFailed(e) => Some(e),
            InstallError::CreateSpecFailed(e) => Some(e),
        }
    }
}

impl KernelSpec {
    /// Spec for a kernel started as `<exe> --connection_file {connection_file}`.
    pub fn for_executable(exe: &Path, display_name: &str, language: &str) -> Self {
        Self {
            argv: vec![
                exe.to_string_lossy().to_string(),
                String::from("--connection_file"),
                String::from("{connection_file}"),
            ],
            display_name: String::from(display_name),
            language: String::from(language),
            env: serde_json::Map::new(),
        }
    }

    /// Installs into `<jupyter dir>/kernels/<folder>` and returns the path of
    /// the written `kernel.json`.
    pub fn install(&self, folder: &str) -> Result<PathBuf, InstallError> {
        match kernel_dirs::jupyter_kernel_path() {
            Some(kernel_dir) => self.install_to(kernel_dir.join(folder)),
            None => Err(InstallError::NoInstallDir),
        }
    }

    pub fn install_to(&self, path: PathBuf) -> Result<PathBuf, InstallError> {
        // Ensure that the parent folder exists, and form a path to file we'll write
        if let Err(err) = fs::create_dir_all(&path) {
            return Err(InstallError::CreateDirFailed(err));
        }
        let dest = path.join("kernel.json");

        let contents = match serde_json::to_string_pretty(self) {
            Ok(contents) => contents,
            Err(err) => return Err(InstallError::JsonSerializeFailed(err)),
        };

        trace!("Installing kernelspec JSON to {dest:?}: {contents}");
        let mut file = match File::create(&dest) {
            Ok(file) => file,
            Err(err) => return Err(InstallError::CreateSpecFailed(err)),
        };
        if let Err(err) = file.write_all(contents.as_bytes()) {
            return Err(InstallError::WriteSpecFailed(err));
        }
        Ok(dest)
    }
}
