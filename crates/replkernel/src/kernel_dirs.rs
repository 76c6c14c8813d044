/*
 * kernel_dirs.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

use std::env;
use std::path::PathBuf;

/// Returns the path where Jupyter kernels should be/are installed.
pub fn jupyter_kernel_path() -> Option<PathBuf> {
    jupyter_dir().map(|dir| dir.join("kernels"))
}

/// Returns the root Jupyter directory; uses the first entry of the
/// `JUPYTER_PATH` environment variable if set, XDG values if not.
fn jupyter_dir() -> Option<PathBuf> {
    if let Some(envpath) = env::var_os("JUPYTER_PATH") {
        if let Some(first) = env::split_paths(&envpath).find(|p| !p.as_os_str().is_empty()) {
            return Some(first);
        }
    }
    jupyter_xdg_dir()
}

// Returns the XDG root directory for Jupyter
#[cfg(not(target_os = "macos"))]
fn jupyter_xdg_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("jupyter"))
}

#[cfg(target_os = "macos")]
fn jupyter_xdg_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|dir| dir.join("Library").join("Jupyter"))
}
