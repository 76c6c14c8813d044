/*
 * lib.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

pub mod connection_file;
pub mod error;
pub mod kernel;
pub mod kernel_dirs;
pub mod kernel_spec;
pub mod pipeline;
pub mod repl;
pub mod session;
pub mod socket;
pub mod sync;
pub mod wire;

pub use error::Error;
pub type Result<T> = std::result::Result<T, error::Error>;
