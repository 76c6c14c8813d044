//
// lib.rs
//
// Copyright (C) 2022 Posit Software, PBC. All rights reserved.
//
//

pub mod result;
pub mod spawn;

pub use crate::result::ResultExt;
