/*
 * mod.rs
 *
 * Copyright (C) 2022 Posit Software, PBC. All rights reserved.
 *
 */

pub mod control;
pub mod heartbeat;
pub mod iopub;
#[allow(clippy::module_inception)]
pub mod socket;
