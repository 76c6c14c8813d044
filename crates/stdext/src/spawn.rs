//
// spawn.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

/// Spawns a named OS thread and returns its `JoinHandle`.
///
/// Thread names show up in panic messages and debuggers, so every long-lived
/// worker should go through this macro rather than `std::thread::spawn()`.
#[macro_export]
macro_rules! spawn {
    ($name:expr, $body:expr) => {{
        let name: String = $name.into();
        std::thread::Builder::new()
            .name(name.clone())
            .spawn($body)
            .unwrap_or_else(|err| panic!("Can't spawn thread '{name}': {err:?}"))
    }};
}
