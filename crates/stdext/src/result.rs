//
// result.rs
//
// Copyright (C) 2023 Posit Software, PBC. All rights reserved.
//
//

pub trait ResultExt<T, E> {
    /// Calls the provided closure with the contained error (if [`Err`]).
    ///
    /// Consumes the Result, unlike `inspect_err()` which propagates it and
    /// still requires you to handle the Result in some way.
    fn on_err<F: FnOnce(E)>(self, f: F);
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn on_err<F: FnOnce(E)>(self, f: F) {
        if let Err(e) = self {
            f(e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_err_only_runs_for_errors() {
        let mut seen = Vec::new();
        Ok::<i32, String>(1).on_err(|e| seen.push(e));
        Err::<i32, String>(String::from("boom")).on_err(|e| seen.push(e));
        assert_eq!(seen, vec![String::from("boom")]);
    }
}
