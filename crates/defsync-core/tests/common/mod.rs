//! Shared helpers for the diff integration suites.

#![allow(dead_code)]

use defsync_core::{generate_idempotent_ddls, Dialect};

/// Diffs two schema texts, panicking on error.
pub fn diff(dialect: Dialect, desired: &str, current: &str) -> Vec<String> {
    generate_idempotent_ddls(dialect, desired, current)
        .unwrap_or_else(|e| panic!("diff failed: {e}"))
}

/// Asserts the exact statement list a diff produces.
pub fn assert_ddls(dialect: Dialect, desired: &str, current: &str, expected: &[&str]) {
    assert_eq!(diff(dialect, desired, current), expected);
}

/// Asserts a schema diffed against itself yields nothing.
pub fn assert_converged(dialect: Dialect, schema: &str) {
    assert_eq!(diff(dialect, schema, schema), Vec::<String>::new());
}

/// The statement text as the engine re-emits it: trimmed, without the
/// trailing semicolon.
pub fn stmt(sql: &str) -> String {
    sql.trim().trim_end_matches(';').trim_end().to_string()
}
