//! Diff scenarios against the SQLite-like dialect.

mod common;

use common::{assert_converged, assert_ddls, stmt};
use defsync_core::Dialect;

const DIALECT: Dialect = Dialect::Sqlite;

#[test]
fn create_and_drop_table() {
    let users = "CREATE TABLE users (
  id integer NOT NULL PRIMARY KEY,
  name text,
  age integer
);";
    assert_ddls(DIALECT, users, "", &[&stmt(users)]);
    assert_converged(DIALECT, users);
    assert_ddls(DIALECT, "", users, &["DROP TABLE `users`"]);
}

#[test]
fn added_column_has_no_positional_clause() {
    let current = "CREATE TABLE users (
  id integer NOT NULL PRIMARY KEY
);";
    let desired = "CREATE TABLE users (
  id integer NOT NULL PRIMARY KEY,
  name text
);";
    assert_ddls(
        DIALECT,
        desired,
        current,
        &["ALTER TABLE `users` ADD COLUMN `name` text"],
    );
}

#[test]
fn changed_view_is_dropped_and_recreated() {
    let table = "CREATE TABLE users (
  id integer NOT NULL,
  age integer
);";
    let current = format!("{table}\nCREATE VIEW adults AS SELECT id FROM users WHERE age >= 18;");
    let desired = format!("{table}\nCREATE VIEW adults AS SELECT id FROM users WHERE age >= 21;");
    assert_ddls(
        DIALECT,
        &desired,
        &current,
        &[
            "DROP VIEW `adults`",
            "CREATE VIEW `adults` AS SELECT id FROM users WHERE age >= 21",
        ],
    );
}

#[test]
fn obsoleted_view_is_dropped_after_its_table() {
    let current = "CREATE TABLE users (
  id integer NOT NULL
);
CREATE VIEW v_users AS SELECT id FROM users;";
    assert_ddls(DIALECT, "", current, &["DROP TABLE `users`", "DROP VIEW `v_users`"]);
}

#[test]
fn column_changes_are_left_alone() {
    // SQLite has no general ALTER COLUMN; the engine emits nothing for
    // in-place column changes.
    let current = "CREATE TABLE users (
  name varchar(40)
);";
    let desired = "CREATE TABLE users (
  name varchar(255)
);";
    assert_ddls(DIALECT, desired, current, &[]);
}
