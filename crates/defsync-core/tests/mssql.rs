//! Diff scenarios against the MSSQL-like dialect.

mod common;

use common::{assert_converged, assert_ddls, diff, stmt};
use defsync_core::{generate_idempotent_ddls, Dialect, DiffError};

const DIALECT: Dialect = Dialect::Mssql;

// =============================================================================
// CREATE TABLE
// =============================================================================

#[test]
fn column_literals_round_trip() {
    let create_table = "CREATE TABLE v (
  v_integer integer NOT NULL,
  v_text text,
  v_smallmoney smallmoney,
  v_money money,
  v_datetimeoffset datetimeoffset(1),
  v_datetime2 datetime2,
  v_smalldatetime smalldatetime,
  v_nchar nchar(30),
  v_nvarchar nvarchar(30),
  v_ntext ntext
);";

    assert_ddls(DIALECT, create_table, "", &[&stmt(create_table)]);
    assert_converged(DIALECT, create_table);
}

#[test]
fn obsoleted_table_is_dropped() {
    let users = "CREATE TABLE users (
  id bigint NOT NULL,
  name text,
  age integer
);";
    let bigdata = "CREATE TABLE bigdata (
  data bigint
);";
    let both = format!("{users}\n{bigdata}");

    assert_ddls(DIALECT, &both, "", &[&stmt(users), &stmt(bigdata)]);
    assert_ddls(DIALECT, users, &both, &["DROP TABLE [dbo].[bigdata]"]);
}

#[test]
fn identity_round_trip() {
    let create_table = "CREATE TABLE users (
  id integer PRIMARY KEY IDENTITY(1,1),
  name text,
  age integer
);";
    assert_ddls(DIALECT, create_table, "", &[&stmt(create_table)]);
    assert_converged(DIALECT, create_table);
}

// =============================================================================
// Columns
// =============================================================================

#[test]
fn added_column_uses_bare_add() {
    let current = "CREATE TABLE users (
  id BIGINT NOT NULL PRIMARY KEY
);";
    let desired = "CREATE TABLE users (
  id BIGINT NOT NULL PRIMARY KEY,
  name varchar(40)
);";
    assert_ddls(
        DIALECT,
        desired,
        current,
        &["ALTER TABLE [dbo].[users] ADD [name] varchar(40)"],
    );
}

#[test]
fn dropped_column_sheds_its_default_constraint_first() {
    let current = "CREATE TABLE users (
  id bigint NOT NULL,
  deprecated integer CONSTRAINT df_users_deprecated DEFAULT 0
);";
    let desired = "CREATE TABLE users (
  id bigint NOT NULL
);";
    assert_ddls(
        DIALECT,
        desired,
        current,
        &[
            "ALTER TABLE [dbo].[users] DROP CONSTRAINT [df_users_deprecated]",
            "ALTER TABLE [dbo].[users] DROP COLUMN [deprecated]",
        ],
    );
}

#[test]
fn check_constraint_change_drops_and_adds() {
    let current = "CREATE TABLE users (
  age integer CONSTRAINT chk_users_age CHECK (age > 0)
);";
    let desired = "CREATE TABLE users (
  age integer CHECK (age >= 0)
);";
    assert_ddls(
        DIALECT,
        desired,
        current,
        &[
            "ALTER TABLE [dbo].[users] DROP CONSTRAINT chk_users_age",
            "ALTER TABLE [dbo].[users] ADD CONSTRAINT users_age_check CHECK (age >= 0)",
        ],
    );
}

// =============================================================================
// Primary keys
// =============================================================================

#[test]
fn dropped_primary_key_column_drops_the_constraint_first() {
    let current = "CREATE TABLE users (
  id integer,
  name text,
  CONSTRAINT PK_users PRIMARY KEY CLUSTERED (id)
);";
    let desired = "CREATE TABLE users (
  name text
);";
    assert_ddls(
        DIALECT,
        desired,
        current,
        &[
            "ALTER TABLE [dbo].[users] DROP CONSTRAINT [PK_users]",
            "ALTER TABLE [dbo].[users] DROP COLUMN [id]",
        ],
    );
}

#[test]
fn renamed_primary_key_column_is_unsupported() {
    let current = "CREATE TABLE users (
  id integer,
  CONSTRAINT PK_users PRIMARY KEY CLUSTERED (id)
);";
    let desired = "CREATE TABLE users (
  user_id integer PRIMARY KEY
);";
    let err = generate_idempotent_ddls(DIALECT, desired, current).unwrap_err();
    assert!(matches!(
        err,
        DiffError::UnsupportedPrimaryKeyRename { .. }
    ));
}

// =============================================================================
// Foreign keys
// =============================================================================

#[test]
fn changed_referential_actions_swap_the_constraint() {
    let current = "CREATE TABLE users (
  id bigint NOT NULL PRIMARY KEY
);
CREATE TABLE posts (
  id bigint NOT NULL,
  user_id bigint,
  CONSTRAINT posts_ibfk_1 FOREIGN KEY (user_id) REFERENCES users (id)
);";
    let desired = "CREATE TABLE users (
  id bigint NOT NULL PRIMARY KEY
);
CREATE TABLE posts (
  id bigint NOT NULL,
  user_id bigint,
  CONSTRAINT posts_ibfk_1 FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE SET NULL ON UPDATE CASCADE
);";
    assert_ddls(
        DIALECT,
        desired,
        current,
        &[
            "ALTER TABLE [dbo].[posts] DROP CONSTRAINT [posts_ibfk_1]",
            "ALTER TABLE [dbo].[posts] ADD CONSTRAINT [posts_ibfk_1] FOREIGN KEY ([user_id]) \
             REFERENCES [users] ([id]) ON DELETE SET NULL ON UPDATE CASCADE",
        ],
    );
    assert_converged(DIALECT, desired);
}

#[test]
fn unspecified_actions_compare_as_no_action() {
    let current = "CREATE TABLE users (id bigint NOT NULL PRIMARY KEY);
CREATE TABLE posts (
  user_id bigint,
  CONSTRAINT posts_ibfk_1 FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE NO ACTION ON UPDATE NO ACTION
);";
    let desired = "CREATE TABLE users (id bigint NOT NULL PRIMARY KEY);
CREATE TABLE posts (
  user_id bigint,
  CONSTRAINT posts_ibfk_1 FOREIGN KEY (user_id) REFERENCES users (id)
);";
    assert_ddls(DIALECT, desired, current, &[]);
}

// =============================================================================
// Indexes
// =============================================================================

#[test]
fn index_option_change_recreates_the_index() {
    let table = "CREATE TABLE users (
  id bigint NOT NULL,
  age integer
);";
    let current_index = "CREATE UNIQUE CLUSTERED INDEX ix_users_age ON users (age) WITH (PAD_INDEX = ON);";
    let desired_index = "CREATE UNIQUE CLUSTERED INDEX ix_users_age ON users (age) WITH (PAD_INDEX = ON, FILLFACTOR = 10);";

    let current = format!("{table}\n{current_index}");
    let desired = format!("{table}\n{desired_index}");
    assert_ddls(
        DIALECT,
        &desired,
        &current,
        &[
            "DROP INDEX [ix_users_age] ON [dbo].[users]",
            &stmt(desired_index),
        ],
    );
    assert_converged(DIALECT, &desired);
}

#[test]
fn duplicate_index_in_desired_is_an_error() {
    let desired = "CREATE TABLE users (
  id bigint NOT NULL,
  age integer
);
CREATE INDEX ix_age ON users (age);
CREATE INDEX ix_age ON users (age);";
    let err = generate_idempotent_ddls(DIALECT, desired, "").unwrap_err();
    match err {
        DiffError::DuplicateIndex { index, table, statement } => {
            assert_eq!(index, "ix_age");
            assert_eq!(table, "users");
            assert_eq!(statement, "CREATE INDEX ix_age ON users (age)");
        }
        other => panic!("expected DuplicateIndex, got {other:?}"),
    }
}

// =============================================================================
// Views
// =============================================================================

#[test]
fn dropped_table_precedes_its_dropped_view() {
    let current = "CREATE TABLE [dbo].[users] (
  id integer NOT NULL,
  name text,
  age integer
);
CREATE VIEW [dbo].[view_users] AS select id from dbo.users where age = 1;";
    assert_ddls(
        DIALECT,
        "",
        current,
        &["DROP TABLE [dbo].[users]", "DROP VIEW [dbo].[view_users]"],
    );
}

#[test]
fn changed_view_is_dropped_and_recreated() {
    let table = "CREATE TABLE [dbo].[users] (
  id integer NOT NULL,
  age integer
);";
    let current = format!(
        "{table}\nCREATE VIEW [dbo].[view_users] AS select id from dbo.users where age = 1;"
    );
    let desired = format!(
        "{table}\nCREATE VIEW [dbo].[view_users] AS select id from dbo.users where age = 2;"
    );
    assert_ddls(
        DIALECT,
        &desired,
        &current,
        &[
            "DROP VIEW [dbo].[view_users]",
            "CREATE VIEW [dbo].[view_users] AS select id from dbo.users where age = 2",
        ],
    );
}

#[test]
fn view_definition_comparison_is_case_insensitive() {
    let table = "CREATE TABLE users (id integer);";
    let current = format!("{table}\nCREATE VIEW v AS SELECT id FROM dbo.users;");
    let desired = format!("{table}\nCREATE VIEW v AS select id from dbo.users;");
    assert_ddls(DIALECT, &desired, &current, &[]);
}

// =============================================================================
// Whole-schema convergence
// =============================================================================

#[test]
fn unchanged_schema_produces_nothing() {
    let schema = "CREATE TABLE users (
  id bigint NOT NULL PRIMARY KEY,
  name varchar(40) DEFAULT 'anonymous',
  age integer
);
CREATE UNIQUE NONCLUSTERED INDEX ix_users_name ON users (name);
CREATE VIEW adults AS select id from dbo.users where age >= 18;";
    assert_converged(DIALECT, schema);
}

#[test]
fn rediff_after_convergence_is_empty() {
    let current = "CREATE TABLE users (id bigint NOT NULL PRIMARY KEY);";
    let desired = "CREATE TABLE users (
  id bigint NOT NULL PRIMARY KEY,
  name varchar(40)
);";
    assert!(!diff(DIALECT, desired, current).is_empty());
    // Once current caught up with desired, nothing remains.
    assert_ddls(DIALECT, desired, desired, &[]);
}
