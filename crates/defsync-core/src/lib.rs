//! # defsync-core
//!
//! An idempotent schema diff engine. Given a *desired* schema expressed
//! as declarative DDL and the *current* schema of a live database
//! (typically obtained by introspection), it emits the ordered DDL
//! statements that converge current toward desired. Applying the result
//! and diffing again yields nothing.
//!
//! The crate provides:
//! - a hand-written lexer and recursive-descent parser for the DDL
//!   subset the diff consumes ([`parser`]);
//! - a dialect-shared relational data model ([`schema`]);
//! - the diff engine itself ([`diff_ddls`]), parameterized over four
//!   SQL dialect families ([`Dialect`]).
//!
//! ## Example
//!
//! ```rust
//! use defsync_core::{generate_idempotent_ddls, Dialect};
//!
//! let desired = "CREATE TABLE users (
//!   id bigint NOT NULL PRIMARY KEY,
//!   name varchar(40)
//! );";
//! let current = "CREATE TABLE users (
//!   id bigint NOT NULL PRIMARY KEY
//! );";
//!
//! let ddls = generate_idempotent_ddls(Dialect::Mssql, desired, current).unwrap();
//! assert_eq!(ddls, vec!["ALTER TABLE [dbo].[users] ADD [name] varchar(40)"]);
//!
//! // Converged schemas produce nothing.
//! let ddls = generate_idempotent_ddls(Dialect::Mssql, desired, desired).unwrap();
//! assert!(ddls.is_empty());
//! ```
//!
//! The engine is pure and synchronous: one call consumes two statement
//! streams and produces a list of raw SQL strings (no trailing
//! semicolons). Executing the statements is the caller's business.

pub mod ddl;
mod dialect;
mod diff;
mod error;
pub mod lexer;
pub mod parser;
pub mod schema;

pub use ddl::{fold_schema, DdlStatement};
pub use dialect::Dialect;
pub use diff::diff_ddls;
pub use error::{DiffError, Result};
pub use parser::{parse_ddls, ParseError};

/// Parses both DDL texts and diffs them: the ordered statements that
/// transform `current_sql`'s schema into `desired_sql`'s.
pub fn generate_idempotent_ddls(
    dialect: Dialect,
    desired_sql: &str,
    current_sql: &str,
) -> Result<Vec<String>> {
    let desired_ddls = parse_ddls(desired_sql)?;
    let current_ddls = parse_ddls(current_sql)?;
    diff_ddls(dialect, &desired_ddls, &current_ddls)
}
