//! Error types for the diff engine.

/// Errors that abort a diff run.
///
/// All of these are value-returning: the first error encountered while
/// walking the desired DDL stream aborts the whole diff, and statements
/// accumulated so far are discarded by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// The DDL text could not be parsed or classified.
    #[error(transparent)]
    Parse(#[from] crate::parser::ParseError),

    /// A statement kind the diff engine does not handle.
    #[error("unexpected statement: '{0}'")]
    UnknownStatement(String),

    /// A DDL targets a table that does not exist on the relevant side.
    #[error("{action} is performed for inexistent table '{table}': '{statement}'")]
    MissingTable {
        /// What was being attempted (e.g. `CREATE INDEX`).
        action: String,
        /// The table the statement referred to.
        table: String,
        /// The offending statement text.
        statement: String,
    },

    /// The desired stream declares the same index twice on one table.
    #[error("index '{index}' is doubly created against table '{table}': '{statement}'")]
    DuplicateIndex {
        /// Index or constraint name.
        index: String,
        /// The table the index targets.
        table: String,
        /// The offending statement text.
        statement: String,
    },

    /// The desired stream declares the same policy twice on one table.
    #[error("policy '{policy}' is doubly created against table '{table}': '{statement}'")]
    DuplicatePolicy {
        /// Policy name.
        policy: String,
        /// The table the policy targets.
        table: String,
        /// The offending statement text.
        statement: String,
    },

    /// The desired stream declares the same view twice.
    #[error("view '{view}' is doubly created: '{statement}'")]
    DuplicateView {
        /// View name.
        view: String,
        /// The offending statement text.
        statement: String,
    },

    /// A foreign key without a constraint name cannot be diffed idempotently.
    #[error(
        "foreign key without constraint symbol was found in table '{table}' \
         (index name: '{index_name}', columns: {columns:?}). \
         Specify the constraint symbol to identify the foreign key."
    )]
    MissingConstraintName {
        /// The table declaring the foreign key.
        table: String,
        /// The foreign key's index name, if any.
        index_name: String,
        /// The foreign key's local columns.
        columns: Vec<String>,
    },

    /// A primary-key column was renamed; rewriting the key is not handled.
    #[error(
        "primary key column name of '{table}' should be '{desired}' but currently \
         '{current}'. This is not handled yet."
    )]
    UnsupportedPrimaryKeyRename {
        /// The table whose primary key changed.
        table: String,
        /// The primary-key column the desired schema names.
        desired: String,
        /// The primary-key column the current index covers.
        current: String,
    },

    /// A column key option the renderer does not support.
    #[error("unsupported column key '{key_option}' in column '{column}'")]
    UnsupportedColumnKey {
        /// Textual form of the key option.
        key_option: String,
        /// The column carrying it.
        column: String,
    },

    /// A default value kind the renderer does not support.
    #[error("unsupported default value '{raw}' in column '{column}'")]
    UnsupportedDefaultValueKind {
        /// Raw text of the default value.
        raw: String,
        /// The column carrying it.
        column: String,
    },
}

/// Result type for diff operations.
pub type Result<T> = std::result::Result<T, DiffError>;
