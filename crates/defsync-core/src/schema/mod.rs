//! The relational data model shared across dialects.
//!
//! These types are produced by the DDL parser and consumed by the diff
//! engine. They model what the diff needs to compare, not everything a
//! database knows: insertion order is preserved everywhere because the
//! emitted statement list must be deterministic.

/// A literal value as it appeared in the DDL text.
///
/// Comparison generally uses the raw text (`raw`); the variants carry the
/// parsed payload where a later stage needs it (e.g. rendering defaults).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A quoted string literal.
    Str {
        /// Original text, quotes stripped.
        raw: String,
        /// Unescaped string contents.
        value: String,
    },
    /// An integer literal.
    Int {
        /// Original text.
        raw: String,
        /// Parsed value.
        value: i64,
    },
    /// A floating-point literal.
    Float {
        /// Original text.
        raw: String,
        /// Parsed value.
        value: f64,
    },
    /// A hexadecimal number literal (`0xFF`).
    HexNum {
        /// Original text.
        raw: String,
    },
    /// A hex string literal (`x'FF'`).
    Hex {
        /// Original text.
        raw: String,
    },
    /// A bareword argument: `NULL`, `CURRENT_TIMESTAMP`, function calls.
    ValArg {
        /// Original text.
        raw: String,
    },
    /// A bit literal (`b'0'` / `b'1'`).
    Bit {
        /// Original text.
        raw: String,
        /// Parsed bit.
        value: bool,
    },
    /// A boolean literal (`true` / `false`).
    Bool {
        /// Original text.
        raw: String,
        /// Parsed value.
        value: bool,
    },
}

impl Value {
    /// The raw textual form of the literal.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Value::Str { raw, .. }
            | Value::Int { raw, .. }
            | Value::Float { raw, .. }
            | Value::HexNum { raw }
            | Value::Hex { raw }
            | Value::ValArg { raw }
            | Value::Bit { raw, .. }
            | Value::Bool { raw, .. } => raw,
        }
    }

    /// Whether this is the literal `null` bareword. Introspected current
    /// schemas often report an explicit `DEFAULT NULL` that must compare
    /// equal to no default at all.
    #[must_use]
    pub fn is_null_arg(&self) -> bool {
        matches!(self, Value::ValArg { raw } if raw == "null")
    }
}

/// A column default, with the constraint name MSSQL attaches to it.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultDefinition {
    /// The default value.
    pub value: Value,
    /// Constraint name; meaningful only in the MSSQL-like dialect.
    pub constraint_name: Option<String>,
}

/// A CHECK constraint attached to a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDefinition {
    /// The constraint body, kept as literal SQL text.
    pub definition: String,
    /// Constraint name, if one was declared.
    pub constraint_name: Option<String>,
}

/// Key options declarable inline on a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnKeyOption {
    /// No key option.
    #[default]
    None,
    /// `PRIMARY KEY`.
    Primary,
    /// `SPATIAL KEY`.
    SpatialKey,
    /// `UNIQUE`.
    Unique,
    /// `UNIQUE KEY`.
    UniqueKey,
    /// `KEY`.
    Key,
}

impl ColumnKeyOption {
    /// `UNIQUE` and `UNIQUE KEY` are both unique.
    #[must_use]
    pub fn is_unique(self) -> bool {
        matches!(self, ColumnKeyOption::Unique | ColumnKeyOption::UniqueKey)
    }
}

/// Postgres-style identity/sequence attributes attached to a column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sequence {
    /// `SEQUENCE NAME`, if declared.
    pub name: String,
    /// `IF NOT EXISTS` flag.
    pub if_not_exists: bool,
    /// Sequence data type, if declared.
    pub type_name: String,
    /// `INCREMENT BY`.
    pub increment_by: Option<i64>,
    /// `MINVALUE`.
    pub min_value: Option<i64>,
    /// `NO MINVALUE` flag.
    pub no_min_value: bool,
    /// `MAXVALUE`.
    pub max_value: Option<i64>,
    /// `NO MAXVALUE` flag.
    pub no_max_value: bool,
    /// `START WITH`.
    pub start_with: Option<i64>,
    /// `CACHE`.
    pub cache: Option<i64>,
    /// `CYCLE` flag.
    pub cycle: bool,
    /// `NO CYCLE` flag.
    pub no_cycle: bool,
    /// `OWNED BY`, if declared.
    pub owned_by: String,
}

/// A table column.
///
/// `not_null` is tri-state on purpose: "explicitly NOT NULL", "explicitly
/// NULL" and "unspecified" behave differently when diffing, since an
/// unspecified side must not fire a change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// 0-based position; must agree with the column's index in
    /// [`Table::columns`].
    pub position: usize,
    /// Data type name as written (lowercased by the parser).
    pub type_name: String,
    /// `UNSIGNED` flag.
    pub unsigned: bool,
    /// Tri-state nullability.
    pub not_null: Option<bool>,
    /// `AUTO_INCREMENT` flag.
    pub auto_increment: bool,
    /// `[]` array suffix (Postgres).
    pub array: bool,
    /// Column default, if any.
    pub default_def: Option<DefaultDefinition>,
    /// Declared length, e.g. the 30 of `nvarchar(30)`.
    pub length: Option<Value>,
    /// Declared scale, e.g. the 2 of `decimal(5, 2)`.
    pub scale: Option<Value>,
    /// CHECK constraint, if any.
    pub check: Option<CheckDefinition>,
    /// `NO INHERIT` on the check constraint (Postgres).
    pub check_no_inherit: bool,
    /// `CHARACTER SET`, if declared.
    pub charset: Option<String>,
    /// `COLLATE`, if declared.
    pub collate: Option<String>,
    /// `WITH TIME ZONE` flag (Postgres).
    pub timezone: bool,
    /// Inline key option.
    pub key_option: ColumnKeyOption,
    /// `ON UPDATE <expr>` (MySQL), kept as the raw value.
    pub on_update: Option<Value>,
    /// Values of an `enum(...)` type, with their quotes.
    pub enum_values: Vec<String>,
    /// Referenced table of an inline `REFERENCES`, if any.
    pub references: Option<String>,
    /// Identity kind: `ALWAYS` or `BY DEFAULT` (Postgres).
    pub identity: Option<String>,
    /// Identity sequence options (Postgres) or `IDENTITY(start, inc)`
    /// parameters (MSSQL).
    pub sequence: Option<Sequence>,
}

/// A column participating in an index, with its optional prefix length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    /// Column name.
    pub column: String,
    /// Prefix length, e.g. the 10 of `KEY idx (col(10))`.
    pub length: Option<i64>,
}

/// A single `name = value` index option.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexOption {
    /// Option name, e.g. `pad_index` or `parser`.
    pub name: String,
    /// Option value.
    pub value: Value,
}

/// An index, unique constraint or primary key on a table.
///
/// The synthetic name `PRIMARY` is reserved for the primary key derived
/// from a column declared with `PRIMARY KEY` inline.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Index type text, e.g. `primary key`, `unique` or a `USING` method.
    pub index_type: String,
    /// Indexed columns in order.
    pub columns: Vec<IndexColumn>,
    /// Whether this is the primary key.
    pub primary: bool,
    /// Whether this is a unique index.
    pub unique: bool,
    /// Partial-index predicate text (Postgres), empty when absent.
    pub where_clause: String,
    /// Whether the index is clustered (MSSQL).
    pub clustered: bool,
    /// Engine-specific options.
    pub options: Vec<IndexOption>,
}

impl Index {
    /// Looks up an option by name.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&IndexOption> {
        self.options.iter().find(|o| o.name == name)
    }
}

/// A foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ForeignKey {
    /// Constraint name. A foreign key without one is rejected at emission
    /// time: it could not be diffed idempotently.
    pub constraint_name: String,
    /// Backing index name, if declared separately from the constraint.
    pub index_name: String,
    /// Local columns.
    pub index_columns: Vec<String>,
    /// Referenced table.
    pub reference_name: String,
    /// Referenced columns.
    pub reference_columns: Vec<String>,
    /// `ON DELETE` action, empty when unspecified.
    pub on_delete: String,
    /// `ON UPDATE` action, empty when unspecified.
    pub on_update: String,
}

/// A row-level security policy (Postgres).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Policy {
    /// Policy name.
    pub name: String,
    /// The table the policy is attached to.
    pub reference_name: String,
    /// `PERMISSIVE` / `RESTRICTIVE`.
    pub permissive: String,
    /// `FOR` scope: `ALL`, `SELECT`, ...
    pub scope: String,
    /// `TO` roles.
    pub roles: Vec<String>,
    /// `USING` expression text.
    pub using: String,
    /// `WITH CHECK` expression text.
    pub with_check: String,
}

/// A view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// Original DDL text.
    pub statement: String,
    /// View name.
    pub name: String,
    /// Body text after `AS`.
    pub definition: String,
}

/// A table: columns in declaration order plus its named attachments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Table name, possibly schema-qualified.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<Column>,
    /// Indexes keyed by name.
    pub indexes: Vec<Index>,
    /// Foreign keys keyed by constraint name.
    pub foreign_keys: Vec<ForeignKey>,
    /// Row-level policies keyed by name.
    pub policies: Vec<Policy>,
}

impl Table {
    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Looks up an index by name.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Looks up a foreign key by constraint name.
    #[must_use]
    pub fn foreign_key(&self, constraint_name: &str) -> Option<&ForeignKey> {
        self.foreign_keys
            .iter()
            .find(|fk| fk.constraint_name == constraint_name)
    }

    /// Looks up a policy by name.
    #[must_use]
    pub fn policy(&self, name: &str) -> Option<&Policy> {
        self.policies.iter().find(|p| p.name == name)
    }

    /// Derives the table's primary key on demand.
    ///
    /// The first index flagged `primary` wins. Failing that, columns
    /// declared `PRIMARY KEY` inline synthesize an index named `PRIMARY`.
    #[must_use]
    pub fn primary_key(&self) -> Option<Index> {
        if let Some(index) = self.indexes.iter().find(|i| i.primary) {
            return Some(index.clone());
        }

        let primary_columns: Vec<IndexColumn> = self
            .columns
            .iter()
            .filter(|c| c.key_option == ColumnKeyOption::Primary)
            .map(|c| IndexColumn {
                column: c.name.clone(),
                length: None,
            })
            .collect();

        if primary_columns.is_empty() {
            return None;
        }

        Some(Index {
            name: "PRIMARY".to_string(),
            index_type: "primary key".to_string(),
            columns: primary_columns,
            primary: true,
            unique: true,
            where_clause: String::new(),
            clustered: true,
            options: vec![],
        })
    }
}

/// A full schema: tables and views in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    /// Tables in declaration order.
    pub tables: Vec<Table>,
    /// Views in declaration order.
    pub views: Vec<View>,
}

impl Schema {
    /// Looks up a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Looks up a table by name, mutably.
    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    /// Looks up a view by name.
    #[must_use]
    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name == name)
    }
}
