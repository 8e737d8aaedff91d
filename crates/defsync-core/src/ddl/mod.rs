//! Classified DDL statements and the schema folder.
//!
//! [`DdlStatement`] is the output of statement classification: every parsed
//! DDL is exactly one of these variants, each carrying the raw statement
//! text so the diff engine can re-emit it verbatim. [`fold_schema`] folds a
//! statement stream into an in-memory [`Schema`], the form the simulated
//! state works on.

use crate::error::{DiffError, Result};
use crate::schema::{ColumnKeyOption, ForeignKey, Index, Policy, Schema, Table, View};

/// A classified DDL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum DdlStatement {
    /// `CREATE TABLE ...`
    CreateTable {
        /// Raw statement text.
        statement: String,
        /// The declared table.
        table: Table,
    },
    /// `CREATE [UNIQUE] INDEX ... ON ...`
    CreateIndex {
        /// Raw statement text.
        statement: String,
        /// Target table name.
        table_name: String,
        /// The declared index.
        index: Index,
    },
    /// `ALTER TABLE ... ADD INDEX/KEY ...`
    AddIndex {
        /// Raw statement text.
        statement: String,
        /// Target table name.
        table_name: String,
        /// The declared index.
        index: Index,
    },
    /// `ALTER TABLE ... ADD PRIMARY KEY ...`
    AddPrimaryKey {
        /// Raw statement text.
        statement: String,
        /// Target table name.
        table_name: String,
        /// The declared key, as an index.
        index: Index,
    },
    /// `ALTER TABLE ... ADD [CONSTRAINT ...] FOREIGN KEY ...`
    AddForeignKey {
        /// Raw statement text.
        statement: String,
        /// Target table name.
        table_name: String,
        /// The declared foreign key.
        foreign_key: ForeignKey,
    },
    /// `CREATE POLICY ... ON ...`
    AddPolicy {
        /// Raw statement text.
        statement: String,
        /// Target table name.
        table_name: String,
        /// The declared policy.
        policy: Policy,
    },
    /// `CREATE VIEW ... AS ...`
    CreateView(View),
}

impl DdlStatement {
    /// The raw statement text.
    #[must_use]
    pub fn statement(&self) -> &str {
        match self {
            DdlStatement::CreateTable { statement, .. }
            | DdlStatement::CreateIndex { statement, .. }
            | DdlStatement::AddIndex { statement, .. }
            | DdlStatement::AddPrimaryKey { statement, .. }
            | DdlStatement::AddForeignKey { statement, .. }
            | DdlStatement::AddPolicy { statement, .. } => statement,
            DdlStatement::CreateView(view) => &view.statement,
        }
    }
}

/// Folds a DDL stream into a [`Schema`].
///
/// `ALTER TABLE ADD ...` statements mutate tables that must already exist
/// in the stream; referencing a table before its `CREATE TABLE` is a
/// [`DiffError::MissingTable`].
pub fn fold_schema(ddls: &[DdlStatement]) -> Result<Schema> {
    let mut schema = Schema::default();

    for ddl in ddls {
        match ddl {
            DdlStatement::CreateTable { table, .. } => {
                schema.tables.push(table.clone());
            }
            DdlStatement::CreateIndex {
                statement,
                table_name,
                index,
            }
            | DdlStatement::AddIndex {
                statement,
                table_name,
                index,
            } => {
                let action = match ddl {
                    DdlStatement::CreateIndex { .. } => "CREATE INDEX",
                    _ => "ALTER TABLE",
                };
                let table = find_table(&mut schema, table_name, action, statement)?;
                table.indexes.push(index.clone());
            }
            DdlStatement::AddPrimaryKey {
                statement,
                table_name,
                index,
            } => {
                let table = find_table(&mut schema, table_name, "ADD PRIMARY KEY", statement)?;
                let key_column = &index.columns[0].column;
                for column in &mut table.columns {
                    if column.name == *key_column {
                        column.key_option = ColumnKeyOption::Primary;
                    }
                }
            }
            DdlStatement::AddForeignKey {
                statement,
                table_name,
                foreign_key,
            } => {
                let table = find_table(&mut schema, table_name, "ADD FOREIGN KEY", statement)?;
                table.foreign_keys.push(foreign_key.clone());
            }
            DdlStatement::AddPolicy {
                statement,
                table_name,
                policy,
            } => {
                let table = find_table(&mut schema, table_name, "ADD POLICY", statement)?;
                table.policies.push(policy.clone());
            }
            DdlStatement::CreateView(view) => {
                schema.views.push(view.clone());
            }
        }
    }

    Ok(schema)
}

fn find_table<'a>(
    schema: &'a mut Schema,
    name: &str,
    action: &str,
    statement: &str,
) -> Result<&'a mut Table> {
    schema.table_mut(name).ok_or_else(|| DiffError::MissingTable {
        action: action.to_string(),
        table: name.to_string(),
        statement: statement.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, IndexColumn};

    fn create_table(name: &str, columns: &[&str]) -> DdlStatement {
        DdlStatement::CreateTable {
            statement: format!("CREATE TABLE {name} (...)"),
            table: Table {
                name: name.to_string(),
                columns: columns
                    .iter()
                    .enumerate()
                    .map(|(position, column)| Column {
                        name: (*column).to_string(),
                        position,
                        type_name: "integer".to_string(),
                        ..Column::default()
                    })
                    .collect(),
                ..Table::default()
            },
        }
    }

    fn index(name: &str, column: &str) -> Index {
        Index {
            name: name.to_string(),
            index_type: String::new(),
            columns: vec![IndexColumn {
                column: column.to_string(),
                length: None,
            }],
            primary: false,
            unique: false,
            where_clause: String::new(),
            clustered: false,
            options: vec![],
        }
    }

    #[test]
    fn folds_tables_and_indexes() {
        let ddls = vec![
            create_table("users", &["id", "name"]),
            DdlStatement::CreateIndex {
                statement: "CREATE INDEX idx_name ON users (name)".to_string(),
                table_name: "users".to_string(),
                index: index("idx_name", "name"),
            },
        ];
        let schema = fold_schema(&ddls).unwrap();
        assert_eq!(schema.tables.len(), 1);
        assert_eq!(schema.tables[0].indexes.len(), 1);
        assert_eq!(schema.tables[0].indexes[0].name, "idx_name");
    }

    #[test]
    fn index_before_table_is_an_error() {
        let ddls = vec![DdlStatement::CreateIndex {
            statement: "CREATE INDEX idx ON missing (x)".to_string(),
            table_name: "missing".to_string(),
            index: index("idx", "x"),
        }];
        let err = fold_schema(&ddls).unwrap_err();
        assert!(matches!(err, DiffError::MissingTable { table, .. } if table == "missing"));
    }

    #[test]
    fn add_primary_key_marks_the_named_column() {
        let ddls = vec![
            create_table("users", &["id", "name"]),
            DdlStatement::AddPrimaryKey {
                statement: "ALTER TABLE users ADD PRIMARY KEY (id)".to_string(),
                table_name: "users".to_string(),
                index: index("PRIMARY", "id"),
            },
        ];
        let schema = fold_schema(&ddls).unwrap();
        let table = schema.table("users").unwrap();
        assert_eq!(
            table.column("id").unwrap().key_option,
            ColumnKeyOption::Primary
        );
        assert_eq!(
            table.column("name").unwrap().key_option,
            ColumnKeyOption::None
        );
    }

    #[test]
    fn views_fold_without_table_lookup() {
        let ddls = vec![DdlStatement::CreateView(View {
            statement: "CREATE VIEW v AS select 1".to_string(),
            name: "v".to_string(),
            definition: "select 1".to_string(),
        })];
        let schema = fold_schema(&ddls).unwrap();
        assert_eq!(schema.views.len(), 1);
        assert_eq!(schema.views[0].name, "v");
    }
}
