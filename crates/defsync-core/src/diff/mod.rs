//! The diff engine: desired-side walk, cleanup walk and simulated state.
//!
//! [`diff_ddls`] is the pure core: two classified DDL streams in, an
//! ordered list of DDL strings out. The engine holds two schemas in
//! parallel while walking the desired stream: `current` starts as the
//! folded current schema and is destructively updated to model the effect
//! of each emitted statement; `desired` accumulates what the desired
//! stream declares so the final cleanup walk can drop everything absent
//! from it.

mod compare;
mod render;
mod table;

use tracing::debug;

use crate::ddl::{fold_schema, DdlStatement};
use crate::dialect::Dialect;
use crate::error::{DiffError, Result};
use crate::schema::{ForeignKey, Index, Policy, Schema, Table, View};

use compare::{are_same_indexes, are_same_policies};
use render::generate_drop_index;

/// Computes the ordered DDL statements that transform `current` into
/// `desired`. Statements are raw SQL strings without trailing semicolons;
/// an empty list means the schemas already agree.
pub fn diff_ddls(
    dialect: Dialect,
    desired: &[DdlStatement],
    current: &[DdlStatement],
) -> Result<Vec<String>> {
    let current_schema = fold_schema(current)?;
    let mut generator = Generator {
        dialect,
        desired: Schema::default(),
        current: current_schema,
    };
    generator.generate_ddls(desired)
}

/// Holds the simulated schema states while the desired stream is walked.
pub(crate) struct Generator {
    pub(crate) dialect: Dialect,
    desired: Schema,
    current: Schema,
}

impl Generator {
    fn generate_ddls(&mut self, desired_ddls: &[DdlStatement]) -> Result<Vec<String>> {
        let mut ddls = Vec::new();

        // Incrementally examine the desired stream.
        for ddl in desired_ddls {
            match ddl {
                DdlStatement::CreateTable { statement, table } => {
                    if let Some(current_table) = self.current.table(&table.name).cloned() {
                        // Table already exists, guess required DDLs.
                        debug!(table = %table.name, "diffing existing table");
                        ddls.extend(self.generate_table_diff(&current_table, table)?);
                        merge_table(
                            self.current
                                .table_mut(&table.name)
                                .expect("table found above"),
                            table,
                        );
                    } else {
                        ddls.push(statement.clone());
                        self.current.tables.push(table.clone());
                    }
                    self.desired.tables.push(table.clone());
                }
                DdlStatement::CreateIndex {
                    statement,
                    table_name,
                    index,
                } => {
                    ddls.extend(self.generate_ddls_for_create_index(
                        table_name,
                        index,
                        "CREATE INDEX",
                        statement,
                    )?);
                }
                DdlStatement::AddIndex {
                    statement,
                    table_name,
                    index,
                } => {
                    ddls.extend(self.generate_ddls_for_create_index(
                        table_name,
                        index,
                        "ALTER TABLE",
                        statement,
                    )?);
                }
                DdlStatement::AddForeignKey {
                    statement,
                    table_name,
                    foreign_key,
                } => {
                    self.record_desired_foreign_key(table_name, foreign_key, statement)?;
                }
                DdlStatement::AddPolicy {
                    statement,
                    table_name,
                    policy,
                } => {
                    ddls.extend(self.generate_ddls_for_create_policy(
                        table_name,
                        policy,
                        "CREATE POLICY",
                        statement,
                    )?);
                }
                DdlStatement::CreateView(view) => {
                    ddls.extend(self.generate_ddls_for_create_view(view)?);
                }
                DdlStatement::AddPrimaryKey { statement, .. } => {
                    return Err(DiffError::UnknownStatement(statement.clone()));
                }
            }
        }

        // Clean up obsoleted tables, foreign keys, indexes, columns and
        // policies, in that order per table.
        let current_tables = self.current.tables.clone();
        for current_table in &current_tables {
            let Some(desired_table) = self.desired.table(&current_table.name).cloned() else {
                debug!(table = %current_table.name, "dropping obsoleted table");
                ddls.push(format!(
                    "DROP TABLE {}",
                    self.dialect.quote_table(&current_table.name)
                ));
                remove_table_by_name(&mut self.current.tables, &current_table.name);
                continue;
            };

            // Foreign keys go before index deletion.
            for foreign_key in &current_table.foreign_keys {
                if desired_table
                    .foreign_key(&foreign_key.constraint_name)
                    .is_some()
                {
                    continue;
                }
                ddls.extend(self.generate_ddls_for_absent_foreign_key(
                    foreign_key,
                    current_table,
                    &desired_table,
                ));
            }

            for index in &current_table.indexes {
                if desired_table.index(&index.name).is_some()
                    || foreign_key_index_names(&desired_table.foreign_keys)
                        .iter()
                        .any(|name| name == &index.name)
                {
                    continue;
                }
                ddls.extend(self.generate_ddls_for_absent_index(
                    index,
                    current_table,
                    &desired_table,
                )?);
            }

            for column in &current_table.columns {
                if desired_table.column(&column.name).is_some() {
                    continue;
                }
                ddls.extend(self.generate_ddls_for_absent_column(current_table, &column.name));
            }

            for policy in &current_table.policies {
                if desired_table.policy(&policy.name).is_some() {
                    continue;
                }
                ddls.push(format!(
                    "DROP POLICY {} ON {}",
                    self.dialect.quote_ident(&policy.name),
                    self.dialect.quote_table(&current_table.name)
                ));
            }
        }

        // Clean up obsoleted views.
        for current_view in &self.current.views {
            if self.desired.view(&current_view.name).is_some() {
                continue;
            }
            ddls.push(format!(
                "DROP VIEW {}",
                self.dialect.quote_table(&current_view.name)
            ));
        }

        Ok(ddls)
    }

    /// Shared by `CREATE INDEX` and `ALTER TABLE ADD INDEX`.
    fn generate_ddls_for_create_index(
        &mut self,
        table_name: &str,
        desired_index: &Index,
        action: &str,
        statement: &str,
    ) -> Result<Vec<String>> {
        let mut ddls = Vec::new();

        let dialect = self.dialect;
        let current_table = self.current.table_mut(table_name).ok_or_else(|| {
            missing_table(action, table_name, statement)
        })?;

        match current_table.index(&desired_index.name).cloned() {
            None => {
                ddls.push(statement.to_string());
                current_table.indexes.push(desired_index.clone());
            }
            Some(current_index) => {
                if !are_same_indexes(&current_index, desired_index) {
                    ddls.push(generate_drop_index(
                        dialect,
                        &current_table.name,
                        &current_index.name,
                    ));
                    ddls.push(statement.to_string());
                    for index in &mut current_table.indexes {
                        if index.name == desired_index.name {
                            *index = desired_index.clone();
                        }
                    }
                }
            }
        }

        // Record on the desired table so the cleanup walk keeps it.
        let desired_table = self
            .desired
            .table_mut(table_name)
            .ok_or_else(|| missing_table(action, table_name, statement))?;
        if desired_table.index(&desired_index.name).is_some() {
            return Err(DiffError::DuplicateIndex {
                index: desired_index.name.clone(),
                table: table_name.to_string(),
                statement: statement.to_string(),
            });
        }
        desired_table.indexes.push(desired_index.clone());

        Ok(ddls)
    }

    /// `ALTER TABLE ADD FOREIGN KEY` emits nothing by itself; recording
    /// the key on the desired table is what keeps the cleanup walk from
    /// dropping it.
    fn record_desired_foreign_key(
        &mut self,
        table_name: &str,
        desired_foreign_key: &ForeignKey,
        statement: &str,
    ) -> Result<()> {
        let desired_table = self
            .desired
            .table_mut(table_name)
            .ok_or_else(|| missing_table("ALTER TABLE", table_name, statement))?;
        if desired_table
            .foreign_key(&desired_foreign_key.constraint_name)
            .is_some()
        {
            return Err(DiffError::DuplicateIndex {
                index: desired_foreign_key.constraint_name.clone(),
                table: table_name.to_string(),
                statement: statement.to_string(),
            });
        }
        desired_table.foreign_keys.push(desired_foreign_key.clone());
        Ok(())
    }

    fn generate_ddls_for_create_policy(
        &mut self,
        table_name: &str,
        desired_policy: &Policy,
        action: &str,
        statement: &str,
    ) -> Result<Vec<String>> {
        let mut ddls = Vec::new();

        let dialect = self.dialect;
        let current_table = self
            .current
            .table_mut(table_name)
            .ok_or_else(|| missing_table(action, table_name, statement))?;

        match current_table.policy(&desired_policy.name).cloned() {
            None => {
                ddls.push(statement.to_string());
                current_table.policies.push(desired_policy.clone());
            }
            Some(current_policy) => {
                if !are_same_policies(&current_policy, desired_policy) {
                    ddls.push(format!(
                        "DROP POLICY {} ON {}",
                        dialect.quote_ident(&current_policy.name),
                        dialect.quote_table(&current_table.name)
                    ));
                    ddls.push(statement.to_string());
                }
            }
        }

        let desired_table = self
            .desired
            .table_mut(table_name)
            .ok_or_else(|| missing_table(action, table_name, statement))?;
        if desired_table.policy(&desired_policy.name).is_some() {
            return Err(DiffError::DuplicatePolicy {
                policy: desired_policy.name.clone(),
                table: table_name.to_string(),
                statement: statement.to_string(),
            });
        }
        desired_table.policies.push(desired_policy.clone());

        Ok(ddls)
    }

    fn generate_ddls_for_create_view(&mut self, desired_view: &View) -> Result<Vec<String>> {
        let mut ddls = Vec::new();

        match self.current.view(&desired_view.name) {
            None => {
                ddls.push(desired_view.statement.clone());
            }
            Some(current_view) => {
                if !current_view
                    .definition
                    .eq_ignore_ascii_case(&desired_view.definition)
                {
                    let quoted = self.dialect.quote_table(&desired_view.name);
                    if matches!(self.dialect, Dialect::Sqlite | Dialect::Mssql) {
                        ddls.push(format!("DROP VIEW {quoted}"));
                        ddls.push(format!(
                            "CREATE VIEW {quoted} AS {}",
                            desired_view.definition
                        ));
                    } else {
                        ddls.push(format!(
                            "CREATE OR REPLACE VIEW {quoted} AS {}",
                            desired_view.definition
                        ));
                    }
                }
            }
        }

        if self.desired.view(&desired_view.name).is_some() {
            return Err(DiffError::DuplicateView {
                view: desired_view.name.clone(),
                statement: desired_view.statement.clone(),
            });
        }
        self.desired.views.push(desired_view.clone());

        Ok(ddls)
    }

    /// Even though the simulated table has no such foreign key anymore,
    /// an inline `references` on a desired column may re-declare it;
    /// only drop the constraint when no column does.
    fn generate_ddls_for_absent_foreign_key(
        &self,
        current_foreign_key: &ForeignKey,
        current_table: &Table,
        desired_table: &Table,
    ) -> Vec<String> {
        let mut ddls = Vec::new();
        match self.dialect {
            Dialect::Mysql => {
                ddls.push(format!(
                    "ALTER TABLE {} DROP FOREIGN KEY {}",
                    self.dialect.quote_table(&current_table.name),
                    self.dialect.quote_ident(&current_foreign_key.constraint_name)
                ));
            }
            Dialect::Postgres | Dialect::Mssql => {
                let references_column = desired_table.columns.iter().find(|column| {
                    column.references.as_deref() == Some(&current_foreign_key.reference_name)
                });
                if references_column.is_none() {
                    ddls.push(format!(
                        "ALTER TABLE {} DROP CONSTRAINT {}",
                        self.dialect.quote_table(&current_table.name),
                        self.dialect.quote_ident(&current_foreign_key.constraint_name)
                    ));
                }
            }
            Dialect::Sqlite => {}
        }
        ddls
    }

    /// Even though the simulated table has no such index anymore, an
    /// inline PRIMARY KEY or UNIQUE on a desired column may cover it;
    /// only drop the index when no column does.
    fn generate_ddls_for_absent_index(
        &self,
        current_index: &Index,
        current_table: &Table,
        desired_table: &Table,
    ) -> Result<Vec<String>> {
        let mut ddls = Vec::new();

        if current_index.primary {
            let primary_key_column = desired_table
                .columns
                .iter()
                .find(|c| c.key_option == crate::schema::ColumnKeyOption::Primary);
            match primary_key_column {
                None => {
                    // The column will usually be DROP COLUMN-ed along with
                    // its key, but MSSQL needs the constraint gone first.
                    if self.dialect == Dialect::Mssql {
                        ddls.push(format!(
                            "ALTER TABLE {} DROP CONSTRAINT {}",
                            self.dialect.quote_table(&current_table.name),
                            self.dialect.quote_ident(&current_index.name)
                        ));
                    }
                }
                Some(column) if column.name != current_index.columns[0].column => {
                    return Err(DiffError::UnsupportedPrimaryKeyRename {
                        table: current_table.name.clone(),
                        desired: column.name.clone(),
                        current: current_index.columns[0].column.clone(),
                    });
                }
                Some(_) => {}
            }
        } else if current_index.unique {
            let unique_key_column = desired_table.columns.iter().find(|column| {
                column.name == current_index.columns[0].column && column.key_option.is_unique()
            });
            if unique_key_column.is_none() {
                ddls.push(generate_drop_index(
                    self.dialect,
                    &current_table.name,
                    &current_index.name,
                ));
            }
        } else {
            ddls.push(generate_drop_index(
                self.dialect,
                &current_table.name,
                &current_index.name,
            ));
        }

        Ok(ddls)
    }

    fn generate_ddls_for_absent_column(
        &self,
        current_table: &Table,
        column_name: &str,
    ) -> Vec<String> {
        let mut ddls = Vec::new();

        // MSSQL attaches named constraints to column defaults; those must
        // be dropped before the column itself.
        if self.dialect == Dialect::Mssql {
            for column in &current_table.columns {
                if column.name != column_name {
                    continue;
                }
                if let Some(default_def) = &column.default_def {
                    if let Some(constraint_name) = &default_def.constraint_name {
                        ddls.push(format!(
                            "ALTER TABLE {} DROP CONSTRAINT {}",
                            self.dialect.quote_table(&current_table.name),
                            self.dialect.quote_ident(constraint_name)
                        ));
                    }
                }
            }
        }

        ddls.push(format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.dialect.quote_table(&current_table.name),
            self.dialect.quote_ident(column_name)
        ));
        ddls
    }
}

fn missing_table(action: &str, table: &str, statement: &str) -> DiffError {
    DiffError::MissingTable {
        action: action.to_string(),
        table: table.to_string(),
        statement: statement.to_string(),
    }
}

/// Index names a desired table's foreign keys claim: the declared index
/// name when present, the constraint name otherwise.
fn foreign_key_index_names(foreign_keys: &[ForeignKey]) -> Vec<&str> {
    foreign_keys
        .iter()
        .filter_map(|foreign_key| {
            if !foreign_key.index_name.is_empty() {
                Some(foreign_key.index_name.as_str())
            } else if !foreign_key.constraint_name.is_empty() {
                Some(foreign_key.constraint_name.as_str())
            } else {
                None
            }
        })
        .collect()
}

/// Destructively extends `into` with columns/indexes of `from` whose name
/// is already present in `into`.
///
/// Appending only what is *already* there looks inverted, but it models
/// "the table survives this ALTER-heavy round; retain what it had" when
/// the desired stream re-processes a repeated CREATE TABLE.
fn merge_table(into: &mut Table, from: &Table) {
    for column in &from.columns {
        if into.columns.iter().any(|c| c.name == column.name) {
            into.columns.push(column.clone());
        }
    }
    for index in &from.indexes {
        if into.indexes.iter().any(|i| i.name == index.name) {
            into.indexes.push(index.clone());
        }
    }
}

/// Removes a table that must exist; the caller looked it up just before.
fn remove_table_by_name(tables: &mut Vec<Table>, name: &str) {
    let before = tables.len();
    tables.retain(|table| table.name != name);
    assert!(
        tables.len() < before,
        "table `{name}` is not in the simulated schema"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;

    fn table(name: &str, columns: &[&str]) -> Table {
        Table {
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
        }
    }

    #[test]
    fn merge_table_retains_only_known_names() {
        let mut into = table("users", &["id", "name"]);
        let from = table("users", &["id", "brand_new"]);
        merge_table(&mut into, &from);

        // "id" is appended again (it was already known); "brand_new" is not.
        let names: Vec<&str> = into.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "id"]);
    }

    #[test]
    fn remove_table_by_name_removes() {
        let mut tables = vec![table("a", &[]), table("b", &[])];
        remove_table_by_name(&mut tables, "a");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "b");
    }

    #[test]
    #[should_panic(expected = "is not in the simulated schema")]
    fn remove_table_by_name_panics_on_missing() {
        let mut tables = vec![table("a", &[])];
        remove_table_by_name(&mut tables, "zzz");
    }

    #[test]
    fn foreign_key_index_names_prefer_index_name() {
        let foreign_keys = vec![
            ForeignKey {
                constraint_name: "fk_a".to_string(),
                index_name: "idx_a".to_string(),
                ..ForeignKey::default()
            },
            ForeignKey {
                constraint_name: "fk_b".to_string(),
                ..ForeignKey::default()
            },
        ];
        assert_eq!(foreign_key_index_names(&foreign_keys), vec!["idx_a", "fk_b"]);
    }
}
