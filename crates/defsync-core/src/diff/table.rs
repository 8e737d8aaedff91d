//! Per-table diffing.
//!
//! The phases run in a fixed order because some of the emitted DDL has
//! server-side prerequisites: keys must exist before `AUTO_INCREMENT` can
//! be added, and a stale `AUTO_INCREMENT` must be gone before its key can
//! be dropped.

use tracing::debug;

use crate::dialect::Dialect;
use crate::error::{DiffError, Result};
use crate::schema::{Column, Table};

use super::compare::{
    are_same_check_definition, are_same_default_value, are_same_foreign_keys, are_same_indexes,
    are_same_primary_keys, have_same_column_definition, have_same_data_type, is_primary_key,
    not_null,
};
use super::render::{
    generate_add_index, generate_column_definition, generate_data_type,
    generate_default_definition, generate_drop_index, generate_foreign_key_definition,
    generate_sequence_clause,
};
use super::Generator;

impl Generator {
    /// Diffs one table that exists on both sides. The caller merges the
    /// desired table into the simulated current schema afterwards.
    pub(super) fn generate_table_diff(
        &self,
        current_table: &Table,
        desired_table: &Table,
    ) -> Result<Vec<String>> {
        let mut ddls = Vec::new();
        let dialect = self.dialect;

        // Examine each desired column.
        for (i, desired_column) in desired_table.columns.iter().enumerate() {
            let current_column = current_table.column(&desired_column.name);
            let mut desired_column = desired_column.clone();
            if current_column.map_or(true, |c| !c.auto_increment) {
                // AUTO_INCREMENT cannot be added until its key exists;
                // deferred to the dedicated phase below.
                desired_column.auto_increment = false;
            }

            let Some(current_column) = current_column else {
                let definition = generate_column_definition(dialect, &desired_column, true)?;
                let mut ddl = match dialect {
                    Dialect::Mssql => format!(
                        "ALTER TABLE {} ADD {}",
                        dialect.quote_table(&desired_table.name),
                        definition
                    ),
                    _ => format!(
                        "ALTER TABLE {} ADD COLUMN {}",
                        dialect.quote_table(&desired_table.name),
                        definition
                    ),
                };
                if dialect == Dialect::Mysql {
                    ddl.push_str(&positional_clause(desired_table, i));
                }
                ddls.push(ddl);
                continue;
            };

            // Column exists on both sides; emit changes per dialect.
            match dialect {
                Dialect::Mysql => {
                    ddls.extend(self.mysql_column_changes(
                        current_table,
                        desired_table,
                        current_column,
                        &desired_column,
                        i,
                    )?);
                }
                Dialect::Postgres => {
                    ddls.extend(self.postgres_column_changes(
                        current_table,
                        desired_table,
                        current_column,
                        &desired_column,
                    )?);
                }
                Dialect::Mssql => {
                    ddls.extend(self.mssql_column_changes(
                        desired_table,
                        current_column,
                        &desired_column,
                    ));
                }
                Dialect::Sqlite => {}
            }
        }

        // Remove stale AUTO_INCREMENT before deleting its key.
        if dialect == Dialect::Mysql {
            for current_column in &current_table.columns {
                let desired_column = desired_table.column(&current_column.name);
                if current_column.auto_increment
                    && desired_column.map_or(true, |c| !c.auto_increment)
                {
                    let mut stripped = current_column.clone();
                    stripped.auto_increment = false;
                    let definition = generate_column_definition(dialect, &stripped, false)?;
                    ddls.push(format!(
                        "ALTER TABLE {} CHANGE COLUMN {} {}",
                        dialect.quote_table(&current_table.name),
                        dialect.quote_ident(&current_column.name),
                        definition
                    ));
                }
            }
        }

        // Examine the primary key.
        let current_primary_key = current_table.primary_key();
        let desired_primary_key = desired_table.primary_key();
        if !are_same_primary_keys(current_primary_key.as_ref(), desired_primary_key.as_ref()) {
            debug!(table = %desired_table.name, "primary key changed");
            if current_primary_key.is_some() {
                match dialect {
                    Dialect::Mysql => {
                        ddls.push(format!(
                            "ALTER TABLE {} DROP PRIMARY KEY",
                            dialect.quote_table(&desired_table.name)
                        ));
                    }
                    Dialect::Postgres => {
                        let table_name = desired_table
                            .name
                            .split_once('.')
                            .map_or(desired_table.name.as_str(), |(_, table)| table);
                        ddls.push(format!(
                            "ALTER TABLE {} DROP CONSTRAINT {}",
                            dialect.quote_table(&desired_table.name),
                            dialect.quote_ident(&format!("{table_name}_pkey"))
                        ));
                    }
                    // MSSQL drops happen in the cleanup walk via absent
                    // index handling; SQLite cannot alter primary keys.
                    Dialect::Mssql | Dialect::Sqlite => {}
                }
            }
            if let Some(desired_primary_key) = &desired_primary_key {
                ddls.push(generate_add_index(
                    dialect,
                    &desired_table.name,
                    desired_primary_key,
                ));
            }
        }

        // Examine each index (primary keys were handled above).
        for desired_index in &desired_table.indexes {
            if desired_index.primary {
                continue;
            }
            match current_table.index(&desired_index.name) {
                Some(current_index) => {
                    if !are_same_indexes(current_index, desired_index) {
                        ddls.push(generate_drop_index(
                            dialect,
                            &desired_table.name,
                            &desired_index.name,
                        ));
                        ddls.push(generate_add_index(
                            dialect,
                            &desired_table.name,
                            desired_index,
                        ));
                    }
                }
                None => {
                    ddls.push(generate_add_index(
                        dialect,
                        &desired_table.name,
                        desired_index,
                    ));
                }
            }
        }

        // Add new AUTO_INCREMENT now that keys exist.
        if dialect == Dialect::Mysql {
            for desired_column in &desired_table.columns {
                let current_column = current_table.column(&desired_column.name);
                if desired_column.auto_increment
                    && current_column.map_or(true, |c| !c.auto_increment)
                {
                    let definition = generate_column_definition(dialect, desired_column, false)?;
                    ddls.push(format!(
                        "ALTER TABLE {} CHANGE COLUMN {} {}",
                        dialect.quote_table(&current_table.name),
                        dialect.quote_ident(&desired_column.name),
                        definition
                    ));
                }
            }
        }

        // Examine each foreign key.
        for desired_foreign_key in &desired_table.foreign_keys {
            if desired_foreign_key.constraint_name.is_empty() {
                return Err(DiffError::MissingConstraintName {
                    table: desired_table.name.clone(),
                    index_name: desired_foreign_key.index_name.clone(),
                    columns: desired_foreign_key.index_columns.clone(),
                });
            }

            match current_table.foreign_key(&desired_foreign_key.constraint_name) {
                Some(current_foreign_key) => {
                    if !are_same_foreign_keys(dialect, current_foreign_key, desired_foreign_key) {
                        match dialect {
                            Dialect::Mysql => {
                                ddls.push(format!(
                                    "ALTER TABLE {} DROP FOREIGN KEY {}",
                                    dialect.quote_table(&desired_table.name),
                                    dialect.quote_ident(&current_foreign_key.constraint_name)
                                ));
                            }
                            Dialect::Postgres | Dialect::Mssql => {
                                ddls.push(format!(
                                    "ALTER TABLE {} DROP CONSTRAINT {}",
                                    dialect.quote_table(&desired_table.name),
                                    dialect.quote_ident(&current_foreign_key.constraint_name)
                                ));
                            }
                            Dialect::Sqlite => {}
                        }
                        ddls.push(format!(
                            "ALTER TABLE {} ADD {}",
                            dialect.quote_table(&desired_table.name),
                            generate_foreign_key_definition(dialect, desired_foreign_key)
                        ));
                    }
                }
                None => {
                    ddls.push(format!(
                        "ALTER TABLE {} ADD {}",
                        dialect.quote_table(&desired_table.name),
                        generate_foreign_key_definition(dialect, desired_foreign_key)
                    ));
                }
            }
        }

        Ok(ddls)
    }

    fn mysql_column_changes(
        &self,
        current_table: &Table,
        desired_table: &Table,
        current_column: &Column,
        desired_column: &Column,
        i: usize,
    ) -> Result<Vec<String>> {
        let mut ddls = Vec::new();
        let dialect = self.dialect;

        let current_pos = current_column.position as isize;
        let desired_pos = desired_column.position as isize;
        let change_order = current_pos > desired_pos
            && current_pos - desired_pos
                > current_table.columns.len() as isize - desired_table.columns.len() as isize;

        // Change type and order; AUTO_INCREMENT and UNIQUE KEY are
        // handled by their own phases.
        if !have_same_column_definition(dialect, current_column, desired_column)
            || !are_same_default_value(
                current_column.default_def.as_ref(),
                desired_column.default_def.as_ref(),
            )
            || change_order
        {
            let definition = generate_column_definition(dialect, desired_column, false)?;
            let mut ddl = format!(
                "ALTER TABLE {} CHANGE COLUMN {} {}",
                dialect.quote_table(&desired_table.name),
                dialect.quote_ident(&current_column.name),
                definition
            );
            if change_order {
                ddl.push_str(&positional_clause(desired_table, i));
            }
            ddls.push(ddl);
        }

        let current_index = current_table.index(&desired_column.name);
        if desired_column.key_option.is_unique()
            && !current_column.key_option.is_unique()
            && current_index.is_none()
        {
            ddls.push(format!(
                "ALTER TABLE {} ADD UNIQUE KEY {}({})",
                dialect.quote_table(&desired_table.name),
                dialect.quote_ident(&desired_column.name),
                dialect.quote_ident(&desired_column.name)
            ));
        }

        Ok(ddls)
    }

    fn postgres_column_changes(
        &self,
        current_table: &Table,
        desired_table: &Table,
        current_column: &Column,
        desired_column: &Column,
    ) -> Result<Vec<String>> {
        let mut ddls = Vec::new();
        let dialect = self.dialect;
        let quoted_table = dialect.quote_table(&desired_table.name);
        let quoted_column = dialect.quote_ident(&current_column.name);

        if !have_same_data_type(dialect, current_column, desired_column) {
            ddls.push(format!(
                "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
                quoted_table,
                quoted_column,
                generate_data_type(desired_column)
            ));
        }

        // Primary key implies NOT NULL; leave those columns alone.
        if !is_primary_key(current_column, current_table) {
            let current_not_null = not_null(dialect, current_column);
            let desired_not_null = not_null(dialect, desired_column);
            if current_not_null && !desired_not_null {
                ddls.push(format!(
                    "ALTER TABLE {quoted_table} ALTER COLUMN {quoted_column} DROP NOT NULL"
                ));
            } else if !current_not_null && desired_not_null {
                ddls.push(format!(
                    "ALTER TABLE {quoted_table} ALTER COLUMN {quoted_column} SET NOT NULL"
                ));
            }
        }

        // GENERATED ... AS IDENTITY transitions.
        if current_column.identity != desired_column.identity {
            match (&current_column.identity, &desired_column.identity) {
                (None, Some(identity)) => {
                    let mut alter = format!(
                        "ALTER TABLE {} ALTER COLUMN {} ADD GENERATED {} AS IDENTITY",
                        quoted_table,
                        dialect.quote_ident(&desired_column.name),
                        identity
                    );
                    if let Some(sequence) = &desired_column.sequence {
                        alter.push_str(&format!(" ({})", generate_sequence_clause(sequence)));
                    }
                    ddls.push(alter);
                }
                (Some(_), None) => {
                    ddls.push(format!(
                        "ALTER TABLE {} ALTER COLUMN {} DROP IDENTITY IF EXISTS",
                        dialect.quote_table(&current_table.name),
                        quoted_column
                    ));
                }
                (Some(_), Some(identity)) => {
                    // Changing the backing sequence is not supported.
                    ddls.push(format!(
                        "ALTER TABLE {} ALTER COLUMN {} SET GENERATED {}",
                        quoted_table,
                        dialect.quote_ident(&desired_column.name),
                        identity
                    ));
                }
                // Guarded by the inequality above.
                (None, None) => {}
            }
        }

        if !are_same_default_value(
            current_column.default_def.as_ref(),
            desired_column.default_def.as_ref(),
        ) {
            match &desired_column.default_def {
                None => {
                    ddls.push(format!(
                        "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
                        dialect.quote_table(&current_table.name),
                        quoted_column
                    ));
                }
                Some(default_def) => {
                    let definition =
                        generate_default_definition(&default_def.value, &desired_column.name)?;
                    ddls.push(format!(
                        "ALTER TABLE {} ALTER COLUMN {} SET {}",
                        dialect.quote_table(&current_table.name),
                        quoted_column,
                        definition
                    ));
                }
            }
        }

        if !are_same_check_definition(
            current_column.check.as_ref(),
            desired_column.check.as_ref(),
        ) || current_column.check_no_inherit != desired_column.check_no_inherit
        {
            let constraint_name = format!(
                "{}_{}_check",
                desired_table.name.replacen("public.", "", 1),
                desired_column.name
            );
            if current_column.check.is_some() {
                ddls.push(format!(
                    "ALTER TABLE {quoted_table} DROP CONSTRAINT {constraint_name}"
                ));
            }
            if let Some(check) = &desired_column.check {
                let mut ddl = format!(
                    "ALTER TABLE {} ADD CONSTRAINT {} CHECK ({})",
                    quoted_table, constraint_name, check.definition
                );
                if desired_column.check_no_inherit {
                    ddl.push_str(" NO INHERIT");
                }
                ddls.push(ddl);
            }
        }

        Ok(ddls)
    }

    fn mssql_column_changes(
        &self,
        desired_table: &Table,
        current_column: &Column,
        desired_column: &Column,
    ) -> Vec<String> {
        let mut ddls = Vec::new();
        let dialect = self.dialect;

        if !are_same_check_definition(
            current_column.check.as_ref(),
            desired_column.check.as_ref(),
        ) || current_column.check_no_inherit != desired_column.check_no_inherit
        {
            let fallback_name = format!(
                "{}_{}_check",
                desired_table.name.replacen("dbo.", "", 1),
                desired_column.name
            );
            if let Some(check) = &current_column.check {
                ddls.push(format!(
                    "ALTER TABLE {} DROP CONSTRAINT {}",
                    dialect.quote_table(&desired_table.name),
                    check.constraint_name.as_deref().unwrap_or_default()
                ));
            }
            if let Some(check) = &desired_column.check {
                let constraint_name = check
                    .constraint_name
                    .as_deref()
                    .unwrap_or(fallback_name.as_str());
                ddls.push(format!(
                    "ALTER TABLE {} ADD CONSTRAINT {} CHECK ({})",
                    dialect.quote_table(&desired_table.name),
                    constraint_name,
                    check.definition
                ));
            }
        }

        ddls
    }
}

/// `FIRST` for the leading column, `AFTER <previous>` otherwise (MySQL).
fn positional_clause(desired_table: &Table, i: usize) -> String {
    if i == 0 {
        " FIRST".to_string()
    } else {
        format!(
            " AFTER {}",
            Dialect::Mysql.quote_ident(&desired_table.columns[i - 1].name)
        )
    }
}
