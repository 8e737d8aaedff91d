//! DDL fragment rendering.
//!
//! Everything here produces SQL text for the emitter. Renderers are pure
//! and dialect-parameterized; they never consult simulated state.

use crate::dialect::Dialect;
use crate::error::{DiffError, Result};
use crate::schema::{Column, ColumnKeyOption, ForeignKey, Index, IndexOption, Sequence, Value};

/// Renders a column's data type: `type(length[, scale])[]`, with enum
/// value lists expanded inline.
pub(crate) fn generate_data_type(column: &Column) -> String {
    let suffix = if column.array { "[]" } else { "" };

    match (&column.length, &column.scale) {
        (Some(length), Some(scale)) => {
            format!("{}({}, {}){}", column.type_name, length.raw(), scale.raw(), suffix)
        }
        (Some(length), None) => format!("{}({}){}", column.type_name, length.raw(), suffix),
        _ if column.type_name == "enum" => {
            format!("{}({}){}", column.type_name, column.enum_values.join(", "), suffix)
        }
        _ => format!("{}{}", column.type_name, suffix),
    }
}

/// Renders a full column definition for ADD/CHANGE COLUMN.
///
/// `enable_unique` controls whether the inline UNIQUE keyword is kept;
/// CHANGE COLUMN re-renders suppress it because uniqueness is handled by
/// the index phases.
pub(crate) fn generate_column_definition(
    dialect: Dialect,
    column: &Column,
    enable_unique: bool,
) -> Result<String> {
    let mut definition = format!(
        "{} {} ",
        dialect.quote_ident(&column.name),
        generate_data_type(column)
    );

    if column.unsigned {
        definition.push_str("UNSIGNED ");
    }
    if column.timezone {
        definition.push_str("WITH TIME ZONE ");
    }

    // CHARACTER SET and COLLATE precede the nullability keywords on MySQL.
    if let Some(charset) = &column.charset {
        definition.push_str(&format!("CHARACTER SET {charset} "));
    }
    if let Some(collate) = &column.collate {
        definition.push_str(&format!("COLLATE {collate} "));
    }

    if column.identity.is_none()
        && (column.not_null == Some(true) || column.key_option == ColumnKeyOption::Primary)
    {
        definition.push_str("NOT NULL ");
    } else if column.not_null == Some(false) {
        definition.push_str("NULL ");
    }

    if let Some(default_def) = &column.default_def {
        let default = generate_default_definition(&default_def.value, &column.name)?;
        definition.push_str(&default);
        definition.push(' ');
    }

    if column.auto_increment {
        definition.push_str("AUTO_INCREMENT ");
    }

    if let Some(on_update) = &column.on_update {
        definition.push_str(&format!("ON UPDATE {} ", on_update.raw()));
    }

    if let Some(check) = &column.check {
        definition.push_str(&format!("CHECK ({}) ", check.definition));
    }
    if column.check_no_inherit {
        definition.push_str("NO INHERIT ");
    }

    match column.key_option {
        ColumnKeyOption::None | ColumnKeyOption::Primary => {}
        ColumnKeyOption::Unique => {
            if enable_unique {
                definition.push_str("UNIQUE ");
            }
        }
        ColumnKeyOption::UniqueKey => {
            if enable_unique {
                definition.push_str("UNIQUE KEY ");
            }
        }
        ColumnKeyOption::SpatialKey | ColumnKeyOption::Key => {
            return Err(DiffError::UnsupportedColumnKey {
                key_option: format!("{:?}", column.key_option),
                column: column.name.clone(),
            });
        }
    }

    if let Some(identity) = &column.identity {
        definition.push_str(&format!("GENERATED {identity} AS IDENTITY "));
        if let Some(sequence) = &column.sequence {
            definition.push_str(&format!("({}) ", generate_sequence_clause(sequence)));
        }
    } else if dialect == Dialect::Mssql {
        if let Some(sequence) = &column.sequence {
            if let (Some(start), Some(increment)) = (sequence.start_with, sequence.increment_by) {
                definition.push_str(&format!("IDENTITY({start},{increment})"));
            }
        }
    }

    Ok(definition.trim_end().to_string())
}

/// Renders the statement adding an index, unique key or primary key.
pub(crate) fn generate_add_index(dialect: Dialect, table: &str, index: &Index) -> String {
    let unique_option = if index.unique { " UNIQUE" } else { "" };
    let clustered_option = if index.clustered {
        " CLUSTERED"
    } else {
        " NONCLUSTERED"
    };

    let columns: Vec<String> = index
        .columns
        .iter()
        .map(|index_column| {
            let mut column = dialect.quote_ident(&index_column.column);
            if let Some(length) = index_column.length {
                column.push_str(&format!("({length})"));
            }
            column
        })
        .collect();

    let option_definition = generate_index_option_definition(dialect, &index.options);

    match dialect {
        Dialect::Mssql => {
            let mut ddl = if index.primary {
                let mut ddl = format!("ALTER TABLE {} ADD", dialect.quote_table(table));
                if index.name != "PRIMARY" {
                    ddl.push_str(&format!(" CONSTRAINT {}", dialect.quote_ident(&index.name)));
                }
                ddl.push_str(&format!(" {}{}", index.index_type, clustered_option));
                ddl
            } else {
                format!(
                    "CREATE{}{} INDEX {} ON {}",
                    unique_option,
                    clustered_option,
                    dialect.quote_ident(&index.name),
                    dialect.quote_table(table),
                )
            };
            ddl.push_str(&format!(" ({}){}", columns.join(", "), option_definition));
            ddl
        }
        _ => {
            let mut ddl = format!(
                "ALTER TABLE {} ADD {}",
                dialect.quote_table(table),
                index.index_type
            );
            if !index.primary {
                ddl.push_str(&format!(" {}", dialect.quote_ident(&index.name)));
            }
            ddl.push_str(&format!(" ({}){}", columns.join(", "), option_definition));
            ddl
        }
    }
}

/// Renders index options: MySQL uses the first option as a bare
/// `name value` pair (prefixing `parser` with `WITH`), MSSQL renders the
/// whole list as `WITH (name = value, ...)` mapping booleans to ON/OFF.
pub(crate) fn generate_index_option_definition(
    dialect: Dialect,
    index_options: &[IndexOption],
) -> String {
    if index_options.is_empty() {
        return String::new();
    }
    match dialect {
        Dialect::Mysql => {
            let index_option = &index_options[0];
            let option_name = if index_option.name == "parser" {
                format!("WITH {}", index_option.name)
            } else {
                index_option.name.clone()
            };
            format!(" {} {}", option_name, index_option.value.raw())
        }
        Dialect::Mssql => {
            let options: Vec<String> = index_options
                .iter()
                .map(|index_option| {
                    let option_value = match &index_option.value {
                        Value::Bool { raw, .. } => {
                            if raw == "true" {
                                "ON".to_string()
                            } else {
                                "OFF".to_string()
                            }
                        }
                        other => other.raw().to_string(),
                    };
                    format!("{} = {}", index_option.name, option_value)
                })
                .collect();
            format!(" WITH ({})", options.join(", "))
        }
        Dialect::Postgres | Dialect::Sqlite => String::new(),
    }
}

/// Renders a foreign-key constraint body for `ALTER TABLE ... ADD`.
pub(crate) fn generate_foreign_key_definition(dialect: Dialect, foreign_key: &ForeignKey) -> String {
    // An empty constraint name is rejected before this point.
    let mut definition = format!(
        "CONSTRAINT {} FOREIGN KEY ",
        dialect.quote_ident(&foreign_key.constraint_name)
    );

    if !foreign_key.index_name.is_empty() {
        definition.push_str(&format!("{} ", dialect.quote_ident(&foreign_key.index_name)));
    }

    let index_columns: Vec<String> = foreign_key
        .index_columns
        .iter()
        .map(|column| dialect.quote_ident(column))
        .collect();
    let reference_columns: Vec<String> = foreign_key
        .reference_columns
        .iter()
        .map(|column| dialect.quote_ident(column))
        .collect();

    definition.push_str(&format!(
        "({}) REFERENCES {} ({}) ",
        index_columns.join(","),
        dialect.quote_ident(&foreign_key.reference_name),
        reference_columns.join(","),
    ));

    if !foreign_key.on_delete.is_empty() {
        definition.push_str(&format!("ON DELETE {} ", foreign_key.on_delete));
    }
    if !foreign_key.on_update.is_empty() {
        definition.push_str(&format!("ON UPDATE {} ", foreign_key.on_update));
    }

    definition.trim_end().to_string()
}

/// Renders the statement dropping an index.
pub(crate) fn generate_drop_index(dialect: Dialect, table_name: &str, index_name: &str) -> String {
    match dialect {
        Dialect::Mysql => format!(
            "ALTER TABLE {} DROP INDEX {}",
            dialect.quote_table(table_name),
            dialect.quote_ident(index_name)
        ),
        Dialect::Postgres | Dialect::Sqlite => {
            format!("DROP INDEX {}", dialect.quote_ident(index_name))
        }
        Dialect::Mssql => format!(
            "DROP INDEX {} ON {}",
            dialect.quote_ident(index_name),
            dialect.quote_table(table_name)
        ),
    }
}

/// Renders the option list of a `GENERATED ... AS IDENTITY` sequence.
pub(crate) fn generate_sequence_clause(sequence: &Sequence) -> String {
    let mut ddl = String::new();
    if !sequence.name.is_empty() {
        ddl.push_str(&format!("SEQUENCE NAME {} ", sequence.name));
    }
    if let Some(start_with) = sequence.start_with {
        ddl.push_str(&format!("START WITH {start_with} "));
    }
    if let Some(increment_by) = sequence.increment_by {
        ddl.push_str(&format!("INCREMENT BY {increment_by} "));
    }
    if let Some(min_value) = sequence.min_value {
        ddl.push_str(&format!("MINVALUE {min_value} "));
    }
    if sequence.no_min_value {
        ddl.push_str("NO MINVALUE ");
    }
    if let Some(max_value) = sequence.max_value {
        ddl.push_str(&format!("MAXVALUE {max_value} "));
    }
    if sequence.no_max_value {
        ddl.push_str("NO MAXVALUE ");
    }
    if let Some(cache) = sequence.cache {
        ddl.push_str(&format!("CACHE {cache} "));
    }
    if sequence.cycle {
        ddl.push_str("CYCLE ");
    }
    if sequence.no_cycle {
        ddl.push_str("NO CYCLE ");
    }
    ddl.trim_end().to_string()
}

/// Renders a `DEFAULT ...` clause for the given literal.
pub(crate) fn generate_default_definition(default: &Value, column: &str) -> Result<String> {
    match default {
        Value::Str { value, .. } => Ok(format!("DEFAULT '{value}'")),
        Value::Int { value, .. } => Ok(format!("DEFAULT {value}")),
        Value::Float { value, .. } => Ok(format!("DEFAULT {value}")),
        Value::Bit { value, .. } => {
            if *value {
                Ok("DEFAULT b'1'".to_string())
            } else {
                Ok("DEFAULT b'0'".to_string())
            }
        }
        // NULL, CURRENT_TIMESTAMP, ...
        Value::ValArg { raw } => Ok(format!("DEFAULT {raw}")),
        other => Err(DiffError::UnsupportedDefaultValueKind {
            raw: other.raw().to_string(),
            column: column.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::IndexColumn;

    fn int(value: i64) -> Value {
        Value::Int {
            raw: value.to_string(),
            value,
        }
    }

    #[test]
    fn data_type_rendering() {
        let varchar = Column {
            type_name: "varchar".to_string(),
            length: Some(int(40)),
            ..Column::default()
        };
        assert_eq!(generate_data_type(&varchar), "varchar(40)");

        let numeric = Column {
            type_name: "numeric".to_string(),
            length: Some(int(5)),
            scale: Some(int(2)),
            ..Column::default()
        };
        assert_eq!(generate_data_type(&numeric), "numeric(5, 2)");

        let array = Column {
            type_name: "integer".to_string(),
            array: true,
            ..Column::default()
        };
        assert_eq!(generate_data_type(&array), "integer[]");

        let status = Column {
            type_name: "enum".to_string(),
            enum_values: vec!["'active'".to_string(), "'retired'".to_string()],
            ..Column::default()
        };
        assert_eq!(generate_data_type(&status), "enum('active', 'retired')");
    }

    #[test]
    fn column_definition_orders_clauses() {
        let column = Column {
            name: "age".to_string(),
            type_name: "int".to_string(),
            unsigned: true,
            not_null: Some(true),
            default_def: Some(crate::schema::DefaultDefinition {
                value: int(20),
                constraint_name: None,
            }),
            ..Column::default()
        };
        assert_eq!(
            generate_column_definition(Dialect::Mysql, &column, true).unwrap(),
            "`age` int UNSIGNED NOT NULL DEFAULT 20"
        );
    }

    #[test]
    fn unique_keyword_suppressed_when_disabled() {
        let column = Column {
            name: "email".to_string(),
            type_name: "varchar".to_string(),
            length: Some(int(255)),
            key_option: ColumnKeyOption::Unique,
            ..Column::default()
        };
        assert_eq!(
            generate_column_definition(Dialect::Mysql, &column, true).unwrap(),
            "`email` varchar(255) UNIQUE"
        );
        assert_eq!(
            generate_column_definition(Dialect::Mysql, &column, false).unwrap(),
            "`email` varchar(255)"
        );
    }

    #[test]
    fn mssql_identity_rendering() {
        let column = Column {
            name: "id".to_string(),
            type_name: "integer".to_string(),
            key_option: ColumnKeyOption::Primary,
            sequence: Some(Sequence {
                start_with: Some(1),
                increment_by: Some(1),
                ..Sequence::default()
            }),
            ..Column::default()
        };
        assert_eq!(
            generate_column_definition(Dialect::Mssql, &column, true).unwrap(),
            "[id] integer NOT NULL IDENTITY(1,1)"
        );
    }

    #[test]
    fn add_index_mssql_primary_vs_secondary() {
        let primary = Index {
            name: "PRIMARY".to_string(),
            index_type: "primary key".to_string(),
            columns: vec![IndexColumn {
                column: "id".to_string(),
                length: None,
            }],
            primary: true,
            unique: true,
            where_clause: String::new(),
            clustered: true,
            options: vec![],
        };
        assert_eq!(
            generate_add_index(Dialect::Mssql, "users", &primary),
            "ALTER TABLE [dbo].[users] ADD primary key CLUSTERED ([id])"
        );

        let secondary = Index {
            name: "ix_age".to_string(),
            index_type: String::new(),
            columns: vec![IndexColumn {
                column: "age".to_string(),
                length: None,
            }],
            primary: false,
            unique: true,
            where_clause: String::new(),
            clustered: false,
            options: vec![],
        };
        assert_eq!(
            generate_add_index(Dialect::Mssql, "users", &secondary),
            "CREATE UNIQUE NONCLUSTERED INDEX [ix_age] ON [dbo].[users] ([age])"
        );
    }

    #[test]
    fn drop_index_per_dialect() {
        assert_eq!(
            generate_drop_index(Dialect::Mysql, "users", "ix"),
            "ALTER TABLE `users` DROP INDEX `ix`"
        );
        assert_eq!(
            generate_drop_index(Dialect::Postgres, "users", "ix"),
            "DROP INDEX \"ix\""
        );
        assert_eq!(
            generate_drop_index(Dialect::Mssql, "users", "ix"),
            "DROP INDEX [ix] ON [dbo].[users]"
        );
    }

    #[test]
    fn foreign_key_definition() {
        let foreign_key = ForeignKey {
            constraint_name: "posts_ibfk_1".to_string(),
            index_name: String::new(),
            index_columns: vec!["user_id".to_string()],
            reference_name: "users".to_string(),
            reference_columns: vec!["id".to_string()],
            on_delete: "SET NULL".to_string(),
            on_update: "CASCADE".to_string(),
        };
        assert_eq!(
            generate_foreign_key_definition(Dialect::Mssql, &foreign_key),
            "CONSTRAINT [posts_ibfk_1] FOREIGN KEY ([user_id]) REFERENCES [users] ([id]) \
             ON DELETE SET NULL ON UPDATE CASCADE"
        );
    }

    #[test]
    fn default_definition_kinds() {
        assert_eq!(
            generate_default_definition(
                &Value::Str {
                    raw: "JPN".to_string(),
                    value: "JPN".to_string()
                },
                "c"
            )
            .unwrap(),
            "DEFAULT 'JPN'"
        );
        assert_eq!(
            generate_default_definition(
                &Value::Bit {
                    raw: "1".to_string(),
                    value: true
                },
                "c"
            )
            .unwrap(),
            "DEFAULT b'1'"
        );
        assert_eq!(
            generate_default_definition(
                &Value::ValArg {
                    raw: "CURRENT_TIMESTAMP".to_string()
                },
                "c"
            )
            .unwrap(),
            "DEFAULT CURRENT_TIMESTAMP"
        );
        let err = generate_default_definition(
            &Value::Hex {
                raw: "x'FF'".to_string(),
            },
            "c",
        )
        .unwrap_err();
        assert!(matches!(err, DiffError::UnsupportedDefaultValueKind { .. }));
    }

    #[test]
    fn sequence_clause() {
        let sequence = Sequence {
            start_with: Some(100),
            increment_by: Some(2),
            cycle: true,
            ..Sequence::default()
        };
        assert_eq!(
            generate_sequence_clause(&sequence),
            "START WITH 100 INCREMENT BY 2 CYCLE"
        );
    }
}
