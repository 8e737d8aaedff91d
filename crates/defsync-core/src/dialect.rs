//! SQL dialect selection.
//!
//! The [`Dialect`] parameterizes identifier quoting, schema qualification,
//! data-type normalization and which emission branches of the diff engine
//! fire. It deliberately models dialect *families* rather than exact engine
//! versions: anything speaking MySQL syntax picks [`Dialect::Mysql`], and so
//! on.

/// The SQL flavor governing comparison and emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// MySQL, MariaDB and friends: backquote quoting, `CHANGE COLUMN`,
    /// `AUTO_INCREMENT` handling.
    Mysql,
    /// PostgreSQL: double-quote quoting, `public` schema default,
    /// per-property `ALTER COLUMN` statements, policies and identities.
    Postgres,
    /// SQLite: backquote quoting, no schema qualification, view
    /// replacement via drop-and-create.
    Sqlite,
    /// Microsoft SQL Server: bracket quoting, `dbo` schema default,
    /// named default constraints, clustered indexes.
    Mssql,
}

impl Dialect {
    /// Quotes a bare SQL identifier (column, index, constraint).
    #[must_use]
    pub fn quote_ident(self, name: &str) -> String {
        match self {
            Dialect::Postgres => format!("\"{name}\""),
            Dialect::Mssql => format!("[{name}]"),
            Dialect::Mysql | Dialect::Sqlite => format!("`{name}`"),
        }
    }

    /// Quotes a possibly schema-qualified table name.
    ///
    /// Postgres and MSSQL qualify unqualified names with their default
    /// schema (`public` and `dbo`); the other dialects leave names bare.
    #[must_use]
    pub fn quote_table(self, name: &str) -> String {
        match self {
            Dialect::Postgres | Dialect::Mssql => {
                let (schema, table) = match name.split_once('.') {
                    Some((schema, table)) => (schema, table),
                    None => (self.default_schema(), name),
                };
                format!("{}.{}", self.quote_ident(schema), self.quote_ident(table))
            }
            Dialect::Mysql | Dialect::Sqlite => self.quote_ident(name),
        }
    }

    /// The schema implicitly prepended to unqualified table names.
    #[must_use]
    pub fn default_schema(self) -> &'static str {
        match self {
            Dialect::Postgres => "public",
            Dialect::Mssql => "dbo",
            Dialect::Mysql | Dialect::Sqlite => "",
        }
    }

    /// Normalizes a data type name for comparison.
    ///
    /// A fixed alias table folds synonymous type spellings together;
    /// MySQL additionally folds `boolean` into `tinyint`.
    #[must_use]
    pub fn normalize_data_type(self, type_name: &str) -> &str {
        let normalized = match type_name {
            "bool" => "boolean",
            "int" => "integer",
            "char" => "character",
            "varchar" => "character varying",
            other => other,
        };
        if self == Dialect::Mysql && normalized == "boolean" {
            "tinyint"
        } else {
            normalized
        }
    }

    /// Normalizes an ON UPDATE / ON DELETE referential action for
    /// comparison. Postgres and MSSQL report `NO ACTION` for an
    /// unspecified action, so an empty string is folded into it there.
    #[must_use]
    pub fn normalize_ref_action(self, action: &str) -> &str {
        match self {
            Dialect::Postgres | Dialect::Mssql if action.is_empty() => "NO ACTION",
            _ => action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_per_dialect() {
        assert_eq!(Dialect::Mysql.quote_ident("users"), "`users`");
        assert_eq!(Dialect::Postgres.quote_ident("users"), "\"users\"");
        assert_eq!(Dialect::Mssql.quote_ident("users"), "[users]");
    }

    #[test]
    fn table_quoting_applies_default_schema() {
        assert_eq!(Dialect::Postgres.quote_table("users"), "\"public\".\"users\"");
        assert_eq!(Dialect::Mssql.quote_table("users"), "[dbo].[users]");
        assert_eq!(Dialect::Mssql.quote_table("app.users"), "[app].[users]");
        assert_eq!(Dialect::Mysql.quote_table("users"), "`users`");
    }

    #[test]
    fn data_type_aliases() {
        assert_eq!(Dialect::Postgres.normalize_data_type("int"), "integer");
        assert_eq!(
            Dialect::Postgres.normalize_data_type("varchar"),
            "character varying"
        );
        assert_eq!(Dialect::Postgres.normalize_data_type("bool"), "boolean");
        // MySQL folds boolean all the way down to tinyint.
        assert_eq!(Dialect::Mysql.normalize_data_type("bool"), "tinyint");
        assert_eq!(Dialect::Mysql.normalize_data_type("boolean"), "tinyint");
    }

    #[test]
    fn ref_action_normalization() {
        assert_eq!(Dialect::Postgres.normalize_ref_action(""), "NO ACTION");
        assert_eq!(Dialect::Mssql.normalize_ref_action(""), "NO ACTION");
        assert_eq!(Dialect::Mysql.normalize_ref_action(""), "");
        assert_eq!(Dialect::Postgres.normalize_ref_action("CASCADE"), "CASCADE");
    }
}
