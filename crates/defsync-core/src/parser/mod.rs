//! Recursive-descent parser for the DDL subset the diff engine consumes.
//!
//! The grammar covers what declarative schema files and introspected
//! schemas actually contain: `CREATE TABLE`, `CREATE INDEX`,
//! `ALTER TABLE ADD {INDEX,PRIMARY KEY,FOREIGN KEY}`, `CREATE POLICY`
//! and `CREATE VIEW`. Anything else is an unsupported statement, never a
//! silent skip. Raw statement text is preserved on every parsed value so
//! the emitter can re-emit it verbatim.

use crate::ddl::DdlStatement;
use crate::lexer::{split_statements, Lexer, Token, TokenKind};
use crate::schema::{
    CheckDefinition, Column, ColumnKeyOption, DefaultDefinition, ForeignKey, Index, IndexColumn,
    IndexOption, Policy, Sequence, Table, Value, View,
};

/// Errors produced while parsing DDL text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A statement kind the parser does not classify.
    #[error("unsupported statement: '{0}'")]
    UnsupportedStatement(String),

    /// A malformed statement of a supported kind.
    #[error("syntax error in '{statement}': {message}")]
    Syntax {
        /// The offending statement text.
        statement: String,
        /// What went wrong.
        message: String,
    },
}

type Result<T> = std::result::Result<T, ParseError>;

/// Parses a script into classified DDL statements.
pub fn parse_ddls(sql: &str) -> Result<Vec<DdlStatement>> {
    split_statements(sql)
        .iter()
        .map(|statement| parse_statement(statement))
        .collect()
}

fn parse_statement(statement: &str) -> Result<DdlStatement> {
    let tokens = Lexer::new(statement).tokenize();
    let mut parser = Parser {
        statement,
        tokens,
        pos: 0,
    };

    if parser.accept_word("CREATE") {
        if parser.accept_word("TABLE") {
            return parser.parse_create_table();
        }
        if parser.accept_word("VIEW") {
            return parser.parse_create_view();
        }
        if parser.accept_word("OR") {
            parser.expect_word("REPLACE")?;
            parser.expect_word("VIEW")?;
            return parser.parse_create_view();
        }
        if parser.accept_word("POLICY") {
            return parser.parse_create_policy();
        }

        let mut unique = false;
        let mut clustered = false;
        loop {
            if parser.accept_word("UNIQUE") {
                unique = true;
            } else if parser.accept_word("CLUSTERED") {
                clustered = true;
            } else if parser.accept_word("NONCLUSTERED") {
                clustered = false;
            } else {
                break;
            }
        }
        if parser.accept_word("INDEX") {
            return parser.parse_create_index(unique, clustered);
        }
    } else if parser.accept_word("ALTER") {
        parser.expect_word("TABLE")?;
        return parser.parse_alter_table();
    }

    Err(ParseError::UnsupportedStatement(statement.to_string()))
}

struct Parser<'a> {
    statement: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_word(&self) -> Option<&str> {
        match self.peek_kind() {
            Some(TokenKind::Word(word)) => Some(word.as_str()),
            _ => None,
        }
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn accept_word(&mut self, word: &str) -> bool {
        if self.peek_word().is_some_and(|w| w.eq_ignore_ascii_case(word)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn accept_punct(&mut self, punct: char) -> bool {
        if matches!(self.peek_kind(), Some(TokenKind::Punct(c)) if *c == punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<()> {
        if self.accept_word(word) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {word}")))
        }
    }

    fn expect_punct(&mut self, punct: char) -> Result<Token> {
        if matches!(self.peek_kind(), Some(TokenKind::Punct(c)) if *c == punct) {
            Ok(self.bump().expect("peeked"))
        } else {
            Err(self.error(&format!("expected '{punct}'")))
        }
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError::Syntax {
            statement: self.statement.to_string(),
            message: message.to_string(),
        }
    }

    /// A bare or quoted identifier.
    fn parse_name(&mut self) -> Result<String> {
        match self.peek_kind() {
            Some(TokenKind::Word(word)) => {
                let word = word.clone();
                self.pos += 1;
                Ok(word)
            }
            Some(TokenKind::Quoted(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    /// `name` or `schema.name`, joined with a dot as written.
    fn parse_qualified_name(&mut self) -> Result<String> {
        let mut name = self.parse_name()?;
        while self.accept_punct('.') {
            name.push('.');
            name.push_str(&self.parse_name()?);
        }
        Ok(name)
    }

    fn parse_i64(&mut self) -> Result<i64> {
        match self.peek_kind() {
            Some(TokenKind::Number(text)) => {
                let parsed = text
                    .parse()
                    .map_err(|_| self.error("expected an integer"))?;
                self.pos += 1;
                Ok(parsed)
            }
            _ => Err(self.error("expected a number")),
        }
    }

    /// Consumes a balanced `( ... )` group, returning the raw inner text.
    fn capture_parens(&mut self) -> Result<String> {
        let open = self.expect_punct('(')?;
        let mut depth = 1usize;
        loop {
            let Some(token) = self.bump() else {
                return Err(self.error("unbalanced parentheses"));
            };
            match token.kind {
                TokenKind::Punct('(') => depth += 1,
                TokenKind::Punct(')') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.statement[open.end..token.start].trim().to_string());
                    }
                }
                _ => {}
            }
        }
    }

    // ------------------------------------------------------------------
    // CREATE TABLE
    // ------------------------------------------------------------------

    fn parse_create_table(&mut self) -> Result<DdlStatement> {
        if self.accept_word("IF") {
            self.expect_word("NOT")?;
            self.expect_word("EXISTS")?;
        }
        let name = self.parse_qualified_name()?;
        self.expect_punct('(')?;

        let mut table = Table {
            name,
            ..Table::default()
        };

        loop {
            if self.is_table_constraint() {
                self.parse_table_constraint(&mut table)?;
            } else {
                let column = self.parse_column()?;
                table.columns.push(column);
            }

            if self.accept_punct(',') {
                continue;
            }
            self.expect_punct(')')?;
            break;
        }

        for (position, column) in table.columns.iter_mut().enumerate() {
            column.position = position;
        }

        // Table options (ENGINE=, charset, ...) do not affect diffing.
        Ok(DdlStatement::CreateTable {
            statement: self.statement.to_string(),
            table,
        })
    }

    fn is_table_constraint(&self) -> bool {
        let Some(word) = self.peek_word() else {
            return false;
        };
        let word = word.to_ascii_lowercase();
        match word.as_str() {
            "constraint" | "primary" | "foreign" => true,
            // KEY/INDEX/UNIQUE open a table constraint only when followed
            // by something other than a data type, which a column of that
            // name would require.
            "unique" | "key" | "index" => true,
            _ => false,
        }
    }

    fn parse_table_constraint(&mut self, table: &mut Table) -> Result<()> {
        let constraint_name = if self.accept_word("CONSTRAINT") {
            Some(self.parse_name()?)
        } else {
            None
        };

        if self.accept_word("PRIMARY") {
            self.expect_word("KEY")?;
            let mut clustered = true;
            if self.accept_word("NONCLUSTERED") {
                clustered = false;
            } else {
                self.accept_word("CLUSTERED");
            }
            let columns = self.parse_index_columns()?;
            table.indexes.push(Index {
                name: constraint_name.unwrap_or_else(|| "PRIMARY".to_string()),
                index_type: "primary key".to_string(),
                columns,
                primary: true,
                unique: true,
                where_clause: String::new(),
                clustered,
                options: vec![],
            });
            return Ok(());
        }

        if self.accept_word("UNIQUE") {
            let mut index_type = "unique".to_string();
            if self.accept_word("KEY") {
                index_type.push_str(" key");
            } else if self.accept_word("INDEX") {
                index_type.push_str(" index");
            }
            let mut clustered = false;
            if self.accept_word("CLUSTERED") {
                clustered = true;
            } else {
                self.accept_word("NONCLUSTERED");
            }
            let name = if matches!(self.peek_kind(), Some(TokenKind::Punct('('))) {
                None
            } else {
                Some(self.parse_name()?)
            };
            let columns = self.parse_index_columns()?;
            let name = constraint_name
                .or(name)
                .unwrap_or_else(|| columns[0].column.clone());
            table.indexes.push(Index {
                name,
                index_type,
                columns,
                primary: false,
                unique: true,
                where_clause: String::new(),
                clustered,
                options: vec![],
            });
            return Ok(());
        }

        if self.accept_word("FOREIGN") {
            self.expect_word("KEY")?;
            let foreign_key = self.parse_foreign_key_tail(constraint_name.unwrap_or_default())?;
            table.foreign_keys.push(foreign_key);
            return Ok(());
        }

        if self.accept_word("KEY") || self.accept_word("INDEX") {
            let name = self.parse_name()?;
            if self.accept_word("USING") {
                self.parse_name()?;
            }
            let columns = self.parse_index_columns()?;
            table.indexes.push(Index {
                name,
                index_type: "key".to_string(),
                columns,
                primary: false,
                unique: false,
                where_clause: String::new(),
                clustered: false,
                options: vec![],
            });
            return Ok(());
        }

        Err(self.error("expected a table constraint"))
    }

    fn parse_index_columns(&mut self) -> Result<Vec<IndexColumn>> {
        self.expect_punct('(')?;
        let mut columns = Vec::new();
        loop {
            let column = self.parse_name()?;
            let length = if self.accept_punct('(') {
                let length = self.parse_i64()?;
                self.expect_punct(')')?;
                Some(length)
            } else {
                None
            };
            // Sort order is irrelevant to diffing.
            let _ = self.accept_word("ASC") || self.accept_word("DESC");
            columns.push(IndexColumn { column, length });

            if self.accept_punct(',') {
                continue;
            }
            self.expect_punct(')')?;
            break;
        }
        Ok(columns)
    }

    // ------------------------------------------------------------------
    // Columns
    // ------------------------------------------------------------------

    fn parse_column(&mut self) -> Result<Column> {
        let name = self.parse_name()?;
        let mut column = Column {
            name,
            ..Column::default()
        };
        self.parse_data_type(&mut column)?;

        loop {
            match self.peek_kind() {
                Some(TokenKind::Punct(',')) | Some(TokenKind::Punct(')')) | None => break,
                _ => {}
            }
            self.parse_column_attribute(&mut column)?;
        }

        Ok(column)
    }

    fn parse_data_type(&mut self, column: &mut Column) -> Result<()> {
        let mut type_name = self.parse_name()?.to_ascii_lowercase();
        if (type_name == "character" && self.accept_word("VARYING"))
            || (type_name == "double" && self.accept_word("PRECISION"))
        {
            let second = if type_name == "character" {
                "varying"
            } else {
                "precision"
            };
            type_name.push(' ');
            type_name.push_str(second);
        }
        column.type_name = type_name;

        if self.accept_punct('(') {
            if column.type_name == "enum" || column.type_name == "set" {
                loop {
                    match self.bump().map(|t| t.kind) {
                        Some(TokenKind::Str(value)) => {
                            column.enum_values.push(format!("'{value}'"));
                        }
                        _ => return Err(self.error("expected an enum value")),
                    }
                    if self.accept_punct(',') {
                        continue;
                    }
                    self.expect_punct(')')?;
                    break;
                }
            } else {
                column.length = Some(self.parse_type_parameter()?);
                if self.accept_punct(',') {
                    column.scale = Some(self.parse_type_parameter()?);
                }
                self.expect_punct(')')?;
            }
        }

        // `timestamp with time zone` / `time without time zone`
        if self.peek_word().is_some_and(|w| w.eq_ignore_ascii_case("WITH")) {
            let mark = self.pos;
            self.pos += 1;
            if self.accept_word("TIME") && self.accept_word("ZONE") {
                column.timezone = true;
            } else {
                self.pos = mark;
            }
        } else if self
            .peek_word()
            .is_some_and(|w| w.eq_ignore_ascii_case("WITHOUT"))
        {
            let mark = self.pos;
            self.pos += 1;
            if !(self.accept_word("TIME") && self.accept_word("ZONE")) {
                self.pos = mark;
            }
        }

        // `[]` array suffix lexes as an empty quoted identifier.
        if matches!(self.peek_kind(), Some(TokenKind::Quoted(q)) if q.is_empty()) {
            self.pos += 1;
            column.array = true;
        }

        Ok(())
    }

    fn parse_type_parameter(&mut self) -> Result<Value> {
        match self.peek_kind() {
            Some(TokenKind::Number(_)) => self.parse_value(),
            // varchar(max) and friends
            Some(TokenKind::Word(word)) => {
                let raw = word.clone();
                self.pos += 1;
                Ok(Value::ValArg { raw })
            }
            _ => Err(self.error("expected a type parameter")),
        }
    }

    fn parse_column_attribute(&mut self, column: &mut Column) -> Result<()> {
        let Some(word) = self.peek_word().map(str::to_ascii_lowercase) else {
            return Err(self.error("expected a column attribute"));
        };

        match word.as_str() {
            "not" => {
                self.pos += 1;
                self.expect_word("NULL")?;
                column.not_null = Some(true);
            }
            "null" => {
                self.pos += 1;
                column.not_null = Some(false);
            }
            "default" => {
                self.pos += 1;
                column.default_def = Some(DefaultDefinition {
                    value: self.parse_value()?,
                    constraint_name: None,
                });
            }
            "constraint" => {
                self.pos += 1;
                let constraint_name = self.parse_name()?;
                if self.accept_word("DEFAULT") {
                    column.default_def = Some(DefaultDefinition {
                        value: self.parse_value()?,
                        constraint_name: Some(constraint_name),
                    });
                } else if self.accept_word("CHECK") {
                    self.parse_check(column, Some(constraint_name))?;
                } else if self.accept_word("PRIMARY") {
                    self.expect_word("KEY")?;
                    column.key_option = ColumnKeyOption::Primary;
                } else {
                    return Err(self.error("expected DEFAULT, CHECK or PRIMARY KEY"));
                }
            }
            "auto_increment" | "autoincrement" => {
                self.pos += 1;
                column.auto_increment = true;
            }
            "unsigned" => {
                self.pos += 1;
                column.unsigned = true;
            }
            "zerofill" => {
                self.pos += 1;
            }
            "character" => {
                self.pos += 1;
                self.expect_word("SET")?;
                column.charset = Some(self.parse_name()?);
            }
            "charset" => {
                self.pos += 1;
                column.charset = Some(self.parse_name()?);
            }
            "collate" => {
                self.pos += 1;
                column.collate = Some(self.parse_name()?);
            }
            "primary" => {
                self.pos += 1;
                self.expect_word("KEY")?;
                column.key_option = ColumnKeyOption::Primary;
            }
            "unique" => {
                self.pos += 1;
                if self.accept_word("KEY") {
                    column.key_option = ColumnKeyOption::UniqueKey;
                } else {
                    column.key_option = ColumnKeyOption::Unique;
                }
            }
            "key" => {
                self.pos += 1;
                column.key_option = ColumnKeyOption::Key;
            }
            "spatial" => {
                self.pos += 1;
                self.expect_word("KEY")?;
                column.key_option = ColumnKeyOption::SpatialKey;
            }
            "check" => {
                self.pos += 1;
                self.parse_check(column, None)?;
            }
            "references" => {
                self.pos += 1;
                column.references = Some(self.parse_qualified_name()?);
                if matches!(self.peek_kind(), Some(TokenKind::Punct('('))) {
                    self.capture_parens()?;
                }
                while self.accept_word("ON") {
                    if !(self.accept_word("DELETE") || self.accept_word("UPDATE")) {
                        return Err(self.error("expected DELETE or UPDATE"));
                    }
                    self.parse_reference_action()?;
                }
            }
            "on" => {
                self.pos += 1;
                self.expect_word("UPDATE")?;
                column.on_update = Some(self.parse_value()?);
            }
            "identity" => {
                self.pos += 1;
                self.expect_punct('(')?;
                let start_with = self.parse_i64()?;
                self.expect_punct(',')?;
                let increment_by = self.parse_i64()?;
                self.expect_punct(')')?;
                column.sequence = Some(Sequence {
                    start_with: Some(start_with),
                    increment_by: Some(increment_by),
                    ..Sequence::default()
                });
            }
            "generated" => {
                self.pos += 1;
                let identity = if self.accept_word("ALWAYS") {
                    "ALWAYS".to_string()
                } else {
                    self.expect_word("BY")?;
                    self.expect_word("DEFAULT")?;
                    "BY DEFAULT".to_string()
                };
                self.expect_word("AS")?;
                self.expect_word("IDENTITY")?;
                column.identity = Some(identity);
                if matches!(self.peek_kind(), Some(TokenKind::Punct('('))) {
                    column.sequence = Some(self.parse_sequence_options()?);
                }
            }
            "comment" => {
                self.pos += 1;
                self.bump();
            }
            _ => return Err(self.error(&format!("unexpected '{word}' in column definition"))),
        }

        Ok(())
    }

    fn parse_check(&mut self, column: &mut Column, constraint_name: Option<String>) -> Result<()> {
        let definition = self.capture_parens()?;
        column.check = Some(CheckDefinition {
            definition,
            constraint_name,
        });
        if self.accept_word("NO") {
            self.expect_word("INHERIT")?;
            column.check_no_inherit = true;
        }
        Ok(())
    }

    fn parse_sequence_options(&mut self) -> Result<Sequence> {
        self.expect_punct('(')?;
        let mut sequence = Sequence::default();
        loop {
            if self.accept_punct(')') {
                break;
            }
            if self.accept_word("SEQUENCE") {
                self.expect_word("NAME")?;
                sequence.name = self.parse_qualified_name()?;
            } else if self.accept_word("START") {
                self.accept_word("WITH");
                sequence.start_with = Some(self.parse_i64()?);
            } else if self.accept_word("INCREMENT") {
                self.accept_word("BY");
                sequence.increment_by = Some(self.parse_i64()?);
            } else if self.accept_word("MINVALUE") {
                sequence.min_value = Some(self.parse_i64()?);
            } else if self.accept_word("MAXVALUE") {
                sequence.max_value = Some(self.parse_i64()?);
            } else if self.accept_word("CACHE") {
                sequence.cache = Some(self.parse_i64()?);
            } else if self.accept_word("NO") {
                if self.accept_word("MINVALUE") {
                    sequence.no_min_value = true;
                } else if self.accept_word("MAXVALUE") {
                    sequence.no_max_value = true;
                } else if self.accept_word("CYCLE") {
                    sequence.no_cycle = true;
                } else {
                    return Err(self.error("expected MINVALUE, MAXVALUE or CYCLE"));
                }
            } else if self.accept_word("CYCLE") {
                sequence.cycle = true;
            } else if self.accept_word("OWNED") {
                self.expect_word("BY")?;
                sequence.owned_by = self.parse_qualified_name()?;
            } else {
                return Err(self.error("unexpected sequence option"));
            }
        }
        Ok(sequence)
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    fn parse_value(&mut self) -> Result<Value> {
        let negative = self.accept_punct('-');
        let Some(token) = self.bump() else {
            return Err(self.error("expected a value"));
        };

        match token.kind {
            TokenKind::Number(text) => {
                let raw = if negative { format!("-{text}") } else { text };
                if raw.contains('.') {
                    let value = raw
                        .parse()
                        .map_err(|_| self.error("malformed float literal"))?;
                    Ok(Value::Float { raw, value })
                } else {
                    let value = raw
                        .parse()
                        .map_err(|_| self.error("malformed integer literal"))?;
                    Ok(Value::Int { raw, value })
                }
            }
            TokenKind::Str(value) => Ok(Value::Str {
                raw: value.clone(),
                value,
            }),
            TokenKind::BitStr(raw) => {
                let value = raw == "1";
                Ok(Value::Bit { raw, value })
            }
            TokenKind::HexStr(raw) => Ok(Value::Hex { raw }),
            TokenKind::Word(word) if negative => {
                Err(self.error(&format!("cannot negate '{word}'")))
            }
            TokenKind::Word(word) => {
                if word.eq_ignore_ascii_case("null") {
                    return Ok(Value::ValArg {
                        raw: "null".to_string(),
                    });
                }
                if word.eq_ignore_ascii_case("true") || word.eq_ignore_ascii_case("false") {
                    return Ok(Value::Bool {
                        raw: word.to_ascii_lowercase(),
                        value: word.eq_ignore_ascii_case("true"),
                    });
                }
                // Bareword argument, possibly a call: CURRENT_TIMESTAMP,
                // now(), (getdate()), ...
                if matches!(self.peek_kind(), Some(TokenKind::Punct('('))) {
                    self.capture_parens()?;
                    let end = self.tokens[self.pos - 1].end;
                    return Ok(Value::ValArg {
                        raw: self.statement[token.start..end].to_string(),
                    });
                }
                Ok(Value::ValArg { raw: word })
            }
            TokenKind::Punct('(') => {
                // Parenthesized default expression; keep the parens.
                let mut depth = 1usize;
                let start = token.start;
                loop {
                    let Some(inner) = self.bump() else {
                        return Err(self.error("unbalanced parentheses"));
                    };
                    match inner.kind {
                        TokenKind::Punct('(') => depth += 1,
                        TokenKind::Punct(')') => {
                            depth -= 1;
                            if depth == 0 {
                                return Ok(Value::ValArg {
                                    raw: self.statement[start..inner.end].to_string(),
                                });
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => Err(self.error("unexpected value")),
        }
    }

    fn parse_reference_action(&mut self) -> Result<String> {
        if self.accept_word("CASCADE") {
            Ok("CASCADE".to_string())
        } else if self.accept_word("RESTRICT") {
            Ok("RESTRICT".to_string())
        } else if self.accept_word("SET") {
            if self.accept_word("NULL") {
                Ok("SET NULL".to_string())
            } else {
                self.expect_word("DEFAULT")?;
                Ok("SET DEFAULT".to_string())
            }
        } else if self.accept_word("NO") {
            self.expect_word("ACTION")?;
            Ok("NO ACTION".to_string())
        } else {
            Err(self.error("expected a referential action"))
        }
    }

    // ------------------------------------------------------------------
    // CREATE INDEX
    // ------------------------------------------------------------------

    fn parse_create_index(&mut self, unique: bool, clustered: bool) -> Result<DdlStatement> {
        let name = self.parse_qualified_name()?;
        self.expect_word("ON")?;
        let table_name = self.parse_qualified_name()?;
        if self.accept_word("USING") {
            self.parse_name()?;
        }
        let columns = self.parse_index_columns()?;

        let mut where_clause = String::new();
        if self.accept_word("WHERE") {
            let start = self
                .tokens
                .get(self.pos)
                .map_or(self.statement.len(), |t| t.start);
            let mut end = self.statement.len();
            while let Some(token) = self.tokens.get(self.pos) {
                if matches!(&token.kind, TokenKind::Word(w) if w.eq_ignore_ascii_case("WITH")) {
                    end = token.start;
                    break;
                }
                self.pos += 1;
            }
            where_clause = self.statement[start..end].trim().to_string();
        }

        let mut options = Vec::new();
        if self.accept_word("WITH") {
            self.expect_punct('(')?;
            loop {
                let option_name = self.parse_name()?;
                self.expect_punct('=')?;
                let value = self.parse_option_value()?;
                options.push(IndexOption {
                    name: option_name,
                    value,
                });
                if self.accept_punct(',') {
                    continue;
                }
                self.expect_punct(')')?;
                break;
            }
        }

        Ok(DdlStatement::CreateIndex {
            statement: self.statement.to_string(),
            table_name,
            index: Index {
                name,
                index_type: String::new(),
                columns,
                primary: false,
                unique,
                where_clause,
                clustered,
                options,
            },
        })
    }

    /// Index option values spell booleans as ON/OFF.
    fn parse_option_value(&mut self) -> Result<Value> {
        if self.accept_word("ON") {
            return Ok(Value::Bool {
                raw: "true".to_string(),
                value: true,
            });
        }
        if self.accept_word("OFF") {
            return Ok(Value::Bool {
                raw: "false".to_string(),
                value: false,
            });
        }
        self.parse_value()
    }

    // ------------------------------------------------------------------
    // ALTER TABLE
    // ------------------------------------------------------------------

    fn parse_alter_table(&mut self) -> Result<DdlStatement> {
        let table_name = self.parse_qualified_name()?;
        self.expect_word("ADD")?;

        let constraint_name = if self.accept_word("CONSTRAINT") {
            Some(self.parse_name()?)
        } else {
            None
        };

        if self.accept_word("PRIMARY") {
            self.expect_word("KEY")?;
            let mut clustered = true;
            if self.accept_word("NONCLUSTERED") {
                clustered = false;
            } else {
                self.accept_word("CLUSTERED");
            }
            let columns = self.parse_index_columns()?;
            return Ok(DdlStatement::AddPrimaryKey {
                statement: self.statement.to_string(),
                table_name,
                index: Index {
                    name: constraint_name.unwrap_or_else(|| "PRIMARY".to_string()),
                    index_type: "primary key".to_string(),
                    columns,
                    primary: true,
                    unique: true,
                    where_clause: String::new(),
                    clustered,
                    options: vec![],
                },
            });
        }

        if self.accept_word("FOREIGN") {
            self.expect_word("KEY")?;
            let foreign_key = self.parse_foreign_key_tail(constraint_name.unwrap_or_default())?;
            return Ok(DdlStatement::AddForeignKey {
                statement: self.statement.to_string(),
                table_name,
                foreign_key,
            });
        }

        if self.accept_word("UNIQUE") {
            let _ = self.accept_word("KEY") || self.accept_word("INDEX");
            let mut clustered = false;
            if self.accept_word("CLUSTERED") {
                clustered = true;
            } else {
                self.accept_word("NONCLUSTERED");
            }
            let name = if matches!(self.peek_kind(), Some(TokenKind::Punct('('))) {
                None
            } else {
                Some(self.parse_name()?)
            };
            let columns = self.parse_index_columns()?;
            let name = constraint_name
                .or(name)
                .unwrap_or_else(|| columns[0].column.clone());
            return Ok(DdlStatement::AddIndex {
                statement: self.statement.to_string(),
                table_name,
                index: Index {
                    name,
                    index_type: String::new(),
                    columns,
                    primary: false,
                    unique: true,
                    where_clause: String::new(),
                    clustered,
                    options: vec![],
                },
            });
        }

        if self.accept_word("INDEX") || self.accept_word("KEY") {
            let name = self.parse_name()?;
            if self.accept_word("USING") {
                self.parse_name()?;
            }
            let columns = self.parse_index_columns()?;
            return Ok(DdlStatement::AddIndex {
                statement: self.statement.to_string(),
                table_name,
                index: Index {
                    name,
                    index_type: String::new(),
                    columns,
                    primary: false,
                    unique: false,
                    where_clause: String::new(),
                    clustered: false,
                    options: vec![],
                },
            });
        }

        Err(ParseError::UnsupportedStatement(self.statement.to_string()))
    }

    fn parse_foreign_key_tail(&mut self, constraint_name: String) -> Result<ForeignKey> {
        let index_name = if matches!(self.peek_kind(), Some(TokenKind::Punct('('))) {
            String::new()
        } else {
            self.parse_name()?
        };

        let index_columns = self.parse_name_list()?;
        self.expect_word("REFERENCES")?;
        let reference_name = self.parse_qualified_name()?;
        let reference_columns = if matches!(self.peek_kind(), Some(TokenKind::Punct('('))) {
            self.parse_name_list()?
        } else {
            vec![]
        };

        let mut on_delete = String::new();
        let mut on_update = String::new();
        while self.accept_word("ON") {
            if self.accept_word("DELETE") {
                on_delete = self.parse_reference_action()?;
            } else {
                self.expect_word("UPDATE")?;
                on_update = self.parse_reference_action()?;
            }
        }

        Ok(ForeignKey {
            constraint_name,
            index_name,
            index_columns,
            reference_name,
            reference_columns,
            on_delete,
            on_update,
        })
    }

    fn parse_name_list(&mut self) -> Result<Vec<String>> {
        self.expect_punct('(')?;
        let mut names = Vec::new();
        loop {
            names.push(self.parse_name()?);
            if self.accept_punct(',') {
                continue;
            }
            self.expect_punct(')')?;
            break;
        }
        Ok(names)
    }

    // ------------------------------------------------------------------
    // CREATE POLICY
    // ------------------------------------------------------------------

    fn parse_create_policy(&mut self) -> Result<DdlStatement> {
        let name = self.parse_name()?;
        self.expect_word("ON")?;
        let table_name = self.parse_qualified_name()?;

        let mut policy = Policy {
            name,
            reference_name: table_name.clone(),
            permissive: "PERMISSIVE".to_string(),
            scope: "ALL".to_string(),
            ..Policy::default()
        };

        loop {
            if self.accept_word("AS") {
                if self.accept_word("PERMISSIVE") {
                    policy.permissive = "PERMISSIVE".to_string();
                } else {
                    self.expect_word("RESTRICTIVE")?;
                    policy.permissive = "RESTRICTIVE".to_string();
                }
            } else if self.accept_word("FOR") {
                policy.scope = self.parse_name()?.to_ascii_uppercase();
            } else if self.accept_word("TO") {
                loop {
                    policy.roles.push(self.parse_name()?);
                    if !self.accept_punct(',') {
                        break;
                    }
                }
            } else if self.accept_word("USING") {
                policy.using = self.capture_parens()?;
            } else if self.accept_word("WITH") {
                self.expect_word("CHECK")?;
                policy.with_check = self.capture_parens()?;
            } else if self.peek_kind().is_none() {
                break;
            } else {
                return Err(self.error("unexpected policy clause"));
            }
        }

        Ok(DdlStatement::AddPolicy {
            statement: self.statement.to_string(),
            table_name,
            policy,
        })
    }

    // ------------------------------------------------------------------
    // CREATE VIEW
    // ------------------------------------------------------------------

    fn parse_create_view(&mut self) -> Result<DdlStatement> {
        let name = self.parse_qualified_name()?;
        self.expect_word("AS")?;
        let Some(token) = self.tokens.get(self.pos) else {
            return Err(self.error("expected a view body"));
        };
        let definition = self.statement[token.start..].trim().to_string();

        Ok(DdlStatement::CreateView(View {
            statement: self.statement.to_string(),
            name,
            definition,
        }))
    }
}
