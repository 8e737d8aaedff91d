//! SQL tokenizer for the DDL parser.
//!
//! Two layers: [`split_statements`] cuts a script into statements on
//! top-level semicolons (honoring quotes, brackets and comments), and
//! [`Lexer`] turns one statement into tokens. Tokens carry byte spans so
//! the parser can capture raw expression text (check bodies, partial-index
//! predicates, view definitions) verbatim.

/// A lexed token with its byte span in the statement text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was lexed.
    pub kind: TokenKind,
    /// Start byte offset in the statement.
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

/// Token kinds. Keywords are not distinguished from identifiers here;
/// the parser matches words case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A bare word: keyword, identifier or function name.
    Word(String),
    /// A quoted identifier with the quotes stripped (`` `x` ``, `"x"`,
    /// `[x]`).
    Quoted(String),
    /// A numeric literal, kept as text.
    Number(String),
    /// A string literal with the quotes stripped and escapes resolved.
    Str(String),
    /// A bit-string literal `b'...'`, contents only.
    BitStr(String),
    /// A hex-string literal `x'...'`, contents only.
    HexStr(String),
    /// A single punctuation character.
    Punct(char),
}

/// Splits a script into statements on top-level semicolons.
///
/// Strings, quoted identifiers, bracket quoting, parentheses and both
/// comment forms are honored; returned statements are trimmed and carry
/// no trailing semicolon. Empty statements are dropped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ';' => {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    statements.push(trimmed.to_string());
                }
                current.clear();
            }
            '\'' | '"' | '`' => {
                current.push(c);
                for inner in chars.by_ref() {
                    current.push(inner);
                    if inner == c {
                        break;
                    }
                }
            }
            '[' => {
                current.push(c);
                for inner in chars.by_ref() {
                    current.push(inner);
                    if inner == ']' {
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            _ => current.push(c),
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    statements
}

/// A lexer over a single statement.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer for the given statement text.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenizes the whole statement.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        self.skip_whitespace();
        let start = self.pos;
        let c = self.peek()?;

        match c {
            '\'' => Some(self.scan_string(start, TokenKind::Str)),
            '"' | '`' => Some(self.scan_quoted(start, c)),
            '[' => Some(self.scan_bracket_quoted(start)),
            c if c.is_ascii_digit() => Some(self.scan_number(start)),
            c if c.is_alphanumeric() || c == '_' => Some(self.scan_word(start)),
            _ => {
                self.advance();
                Some(Token {
                    kind: TokenKind::Punct(c),
                    start,
                    end: self.pos,
                })
            }
        }
    }

    fn scan_string(&mut self, start: usize, make: fn(String) -> TokenKind) -> Token {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                Some('\'') => {
                    // Doubled quote is an escaped quote.
                    if self.peek() == Some('\'') {
                        self.advance();
                        value.push('\'');
                    } else {
                        break;
                    }
                }
                Some(c) => value.push(c),
                None => break,
            }
        }
        Token {
            kind: make(value),
            start,
            end: self.pos,
        }
    }

    fn scan_quoted(&mut self, start: usize, quote: char) -> Token {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        self.advance();
                        value.push(quote);
                    } else {
                        break;
                    }
                }
                Some(c) => value.push(c),
                None => break,
            }
        }
        Token {
            kind: TokenKind::Quoted(value),
            start,
            end: self.pos,
        }
    }

    fn scan_bracket_quoted(&mut self, start: usize) -> Token {
        self.advance(); // [
        let mut value = String::new();
        loop {
            match self.advance() {
                Some(']') | None => break,
                Some(c) => value.push(c),
            }
        }
        Token {
            kind: TokenKind::Quoted(value),
            start,
            end: self.pos,
        }
    }

    fn scan_number(&mut self, start: usize) -> Token {
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.advance();
        }
        Token {
            kind: TokenKind::Number(self.input[start..self.pos].to_string()),
            start,
            end: self.pos,
        }
    }

    fn scan_word(&mut self, start: usize) -> Token {
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.advance();
        }
        let text = &self.input[start..self.pos];

        // b'...' and x'...' literal prefixes.
        if self.peek() == Some('\'') {
            if text.eq_ignore_ascii_case("b") {
                let token = self.scan_string(start, TokenKind::BitStr);
                return Token { start, ..token };
            }
            if text.eq_ignore_ascii_case("x") {
                let token = self.scan_string(start, TokenKind::HexStr);
                return Token { start, ..token };
            }
        }

        Token {
            kind: TokenKind::Word(text.to_string()),
            start,
            end: self.pos,
        }
    }
}
