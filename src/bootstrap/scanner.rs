//! Scanner that turns bootstrap source text into tokens.
//!
//! Only as much of the script grammar is understood as is needed to find
//! token boundaries reliably: comments, string, template and regular
//! expression literals are consumed whole so braces inside them never reach
//! the parser.

use super::token::{line_col, Span, Token, TokenKind};
use crate::error::ExtractionError;

/// Keywords after which a `/` starts a regular expression literal.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

/// Keywords whose parenthesised head is followed by a statement.
const STATEMENT_HEAD_KEYWORDS: &[&str] = &["if", "while", "for", "with"];

/// Scanner over bootstrap source text.
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    regex_allowed: bool,
    /// Previous token was `if`, `while`, `for` or `with`
    after_statement_keyword: bool,
    /// One entry per open `(`: whether it opened a statement head
    paren_heads: Vec<bool>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            regex_allowed: true,
            after_statement_keyword: false,
            paren_heads: Vec::new(),
        }
    }

    /// Scan the whole source, ending with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, ExtractionError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Return the next token from the source.
    pub fn next_token(&mut self) -> Result<Token, ExtractionError> {
        self.skip_whitespace_and_comments()?;

        let start = self.current_pos;
        let Some((_, ch)) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, Span::new(start, start)));
        };

        let kind = match ch {
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '+' if self.peek() == Some('+') => {
                self.advance();
                TokenKind::Increment
            }
            '-' if self.peek() == Some('-') => {
                self.advance();
                TokenKind::Decrement
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '.' => {
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.scan_number(start)
                } else {
                    TokenKind::Dot
                }
            }
            '=' => {
                if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Arrow
                } else {
                    TokenKind::Punct('=')
                }
            }
            '"' | '\'' => self.scan_string(ch, start)?,
            '`' => self.scan_template(start)?,
            '/' if self.regex_allowed => self.scan_regex(start)?,
            '0'..='9' => self.scan_number(start),
            _ if is_id_start(ch) => self.scan_identifier(start),
            _ if ch.is_ascii_punctuation() => TokenKind::Punct(ch),
            _ => {
                return Err(self.syntax_error(start, format!("unexpected character '{}'", ch)));
            }
        };

        self.regex_allowed = match &kind {
            // Postfix after an operand, prefix otherwise: either way the
            // operand state is unchanged.
            TokenKind::Increment | TokenKind::Decrement => self.regex_allowed,
            TokenKind::LeftParen => {
                self.paren_heads.push(self.after_statement_keyword);
                true
            }
            // `if (a) /re/.test(b)` starts a statement after the head.
            TokenKind::RightParen => self.paren_heads.pop().unwrap_or(false),
            other => regex_may_follow(other),
        };
        self.after_statement_keyword = matches!(
            &kind,
            TokenKind::Identifier(name) if STATEMENT_HEAD_KEYWORDS.contains(&name.as_str())
        );
        Ok(Token::new(kind, Span::new(start, self.current_pos)))
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = pos + ch.len_utf8();
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, ch)| ch)
    }

    fn syntax_error(&self, offset: usize, message: impl Into<String>) -> ExtractionError {
        let (line, column) = line_col(self.source, offset);
        ExtractionError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ExtractionError> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() || ch == '\u{feff}' => {
                    self.advance();
                }
                Some('/') => match self.peek_next() {
                    Some('/') => {
                        while let Some(ch) = self.peek() {
                            if ch == '\n' || ch == '\r' {
                                break;
                            }
                            self.advance();
                        }
                    }
                    Some('*') => {
                        let start = self.current_pos;
                        self.advance();
                        self.advance();
                        let mut closed = false;
                        while let Some((_, ch)) = self.advance() {
                            if ch == '*' && self.peek() == Some('/') {
                                self.advance();
                                closed = true;
                                break;
                            }
                        }
                        if !closed {
                            return Err(self.syntax_error(start, "unterminated block comment"));
                        }
                    }
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::Identifier(self.source[start..self.current_pos].to_string())
    }

    fn scan_number(&mut self, start: usize) -> TokenKind {
        while let Some(ch) = self.peek() {
            let exponent_sign = (ch == '+' || ch == '-')
                && matches!(self.source[start..self.current_pos].chars().last(), Some('e' | 'E'))
                && !self.source[start..].starts_with("0x")
                && !self.source[start..].starts_with("0X");
            if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' || exponent_sign {
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::Number(self.source[start..self.current_pos].to_string())
    }

    fn scan_string(&mut self, quote: char, start: usize) -> Result<TokenKind, ExtractionError> {
        let mut value = String::new();
        loop {
            let Some((_, ch)) = self.advance() else {
                return Err(self.syntax_error(start, "unterminated string literal"));
            };
            match ch {
                c if c == quote => return Ok(TokenKind::String(value)),
                '\n' | '\r' => {
                    return Err(self.syntax_error(start, "unterminated string literal"));
                }
                '\\' => self.scan_escape(&mut value, start)?,
                c => value.push(c),
            }
        }
    }

    fn scan_escape(&mut self, value: &mut String, start: usize) -> Result<(), ExtractionError> {
        let Some((_, ch)) = self.advance() else {
            return Err(self.syntax_error(start, "unterminated string literal"));
        };
        match ch {
            'n' => value.push('\n'),
            'r' => value.push('\r'),
            't' => value.push('\t'),
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'v' => value.push('\u{b}'),
            '0' if !self.peek().is_some_and(|c| c.is_ascii_digit()) => value.push('\0'),
            'x' => {
                let code = self.scan_hex_digits(2, start)?;
                value.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            'u' => {
                let code = if self.peek() == Some('{') {
                    self.advance();
                    let mut code = 0u32;
                    loop {
                        match self.advance() {
                            Some((_, '}')) => break,
                            Some((_, c)) if c.is_ascii_hexdigit() => {
                                code = code
                                    .checked_mul(16)
                                    .and_then(|v| v.checked_add(c.to_digit(16).unwrap_or(0)))
                                    .ok_or_else(|| {
                                        self.syntax_error(start, "unicode escape out of range")
                                    })?;
                            }
                            _ => {
                                return Err(self.syntax_error(start, "invalid unicode escape"));
                            }
                        }
                    }
                    code
                } else {
                    self.scan_hex_digits(4, start)?
                };
                value.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            // Line continuation
            '\r' => {
                if self.peek() == Some('\n') {
                    self.advance();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => value.push(other),
        }
        Ok(())
    }

    fn scan_hex_digits(&mut self, count: usize, start: usize) -> Result<u32, ExtractionError> {
        let mut code = 0u32;
        for _ in 0..count {
            match self.advance() {
                Some((_, c)) if c.is_ascii_hexdigit() => {
                    code = code * 16 + c.to_digit(16).unwrap_or(0);
                }
                _ => return Err(self.syntax_error(start, "invalid hexadecimal escape")),
            }
        }
        Ok(code)
    }

    fn scan_template(&mut self, start: usize) -> Result<TokenKind, ExtractionError> {
        loop {
            let Some((_, ch)) = self.advance() else {
                return Err(self.syntax_error(start, "unterminated template literal"));
            };
            match ch {
                '`' => return Ok(TokenKind::Template),
                '\\' => {
                    self.advance();
                }
                '$' if self.peek() == Some('{') => {
                    self.advance();
                    self.regex_allowed = true;
                    let mut depth = 1usize;
                    while depth > 0 {
                        let token = self.next_token()?;
                        match token.kind {
                            TokenKind::LeftBrace => depth += 1,
                            TokenKind::RightBrace => depth -= 1,
                            TokenKind::Eof => {
                                return Err(
                                    self.syntax_error(start, "unterminated template literal")
                                );
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn scan_regex(&mut self, start: usize) -> Result<TokenKind, ExtractionError> {
        let mut in_class = false;
        loop {
            let Some((_, ch)) = self.advance() else {
                return Err(self.syntax_error(start, "unterminated regular expression"));
            };
            match ch {
                '\\' => {
                    self.advance();
                }
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                '\n' | '\r' => {
                    return Err(self.syntax_error(start, "unterminated regular expression"));
                }
                _ => {}
            }
        }
        // Flags
        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(TokenKind::RegExp)
    }
}

/// Whether a `/` following this token begins a regular expression.
fn regex_may_follow(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Identifier(name) => REGEX_PRECEDING_KEYWORDS.contains(&name.as_str()),
        TokenKind::String(_)
        | TokenKind::Number(_)
        | TokenKind::Template
        | TokenKind::RegExp
        | TokenKind::RightParen
        | TokenKind::RightBracket => false,
        _ => true,
    }
}

fn is_id_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_id_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$' || ch == '\u{200c}' || ch == '\u{200d}'
}
