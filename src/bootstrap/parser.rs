//! Recognises loader calls in a token stream and parses their arguments.

use super::scanner::Scanner;
use super::token::{line_col, Span, Token, TokenKind};
use super::value::{ConfigObject, ConfigValue, RawSource};
use crate::error::ExtractionError;

/// Names a loader global may go by.
const LOADER_NAMES: &[&str] = &["require", "requirejs"];

/// Keywords whose parenthesised head is followed by a statement.
const STATEMENT_HEADS: &[&str] = &["if", "while", "for", "with"];

/// A loader call found in executed code of the bootstrap source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LoaderCall {
    /// `require.config(...)`
    Config { args: Vec<ConfigValue>, span: Span },
    /// `require(...)`
    Init { args: Vec<ConfigValue>, span: Span },
}

pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, ExtractionError> {
        let tokens = Scanner::new(source).tokenize()?;
        Ok(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    /// Walk the token stream and collect every executed loader call in order.
    ///
    /// A call counts when it starts a statement at the top level, inside a
    /// block, or inside the body of a function invoked where it is defined
    /// (`(function () { ... }())`). Bodies of other functions are skipped, as
    /// are the arguments of every recognised call.
    pub fn loader_calls(&mut self) -> Result<Vec<LoaderCall>, ExtractionError> {
        let mut calls = Vec::new();
        let eof = self.tokens.len() - 1;
        self.collect_calls(eof, &mut calls)?;
        Ok(calls)
    }

    fn collect_calls(
        &mut self,
        end: usize,
        calls: &mut Vec<LoaderCall>,
    ) -> Result<(), ExtractionError> {
        while self.pos < end {
            if self.at_loader_name() && self.at_statement_start() {
                if let Some(call) = self.parse_loader_call()? {
                    calls.push(call);
                    continue;
                }
            }

            if let Some((open, close)) = self.function_body_at(self.pos)? {
                if self.invoked_after(close) {
                    self.pos = open + 1;
                    self.collect_calls(close, calls)?;
                }
                self.pos = close + 1;
                continue;
            }

            self.pos += 1;
        }
        Ok(())
    }

    fn parse_loader_call(&mut self) -> Result<Option<LoaderCall>, ExtractionError> {
        let start = self.peek().span.start;
        if self.nth_kind(1) == &TokenKind::Dot
            && self.nth(2).is_ident("config")
            && self.nth_kind(3) == &TokenKind::LeftParen
        {
            self.pos += 3;
            let args = self.parse_arguments()?;
            return Ok(Some(LoaderCall::Config {
                args,
                span: Span::new(start, self.previous_end()),
            }));
        }
        if self.nth_kind(1) == &TokenKind::LeftParen {
            self.pos += 1;
            let args = self.parse_arguments()?;
            return Ok(Some(LoaderCall::Init {
                args,
                span: Span::new(start, self.previous_end()),
            }));
        }
        Ok(None)
    }

    /// Whether the current token begins a statement.
    fn at_statement_start(&self) -> bool {
        let Some(prev_idx) = self.pos.checked_sub(1) else {
            return true;
        };
        match &self.tokens[prev_idx].kind {
            TokenKind::Semicolon | TokenKind::LeftBrace | TokenKind::RightBrace => true,
            TokenKind::Identifier(name) if name == "else" || name == "do" => true,
            TokenKind::RightParen => {
                self.closes_statement_head(prev_idx) || self.newline_before(self.pos)
            }
            // Automatic semicolon insertion
            TokenKind::Identifier(_)
            | TokenKind::String(_)
            | TokenKind::Number(_)
            | TokenKind::Template
            | TokenKind::RegExp
            | TokenKind::RightBracket
            | TokenKind::Increment
            | TokenKind::Decrement => self.newline_before(self.pos),
            _ => false,
        }
    }

    fn newline_before(&self, idx: usize) -> bool {
        idx > 0
            && self.source[self.tokens[idx - 1].span.end..self.tokens[idx].span.start]
                .contains('\n')
    }

    /// Whether the `)` at `close_idx` ends an `if`, `while`, `for` or `with` head.
    fn closes_statement_head(&self, close_idx: usize) -> bool {
        let mut depth = 0usize;
        for idx in (0..=close_idx).rev() {
            match self.tokens[idx].kind {
                TokenKind::RightParen => depth += 1,
                TokenKind::LeftParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return idx > 0
                            && STATEMENT_HEADS.iter().any(|kw| self.tokens[idx - 1].is_ident(kw));
                    }
                }
                _ => {}
            }
        }
        false
    }

    /// Brace indices of a function body starting at `idx`, for `function`
    /// literals and block-bodied arrows.
    fn function_body_at(&self, idx: usize) -> Result<Option<(usize, usize)>, ExtractionError> {
        let body_start = match &self.tokens[idx].kind {
            TokenKind::Identifier(name) if name == "function" => {
                // Optional `*` and name come before the parameters.
                let params = (idx + 1..self.tokens.len())
                    .take(3)
                    .find(|&i| self.tokens[i].kind == TokenKind::LeftParen);
                match params {
                    Some(params) => self.matching_close(params)? + 1,
                    None => return Ok(None),
                }
            }
            TokenKind::Arrow => idx + 1,
            _ => return Ok(None),
        };
        if self.kind_at(body_start) != &TokenKind::LeftBrace {
            return Ok(None);
        }
        Ok(Some((body_start, self.matching_close(body_start)?)))
    }

    /// Whether the function whose body closes at `close` is called right away.
    fn invoked_after(&self, close: usize) -> bool {
        let called_at = |idx: usize| match self.kind_at(idx) {
            TokenKind::LeftParen => true,
            TokenKind::Dot => {
                let method = &self.tokens[(idx + 1).min(self.tokens.len() - 1)];
                method.is_ident("call") || method.is_ident("apply")
            }
            _ => false,
        };
        called_at(close + 1)
            || (self.kind_at(close + 1) == &TokenKind::RightParen && called_at(close + 2))
    }

    fn kind_at(&self, idx: usize) -> &TokenKind {
        &self.tokens[idx.min(self.tokens.len() - 1)].kind
    }

    fn at_loader_name(&self) -> bool {
        let is_loader = matches!(
            self.peek_kind(),
            TokenKind::Identifier(name) if LOADER_NAMES.contains(&name.as_str())
        );
        let is_member = self.pos > 0 && self.tokens[self.pos - 1].kind == TokenKind::Dot;
        is_loader && !is_member
    }

    fn peek(&self) -> &Token {
        self.nth(0)
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn nth(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn nth_kind(&self, offset: usize) -> &TokenKind {
        &self.nth(offset).kind
    }

    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .map(|idx| self.tokens[idx].span.end)
            .unwrap_or(0)
    }

    fn error_at(&self, span: Span, message: impl Into<String>) -> ExtractionError {
        let (line, column) = line_col(self.source, span.start);
        ExtractionError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    fn unsupported(&self, token: &Token) -> ExtractionError {
        let (line, column) = line_col(self.source, token.span.start);
        ExtractionError::UnsupportedValue {
            line,
            column,
            found: token.kind.describe(),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Span, ExtractionError> {
        let token = self.peek();
        if token.kind == kind {
            let span = token.span;
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.error_at(
                token.span,
                format!("expected {}, found {}", kind.describe(), token.kind.describe()),
            ))
        }
    }

    /// Parse `( value, value, ... )`, with an optional trailing comma.
    fn parse_arguments(&mut self) -> Result<Vec<ConfigValue>, ExtractionError> {
        self.expect(TokenKind::LeftParen)?;
        self.parse_sequence(TokenKind::RightParen)
    }

    fn parse_sequence(&mut self, close: TokenKind) -> Result<Vec<ConfigValue>, ExtractionError> {
        let mut items = Vec::new();
        loop {
            if *self.peek_kind() == close {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.parse_value()?);
            match self.peek_kind() {
                TokenKind::Comma => self.pos += 1,
                kind if *kind == close => {}
                _ => {
                    let token = self.peek();
                    return Err(self.error_at(
                        token.span,
                        format!(
                            "expected ',' or {}, found {}",
                            close.describe(),
                            token.kind.describe()
                        ),
                    ));
                }
            }
        }
    }

    fn parse_value(&mut self) -> Result<ConfigValue, ExtractionError> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::LeftBrace => self.parse_object(),
            TokenKind::LeftBracket => {
                self.pos += 1;
                Ok(ConfigValue::Array(self.parse_sequence(TokenKind::RightBracket)?))
            }
            TokenKind::String(value) => {
                self.pos += 1;
                Ok(ConfigValue::String(value.clone()))
            }
            TokenKind::Number(raw) => {
                self.pos += 1;
                Ok(ConfigValue::Number(raw.clone()))
            }
            TokenKind::Minus | TokenKind::Plus => match self.nth_kind(1).clone() {
                TokenKind::Number(raw) => {
                    self.pos += 2;
                    let sign = if token.kind == TokenKind::Minus { "-" } else { "" };
                    Ok(ConfigValue::Number(format!("{}{}", sign, raw)))
                }
                _ => Err(self.unsupported(&token)),
            },
            TokenKind::Identifier(name) => match name.as_str() {
                "true" => {
                    self.pos += 1;
                    Ok(ConfigValue::Bool(true))
                }
                "false" => {
                    self.pos += 1;
                    Ok(ConfigValue::Bool(false))
                }
                "null" => {
                    self.pos += 1;
                    Ok(ConfigValue::Null)
                }
                "undefined" => {
                    self.pos += 1;
                    Ok(ConfigValue::Undefined)
                }
                "function" | "async" => self.capture_function(),
                _ if self.nth_kind(1) == &TokenKind::Arrow => self.capture_function(),
                _ => Err(self.unsupported(&token)),
            },
            TokenKind::LeftParen => {
                if self.is_arrow_at(self.pos)? {
                    self.capture_function()
                } else {
                    Err(self.unsupported(&token))
                }
            }
            _ => Err(self.unsupported(&token)),
        }
    }

    fn parse_object(&mut self) -> Result<ConfigValue, ExtractionError> {
        self.expect(TokenKind::LeftBrace)?;
        let mut object = ConfigObject::new();
        loop {
            let token = self.peek().clone();
            let key = match token.kind {
                TokenKind::RightBrace => {
                    self.pos += 1;
                    return Ok(ConfigValue::Object(object));
                }
                TokenKind::Identifier(name) => name,
                TokenKind::String(value) => value,
                TokenKind::Number(raw) => raw,
                other => {
                    return Err(self.error_at(
                        token.span,
                        format!("expected property name, found {}", other.describe()),
                    ));
                }
            };
            self.pos += 1;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_value()?;
            object.insert(key, value);

            match self.peek_kind() {
                TokenKind::Comma => self.pos += 1,
                TokenKind::RightBrace => {}
                _ => {
                    let token = self.peek();
                    return Err(self.error_at(
                        token.span,
                        format!("expected ',' or '}}', found {}", token.kind.describe()),
                    ));
                }
            }
        }
    }

    /// Capture a function or arrow function literal as its exact source text.
    fn capture_function(&mut self) -> Result<ConfigValue, ExtractionError> {
        let start = self.peek().span.start;
        if self.peek().is_ident("async") {
            self.pos += 1;
        }

        let end = if self.peek().is_ident("function") {
            self.pos += 1;
            if self.peek_kind() == &TokenKind::Punct('*') {
                self.pos += 1;
            }
            if matches!(self.peek_kind(), TokenKind::Identifier(_)) {
                self.pos += 1;
            }
            self.skip_balanced(TokenKind::LeftParen)?;
            self.skip_balanced(TokenKind::LeftBrace)?
        } else {
            match self.peek_kind() {
                TokenKind::Identifier(_) => self.pos += 1,
                TokenKind::LeftParen => {
                    self.skip_balanced(TokenKind::LeftParen)?;
                }
                _ => return Err(self.unsupported(&self.peek().clone())),
            }
            self.expect(TokenKind::Arrow)?;
            if self.peek_kind() == &TokenKind::LeftBrace {
                self.skip_balanced(TokenKind::LeftBrace)?
            } else {
                self.skip_expression()?
            }
        };

        Ok(ConfigValue::Function(RawSource::new(&self.source[start..end])))
    }

    /// Consume a bracketed group starting at the current token; returns the end offset.
    fn skip_balanced(&mut self, open: TokenKind) -> Result<usize, ExtractionError> {
        if *self.peek_kind() != open {
            self.expect(open)?;
        }
        let close_idx = self.matching_close(self.pos)?;
        self.pos = close_idx + 1;
        Ok(self.tokens[close_idx].span.end)
    }

    /// Consume an arrow function expression body up to the enclosing delimiter.
    fn skip_expression(&mut self) -> Result<usize, ExtractionError> {
        let mut end = None;
        loop {
            let kind = self.peek_kind();
            if matches!(kind, TokenKind::Comma | TokenKind::Semicolon | TokenKind::Eof)
                || kind.is_close_bracket()
            {
                break;
            }
            if kind.is_open_bracket() {
                let close_idx = self.matching_close(self.pos)?;
                end = Some(self.tokens[close_idx].span.end);
                self.pos = close_idx + 1;
            } else {
                end = Some(self.peek().span.end);
                self.pos += 1;
            }
        }
        end.ok_or_else(|| self.error_at(self.peek().span, "expected arrow function body"))
    }

    /// Index of the bracket closing the one at `open_idx`.
    fn matching_close(&self, open_idx: usize) -> Result<usize, ExtractionError> {
        let mut stack: Vec<TokenKind> = Vec::new();
        for (idx, token) in self.tokens.iter().enumerate().skip(open_idx) {
            match &token.kind {
                TokenKind::LeftBrace => stack.push(TokenKind::RightBrace),
                TokenKind::LeftParen => stack.push(TokenKind::RightParen),
                TokenKind::LeftBracket => stack.push(TokenKind::RightBracket),
                kind if kind.is_close_bracket() => {
                    if stack.pop().as_ref() != Some(kind) {
                        return Err(self.error_at(
                            token.span,
                            format!("unbalanced {}", kind.describe()),
                        ));
                    }
                    if stack.is_empty() {
                        return Ok(idx);
                    }
                }
                TokenKind::Eof => break,
                _ => {}
            }
        }
        let open = &self.tokens[open_idx];
        Err(self.error_at(open.span, format!("unclosed {}", open.kind.describe())))
    }

    fn is_arrow_at(&self, idx: usize) -> Result<bool, ExtractionError> {
        let close_idx = self.matching_close(idx)?;
        Ok(self
            .tokens
            .get(close_idx + 1)
            .is_some_and(|t| t.kind == TokenKind::Arrow))
    }
}
