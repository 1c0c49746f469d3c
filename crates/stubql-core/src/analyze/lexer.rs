//! SQL lexer for the statement reader.
//!
//! Produces just enough token structure to find statement kind, table,
//! column lists, and equality predicates. Keywords stay `Ident`; the reader
//! compares them case-insensitively.

use crate::{analyze::AnalyzeError, value::Value};

///
/// Token
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    /// Byte offsets into the source text.
    pub(crate) start: usize,
    pub(crate) end: usize,
}

///
/// TokenKind
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    /// Bare identifier or keyword.
    Ident(String),
    /// `"name"`, `` `name` ``, `[name]`.
    QuotedIdent(String),
    /// Numeric or string literal, or a placeholder after binding.
    Literal(Value),
    /// `?` (None), `?NNN` / `$NNN` (Some, 1-based).
    Placeholder(Option<u32>),
    Comma,
    Dot,
    LeftParen,
    RightParen,
    Star,
    Eq,
    Minus,
    Semicolon,
    /// Any other operator; only its span matters.
    Op,
    Eof,
}

impl TokenKind {
    /// Case-insensitive keyword test.
    pub(crate) fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Self::Ident(s) if s.eq_ignore_ascii_case(keyword))
    }
}

///
/// Lexer
///

pub(crate) struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) const fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    /// Tokenize the whole input; the last token is always `Eof`.
    pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>, AnalyzeError> {
        let mut lexer = Lexer::new(src);
        let mut tokens = Vec::new();

        loop {
            let tok = lexer.next_token()?;
            let is_eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }

        Ok(tokens)
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn next_token(&mut self) -> Result<Token, AnalyzeError> {
        self.skip_whitespace_and_comments()?;

        let start = self.pos;
        let Some(ch) = self.peek_at(0) else {
            return Ok(self.token(TokenKind::Eof, start));
        };

        let kind = match ch {
            b'\'' => self.lex_string()?,
            b'"' => self.lex_quoted_ident(b'"')?,
            b'`' => self.lex_quoted_ident(b'`')?,
            b'[' => self.lex_quoted_ident(b']')?,
            b'0'..=b'9' => self.lex_number()?,
            b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.lex_number()?,
            b'?' => self.lex_placeholder(b'?')?,
            b'$' => self.lex_placeholder(b'$')?,
            c if c == b'_' || c.is_ascii_alphabetic() || !c.is_ascii() => self.lex_ident(),
            b',' => self.single(TokenKind::Comma),
            b'.' => self.single(TokenKind::Dot),
            b'(' => self.single(TokenKind::LeftParen),
            b')' => self.single(TokenKind::RightParen),
            b'*' => self.single(TokenKind::Star),
            b';' => self.single(TokenKind::Semicolon),
            b'-' => self.single(TokenKind::Minus),
            b'=' => {
                self.pos += 1;
                if self.peek_at(0) == Some(b'=') {
                    self.pos += 1;
                }
                TokenKind::Eq
            }
            b'<' | b'>' | b'!' | b'|' => {
                self.pos += 1;
                if matches!(self.peek_at(0), Some(b'=' | b'>' | b'|' | b'<')) {
                    self.pos += 1;
                }
                TokenKind::Op
            }
            c if c.is_ascii_punctuation() => self.single(TokenKind::Op),
            other => {
                return Err(AnalyzeError::UnexpectedChar {
                    ch: char::from(other),
                    offset: start,
                });
            }
        };

        Ok(self.token(kind, start))
    }

    const fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            start,
            end: self.pos,
        }
    }

    const fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), AnalyzeError> {
        loop {
            match (self.peek_at(0), self.peek_at(1)) {
                (Some(c), _) if c.is_ascii_whitespace() => self.pos += 1,
                (Some(b'-'), Some(b'-')) => {
                    while let Some(c) = self.peek_at(0) {
                        if c == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    let start = self.pos;
                    let Some(close) = self.src[self.pos + 2..].find("*/") else {
                        return Err(AnalyzeError::UnterminatedComment { offset: start });
                    };
                    self.pos += 2 + close + 2;
                }
                _ => return Ok(()),
            }
        }
    }

    fn lex_string(&mut self) -> Result<TokenKind, AnalyzeError> {
        let start = self.pos;
        let mut out = String::new();
        self.pos += 1;

        loop {
            let Some(rest) = self.src.get(self.pos..) else {
                return Err(AnalyzeError::UnterminatedString { offset: start });
            };
            let Some(quote) = rest.find('\'') else {
                return Err(AnalyzeError::UnterminatedString { offset: start });
            };
            out.push_str(&rest[..quote]);
            self.pos += quote + 1;

            // '' is an escaped quote
            if self.peek_at(0) == Some(b'\'') {
                out.push('\'');
                self.pos += 1;
            } else {
                return Ok(TokenKind::Literal(Value::Text(out)));
            }
        }
    }

    fn lex_quoted_ident(&mut self, close: u8) -> Result<TokenKind, AnalyzeError> {
        let start = self.pos;
        self.pos += 1;

        let rest = &self.src[self.pos..];
        let Some(end) = rest.find(char::from(close)) else {
            return Err(AnalyzeError::UnterminatedIdentifier { offset: start });
        };
        let name = rest[..end].to_string();
        self.pos += end + 1;

        Ok(TokenKind::QuotedIdent(name))
    }

    fn lex_ident(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.peek_at(0) {
            if c == b'_' || c == b'$' || c.is_ascii_alphanumeric() || !c.is_ascii() {
                self.pos += 1;
            } else {
                break;
            }
        }

        TokenKind::Ident(self.src[start..self.pos].to_string())
    }

    fn lex_number(&mut self) -> Result<TokenKind, AnalyzeError> {
        let start = self.pos;
        let mut is_float = false;

        while let Some(c) = self.peek_at(0) {
            match c {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !is_float => {
                    is_float = true;
                    self.pos += 1;
                }
                b'e' | b'E' => {
                    is_float = true;
                    self.pos += 1;
                    if matches!(self.peek_at(0), Some(b'+' | b'-')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }

        let text = &self.src[start..self.pos];
        let invalid = || AnalyzeError::InvalidNumber {
            text: text.to_string(),
            offset: start,
        };

        if is_float {
            text.parse::<f64>()
                .map(|v| TokenKind::Literal(Value::Float(v)))
                .map_err(|_| invalid())
        } else {
            text.parse::<i64>()
                .map(|v| TokenKind::Literal(Value::Int(v)))
                .map_err(|_| invalid())
        }
    }

    fn lex_placeholder(&mut self, sigil: u8) -> Result<TokenKind, AnalyzeError> {
        let start = self.pos;
        self.pos += 1;

        let digits_start = self.pos;
        while self.peek_at(0).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits = &self.src[digits_start..self.pos];

        if digits.is_empty() {
            return if sigil == b'?' {
                Ok(TokenKind::Placeholder(None))
            } else {
                Err(AnalyzeError::InvalidPlaceholder { offset: start })
            };
        }

        match digits.parse::<u32>() {
            Ok(n) if n > 0 => Ok(TokenKind::Placeholder(Some(n))),
            _ => Err(AnalyzeError::InvalidPlaceholder { offset: start }),
        }
    }
}
