//! Tokenizer for step bodies.
//!
//! Scanning starts at a caller-supplied byte offset so spans (and therefore error offsets) index
//! the whole step text, prefix included.

use crate::script::error::ScriptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Number(f64),
    True,
    False,

    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semi,
    Assign,
    Question,
    Colon,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,

    EqEq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,

    Eof,
}

/// Tokenize `src[start..]`. The result always ends with [`TokenKind::Eof`].
pub(crate) fn lex(src: &str, start: usize) -> Result<Vec<Token>, ScriptError> {
    let mut cur = Cursor { src, pos: start };
    let mut out = Vec::new();
    loop {
        cur.eat_while(|b| b.is_ascii_whitespace());
        let at = cur.pos;
        let Some(b) = cur.peek(0) else {
            out.push(Token {
                kind: TokenKind::Eof,
                span: Span { start: at, end: at },
            });
            return Ok(out);
        };

        let kind = match b {
            b'0'..=b'9' => cur.number()?,
            b'.' if cur.peek(1).is_some_and(|d| d.is_ascii_digit()) => cur.number()?,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => cur.word(),
            _ => match cur.peek(1).and_then(|next| pair(b, next)) {
                Some(kind) => {
                    cur.pos += 2;
                    kind
                }
                None => {
                    let kind = single(b).ok_or_else(|| cur.unexpected())?;
                    cur.pos += 1;
                    kind
                }
            },
        };
        out.push(Token {
            kind,
            span: Span { start: at, end: cur.pos },
        });
    }
}

fn pair(first: u8, second: u8) -> Option<TokenKind> {
    Some(match (first, second) {
        (b'=', b'=') => TokenKind::EqEq,
        (b'!', b'=') => TokenKind::Ne,
        (b'<', b'=') => TokenKind::Le,
        (b'>', b'=') => TokenKind::Ge,
        (b'&', b'&') => TokenKind::AndAnd,
        (b'|', b'|') => TokenKind::OrOr,
        _ => return None,
    })
}

fn single(b: u8) -> Option<TokenKind> {
    Some(match b {
        b'(' => TokenKind::LParen,
        b')' => TokenKind::RParen,
        b'[' => TokenKind::LBracket,
        b']' => TokenKind::RBracket,
        b',' => TokenKind::Comma,
        b'.' => TokenKind::Dot,
        b';' => TokenKind::Semi,
        b'=' => TokenKind::Assign,
        b'?' => TokenKind::Question,
        b':' => TokenKind::Colon,
        b'+' => TokenKind::Plus,
        b'-' => TokenKind::Minus,
        b'*' => TokenKind::Star,
        b'/' => TokenKind::Slash,
        b'%' => TokenKind::Percent,
        b'!' => TokenKind::Bang,
        b'<' => TokenKind::Lt,
        b'>' => TokenKind::Gt,
        _ => return None,
    })
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self, ahead: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + ahead).copied()
    }

    fn eat_while(&mut self, keep: impl Fn(u8) -> bool) {
        while self.peek(0).is_some_and(&keep) {
            self.pos += 1;
        }
    }

    /// `12`, `0.5` or `.25`. A `.` not followed by a digit is left for attribute access.
    fn number(&mut self) -> Result<TokenKind, ScriptError> {
        let start = self.pos;
        self.eat_while(|b| b.is_ascii_digit());
        if self.peek(0) == Some(b'.') && self.peek(1).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
            self.eat_while(|b| b.is_ascii_digit());
        }
        if self.peek(0).is_some_and(|b| b.is_ascii_alphabetic() || b == b'_') {
            return Err(ScriptError::new(self.pos, "letter directly after a number"));
        }
        self.src[start..self.pos]
            .parse()
            .map(TokenKind::Number)
            .map_err(|_| ScriptError::new(start, "invalid number"))
    }

    fn word(&mut self) -> TokenKind {
        let start = self.pos;
        self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'_');
        match &self.src[start..self.pos] {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            name => TokenKind::Ident(name.to_owned()),
        }
    }

    fn unexpected(&self) -> ScriptError {
        let ch = self
            .src
            .get(self.pos..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or('?');
        ScriptError::new(self.pos, format!("unexpected character '{ch}'"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/lexer.rs"]
mod tests;
