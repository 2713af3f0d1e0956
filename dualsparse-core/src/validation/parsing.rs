//! Tokenizer for textual matrix records
//!
//! Records look like `ClassName( field field ... )`. Whitespace separates
//! tokens and `#` starts a comment running to the end of the line.

use crate::SparseError;

/// A lexical token of a textual record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// Contents of a double-quoted string, escapes not yet resolved
    Quoted(&'a str),
    /// Bare word: identifier, number, boolean
    Atom(&'a str),
}

/// Streaming tokenizer over record text
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer positioned at the start of `input`
    pub const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Byte offset of the next unread character
    pub const fn position(&self) -> usize {
        self.pos
    }

    fn skip_blanks(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                b'#' => {
                    while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    /// Look at the next token without consuming it
    pub fn peek(&self) -> Result<Option<Token<'a>>, SparseError> {
        self.clone().next_token()
    }

    /// Consume and return the next token, or `None` at end of input
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, SparseError> {
        self.skip_blanks();
        let bytes = self.input.as_bytes();
        if self.pos >= bytes.len() {
            return Ok(None);
        }

        let single = match bytes[self.pos] {
            b'(' => Some(Token::OpenParen),
            b')' => Some(Token::CloseParen),
            b'[' => Some(Token::OpenBracket),
            b']' => Some(Token::CloseBracket),
            b'{' => Some(Token::OpenBrace),
            b'}' => Some(Token::CloseBrace),
            b':' => Some(Token::Colon),
            b',' => Some(Token::Comma),
            _ => None,
        };
        if let Some(token) = single {
            self.pos += 1;
            return Ok(Some(token));
        }

        if bytes[self.pos] == b'"' {
            let start = self.pos + 1;
            let mut end = start;
            while end < bytes.len() {
                match bytes[end] {
                    b'\\' => end += 2,
                    b'"' => break,
                    _ => end += 1,
                }
            }
            if end >= bytes.len() {
                return Err(SparseError::MalformedRecord("unterminated string"));
            }
            self.pos = end + 1;
            return Ok(Some(Token::Quoted(&self.input[start..end])));
        }

        let start = self.pos;
        while self.pos < bytes.len() && !is_delimiter(bytes[self.pos]) {
            self.pos += 1;
        }
        Ok(Some(Token::Atom(&self.input[start..self.pos])))
    }

    /// Consume the next token, failing at end of input
    pub fn expect_token(&mut self) -> Result<Token<'a>, SparseError> {
        self.next_token()?
            .ok_or(SparseError::MalformedRecord("unexpected end of record"))
    }

    /// Consume a specific punctuation token
    pub fn expect(&mut self, expected: Token<'static>, what: &'static str) -> Result<(), SparseError> {
        if self.expect_token()? != expected {
            return Err(SparseError::MalformedRecord(what));
        }
        Ok(())
    }

    /// Consume a bare word
    pub fn expect_atom(&mut self, what: &'static str) -> Result<&'a str, SparseError> {
        match self.expect_token()? {
            Token::Atom(atom) => Ok(atom),
            _ => Err(SparseError::MalformedRecord(what)),
        }
    }

    /// Consume the `ClassName(` envelope opening
    pub fn expect_envelope(&mut self, class_name: &'static str) -> Result<(), SparseError> {
        match self.next_token()? {
            Some(Token::Atom(name)) if name == class_name => {}
            _ => return Err(SparseError::ClassNameMismatch { expected: class_name }),
        }
        self.expect(Token::OpenParen, "expected '(' after class name")
    }

    /// Consume the closing `)` of the envelope
    pub fn expect_envelope_end(&mut self) -> Result<(), SparseError> {
        match self.next_token()? {
            Some(Token::CloseParen) => Ok(()),
            _ => Err(SparseError::MissingClosingParen),
        }
    }
}

const fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b' ' | b'\t' | b'\n' | b'\r' | b'#' | b'"' | b'(' | b')' | b'[' | b']' | b'{' | b'}' | b':' | b','
    )
}

/// Parse a boolean field, accepting `true`/`false` and `1`/`0`
pub fn parse_bool(atom: &str) -> Result<bool, SparseError> {
    match atom {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(SparseError::MalformedRecord("expected boolean")),
    }
}

/// Parse a non-negative integer field without relying on std
pub fn parse_usize(atom: &str) -> Result<usize, SparseError> {
    if atom.is_empty() {
        return Err(SparseError::MalformedRecord("expected integer"));
    }

    let mut result: usize = 0;
    for byte in atom.bytes() {
        if !byte.is_ascii_digit() {
            return Err(SparseError::MalformedRecord("expected integer"));
        }
        let digit = (byte - b'0') as usize;
        result = result
            .checked_mul(10)
            .and_then(|r| r.checked_add(digit))
            .ok_or(SparseError::MalformedRecord("integer overflow"))?;
    }

    Ok(result)
}
