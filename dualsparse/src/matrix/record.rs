//! Textual and JSON records of a matrix
//!
//! The textual record is
//!
//! ```text
//! DoubleAccessSparseMatrix(
//!   [ {0: 5, 2: 1} {} ]   # rows
//!   [ ]                   # cols
//!   "name"
//!   ROW_WISE
//!   false                 # double_access
//!   2                     # height
//!   3                     # width
//!   0                     # null_elem
//! )
//! ```
//!
//! Whitespace separates fields, `#` starts a comment, and commas are optional.

use std::fmt::Write as _;
use std::io::{Read, Write};

use dualsparse_core::format::constants::class_name;
use dualsparse_core::{
    parse_bool, parse_usize, AccessMode, BoundsCheck, MatrixElement, Result, SparseError, Token,
    Tokenizer,
};
use tracing::debug;

use super::{DoubleAccessSparseMatrix, SparseLine};

/// Serialization modes a record can be requested in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordFormat {
    /// Tagged, round-trippable text
    #[default]
    Text,
    /// Bare whitespace-separated values (not supported)
    RawAscii,
    /// Bare binary dump (not supported)
    RawBinary,
}

impl RecordFormat {
    fn ensure_supported(&self) -> Result<()> {
        match self {
            RecordFormat::Text => Ok(()),
            RecordFormat::RawAscii => Err(SparseError::UnsupportedFormat("raw_ascii")),
            RecordFormat::RawBinary => Err(SparseError::UnsupportedFormat("raw_binary")),
        }
    }
}

impl<T: MatrixElement> DoubleAccessSparseMatrix<T> {
    /// Write this matrix as a record
    pub fn write_record<W: Write>(&self, out: &mut W, format: RecordFormat) -> Result<()> {
        self.write_record_as(out, format, class_name::DOUBLE_ACCESS_SPARSE_MATRIX)
    }

    /// Read a matrix record
    pub fn read_record<R: Read>(input: &mut R, format: RecordFormat) -> Result<Self> {
        Self::read_record_as(input, format, class_name::DOUBLE_ACCESS_SPARSE_MATRIX)
    }

    /// Textual record of this matrix
    pub fn to_record_string(&self) -> String {
        self.render_record(class_name::DOUBLE_ACCESS_SPARSE_MATRIX)
    }

    /// Parse a textual record
    pub fn from_record_str(text: &str) -> Result<Self> {
        Self::parse_record(text, class_name::DOUBLE_ACCESS_SPARSE_MATRIX)
    }

    pub(crate) fn write_record_as<W: Write>(
        &self,
        out: &mut W,
        format: RecordFormat,
        class: &'static str,
    ) -> Result<()> {
        format.ensure_supported()?;
        out.write_all(self.render_record(class).as_bytes())
            .map_err(|_| SparseError::Io("failed to write record"))?;
        debug!(name = %self.name, class, entries = self.size(), "wrote record");
        Ok(())
    }

    pub(crate) fn read_record_as<R: Read>(
        input: &mut R,
        format: RecordFormat,
        class: &'static str,
    ) -> Result<Self> {
        format.ensure_supported()?;
        let mut text = String::new();
        input
            .read_to_string(&mut text)
            .map_err(|_| SparseError::Io("failed to read record"))?;
        let matrix = Self::parse_record(&text, class)?;
        debug!(name = %matrix.name, class, entries = matrix.size(), "read record");
        Ok(matrix)
    }

    pub(crate) fn render_record(&self, class: &str) -> String {
        let mut text = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(text, "{class}(");
        let _ = writeln!(text, "  {}", render_lines(&self.rows));
        let _ = writeln!(text, "  {}", render_lines(&self.cols));
        let _ = writeln!(text, "  \"{}\"", escape(&self.name));
        let _ = writeln!(text, "  {}", self.mode);
        let _ = writeln!(text, "  {}", self.double_access);
        let _ = writeln!(text, "  {}", self.height);
        let _ = writeln!(text, "  {}", self.width);
        let _ = writeln!(text, "  {}", self.null_elem);
        text.push_str(")\n");
        text
    }

    pub(crate) fn parse_record(text: &str, class: &'static str) -> Result<Self> {
        let mut tokens = Tokenizer::new(text);
        tokens.expect_envelope(class)?;

        let rows = parse_lines::<T>(&mut tokens)?;
        let cols = parse_lines::<T>(&mut tokens)?;
        let name = match tokens.expect_token()? {
            Token::Quoted(raw) => unescape(raw),
            _ => return Err(SparseError::MalformedRecord("expected quoted name")),
        };
        let mode: AccessMode = tokens.expect_atom("expected access mode")?.parse()?;
        let double_access = parse_bool(tokens.expect_atom("expected double_access")?)?;
        let height = parse_usize(tokens.expect_atom("expected height")?)?;
        let width = parse_usize(tokens.expect_atom("expected width")?)?;
        let null_elem = parse_value::<T>(tokens.expect_atom("expected null element")?)?;
        tokens.expect_envelope_end()?;

        let matrix = Self {
            rows,
            cols,
            name,
            mode,
            double_access,
            height,
            width,
            null_elem,
            bounds_check: BoundsCheck::default(),
        };
        matrix.validate_structure()?;
        Ok(matrix)
    }

    /// JSON record of this matrix
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String>
    where
        T: serde::Serialize,
    {
        serde_json::to_string(self).map_err(|_| SparseError::MalformedRecord("JSON encoding failed"))
    }

    /// Parse and validate a JSON record
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self>
    where
        T: serde::de::DeserializeOwned,
    {
        let matrix: Self = serde_json::from_str(text)
            .map_err(|_| SparseError::MalformedRecord("invalid JSON matrix record"))?;
        matrix.validate_structure()?;
        Ok(matrix)
    }
}

fn render_lines<T: MatrixElement>(lines: &[SparseLine<T>]) -> String {
    let mut text = String::from("[");
    for line in lines {
        text.push_str(" {");
        for (n, (k, value)) in line.iter().enumerate() {
            if n > 0 {
                text.push(',');
            }
            let _ = write!(text, " {k}: {value}");
        }
        text.push_str(" }");
    }
    text.push_str(" ]");
    text
}

fn parse_value<T: MatrixElement>(atom: &str) -> Result<T> {
    atom.parse::<T>()
        .map_err(|_| SparseError::MalformedRecord("invalid element value"))
}

fn parse_lines<T: MatrixElement>(tokens: &mut Tokenizer<'_>) -> Result<Vec<SparseLine<T>>> {
    tokens.expect(Token::OpenBracket, "expected '[' opening a line list")?;
    let mut lines = Vec::new();
    loop {
        match tokens.expect_token()? {
            Token::CloseBracket => return Ok(lines),
            Token::Comma => continue,
            Token::OpenBrace => lines.push(parse_line(tokens)?),
            _ => return Err(SparseError::MalformedRecord("expected '{' or ']'")),
        }
    }
}

fn parse_line<T: MatrixElement>(tokens: &mut Tokenizer<'_>) -> Result<SparseLine<T>> {
    let mut line = SparseLine::new();
    loop {
        match tokens.expect_token()? {
            Token::CloseBrace => return Ok(line),
            Token::Comma => continue,
            Token::Atom(key) => {
                let key = parse_usize(key)?;
                tokens.expect(Token::Colon, "expected ':' after index")?;
                let value = parse_value(tokens.expect_atom("expected element value")?)?;
                line.insert(key, value);
            }
            _ => return Err(SparseError::MalformedRecord("expected index or '}'")),
        }
    }
}

fn escape(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn unescape(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            name.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => name.push('\n'),
            Some(other) => name.push(other),
            None => {}
        }
    }
    name
}
