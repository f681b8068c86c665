//! Tokenizer for the StringQuery format.
//!
//! The lexer works directly on the input text and is driven by the parser:
//! every call consumes (or peeks at) exactly the token the grammar expects
//! next. Small token recognizers are written with nom.
//!
//! Positions are tracked as byte offsets internally and reported as 1-based
//! *character* columns, so diagnostics stay correct for multi-byte input.
//!
//! ## Value syntax
//!
//! | Form | Example |
//! |------|---------|
//! | Simple | `foo`, `"foo bar"` |
//! | Excluded | `!foo` |
//! | Range | `1~10`, `]1 ~ 10[`, `!1~10` |
//! | Comparison | `>= 10`, `<> 5` |
//! | Pattern match | `~* foo`, `~i!> "bar"` |
//!
//! A quoted value uses `"` as delimiter; a literal quote is written twice.

use std::cell::Cell;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0, one_of, satisfy, space0},
    combinator::{all_consuming, opt, recognize},
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::{ConditionError, ErrorKind};
use crate::value::{CompareOperator, PatternMatchType};

/// Characters that may not appear in an unquoted value.
pub const RESERVED_CHARS: &[char] = &[
    '<', '>', '[', ']', '(', ')', ',', ';', '~', '!', '*', '?', '=',
];

/// Kind of the value at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// A plain (possibly excluded) value.
    Simple,
    /// A (possibly excluded) range.
    Range,
    /// A comparison.
    Compare,
    /// A pattern match.
    PatternMatch,
}

/// A value literal with quotes and escapes removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedValue {
    /// The decoded literal.
    pub text: String,
    /// 1-based character column where the literal starts.
    pub column: usize,
    /// The literal was written in double quotes.
    pub quoted: bool,
}

/// Both sides of a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeParts {
    /// Lower bound literal.
    pub lower: LexedValue,
    /// Upper bound literal.
    pub upper: LexedValue,
    /// `[` or no left delimiter.
    pub lower_inclusive: bool,
    /// `]` or no right delimiter.
    pub upper_inclusive: bool,
    /// A right delimiter was written.
    pub upper_delimited: bool,
}

/// Pattern match operator and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternParts {
    /// Match type.
    pub kind: PatternMatchType,
    /// `~i` was used.
    pub case_insensitive: bool,
    /// Pattern literal.
    pub value: LexedValue,
}

/// Tokenizer over a single input string.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    cursor: usize,
    /// Last resolved `(byte offset, column)` pair.
    checkpoint: Cell<(usize, usize)>,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer positioned at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            cursor: 0,
            checkpoint: Cell::new((0, 1)),
        }
    }

    /// Returns `true` when all input was consumed.
    pub fn is_end(&self) -> bool {
        self.cursor >= self.input.len()
    }

    /// 1-based character column of the current position.
    pub fn column(&self) -> usize {
        self.column_at(self.cursor)
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Counts characters from the last checkpoint, so lookups that move
    /// forward through the input only scan the distance moved.
    fn column_at(&self, offset: usize) -> usize {
        let (from, column) = match self.checkpoint.get() {
            (byte, column) if byte <= offset => (byte, column),
            _ => (0, 1),
        };
        let column = column + self.input[from..offset].chars().count();
        self.checkpoint.set((offset, column));
        column
    }

    fn rest(&self) -> &'a str {
        &self.input[self.cursor..]
    }

    /// The next character, without consuming it.
    pub fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance_char(&mut self) {
        if let Some(c) = self.peek_char() {
            self.cursor += c.len_utf8();
        }
    }

    fn advance_to(&mut self, remaining: &str) {
        self.cursor = self.input.len() - remaining.len();
    }

    /// Runs a recognizer at the current position, consuming its match.
    fn consume<O>(&mut self, mut parser: impl FnMut(&'a str) -> IResult<&'a str, O>) -> Option<O> {
        match parser(self.rest()) {
            Ok((remaining, output)) => {
                self.advance_to(remaining);
                Some(output)
            }
            Err(_) => None,
        }
    }

    /// Describes the next character for diagnostics.
    pub fn describe_current(&self) -> String {
        match self.peek_char() {
            Some(c) => format!("\"{}\"", c),
            None => "end of input".to_string(),
        }
    }

    // =========================================================================
    // Whitespace
    // =========================================================================

    /// Skips spaces and tabs.
    pub fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.advance_to(rest.trim_start_matches([' ', '\t']));
    }

    /// Skips any whitespace, line breaks included.
    pub fn skip_empty_lines(&mut self) {
        let rest = self.rest();
        self.advance_to(rest.trim_start());
    }

    // =========================================================================
    // Generic tokens
    // =========================================================================

    /// Consumes `token` if it follows (after spaces and tabs).
    pub fn match_optional(&mut self, token: &str) -> Option<&'a str> {
        self.skip_whitespace();
        let rest = self.rest();
        if rest.starts_with(token) {
            self.cursor += token.len();
            Some(&rest[..token.len()])
        } else {
            None
        }
    }

    /// Consumes a required `token`.
    pub fn expects(&mut self, token: &str) -> Result<&'a str, ConditionError> {
        match self.match_optional(token) {
            Some(matched) => Ok(matched),
            None => Err(self.create_format_error(
                ErrorKind::Syntax,
                format!("expected \"{}\", found {}", token, self.describe_current()),
            )),
        }
    }

    /// Returns `true` when `token` follows (after spaces and tabs), without
    /// consuming anything.
    pub fn is_glimpse(&self, token: &str) -> bool {
        self.rest().trim_start_matches([' ', '\t']).starts_with(token)
    }

    /// Returns `true` when a group opening (`(`, `*(` or `&(`) follows.
    pub fn is_glimpse_group(&self) -> bool {
        group_opening(self.rest().trim_start_matches([' ', '\t'])).is_ok()
    }

    /// Consumes a group opening, returning its prefix (`*`, `&` or none).
    pub fn group_open(&mut self) -> Result<Option<char>, ConditionError> {
        self.skip_whitespace();
        match self.consume(group_opening) {
            Some(prefix) => Ok(prefix),
            None => Err(self.create_format_error(
                ErrorKind::Syntax,
                format!("expected \"(\", found {}", self.describe_current()),
            )),
        }
    }

    /// Builds a diagnostic at the current position.
    pub fn create_format_error(&self, kind: ErrorKind, message: impl Into<String>) -> ConditionError {
        ConditionError::new(kind, self.column(), message)
    }

    // =========================================================================
    // Field names
    // =========================================================================

    /// Reads a field name followed by `:` (or `=`), returning the name.
    ///
    /// On failure the error points at the first character that does not fit,
    /// eg. the `.` in `user.name:`.
    pub fn field_identification(&mut self) -> Result<&'a str, ConditionError> {
        self.skip_whitespace();
        if let Some(name) = self.consume(field_name) {
            return Ok(name);
        }

        let rest = self.rest();
        let offset = match terminated(identifier, space0)(rest) {
            Ok((remaining, _)) => rest.len() - remaining.len(),
            Err(_) => 0,
        };
        let found = match rest[offset..].chars().next() {
            Some(c) => format!("\"{}\"", c),
            None => "end of input".to_string(),
        };

        Err(ConditionError::new(
            ErrorKind::Syntax,
            self.column_at(self.cursor + offset),
            format!("expected a field name followed by \":\", found {}", found),
        ))
    }

    /// Reads a field label followed by `:`, returning the trimmed label.
    pub fn field_label_identification(&mut self) -> Result<&'a str, ConditionError> {
        self.skip_whitespace();
        match self.consume(field_label) {
            Some(label) if !label.trim().is_empty() => Ok(label.trim()),
            _ => Err(self.create_format_error(
                ErrorKind::Syntax,
                format!(
                    "expected a field label followed by \":\", found {}",
                    self.describe_current()
                ),
            )),
        }
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// Classifies the value at the current position, looking past a leading
    /// `!` without consuming it.
    pub fn detect_value_type(&self) -> ValueType {
        let rest = self.rest();
        let (rest, excluded) = match rest.strip_prefix('!') {
            Some(rest) => (rest, true),
            None => (rest, false),
        };

        if !excluded {
            if rest.starts_with('~') {
                return ValueType::PatternMatch;
            }
            if rest.starts_with('<') || rest.starts_with('>') {
                return ValueType::Compare;
            }
        }

        if rest.starts_with('[') || rest.starts_with(']') || is_unbracketed_range(rest) {
            ValueType::Range
        } else {
            ValueType::Simple
        }
    }

    /// Reads a single value literal.
    pub fn value_part(&mut self) -> Result<LexedValue, ConditionError> {
        self.read_value(false)
    }

    fn read_value(&mut self, range_bound: bool) -> Result<LexedValue, ConditionError> {
        let column = self.column();
        let rest = self.rest();

        if rest.starts_with('"') {
            let (text, remaining) = self.read_quoted(rest)?;
            self.advance_to(remaining);
            return Ok(LexedValue {
                text,
                column,
                quoted: true,
            });
        }

        let end = rest
            .find(|c: char| is_value_terminator(c, range_bound))
            .unwrap_or(rest.len());
        let text = &rest[..end];

        if text.is_empty() {
            return Err(self.create_format_error(
                ErrorKind::Syntax,
                format!("expected a value, found {}", self.describe_current()),
            ));
        }

        if let Some((index, c)) = text
            .char_indices()
            .find(|(_, c)| *c == '"' || RESERVED_CHARS.contains(c))
        {
            return Err(ConditionError::new(
                ErrorKind::Lexical,
                self.column_at(self.cursor + index),
                format!(
                    "unquoted value \"{}\" contains reserved character \"{}\", quote the value",
                    text, c
                ),
            ));
        }

        self.cursor += end;
        Ok(LexedValue {
            text: text.to_string(),
            column,
            quoted: false,
        })
    }

    /// Decodes a quoted literal starting at `input` (which begins with `"`).
    fn read_quoted(&self, input: &'a str) -> Result<(String, &'a str), ConditionError> {
        let start = self.input.len() - input.len();
        let mut text = String::new();
        let mut line_break = None;
        let mut chars = input.char_indices().skip(1).peekable();

        while let Some((index, c)) = chars.next() {
            match c {
                '"' if chars.peek().map(|(_, next)| *next) == Some('"') => {
                    chars.next();
                    text.push('"');
                }
                '"' => {
                    if let Some(offset) = line_break {
                        return Err(ConditionError::new(
                            ErrorKind::Lexical,
                            self.column_at(offset),
                            "line breaks are not allowed within a value",
                        ));
                    }
                    return Ok((text, &input[index + 1..]));
                }
                '\n' | '\r' => {
                    line_break.get_or_insert(start + index);
                    text.push(c);
                }
                _ => text.push(c),
            }
        }

        Err(ConditionError::new(
            ErrorKind::Lexical,
            self.column_at(start),
            "unterminated quoted value, expected closing \"",
        ))
    }

    /// Reads `<operator> <value>`.
    pub fn comparison_value(&mut self) -> Result<(CompareOperator, LexedValue), ConditionError> {
        let operator = self
            .consume(compare_operator)
            .and_then(CompareOperator::from_token)
            .ok_or_else(|| {
                self.create_format_error(
                    ErrorKind::Syntax,
                    format!("expected a comparison operator, found {}", self.describe_current()),
                )
            })?;

        self.skip_whitespace();
        let value = self.value_part()?;

        Ok((operator, value))
    }

    /// Reads `[lower ~ upper]` with optional delimiters.
    pub fn range_value(&mut self) -> Result<RangeParts, ConditionError> {
        let lower_inclusive = match self.consume(range_delimiter) {
            Some(']') => false,
            _ => true,
        };

        self.skip_whitespace();
        let lower = self.read_value(true)?;
        self.skip_whitespace();
        self.expects("~")?;
        self.skip_whitespace();
        let upper = self.read_value(true)?;

        let upper_end = self.cursor;
        let delimiter = self
            .match_optional("[")
            .or_else(|| self.match_optional("]"));
        if delimiter.is_none() {
            self.cursor = upper_end;
        }

        Ok(RangeParts {
            lower,
            upper,
            lower_inclusive,
            upper_inclusive: delimiter != Some("["),
            upper_delimited: delimiter.is_some(),
        })
    }

    /// Reads `~[i][!](*|>|<) value`.
    pub fn pattern_match_value(&mut self) -> Result<PatternParts, ConditionError> {
        let (case_insensitive, negated, operator) =
            self.consume(pattern_operator).ok_or_else(|| {
                self.create_format_error(
                    ErrorKind::Syntax,
                    "expected a pattern-match operator (\"~*\", \"~>\" or \"~<\")",
                )
            })?;

        let kind = PatternMatchType::from_operator(operator, negated.is_some()).ok_or_else(|| {
            self.create_format_error(ErrorKind::Syntax, "unsupported pattern-match operator")
        })?;

        self.skip_whitespace();
        let value = self.value_part()?;

        Ok(PatternParts {
            kind,
            case_insensitive: case_insensitive.is_some(),
            value,
        })
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    /// Skips the rest of a broken field-value pair: up to and including the
    /// next `;` on this level, up to (excluding) a `)` closing the enclosing
    /// group, or to the end.
    pub fn skip_to_pair_end(&mut self) {
        let mut depth = 0usize;
        while let Some(c) = self.peek_char() {
            match c {
                '"' => {
                    self.skip_quoted();
                    continue;
                }
                '(' => depth += 1,
                ')' if depth == 0 => return,
                ')' => depth -= 1,
                ';' if depth == 0 => {
                    self.advance_char();
                    return;
                }
                _ => {}
            }
            self.advance_char();
        }
    }

    /// Skips a group body; the cursor must be just past its `(`. Consumes the
    /// matching `)`.
    pub fn skip_group_body(&mut self) {
        let mut depth = 1usize;
        while let Some(c) = self.peek_char() {
            match c {
                '"' => {
                    self.skip_quoted();
                    continue;
                }
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance_char();
                        return;
                    }
                }
                _ => {}
            }
            self.advance_char();
        }
    }

    fn skip_quoted(&mut self) {
        match scan_quoted(&self.rest()[1..]) {
            Some(remaining) => self.advance_to(remaining),
            None => self.cursor = self.input.len(),
        }
    }
}

// =============================================================================
// Recognizers
// =============================================================================

fn group_opening(input: &str) -> IResult<&str, Option<char>> {
    terminated(opt(one_of("*&")), pair(multispace0, char('(')))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
    ))(input)
}

fn field_name(input: &str) -> IResult<&str, &str> {
    terminated(identifier, pair(space0, one_of(":=")))(input)
}

/// Returns `true` when `name` can be written as a field token: a letter or
/// `_`, followed by letters, digits, `_` or `-`.
pub fn is_field_name(name: &str) -> bool {
    all_consuming(identifier)(name).is_ok()
}

fn field_label(input: &str) -> IResult<&str, &str> {
    terminated(take_while1(is_label_char), char(':'))(input)
}

fn compare_operator(input: &str) -> IResult<&str, &str> {
    alt((tag("<>"), tag("<="), tag(">="), tag("<"), tag(">")))(input)
}

fn pattern_operator(input: &str) -> IResult<&str, (Option<char>, Option<char>, char)> {
    preceded(
        char('~'),
        tuple((opt(char('i')), opt(char('!')), one_of("*><"))),
    )(input)
}

fn range_delimiter(input: &str) -> IResult<&str, char> {
    one_of("[]")(input)
}

fn is_label_char(c: char) -> bool {
    !(c == ':' || c == '"' || c == '\n' || c == '\r' || RESERVED_CHARS.contains(&c))
}

fn is_value_terminator(c: char, range_bound: bool) -> bool {
    matches!(c, ',' | ';' | ')' | '~') || c.is_whitespace() || (range_bound && matches!(c, '[' | ']'))
}

/// Returns `true` when `input` starts with a value part followed by `~`.
fn is_unbracketed_range(input: &str) -> bool {
    let remaining = if let Some(quoted) = input.strip_prefix('"') {
        match scan_quoted(quoted) {
            Some(remaining) => remaining,
            None => return false,
        }
    } else {
        let end = input
            .find(|c: char| is_value_terminator(c, true))
            .unwrap_or(input.len());
        if end == 0 {
            return false;
        }
        &input[end..]
    };

    remaining.trim_start_matches([' ', '\t']).starts_with('~')
}

/// Finds the end of a quoted literal; `input` starts after the opening quote.
fn scan_quoted(input: &str) -> Option<&str> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            if bytes.get(i + 1) == Some(&b'"') {
                i += 2;
                continue;
            }
            return Some(&input[i + 1..]);
        }
        i += 1;
    }
    None
}

// =============================================================================
// Tests
// =============================================================================
