//! Field path parser
//!
//! Parses the textual path syntax into segments: `/` separates segments, a
//! leading `/` is the document root, and collection segments are written as
//! `name[i]` (array), `name<i>` (list) or `name{i}` (map) with an optional
//! non-negative index.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use super::error::PathError;
use super::Segment;
use crate::types::CollectionKind;
use std::iter::Peekable;
use std::str::CharIndices;

/// Segment separator
pub const SEPARATOR: char = '/';

/// Field path parser
pub struct Parser<'a> {
    /// Input string being parsed
    input: &'a str,
    /// Character iterator with byte offsets
    chars: Peekable<CharIndices<'a>>,
    /// Current byte position in input
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> Result<Self, PathError> {
        if input.is_empty() {
            return Err(PathError::Empty);
        }

        Ok(Self {
            input,
            chars: input.char_indices().peekable(),
            position: 0,
        })
    }

    /// Parse the input into segments, root first
    pub fn parse(mut self) -> Result<Vec<Segment>, PathError> {
        let mut segments = vec![Segment::Root];

        // A leading separator is the explicit root; without one the root is implied.
        if self.current_char() == Some(SEPARATOR) {
            self.advance();
        }

        while !self.is_at_end() {
            segments.push(self.parse_segment()?);

            match self.current_char() {
                Some(SEPARATOR) => {
                    self.advance();
                    // A single trailing separator is dropped during normalization.
                    if self.is_at_end() {
                        break;
                    }
                }
                None => break,
                Some(ch) => {
                    return Err(self.error(format!("unexpected character '{}'", ch)));
                }
            }
        }

        Ok(segments)
    }

    /// Parse one named or collection segment
    fn parse_segment(&mut self) -> Result<Segment, PathError> {
        let start = self.position;
        let name = self.parse_name();

        if name.is_empty() {
            return Err(PathError::malformed(self.input, start, "empty segment name"));
        }

        let Some(open) = self.current_char() else {
            return Ok(Segment::Named(name));
        };

        let Some(kind) = CollectionKind::from_open_marker(open) else {
            return match open {
                SEPARATOR => Ok(Segment::Named(name)),
                other => Err(self.error(format!("unbalanced collection marker '{}'", other))),
            };
        };

        self.advance(); // consume opening marker
        let index = self.parse_index()?;
        self.expect_char(kind.markers().1)?;

        Ok(Segment::Collection { name, kind, index })
    }

    /// Read characters up to a separator or collection marker
    fn parse_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.current_char() {
            if ch == SEPARATOR || is_marker(ch) {
                break;
            }
            name.push(ch);
            self.advance();
        }
        name
    }

    /// Parse the optional index between collection markers
    fn parse_index(&mut self) -> Result<Option<u32>, PathError> {
        let start = self.position;
        let mut digits = String::new();
        while let Some(ch) = self.current_char() {
            if ch == SEPARATOR || is_marker(ch) {
                break;
            }
            digits.push(ch);
            self.advance();
        }

        if digits.is_empty() {
            return Ok(None);
        }

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PathError::malformed(
                self.input,
                start,
                format!("invalid collection index '{}'", digits),
            ));
        }

        digits.parse::<u32>().map(Some).map_err(|_| {
            PathError::malformed(
                self.input,
                start,
                format!("collection index '{}' is out of range", digits),
            )
        })
    }

    fn expect_char(&mut self, expected: char) -> Result<(), PathError> {
        match self.current_char() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(self.error(format!(
                "unbalanced collection marker: expected '{}', found '{}'",
                expected, ch
            ))),
            None => Err(self.error(format!(
                "unbalanced collection marker: expected '{}' before end of input",
                expected
            ))),
        }
    }

    fn current_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn advance(&mut self) {
        if let Some((offset, ch)) = self.chars.next() {
            self.position = offset + ch.len_utf8();
        }
    }

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn error(&self, message: String) -> PathError {
        PathError::malformed(self.input, self.position, message)
    }
}

fn is_marker(ch: char) -> bool {
    matches!(ch, '[' | ']' | '<' | '>' | '{' | '}')
}
