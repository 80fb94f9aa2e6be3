use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;

/// A location in the template source.
///
/// `line` and `column` are 1-indexed, `offset` is the 0-indexed byte offset
/// into the source string. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
	pub line: usize,
	pub column: usize,
	pub offset: usize,
}

impl Default for Point {
	fn default() -> Self {
		Self::START
	}
}

impl Point {
	/// The first character of any source.
	pub const START: Point = Point {
		line: 1,
		column: 1,
		offset: 0,
	};

	pub fn new(line: usize, column: usize, offset: usize) -> Self {
		Self {
			line,
			column,
			offset,
		}
	}

	/// Move the point past `text`, which must be the source slice starting at
	/// this point.
	pub fn advance_str(&mut self, text: &str) {
		for ch in text.chars() {
			self.advance_char(ch);
		}
	}

	pub fn advance_char(&mut self, ch: char) {
		self.offset += ch.len_utf8();

		if ch == '\n' {
			self.line += 1;
			self.column = 1;
		} else {
			self.column += 1;
		}
	}
}

impl Display for Point {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.line, self.column)
	}
}
