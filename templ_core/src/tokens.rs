use std::fmt::Display;

use derive_more::Deref;
use derive_more::DerefMut;
use serde::Deserialize;
use serde::Serialize;

use crate::Point;

/// The literal text that closes the settings header.
pub const END_OF_SETTINGS_MARKER: &str = "end-of-settings!";

/// The classification of a single lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
	/// A run of plain text.
	Text,
	/// `:`
	Colon,
	/// `{`
	#[serde(rename = "LBRACE")]
	LBrace,
	/// `}`
	#[serde(rename = "RBRACE")]
	RBrace,
	/// `$`
	Dollar,
	/// `\n`, only produced inside the settings header.
	Newline,
	/// `end-of-settings!`
	EndOfSettings,
	/// Reserved for identifier classification. The lexer currently reports
	/// identifiers as [`TokenKind::Text`] and leaves classification to the
	/// renderer.
	Identifier,
}

impl Display for TokenKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			TokenKind::Text => "TEXT",
			TokenKind::Colon => "COLON",
			TokenKind::LBrace => "LBRACE",
			TokenKind::RBrace => "RBRACE",
			TokenKind::Dollar => "DOLLAR",
			TokenKind::Newline => "NEWLINE",
			TokenKind::EndOfSettings => "END_OF_SETTINGS",
			TokenKind::Identifier => "IDENTIFIER",
		};

		f.write_str(name)
	}
}

/// A token together with the exact source text it was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	pub kind: TokenKind,
	/// The substring of the source this token covers. For
	/// [`TokenKind::EndOfSettings`] this is the marker text.
	pub content: String,
	/// Where the token starts in the source.
	pub start: Point,
}

impl Token {
	/// Create a token positioned at the start of the source. Mostly useful
	/// when building token streams by hand.
	pub fn new(kind: TokenKind, content: impl Into<String>) -> Self {
		Self::at(kind, content, Point::START)
	}

	pub fn at(kind: TokenKind, content: impl Into<String>, start: Point) -> Self {
		Self {
			kind,
			content: content.into(),
			start,
		}
	}

	pub fn text(content: impl Into<String>) -> Self {
		Self::new(TokenKind::Text, content)
	}

	pub fn is(&self, kind: TokenKind) -> bool {
		self.kind == kind
	}

	/// A text token that contains something other than whitespace.
	pub fn is_non_blank_text(&self) -> bool {
		self.kind == TokenKind::Text && !self.content.trim().is_empty()
	}

	/// The content with surrounding whitespace removed.
	pub fn trimmed(&self) -> &str {
		self.content.trim()
	}
}

impl Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.content)
	}
}

/// The ordered output of [`lex`](crate::lex).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tokens(
	#[deref]
	#[deref_mut]
	Vec<Token>,
);

impl Tokens {
	pub fn new(tokens: Vec<Token>) -> Self {
		Self(tokens)
	}

	/// Whether the stream contains a closed settings header.
	pub fn has_settings(&self) -> bool {
		self.0.iter().any(|token| token.is(TokenKind::EndOfSettings))
	}

	/// Concatenate the content of every token. For templates without a
	/// settings header this reproduces the source text.
	pub fn source_text(&self) -> String {
		self.0.iter().map(|token| token.content.as_str()).collect()
	}
}

impl From<Vec<Token>> for Tokens {
	fn from(tokens: Vec<Token>) -> Self {
		Self(tokens)
	}
}

impl IntoIterator for Tokens {
	type IntoIter = std::vec::IntoIter<Token>;
	type Item = Token;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<'a> IntoIterator for &'a Tokens {
	type IntoIter = std::slice::Iter<'a, Token>;
	type Item = &'a Token;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}
