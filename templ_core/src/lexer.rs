use logos::Logos;

use crate::Point;
use crate::tokens::END_OF_SETTINGS_MARKER;
use crate::tokens::Token;
use crate::tokens::TokenKind;
use crate::tokens::Tokens;

/// Raw tokens produced by logos while inside the settings header.
#[derive(Logos, Debug, PartialEq)]
enum SettingsToken {
	#[regex(r"[ \t\r]+")]
	Whitespace,
	#[token(":")]
	Colon,
	#[token("\n")]
	Newline,
	#[regex(r"[^ \t\r:\n]+")]
	Word,
}

/// Raw tokens produced by logos for the template body.
#[derive(Logos, Debug, PartialEq)]
enum BodyToken {
	#[token("{")]
	LBrace,
	#[token("}")]
	RBrace,
	#[token("$")]
	Dollar,
	#[token(":")]
	Colon,
	#[regex(r"[^{}$:]+")]
	Text,
}

/// The two lexing modes. The walker moves from `Settings` to `Body` at most
/// once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexerContext {
	/// Inside the `name: value` header that precedes the body.
	Settings,
	/// Inside the template body.
	Body,
}

/// Walks the logos token streams of each mode, building the final token
/// list and keeping track of source positions.
struct TokenWalker<'a> {
	/// The full template source.
	source: &'a str,
	/// Byte offset of the first unconsumed character.
	cursor: usize,
	/// Position of the first unconsumed character.
	position: Point,
	context: LexerContext,
	tokens: Vec<Token>,
}

impl<'a> TokenWalker<'a> {
	fn new(source: &'a str) -> Self {
		let context = if source.contains(END_OF_SETTINGS_MARKER) {
			LexerContext::Settings
		} else {
			LexerContext::Body
		};

		Self {
			source,
			cursor: 0,
			position: Point::START,
			context,
			tokens: vec![],
		}
	}

	/// Emit a token for `slice`, which must start at the cursor.
	fn push_token(&mut self, kind: TokenKind, slice: &str) {
		self.tokens.push(Token::at(kind, slice, self.position));
		self.skip(slice);
	}

	/// Move the cursor past `slice` without emitting anything.
	fn skip(&mut self, slice: &str) {
		self.position.advance_str(slice);
		self.cursor += slice.len();
	}

	/// Tokenize the settings header. Returns `true` once the end of settings
	/// marker has been consumed, `false` when the input ran out first.
	fn walk_settings(&mut self) -> bool {
		let source = self.source;
		let rest = &source[self.cursor..];

		for (result, span) in SettingsToken::lexer(rest).spanned() {
			let slice = &rest[span.clone()];

			match result {
				Ok(SettingsToken::Whitespace) => self.skip(slice),
				Ok(SettingsToken::Colon) => self.push_token(TokenKind::Colon, slice),
				Ok(SettingsToken::Newline) => self.push_token(TokenKind::Newline, slice),
				Ok(SettingsToken::Word) if slice == END_OF_SETTINGS_MARKER => {
					self.push_token(TokenKind::EndOfSettings, slice);

					// Whatever follows the marker on its line is discarded.
					let after = &rest[span.end..];
					let line_end = after.find('\n').map_or(after.len(), |index| index + 1);
					self.skip(&after[..line_end]);
					self.context = LexerContext::Body;

					return true;
				}
				Ok(SettingsToken::Word) | Err(()) => self.push_token(TokenKind::Text, slice),
			}
		}

		false
	}

	fn walk_body(&mut self) {
		let source = self.source;
		let rest = &source[self.cursor..];

		for (result, span) in BodyToken::lexer(rest).spanned() {
			let slice = &rest[span];
			let kind = match result {
				Ok(BodyToken::LBrace) => TokenKind::LBrace,
				Ok(BodyToken::RBrace) => TokenKind::RBrace,
				Ok(BodyToken::Dollar) => TokenKind::Dollar,
				Ok(BodyToken::Colon) => TokenKind::Colon,
				Ok(BodyToken::Text) | Err(()) => TokenKind::Text,
			};

			self.push_token(kind, slice);
		}
	}

	/// Drop everything lexed so far and start over in body mode.
	fn restart_as_body(&mut self) {
		self.tokens.clear();
		self.cursor = 0;
		self.position = Point::START;
		self.context = LexerContext::Body;
	}

	fn process(mut self) -> Vec<Token> {
		if self.context == LexerContext::Settings && !self.walk_settings() {
			tracing::warn!(
				tokens = self.tokens.len(),
				"settings header never closed with `{END_OF_SETTINGS_MARKER}`, lexing the whole \
				 template as body"
			);
			self.restart_as_body();
		}

		self.walk_body();
		self.tokens
	}
}

/// Convert raw template text into an ordered token stream.
///
/// When the text contains `end-of-settings!` the lexer starts in settings
/// mode and switches to body mode once the marker is seen as a complete
/// word. Otherwise the whole input is lexed as body, including when the
/// marker only ever appears inside a longer word.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Tokens {
	let tokens = TokenWalker::new(source).process();
	tracing::trace!(count = tokens.len(), "lexed template");

	Tokens::new(tokens)
}
