use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;

use crate::Point;
use crate::TemplError;
use crate::TemplResult;
use crate::lexer::lex;
use crate::tokens::Token;
use crate::tokens::TokenKind;
use crate::variables::Variable;
use crate::variables::VariableKind;
use crate::variables::VariableStore;

/// A non-fatal problem found while rendering. Rendering never stops because
/// of a diagnostic; the offending placeholder is either replaced by its
/// default or copied to the output unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum RenderDiagnostic {
	/// `{name}` has no matching key.
	UnresolvedKey { name: String, position: Point },
	/// `$name ...` has no matching constant.
	UnresolvedConstant { name: String, position: Point },
	/// `${name}` has no matching option and no default.
	UnresolvedOption { name: String, position: Point },
	/// `${name}` points at a constant that does not exist and has no
	/// default.
	MissingOptionTarget {
		name: String,
		target: String,
		position: Point,
	},
	/// `${name:default}` could not be resolved so the default was used.
	/// `target` is set when the option existed but its constant did not.
	OptionDefaultUsed {
		name: String,
		target: Option<String>,
		default: String,
		position: Point,
	},
}

impl RenderDiagnostic {
	/// A stable identifier for the kind of diagnostic.
	pub fn code(&self) -> &'static str {
		match self {
			Self::UnresolvedKey { .. } => "templ::unresolved_key",
			Self::UnresolvedConstant { .. } => "templ::unresolved_constant",
			Self::UnresolvedOption { .. } => "templ::unresolved_option",
			Self::MissingOptionTarget { .. } => "templ::missing_option_target",
			Self::OptionDefaultUsed { .. } => "templ::option_default_used",
		}
	}

	/// The identifier written in the template.
	pub fn name(&self) -> &str {
		match self {
			Self::UnresolvedKey { name, .. }
			| Self::UnresolvedConstant { name, .. }
			| Self::UnresolvedOption { name, .. }
			| Self::MissingOptionTarget { name, .. }
			| Self::OptionDefaultUsed { name, .. } => name,
		}
	}

	/// Where the placeholder starts in the template source.
	pub fn position(&self) -> Point {
		match self {
			Self::UnresolvedKey { position, .. }
			| Self::UnresolvedConstant { position, .. }
			| Self::UnresolvedOption { position, .. }
			| Self::MissingOptionTarget { position, .. }
			| Self::OptionDefaultUsed { position, .. } => *position,
		}
	}
}

impl Display for RenderDiagnostic {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::UnresolvedKey { name, .. } => write!(f, "key `{name}` is not set"),
			Self::UnresolvedConstant { name, .. } => write!(f, "constant `{name}` is not set"),
			Self::UnresolvedOption { name, .. } => {
				write!(f, "option `{name}` is not set and has no default")
			}
			Self::MissingOptionTarget { name, target, .. } => {
				write!(
					f,
					"option `{name}` points at constant `{target}` which is not set"
				)
			}
			Self::OptionDefaultUsed {
				name,
				target: None,
				default,
				..
			} => write!(f, "option `{name}` is not set, using default `{default}`"),
			Self::OptionDefaultUsed {
				name,
				target: Some(target),
				default,
				..
			} => {
				write!(
					f,
					"option `{name}` points at unset constant `{target}`, using default \
					 `{default}`"
				)
			}
		}
	}
}

/// The outcome of rendering a template.
#[derive(Debug, Clone)]
pub struct Rendered {
	/// The rendered text.
	pub output: String,
	/// Advisory notes collected in source order.
	pub diagnostics: Vec<RenderDiagnostic>,
	/// The seed store plus every setting read from the template header.
	pub store: VariableStore,
}

impl Rendered {
	/// Returns true if every placeholder resolved without a diagnostic.
	pub fn is_clean(&self) -> bool {
		self.diagnostics.is_empty()
	}

	/// The settings declared in the template header.
	pub fn settings(&self) -> BTreeMap<&str, &str> {
		self.store.settings()
	}

	/// The `lang` setting declared in the template header.
	pub fn language(&self) -> Option<&str> {
		self.store.language()
	}

	/// Return the output, or an error if any diagnostic was produced.
	pub fn into_strict(self) -> TemplResult<String> {
		if self.diagnostics.is_empty() {
			Ok(self.output)
		} else {
			Err(TemplError::UnresolvedPlaceholders(self.diagnostics.len()))
		}
	}
}

/// An identifier a template needs in order to render without diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
	pub name: String,
	pub kind: VariableKind,
	/// The inline default of an option placeholder, if one was written.
	pub default: Option<String>,
}

/// A bounds checked view over a token slice.
#[derive(Debug, Clone, Copy)]
pub struct TokenCursor<'a> {
	tokens: &'a [Token],
	index: usize,
}

impl<'a> TokenCursor<'a> {
	pub fn new(tokens: &'a [Token]) -> Self {
		Self { tokens, index: 0 }
	}

	/// The token `offset` places after the cursor.
	pub fn peek(&self, offset: usize) -> Option<&'a Token> {
		self.tokens.get(self.index + offset)
	}

	pub fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
		self.peek(offset).map(|token| token.kind)
	}

	/// Whether the tokens at the cursor have exactly the given kinds.
	pub fn matches(&self, kinds: &[TokenKind]) -> bool {
		kinds
			.iter()
			.enumerate()
			.all(|(offset, kind)| self.peek_kind(offset) == Some(*kind))
	}

	/// The `len` tokens starting at the cursor, clamped to the end.
	pub fn span(&self, len: usize) -> &'a [Token] {
		let end = (self.index + len).min(self.tokens.len());
		&self.tokens[self.index.min(end)..end]
	}

	pub fn advance(&mut self, count: usize) {
		self.index = (self.index + count).min(self.tokens.len());
	}

	pub fn is_done(&self) -> bool {
		self.index >= self.tokens.len()
	}
}

const KEY_PATTERN: [TokenKind; 3] = [TokenKind::LBrace, TokenKind::Text, TokenKind::RBrace];
const OPTION_PATTERN: [TokenKind; 4] = [
	TokenKind::Dollar,
	TokenKind::LBrace,
	TokenKind::Text,
	TokenKind::RBrace,
];
const OPTION_WITH_DEFAULT_PATTERN: [TokenKind; 6] = [
	TokenKind::Dollar,
	TokenKind::LBrace,
	TokenKind::Text,
	TokenKind::Colon,
	TokenKind::Text,
	TokenKind::RBrace,
];
const CONSTANT_PATTERN: [TokenKind; 2] = [TokenKind::Dollar, TokenKind::Text];
const SETTING_PATTERN: [TokenKind; 4] = [
	TokenKind::Text,
	TokenKind::Colon,
	TokenKind::Text,
	TokenKind::Newline,
];

/// A placeholder recognised at the cursor, borrowing from the token stream.
#[derive(Debug, Clone, Copy)]
enum Placeholder<'a> {
	/// `{name}`
	Key { name: &'a str, span: &'a [Token] },
	/// `${name}` or `${name:default}`
	Option {
		name: &'a str,
		default: Option<&'a str>,
		span: &'a [Token],
	},
	/// `$name rest`, where `rest` starts with the separating space.
	Constant {
		name: &'a str,
		rest: &'a str,
		span: &'a [Token],
	},
}

impl<'a> Placeholder<'a> {
	/// Classify the tokens at the cursor, trying each form in precedence
	/// order.
	fn at(cursor: &TokenCursor<'a>) -> Option<Self> {
		if cursor.matches(&KEY_PATTERN) {
			let span = cursor.span(KEY_PATTERN.len());
			return Some(Self::Key {
				name: span[1].trimmed(),
				span,
			});
		}

		if cursor.matches(&OPTION_PATTERN) {
			let span = cursor.span(OPTION_PATTERN.len());
			return Some(Self::Option {
				name: span[2].trimmed(),
				default: None,
				span,
			});
		}

		if cursor.matches(&OPTION_WITH_DEFAULT_PATTERN) {
			let span = cursor.span(OPTION_WITH_DEFAULT_PATTERN.len());
			return Some(Self::Option {
				name: span[2].trimmed(),
				default: Some(span[4].trimmed()),
				span,
			});
		}

		if cursor.matches(&CONSTANT_PATTERN) {
			let span = cursor.span(CONSTANT_PATTERN.len());
			let content = span[1].content.as_str();

			// The identifier ends at the first space, which must not be the
			// first character.
			if let Some(index) = content.find(' ').filter(|index| *index > 0) {
				return Some(Self::Constant {
					name: &content[..index],
					rest: &content[index..],
					span,
				});
			}
		}

		None
	}

	fn span(&self) -> &'a [Token] {
		match *self {
			Self::Key { span, .. } | Self::Option { span, .. } | Self::Constant { span, .. } => {
				span
			}
		}
	}

	fn position(&self) -> Point {
		self.span().first().map(|token| token.start).unwrap_or_default()
	}

	/// Append the source text of the placeholder unchanged.
	fn push_literal(&self, output: &mut String) {
		for token in self.span() {
			output.push_str(&token.content);
		}
	}

	/// Resolve the placeholder against `store`, appending to `output`.
	/// Returns a diagnostic when the placeholder could not be resolved
	/// cleanly.
	fn resolve(&self, store: &VariableStore, output: &mut String) -> Option<RenderDiagnostic> {
		let position = self.position();

		match *self {
			Self::Key { name, .. } => {
				if let Some(value) = store.value(name, VariableKind::Key) {
					output.push_str(value);
					return None;
				}

				self.push_literal(output);
				Some(RenderDiagnostic::UnresolvedKey {
					name: name.to_string(),
					position,
				})
			}
			Self::Option { name, default, .. } => {
				let target = store.value(name, VariableKind::Option);

				if let Some(value) =
					target.and_then(|target| store.value(target, VariableKind::Constant))
				{
					output.push_str(value);
					return None;
				}

				if let Some(default) = default {
					output.push_str(default);
					return Some(RenderDiagnostic::OptionDefaultUsed {
						name: name.to_string(),
						target: target.map(ToString::to_string),
						default: default.to_string(),
						position,
					});
				}

				self.push_literal(output);
				Some(match target {
					Some(target) => {
						RenderDiagnostic::MissingOptionTarget {
							name: name.to_string(),
							target: target.to_string(),
							position,
						}
					}
					None => {
						RenderDiagnostic::UnresolvedOption {
							name: name.to_string(),
							position,
						}
					}
				})
			}
			Self::Constant { name, rest, .. } => {
				if let Some(value) = store.value(name, VariableKind::Constant) {
					output.push_str(value);
					output.push_str(rest);
					return None;
				}

				self.push_literal(output);
				Some(RenderDiagnostic::UnresolvedConstant {
					name: name.to_string(),
					position,
				})
			}
		}
	}

	fn requirement(&self) -> Requirement {
		match *self {
			Self::Key { name, .. } => {
				Requirement {
					name: name.to_string(),
					kind: VariableKind::Key,
					default: None,
				}
			}
			Self::Option { name, default, .. } => {
				Requirement {
					name: name.to_string(),
					kind: VariableKind::Option,
					default: default.map(ToString::to_string),
				}
			}
			Self::Constant { name, .. } => {
				Requirement {
					name: name.to_string(),
					kind: VariableKind::Constant,
					default: None,
				}
			}
		}
	}
}

/// Split the stream into the settings header and the body. Without an end
/// of settings marker the header is empty and the whole stream is body.
fn split_header(tokens: &[Token]) -> (&[Token], &[Token]) {
	match tokens
		.iter()
		.position(|token| token.is(TokenKind::EndOfSettings))
	{
		Some(index) => (&tokens[..index], &tokens[index + 1..]),
		None => (&tokens[..0], tokens),
	}
}

/// Record every `name: value` line of the header as a setting. Lines that
/// don't have that shape are skipped.
fn read_settings(header: &[Token], store: &mut VariableStore) {
	let mut cursor = TokenCursor::new(header);

	while !cursor.is_done() {
		if cursor.matches(&SETTING_PATTERN) {
			let span = cursor.span(SETTING_PATTERN.len());

			if span[0].is_non_blank_text() && span[2].is_non_blank_text() {
				let name = span[0].trimmed();
				let value = span[2].trimmed();
				tracing::debug!(name, value, "recorded setting");
				store.insert(name, Variable::setting(value));
			}
		}

		cursor.advance(1);
	}
}

/// Render a lexed template.
///
/// The settings header is read into the store first, then the body is
/// walked left to right. Placeholders that resolve are replaced by their
/// values. Placeholders that don't are copied unchanged (or replaced by
/// their default) and reported in [`Rendered::diagnostics`].
#[tracing::instrument(skip_all, fields(tokens = tokens.len(), seeded = seed.len()))]
pub fn render(tokens: &[Token], seed: VariableStore) -> Rendered {
	let mut store = seed;
	let mut diagnostics = vec![];
	let mut output = String::new();
	let (header, body) = split_header(tokens);

	read_settings(header, &mut store);

	let mut cursor = TokenCursor::new(body);

	while let Some(token) = cursor.peek(0) {
		if let Some(placeholder) = Placeholder::at(&cursor) {
			if let Some(diagnostic) = placeholder.resolve(&store, &mut output) {
				tracing::debug!(code = diagnostic.code(), position = %diagnostic.position(), "{diagnostic}");
				diagnostics.push(diagnostic);
			}

			cursor.advance(placeholder.span().len());
			continue;
		}

		output.push_str(&token.content);
		cursor.advance(1);
	}

	Rendered {
		output,
		diagnostics,
		store,
	}
}

/// Lex and render `template` in one step.
pub fn render_str(template: impl AsRef<str>, seed: VariableStore) -> Rendered {
	let tokens = lex(template.as_ref());
	render(&tokens, seed)
}

/// List every identifier referenced by the template body, in order of first
/// use and without duplicates.
pub fn draft(tokens: &[Token]) -> Vec<Requirement> {
	let (_, body) = split_header(tokens);
	let mut cursor = TokenCursor::new(body);
	let mut seen = HashSet::new();
	let mut requirements = vec![];

	while !cursor.is_done() {
		let Some(placeholder) = Placeholder::at(&cursor) else {
			cursor.advance(1);
			continue;
		};

		let requirement = placeholder.requirement();

		if seen.insert((requirement.name.clone(), requirement.kind)) {
			requirements.push(requirement);
		}

		cursor.advance(placeholder.span().len());
	}

	requirements
}
