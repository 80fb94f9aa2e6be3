use crate::Token;
use crate::TokenKind;
use crate::VariableStore;

/// A settings-headed template using an option default and a constant.
pub const GREETING_TEMPLATE: &str = "lang: de \nend-of-settings!\nHallo ich bin ${name:Peter} \
                                     Lustig.\nMein $elternteil ist doof";

/// Reduce tokens to `(kind, content)` pairs so tests don't need to spell out
/// positions.
pub fn summarize(tokens: &[Token]) -> Vec<(TokenKind, &str)> {
	tokens
		.iter()
		.map(|token| (token.kind, token.content.as_str()))
		.collect()
}

pub fn greeting_store() -> VariableStore {
	VariableStore::new().with_constant("elternteil", "Mutter")
}

pub fn travel_store() -> VariableStore {
	VariableStore::new()
		.with_key("city", "Berlin")
		.with_option("name", "color")
		.with_constant("color", "blue")
}
