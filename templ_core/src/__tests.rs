use rstest::rstest;
use similar_asserts::assert_eq;
use tracing_test::traced_test;

use super::__fixtures::*;
use super::*;
use crate::TokenKind::*;

// --- Lexer ---

#[rstest]
#[case::empty("", vec![])]
#[case::plain("Hello world", vec![(Text, "Hello world")])]
#[case::newlines_are_text_in_body("Hallo\nWelt", vec![(Text, "Hallo\nWelt")])]
#[case::key("Welcome to {city}!", vec![
	(Text, "Welcome to "),
	(LBrace, "{"),
	(Text, "city"),
	(RBrace, "}"),
	(Text, "!"),
])]
#[case::option_with_default("${name:red}", vec![
	(Dollar, "$"),
	(LBrace, "{"),
	(Text, "name"),
	(Colon, ":"),
	(Text, "red"),
	(RBrace, "}"),
])]
#[case::constant("$elternteil ist", vec![(Dollar, "$"), (Text, "elternteil ist")])]
#[case::adjacent_punctuators("a::b}{", vec![
	(Text, "a"),
	(Colon, ":"),
	(Colon, ":"),
	(Text, "b"),
	(RBrace, "}"),
	(LBrace, "{"),
])]
fn lex_body(#[case] input: &str, #[case] expected: Vec<(TokenKind, &str)>) {
	let tokens = lex(input);
	assert_eq!(summarize(&tokens), expected);
	assert!(!tokens.has_settings());
}

#[rstest]
#[case::single_setting("lang: de\nend-of-settings!\nHi", vec![
	(Text, "lang"),
	(Colon, ":"),
	(Text, "de"),
	(Newline, "\n"),
	(EndOfSettings, "end-of-settings!"),
	(Text, "Hi"),
])]
#[case::rest_of_marker_line_is_skipped("lang:de end-of-settings! trailing\n{x}", vec![
	(Text, "lang"),
	(Colon, ":"),
	(Text, "de"),
	(EndOfSettings, "end-of-settings!"),
	(LBrace, "{"),
	(Text, "x"),
	(RBrace, "}"),
])]
#[case::marker_at_end_of_input("lang: de\nend-of-settings!", vec![
	(Text, "lang"),
	(Colon, ":"),
	(Text, "de"),
	(Newline, "\n"),
	(EndOfSettings, "end-of-settings!"),
])]
#[case::marker_only_once("end-of-settings!\nfoo end-of-settings! bar", vec![
	(EndOfSettings, "end-of-settings!"),
	(Text, "foo end-of-settings! bar"),
])]
#[case::whitespace_is_dropped_in_header("\t a \t:  b \nend-of-settings!\n", vec![
	(Text, "a"),
	(Colon, ":"),
	(Text, "b"),
	(Newline, "\n"),
	(EndOfSettings, "end-of-settings!"),
])]
#[case::crlf_line_endings("lang: de\r\nend-of-settings!\r\nHi", vec![
	(Text, "lang"),
	(Colon, ":"),
	(Text, "de"),
	(Newline, "\n"),
	(EndOfSettings, "end-of-settings!"),
	(Text, "Hi"),
])]
fn lex_settings_header(#[case] input: &str, #[case] expected: Vec<(TokenKind, &str)>) {
	let tokens = lex(input);
	assert_eq!(summarize(&tokens), expected);
	assert!(tokens.has_settings());
}

#[test]
#[traced_test]
fn lex_unterminated_header_relexes_as_body() {
	let source = "title: x\nnot-end-of-settings!";
	let tokens = lex(source);
	assert_eq!(
		summarize(&tokens),
		vec![
			(Text, "title"),
			(Colon, ":"),
			(Text, " x\nnot-end-of-settings!"),
		]
	);
	assert_eq!(tokens[2].start, Point::new(1, 7, 6));
	assert_eq!(tokens.source_text(), source);
	assert!(!tokens.has_settings());
	assert!(logs_contain("settings header never closed"));
}

#[rstest]
#[case("Just some text.")]
#[case("Welcome to {city}!")]
#[case("Sehr ${Anrede} {name}\n{nachricht}\n$Mfg\n$Sende")]
#[case("Grüße {name} – $x y ${a:b} }{ :: $")]
#[case("{name")]
fn lex_preserves_source_without_header(#[case] input: &str) {
	assert_eq!(lex(input).source_text(), input);
}

#[test]
fn lex_tracks_positions() {
	let tokens = lex("lang: de\nend-of-settings!\nHi {x}");
	let positions: Vec<_> = tokens.iter().map(|token| token.start).collect();

	assert_eq!(
		positions,
		vec![
			Point::new(1, 1, 0),
			Point::new(1, 5, 4),
			Point::new(1, 7, 6),
			Point::new(1, 9, 8),
			Point::new(2, 1, 9),
			Point::new(3, 1, 26),
			Point::new(3, 4, 29),
			Point::new(3, 5, 30),
			Point::new(3, 6, 31),
		]
	);
}

#[test]
fn lex_positions_count_characters_not_bytes() {
	let tokens = lex("Grüße {x}");
	assert_eq!(tokens[1].start, Point::new(1, 7, 8));
}

// --- Token cursor ---

#[test]
fn token_cursor_never_reads_past_the_end() {
	let tokens = lex("{a");
	let mut cursor = TokenCursor::new(&tokens);

	assert_eq!(cursor.peek_kind(0), Some(LBrace));
	assert_eq!(cursor.peek_kind(1), Some(Text));
	assert_eq!(cursor.peek(2), None);
	assert!(!cursor.matches(&[LBrace, Text, RBrace]));
	assert_eq!(cursor.span(10).len(), 2);

	cursor.advance(10);
	assert!(cursor.is_done());
	assert_eq!(cursor.peek(0), None);
	assert!(cursor.span(1).is_empty());
}

// --- Variable store ---

#[test]
fn store_keeps_same_name_per_kind() {
	let mut store = VariableStore::new()
		.with_key("x", "key")
		.with_constant("x", "constant");

	assert_eq!(store.value("x", VariableKind::Key), Some("key"));
	assert_eq!(store.value("x", VariableKind::Constant), Some("constant"));
	assert_eq!(store.get("x", VariableKind::Option), None);
	assert_eq!(store.len(), 2);

	let previous = store.insert("x", Variable::key("other"));
	assert_eq!(previous, Some(Variable::key("key")));
	assert_eq!(store.value("x", VariableKind::Key), Some("other"));
	assert_eq!(store.len(), 2);
}

#[test]
fn store_reports_language_setting() {
	let store = VariableStore::new().with_setting(LANGUAGE_SETTING, "fr");
	assert_eq!(store.language(), Some("fr"));
	assert!(VariableStore::new().language().is_none());
	assert!(VariableStore::new().is_empty());
}

// --- Rendering ---

#[test]
fn render_plain_text_unchanged() {
	let input = "Just some text.\nWith two lines.";
	let rendered = render_str(input, VariableStore::new());

	assert_eq!(rendered.output, input);
	assert!(rendered.is_clean());
}

#[rstest]
#[case::key("Welcome to {city}!", "Welcome to Berlin!")]
#[case::key_with_padding("Welcome to { city }!", "Welcome to Berlin!")]
#[case::option("${name}", "blue")]
#[case::option_ignores_default_when_resolved("${name:red}", "blue")]
#[case::mixed("{city} is ${ name }.", "Berlin is blue.")]
fn render_resolves_placeholders(#[case] input: &str, #[case] expected: &str) {
	let rendered = render_str(input, travel_store());

	assert_eq!(rendered.output, expected);
	assert!(rendered.is_clean());
}

#[rstest]
#[case::key("{city}")]
#[case::option("${name}")]
#[case::constant("$city is far")]
#[case::padded_key("{ city }")]
fn render_preserves_unresolved_placeholders(#[case] input: &str) {
	let rendered = render_str(input, VariableStore::new());

	assert_eq!(rendered.output, input);
	assert_eq!(rendered.diagnostics.len(), 1);
}

#[rstest]
#[case::unclosed_key("{name")]
#[case::unclosed_option("${name")]
#[case::unclosed_default("${name:red")]
#[case::empty_braces("{}")]
#[case::empty_default("${name:}")]
#[case::stray_punctuation("a } b : c {")]
#[case::dollar_at_end("costs 5$")]
#[case::constant_without_space("$name")]
#[case::constant_with_leading_space("$ name")]
#[case::empty_option("${}")]
fn render_passes_through_incomplete_syntax(#[case] input: &str) {
	let rendered = render_str(input, travel_store());

	assert_eq!(rendered.output, input);
	assert!(rendered.is_clean());
}

#[test]
fn render_unresolved_key_reports_position() {
	let rendered = render_str("Hi\n{a} ${b}", VariableStore::new());

	assert_eq!(rendered.output, "Hi\n{a} ${b}");
	assert_eq!(
		rendered.diagnostics,
		vec![
			RenderDiagnostic::UnresolvedKey {
				name: "a".into(),
				position: Point::new(2, 1, 3),
			},
			RenderDiagnostic::UnresolvedOption {
				name: "b".into(),
				position: Point::new(2, 5, 7),
			},
		]
	);
}

#[test]
fn render_option_default_when_option_missing() {
	let rendered = render_str("${name:red}", VariableStore::new());

	assert_eq!(rendered.output, "red");
	assert_eq!(
		rendered.diagnostics,
		vec![RenderDiagnostic::OptionDefaultUsed {
			name: "name".into(),
			target: None,
			default: "red".into(),
			position: Point::START,
		}]
	);
	insta::assert_snapshot!(
		rendered.diagnostics[0].to_string(),
		@"option `name` is not set, using default `red`"
	);
}

#[test]
fn render_option_default_when_target_missing() {
	let store = VariableStore::new().with_option("name", "color");
	let rendered = render_str("${name: red }", store);

	assert_eq!(rendered.output, "red");
	assert_eq!(
		rendered.diagnostics,
		vec![RenderDiagnostic::OptionDefaultUsed {
			name: "name".into(),
			target: Some("color".into()),
			default: "red".into(),
			position: Point::START,
		}]
	);
}

#[test]
fn render_option_missing_target_without_default() {
	let store = VariableStore::new().with_option("name", "color");
	let rendered = render_str("say ${name}", store);

	assert_eq!(rendered.output, "say ${name}");
	assert_eq!(
		rendered.diagnostics,
		vec![RenderDiagnostic::MissingOptionTarget {
			name: "name".into(),
			target: "color".into(),
			position: Point::new(1, 5, 4),
		}]
	);
	assert_eq!(rendered.diagnostics[0].code(), "templ::missing_option_target");
}

#[test]
fn render_constant_keeps_text_after_identifier() {
	let rendered = render_str("Mein $elternteil ist doof", greeting_store());

	assert_eq!(rendered.output, "Mein Mutter ist doof");
	assert!(rendered.is_clean());
}

#[test]
fn render_unresolved_constant() {
	let rendered = render_str("Mein $vater ist doof", greeting_store());

	assert_eq!(rendered.output, "Mein $vater ist doof");
	assert_eq!(
		rendered.diagnostics,
		vec![RenderDiagnostic::UnresolvedConstant {
			name: "vater".into(),
			position: Point::new(1, 6, 5),
		}]
	);
}

#[test]
fn render_looks_up_by_kind() {
	let store = VariableStore::new()
		.with_key("x", "K")
		.with_constant("x", "C")
		.with_constant("city", "Paris");
	let rendered = render_str("{x} $x y {city}", store);

	assert_eq!(rendered.output, "K C y {city}");
	assert_eq!(rendered.diagnostics.len(), 1);
	assert_eq!(rendered.diagnostics[0].name(), "city");
}

#[test]
fn render_records_settings() {
	let rendered = render_str("lang: de\nend-of-settings!\nHi", VariableStore::new());

	assert_eq!(rendered.output, "Hi");
	assert_eq!(rendered.language(), Some("de"));
	assert_eq!(
		rendered.store.get("lang", VariableKind::Setting),
		Some(&Variable::setting("de"))
	);
	assert!(rendered.is_clean());
}

#[test]
fn render_skips_malformed_setting_lines() {
	let input = "lang de\ntitle: Hello World\nauthor: me\nend-of-settings!\nBody";
	let rendered = render_str(input, VariableStore::new());

	assert_eq!(rendered.output, "Body");
	assert_eq!(
		rendered.settings().into_iter().collect::<Vec<_>>(),
		vec![("author", "me")]
	);
}

#[test]
fn render_settings_do_not_shadow_keys() {
	let store = VariableStore::new().with_key("city", "Berlin");
	let rendered = render_str("city: Paris\nend-of-settings!\n{city}", store);

	assert_eq!(rendered.output, "Berlin");
	assert_eq!(
		rendered.store.value("city", VariableKind::Setting),
		Some("Paris")
	);
}

#[test]
fn render_discards_marker_line_remainder() {
	let store = VariableStore::new().with_key("k", "v");
	let rendered = render_str("a: b\nend-of-settings! ignored\nBody {k}", store);

	assert_eq!(rendered.output, "Body v");
	assert_eq!(rendered.store.value("a", VariableKind::Setting), Some("b"));
}

#[rstest]
#[case::setting_like_line("title: x\nnot-end-of-settings!")]
#[case::marker_in_backticks("Say `end-of-settings!` to finish the header")]
#[case::marker_with_suffix("end-of-settings!!\n\tindented :  text")]
fn render_unterminated_header_keeps_text(#[case] template: &str) {
	let rendered = render_str(template, VariableStore::new());

	assert_eq!(rendered.output, template);
	assert!(rendered.settings().is_empty());
	assert!(rendered.is_clean());
}

#[test]
fn render_unterminated_header_resolves_placeholders() {
	let store = VariableStore::new().with_key("city", "Berlin");
	let rendered = render_str("not-end-of-settings! in {city}", store);

	assert_eq!(rendered.output, "not-end-of-settings! in Berlin");
	assert!(rendered.is_clean());
}

#[test]
fn render_crlf_settings_header() {
	let store = VariableStore::new().with_key("city", "Berlin");
	let rendered = render_str("lang: de\r\nend-of-settings!\r\nHello world {city}", store);

	assert_eq!(rendered.output, "Hello world Berlin");
	assert_eq!(rendered.language(), Some("de"));
	assert!(rendered.is_clean());
}

#[test]
fn render_greeting_template() {
	let rendered = render_str(GREETING_TEMPLATE, greeting_store());

	assert_eq!(
		rendered.output,
		"Hallo ich bin Peter Lustig.\nMein Mutter ist doof"
	);
	assert_eq!(rendered.language(), Some("de"));
	assert_eq!(rendered.diagnostics.len(), 1);
	assert_eq!(rendered.diagnostics[0].code(), "templ::option_default_used");
}

#[test]
fn render_accepts_hand_built_tokens() {
	let tokens = vec![
		Token::new(LBrace, "{"),
		Token::text("city"),
		Token::new(RBrace, "}"),
		Token::text(" calling"),
	];
	let rendered = render(&tokens, travel_store());

	assert_eq!(rendered.output, "Berlin calling");
}

#[test]
fn render_strict_rejects_diagnostics() -> TemplResult<()> {
	let output = render_str("{city}", travel_store()).into_strict()?;
	assert_eq!(output, "Berlin");

	let result = render_str("{town}", travel_store()).into_strict();
	assert!(matches!(result, Err(TemplError::UnresolvedPlaceholders(1))));

	Ok(())
}

// --- Draft ---

#[test]
fn draft_lists_requirements_in_first_use_order() {
	let tokens = lex("{city} ${name:Peter} $elternteil ist {city} $city x");

	assert_eq!(
		draft(&tokens),
		vec![
			Requirement {
				name: "city".into(),
				kind: VariableKind::Key,
				default: None,
			},
			Requirement {
				name: "name".into(),
				kind: VariableKind::Option,
				default: Some("Peter".into()),
			},
			Requirement {
				name: "elternteil".into(),
				kind: VariableKind::Constant,
				default: None,
			},
			Requirement {
				name: "city".into(),
				kind: VariableKind::Constant,
				default: None,
			},
		]
	);
}

#[test]
fn draft_ignores_settings_header() {
	let tokens = lex("lang: de\nend-of-settings!\n{x}");

	assert_eq!(
		draft(&tokens),
		vec![Requirement {
			name: "x".into(),
			kind: VariableKind::Key,
			default: None,
		}]
	);
}

// --- Seed configuration ---

#[rstest]
#[case::toml(
	SeedFormat::Toml,
	"[constants]\ncolor = \"blue\"\n\n[options]\nname = \"color\"\n\n[keys]\ncity = \"Berlin\"\n"
)]
#[case::json(
	SeedFormat::Json,
	r#"{"constants": {"color": "blue"}, "options": {"name": "color"}, "keys": {"city": "Berlin"}}"#
)]
#[case::yaml(
	SeedFormat::Yaml,
	"constants:\n  color: blue\noptions:\n  name: color\nkeys:\n  city: Berlin\n"
)]
fn seed_parses_each_format(#[case] format: SeedFormat, #[case] content: &str) -> TemplResult<()> {
	let seed = SeedConfig::parse(content, format)?;
	assert_eq!(seed.clone().into_store(), travel_store());

	let rendered = render_str("{city} ${name}", seed.into_store());
	assert_eq!(rendered.output, "Berlin blue");

	Ok(())
}

#[test]
fn seed_empty_content_is_empty_seed() -> TemplResult<()> {
	let seed = SeedConfig::parse("  \n", SeedFormat::Yaml)?;
	assert!(seed.is_empty());

	Ok(())
}

#[test]
fn seed_rejects_unknown_tables() {
	let result = SeedConfig::parse("[settings]\nlang = \"de\"\n", SeedFormat::Toml);
	assert!(matches!(result, Err(TemplError::ConfigParse { .. })));
}

#[rstest]
#[case("toml", Some(SeedFormat::Toml))]
#[case("JSON", Some(SeedFormat::Json))]
#[case("yml", Some(SeedFormat::Yaml))]
#[case("yaml", Some(SeedFormat::Yaml))]
#[case("ini", None)]
#[case("", None)]
fn seed_format_from_extension(#[case] extension: &str, #[case] expected: Option<SeedFormat>) {
	assert_eq!(SeedFormat::from_extension(extension).ok(), expected);
}

#[test]
fn seed_skeleton_renders_without_diagnostics() -> TemplResult<()> {
	let tokens = lex("{city} ${name:Peter} $elternteil ist");
	let skeleton = SeedConfig::from_requirements(&draft(&tokens));

	assert_eq!(skeleton.keys.get("city").map(String::as_str), Some(""));
	assert_eq!(skeleton.options.get("name").map(String::as_str), Some("name"));
	assert_eq!(
		skeleton.constants.get("name").map(String::as_str),
		Some("Peter")
	);

	let written = skeleton.to_string_as(SeedFormat::Toml)?;
	let reparsed = SeedConfig::parse(&written, SeedFormat::Toml)?;
	assert_eq!(reparsed, skeleton);

	let rendered = render(&tokens, reparsed.into_store());
	assert_eq!(rendered.output, " Peter  ist");
	assert!(rendered.is_clean());

	Ok(())
}
