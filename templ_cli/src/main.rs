use std::io::Read;
use std::path::Path;
use std::process;

use base64::Engine as _;
use clap::Parser;
use owo_colors::OwoColorize;
use templ_cli::Commands;
use templ_cli::DraftFormat;
use templ_cli::Encoding;
use templ_cli::RenderFormat;
use templ_cli::STDIN_PATH;
use templ_cli::TemplCli;
use templ_cli::TokensFormat;
use templ_core::AnyEmptyResult;
use templ_core::AnyResult;
use templ_core::RenderDiagnostic;
use templ_core::SeedConfig;
use templ_core::SeedFormat;
use templ_core::VariableStore;
use templ_core::draft;
use templ_core::lex;
use templ_core::render;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,dimmed) => {
		if color_enabled() {
			format!("{}", $text.dimmed())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = TemplCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match args.command {
		Some(Commands::Render {
			ref template,
			ref seed,
			format,
			encode,
			strict,
		}) => run_render(template, seed.as_deref(), format, encode, strict),
		Some(Commands::Tokens {
			ref template,
			format,
		}) => run_tokens(template, format),
		Some(Commands::Draft {
			ref template,
			format,
		}) => run_draft(template, format),
		None => {
			eprintln!("No subcommand specified. Run `templ --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<templ_core::TemplError>() {
			Ok(templ_err) => {
				let report: miette::Report = (*templ_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.try_init();
}

/// Read a template from `path`, or from stdin when the path is `-`.
fn read_template(path: &Path) -> AnyResult<String> {
	if path.as_os_str() == STDIN_PATH {
		let mut content = String::new();
		std::io::stdin().read_to_string(&mut content)?;
		return Ok(content);
	}

	std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()).into())
}

fn read_seed(path: Option<&Path>) -> AnyResult<VariableStore> {
	let Some(path) = path else {
		return Ok(VariableStore::new());
	};

	let format = SeedFormat::from_path(path)?;
	let content = std::fs::read_to_string(path)
		.map_err(|e| format!("failed to read seed {}: {e}", path.display()))?;
	let seed = SeedConfig::parse(&content, format)?;
	tracing::debug!(path = %path.display(), %format, "loaded seed");

	Ok(seed.into_store())
}

fn print_warnings(diagnostics: &[RenderDiagnostic]) {
	for diagnostic in diagnostics {
		eprintln!(
			"{} {} {diagnostic} {}",
			colored!("warning:", yellow),
			diagnostic.position(),
			colored!(format!("[{}]", diagnostic.code()), dimmed),
		);
	}
}

fn diagnostic_json(diagnostic: &RenderDiagnostic) -> serde_json::Value {
	let position = diagnostic.position();
	serde_json::json!({
		"code": diagnostic.code(),
		"name": diagnostic.name(),
		"message": diagnostic.to_string(),
		"line": position.line,
		"column": position.column,
	})
}

fn run_render(
	template: &Path,
	seed: Option<&Path>,
	format: RenderFormat,
	encode: Encoding,
	strict: bool,
) -> AnyEmptyResult {
	let source = read_template(template)?;
	let store = read_seed(seed)?;
	let tokens = lex(&source);
	let rendered = render(&tokens, store);

	let output = match encode {
		Encoding::None => rendered.output.clone(),
		Encoding::Base64 => base64::engine::general_purpose::STANDARD.encode(&rendered.output),
	};

	match format {
		RenderFormat::Text => {
			print!("{output}");
			print_warnings(&rendered.diagnostics);
		}
		RenderFormat::Json => {
			let diagnostics: Vec<serde_json::Value> =
				rendered.diagnostics.iter().map(diagnostic_json).collect();
			let json = serde_json::json!({
				"output": output,
				"diagnostics": diagnostics,
				"settings": rendered.settings(),
			});
			println!("{json}");
		}
	}

	if strict && !rendered.is_clean() {
		eprintln!(
			"{} {} placeholder(s) could not be resolved",
			colored!("error:", red),
			rendered.diagnostics.len()
		);
		process::exit(1);
	}

	Ok(())
}

fn run_tokens(template: &Path, format: TokensFormat) -> AnyEmptyResult {
	let source = read_template(template)?;
	let tokens = lex(&source);

	match format {
		TokensFormat::Text => {
			for (index, token) in tokens.iter().enumerate() {
				println!(
					"{index:>4}  {:<16} {:<8} {:?}",
					token.kind.to_string(),
					token.start.to_string(),
					token.content
				);
			}
		}
		TokensFormat::Json => {
			println!("{}", serde_json::to_string_pretty(&tokens)?);
		}
	}

	Ok(())
}

fn run_draft(template: &Path, format: DraftFormat) -> AnyEmptyResult {
	let source = read_template(template)?;
	let tokens = lex(&source);
	let requirements = draft(&tokens);

	if requirements.is_empty() {
		tracing::info!("template has no placeholders");
	}

	let skeleton = SeedConfig::from_requirements(&requirements).to_string_as(format.into())?;
	print!("{skeleton}");

	if !skeleton.ends_with('\n') {
		println!();
	}

	Ok(())
}
