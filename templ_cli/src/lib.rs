use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

/// The path that makes a command read its template from stdin.
pub const STDIN_PATH: &str = "-";

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Render settings-headed text templates.",
	long_about = "templ renders text templates that start with an optional settings header and \
	              contain `{key}`, `${option}` and `$constant` placeholders.\n\nQuick start:\n  \
	              templ render letter.txt --seed seed.toml  Render a template\n  templ draft \
	              letter.txt                     Print a seed skeleton\n  templ tokens \
	              letter.txt                    Inspect the token stream"
)]
pub struct TemplCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Render a template against a seed file.
	///
	/// Placeholders that can't be resolved are copied to the output as they
	/// were written and reported as warnings on stderr. Use `--strict` to
	/// turn those warnings into a failing exit status.
	Render {
		/// The template file to render. Use `-` to read from stdin.
		template: PathBuf,

		/// A seed file with `[constants]`, `[options]` and `[keys]` tables.
		/// The format is picked from the extension: `toml`, `json`, `yaml` or
		/// `yml`.
		#[arg(long, short)]
		seed: Option<PathBuf>,

		/// Output format. `text` prints the rendered template, `json` prints
		/// the output together with diagnostics and header settings.
		#[arg(long, value_enum, default_value_t = RenderFormat::Text)]
		format: RenderFormat,

		/// Encoding applied to the rendered text before printing.
		#[arg(long, value_enum, default_value_t = Encoding::None)]
		encode: Encoding,

		/// Exit with status 1 if any placeholder could not be resolved.
		#[arg(long, default_value_t = false)]
		strict: bool,
	},
	/// Print the token stream of a template.
	///
	/// Each token is shown with its index, kind, starting line and column,
	/// and content.
	Tokens {
		/// The template file to lex. Use `-` to read from stdin.
		template: PathBuf,

		/// Output format for the token stream.
		#[arg(long, value_enum, default_value_t = TokensFormat::Text)]
		format: TokensFormat,
	},
	/// Print a seed skeleton naming every identifier a template needs.
	///
	/// Fill in the empty values and pass the file to `templ render --seed`.
	Draft {
		/// The template file to inspect. Use `-` to read from stdin.
		template: PathBuf,

		/// Output format for the seed skeleton.
		#[arg(long, value_enum, default_value_t = DraftFormat::Toml)]
		format: DraftFormat,
	},
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
	#[default]
	Text,
	Json,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Encoding {
	#[default]
	None,
	Base64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TokensFormat {
	#[default]
	Text,
	Json,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DraftFormat {
	#[default]
	Toml,
	Json,
}

impl From<DraftFormat> for templ_core::SeedFormat {
	fn from(format: DraftFormat) -> Self {
		match format {
			DraftFormat::Toml => Self::Toml,
			DraftFormat::Json => Self::Json,
		}
	}
}
