use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TemplError {
	#[error(transparent)]
	#[diagnostic(code(templ::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse {format} seed: {reason}")]
	#[diagnostic(
		code(templ::config_parse),
		help("a seed file has optional [constants], [options] and [keys] tables of string values")
	)]
	ConfigParse { format: String, reason: String },

	#[error("failed to write seed as {format}: {reason}")]
	#[diagnostic(code(templ::config_serialize))]
	ConfigSerialize { format: String, reason: String },

	#[error("unsupported seed file format: `{0}`")]
	#[diagnostic(
		code(templ::unsupported_format),
		help("supported formats: toml, json, yaml, yml")
	)]
	UnsupportedSeedFormat(String),

	#[error("{0} placeholder(s) could not be resolved")]
	#[diagnostic(
		code(templ::unresolved_placeholders),
		help("add the missing keys, options and constants to the seed file")
	)]
	UnresolvedPlaceholders(usize),
}

pub type TemplResult<T> = Result<T, TemplError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
