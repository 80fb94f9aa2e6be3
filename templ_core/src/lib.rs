//! `templ_core` is the core library for the templ text template engine. It
//! lexes a template into a typed token stream and renders that stream against
//! a store of caller supplied variables.
//!
//! ## Template Syntax
//!
//! ```text
//! lang: de
//! end-of-settings!
//! Welcome to {city}!
//! Hallo ich bin ${name:Peter} Lustig.
//! Mein $elternteil ist nett.
//! ```
//!
//! - An optional settings header of `name: value` lines, closed by a line
//!   reading `end-of-settings!`.
//! - `{name}` is replaced by the key `name`.
//! - `${name}` is replaced by the constant the option `name` points at.
//!   `${name:default}` falls back to `default`.
//! - `$name rest` is replaced by the constant `name`. The identifier ends at
//!   the first space.
//!
//! Anything that can't be resolved is copied to the output unchanged and
//! reported as a [`RenderDiagnostic`]. Rendering never fails.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template text
//!   → Lexer (settings mode until `end-of-settings!`, then body mode)
//!   → Renderer pass 1 (records `name: value` header lines as settings)
//!   → Renderer pass 2 (resolves placeholders against the variable store)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use templ_core::VariableStore;
//! use templ_core::render_str;
//!
//! let store = VariableStore::new()
//! 	.with_key("city", "Berlin")
//! 	.with_option("name", "color")
//! 	.with_constant("color", "blue");
//!
//! let rendered = render_str("Welcome to {city}, ${name}!", store);
//! assert_eq!(rendered.output, "Welcome to Berlin, blue!");
//! assert!(rendered.is_clean());
//! ```

pub use config::*;
pub use error::*;
pub use lexer::lex;
pub use parser::*;
pub use position::*;
pub use tokens::*;
pub use variables::*;

pub mod config;
mod error;
mod lexer;
mod parser;
mod position;
mod tokens;
mod variables;

#[cfg(test)]
mod __fixtures;
#[cfg(test)]
mod __tests;
