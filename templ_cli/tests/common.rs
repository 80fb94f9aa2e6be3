use std::path::Path;
use std::path::PathBuf;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn templ_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("templ"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

/// Write `content` to `name` inside `dir` and return the full path.
pub fn write_file(dir: &Path, name: &str, content: &str) -> std::io::Result<PathBuf> {
	let path = dir.join(name);
	std::fs::write(&path, content)?;
	Ok(path)
}

#[allow(dead_code)]
pub const GREETING_TEMPLATE: &str =
	"lang: de \nend-of-settings!\nHallo ich bin ${name:Peter} Lustig.\nMein $elternteil ist doof";
