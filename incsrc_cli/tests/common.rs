#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const VENDOR_DIRECTIVE: &str = r#"<!-- include-js:vendor({"src":"*.js","basePath":"lib"}) -->"#;
pub const VENDOR_CLOSING: &str = "<!-- /include-js:vendor -->";

pub fn incsrc_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("incsrc"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("INCSRC_LOG");
	cmd
}

/// `lib/a.js`, `lib/b.js` and an `index.html` with a bare vendor directive.
pub fn write_vendor_project(root: &Path) -> std::io::Result<()> {
	std::fs::create_dir_all(root.join("lib"))?;
	std::fs::write(root.join("lib/a.js"), "a")?;
	std::fs::write(root.join("lib/b.js"), "b")?;
	std::fs::write(root.join("index.html"), vendor_document())
}

pub fn vendor_document() -> String {
	format!("<head>\n{VENDOR_DIRECTIVE}\n{VENDOR_CLOSING}\n</head>\n")
}

pub fn expanded_vendor_document() -> String {
	format!(
		"<head>\n{VENDOR_DIRECTIVE}\n<script type=\"text/javascript\" \
		 src=\"lib/a.js\"></script>\n<script type=\"text/javascript\" \
		 src=\"lib/b.js\"></script>\n{VENDOR_CLOSING}\n</head>\n"
	)
}
