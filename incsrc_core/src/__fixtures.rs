use crate::MemoryFs;

pub const VENDOR_DIRECTIVE: &str = r#"<!-- include-js:vendor({"src":"*.js","basePath":"lib"}) -->"#;
pub const VENDOR_CLOSING: &str = "<!-- /include-js:vendor -->";
pub const SCRIPT_A: &str = r#"<script type="text/javascript" src="lib/a.js"></script>"#;
pub const SCRIPT_B: &str = r#"<script type="text/javascript" src="lib/b.js"></script>"#;

/// A bare vendor directive: start and end markers with nothing between them.
pub fn vendor_document() -> String {
	format!("<head>\n{VENDOR_DIRECTIVE}\n{VENDOR_CLOSING}\n</head>\n")
}

/// The vendor document after one rewrite against [`vendor_fs`].
pub fn expanded_vendor_document() -> String {
	format!("<head>\n{VENDOR_DIRECTIVE}\n{SCRIPT_A}\n{SCRIPT_B}\n{VENDOR_CLOSING}\n</head>\n")
}

/// `lib/a.js` and `lib/b.js` (inserted out of order) plus files the vendor
/// glob must not pick up.
pub fn vendor_fs() -> MemoryFs {
	MemoryFs::new()
		.with_file("lib/b.js", "b")
		.with_file("lib/a.js", "a")
		.with_file("lib/nested/c.js", "c")
		.with_file("lib/style.css", "body {}")
}

/// Stylesheets under `css/`.
pub fn css_fs() -> MemoryFs {
	MemoryFs::new()
		.with_file("css/main.css", "main")
		.with_file("css/theme.min.css", "theme")
}
