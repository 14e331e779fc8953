use std::collections::HashMap;

use crate::AssetKind;
use crate::Directive;
use crate::resolver::normalize_path;

/// Token replaced with each file's path in a markup template.
pub const FILE_PATH_TOKEN: &str = "%filePath%";

/// Built-in template for `include-css` directives.
pub const CSS_TEMPLATE: &str = r#"<link rel="stylesheet" href="%filePath%">"#;

/// Built-in template for `include-js` directives.
pub const JS_TEMPLATE: &str = r#"<script type="text/javascript" src="%filePath%"></script>"#;

/// The built-in template for an asset kind, if it has one.
pub fn builtin_template(kind: &AssetKind) -> Option<&'static str> {
	match kind {
		AssetKind::Css => Some(CSS_TEMPLATE),
		AssetKind::Js => Some(JS_TEMPLATE),
		AssetKind::Other(_) => None,
	}
}

/// Pick the template for a directive: its own `template` option, then a
/// configured default for its kind, then the built-in default.
#[allow(clippy::implicit_hasher)]
pub fn template_for<'a>(
	directive: &'a Directive,
	defaults: &'a HashMap<String, String>,
) -> Option<&'a str> {
	directive
		.options
		.template
		.as_deref()
		.or_else(|| defaults.get(directive.kind.as_str()).map(String::as_str))
		.or_else(|| builtin_template(&directive.kind))
}

/// Render one markup line per file, joined with newlines in file order.
pub fn render_block(template: &str, files: &[String], directive: &Directive) -> String {
	let base_path = directive.options.normalized_base_path();
	let base_uri = directive.options.base_uri.as_deref();

	files
		.iter()
		.map(|file| {
			let public_path = apply_base_uri(file, base_path.as_deref(), base_uri);
			render_line(template, &public_path)
		})
		.collect::<Vec<_>>()
		.join("\n")
}

/// Substitute `%filePath%` in a template.
pub fn render_line(template: &str, file_path: &str) -> String {
	replace_token(template, FILE_PATH_TOKEN, file_path)
}

/// Swap the `base_path` prefix of `path` for `base_uri`.
///
/// Nothing changes without a `base_uri` or when it equals `base_path`. Without
/// a `base_path` the uri is prefixed. A path that doesn't start with the
/// normalized base path falls back to replacing the first occurrence of the
/// base path text.
pub fn apply_base_uri(path: &str, base_path: Option<&str>, base_uri: Option<&str>) -> String {
	let Some(base_uri) = base_uri else {
		return path.to_string();
	};

	let Some(base_path) = base_path else {
		return join_uri(base_uri, path);
	};

	if base_path == base_uri {
		return path.to_string();
	}

	let normalized = normalize_path(base_path);
	let normalized = normalized.trim_end_matches('/');
	if normalized == "." {
		return join_uri(base_uri, path);
	}

	match path.strip_prefix(normalized) {
		Some(rest) if rest.is_empty() || rest.starts_with('/') => join_uri(base_uri, rest),
		_ => path.replacen(base_path, base_uri, 1),
	}
}

fn join_uri(base_uri: &str, rest: &str) -> String {
	let rest = rest.trim_start_matches('/');
	if rest.is_empty() {
		return base_uri.to_string();
	}

	format!("{}/{rest}", base_uri.trim_end_matches('/'))
}

/// Replace every occurrence of `token`, matching its name case-insensitively.
pub fn replace_token(template: &str, token: &str, value: &str) -> String {
	let lower_template = template.to_ascii_lowercase();
	let lower_token = token.to_ascii_lowercase();
	let mut result = String::with_capacity(template.len());
	let mut last = 0;

	for (idx, _) in lower_template.match_indices(&lower_token) {
		result.push_str(&template[last..idx]);
		result.push_str(value);
		last = idx + token.len();
	}
	result.push_str(&template[last..]);

	result
}
