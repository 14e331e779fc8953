use crate::AssetKind;
use crate::Directive;
use crate::IncsrcError;
use crate::IncsrcResult;
use crate::fs::AssetFs;
use crate::render::replace_token;
use crate::resolver::normalize_path;

/// Destination used when a directive doesn't set `concat.saveTo`.
pub const DEFAULT_SAVE_TO: &str = "%basePath%/include-files/%type%/%groupName%.%type%";

/// Merge `files` into one artifact for `directive` and return its path.
///
/// Files are read in order, decoded as text and joined with the directive's
/// `concat.separator`. The destination is overwritten; when two directives
/// share a destination the last one written wins.
pub fn concat(fs: &dyn AssetFs, files: &[String], directive: &Directive) -> IncsrcResult<String> {
	let concat_options = directive.options.concat.as_ref();
	let separator = concat_options
		.and_then(|options| options.separator.as_deref())
		.unwrap_or_default();
	let save_to = concat_options
		.and_then(|options| options.save_to.as_deref())
		.unwrap_or(DEFAULT_SAVE_TO);

	let mut parts = Vec::with_capacity(files.len());
	for file in files {
		let contents = fs.read(file).map_err(|e| {
			IncsrcError::ConcatRead {
				path: file.clone(),
				reason: e.to_string(),
			}
		})?;
		parts.push(String::from_utf8_lossy(&contents).into_owned());
	}

	let base_path = directive
		.options
		.normalized_base_path()
		.unwrap_or_else(|| ".".to_string());
	let destination = destination_path(save_to, &base_path, &directive.kind, &directive.group_name);

	fs.write(&destination, parts.join(separator).as_bytes())
		.map_err(|e| {
			IncsrcError::ConcatWrite {
				path: destination.clone(),
				reason: e.to_string(),
			}
		})?;
	tracing::debug!(%destination, files = files.len(), "wrote concatenated file");

	Ok(destination)
}

/// Fill a `saveTo` template and normalize the result.
pub fn destination_path(
	template: &str,
	base_path: &str,
	kind: &AssetKind,
	group_name: &str,
) -> String {
	let path = replace_token(template, "%basePath%", base_path);
	let path = replace_token(&path, "%type%", kind.as_str());
	let path = replace_token(&path, "%groupName%", group_name);
	normalize_path(&path)
}
