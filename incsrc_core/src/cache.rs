use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use md5::Digest;
use md5::Md5;

use crate::HashType;
use crate::fs::AssetFs;

/// Number of characters kept from a hash or timestamp.
pub const TOKEN_LENGTH: usize = 9;

/// Outcome of cache-busting a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CacheBust {
	/// The path now carries the token.
	Busted { path: String, token: String },
	/// The path could not be busted and is returned unchanged.
	Fallback { path: String, reason: String },
}

impl CacheBust {
	/// The path to render, busted or not.
	pub fn into_path(self) -> String {
		match self {
			Self::Busted { path, .. } | Self::Fallback { path, .. } => path,
		}
	}
}

/// Embed a cache-busting token into `path`.
///
/// With `add_query_string` the token is appended as `?_v=<token>`, otherwise
/// it is inserted before the extension: `app.min.js` becomes
/// `app.v-<token>.min.js`. A file that can't be read never fails the rewrite;
/// the original path comes back as [`CacheBust::Fallback`].
pub fn bust(fs: &dyn AssetFs, path: &str, add_query_string: bool, hash: HashType) -> CacheBust {
	let contents = match fs.read(path) {
		Ok(contents) => contents,
		Err(e) => {
			return CacheBust::Fallback {
				path: path.to_string(),
				reason: format!("failed to read `{path}`: {e}"),
			};
		}
	};

	let token = match hash {
		HashType::Md5 => md5_token(&contents),
		HashType::Date => date_token(),
	};

	let busted = if add_query_string {
		Some(format!("{path}?_v={token}"))
	} else {
		versioned_file_name(path, &token)
	};

	match busted {
		Some(busted) => {
			CacheBust::Busted {
				path: busted,
				token,
			}
		}
		None => {
			CacheBust::Fallback {
				path: path.to_string(),
				reason: format!("`{path}` has no file extension to version"),
			}
		}
	}
}

/// First characters of the hex MD5 of the file's text.
pub fn md5_token(contents: &[u8]) -> String {
	let text = String::from_utf8_lossy(contents);
	let digest = Md5::digest(text.as_bytes());
	let mut token = hex::encode(digest);
	token.truncate(TOKEN_LENGTH);
	token
}

/// First digits of the current Unix time in milliseconds.
pub fn date_token() -> String {
	let millis = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map_or(0, |duration| duration.as_millis());
	let mut token = millis.to_string();
	token.truncate(TOKEN_LENGTH);
	token
}

/// Insert `.v-<token>` before the extension, keeping a `.min` infix after it.
/// Returns `None` when the file name has no extension.
fn versioned_file_name(path: &str, token: &str) -> Option<String> {
	let name_start = path.rfind('/').map_or(0, |idx| idx + 1);
	let name = &path[name_start..];
	let ext_dot = name.rfind('.').filter(|&idx| idx > 0)?;
	if ext_dot + 1 == name.len() {
		return None;
	}

	let stem = &name[..ext_dot];
	let (stem, suffix) = match stem.len().checked_sub(".min".len()) {
		Some(min_dot) if min_dot > 0 && stem[min_dot..].eq_ignore_ascii_case(".min") => {
			(&stem[..min_dot], &name[min_dot..])
		}
		_ => (stem, &name[ext_dot..]),
	};

	Some(format!(
		"{}{stem}.v-{token}{suffix}",
		&path[..name_start]
	))
}
