//! Request path mapping
//!
//! Turns a request URI path into the storage basename that extensions are
//! appended to.

use std::path::{Component, Path, PathBuf};

use crate::config::Settings;

/// Map `uri_path` to a basename under `settings.base`
///
/// The path is percent-decoded, the script prefix and leading slashes are
/// stripped, and the remainder is joined onto the base directory. A result
/// naming an existing directory gets the index basename appended.
///
/// Returns `None` for paths that cannot be decoded or that try to leave the
/// base directory.
pub fn map_request_path(uri_path: &str, settings: &Settings) -> Option<PathBuf> {
    let decoded = urlencoding::decode(uri_path).ok()?;
    let decoded: &str = &decoded;
    let relative = decoded
        .strip_prefix(settings.script.as_str())
        .unwrap_or(decoded)
        .trim_start_matches('/');

    let mut path = settings.base.clone();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if path.is_dir() {
        path.push(&settings.index);
    }
    Some(path)
}
