//! Resource resolution
//!
//! Walks negotiated candidates against the filesystem and picks the first
//! variant that exists. When none does, looks for files sharing the requested
//! basename under other extensions to decide between 406 and 404.

pub mod chunks;

pub use chunks::{Chunks, CHUNK_SIZE};

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Read, Take};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::ServeError;
use crate::negotiation::Candidate;

/// Request methods the resolver serves; anything else is rejected before
/// negotiation starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Head,
    Get,
}

impl RequestMethod {
    pub fn from_http(method: &hyper::Method) -> Option<Self> {
        match *method {
            hyper::Method::GET => Some(Self::Get),
            hyper::Method::HEAD => Some(Self::Head),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Head => "HEAD",
            Self::Get => "GET",
        }
    }
}

/// The file chosen for a request
#[derive(Debug)]
pub struct Variant {
    pub content_type: String,
    pub extension: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
    body: Option<Chunks<Take<File>>>,
}

impl Variant {
    /// Basename of the served file, used for `Content-Location`
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Take the body stream. Always `None` for HEAD requests.
    pub fn take_body(&mut self) -> Option<Chunks<Take<File>>> {
        self.body.take()
    }
}

/// Result of resolving a request against storage
#[derive(Debug)]
pub enum ResolvedOutcome {
    Served(Variant),
    /// Nothing acceptable, but these files exist under the same basename
    Unacceptable { alternates: Vec<String> },
    NotFound,
}

/// Resolve `base` against the negotiated `candidates`
///
/// Candidates and their extensions are tried in order and the first regular
/// file found wins; later candidates are never looked at. Failing to open or
/// stat a file that was just found is a fault and is returned as an error.
pub fn resolve<'a, I>(
    base: &Path,
    method: RequestMethod,
    candidates: I,
) -> Result<ResolvedOutcome, ServeError>
where
    I: IntoIterator<Item = Candidate<'a>>,
{
    for candidate in candidates {
        for extension in candidate.extensions {
            let path = variant_path(base, extension);
            if !path.is_file() {
                continue;
            }

            let (file, size, modified) = match open_variant(&path) {
                Ok(opened) => opened,
                Err(source) => return Err(ServeError::Io { path, source }),
            };
            let body = match method {
                // capped so a file growing mid-response cannot overrun Content-Length
                RequestMethod::Get => Some(Chunks::new(file.take(size))),
                RequestMethod::Head => None,
            };

            return Ok(ResolvedOutcome::Served(Variant {
                content_type: candidate.content_type,
                extension: extension.clone(),
                path,
                size,
                modified,
                body,
            }));
        }
    }

    let alternates = find_alternates(base);
    if alternates.is_empty() {
        Ok(ResolvedOutcome::NotFound)
    } else {
        Ok(ResolvedOutcome::Unacceptable { alternates })
    }
}

fn open_variant(path: &Path) -> io::Result<(File, u64, SystemTime)> {
    let file = File::open(path)?;
    let metadata = file.metadata()?;
    let modified = metadata.modified()?;
    Ok((file, metadata.len(), modified))
}

/// `base` with `.extension` appended to its final component
pub fn variant_path(base: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Basenames of regular files named `<base>.<anything>`, sorted
///
/// Unreadable or missing directories simply yield no alternates.
pub fn find_alternates(base: &Path) -> Vec<String> {
    let Some(stem) = base.file_name().and_then(|name| name.to_str()) else {
        return Vec::new();
    };
    let prefix = format!("{stem}.");
    let dir = match base.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut alternates: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(&prefix))
        .collect();
    alternates.sort();
    alternates
}
