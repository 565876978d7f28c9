//! Resource identity: the remote URL and the local file that caches it.

use std::path::{Path, PathBuf};

use crate::error::CacheError;

/// A remote resource and where its cached copy lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    url: String,
    local_path: PathBuf,
}

impl Resource {
    /// Validates that `url` is an absolute http(s) URL and `local_path` names a file.
    pub fn new(url: &str, local_path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let parsed = parse_http_url(url)?;
        let local_path = local_path.into();
        if local_path.file_name().is_none() {
            return Err(CacheError::InvalidResource(format!(
                "local path {} does not name a file",
                local_path.display()
            )));
        }
        Ok(Self {
            url: parsed.to_string(),
            local_path,
        })
    }

    /// Cache `url` under `dir`, named after the URL's last path segment.
    pub fn in_dir(url: &str, dir: &Path) -> Result<Self, CacheError> {
        let name = filename_from_url_path(url).ok_or_else(|| {
            CacheError::InvalidResource(format!("cannot derive a file name from {}", url))
        })?;
        Self::new(url, dir.join(name))
    }

    /// `<base_url>/<file_name>` cached as `<dir>/<file_name>`.
    pub fn from_base(base_url: &str, file_name: &str, dir: &Path) -> Result<Self, CacheError> {
        if file_name.is_empty()
            || file_name == "."
            || file_name == ".."
            || file_name.contains(['/', '\\'])
        {
            return Err(CacheError::InvalidResource(format!(
                "invalid file name {:?}",
                file_name
            )));
        }
        let mut base = parse_http_url(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let url = base.join(file_name).map_err(|e| {
            CacheError::InvalidResource(format!("cannot join {} and {}: {}", base_url, file_name, e))
        })?;
        Self::new(url.as_str(), dir.join(file_name))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }
}

fn parse_http_url(url: &str) -> Result<url::Url, CacheError> {
    let parsed = url::Url::parse(url)
        .map_err(|e| CacheError::InvalidResource(format!("invalid URL {}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CacheError::InvalidResource(format!(
            "unsupported scheme {:?} in {}",
            other, url
        ))),
    }
}

/// Extracts the last path segment from a URL for use as a file name.
///
/// The segment is percent-decoded (`my%20clip.mp4` becomes `my clip.mp4`).
/// Returns `None` if the URL cannot be parsed, the path is empty/root, or the
/// decoded name is not a plain file name (`.`, `..`, separators, NUL).
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    let name = percent_decode(segment)?;
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return None;
    }
    Some(name)
}

/// Decodes `%XX` escapes. A `%` not followed by two hex digits is kept as is.
/// `None` if the decoded bytes are not UTF-8.
fn percent_decode(segment: &str) -> Option<String> {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let mut byte = [0u8; 1];
            if let Some(pair) = bytes.get(i + 1..i + 3) {
                if hex::decode_to_slice(pair, &mut byte).is_ok() {
                    out.push(byte[0]);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).ok()
}
