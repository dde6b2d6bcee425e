//! Media source classification for StreamView
//!
//! The address field accepts either a local file path or a network URI.
//! Classification happens before the engine is involved: an existing local
//! path becomes a `file://` URI, anything with a URI scheme is handed to the
//! engine as-is, and everything else is rejected with an address error.

use crate::utils::error::{Result, StreamViewError};
use gstreamer::glib;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A classified media source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// An existing local file, canonicalized
    Local(PathBuf),

    /// A network address with a URI scheme
    Network(String),
}

/// Per-source options the engine applies when opening a network stream
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Force the reliable TCP lower transport for RTSP sources
    pub force_tcp: bool,

    /// Network buffering duration
    pub network_caching: Duration,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            force_tcp: true,
            network_caching: Duration::from_millis(1500),
        }
    }
}

impl SourceOptions {
    /// Build the options from the network section of the configuration
    pub fn from_config(network: &crate::utils::config::NetworkConfig) -> Self {
        Self {
            force_tcp: network.force_tcp,
            network_caching: Duration::from_millis(network.caching_ms),
        }
    }
}

impl MediaSource {
    /// Classify a raw address-field string
    ///
    /// Surrounding quotes and whitespace are stripped first, so paths pasted
    /// from a file manager or shell work unchanged.
    pub fn classify(input: &str) -> Result<Self> {
        let cleaned = clean_input(input);

        if cleaned.is_empty() {
            return Err(StreamViewError::InvalidInput(
                "no address or file path given".to_string(),
            ));
        }

        let path = Path::new(&cleaned);
        if path.exists() {
            let absolute = path
                .canonicalize()
                .map_err(|e| StreamViewError::Source(format!("cannot resolve path: {}", e)))?;
            return Ok(MediaSource::Local(absolute));
        }

        if has_uri_scheme(&cleaned) {
            return Ok(MediaSource::Network(cleaned));
        }

        Err(StreamViewError::Source(format!(
            "'{}' is neither an existing file nor a stream address",
            cleaned
        )))
    }

    /// URI form accepted by the engine
    pub fn uri(&self) -> Result<String> {
        match self {
            MediaSource::Local(path) => glib::filename_to_uri(path, None)
                .map(|uri| uri.to_string())
                .map_err(|e| StreamViewError::Source(format!("cannot build file URI: {}", e))),
            MediaSource::Network(uri) => Ok(uri.clone()),
        }
    }

    /// Whether this source is an RTSP stream and should get the RTSP options
    pub fn is_rtsp(&self) -> bool {
        match self {
            MediaSource::Local(_) => false,
            MediaSource::Network(uri) => {
                let scheme = uri.split("://").next().unwrap_or("");
                scheme.eq_ignore_ascii_case("rtsp") || scheme.eq_ignore_ascii_case("rtsps")
            }
        }
    }

    /// Whether this source arrives over the network
    pub fn is_network(&self) -> bool {
        matches!(self, MediaSource::Network(_))
    }

    /// Short human-readable name for status lines and logs
    pub fn display_name(&self) -> String {
        match self {
            MediaSource::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            MediaSource::Network(uri) => uri.clone(),
        }
    }
}

/// Trim whitespace and strip surrounding single/double quotes
fn clean_input(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}

/// RFC 3986 scheme followed by "://"
fn has_uri_scheme(s: &str) -> bool {
    let Some((scheme, rest)) = s.split_once("://") else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
