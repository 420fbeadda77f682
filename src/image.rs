//! Data URI handling for uploaded photos.
//!
//! Every photo enters the system as a `data:<mimetype>;base64,<payload>`
//! string. Parsing is strict: a malformed URI is rejected here, before any
//! model call is attempted.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// A validated `data:` URI holding inline base64 content.
#[derive(Debug, Clone, PartialEq)]
pub struct DataUri {
    mime: String,
    payload: String,
}

impl DataUri {
    /// Parse and validate a data URI string.
    ///
    /// Rejects anything that is not `data:<mimetype>;base64,<payload>` with a
    /// non-empty MIME type and a decodable, non-empty payload.
    pub fn parse(s: &str) -> Result<Self> {
        let rest = match s.strip_prefix("data:") {
            Some(rest) => rest,
            None => bail!("not a data URI: missing 'data:' prefix"),
        };

        let (mime, payload) = match rest.split_once(";base64,") {
            Some(parts) => parts,
            None => bail!("not a data URI: missing ';base64,' marker"),
        };

        if mime.is_empty() {
            bail!("data URI has an empty MIME type");
        }
        if payload.is_empty() {
            bail!("data URI has an empty payload");
        }

        STANDARD
            .decode(payload)
            .context("data URI payload is not valid base64")?;

        Ok(Self {
            mime: mime.to_string(),
            payload: payload.to_string(),
        })
    }

    /// Read a file and encode it as a data URI, deriving the MIME type from
    /// the file extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let mime = match mime_for_extension(&ext) {
            Some(mime) => mime,
            None => bail!("unrecognized file extension: {:?}", path),
        };

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if bytes.is_empty() {
            bail!("{} is empty", path.display());
        }

        Ok(Self {
            mime: mime.to_string(),
            payload: STANDARD.encode(&bytes),
        })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// The base64 payload, without the URI prefix.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    /// Decoded payload size in bytes.
    pub fn byte_len(&self) -> usize {
        // payload was verified at construction, so decode cannot fail
        self.payload.len() / 4 * 3
            - self.payload.bytes().rev().take_while(|&b| b == b'=').count()
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, self.payload)
    }
}

fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}
