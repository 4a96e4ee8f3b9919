//! Static file fallback.
//!
//! # Responsibilities
//! - Serve files under a root directory for requests no route matched
//! - Refuse path traversal before touching the filesystem
//! - Apply the single-page-app rewrite when a file is missing
//!
//! # Design Decisions
//! - `classic`: a missing file is a 404
//! - `spa`: a missing file serves the site root, so browser-side routes
//!   survive a page reload
//! - Directories resolve to their `index.html`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use axum::http::{header, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};

use crate::http::{decoded_path, Request, ResponseWriter};
use crate::routing::Fallback;

/// How missing files are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileServerMode {
    /// No client-side routing: a missing file is a 404.
    #[default]
    Classic,
    /// Client-side routing: a missing file serves `/` instead.
    Spa,
}

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    mode: FileServerMode,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>, mode: FileServerMode) -> Self {
        let root = root.into();
        let root = if root.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            root
        };
        Self { root, mode }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mode(&self) -> FileServerMode {
        self.mode
    }

    /// Map a URL path to a file below the root.
    fn resolve(&self, path: &str) -> PathBuf {
        let mut resolved = self.root.clone();
        for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            resolved.push(segment);
        }
        if resolved.is_dir() {
            resolved.push("index.html");
        }
        resolved
    }
}

impl Fallback for StaticFiles {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        let path = decoded_path(req);
        if contains_dot_dot(&path) {
            w.write_status(StatusCode::BAD_REQUEST);
            w.write(b"URL should not contain '/../' parts");
            return;
        }

        let mut file = self.resolve(&path);
        if !file.is_file() {
            tracing::warn!(file = %file.display(), path = %path, mode = ?self.mode, "Static file not found");
            match self.mode {
                FileServerMode::Spa => file = self.resolve("/"),
                FileServerMode::Classic => {
                    not_found(w);
                    return;
                }
            }
        }

        match fs::read(&file) {
            Ok(contents) => {
                w.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static(content_type(&file)),
                );
                w.write_status(StatusCode::OK);
                w.write(&contents);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => not_found(w),
            Err(e) => {
                tracing::error!(file = %file.display(), error = %e, "Failed to read static file");
                w.write_status(StatusCode::INTERNAL_SERVER_ERROR);
                w.write(b"Internal Server Error");
            }
        }
    }
}

fn not_found(w: &mut dyn ResponseWriter) {
    w.write_status(StatusCode::NOT_FOUND);
    w.write(b"404 page not found");
}

/// Returns true if any `/` or `\` separated element of `path` is `..`.
pub fn contains_dot_dot(path: &str) -> bool {
    if !path.contains("..") {
        return false;
    }
    path.split(|c: char| c == '/' || c == '\\').any(|segment| segment == "..")
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}
