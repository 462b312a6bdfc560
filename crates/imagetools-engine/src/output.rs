// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Writing generated images into the cache directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use imagetools_core::CompressFormat;
use imagetools_core::error::Result;

/// A file written by [`write_new_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl SavedFile {
    /// `file://` URI of the saved file.
    pub fn uri(&self) -> String {
        file_uri(&self.path)
    }
}

/// `<millis>-<8 hex chars>.<ext>`, unique even for calls within the same millisecond.
pub fn unique_file_name(format: CompressFormat) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}.{}",
        Utc::now().timestamp_millis(),
        &id[..8],
        format.extension()
    )
}

/// Write `bytes` to a new file `dir/name`. Fails if the file already exists.
pub fn write_new_file(dir: &Path, name: &str, bytes: &[u8]) -> Result<SavedFile> {
    let path = dir.join(name);
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)?;
    file.write_all(bytes)?;
    file.flush()?;

    let path = std::fs::canonicalize(&path).unwrap_or(path);
    debug!(path = %path.display(), bytes = bytes.len(), "Image written");
    Ok(SavedFile {
        path,
        name: name.to_string(),
        size: bytes.len() as u64,
    })
}

/// `file://` URI for a filesystem path.
pub fn file_uri(path: &Path) -> String {
    let display = path.to_string_lossy().replace('\\', "/");
    if display.starts_with('/') {
        format!("file://{display}")
    } else {
        format!("file:///{display}")
    }
}
