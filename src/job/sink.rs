//! Where reconstructed output is uploaded.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Destination for reconstructed job output.
pub trait ResultSink {
    /// Store `body` under `key`, replacing any previous value.
    fn put(&self, key: &str, body: &[u8]) -> Result<()>;
}

/// Writes output files below a root directory; keys are relative paths.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Create a sink rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for a key.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(Error::Storage(format!("invalid output key '{}'", key)));
        }
        Ok(self.root.join(relative))
    }
}

impl ResultSink for DirectorySink {
    fn put(&self, key: &str, body: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body)?;
        log::debug!("Wrote {} bytes to {}", body.len(), path.display());
        Ok(())
    }
}

/// Output key for a source object.
///
/// `forms/2024/W2.pdf` becomes `forms/2024/W2/textract/W2.json`: the
/// output sits in a folder named after the file, next to the source.
pub fn output_key(object_name: &str) -> String {
    let (dirs, file_name) = match object_name.rsplit_once('/') {
        Some((dirs, file_name)) => (Some(dirs), file_name),
        None => (None, object_name),
    };

    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };

    match dirs {
        Some(dirs) => format!("{}/{}/textract/{}.json", dirs, stem, stem),
        None => format!("{}/textract/{}.json", stem, stem),
    }
}
