#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use crate::store::StorageError;

/// Logical key the whole complaint collection lives under.
pub const COMPLAINTS_KEY: &str = "complaints";

/// Raw persistence for the single `complaints` key. `load` returns `None`
/// when nothing was ever saved.
pub trait RecordSurface {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError>;
    fn save(&mut self, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Process-local surface, the stand-in for browser local storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    bytes: Option<Vec<u8>>,
    fail_saves: bool,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Some(bytes.into()),
            fail_saves: false,
        }
    }

    /// Makes every later `save` fail as if storage were full.
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

impl RecordSurface for MemorySurface {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.bytes.clone())
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::SurfaceUnavailable {
                key: COMPLAINTS_KEY,
                reason: "quota exceeded".to_string(),
            });
        }
        self.bytes = Some(bytes.to_vec());
        Ok(())
    }
}

/// JSON file on the local device. Writes go through a temp file and a
/// rename so a failed write leaves the previous contents in place.
#[derive(Debug, Clone)]
pub struct FileSurface {
    path: PathBuf,
}

impl FileSurface {
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::for_path(dir.as_ref().join(format!("{COMPLAINTS_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSurface for FileSurface {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read(&self.path)?))
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        atomic_write(&self.path, bytes)
    }
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    let mut tmp = path.to_path_buf();
    tmp.set_extension("tmp");
    fs::write(&tmp, data)?;
    fs::rename(tmp, path)?;
    Ok(())
}
