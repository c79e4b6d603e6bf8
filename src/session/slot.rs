//! Storage slots for the client session record
//!
//! A slot holds exactly one serialized record, like a single local-storage key.
//! Writes always replace the whole slot.

use crate::Result;
use std::path::PathBuf;
use std::sync::Mutex;

/// One string-valued persistence slot
pub trait StorageSlot: Send + Sync {
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, contents: &str) -> Result<()>;
    fn remove(&self) -> Result<()>;
}

/// In-process slot, used by tests and embedded callers
#[derive(Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.value.lock().map_err(|e| {
            crate::error::AnalysisError::StorageError(format!("session slot poisoned: {}", e))
        })
    }
}

impl StorageSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.lock()?.clone())
    }

    fn write(&self, contents: &str) -> Result<()> {
        *self.lock()? = Some(contents.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

/// File-backed slot; a missing file means an empty slot
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl StorageSlot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_slot_overwrites() {
        let slot = MemorySlot::new();
        assert_eq!(slot.read().unwrap(), None);

        slot.write("one").unwrap();
        slot.write("two").unwrap();
        assert_eq!(slot.read().unwrap().as_deref(), Some("two"));

        slot.remove().unwrap();
        assert_eq!(slot.read().unwrap(), None);
    }

    #[test]
    fn test_file_slot_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path().join("balancify/session.json"));

        assert_eq!(slot.read().unwrap(), None);
        slot.write("{}").unwrap();
        assert_eq!(slot.read().unwrap().as_deref(), Some("{}"));
        slot.remove().unwrap();
        slot.remove().unwrap();
        assert_eq!(slot.read().unwrap(), None);
    }
}
