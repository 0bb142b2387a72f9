use crate::error::StoreError;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Exclusive `<file>.lock` guard used to replace the task file atomically.
///
/// Bytes go to the lock file; `commit` renames it over the target. A guard
/// dropped before commit removes the lock file and leaves the target as it was.
pub struct Lockfile {
    target: PathBuf,
    lock_path: PathBuf,
    file: Option<fs::File>,
}

impl Lockfile {
    /// Create the lock file next to `target`. Fails with
    /// [`StoreError::LockConflict`] if another writer holds it.
    pub fn acquire(target: impl AsRef<Path>) -> Result<Self, StoreError> {
        let target = target.as_ref().to_path_buf();
        let lock_path = lock_path_for(&target);

        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => Ok(Self {
                target,
                lock_path,
                file: Some(file),
            }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::LockConflict(lock_path.display().to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<(), StoreError> {
        match self.file {
            Some(ref mut file) => {
                file.write_all(data)?;
                file.sync_all()?;
                Ok(())
            }
            None => Err(StoreError::LockConflict(
                "lock file already committed".into(),
            )),
        }
    }

    /// Rename the lock file over the target.
    pub fn commit(mut self) -> Result<(), StoreError> {
        self.file.take();
        if let Err(e) = fs::rename(&self.lock_path, &self.target) {
            let _ = fs::remove_file(&self.lock_path);
            return Err(StoreError::Io(e));
        }
        Ok(())
    }
}

impl Drop for Lockfile {
    fn drop(&mut self) {
        if self.file.is_some() {
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}

/// Replace `target` with `data` in one rename.
pub fn write_atomic(target: &Path, data: &[u8]) -> Result<(), StoreError> {
    let mut lock = Lockfile::acquire(target)?;
    lock.write_all(data)?;
    lock.commit()
}

fn lock_path_for(target: &Path) -> PathBuf {
    target.with_extension(
        target
            .extension()
            .map(|e| format!("{}.lock", e.to_string_lossy()))
            .unwrap_or_else(|| "lock".to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("tasks.json");
        fs::write(&target, "[]").unwrap();

        write_atomic(&target, b"[1]").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "[1]");
        assert!(!dir.path().join("tasks.json.lock").exists());
    }

    #[test]
    fn uncommitted_lock_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("tasks.json");
        fs::write(&target, "[]").unwrap();

        {
            let mut lock = Lockfile::acquire(&target).unwrap();
            lock.write_all(b"garbage").unwrap();
        }

        assert_eq!(fs::read_to_string(&target).unwrap(), "[]");
        assert!(!dir.path().join("tasks.json.lock").exists());
    }

    #[test]
    fn second_writer_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("tasks.json");

        let _held = Lockfile::acquire(&target).unwrap();
        let err = write_atomic(&target, b"[]").unwrap_err();
        assert!(matches!(err, StoreError::LockConflict(_)));
        assert!(!target.exists());
    }

    #[test]
    fn creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("tasks.json");
        write_atomic(&target, b"[]").unwrap();
        assert!(target.exists());
    }
}
