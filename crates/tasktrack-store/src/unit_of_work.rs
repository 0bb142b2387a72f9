//! Snapshot-based transactions over the task file.
//!
//! `begin_transaction` copies the file bytes aside, `rollback_transaction`
//! puts them back. Only the file is repaired: a [`TaskStore`] that mutated
//! its list during the transaction must `load()` again to see the restored
//! state.
//!
//! [`TaskStore`]: crate::task_store::TaskStore

use crate::error::StoreError;
use crate::lockfile;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What the file looked like when the transaction began.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Backup {
    Missing,
    Contents(Vec<u8>),
}

/// Idle/Active transaction state over one task file.
///
/// Commit does not flush; callers save through the store before committing.
/// Dropping an active unit of work rolls it back.
pub struct UnitOfWork {
    path: PathBuf,
    backup: Option<Backup>,
}

impl UnitOfWork {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_active(&self) -> bool {
        self.backup.is_some()
    }

    pub fn begin_transaction(&mut self) -> Result<(), StoreError> {
        if self.is_active() {
            return Err(StoreError::InvalidOperation(
                "a transaction is already active".into(),
            ));
        }
        let backup = match fs::read(&self.path) {
            Ok(bytes) => Backup::Contents(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Backup::Missing,
            Err(e) => return Err(StoreError::Io(e)),
        };
        tracing::debug!(
            path = %self.path.display(),
            existed = matches!(backup, Backup::Contents(_)),
            "transaction started"
        );
        self.backup = Some(backup);
        Ok(())
    }

    pub fn commit_transaction(&mut self) -> Result<(), StoreError> {
        self.take_backup("commit")?;
        tracing::debug!(path = %self.path.display(), "transaction committed");
        Ok(())
    }

    /// Put the snapshot back, deleting the file if it did not exist.
    ///
    /// The transaction ends even if the restore fails.
    pub fn rollback_transaction(&mut self) -> Result<(), StoreError> {
        let backup = self.take_backup("roll back")?;
        match backup {
            Backup::Contents(bytes) => lockfile::write_atomic(&self.path, &bytes)?,
            Backup::Missing => match fs::remove_file(&self.path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::Io(e)),
            },
        }
        tracing::debug!(path = %self.path.display(), "transaction rolled back");
        Ok(())
    }

    fn take_backup(&mut self, action: &str) -> Result<Backup, StoreError> {
        self.backup.take().ok_or_else(|| {
            StoreError::InvalidOperation(format!("no active transaction to {}", action))
        })
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.is_active() {
            if let Err(e) = self.rollback_transaction() {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "implicit rollback failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task_store::TaskStore;
    use tasktrack_core::task::Task;

    fn seeded() -> (tempfile::TempDir, TaskStore, UnitOfWork) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let mut store = TaskStore::open(&path).unwrap();
        store.add(Task::new("Existing task on disk")).unwrap();
        store.flush().unwrap();
        (dir, store, UnitOfWork::new(&path))
    }

    #[test]
    fn state_machine_rejects_misuse() {
        let dir = tempfile::tempdir().unwrap();
        let mut uow = UnitOfWork::new(dir.path().join("tasks.json"));

        assert!(matches!(uow.commit_transaction(), Err(StoreError::InvalidOperation(_))));
        assert!(matches!(uow.rollback_transaction(), Err(StoreError::InvalidOperation(_))));

        uow.begin_transaction().unwrap();
        assert!(uow.is_active());
        assert!(matches!(uow.begin_transaction(), Err(StoreError::InvalidOperation(_))));
        uow.commit_transaction().unwrap();
        assert!(!uow.is_active());
        assert!(matches!(uow.commit_transaction(), Err(StoreError::InvalidOperation(_))));
    }

    #[test]
    fn rollback_without_save_keeps_file_and_reload_drops_task() {
        let (_dir, mut store, mut uow) = seeded();
        let before = fs::read(store.path()).unwrap();

        uow.begin_transaction().unwrap();
        let id = store.add(Task::new("Added inside transaction")).unwrap();
        uow.rollback_transaction().unwrap();

        assert_eq!(fs::read(store.path()).unwrap(), before);
        // In-memory list still has it until reloaded.
        assert!(store.get_by_id(id).is_some());
        store.load().unwrap();
        assert!(store.get_by_id(id).is_none());
    }

    #[test]
    fn rollback_after_save_restores_bytes_exactly() {
        let (_dir, mut store, mut uow) = seeded();
        let before = fs::read(store.path()).unwrap();

        uow.begin_transaction().unwrap();
        store.add(Task::new("Saved then rolled back")).unwrap();
        store.flush().unwrap();
        assert_ne!(fs::read(store.path()).unwrap(), before);
        uow.rollback_transaction().unwrap();

        assert_eq!(fs::read(store.path()).unwrap(), before);
        let fresh = TaskStore::open(store.path()).unwrap();
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn rollback_deletes_file_that_did_not_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let mut store = TaskStore::open(&path).unwrap();
        let mut uow = UnitOfWork::new(&path);

        uow.begin_transaction().unwrap();
        store.add(Task::new("First task ever made")).unwrap();
        store.flush().unwrap();
        assert!(path.exists());
        uow.rollback_transaction().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn commit_after_save_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let mut store = TaskStore::open(&path).unwrap();
        let mut uow = UnitOfWork::new(&path);

        uow.begin_transaction().unwrap();
        store
            .add(Task::new("Write integration tests").with_id(5))
            .unwrap();
        store.flush().unwrap();
        uow.commit_transaction().unwrap();

        let reloaded = TaskStore::open(&path).unwrap();
        let all = reloaded.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, 5);
        assert_eq!(all[0].description, "Write integration tests");
    }

    #[test]
    fn commit_does_not_flush() {
        let (_dir, mut store, mut uow) = seeded();
        let before = fs::read(store.path()).unwrap();
        uow.begin_transaction().unwrap();
        store.add(Task::new("Never saved to disk")).unwrap();
        uow.commit_transaction().unwrap();
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn drop_while_active_rolls_back() {
        let (_dir, mut store, uow) = seeded();
        let before = fs::read(store.path()).unwrap();
        {
            let mut uow = uow;
            uow.begin_transaction().unwrap();
            store.add(Task::new("Dropped mid transaction")).unwrap();
            store.flush().unwrap();
        }
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }
}
