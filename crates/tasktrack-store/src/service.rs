//! Task service: validated, transactional writes and cache-aside reads.
//!
//! Every write runs `begin -> reload -> validate -> mutate -> flush -> commit`
//! while holding the session lock, rolling the file back and reloading on
//! any error. Audit records are written after the lock is released and
//! never affect the result.

use crate::audit::{AuditLogger, TracingAuditLogger};
use crate::cache::{self, Cache, MemoryCache};
use crate::config::ServiceConfig;
use crate::error::StoreError;
use crate::task_store::TaskStore;
use crate::unit_of_work::UnitOfWork;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tasktrack_core::task::{Task, TaskId, TaskPriority, TaskStatus};
use tasktrack_core::validate;

const ENTITY_TYPE: &str = "Task";

struct Session {
    store: TaskStore,
    uow: UnitOfWork,
}

pub struct TaskService {
    path: PathBuf,
    session: Mutex<Session>,
    cache: Arc<dyn Cache>,
    audit: Arc<dyn AuditLogger>,
    config: ServiceConfig,
    /// Bumped on every committed write; part of every list cache key.
    generation: AtomicU64,
}

impl TaskService {
    pub fn open(
        path: impl Into<PathBuf>,
        cache: Arc<dyn Cache>,
        audit: Arc<dyn AuditLogger>,
        config: ServiceConfig,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let store = TaskStore::open(&path)?;
        let uow = UnitOfWork::new(&path);
        Ok(Self {
            path,
            session: Mutex::new(Session { store, uow }),
            cache,
            audit,
            config,
            generation: AtomicU64::new(0),
        })
    }

    /// Open with an in-memory cache, `tracing` audit records and default config.
    pub fn with_defaults(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open(
            path,
            Arc::new(MemoryCache::new()),
            Arc::new(TracingAuditLogger),
            ServiceConfig::default(),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    // --- Writes ---

    /// Validate and store a new task. A task carrying id `0` is numbered by the store.
    pub fn create_task(&self, task: Task) -> Result<Task, StoreError> {
        let started = Instant::now();
        let created = self.transact(|store| {
            let mut task = task;
            validate::validate_task(&mut task)?;
            let id = store.add(task)?;
            stored(store, id)
        })?;
        self.record(
            "create_task",
            &created,
            &format!("created task '{}'", created.description),
            started,
        );
        Ok(created)
    }

    /// Validate and replace an existing task. The stored creation date is kept.
    pub fn update_task(&self, task: Task) -> Result<Task, StoreError> {
        let started = Instant::now();
        let updated = self.transact(|store| {
            let mut task = task;
            if let Some(existing) = store.get_by_id(task.id) {
                task.creation_date = existing.creation_date;
            }
            validate::validate_task(&mut task)?;
            let id = task.id;
            store.update(task)?;
            stored(store, id)
        })?;
        self.record("update_task", &updated, "replaced task", started);
        Ok(updated)
    }

    pub fn update_status(&self, id: TaskId, status: TaskStatus) -> Result<Task, StoreError> {
        let started = Instant::now();
        let updated = self.transact(|store| {
            store.update_status(id, status)?;
            stored(store, id)
        })?;
        self.record(
            "update_status",
            &updated,
            &format!("status set to {}", status),
            started,
        );
        Ok(updated)
    }

    pub fn update_priority(&self, id: TaskId, priority: TaskPriority) -> Result<Task, StoreError> {
        let started = Instant::now();
        let updated = self.transact(|store| {
            store.update_priority(id, priority)?;
            stored(store, id)
        })?;
        self.record(
            "update_priority",
            &updated,
            &format!("priority set to {}", priority),
            started,
        );
        Ok(updated)
    }

    /// Sanitize, validate and attach a category.
    pub fn add_category(&self, id: TaskId, category: &str) -> Result<Task, StoreError> {
        let started = Instant::now();
        let mut added = String::new();
        let updated = self.transact(|store| {
            added = validate::validate_category(category)?;
            store.add_category(id, &added)?;
            stored(store, id)
        })?;
        self.record(
            "add_category",
            &updated,
            &format!("category '{}' added", added),
            started,
        );
        Ok(updated)
    }

    /// Delete a task, returning the removed record.
    pub fn delete_task(&self, id: TaskId) -> Result<Task, StoreError> {
        let started = Instant::now();
        let removed = self.transact(|store| {
            let task = stored(store, id)?;
            store.delete(id);
            Ok(task)
        })?;
        self.record("delete_task", &removed, "deleted task", started);
        Ok(removed)
    }

    // --- Reads ---

    pub fn get_task(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let key = cache::task_key(id);
        if let Some(task) = self.cached::<Task>(&key) {
            return Ok(Some(task));
        }
        let mut session = self.lock_session()?;
        session.store.load()?;
        let task = session.store.get_by_id(id);
        if let Some(ref task) = task {
            self.populate(&key, task, self.config.task_ttl);
        }
        Ok(task)
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.cached_list("all", |store| store.get_all())
    }

    pub fn tasks_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, StoreError> {
        self.cached_list(&format!("status:{}", status), |store| store.get_by_status(status))
    }

    pub fn tasks_by_priority(&self, priority: TaskPriority) -> Result<Vec<Task>, StoreError> {
        self.cached_list(&format!("priority:{}", priority), |store| {
            store.get_by_priority(priority)
        })
    }

    pub fn tasks_by_category(&self, category: &str) -> Result<Vec<Task>, StoreError> {
        self.cached_list(&format!("category:{}", category), |store| {
            store.get_by_category(category)
        })
    }

    pub fn search_tasks(&self, term: &str) -> Result<Vec<Task>, StoreError> {
        self.cached_list(&format!("search:{}", term.to_lowercase()), |store| {
            store.search(term)
        })
    }

    /// Open tasks due before today. Not cached: the answer moves with the clock.
    pub fn overdue_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let mut session = self.lock_session()?;
        session.store.load()?;
        Ok(session.store.get_overdue(Utc::now().date_naive()))
    }

    // --- Internals ---

    fn lock_session(&self) -> Result<MutexGuard<'_, Session>, StoreError> {
        self.session
            .lock()
            .map_err(|_| StoreError::InvalidOperation("task session lock poisoned".into()))
    }

    /// Run `change` as one transaction and invalidate the cache for the
    /// returned task before releasing the session.
    fn transact(
        &self,
        change: impl FnOnce(&mut TaskStore) -> Result<Task, StoreError>,
    ) -> Result<Task, StoreError> {
        let mut session = self.lock_session()?;
        let Session { store, uow } = &mut *session;

        uow.begin_transaction()?;
        match apply(store, change) {
            Ok(task) => {
                uow.commit_transaction()?;
                self.invalidate(task.id);
                Ok(task)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback_transaction() {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                if let Err(reload_err) = store.load() {
                    tracing::warn!(error = %reload_err, "reload after rollback failed");
                }
                tracing::debug!(error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }

    fn invalidate(&self, id: TaskId) {
        if let Err(e) = self.cache.remove(&cache::task_key(id)) {
            tracing::warn!(task_id = id, error = %e, "cache remove failed");
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    fn cached_list(
        &self,
        shape: &str,
        query: impl FnOnce(&TaskStore) -> Vec<Task>,
    ) -> Result<Vec<Task>, StoreError> {
        let mut session = self.lock_session()?;
        let key = cache::list_key(self.generation.load(Ordering::Acquire), shape);
        if let Some(tasks) = self.cached::<Vec<Task>>(&key) {
            return Ok(tasks);
        }
        session.store.load()?;
        let tasks = query(&session.store);
        self.populate(&key, &tasks, self.config.list_ttl);
        Ok(tasks)
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(key, error = %e, "discarding unreadable cache entry");
                    let _ = self.cache.remove(key);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, using store");
                None
            }
        }
    }

    fn populate<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to serialize cache entry");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, json, ttl) {
            tracing::warn!(key, error = %e, "cache write failed");
        }
    }

    fn record(&self, operation: &str, task: &Task, description: &str, started: Instant) {
        let actor = self.config.actor.as_str();
        let id = task.id.to_string();
        let subject = format!("{} {}", ENTITY_TYPE, id);
        if let Err(e) = self.audit.log_operation(operation, &subject, actor) {
            tracing::warn!(operation, error = %e, "audit operation failed");
        }
        if let Err(e) = self
            .audit
            .log_data_change(ENTITY_TYPE, &id, description, actor)
        {
            tracing::warn!(operation, error = %e, "audit data change failed");
        }
        if let Err(e) = self
            .audit
            .log_performance_metric(operation, started.elapsed(), &subject)
        {
            tracing::warn!(operation, error = %e, "audit metric failed");
        }
    }
}

fn apply(
    store: &mut TaskStore,
    change: impl FnOnce(&mut TaskStore) -> Result<Task, StoreError>,
) -> Result<Task, StoreError> {
    store.load()?;
    let task = change(store)?;
    store.flush()?;
    Ok(task)
}

fn stored(store: &TaskStore, id: TaskId) -> Result<Task, StoreError> {
    store.get_by_id(id).ok_or(StoreError::NotFound(id))
}
