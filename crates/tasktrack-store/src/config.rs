use std::time::Duration;

const DEFAULT_TASK_TTL_SECS: u64 = 300;
const DEFAULT_LIST_TTL_SECS: u64 = 60;
const DEFAULT_ACTOR: &str = "local-user";
const MAX_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Cache lifetimes and audit identity for a [`TaskService`](crate::service::TaskService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Lifetime of a cached single task.
    pub task_ttl: Duration,
    /// Lifetime of a cached list or search result.
    pub list_ttl: Duration,
    /// Name recorded as the actor on audit records.
    pub actor: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            task_ttl: Duration::from_secs(DEFAULT_TASK_TTL_SECS),
            list_ttl: Duration::from_secs(DEFAULT_LIST_TTL_SECS),
            actor: DEFAULT_ACTOR.into(),
        }
    }
}

impl ServiceConfig {
    /// Read overrides from the environment.
    ///
    /// - `TASKTRACK_TASK_TTL_SECS` (default 300, clamped to 1s..7d)
    /// - `TASKTRACK_LIST_TTL_SECS` (default 60, clamped to 1s..7d)
    /// - `TASKTRACK_ACTOR` (default `local-user`)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secs = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
                .clamp(1, MAX_TTL_SECS)
        };
        let actor = lookup("TASKTRACK_ACTOR")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ACTOR.into());

        Self {
            task_ttl: Duration::from_secs(secs("TASKTRACK_TASK_TTL_SECS", DEFAULT_TASK_TTL_SECS)),
            list_ttl: Duration::from_secs(secs("TASKTRACK_LIST_TTL_SECS", DEFAULT_LIST_TTL_SECS)),
            actor,
        }
    }
}
