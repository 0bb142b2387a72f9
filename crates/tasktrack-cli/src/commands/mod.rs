pub mod add;
pub mod delete;
pub mod list;
pub mod show;
pub mod update;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::path::Path;
use std::sync::Arc;
use tasktrack_core::task::Task;
use tasktrack_store::audit::TracingAuditLogger;
use tasktrack_store::cache::{Cache, MemoryCache, NoCache};
use tasktrack_store::config::ServiceConfig;
use tasktrack_store::TaskService;

pub fn open_service(file: &Path, no_cache: bool) -> Result<TaskService> {
    tracing::debug!(file = %file.display(), no_cache, "opening task file");
    let cache: Arc<dyn Cache> = if no_cache {
        Arc::new(NoCache)
    } else {
        Arc::new(MemoryCache::new())
    };
    TaskService::open(
        file,
        cache,
        Arc::new(TracingAuditLogger),
        ServiceConfig::from_env(),
    )
    .with_context(|| format!("cannot open task file {}", file.display()))
}

/// Accept `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_due(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("invalid due date '{}': expected YYYY-MM-DD or RFC 3339", input))
}

pub fn print_task(task: &Task, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(task)?);
        return Ok(());
    }
    println!("task {}", task.id);
    println!("Status:   {}", task.status);
    println!("Priority: {}", task.priority);
    println!("Created:  {}", task.creation_date.format("%Y-%m-%d %H:%M:%S %Z"));
    println!("Modified: {}", task.last_modified_date.format("%Y-%m-%d %H:%M:%S %Z"));
    if let Some(due) = task.due_date {
        println!("Due:      {}", due.format("%Y-%m-%d"));
    }
    if !task.categories.is_empty() {
        println!("Categories: {}", task.categories.join(", "));
    }
    println!();
    println!("    {}", task.description);
    Ok(())
}

pub fn print_tasks(tasks: &[Task], json: bool, empty_message: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tasks)?);
        return Ok(());
    }
    if tasks.is_empty() {
        println!("{}", empty_message);
        return Ok(());
    }
    for task in tasks {
        let mut line = format!(
            "#{:<4} {:<10} {:<6} {}",
            task.id, task.status, task.priority, task.description
        );
        if let Some(due) = task.due_date {
            line.push_str(&format!("  (due {})", due.format("%Y-%m-%d")));
        }
        if !task.categories.is_empty() {
            line.push_str(&format!("  [{}]", task.categories.join(", ")));
        }
        println!("{}", line);
    }
    Ok(())
}
