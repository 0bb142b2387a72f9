use anyhow::Result;
use tasktrack_core::validate;
use tasktrack_store::TaskService;

pub fn run(
    service: &TaskService,
    status: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    json: bool,
) -> Result<()> {
    let status = status.as_deref().map(validate::validate_status).transpose()?;
    let priority = priority.as_deref().map(validate::validate_priority).transpose()?;

    // Narrowest cached query first, remaining filters in memory.
    let mut tasks = match (status, priority, category.as_deref()) {
        (Some(s), _, _) => service.tasks_by_status(s)?,
        (None, Some(p), _) => service.tasks_by_priority(p)?,
        (None, None, Some(c)) => service.tasks_by_category(c)?,
        (None, None, None) => service.list_tasks()?,
    };
    if let Some(p) = priority {
        tasks.retain(|t| t.priority == p);
    }
    if let Some(c) = category.as_deref() {
        tasks.retain(|t| t.has_category(c));
    }

    super::print_tasks(&tasks, json, "No tasks found.")
}

pub fn search(service: &TaskService, term: String, json: bool) -> Result<()> {
    let tasks = service.search_tasks(&term)?;
    super::print_tasks(&tasks, json, &format!("No tasks matching '{}'.", term))
}

pub fn overdue(service: &TaskService, json: bool) -> Result<()> {
    let tasks = service.overdue_tasks()?;
    super::print_tasks(&tasks, json, "No overdue tasks.")
}
