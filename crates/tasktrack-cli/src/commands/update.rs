use anyhow::{Context, Result};
use tasktrack_core::task::Task;
use tasktrack_core::validate;
use tasktrack_store::TaskService;

pub fn status(service: &TaskService, id: u64, status: String, json: bool) -> Result<()> {
    let status = validate::validate_status(&status)?;
    let task = service.update_status(id, status)?;
    report(&task, &format!("status is now {}", task.status), json)
}

pub fn priority(service: &TaskService, id: u64, priority: String, json: bool) -> Result<()> {
    let priority = validate::validate_priority(&priority)?;
    let task = service.update_priority(id, priority)?;
    report(&task, &format!("priority is now {}", task.priority), json)
}

pub fn category(service: &TaskService, id: u64, category: String, json: bool) -> Result<()> {
    let task = service.add_category(id, &category)?;
    report(
        &task,
        &format!("categories: {}", task.categories.join(", ")),
        json,
    )
}

pub fn edit(
    service: &TaskService,
    id: u64,
    description: Option<String>,
    due: Option<String>,
    clear_due: bool,
    json: bool,
) -> Result<()> {
    anyhow::ensure!(
        description.is_some() || due.is_some() || clear_due,
        "nothing to edit: pass --description, --due or --clear-due"
    );
    let mut task = service
        .get_task(id)?
        .with_context(|| format!("task {} not found", id))?;
    if let Some(description) = description {
        task.description = description;
    }
    if let Some(due) = due {
        task.set_due_date(Some(super::parse_due(&due)?));
    } else if clear_due {
        task.set_due_date(None);
    }

    let task = service.update_task(task)?;
    report(&task, "updated", json)
}

fn report(task: &Task, what: &str, json: bool) -> Result<()> {
    if json {
        return super::print_task(task, true);
    }
    println!("Task {}: {}", task.id, what);
    Ok(())
}
