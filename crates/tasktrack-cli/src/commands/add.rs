use anyhow::Result;
use tasktrack_core::task::Task;
use tasktrack_core::validate;
use tasktrack_store::TaskService;

pub fn run(
    service: &TaskService,
    description: String,
    priority: String,
    due: Option<String>,
    categories: Vec<String>,
    id: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut task = Task::new(description)
        .with_priority(validate::validate_priority(&priority)?)
        .with_categories(categories);
    if let Some(due) = due {
        task = task.with_due_date(super::parse_due(&due)?);
    }
    if let Some(id) = id {
        anyhow::ensure!(id > 0, "task id must be positive");
        task = task.with_id(id);
    }

    let created = service.create_task(task)?;
    if json {
        return super::print_task(&created, true);
    }
    println!("Created task {}: {}", created.id, created.description);
    Ok(())
}
