use anyhow::{Context, Result};
use tasktrack_store::TaskService;

pub fn run(service: &TaskService, id: u64, json: bool) -> Result<()> {
    let removed = service
        .delete_task(id)
        .with_context(|| format!("cannot delete task {}", id))?;
    if json {
        return super::print_task(&removed, true);
    }
    println!("Deleted task {}: {}", removed.id, removed.description);
    Ok(())
}
