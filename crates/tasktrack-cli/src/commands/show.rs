use anyhow::Result;
use tasktrack_store::TaskService;

pub fn run(service: &TaskService, id: u64, json: bool) -> Result<()> {
    match service.get_task(id)? {
        Some(task) => super::print_task(&task, json),
        None => anyhow::bail!("task {} not found", id),
    }
}
