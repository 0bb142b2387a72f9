pub mod audit;
pub mod cache;
pub mod config;
pub mod error;
pub mod lockfile;
pub mod service;
pub mod task_store;
pub mod unit_of_work;

pub use error::StoreError;
pub use service::TaskService;
pub use task_store::TaskStore;
pub use unit_of_work::UnitOfWork;
