//! Concurrent process management - growth, crafting, expeditions

pub mod handlers;
pub mod manager;

pub use handlers::ProcessHandler;
pub use manager::ProcessManager;
