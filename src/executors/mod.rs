pub mod command;
pub mod runner;

pub use runner::{CommandExecutor, SystemExecutor, TaskRunner};
