pub mod checker;
pub mod registry;
pub mod wordlist;

pub use registry::{TaskFactory, Tool};
