pub mod errors;
pub mod models;
pub mod pipeline;
pub mod scope;
pub mod target;
