pub mod cache;
pub mod data;
pub mod fetch;
pub mod loader;

pub use data::*;
pub use loader::*;
