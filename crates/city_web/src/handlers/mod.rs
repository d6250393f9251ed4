pub mod ask;
pub mod pages;
pub mod tools;

pub use ask::ask;
pub use pages::{health, index};
pub use tools::call_tool;
