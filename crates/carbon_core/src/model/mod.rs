mod filter;
mod task;

pub use filter::TaskFilter;
pub use task::{Category, NewTask, Task};
