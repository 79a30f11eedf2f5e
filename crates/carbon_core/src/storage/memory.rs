use crate::error::AppError;
use crate::model::{NewTask, Task, TaskFilter};
use crate::storage::{TaskState, TaskStore};
use std::cell::RefCell;

/// Process-local store, used by callers that do not need persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<TaskState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for MemoryStore {
    fn insert(&self, task: NewTask) -> Result<Task, AppError> {
        self.state.borrow_mut().insert(task)
    }

    fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        Ok(filter.apply(&self.state.borrow().tasks))
    }

    fn get(&self, id: u64) -> Result<Option<Task>, AppError> {
        Ok(self.state.borrow().get(id).cloned())
    }

    fn update_completed(&self, id: u64) -> Result<Task, AppError> {
        let (task, _) = self.state.borrow_mut().complete(id)?;
        Ok(task)
    }

    fn delete(&self, id: u64) -> Result<Task, AppError> {
        self.state.borrow_mut().remove(id)
    }

    fn clear_all(&self) -> Result<usize, AppError> {
        Ok(self.state.borrow_mut().clear())
    }
}
