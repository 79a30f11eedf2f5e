//! Task persistence behind the [`TaskStore`] trait.
//!
//! Both stores share [`TaskState`], so id assignment and the completion and
//! deletion rules behave the same whether records live in a file or in memory.

pub mod json_store;
mod memory;

pub use json_store::JsonStore;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::model::{NewTask, Task, TaskFilter};

pub trait TaskStore {
    /// Stores `task` under a fresh id and returns the stored record.
    fn insert(&self, task: NewTask) -> Result<Task, AppError>;

    fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, AppError>;

    fn get(&self, id: u64) -> Result<Option<Task>, AppError>;

    /// Marks the task completed. Completing an already completed task is a
    /// no-op that still succeeds.
    fn update_completed(&self, id: u64) -> Result<Task, AppError>;

    fn delete(&self, id: u64) -> Result<Task, AppError>;

    /// Removes every task and returns how many were removed.
    fn clear_all(&self) -> Result<usize, AppError>;
}

/// Full contents of a store. `next_id` only ever grows, so ids are never
/// handed out twice, even after deletes or a clear.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskState {
    pub tasks: Vec<Task>,
    pub next_id: u64,
}

impl Default for TaskState {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}

impl TaskState {
    pub fn insert(&mut self, task: NewTask) -> Result<Task, AppError> {
        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| AppError::invalid_data("task id space exhausted"))?;
        let task = task.into_task(self.next_id);
        self.next_id = next_id;
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Returns the task and whether the call changed it.
    pub fn complete(&mut self, id: u64) -> Result<(Task, bool), AppError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::task_not_found(id))?;

        let changed = !task.completed;
        task.completed = true;
        Ok((task.clone(), changed))
    }

    pub fn remove(&mut self, id: u64) -> Result<Task, AppError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::task_not_found(id))?;
        Ok(self.tasks.remove(index))
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::TaskState;
    use crate::model::{Category, NewTask};
    use time::macros::datetime;

    fn new_task(name: &str) -> NewTask {
        NewTask {
            name: name.to_string(),
            category: Category::Other,
            carbon: 5.0,
            suggestion: "Try an eco-friendly alternative.".to_string(),
            created_at: datetime!(2025-12-20 10:00 UTC),
        }
    }

    #[test]
    fn ids_are_not_reused_after_delete_or_clear() {
        let mut state = TaskState::default();
        let first = state.insert(new_task("one")).unwrap();
        let second = state.insert(new_task("two")).unwrap();
        state.remove(second.id).unwrap();
        let third = state.insert(new_task("three")).unwrap();
        state.clear();
        let fourth = state.insert(new_task("four")).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(third.id, 3);
        assert_eq!(fourth.id, 4);
    }

    #[test]
    fn complete_reports_whether_state_changed() {
        let mut state = TaskState::default();
        let task = state.insert(new_task("one")).unwrap();

        let (first, changed) = state.complete(task.id).unwrap();
        assert!(first.completed);
        assert!(changed);

        let (second, changed_again) = state.complete(task.id).unwrap();
        assert_eq!(first, second);
        assert!(!changed_again);
    }

    #[test]
    fn insert_fails_once_ids_run_out() {
        let mut state = TaskState {
            tasks: Vec::new(),
            next_id: u64::MAX,
        };

        let err = state.insert(new_task("last")).unwrap_err();

        assert_eq!(err.code(), "invalid_data");
        assert!(state.tasks.is_empty());
        assert_eq!(state.next_id, u64::MAX);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut state = TaskState::default();
        assert_eq!(state.complete(9).unwrap_err().code(), "not_found");
        assert_eq!(state.remove(9).unwrap_err().code(), "not_found");
    }
}
