use crate::model::{Category, Task};

/// Query-side predicates applied before aggregation. Both compose with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search<S: Into<String>>(mut self, search: S) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Returns the subset of `tasks` matching every set predicate, in input order.
    ///
    /// An unrecognized category matches nothing.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        let category = match self.category.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => match Category::parse(raw) {
                Some(category) => Some(category),
                None => return Vec::new(),
            },
            _ => None,
        };
        let needle = self
            .search
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(str::to_lowercase);

        tasks
            .iter()
            .filter(|task| category.is_none_or(|category| task.category == category))
            .filter(|task| {
                needle
                    .as_deref()
                    .is_none_or(|needle| task.name.to_lowercase().contains(needle))
            })
            .cloned()
            .collect()
    }
}
