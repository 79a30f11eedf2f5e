use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Closed set of buckets a task is filed under.
///
/// Stored in snake_case; parsing is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[serde(alias = "Travel")]
    Travel,
    #[serde(alias = "Food")]
    Food,
    #[serde(alias = "Office")]
    Office,
    #[serde(alias = "Other")]
    Other,
    #[serde(alias = "Custom")]
    Custom,
}

impl Category {
    /// Categories reported in the summary breakdown, in display order.
    /// `Custom` is excluded.
    pub const BREAKDOWN: [Category; 4] = [
        Category::Travel,
        Category::Food,
        Category::Office,
        Category::Other,
    ];

    pub const ALL: [Category; 5] = [
        Category::Travel,
        Category::Food,
        Category::Office,
        Category::Other,
        Category::Custom,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Travel => "Travel",
            Self::Food => "Food",
            Self::Office => "Office",
            Self::Other => "Other",
            Self::Custom => "Custom",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(trimmed))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub name: String,
    pub category: Category,
    pub carbon: f64,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A validated record waiting for the store to assign its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub name: String,
    pub category: Category,
    pub carbon: f64,
    pub suggestion: String,
    pub created_at: OffsetDateTime,
}

impl NewTask {
    pub fn into_task(self, id: u64) -> Task {
        Task {
            id,
            name: self.name,
            category: self.category,
            carbon: self.carbon,
            suggestion: self.suggestion,
            completed: false,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, Task};

    #[test]
    fn category_parse_ignores_case_and_whitespace() {
        assert_eq!(Category::parse("food"), Some(Category::Food));
        assert_eq!(Category::parse("  TRAVEL "), Some(Category::Travel));
        assert_eq!(Category::parse("Custom"), Some(Category::Custom));
        assert_eq!(Category::parse("groceries"), None);
        assert_eq!(Category::parse(""), None);
    }

    #[test]
    fn category_deserializes_either_case() {
        let lower: Category = serde_json::from_str("\"office\"").unwrap();
        let title: Category = serde_json::from_str("\"Office\"").unwrap();
        assert_eq!(lower, Category::Office);
        assert_eq!(title, Category::Office);
        assert_eq!(serde_json::to_string(&Category::Office).unwrap(), "\"office\"");
    }

    #[test]
    fn task_defaults_optional_fields() {
        let task: Task = serde_json::from_str(
            r#"{"id": 7, "name": "Bus ride", "category": "travel", "carbon": 8.0, "created_at": "2025-12-20T08:30:00Z"}"#,
        )
        .unwrap();

        assert_eq!(task.id, 7);
        assert_eq!(task.category, Category::Travel);
        assert!(task.suggestion.is_empty());
        assert!(!task.completed);
    }
}
