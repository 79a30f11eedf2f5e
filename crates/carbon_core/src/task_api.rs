use crate::aggregate::{Summary, aggregate};
use crate::classify::{Estimate, classify};
use crate::error::AppError;
use crate::model::{Category, NewTask, Task, TaskFilter};
use crate::storage::TaskStore;
use serde::Serialize;
use time::OffsetDateTime;

/// The filtered task list together with its rollups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub tasks: Vec<Task>,
    pub summary: Summary,
}

/// Parses a manual carbon figure. A missing or blank value means "no
/// override"; anything else must be a finite, non-negative number.
pub fn parse_carbon_override(raw: Option<&str>) -> Result<Option<f64>, AppError> {
    let trimmed = match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return Ok(None),
    };

    let carbon: f64 = trimmed
        .parse()
        .map_err(|_| AppError::invalid_input(format!("carbon must be a number: '{trimmed}'")))?;
    if !carbon.is_finite() {
        return Err(AppError::invalid_input("carbon must be a finite number"));
    }
    if carbon < 0.0 {
        return Err(AppError::invalid_input("carbon must not be negative"));
    }

    Ok(Some(carbon))
}

pub fn parse_task_id(raw: &str) -> Result<u64, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    trimmed
        .parse()
        .map_err(|_| AppError::invalid_input(format!("id must be a positive integer: '{trimmed}'")))
}

/// Validates the input and classifies it without touching any store.
pub fn estimate_task(name: &str, carbon: Option<&str>) -> Result<Estimate, AppError> {
    let name = validate_name(name)?;
    let override_carbon = parse_carbon_override(carbon)?;
    Ok(classify(name, override_carbon))
}

pub fn add_task(store: &dyn TaskStore, name: &str, carbon: Option<&str>) -> Result<Task, AppError> {
    add_task_at(store, name, carbon, OffsetDateTime::now_utc())
}

pub fn add_task_at(
    store: &dyn TaskStore,
    name: &str,
    carbon: Option<&str>,
    created_at: OffsetDateTime,
) -> Result<Task, AppError> {
    let name = validate_name(name)?;
    let override_carbon = parse_carbon_override(carbon)?;
    let estimate = classify(name, override_carbon);
    tracing::debug!(
        name,
        carbon = estimate.carbon,
        category = %estimate.category,
        "classified task"
    );

    store.insert(NewTask {
        name: name.to_string(),
        category: estimate.category,
        carbon: estimate.carbon,
        suggestion: estimate.suggestion,
        created_at,
    })
}

pub fn list_tasks(store: &dyn TaskStore, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
    store.list(filter)
}

pub fn get_task(store: &dyn TaskStore, id: u64) -> Result<Task, AppError> {
    store.get(id)?.ok_or_else(|| AppError::task_not_found(id))
}

pub fn complete_task(store: &dyn TaskStore, id: u64) -> Result<Task, AppError> {
    store.update_completed(id)
}

pub fn delete_task(store: &dyn TaskStore, id: u64) -> Result<Task, AppError> {
    let removed = store.delete(id)?;
    tracing::debug!(id, "deleted task");
    Ok(removed)
}

pub fn clear_tasks(store: &dyn TaskStore) -> Result<usize, AppError> {
    let removed = store.clear_all()?;
    tracing::info!(removed, "cleared all tasks");
    Ok(removed)
}

/// Reads the filtered set once and aggregates it against `now`.
pub fn dashboard(
    store: &dyn TaskStore,
    filter: &TaskFilter,
    now: OffsetDateTime,
    budget: Option<f64>,
) -> Result<Dashboard, AppError> {
    let tasks = store.list(filter)?;
    let summary = aggregate(&tasks, now, budget);
    Ok(Dashboard { tasks, summary })
}

struct SampleTask {
    name: &'static str,
    carbon: f64,
    category: Category,
    suggestion: &'static str,
}

const SAMPLE_TASKS: &[SampleTask] = &[
    SampleTask {
        name: "Car travel to office",
        carbon: 12.5,
        category: Category::Travel,
        suggestion: "Use public transport instead",
    },
    SampleTask {
        name: "Bus travel downtown",
        carbon: 3.0,
        category: Category::Travel,
        suggestion: "Good choice! Even better if you can walk or cycle",
    },
    SampleTask {
        name: "Beef burger lunch",
        carbon: 27.0,
        category: Category::Food,
        suggestion: "Try a plant-based burger next time",
    },
    SampleTask {
        name: "Vegetable stir-fry",
        carbon: 2.0,
        category: Category::Food,
        suggestion: "Excellent low-carbon choice",
    },
    SampleTask {
        name: "Office printing 50 pages",
        carbon: 0.25,
        category: Category::Office,
        suggestion: "Switch to digital docs where possible",
    },
    SampleTask {
        name: "Laptop usage (8h)",
        carbon: 0.4,
        category: Category::Office,
        suggestion: "Enable energy-saving mode",
    },
    SampleTask {
        name: "Misc shopping",
        carbon: 5.0,
        category: Category::Other,
        suggestion: "Look for eco-friendly alternatives",
    },
];

/// Inserts the bundled demo records. Their figures are fixed rather than
/// classified.
pub fn seed_sample_tasks(
    store: &dyn TaskStore,
    created_at: OffsetDateTime,
) -> Result<Vec<Task>, AppError> {
    SAMPLE_TASKS
        .iter()
        .map(|sample| {
            store.insert(NewTask {
                name: sample.name.to_string(),
                category: sample.category,
                carbon: sample.carbon,
                suggestion: sample.suggestion.to_string(),
                created_at,
            })
        })
        .collect()
}

fn validate_name(name: &str) -> Result<&str, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("name is required"));
    }
    Ok(trimmed)
}
