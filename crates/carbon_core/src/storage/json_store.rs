use crate::error::AppError;
use crate::model::{NewTask, Task, TaskFilter};
use crate::storage::{TaskState, TaskStore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "tasks.json";
const STORE_ENV_VAR: &str = "CARBONTRACK_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredTasks {
    schema_version: u32,
    #[serde(default)]
    next_id: u64,
    tasks: Vec<Task>,
}

/// File-backed store. Every operation reads the whole file once and, for
/// writes, rewrites it, so each call works on one consistent snapshot.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(store_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<T, F>(&self, apply: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut TaskState) -> Result<T, AppError>,
    {
        let mut state = load_state(&self.path)?;
        let result = apply(&mut state)?;
        save_state(&self.path, &state)?;
        Ok(result)
    }
}

impl TaskStore for JsonStore {
    fn insert(&self, task: NewTask) -> Result<Task, AppError> {
        let task = self.update(|state| state.insert(task))?;
        tracing::debug!(id = task.id, path = %self.path.display(), "stored task");
        Ok(task)
    }

    fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        Ok(filter.apply(&load_state(&self.path)?.tasks))
    }

    fn get(&self, id: u64) -> Result<Option<Task>, AppError> {
        Ok(load_state(&self.path)?.get(id).cloned())
    }

    fn update_completed(&self, id: u64) -> Result<Task, AppError> {
        let mut state = load_state(&self.path)?;
        let (task, changed) = state.complete(id)?;
        if changed {
            save_state(&self.path, &state)?;
        }
        Ok(task)
    }

    fn delete(&self, id: u64) -> Result<Task, AppError> {
        self.update(|state| state.remove(id))
    }

    fn clear_all(&self) -> Result<usize, AppError> {
        self.update(|state| Ok(state.clear()))
    }
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("carbontrack")
            .join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("carbontrack")
            .join(STORE_FILE_NAME))
    }
}

pub fn load_state(path: &Path) -> Result<TaskState, AppError> {
    if !path.exists() {
        return Ok(TaskState::default());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredTasks =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    let mut seen = HashSet::with_capacity(stored.tasks.len());
    for task in &stored.tasks {
        if !seen.insert(task.id) {
            return Err(AppError::invalid_data(format!("duplicate task id {}", task.id)));
        }
        if !task.carbon.is_finite() || task.carbon < 0.0 {
            return Err(AppError::invalid_data(format!(
                "task {} has invalid carbon value",
                task.id
            )));
        }
    }

    // Files written by hand may omit `next_id`; never hand out an id in use.
    let max_id = stored.tasks.iter().map(|task| task.id).max().unwrap_or(0);
    let next_id = max_id
        .checked_add(1)
        .ok_or_else(|| AppError::invalid_data("task id space exhausted"))?
        .max(stored.next_id);

    Ok(TaskState {
        tasks: stored.tasks,
        next_id,
    })
}

/// Writes the store to a temporary file next to `path` and renames it into
/// place, so readers see either the old or the new contents.
pub fn save_state(path: &Path, state: &TaskState) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|err| AppError::io(err.to_string()))?;

    let stored = StoredTasks {
        schema_version: SCHEMA_VERSION,
        next_id: state.next_id,
        tasks: state.tasks.to_vec(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;

    let mut file =
        tempfile::NamedTempFile::new_in(dir).map_err(|err| AppError::io(err.to_string()))?;
    file.write_all(content.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        file.as_file()
            .set_permissions(permissions)
            .map_err(|err| AppError::io(err.to_string()))?;
    }

    file.persist(path)
        .map_err(|err| AppError::io(err.error.to_string()))?;
    Ok(())
}
