use std::path::PathBuf;

use serde_json::Value;

use crate::storage::StorageError;

type MigrationFn = fn(Value) -> Result<Value, StorageError>;

/// `MIGRATIONS[n]` takes a version n+1 store to version n+2
const MIGRATIONS: &[MigrationFn] = &[migrate_v1_to_v2];

/// Read the schema version from the raw document. Stores written before the
/// field existed are v1.
pub fn detect_version(content: &str) -> Result<u32, StorageError> {
    let value: Value = serde_json::from_str(content).map_err(|e| StorageError::ParseFailed {
        path: PathBuf::from("<unknown>"),
        source: e,
    })?;

    match value.get("version") {
        None => Ok(1),
        Some(field) => match field.as_u64() {
            Some(version) => Ok(version as u32),
            None => Err(StorageError::InvalidVersionField),
        },
    }
}

/// Walk the store from one schema version to another, one step at a time.
pub fn apply_migrations(
    mut data: Value,
    from_version: u32,
    to_version: u32,
) -> Result<Value, StorageError> {
    if from_version > to_version {
        return Err(StorageError::FutureVersion(from_version));
    }

    for version in from_version..to_version {
        let step = MIGRATIONS
            .get((version - 1) as usize)
            .ok_or(StorageError::UnsupportedVersion(version))?;
        data = step(data)?;
    }

    Ok(data)
}

/// v1 stores predate multi-occurrence scheduling: each task held at most a
/// single `scheduled_slot` key and there were no notes. Coerce every task
/// into the current shape:
/// - `scheduled_slot` becomes a one-element `scheduled_slots` array,
/// - a completed legacy task seeds `completed_slots` with that same slot,
/// - `repeat_count` defaults to 1, `is_recurring` to true,
/// - missing `subtasks` / `notes` / `note_categories` become empty arrays.
fn migrate_v1_to_v2(mut value: Value) -> Result<Value, StorageError> {
    if let Some(obj) = value.as_object_mut() {
        obj.insert("version".to_string(), Value::from(2));

        if !obj.contains_key("notes") {
            obj.insert("notes".to_string(), Value::Array(vec![]));
        }
        if !obj.contains_key("note_categories") {
            obj.insert("note_categories".to_string(), Value::Array(vec![]));
        }

        if let Some(tasks) = obj.get_mut("tasks").and_then(|t| t.as_array_mut()) {
            for task in tasks {
                let Some(task_obj) = task.as_object_mut() else {
                    continue;
                };

                let legacy_slot = match task_obj.remove("scheduled_slot") {
                    Some(Value::String(s)) => Some(s),
                    _ => None,
                };
                let completed = task_obj
                    .get("status")
                    .and_then(|s| s.as_str())
                    .is_some_and(|s| s == "Completed");

                let scheduled: Vec<Value> = legacy_slot
                    .iter()
                    .cloned()
                    .map(Value::String)
                    .collect();
                let completed_slots: Vec<Value> = if completed {
                    scheduled.clone()
                } else {
                    vec![]
                };
                task_obj.insert("scheduled_slots".to_string(), Value::Array(scheduled));
                task_obj.insert("completed_slots".to_string(), Value::Array(completed_slots));

                if !task_obj.contains_key("repeat_count") {
                    task_obj.insert("repeat_count".to_string(), Value::from(1));
                }
                if !task_obj.contains_key("is_recurring") {
                    task_obj.insert("is_recurring".to_string(), Value::Bool(true));
                }
                if !task_obj.contains_key("subtasks") {
                    task_obj.insert("subtasks".to_string(), Value::Array(vec![]));
                }
            }
        }
    }

    Ok(value)
}
