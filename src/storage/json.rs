use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use uuid::Uuid;

use crate::{
    models::store::{CURRENT_VERSION, Store},
    storage::{
        Storage, StorageError,
        migrations::{apply_migrations, detect_version},
    },
};

/// How many timestamped backups to keep next to the store file
const BACKUPS_TO_KEEP: usize = 5;

pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn backup_dir(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or(Path::new("."))
            .join("backups")
    }

    /// Copy the current store file into the backups directory, creating the
    /// directory on first use. Nothing to do when no store exists yet.
    fn create_backup(&self) -> Result<(), StorageError> {
        let store_exists = fs::exists(&self.path).map_err(|e| StorageError::BackupFailed {
            path: self.path.clone(),
            source: e,
        })?;
        if !store_exists {
            return Ok(());
        }

        let backup_dir = self.backup_dir();
        fs::create_dir_all(&backup_dir).map_err(|e| StorageError::BackupFailed {
            path: backup_dir.clone(),
            source: e,
        })?;

        let stem = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store.json".to_string());
        let backup_path = backup_dir.join(format!("{}-{}", stem, jiff::Timestamp::now()));

        fs::copy(&self.path, &backup_path).map_err(|e| StorageError::BackupFailed {
            path: backup_path,
            source: e,
        })?;
        Ok(())
    }

    /// Delete the oldest backups beyond [`BACKUPS_TO_KEEP`]. Timestamped
    /// names sort chronologically, so a lexicographic sort is enough.
    fn cleanup_old_backups(&self) -> Result<(), StorageError> {
        let backup_dir = self.backup_dir();
        let exists = fs::exists(&backup_dir).map_err(|e| StorageError::CleanupFailed {
            dir: backup_dir.clone(),
            source: e,
        })?;
        if !exists {
            return Ok(());
        }

        let mut backups = fs::read_dir(&backup_dir)
            .map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?
            .flatten()
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .collect::<Vec<_>>();
        backups.sort();

        let excess = backups.len().saturating_sub(BACKUPS_TO_KEEP);
        for path in &backups[..excess] {
            fs::remove_file(path).map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?;
        }

        Ok(())
    }
}

impl Storage for JsonFileStorage {
    fn load(&self) -> Result<Store, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Store::default()),
            Err(e) => {
                return Err(StorageError::LoadFailed {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let file_version = detect_version(&content)?;
        if file_version > CURRENT_VERSION {
            return Err(StorageError::FutureVersion(file_version));
        }

        let mut data: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| StorageError::ParseFailed {
                path: self.path.clone(),
                source: e,
            })?;

        if file_version < CURRENT_VERSION {
            data = apply_migrations(data, file_version, CURRENT_VERSION)?;
        }
        if let Some(obj) = data.as_object_mut() {
            obj.insert("version".to_string(), serde_json::json!(CURRENT_VERSION));
        }

        serde_json::from_value(data).map_err(|e| StorageError::ParseFailed {
            path: self.path.clone(),
            source: e,
        })
    }

    fn save(&self, store: &Store) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(store)
            .map_err(|e| StorageError::SerializeFailed { source: e })?;

        // Write to a unique temp file first, then rename over the store so
        // a crash mid-write never leaves a truncated file behind.
        let temp_path = PathBuf::from(format!("{}.tmp.{}", self.path.display(), Uuid::new_v4()));
        fs::write(&temp_path, json).map_err(|e| StorageError::SaveFailed {
            path: temp_path.clone(),
            source: e,
        })?;

        let lock_path = self.path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .open(&lock_path)
            .map_err(|e| StorageError::SaveFailed {
                path: lock_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::SaveFailed {
                path: lock_path.clone(),
                source: e,
            })?;

        self.create_backup()?;
        self.cleanup_old_backups()?;

        fs::rename(&temp_path, &self.path).map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            source: e,
        })?;

        lock_file.unlock().map_err(|e| StorageError::SaveFailed {
            path: lock_path,
            source: e,
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::models::{
        objective::Objective,
        slot::{ScheduleSlot, Slot},
        task::Task,
    };

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("otter_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_save_and_load() {
        let dir = test_dir("save_load");
        let objective = Objective {
            id: Uuid::new_v4(),
            title: String::from("Learn French"),
            slug: String::from("learn-french"),
            ..Objective::default()
        };
        let task = Task {
            id: Uuid::new_v4(),
            objective_id: objective.id,
            title: String::from("Grammar drills"),
            repeat_count: 2,
            scheduled_slots: vec![Slot { day: 0, hour: 9 }],
            is_recurring: true,
            ..Task::default()
        };
        let constraint = ScheduleSlot {
            id: Uuid::new_v4(),
            day: 4,
            hour: 18,
            is_blocked: true,
        };
        let store = Store {
            objectives: vec![objective],
            tasks: vec![task],
            schedule: vec![constraint],
            ..Store::default()
        };

        let storage = JsonFileStorage::new(dir.join("store.json"));
        storage.save(&store).unwrap();

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.objectives[0].slug, "learn-french");
        assert_eq!(loaded.tasks[0].id, store.tasks[0].id);
        assert_eq!(loaded.tasks[0].scheduled_slots, vec![Slot { day: 0, hour: 9 }]);
        assert!(loaded.schedule[0].is_blocked);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_loads_default_store() {
        let dir = test_dir("missing");
        let storage = JsonFileStorage::new(dir.join("store.json"));

        let store = storage.load().unwrap();
        assert_eq!(store.version, CURRENT_VERSION);
        assert!(store.tasks.is_empty());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = test_dir("invalid");
        let path = dir.join("store.json");
        fs::write(&path, "{ this is not valid json }").unwrap();

        let storage = JsonFileStorage::new(path);
        match storage.load() {
            Err(StorageError::ParseFailed { .. }) => {}
            _ => panic!("Expected ParseFailed error, got something else"),
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_v1_store_migrates_legacy_tasks() {
        let dir = test_dir("v1_migration");
        let path = dir.join("store.json");
        let old_json = format!(
            r#"{{
                "objectives": [],
                "tasks": [{{
                    "id": "{}",
                    "objective_id": "{}",
                    "title": "File taxes",
                    "category": "Other",
                    "duration_minutes": 60,
                    "status": "Completed",
                    "scheduled_slot": "3-14"
                }}],
                "schedule": []
            }}"#,
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        fs::write(&path, old_json).unwrap();

        let storage = JsonFileStorage::new(path);
        let store = storage.load().unwrap();

        assert_eq!(store.version, CURRENT_VERSION);
        let task = &store.tasks[0];
        assert_eq!(task.scheduled_slots, vec![Slot { day: 3, hour: 14 }]);
        assert_eq!(task.completed_slots, vec![Slot { day: 3, hour: 14 }]);
        assert_eq!(task.repeat_count, 1);
        assert!(task.is_recurring);
        assert!(task.subtasks.is_empty());
        assert!(store.notes.is_empty());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_future_version() {
        let dir = test_dir("future");
        let path = dir.join("store.json");
        fs::write(
            &path,
            r#"{"version": 999, "objectives": [], "tasks": [], "schedule": []}"#,
        )
        .unwrap();

        let storage = JsonFileStorage::new(path);
        match storage.load() {
            Err(StorageError::FutureVersion(999)) => {}
            _ => panic!("Expected FutureVersion(999) error"),
        }

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_backup_creation_and_cleanup() {
        let dir = test_dir("backups");
        let storage = JsonFileStorage::new(dir.join("store.json"));
        let backups_dir = dir.join("backups");

        let store = Store::default();
        storage.save(&store).unwrap();
        // First save has nothing to back up
        assert!(!backups_dir.exists());

        for _ in 0..7 {
            storage.save(&store).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        let backup_count = fs::read_dir(&backups_dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .count();
        assert_eq!(backup_count, BACKUPS_TO_KEEP, "Should keep exactly 5 backups");

        fs::remove_dir_all(&dir).unwrap();
    }
}
