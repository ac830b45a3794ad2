use thiserror::Error;

use crate::{
    models::store::Store,
    scheduler,
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum ResetError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// What a weekly reset did, for reporting
pub struct WeekResetSummary {
    /// Recurring tasks whose completion marks were cleared
    pub recurring_reset: usize,
    /// One-off tasks retired from the planning grid
    pub retired: usize,
}

/// Start a new week: recurring tasks keep their placement and lose their
/// completion marks; fully completed one-off tasks are retired.
pub fn start_new_week(
    store: &mut Store,
    storage: &impl Storage,
) -> Result<WeekResetSummary, ResetError> {
    let recurring_reset = store.tasks.iter().filter(|t| t.is_recurring).count();
    let retired = store
        .tasks
        .iter()
        .filter(|t| !t.is_recurring && t.is_fully_completed())
        .count();

    scheduler::weekly_reset(&mut store.tasks);
    storage.save(store)?;

    Ok(WeekResetSummary {
        recurring_reset,
        retired,
    })
}

#[derive(Debug, Error)]
pub enum WipeError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Erase everything: objectives, tasks, constraints and notes.
pub fn wipe_all(store: &mut Store, storage: &impl Storage) -> Result<(), WipeError> {
    *store = Store::default();
    storage.save(store)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::models::slot::Slot;
    use crate::models::task::{Task, TaskStatus};
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn test_start_new_week_summary() {
        let mut store = Store::default();
        let storage = MemoryStorage::new();
        let slot = Slot { day: 0, hour: 9 };
        store.tasks.push(Task {
            id: Uuid::new_v4(),
            title: String::from("Grammar drills"),
            repeat_count: 1,
            is_recurring: true,
            scheduled_slots: vec![slot],
            completed_slots: vec![slot],
            status: TaskStatus::Completed,
            ..Task::default()
        });
        store.tasks.push(Task {
            id: Uuid::new_v4(),
            title: String::from("File taxes"),
            repeat_count: 1,
            is_recurring: false,
            scheduled_slots: vec![Slot { day: 3, hour: 14 }],
            completed_slots: vec![Slot { day: 3, hour: 14 }],
            status: TaskStatus::Completed,
            ..Task::default()
        });

        let summary = start_new_week(&mut store, &storage).unwrap();
        assert_eq!(summary.recurring_reset, 1);
        assert_eq!(summary.retired, 1);
        assert_eq!(store.tasks[0].status, TaskStatus::Pending);
        assert_eq!(store.tasks[0].scheduled_slots, vec![slot]);
        assert!(store.tasks[1].scheduled_slots.is_empty());
        assert_eq!(store.tasks[1].status, TaskStatus::Completed);
        assert!(!storage.is_empty());
    }

    #[test]
    fn test_wipe_all_resets_to_default() {
        let mut store = Store::default();
        let storage = MemoryStorage::new();
        store.tasks.push(Task::default());

        wipe_all(&mut store, &storage).unwrap();
        assert!(store.tasks.is_empty());
        assert!(!storage.is_empty());
    }
}
