use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{slot::Slot, store::Store},
    scheduler::{self, Assignment, Completion, SubtaskToggle, Unassignment},
    services::tasks::{TaskLookupError, find_task},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum PlanTaskError {
    #[error(transparent)]
    Lookup(#[from] TaskLookupError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct PlanTaskParameters {
    pub task: String,
    pub slot: Slot,
}

/// Place one occurrence of a task. Rejections from the scheduler are
/// reported in the outcome, not as errors, and nothing is persisted for
/// them since the state did not change.
pub fn plan_task(
    store: &mut Store,
    storage: &impl Storage,
    parameters: PlanTaskParameters,
) -> Result<(Assignment, String), PlanTaskError> {
    let task = find_task(store, &parameters.task)?;
    let (task_id, title) = (task.id, task.title.clone());

    let outcome = scheduler::assign(&mut store.tasks, &store.schedule, task_id, parameters.slot);
    if matches!(outcome, Assignment::Placed { .. }) {
        storage.save(store)?;
    }

    Ok((outcome, title))
}

#[derive(Debug, Error)]
pub enum ClearSlotError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Remove whatever occupies a slot; empty slots are left alone.
pub fn clear_slot(
    store: &mut Store,
    storage: &impl Storage,
    slot: Slot,
) -> Result<Unassignment, ClearSlotError> {
    let outcome = scheduler::unassign(&mut store.tasks, slot);
    if matches!(outcome, Unassignment::Cleared { .. }) {
        storage.save(store)?;
    }
    Ok(outcome)
}

#[derive(Debug, Error)]
pub enum CompleteSlotError {
    #[error(transparent)]
    Lookup(#[from] TaskLookupError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct CompleteSlotParameters {
    pub task: String,
    pub slot: Slot,
}

/// Toggle a session's completion mark.
pub fn complete_slot(
    store: &mut Store,
    storage: &impl Storage,
    parameters: CompleteSlotParameters,
) -> Result<(Completion, String), CompleteSlotError> {
    let task = find_task(store, &parameters.task)?;
    let (task_id, title) = (task.id, task.title.clone());

    let outcome = scheduler::toggle_completion(&mut store.tasks, task_id, parameters.slot);
    if matches!(outcome, Completion::Checked { .. } | Completion::Unchecked) {
        storage.save(store)?;
    }

    Ok((outcome, title))
}

#[derive(Debug, Error)]
pub enum CheckSubtaskError {
    #[error(transparent)]
    Lookup(#[from] TaskLookupError),

    #[error("Subtask '{0}' not found")]
    SubtaskNotFound(String),

    #[error("Subtask name is ambiguous. Multiple subtasks found: {}", .0.join(", "))]
    AmbiguousSubtaskName(Vec<String>),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct CheckSubtaskParameters {
    pub task: String,
    pub subtask: String,
    pub slot: Slot,
}

/// Toggle a subtask's completion mark within one scheduled slot.
pub fn check_subtask(
    store: &mut Store,
    storage: &impl Storage,
    parameters: CheckSubtaskParameters,
) -> Result<(SubtaskToggle, String), CheckSubtaskError> {
    let task = find_task(store, &parameters.task)?;
    let (task_id, subtask_id, subtask_title) =
        resolve_subtask(task.id, &task.subtasks, &parameters.subtask)?;

    let outcome = scheduler::toggle_subtask(&mut store.tasks, task_id, subtask_id, parameters.slot);
    if matches!(outcome, SubtaskToggle::Checked | SubtaskToggle::Unchecked) {
        storage.save(store)?;
    }

    Ok((outcome, subtask_title))
}

fn resolve_subtask(
    task_id: Uuid,
    subtasks: &[crate::models::task::Subtask],
    needle: &str,
) -> Result<(Uuid, Uuid, String), CheckSubtaskError> {
    let matching: Vec<_> = subtasks
        .iter()
        .filter(|st| st.title.to_lowercase().contains(&needle.to_lowercase()))
        .collect();

    match matching.len() {
        0 => Err(CheckSubtaskError::SubtaskNotFound(needle.to_string())),
        1 => Ok((task_id, matching[0].id, matching[0].title.clone())),
        _ => Err(CheckSubtaskError::AmbiguousSubtaskName(
            matching.iter().map(|st| st.title.clone()).collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::slot::ScheduleSlot;
    use crate::models::task::{Subtask, Task, TaskStatus};
    use crate::storage::memory::MemoryStorage;

    fn store_with_task(title: &str, repeat_count: u32) -> Store {
        let mut store = Store::default();
        store.tasks.push(Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            repeat_count,
            is_recurring: true,
            ..Task::default()
        });
        store
    }

    #[test]
    fn test_plan_task_persists_on_success_only() {
        let mut store = store_with_task("Grammar drills", 1);
        let storage = MemoryStorage::new();
        store.schedule.push(ScheduleSlot {
            id: Uuid::new_v4(),
            day: 0,
            hour: 9,
            is_blocked: true,
        });

        let (outcome, title) = plan_task(
            &mut store,
            &storage,
            PlanTaskParameters {
                task: String::from("drills"),
                slot: Slot { day: 0, hour: 9 },
            },
        )
        .unwrap();
        assert_eq!(outcome, Assignment::SlotBlocked);
        assert_eq!(title, "Grammar drills");
        assert!(storage.is_empty(), "a rejected placement must not persist");

        let (outcome, _) = plan_task(
            &mut store,
            &storage,
            PlanTaskParameters {
                task: String::from("drills"),
                slot: Slot { day: 1, hour: 9 },
            },
        )
        .unwrap();
        assert_eq!(outcome, Assignment::Placed { filled: true });
        assert!(!storage.is_empty());
    }

    #[test]
    fn test_plan_task_unknown_name() {
        let mut store = store_with_task("Grammar drills", 1);
        let storage = MemoryStorage::new();

        let result = plan_task(
            &mut store,
            &storage,
            PlanTaskParameters {
                task: String::from("piano"),
                slot: Slot { day: 0, hour: 9 },
            },
        );
        assert!(matches!(
            result,
            Err(PlanTaskError::Lookup(TaskLookupError::TaskNotFound(_)))
        ));
    }

    #[test]
    fn test_clear_slot_round_trip() {
        let mut store = store_with_task("Grammar drills", 1);
        let storage = MemoryStorage::new();
        let slot = Slot { day: 2, hour: 10 };
        let task_id = store.tasks[0].id;

        plan_task(
            &mut store,
            &storage,
            PlanTaskParameters {
                task: String::from("drills"),
                slot,
            },
        )
        .unwrap();

        let outcome = clear_slot(&mut store, &storage, slot).unwrap();
        assert_eq!(outcome, Unassignment::Cleared { task_id });
        assert!(store.tasks[0].scheduled_slots.is_empty());

        let outcome = clear_slot(&mut store, &storage, slot).unwrap();
        assert_eq!(outcome, Unassignment::Empty);
    }

    #[test]
    fn test_complete_slot_toggles_and_reports_status() {
        let mut store = store_with_task("Grammar drills", 1);
        let storage = MemoryStorage::new();
        let slot = Slot { day: 2, hour: 10 };

        plan_task(
            &mut store,
            &storage,
            PlanTaskParameters {
                task: String::from("drills"),
                slot,
            },
        )
        .unwrap();

        let (outcome, _) = complete_slot(
            &mut store,
            &storage,
            CompleteSlotParameters {
                task: String::from("drills"),
                slot,
            },
        )
        .unwrap();
        assert_eq!(
            outcome,
            Completion::Checked {
                task_completed: true
            }
        );
        assert_eq!(store.tasks[0].status, TaskStatus::Completed);

        let (outcome, _) = complete_slot(
            &mut store,
            &storage,
            CompleteSlotParameters {
                task: String::from("drills"),
                slot,
            },
        )
        .unwrap();
        assert_eq!(outcome, Completion::Unchecked);
        assert_eq!(store.tasks[0].status, TaskStatus::Pending);
    }

    #[test]
    fn test_check_subtask_resolution() {
        let mut store = store_with_task("Grammar drills", 1);
        let storage = MemoryStorage::new();
        let slot = Slot { day: 2, hour: 10 };
        store.tasks[0].subtasks.push(Subtask {
            id: Uuid::new_v4(),
            title: String::from("Warm-up"),
            completed_in_slots: vec![],
        });

        plan_task(
            &mut store,
            &storage,
            PlanTaskParameters {
                task: String::from("drills"),
                slot,
            },
        )
        .unwrap();

        let (outcome, title) = check_subtask(
            &mut store,
            &storage,
            CheckSubtaskParameters {
                task: String::from("drills"),
                subtask: String::from("warm"),
                slot,
            },
        )
        .unwrap();
        assert_eq!(outcome, SubtaskToggle::Checked);
        assert_eq!(title, "Warm-up");
        assert_eq!(store.tasks[0].subtasks[0].completed_in_slots, vec![slot]);

        let result = check_subtask(
            &mut store,
            &storage,
            CheckSubtaskParameters {
                task: String::from("drills"),
                subtask: String::from("cooldown"),
                slot,
            },
        );
        assert!(matches!(
            result,
            Err(CheckSubtaskError::SubtaskNotFound(_))
        ));
    }
}
