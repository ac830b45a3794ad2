use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{slot::{ScheduleSlot, Slot}, store::Store},
    scheduler,
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum BlockSlotError {
    #[error("Slot {slot} is occupied by '{task}'. Clear it before blocking.")]
    SlotOccupied { slot: Slot, task: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Mark a weekly slot as unavailable. An existing constraint entry is
/// flipped rather than duplicated. Blocking a slot that currently holds a
/// task occurrence is refused: a blocked slot may never appear in any
/// task's schedule.
pub fn block_slot(
    store: &mut Store,
    storage: &impl Storage,
    slot: Slot,
) -> Result<(), BlockSlotError> {
    if let Some(task) = scheduler::occupant(&store.tasks, slot) {
        return Err(BlockSlotError::SlotOccupied {
            slot,
            task: task.title.clone(),
        });
    }

    match store
        .schedule
        .iter_mut()
        .find(|s| s.day == slot.day && s.hour == slot.hour)
    {
        Some(entry) => entry.is_blocked = true,
        None => store.schedule.push(ScheduleSlot {
            id: Uuid::new_v4(),
            day: slot.day,
            hour: slot.hour,
            is_blocked: true,
        }),
    }

    storage.save(store)?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum OpenSlotError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Lift a blocking constraint. A slot with no constraint entry is already
/// open, so this is a no-op then.
pub fn open_slot(
    store: &mut Store,
    storage: &impl Storage,
    slot: Slot,
) -> Result<bool, OpenSlotError> {
    let Some(entry) = store
        .schedule
        .iter_mut()
        .find(|s| s.day == slot.day && s.hour == slot.hour && s.is_blocked)
    else {
        return Ok(false);
    };

    entry.is_blocked = false;
    storage.save(store)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::Task;
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn test_block_and_open_flip_one_entry() {
        let mut store = Store::default();
        let storage = MemoryStorage::new();
        let slot = Slot { day: 4, hour: 18 };

        block_slot(&mut store, &storage, slot).unwrap();
        assert_eq!(store.schedule.len(), 1);
        assert!(scheduler::is_blocked(&store.schedule, slot));

        // Blocking again reuses the entry
        block_slot(&mut store, &storage, slot).unwrap();
        assert_eq!(store.schedule.len(), 1);

        assert!(open_slot(&mut store, &storage, slot).unwrap());
        assert_eq!(store.schedule.len(), 1);
        assert!(!scheduler::is_blocked(&store.schedule, slot));

        // Already open
        assert!(!open_slot(&mut store, &storage, slot).unwrap());
    }

    #[test]
    fn test_block_refuses_occupied_slot() {
        let mut store = Store::default();
        let storage = MemoryStorage::new();
        let slot = Slot { day: 0, hour: 9 };
        store.tasks.push(Task {
            id: Uuid::new_v4(),
            title: String::from("Grammar drills"),
            repeat_count: 1,
            scheduled_slots: vec![slot],
            ..Task::default()
        });

        let result = block_slot(&mut store, &storage, slot);
        assert!(matches!(result, Err(BlockSlotError::SlotOccupied { .. })));
        assert!(store.schedule.is_empty());
        assert!(storage.is_empty());
    }
}
