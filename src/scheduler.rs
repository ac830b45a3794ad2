//! The slot scheduler: pure, synchronous transforms over the task list and
//! the weekly constraint list.
//!
//! Invariants maintained by every mutation path here:
//! - a slot holds at most one task occurrence across all tasks,
//! - a blocked slot never appears in any task's `scheduled_slots`,
//! - `scheduled_slots` never exceeds the task's `repeat_count`,
//! - `completed_slots` is always a subset of `scheduled_slots`.
//!
//! Invalid operations are predicate-gated no-ops, never errors: the state is
//! observably unchanged and the returned outcome says why nothing happened.

use uuid::Uuid;

use crate::models::slot::{ScheduleSlot, Slot};
use crate::models::task::{Task, TaskStatus};

/// Outcome of [`assign`]. Every variant except `Placed` leaves all tasks
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// The occurrence was placed. `filled` is true when this was the task's
    /// final remaining occurrence, so a caller holding a "selected task for
    /// placement" can drop the selection.
    Placed { filled: bool },
    /// The slot carries a blocking constraint
    SlotBlocked,
    /// Another occurrence already sits in the slot
    SlotOccupied,
    /// The task has already placed `repeat_count` occurrences
    RepeatExhausted,
    /// No task with that id
    UnknownTask,
}

/// Outcome of [`unassign`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unassignment {
    /// The slot's occupant lost this occurrence (and its completion mark,
    /// if it had one)
    Cleared { task_id: Uuid },
    /// The slot had no occupant
    Empty,
}

/// Outcome of [`toggle_completion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The session was checked off. `task_completed` is true when every
    /// scheduled occurrence of the task is now covered.
    Checked { task_completed: bool },
    /// The session was unchecked
    Unchecked,
    /// The slot is not among the task's scheduled occurrences
    NotScheduled,
    /// No task with that id
    UnknownTask,
}

/// Outcome of [`toggle_subtask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtaskToggle {
    Checked,
    Unchecked,
    /// The slot is not among the task's scheduled occurrences
    NotScheduled,
    /// The task has no subtask with that id
    UnknownSubtask,
    /// No task with that id
    UnknownTask,
}

/// True iff a constraint entry for `slot` has `is_blocked` set. An absent
/// entry means the slot is open.
pub fn is_blocked(schedule: &[ScheduleSlot], slot: Slot) -> bool {
    schedule
        .iter()
        .any(|s| s.day == slot.day && s.hour == slot.hour && s.is_blocked)
}

/// The task occupying `slot`, if any. At most one task can match as long as
/// all mutations go through this module.
pub fn occupant(tasks: &[Task], slot: Slot) -> Option<&Task> {
    tasks.iter().find(|t| t.scheduled_slots.contains(&slot))
}

/// Place one occurrence of a task into a slot.
pub fn assign(
    tasks: &mut [Task],
    schedule: &[ScheduleSlot],
    task_id: Uuid,
    slot: Slot,
) -> Assignment {
    if is_blocked(schedule, slot) {
        return Assignment::SlotBlocked;
    }
    if occupant(tasks, slot).is_some() {
        return Assignment::SlotOccupied;
    }

    let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) else {
        return Assignment::UnknownTask;
    };
    if task.scheduled_slots.len() >= task.repeat_count as usize {
        return Assignment::RepeatExhausted;
    }

    task.scheduled_slots.push(slot);
    Assignment::Placed {
        filled: task.remaining_occurrences() == 0,
    }
}

/// Remove whatever occupies a slot. A completed session, once unscheduled,
/// is no longer completed, so the slot is dropped from `completed_slots`
/// too and the task's status recomputed.
pub fn unassign(tasks: &mut [Task], slot: Slot) -> Unassignment {
    let Some(task) = tasks.iter_mut().find(|t| t.scheduled_slots.contains(&slot)) else {
        return Unassignment::Empty;
    };

    task.scheduled_slots.retain(|s| *s != slot);
    task.completed_slots.retain(|s| *s != slot);
    task.status = derive_status(task);

    Unassignment::Cleared { task_id: task.id }
}

/// Flip a session's completion mark. The slot must already be scheduled for
/// the task; otherwise nothing changes.
pub fn toggle_completion(tasks: &mut [Task], task_id: Uuid, slot: Slot) -> Completion {
    let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) else {
        return Completion::UnknownTask;
    };
    if !task.scheduled_slots.contains(&slot) {
        return Completion::NotScheduled;
    }

    let was_completed = task.completed_slots.contains(&slot);
    if was_completed {
        task.completed_slots.retain(|s| *s != slot);
    } else {
        task.completed_slots.push(slot);
    }
    task.status = derive_status(task);

    if was_completed {
        Completion::Unchecked
    } else {
        Completion::Checked {
            task_completed: task.status == TaskStatus::Completed,
        }
    }
}

/// Flip a subtask's completion mark within one scheduled slot.
pub fn toggle_subtask(
    tasks: &mut [Task],
    task_id: Uuid,
    subtask_id: Uuid,
    slot: Slot,
) -> SubtaskToggle {
    let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) else {
        return SubtaskToggle::UnknownTask;
    };
    if !task.scheduled_slots.contains(&slot) {
        return SubtaskToggle::NotScheduled;
    }
    let Some(subtask) = task.subtasks.iter_mut().find(|st| st.id == subtask_id) else {
        return SubtaskToggle::UnknownSubtask;
    };

    if subtask.completed_in_slots.contains(&slot) {
        subtask.completed_in_slots.retain(|s| *s != slot);
        SubtaskToggle::Unchecked
    } else {
        subtask.completed_in_slots.push(slot);
        SubtaskToggle::Checked
    }
}

/// Roll the week over, in one synchronous pass:
///
/// - recurring tasks keep their placement but lose all completion marks
///   (sessions and subtasks) and go back to `Pending`;
/// - one-off tasks that are fully completed are retired: placement cleared,
///   status forced to `Completed` so they stay out of future weeks;
/// - everything else is left untouched.
pub fn weekly_reset(tasks: &mut [Task]) {
    for task in tasks.iter_mut() {
        if task.is_recurring {
            task.completed_slots.clear();
            for subtask in &mut task.subtasks {
                subtask.completed_in_slots.clear();
            }
            task.status = TaskStatus::Pending;
        } else if task.status == TaskStatus::Completed || task.is_fully_completed() {
            task.scheduled_slots.clear();
            task.completed_slots.clear();
            task.status = TaskStatus::Completed;
        }
    }
}

/// Recompute the derived status: `Completed` iff the task has occurrences
/// and every one of them is checked off. `Skipped` is never produced.
pub fn derive_status(task: &Task) -> TaskStatus {
    if task.is_fully_completed() {
        TaskStatus::Completed
    } else {
        TaskStatus::Pending
    }
}
