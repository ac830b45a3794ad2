use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::slot::Slot;

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    #[default]
    Study,
    Exercise,
    Research,
    Creation,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Study,
        Category::Exercise,
        Category::Research,
        Category::Creation,
        Category::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Study => "study",
            Category::Exercise => "exercise",
            Category::Research => "research",
            Category::Creation => "creation",
            Category::Other => "other",
        }
    }

    pub fn from_name(input: &str) -> Option<Category> {
        let needle = input.to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.name() == needle)
    }
}

/// Derived task state. `Skipped` is reserved: it is declared for forward
/// compatibility with persisted data but no operation assigns it.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Skipped,
}

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct Task {
    /// UUID to identify the task
    pub id: Uuid,
    /// The objective this task belongs to
    pub objective_id: Uuid,
    /// Title of the task
    pub title: String,
    /// Category of the task
    pub category: Category,
    /// Length of one session in minutes
    pub duration_minutes: u32,
    /// Derived status, recomputed on completion changes
    pub status: TaskStatus,
    /// How many occurrences the task gets per week
    pub repeat_count: u32,
    /// Calendar positions the task occupies; never longer than `repeat_count`
    #[serde(default)]
    pub scheduled_slots: Vec<Slot>,
    /// Occurrences checked off; always a subset of `scheduled_slots`
    #[serde(default)]
    pub completed_slots: Vec<Slot>,
    /// If true, the task resets every week. If false, it's one-off.
    pub is_recurring: bool,
    /// Sub tasks with per-slot completion
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    /// Occurrences still available for placement this week
    pub fn remaining_occurrences(&self) -> u32 {
        self.repeat_count
            .saturating_sub(self.scheduled_slots.len() as u32)
    }

    /// True when the task has at least one occurrence and all of them are
    /// checked off
    pub fn is_fully_completed(&self) -> bool {
        !self.scheduled_slots.is_empty()
            && self
                .scheduled_slots
                .iter()
                .all(|s| self.completed_slots.contains(s))
    }
}

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct Subtask {
    /// UUID of the subtask
    pub id: Uuid,
    /// Title of the subtask
    pub title: String,
    /// Slots in which this subtask has been checked off
    #[serde(default)]
    pub completed_in_slots: Vec<Slot>,
}
