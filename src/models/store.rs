use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    note::{Note, NoteCategory},
    objective::{OBJECTIVE_COLORS, Objective},
    slot::ScheduleSlot,
    task::Task,
};

/// Current schema version
pub const CURRENT_VERSION: u32 = 2;

/// The whole persisted graph. Serialized wholesale on every change.
#[derive(Serialize, Deserialize)]
pub struct Store {
    pub version: u32,
    pub objectives: Vec<Objective>,
    pub tasks: Vec<Task>,
    pub schedule: Vec<ScheduleSlot>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub note_categories: Vec<NoteCategory>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            objectives: vec![],
            tasks: vec![],
            schedule: vec![],
            notes: vec![],
            note_categories: vec![],
        }
    }
}

impl Store {
    pub fn get_objective(&self, id: Uuid) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.id == id)
    }

    pub fn get_objective_by_slug(&self, slug: &str) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.slug == slug)
    }

    pub fn get_task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_task_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn get_note_category(&self, id: Uuid) -> Option<&NoteCategory> {
        self.note_categories.iter().find(|c| c.id == id)
    }

    /// Next color from the objective palette, cycling
    pub fn next_objective_color(&self) -> &'static str {
        OBJECTIVE_COLORS[self.objectives.len() % OBJECTIVE_COLORS.len()]
    }
}
