use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        store::Store,
        task::{Category, Subtask, Task},
    },
    scheduler,
    storage::{Storage, StorageError},
};

/// Shared fuzzy task resolution: case-insensitive substring match on the
/// title, with explicit errors when nothing or more than one thing matches.
#[derive(Debug, Error)]
pub enum TaskLookupError {
    #[error("Task '{0}' not found")]
    TaskNotFound(String),

    #[error("Task name is ambiguous. Multiple tasks found: {}", .0.join(", "))]
    AmbiguousTaskName(Vec<String>),
}

pub fn find_task<'a>(store: &'a Store, needle: &str) -> Result<&'a Task, TaskLookupError> {
    let matching: Vec<_> = store
        .tasks
        .iter()
        .filter(|t| t.title.to_lowercase().contains(&needle.to_lowercase()))
        .collect();

    match matching.len() {
        0 => Err(TaskLookupError::TaskNotFound(needle.to_string())),
        1 => Ok(matching[0]),
        _ => Err(TaskLookupError::AmbiguousTaskName(
            matching.iter().map(|t| t.title.clone()).collect(),
        )),
    }
}

#[derive(Debug, Error)]
pub enum AddTaskError {
    #[error("Objective '{0}' not found")]
    ObjectiveNotFound(String),

    #[error("Objective name is ambiguous. Multiple objectives found: {}", .0.join(", "))]
    AmbiguousObjectiveName(Vec<String>),

    #[error("Unknown category '{0}'. Valid categories: study, exercise, research, creation, other")]
    InvalidCategory(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AddTaskParameters {
    pub title: String,
    pub objective: String,
    pub category: Option<String>,
    pub duration_minutes: u32,
    pub repeat_count: u32,
    pub one_off: bool,
}

pub fn add_task(
    store: &mut Store,
    storage: &impl Storage,
    parameters: AddTaskParameters,
) -> Result<Task, AddTaskError> {
    // Resolve the objective by exact slug first, then fuzzy title match
    let objective_id = if let Some(objective) = store.get_objective_by_slug(&parameters.objective) {
        objective.id
    } else {
        let matching: Vec<_> = store
            .objectives
            .iter()
            .filter(|o| {
                o.title
                    .to_lowercase()
                    .contains(&parameters.objective.to_lowercase())
            })
            .collect();
        match matching.len() {
            0 => return Err(AddTaskError::ObjectiveNotFound(parameters.objective)),
            1 => matching[0].id,
            _ => {
                let titles: Vec<String> = matching.iter().map(|o| o.title.clone()).collect();
                return Err(AddTaskError::AmbiguousObjectiveName(titles));
            }
        }
    };

    let category = match parameters.category {
        Some(name) => {
            Category::from_name(&name).ok_or(AddTaskError::InvalidCategory(name))?
        }
        None => Category::default(),
    };

    let task = Task {
        id: Uuid::new_v4(),
        objective_id,
        title: parameters.title,
        category,
        duration_minutes: parameters.duration_minutes,
        repeat_count: parameters.repeat_count.max(1),
        is_recurring: !parameters.one_off,
        ..Task::default()
    };

    store.tasks.push(task.clone());
    storage.save(store)?;

    Ok(task)
}

#[derive(Debug, Error)]
pub enum EditTaskError {
    #[error(transparent)]
    Lookup(#[from] TaskLookupError),

    #[error("Unknown category '{0}'. Valid categories: study, exercise, research, creation, other")]
    InvalidCategory(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct EditTaskParameters {
    pub task: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub duration_minutes: Option<u32>,
    pub repeat_count: Option<u32>,
    pub recurring: Option<bool>,
}

/// Edit a task in place, keeping its placement and completion state. Returns
/// the updated task and how many placed occurrences were dropped to fit a
/// lowered repeat count.
pub fn edit_task(
    store: &mut Store,
    storage: &impl Storage,
    parameters: EditTaskParameters,
) -> Result<(Task, usize), EditTaskError> {
    let task_id = find_task(store, &parameters.task)?.id;
    let category = match parameters.category {
        Some(name) => Some(Category::from_name(&name).ok_or(EditTaskError::InvalidCategory(name))?),
        None => None,
    };

    let Some(task) = store.get_task_mut(task_id) else {
        return Err(TaskLookupError::TaskNotFound(parameters.task).into());
    };

    if let Some(title) = parameters.title {
        task.title = title;
    }
    if let Some(category) = category {
        task.category = category;
    }
    if let Some(duration) = parameters.duration_minutes {
        task.duration_minutes = duration;
    }
    if let Some(recurring) = parameters.recurring {
        task.is_recurring = recurring;
    }

    let mut dropped = 0;
    if let Some(repeat) = parameters.repeat_count {
        task.repeat_count = repeat.max(1);

        // Lowering the repeat count below the placed count unplans the
        // newest occurrences; their completion marks go with them.
        let cap = task.repeat_count as usize;
        if task.scheduled_slots.len() > cap {
            dropped = task.scheduled_slots.len() - cap;
            task.scheduled_slots.truncate(cap);
            let kept = task.scheduled_slots.clone();
            task.completed_slots.retain(|s| kept.contains(s));
            task.status = scheduler::derive_status(task);
        }
    }

    let task = task.clone();
    storage.save(store)?;

    Ok((task, dropped))
}

#[derive(Debug, Error)]
pub enum DeleteTaskError {
    #[error(transparent)]
    Lookup(#[from] TaskLookupError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct DeleteTaskParameters {
    pub fuzzy_name: String,
}

pub fn delete_task(
    store: &mut Store,
    storage: &impl Storage,
    parameters: DeleteTaskParameters,
) -> Result<Task, DeleteTaskError> {
    let task = find_task(store, &parameters.fuzzy_name)?.clone();

    store.tasks.retain(|t| t.id != task.id);
    storage.save(store)?;

    Ok(task)
}

#[derive(Debug, Error)]
pub enum AddSubtaskError {
    #[error(transparent)]
    Lookup(#[from] TaskLookupError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AddSubtaskParameters {
    pub task: String,
    pub title: String,
}

pub fn add_subtask(
    store: &mut Store,
    storage: &impl Storage,
    parameters: AddSubtaskParameters,
) -> Result<Subtask, AddSubtaskError> {
    let task_id = find_task(store, &parameters.task)?.id;

    let subtask = Subtask {
        id: Uuid::new_v4(),
        title: parameters.title,
        completed_in_slots: vec![],
    };

    // The id was just resolved against the store, so the task is present
    if let Some(task) = store.get_task_mut(task_id) {
        task.subtasks.push(subtask.clone());
    }
    storage.save(store)?;

    Ok(subtask)
}
