use jiff::Timestamp;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        note::{Note, NoteCategory},
        objective::OBJECTIVE_COLORS,
        store::Store,
    },
    services::tasks::{TaskLookupError, find_task},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum AddNoteError {
    #[error("Note category '{0}' not found")]
    CategoryNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AddNoteParameters {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

pub fn add_note(
    store: &mut Store,
    storage: &impl Storage,
    parameters: AddNoteParameters,
) -> Result<Note, AddNoteError> {
    let category_id = match parameters.category {
        Some(name) => {
            let needle = name.to_lowercase();
            let category = store
                .note_categories
                .iter()
                .find(|c| c.name.to_lowercase() == needle)
                .ok_or(AddNoteError::CategoryNotFound(name))?;
            Some(category.id)
        }
        None => None,
    };

    let now = Timestamp::now();
    let note = Note {
        id: Uuid::new_v4(),
        title: parameters.title,
        content: parameters.content,
        linked_task_ids: vec![],
        category_id,
        tags: parameters.tags,
        created_at: now,
        updated_at: now,
    };

    store.notes.push(note.clone());
    storage.save(store)?;

    Ok(note)
}

#[derive(Debug, Error)]
pub enum NoteLookupError {
    #[error("Note '{0}' not found")]
    NoteNotFound(String),

    #[error("Note title is ambiguous. Multiple notes found: {}", .0.join(", "))]
    AmbiguousNoteTitle(Vec<String>),
}

fn find_note<'a>(store: &'a Store, needle: &str) -> Result<&'a Note, NoteLookupError> {
    let matching: Vec<_> = store
        .notes
        .iter()
        .filter(|n| n.title.to_lowercase().contains(&needle.to_lowercase()))
        .collect();

    match matching.len() {
        0 => Err(NoteLookupError::NoteNotFound(needle.to_string())),
        1 => Ok(matching[0]),
        _ => Err(NoteLookupError::AmbiguousNoteTitle(
            matching.iter().map(|n| n.title.clone()).collect(),
        )),
    }
}

#[derive(Debug, Error)]
pub enum DeleteNoteError {
    #[error(transparent)]
    Lookup(#[from] NoteLookupError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub fn delete_note(
    store: &mut Store,
    storage: &impl Storage,
    fuzzy_title: &str,
) -> Result<Note, DeleteNoteError> {
    let note = find_note(store, fuzzy_title)?.clone();

    store.notes.retain(|n| n.id != note.id);
    storage.save(store)?;

    Ok(note)
}

#[derive(Debug, Error)]
pub enum LinkNoteError {
    #[error(transparent)]
    NoteLookup(#[from] NoteLookupError),

    #[error(transparent)]
    TaskLookup(#[from] TaskLookupError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct LinkNoteParameters {
    pub note: String,
    pub task: String,
}

/// Link a note to a task. Linking twice is a no-op.
pub fn link_note(
    store: &mut Store,
    storage: &impl Storage,
    parameters: LinkNoteParameters,
) -> Result<(Note, String), LinkNoteError> {
    let note_id = find_note(store, &parameters.note)?.id;
    let task = find_task(store, &parameters.task)?;
    let (task_id, task_title) = (task.id, task.title.clone());

    let note = store
        .notes
        .iter_mut()
        .find(|n| n.id == note_id)
        .expect("note id was just resolved");
    if !note.linked_task_ids.contains(&task_id) {
        note.linked_task_ids.push(task_id);
        note.updated_at = Timestamp::now();
    }
    let note = note.clone();

    storage.save(store)?;
    Ok((note, task_title))
}

#[derive(Debug, Error)]
pub enum CreateNoteCategoryError {
    #[error("Note category '{0}' already exists")]
    CategoryAlreadyExists(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub fn create_note_category(
    store: &mut Store,
    storage: &impl Storage,
    name: String,
) -> Result<NoteCategory, CreateNoteCategoryError> {
    let needle = name.to_lowercase();
    if store
        .note_categories
        .iter()
        .any(|c| c.name.to_lowercase() == needle)
    {
        return Err(CreateNoteCategoryError::CategoryAlreadyExists(name));
    }

    let category = NoteCategory {
        id: Uuid::new_v4(),
        name,
        color: OBJECTIVE_COLORS[store.note_categories.len() % OBJECTIVE_COLORS.len()].to_string(),
    };

    store.note_categories.push(category.clone());
    storage.save(store)?;

    Ok(category)
}
