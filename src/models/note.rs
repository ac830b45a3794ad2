use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct NoteCategory {
    /// UUID of the category
    pub id: Uuid,
    /// Name of the category
    pub name: String,
    /// Hex color used when rendering the category
    pub color: String,
}

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct Note {
    /// UUID of the note
    pub id: Uuid,
    /// Title of the note
    pub title: String,
    /// Free-form content
    pub content: String,
    /// Tasks this note is linked to
    #[serde(default)]
    pub linked_task_ids: Vec<Uuid>,
    /// The note category, if any
    pub category_id: Option<Uuid>,
    /// Tags of the note
    #[serde(default)]
    pub tags: Vec<String>,
    /// When the note was created
    pub created_at: Timestamp,
    /// When the note was last edited
    pub updated_at: Timestamp,
}
