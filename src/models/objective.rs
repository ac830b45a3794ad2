use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Palette cycled when assigning colors to new objectives
pub const OBJECTIVE_COLORS: [&str; 8] = [
    "#93C5FD", // Blue
    "#FCA5A5", // Red
    "#6EE7B7", // Emerald
    "#FCD34D", // Amber
    "#A78BFA", // Violet
    "#F9A8D4", // Pink
    "#67E8F9", // Cyan
    "#FDBA74", // Orange
];

#[derive(Serialize, Deserialize, Default, Clone)]
pub struct Objective {
    /// UUID of the objective
    pub id: Uuid,
    /// Title of the objective
    pub title: String,
    /// Slug of the objective, used to address it from the CLI
    pub slug: String,
    /// Planning horizon of the objective
    pub kind: ObjectiveKind,
    /// Free-form description
    pub description: String,
    /// Hex color used to distinguish the objective when rendering
    pub color: String,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveKind {
    #[default]
    Week,
    Month,
}

impl ObjectiveKind {
    pub fn label(&self) -> &'static str {
        match self {
            ObjectiveKind::Week => "week",
            ObjectiveKind::Month => "month",
        }
    }
}
