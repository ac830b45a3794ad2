use slug::slugify;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::{
        objective::{Objective, ObjectiveKind},
        store::Store,
    },
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum CreateObjectiveError {
    #[error("Objective '{0}' already exists")]
    ObjectiveAlreadyExists(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct CreateObjectiveParameters {
    pub title: String,
    pub monthly: bool,
    pub description: Option<String>,
}

pub fn create_objective(
    store: &mut Store,
    storage: &impl Storage,
    parameters: CreateObjectiveParameters,
) -> Result<Objective, CreateObjectiveError> {
    let objective_slug = slugify(&parameters.title);

    if store.get_objective_by_slug(&objective_slug).is_some() {
        return Err(CreateObjectiveError::ObjectiveAlreadyExists(
            parameters.title,
        ));
    }

    let objective = Objective {
        id: Uuid::new_v4(),
        title: parameters.title,
        slug: objective_slug,
        kind: if parameters.monthly {
            ObjectiveKind::Month
        } else {
            ObjectiveKind::Week
        },
        description: parameters.description.unwrap_or_default(),
        color: store.next_objective_color().to_string(),
    };

    store.objectives.push(objective.clone());
    storage.save(store)?;

    Ok(objective)
}

#[derive(Debug, Error)]
pub enum DeleteObjectiveError {
    #[error("Objective '{0}' not found")]
    ObjectiveNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct DeleteObjectiveParameters {
    pub slug: String,
}

/// Deletes an objective along with its tasks. The cascade keeps the store
/// free of tasks pointing at a missing objective.
pub fn delete_objective(
    store: &mut Store,
    storage: &impl Storage,
    parameters: DeleteObjectiveParameters,
) -> Result<Objective, DeleteObjectiveError> {
    let objective = store
        .get_objective_by_slug(&parameters.slug)
        .cloned()
        .ok_or(DeleteObjectiveError::ObjectiveNotFound(parameters.slug))?;

    store.objectives.retain(|o| o.id != objective.id);
    store.tasks.retain(|t| t.objective_id != objective.id);
    storage.save(store)?;

    Ok(objective)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::Task;
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn test_create_objective_assigns_slug_and_color() {
        let mut store = Store::default();
        let storage = MemoryStorage::new();

        let objective = create_objective(
            &mut store,
            &storage,
            CreateObjectiveParameters {
                title: String::from("Learn French"),
                monthly: false,
                description: None,
            },
        )
        .unwrap();

        assert_eq!(objective.slug, "learn-french");
        assert_eq!(objective.kind, ObjectiveKind::Week);
        assert!(!objective.color.is_empty());
        assert!(!storage.is_empty());

        let second = create_objective(
            &mut store,
            &storage,
            CreateObjectiveParameters {
                title: String::from("Get fit"),
                monthly: true,
                description: Some(String::from("Three sessions a week")),
            },
        )
        .unwrap();
        assert_eq!(second.kind, ObjectiveKind::Month);
        assert_ne!(second.color, objective.color);
    }

    #[test]
    fn test_create_objective_rejects_duplicate_slug() {
        let mut store = Store::default();
        let storage = MemoryStorage::new();
        let parameters = || CreateObjectiveParameters {
            title: String::from("Learn French"),
            monthly: false,
            description: None,
        };

        create_objective(&mut store, &storage, parameters()).unwrap();
        let result = create_objective(&mut store, &storage, parameters());
        assert!(matches!(
            result,
            Err(CreateObjectiveError::ObjectiveAlreadyExists(_))
        ));
        assert_eq!(store.objectives.len(), 1);
    }

    #[test]
    fn test_delete_objective_cascades_to_tasks() {
        let mut store = Store::default();
        let storage = MemoryStorage::new();

        let objective = create_objective(
            &mut store,
            &storage,
            CreateObjectiveParameters {
                title: String::from("Learn French"),
                monthly: false,
                description: None,
            },
        )
        .unwrap();
        store.tasks.push(Task {
            id: Uuid::new_v4(),
            objective_id: objective.id,
            title: String::from("Grammar drills"),
            ..Task::default()
        });
        store.tasks.push(Task {
            id: Uuid::new_v4(),
            objective_id: Uuid::new_v4(),
            title: String::from("Unrelated"),
            ..Task::default()
        });

        delete_objective(
            &mut store,
            &storage,
            DeleteObjectiveParameters {
                slug: String::from("learn-french"),
            },
        )
        .unwrap();

        assert!(store.objectives.is_empty());
        assert_eq!(store.tasks.len(), 1);
        assert_eq!(store.tasks[0].title, "Unrelated");
    }

    #[test]
    fn test_delete_missing_objective() {
        let mut store = Store::default();
        let storage = MemoryStorage::new();
        let result = delete_objective(
            &mut store,
            &storage,
            DeleteObjectiveParameters {
                slug: String::from("nope"),
            },
        );
        assert!(matches!(
            result,
            Err(DeleteObjectiveError::ObjectiveNotFound(_))
        ));
        assert!(storage.is_empty());
    }
}
