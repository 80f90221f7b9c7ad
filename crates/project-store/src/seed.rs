//! Default project seeding.

use quadcam_common::error::QuadcamResult;
use quadcam_project_model::{LayoutConfig, NewProject, Project};

use crate::ProjectStore;

/// The standard four-camera layout shipped with a fresh store.
pub fn default_project() -> NewProject {
    NewProject::new("Default Configuration", LayoutConfig::standard())
        .with_description("Standard Tesla Model 3/Y camera layout")
}

/// Create the default project when the store holds none.
pub async fn seed_if_empty(store: &dyn ProjectStore) -> QuadcamResult<Option<Project>> {
    if !store.list().await?.is_empty() {
        return Ok(None);
    }
    let project = store.create(default_project()).await?;
    tracing::info!(id = project.id, "Seeded default project");
    Ok(Some(project))
}
