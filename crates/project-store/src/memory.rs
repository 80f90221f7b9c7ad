//! Process-local project store.

use async_trait::async_trait;
use tokio::sync::Mutex;

use quadcam_common::error::QuadcamResult;
use quadcam_project_model::{NewProject, Project, ProjectId, ProjectPatch};

use crate::{ProjectStore, ProjectTable};

/// Store that keeps projects in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Mutex<ProjectTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list(&self) -> QuadcamResult<Vec<Project>> {
        Ok(self.table.lock().await.list())
    }

    async fn get(&self, id: ProjectId) -> QuadcamResult<Project> {
        self.table.lock().await.get(id)
    }

    async fn create(&self, project: NewProject) -> QuadcamResult<Project> {
        self.table.lock().await.create(project)
    }

    async fn update(&self, id: ProjectId, patch: ProjectPatch) -> QuadcamResult<Project> {
        self.table.lock().await.update(id, patch)
    }

    async fn delete(&self, id: ProjectId) -> QuadcamResult<()> {
        self.table.lock().await.delete(id)
    }
}
