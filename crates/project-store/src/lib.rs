//! Quadcam Project Store
//!
//! The persistence collaborator behind the project REST surface:
//! `list`, `get`, `create`, `update`, `delete`. Layouts are opaque
//! blobs here; the store only validates them through the model and
//! assigns ids and creation timestamps.
//!
//! - [`JsonFileStore`]: one JSON document on disk, survives restarts
//! - [`MemoryStore`]: process-local, for tests and throwaway sessions

pub mod file;
pub mod memory;
pub mod seed;

use async_trait::async_trait;

use quadcam_common::error::QuadcamResult;
use quadcam_project_model::{NewProject, Project, ProjectId, ProjectPatch};

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use seed::{default_project, seed_if_empty};

/// Record store for projects.
///
/// `create` and `update` reject invalid input with
/// `QuadcamError::Validation` and never write partially. Unknown ids are
/// `QuadcamError::NotFound`.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list(&self) -> QuadcamResult<Vec<Project>>;

    async fn get(&self, id: ProjectId) -> QuadcamResult<Project>;

    async fn create(&self, project: NewProject) -> QuadcamResult<Project>;

    async fn update(&self, id: ProjectId, patch: ProjectPatch) -> QuadcamResult<Project>;

    async fn delete(&self, id: ProjectId) -> QuadcamResult<()>;
}

/// In-memory table shared by both store implementations.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub(crate) struct ProjectTable {
    next_id: ProjectId,
    projects: Vec<Project>,
}

impl ProjectTable {
    pub(crate) fn list(&self) -> Vec<Project> {
        self.projects.clone()
    }

    pub(crate) fn get(&self, id: ProjectId) -> QuadcamResult<Project> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| quadcam_common::QuadcamError::not_found(id))
    }

    pub(crate) fn create(&mut self, new: NewProject) -> QuadcamResult<Project> {
        new.validate()?;
        let id = self.next_id.max(self.max_id()) + 1;
        let project = new.into_project(id, chrono::Utc::now())?;
        self.next_id = id;
        self.projects.push(project.clone());
        Ok(project)
    }

    pub(crate) fn update(&mut self, id: ProjectId, patch: ProjectPatch) -> QuadcamResult<Project> {
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| quadcam_common::QuadcamError::not_found(id))?;
        project.apply(patch)?;
        Ok(project.clone())
    }

    pub(crate) fn delete(&mut self, id: ProjectId) -> QuadcamResult<()> {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return Err(quadcam_common::QuadcamError::not_found(id));
        }
        Ok(())
    }

    fn max_id(&self) -> ProjectId {
        self.projects.iter().map(|p| p.id).max().unwrap_or(0)
    }
}
