//! Project store backed by a single JSON document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use quadcam_common::error::{QuadcamError, QuadcamResult};
use quadcam_project_model::{NewProject, Project, ProjectId, ProjectPatch};

use crate::{ProjectStore, ProjectTable};

/// Store persisted to `path` after every successful mutation.
///
/// Mutations are applied to a copy of the table and only become visible
/// once the copy has been written, so a failed write leaves both disk and
/// memory unchanged.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: Mutex<ProjectTable>,
}

impl JsonFileStore {
    /// Open the store, creating an empty one if the file does not exist.
    pub async fn open(path: impl AsRef<Path>) -> QuadcamResult<Self> {
        let path = path.as_ref().to_path_buf();
        let table = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                QuadcamError::store(format!("Failed to parse {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ProjectTable::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), "Opened project store");
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, table: &ProjectTable) -> QuadcamResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(table)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut ProjectTable) -> QuadcamResult<T>,
    ) -> QuadcamResult<T> {
        let mut guard = self.table.lock().await;
        let mut next = guard.clone();
        let out = op(&mut next)?;
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }
}

#[async_trait]
impl ProjectStore for JsonFileStore {
    async fn list(&self) -> QuadcamResult<Vec<Project>> {
        Ok(self.table.lock().await.list())
    }

    async fn get(&self, id: ProjectId) -> QuadcamResult<Project> {
        self.table.lock().await.get(id)
    }

    async fn create(&self, project: NewProject) -> QuadcamResult<Project> {
        let created = self.mutate(|t| t.create(project)).await?;
        tracing::info!(id = created.id, name = %created.name, "Project created");
        Ok(created)
    }

    async fn update(&self, id: ProjectId, patch: ProjectPatch) -> QuadcamResult<Project> {
        let updated = self.mutate(|t| t.update(id, patch)).await?;
        tracing::info!(id, "Project updated");
        Ok(updated)
    }

    async fn delete(&self, id: ProjectId) -> QuadcamResult<()> {
        self.mutate(|t| t.delete(id)).await?;
        tracing::info!(id, "Project deleted");
        Ok(())
    }
}
