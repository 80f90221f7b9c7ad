//! Project CRUD.

use std::path::{Path, PathBuf};

use quadcam_common::config::AppConfig;
use quadcam_project_model::{LayoutConfig, NewProject, ProjectId, ProjectPatch};
use quadcam_project_store::{seed_if_empty, ProjectStore};

use super::open_store;

pub(crate) fn read_layout(path: &Path) -> anyhow::Result<LayoutConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read layout {}: {e}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    Ok(LayoutConfig::from_value(value)?)
}

pub async fn list(config: &AppConfig) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let projects = store.list().await?;
    if projects.is_empty() {
        println!("No projects. Run `quadcam projects seed` to create the default layout.");
        return Ok(());
    }

    println!("{:>4}  {:<32}  {:<20}  DESCRIPTION", "ID", "NAME", "CREATED");
    for p in &projects {
        println!(
            "{:>4}  {:<32}  {:<20}  {}",
            p.id,
            p.name,
            p.created_at.format("%Y-%m-%d %H:%M:%S"),
            p.description.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

pub async fn get(config: &AppConfig, id: ProjectId) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let project = store.get(id).await?;
    println!("{}", serde_json::to_string_pretty(&project)?);
    Ok(())
}

pub async fn create(
    config: &AppConfig,
    name: String,
    description: Option<String>,
    layout: Option<PathBuf>,
) -> anyhow::Result<()> {
    let layout = match layout {
        Some(path) => read_layout(&path)?,
        None => LayoutConfig::standard(),
    };
    let mut new = NewProject::new(name, layout);
    if let Some(description) = description {
        new = new.with_description(description);
    }

    let store = open_store(config).await?;
    let project = store.create(new).await?;
    println!("Created project {} ({})", project.id, project.name);
    Ok(())
}

pub async fn update(
    config: &AppConfig,
    id: ProjectId,
    name: Option<String>,
    description: Option<String>,
    layout: Option<PathBuf>,
) -> anyhow::Result<()> {
    let patch = ProjectPatch {
        name,
        description,
        layout_config: layout.as_deref().map(read_layout).transpose()?,
    };
    if patch.is_empty() {
        anyhow::bail!("Nothing to update: pass --name, --description or --layout");
    }

    let store = open_store(config).await?;
    let project = store.update(id, patch).await?;
    println!("Updated project {} ({})", project.id, project.name);
    Ok(())
}

pub async fn delete(config: &AppConfig, id: ProjectId) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    store.delete(id).await?;
    println!("Deleted project {id}");
    Ok(())
}

pub async fn seed(config: &AppConfig) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    match seed_if_empty(&store).await? {
        Some(project) => println!("Seeded project {} ({})", project.id, project.name),
        None => println!("Store already has projects; nothing seeded."),
    }
    Ok(())
}
