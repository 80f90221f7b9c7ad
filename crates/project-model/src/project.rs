//! Project records and their create/update payloads.
//!
//! A project is a named, server-identified layout. Ids and creation
//! timestamps are assigned by the store; nothing in this crate invents them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quadcam_common::error::QuadcamError;

use crate::layout::LayoutConfig;

/// Server-assigned project identifier.
pub type ProjectId = i64;

/// A persisted project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Immutable after creation.
    pub id: ProjectId,

    /// Human-readable, non-empty name.
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub layout_config: LayoutConfig,

    pub created_at: DateTime<Utc>,
}

/// Create payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub layout_config: Option<LayoutConfig>,
}

/// Partial update payload. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_config: Option<LayoutConfig>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, layout_config: LayoutConfig) -> Self {
        Self {
            name: name.into(),
            description: None,
            layout_config: Some(layout_config),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validate and return the layout to persist.
    pub fn validate(&self) -> Result<&LayoutConfig, ProjectError> {
        validate_name(&self.name)?;
        let layout = self
            .layout_config
            .as_ref()
            .ok_or_else(|| ProjectError::validation("layoutConfig", "Required"))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Build the stored record once the store has assigned identity.
    pub fn into_project(
        self,
        id: ProjectId,
        created_at: DateTime<Utc>,
    ) -> Result<Project, ProjectError> {
        let layout_config = *self.validate()?;
        Ok(Project {
            id,
            name: self.name,
            description: self.description,
            layout_config,
            created_at,
        })
    }
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.layout_config.is_none()
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(layout) = &self.layout_config {
            layout.validate()?;
        }
        Ok(())
    }
}

impl Project {
    /// Apply a patch. The project is untouched if validation fails.
    pub fn apply(&mut self, patch: ProjectPatch) -> Result<(), ProjectError> {
        patch.validate()?;
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(layout) = patch.layout_config {
            self.layout_config = layout;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), ProjectError> {
    if name.trim().is_empty() {
        return Err(ProjectError::validation("name", "Name is required"));
    }
    Ok(())
}

/// Errors that can occur when working with projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Invalid {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),
}

impl ProjectError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ProjectError> for QuadcamError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::ValidationError { field, message } => {
                QuadcamError::validation_field(field, message)
            }
            ProjectError::Parse(e) => {
                QuadcamError::validation_field("layoutConfig", format!("malformed layout: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project() -> Project {
        NewProject::new("Garage run", LayoutConfig::standard())
            .with_description("Morning commute")
            .into_project(7, Utc::now())
            .unwrap()
    }

    #[test]
    fn test_new_project_requires_name() {
        let err = NewProject::new("   ", LayoutConfig::standard())
            .validate()
            .unwrap_err();
        match err {
            ProjectError::ValidationError { field, .. } => assert_eq!(field, "name"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_new_project_requires_layout() {
        let payload = NewProject {
            name: "No layout".to_string(),
            description: None,
            layout_config: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_project_serialization_uses_camel_case() {
        let project = sample_project();
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["name"], "Garage run");
        assert!(json.get("layoutConfig").is_some());
        assert!(json.get("createdAt").is_some());

        let parsed: Project = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, project);
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut project = sample_project();
        let mut layout = project.layout_config;
        layout.sync_offsets.front = 1.2;

        project
            .apply(ProjectPatch {
                layout_config: Some(layout),
                ..ProjectPatch::default()
            })
            .unwrap();

        assert_eq!(project.name, "Garage run");
        assert_eq!(project.description.as_deref(), Some("Morning commute"));
        assert_eq!(project.layout_config.sync_offsets.front, 1.2);
    }

    #[test]
    fn test_invalid_patch_leaves_project_untouched() {
        let mut project = sample_project();
        let before = project.clone();
        let err = project.apply(ProjectPatch {
            name: Some(String::new()),
            layout_config: Some(LayoutConfig {
                sync_offsets: crate::camera::SyncOffsets {
                    front: 3.0,
                    ..Default::default()
                },
                ..LayoutConfig::standard()
            }),
            ..ProjectPatch::default()
        });
        assert!(err.is_err());
        assert_eq!(project, before);
    }

    #[test]
    fn test_project_error_maps_to_validation() {
        let err: QuadcamError = ProjectError::validation("name", "Name is required").into();
        assert!(err.is_validation());
    }

    #[test]
    fn test_patch_deserializes_partial_body() {
        let patch: ProjectPatch = serde_json::from_str(r#"{"name":"Renamed"}"#).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Renamed"));
        assert!(patch.layout_config.is_none());
        assert!(!patch.is_empty());
    }
}
