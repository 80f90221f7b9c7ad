//! Pose and offset editing for saved projects.

use quadcam_common::config::AppConfig;
use quadcam_playback_core::LayoutState;
use quadcam_project_model::{Axis, CameraView, PoseField, ProjectId, ProjectPatch};
use quadcam_project_store::ProjectStore;

use super::open_store;

/// Parse `scale`, `position.x`, `rotation.z`, ...
pub(crate) fn parse_pose_field(raw: &str) -> anyhow::Result<PoseField> {
    let raw = raw.trim().to_ascii_lowercase();
    if raw == "scale" {
        return Ok(PoseField::Scale);
    }
    let (kind, axis) = raw
        .split_once('.')
        .ok_or_else(|| anyhow::anyhow!("Unknown pose field '{raw}'"))?;
    let axis = match axis {
        "x" => Axis::X,
        "y" => Axis::Y,
        "z" => Axis::Z,
        _ => anyhow::bail!("Unknown axis '{axis}' (expected x, y or z)"),
    };
    match kind {
        "position" | "pos" => Ok(PoseField::Position(axis)),
        "rotation" | "rot" => Ok(PoseField::Rotation(axis)),
        _ => anyhow::bail!("Unknown pose field '{raw}'"),
    }
}

pub async fn show(config: &AppConfig, id: ProjectId) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let project = store.get(id).await?;
    let layout = &project.layout_config;

    println!("Project {}: {}", project.id, project.name);
    for view in CameraView::ALL {
        let pose = layout.pose(view);
        let [rx, ry, rz] = pose.rotation_degrees();
        let [px, py, pz] = pose.position;
        println!(
            "  {:<5}  scale {:>5.2}  pos ({px:>6.2}, {py:>6.2}, {pz:>6.2})  rot ({rx:>4}°, {ry:>4}°, {rz:>4}°)  offset {:+.2}s",
            view.as_str(),
            pose.scale,
            layout.sync_offsets.get(view),
        );
    }
    Ok(())
}

pub async fn set_pose(
    config: &AppConfig,
    id: ProjectId,
    view: CameraView,
    field: &str,
    value: f64,
    degrees: bool,
) -> anyhow::Result<()> {
    let field = parse_pose_field(field)?;
    let value = match field {
        PoseField::Rotation(_) if degrees => value.to_radians(),
        _ => value,
    };

    let store = open_store(config).await?;
    let project = store.get(id).await?;
    let mut state = LayoutState::new(project.layout_config);
    if !state.set_pose(view, field, value) {
        anyhow::bail!("Pose values must be finite numbers");
    }
    save(&store, id, &state).await?;
    println!("Updated {view} {field:?} on project {id}");
    Ok(())
}

pub async fn set_offset(
    config: &AppConfig,
    id: ProjectId,
    view: CameraView,
    secs: f64,
) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let project = store.get(id).await?;
    let mut state = LayoutState::new(project.layout_config);
    if !state.set_offset(view, secs) {
        anyhow::bail!("Offsets must be finite numbers");
    }
    save(&store, id, &state).await?;
    println!("Set {view} offset to {secs:+.3}s on project {id}");
    Ok(())
}

async fn save(store: &dyn ProjectStore, id: ProjectId, state: &LayoutState) -> anyhow::Result<()> {
    if !state.is_dirty() {
        return Ok(());
    }
    let patch = ProjectPatch {
        layout_config: Some(state.to_config()),
        ..ProjectPatch::default()
    };
    store.update(id, patch).await?;
    Ok(())
}
