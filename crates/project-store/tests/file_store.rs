use std::path::PathBuf;

use quadcam_project_model::{CameraView, LayoutConfig, NewProject, ProjectPatch};
use quadcam_project_store::{seed_if_empty, JsonFileStore, ProjectStore};

fn temp_store_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("quadcam_store_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir.join("projects.json")
}

#[tokio::test]
async fn test_projects_survive_reopen() {
    let path = temp_store_path("reopen");

    let created = {
        let store = JsonFileStore::open(&path).await.unwrap();
        let mut layout = LayoutConfig::standard();
        layout.sync_offsets.set(CameraView::Back, -0.7);
        layout.left.rotation = [0.0, -1.2, 0.0];
        store
            .create(NewProject::new("Highway", layout).with_description("I-5 north"))
            .await
            .unwrap()
    };

    let reopened = JsonFileStore::open(&path).await.unwrap();
    let loaded = reopened.get(created.id).await.unwrap();
    assert_eq!(loaded, created);

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[tokio::test]
async fn test_update_changes_only_given_fields_and_persists() {
    let path = temp_store_path("update");
    let store = JsonFileStore::open(&path).await.unwrap();
    let created = store
        .create(NewProject::new("City", LayoutConfig::standard()))
        .await
        .unwrap();

    let mut layout = created.layout_config;
    layout.front.scale = 2.5;
    store
        .update(
            created.id,
            ProjectPatch {
                layout_config: Some(layout),
                ..ProjectPatch::default()
            },
        )
        .await
        .unwrap();

    let reopened = JsonFileStore::open(&path).await.unwrap();
    let loaded = reopened.get(created.id).await.unwrap();
    assert_eq!(loaded.name, "City");
    assert_eq!(loaded.layout_config.front.scale, 2.5);
    assert_eq!(loaded.created_at, created.created_at);

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[tokio::test]
async fn test_rejected_update_does_not_touch_disk() {
    let path = temp_store_path("reject");
    let store = JsonFileStore::open(&path).await.unwrap();
    let created = store
        .create(NewProject::new("Keep", LayoutConfig::standard()))
        .await
        .unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let err = store
        .update(
            created.id,
            ProjectPatch {
                name: Some("  ".to_string()),
                ..ProjectPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    assert_eq!(store.get(created.id).await.unwrap().name, "Keep");

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let path = temp_store_path("delete");
    let store = JsonFileStore::open(&path).await.unwrap();
    let created = store
        .create(NewProject::new("Gone", LayoutConfig::standard()))
        .await
        .unwrap();
    store.delete(created.id).await.unwrap();
    assert!(store.get(created.id).await.unwrap_err().is_not_found());

    let reopened = JsonFileStore::open(&path).await.unwrap();
    assert!(reopened.list().await.unwrap().is_empty());

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[tokio::test]
async fn test_seeding_only_happens_once() {
    let path = temp_store_path("seed");
    let store = JsonFileStore::open(&path).await.unwrap();

    let seeded = seed_if_empty(&store).await.unwrap().unwrap();
    assert_eq!(seeded.name, "Default Configuration");
    assert_eq!(seeded.layout_config, LayoutConfig::standard());
    assert!(seed_if_empty(&store).await.unwrap().is_none());
    assert_eq!(store.list().await.unwrap().len(), 1);

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}
