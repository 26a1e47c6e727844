use std::sync::Arc;
use std::time::Duration;

use pf_rs::model::breadcrumbs::Crumb;
use pf_rs::model::project::Project;
use pf_rs::model::tree_like::TreeLike;
use pf_rs::service::events::Event;
use pf_rs::PfErrKind;
use test_utils::*;

#[tokio::test]
async fn top_level_lists_granted_roots() {
    let store = Arc::new(MemoryStore::default());
    let portraits = pf_rs::model::drive_node::DriveNode::new("portraits", "Portraits");
    let project = project_with(&store, &[&wedding_tree(), &portraits]);
    let pf = test_pf(project, store.clone()).await;

    let view = pf.open_folder(None).await;

    let names: Vec<&str> = view.folders.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Portraits", "Wedding"]);
    assert!(view.images.is_empty());
    assert_eq!(store.blob_fetches(), 0);
}

#[tokio::test]
async fn root_opens_with_children_and_images() {
    let store = Arc::new(MemoryStore::default());
    let project = project_with(&store, &[&wedding_tree()]);
    let pf = test_pf(project, store.clone()).await;

    let view = pf.open_folder(Some("wedding")).await;
    assert_eq!(view.name, "Wedding");
    let children: Vec<(&str, usize)> = view
        .folders
        .iter()
        .map(|f| (f.id.as_str(), f.files_count))
        .collect();
    assert_eq!(children, vec![("ceremony", 2), ("reception", 1)]);

    let view = pf.open_folder(Some("ceremony")).await;
    assert_eq!(view.images.len(), 2);
    assert_eq!(
        view.images[0].src.as_deref(),
        Some("https://drive.google.com/thumbnail?id=c1&sz=w1000")
    );
    assert_eq!(store.blob_fetches(), 1);
}

#[tokio::test]
async fn concurrent_opens_fetch_once() {
    let store = Arc::new(MemoryStore::with_delay(Duration::from_millis(50)));
    let project = project_with(&store, &[&wedding_tree()]);
    let pf = test_pf(project, store.clone()).await;

    let (a, b) = tokio::join!(pf.open_folder(Some("wedding")), pf.open_folder(Some("wedding")));

    assert_eq!(a, b);
    assert_eq!(a.folders.len(), 2);
    assert_eq!(store.blob_fetches(), 1);
    assert_eq!(pf.cache.in_flight().unwrap(), 0);
}

#[tokio::test]
async fn concurrent_opens_below_a_cold_root_fetch_once() {
    let store = Arc::new(MemoryStore::with_delay(Duration::from_millis(50)));
    let project = project_with(&store, &[&wedding_tree()]);
    let pf = test_pf(project, store.clone()).await;

    let (ceremony, dances) =
        tokio::join!(pf.open_folder(Some("ceremony")), pf.open_folder(Some("dances")));

    assert_eq!(ceremony.name, "Ceremony");
    assert_eq!(ceremony.images.len(), 2);
    assert_eq!(dances.name, "Dances");
    assert_eq!(dances.images.len(), 1);
    assert_eq!(store.blob_fetches(), 1);
    assert_eq!(pf.cache.in_flight().unwrap(), 0);
}

#[tokio::test]
async fn deep_link_path_on_a_fresh_session() {
    let store = Arc::new(MemoryStore::default());
    let project = project_with(&store, &[&wedding_tree()]);
    let pf = test_pf(project, store.clone()).await;

    let path = pf.folder_path("dances").await.unwrap();

    assert_eq!(path.len(), 3);
    assert_eq!(store.blob_fetches(), 1);
}

#[tokio::test]
async fn every_descendant_resolves_to_its_root() {
    let store = Arc::new(MemoryStore::default());
    let tree = wedding_tree();
    let project = project_with(&store, &[&tree]);
    let pf = test_pf(project, store.clone()).await;

    assert_matches!(
        pf.owning_root("dances").unwrap_err().kind,
        PfErrKind::RootNonexistent
    );

    pf.load_root("wedding").await.unwrap();

    for id in tree.ids() {
        assert_eq!(pf.owning_root(id).unwrap(), "wedding");
    }
    let dances = pf.open_folder(Some("dances")).await;
    assert_eq!(dances.images.len(), 1);
    assert_eq!(store.blob_fetches(), 1);
}

#[tokio::test]
async fn failed_fetch_shows_empty_and_recovers() {
    let store = Arc::new(MemoryStore::default());
    let project = project_with(&store, &[&wedding_tree()]);
    let pf = test_pf(project, store.clone()).await;
    let mut events = pf.subscribe();

    store.fail(&blob_path("wedding"));
    let view = pf.open_folder(Some("wedding")).await;
    assert!(view.is_empty());
    assert_eq!(view.folder_id.as_deref(), Some("wedding"));
    assert_eq!(events.try_recv().unwrap(), Event::FetchFailed("wedding".into()));
    assert_matches!(
        pf.try_open_folder(Some("wedding")).await.unwrap_err().kind,
        PfErrKind::FetchFailed(_)
    );

    store.heal(&blob_path("wedding"));
    let view = pf.open_folder(Some("wedding")).await;
    assert_eq!(view.folders.len(), 2);
    assert_eq!(store.blob_fetches(), 3);
}

#[tokio::test]
async fn corrupted_blob_shows_empty() {
    let store = Arc::new(MemoryStore::default());
    let project = project_with(&store, &[&wedding_tree()]);
    store.insert_blob(&blob_path("wedding"), b"not a tree".to_vec());
    let pf = test_pf(project, store.clone()).await;

    assert!(pf.open_folder(Some("wedding")).await.is_empty());
    assert_matches!(
        pf.try_open_folder(Some("wedding")).await.unwrap_err().kind,
        PfErrKind::BlobCorrupted
    );
}

#[tokio::test]
async fn resident_drive_data_avoids_the_network() {
    let store = Arc::new(MemoryStore::default());
    let mut project = Project { id: random_name(), ..Default::default() };
    project
        .roots
        .insert("wedding".into(), grant("wedding", "Wedding"));
    project.drive_data = Some(wedding_tree());
    let pf = test_pf(project, store.clone()).await;

    let view = pf.open_folder(Some("reception")).await;

    assert_eq!(view.name, "Reception");
    assert_eq!(view.folders.len(), 1);
    assert_eq!(store.blob_fetches(), 0);
}

#[tokio::test]
async fn unknown_folder_shows_empty() {
    let store = Arc::new(MemoryStore::default());
    let project = project_with(&store, &[&wedding_tree()]);
    let pf = test_pf(project, store.clone()).await;

    assert!(pf.open_folder(Some("elsewhere")).await.is_empty());
    assert_eq!(store.blob_fetches(), 1);
    assert_matches!(
        pf.try_open_folder(Some("elsewhere")).await.unwrap_err().kind,
        PfErrKind::RootNonexistent
    );

    pf.load_root("wedding").await.unwrap();
    assert_matches!(pf.load_root("elsewhere").await.unwrap_err().kind, PfErrKind::RootNonexistent);
    assert_eq!(store.blob_fetches(), 1);
}

#[tokio::test]
async fn events_follow_a_successful_open() {
    let store = Arc::new(MemoryStore::default());
    let project = project_with(&store, &[&wedding_tree()]);
    let pf = test_pf(project, store.clone()).await;
    let mut events = pf.subscribe();

    pf.open_folder(Some("wedding")).await;

    assert_eq!(events.try_recv().unwrap(), Event::RootCached("wedding".into()));
    assert_eq!(events.try_recv().unwrap(), Event::FolderOpened(Some("wedding".into())));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn deep_link_path() {
    let store = Arc::new(MemoryStore::default());
    let project = project_with(&store, &[&wedding_tree()]);
    let pf = test_pf(project, store.clone()).await;
    pf.load_root("wedding").await.unwrap();

    let path = pf.folder_path("dances").await.unwrap();

    assert_eq!(
        path,
        vec![
            Crumb::new("wedding", "Wedding"),
            Crumb::new("reception", "Reception"),
            Crumb::new("dances", "Dances"),
        ]
    );
}
