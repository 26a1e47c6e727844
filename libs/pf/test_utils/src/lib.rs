pub mod assert;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use pf_rs::io::DriveStore;
use pf_rs::model::compression_service;
use pf_rs::model::core_config::{DEFAULT_ITEMS_PER_PAGE, DEFAULT_THUMBNAIL_WIDTH};
use pf_rs::model::drive_node::DriveNode;
use pf_rs::model::image::ImageObject;
use pf_rs::model::project::{Project, RootGrant};
use pf_rs::{Config, Pf, PfErrKind, PfResult};
use rand::Rng;
use uuid::Uuid;

pub fn test_config() -> Config {
    Config {
        writeable_path: format!("/tmp/{}", Uuid::new_v4()),
        logs: false,
        stdout_logs: false,
        colored_logs: false,
        items_per_page: DEFAULT_ITEMS_PER_PAGE,
        thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
        fetch_retries: 0,
    }
}

pub async fn test_pf(project: Project, store: Arc<MemoryStore>) -> Pf {
    Pf::init(test_config(), project, store).await.unwrap()
}

pub fn random_name() -> String {
    Uuid::new_v4()
        .to_string()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

pub fn image(id: &str) -> ImageObject {
    ImageObject::new(id, format!("{id}.jpg"))
}

pub fn images(ids: &[&str]) -> Vec<ImageObject> {
    ids.iter().map(|id| image(id)).collect()
}

pub fn blob_path(root_id: &str) -> String {
    format!("drive/{root_id}.json.z")
}

pub fn grant(root_id: &str, name: &str) -> RootGrant {
    RootGrant {
        file_path: blob_path(root_id),
        sync_time: Some(1_700_000_000_000),
        files_count: 0,
        name: Some(name.to_string()),
    }
}

/// A project granting each of `roots`, with every root's tree stored in `store`.
pub fn project_with(store: &MemoryStore, roots: &[&DriveNode]) -> Project {
    let mut project = Project { id: random_name(), ..Default::default() };
    for root in roots {
        store.insert_tree(&blob_path(&root.id), root);
        project
            .roots
            .insert(root.id.clone(), grant(&root.id, &root.name));
    }
    project
}

/// `wedding` with `ceremony` (two images) and `reception` (one image, one nested folder).
pub fn wedding_tree() -> DriveNode {
    DriveNode::new("wedding", "Wedding")
        .with_files(vec![])
        .with_folder(
            DriveNode::new("ceremony", "Ceremony").with_files(images(&["c1", "c2"])),
        )
        .with_folder(
            DriveNode::new("reception", "Reception")
                .with_files(images(&["r1"]))
                .with_folder(DriveNode::new("dances", "Dances").with_files(images(&["d1"]))),
        )
}

/// A tree of random depth and breadth with random ids. Some folders have no files listed.
pub fn random_tree<R: Rng>(rng: &mut R, depth: usize) -> DriveNode {
    let id = random_name();
    let mut node = DriveNode::new(id.clone(), format!("folder {}", &id[..6]));
    if rng.gen_bool(0.8) {
        let count = rng.gen_range(0..4);
        node = node.with_files((0..count).map(|i| image(&format!("{id}-{i}"))).collect());
    }
    if depth > 0 {
        for _ in 0..rng.gen_range(0..4) {
            node.insert_folder(random_tree(rng, depth - 1));
        }
    }
    node
}

/// In-process drive storage that counts fetches, with optional latency and injectable failures.
#[derive(Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    images: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<String>>,
    delay: Option<Duration>,
    blob_fetches: AtomicUsize,
    image_fetches: AtomicUsize,
}

impl MemoryStore {
    pub fn with_delay(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Default::default() }
    }

    pub fn insert_tree(&self, file_path: &str, tree: &DriveNode) {
        let blob = compression_service::compress_json(tree).unwrap();
        self.insert_blob(file_path, blob);
    }

    pub fn insert_blob(&self, file_path: &str, blob: Vec<u8>) {
        self.blobs
            .lock()
            .unwrap()
            .insert(file_path.to_string(), blob);
    }

    pub fn insert_image(&self, id: &str, content: &[u8]) {
        self.images
            .lock()
            .unwrap()
            .insert(id.to_string(), content.to_vec());
    }

    /// Fetches of this blob path or image id fail until [MemoryStore::heal] is called.
    pub fn fail(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    pub fn heal(&self, key: &str) {
        self.failing.lock().unwrap().remove(key);
    }

    pub fn blob_fetches(&self) -> usize {
        self.blob_fetches.load(Ordering::SeqCst)
    }

    pub fn image_fetches(&self) -> usize {
        self.image_fetches.load(Ordering::SeqCst)
    }

    async fn lookup(
        &self, key: &str, from: &Mutex<HashMap<String, Vec<u8>>>,
    ) -> PfResult<Vec<u8>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(key) {
            return Err(PfErrKind::FetchFailed(format!("{key} is unreachable")).into());
        }
        let found = from.lock().unwrap().get(key).cloned();
        found.ok_or_else(|| PfErrKind::FetchFailed(format!("nothing stored at {key}")).into())
    }
}

impl DriveStore for MemoryStore {
    fn fetch_blob<'a>(&'a self, file_path: &'a str) -> BoxFuture<'a, PfResult<Vec<u8>>> {
        self.blob_fetches.fetch_add(1, Ordering::SeqCst);
        self.lookup(file_path, &self.blobs).boxed()
    }

    fn fetch_image<'a>(&'a self, image: &'a ImageObject) -> BoxFuture<'a, PfResult<Vec<u8>>> {
        self.image_fetches.fetch_add(1, Ordering::SeqCst);
        self.lookup(&image.id, &self.images).boxed()
    }
}
