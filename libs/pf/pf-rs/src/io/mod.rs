//! Collaborators outside the process: wherever synced tree blobs and image bytes are kept.

pub mod disk;
pub mod network;

use futures::future::BoxFuture;

use crate::model::compression_service;
use crate::model::drive_node::DriveNode;
use crate::model::errors::PfResult;
use crate::model::image::ImageObject;

pub trait DriveStore: Send + Sync {
    /// Raw (still compressed) bytes of the tree blob at `file_path`.
    fn fetch_blob<'a>(&'a self, file_path: &'a str) -> BoxFuture<'a, PfResult<Vec<u8>>>;

    /// Full bytes of one image, used by local export.
    fn fetch_image<'a>(&'a self, image: &'a ImageObject) -> BoxFuture<'a, PfResult<Vec<u8>>>;
}

/// Downloads, inflates and parses the synced subtree stored at `file_path`.
#[instrument(level = "debug", skip(store), err(Debug))]
pub async fn fetch_tree(store: &dyn DriveStore, file_path: &str) -> PfResult<DriveNode> {
    let blob = store.fetch_blob(file_path).await?;
    trace!("fetched\t{} {} bytes", file_path, blob.len());
    compression_service::decompress_json(&blob)
}
