use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::io::DriveStore;
use crate::model::compression_service;
use crate::model::drive_node::DriveNode;
use crate::model::errors::{PfErrKind, PfResult};
use crate::model::image::ImageObject;

/// A local mirror of drive storage: tree blobs at `<location>/<file_path>`, image bytes at
/// `<location>/images/<image id>`.
#[derive(Clone, Debug)]
pub struct DiskStore {
    location: PathBuf,
}

impl DiskStore {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self { location: location.into() }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    fn blob_path(&self, file_path: &str) -> PfResult<PathBuf> {
        let relative = Path::new(file_path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(PfErrKind::DiskPathInvalid.into());
        }
        Ok(self.location.join(relative))
    }

    fn image_path(&self, id: &str) -> PfResult<PathBuf> {
        self.blob_path(&format!("images/{id}"))
    }

    pub async fn insert_tree(&self, file_path: &str, tree: &DriveNode) -> PfResult<()> {
        let blob = compression_service::compress_json(tree)?;
        write_atomic(&self.blob_path(file_path)?, &blob).await
    }

    pub async fn insert_image(&self, id: &str, content: &[u8]) -> PfResult<()> {
        write_atomic(&self.image_path(id)?, content).await
    }

    async fn read(&self, path: PathBuf) -> PfResult<Vec<u8>> {
        trace!("read\t{}", path.display());
        match fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(PfErrKind::FetchFailed(format!("nothing stored at {}", path.display())).into())
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl DriveStore for DiskStore {
    fn fetch_blob<'a>(&'a self, file_path: &'a str) -> BoxFuture<'a, PfResult<Vec<u8>>> {
        async move { self.read(self.blob_path(file_path)?).await }.boxed()
    }

    fn fetch_image<'a>(&'a self, image: &'a ImageObject) -> BoxFuture<'a, PfResult<Vec<u8>>> {
        async move { self.read(self.image_path(&image.id)?).await }.boxed()
    }
}

static PENDING: AtomicU64 = AtomicU64::new(0);

/// Writes next to `path` first and renames over it, so readers never see half a file. Every
/// write gets its own pending file, so overlapping writes to one path each rename a whole file.
pub(crate) async fn write_atomic(path: &Path, content: &[u8]) -> PfResult<()> {
    let pending = pending_path(path)?;
    trace!("write\t{} {:?} bytes", path.display(), content.len());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let written: std::io::Result<()> = async {
        let mut f = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&pending)
            .await?;
        f.write_all(content).await?;
        f.flush().await?;
        fs::rename(&pending, path).await
    }
    .await;
    if let Err(err) = written {
        if let Err(cleanup) = fs::remove_file(&pending).await {
            if cleanup.kind() != ErrorKind::NotFound {
                warn!(pending = %pending.display(), %cleanup, "pending file left behind");
            }
        }
        return Err(err.into());
    }
    Ok(())
}

fn pending_path(path: &Path) -> PfResult<PathBuf> {
    let name = path.file_name().ok_or(PfErrKind::DiskPathInvalid)?;
    let mut pending = OsString::from(".");
    pending.push(name);
    pending.push(format!(".{}.pending", PENDING.fetch_add(1, Ordering::Relaxed)));
    Ok(path.with_file_name(pending))
}
