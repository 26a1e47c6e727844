use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::model::errors::{PfErrKind, PfResult};
use crate::model::filename::{sanitize_component, NameComponents};
use crate::model::image::ImageObject;
use crate::Pf;

pub enum ExportStatus {
    CalculatedTotal(usize),
    StartingItem(String),
    FinishedItem(PathBuf),
    FailedItem(String),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub exported: usize,
    pub failed: usize,
}

impl Pf {
    /// Downloads `images` into `dest`, recreating each image's folder path beneath it. Images are
    /// fetched and written one at a time. An image that fails is logged, reported as
    /// [ExportStatus::FailedItem] and counted; the rest of the batch carries on.
    #[instrument(
        level = "debug",
        skip(self, images, update_status),
        fields(count = images.len()),
        err(Debug)
    )]
    pub async fn export_images<F: Fn(ExportStatus)>(
        &self, images: &[ImageObject], dest: &Path, update_status: &Option<F>,
    ) -> PfResult<ExportSummary> {
        if fs::metadata(dest).await.is_ok_and(|meta| meta.is_file()) {
            return Err(PfErrKind::DiskPathInvalid.into());
        }

        if let Some(update_status) = update_status {
            update_status(ExportStatus::CalculatedTotal(images.len()));
        }

        let mut taken = HashMap::new();
        let mut summary = ExportSummary::default();
        for image in images {
            if let Some(update_status) = update_status {
                update_status(ExportStatus::StartingItem(image.name.clone()));
            }
            match self.export_image(image, dest, &mut taken).await {
                Ok(path) => {
                    summary.exported += 1;
                    if let Some(update_status) = update_status {
                        update_status(ExportStatus::FinishedItem(path));
                    }
                }
                Err(err) => {
                    error!(id = %image.id, name = %image.name, %err, "image not exported");
                    summary.failed += 1;
                    if let Some(update_status) = update_status {
                        update_status(ExportStatus::FailedItem(image.name.clone()));
                    }
                }
            }
        }

        info!(exported = summary.exported, failed = summary.failed, "export finished");
        Ok(summary)
    }

    async fn export_image(
        &self, image: &ImageObject, dest: &Path, taken: &mut HashMap<PathBuf, HashSet<String>>,
    ) -> PfResult<PathBuf> {
        let dir = image
            .folder_path_list
            .iter()
            .fold(dest.to_path_buf(), |dir, name| dir.join(sanitize_component(name)));

        let content = self.store.fetch_image(image).await?;

        fs::create_dir_all(&dir).await?;
        let names = match taken.entry(dir.clone()) {
            Entry::Occupied(names) => names.into_mut(),
            Entry::Vacant(names) => names.insert(names_in(&dir).await?),
        };
        let wanted = NameComponents::from(&sanitize_component(&image.name));
        loop {
            let name = wanted.next_available(names).to_name();
            let path = dir.join(&name);
            names.insert(name);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => {
                    write_new(file, &path, &content).await?;
                    return Ok(path);
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "name taken since the folder was listed");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Fills a file just created at `path`. A file that could not be written whole is removed.
async fn write_new(mut file: File, path: &Path, content: &[u8]) -> PfResult<()> {
    let written: std::io::Result<()> = async {
        file.write_all(content).await?;
        file.flush().await
    }
    .await;
    if let Err(err) = written {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path).await {
            warn!(path = %path.display(), %cleanup, "partial export left behind");
        }
        return Err(err.into());
    }
    Ok(())
}

async fn names_in(dir: &Path) -> PfResult<HashSet<String>> {
    let mut names = HashSet::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            names.insert(name.to_string());
        }
    }
    Ok(names)
}
