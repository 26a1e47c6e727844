use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::io::disk::write_atomic;
use crate::model::core_config::Config;
use crate::model::errors::{PfErrKind, PfResult};
use crate::model::image::ImageObject;
use crate::Pf;

/// The images a client liked through one shared link, grouped into named albums. Albums and the
/// images inside them keep the order they were liked in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Albums {
    albums: IndexMap<String, IndexSet<String>>,
}

impl Albums {
    /// Returns whether `image_id` was newly added. The album is created on its first like.
    pub fn like(&mut self, album: &str, image_id: &str) -> bool {
        self.albums
            .entry(album.to_string())
            .or_default()
            .insert(image_id.to_string())
    }

    /// Returns whether `image_id` was in the album. An album left empty is kept.
    pub fn unlike(&mut self, album: &str, image_id: &str) -> bool {
        match self.albums.get_mut(album) {
            Some(ids) => ids.shift_remove(image_id),
            None => false,
        }
    }

    /// Returns whether the image is liked afterwards.
    pub fn toggle(&mut self, album: &str, image_id: &str) -> bool {
        if self.unlike(album, image_id) {
            false
        } else {
            self.like(album, image_id)
        }
    }

    pub fn contains(&self, album: &str, image_id: &str) -> bool {
        self.albums
            .get(album)
            .is_some_and(|ids| ids.contains(image_id))
    }

    pub fn names(&self) -> Vec<&str> {
        self.albums.keys().map(String::as_str).collect()
    }

    pub fn image_ids(&self, album: &str) -> Vec<&str> {
        self.albums
            .get(album)
            .map(|ids| ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    /// The images of `images` liked into `album`, in folder order.
    pub fn filter(&self, album: &str, images: &[ImageObject]) -> Vec<ImageObject> {
        let Some(ids) = self.albums.get(album) else {
            return vec![];
        };
        images
            .iter()
            .filter(|image| ids.contains(&image.id))
            .cloned()
            .collect()
    }
}

/// Albums saved per shared link as `<writeable_path>/albums/<link id>.json`.
#[derive(Clone, Debug)]
pub struct AlbumRepo {
    location: PathBuf,
    /// One lock per link, held from load to save of a change.
    writers: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl From<&Config> for AlbumRepo {
    fn from(config: &Config) -> Self {
        Self {
            location: PathBuf::from(&config.writeable_path).join("albums"),
            writers: Default::default(),
        }
    }
}

impl AlbumRepo {
    fn path(&self, link_id: &str) -> PfResult<PathBuf> {
        if link_id.is_empty()
            || link_id.starts_with('.')
            || link_id.contains(|c: char| matches!(c, '/' | '\\'))
        {
            return Err(PfErrKind::DiskPathInvalid.into());
        }
        Ok(self.location.join(format!("{link_id}.json")))
    }

    pub async fn load(&self, link_id: &str) -> PfResult<Albums> {
        let path = self.path(link_id)?;
        match fs::read(&path).await {
            Ok(content) => Ok(serde_json::from_slice(&content)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Albums::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn save(&self, link_id: &str, albums: &Albums) -> PfResult<()> {
        let content = serde_json::to_vec_pretty(albums)?;
        write_atomic(&self.path(link_id)?, &content).await
    }

    /// Loads the link's albums, applies `change` and saves them if it reports a change. Changes to
    /// one link run one at a time.
    pub async fn update(
        &self, link_id: &str, change: impl FnOnce(&mut Albums) -> bool,
    ) -> PfResult<bool> {
        self.path(link_id)?;
        let _writer = self.writer(link_id).await?;
        let mut albums = self.load(link_id).await?;
        let changed = change(&mut albums);
        if changed {
            self.save(link_id, &albums).await?;
        }
        Ok(changed)
    }

    async fn writer(&self, link_id: &str) -> PfResult<OwnedMutexGuard<()>> {
        let lock = self
            .writers
            .lock()?
            .entry(link_id.to_string())
            .or_default()
            .clone();
        Ok(lock.lock_owned().await)
    }
}

impl Pf {
    pub async fn load_albums(&self, link_id: &str) -> PfResult<Albums> {
        self.albums.load(link_id).await
    }

    #[instrument(level = "debug", skip(self), err(Debug))]
    pub async fn like(&self, link_id: &str, album: &str, image_id: &str) -> PfResult<bool> {
        let added = self
            .albums
            .update(link_id, |albums| albums.like(album, image_id))
            .await?;
        if added {
            self.events.albums_changed(link_id);
        }
        Ok(added)
    }

    #[instrument(level = "debug", skip(self), err(Debug))]
    pub async fn unlike(&self, link_id: &str, album: &str, image_id: &str) -> PfResult<bool> {
        let removed = self
            .albums
            .update(link_id, |albums| albums.unlike(album, image_id))
            .await?;
        if removed {
            self.events.albums_changed(link_id);
        }
        Ok(removed)
    }
}
