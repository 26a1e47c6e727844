use crate::model::breadcrumbs::Crumb;
use crate::model::drive_node::DriveNode;
use crate::model::errors::{PfErrKind, PfResult};
use crate::model::image::ImageObject;
use crate::model::project::SharedLink;
use crate::model::tree_like::{find_shared_roots, is_visible, TreeLike};
use crate::Pf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSummary {
    pub id: String,
    pub name: String,
    pub files_count: usize,
}

impl From<&DriveNode> for FolderSummary {
    fn from(node: &DriveNode) -> Self {
        Self { id: node.id.clone(), name: node.name.clone(), files_count: node.files_count() }
    }
}

/// What the grid shows for one folder: its subfolders and the images directly inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderView {
    /// `None` for the top level.
    pub folder_id: Option<String>,
    pub name: String,
    pub folders: Vec<FolderSummary>,
    pub images: Vec<ImageObject>,
    /// False while the folder's files have not been fetched yet.
    pub files_resolved: bool,
}

impl FolderView {
    pub fn empty(folder_id: Option<&str>) -> Self {
        Self { folder_id: folder_id.map(str::to_string), ..Default::default() }
    }

    pub fn of(node: &DriveNode, thumbnail_width: u32) -> Self {
        Self {
            folder_id: Some(node.id.clone()),
            name: node.name.clone(),
            folders: node.children().map(FolderSummary::from).collect(),
            images: node
                .images()
                .iter()
                .cloned()
                .map(|image| image.with_derived_src(thumbnail_width))
                .collect(),
            files_resolved: node.is_resolved(),
        }
    }

    fn listing(folders: Vec<FolderSummary>) -> Self {
        Self { folders, files_resolved: true, ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.images.is_empty()
    }
}

impl Pf {
    /// Projects a folder for display. Anything that goes wrong on the way (storage unreachable,
    /// folder not in any synced root, folder missing from its tree) is logged and shown as an
    /// empty folder; see [Pf::try_open_folder] for the error.
    pub async fn open_folder(&self, folder_id: Option<&str>) -> FolderView {
        let view = self.try_open_folder(folder_id).await;
        self.or_empty(folder_id, view)
    }

    #[instrument(level = "debug", skip(self), err(Debug))]
    pub async fn try_open_folder(&self, folder_id: Option<&str>) -> PfResult<FolderView> {
        let view = match folder_id {
            None => self.top_level(),
            Some(id) => {
                let width = self.config.thumbnail_width;
                self.with_folder(id, |node| FolderView::of(node, width))
                    .await?
            }
        };
        self.events.folder_opened(folder_id);
        Ok(view)
    }

    /// Runs `f` on the folder with `id`. Looks in the cached tree of the folder's root first,
    /// then in the tree resident with the project record, and only then goes to drive storage.
    pub async fn with_folder<T>(&self, id: &str, f: impl FnOnce(&DriveNode) -> T) -> PfResult<T> {
        let root_id = self.owning_root(id);

        if let Ok(root_id) = &root_id {
            if let Some(tree) = self.cache.get(root_id)? {
                return Ok(f(tree.find(id)?));
            }
        }

        if let Some(node) = self
            .project
            .drive_data
            .as_ref()
            .and_then(|resident| resident.maybe_find(id))
        {
            trace!(id, "served from resident drive data");
            return Ok(f(node));
        }

        let root_id = match root_id {
            Ok(root_id) => root_id,
            Err(_) => self.resolve_root(id).await?,
        };
        let tree = self.load_root(&root_id).await?;
        Ok(f(tree.find(id)?))
    }

    /// The chain of folders from the folder's root down to it, for deep-linked breadcrumbs.
    pub async fn folder_path(&self, id: &str) -> PfResult<Vec<Crumb>> {
        let tree = self.load_root(&self.resolve_root(id).await?).await?;
        let path = tree.path_to(id).ok_or(PfErrKind::FolderNonexistent)?;
        Ok(path.into_iter().map(Crumb::from).collect())
    }

    fn top_level(&self) -> FolderView {
        let folders = self
            .project
            .root_ids()
            .into_iter()
            .filter_map(|id| {
                let grant = self.project.grant(id)?;
                Some(FolderSummary {
                    id: id.to_string(),
                    name: grant.name.clone().unwrap_or_else(|| id.to_string()),
                    files_count: grant.files_count,
                })
            })
            .collect();
        FolderView::listing(folders)
    }

    /// The subtrees `link` grants, across every root of the project. Roots whose tree cannot be
    /// fetched contribute nothing.
    #[instrument(level = "debug", skip(self, link), fields(link = %link.id), err(Debug))]
    pub async fn shared_roots(&self, link: &SharedLink) -> PfResult<Vec<DriveNode>> {
        let inclusion = link.inclusion();
        let mut shared = vec![];
        for tree in self.load_roots().await? {
            shared.extend(find_shared_roots(&tree, &inclusion).into_iter().cloned());
        }
        Ok(shared)
    }

    pub async fn open_shared_folder(
        &self, link: &SharedLink, folder_id: Option<&str>,
    ) -> FolderView {
        let view = self.try_open_shared_folder(link, folder_id).await;
        self.or_empty(folder_id, view)
    }

    /// Like [Pf::try_open_folder], but only for folders `link` grants: a folder outside the grant
    /// fails as [PfErrKind::RootNonexistent].
    pub async fn try_open_shared_folder(
        &self, link: &SharedLink, folder_id: Option<&str>,
    ) -> PfResult<FolderView> {
        let Some(id) = folder_id else {
            let roots = self.shared_roots(link).await?;
            self.events.folder_opened(None);
            return Ok(FolderView::listing(roots.iter().map(FolderSummary::from).collect()));
        };

        let tree = self.load_root(&self.resolve_root(id).await?).await?;
        if !is_visible(&tree, id, &link.inclusion()) {
            warn!(id, link = %link.id, "folder is not granted to this link");
            return Err(PfErrKind::RootNonexistent.into());
        }
        self.try_open_folder(Some(id)).await
    }

    fn or_empty(&self, folder_id: Option<&str>, view: PfResult<FolderView>) -> FolderView {
        match view {
            Ok(view) => view,
            Err(err) => {
                match &err.kind {
                    PfErrKind::FetchFailed(_) | PfErrKind::BlobCorrupted => {
                        error!(?folder_id, %err, "showing folder as empty")
                    }
                    _ if err.is_recoverable() => {
                        warn!(?folder_id, %err, "showing folder as empty")
                    }
                    _ => error!(?folder_id, ?err, "unexpected failure, showing folder as empty"),
                }
                FolderView::empty(folder_id)
            }
        }
    }
}
