use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use futures::future::join_all;

use crate::io;
use crate::model::drive_node::DriveNode;
use crate::model::errors::{PfErr, PfErrKind, PfResult};
use crate::model::tree_like::TreeLike;
use crate::Pf;

/// Maps every folder id seen in a fetched subtree to the root id that subtree was synced under.
/// Derived from the cached trees and never persisted.
#[derive(Clone, Default)]
pub struct RootResolver {
    owners: Arc<RwLock<HashMap<String, String>>>,
}

impl RootResolver {
    pub fn resolve(&self, folder_id: &str) -> PfResult<Option<String>> {
        Ok(self.owners.read()?.get(folder_id).cloned())
    }

    pub fn register(
        &self, folder_id: impl Into<String>, root_id: impl Into<String>,
    ) -> PfResult<()> {
        self.owners.write()?.insert(folder_id.into(), root_id.into());
        Ok(())
    }

    /// Registers `root_id` and every folder beneath `tree` against `root_id`. Returns how many ids
    /// were registered.
    pub fn register_tree(&self, root_id: &str, tree: &DriveNode) -> PfResult<usize> {
        let ids = tree.ids();
        let mut owners = self.owners.write()?;
        owners.insert(root_id.to_string(), root_id.to_string());
        for id in &ids {
            owners.insert(id.to_string(), root_id.to_string());
        }
        Ok(ids.len())
    }

    pub fn len(&self) -> PfResult<usize> {
        Ok(self.owners.read()?.len())
    }

    pub fn is_empty(&self) -> PfResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Pf {
    /// The root whose synced subtree holds `folder_id`. Before that subtree has been fetched the
    /// only folders that resolve are the project's granted roots, which own themselves.
    pub fn owning_root(&self, folder_id: &str) -> PfResult<String> {
        if let Some(root_id) = self.roots.resolve(folder_id)? {
            return Ok(root_id);
        }
        if self.project.is_root(folder_id) {
            return Ok(folder_id.to_string());
        }
        Err(PfErrKind::RootNonexistent.into())
    }

    /// Like [Pf::owning_root], but a folder that does not resolve yet is looked up again after
    /// every granted root has been loaded, so a deep link works on a fresh session.
    pub async fn resolve_root(&self, folder_id: &str) -> PfResult<String> {
        match self.owning_root(folder_id) {
            Err(err) if err.kind == PfErrKind::RootNonexistent => {}
            resolved => return resolved,
        }
        let loaded = self.load_roots().await?;
        trace!(folder_id, loaded = loaded.len(), "roots loaded to resolve folder");
        self.owning_root(folder_id)
    }

    /// Every granted root's subtree, in [Project::root_ids] order. Roots whose tree cannot be
    /// fetched are logged and left out.
    ///
    /// [Project::root_ids]: crate::model::project::Project::root_ids
    pub async fn load_roots(&self) -> PfResult<Vec<Arc<DriveNode>>> {
        let root_ids = self.project.root_ids();
        let trees = join_all(root_ids.iter().map(|root_id| self.load_root(root_id))).await;

        let mut loaded = vec![];
        for (root_id, tree) in root_ids.iter().zip(trees) {
            match tree {
                Ok(tree) => loaded.push(tree),
                Err(err) if err.is_recoverable() => error!(root_id, %err, "root skipped"),
                Err(err) => return Err(err),
            }
        }
        Ok(loaded)
    }

    /// The subtree synced under `root_id`, from memory or, on the first request, from drive
    /// storage. Overlapping requests for the same root share one fetch.
    #[instrument(level = "debug", skip(self), err(Debug))]
    pub async fn load_root(&self, root_id: &str) -> PfResult<Arc<DriveNode>> {
        let grant = self
            .project
            .grant(root_id)
            .ok_or(PfErrKind::RootNonexistent)?;

        let result = self
            .cache
            .get_or_fetch(root_id, || async {
                let tree = io::fetch_tree(self.store.as_ref(), &grant.file_path).await?;
                let registered = self.roots.register_tree(root_id, &tree)?;
                debug!(root_id, registered, "root cached");
                self.events.root_cached(root_id);
                Ok::<_, PfErr>(tree)
            })
            .await;

        if let Err(err) = &result {
            if err.is_recoverable() {
                self.events.fetch_failed(root_id);
            }
        }
        result
    }
}
