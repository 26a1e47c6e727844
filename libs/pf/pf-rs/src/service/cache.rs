use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::OnceCell;

use crate::model::drive_node::DriveNode;
use crate::model::errors::{PfErr, PfResult};

type Flight = Arc<OnceCell<Arc<DriveNode>>>;

/// Session-lifetime store of fetched subtrees, keyed by the root id they were synced under.
///
/// There is no eviction: a session only ever browses one project, whose drive tree is bounded.
/// Fetches go through [TreeCache::get_or_fetch], which lets at most one fetch per root be in
/// flight; concurrent callers for the same root wait on it and share its result.
#[derive(Clone, Default)]
pub struct TreeCache {
    trees: Arc<RwLock<HashMap<String, Arc<DriveNode>>>>,
    in_flight: Arc<Mutex<HashMap<String, Flight>>>,
}

impl TreeCache {
    pub fn get(&self, root_id: &str) -> PfResult<Option<Arc<DriveNode>>> {
        Ok(self.trees.read()?.get(root_id).cloned())
    }

    pub fn put(&self, root_id: impl Into<String>, tree: Arc<DriveNode>) -> PfResult<()> {
        self.trees.write()?.insert(root_id.into(), tree);
        Ok(())
    }

    pub fn len(&self) -> PfResult<usize> {
        Ok(self.trees.read()?.len())
    }

    pub fn is_empty(&self) -> PfResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Number of roots currently being fetched.
    pub fn in_flight(&self) -> PfResult<usize> {
        Ok(self.in_flight.lock()?.len())
    }

    /// Returns the cached tree for `root_id`, running `fetch` on a miss. While a fetch for a root
    /// is pending, later callers join it instead of issuing their own. If it fails, nothing is
    /// cached and the next caller (a waiter included) fetches again.
    pub async fn get_or_fetch<F, Fut>(&self, root_id: &str, fetch: F) -> PfResult<Arc<DriveNode>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PfResult<DriveNode>>,
    {
        if let Some(tree) = self.get(root_id)? {
            return Ok(tree);
        }

        let flight = self
            .in_flight
            .lock()?
            .entry(root_id.to_string())
            .or_default()
            .clone();

        let result = flight
            .get_or_try_init(|| async {
                // a flight for this root may have landed between the miss above and joining
                if let Some(tree) = self.get(root_id)? {
                    return Ok(tree);
                }
                let tree = Arc::new(fetch().await?);
                self.put(root_id, tree.clone())?;
                Ok::<_, PfErr>(tree)
            })
            .await
            .cloned();

        self.land(root_id, &flight)?;
        result
    }

    fn land(&self, root_id: &str, flight: &Flight) -> PfResult<()> {
        let mut in_flight = self.in_flight.lock()?;
        if in_flight
            .get(root_id)
            .is_some_and(|current| Arc::ptr_eq(current, flight))
        {
            in_flight.remove(root_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod unit_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::model::drive_node::DriveNode;
    use crate::model::errors::{PfErr, PfErrKind, PfResult};
    use crate::service::cache::TreeCache;

    async fn slow_fetch(calls: &AtomicUsize) -> PfResult<DriveNode> {
        calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(DriveNode::new("r1", "Root"))
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_fetch() {
        let cache = TreeCache::default();
        let calls = AtomicUsize::new(0);

        let (a, b) = tokio::join!(
            cache.get_or_fetch("r1", || slow_fetch(&calls)),
            cache.get_or_fetch("r1", || slow_fetch(&calls)),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(cache.len().unwrap(), 1);
        assert_eq!(cache.in_flight().unwrap(), 0);
    }

    #[tokio::test]
    async fn hits_do_not_fetch() {
        let cache = TreeCache::default();
        cache.put("r1", Arc::new(DriveNode::new("r1", "Root"))).unwrap();

        let tree = cache
            .get_or_fetch("r1", || async {
                Err(PfErr::from(PfErrKind::FetchFailed("unused".into())))
            })
            .await
            .unwrap();
        assert_eq!(tree.id, "r1");
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = TreeCache::default();

        let err = cache
            .get_or_fetch("r1", || async {
                Err(PfErr::from(PfErrKind::FetchFailed("offline".into())))
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, PfErrKind::FetchFailed("offline".into()));
        assert!(cache.get("r1").unwrap().is_none());
        assert_eq!(cache.in_flight().unwrap(), 0);

        let calls = AtomicUsize::new(0);
        cache.get_or_fetch("r1", || slow_fetch(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
