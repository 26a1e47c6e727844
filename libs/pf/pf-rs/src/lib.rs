//! The library underneath the proofing viewer: it resolves which synced drive
//! tree a folder belongs to, keeps those trees cached for the session, and
//! projects folders into pages of images.
//!
//! - Most integrators will want the functions attached to the [Pf] struct. See the [service]
//!   module for evolving this functionality.
//! - The [model] module contains the data structures and the pure tree algorithms (locating a
//!   folder, finding the roots a shared link grants, pagination, breadcrumbs).
//! - The [io] module contains interactions with drive storage, on disk or over http.

#[macro_use]
extern crate tracing;

pub mod io;
pub mod model;
pub mod service;

/// The resolution context for one project's browsing session. Cheap to clone; every clone shares
/// the same cache.
#[derive(Clone)]
pub struct Pf {
    pub config: Config,
    pub project: Arc<Project>,
    pub store: Arc<dyn DriveStore>,
    pub cache: TreeCache,
    pub roots: RootResolver,
    pub albums: AlbumRepo,
    pub events: EventSubs,
}

impl Pf {
    #[instrument(level = "info", skip_all, fields(project = %project.id), err(Debug))]
    pub async fn init(
        config: Config, project: Project, store: Arc<dyn DriveStore>,
    ) -> PfResult<Self> {
        logging::init(&config)?;

        let albums = AlbumRepo::from(&config);
        let cache = TreeCache::default();
        let roots = RootResolver::default();
        let events = EventSubs::default();
        let project = Arc::new(project);

        info!(roots = project.roots.len(), resident = project.drive_data.is_some(), "pf ready");

        Ok(Self { config, project, store, cache, roots, albums, events })
    }
}

use io::DriveStore;
pub use model::core_config::Config;
pub use model::errors::{PfErr, PfErrKind, PfResult};
use model::project::Project;
use service::albums::AlbumRepo;
use service::cache::TreeCache;
use service::events::EventSubs;
use service::logging;
use service::roots::RootResolver;
use std::sync::Arc;
