use crate::model::breadcrumbs::{Breadcrumbs, Crumb};
use crate::model::errors::PfResult;
use crate::model::image::ImageObject;
use crate::model::pagination::{paginate, Page, PageGuard};
use crate::service::albums::Albums;
use crate::service::folder::FolderView;
use crate::Pf;

/// Handed out by [ViewState::navigate]. A folder fetched for an older ticket is not shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// What one viewer is looking at: the folder, the album filter, the page and the breadcrumb trail.
///
/// Navigation is split in two so the fetch can run without holding the state: `navigate` records
/// the destination and returns a [Ticket], the caller opens the folder, and `apply` installs the
/// result unless the viewer has navigated again in the meantime.
#[derive(Debug, Clone)]
pub struct ViewState {
    folder: Option<String>,
    album: Option<String>,
    page: usize,
    breadcrumbs: Breadcrumbs,
    view: FolderView,
    items_per_page: usize,
    generation: u64,
    guard: PageGuard<(Option<String>, Option<String>)>,
}

impl ViewState {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            folder: None,
            album: None,
            page: 1,
            breadcrumbs: Breadcrumbs::default(),
            view: FolderView::default(),
            items_per_page,
            generation: 0,
            guard: PageGuard::new((None, None)),
        }
    }

    /// `None` goes back to the top level.
    pub fn navigate(&mut self, target: Option<Crumb>) -> Ticket {
        self.folder = target.as_ref().map(|crumb| crumb.id.clone());
        self.breadcrumbs.navigate(target);
        self.begin()
    }

    /// Jumps straight to the last folder of `path`, replacing the trail, as a deep link does.
    pub fn navigate_path(&mut self, path: Vec<Crumb>) -> Ticket {
        self.folder = path.last().map(|crumb| crumb.id.clone());
        self.breadcrumbs.reset_to(path);
        self.begin()
    }

    fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.view = FolderView::empty(self.folder.as_deref());
        Ticket(self.generation)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// Returns whether `view` was installed.
    pub fn apply(&mut self, ticket: Ticket, view: FolderView) -> bool {
        if !self.is_current(ticket) {
            debug!(
                stale = ticket.0,
                current = self.generation,
                folder = ?view.folder_id,
                "discarding folder fetched for an earlier navigation"
            );
            return false;
        }
        self.view = view;
        true
    }

    pub fn select_album(&mut self, album: Option<String>) {
        self.album = album;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// The page of images the grid shows now. The first render after the folder or album changed
    /// starts over at page 1.
    pub fn render(&mut self, albums: &Albums) -> PfResult<Page<ImageObject>> {
        if self
            .guard
            .observe(&(self.folder.clone(), self.album.clone()))
        {
            self.page = 1;
        }

        match &self.album {
            Some(album) => {
                let liked = albums.filter(album, &self.view.images);
                paginate(&liked, self.page, self.items_per_page)
            }
            None => paginate(&self.view.images, self.page, self.items_per_page),
        }
    }

    pub fn folder(&self) -> Option<&str> {
        self.folder.as_deref()
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn breadcrumbs(&self) -> &Breadcrumbs {
        &self.breadcrumbs
    }

    pub fn view(&self) -> &FolderView {
        &self.view
    }
}

impl Pf {
    pub fn view_state(&self) -> ViewState {
        ViewState::new(self.config.items_per_page)
    }
}
