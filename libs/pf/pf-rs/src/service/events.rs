pub use tokio::sync::broadcast::{self, Receiver, Sender};
use tracing::*;

use crate::Pf;

#[derive(Clone)]
pub struct EventSubs {
    tx: Sender<Event>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The subtree of this root was fetched and is now served from memory.
    RootCached(String),

    /// Fetching the subtree of this root failed; views under it show as empty.
    FetchFailed(String),

    /// A folder (or the top level, `None`) was projected into a view.
    FolderOpened(Option<String>),

    /// The albums saved for this shared link changed.
    AlbumsChanged(String),
}

impl Default for EventSubs {
    fn default() -> Self {
        let (tx, _) = broadcast::channel::<Event>(1000);
        Self { tx }
    }
}

impl EventSubs {
    pub(crate) fn root_cached(&self, root_id: &str) {
        self.queue(Event::RootCached(root_id.to_string()));
    }

    pub(crate) fn fetch_failed(&self, root_id: &str) {
        self.queue(Event::FetchFailed(root_id.to_string()));
    }

    pub(crate) fn folder_opened(&self, folder_id: Option<&str>) {
        self.queue(Event::FolderOpened(folder_id.map(str::to_string)));
    }

    pub(crate) fn albums_changed(&self, link_id: &str) {
        self.queue(Event::AlbumsChanged(link_id.to_string()));
    }

    fn queue(&self, evt: Event) {
        // no receivers is the common case for headless callers
        if self.tx.receiver_count() == 0 {
            return;
        }
        if let Err(e) = self.tx.send(evt.clone()) {
            error!(?evt, ?e, "could not queue");
        }
    }
}

impl Pf {
    pub fn subscribe(&self) -> Receiver<Event> {
        self.events.tx.subscribe()
    }
}
