use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::drive_node::DriveNode;

/// Where the synced subtree of one root folder lives in object storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootGrant {
    pub file_path: String,
    #[serde(default)]
    pub sync_time: Option<i64>,
    #[serde(default)]
    pub files_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: String,
    /// Root folder id to the blob holding that root's subtree.
    #[serde(default)]
    pub roots: HashMap<String, RootGrant>,
    /// A partial tree already resident with the project record. Consulted before the network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_data: Option<DriveNode>,
}

impl Project {
    pub fn grant(&self, root_id: &str) -> Option<&RootGrant> {
        self.roots.get(root_id)
    }

    pub fn is_root(&self, folder_id: &str) -> bool {
        self.roots.contains_key(folder_id)
    }

    /// Granted root ids, sorted so listings are stable across reloads.
    pub fn root_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.roots.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Which folders a viewer may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inclusion {
    /// The whole tree.
    Unrestricted,
    /// Only these folders and everything beneath them. Empty means nothing.
    Explicit(HashSet<String>),
}

impl Inclusion {
    pub fn explicit<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Inclusion::Explicit(ids.into_iter().map(Into::into).collect())
    }

    pub fn includes(&self, folder_id: &str) -> bool {
        match self {
            Inclusion::Unrestricted => true,
            Inclusion::Explicit(ids) => ids.contains(folder_id),
        }
    }
}

/// A shareable url the photographer handed to a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedLink {
    pub id: String,
    /// `None` grants every folder of the project; `Some(vec![])` grants none.
    #[serde(default)]
    pub included_folders: Option<Vec<String>>,
}

impl SharedLink {
    pub fn inclusion(&self) -> Inclusion {
        match &self.included_folders {
            None => Inclusion::Unrestricted,
            Some(ids) => Inclusion::explicit(ids.iter().cloned()),
        }
    }
}
