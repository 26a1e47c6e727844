use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::image::ImageObject;

/// One folder of a synced drive tree.
///
/// Children are keyed by id. The JSON written by the ingestion pipeline keys
/// them by name instead, so sibling folders that share a name would collide
/// in a plain map. Decoding goes through [WireNode], which keeps every entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveNode {
    pub id: String,
    pub name: String,
    pub folders: IndexMap<String, DriveNode>,
    /// `None` until the folder's files have been fetched. `Some(vec![])` is a
    /// resolved, empty folder.
    pub files: Option<Vec<ImageObject>>,
}

impl DriveNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), folders: IndexMap::new(), files: None }
    }

    pub fn with_folder(mut self, child: DriveNode) -> Self {
        self.insert_folder(child);
        self
    }

    pub fn with_files(mut self, files: Vec<ImageObject>) -> Self {
        self.files = Some(files);
        self
    }

    /// Attaches a child, replacing any previous child with the same id in place.
    pub fn insert_folder(&mut self, child: DriveNode) -> Option<DriveNode> {
        self.folders.insert(child.id.clone(), child)
    }

    pub fn children(&self) -> impl Iterator<Item = &DriveNode> {
        self.folders.values()
    }

    pub fn is_resolved(&self) -> bool {
        self.files.is_some()
    }

    /// Images directly inside this folder, empty while unresolved.
    pub fn images(&self) -> &[ImageObject] {
        self.files.as_deref().unwrap_or_default()
    }

    pub fn files_count(&self) -> usize {
        self.images().len()
    }

    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

#[derive(Deserialize)]
struct WireNode {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "named_entries")]
    folders: Vec<(String, WireNode)>,
    #[serde(default)]
    files: Option<Vec<ImageObject>>,
}

impl WireNode {
    fn into_node(self, key: Option<String>) -> DriveNode {
        let name = self.name.or(key).unwrap_or_default();
        let mut node = DriveNode::new(self.id, name);
        node.files = self.files;
        for (key, child) in self.folders {
            let child = child.into_node(Some(key));
            let id = child.id.clone();
            if node.insert_folder(child).is_some() {
                warn!(
                    parent = %node.id,
                    child = %id,
                    "duplicate folder id in synced tree, kept the last"
                );
            }
        }
        node
    }
}

/// Reads a JSON object as its ordered list of entries, so repeated keys survive.
fn named_entries<'de, D>(deserializer: D) -> Result<Vec<(String, WireNode)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Entries;

    impl<'de> Visitor<'de> for Entries {
        type Value = Vec<(String, WireNode)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of folder name to folder")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or_default());
            while let Some(entry) = map.next_entry::<String, WireNode>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(Entries)
}

impl<'de> Deserialize<'de> for DriveNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        WireNode::deserialize(deserializer).map(|wire| wire.into_node(None))
    }
}

impl Serialize for DriveNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.files.is_some() { 4 } else { 3 };
        let mut state = serializer.serialize_struct("DriveNode", len)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("folders", &NamedFolders(&self.folders))?;
        if let Some(files) = &self.files {
            state.serialize_field("files", files)?;
        }
        state.end()
    }
}

/// Writes children back in the name-keyed form. A name already used by an earlier
/// sibling is suffixed with the child id.
struct NamedFolders<'a>(&'a IndexMap<String, DriveNode>);

impl Serialize for NamedFolders<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut used = HashSet::with_capacity(self.0.len());
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for child in self.0.values() {
            let key = if used.contains(child.name.as_str()) {
                format!("{} ({})", child.name, child.id)
            } else {
                child.name.clone()
            };
            used.insert(key.clone());
            map.serialize_entry(&key, child)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::DriveNode;

    #[test]
    fn sibling_name_collision_keeps_both() {
        let json = r#"{
            "id": "root",
            "folders": {
                "Ceremony": { "id": "a", "folders": {} },
                "Ceremony": { "id": "b", "folders": {} }
            }
        }"#;
        let node = DriveNode::from_json(json.as_bytes()).unwrap();

        assert_eq!(node.folders.len(), 2);
        assert_eq!(node.folders["a"].name, "Ceremony");
        assert_eq!(node.folders["b"].name, "Ceremony");
        assert_eq!(node.name, "");
    }

    #[test]
    fn explicit_name_wins_over_key() {
        let json = r#"{"id":"r","name":"Root","folders":{"k":{"id":"c","name":"Child"}}}"#;
        let node = DriveNode::from_json(json.as_bytes()).unwrap();

        assert_eq!(node.name, "Root");
        assert_eq!(node.folders["c"].name, "Child");
    }

    #[test]
    fn missing_and_empty_files_differ() {
        let json = r#"{"id":"r","folders":{"a":{"id":"a","files":[]},"b":{"id":"b"}}}"#;
        let node = DriveNode::from_json(json.as_bytes()).unwrap();

        assert!(node.folders["a"].is_resolved());
        assert!(!node.folders["b"].is_resolved());
        assert!(!node.is_resolved());

        let again = DriveNode::from_json(&node.to_json().unwrap()).unwrap();
        assert_eq!(again, node);
    }

    #[test]
    fn encoding_colliding_names_is_lossless() {
        let node = DriveNode::new("r", "Root")
            .with_folder(DriveNode::new("a", "Same"))
            .with_folder(DriveNode::new("b", "Same"));

        let json: serde_json::Value = serde_json::from_slice(&node.to_json().unwrap()).unwrap();
        let keys: Vec<&String> = json["folders"].as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&&"Same (b)".to_string()));

        let again = DriveNode::from_json(&node.to_json().unwrap()).unwrap();
        assert_eq!(again.folders["b"].name, "Same");
    }
}
