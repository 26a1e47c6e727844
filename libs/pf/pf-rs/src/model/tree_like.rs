use crate::model::drive_node::DriveNode;
use crate::model::errors::{PfErrKind, PfResult};
use crate::model::image::ImageObject;
use crate::model::project::Inclusion;

/// Depth-first search for the folder with `id`, children visited in attach order.
pub fn locate<'a>(node: &'a DriveNode, id: &str) -> Option<&'a DriveNode> {
    if node.id == id {
        return Some(node);
    }
    node.children().find_map(|child| locate(child, id))
}

/// The chain of folders from `node` down to the folder with `id`, both ends included.
pub fn path_to<'a>(node: &'a DriveNode, id: &str) -> Option<Vec<&'a DriveNode>> {
    if node.id == id {
        return Some(vec![node]);
    }
    node.children().find_map(|child| {
        path_to(child, id).map(|mut path| {
            path.insert(0, node);
            path
        })
    })
}

/// The smallest set of subtrees covering `inclusion`. An included folder stands
/// for everything beneath it, so the walk stops descending at the first
/// included folder of each branch.
pub fn find_shared_roots<'a>(node: &'a DriveNode, inclusion: &Inclusion) -> Vec<&'a DriveNode> {
    let ids = match inclusion {
        Inclusion::Unrestricted => return vec![node],
        Inclusion::Explicit(ids) if ids.is_empty() => return vec![],
        Inclusion::Explicit(ids) => ids,
    };

    if ids.contains(&node.id) {
        return vec![node];
    }
    node.children()
        .flat_map(|child| find_shared_roots(child, inclusion))
        .collect()
}

/// Whether the folder with `id` is `inclusion`-visible: it or one of its ancestors is included.
/// Folders outside `node` are never visible.
pub fn is_visible(node: &DriveNode, id: &str, inclusion: &Inclusion) -> bool {
    match path_to(node, id) {
        Some(path) => path.iter().any(|folder| inclusion.includes(&folder.id)),
        None => false,
    }
}

pub trait TreeLike {
    /// The top level folders this tree-like is made of.
    fn tops(&self) -> Vec<&DriveNode>;

    fn ids(&self) -> Vec<&str> {
        let mut ids = vec![];
        let mut stack = self.tops();
        stack.reverse();
        while let Some(node) = stack.pop() {
            ids.push(node.id.as_str());
            stack.extend(node.folders.values().rev());
        }
        ids
    }

    fn maybe_find(&self, id: &str) -> Option<&DriveNode> {
        self.tops().into_iter().find_map(|top| locate(top, id))
    }

    fn find(&self, id: &str) -> PfResult<&DriveNode> {
        self.maybe_find(id)
            .ok_or_else(|| PfErrKind::FolderNonexistent.into())
    }

    fn contains(&self, id: &str) -> bool {
        self.maybe_find(id).is_some()
    }

    fn path_to(&self, id: &str) -> Option<Vec<&DriveNode>> {
        self.tops().into_iter().find_map(|top| path_to(top, id))
    }

    /// Every resolved image beneath the tops, each with its `folder_path_list` set to the folder
    /// names from its top down to the folder holding it.
    fn all_images(&self) -> Vec<ImageObject> {
        fn collect(node: &DriveNode, path: &mut Vec<String>, out: &mut Vec<ImageObject>) {
            path.push(node.name.clone());
            for image in node.images() {
                let mut image = image.clone();
                image.folder_path_list = path.clone();
                out.push(image);
            }
            for child in node.children() {
                collect(child, path, out);
            }
            path.pop();
        }

        let mut images = vec![];
        for top in self.tops() {
            collect(top, &mut vec![], &mut images);
        }
        images
    }
}

impl TreeLike for DriveNode {
    fn tops(&self) -> Vec<&DriveNode> {
        vec![self]
    }
}

impl TreeLike for Vec<DriveNode> {
    fn tops(&self) -> Vec<&DriveNode> {
        self.iter().collect()
    }
}

impl<T> TreeLike for &T
where
    T: TreeLike,
{
    fn tops(&self) -> Vec<&DriveNode> {
        T::tops(self)
    }
}
