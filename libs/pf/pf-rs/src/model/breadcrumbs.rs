use crate::model::drive_node::DriveNode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub id: String,
    pub name: String,
}

impl Crumb {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

impl From<&DriveNode> for Crumb {
    fn from(node: &DriveNode) -> Self {
        Crumb::new(node.id.clone(), node.name.clone())
    }
}

/// Navigation history shown above the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breadcrumbs {
    trail: Vec<Crumb>,
}

impl Breadcrumbs {
    /// `None` is the top level and clears the trail. A folder already on the trail truncates back
    /// to it, anything else is appended.
    pub fn navigate(&mut self, target: Option<Crumb>) {
        let Some(target) = target else {
            self.trail.clear();
            return;
        };

        match self.trail.iter().position(|crumb| crumb.id == target.id) {
            Some(at) => self.trail.truncate(at + 1),
            None => self.trail.push(target),
        }
    }

    /// Replaces the trail with a full ancestor chain, as a deep link does.
    pub fn reset_to(&mut self, path: Vec<Crumb>) {
        self.trail = path;
    }

    pub fn trail(&self) -> &[Crumb] {
        &self.trail
    }

    pub fn ids(&self) -> Vec<&str> {
        self.trail.iter().map(|crumb| crumb.id.as_str()).collect()
    }

    pub fn current(&self) -> Option<&Crumb> {
        self.trail.last()
    }
}

#[cfg(test)]
mod unit_tests {
    use crate::model::breadcrumbs::{Breadcrumbs, Crumb};

    fn go(crumbs: &mut Breadcrumbs, id: &str) {
        crumbs.navigate(Some(Crumb::new(id, id.to_lowercase())));
    }

    #[test]
    fn back_navigation_truncates() {
        let mut crumbs = Breadcrumbs::default();
        go(&mut crumbs, "A");
        go(&mut crumbs, "B");
        go(&mut crumbs, "C");
        go(&mut crumbs, "A");
        assert_eq!(crumbs.ids(), vec!["A"]);
    }

    #[test]
    fn new_folder_appends() {
        let mut crumbs = Breadcrumbs::default();
        go(&mut crumbs, "A");
        go(&mut crumbs, "B");
        go(&mut crumbs, "D");
        assert_eq!(crumbs.ids(), vec!["A", "B", "D"]);
        assert_eq!(crumbs.current().unwrap().name, "d");
    }

    #[test]
    fn top_level_clears() {
        let mut crumbs = Breadcrumbs::default();
        go(&mut crumbs, "A");
        go(&mut crumbs, "B");
        crumbs.navigate(None);
        assert!(crumbs.trail().is_empty());
    }

    #[test]
    fn deep_link_then_back() {
        let mut crumbs = Breadcrumbs::default();
        crumbs.reset_to(vec![Crumb::new("R", "r"), Crumb::new("S", "s"), Crumb::new("T", "t")]);
        go(&mut crumbs, "S");
        assert_eq!(crumbs.ids(), vec!["R", "S"]);
    }
}
