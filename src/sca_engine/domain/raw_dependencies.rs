use super::DependencyIdentity;

/// Parent-to-children edge list produced by an analyzer for one file.
///
/// `packages` lists every coordinate the file declares, in file order.
/// Identities appearing only in `edges` are still part of the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDependencies {
    /// File the dependencies were read from (relative to the scan root)
    pub path: String,
    pub packages: Vec<DependencyIdentity>,
    pub edges: Vec<(DependencyIdentity, DependencyIdentity)>,
    /// Top-level package, when the format names one
    pub root: Option<DependencyIdentity>,
}

impl RawDependencies {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_root(mut self, root: DependencyIdentity) -> Self {
        self.root = Some(root);
        self
    }

    pub fn add_package(&mut self, identity: DependencyIdentity) {
        self.packages.push(identity);
    }

    pub fn add_edge(&mut self, parent: DependencyIdentity, child: DependencyIdentity) {
        self.edges.push((parent, child));
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty() && self.edges.is_empty() && self.root.is_none()
    }
}
