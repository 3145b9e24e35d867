use crate::sca_engine::domain::{DependencyGraph, NodeId};
use tokio::sync::Mutex;

/// The scan-wide graph that per-file graphs are merged into.
///
/// Analyzer tasks build their file graphs independently and only take the
/// lock for the merge itself.
#[derive(Debug)]
pub struct SharedGraph {
    inner: Mutex<DependencyGraph>,
    root: NodeId,
}

impl SharedGraph {
    /// Creates the graph with a synthetic scan root labelled `path`
    pub fn new(path: impl Into<String>) -> Self {
        let mut graph = DependencyGraph::new();
        let root = graph.add_synthetic(Some(path.into()));
        Self {
            inner: Mutex::new(graph),
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Merges a file graph and hangs its root under the scan root
    pub async fn attach_file(&self, file_graph: &DependencyGraph, file_root: NodeId) -> NodeId {
        let mut graph = self.inner.lock().await;
        let attached = graph.absorb(file_graph, file_root);
        graph.attach_child(self.root, attached);
        attached
    }

    /// Records a file whose dependencies could not be read
    pub async fn attach_placeholder(&self, path: &str) -> NodeId {
        let mut graph = self.inner.lock().await;
        let placeholder = graph.add_synthetic(Some(path.to_string()));
        graph.attach_child(self.root, placeholder);
        placeholder
    }

    /// Releases the merged graph.
    ///
    /// The graph is renumbered so that ids, child order and the exported
    /// element references do not depend on the order in which concurrent
    /// tasks finished. Ids returned by `attach_file` and
    /// `attach_placeholder` refer to the graph before renumbering.
    pub fn into_inner(self) -> (DependencyGraph, NodeId) {
        self.inner.into_inner().renumbered(self.root)
    }
}
