use crate::sca_engine::domain::{DependencyGraph, NodeId, RawDependencies};

/// GraphBuilder service turning an analyzer's edge list into a graph
///
/// Pure construction logic with no I/O. Every file gets its own graph and
/// identity map so analyzers can run concurrently; the per-file graphs are
/// merged afterwards through `SharedGraph`.
pub struct GraphBuilder;

impl GraphBuilder {
    /// Builds the graph of one file and returns it with the file's root node
    ///
    /// Expansion is depth-first from the declared root, then from packages
    /// nobody depends on, then from anything still unreached (pure cycles).
    /// An edge back onto the current resolution path is recorded as cyclic
    /// and not followed; a node reached again is linked but not re-expanded.
    pub fn build(raw: &RawDependencies) -> (DependencyGraph, NodeId) {
        let mut graph = DependencyGraph::new();
        let mut declared: Vec<NodeId> = Vec::new();

        for identity in &raw.packages {
            if identity.is_synthetic() {
                tracing::debug!(path = %raw.path, "skipping package without a name");
                continue;
            }
            let id = graph.upsert(identity.clone());
            if !declared.contains(&id) {
                declared.push(id);
            }
        }

        let mut edges: Vec<(NodeId, NodeId)> = Vec::with_capacity(raw.edges.len());
        for (parent, child) in &raw.edges {
            if parent.is_synthetic() || child.is_synthetic() {
                tracing::debug!(path = %raw.path, "skipping edge with an unnamed endpoint");
                continue;
            }
            let parent = graph.upsert(parent.clone());
            let child = graph.upsert(child.clone());
            for id in [parent, child] {
                if !declared.contains(&id) {
                    declared.push(id);
                }
            }
            edges.push((parent, child));
        }

        let declared_root = raw
            .root
            .as_ref()
            .filter(|identity| !identity.is_synthetic())
            .map(|identity| graph.upsert(identity.clone()));
        if let Some(root) = declared_root {
            if !declared.contains(&root) {
                declared.push(root);
            }
        }

        let mut adjacency: Vec<Vec<NodeId>> = vec![Vec::new(); graph.len()];
        let mut has_incoming = vec![false; graph.len()];
        for &(parent, child) in &edges {
            let children = &mut adjacency[parent.index()];
            if !children.contains(&child) {
                children.push(child);
            }
            if parent != child {
                has_incoming[child.index()] = true;
            }
        }

        let orphans = declared
            .iter()
            .copied()
            .filter(|id| !has_incoming[id.index()]);
        let entries = declared_root
            .into_iter()
            .chain(orphans)
            .chain(declared.iter().copied());
        Self::expand(&mut graph, &adjacency, entries);

        let root = match declared_root {
            Some(root) => root,
            None => graph.merge_roots(&declared, Some(raw.path.clone())),
        };
        graph.node_mut(root).set_path(raw.path.clone());

        tracing::debug!(
            path = %raw.path,
            nodes = graph.len(),
            "built dependency graph\n{}",
            graph.render_tree(root)
        );
        (graph, root)
    }

    /// Graph standing in for a file that could not be parsed
    pub fn placeholder(path: &str) -> (DependencyGraph, NodeId) {
        let mut graph = DependencyGraph::new();
        let root = graph.add_synthetic(Some(path.to_string()));
        (graph, root)
    }

    fn expand(
        graph: &mut DependencyGraph,
        adjacency: &[Vec<NodeId>],
        entries: impl Iterator<Item = NodeId>,
    ) {
        let mut expanded = vec![false; adjacency.len()];
        let mut on_path = vec![false; adjacency.len()];

        for entry in entries {
            if expanded[entry.index()] {
                continue;
            }
            expanded[entry.index()] = true;
            on_path[entry.index()] = true;

            // (node, index of the next child to visit)
            let mut stack: Vec<(NodeId, usize)> = vec![(entry, 0)];
            while let Some(frame) = stack.last_mut() {
                let (node, cursor) = *frame;
                let Some(&child) = adjacency[node.index()].get(cursor) else {
                    on_path[node.index()] = false;
                    stack.pop();
                    continue;
                };
                frame.1 += 1;

                graph.attach_child(node, child);
                if on_path[child.index()] || expanded[child.index()] {
                    continue;
                }
                expanded[child.index()] = true;
                on_path[child.index()] = true;
                stack.push((child, 0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sca_engine::domain::{DependencyIdentity, Edge, Language};

    fn py(name: &str) -> DependencyIdentity {
        DependencyIdentity::new("", name, "1.0", Language::Python)
    }

    fn names(graph: &DependencyGraph, ids: impl Iterator<Item = NodeId>) -> Vec<String> {
        ids.map(|id| graph.node(id).name().to_string()).collect()
    }

    #[test]
    fn test_build_linear_chain_with_declared_root() {
        let mut raw = RawDependencies::new("uv.lock").with_root(py("app"));
        raw.add_package(py("app"));
        raw.add_package(py("requests"));
        raw.add_package(py("urllib3"));
        raw.add_edge(py("app"), py("requests"));
        raw.add_edge(py("requests"), py("urllib3"));

        let (graph, root) = GraphBuilder::build(&raw);
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.node(root).name(), "app");
        assert_eq!(graph.node(root).path(), Some("uv.lock"));
        assert_eq!(
            names(&graph, graph.breadth_first(root).into_iter()),
            vec!["app", "requests", "urllib3"]
        );
    }

    #[test]
    fn test_build_diamond_shares_node() {
        let mut raw = RawDependencies::new("Cargo.lock");
        for name in ["top", "x", "y", "z"] {
            raw.add_package(py(name));
        }
        raw.add_edge(py("top"), py("x"));
        raw.add_edge(py("top"), py("y"));
        raw.add_edge(py("x"), py("z"));
        raw.add_edge(py("y"), py("z"));

        let (graph, root) = GraphBuilder::build(&raw);
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.node(root).name(), "top");
        let z = graph.find(&py("z")).unwrap();
        assert_eq!(graph.node(z).parents().len(), 2);
    }

    #[test]
    fn test_build_records_cycle_without_expanding() {
        let mut raw = RawDependencies::new("a.lock");
        raw.add_package(py("a"));
        raw.add_package(py("b"));
        raw.add_edge(py("a"), py("b"));
        raw.add_edge(py("b"), py("a"));

        let (graph, root) = GraphBuilder::build(&raw);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.node(root).name(), "a");

        let a = graph.find(&py("a")).unwrap();
        let b = graph.find(&py("b")).unwrap();
        assert_eq!(graph.node(b).children(), &[Edge::back(a)]);
        assert_eq!(graph.breadth_first(root), vec![a, b]);
    }

    #[test]
    fn test_build_joins_independent_roots() {
        let mut raw = RawDependencies::new("bom.spdx");
        raw.add_package(py("left"));
        raw.add_package(py("right"));
        raw.add_package(py("shared"));
        raw.add_edge(py("left"), py("shared"));
        raw.add_edge(py("right"), py("shared"));

        let (graph, root) = GraphBuilder::build(&raw);
        let root_node = graph.node(root);
        assert!(root_node.is_synthetic());
        assert_eq!(root_node.path(), Some("bom.spdx"));
        assert_eq!(names(&graph, root_node.child_ids()), vec!["left", "right"]);
    }

    #[test]
    fn test_build_includes_identities_only_named_in_edges() {
        let mut raw = RawDependencies::new("uv.lock").with_root(py("app"));
        raw.add_edge(py("app"), py("idna"));

        let (graph, root) = GraphBuilder::build(&raw);
        assert_eq!(graph.len(), 2);
        assert_eq!(names(&graph, graph.node(root).child_ids()), vec!["idna"]);
    }

    #[test]
    fn test_build_ignores_duplicate_edges_and_unnamed_packages() {
        let mut raw = RawDependencies::new("uv.lock");
        raw.add_package(py("a"));
        raw.add_package(DependencyIdentity::default());
        raw.add_edge(py("a"), py("b"));
        raw.add_edge(py("a"), py("b"));

        let (graph, root) = GraphBuilder::build(&raw);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.node(root).children().len(), 1);
    }

    #[test]
    fn test_build_empty_file_yields_synthetic_root() {
        let (graph, root) = GraphBuilder::build(&RawDependencies::new("empty.lock"));
        assert_eq!(graph.len(), 1);
        assert!(graph.node(root).is_synthetic());
        assert_eq!(graph.node(root).path(), Some("empty.lock"));
    }

    #[test]
    fn test_placeholder() {
        let (graph, root) = GraphBuilder::placeholder("broken/Cargo.lock");
        assert!(graph.node(root).is_synthetic());
        assert_eq!(graph.node(root).path(), Some("broken/Cargo.lock"));
    }
}
