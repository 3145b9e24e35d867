use super::{DependencyIdentity, Language, Severity, VulnerabilityRecord};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Write as _;

/// Stable handle of a node inside one [`DependencyGraph`].
///
/// Assigned once per unique identity, in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Element identifier used in SBOM relationship documents
    pub fn sbom_ref(self) -> String {
        format!("SPDXRef-{}", self.0)
    }
}

/// Outgoing edge of a node.
///
/// A cyclic edge points back to an ancestor: it is kept so the relationship
/// is not lost, but traversals never expand it and it does not register a
/// parent link on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub target: NodeId,
    pub cyclic: bool,
}

impl Edge {
    pub fn tree(target: NodeId) -> Self {
        Self {
            target,
            cyclic: false,
        }
    }

    pub fn back(target: NodeId) -> Self {
        Self {
            target,
            cyclic: true,
        }
    }
}

/// Result of [`DependencyGraph::attach_child`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Attached,
    AlreadyAttached,
    CycleRecorded,
}

/// One resolved dependency, possibly shared by several parents
#[derive(Debug, Clone)]
pub struct GraphNode {
    id: NodeId,
    identity: DependencyIdentity,
    path: Option<String>,
    parents: Vec<NodeId>,
    children: Vec<Edge>,
    vulnerabilities: Vec<VulnerabilityRecord>,
    licenses: Vec<String>,
}

impl GraphNode {
    fn new(id: NodeId, identity: DependencyIdentity) -> Self {
        Self {
            id,
            identity,
            path: None,
            parents: Vec::new(),
            children: Vec::new(),
            vulnerabilities: Vec::new(),
            licenses: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn identity(&self) -> &DependencyIdentity {
        &self.identity
    }

    pub fn vendor(&self) -> &str {
        &self.identity.vendor
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn version(&self) -> &str {
        &self.identity.version
    }

    pub fn language(&self) -> Language {
        self.identity.language
    }

    /// Originating file, set on nodes that are roots of a scanned file
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub fn children(&self) -> &[Edge] {
        &self.children
    }

    /// Children reached through non-cyclic edges, in insertion order
    pub fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children
            .iter()
            .filter(|edge| !edge.cyclic)
            .map(|edge| edge.target)
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_synthetic(&self) -> bool {
        self.identity.is_synthetic()
    }

    pub fn vulnerabilities(&self) -> &[VulnerabilityRecord] {
        &self.vulnerabilities
    }

    pub fn has_vulnerability(&self, id: &str) -> bool {
        self.vulnerabilities.iter().any(|v| v.id == id)
    }

    /// Adds a vulnerability unless its ID is empty or already present.
    /// Returns whether the record was added.
    pub fn add_vulnerability(&mut self, record: VulnerabilityRecord) -> bool {
        if record.id.is_empty() || self.has_vulnerability(&record.id) {
            return false;
        }
        self.vulnerabilities.push(record);
        true
    }

    pub fn licenses(&self) -> &[String] {
        &self.licenses
    }

    pub fn add_license(&mut self, license: &str) -> bool {
        let license = license.trim();
        if license.is_empty() || self.licenses.iter().any(|l| l == license) {
            return false;
        }
        self.licenses.push(license.to_string());
        true
    }

    /// Most severe level among the node's vulnerabilities
    pub fn risk(&self) -> Severity {
        self.vulnerabilities
            .iter()
            .map(VulnerabilityRecord::severity)
            .min()
            .unwrap_or(Severity::None)
    }
}

/// Arena of dependency nodes keyed by [`DependencyIdentity`].
///
/// Nodes are never removed; the whole graph is dropped at once after
/// reporting.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    index: HashMap<DependencyIdentity, NodeId>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node for `identity`, creating it on first use.
    ///
    /// Empty-name identities are placeholders and are never keyed: every
    /// call with one creates a fresh synthetic node.
    pub fn upsert(&mut self, identity: DependencyIdentity) -> NodeId {
        if identity.is_synthetic() {
            return self.push_node(identity);
        }
        if let Some(&id) = self.index.get(&identity) {
            return id;
        }
        let id = self.push_node(identity.clone());
        self.index.insert(identity, id);
        id
    }

    /// Creates an empty-name placeholder node
    pub fn add_synthetic(&mut self, path: Option<String>) -> NodeId {
        let id = self.push_node(DependencyIdentity::default());
        self.nodes[id.0].path = path;
        id
    }

    fn push_node(&mut self, identity: DependencyIdentity) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(GraphNode::new(id, identity));
        id
    }

    pub fn find(&self, identity: &DependencyIdentity) -> Option<NodeId> {
        self.index.get(identity).copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.0)
    }

    /// # Panics
    /// If `id` was not issued by this graph
    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.0]
    }

    /// # Panics
    /// If `id` was not issued by this graph
    pub fn node_mut(&mut self, id: NodeId) -> &mut GraphNode {
        &mut self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Links `child` under `parent`.
    ///
    /// When `child` is `parent` itself or one of its ancestors the edge is
    /// recorded as cyclic and the child gets no parent link.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Attachment {
        if self.nodes[parent.0]
            .children
            .iter()
            .any(|edge| edge.target == child)
        {
            return Attachment::AlreadyAttached;
        }

        if parent == child || self.is_ancestor(child, parent) {
            self.nodes[parent.0].children.push(Edge::back(child));
            return Attachment::CycleRecorded;
        }

        self.nodes[parent.0].children.push(Edge::tree(child));
        self.nodes[child.0].parents.push(parent);
        Attachment::Attached
    }

    /// Rebuilds the graph with ids assigned in a canonical order.
    ///
    /// Every child list is sorted by `(path, identity)` and ids follow a
    /// pre-order walk from `root`; nodes unreachable from `root` come last
    /// in the same order. Parent lists follow the new ids. The result only
    /// depends on the graph's content, not on the order nodes were created.
    pub fn renumbered(&self, root: NodeId) -> (DependencyGraph, NodeId) {
        let sort_key = |id: NodeId| {
            let node = &self.nodes[id.0];
            let path = node.path.clone().unwrap_or_default();
            (path, node.identity.to_string())
        };
        let sorted_edges = |id: NodeId| {
            let mut edges = self.nodes[id.0].children.clone();
            edges.sort_by_cached_key(|edge| sort_key(edge.target));
            edges
        };

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            for edge in sorted_edges(id).into_iter().rev() {
                if !edge.cyclic && !visited.contains(&edge.target) {
                    stack.push(edge.target);
                }
            }
        }
        let mut unreachable: Vec<NodeId> = (0..self.nodes.len())
            .map(NodeId)
            .filter(|id| !visited.contains(id))
            .collect();
        unreachable.sort_by_cached_key(|&id| sort_key(id));
        order.extend(unreachable);

        let mut mapping = vec![NodeId(0); self.nodes.len()];
        for (new, old) in order.iter().enumerate() {
            mapping[old.0] = NodeId(new);
        }

        let mut graph = DependencyGraph::new();
        for &old in &order {
            let source = &self.nodes[old.0];
            let id = graph.push_node(source.identity.clone());
            if !source.is_synthetic() {
                graph.index.insert(source.identity.clone(), id);
            }
            let node = &mut graph.nodes[id.0];
            node.path = source.path.clone();
            node.vulnerabilities = source.vulnerabilities.clone();
            node.licenses = source.licenses.clone();
            node.children = sorted_edges(old)
                .into_iter()
                .map(|edge| Edge {
                    target: mapping[edge.target.0],
                    cyclic: edge.cyclic,
                })
                .collect();
        }
        for index in 0..graph.nodes.len() {
            let parent = NodeId(index);
            let targets: Vec<NodeId> = graph.nodes[index].child_ids().collect();
            for target in targets {
                graph.nodes[target.0].parents.push(parent);
            }
        }

        (graph, mapping[root.0])
    }

    /// Whether `candidate` can be reached from `node` by following parent links
    pub fn is_ancestor(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            for &parent in &self.nodes[current.0].parents {
                if parent == candidate {
                    return true;
                }
                if seen.insert(parent) {
                    stack.push(parent);
                }
            }
        }
        false
    }

    /// Nodes without parents, in creation order
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.is_root())
            .map(GraphNode::id)
            .collect()
    }

    /// Combines disconnected roots under one entry point.
    ///
    /// Independent roots are the candidates without parents and with a
    /// name. A single independent root is returned as is; otherwise a
    /// synthetic root carrying `path` adopts all of them.
    pub fn merge_roots(&mut self, candidates: &[NodeId], path: Option<String>) -> NodeId {
        let mut independent: Vec<NodeId> = Vec::new();
        for &id in candidates {
            let node = &self.nodes[id.0];
            if node.is_root() && !node.is_synthetic() && !independent.contains(&id) {
                independent.push(id);
            }
        }

        if let [single] = independent.as_slice() {
            return *single;
        }

        let root = self.add_synthetic(path);
        for id in independent {
            self.attach_child(root, id);
        }
        root
    }

    /// Pre-order traversal visiting every reachable node exactly once.
    ///
    /// Returning `false` from `visitor` skips the children of that node.
    pub fn for_each<'a, F>(&'a self, start: NodeId, mut visitor: F)
    where
        F: FnMut(&'a GraphNode) -> bool,
    {
        let mut visited = HashSet::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let node = &self.nodes[id.0];
            if !visitor(node) {
                continue;
            }
            let children: Vec<NodeId> = node.child_ids().collect();
            for child in children.into_iter().rev() {
                if !visited.contains(&child) {
                    stack.push(child);
                }
            }
        }
    }

    /// Distinct reachable nodes in breadth-first order
    pub fn breadth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start]);
        visited.insert(start);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for child in self.nodes[id.0].child_ids() {
                if visited.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        order
    }

    /// Breadth-first walk that visits a shared node once per parent edge.
    ///
    /// Each reachable node is visited as many times as it has parents that
    /// are themselves reachable from `start`, and `start` once, so the cost
    /// stays linear in the number of edges.
    pub fn for_each_occurrence<F>(&self, start: NodeId, mut visitor: F)
    where
        F: FnMut(&GraphNode),
    {
        let order = self.breadth_first(start);
        let reachable: HashSet<NodeId> = order.iter().copied().collect();
        for id in order {
            let node = &self.nodes[id.0];
            let occurrences = if id == start {
                1
            } else {
                node.parents
                    .iter()
                    .filter(|parent| reachable.contains(parent))
                    .count()
                    .max(1)
            };
            for _ in 0..occurrences {
                visitor(node);
            }
        }
    }

    /// Copies `other` into this graph, re-keying every node through
    /// [`upsert`](Self::upsert) so coordinates already present are shared.
    ///
    /// Returns the node that `other_root` maps to.
    pub fn absorb(&mut self, other: &DependencyGraph, other_root: NodeId) -> NodeId {
        let mut mapping = Vec::with_capacity(other.len());
        for node in &other.nodes {
            let id = if node.is_synthetic() {
                self.add_synthetic(node.path.clone())
            } else {
                self.upsert(node.identity.clone())
            };
            let target = &mut self.nodes[id.0];
            if target.path.is_none() {
                target.path = node.path.clone();
            }
            for license in &node.licenses {
                target.add_license(license);
            }
            for record in &node.vulnerabilities {
                target.add_vulnerability(record.clone());
            }
            mapping.push(id);
        }

        // Tree edges first so back edges are classified the same way again
        for cyclic_pass in [false, true] {
            for node in &other.nodes {
                for edge in node.children.iter().filter(|e| e.cyclic == cyclic_pass) {
                    self.attach_child(mapping[node.id.0], mapping[edge.target.0]);
                }
            }
        }

        mapping[other_root.0]
    }

    /// Indented text rendering used for debug logs.
    ///
    /// A shared node is expanded the first time only and marked `(*)`
    /// afterwards; back edges are marked `(cycle)`.
    pub fn render_tree(&self, root: NodeId) -> String {
        let mut out = String::new();
        let mut printed = HashSet::new();
        let mut stack = vec![(root, 0usize, false)];
        while let Some((id, depth, cyclic)) = stack.pop() {
            let node = &self.nodes[id.0];
            let label = if node.is_synthetic() {
                node.path().unwrap_or("<root>").to_string()
            } else {
                node.identity.to_string()
            };
            let _ = write!(out, "{}{}", "  ".repeat(depth), label);
            if cyclic {
                out.push_str(" (cycle)\n");
                continue;
            }
            if !printed.insert(id) {
                out.push_str(" (*)\n");
                continue;
            }
            out.push('\n');
            for edge in node.children.iter().rev() {
                stack.push((edge.target, depth + 1, edge.cyclic));
            }
        }
        out
    }
}
