use crate::search::SearchIndex;
use crate::settings::CollapseLevel;
use crate::Result;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One person in the source hierarchy, as delivered by the data service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub is_new_employee: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Employee>,
}

impl Employee {
    pub fn new(id: impl Into<String>, name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            title: title.into(),
            department: None,
            email: None,
            phone: None,
            location: None,
            is_new_employee: false,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Employee>) -> Self {
        self.children = children;
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Copy of this record without its subtree.
    pub fn detached(&self) -> Self {
        Self {
            children: Vec::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

/// Index of a node inside an [`OrgTree`]. Ids are assigned in pre-order, so the root is
/// always index 0 and sorting ids yields the flattened search order.
///
/// Only a tree hands out ids. An id kept across a reload, deserialized, or taken from
/// another tree may be out of range: check it with [`OrgTree::contains`] before indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: Self = Self(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExpansionState {
    Expanded,
    Collapsed,
    /// No children; never transitions.
    Leaf,
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    /// The source record with its `children` stripped; the subtree lives in `children`.
    pub employee: Employee,
    pub depth: usize,
    pub parent: Option<NodeId>,
    /// Complete child list in source order, regardless of expansion state.
    pub children: Vec<NodeId>,
    pub state: ExpansionState,
    pub position: Point,
    /// Coordinate before the most recent layout pass; anchors transitions.
    pub previous_position: Point,
}

impl TreeNode {
    pub fn id(&self) -> &str {
        &self.employee.id
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_expanded(&self) -> bool {
        self.state == ExpansionState::Expanded
    }

    pub fn is_collapsed(&self) -> bool {
        self.state == ExpansionState::Collapsed
    }
}

/// Engine-owned view of one loaded hierarchy.
///
/// Nodes live in a flat arena in pre-order. Parent links are plain indices, so there is no
/// ownership cycle between a node and its children.
#[derive(Debug, Clone)]
pub struct OrgTree {
    nodes: Vec<TreeNode>,
    by_id: FxHashMap<String, NodeId>,
    index: SearchIndex,
}

impl OrgTree {
    /// Builds the tree. Every node with children starts `Expanded`, every other node is a
    /// `Leaf`. Duplicate ids are a precondition violation; lookups resolve to the first
    /// occurrence in pre-order.
    pub fn build(root: Employee) -> Self {
        let index = SearchIndex::from_root(&root);

        let mut nodes: Vec<TreeNode> = Vec::with_capacity(index.len());
        let mut by_id: FxHashMap<String, NodeId> = FxHashMap::default();
        let mut stack: Vec<(Employee, Option<NodeId>, usize)> = vec![(root, None, 0)];

        while let Some((mut employee, parent, depth)) = stack.pop() {
            let id = NodeId(nodes.len());
            let children = std::mem::take(&mut employee.children);
            let state = if children.is_empty() {
                ExpansionState::Leaf
            } else {
                ExpansionState::Expanded
            };
            by_id.entry(employee.id.clone()).or_insert(id);
            if let Some(p) = parent {
                nodes[p.0].children.push(id);
            }
            nodes.push(TreeNode {
                employee,
                depth,
                parent,
                children: Vec::new(),
                state,
                position: Point::ORIGIN,
                previous_position: Point::ORIGIN,
            });
            for child in children.into_iter().rev() {
                stack.push((child, Some(id), depth + 1));
            }
        }

        tracing::debug!(nodes = nodes.len(), "built org tree");
        Self {
            nodes,
            by_id,
            index,
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let root: Employee = serde_json::from_str(text)?;
        Ok(Self::build(root))
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let root: Employee = serde_json::from_value(value)?;
        Ok(Self::build(root))
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn try_node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Panics when `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, employee_id: &str) -> Option<NodeId> {
        self.by_id.get(employee_id).copied()
    }

    pub fn node_by_employee(&self, employee_id: &str) -> Option<&TreeNode> {
        self.get(employee_id).map(|id| self.node(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Flattened pre-order index over every record, built once at load.
    pub fn search_index(&self) -> &SearchIndex {
        &self.index
    }

    /// Children that are currently shown: all of them for an `Expanded` node, none otherwise.
    pub fn visible_children(&self, id: NodeId) -> &[NodeId] {
        let node = self.node(id);
        if node.is_expanded() {
            &node.children
        } else {
            &[]
        }
    }

    /// The visible set in pre-order (parents before children, siblings left to right).
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            for &child in self.visible_children(id).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut cur = self.node(id).parent;
        while let Some(p) = cur {
            let parent = self.node(p);
            if !parent.is_expanded() {
                return false;
            }
            cur = parent.parent;
        }
        true
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).parent, |p| self.node(*p).parent)
    }

    /// Collapses every node at `depth >= level - 1` that has children. `All` leaves the
    /// tree untouched.
    pub fn apply_initial_collapse(&mut self, level: CollapseLevel) {
        let CollapseLevel::Level(level) = level else {
            return;
        };
        let threshold = level.saturating_sub(1);
        for node in &mut self.nodes {
            if node.depth >= threshold && node.is_expanded() {
                node.state = ExpansionState::Collapsed;
            }
        }
    }

    pub fn states(&self) -> Vec<ExpansionState> {
        self.nodes.iter().map(|n| n.state).collect()
    }
}
