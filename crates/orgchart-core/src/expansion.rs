//! Collapse/expand transitions over each node's [`ExpansionState`].
//!
//! These only flip states; the caller re-renders afterwards (`update(n)` for a toggle,
//! `update(root)` for the global operations).

use crate::model::{ExpansionState, NodeId, OrgTree};
use crate::settings::CollapseLevel;
use std::ops::Deref;

/// Depth at which children are re-collapsed when their parent is expanded by a toggle.
const RECOLLAPSE_MIN_DEPTH: usize = 2;

impl OrgTree {
    /// `Expanded -> Collapsed`, `Collapsed -> Expanded`; leaves never change.
    ///
    /// Expanding re-collapses every child at depth >= 2 that still shows its own children,
    /// so one click reveals exactly one more level.
    pub fn toggle(&mut self, id: NodeId) -> ExpansionState {
        match self.node(id).state {
            ExpansionState::Leaf => ExpansionState::Leaf,
            ExpansionState::Expanded => {
                self.node_mut(id).state = ExpansionState::Collapsed;
                ExpansionState::Collapsed
            }
            ExpansionState::Collapsed => {
                self.node_mut(id).state = ExpansionState::Expanded;
                let children = self.node(id).children.clone();
                for child in children {
                    let node = self.node_mut(child);
                    if node.depth >= RECOLLAPSE_MIN_DEPTH && node.is_expanded() {
                        node.state = ExpansionState::Collapsed;
                    }
                }
                ExpansionState::Expanded
            }
        }
    }

    /// Opens every collapsed node. Returns how many nodes changed.
    pub fn expand_all(&mut self) -> usize {
        let ids: Vec<NodeId> = self
            .iter()
            .filter(|(_, n)| n.is_collapsed())
            .map(|(id, _)| id)
            .collect();
        for &id in &ids {
            self.node_mut(id).state = ExpansionState::Expanded;
        }
        ids.len()
    }

    /// Closes every expanded node below the root. Returns how many nodes changed.
    pub fn collapse_all(&mut self) -> usize {
        let ids: Vec<NodeId> = self
            .iter()
            .filter(|(_, n)| n.depth >= 1 && n.is_expanded())
            .map(|(id, _)| id)
            .collect();
        for &id in &ids {
            self.node_mut(id).state = ExpansionState::Collapsed;
        }
        ids.len()
    }

    /// Post-load counterpart of [`OrgTree::apply_initial_collapse`]: nodes shallower than the
    /// cut-off are opened again, nodes at or below it are closed.
    pub fn expand_to_level(&mut self, level: CollapseLevel) {
        let CollapseLevel::Level(level) = level else {
            self.expand_all();
            return;
        };
        let threshold = level.saturating_sub(1);
        let ids: Vec<NodeId> = self
            .iter()
            .filter(|(_, n)| n.has_children())
            .map(|(id, _)| id)
            .collect();
        for id in ids {
            let node = self.node_mut(id);
            node.state = if node.depth >= threshold {
                ExpansionState::Collapsed
            } else {
                ExpansionState::Expanded
            };
        }
    }

    /// Temporarily expands the whole tree. Every node that was `Collapsed` goes back to
    /// `Collapsed` when the returned guard is dropped.
    pub fn force_expand_all(&mut self) -> ForcedExpansion<'_> {
        let collapsed: Vec<NodeId> = self
            .iter()
            .filter(|(_, n)| n.is_collapsed())
            .map(|(id, _)| id)
            .collect();
        for &id in &collapsed {
            self.node_mut(id).state = ExpansionState::Expanded;
        }
        tracing::debug!(forced = collapsed.len(), "forced full expansion");
        ForcedExpansion {
            tree: self,
            collapsed,
        }
    }
}

/// Read-only access to a fully expanded tree; see [`OrgTree::force_expand_all`].
#[derive(Debug)]
pub struct ForcedExpansion<'a> {
    tree: &'a mut OrgTree,
    collapsed: Vec<NodeId>,
}

impl ForcedExpansion<'_> {
    /// Nodes that were collapsed before the expansion and will be restored.
    pub fn restored_on_drop(&self) -> &[NodeId] {
        &self.collapsed
    }
}

impl Deref for ForcedExpansion<'_> {
    type Target = OrgTree;

    fn deref(&self) -> &OrgTree {
        self.tree
    }
}

impl Drop for ForcedExpansion<'_> {
    fn drop(&mut self) {
        for &id in &self.collapsed {
            self.tree.node_mut(id).state = ExpansionState::Collapsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Employee;

    fn chain() -> OrgTree {
        // 0 -> 1 -> 2 -> 3 -> 4
        let e4 = Employee::new("e4", "E4", "");
        let e3 = Employee::new("e3", "E3", "").with_children(vec![e4]);
        let e2 = Employee::new("e2", "E2", "").with_children(vec![e3]);
        let e1 = Employee::new("e1", "E1", "").with_children(vec![e2]);
        OrgTree::build(Employee::new("e0", "E0", "").with_children(vec![e1]))
    }

    #[test]
    fn toggle_leaf_is_a_no_op() {
        let mut tree = chain();
        let leaf = tree.get("e4").unwrap();
        assert_eq!(tree.toggle(leaf), ExpansionState::Leaf);
    }

    #[test]
    fn expanding_recollapses_deep_children_only() {
        let mut tree = chain();
        let e1 = tree.get("e1").unwrap();
        let e2 = tree.get("e2").unwrap();
        let e3 = tree.get("e3").unwrap();

        tree.toggle(e2);
        assert_eq!(tree.node(e2).state, ExpansionState::Collapsed);
        tree.toggle(e2);
        assert_eq!(tree.node(e2).state, ExpansionState::Expanded);
        // e3 sits at depth 3 and was showing its child, so it is closed again.
        assert_eq!(tree.node(e3).state, ExpansionState::Collapsed);

        tree.toggle(e1);
        tree.toggle(e1);
        // e2 is at depth 2: re-collapsed as well.
        assert_eq!(tree.node(e2).state, ExpansionState::Collapsed);
    }

    #[test]
    fn forced_expansion_restores_on_drop() {
        let mut tree = chain();
        let e2 = tree.get("e2").unwrap();
        tree.toggle(e2);
        {
            let forced = tree.force_expand_all();
            assert_eq!(forced.restored_on_drop(), &[e2]);
            assert!(forced.node(e2).is_expanded());
            assert_eq!(forced.visible_nodes().len(), 5);
        }
        assert!(tree.node(e2).is_collapsed());
    }

    #[test]
    fn expand_to_level_reopens_shallow_nodes() {
        let mut tree = chain();
        tree.collapse_all();
        tree.expand_to_level(CollapseLevel::Level(3));
        let states: Vec<ExpansionState> = tree.states();
        assert_eq!(
            states,
            vec![
                ExpansionState::Expanded,
                ExpansionState::Expanded,
                ExpansionState::Collapsed,
                ExpansionState::Collapsed,
                ExpansionState::Leaf,
            ]
        );
    }
}
