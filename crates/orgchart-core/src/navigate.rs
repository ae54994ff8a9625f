use crate::model::{ExpansionState, NodeId, OrgTree};

impl OrgTree {
    /// Root-to-target path, searched depth-first through every child whether it is shown
    /// or not. `None` when no node carries `employee_id`.
    pub fn find_path(&self, employee_id: &str) -> Option<Vec<NodeId>> {
        // (node, index of the next child to descend into)
        let mut stack: Vec<(NodeId, usize)> = vec![(self.root(), 0)];
        if self.node(self.root()).id() == employee_id {
            return Some(vec![self.root()]);
        }

        while let Some((id, cursor)) = stack.last_mut() {
            let children = &self.node(*id).children;
            let Some(&child) = children.get(*cursor) else {
                stack.pop();
                continue;
            };
            *cursor += 1;
            if self.node(child).id() == employee_id {
                let mut path: Vec<NodeId> = stack.iter().map(|(n, _)| *n).collect();
                path.push(child);
                return Some(path);
            }
            stack.push((child, 0));
        }
        None
    }

    /// Forces every node on the path to `employee_id` open, bypassing the toggle
    /// re-collapse rule. Returns the target, or `None` (no change) when the id is unknown.
    pub fn expand_path(&mut self, employee_id: &str) -> Option<NodeId> {
        let path = self.find_path(employee_id)?;
        for &id in &path {
            let node = self.node_mut(id);
            if node.state == ExpansionState::Collapsed {
                node.state = ExpansionState::Expanded;
            }
        }
        tracing::debug!(employee_id, depth = path.len() - 1, "expanded path");
        path.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Employee, OrgTree};
    use crate::settings::CollapseLevel;

    fn tree() -> OrgTree {
        OrgTree::build(Employee::new("a", "A", "").with_children(vec![
            Employee::new("b", "B", "").with_children(vec![
                Employee::new("d", "D", ""),
                Employee::new("e", "E", "").with_children(vec![Employee::new("f", "F", "")]),
            ]),
            Employee::new("c", "C", ""),
        ]))
    }

    #[test]
    fn find_path_descends_into_hidden_subtrees() {
        let mut tree = tree();
        tree.apply_initial_collapse(CollapseLevel::Level(1));
        let path = tree.find_path("f").unwrap();
        let ids: Vec<&str> = path.iter().map(|id| tree.node(*id).id()).collect();
        assert_eq!(ids, vec!["a", "b", "e", "f"]);
    }

    #[test]
    fn find_path_handles_root_and_missing_ids() {
        let tree = tree();
        assert_eq!(tree.find_path("a").map(|p| p.len()), Some(1));
        assert!(tree.find_path("zzz").is_none());
    }

    #[test]
    fn expand_path_makes_target_visible() {
        let mut tree = tree();
        tree.apply_initial_collapse(CollapseLevel::Level(1));
        let target = tree.expand_path("f").unwrap();
        assert!(tree.is_visible(target));
        let ids: Vec<&str> = tree
            .visible_nodes()
            .iter()
            .map(|id| tree.node(*id).id())
            .collect();
        assert_eq!(ids, vec!["a", "b", "d", "e", "f", "c"]);
    }
}
