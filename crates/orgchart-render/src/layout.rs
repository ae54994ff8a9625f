//! Tidy tree layout (Buchheim, Jünger and Leipert's linear-time take on Walker's algorithm).
//!
//! Coordinates are computed in sibling units along the breadth axis and scaled by
//! [`LayoutConfig::breadth_spacing`] at the end. Only the visible set participates, so a
//! collapsed subtree takes no room at all.

use crate::model::{LayoutConfig, LayoutLink, LayoutNode, Orientation, TreeLayout};
use orgchart_core::{NodeId, OrgTree, Point};

/// Parent of the real root; its modifier re-centres the tree on `x = 0`.
const VIRTUAL_ROOT: usize = 0;

#[derive(Debug, Clone)]
struct WalkNode {
    source: NodeId,
    parent: usize,
    children: Vec<usize>,
    /// Position among siblings.
    index: usize,
    depth: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    ancestor: usize,
    default_ancestor: Option<usize>,
}

impl WalkNode {
    fn new(local: usize, source: NodeId, parent: usize, index: usize, depth: usize) -> Self {
        Self {
            source,
            parent,
            children: Vec::new(),
            index,
            depth,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            ancestor: local,
            default_ancestor: None,
        }
    }
}

struct Walker {
    nodes: Vec<WalkNode>,
    cousin_separation: f64,
}

impl Walker {
    /// Copies the visible set into a local arena: index 0 is the virtual root, the real
    /// nodes follow in pre-order.
    fn new(tree: &OrgTree, cousin_separation: f64) -> Self {
        let mut nodes = vec![WalkNode::new(VIRTUAL_ROOT, tree.root(), VIRTUAL_ROOT, 0, 0)];
        let mut stack: Vec<(NodeId, usize, usize, usize)> = vec![(tree.root(), VIRTUAL_ROOT, 0, 0)];
        while let Some((source, parent, index, depth)) = stack.pop() {
            let local = nodes.len();
            nodes.push(WalkNode::new(local, source, parent, index, depth));
            nodes[parent].children.push(local);
            let visible = tree.visible_children(source);
            for (i, &child) in visible.iter().enumerate().rev() {
                stack.push((child, local, i, depth + 1));
            }
        }
        Self {
            nodes,
            cousin_separation,
        }
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.nodes[a].parent == self.nodes[b].parent {
            1.0
        } else {
            self.cousin_separation
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.first().copied().or(self.nodes[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.last().copied().or(self.nodes[v].thread)
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let a = self.nodes[vim].ancestor;
        if self.nodes[a].parent == self.nodes[v].parent {
            a
        } else {
            ancestor
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let change = shift / (self.nodes[wp].index - self.nodes[wm].index) as f64;
        let right = &mut self.nodes[wp];
        right.change -= change;
        right.shift += shift;
        right.prelim += shift;
        right.modifier += shift;
        self.nodes[wm].change += change;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        for i in (0..self.nodes[v].children.len()).rev() {
            let w = self.nodes[v].children[i];
            let node = &mut self.nodes[w];
            node.prelim += shift;
            node.modifier += shift;
            change += node.change;
            shift += node.shift + change;
        }
    }

    fn first_walk(&mut self, v: usize) {
        let parent = self.nodes[v].parent;
        let index = self.nodes[v].index;
        let left_sibling = index.checked_sub(1).map(|i| self.nodes[parent].children[i]);

        let children = &self.nodes[v].children;
        let extremes = (children.first().copied(), children.last().copied());
        if let (Some(first), Some(last)) = extremes {
            self.execute_shifts(v);
            let midpoint = (self.nodes[first].prelim + self.nodes[last].prelim) / 2.0;
            if let Some(w) = left_sibling {
                let prelim = self.nodes[w].prelim + self.separation(v, w);
                self.nodes[v].prelim = prelim;
                self.nodes[v].modifier = prelim - midpoint;
            } else {
                self.nodes[v].prelim = midpoint;
            }
        } else if let Some(w) = left_sibling {
            self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
        }

        let default = self.nodes[parent]
            .default_ancestor
            .unwrap_or(self.nodes[parent].children[0]);
        let ancestor = self.apportion(v, left_sibling, default);
        self.nodes[parent].default_ancestor = Some(ancestor);
    }

    fn apportion(&mut self, v: usize, left_sibling: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = left_sibling else {
            return ancestor;
        };
        let parent = self.nodes[v].parent;
        // i = inside, o = outside; p = right contour (v's subtree), m = left contour.
        let mut vip = v;
        let mut vop = v;
        let mut vim = w;
        let mut vom = self.nodes[parent].children[0];
        let mut sip = self.nodes[vip].modifier;
        let mut sop = self.nodes[vop].modifier;
        let mut sim = self.nodes[vim].modifier;
        let mut som = self.nodes[vom].modifier;

        let mut next_vim = self.next_right(vim);
        let mut next_vip = self.next_left(vip);
        while let (Some(im), Some(ip)) = (next_vim, next_vip) {
            vim = im;
            vip = ip;
            vom = self.next_left(vom).unwrap_or(vom);
            vop = self.next_right(vop).unwrap_or(vop);
            self.nodes[vop].ancestor = v;

            let shift = self.nodes[vim].prelim + sim - self.nodes[vip].prelim - sip
                + self.separation(vim, vip);
            if shift > 0.0 {
                let wm = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(wm, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.nodes[vim].modifier;
            sip += self.nodes[vip].modifier;
            som += self.nodes[vom].modifier;
            sop += self.nodes[vop].modifier;

            next_vim = self.next_right(vim);
            next_vip = self.next_left(vip);
        }

        if let Some(im) = next_vim {
            if self.next_right(vop).is_none() {
                self.nodes[vop].thread = Some(im);
                self.nodes[vop].modifier += sim - sop;
            }
        }
        if let Some(ip) = next_vip {
            if self.next_left(vom).is_none() {
                self.nodes[vom].thread = Some(ip);
                self.nodes[vom].modifier += sip - som;
                ancestor = v;
            }
        }
        ancestor
    }

    /// Children before parents, left siblings before right ones.
    fn post_order(&self) -> Vec<usize> {
        let mut pending = vec![VIRTUAL_ROOT + 1];
        let mut visited = Vec::with_capacity(self.nodes.len());
        while let Some(v) = pending.pop() {
            visited.push(v);
            pending.extend(self.nodes[v].children.iter().copied());
        }
        visited.reverse();
        visited
    }

    /// Final breadth coordinate of every real node, in sibling units.
    fn run(mut self) -> Vec<(NodeId, usize, f64)> {
        for v in self.post_order() {
            self.first_walk(v);
        }
        let root = VIRTUAL_ROOT + 1;
        self.nodes[VIRTUAL_ROOT].modifier = -self.nodes[root].prelim;

        // Arena order is pre-order, so every parent is final before its children.
        let mut out = Vec::with_capacity(self.nodes.len() - 1);
        for v in root..self.nodes.len() {
            let parent_modifier = self.nodes[self.nodes[v].parent].modifier;
            let node = &mut self.nodes[v];
            let x = node.prelim + parent_modifier;
            node.modifier += parent_modifier;
            out.push((node.source, node.depth, x));
        }
        out
    }
}

/// Lays out the visible set of `tree`. Identical visible sets give identical output.
pub fn compute_layout(tree: &OrgTree, orientation: Orientation, config: &LayoutConfig) -> TreeLayout {
    let breadth_spacing = config.breadth_spacing(orientation);
    let depth_spacing = config.depth_spacing(orientation);

    let placed = Walker::new(tree, config.cousin_separation).run();
    let nodes: Vec<LayoutNode> = placed
        .into_iter()
        .map(|(node, depth, x)| {
            let breadth = x * breadth_spacing;
            let along = depth as f64 * depth_spacing;
            let p = match orientation {
                Orientation::Vertical => Point::new(breadth, along),
                Orientation::Horizontal => Point::new(along, breadth),
            };
            LayoutNode {
                node,
                employee_id: tree.node(node).id().to_string(),
                depth,
                x: p.x,
                y: p.y,
            }
        })
        .collect();

    let links = nodes
        .iter()
        .filter_map(|n| {
            let source = tree.node(n.node).parent?;
            Some(LayoutLink {
                source,
                target: n.node,
                key: n.employee_id.clone(),
            })
        })
        .collect();

    tracing::debug!(nodes = nodes.len(), ?orientation, "computed tree layout");
    TreeLayout {
        orientation,
        nodes,
        links,
    }
}
