//! Keyed reconciliation between consecutive layouts.
//!
//! Nodes and links are keyed by employee id (a link by its child's id), never by position
//! in the layout, because membership changes on every toggle.

use crate::layout::compute_layout;
use crate::link::ElbowPath;
use crate::model::{LayoutConfig, Orientation, TreeLayout};
use indexmap::IndexMap;
use orgchart_core::{NodeId, OrgTree, Point};
use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Result of splitting two keyed sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPartition<K> {
    /// In `next` only, in `next` order.
    pub enter: Vec<K>,
    /// In both, in `next` order.
    pub persist: Vec<K>,
    /// In `previous` only, in `previous` order.
    pub exit: Vec<K>,
}

pub fn partition_keys<K>(previous: &[K], next: &[K]) -> KeyPartition<K>
where
    K: Eq + Hash + Clone,
{
    let before: FxHashSet<&K> = previous.iter().collect();
    let after: FxHashSet<&K> = next.iter().collect();
    let (persist, enter): (Vec<K>, Vec<K>) = next.iter().cloned().partition(|k| before.contains(k));
    let exit = previous
        .iter()
        .filter(|k| !after.contains(k))
        .cloned()
        .collect();
    KeyPartition {
        enter,
        persist,
        exit,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeTransition {
    pub key: String,
    pub node: NodeId,
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkTransition {
    pub key: String,
    pub source: NodeId,
    pub target: NodeId,
    pub from: ElbowPath,
    pub to: ElbowPath,
}

/// Everything one `update` pass produced. Consumers animate each transition over the same
/// fixed duration and drop the `exited` entries at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDiff {
    pub trigger: NodeId,
    pub layout: TreeLayout,
    pub entered: Vec<NodeTransition>,
    pub updated: Vec<NodeTransition>,
    pub exited: Vec<NodeTransition>,
    pub links_entered: Vec<LinkTransition>,
    pub links_updated: Vec<LinkTransition>,
    pub links_exited: Vec<LinkTransition>,
}

impl RenderDiff {
    /// An empty pass (no layout, no transitions), as produced when nothing is loaded.
    pub fn empty(trigger: NodeId, orientation: Orientation) -> Self {
        Self {
            trigger,
            layout: TreeLayout {
                orientation,
                nodes: Vec::new(),
                links: Vec::new(),
            },
            entered: Vec::new(),
            updated: Vec::new(),
            exited: Vec::new(),
            links_entered: Vec::new(),
            links_updated: Vec::new(),
            links_exited: Vec::new(),
        }
    }

    /// No node or link entered or left the visible set.
    pub fn is_stable(&self) -> bool {
        self.entered.is_empty()
            && self.exited.is_empty()
            && self.links_entered.is_empty()
            && self.links_exited.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct RenderedNode {
    node: NodeId,
}

#[derive(Debug, Clone, Copy)]
struct RenderedLink {
    source: NodeId,
    target: NodeId,
    path: ElbowPath,
}

/// Remembers what the last pass put on screen so the next pass can be diffed against it.
#[derive(Debug, Clone, Default)]
pub struct DiffRenderer {
    config: LayoutConfig,
    nodes: IndexMap<String, RenderedNode>,
    links: IndexMap<String, RenderedLink>,
    current: Option<TreeLayout>,
}

impl DiffRenderer {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Layout of the most recent pass.
    pub fn current_layout(&self) -> Option<&TreeLayout> {
        self.current.as_ref()
    }

    pub fn rendered_keys(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Forgets the rendered set, e.g. after a reload.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.current = None;
    }

    /// Re-lays the visible set and diffs it against the previous pass.
    ///
    /// Entering content starts at the trigger's previous position, persisting content moves
    /// from where it was, and exiting content shrinks into the trigger's new position.
    /// Afterwards every visible node's `previous_position` equals its `position`.
    pub fn update(&mut self, tree: &mut OrgTree, trigger: NodeId, orientation: Orientation) -> RenderDiff {
        let layout = compute_layout(tree, orientation, &self.config);
        for n in &layout.nodes {
            tree.node_mut(n.node).position = n.position();
        }

        let origin = tree.node(trigger).previous_position;
        let sink = tree.node(trigger).position;

        let previous_keys: Vec<String> = self.nodes.keys().cloned().collect();
        let next_keys: Vec<String> = layout.nodes.iter().map(|n| n.employee_id.clone()).collect();
        let nodes = partition_keys(&previous_keys, &next_keys);

        let mut entered = Vec::with_capacity(nodes.enter.len());
        let mut updated = Vec::with_capacity(nodes.persist.len());
        // Layout order, so enter and update transitions come out in pre-order.
        let entering: FxHashSet<&str> = nodes.enter.iter().map(String::as_str).collect();
        for n in &layout.nodes {
            let from = if entering.contains(n.employee_id.as_str()) {
                origin
            } else {
                tree.node(n.node).previous_position
            };
            let transition = NodeTransition {
                key: n.employee_id.clone(),
                node: n.node,
                from,
                to: n.position(),
            };
            if entering.contains(n.employee_id.as_str()) {
                entered.push(transition);
            } else {
                updated.push(transition);
            }
        }
        let exited: Vec<NodeTransition> = nodes
            .exit
            .iter()
            .filter_map(|key| {
                let rendered = self.nodes.get(key)?;
                Some(NodeTransition {
                    key: key.clone(),
                    node: rendered.node,
                    from: tree.node(rendered.node).previous_position,
                    to: sink,
                })
            })
            .collect();

        let previous_links: Vec<String> = self.links.keys().cloned().collect();
        let next_links: Vec<String> = layout.links.iter().map(|l| l.key.clone()).collect();
        let links = partition_keys(&previous_links, &next_links);
        let link_entering: FxHashSet<&str> = links.enter.iter().map(String::as_str).collect();

        let mut links_entered = Vec::with_capacity(links.enter.len());
        let mut links_updated = Vec::with_capacity(links.persist.len());
        let mut next_rendered_links = IndexMap::with_capacity(layout.links.len());
        for l in &layout.links {
            let to = ElbowPath::new(
                tree.node(l.source).position,
                tree.node(l.target).position,
                orientation,
                &self.config,
            );
            let previous = self.links.get(&l.key).map(|r| r.path);
            let from = match previous {
                Some(path) if !link_entering.contains(l.key.as_str()) => path,
                _ => ElbowPath::collapsed(origin, orientation, &self.config),
            };
            let transition = LinkTransition {
                key: l.key.clone(),
                source: l.source,
                target: l.target,
                from,
                to,
            };
            if link_entering.contains(l.key.as_str()) {
                links_entered.push(transition);
            } else {
                links_updated.push(transition);
            }
            next_rendered_links.insert(
                l.key.clone(),
                RenderedLink {
                    source: l.source,
                    target: l.target,
                    path: to,
                },
            );
        }
        let parked = ElbowPath::collapsed(sink, orientation, &self.config);
        let links_exited: Vec<LinkTransition> = links
            .exit
            .iter()
            .filter_map(|key| {
                let rendered = self.links.get(key)?;
                Some(LinkTransition {
                    key: key.clone(),
                    source: rendered.source,
                    target: rendered.target,
                    from: rendered.path,
                    to: parked,
                })
            })
            .collect();

        for n in &layout.nodes {
            let node = tree.node_mut(n.node);
            node.previous_position = node.position;
        }
        self.nodes = layout
            .nodes
            .iter()
            .map(|n| (n.employee_id.clone(), RenderedNode { node: n.node }))
            .collect();
        self.links = next_rendered_links;
        self.current = Some(layout.clone());

        tracing::debug!(
            trigger = tree.node(trigger).id(),
            entered = entered.len(),
            updated = updated.len(),
            exited = exited.len(),
            "diff pass"
        );

        RenderDiff {
            trigger,
            layout,
            entered,
            updated,
            exited,
            links_entered,
            links_updated,
            links_exited,
        }
    }
}
