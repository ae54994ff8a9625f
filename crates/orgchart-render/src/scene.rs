//! Drawable snapshot of a layout: positioned, styled boxes plus their connectors.

use crate::link::ElbowPath;
use crate::model::{Bounds, LayoutConfig, Orientation, TreeLayout};
use crate::{Error, Result};
use orgchart_core::{ChartSettings, ExpansionState, NodeId, OrgTree, Point};

pub const NAME_LIMIT: usize = 22;
pub const DETAIL_LIMIT: usize = 28;
pub const NO_DEPARTMENT: &str = "Not specified";
const MAX_BADGE_COUNT: usize = 99;

/// Cuts `text` to `limit` characters and appends `...` when anything was cut.
pub fn truncate_label(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn report_badge(count: usize) -> String {
    if count > MAX_BADGE_COUNT {
        format!("{MAX_BADGE_COUNT}+")
    } else {
        count.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// Name, title and department cut to fit the box.
    Truncated,
    Full,
}

/// What a scene shows besides the boxes themselves.
#[derive(Debug, Clone, Copy)]
pub struct SceneOptions<'a> {
    pub settings: &'a ChartSettings,
    pub text: TextStyle,
    pub expand_glyphs: bool,
    pub badges: bool,
    /// Print "Not specified" for a missing department instead of omitting the line.
    pub department_fallback: bool,
    pub highlighted: Option<NodeId>,
}

impl<'a> SceneOptions<'a> {
    /// On-screen chart: everything, including the search highlight.
    pub fn live(settings: &'a ChartSettings, highlighted: Option<NodeId>) -> Self {
        Self {
            settings,
            text: TextStyle::Truncated,
            expand_glyphs: true,
            badges: true,
            department_fallback: true,
            highlighted,
        }
    }

    /// Downloadable document: full text, no controls.
    pub fn export(settings: &'a ChartSettings) -> Self {
        Self {
            settings,
            text: TextStyle::Full,
            expand_glyphs: false,
            badges: false,
            department_fallback: false,
            highlighted: None,
        }
    }

    /// Printed page: box-sized text and the expand glyph, no badges.
    pub fn print(settings: &'a ChartSettings) -> Self {
        Self {
            settings,
            text: TextStyle::Truncated,
            expand_glyphs: true,
            badges: false,
            department_fallback: true,
            highlighted: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeDecoration {
    pub fill: String,
    pub stroke: String,
    pub is_root: bool,
    /// Drawn with the new-employee outline and a NEW badge.
    pub is_new: bool,
    pub report_badge: Option<String>,
    /// `+` when collapsed, `-` when expanded, none for leaves.
    pub expand_glyph: Option<char>,
    pub highlighted: bool,
    pub name: String,
    pub title: String,
    pub department: Option<String>,
}

impl NodeDecoration {
    pub fn for_node(tree: &OrgTree, id: NodeId, options: &SceneOptions<'_>) -> Self {
        let node = tree.node(id);
        let settings = options.settings;
        let employee = &node.employee;
        let label = |text: &str, limit: usize| match options.text {
            TextStyle::Truncated => truncate_label(text, limit),
            TextStyle::Full => text.to_string(),
        };

        let department = if !settings.show_departments {
            None
        } else {
            match employee.department.as_deref().filter(|d| !d.is_empty()) {
                Some(d) => Some(label(d, DETAIL_LIMIT)),
                None if options.department_fallback => Some(NO_DEPARTMENT.to_string()),
                None => None,
            }
        };

        let reports = node.children.len();
        let report_badge = (options.badges && settings.show_employee_count && reports > 0)
            .then(|| report_badge(reports));
        let expand_glyph = match node.state {
            _ if !options.expand_glyphs => None,
            ExpansionState::Collapsed => Some('+'),
            ExpansionState::Expanded => Some('-'),
            ExpansionState::Leaf => None,
        };

        Self {
            fill: settings.node_colors.fill_for_depth(node.depth).to_string(),
            stroke: settings.node_colors.stroke_for_depth(node.depth),
            is_root: node.parent.is_none(),
            is_new: options.badges && settings.highlight_new_employees && employee.is_new_employee,
            report_badge,
            expand_glyph,
            highlighted: settings.search_highlight && options.highlighted == Some(id),
            name: label(&employee.name, NAME_LIMIT),
            title: label(&employee.title, DETAIL_LIMIT),
            department,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub key: String,
    pub node: NodeId,
    pub depth: usize,
    pub position: Point,
    pub decoration: NodeDecoration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneLink {
    pub key: String,
    pub path: ElbowPath,
}

/// Self-contained and independent of any viewport transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub orientation: Orientation,
    pub config: LayoutConfig,
    pub nodes: Vec<SceneNode>,
    pub links: Vec<SceneLink>,
}

impl Scene {
    pub fn build(
        tree: &OrgTree,
        layout: &TreeLayout,
        config: &LayoutConfig,
        options: &SceneOptions<'_>,
    ) -> Result<Self> {
        if layout.nodes.is_empty() {
            return Err(Error::EmptyScene);
        }
        let nodes = layout
            .nodes
            .iter()
            .map(|n| SceneNode {
                key: n.employee_id.clone(),
                node: n.node,
                depth: n.depth,
                position: n.position(),
                decoration: NodeDecoration::for_node(tree, n.node, options),
            })
            .collect();
        let positions = layout.positions();
        let position = |id: NodeId| positions.get(&id).copied().unwrap_or(Point::ORIGIN);
        let links = layout
            .links
            .iter()
            .map(|l| SceneLink {
                key: l.key.clone(),
                path: ElbowPath::new(
                    position(l.source),
                    position(l.target),
                    layout.orientation,
                    config,
                ),
            })
            .collect();
        Ok(Self {
            orientation: layout.orientation,
            config: *config,
            nodes,
            links,
        })
    }

    /// Extent of the node rectangles, without padding.
    pub fn content_bounds(&self) -> Bounds {
        let (hw, hh) = (self.config.half_width(), self.config.half_height());
        Bounds::from_points(self.nodes.iter().flat_map(|n| {
            [
                (n.position.x - hw, n.position.y - hh),
                (n.position.x + hw, n.position.y + hh),
            ]
        }))
        .unwrap_or(Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
        })
    }

    pub fn node(&self, key: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use orgchart_core::Employee;

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_label("Short", 22), "Short");
        assert_eq!(
            truncate_label("Maximilian Alexander Montgomery", 22),
            "Maximilian Alexander M..."
        );
        assert_eq!(truncate_label("Zoë Ångström-Ødegård", 5), "Zoë Å...");
    }

    #[test]
    fn badge_is_capped() {
        assert_eq!(report_badge(7), "7");
        assert_eq!(report_badge(99), "99");
        assert_eq!(report_badge(100), "99+");
    }

    fn tree() -> OrgTree {
        let mut newbie = Employee::new("n", "Nina New", "Analyst");
        newbie.is_new_employee = true;
        OrgTree::build(
            Employee::new("r", "Root", "CEO")
                .with_department("Executive")
                .with_children(vec![
                    Employee::new("m", "Manager", "Lead").with_children(vec![newbie]),
                    Employee::new("x", "Solo", "IC"),
                ]),
        )
    }

    #[test]
    fn live_decorations() {
        let mut tree = tree();
        let m = tree.get("m").unwrap();
        tree.toggle(m);
        let settings = ChartSettings::default();
        let config = LayoutConfig::default();
        let layout = compute_layout(&tree, Orientation::Vertical, &config);
        let scene = Scene::build(&tree, &layout, &config, &SceneOptions::live(&settings, Some(m)))
            .unwrap();

        let root = &scene.node("r").unwrap().decoration;
        assert!(root.is_root);
        assert_eq!(root.fill, "#90EE90");
        assert_eq!(root.report_badge.as_deref(), Some("2"));
        assert_eq!(root.expand_glyph, Some('-'));

        let manager = &scene.node("m").unwrap().decoration;
        assert_eq!(manager.expand_glyph, Some('+'));
        assert_eq!(manager.report_badge.as_deref(), Some("1"));
        assert!(manager.highlighted);
        assert_eq!(manager.department.as_deref(), Some(NO_DEPARTMENT));

        let solo = &scene.node("x").unwrap().decoration;
        assert_eq!(solo.expand_glyph, None);
        assert_eq!(solo.report_badge, None);
        assert!(scene.node("n").is_none());
    }

    #[test]
    fn export_decorations_are_plain() {
        let tree = tree();
        let settings = ChartSettings::default();
        let config = LayoutConfig::default();
        let layout = compute_layout(&tree, Orientation::Vertical, &config);
        let scene =
            Scene::build(&tree, &layout, &config, &SceneOptions::export(&settings)).unwrap();
        let newbie = &scene.node("n").unwrap().decoration;
        assert!(!newbie.is_new);
        assert_eq!(newbie.expand_glyph, None);
        assert_eq!(newbie.department, None);
        assert_eq!(scene.links.len(), 3);
    }

    #[test]
    fn wide_tree_links_connect_each_report_to_its_box() {
        let reports = (0..2000)
            .map(|i| Employee::new(format!("e{i}"), format!("Employee {i}"), "IC"))
            .collect();
        let tree = OrgTree::build(Employee::new("r", "Root", "CEO").with_children(reports));
        let settings = ChartSettings::default();
        let config = LayoutConfig::default();
        let layout = compute_layout(&tree, Orientation::Vertical, &config);
        let scene =
            Scene::build(&tree, &layout, &config, &SceneOptions::export(&settings)).unwrap();

        assert_eq!(scene.links.len(), 2000);
        let root = scene.node("r").unwrap().position;
        for link in &scene.links {
            let child = scene.node(&link.key).unwrap().position;
            assert_eq!(link.path.source().x, root.x);
            assert_eq!(link.path.target().x, child.x);
            assert_eq!(link.path.target().y, child.y - config.half_height());
        }
    }
}
