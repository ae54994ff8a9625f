use orgchart_core::{NodeId, Point};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Root on top, reports below.
    #[default]
    Vertical,
    /// Root on the left, reports to the right.
    Horizontal,
}

impl std::str::FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vertical" | "tb" | "td" => Ok(Self::Vertical),
            "horizontal" | "lr" => Ok(Self::Horizontal),
            other => Err(format!("unknown orientation: {other}")),
        }
    }
}

/// Node box and spacing geometry shared by layout, links and export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    pub level_height: f64,
    pub sibling_gap: f64,
    /// Distance between neighbouring nodes with different parents, in sibling units.
    pub cousin_separation: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 220.0,
            node_height: 80.0,
            level_height: 120.0,
            sibling_gap: 20.0,
            cousin_separation: 2.0,
        }
    }
}

impl LayoutConfig {
    /// Distance between adjacent siblings along the breadth axis, before the axis swap.
    pub fn breadth_spacing(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.node_width + self.sibling_gap,
            Orientation::Horizontal => self.level_height,
        }
    }

    pub fn depth_spacing(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.level_height,
            Orientation::Horizontal => self.node_width + self.sibling_gap,
        }
    }

    pub fn half_width(&self) -> f64 {
        self.node_width / 2.0
    }

    pub fn half_height(&self) -> f64 {
        self.node_height / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Grows the box by independent amounts on each side.
    pub fn expand(self, left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            min_x: self.min_x - left,
            min_y: self.min_y - top,
            max_x: self.max_x + right,
            max_y: self.max_y + bottom,
        }
    }

    pub fn pad(self, padding: f64) -> Self {
        self.expand(padding, padding, padding, padding)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub node: NodeId,
    pub employee_id: String,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
}

impl LayoutNode {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One visible parent-child edge. Keyed by the child's employee id: every child has
/// exactly one parent, so the key is unique within a layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutLink {
    pub source: NodeId,
    pub target: NodeId,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLayout {
    pub orientation: Orientation,
    /// Visible nodes in pre-order.
    pub nodes: Vec<LayoutNode>,
    /// One link per non-root visible node, in the same order.
    pub links: Vec<LayoutLink>,
}

impl TreeLayout {
    pub fn node(&self, employee_id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.employee_id == employee_id)
    }

    /// Node positions keyed by arena id, for lookups that run once per link.
    pub fn positions(&self) -> FxHashMap<NodeId, Point> {
        self.nodes.iter().map(|n| (n.node, n.position())).collect()
    }

    /// Extent of every node rectangle (half extents included).
    pub fn bounds(&self, config: &LayoutConfig) -> Option<Bounds> {
        let (hw, hh) = (config.half_width(), config.half_height());
        Bounds::from_points(
            self.nodes
                .iter()
                .flat_map(|n| [(n.x - hw, n.y - hh), (n.x + hw, n.y + hh)]),
        )
    }
}
