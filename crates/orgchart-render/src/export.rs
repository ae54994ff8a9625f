//! Static snapshots of the chart: the downloadable document and the printable page.
//!
//! Both are built from their own layout pass and never look at the live viewport.

use crate::layout::compute_layout;
use crate::model::{Bounds, LayoutConfig, Orientation, TreeLayout};
use crate::scene::{Scene, SceneNode, SceneOptions};
use crate::svg::{escape_xml, escape_xml_into, fmt, fmt_into, sanitize_id};
use crate::Result;
use orgchart_core::{ChartSettings, OrgTree, PrintOrientation, PrintSize};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub const EXPORT_PADDING: f64 = 50.0;
pub const PRINT_PADDING: f64 = 20.0;
/// Room under the lowest row for the expand glyph.
pub const PRINT_BOTTOM_PADDING: f64 = 50.0;

const BADGE_RADIUS: f64 = 12.0;
const GLYPH_RADIUS: f64 = 10.0;

const EXPORT_CSS: &str = concat!(
    ".link { fill: none; stroke: #999; stroke-width: 2px; }",
    ".node-rect { stroke-width: 2px; }",
    ".node-rect.new-employee { stroke: #ff6b6b; stroke-width: 3px; }",
    ".search-highlight .node-rect { stroke: #0078d4; stroke-width: 4px; }",
    ".node-text { font-size: 14px; fill: #333; font-weight: 600; font-family: Arial, sans-serif; }",
    ".node-title { font-size: 11px; fill: #555; font-family: Arial, sans-serif; }",
    ".node-department { font-size: 11px; fill: #666; font-style: italic; font-family: Arial, sans-serif; }",
    ".count-badge circle { fill: #ff6b6b; stroke: white; stroke-width: 2px; }",
    ".count-badge text { fill: white; font-size: 11px; font-weight: bold; font-family: Arial, sans-serif; }",
    ".expand-btn { fill: #0078d4; }",
    ".expand-text { fill: white; font-size: 14px; font-weight: bold; font-family: Arial, sans-serif; }",
    ".new-badge { fill: #ff6b6b; }",
    ".new-badge-text { fill: white; font-size: 10px; font-weight: bold; font-family: Arial, sans-serif; }",
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportMode {
    /// Whatever is on screen right now.
    #[default]
    VisibleOnly,
    /// Every node, regardless of collapse state; the tree is restored afterwards.
    FullExpand,
}

/// Page size plus the `viewBox` that maps the content into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintFrame {
    pub page_width: f64,
    pub page_height: f64,
    pub view_box: Bounds,
}

impl PrintFrame {
    pub fn new(content: Bounds, size: PrintSize, orientation: PrintOrientation) -> Self {
        let (page_width, page_height) = size.dimensions(orientation);
        Self {
            page_width,
            page_height,
            view_box: content.expand(
                PRINT_PADDING,
                PRINT_PADDING,
                PRINT_PADDING,
                PRINT_BOTTOM_PADDING,
            ),
        }
    }

    pub fn view_box_attr(&self) -> String {
        view_box_attr(&self.view_box)
    }
}

fn view_box_attr(b: &Bounds) -> String {
    format!(
        "{} {} {} {}",
        fmt(b.min_x),
        fmt(b.min_y),
        fmt(b.width()),
        fmt(b.height())
    )
}

#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: LayoutConfig,
}

impl Exporter {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Builds the export scene. `current` is the live layout, reused for
    /// [`ExportMode::VisibleOnly`] when it matches `orientation`.
    pub fn scene(
        &self,
        tree: &mut OrgTree,
        current: Option<&TreeLayout>,
        orientation: Orientation,
        mode: ExportMode,
        settings: &ChartSettings,
    ) -> Result<Scene> {
        let options = SceneOptions::export(settings);
        match mode {
            ExportMode::VisibleOnly => {
                let layout = match current.filter(|l| l.orientation == orientation) {
                    Some(layout) => layout.clone(),
                    None => compute_layout(tree, orientation, &self.config),
                };
                Scene::build(tree, &layout, &self.config, &options)
            }
            ExportMode::FullExpand => {
                let expanded = tree.force_expand_all();
                let layout = compute_layout(&expanded, orientation, &self.config);
                tracing::info!(
                    nodes = layout.nodes.len(),
                    restored = expanded.restored_on_drop().len(),
                    "exporting fully expanded chart"
                );
                Scene::build(&expanded, &layout, &self.config, &options)
            }
        }
    }

    /// Print always shows the visible set, with truncated labels and expand glyphs.
    pub fn print_scene(
        &self,
        tree: &OrgTree,
        orientation: Orientation,
        settings: &ChartSettings,
    ) -> Result<Scene> {
        let layout = compute_layout(tree, orientation, &self.config);
        Scene::build(tree, &layout, &self.config, &SceneOptions::print(settings))
    }

    /// Standalone SVG sized to the content plus [`EXPORT_PADDING`] on every side, on white.
    pub fn export_svg(&self, scene: &Scene) -> String {
        let b = scene.content_bounds().pad(EXPORT_PADDING);
        let mut out = String::with_capacity(1024 + scene.nodes.len() * 512);
        let _ = write!(
            &mut out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{}">"#,
            fmt(b.width()),
            fmt(b.height()),
            view_box_attr(&b)
        );
        let _ = write!(
            &mut out,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="white"/>"#,
            fmt(b.min_x),
            fmt(b.min_y),
            fmt(b.width()),
            fmt(b.height())
        );
        let _ = write!(&mut out, "<defs><style>{EXPORT_CSS}</style></defs>");
        write_scene(&mut out, scene);
        out.push_str("</svg>\n");
        out
    }

    /// Page-sized SVG, content letterboxed into the page by `xMidYMid meet`.
    pub fn print_svg(&self, scene: &Scene, settings: &ChartSettings) -> (PrintFrame, String) {
        let frame = PrintFrame::new(
            scene.content_bounds(),
            settings.print_size,
            settings.print_orientation,
        );
        let mut out = String::with_capacity(1024 + scene.nodes.len() * 512);
        let _ = write!(
            &mut out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{}" preserveAspectRatio="xMidYMid meet">"#,
            fmt(frame.page_width),
            fmt(frame.page_height),
            frame.view_box_attr()
        );
        out.push_str("<title>");
        escape_xml_into(&mut out, &settings.chart_title);
        out.push_str("</title>");
        let _ = write!(&mut out, "<defs><style>{EXPORT_CSS}</style></defs>");
        write_scene(&mut out, scene);
        out.push_str("</svg>\n");
        (frame, out)
    }
}

/// Links first so boxes paint over them.
pub fn write_scene(out: &mut String, scene: &Scene) {
    out.push_str("<g>");
    for link in &scene.links {
        let _ = write!(
            out,
            r#"<path class="link" data-id="{}" d="{}"/>"#,
            sanitize_id(&link.key),
            link.path.to_svg_d()
        );
    }
    for node in &scene.nodes {
        write_node(out, node, scene);
    }
    out.push_str("</g>");
}

fn write_text(out: &mut String, class: &str, x: f64, y: f64, text: &str) {
    let _ = write!(out, r#"<text class="{class}" x=""#);
    fmt_into(out, x);
    out.push_str(r#"" y=""#);
    fmt_into(out, y);
    out.push_str(r#"" text-anchor="middle">"#);
    escape_xml_into(out, text);
    out.push_str("</text>");
}

fn write_node(out: &mut String, node: &SceneNode, scene: &Scene) {
    let d = &node.decoration;
    let (hw, hh) = (scene.config.half_width(), scene.config.half_height());

    out.push_str(r#"<g class="node"#);
    if d.is_root {
        out.push_str(" ceo");
    }
    if d.highlighted {
        out.push_str(" search-highlight");
    }
    let _ = write!(
        out,
        r#"" data-id="{}" transform="translate({},{})">"#,
        sanitize_id(&node.key),
        fmt(node.position.x),
        fmt(node.position.y)
    );

    let _ = write!(
        out,
        r#"<rect class="node-rect{}" x="{}" y="{}" width="{}" height="{}" rx="4" ry="4" fill="{}" stroke="{}" stroke-width="2"/>"#,
        if d.is_new { " new-employee" } else { "" },
        fmt(-hw),
        fmt(-hh),
        fmt(scene.config.node_width),
        fmt(scene.config.node_height),
        escape_xml(&d.fill),
        escape_xml(&d.stroke)
    );

    write_text(out, "node-text", 0.0, -20.0, &d.name);
    write_text(out, "node-title", 0.0, -5.0, &d.title);
    if let Some(department) = &d.department {
        write_text(out, "node-department", 0.0, 25.0, department);
    }

    if let Some(badge) = &d.report_badge {
        let (cx, cy) = (-hw + 15.0, -hh + 15.0);
        let _ = write!(
            out,
            r#"<g class="count-badge"><circle cx="{}" cy="{}" r="{}"/>"#,
            fmt(cx),
            fmt(cy),
            fmt(BADGE_RADIUS)
        );
        write_text(out, "count-text", cx, cy + 4.0, badge);
        out.push_str("</g>");
    }

    if let Some(glyph) = d.expand_glyph {
        let (cx, cy, ty) = match scene.orientation {
            Orientation::Vertical => (0.0, hh + 10.0, hh + 15.0),
            Orientation::Horizontal => (hw + 10.0, 0.0, 4.0),
        };
        let _ = write!(
            out,
            r#"<g class="expand-group"><circle class="expand-btn" cx="{}" cy="{}" r="{}"/>"#,
            fmt(cx),
            fmt(cy),
            fmt(GLYPH_RADIUS)
        );
        write_text(out, "expand-text", cx, ty, &glyph.to_string());
        out.push_str("</g>");
    }

    if d.is_new {
        let _ = write!(
            out,
            r#"<g class="new-employee-badge"><rect class="new-badge" x="{}" y="{}" width="35" height="18" rx="9" ry="9"/>"#,
            fmt(hw - 45.0),
            fmt(-hh - 10.0)
        );
        write_text(out, "new-badge-text", hw - 27.0, -hh + 2.0, "NEW");
        out.push_str("</g>");
    }

    out.push_str("</g>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgchart_core::{CollapseLevel, Employee};

    fn tree() -> OrgTree {
        OrgTree::build(
            Employee::new("1", "Alice & Co", "CEO").with_children(vec![
                Employee::new("2", "Bob", "CTO")
                    .with_children(vec![Employee::new("3", "Cy", "Engineer")]),
            ]),
        )
    }

    #[test]
    fn full_expand_restores_collapsed_nodes() {
        let mut tree = tree();
        tree.apply_initial_collapse(CollapseLevel::Level(2));
        let before = tree.states();
        let exporter = Exporter::default();
        let scene = exporter
            .scene(
                &mut tree,
                None,
                Orientation::Vertical,
                ExportMode::FullExpand,
                &ChartSettings::default(),
            )
            .unwrap();
        assert_eq!(scene.nodes.len(), 3);
        assert_eq!(tree.states(), before);
        assert!(tree.node_by_employee("2").unwrap().is_collapsed());
    }

    #[test]
    fn visible_only_skips_hidden_nodes() {
        let mut tree = tree();
        tree.apply_initial_collapse(CollapseLevel::Level(2));
        let exporter = Exporter::default();
        let scene = exporter
            .scene(
                &mut tree,
                None,
                Orientation::Vertical,
                ExportMode::VisibleOnly,
                &ChartSettings::default(),
            )
            .unwrap();
        assert_eq!(scene.nodes.len(), 2);
    }

    #[test]
    fn export_svg_is_padded_and_escaped() {
        let mut tree = OrgTree::build(Employee::new("1", "Alice & Co", "CEO"));
        let exporter = Exporter::default();
        let scene = exporter
            .scene(
                &mut tree,
                None,
                Orientation::Vertical,
                ExportMode::VisibleOnly,
                &ChartSettings::default(),
            )
            .unwrap();
        let svg = exporter.export_svg(&scene);
        assert!(svg.starts_with(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="320" height="180" viewBox="-160 -90 320 180">"#
        ));
        assert!(svg.contains("Alice &amp; Co"));
        assert!(!svg.contains("expand-group"));
    }

    #[test]
    fn print_frame_uses_page_table() {
        let tree = tree();
        let settings = ChartSettings::default();
        let exporter = Exporter::default();
        let scene = exporter
            .print_scene(&tree, Orientation::Vertical, &settings)
            .unwrap();
        let (frame, svg) = exporter.print_svg(&scene, &settings);
        assert_eq!((frame.page_width, frame.page_height), (1123.0, 796.0));
        // Content spans x -110..110, y -40..280; padded 20/20/20/50.
        assert_eq!(frame.view_box_attr(), "-130 -60 260 390");
        assert!(svg.contains(r#"preserveAspectRatio="xMidYMid meet""#));
        assert!(svg.contains(r#"<text class="expand-text""#));
    }
}
