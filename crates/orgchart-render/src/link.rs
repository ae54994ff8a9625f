//! Orthogonal parent-child connectors.

use crate::model::{LayoutConfig, Orientation};
use crate::svg::fmt_into;
use orgchart_core::Point;
use serde::{Deserialize, Serialize};

/// Four-point right-angle connector: leave the parent, turn at the midpoint between the two
/// levels, turn again, enter the child.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElbowPath {
    pub points: [Point; 4],
}

impl ElbowPath {
    pub fn new(source: Point, target: Point, orientation: Orientation, config: &LayoutConfig) -> Self {
        let points = match orientation {
            Orientation::Vertical => {
                let start = Point::new(source.x, source.y + config.half_height());
                let end = Point::new(target.x, target.y - config.half_height());
                let mid_y = (start.y + end.y) / 2.0;
                [
                    start,
                    Point::new(source.x, mid_y),
                    Point::new(target.x, mid_y),
                    end,
                ]
            }
            Orientation::Horizontal => {
                let start = Point::new(source.x + config.half_width(), source.y);
                let end = Point::new(target.x - config.half_width(), target.y);
                let mid_x = (start.x + end.x) / 2.0;
                [
                    start,
                    Point::new(mid_x, source.y),
                    Point::new(mid_x, target.y),
                    end,
                ]
            }
        };
        Self { points }
    }

    /// Zero-length connector parked at `at`, used for links that grow out of (or shrink into)
    /// a trigger node.
    pub fn collapsed(at: Point, orientation: Orientation, config: &LayoutConfig) -> Self {
        Self::new(at, at, orientation, config)
    }

    pub fn source(&self) -> Point {
        self.points[0]
    }

    pub fn target(&self) -> Point {
        self.points[3]
    }

    /// SVG path data: `M x y L x y L x y L x y`.
    pub fn to_svg_d(&self) -> String {
        let mut out = String::with_capacity(64);
        for (i, p) in self.points.iter().enumerate() {
            out.push_str(if i == 0 { "M " } else { " L " });
            fmt_into(&mut out, p.x);
            out.push(' ');
            fmt_into(&mut out, p.y);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_elbow_turns_halfway_between_boxes() {
        let c = LayoutConfig::default();
        let path = ElbowPath::new(
            Point::new(0.0, 0.0),
            Point::new(-120.0, 120.0),
            Orientation::Vertical,
            &c,
        );
        assert_eq!(path.to_svg_d(), "M 0 40 L 0 60 L -120 60 L -120 80");
    }

    #[test]
    fn horizontal_elbow_is_rotated() {
        let c = LayoutConfig::default();
        let path = ElbowPath::new(
            Point::new(0.0, 0.0),
            Point::new(240.0, 60.0),
            Orientation::Horizontal,
            &c,
        );
        assert_eq!(path.to_svg_d(), "M 110 0 L 120 0 L 120 60 L 130 60");
    }
}
