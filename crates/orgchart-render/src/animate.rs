//! Time-based sampling of the transitions a [`RenderDiff`] describes.
//!
//! The animator owns no clock. Callers advance it with [`Animator::tick`] and read the
//! interpolated frame back.

use crate::diff::{LinkTransition, NodeTransition, RenderDiff};
use crate::link::ElbowPath;
use indexmap::IndexMap;
use orgchart_core::Point;
use std::time::Duration;

pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(500);

/// Cubic ease-in-out: slow start, fast middle, slow finish.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f64) -> Self;
}

impl Lerp for Point {
    fn lerp(self, to: Self, t: f64) -> Self {
        Point::lerp(self, to, t)
    }
}

impl Lerp for ElbowPath {
    fn lerp(self, to: Self, t: f64) -> Self {
        let mut points = self.points;
        for (p, q) in points.iter_mut().zip(to.points) {
            *p = p.lerp(q, t);
        }
        Self { points }
    }
}

impl Lerp for f64 {
    fn lerp(self, to: Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    elapsed: Duration,
    duration: Duration,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn value(&self) -> T {
        self.from.lerp(self.to, ease_in_out_cubic(self.progress()))
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[derive(Debug, Clone, Copy)]
struct Track<T> {
    tween: Tween<T>,
    /// Removed once the tween completes.
    exiting: bool,
}

/// Interpolated positions of everything currently on screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub nodes: Vec<(String, Point)>,
    pub links: Vec<(String, ElbowPath)>,
}

#[derive(Debug, Clone)]
pub struct Animator {
    duration: Duration,
    nodes: IndexMap<String, Track<Point>>,
    links: IndexMap<String, Track<ElbowPath>>,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSITION)
    }
}

impl Animator {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            nodes: IndexMap::new(),
            links: IndexMap::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Starts the transitions of `diff`. Anything already in flight restarts from its
    /// currently sampled value rather than from the diff's nominal start.
    pub fn apply(&mut self, diff: &RenderDiff) {
        let nodes = diff.entered.iter().chain(&diff.updated);
        for t in nodes {
            self.start_node(t, false);
        }
        for t in &diff.exited {
            self.start_node(t, true);
        }
        for t in diff.links_entered.iter().chain(&diff.links_updated) {
            self.start_link(t, false);
        }
        for t in &diff.links_exited {
            self.start_link(t, true);
        }
    }

    fn start_node(&mut self, t: &NodeTransition, exiting: bool) {
        let from = self
            .nodes
            .get(&t.key)
            .map(|track| track.tween.value())
            .unwrap_or(t.from);
        self.nodes.insert(
            t.key.clone(),
            Track {
                tween: Tween::new(from, t.to, self.duration),
                exiting,
            },
        );
    }

    fn start_link(&mut self, t: &LinkTransition, exiting: bool) {
        let from = self
            .links
            .get(&t.key)
            .map(|track| track.tween.value())
            .unwrap_or(t.from);
        self.links.insert(
            t.key.clone(),
            Track {
                tween: Tween::new(from, t.to, self.duration),
                exiting,
            },
        );
    }

    /// Advances every transition. Returns `true` while anything is still moving.
    pub fn tick(&mut self, dt: Duration) -> bool {
        for track in self.nodes.values_mut() {
            track.tween.advance(dt);
        }
        for track in self.links.values_mut() {
            track.tween.advance(dt);
        }
        self.nodes.retain(|_, t| !(t.exiting && t.tween.is_finished()));
        self.links.retain(|_, t| !(t.exiting && t.tween.is_finished()));
        !self.is_idle()
    }

    pub fn is_idle(&self) -> bool {
        self.nodes.values().all(|t| t.tween.is_finished())
            && self.links.values().all(|t| t.tween.is_finished())
    }

    pub fn node_position(&self, key: &str) -> Option<Point> {
        self.nodes.get(key).map(|t| t.tween.value())
    }

    pub fn link_path(&self, key: &str) -> Option<ElbowPath> {
        self.links.get(key).map(|t| t.tween.value())
    }

    pub fn frame(&self) -> Frame {
        Frame {
            nodes: self
                .nodes
                .iter()
                .map(|(k, t)| (k.clone(), t.tween.value()))
                .collect(),
            links: self
                .links
                .iter()
                .map(|(k, t)| (k.clone(), t.tween.value()))
                .collect(),
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffRenderer;
    use crate::model::Orientation;
    use orgchart_core::{Employee, OrgTree};

    #[test]
    fn easing_is_symmetric() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.25) + ease_in_out_cubic(0.75) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn exits_are_dropped_when_finished() {
        let mut tree = OrgTree::build(
            Employee::new("r", "R", "").with_children(vec![Employee::new("a", "A", "")]),
        );
        let mut renderer = DiffRenderer::default();
        let mut animator = Animator::default();
        let root = tree.root();
        animator.apply(&renderer.update(&mut tree, root, Orientation::Vertical));
        assert!(!animator.tick(Duration::from_millis(500)));
        assert_eq!(animator.node_position("a"), Some(Point::new(0.0, 120.0)));

        tree.toggle(root);
        animator.apply(&renderer.update(&mut tree, root, Orientation::Vertical));
        assert!(animator.tick(Duration::from_millis(250)));
        assert!(animator.node_position("a").is_some());
        assert!(!animator.tick(Duration::from_millis(250)));
        assert_eq!(animator.node_position("a"), None);
        assert_eq!(animator.frame().nodes.len(), 1);
    }

    #[test]
    fn interrupted_transition_restarts_from_sampled_value() {
        let mut tree = OrgTree::build(
            Employee::new("r", "R", "").with_children(vec![Employee::new("a", "A", "")]),
        );
        let mut renderer = DiffRenderer::default();
        let mut animator = Animator::default();
        let root = tree.root();
        animator.apply(&renderer.update(&mut tree, root, Orientation::Vertical));
        animator.tick(Duration::from_millis(250));
        let midway = animator.node_position("a").unwrap();
        assert_eq!(midway, Point::new(0.0, 60.0));

        animator.apply(&renderer.update(&mut tree, root, Orientation::Horizontal));
        assert_eq!(animator.node_position("a"), Some(midway));
        animator.tick(Duration::from_millis(500));
        assert_eq!(animator.node_position("a"), Some(Point::new(240.0, 0.0)));
    }
}
