//! Pan/zoom transform for the live view.
//!
//! Programmatic changes (zoom buttons, reset, fit, centring on a search hit) animate
//! towards their target and must be driven by [`Viewport::tick`]. Direct manipulation
//! (`pan_by`, `zoom_at`) applies at once and cancels any animation in flight.

use crate::animate::{Lerp, Tween};
use crate::model::Bounds;
use crate::svg::fmt;
use orgchart_core::Point;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 3.0;
pub const ZOOM_IN_FACTOR: f64 = 1.2;
pub const ZOOM_OUT_FACTOR: f64 = 0.8;

/// Share of the viewport the fitted content may occupy.
const FIT_MARGIN: f64 = 0.9;

/// Distance of the root from the top edge in the initial transform.
const INITIAL_TOP_OFFSET: f64 = 100.0;

pub const DEFAULT_VIEWPORT_TRANSITION: Duration = Duration::from_millis(750);

/// Screen = layout * scale + translate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub tx: f64,
    pub ty: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            tx: 0.0,
            ty: 0.0,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.tx, p.y * self.scale + self.ty)
    }

    pub fn invert(&self, p: Point) -> Point {
        Point::new((p.x - self.tx) / self.scale, (p.y - self.ty) / self.scale)
    }

    /// Maps `layout_point` onto `screen_point` at `scale`.
    pub fn anchored(layout_point: Point, screen_point: Point, scale: f64) -> Self {
        Self {
            tx: screen_point.x - layout_point.x * scale,
            ty: screen_point.y - layout_point.y * scale,
            scale,
        }
    }

    pub fn to_svg(&self) -> String {
        format!(
            "translate({},{}) scale({})",
            fmt(self.tx),
            fmt(self.ty),
            fmt(self.scale)
        )
    }
}

impl Lerp for Transform {
    fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            tx: self.tx.lerp(to.tx, t),
            ty: self.ty.lerp(to.ty, t),
            scale: self.scale.lerp(to.scale, t),
        }
    }
}

fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

#[derive(Debug, Clone)]
pub struct Viewport {
    width: f64,
    height: f64,
    current: Transform,
    animation: Option<Tween<Transform>>,
    duration: Duration,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        let mut viewport = Self {
            width,
            height,
            current: Transform::default(),
            animation: None,
            duration: DEFAULT_VIEWPORT_TRANSITION,
        };
        viewport.current = viewport.initial_transform();
        viewport
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn screen_center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Root horizontally centred, 100px below the top edge, unscaled.
    pub fn initial_transform(&self) -> Transform {
        Transform {
            tx: self.width / 2.0,
            ty: INITIAL_TOP_OFFSET,
            scale: 1.0,
        }
    }

    /// The transform to draw with right now.
    pub fn transform(&self) -> Transform {
        self.animation
            .as_ref()
            .map(Tween::value)
            .unwrap_or(self.current)
    }

    /// Where the viewport will rest once any running animation finishes.
    pub fn target(&self) -> Transform {
        self.animation
            .as_ref()
            .map(|a| a.to)
            .unwrap_or(self.current)
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        animation.advance(dt);
        self.current = animation.value();
        if animation.is_finished() {
            self.animation = None;
        }
        self.animation.is_some()
    }

    /// Jumps to the end of any running animation.
    pub fn finish(&mut self) {
        if let Some(animation) = self.animation.take() {
            self.current = animation.to;
        }
    }

    fn animate_to(&mut self, mut to: Transform) -> Transform {
        to.scale = clamp_scale(to.scale);
        let from = self.transform();
        self.current = from;
        self.animation = Some(Tween::new(from, to, self.duration));
        to
    }

    fn scale_about_center(&self, factor: f64) -> Transform {
        let from = self.transform();
        let center = self.screen_center();
        let scale = clamp_scale(from.scale * factor);
        Transform::anchored(from.invert(center), center, scale)
    }

    pub fn zoom_in(&mut self) -> Transform {
        let to = self.scale_about_center(ZOOM_IN_FACTOR);
        self.animate_to(to)
    }

    pub fn zoom_out(&mut self) -> Transform {
        let to = self.scale_about_center(ZOOM_OUT_FACTOR);
        self.animate_to(to)
    }

    pub fn reset_zoom(&mut self) -> Transform {
        let to = self.initial_transform();
        self.animate_to(to)
    }

    /// Transform that centres `bounds` and shrinks it to 90% of the viewport if needed.
    /// Content is never scaled up past 1.
    pub fn fit_transform(&self, bounds: &Bounds) -> Transform {
        let (bw, bh) = (bounds.width(), bounds.height());
        if bw <= 0.0 || bh <= 0.0 {
            return self.target();
        }
        let scale = clamp_scale(
            (FIT_MARGIN * self.width / bw)
                .min(FIT_MARGIN * self.height / bh)
                .min(1.0),
        );
        Transform::anchored(bounds.center(), self.screen_center(), scale)
    }

    pub fn fit_to_screen(&mut self, bounds: &Bounds) -> Transform {
        let to = self.fit_transform(bounds);
        self.animate_to(to)
    }

    /// Brings `point` to the middle of the viewport at scale 1.
    pub fn center_on(&mut self, point: Point) -> Transform {
        let to = Transform::anchored(point, self.screen_center(), 1.0);
        self.animate_to(to)
    }

    /// Drag: moves immediately by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let mut t = self.transform();
        self.animation = None;
        t.tx += dx;
        t.ty += dy;
        self.current = t;
    }

    /// Wheel/pinch: scales by `factor` keeping `screen_point` fixed, immediately.
    pub fn zoom_at(&mut self, factor: f64, screen_point: Point) {
        let from = self.transform();
        self.animation = None;
        let scale = clamp_scale(from.scale * factor);
        self.current = Transform::anchored(from.invert(screen_point), screen_point, scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn initial_transform_centers_root_horizontally() {
        let v = Viewport::new(800.0, 600.0);
        assert_eq!(
            v.transform(),
            Transform {
                tx: 400.0,
                ty: 100.0,
                scale: 1.0
            }
        );
    }

    #[test]
    fn fit_never_upscales() {
        let v = Viewport::new(800.0, 600.0);
        let root_only = Bounds::from_points([(-110.0, -40.0), (110.0, 40.0)]).unwrap();
        let t = v.fit_transform(&root_only);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.apply(Point::ORIGIN), Point::new(400.0, 300.0));
    }

    #[test]
    fn fit_shrinks_wide_content() {
        let v = Viewport::new(800.0, 600.0);
        let wide = Bounds::from_points([(-900.0, 0.0), (900.0, 200.0)]).unwrap();
        let t = v.fit_transform(&wide);
        assert!(approx(t.scale, 0.4));
        let c = t.apply(wide.center());
        assert!(approx(c.x, 400.0) && approx(c.y, 300.0));
    }

    #[test]
    fn zoom_is_clamped_and_animated() {
        let mut v = Viewport::new(800.0, 600.0);
        for _ in 0..20 {
            v.zoom_in();
            v.finish();
        }
        assert_eq!(v.transform().scale, MAX_SCALE);

        v.zoom_out();
        assert!(v.is_animating());
        assert_eq!(v.transform().scale, MAX_SCALE);
        assert!(!v.tick(Duration::from_millis(750)));
        assert!(approx(v.transform().scale, 2.4));
    }

    #[test]
    fn zoom_keeps_screen_center_fixed() {
        let mut v = Viewport::new(800.0, 600.0);
        let center = Point::new(400.0, 300.0);
        let under = v.transform().invert(center);
        v.zoom_in();
        v.finish();
        let after = v.transform().apply(under);
        assert!(approx(after.x, 400.0) && approx(after.y, 300.0));
    }

    #[test]
    fn direct_manipulation_cancels_animation() {
        let mut v = Viewport::new(800.0, 600.0);
        v.center_on(Point::new(500.0, 500.0));
        v.tick(Duration::from_millis(100));
        let mid = v.transform();
        v.pan_by(10.0, -5.0);
        assert!(!v.is_animating());
        assert_eq!(v.transform().tx, mid.tx + 10.0);
        assert_eq!(v.transform().ty, mid.ty - 5.0);
    }

    #[test]
    fn center_on_uses_unit_scale() {
        let mut v = Viewport::new(800.0, 600.0);
        v.zoom_at(2.0, Point::new(0.0, 0.0));
        let to = v.center_on(Point::new(240.0, 120.0));
        assert_eq!(to, Transform { tx: 160.0, ty: 180.0, scale: 1.0 });
    }
}
