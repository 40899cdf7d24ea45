//! Cubic Bézier curve graphic built from anchors.

use super::{Frame, GraphicId, GraphicKind, GraphicStyle, GraphicTrait};
use crate::geometry::{bounds_of, reflect};
use kurbo::{Affine, BezPath, ParamCurveNearest, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Below this size a frame axis is treated as collapsed and never rescaled.
const EPS: f64 = 1e-9;

/// How editing one control handle affects the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorMode {
    /// The opposite handle is kept reflected through the anchor point.
    Symmetric,
    /// Handles move independently.
    #[default]
    Free,
}

/// Which part of an anchor is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorRole {
    Point,
    HandleIn,
    HandleOut,
}

/// An on-curve point with its two control handles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    pub point: Point,
    pub handle_in: Point,
    pub handle_out: Point,
    #[serde(default)]
    pub mode: AnchorMode,
}

impl Anchor {
    /// A corner anchor with both handles collapsed onto the point.
    pub fn new(point: Point) -> Self {
        Self {
            point,
            handle_in: point,
            handle_out: point,
            mode: AnchorMode::Free,
        }
    }

    /// A smooth anchor whose incoming handle mirrors `handle_out`.
    pub fn symmetric(point: Point, handle_out: Point) -> Self {
        Self {
            point,
            handle_in: reflect(handle_out, point),
            handle_out,
            mode: AnchorMode::Symmetric,
        }
    }

    pub fn get(&self, role: AnchorRole) -> Point {
        match role {
            AnchorRole::Point => self.point,
            AnchorRole::HandleIn => self.handle_in,
            AnchorRole::HandleOut => self.handle_out,
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.point += delta;
        self.handle_in += delta;
        self.handle_out += delta;
    }

    /// Move the on-curve point, carrying both handles along.
    pub fn set_point(&mut self, point: Point) {
        let delta = point - self.point;
        self.translate(delta);
    }

    /// Move one part of the anchor. Moving a handle of a symmetric anchor
    /// mirrors the other one.
    pub fn set(&mut self, role: AnchorRole, position: Point) {
        match role {
            AnchorRole::Point => self.set_point(position),
            AnchorRole::HandleIn => {
                self.handle_in = position;
                if self.mode == AnchorMode::Symmetric {
                    self.handle_out = reflect(position, self.point);
                }
            }
            AnchorRole::HandleOut => {
                self.handle_out = position;
                if self.mode == AnchorMode::Symmetric {
                    self.handle_in = reflect(position, self.point);
                }
            }
        }
    }

    fn map(&self, f: impl Fn(Point) -> Point) -> Self {
        Self {
            point: f(self.point),
            handle_in: f(self.handle_in),
            handle_out: f(self.handle_out),
            mode: self.mode,
        }
    }
}

/// A multi-anchor cubic Bézier curve.
///
/// Anchor positions are unrotated slide coordinates; `rotation` turns the
/// whole curve about the center of its bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub(crate) id: GraphicId,
    pub anchors: Vec<Anchor>,
    /// Rotation in degrees (around center).
    pub rotation: f64,
    pub style: GraphicStyle,
}

impl Curve {
    pub fn new(anchors: Vec<Anchor>) -> Self {
        Self {
            id: Uuid::new_v4(),
            anchors,
            rotation: 0.0,
            style: GraphicStyle {
                fill_color: None,
                ..GraphicStyle::default()
            },
        }
    }

    pub(crate) fn reconstruct(
        id: GraphicId,
        anchors: Vec<Anchor>,
        rotation: f64,
        style: GraphicStyle,
    ) -> Self {
        Self {
            id,
            anchors,
            rotation,
            style,
        }
    }

    pub fn with_style(mut self, style: GraphicStyle) -> Self {
        self.style = style;
        self
    }

    /// Whether the curve has enough anchors to be kept.
    pub fn is_degenerate(&self) -> bool {
        self.anchors.len() < 2
    }

    /// Switch every anchor to `mode`.
    pub fn set_mode(&mut self, mode: AnchorMode) {
        for anchor in &mut self.anchors {
            anchor.mode = mode;
        }
    }

    /// The path before rotation is applied.
    pub fn local_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut anchors = self.anchors.iter();
        let Some(first) = anchors.next() else {
            return path;
        };
        path.move_to(first.point);
        let mut prev = first;
        for anchor in anchors {
            path.curve_to(prev.handle_out, anchor.handle_in, anchor.point);
            prev = anchor;
        }
        path
    }

    fn local_bounds(&self) -> Rect {
        if self.anchors.len() >= 2 {
            self.local_path().bounding_box()
        } else {
            bounds_of(self.anchors.iter().map(|a| a.point)).unwrap_or(Rect::ZERO)
        }
    }

    /// Maps anchor coordinates to slide coordinates.
    pub fn frame_transform(&self) -> Affine {
        self.frame().transform()
    }

    /// Replace anchor `index` without moving the rest of the curve on the
    /// slide. The edit can shift the bounds center the rotation turns
    /// about, so the anchors are translated to cancel that shift.
    pub fn replace_anchor(&mut self, index: usize, anchor: Anchor) -> bool {
        if index >= self.anchors.len() {
            return false;
        }
        let before = self.frame_transform() * Point::ZERO;
        self.anchors[index] = anchor;
        let after = self.frame_transform() * Point::ZERO;
        let shift = before - after;
        for anchor in &mut self.anchors {
            anchor.translate(shift);
        }
        true
    }

    /// Slide position of one part of an anchor, rotation applied.
    pub fn anchor_position(&self, index: usize, role: AnchorRole) -> Option<Point> {
        let anchor = self.anchors.get(index)?;
        Some(self.frame_transform() * anchor.get(role))
    }
}

impl GraphicTrait for Curve {
    fn id(&self) -> GraphicId {
        self.id
    }

    fn kind(&self) -> GraphicKind {
        GraphicKind::Curve
    }

    fn frame(&self) -> Frame {
        let rect = self.local_bounds();
        Frame::new(rect.origin(), rect.width(), rect.height(), self.rotation)
    }

    /// Rescale the anchors from the current bounds into `frame`.
    fn set_frame(&mut self, frame: Frame) {
        let old = self.frame();
        let sx = if old.width > EPS { frame.width / old.width } else { 1.0 };
        let sy = if old.height > EPS { frame.height / old.height } else { 1.0 };
        let map = |p: Point| {
            Point::new(
                frame.origin.x + (p.x - old.origin.x) * sx,
                frame.origin.y + (p.y - old.origin.y) * sy,
            )
        };
        for anchor in &mut self.anchors {
            *anchor = anchor.map(&map);
        }
        self.rotation = frame.rotation;
    }

    fn translate(&mut self, delta: Vec2) {
        for anchor in &mut self.anchors {
            anchor.translate(delta);
        }
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let local = self.frame().transform().inverse() * point;
        let reach = tolerance + self.style.stroke_width / 2.0;
        if self.anchors.len() == 1 {
            return self.anchors[0].point.distance(local) <= reach;
        }
        self.local_path()
            .segments()
            .any(|seg| seg.nearest(local, 1e-3).distance_sq.sqrt() <= reach)
    }

    fn to_path(&self) -> BezPath {
        let mut path = self.local_path();
        path.apply_affine(self.frame().transform());
        path
    }

    fn style(&self) -> &GraphicStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut GraphicStyle {
        &mut self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight() -> Curve {
        Curve::new(vec![
            Anchor::new(Point::new(0.0, 0.0)),
            Anchor::new(Point::new(100.0, 50.0)),
        ])
    }

    #[test]
    fn test_symmetric_anchor_reflects() {
        let anchor = Anchor::symmetric(Point::new(10.0, 10.0), Point::new(20.0, 15.0));
        assert_eq!(anchor.handle_in, Point::new(0.0, 5.0));
    }

    #[test]
    fn test_free_handle_moves_alone() {
        let mut anchor = Anchor::symmetric(Point::new(10.0, 10.0), Point::new(20.0, 10.0));
        anchor.mode = AnchorMode::Free;
        anchor.set(AnchorRole::HandleOut, Point::new(10.0, 30.0));
        assert_eq!(anchor.handle_in, Point::new(0.0, 10.0));
        assert_eq!(anchor.handle_out, Point::new(10.0, 30.0));
    }

    #[test]
    fn test_symmetric_handle_mirrors() {
        let mut anchor = Anchor::symmetric(Point::new(10.0, 10.0), Point::new(20.0, 10.0));
        anchor.set(AnchorRole::HandleIn, Point::new(10.0, 0.0));
        assert_eq!(anchor.handle_out, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_point_carries_handles() {
        let mut anchor = Anchor::symmetric(Point::new(10.0, 10.0), Point::new(20.0, 10.0));
        anchor.set(AnchorRole::Point, Point::new(15.0, 15.0));
        assert_eq!(anchor.handle_out, Point::new(25.0, 15.0));
        assert_eq!(anchor.handle_in, Point::new(5.0, 15.0));
    }

    #[test]
    fn test_frame_is_path_bounds() {
        let frame = straight().frame();
        assert!((frame.width - 100.0).abs() < 1e-9);
        assert!((frame.height - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_frame_rescales() {
        let mut curve = straight();
        let frame = Frame::new(Point::new(10.0, 10.0), 200.0, 100.0, 0.0);
        curve.set_frame(frame);
        assert_eq!(curve.anchors[0].point, Point::new(10.0, 10.0));
        assert_eq!(curve.anchors[1].point, Point::new(210.0, 110.0));
    }

    #[test]
    fn test_hit_test_near_segment() {
        let curve = straight();
        assert!(curve.hit_test(Point::new(50.0, 26.0), 2.0));
        assert!(!curve.hit_test(Point::new(50.0, 0.0), 2.0));
    }

    #[test]
    fn test_degenerate() {
        assert!(Curve::new(vec![Anchor::new(Point::ZERO)]).is_degenerate());
        assert!(!straight().is_degenerate());
    }
}
