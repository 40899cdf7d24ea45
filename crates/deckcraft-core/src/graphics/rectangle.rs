//! Rectangle graphic.

use super::{Frame, GraphicId, GraphicKind, GraphicStyle, GraphicTrait, box_hit_test};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use uuid::Uuid;

/// A rectangle, optionally rotated about its center.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub(crate) id: GraphicId,
    /// Top-left corner of the unrotated box.
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees (around center).
    pub rotation: f64,
    pub style: GraphicStyle,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            width,
            height,
            rotation: 0.0,
            style: GraphicStyle::default(),
        }
    }

    /// Reconstruct a rectangle with a specific ID (for the store model).
    pub(crate) fn reconstruct(
        id: GraphicId,
        origin: Point,
        width: f64,
        height: f64,
        rotation: f64,
        style: GraphicStyle,
    ) -> Self {
        Self {
            id,
            origin,
            width,
            height,
            rotation,
            style,
        }
    }

    /// Create a rectangle from two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let rect = Rect::from_points(p1, p2);
        Self::new(rect.origin(), rect.width(), rect.height())
    }

    pub fn with_style(mut self, style: GraphicStyle) -> Self {
        self.style = style;
        self
    }
}

impl GraphicTrait for Rectangle {
    fn id(&self) -> GraphicId {
        self.id
    }

    fn kind(&self) -> GraphicKind {
        GraphicKind::Rectangle
    }

    fn frame(&self) -> Frame {
        Frame::new(self.origin, self.width, self.height, self.rotation)
    }

    fn set_frame(&mut self, frame: Frame) {
        self.origin = frame.origin;
        self.width = frame.width;
        self.height = frame.height;
        self.rotation = frame.rotation;
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        box_hit_test(&self.frame(), &self.style, point, tolerance)
    }

    fn to_path(&self) -> BezPath {
        let frame = self.frame();
        let mut path = frame.rect().to_path(0.1);
        path.apply_affine(frame.transform());
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
    use crate::graphics::RgbaColor;

    #[test]
    fn test_rectangle_creation() {
        let rect = Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0);
        assert!((rect.origin.x - 10.0).abs() < f64::EPSILON);
        assert!((rect.origin.y - 20.0).abs() < f64::EPSILON);
        assert!((rect.width - 100.0).abs() < f64::EPSILON);
        assert!((rect.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rectangle_from_corners() {
        let rect = Rectangle::from_corners(Point::new(100.0, 100.0), Point::new(50.0, 50.0));
        assert!((rect.origin.x - 50.0).abs() < f64::EPSILON);
        assert!((rect.origin.y - 50.0).abs() < f64::EPSILON);
        assert!((rect.width - 50.0).abs() < f64::EPSILON);
        assert!((rect.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_filled() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        assert!(rect.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(!rect.hit_test(Point::new(150.0, 50.0), 0.0));
        assert!(rect.hit_test(Point::new(105.0, 50.0), 10.0)); // Within tolerance
    }

    #[test]
    fn test_hit_test_outline() {
        let style = GraphicStyle {
            fill_color: None,
            stroke_color: RgbaColor::black(),
            stroke_width: 2.0,
        };
        let rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0).with_style(style);
        assert!(!rect.hit_test(Point::new(50.0, 50.0), 2.0));
        assert!(rect.hit_test(Point::new(1.0, 50.0), 2.0));
    }

    #[test]
    fn test_path_follows_rotation() {
        let mut rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 20.0);
        rect.rotation = 90.0;
        let bounds = rect.to_path().bounding_box();
        assert!((bounds.width() - 20.0).abs() < 1e-6);
        assert!((bounds.height() - 100.0).abs() < 1e-6);
    }
}
