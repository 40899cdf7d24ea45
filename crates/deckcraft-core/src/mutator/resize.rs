//! Rotation-aware frame resizing shared by vertex drags and create-by-drag.

use crate::geometry::{from_local, to_local};
use crate::graphics::{Frame, GraphicId, GraphicRenderer, VertexRole};
use kurbo::{Point, Vec2};

/// Resize `start` by dragging the handle `role` to `pointer`.
///
/// The opposite vertex (or edge) stays fixed in slide space and the drag is
/// measured in the frame's rotated axes. Width and height never go
/// negative: dragging past the fixed side moves the origin instead. With
/// `keep_square`, a corner drag uses the shorter of the two spans for both
/// sides, and an edge drag makes the other side match, centered.
pub fn resize_frame(start: &Frame, role: VertexRole, pointer: Point, keep_square: bool) -> Frame {
    let (sx, sy) = role.sign();
    let (hw, hh) = (start.width / 2.0, start.height / 2.0);
    let anchor = start.local_to_world(Vec2::new(-sx * hw, -sy * hh));
    let d = to_local(pointer - anchor, start.rotation);

    let span = |sign: f64, delta: f64, half: f64| {
        if sign == 0.0 {
            (-half, half)
        } else {
            (delta.min(0.0), delta.max(0.0))
        }
    };
    let mut span_x = span(sx, d.x, hw);
    let mut span_y = span(sy, d.y, hh);

    if keep_square {
        if role.is_corner() {
            let side = d.x.abs().min(d.y.abs());
            let toward = |delta: f64| if delta < 0.0 { (-side, 0.0) } else { (0.0, side) };
            span_x = toward(d.x);
            span_y = toward(d.y);
        } else if sx == 0.0 {
            let side = span_y.1 - span_y.0;
            span_x = (-side / 2.0, side / 2.0);
        } else {
            let side = span_x.1 - span_x.0;
            span_y = (-side / 2.0, side / 2.0);
        }
    }

    let width = span_x.1 - span_x.0;
    let height = span_y.1 - span_y.0;
    let mid = Vec2::new((span_x.0 + span_x.1) / 2.0, (span_y.0 + span_y.1) / 2.0);
    let center = anchor + from_local(mid, start.rotation);
    Frame::from_center(center, width, height, start.rotation)
}

/// Resize of an existing graphic by one of its vertices.
#[derive(Debug, Clone)]
pub struct VertexGesture {
    snapshot: GraphicRenderer,
    role: VertexRole,
    /// Handle position minus pointer at gesture start.
    grab_offset: Vec2,
}

impl VertexGesture {
    pub(crate) fn new(snapshot: GraphicRenderer, role: VertexRole, pointer: Point) -> Self {
        let handle = role.position_on(&snapshot.frame());
        Self {
            snapshot,
            role,
            grab_offset: handle - pointer,
        }
    }

    pub fn graphic_id(&self) -> GraphicId {
        self.snapshot.id()
    }

    pub fn role(&self) -> VertexRole {
        self.role
    }

    /// The frame the graphic takes for this pointer position.
    pub fn frame_at(&self, pointer: Point, keep_square: bool) -> Frame {
        resize_frame(
            &self.snapshot.frame(),
            self.role,
            pointer + self.grab_offset,
            keep_square,
        )
    }

    /// Resize `graphic` from its state at gesture start.
    pub fn update(&self, graphic: &mut GraphicRenderer, pointer: Point, keep_square: bool) -> Frame {
        let frame = self.frame_at(pointer, keep_square);
        graphic.copy_geometry_from(&self.snapshot);
        graphic.set_frame(frame);
        frame
    }

    pub fn finish(self) -> GraphicId {
        log::debug!("Vertex resize of {} finished", self.graphic_id());
        self.graphic_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::Rectangle;

    fn assert_frame(frame: Frame, x: f64, y: f64, w: f64, h: f64) {
        assert!((frame.origin.x - x).abs() < 1e-9, "x {} != {x}", frame.origin.x);
        assert!((frame.origin.y - y).abs() < 1e-9, "y {} != {y}", frame.origin.y);
        assert!((frame.width - w).abs() < 1e-9, "w {} != {w}", frame.width);
        assert!((frame.height - h).abs() < 1e-9, "h {} != {h}", frame.height);
    }

    #[test]
    fn test_corner_drag() {
        let start = Frame::new(Point::new(0.0, 0.0), 100.0, 50.0, 0.0);
        let frame = resize_frame(&start, VertexRole::BottomRight, Point::new(150.0, 80.0), false);
        assert_frame(frame, 0.0, 0.0, 150.0, 80.0);
    }

    #[test]
    fn test_crossing_moves_origin() {
        let start = Frame::new(Point::new(0.0, 0.0), 100.0, 50.0, 0.0);
        let frame = resize_frame(&start, VertexRole::BottomRight, Point::new(-20.0, -10.0), false);
        assert_frame(frame, -20.0, -10.0, 20.0, 10.0);
        assert!(frame.width >= 0.0 && frame.height >= 0.0);
    }

    #[test]
    fn test_edge_drag_keeps_other_axis() {
        let start = Frame::new(Point::new(0.0, 0.0), 100.0, 50.0, 0.0);
        let frame = resize_frame(&start, VertexRole::Left, Point::new(-30.0, 999.0), false);
        assert_frame(frame, -30.0, 0.0, 130.0, 50.0);
    }

    #[test]
    fn test_keep_square_corner() {
        let start = Frame::new(Point::new(10.0, 10.0), 0.0, 0.0, 0.0);
        let frame = resize_frame(&start, VertexRole::BottomRight, Point::new(110.0, 160.0), true);
        assert_frame(frame, 10.0, 10.0, 100.0, 100.0);
        let frame = resize_frame(&start, VertexRole::BottomRight, Point::new(-40.0, 160.0), true);
        assert_frame(frame, -40.0, 10.0, 50.0, 50.0);
    }

    #[test]
    fn test_keep_square_edge() {
        let start = Frame::new(Point::new(0.0, 0.0), 100.0, 50.0, 0.0);
        let frame = resize_frame(&start, VertexRole::Bottom, Point::new(0.0, 80.0), true);
        assert_frame(frame, 10.0, 0.0, 80.0, 80.0);
    }

    #[test]
    fn test_rotated_edge_drag_uses_local_axis() {
        // Right edge of a box turned a quarter turn points down on screen
        let start = Frame::new(Point::new(0.0, 0.0), 100.0, 50.0, 90.0);
        let handle = VertexRole::Right.position_on(&start);
        assert!((handle.x - 50.0).abs() < 1e-9);
        assert!((handle.y - 75.0).abs() < 1e-9);
        let frame = resize_frame(&start, VertexRole::Right, Point::new(50.0, 95.0), false);
        assert!((frame.width - 120.0).abs() < 1e-9);
        assert!((frame.height - 50.0).abs() < 1e-9);
        // The fixed left edge stays put in slide space
        let left = VertexRole::Left.position_on(&frame);
        assert!((left.x - 50.0).abs() < 1e-9);
        assert!((left.y - -25.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_invariance() {
        for rotation in [0.0, 30.0, 90.0, 145.0, 270.0] {
            let start = Frame::new(Point::new(20.0, 30.0), 80.0, 40.0, rotation);
            let handle = VertexRole::Bottom.position_on(&start);
            // Drag 10 units outward along the local +y axis
            let outward = from_local(Vec2::new(0.0, 10.0), rotation);
            let frame = resize_frame(&start, VertexRole::Bottom, handle + outward, false);
            assert!((frame.height - 50.0).abs() < 1e-9);
            assert!((frame.width - 80.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_gesture_is_idempotent() {
        let mut graphic: GraphicRenderer = Rectangle::new(Point::new(0.0, 0.0), 100.0, 50.0).into();
        let gesture = VertexGesture::new(graphic.clone(), VertexRole::BottomRight, Point::new(100.0, 50.0));
        let first = gesture.update(&mut graphic, Point::new(130.0, 70.0), false);
        gesture.update(&mut graphic, Point::new(10.0, 400.0), false);
        let again = gesture.update(&mut graphic, Point::new(130.0, 70.0), false);
        assert_eq!(first, again);
        assert_eq!(graphic.frame(), first);
    }

    #[test]
    fn test_gesture_respects_grab_offset() {
        let mut graphic: GraphicRenderer = Rectangle::new(Point::new(0.0, 0.0), 100.0, 50.0).into();
        // Grabbed 3 units left of the handle
        let gesture = VertexGesture::new(graphic.clone(), VertexRole::Right, Point::new(97.0, 25.0));
        let frame = gesture.update(&mut graphic, Point::new(97.0, 25.0), false);
        assert!((frame.width - 100.0).abs() < 1e-9);
    }
}
