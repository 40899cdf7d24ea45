//! Mutators: per-gesture geometry edits of existing graphics.
//!
//! A [`Mutator`] snapshots its target when a gesture begins and hands out
//! gesture structs. Every gesture recomputes the graphic from that snapshot
//! and the current pointer, so repeated updates never accumulate drift.

mod anchor;
mod resize;

pub use anchor::AnchorGesture;
pub use resize::{VertexGesture, resize_frame};

use crate::events::Modifiers;
use crate::geometry::{angle_degrees, normalize_degrees, snap_degrees};
use crate::graphics::{AnchorRole, GraphicId, GraphicRenderer, VertexRole};
use kurbo::{Point, Vec2};

/// Entry point for editing one graphic.
#[derive(Debug, Clone)]
pub struct Mutator {
    snapshot: GraphicRenderer,
}

impl Mutator {
    pub fn new(graphic: &GraphicRenderer) -> Self {
        Self {
            snapshot: graphic.clone(),
        }
    }

    pub fn graphic_id(&self) -> GraphicId {
        self.snapshot.id()
    }

    /// Start moving the whole graphic from `pointer`.
    pub fn graphic_move_handler(&self, pointer: Point) -> MoveGesture {
        log::debug!("Move of {} started", self.graphic_id());
        MoveGesture {
            offset: self.snapshot.reference_point() - pointer,
            start_pointer: pointer,
            snapshot: self.snapshot.clone(),
        }
    }

    /// Start resizing by the vertex `role`, grabbed at `pointer`.
    pub fn init_vertex_move(&self, role: VertexRole, pointer: Point) -> VertexGesture {
        log::debug!("Vertex resize of {} from {role:?} started", self.graphic_id());
        VertexGesture::new(self.snapshot.clone(), role, pointer)
    }

    /// Start rotating about the graphic center. `snap_step` is the
    /// increment (degrees) used while Shift is held.
    pub fn init_rotate(&self, pointer: Point, snap_step: f64) -> RotateGesture {
        log::debug!("Rotation of {} started", self.graphic_id());
        let center = self.snapshot.center();
        RotateGesture {
            graphic_id: self.graphic_id(),
            center,
            start_rotation: self.snapshot.rotation(),
            start_angle: angle_degrees(pointer - center),
            snap_step,
        }
    }

    /// Start editing one point of a curve anchor. `None` for other
    /// graphics or an out-of-range index.
    pub fn anchor_handler(&self, index: usize, role: AnchorRole, pointer: Point) -> Option<AnchorGesture> {
        AnchorGesture::new(&self.snapshot, index, role, pointer)
    }
}

/// Translation of a whole graphic.
#[derive(Debug, Clone)]
pub struct MoveGesture {
    snapshot: GraphicRenderer,
    start_pointer: Point,
    /// Reference point minus pointer at gesture start.
    offset: Vec2,
}

impl MoveGesture {
    pub fn graphic_id(&self) -> GraphicId {
        self.snapshot.id()
    }

    /// Where the reference point goes for this pointer position. Shift locks
    /// the move to the dominant axis.
    pub fn target(&self, position: Point, modifiers: Modifiers) -> Point {
        let mut delta = position - self.start_pointer;
        if modifiers.shift {
            if delta.x.abs() >= delta.y.abs() {
                delta.y = 0.0;
            } else {
                delta.x = 0.0;
            }
        }
        self.start_pointer + delta + self.offset
    }

    /// Move `graphic` so its reference point lands on [`target`](Self::target).
    pub fn update(&self, graphic: &mut GraphicRenderer, position: Point, modifiers: Modifiers) {
        let target = self.target(position, modifiers);
        graphic.copy_geometry_from(&self.snapshot);
        graphic.translate(target - self.snapshot.reference_point());
    }

    /// Whether `position` would leave the graphic where it started.
    pub fn is_noop(&self, position: Point, modifiers: Modifiers) -> bool {
        self.target(position, modifiers) == self.snapshot.reference_point()
    }

    pub fn finish(self) -> GraphicId {
        log::debug!("Move of {} finished", self.graphic_id());
        self.graphic_id()
    }
}

/// Rotation about the graphic center.
#[derive(Debug, Clone, Copy)]
pub struct RotateGesture {
    graphic_id: GraphicId,
    center: Point,
    start_rotation: f64,
    start_angle: f64,
    snap_step: f64,
}

impl RotateGesture {
    pub fn graphic_id(&self) -> GraphicId {
        self.graphic_id
    }

    /// Rotation for this pointer position, in `[0, 360)`.
    pub fn rotation_at(&self, pointer: Point, snap: bool) -> f64 {
        let delta = angle_degrees(pointer - self.center) - self.start_angle;
        let rotation = normalize_degrees(self.start_rotation + delta);
        if snap {
            snap_degrees(rotation, self.snap_step)
        } else {
            rotation
        }
    }

    /// Rotate `graphic` and return the applied delta from its starting
    /// rotation, in `[0, 360)`.
    pub fn update(&self, graphic: &mut GraphicRenderer, pointer: Point, snap: bool) -> f64 {
        let rotation = self.rotation_at(pointer, snap);
        graphic.set_rotation(rotation);
        normalize_degrees(rotation - self.start_rotation)
    }

    pub fn finish(self) -> GraphicId {
        log::debug!("Rotation of {} finished", self.graphic_id);
        self.graphic_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{Anchor, Curve, Ellipse, Rectangle};

    #[test]
    fn test_move_has_no_jump() {
        let mut graphic: GraphicRenderer = Rectangle::new(Point::new(10.0, 10.0), 100.0, 50.0).into();
        let gesture = Mutator::new(&graphic).graphic_move_handler(Point::new(60.0, 30.0));
        gesture.update(&mut graphic, Point::new(60.0, 30.0), Modifiers::NONE);
        assert_eq!(graphic.frame().origin, Point::new(10.0, 10.0));
        gesture.update(&mut graphic, Point::new(70.0, 50.0), Modifiers::NONE);
        assert_eq!(graphic.frame().origin, Point::new(20.0, 30.0));
    }

    #[test]
    fn test_move_tracks_ellipse_center() {
        let mut graphic: GraphicRenderer = Ellipse::new(Point::new(50.0, 50.0), 20.0, 10.0).into();
        let gesture = Mutator::new(&graphic).graphic_move_handler(Point::new(55.0, 50.0));
        gesture.update(&mut graphic, Point::new(105.0, 150.0), Modifiers::NONE);
        assert_eq!(graphic.reference_point(), Point::new(100.0, 150.0));
    }

    #[test]
    fn test_move_shift_locks_axis() {
        let mut graphic: GraphicRenderer = Rectangle::new(Point::new(0.0, 0.0), 10.0, 10.0).into();
        let gesture = Mutator::new(&graphic).graphic_move_handler(Point::new(5.0, 5.0));
        gesture.update(&mut graphic, Point::new(45.0, 15.0), Modifiers::SHIFT);
        assert_eq!(graphic.frame().origin, Point::new(40.0, 0.0));
    }

    #[test]
    fn test_move_curve_is_idempotent() {
        let mut graphic: GraphicRenderer = Curve::new(vec![
            Anchor::new(Point::new(0.0, 0.0)),
            Anchor::symmetric(Point::new(50.0, 50.0), Point::new(70.0, 50.0)),
        ])
        .into();
        let gesture = Mutator::new(&graphic).graphic_move_handler(Point::ZERO);
        gesture.update(&mut graphic, Point::new(13.0, 7.0), Modifiers::NONE);
        let first = graphic.clone();
        gesture.update(&mut graphic, Point::new(-100.0, 3.0), Modifiers::NONE);
        gesture.update(&mut graphic, Point::new(13.0, 7.0), Modifiers::NONE);
        assert_eq!(graphic, first);
        assert!(!gesture.is_noop(Point::new(13.0, 7.0), Modifiers::NONE));
        assert!(gesture.is_noop(Point::ZERO, Modifiers::NONE));
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let mut graphic: GraphicRenderer = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0).into();
        // Start to the right of the center, end below it
        let gesture = Mutator::new(&graphic).init_rotate(Point::new(100.0, 50.0), 15.0);
        let delta = gesture.update(&mut graphic, Point::new(50.0, 100.0), false);
        assert!((delta - 90.0).abs() < 1e-9);
        assert!((graphic.rotation() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_snaps_with_shift() {
        let mut graphic: GraphicRenderer = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0).into();
        let gesture = Mutator::new(&graphic).init_rotate(Point::new(100.0, 50.0), 15.0);
        // About 21.8 degrees
        let pointer = Point::new(100.0, 70.0);
        gesture.update(&mut graphic, pointer, true);
        assert!((graphic.rotation() - 15.0).abs() < 1e-9);
        gesture.update(&mut graphic, pointer, false);
        assert!(graphic.rotation() > 21.0 && graphic.rotation() < 22.0);
    }

    #[test]
    fn test_rotate_counter_clockwise_wraps() {
        let mut graphic: GraphicRenderer = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0).into();
        let gesture = Mutator::new(&graphic).init_rotate(Point::new(100.0, 50.0), 15.0);
        gesture.update(&mut graphic, Point::new(50.0, 0.0), false);
        assert!((graphic.rotation() - 270.0).abs() < 1e-9);
    }
}
