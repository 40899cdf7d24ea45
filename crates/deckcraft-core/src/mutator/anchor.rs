//! Curve anchor editing.

use crate::geometry::to_local;
use crate::graphics::{Anchor, AnchorRole, GraphicId, GraphicRenderer};
use kurbo::Point;

/// Drag of one point or handle of a curve anchor.
///
/// Moving the point carries both handles. Moving a handle of a free anchor
/// moves only that handle; on a symmetric anchor the other one mirrors it.
/// The rest of the curve stays where it was on the slide, rotated or not.
#[derive(Debug, Clone)]
pub struct AnchorGesture {
    graphic_id: GraphicId,
    index: usize,
    role: AnchorRole,
    start: Anchor,
    start_anchors: Vec<Anchor>,
    start_pointer: Point,
    rotation: f64,
}

impl AnchorGesture {
    pub(crate) fn new(
        snapshot: &GraphicRenderer,
        index: usize,
        role: AnchorRole,
        pointer: Point,
    ) -> Option<Self> {
        let curve = snapshot.as_curve()?;
        let start = *curve.anchors.get(index)?;
        log::debug!("Anchor {index} {role:?} edit of {} started", curve.id);
        Some(Self {
            graphic_id: curve.id,
            index,
            role,
            start,
            start_anchors: curve.anchors.clone(),
            start_pointer: pointer,
            rotation: curve.rotation,
        })
    }

    pub fn graphic_id(&self) -> GraphicId {
        self.graphic_id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn role(&self) -> AnchorRole {
        self.role
    }

    /// The edited anchor for this pointer position.
    pub fn anchor_at(&self, pointer: Point) -> Anchor {
        let delta = to_local(pointer - self.start_pointer, self.rotation);
        let mut anchor = self.start;
        anchor.set(self.role, self.start.get(self.role) + delta);
        anchor
    }

    /// Apply to `graphic`. Returns false if it is no longer a curve with
    /// this anchor.
    pub fn update(&self, graphic: &mut GraphicRenderer, pointer: Point) -> bool {
        let anchor = self.anchor_at(pointer);
        let Some(curve) = graphic.as_curve_mut() else {
            return false;
        };
        if curve.anchors.len() != self.start_anchors.len() {
            return false;
        }
        curve.anchors.clone_from(&self.start_anchors);
        curve.replace_anchor(self.index, anchor)
    }

    pub fn finish(self) -> GraphicId {
        log::debug!("Anchor edit of {} finished", self.graphic_id);
        self.graphic_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{AnchorMode, Curve, Rectangle};
    use crate::mutator::Mutator;
    use kurbo::Vec2;

    fn curve() -> GraphicRenderer {
        let mut curve = Curve::new(vec![
            Anchor::symmetric(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            Anchor::symmetric(Point::new(100.0, 0.0), Point::new(110.0, 0.0)),
        ]);
        curve.set_mode(AnchorMode::Free);
        curve.into()
    }

    #[test]
    fn test_point_drag_carries_handles() {
        let mut graphic = curve();
        let gesture = Mutator::new(&graphic)
            .anchor_handler(1, AnchorRole::Point, Point::new(100.0, 0.0))
            .unwrap();
        assert!(gesture.update(&mut graphic, Point::new(100.0, 20.0)));
        let anchor = graphic.as_curve().unwrap().anchors[1];
        assert_eq!(anchor.point, Point::new(100.0, 20.0));
        assert_eq!(anchor.handle_in, Point::new(90.0, 20.0));
        assert_eq!(anchor.handle_out, Point::new(110.0, 20.0));
    }

    #[test]
    fn test_free_handle_drag_moves_one_handle() {
        let mut graphic = curve();
        let gesture = Mutator::new(&graphic)
            .anchor_handler(0, AnchorRole::HandleOut, Point::new(10.0, 0.0))
            .unwrap();
        gesture.update(&mut graphic, Point::new(10.0, 30.0));
        let anchor = graphic.as_curve().unwrap().anchors[0];
        assert_eq!(anchor.handle_out, Point::new(10.0, 30.0));
        assert_eq!(anchor.handle_in, Point::new(-10.0, 0.0));
    }

    #[test]
    fn test_symmetric_handle_drag_mirrors() {
        let mut graphic: GraphicRenderer = Curve::new(vec![
            Anchor::symmetric(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
            Anchor::new(Point::new(100.0, 0.0)),
        ])
        .into();
        let gesture = Mutator::new(&graphic)
            .anchor_handler(0, AnchorRole::HandleOut, Point::new(10.0, 0.0))
            .unwrap();
        gesture.update(&mut graphic, Point::new(10.0, 10.0));
        let anchor = graphic.as_curve().unwrap().anchors[0];
        assert_eq!(anchor.handle_in, Point::new(-10.0, -10.0));
    }

    fn assert_near(actual: Point, expected: Point) {
        assert!(actual.distance(expected) < 1e-9, "{actual:?} != {expected:?}");
    }

    #[test]
    fn test_rotated_curve_edit_keeps_other_anchors() {
        let mut curve = Curve::new(vec![Anchor::new(Point::new(0.0, 0.0)), Anchor::new(Point::new(100.0, 0.0))]);
        curve.rotation = 90.0;
        let mut graphic: GraphicRenderer = curve.into();
        let position = |g: &GraphicRenderer, index| g.as_curve().unwrap().anchor_position(index, AnchorRole::Point).unwrap();
        let first = position(&graphic, 0);
        let grabbed = position(&graphic, 1);
        let target = grabbed + Vec2::new(40.0, 0.0);

        let gesture = Mutator::new(&graphic)
            .anchor_handler(1, AnchorRole::Point, grabbed)
            .unwrap();
        assert!(gesture.update(&mut graphic, target));
        assert_near(position(&graphic, 0), first);
        assert_near(position(&graphic, 1), target);

        // Repeating the same pointer position does not drift
        let once = graphic.clone();
        gesture.update(&mut graphic, grabbed + Vec2::new(10.0, 10.0));
        gesture.update(&mut graphic, target);
        assert_eq!(graphic, once);
    }

    #[test]
    fn test_rotated_curve_handle_lands_under_pointer() {
        let mut curve = Curve::new(vec![
            Anchor::new(Point::new(0.0, 0.0)),
            Anchor::new(Point::new(100.0, 50.0)),
        ]);
        curve.rotation = 30.0;
        let mut graphic: GraphicRenderer = curve.into();
        let handle = |g: &GraphicRenderer| g.as_curve().unwrap().anchor_position(0, AnchorRole::HandleOut).unwrap();
        let other = graphic.as_curve().unwrap().anchor_position(1, AnchorRole::Point).unwrap();
        let grabbed = handle(&graphic);
        let target = grabbed + Vec2::new(-20.0, 35.0);

        let gesture = Mutator::new(&graphic)
            .anchor_handler(0, AnchorRole::HandleOut, grabbed)
            .unwrap();
        gesture.update(&mut graphic, target);
        assert_near(handle(&graphic), target);
        assert_near(graphic.as_curve().unwrap().anchor_position(1, AnchorRole::Point).unwrap(), other);
    }

    #[test]
    fn test_not_available_for_other_graphics() {
        let rect: GraphicRenderer = Rectangle::new(Point::ZERO, 1.0, 1.0).into();
        assert!(Mutator::new(&rect)
            .anchor_handler(0, AnchorRole::Point, Point::ZERO)
            .is_none());
        assert!(Mutator::new(&curve())
            .anchor_handler(5, AnchorRole::Point, Point::ZERO)
            .is_none());
    }
}
