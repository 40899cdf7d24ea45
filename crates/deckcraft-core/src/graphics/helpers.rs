//! Structural helpers drawn around focused graphics: resize vertices, the
//! rotator and curve anchor handles. They are derived from a graphic on
//! demand and never stored in a slide.

use super::{AnchorRole, Frame, GraphicId, GraphicRenderer};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Named resize handle position on a graphic's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VertexRole {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl VertexRole {
    pub const ALL: [VertexRole; 8] = [
        VertexRole::TopLeft,
        VertexRole::Top,
        VertexRole::TopRight,
        VertexRole::Right,
        VertexRole::BottomRight,
        VertexRole::Bottom,
        VertexRole::BottomLeft,
        VertexRole::Left,
    ];

    /// Direction of the handle from the frame center in local axes, each
    /// component -1, 0 or 1. A 0 component means the handle does not
    /// resize along that axis.
    pub fn sign(&self) -> (f64, f64) {
        match self {
            VertexRole::TopLeft => (-1.0, -1.0),
            VertexRole::Top => (0.0, -1.0),
            VertexRole::TopRight => (1.0, -1.0),
            VertexRole::Right => (1.0, 0.0),
            VertexRole::BottomRight => (1.0, 1.0),
            VertexRole::Bottom => (0.0, 1.0),
            VertexRole::BottomLeft => (-1.0, 1.0),
            VertexRole::Left => (-1.0, 0.0),
        }
    }

    pub fn is_corner(&self) -> bool {
        let (sx, sy) = self.sign();
        sx != 0.0 && sy != 0.0
    }

    pub fn opposite(&self) -> VertexRole {
        match self {
            VertexRole::TopLeft => VertexRole::BottomRight,
            VertexRole::Top => VertexRole::Bottom,
            VertexRole::TopRight => VertexRole::BottomLeft,
            VertexRole::Right => VertexRole::Left,
            VertexRole::BottomRight => VertexRole::TopLeft,
            VertexRole::Bottom => VertexRole::Top,
            VertexRole::BottomLeft => VertexRole::TopRight,
            VertexRole::Left => VertexRole::Right,
        }
    }

    /// Slide position of this role on `frame`.
    pub fn position_on(&self, frame: &Frame) -> Point {
        let (sx, sy) = self.sign();
        frame.local_to_world(Vec2::new(sx * frame.width / 2.0, sy * frame.height / 2.0))
    }
}

/// A resize handle of a graphic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub parent: GraphicId,
    pub role: VertexRole,
    pub position: Point,
}

impl Vertex {
    /// All eight handles of `graphic`.
    pub fn of(graphic: &GraphicRenderer) -> Vec<Vertex> {
        let frame = graphic.frame();
        VertexRole::ALL
            .into_iter()
            .map(|role| Vertex {
                parent: graphic.id(),
                role,
                position: role.position_on(&frame),
            })
            .collect()
    }
}

/// The rotation handle, floating above the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotator {
    pub parent: GraphicId,
    pub position: Point,
}

impl Rotator {
    pub fn of(graphic: &GraphicRenderer, offset: f64) -> Rotator {
        let frame = graphic.frame();
        Rotator {
            parent: graphic.id(),
            position: frame.local_to_world(Vec2::new(0.0, -frame.height / 2.0 - offset)),
        }
    }
}

/// One editable point of a curve anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveAnchorHandle {
    pub parent: GraphicId,
    pub index: usize,
    pub role: AnchorRole,
    pub position: Point,
}

impl CurveAnchorHandle {
    /// Every point and handle of a curve; empty for other graphics.
    pub fn of(graphic: &GraphicRenderer) -> Vec<CurveAnchorHandle> {
        let Some(curve) = graphic.as_curve() else {
            return Vec::new();
        };
        let transform = curve.frame_transform();
        curve
            .anchors
            .iter()
            .enumerate()
            .flat_map(|(index, anchor)| {
                [AnchorRole::Point, AnchorRole::HandleIn, AnchorRole::HandleOut]
                    .into_iter()
                    .map(move |role| CurveAnchorHandle {
                        parent: curve.id,
                        index,
                        role,
                        position: transform * anchor.get(role),
                    })
            })
            .collect()
    }
}

/// The rotated outline drawn around a focused graphic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub parent: GraphicId,
    pub frame: Frame,
    pub corners: [Point; 4],
}

impl BoundingBox {
    pub fn of(graphic: &GraphicRenderer) -> BoundingBox {
        let frame = graphic.frame();
        BoundingBox {
            parent: graphic.id(),
            frame,
            corners: frame.corners(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{Anchor, Curve, Rectangle};

    #[test]
    fn test_vertex_positions() {
        let rect: GraphicRenderer = Rectangle::new(Point::new(0.0, 0.0), 100.0, 50.0).into();
        let vertices = Vertex::of(&rect);
        assert_eq!(vertices.len(), 8);
        let br = vertices
            .iter()
            .find(|v| v.role == VertexRole::BottomRight)
            .unwrap();
        assert!((br.position.x - 100.0).abs() < 1e-9);
        assert!((br.position.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotator_follows_rotation() {
        let mut rect: GraphicRenderer = Rectangle::new(Point::new(0.0, 0.0), 100.0, 50.0).into();
        let upright = Rotator::of(&rect, 25.0);
        assert!((upright.position.x - 50.0).abs() < 1e-9);
        assert!((upright.position.y - -25.0).abs() < 1e-9);
        rect.set_rotation(90.0);
        let turned = Rotator::of(&rect, 25.0);
        // Top now faces +x: center (50, 25) plus 50 along x
        assert!((turned.position.x - 100.0).abs() < 1e-9);
        assert!((turned.position.y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_roles() {
        assert!(VertexRole::TopLeft.is_corner());
        assert!(!VertexRole::Left.is_corner());
        for role in VertexRole::ALL {
            assert_eq!(role.opposite().opposite(), role);
        }
    }

    #[test]
    fn test_curve_anchor_handles() {
        let curve: GraphicRenderer = Curve::new(vec![
            Anchor::new(Point::new(0.0, 0.0)),
            Anchor::new(Point::new(10.0, 10.0)),
        ])
        .into();
        assert_eq!(CurveAnchorHandle::of(&curve).len(), 6);
        let rect: GraphicRenderer = Rectangle::new(Point::ZERO, 1.0, 1.0).into();
        assert!(CurveAnchorHandle::of(&rect).is_empty());
    }
}
