//! Embedded video graphic.

use super::{Frame, GraphicId, GraphicKind, GraphicStyle, GraphicTrait};
use kurbo::{BezPath, Point, Shape as KurboShape};
use uuid::Uuid;

/// A video embed, displayed as a box pointing at an embed URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub(crate) id: GraphicId,
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees (around center).
    pub rotation: f64,
    /// Embed URL.
    pub source: String,
    pub style: GraphicStyle,
}

impl Video {
    pub fn new(origin: Point, width: f64, height: f64, source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            width,
            height,
            rotation: 0.0,
            source: source.into(),
            style: GraphicStyle::default(),
        }
    }

    pub(crate) fn reconstruct(
        id: GraphicId,
        origin: Point,
        width: f64,
        height: f64,
        rotation: f64,
        source: String,
        style: GraphicStyle,
    ) -> Self {
        Self {
            id,
            origin,
            width,
            height,
            rotation,
            source,
            style,
        }
    }
}

impl GraphicTrait for Video {
    fn id(&self) -> GraphicId {
        self.id
    }

    fn kind(&self) -> GraphicKind {
        GraphicKind::Video
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
        self.frame().contains(point, tolerance)
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
