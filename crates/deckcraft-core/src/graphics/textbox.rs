//! Textbox graphic.

use super::{Frame, GraphicId, GraphicKind, GraphicStyle, GraphicTrait};
use kurbo::{BezPath, Point, Shape as KurboShape};
use uuid::Uuid;

/// A box of text. Layout is left to the drawing backend; the core only
/// tracks the box and its content.
#[derive(Debug, Clone, PartialEq)]
pub struct Textbox {
    pub(crate) id: GraphicId,
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees (around center).
    pub rotation: f64,
    pub text: String,
    pub font_size: f64,
    pub style: GraphicStyle,
}

impl Textbox {
    pub fn new(origin: Point, width: f64, height: f64, font_size: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            width,
            height,
            rotation: 0.0,
            text: String::new(),
            font_size,
            style: GraphicStyle::default(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn reconstruct(
        id: GraphicId,
        origin: Point,
        width: f64,
        height: f64,
        rotation: f64,
        text: String,
        font_size: f64,
        style: GraphicStyle,
    ) -> Self {
        Self {
            id,
            origin,
            width,
            height,
            rotation,
            text,
            font_size,
            style,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_style(mut self, style: GraphicStyle) -> Self {
        self.style = style;
        self
    }
}

impl GraphicTrait for Textbox {
    fn id(&self) -> GraphicId {
        self.id
    }

    fn kind(&self) -> GraphicKind {
        GraphicKind::Textbox
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
        // Text is always clickable inside its box, filled or not
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
