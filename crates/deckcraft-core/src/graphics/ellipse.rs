//! Ellipse graphic.

use super::{Frame, GraphicId, GraphicKind, GraphicStyle, GraphicTrait};
use kurbo::{BezPath, Ellipse as KurboEllipse, Point, Shape as KurboShape};
use uuid::Uuid;

/// An ellipse.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    pub(crate) id: GraphicId,
    /// Center point.
    pub center: Point,
    /// Horizontal radius.
    pub radius_x: f64,
    /// Vertical radius.
    pub radius_y: f64,
    /// Rotation in degrees (around center).
    pub rotation: f64,
    pub style: GraphicStyle,
}

impl Ellipse {
    /// Create a new ellipse.
    pub fn new(center: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius_x,
            radius_y,
            rotation: 0.0,
            style: GraphicStyle::default(),
        }
    }

    /// Reconstruct an ellipse with a specific ID (for the store model).
    pub(crate) fn reconstruct(
        id: GraphicId,
        center: Point,
        radius_x: f64,
        radius_y: f64,
        rotation: f64,
        style: GraphicStyle,
    ) -> Self {
        Self {
            id,
            center,
            radius_x,
            radius_y,
            rotation,
            style,
        }
    }

    /// Create a circle.
    pub fn circle(center: Point, radius: f64) -> Self {
        Self::new(center, radius, radius)
    }

    pub fn with_style(mut self, style: GraphicStyle) -> Self {
        self.style = style;
        self
    }

    /// Get as a kurbo Ellipse.
    pub fn as_kurbo(&self) -> KurboEllipse {
        KurboEllipse::new(
            self.center,
            (self.radius_x, self.radius_y),
            self.rotation.to_radians(),
        )
    }
}

impl GraphicTrait for Ellipse {
    fn id(&self) -> GraphicId {
        self.id
    }

    fn kind(&self) -> GraphicKind {
        GraphicKind::Ellipse
    }

    fn frame(&self) -> Frame {
        Frame::from_center(
            self.center,
            self.radius_x * 2.0,
            self.radius_y * 2.0,
            self.rotation,
        )
    }

    fn set_frame(&mut self, frame: Frame) {
        self.center = frame.center();
        self.radius_x = frame.width / 2.0;
        self.radius_y = frame.height / 2.0;
        self.rotation = frame.rotation;
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let local = self.frame().to_local(point);
        let half_sw = self.style.stroke_width / 2.0;
        let dx_outer = local.x / (self.radius_x + tolerance + half_sw);
        let dy_outer = local.y / (self.radius_y + tolerance + half_sw);
        if dx_outer * dx_outer + dy_outer * dy_outer > 1.0 {
            return false;
        }
        if self.style.fill_color.is_some() {
            return true;
        }
        // Outline only: reject if inside inner ellipse
        let inner_rx = (self.radius_x - tolerance - half_sw).max(0.0);
        let inner_ry = (self.radius_y - tolerance - half_sw).max(0.0);
        if inner_rx < f64::EPSILON || inner_ry < f64::EPSILON {
            return true;
        }
        let dx_inner = local.x / inner_rx;
        let dy_inner = local.y / inner_ry;
        dx_inner * dx_inner + dy_inner * dy_inner > 1.0
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
    }

    fn style(&self) -> &GraphicStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut GraphicStyle {
        &mut self.style
    }
}
