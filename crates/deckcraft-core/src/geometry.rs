//! Geometry helpers layered over kurbo's point and vector types.
//!
//! Angles are in degrees throughout the editing core, matching the rotation
//! stored on graphics.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Reflect `point` through `center` (the point mirrored on the other side).
pub fn reflect(point: Point, center: Point) -> Point {
    center + (center - point)
}

/// Rotate a vector by `degrees` (counter-clockwise in y-down screen space
/// this reads as clockwise, as with SVG `rotate`).
pub fn rotate_vec(v: Vec2, degrees: f64) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Rotate `point` about `center` by `degrees`.
pub fn rotate_about(point: Point, center: Point, degrees: f64) -> Point {
    center + rotate_vec(point - center, degrees)
}

/// Express a world-space vector in a frame rotated by `degrees`.
pub fn to_local(v: Vec2, degrees: f64) -> Vec2 {
    rotate_vec(v, -degrees)
}

/// Express a vector given in a frame rotated by `degrees` in world space.
pub fn from_local(v: Vec2, degrees: f64) -> Vec2 {
    rotate_vec(v, degrees)
}

/// Direction of a vector in degrees. The zero vector yields 0.
pub fn angle_degrees(v: Vec2) -> f64 {
    v.atan2().to_degrees()
}

/// Wrap an angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Snap an angle to the nearest multiple of `step` degrees.
pub fn snap_degrees(degrees: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return degrees;
    }
    normalize_degrees((degrees / step).round() * step)
}

/// Axis-aligned bounds of a set of points, `None` when empty.
pub fn bounds_of(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    let mut points = points.into_iter();
    let first = points.next()?;
    Some(points.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p)))
}

/// The region of slide space shown on screen, in slide units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewbox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewbox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Shrink (zoom > 1) or grow (zoom < 1) the viewbox about its center.
    pub fn zoomed(&self, zoom: f64) -> Self {
        if zoom <= 0.0 || !zoom.is_finite() {
            return *self;
        }
        let width = self.width / zoom;
        let height = self.height / zoom;
        let center = self.center();
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// Transform from slide coordinates to client (screen) coordinates.
    ///
    /// The viewbox is fitted into the client area preserving aspect ratio
    /// and centered, like SVG's `xMidYMid meet`.
    pub fn client_transform(&self, client: Size) -> Affine {
        let scale = (client.width / self.width).min(client.height / self.height);
        if !scale.is_finite() || scale <= 0.0 {
            return Affine::IDENTITY;
        }
        let tx = (client.width - self.width * scale) / 2.0 - self.x * scale;
        let ty = (client.height - self.height * scale) / 2.0 - self.y * scale;
        Affine::translate((tx, ty)) * Affine::scale(scale)
    }

    /// Convert a client point into slide coordinates.
    pub fn client_to_slide(&self, client: Size, point: Point) -> Point {
        self.client_transform(client).inverse() * point
    }

    /// Convert a slide point into client coordinates.
    pub fn slide_to_client(&self, client: Size, point: Point) -> Point {
        self.client_transform(client) * point
    }
}
