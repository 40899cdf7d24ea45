//! Graphic definitions for slides.

mod curve;
mod ellipse;
mod helpers;
mod image;
mod rectangle;
mod textbox;
mod video;

pub use curve::{Anchor, AnchorMode, AnchorRole, Curve};
pub use ellipse::Ellipse;
pub use helpers::{BoundingBox, CurveAnchorHandle, Rotator, Vertex, VertexRole};
pub use image::{Image, ImageFormat, decode_data_url, fit_within};
pub use rectangle::Rectangle;
pub use textbox::Textbox;
pub use video::Video;

use crate::error::{DeckError, DeckResult};
use crate::geometry;
use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for graphics.
pub type GraphicId = Uuid;

/// The closed set of graphic variants a slide can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphicKind {
    Rectangle,
    Ellipse,
    Curve,
    Textbox,
    Image,
    Video,
}

impl GraphicKind {
    pub const ALL: [GraphicKind; 6] = [
        GraphicKind::Rectangle,
        GraphicKind::Ellipse,
        GraphicKind::Curve,
        GraphicKind::Textbox,
        GraphicKind::Image,
        GraphicKind::Video,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GraphicKind::Rectangle => "rectangle",
            GraphicKind::Ellipse => "ellipse",
            GraphicKind::Curve => "curve",
            GraphicKind::Textbox => "textbox",
            GraphicKind::Image => "image",
            GraphicKind::Video => "video",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for GraphicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RGBA8 color, serialized as a `#rrggbbaa` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbaColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl RgbaColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> DeckResult<Self> {
        let invalid = || DeckError::InvalidColor(hex.to_string());
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in digits.chars().enumerate() {
                    let v = channel(&c.to_string())?;
                    out[i] = v * 16 + v;
                }
                Ok(Self::new(out[0], out[1], out[2], 255))
            }
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                255,
            )),
            8 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            )),
            _ => Err(invalid()),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl TryFrom<String> for RgbaColor {
    type Error = DeckError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<RgbaColor> for String {
    fn from(color: RgbaColor) -> Self {
        color.to_hex()
    }
}

impl From<Color> for RgbaColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<RgbaColor> for Color {
    fn from(color: RgbaColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties for graphics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicStyle {
    /// Fill color (None = no fill).
    pub fill_color: Option<RgbaColor>,
    pub stroke_color: RgbaColor,
    pub stroke_width: f64,
}

impl GraphicStyle {
    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(Into::into)
    }

    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }
}

impl Default for GraphicStyle {
    fn default() -> Self {
        Self {
            fill_color: Some(RgbaColor::white()),
            stroke_color: RgbaColor::black(),
            stroke_width: 2.0,
        }
    }
}

/// Rotated box describing where a graphic sits on the slide.
///
/// `origin` is the top-left corner of the unrotated box; `rotation` is in
/// degrees about the box center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

impl Frame {
    pub fn new(origin: Point, width: f64, height: f64, rotation: f64) -> Self {
        Self {
            origin,
            width,
            height,
            rotation,
        }
    }

    pub fn from_center(center: Point, width: f64, height: f64, rotation: f64) -> Self {
        Self::new(
            Point::new(center.x - width / 2.0, center.y - height / 2.0),
            width,
            height,
            rotation,
        )
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.width / 2.0,
            self.origin.y + self.height / 2.0,
        )
    }

    /// The unrotated box.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width,
            self.origin.y + self.height,
        )
    }

    /// Maps unrotated slide coordinates onto the rotated box.
    pub fn transform(&self) -> Affine {
        Affine::rotate_about(self.rotation.to_radians(), self.center())
    }

    /// Offset of `point` from the center, in the box's rotated axes.
    pub fn to_local(&self, point: Point) -> Vec2 {
        geometry::to_local(point - self.center(), self.rotation)
    }

    /// Slide position of an offset from the center given in the box's axes.
    pub fn local_to_world(&self, local: Vec2) -> Point {
        self.center() + geometry::from_local(local, self.rotation)
    }

    /// Rotated corners, clockwise from top-left.
    pub fn corners(&self) -> [Point; 4] {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        [
            self.local_to_world(Vec2::new(-hw, -hh)),
            self.local_to_world(Vec2::new(hw, -hh)),
            self.local_to_world(Vec2::new(hw, hh)),
            self.local_to_world(Vec2::new(-hw, hh)),
        ]
    }

    /// Axis-aligned bounds of the rotated box.
    pub fn bounds(&self) -> Rect {
        geometry::bounds_of(self.corners()).unwrap_or_else(|| self.rect())
    }

    /// Whether `point` lies inside the rotated box grown by `inflate`.
    pub fn contains(&self, point: Point, inflate: f64) -> bool {
        let local = self.to_local(point);
        local.x.abs() <= self.width / 2.0 + inflate && local.y.abs() <= self.height / 2.0 + inflate
    }

    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            origin: self.origin + delta,
            ..*self
        }
    }
}

/// Common trait for all graphics.
pub trait GraphicTrait {
    /// Get the unique identifier.
    fn id(&self) -> GraphicId;

    fn kind(&self) -> GraphicKind;

    /// Get the rotated box the graphic occupies.
    fn frame(&self) -> Frame;

    /// Fit the graphic's geometry into `frame`.
    fn set_frame(&mut self, frame: Frame);

    /// Move the graphic by `delta` in slide coordinates.
    fn translate(&mut self, delta: Vec2) {
        let frame = self.frame().translated(delta);
        self.set_frame(frame);
    }

    /// Check if a point (in slide coordinates) hits this graphic.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Get the path representation for rendering, rotation applied.
    fn to_path(&self) -> BezPath;

    fn style(&self) -> &GraphicStyle;

    fn style_mut(&mut self) -> &mut GraphicStyle;
}

/// A live, editable graphic on a slide.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicRenderer {
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Curve(Curve),
    Textbox(Textbox),
    Image(Image),
    Video(Video),
}

impl GraphicRenderer {
    fn as_dyn(&self) -> &dyn GraphicTrait {
        match self {
            GraphicRenderer::Rectangle(g) => g,
            GraphicRenderer::Ellipse(g) => g,
            GraphicRenderer::Curve(g) => g,
            GraphicRenderer::Textbox(g) => g,
            GraphicRenderer::Image(g) => g,
            GraphicRenderer::Video(g) => g,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn GraphicTrait {
        match self {
            GraphicRenderer::Rectangle(g) => g,
            GraphicRenderer::Ellipse(g) => g,
            GraphicRenderer::Curve(g) => g,
            GraphicRenderer::Textbox(g) => g,
            GraphicRenderer::Image(g) => g,
            GraphicRenderer::Video(g) => g,
        }
    }

    pub fn id(&self) -> GraphicId {
        self.as_dyn().id()
    }

    pub fn kind(&self) -> GraphicKind {
        self.as_dyn().kind()
    }

    pub fn frame(&self) -> Frame {
        self.as_dyn().frame()
    }

    pub fn set_frame(&mut self, frame: Frame) {
        self.as_dyn_mut().set_frame(frame);
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.as_dyn_mut().translate(delta);
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_dyn().hit_test(point, tolerance)
    }

    pub fn to_path(&self) -> BezPath {
        self.as_dyn().to_path()
    }

    pub fn style(&self) -> &GraphicStyle {
        self.as_dyn().style()
    }

    pub fn style_mut(&mut self) -> &mut GraphicStyle {
        self.as_dyn_mut().style_mut()
    }

    /// Axis-aligned bounds in slide coordinates.
    pub fn bounds(&self) -> Rect {
        self.frame().bounds()
    }

    pub fn center(&self) -> Point {
        self.frame().center()
    }

    /// Rotation in degrees about the frame center.
    pub fn rotation(&self) -> f64 {
        self.frame().rotation
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        match self {
            GraphicRenderer::Curve(c) => c.rotation = degrees,
            _ => {
                let frame = Frame {
                    rotation: degrees,
                    ..self.frame()
                };
                self.set_frame(frame);
            }
        }
    }

    /// The point that tracks the cursor while the graphic is dragged and
    /// that `x`/`y` report: the center for ellipses, the first anchor for
    /// curves, the top-left origin otherwise.
    pub fn reference_point(&self) -> Point {
        match self {
            GraphicRenderer::Ellipse(e) => e.center,
            GraphicRenderer::Curve(c) => c
                .anchors
                .first()
                .map(|a| a.point)
                .unwrap_or_else(|| c.frame().origin),
            _ => self.frame().origin,
        }
    }

    pub fn x(&self) -> f64 {
        self.reference_point().x
    }

    pub fn y(&self) -> f64 {
        self.reference_point().y
    }

    pub fn set_x(&mut self, x: f64) {
        let dx = x - self.x();
        self.translate(Vec2::new(dx, 0.0));
    }

    pub fn set_y(&mut self, y: f64) {
        let dy = y - self.y();
        self.translate(Vec2::new(0.0, dy));
    }

    pub fn width(&self) -> f64 {
        self.frame().width
    }

    pub fn height(&self) -> f64 {
        self.frame().height
    }

    /// Resize keeping the unrotated top-left corner in place.
    pub fn set_width(&mut self, width: f64) {
        let frame = Frame {
            width: width.max(0.0),
            ..self.frame()
        };
        self.set_frame(frame);
    }

    pub fn set_height(&mut self, height: f64) {
        let frame = Frame {
            height: height.max(0.0),
            ..self.frame()
        };
        self.set_frame(frame);
    }

    /// Text content, for textboxes only.
    pub fn text(&self) -> Option<&str> {
        match self {
            GraphicRenderer::Textbox(t) => Some(&t.text),
            _ => None,
        }
    }

    /// Replace the text of a textbox. Returns false for other variants.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        match self {
            GraphicRenderer::Textbox(t) => {
                t.text = text.into();
                true
            }
            _ => false,
        }
    }

    pub fn as_curve(&self) -> Option<&Curve> {
        match self {
            GraphicRenderer::Curve(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_curve_mut(&mut self) -> Option<&mut Curve> {
        match self {
            GraphicRenderer::Curve(c) => Some(c),
            _ => None,
        }
    }

    /// Overwrite this graphic's geometry with `other`'s, keeping id and style.
    pub fn copy_geometry_from(&mut self, other: &GraphicRenderer) {
        match (self, other) {
            (GraphicRenderer::Curve(dst), GraphicRenderer::Curve(src)) => {
                dst.anchors = src.anchors.clone();
                dst.rotation = src.rotation;
            }
            (dst, src) => dst.set_frame(src.frame()),
        }
    }

    /// Clone this graphic under a fresh id.
    pub fn duplicate(&self) -> GraphicRenderer {
        let mut copy = self.clone();
        let id = Uuid::new_v4();
        match &mut copy {
            GraphicRenderer::Rectangle(g) => g.id = id,
            GraphicRenderer::Ellipse(g) => g.id = id,
            GraphicRenderer::Curve(g) => g.id = id,
            GraphicRenderer::Textbox(g) => g.id = id,
            GraphicRenderer::Image(g) => g.id = id,
            GraphicRenderer::Video(g) => g.id = id,
        }
        copy
    }
}

impl From<Rectangle> for GraphicRenderer {
    fn from(g: Rectangle) -> Self {
        GraphicRenderer::Rectangle(g)
    }
}

impl From<Ellipse> for GraphicRenderer {
    fn from(g: Ellipse) -> Self {
        GraphicRenderer::Ellipse(g)
    }
}

impl From<Curve> for GraphicRenderer {
    fn from(g: Curve) -> Self {
        GraphicRenderer::Curve(g)
    }
}

impl From<Textbox> for GraphicRenderer {
    fn from(g: Textbox) -> Self {
        GraphicRenderer::Textbox(g)
    }
}

impl From<Image> for GraphicRenderer {
    fn from(g: Image) -> Self {
        GraphicRenderer::Image(g)
    }
}

impl From<Video> for GraphicRenderer {
    fn from(g: Video) -> Self {
        GraphicRenderer::Video(g)
    }
}

/// Hit test shared by the box-shaped variants.
pub(crate) fn box_hit_test(frame: &Frame, style: &GraphicStyle, point: Point, tolerance: f64) -> bool {
    let band = tolerance + style.stroke_width / 2.0;
    if style.fill_color.is_some() {
        return frame.contains(point, band);
    }
    // Outline only: hit on the border
    let local = frame.to_local(point);
    let (hw, hh) = (frame.width / 2.0, frame.height / 2.0);
    let inside_outer = local.x.abs() <= hw + band && local.y.abs() <= hh + band;
    let inside_inner = local.x.abs() < hw - band && local.y.abs() < hh - band;
    inside_outer && !inside_inner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        let color = RgbaColor::from_hex("#ff8000").unwrap();
        assert_eq!(color, RgbaColor::new(255, 128, 0, 255));
        assert_eq!(color.to_hex(), "#ff8000ff");
        assert_eq!(RgbaColor::from_hex("fff").unwrap(), RgbaColor::white());
        assert_eq!(
            RgbaColor::from_hex("#00000080").unwrap(),
            RgbaColor::new(0, 0, 0, 128)
        );
    }

    #[test]
    fn test_color_rejects_garbage() {
        assert!(matches!(
            RgbaColor::from_hex("#12"),
            Err(DeckError::InvalidColor(_))
        ));
        assert!(RgbaColor::from_hex("#gggggg").is_err());
        assert!(RgbaColor::from_hex("#ééé").is_err());
    }

    #[test]
    fn test_color_serializes_as_hex() {
        let json = serde_json::to_string(&RgbaColor::black()).unwrap();
        assert_eq!(json, "\"#000000ff\"");
        let parsed: RgbaColor = serde_json::from_str("\"#ffffff\"").unwrap();
        assert_eq!(parsed, RgbaColor::white());
    }

    #[test]
    fn test_peniko_conversion() {
        let color = RgbaColor::new(10, 20, 30, 40);
        let peniko: Color = color.into();
        assert_eq!(RgbaColor::from(peniko), color);
    }

    #[test]
    fn test_frame_rotated_corners() {
        let frame = Frame::new(Point::new(0.0, 0.0), 100.0, 50.0, 90.0);
        let corners = frame.corners();
        // Top-left of a 100x50 box rotated a quarter turn about (50, 25)
        assert!((corners[0].x - 75.0).abs() < 1e-9);
        assert!((corners[0].y - -25.0).abs() < 1e-9);
        let bounds = frame.bounds();
        assert!((bounds.width() - 50.0).abs() < 1e-9);
        assert!((bounds.height() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_frame_contains_respects_rotation() {
        let frame = Frame::new(Point::new(0.0, 0.0), 100.0, 10.0, 90.0);
        // Rotated upright: occupies x in [45, 55], y in [-45, 55]
        assert!(frame.contains(Point::new(50.0, 50.0), 0.0));
        assert!(!frame.contains(Point::new(90.0, 5.0), 0.0));
    }

    #[test]
    fn test_kind_names() {
        for kind in GraphicKind::ALL {
            assert_eq!(GraphicKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(GraphicKind::from_name("triangle"), None);
    }

    #[test]
    fn test_set_x_follows_reference_point() {
        let mut ellipse: GraphicRenderer = Ellipse::new(Point::new(50.0, 50.0), 10.0, 20.0).into();
        ellipse.set_x(100.0);
        assert!((ellipse.x() - 100.0).abs() < 1e-9);
        assert!((ellipse.frame().origin.x - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_gets_new_id() {
        let rect: GraphicRenderer = Rectangle::new(Point::ZERO, 10.0, 10.0).into();
        let copy = rect.duplicate();
        assert_ne!(copy.id(), rect.id());
        assert_eq!(copy.frame(), rect.frame());
    }

    #[test]
    fn test_text_only_on_textbox() {
        let mut rect: GraphicRenderer = Rectangle::new(Point::ZERO, 10.0, 10.0).into();
        assert!(!rect.set_text("nope"));
        assert!(rect.text().is_none());
        let mut text: GraphicRenderer = Textbox::new(Point::ZERO, 10.0, 10.0, 24.0).into();
        assert!(text.set_text("hello"));
        assert_eq!(text.text(), Some("hello"));
    }
}
