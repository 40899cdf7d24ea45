//! Creators: turn a drag gesture into a new graphic.

mod curve;

pub use curve::CurveCreator;

use crate::config::EditorConfig;
use crate::graphics::{
    Ellipse, Frame, GraphicId, GraphicKind, GraphicRenderer, Image, ImageFormat, Rectangle,
    Textbox, Video, VertexRole, fit_within,
};
use crate::mutator::resize_frame;
use crate::slide::SlideSurface;
use kurbo::Point;

/// Below this size a drawn box counts as a click without drag.
const CLICK_EPS: f64 = 1e-6;

/// Source and natural size for image and video graphics, resolved before
/// the drawing gesture starts.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSeed {
    pub source: String,
    pub width: f64,
    pub height: f64,
}

impl MediaSeed {
    /// Embed raw image bytes as a data URL. `None` if the format is not
    /// recognised.
    pub fn from_image_bytes(data: &[u8], width: u32, height: u32) -> Option<Self> {
        let format = ImageFormat::from_magic_bytes(data)?;
        Some(Self {
            source: format.data_url(data),
            width: f64::from(width),
            height: f64::from(height),
        })
    }

    /// Reference an image or video by URL.
    pub fn url(source: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            source: source.into(),
            width,
            height,
        }
    }
}

/// Drag from a fixed anchor; the new box spans anchor to pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeGesture {
    anchor: Point,
}

impl ResizeGesture {
    pub fn new(anchor: Point) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Box for this pointer position. Width and height are never negative;
    /// `keep_square` uses the shorter side for both, growing towards the
    /// pointer.
    pub fn frame_at(&self, pointer: Point, keep_square: bool) -> Frame {
        let start = Frame::new(self.anchor, 0.0, 0.0, 0.0);
        resize_frame(&start, VertexRole::BottomRight, pointer, keep_square)
    }
}

/// Create-by-drag for box-shaped graphics: rectangle, ellipse, textbox,
/// image and video.
#[derive(Debug, Clone)]
pub struct BoxCreator {
    graphic_id: GraphicId,
    kind: GraphicKind,
    origin: Point,
    resize: Option<ResizeGesture>,
    /// Size used when the gesture ends without a drag.
    fallback: Option<(f64, f64)>,
}

impl BoxCreator {
    /// Add a zero-size graphic of `kind` at `at`. Image and video need a
    /// seed; curves have their own creator. Returns `None` when the kind
    /// cannot be created this way.
    pub fn create(
        slide: &mut dyn SlideSurface,
        kind: GraphicKind,
        at: Point,
        seed: Option<&MediaSeed>,
        config: &EditorConfig,
    ) -> Option<Self> {
        let style = config.default_style.clone();
        let (graphic, fallback): (GraphicRenderer, _) = match kind {
            GraphicKind::Rectangle => (Rectangle::new(at, 0.0, 0.0).with_style(style).into(), None),
            GraphicKind::Ellipse => (Ellipse::new(at, 0.0, 0.0).with_style(style).into(), None),
            GraphicKind::Textbox => (
                Textbox::new(at, 0.0, 0.0, config.font_size)
                    .with_style(style)
                    .into(),
                Some((config.textbox_width, config.textbox_height)),
            ),
            GraphicKind::Image => {
                let seed = seed?;
                let mut image = Image::new(at, 0.0, 0.0, seed.source.clone());
                image.style = style;
                (image.into(), Some(seed_size(seed, config)))
            }
            GraphicKind::Video => {
                let seed = seed?;
                let mut video = Video::new(at, 0.0, 0.0, seed.source.clone());
                video.style = style;
                (video.into(), Some(seed_size(seed, config)))
            }
            GraphicKind::Curve => return None,
        };
        let graphic_id = slide.create_graphic(graphic);
        log::debug!("Creating {kind} {graphic_id} at ({}, {})", at.x, at.y);
        Some(Self {
            graphic_id,
            kind,
            origin: at,
            resize: None,
            fallback,
        })
    }

    pub fn graphic_id(&self) -> GraphicId {
        self.graphic_id
    }

    pub fn kind(&self) -> GraphicKind {
        self.kind
    }

    /// Begin sizing the graphic from `anchor` (normally the mouse-down point).
    pub fn init_resize(&mut self, anchor: Point) -> ResizeGesture {
        let gesture = ResizeGesture::new(anchor);
        self.resize = Some(gesture);
        gesture
    }

    /// Resize towards `pointer`. Returns the applied frame, or `None` once
    /// the resize has ended or the graphic is gone.
    pub fn update(&self, slide: &mut dyn SlideSurface, pointer: Point, keep_square: bool) -> Option<Frame> {
        let frame = self.resize?.frame_at(pointer, keep_square);
        slide.graphic_mut(self.graphic_id)?.set_frame(frame);
        Some(frame)
    }

    /// Stop resizing. A graphic left at zero size takes its fallback size
    /// (textbox default, or the seed's natural size for media).
    pub fn end_resize(&mut self, slide: &mut dyn SlideSurface) -> GraphicId {
        self.resize = None;
        if let (Some((width, height)), Some(graphic)) =
            (self.fallback, slide.graphic_mut(self.graphic_id))
        {
            let frame = graphic.frame();
            if frame.width < CLICK_EPS && frame.height < CLICK_EPS {
                graphic.set_frame(Frame::new(self.origin, width, height, frame.rotation));
            }
        }
        log::debug!("Created {} {}", self.kind, self.graphic_id);
        self.graphic_id
    }
}

fn seed_size(seed: &MediaSeed, config: &EditorConfig) -> (f64, f64) {
    fit_within(seed.width, seed.height, config.slide_width, config.slide_height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slide::SlideRenderer;

    fn drag(kind: GraphicKind, to: Point, keep_square: bool) -> (SlideRenderer, Frame) {
        let config = EditorConfig::default();
        let mut slide = SlideRenderer::new(&config);
        let from = Point::new(10.0, 10.0);
        let mut creator = BoxCreator::create(&mut slide, kind, from, None, &config).unwrap();
        creator.init_resize(from);
        creator.update(&mut slide, to, keep_square);
        let id = creator.end_resize(&mut slide);
        let frame = slide.graphic(id).unwrap().frame();
        (slide, frame)
    }

    #[test]
    fn test_rectangle_drag() {
        let (_, frame) = drag(GraphicKind::Rectangle, Point::new(110.0, 160.0), false);
        assert_eq!(frame.origin, Point::new(10.0, 10.0));
        assert!((frame.width - 100.0).abs() < f64::EPSILON);
        assert!((frame.height - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shift_drag_makes_square_and_circle() {
        for kind in [GraphicKind::Rectangle, GraphicKind::Ellipse] {
            let (_, frame) = drag(kind, Point::new(110.0, 160.0), true);
            assert!((frame.origin.x - 10.0).abs() < 1e-9);
            assert!((frame.origin.y - 10.0).abs() < 1e-9);
            assert!((frame.width - 100.0).abs() < 1e-9);
            assert!((frame.height - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_drag_across_anchor() {
        let (_, frame) = drag(GraphicKind::Ellipse, Point::new(0.0, -20.0), false);
        assert_eq!(frame.origin, Point::new(0.0, -20.0));
        assert!((frame.width - 10.0).abs() < 1e-9);
        assert!((frame.height - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_click_without_drag() {
        let (_, rect) = drag(GraphicKind::Rectangle, Point::new(10.0, 10.0), false);
        assert_eq!(rect.width, 0.0);
        assert_eq!(rect.height, 0.0);
        assert!(rect.width.is_finite() && rect.origin.x.is_finite());

        let (_, text) = drag(GraphicKind::Textbox, Point::new(10.0, 10.0), false);
        let config = EditorConfig::default();
        assert!((text.width - config.textbox_width).abs() < f64::EPSILON);
        assert!((text.height - config.textbox_height).abs() < f64::EPSILON);
    }

    #[test]
    fn test_media_needs_seed() {
        let config = EditorConfig::default();
        let mut slide = SlideRenderer::new(&config);
        assert!(BoxCreator::create(&mut slide, GraphicKind::Image, Point::ZERO, None, &config).is_none());
        assert!(BoxCreator::create(&mut slide, GraphicKind::Curve, Point::ZERO, None, &config).is_none());
        assert!(slide.is_empty());
    }

    #[test]
    fn test_media_click_uses_natural_size() {
        let config = EditorConfig::default();
        let mut slide = SlideRenderer::new(&config);
        let seed = MediaSeed::url("https://example.com/clip", 3200.0, 900.0);
        let mut creator =
            BoxCreator::create(&mut slide, GraphicKind::Video, Point::ZERO, Some(&seed), &config)
                .unwrap();
        creator.init_resize(Point::ZERO);
        let id = creator.end_resize(&mut slide);
        let frame = slide.graphic(id).unwrap().frame();
        // Fitted into the 1600x900 slide
        assert!((frame.width - 1600.0).abs() < 1e-9);
        assert!((frame.height - 450.0).abs() < 1e-9);
        // No further updates once ended
        assert!(creator.update(&mut slide, Point::new(5.0, 5.0), false).is_none());
    }

    #[test]
    fn test_seed_from_image_bytes() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let seed = MediaSeed::from_image_bytes(&png, 640, 480).unwrap();
        assert!(seed.source.starts_with("data:image/png;base64,"));
        assert!((seed.width - 640.0).abs() < f64::EPSILON);
        assert!(MediaSeed::from_image_bytes(b"text", 1, 1).is_none());
    }
}
