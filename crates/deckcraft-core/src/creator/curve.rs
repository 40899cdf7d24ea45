//! Anchor-by-anchor curve drawing.

use crate::config::EditorConfig;
use crate::graphics::{Anchor, AnchorMode, AnchorRole, Curve, GraphicId, GraphicStyle};
use crate::slide::SlideSurface;
use kurbo::Point;

/// Builds a curve one anchor at a time.
///
/// Each anchor is placed by a press, optionally dragged to pull out a
/// smooth handle pair, and released. Finishing keeps the curve only if it
/// has at least two anchors.
#[derive(Debug, Clone)]
pub struct CurveCreator {
    graphic_id: GraphicId,
    /// Anchor currently being placed.
    pending: Option<usize>,
}

impl CurveCreator {
    /// Add an empty curve to the slide and start drawing it.
    pub fn init_draw(slide: &mut dyn SlideSurface, config: &EditorConfig) -> Self {
        let style = GraphicStyle {
            fill_color: None,
            ..config.default_style.clone()
        };
        let graphic_id = slide.create_graphic(Curve::new(Vec::new()).with_style(style).into());
        log::debug!("Drawing curve {graphic_id}");
        Self {
            graphic_id,
            pending: None,
        }
    }

    pub fn graphic_id(&self) -> GraphicId {
        self.graphic_id
    }

    pub fn is_placing_anchor(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of anchors placed so far.
    pub fn anchor_count(&self, slide: &dyn SlideSurface) -> usize {
        slide
            .graphic(self.graphic_id)
            .and_then(|g| g.as_curve())
            .map_or(0, |curve| curve.anchors.len())
    }

    /// Place a new anchor at `point` with collapsed handles.
    pub fn init_create_anchor(&mut self, slide: &mut dyn SlideSurface, point: Point) {
        let Some(curve) = slide
            .graphic_mut(self.graphic_id)
            .and_then(|g| g.as_curve_mut())
        else {
            return;
        };
        curve.anchors.push(Anchor::symmetric(point, point));
        self.pending = Some(curve.anchors.len() - 1);
    }

    /// Pull the pending anchor's outgoing handle to `pointer`; the incoming
    /// handle mirrors it.
    pub fn drag_anchor(&self, slide: &mut dyn SlideSurface, pointer: Point) -> bool {
        let Some(index) = self.pending else {
            return false;
        };
        match slide
            .graphic_mut(self.graphic_id)
            .and_then(|g| g.as_curve_mut())
            .and_then(|curve| curve.anchors.get_mut(index))
        {
            Some(anchor) => {
                anchor.set(AnchorRole::HandleOut, pointer);
                true
            }
            None => false,
        }
    }

    pub fn end_create_anchor(&mut self) {
        self.pending = None;
    }

    /// Place an anchor without a drag.
    pub fn add_anchor(&mut self, slide: &mut dyn SlideSurface, point: Point) {
        self.init_create_anchor(slide, point);
        self.end_create_anchor();
    }

    /// Finish drawing. A curve with fewer than two anchors is removed and
    /// `None` returned; otherwise every anchor becomes free.
    pub fn end_draw(mut self, slide: &mut dyn SlideSurface) -> Option<GraphicId> {
        self.end_create_anchor();
        let keep = match slide
            .graphic_mut(self.graphic_id)
            .and_then(|g| g.as_curve_mut())
        {
            Some(curve) if !curve.is_degenerate() => {
                curve.set_mode(AnchorMode::Free);
                true
            }
            _ => false,
        };
        if keep {
            log::debug!("Curve {} finished", self.graphic_id);
            Some(self.graphic_id)
        } else {
            log::debug!("Discarding degenerate curve {}", self.graphic_id);
            slide.remove_graphic(self.graphic_id);
            None
        }
    }
}
