//! Slide renderer: the live graphics of one slide plus selection, hover,
//! zoom, viewbox and cursor state.

use crate::config::EditorConfig;
use crate::events::{Target, TargetPart};
use crate::geometry::Viewbox;
use crate::graphics::{BoundingBox, CurveAnchorHandle, GraphicId, GraphicRenderer, Rotator, Vertex};
use kurbo::{Point, Size};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Unique identifier for slides.
pub type SlideId = Uuid;

/// Cursor shapes the editor asks the host to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorKind {
    #[default]
    Default,
    Move,
    Grab,
    Grabbing,
    Crosshair,
    Text,
    Pointer,
}

/// Current cursor plus an optional lock that wins over it while a gesture
/// is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorState {
    pub current: CursorKind,
    pub lock: Option<CursorKind>,
}

impl CursorState {
    /// The cursor to display.
    pub fn effective(&self) -> CursorKind {
        self.lock.unwrap_or(self.current)
    }
}

/// A graphic change waiting to be pushed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingChange {
    Set(GraphicId),
    Remove(GraphicId),
}

/// What tools may do to a slide.
pub trait SlideSurface {
    fn slide_id(&self) -> SlideId;

    /// Add a new graphic on top of the others. Returns its id.
    fn create_graphic(&mut self, graphic: GraphicRenderer) -> GraphicId;

    /// Insert or replace a graphic, keeping its stacking position if present.
    fn set_graphic(&mut self, graphic: GraphicRenderer);

    fn remove_graphic(&mut self, id: GraphicId) -> Option<GraphicRenderer>;

    fn graphic(&self, id: GraphicId) -> Option<&GraphicRenderer>;

    fn graphic_mut(&mut self, id: GraphicId) -> Option<&mut GraphicRenderer>;

    fn focus_graphic(&mut self, id: GraphicId);

    fn focus_bulk(&mut self, ids: &[GraphicId]);

    fn unfocus_graphic(&mut self, id: GraphicId);

    fn unfocus_bulk(&mut self, ids: &[GraphicId]);

    fn unfocus_all(&mut self);

    fn is_focused(&self, id: GraphicId) -> bool;

    /// Focused ids, back to front.
    fn focused(&self) -> Vec<GraphicId>;

    /// Hover highlight.
    fn mark_graphic(&mut self, id: GraphicId);

    fn unmark_graphic(&mut self, id: GraphicId);

    fn set_cursor(&mut self, cursor: CursorKind);

    fn lock_cursor(&mut self, cursor: CursorKind);

    fn unlock_cursor(&mut self);

    /// Queue the current state of a graphic for the store.
    fn broadcast_set_graphic(&mut self, id: GraphicId);

    fn broadcast_remove_graphic(&mut self, id: GraphicId);

    fn zoom(&self) -> f64;
}

/// Retained model of one slide.
#[derive(Debug, Clone)]
pub struct SlideRenderer {
    id: SlideId,
    graphics: HashMap<GraphicId, GraphicRenderer>,
    /// Back to front.
    z_order: Vec<GraphicId>,
    focused: HashSet<GraphicId>,
    marked: Option<GraphicId>,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    raw_viewbox: Viewbox,
    cropped_viewbox: Viewbox,
    client_size: Size,
    cursor: CursorState,
    outbox: Vec<PendingChange>,
    handle_tolerance: f64,
    rotator_offset: f64,
}

impl SlideRenderer {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_id(Uuid::new_v4(), config)
    }

    pub fn with_id(id: SlideId, config: &EditorConfig) -> Self {
        let raw_viewbox = Viewbox::new(0.0, 0.0, config.slide_width, config.slide_height);
        let (min_zoom, max_zoom) = config.zoom_range();
        Self {
            id,
            graphics: HashMap::new(),
            z_order: Vec::new(),
            focused: HashSet::new(),
            marked: None,
            zoom: 1.0,
            min_zoom,
            max_zoom,
            raw_viewbox,
            cropped_viewbox: raw_viewbox,
            client_size: Size::new(config.slide_width, config.slide_height),
            cursor: CursorState::default(),
            outbox: Vec::new(),
            handle_tolerance: config.handle_tolerance,
            rotator_offset: config.rotator_offset,
        }
    }

    pub fn id(&self) -> SlideId {
        self.id
    }

    /// Graphics back to front.
    pub fn graphics(&self) -> impl Iterator<Item = &GraphicRenderer> {
        self.z_order.iter().filter_map(|id| self.graphics.get(id))
    }

    pub fn len(&self) -> usize {
        self.graphics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphics.is_empty()
    }

    pub fn marked(&self) -> Option<GraphicId> {
        self.marked
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    pub fn rotator_offset(&self) -> f64 {
        self.rotator_offset
    }

    /// Set the zoom level, clamped to the configured range. The cropped
    /// viewbox shrinks or grows about the slide center.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.cropped_viewbox = self.raw_viewbox.zoomed(self.zoom);
    }

    pub fn raw_viewbox(&self) -> Viewbox {
        self.raw_viewbox
    }

    pub fn cropped_viewbox(&self) -> Viewbox {
        self.cropped_viewbox
    }

    pub fn set_raw_viewbox(&mut self, viewbox: Viewbox) {
        self.raw_viewbox = viewbox;
        self.cropped_viewbox = viewbox.zoomed(self.zoom);
    }

    /// Size of the on-screen area the slide is drawn into.
    pub fn set_client_size(&mut self, size: Size) {
        self.client_size = size;
    }

    pub fn client_to_slide(&self, client: Point) -> Point {
        self.cropped_viewbox.client_to_slide(self.client_size, client)
    }

    /// Hit radius in slide units for the current zoom.
    pub fn tolerance(&self) -> f64 {
        self.handle_tolerance / self.zoom
    }

    /// Outlines of the focused graphics, bottom to top.
    pub fn bounding_boxes(&self) -> Vec<BoundingBox> {
        self.focused()
            .into_iter()
            .filter_map(|id| self.graphics.get(&id).map(BoundingBox::of))
            .collect()
    }

    /// Find what lies under `point`: helpers of focused graphics first
    /// (curve anchors, then vertices, then the rotator), then graphics
    /// front to back.
    pub fn hit_test(&self, point: Point) -> Option<Target> {
        let tolerance = self.tolerance();
        let near = |p: Point| p.distance(point) <= tolerance;

        for id in self.z_order.iter().rev().filter(|id| self.focused.contains(id)) {
            let Some(graphic) = self.graphics.get(id) else {
                continue;
            };
            let target = |part| Target {
                graphic_id: *id,
                graphic_kind: graphic.kind(),
                part,
            };
            if let Some(handle) = CurveAnchorHandle::of(graphic)
                .into_iter()
                .find(|h| near(h.position))
            {
                return Some(target(TargetPart::CurveAnchor {
                    index: handle.index,
                    role: handle.role,
                }));
            }
            if let Some(vertex) = Vertex::of(graphic).into_iter().find(|v| near(v.position)) {
                return Some(target(TargetPart::Vertex(vertex.role)));
            }
            if near(Rotator::of(graphic, self.rotator_offset).position) {
                return Some(target(TargetPart::Rotator));
            }
        }

        self.z_order.iter().rev().find_map(|id| {
            self.graphics
                .get(id)
                .filter(|g| g.hit_test(point, tolerance))
                .map(|g| Target::graphic(*id, g.kind()))
        })
    }

    /// Drain queued changes, oldest first.
    pub fn take_outbox(&mut self) -> Vec<PendingChange> {
        std::mem::take(&mut self.outbox)
    }

    fn queue(&mut self, change: PendingChange) {
        if self.outbox.last() != Some(&change) {
            self.outbox.push(change);
        }
    }
}

impl SlideSurface for SlideRenderer {
    fn slide_id(&self) -> SlideId {
        self.id
    }

    fn create_graphic(&mut self, graphic: GraphicRenderer) -> GraphicId {
        let id = graphic.id();
        self.z_order.retain(|&other| other != id);
        self.z_order.push(id);
        self.graphics.insert(id, graphic);
        id
    }

    fn set_graphic(&mut self, graphic: GraphicRenderer) {
        let id = graphic.id();
        if self.graphics.insert(id, graphic).is_none() {
            self.z_order.push(id);
        }
    }

    fn remove_graphic(&mut self, id: GraphicId) -> Option<GraphicRenderer> {
        self.z_order.retain(|&other| other != id);
        self.focused.remove(&id);
        if self.marked == Some(id) {
            self.marked = None;
        }
        self.graphics.remove(&id)
    }

    fn graphic(&self, id: GraphicId) -> Option<&GraphicRenderer> {
        self.graphics.get(&id)
    }

    fn graphic_mut(&mut self, id: GraphicId) -> Option<&mut GraphicRenderer> {
        self.graphics.get_mut(&id)
    }

    fn focus_graphic(&mut self, id: GraphicId) {
        if self.graphics.contains_key(&id) {
            self.focused.insert(id);
        }
    }

    fn focus_bulk(&mut self, ids: &[GraphicId]) {
        for &id in ids {
            self.focus_graphic(id);
        }
    }

    fn unfocus_graphic(&mut self, id: GraphicId) {
        self.focused.remove(&id);
    }

    fn unfocus_bulk(&mut self, ids: &[GraphicId]) {
        for id in ids {
            self.focused.remove(id);
        }
    }

    fn unfocus_all(&mut self) {
        self.focused.clear();
    }

    fn is_focused(&self, id: GraphicId) -> bool {
        self.focused.contains(&id)
    }

    fn focused(&self) -> Vec<GraphicId> {
        self.z_order
            .iter()
            .copied()
            .filter(|id| self.focused.contains(id))
            .collect()
    }

    fn mark_graphic(&mut self, id: GraphicId) {
        if self.graphics.contains_key(&id) {
            self.marked = Some(id);
        }
    }

    fn unmark_graphic(&mut self, id: GraphicId) {
        if self.marked == Some(id) {
            self.marked = None;
        }
    }

    fn set_cursor(&mut self, cursor: CursorKind) {
        self.cursor.current = cursor;
    }

    fn lock_cursor(&mut self, cursor: CursorKind) {
        self.cursor.lock = Some(cursor);
    }

    fn unlock_cursor(&mut self) {
        self.cursor.lock = None;
    }

    fn broadcast_set_graphic(&mut self, id: GraphicId) {
        self.queue(PendingChange::Set(id));
    }

    fn broadcast_remove_graphic(&mut self, id: GraphicId) {
        self.queue(PendingChange::Remove(id));
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }
}

/// The slides of a deck, in presentation order.
#[derive(Debug, Clone, Default)]
pub struct SlideSet {
    slides: Vec<SlideRenderer>,
}

impl SlideSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slide, replacing any slide with the same id in place.
    pub fn insert(&mut self, slide: SlideRenderer) {
        match self.slides.iter_mut().find(|s| s.id == slide.id) {
            Some(existing) => *existing = slide,
            None => self.slides.push(slide),
        }
    }

    pub fn remove(&mut self, id: SlideId) -> Option<SlideRenderer> {
        let index = self.slides.iter().position(|s| s.id == id)?;
        Some(self.slides.remove(index))
    }

    pub fn get(&self, id: SlideId) -> Option<&SlideRenderer> {
        self.slides.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: SlideId) -> Option<&mut SlideRenderer> {
        self.slides.iter_mut().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlideRenderer> {
        self.slides.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SlideRenderer> {
        self.slides.iter_mut()
    }

    pub fn ids(&self) -> Vec<SlideId> {
        self.slides.iter().map(|s| s.id).collect()
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}
