//! Keeps slide renderers, the store, and the broadcast channel in step.

use crate::config::EditorConfig;
use crate::error::{DeckError, DeckResult};
use crate::graphics::{GraphicId, GraphicRenderer, RgbaColor};
use crate::slide::{PendingChange, SlideId, SlideRenderer, SlideSurface};
use crate::store::{DeckStore, GraphicChange, GraphicModel, PublisherId, SlideModel, StoreUpdate};
use std::cell::Cell;
use uuid::Uuid;

/// Moves graphic state between renderers and the store.
///
/// Every broadcast is tagged with this editor's publisher id, and updates
/// carrying the same id are ignored when they come back.
#[derive(Debug)]
pub struct SlideStateManager {
    publisher: PublisherId,
    dropped: Cell<usize>,
}

impl Default for SlideStateManager {
    fn default() -> Self {
        Self::with_publisher(Uuid::new_v4())
    }
}

impl SlideStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_publisher(publisher: PublisherId) -> Self {
        Self {
            publisher,
            dropped: Cell::new(0),
        }
    }

    pub fn publisher(&self) -> PublisherId {
        self.publisher
    }

    /// Number of ids skipped because they did not resolve to a graphic.
    pub fn dropped_conversions(&self) -> usize {
        self.dropped.get()
    }

    fn drop_conversion(&self, slide_id: SlideId, id: GraphicId) {
        log::warn!("Skipping {id} on slide {slide_id}: not a convertible graphic");
        self.dropped.set(self.dropped.get() + 1);
    }

    fn update(&self, slide_id: SlideId, graphic_id: GraphicId, change: GraphicChange) -> StoreUpdate {
        StoreUpdate {
            publisher: self.publisher,
            slide_id,
            graphic_id,
            change,
        }
    }

    /// Write the renderer's graphic `id` into the store and broadcast it.
    /// Returns false (and counts a dropped conversion) if the slide has no
    /// such graphic.
    pub fn set_graphic_from_renderer(
        &self,
        slide: &SlideRenderer,
        id: GraphicId,
        store: &mut dyn DeckStore,
    ) -> bool {
        let Some(graphic) = slide.graphic(id) else {
            self.drop_conversion(slide.id(), id);
            return false;
        };
        let model = GraphicModel::from(graphic);
        store.set_graphic(slide.id(), model.clone());
        store.broadcast(self.update(slide.id(), id, GraphicChange::SetGraphic(model)));
        true
    }

    /// Remove graphic `id` from the store and broadcast the removal.
    pub fn remove_graphic_from_renderer(
        &self,
        slide_id: SlideId,
        id: GraphicId,
        store: &mut dyn DeckStore,
    ) {
        store.remove_graphic(slide_id, id);
        store.broadcast(self.update(slide_id, id, GraphicChange::RemoveGraphic));
    }

    /// Replace (or add) a renderer graphic from its store model.
    pub fn set_graphic_from_store(&self, slide: &mut SlideRenderer, model: GraphicModel) -> GraphicId {
        let graphic = GraphicRenderer::from(model);
        let id = graphic.id();
        slide.set_graphic(graphic);
        id
    }

    /// Build a renderer for a stored slide.
    pub fn load_slide(&self, model: &SlideModel, config: &EditorConfig) -> SlideRenderer {
        let mut slide = SlideRenderer::with_id(model.id, config);
        for graphic in model.graphics.values() {
            self.set_graphic_from_store(&mut slide, graphic.clone());
        }
        slide
    }

    /// Apply an update received from the broadcast channel to the renderer
    /// and commit the result to `store`, without broadcasting it again.
    /// Returns false when it was ignored: our own echo, another slide, or a
    /// graphic this slide does not have.
    pub fn apply_update(&self, slide: &mut SlideRenderer, update: &StoreUpdate, store: &mut dyn DeckStore) -> bool {
        if update.publisher == self.publisher {
            log::debug!("Ignoring own update for {}", update.graphic_id);
            return false;
        }
        if update.slide_id != slide.id() {
            return false;
        }
        let slide_id = slide.id();
        match &update.change {
            GraphicChange::SetGraphic(model) => {
                self.set_graphic_from_store(slide, model.clone());
                store.set_graphic(slide_id, model.clone());
                true
            }
            GraphicChange::RemoveGraphic => {
                let removed = slide.remove_graphic(update.graphic_id).is_some();
                if removed {
                    store.remove_graphic(slide_id, update.graphic_id);
                }
                removed
            }
            change => match slide.graphic_mut(update.graphic_id) {
                Some(graphic) => {
                    let applied = apply_change(graphic, change);
                    if applied {
                        store.set_graphic(slide_id, GraphicModel::from(&*graphic));
                    }
                    applied
                }
                None => {
                    log::warn!("Update for unknown graphic {}", update.graphic_id);
                    false
                }
            },
        }
    }

    /// Push every change queued on the slide into the store. Returns the
    /// number of changes written.
    pub fn flush(&self, slide: &mut SlideRenderer, store: &mut dyn DeckStore) -> usize {
        let mut written = 0;
        for change in slide.take_outbox() {
            match change {
                PendingChange::Set(id) => {
                    if self.set_graphic_from_renderer(slide, id, store) {
                        written += 1;
                    }
                }
                PendingChange::Remove(id) => {
                    self.remove_graphic_from_renderer(slide.id(), id, store);
                    written += 1;
                }
            }
        }
        written
    }

    /// Apply one field change to a renderer graphic, store the result and
    /// broadcast the change. Returns false if the change does not apply to
    /// this kind of graphic.
    pub fn update_graphic(
        &self,
        slide: &mut SlideRenderer,
        id: GraphicId,
        change: GraphicChange,
        store: &mut dyn DeckStore,
    ) -> DeckResult<bool> {
        let slide_id = slide.id();
        let graphic = slide.graphic_mut(id).ok_or(DeckError::GraphicNotFound(id))?;
        if !apply_change(graphic, &change) {
            return Ok(false);
        }
        store.set_graphic(slide_id, GraphicModel::from(&*graphic));
        store.broadcast(self.update(slide_id, id, change));
        Ok(true)
    }

    pub fn set_x(&self, slide: &mut SlideRenderer, id: GraphicId, x: f64, store: &mut dyn DeckStore) -> DeckResult<bool> {
        self.update_graphic(slide, id, GraphicChange::SetX(x), store)
    }

    pub fn set_y(&self, slide: &mut SlideRenderer, id: GraphicId, y: f64, store: &mut dyn DeckStore) -> DeckResult<bool> {
        self.update_graphic(slide, id, GraphicChange::SetY(y), store)
    }

    pub fn set_fill_color(
        &self,
        slide: &mut SlideRenderer,
        id: GraphicId,
        color: Option<RgbaColor>,
        store: &mut dyn DeckStore,
    ) -> DeckResult<bool> {
        self.update_graphic(slide, id, GraphicChange::SetFillColor(color), store)
    }

    pub fn set_stroke_color(
        &self,
        slide: &mut SlideRenderer,
        id: GraphicId,
        color: RgbaColor,
        store: &mut dyn DeckStore,
    ) -> DeckResult<bool> {
        self.update_graphic(slide, id, GraphicChange::SetStrokeColor(color), store)
    }

    pub fn set_stroke_width(
        &self,
        slide: &mut SlideRenderer,
        id: GraphicId,
        width: f64,
        store: &mut dyn DeckStore,
    ) -> DeckResult<bool> {
        self.update_graphic(slide, id, GraphicChange::SetStrokeWidth(width), store)
    }

    pub fn set_width(&self, slide: &mut SlideRenderer, id: GraphicId, width: f64, store: &mut dyn DeckStore) -> DeckResult<bool> {
        self.update_graphic(slide, id, GraphicChange::SetWidth(width), store)
    }

    pub fn set_height(&self, slide: &mut SlideRenderer, id: GraphicId, height: f64, store: &mut dyn DeckStore) -> DeckResult<bool> {
        self.update_graphic(slide, id, GraphicChange::SetHeight(height), store)
    }

    pub fn set_rotation(
        &self,
        slide: &mut SlideRenderer,
        id: GraphicId,
        degrees: f64,
        store: &mut dyn DeckStore,
    ) -> DeckResult<bool> {
        self.update_graphic(slide, id, GraphicChange::SetRotation(degrees), store)
    }

    pub fn set_text(
        &self,
        slide: &mut SlideRenderer,
        id: GraphicId,
        text: impl Into<String>,
        store: &mut dyn DeckStore,
    ) -> DeckResult<bool> {
        self.update_graphic(slide, id, GraphicChange::SetText(text.into()), store)
    }
}

/// Apply a field change to `graphic`. Whole-graphic changes and text on
/// anything but a textbox return false.
pub fn apply_change(graphic: &mut GraphicRenderer, change: &GraphicChange) -> bool {
    match change {
        GraphicChange::SetX(x) => graphic.set_x(*x),
        GraphicChange::SetY(y) => graphic.set_y(*y),
        GraphicChange::SetFillColor(color) => graphic.style_mut().fill_color = *color,
        GraphicChange::SetStrokeColor(color) => graphic.style_mut().stroke_color = *color,
        GraphicChange::SetStrokeWidth(width) => graphic.style_mut().stroke_width = width.max(0.0),
        GraphicChange::SetWidth(width) => graphic.set_width(*width),
        GraphicChange::SetHeight(height) => graphic.set_height(*height),
        GraphicChange::SetRotation(degrees) => graphic.set_rotation(*degrees),
        GraphicChange::SetText(text) => return graphic.set_text(text.clone()),
        GraphicChange::SetGraphic(_) | GraphicChange::RemoveGraphic => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{Rectangle, Textbox};
    use crate::store::MemoryStore;
    use kurbo::Point;

    fn setup() -> (SlideRenderer, GraphicId, MemoryStore) {
        let mut slide = SlideRenderer::new(&EditorConfig::default());
        let id = slide.create_graphic(Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0).into());
        (slide, id, MemoryStore::new())
    }

    #[test]
    fn test_flush_writes_store_and_broadcasts() {
        let (mut slide, id, mut store) = setup();
        let state = SlideStateManager::new();
        slide.broadcast_set_graphic(id);
        assert_eq!(state.flush(&mut slide, &mut store), 1);
        assert!(store.graphic(slide.id(), id).is_some());

        let sent = store.take_outgoing();
        assert_eq!(sent.len(), 1);
        let update = StoreUpdate::from_json(&sent[0]).unwrap();
        assert_eq!(update.publisher, state.publisher());
        assert!(matches!(update.change, GraphicChange::SetGraphic(_)));
        assert_eq!(state.flush(&mut slide, &mut store), 0);
    }

    #[test]
    fn test_own_updates_are_ignored() {
        let (mut slide, id, mut store) = setup();
        let state = SlideStateManager::new();
        state.set_x(&mut slide, id, 42.0, &mut store).unwrap();
        let echo = StoreUpdate::from_json(&store.take_outgoing()[0]).unwrap();
        let before = slide.graphic(id).cloned();

        let mut replay = echo.clone();
        replay.change = GraphicChange::SetX(0.0);
        assert!(!state.apply_update(&mut slide, &replay, &mut store));
        assert_eq!(slide.graphic(id).cloned(), before);
        assert!(store.take_outgoing().is_empty());

        let remote = SlideStateManager::new();
        assert!(remote.publisher() != state.publisher());
        let mut other = slide.clone();
        let mut other_store = MemoryStore::new();
        assert!(remote.apply_update(&mut other, &echo, &mut other_store));
        assert!(other_store.take_outgoing().is_empty());
    }

    #[test]
    fn test_remote_updates_apply() {
        let (mut slide, id, mut store) = setup();
        let state = SlideStateManager::new();
        let remote = Uuid::new_v4();
        let update = |change| StoreUpdate {
            publisher: remote,
            slide_id: slide.id(),
            graphic_id: id,
            change,
        };
        let set_width = update(GraphicChange::SetWidth(300.0));
        let recolor = update(GraphicChange::SetFillColor(None));
        let remove = update(GraphicChange::RemoveGraphic);

        assert!(state.apply_update(&mut slide, &set_width, &mut store));
        assert!((slide.graphic(id).unwrap().width() - 300.0).abs() < f64::EPSILON);
        assert!(state.apply_update(&mut slide, &recolor, &mut store));
        assert!(slide.graphic(id).unwrap().style().fill_color.is_none());
        // The store holds the same value as the renderer
        assert_eq!(
            store.graphic(slide.id(), id),
            Some(&GraphicModel::from(slide.graphic(id).unwrap()))
        );

        assert!(state.apply_update(&mut slide, &remove, &mut store));
        assert!(slide.graphic(id).is_none());
        assert!(store.graphic(slide.id(), id).is_none());
        assert!(!state.apply_update(&mut slide, &set_width, &mut store));
        assert!(store.take_outgoing().is_empty());
    }

    #[test]
    fn test_remote_set_graphic_adds_graphic() {
        let config = EditorConfig::default();
        let mut slide = SlideRenderer::new(&config);
        let state = SlideStateManager::new();
        let textbox: GraphicRenderer = Textbox::new(Point::ZERO, 10.0, 10.0, 12.0).into();
        let update = StoreUpdate {
            publisher: Uuid::new_v4(),
            slide_id: slide.id(),
            graphic_id: textbox.id(),
            change: GraphicChange::SetGraphic(GraphicModel::from(&textbox)),
        };
        let mut store = MemoryStore::new();
        assert!(state.apply_update(&mut slide, &update, &mut store));
        assert_eq!(slide.graphic(textbox.id()), Some(&textbox));
        assert_eq!(store.graphic(slide.id(), textbox.id()), Some(&GraphicModel::from(&textbox)));
        // Remote writes are not queued for re-broadcast
        assert!(slide.take_outbox().is_empty());
        assert!(store.take_outgoing().is_empty());
    }

    #[test]
    fn test_missing_ids_are_counted() {
        let (mut slide, _, mut store) = setup();
        let state = SlideStateManager::new();
        let helper_id = Uuid::new_v4();
        slide.broadcast_set_graphic(helper_id);
        assert_eq!(state.flush(&mut slide, &mut store), 0);
        assert_eq!(state.dropped_conversions(), 1);
        assert!(store.take_outgoing().is_empty());
    }

    #[test]
    fn test_field_setters() {
        let (mut slide, id, mut store) = setup();
        let state = SlideStateManager::new();
        assert!(!state.set_text(&mut slide, id, "nope", &mut store).unwrap());
        assert!(state.set_rotation(&mut slide, id, 45.0, &mut store).unwrap());
        assert!((slide.graphic(id).unwrap().rotation() - 45.0).abs() < f64::EPSILON);
        let GraphicModel::Rectangle(stored) = store.graphic(slide.id(), id).unwrap() else {
            panic!("expected rectangle");
        };
        assert!((stored.rotation - 45.0).abs() < f64::EPSILON);
        assert_eq!(store.take_outgoing().len(), 1);
        assert!(matches!(
            state.set_y(&mut slide, Uuid::new_v4(), 1.0, &mut store),
            Err(DeckError::GraphicNotFound(_))
        ));
    }

    #[test]
    fn test_load_slide() {
        let (slide, id, mut store) = setup();
        let state = SlideStateManager::new();
        state.set_graphic_from_renderer(&slide, id, &mut store);
        let model = store.deck().slide(slide.id()).unwrap();
        let loaded = state.load_slide(model, &EditorConfig::default());
        assert_eq!(loaded.id(), slide.id());
        assert_eq!(loaded.graphic(id), slide.graphic(id));
    }
}
