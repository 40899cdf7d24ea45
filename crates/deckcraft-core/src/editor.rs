//! Editor facade: one bus, the slides, the mounted tool and the store.

use crate::bus::EventBus;
use crate::config::EditorConfig;
use crate::error::{DeckError, DeckResult};
use crate::events::{Key, Modifiers, PointerInput};
use crate::graphics::{GraphicId, GraphicKind};
use crate::input::{InputRouter, KeyPhase, PointerKind, Propagation, RawPointer};
use crate::slide::{SlideId, SlideRenderer, SlideSet};
use crate::state::SlideStateManager;
use crate::store::{DeckModel, DeckStore, GraphicChange, SlideModel, StoreUpdate};
use crate::tools::{EditorTool, MediaPrompt, MediaTool, ToolContext, ToolKind, ToolMachine, tool_for};
use kurbo::Point;
use std::cell::Ref;
use std::rc::Rc;

/// A slide editor bound to a store.
///
/// Input goes in through the `pointer_*` and `key_*` methods. After each
/// input the editor settles: a tool switch requested by a handler is
/// applied, then queued graphic changes are written to the store and
/// broadcast.
pub struct Editor<S: DeckStore> {
    ctx: Rc<ToolContext>,
    machine: ToolMachine,
    router: InputRouter,
    state: SlideStateManager,
    store: S,
}

impl<S: DeckStore> std::fmt::Debug for Editor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("tool", &self.machine.active_kind())
            .field("slides", &self.ctx.slides().len())
            .field("publisher", &self.state.publisher())
            .finish()
    }
}

impl<S: DeckStore> Editor<S> {
    pub fn new(store: S, config: EditorConfig) -> Self {
        Self::with_state(store, config, SlideStateManager::new())
    }

    pub fn with_state(store: S, config: EditorConfig, state: SlideStateManager) -> Self {
        let ctx = Rc::new(ToolContext::new(EventBus::new(), SlideSet::new(), config));
        Self {
            machine: ToolMachine::new(ctx.clone()),
            ctx,
            router: InputRouter::new(),
            state,
            store,
        }
    }

    pub fn bus(&self) -> &EventBus {
        self.ctx.bus()
    }

    pub fn config(&self) -> &EditorConfig {
        self.ctx.config()
    }

    pub fn context(&self) -> &Rc<ToolContext> {
        &self.ctx
    }

    pub fn state(&self) -> &SlideStateManager {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Add an empty slide.
    pub fn add_slide(&mut self) -> SlideId {
        let slide = SlideRenderer::new(self.ctx.config());
        let id = slide.id();
        self.ctx.slides_mut().insert(slide);
        id
    }

    /// Add (or replace) a slide built from its stored model.
    pub fn load_slide(&mut self, model: &SlideModel) -> SlideId {
        let slide = self.state.load_slide(model, self.ctx.config());
        log::debug!("Loaded slide {} with {} graphics", model.id, slide.len());
        self.ctx.slides_mut().insert(slide);
        model.id
    }

    pub fn load_deck(&mut self, deck: &DeckModel) -> Vec<SlideId> {
        deck.slides.iter().map(|model| self.load_slide(model)).collect()
    }

    pub fn slides(&self) -> Ref<'_, SlideSet> {
        self.ctx.slides()
    }

    pub fn with_slide<R>(&self, id: SlideId, f: impl FnOnce(&mut SlideRenderer) -> R) -> Option<R> {
        self.ctx.with_slide(id, f)
    }

    pub fn active_tool(&self) -> ToolKind {
        self.machine.active_kind()
    }

    /// Mount the default tool for `kind`.
    pub fn set_active_tool(&mut self, kind: ToolKind) {
        self.set_tool(tool_for(kind));
    }

    pub fn set_tool(&mut self, tool: Box<dyn EditorTool>) {
        self.machine.set_active_tool(tool, &mut self.store);
    }

    /// Ask `prompt` for media, then mount the image or video tool. A
    /// cancelled prompt still switches to the (inert) tool.
    pub async fn set_media_tool(&mut self, kind: GraphicKind, prompt: &dyn MediaPrompt) {
        let tool = MediaTool::prepare(kind, prompt).await;
        self.set_tool(Box::new(tool));
    }

    pub fn pointer(&mut self, slide_id: SlideId, raw: RawPointer) -> Propagation {
        let propagation = self.router.route_pointer(&self.ctx, slide_id, raw);
        self.settle();
        propagation
    }

    pub fn pointer_down(&mut self, slide_id: SlideId, client: Point, modifiers: Modifiers) -> Propagation {
        self.pointer(slide_id, RawPointer::new(PointerKind::Down, client, modifiers))
    }

    /// A move with the primary button held.
    pub fn pointer_drag(&mut self, slide_id: SlideId, client: Point, modifiers: Modifiers) -> Propagation {
        let raw = RawPointer::new(PointerKind::Move, client, modifiers).with_pressed(true);
        self.pointer(slide_id, raw)
    }

    pub fn pointer_move(&mut self, slide_id: SlideId, client: Point, modifiers: Modifiers) -> Propagation {
        self.pointer(slide_id, RawPointer::new(PointerKind::Move, client, modifiers))
    }

    pub fn pointer_up(&mut self, slide_id: SlideId, client: Point, modifiers: Modifiers) -> Propagation {
        self.pointer(slide_id, RawPointer::new(PointerKind::Up, client, modifiers))
    }

    /// The pointer left the slide area.
    pub fn pointer_left(&mut self, modifiers: Modifiers) {
        self.router
            .pointer_left(self.ctx.bus(), PointerInput::new(Point::ZERO, modifiers));
        self.settle();
    }

    pub fn key_down(&mut self, slide_id: SlideId, key: &str, modifiers: Modifiers) {
        self.router
            .route_key(self.ctx.bus(), slide_id, KeyPhase::Down, Key::new(key), modifiers);
        self.settle();
    }

    pub fn key_up(&mut self, slide_id: SlideId, key: &str, modifiers: Modifiers) {
        self.router
            .route_key(self.ctx.bus(), slide_id, KeyPhase::Up, Key::new(key), modifiers);
        self.settle();
    }

    /// Change one field of a graphic, store it, and broadcast the change.
    pub fn update_graphic(&mut self, slide_id: SlideId, id: GraphicId, change: GraphicChange) -> DeckResult<bool> {
        let mut slides = self.ctx.slides_mut();
        let slide = slides.get_mut(slide_id).ok_or(DeckError::SlideNotFound(slide_id))?;
        self.state.update_graphic(slide, id, change, &mut self.store)
    }

    /// Apply a broadcast message from another editor to the slide and the
    /// store. Returns whether anything changed; our own echoes change
    /// nothing.
    pub fn apply_remote(&mut self, json: &str) -> DeckResult<bool> {
        let update = StoreUpdate::from_json(json)?;
        let mut slides = self.ctx.slides_mut();
        let slide = slides
            .get_mut(update.slide_id)
            .ok_or(DeckError::SlideNotFound(update.slide_id))?;
        Ok(self.state.apply_update(slide, &update, &mut self.store))
    }

    /// Apply a pending tool request and flush every slide's queued
    /// changes into the store. Returns the number of changes written.
    pub fn settle(&mut self) -> usize {
        if let Some(kind) = self.ctx.take_tool_request() {
            self.set_active_tool(kind);
        }
        let mut written = 0;
        let mut slides = self.ctx.slides_mut();
        for slide in slides.iter_mut() {
            written += self.state.flush(slide, &mut self.store);
        }
        written
    }
}
