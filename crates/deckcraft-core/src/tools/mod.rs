//! Tool system for the slide editor.
//!
//! Exactly one [`EditorTool`] is mounted at a time. Mounting registers the
//! tool's listeners on the event bus; unmounting revokes every listener the
//! tool added, including those of a gesture still in flight.

mod curve;
mod draw;
mod media;
mod pointer;

pub use curve::CurveTool;
pub use draw::ShapeTool;
pub use media::{BoxFuture, MediaPrompt, MediaTool};
pub use pointer::PointerTool;

use crate::bus::EventBus;
use crate::config::EditorConfig;
use crate::events::{Action, DeckEvent, EventKind};
use crate::graphics::GraphicKind;
use crate::slide::{CursorKind, SlideId, SlideRenderer, SlideSet, SlideSurface};
use crate::store::DeckStore;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Mounts nothing.
    Null,
    #[default]
    Pointer,
    Rectangle,
    Ellipse,
    Curve,
    Textbox,
    Image,
    Video,
}

impl ToolKind {
    pub const ALL: [ToolKind; 8] = [
        ToolKind::Null,
        ToolKind::Pointer,
        ToolKind::Rectangle,
        ToolKind::Ellipse,
        ToolKind::Curve,
        ToolKind::Textbox,
        ToolKind::Image,
        ToolKind::Video,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Null => "null",
            ToolKind::Pointer => "pointer",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Ellipse => "ellipse",
            ToolKind::Curve => "curve",
            ToolKind::Textbox => "textbox",
            ToolKind::Image => "image",
            ToolKind::Video => "video",
        }
    }

    /// The graphic a drawing tool creates.
    pub fn graphic_kind(&self) -> Option<GraphicKind> {
        match self {
            ToolKind::Null | ToolKind::Pointer => None,
            ToolKind::Rectangle => Some(GraphicKind::Rectangle),
            ToolKind::Ellipse => Some(GraphicKind::Ellipse),
            ToolKind::Curve => Some(GraphicKind::Curve),
            ToolKind::Textbox => Some(GraphicKind::Textbox),
            ToolKind::Image => Some(GraphicKind::Image),
            ToolKind::Video => Some(GraphicKind::Video),
        }
    }

    pub fn for_graphic(kind: GraphicKind) -> Self {
        match kind {
            GraphicKind::Rectangle => ToolKind::Rectangle,
            GraphicKind::Ellipse => ToolKind::Ellipse,
            GraphicKind::Curve => ToolKind::Curve,
            GraphicKind::Textbox => ToolKind::Textbox,
            GraphicKind::Image => ToolKind::Image,
            GraphicKind::Video => ToolKind::Video,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State shared by the mounted tool's handlers.
pub struct ToolContext {
    bus: EventBus,
    slides: RefCell<SlideSet>,
    config: EditorConfig,
    tool_request: Cell<Option<ToolKind>>,
}

impl fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext")
            .field("bus", &self.bus)
            .field("slides", &self.slides.borrow().len())
            .field("tool_request", &self.tool_request.get())
            .finish()
    }
}

impl ToolContext {
    pub fn new(bus: EventBus, slides: SlideSet, config: EditorConfig) -> Self {
        Self {
            bus,
            slides: RefCell::new(slides),
            config,
            tool_request: Cell::new(None),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn slides(&self) -> Ref<'_, SlideSet> {
        self.slides.borrow()
    }

    pub fn slides_mut(&self) -> RefMut<'_, SlideSet> {
        self.slides.borrow_mut()
    }

    /// Run `f` on slide `id`. Events for unknown slides are logged and
    /// dropped.
    pub fn with_slide<R>(&self, id: SlideId, f: impl FnOnce(&mut SlideRenderer) -> R) -> Option<R> {
        let mut slides = self.slides.borrow_mut();
        match slides.get_mut(id) {
            Some(slide) => Some(f(slide)),
            None => {
                log::warn!("Event for unknown slide {id}");
                None
            }
        }
    }

    /// Ask for a tool switch once the current dispatch has returned.
    pub fn request_tool(&self, kind: ToolKind) {
        self.tool_request.set(Some(kind));
    }

    pub fn take_tool_request(&self) -> Option<ToolKind> {
        self.tool_request.take()
    }

    /// Cursor shown on every slide while a tool is mounted.
    pub(crate) fn set_cursor_everywhere(&self, cursor: CursorKind) {
        for slide in self.slides.borrow_mut().iter_mut() {
            slide.set_cursor(cursor);
        }
    }
}

/// An interaction mode of the editor.
pub trait EditorTool {
    fn kind(&self) -> ToolKind;

    /// Register this tool's listeners.
    fn mount(&mut self, ctx: &Rc<ToolContext>);

    /// Revoke every listener this tool registered.
    fn unmount(&mut self);
}

/// The tool that does nothing.
#[derive(Debug, Default)]
pub struct NullTool;

impl EditorTool for NullTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Null
    }

    fn mount(&mut self, _ctx: &Rc<ToolContext>) {}

    fn unmount(&mut self) {}
}

/// The default tool for `kind`. Image and video tools built this way have
/// no media and mount nothing; use [`MediaTool::prepare`] for those.
pub fn tool_for(kind: ToolKind) -> Box<dyn EditorTool> {
    match kind {
        ToolKind::Null => Box::new(NullTool),
        ToolKind::Pointer => Box::new(PointerTool::new()),
        ToolKind::Rectangle => Box::new(ShapeTool::new(GraphicKind::Rectangle)),
        ToolKind::Ellipse => Box::new(ShapeTool::new(GraphicKind::Ellipse)),
        ToolKind::Textbox => Box::new(ShapeTool::new(GraphicKind::Textbox)),
        ToolKind::Curve => Box::new(CurveTool::new()),
        ToolKind::Image => Box::new(MediaTool::inert(GraphicKind::Image)),
        ToolKind::Video => Box::new(MediaTool::inert(GraphicKind::Video)),
    }
}

/// Owns the mounted tool and swaps it.
pub struct ToolMachine {
    ctx: Rc<ToolContext>,
    current: Box<dyn EditorTool>,
}

impl fmt::Debug for ToolMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolMachine")
            .field("current", &self.current.kind())
            .finish()
    }
}

impl ToolMachine {
    /// Start with the null tool mounted.
    pub fn new(ctx: Rc<ToolContext>) -> Self {
        Self {
            ctx,
            current: Box::new(NullTool),
        }
    }

    pub fn context(&self) -> &Rc<ToolContext> {
        &self.ctx
    }

    pub fn active_kind(&self) -> ToolKind {
        self.current.kind()
    }

    /// Unmount the current tool, mount `tool`, and record it in the store.
    pub fn set_active_tool(&mut self, mut tool: Box<dyn EditorTool>, store: &mut dyn DeckStore) {
        log::debug!("Switching tool {} -> {}", self.current.kind(), tool.kind());
        self.current.unmount();
        tool.mount(&self.ctx);
        let kind = tool.kind();
        self.current = tool;
        store.set_active_tool(kind);
    }
}

impl Drop for ToolMachine {
    fn drop(&mut self) {
        self.current.unmount();
    }
}

/// On a Shift/Control/Alt key change during a gesture, replay the last
/// mousemove with the new modifier state so geometry updates at once.
/// Returns whether a move was replayed.
pub fn replay_on_modifier_change(bus: &EventBus, key_event: &DeckEvent, last_move: Option<&DeckEvent>) -> bool {
    let is_modifier = key_event.key().is_some_and(|k| k.key.is_modifier());
    match last_move {
        Some(last) if is_modifier => {
            bus.dispatch(
                EventKind::slide(Action::MouseMove),
                &last.with_modifiers(key_event.modifiers()),
            );
            true
        }
        _ => false,
    }
}

/// Wrap a session method as a bus handler that holds the session weakly.
pub(crate) fn weak_handler<T: 'static>(
    session: &Weak<T>,
    f: fn(&T, &DeckEvent),
) -> impl Fn(&DeckEvent) + 'static {
    let session = session.clone();
    move |event: &DeckEvent| {
        if let Some(session) = session.upgrade() {
            f(&session, event);
        }
    }
}

/// Gesture listeners shared by the drawing and pointer tools.
pub(crate) const GESTURE_MOVE: EventKind = EventKind::slide(Action::MouseMove);
pub(crate) const GESTURE_UP: EventKind = EventKind::slide(Action::MouseUp);
pub(crate) const KEY_DOWN: EventKind = EventKind::slide(Action::KeyDown);
pub(crate) const KEY_UP: EventKind = EventKind::slide(Action::KeyUp);
pub(crate) const SLIDE_DOWN: EventKind = EventKind::slide(Action::MouseDown);

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::events::{BaseEvent, Key, KeyInput, Modifiers, PointerInput, Target};
    use kurbo::Point;

    pub fn context() -> (Rc<ToolContext>, SlideId) {
        let config = EditorConfig::default();
        let slide = SlideRenderer::new(&config);
        let id = slide.id();
        let mut slides = SlideSet::new();
        slides.insert(slide);
        (Rc::new(ToolContext::new(EventBus::new(), slides, config)), id)
    }

    pub fn pointer(slide_id: SlideId, at: Point, modifiers: Modifiers, target: Option<Target>) -> DeckEvent {
        DeckEvent {
            slide_id,
            target,
            base: BaseEvent::Pointer(PointerInput {
                pressed: true,
                ..PointerInput::new(at, modifiers)
            }),
        }
    }

    pub fn key(slide_id: SlideId, name: &str, modifiers: Modifiers) -> DeckEvent {
        DeckEvent {
            slide_id,
            target: None,
            base: BaseEvent::Key(KeyInput {
                key: Key::new(name),
                modifiers,
            }),
        }
    }
}
