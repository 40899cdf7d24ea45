//! Drawing tool for box-shaped graphics.

use super::{
    EditorTool, GESTURE_MOVE, GESTURE_UP, KEY_DOWN, KEY_UP, SLIDE_DOWN, ToolContext, ToolKind,
    replay_on_modifier_change, weak_handler,
};
use crate::bus::Subscriptions;
use crate::creator::{BoxCreator, MediaSeed};
use crate::events::DeckEvent;
use crate::graphics::GraphicKind;
use crate::slide::{CursorKind, SlideId, SlideSurface};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Draws a rectangle, ellipse, textbox, image or video by dragging.
///
/// One drawing per mount: when the drag ends the tool asks for the pointer
/// tool.
#[derive(Debug)]
pub struct ShapeTool {
    kind: GraphicKind,
    seed: Option<MediaSeed>,
    session: Option<Rc<DrawSession>>,
}

impl ShapeTool {
    pub fn new(kind: GraphicKind) -> Self {
        Self {
            kind,
            seed: None,
            session: None,
        }
    }

    /// A tool drawing image or video graphics from `seed`.
    pub fn with_seed(kind: GraphicKind, seed: MediaSeed) -> Self {
        Self {
            kind,
            seed: Some(seed),
            session: None,
        }
    }

    pub fn graphic_kind(&self) -> GraphicKind {
        self.kind
    }

    pub fn seed(&self) -> Option<&MediaSeed> {
        self.seed.as_ref()
    }
}

impl EditorTool for ShapeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::for_graphic(self.kind)
    }

    fn mount(&mut self, ctx: &Rc<ToolContext>) {
        log::debug!("Mounting {} tool", self.kind);
        let session = DrawSession::new(ctx, self.kind, self.seed.clone());
        session.arm();
        ctx.set_cursor_everywhere(CursorKind::Crosshair);
        self.session = Some(session);
    }

    fn unmount(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("Unmounting {} tool", self.kind);
            session.finish(None);
            session.mount.revoke_all();
            if let Some(ctx) = session.ctx.upgrade() {
                ctx.set_cursor_everywhere(CursorKind::Default);
            }
        }
    }
}

#[derive(Debug)]
struct DrawSession {
    this: Weak<DrawSession>,
    ctx: Weak<ToolContext>,
    kind: GraphicKind,
    seed: Option<MediaSeed>,
    mount: Subscriptions,
    gesture: Subscriptions,
    creator: RefCell<Option<(SlideId, BoxCreator)>>,
    last_move: RefCell<Option<DeckEvent>>,
}

impl DrawSession {
    fn new(ctx: &Rc<ToolContext>, kind: GraphicKind, seed: Option<MediaSeed>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            ctx: Rc::downgrade(ctx),
            kind,
            seed,
            mount: Subscriptions::new(ctx.bus()),
            gesture: Subscriptions::new(ctx.bus()),
            creator: RefCell::new(None),
            last_move: RefCell::new(None),
        })
    }

    fn id(&self, suffix: &str) -> String {
        format!("{}-tool-{suffix}", self.kind)
    }

    fn arm(&self) {
        self.mount
            .listen_once(SLIDE_DOWN, self.id("start"), weak_handler(&self.this, Self::on_start));
    }

    fn on_start(&self, event: &DeckEvent) {
        let (Some(ctx), Some(position)) = (self.ctx.upgrade(), event.position()) else {
            return;
        };
        let created = ctx.with_slide(event.slide_id, |slide| {
            slide.unfocus_all();
            slide.lock_cursor(CursorKind::Crosshair);
            BoxCreator::create(slide, self.kind, position, self.seed.as_ref(), ctx.config())
        });
        let Some(mut creator) = created.flatten() else {
            log::warn!("Cannot draw {} here", self.kind);
            ctx.with_slide(event.slide_id, |slide| slide.unlock_cursor());
            self.arm();
            return;
        };
        creator.init_resize(position);
        *self.creator.borrow_mut() = Some((event.slide_id, creator));

        self.gesture
            .listen(GESTURE_MOVE, self.id("resize"), weak_handler(&self.this, Self::on_move));
        self.gesture
            .listen(GESTURE_UP, self.id("end"), weak_handler(&self.this, Self::on_end));
        self.gesture
            .listen(KEY_DOWN, self.id("modifier-down"), weak_handler(&self.this, Self::on_key));
        self.gesture
            .listen(KEY_UP, self.id("modifier-up"), weak_handler(&self.this, Self::on_key));
    }

    fn on_move(&self, event: &DeckEvent) {
        *self.last_move.borrow_mut() = Some(event.clone());
        self.resize_to(event);
    }

    fn resize_to(&self, event: &DeckEvent) {
        let (Some(ctx), Some(position)) = (self.ctx.upgrade(), event.position()) else {
            return;
        };
        let creator = self.creator.borrow();
        let Some((slide_id, creator)) = creator.as_ref() else {
            return;
        };
        let keep_square = event.modifiers().shift;
        ctx.with_slide(*slide_id, |slide| creator.update(slide, position, keep_square));
    }

    fn on_key(&self, event: &DeckEvent) {
        let Some(ctx) = self.ctx.upgrade() else {
            return;
        };
        let last = self.last_move.borrow().clone();
        replay_on_modifier_change(ctx.bus(), event, last.as_ref());
    }

    fn on_end(&self, event: &DeckEvent) {
        self.resize_to(event);
        self.finish(Some(ToolKind::Pointer));
    }

    /// End the drawing in progress, if any, and drop the gesture listeners.
    fn finish(&self, next: Option<ToolKind>) {
        self.gesture.revoke_all();
        self.last_move.borrow_mut().take();
        let Some((slide_id, mut creator)) = self.creator.borrow_mut().take() else {
            return;
        };
        let Some(ctx) = self.ctx.upgrade() else {
            return;
        };
        ctx.with_slide(slide_id, |slide| {
            let id = creator.end_resize(slide);
            slide.unlock_cursor();
            slide.focus_graphic(id);
            slide.broadcast_set_graphic(id);
        });
        if let Some(next) = next {
            ctx.request_tool(next);
        }
    }
}
