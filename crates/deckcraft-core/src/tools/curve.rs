//! Curve drawing tool.

use super::{
    EditorTool, GESTURE_MOVE, GESTURE_UP, KEY_DOWN, SLIDE_DOWN, ToolContext, ToolKind,
    weak_handler,
};
use crate::bus::Subscriptions;
use crate::creator::CurveCreator;
use crate::events::DeckEvent;
use crate::slide::{CursorKind, SlideId, SlideSurface};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Places curve anchors with clicks; dragging after a press pulls out a
/// smooth handle pair. Enter or Escape finishes the curve.
#[derive(Debug, Default)]
pub struct CurveTool {
    session: Option<Rc<CurveSession>>,
}

impl CurveTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EditorTool for CurveTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Curve
    }

    fn mount(&mut self, ctx: &Rc<ToolContext>) {
        log::debug!("Mounting curve tool");
        let session = CurveSession::new(ctx);
        session.arm();
        ctx.set_cursor_everywhere(CursorKind::Crosshair);
        self.session = Some(session);
    }

    fn unmount(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("Unmounting curve tool");
            session.finish(None);
            session.mount.revoke_all();
            if let Some(ctx) = session.ctx.upgrade() {
                ctx.set_cursor_everywhere(CursorKind::Default);
            }
        }
    }
}

#[derive(Debug)]
struct CurveSession {
    this: Weak<CurveSession>,
    ctx: Weak<ToolContext>,
    mount: Subscriptions,
    gesture: Subscriptions,
    creator: RefCell<Option<(SlideId, CurveCreator)>>,
}

impl CurveSession {
    fn new(ctx: &Rc<ToolContext>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            ctx: Rc::downgrade(ctx),
            mount: Subscriptions::new(ctx.bus()),
            gesture: Subscriptions::new(ctx.bus()),
            creator: RefCell::new(None),
        })
    }

    fn arm(&self) {
        self.mount
            .listen_once(SLIDE_DOWN, "curve-tool-start", weak_handler(&self.this, Self::on_start));
    }

    fn on_start(&self, event: &DeckEvent) {
        let (Some(ctx), Some(position)) = (self.ctx.upgrade(), event.position()) else {
            return;
        };
        let started = ctx.with_slide(event.slide_id, |slide| {
            slide.unfocus_all();
            let mut creator = CurveCreator::init_draw(slide, ctx.config());
            creator.init_create_anchor(slide, position);
            creator
        });
        let Some(creator) = started else {
            self.arm();
            return;
        };
        *self.creator.borrow_mut() = Some((event.slide_id, creator));

        // Registered during this dispatch, so the starting press is not
        // seen twice.
        self.gesture
            .listen(SLIDE_DOWN, "curve-tool-anchor", weak_handler(&self.this, Self::on_anchor));
        self.gesture
            .listen(GESTURE_MOVE, "curve-tool-drag", weak_handler(&self.this, Self::on_drag));
        self.gesture
            .listen(GESTURE_UP, "curve-tool-release", weak_handler(&self.this, Self::on_release));
        self.gesture
            .listen(KEY_DOWN, "curve-tool-key", weak_handler(&self.this, Self::on_key));
    }

    fn with_creator<R>(&self, f: impl FnOnce(&mut dyn SlideSurface, &mut CurveCreator) -> R) -> Option<R> {
        let ctx = self.ctx.upgrade()?;
        let mut creator = self.creator.borrow_mut();
        let (slide_id, creator) = creator.as_mut()?;
        ctx.with_slide(*slide_id, |slide| f(slide, creator))
    }

    fn on_anchor(&self, event: &DeckEvent) {
        if let Some(position) = event.position() {
            self.with_creator(|slide, creator| creator.init_create_anchor(slide, position));
        }
    }

    fn on_drag(&self, event: &DeckEvent) {
        if let Some(position) = event.position() {
            self.with_creator(|slide, creator| creator.drag_anchor(slide, position));
        }
    }

    fn on_release(&self, _event: &DeckEvent) {
        self.with_creator(|_, creator| creator.end_create_anchor());
    }

    fn on_key(&self, event: &DeckEvent) {
        if event.key().is_some_and(|k| k.key.is_terminator()) {
            self.finish(Some(ToolKind::Pointer));
        }
    }

    /// Finish the curve in progress, if any, and drop the gesture listeners.
    fn finish(&self, next: Option<ToolKind>) {
        self.gesture.revoke_all();
        let Some((slide_id, creator)) = self.creator.borrow_mut().take() else {
            return;
        };
        let Some(ctx) = self.ctx.upgrade() else {
            return;
        };
        ctx.with_slide(slide_id, |slide| {
            if let Some(id) = creator.end_draw(slide) {
                slide.focus_graphic(id);
                slide.broadcast_set_graphic(id);
            }
        });
        if let Some(next) = next {
            ctx.request_tool(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Modifiers;
    use crate::graphics::AnchorMode;
    use crate::tools::testing::{context, key, pointer};
    use kurbo::Point;

    fn press(ctx: &ToolContext, slide_id: SlideId, x: f64, y: f64) {
        let event = pointer(slide_id, Point::new(x, y), Modifiers::NONE, None);
        ctx.bus().dispatch(SLIDE_DOWN, &event);
        ctx.bus().dispatch(GESTURE_UP, &event);
    }

    #[test]
    fn test_draw_curve_and_finish_with_enter() {
        let (ctx, slide_id) = context();
        let mut tool = CurveTool::new();
        tool.mount(&ctx);

        let bus = ctx.bus();
        bus.dispatch(SLIDE_DOWN, &pointer(slide_id, Point::new(0.0, 0.0), Modifiers::NONE, None));
        bus.dispatch(GESTURE_MOVE, &pointer(slide_id, Point::new(10.0, 0.0), Modifiers::NONE, None));
        bus.dispatch(GESTURE_UP, &pointer(slide_id, Point::new(10.0, 0.0), Modifiers::NONE, None));
        // Moving with no press pending leaves the anchor alone
        bus.dispatch(GESTURE_MOVE, &pointer(slide_id, Point::new(30.0, 30.0), Modifiers::NONE, None));
        press(&ctx, slide_id, 100.0, 0.0);
        bus.dispatch(KEY_DOWN, &key(slide_id, "Enter", Modifiers::NONE));

        let slides = ctx.slides();
        let slide = slides.get(slide_id).unwrap();
        let graphic = slide.graphics().next().unwrap();
        let curve = graphic.as_curve().unwrap();
        assert_eq!(curve.anchors.len(), 2);
        assert_eq!(curve.anchors[0].handle_out, Point::new(10.0, 0.0));
        assert_eq!(curve.anchors[0].handle_in, Point::new(-10.0, 0.0));
        assert!(curve.anchors.iter().all(|a| a.mode == AnchorMode::Free));
        assert!(slide.is_focused(graphic.id()));
        assert_eq!(ctx.take_tool_request(), Some(ToolKind::Pointer));
        assert!(bus.registrations().is_empty());
    }

    #[test]
    fn test_escape_with_one_anchor_discards() {
        let (ctx, slide_id) = context();
        let mut tool = CurveTool::new();
        tool.mount(&ctx);
        press(&ctx, slide_id, 5.0, 5.0);
        ctx.bus().dispatch(KEY_DOWN, &key(slide_id, "Escape", Modifiers::NONE));
        assert!(ctx.slides().get(slide_id).unwrap().is_empty());
    }

    #[test]
    fn test_unmount_finishes_curve() {
        let (ctx, slide_id) = context();
        let mut tool = CurveTool::new();
        tool.mount(&ctx);
        press(&ctx, slide_id, 0.0, 0.0);
        press(&ctx, slide_id, 50.0, 50.0);
        tool.unmount();
        assert!(ctx.bus().registrations().is_empty());
        assert_eq!(ctx.slides().get(slide_id).unwrap().len(), 1);
    }
}
