//! Pointer tool: select, move, resize, rotate and edit curve anchors.

use super::{
    EditorTool, GESTURE_MOVE, GESTURE_UP, KEY_DOWN, KEY_UP, SLIDE_DOWN, ToolContext, ToolKind,
    replay_on_modifier_change, weak_handler,
};
use crate::bus::{HandlerId, Subscriptions};
use crate::events::{Action, DeckEvent, EventKind, Modifiers, Scope, TargetPart};
use crate::graphics::{GraphicId, GraphicKind};
use crate::mutator::{AnchorGesture, MoveGesture, Mutator, RotateGesture, VertexGesture};
use crate::slide::{CursorKind, SlideId, SlideRenderer, SlideSurface};
use kurbo::Point;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

const HELPER_STARTS: [(Scope, &str); 3] = [
    (Scope::Vertex, "pointer-tool-vertex"),
    (Scope::Rotator, "pointer-tool-rotate"),
    (Scope::CurveAnchor, "pointer-tool-anchor"),
];

/// The selection tool.
///
/// Press on a graphic to focus and drag it (Shift toggles focus, Alt drags
/// a copy). Press on a vertex, the rotator or a curve anchor of a focused
/// graphic to resize, rotate or reshape it. Delete removes the focused
/// graphics.
#[derive(Debug, Default)]
pub struct PointerTool {
    session: Option<Rc<PointerSession>>,
}

impl PointerTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EditorTool for PointerTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Pointer
    }

    fn mount(&mut self, ctx: &Rc<ToolContext>) {
        log::debug!("Mounting pointer tool");
        let session = PointerSession::new(ctx);
        session.listen_continuous();
        session.arm();
        ctx.set_cursor_everywhere(CursorKind::Default);
        self.session = Some(session);
    }

    fn unmount(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("Unmounting pointer tool");
            session.end_gesture(None);
            session.mount.revoke_all();
        }
    }
}

#[derive(Debug)]
enum Gesture {
    Move {
        moves: Vec<MoveGesture>,
        duplicated: bool,
    },
    Vertex(VertexGesture),
    Rotate(RotateGesture),
    Anchor(AnchorGesture),
}

impl Gesture {
    fn graphic_ids(&self) -> Vec<GraphicId> {
        match self {
            Gesture::Move { moves, .. } => moves.iter().map(MoveGesture::graphic_id).collect(),
            Gesture::Vertex(g) => vec![g.graphic_id()],
            Gesture::Rotate(g) => vec![g.graphic_id()],
            Gesture::Anchor(g) => vec![g.graphic_id()],
        }
    }

    fn apply(&self, slide: &mut SlideRenderer, position: Point, modifiers: Modifiers) {
        match self {
            Gesture::Move { moves, .. } => {
                for gesture in moves {
                    if let Some(graphic) = slide.graphic_mut(gesture.graphic_id()) {
                        gesture.update(graphic, position, modifiers);
                    }
                }
            }
            Gesture::Vertex(gesture) => {
                if let Some(graphic) = slide.graphic_mut(gesture.graphic_id()) {
                    gesture.update(graphic, position, modifiers.shift);
                }
            }
            Gesture::Rotate(gesture) => {
                if let Some(graphic) = slide.graphic_mut(gesture.graphic_id()) {
                    gesture.update(graphic, position, modifiers.shift);
                }
            }
            Gesture::Anchor(gesture) => {
                if let Some(graphic) = slide.graphic_mut(gesture.graphic_id()) {
                    gesture.update(graphic, position);
                }
            }
        }
    }

    /// Whether ending at `position` leaves nothing to broadcast.
    fn is_noop(&self, position: Point, modifiers: Modifiers) -> bool {
        match self {
            Gesture::Move { moves, duplicated } => {
                !duplicated && moves.iter().all(|g| g.is_noop(position, modifiers))
            }
            _ => false,
        }
    }
}

#[derive(Debug)]
struct ActiveGesture {
    slide_id: SlideId,
    gesture: Gesture,
}

#[derive(Debug)]
struct PointerSession {
    this: Weak<PointerSession>,
    ctx: Weak<ToolContext>,
    mount: Subscriptions,
    gesture: Subscriptions,
    active: RefCell<Option<ActiveGesture>>,
    last_move: RefCell<Option<DeckEvent>>,
}

impl PointerSession {
    fn new(ctx: &Rc<ToolContext>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            ctx: Rc::downgrade(ctx),
            mount: Subscriptions::new(ctx.bus()),
            gesture: Subscriptions::new(ctx.bus()),
            active: RefCell::new(None),
            last_move: RefCell::new(None),
        })
    }

    fn is_active(&self) -> bool {
        self.active.borrow().is_some()
    }

    fn listen_continuous(&self) {
        for kind in GraphicKind::ALL {
            self.mount.listen(
                EventKind::graphic(kind, Action::MouseOver),
                format!("pointer-tool-mark-{kind}"),
                weak_handler(&self.this, Self::on_over),
            );
            self.mount.listen(
                EventKind::graphic(kind, Action::MouseOut),
                format!("pointer-tool-unmark-{kind}"),
                weak_handler(&self.this, Self::on_out),
            );
        }
        self.mount
            .listen(SLIDE_DOWN, "pointer-tool-deselect", weak_handler(&self.this, Self::on_slide_down));
        self.mount
            .listen(GESTURE_MOVE, "pointer-tool-cursor", weak_handler(&self.this, Self::on_hover_move));
        self.mount
            .listen(KEY_DOWN, "pointer-tool-delete", weak_handler(&self.this, Self::on_delete));
    }

    /// (Re-)register the gesture-starting once listeners that are not
    /// currently armed.
    fn arm(&self) {
        let bus = self.mount.bus();
        for kind in GraphicKind::ALL {
            let event_kind = EventKind::graphic(kind, Action::MouseDown);
            let id = HandlerId::from(format!("pointer-tool-move-{kind}"));
            if !bus.is_listening(event_kind, &id) {
                self.mount
                    .listen_once(event_kind, id, weak_handler(&self.this, Self::on_graphic_down));
            }
        }
        for (scope, id) in HELPER_STARTS {
            let event_kind = EventKind::new(scope, Action::MouseDown);
            let id = HandlerId::from(id);
            if !bus.is_listening(event_kind, &id) {
                self.mount
                    .listen_once(event_kind, id, weak_handler(&self.this, Self::on_helper_down));
            }
        }
    }

    fn on_graphic_down(&self, event: &DeckEvent) {
        let started = self.start_move(event);
        if !started {
            self.arm();
        }
    }

    fn start_move(&self, event: &DeckEvent) -> bool {
        if self.is_active() {
            return false;
        }
        let (Some(ctx), Some(target), Some(position)) =
            (self.ctx.upgrade(), event.target, event.position())
        else {
            return false;
        };
        let modifiers = event.modifiers();
        let moves = ctx.with_slide(event.slide_id, |slide| {
            let id = target.graphic_id;
            if modifiers.shift {
                if slide.is_focused(id) {
                    slide.unfocus_graphic(id);
                    return None;
                }
                slide.focus_graphic(id);
            } else if !slide.is_focused(id) {
                slide.unfocus_all();
                slide.focus_graphic(id);
            }
            let mut focused = slide.focused();
            if modifiers.alt {
                focused = duplicate_all(slide, &focused);
                slide.unfocus_all();
                slide.focus_bulk(&focused);
            }
            let moves: Vec<MoveGesture> = focused
                .iter()
                .filter_map(|&id| slide.graphic(id))
                .map(|graphic| Mutator::new(graphic).graphic_move_handler(position))
                .collect();
            slide.lock_cursor(CursorKind::Grabbing);
            Some(moves)
        });
        match moves.flatten() {
            Some(moves) if !moves.is_empty() => {
                self.start(
                    event.slide_id,
                    Gesture::Move {
                        moves,
                        duplicated: modifiers.alt,
                    },
                );
                true
            }
            _ => false,
        }
    }

    fn on_helper_down(&self, event: &DeckEvent) {
        let started = self.start_helper_drag(event);
        if !started {
            self.arm();
        }
    }

    fn start_helper_drag(&self, event: &DeckEvent) -> bool {
        if self.is_active() {
            return false;
        }
        let (Some(ctx), Some(target), Some(position)) =
            (self.ctx.upgrade(), event.target, event.position())
        else {
            return false;
        };
        let snap_step = ctx.config().rotation_snap_degrees;
        let gesture = ctx.with_slide(event.slide_id, |slide| {
            let mutator = Mutator::new(slide.graphic(target.graphic_id)?);
            let gesture = match target.part {
                TargetPart::Vertex(role) => Gesture::Vertex(mutator.init_vertex_move(role, position)),
                TargetPart::Rotator => Gesture::Rotate(mutator.init_rotate(position, snap_step)),
                TargetPart::CurveAnchor { index, role } => {
                    Gesture::Anchor(mutator.anchor_handler(index, role, position)?)
                }
                TargetPart::Graphic => return None,
            };
            slide.lock_cursor(CursorKind::Grabbing);
            Some(gesture)
        });
        match gesture.flatten() {
            Some(gesture) => {
                self.start(event.slide_id, gesture);
                true
            }
            None => false,
        }
    }

    fn start(&self, slide_id: SlideId, gesture: Gesture) {
        *self.active.borrow_mut() = Some(ActiveGesture { slide_id, gesture });
        self.gesture
            .listen(GESTURE_MOVE, "pointer-tool-drag", weak_handler(&self.this, Self::on_drag));
        self.gesture
            .listen(GESTURE_UP, "pointer-tool-drop", weak_handler(&self.this, Self::on_drop));
        self.gesture
            .listen(KEY_DOWN, "pointer-tool-modifier-down", weak_handler(&self.this, Self::on_modifier));
        self.gesture
            .listen(KEY_UP, "pointer-tool-modifier-up", weak_handler(&self.this, Self::on_modifier));
    }

    fn on_drag(&self, event: &DeckEvent) {
        *self.last_move.borrow_mut() = Some(event.clone());
        self.apply(event);
    }

    fn apply(&self, event: &DeckEvent) {
        let (Some(ctx), Some(position)) = (self.ctx.upgrade(), event.position()) else {
            return;
        };
        let active = self.active.borrow();
        if let Some(active) = active.as_ref() {
            ctx.with_slide(active.slide_id, |slide| {
                active.gesture.apply(slide, position, event.modifiers());
            });
        }
    }

    fn on_modifier(&self, event: &DeckEvent) {
        let Some(ctx) = self.ctx.upgrade() else {
            return;
        };
        let last = self.last_move.borrow().clone();
        replay_on_modifier_change(ctx.bus(), event, last.as_ref());
    }

    fn on_drop(&self, event: &DeckEvent) {
        self.apply(event);
        self.end_gesture(Some(event));
        self.arm();
    }

    /// Finish the gesture in progress, broadcasting what it changed.
    fn end_gesture(&self, drop_event: Option<&DeckEvent>) {
        self.gesture.revoke_all();
        self.last_move.borrow_mut().take();
        let Some(active) = self.active.borrow_mut().take() else {
            return;
        };
        let Some(ctx) = self.ctx.upgrade() else {
            return;
        };
        let unchanged = drop_event
            .and_then(|e| e.position().map(|p| (p, e.modifiers())))
            .is_some_and(|(position, modifiers)| active.gesture.is_noop(position, modifiers));
        ctx.with_slide(active.slide_id, |slide| {
            slide.unlock_cursor();
            if !unchanged {
                for id in active.gesture.graphic_ids() {
                    slide.broadcast_set_graphic(id);
                }
            }
        });
    }

    fn on_over(&self, event: &DeckEvent) {
        if let (Some(ctx), Some(target)) = (self.ctx.upgrade(), event.target) {
            ctx.with_slide(event.slide_id, |slide| slide.mark_graphic(target.graphic_id));
        }
    }

    fn on_out(&self, event: &DeckEvent) {
        if let (Some(ctx), Some(target)) = (self.ctx.upgrade(), event.target) {
            ctx.with_slide(event.slide_id, |slide| slide.unmark_graphic(target.graphic_id));
        }
    }

    fn on_slide_down(&self, event: &DeckEvent) {
        if event.target.is_some() || event.modifiers().shift || self.is_active() {
            return;
        }
        if let Some(ctx) = self.ctx.upgrade() {
            ctx.with_slide(event.slide_id, |slide| slide.unfocus_all());
        }
    }

    fn on_hover_move(&self, event: &DeckEvent) {
        if self.is_active() {
            return;
        }
        let cursor = match event.target {
            Some(target) if target.is_helper() => CursorKind::Grab,
            Some(_) => CursorKind::Move,
            None => CursorKind::Default,
        };
        if let Some(ctx) = self.ctx.upgrade() {
            ctx.with_slide(event.slide_id, |slide| slide.set_cursor(cursor));
        }
    }

    fn on_delete(&self, event: &DeckEvent) {
        if self.is_active() || !event.key().is_some_and(|k| k.key.is_delete()) {
            return;
        }
        let Some(ctx) = self.ctx.upgrade() else {
            return;
        };
        ctx.with_slide(event.slide_id, |slide| {
            for id in slide.focused() {
                slide.remove_graphic(id);
                slide.broadcast_remove_graphic(id);
            }
        });
    }
}

/// Copy each graphic in `ids` under a new id, on top. Returns the copies'
/// ids.
fn duplicate_all(slide: &mut SlideRenderer, ids: &[GraphicId]) -> Vec<GraphicId> {
    ids.iter()
        .filter_map(|&id| slide.graphic(id).map(|g| g.duplicate()))
        .collect::<Vec<_>>()
        .into_iter()
        .map(|copy| slide.create_graphic(copy))
        .collect()
}
