//! Routing of raw pointer and keyboard input onto the event bus.
//!
//! A pointer event is converted to slide coordinates, hit-tested, and
//! decorated: a hit dispatches the variant kind (`deck-rectangle-mousedown`,
//! `deck-vertex-mousedown`, ...) followed by the generic slide kind, both
//! carrying the target. A miss dispatches the slide kind once with no
//! target.

use crate::bus::EventBus;
use crate::events::{
    Action, BaseEvent, DeckEvent, EventKind, Key, KeyInput, Modifiers, MouseButton, PointerInput,
    Target,
};
use crate::slide::SlideId;
use crate::tools::ToolContext;
use kurbo::Point;

/// Low-level pointer event kind, as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Down,
    Up,
    Over,
    Leave,
    Move,
}

impl PointerKind {
    pub fn action(&self) -> Action {
        match self {
            PointerKind::Down => Action::MouseDown,
            PointerKind::Up => Action::MouseUp,
            PointerKind::Over => Action::MouseOver,
            PointerKind::Leave => Action::MouseOut,
            PointerKind::Move => Action::MouseMove,
        }
    }
}

/// Whether the host should keep propagating the low-level event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// A target was hit and handled both its kinds.
    Stopped,
    Continued,
}

/// Key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    Up,
}

/// A pointer event in client (on-screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPointer {
    pub kind: PointerKind,
    pub client: Point,
    pub button: MouseButton,
    /// Whether a button is held.
    pub pressed: bool,
    pub modifiers: Modifiers,
}

impl RawPointer {
    pub fn new(kind: PointerKind, client: Point, modifiers: Modifiers) -> Self {
        Self {
            kind,
            client,
            button: MouseButton::Primary,
            pressed: kind == PointerKind::Down,
            modifiers,
        }
    }

    pub fn with_pressed(self, pressed: bool) -> Self {
        Self { pressed, ..self }
    }
}

/// The (variant-specific, generic slide) kinds a pointer event on `target`
/// is dispatched under.
pub fn decorate(target: &Target, kind: PointerKind) -> (EventKind, EventKind) {
    let action = kind.action();
    (EventKind::new(target.scope(), action), EventKind::slide(action))
}

/// Dispatch a pointer event that has already been hit-tested.
pub fn dispatch_pointer(
    bus: &EventBus,
    slide_id: SlideId,
    target: Option<Target>,
    kind: PointerKind,
    input: PointerInput,
) -> Propagation {
    let event = DeckEvent {
        slide_id,
        target,
        base: BaseEvent::Pointer(input),
    };
    match target {
        Some(target) => {
            let (variant, generic) = decorate(&target, kind);
            bus.dispatch(variant, &event);
            bus.dispatch(generic, &event);
            Propagation::Stopped
        }
        None => {
            bus.dispatch(EventKind::slide(kind.action()), &event);
            Propagation::Continued
        }
    }
}

/// Turns host input into bus dispatches, tracking the hovered target so
/// that moves produce mouseout/mouseover pairs.
#[derive(Debug, Default)]
pub struct InputRouter {
    hovered: Option<(SlideId, Target)>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<Target> {
        self.hovered.map(|(_, target)| target)
    }

    /// Hit-test and dispatch one pointer event on `slide_id`.
    pub fn route_pointer(&mut self, ctx: &ToolContext, slide_id: SlideId, raw: RawPointer) -> Propagation {
        let hit = {
            let slides = ctx.slides();
            slides.get(slide_id).map(|slide| {
                let position = slide.client_to_slide(raw.client);
                (position, slide.hit_test(position))
            })
        };
        let Some((position, target)) = hit else {
            log::warn!("Pointer input for unknown slide {slide_id}");
            return Propagation::Continued;
        };
        let input = PointerInput {
            position,
            button: raw.button,
            pressed: raw.pressed,
            modifiers: raw.modifiers,
        };
        if raw.kind == PointerKind::Move {
            self.update_hover(ctx.bus(), slide_id, target, input);
        }
        dispatch_pointer(ctx.bus(), slide_id, target, raw.kind, input)
    }

    fn update_hover(&mut self, bus: &EventBus, slide_id: SlideId, target: Option<Target>, input: PointerInput) {
        let next = target.map(|t| (slide_id, t));
        if self.hovered == next {
            return;
        }
        if let Some((previous_slide, previous)) = self.hovered.take() {
            dispatch_pointer(bus, previous_slide, Some(previous), PointerKind::Leave, input);
        }
        if let Some(target) = target {
            dispatch_pointer(bus, slide_id, Some(target), PointerKind::Over, input);
        }
        self.hovered = next;
    }

    /// The pointer left the slide area: close any open hover.
    pub fn pointer_left(&mut self, bus: &EventBus, input: PointerInput) {
        if let Some((slide_id, target)) = self.hovered.take() {
            dispatch_pointer(bus, slide_id, Some(target), PointerKind::Leave, input);
        }
    }

    /// Dispatch a key event as slide keydown/keyup. Returns the number of
    /// handlers invoked.
    pub fn route_key(&self, bus: &EventBus, slide_id: SlideId, phase: KeyPhase, key: Key, modifiers: Modifiers) -> usize {
        let action = match phase {
            KeyPhase::Down => Action::KeyDown,
            KeyPhase::Up => Action::KeyUp,
        };
        let event = DeckEvent {
            slide_id,
            target: None,
            base: BaseEvent::Key(KeyInput { key, modifiers }),
        };
        bus.dispatch(EventKind::slide(action), &event)
    }
}
