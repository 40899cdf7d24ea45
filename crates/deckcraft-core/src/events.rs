//! Semantic editor events.
//!
//! Raw pointer and keyboard input is decorated into [`DeckEvent`]s and
//! dispatched on the event bus under an [`EventKind`] such as
//! `deck-slide-mouseup` or `deck-rectangle-mousedown`.

use crate::error::{DeckError, DeckResult};
use crate::graphics::{AnchorRole, GraphicId, GraphicKind, VertexRole};
use crate::slide::SlideId;
use kurbo::Point;
use std::fmt;
use std::str::FromStr;

const PREFIX: &str = "deck-";

/// What an event is about: the slide surface, a graphic variant, or one of
/// the helper handles drawn around focused graphics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Slide,
    Graphic(GraphicKind),
    Vertex,
    Rotator,
    CurveAnchor,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Slide => "slide",
            Scope::Graphic(kind) => kind.as_str(),
            Scope::Vertex => "vertex",
            Scope::Rotator => "rotator",
            Scope::CurveAnchor => "curve-anchor",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "slide" => Some(Scope::Slide),
            "vertex" => Some(Scope::Vertex),
            "rotator" => Some(Scope::Rotator),
            "curve-anchor" => Some(Scope::CurveAnchor),
            other => GraphicKind::from_name(other).map(Scope::Graphic),
        }
    }
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MouseUp,
    MouseDown,
    MouseOver,
    MouseOut,
    MouseMove,
    /// Slide scope only.
    KeyDown,
    /// Slide scope only.
    KeyUp,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::MouseUp => "mouseup",
            Action::MouseDown => "mousedown",
            Action::MouseOver => "mouseover",
            Action::MouseOut => "mouseout",
            Action::MouseMove => "mousemove",
            Action::KeyDown => "keydown",
            Action::KeyUp => "keyup",
        }
    }

    pub fn is_key(&self) -> bool {
        matches!(self, Action::KeyDown | Action::KeyUp)
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "mouseup" => Some(Action::MouseUp),
            "mousedown" => Some(Action::MouseDown),
            "mouseover" => Some(Action::MouseOver),
            "mouseout" => Some(Action::MouseOut),
            "mousemove" => Some(Action::MouseMove),
            "keydown" => Some(Action::KeyDown),
            "keyup" => Some(Action::KeyUp),
            _ => None,
        }
    }
}

/// Key under which handlers are registered on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind {
    pub scope: Scope,
    pub action: Action,
}

impl EventKind {
    pub const fn new(scope: Scope, action: Action) -> Self {
        Self { scope, action }
    }

    pub const fn slide(action: Action) -> Self {
        Self::new(Scope::Slide, action)
    }

    pub const fn graphic(kind: GraphicKind, action: Action) -> Self {
        Self::new(Scope::Graphic(kind), action)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}-{}", self.scope.as_str(), self.action.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DeckError;

    fn from_str(s: &str) -> DeckResult<Self> {
        let unknown = || DeckError::UnknownEventKind(s.to_string());
        let (scope, action) = s
            .strip_prefix(PREFIX)
            .and_then(|rest| rest.rsplit_once('-'))
            .ok_or_else(unknown)?;
        let scope = Scope::parse(scope).ok_or_else(unknown)?;
        let action = Action::parse(action).ok_or_else(unknown)?;
        if action.is_key() && scope != Scope::Slide {
            return Err(unknown());
        }
        Ok(EventKind::new(scope, action))
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Modifiers::NONE
    };
}

/// A keyboard key, named as a browser reports it (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Shift, Control, Alt or Meta.
    pub fn is_modifier(&self) -> bool {
        matches!(self.0.as_str(), "Shift" | "Control" | "Alt" | "Meta")
    }

    /// Keys that end a multi-step gesture.
    pub fn is_terminator(&self) -> bool {
        matches!(self.0.as_str(), "Enter" | "Escape")
    }

    pub fn is_delete(&self) -> bool {
        matches!(self.0.as_str(), "Delete" | "Backspace")
    }
}

/// A pointer event in slide coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub position: Point,
    pub button: MouseButton,
    /// Whether a button is held.
    pub pressed: bool,
    pub modifiers: Modifiers,
}

impl PointerInput {
    pub fn new(position: Point, modifiers: Modifiers) -> Self {
        Self {
            position,
            button: MouseButton::Primary,
            pressed: false,
            modifiers,
        }
    }

    pub fn at(x: f64, y: f64) -> Self {
        Self::new(Point::new(x, y), Modifiers::NONE)
    }

    pub fn with_modifiers(self, modifiers: Modifiers) -> Self {
        Self { modifiers, ..self }
    }
}

/// A keyboard event.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyInput {
    pub key: Key,
    /// Modifier state after the key changed.
    pub modifiers: Modifiers,
}

/// The low-level event a semantic event was decorated from.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseEvent {
    Pointer(PointerInput),
    Key(KeyInput),
}

/// Which part of a graphic was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPart {
    Graphic,
    Vertex(VertexRole),
    Rotator,
    CurveAnchor { index: usize, role: AnchorRole },
}

/// The graphic (or helper of a graphic) an event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    /// The graphic itself, or the parent of the hit helper.
    pub graphic_id: GraphicId,
    pub graphic_kind: GraphicKind,
    pub part: TargetPart,
}

impl Target {
    pub fn graphic(graphic_id: GraphicId, graphic_kind: GraphicKind) -> Self {
        Self {
            graphic_id,
            graphic_kind,
            part: TargetPart::Graphic,
        }
    }

    pub fn scope(&self) -> Scope {
        match self.part {
            TargetPart::Graphic => Scope::Graphic(self.graphic_kind),
            TargetPart::Vertex(_) => Scope::Vertex,
            TargetPart::Rotator => Scope::Rotator,
            TargetPart::CurveAnchor { .. } => Scope::CurveAnchor,
        }
    }

    /// Whether the target is a helper handle rather than the graphic body.
    pub fn is_helper(&self) -> bool {
        self.part != TargetPart::Graphic
    }
}

/// Payload carried by every dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckEvent {
    pub slide_id: SlideId,
    pub target: Option<Target>,
    pub base: BaseEvent,
}

impl DeckEvent {
    pub fn pointer(&self) -> Option<&PointerInput> {
        match &self.base {
            BaseEvent::Pointer(p) => Some(p),
            BaseEvent::Key(_) => None,
        }
    }

    pub fn key(&self) -> Option<&KeyInput> {
        match &self.base {
            BaseEvent::Key(k) => Some(k),
            BaseEvent::Pointer(_) => None,
        }
    }

    pub fn position(&self) -> Option<Point> {
        self.pointer().map(|p| p.position)
    }

    pub fn modifiers(&self) -> Modifiers {
        match &self.base {
            BaseEvent::Pointer(p) => p.modifiers,
            BaseEvent::Key(k) => k.modifiers,
        }
    }

    /// The same event with a different modifier state.
    pub fn with_modifiers(&self, modifiers: Modifiers) -> DeckEvent {
        let base = match &self.base {
            BaseEvent::Pointer(p) => BaseEvent::Pointer(p.with_modifiers(modifiers)),
            BaseEvent::Key(k) => BaseEvent::Key(KeyInput {
                key: k.key.clone(),
                modifiers,
            }),
        };
        DeckEvent {
            slide_id: self.slide_id,
            target: self.target,
            base,
        }
    }
}
