//! Deckcraft Core Library
//!
//! Event, tool and geometry core of the deckcraft slide editor: an event
//! bus fed by hit-tested input, drawing and selection tools built on
//! creator/mutator gestures, and a state manager that keeps slides, the
//! store and other editors in step.

pub mod bus;
pub mod config;
pub mod convert;
pub mod creator;
pub mod editor;
pub mod error;
pub mod events;
pub mod geometry;
pub mod graphics;
pub mod input;
pub mod mutator;
pub mod slide;
pub mod state;
pub mod store;
pub mod tools;

pub use bus::{EventBus, HandlerId, Subscriptions};
pub use config::EditorConfig;
pub use creator::{BoxCreator, CurveCreator, MediaSeed};
pub use editor::Editor;
pub use error::{DeckError, DeckResult};
pub use events::{DeckEvent, EventKind, Key, Modifiers, Target, TargetPart};
pub use graphics::{GraphicId, GraphicKind, GraphicRenderer, GraphicStyle, RgbaColor};
pub use input::{InputRouter, PointerKind, Propagation, RawPointer};
pub use mutator::Mutator;
pub use slide::{CursorKind, SlideId, SlideRenderer, SlideSet, SlideSurface};
pub use state::SlideStateManager;
pub use store::{DeckModel, DeckStore, GraphicChange, GraphicModel, MemoryStore, SlideModel, StoreUpdate};
pub use tools::{EditorTool, MediaPrompt, MediaTool, ToolKind, ToolMachine};
