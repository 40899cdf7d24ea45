//! Serialisable store model and the store boundary.
//!
//! The store keeps one [`GraphicModel`] per graphic, grouped by slide. Live
//! edits reach other editors as [`StoreUpdate`] messages tagged with the
//! publisher that made them.

use crate::error::{DeckError, DeckResult};
use crate::graphics::{Anchor, GraphicId, GraphicKind, GraphicStyle, RgbaColor};
use crate::slide::SlideId;
use crate::tools::ToolKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Identifies the editor instance that produced an update.
pub type PublisherId = Uuid;

/// Stored rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleModel {
    pub id: GraphicId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(flatten)]
    pub style: GraphicStyle,
}

/// Stored ellipse, addressed by its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EllipseModel {
    pub id: GraphicId,
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(flatten)]
    pub style: GraphicStyle,
}

/// Stored curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveModel {
    pub id: GraphicId,
    pub anchors: Vec<Anchor>,
    #[serde(default)]
    pub rotation: f64,
    #[serde(flatten)]
    pub style: GraphicStyle,
}

/// Stored textbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextboxModel {
    pub id: GraphicId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub text: String,
    pub font_size: f64,
    #[serde(flatten)]
    pub style: GraphicStyle,
}

/// Stored image or video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaModel {
    pub id: GraphicId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    pub source: String,
    #[serde(flatten)]
    pub style: GraphicStyle,
}

/// A graphic as kept in the store. The `type` tag selects the variant;
/// unknown tags fail to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GraphicModel {
    Rectangle(RectangleModel),
    Ellipse(EllipseModel),
    Curve(CurveModel),
    Textbox(TextboxModel),
    Image(MediaModel),
    Video(MediaModel),
}

impl GraphicModel {
    pub fn id(&self) -> GraphicId {
        match self {
            GraphicModel::Rectangle(m) => m.id,
            GraphicModel::Ellipse(m) => m.id,
            GraphicModel::Curve(m) => m.id,
            GraphicModel::Textbox(m) => m.id,
            GraphicModel::Image(m) | GraphicModel::Video(m) => m.id,
        }
    }

    pub fn kind(&self) -> GraphicKind {
        match self {
            GraphicModel::Rectangle(_) => GraphicKind::Rectangle,
            GraphicModel::Ellipse(_) => GraphicKind::Ellipse,
            GraphicModel::Curve(_) => GraphicKind::Curve,
            GraphicModel::Textbox(_) => GraphicKind::Textbox,
            GraphicModel::Image(_) => GraphicKind::Image,
            GraphicModel::Video(_) => GraphicKind::Video,
        }
    }
}

/// One slide's graphics keyed by id.
///
/// Loading fails when a key differs from the id of the graphic under it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SlideModel {
    pub id: SlideId,
    #[serde(default, deserialize_with = "graphics_by_id")]
    pub graphics: BTreeMap<GraphicId, GraphicModel>,
}

fn graphics_by_id<'de, D>(deserializer: D) -> Result<BTreeMap<GraphicId, GraphicModel>, D::Error>
where
    D: Deserializer<'de>,
{
    let graphics = BTreeMap::<GraphicId, GraphicModel>::deserialize(deserializer)?;
    if let Some((key, model)) = graphics.iter().find(|(key, model)| **key != model.id()) {
        return Err(serde::de::Error::custom(format!(
            "graphic stored under {key} has id {}",
            model.id()
        )));
    }
    Ok(graphics)
}

impl SlideModel {
    pub fn new(id: SlideId) -> Self {
        Self {
            id,
            graphics: BTreeMap::new(),
        }
    }

    pub fn from_json(json: &str) -> DeckResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> DeckResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn insert(&mut self, model: GraphicModel) {
        self.graphics.insert(model.id(), model);
    }
}

/// Every slide of a deck, in presentation order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeckModel {
    #[serde(default)]
    pub slides: Vec<SlideModel>,
}

impl DeckModel {
    pub fn from_json(json: &str) -> DeckResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> DeckResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn slide(&self, id: SlideId) -> Option<&SlideModel> {
        self.slides.iter().find(|s| s.id == id)
    }

    pub fn slide_mut(&mut self, id: SlideId) -> Option<&mut SlideModel> {
        self.slides.iter_mut().find(|s| s.id == id)
    }

    /// Like [`slide`](Self::slide) but failing with
    /// [`DeckError::SlideNotFound`].
    pub fn require_slide(&self, id: SlideId) -> DeckResult<&SlideModel> {
        self.slide(id).ok_or(DeckError::SlideNotFound(id))
    }

    /// The slide with `id`, appended if missing.
    pub fn slide_entry(&mut self, id: SlideId) -> &mut SlideModel {
        let index = match self.slides.iter().position(|s| s.id == id) {
            Some(index) => index,
            None => {
                self.slides.push(SlideModel::new(id));
                self.slides.len() - 1
            }
        };
        &mut self.slides[index]
    }
}

/// A single change to one graphic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum GraphicChange {
    SetGraphic(GraphicModel),
    SetX(f64),
    SetY(f64),
    SetFillColor(Option<RgbaColor>),
    SetStrokeColor(RgbaColor),
    SetStrokeWidth(f64),
    SetWidth(f64),
    SetHeight(f64),
    SetRotation(f64),
    SetText(String),
    RemoveGraphic,
}

/// A broadcast message: which editor changed which graphic, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreUpdate {
    pub publisher: PublisherId,
    pub slide_id: SlideId,
    pub graphic_id: GraphicId,
    pub change: GraphicChange,
}

impl StoreUpdate {
    pub fn from_json(json: &str) -> DeckResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> DeckResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Where editor state is persisted and shared.
pub trait DeckStore {
    fn set_active_tool(&mut self, tool: ToolKind);

    fn set_graphic(&mut self, slide_id: SlideId, model: GraphicModel);

    fn remove_graphic(&mut self, slide_id: SlideId, graphic_id: GraphicId);

    /// Send an update to other editors.
    fn broadcast(&mut self, update: StoreUpdate);
}

/// In-memory store for tests and single-process use. Broadcasts are
/// queued as JSON until taken.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    deck: DeckModel,
    active_tool: ToolKind,
    outgoing: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_deck(deck: DeckModel) -> Self {
        Self {
            deck,
            ..Self::default()
        }
    }

    pub fn deck(&self) -> &DeckModel {
        &self.deck
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    pub fn graphic(&self, slide_id: SlideId, graphic_id: GraphicId) -> Option<&GraphicModel> {
        self.deck.slide(slide_id)?.graphics.get(&graphic_id)
    }

    /// Drain queued broadcast messages, oldest first.
    pub fn take_outgoing(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outgoing)
    }
}

impl DeckStore for MemoryStore {
    fn set_active_tool(&mut self, tool: ToolKind) {
        self.active_tool = tool;
    }

    fn set_graphic(&mut self, slide_id: SlideId, model: GraphicModel) {
        self.deck.slide_entry(slide_id).insert(model);
    }

    fn remove_graphic(&mut self, slide_id: SlideId, graphic_id: GraphicId) {
        if let Some(slide) = self.deck.slide_mut(slide_id) {
            slide.graphics.remove(&graphic_id);
        }
    }

    fn broadcast(&mut self, update: StoreUpdate) {
        match update.to_json() {
            Ok(json) => self.outgoing.push(json),
            Err(e) => log::warn!("Failed to encode update for {}: {e}", update.graphic_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn rectangle() -> GraphicModel {
        GraphicModel::Rectangle(RectangleModel {
            id: Uuid::new_v4(),
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
            rotation: 0.0,
            style: GraphicStyle::default(),
        })
    }

    #[test]
    fn test_slide_json_shape() {
        let mut slide = SlideModel::new(Uuid::new_v4());
        let model = rectangle();
        let id = model.id();
        slide.insert(model);
        let json = slide.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let graphic = &value["graphics"][id.to_string()];
        assert_eq!(graphic["type"], "rectangle");
        assert_eq!(graphic["id"], id.to_string());
        assert_eq!(graphic["strokeColor"], "#000000ff");
        assert_eq!(SlideModel::from_json(&json).unwrap(), slide);
    }

    #[test]
    fn test_unknown_type_fails() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"{{"id":"{id}","graphics":{{"{id}":{{"id":"{id}","type":"hexagon","x":0}}}}}}"#
        );
        assert!(matches!(SlideModel::from_json(&json), Err(DeckError::Parse(_))));
    }

    #[test]
    fn test_malformed_json_fails() {
        assert!(SlideModel::from_json("{\"id\": 3").is_err());
    }

    #[test]
    fn test_key_must_match_graphic_id() {
        let model = rectangle();
        let mut slide = SlideModel::new(Uuid::new_v4());
        slide.graphics.insert(Uuid::new_v4(), model);
        let json = slide.to_json().unwrap();
        assert!(matches!(SlideModel::from_json(&json), Err(DeckError::Parse(_))));

        let deck = DeckModel { slides: vec![slide] };
        let json = deck.to_json().unwrap();
        assert!(matches!(DeckModel::from_json(&json), Err(DeckError::Parse(_))));
    }

    #[test]
    fn test_curve_model_parses_without_rotation() {
        let id = Uuid::new_v4();
        let json = format!(
            r##"{{"type":"curve","id":"{id}","anchors":[
                {{"point":{{"x":0,"y":0}},"handleIn":{{"x":0,"y":0}},"handleOut":{{"x":5,"y":0}}}}
            ],"fillColor":null,"strokeColor":"#ff0000","strokeWidth":3}}"##
        );
        let model: GraphicModel = serde_json::from_str(&json).unwrap();
        let GraphicModel::Curve(curve) = model else {
            panic!("expected curve");
        };
        assert_eq!(curve.anchors[0].handle_out, Point::new(5.0, 0.0));
        assert!(curve.style.fill_color.is_none());
        assert_eq!(curve.rotation, 0.0);
    }

    #[test]
    fn test_update_json() {
        let update = StoreUpdate {
            publisher: Uuid::new_v4(),
            slide_id: Uuid::new_v4(),
            graphic_id: Uuid::new_v4(),
            change: GraphicChange::SetX(4.5),
        };
        let json = update.to_json().unwrap();
        assert!(json.contains(r#""change":{"type":"setX","value":4.5}"#));
        assert_eq!(StoreUpdate::from_json(&json).unwrap(), update);

        let removal = StoreUpdate {
            change: GraphicChange::RemoveGraphic,
            ..update
        };
        assert_eq!(StoreUpdate::from_json(&removal.to_json().unwrap()).unwrap(), removal);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        let slide_id = Uuid::new_v4();
        let model = rectangle();
        let id = model.id();
        store.set_graphic(slide_id, model.clone());
        assert_eq!(store.graphic(slide_id, id), Some(&model));
        assert!(store.deck().require_slide(slide_id).is_ok());

        store.set_active_tool(ToolKind::Ellipse);
        assert_eq!(store.active_tool(), ToolKind::Ellipse);

        store.broadcast(StoreUpdate {
            publisher: Uuid::new_v4(),
            slide_id,
            graphic_id: id,
            change: GraphicChange::RemoveGraphic,
        });
        assert_eq!(store.take_outgoing().len(), 1);
        assert!(store.take_outgoing().is_empty());

        store.remove_graphic(slide_id, id);
        assert!(store.graphic(slide_id, id).is_none());
        assert!(matches!(
            store.deck().require_slide(Uuid::new_v4()),
            Err(DeckError::SlideNotFound(_))
        ));
    }
}
