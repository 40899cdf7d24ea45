//! Conversion between live graphic renderers and store models.

use crate::graphics::{Curve, Ellipse, GraphicRenderer, Image, Rectangle, Textbox, Video};
use crate::store::{
    CurveModel, EllipseModel, GraphicModel, MediaModel, RectangleModel, TextboxModel,
};
use kurbo::Point;

impl From<&GraphicRenderer> for GraphicModel {
    fn from(graphic: &GraphicRenderer) -> Self {
        match graphic {
            GraphicRenderer::Rectangle(r) => GraphicModel::Rectangle(RectangleModel {
                id: r.id,
                x: r.origin.x,
                y: r.origin.y,
                width: r.width,
                height: r.height,
                rotation: r.rotation,
                style: r.style.clone(),
            }),
            GraphicRenderer::Ellipse(e) => GraphicModel::Ellipse(EllipseModel {
                id: e.id,
                cx: e.center.x,
                cy: e.center.y,
                rx: e.radius_x,
                ry: e.radius_y,
                rotation: e.rotation,
                style: e.style.clone(),
            }),
            GraphicRenderer::Curve(c) => GraphicModel::Curve(CurveModel {
                id: c.id,
                anchors: c.anchors.clone(),
                rotation: c.rotation,
                style: c.style.clone(),
            }),
            GraphicRenderer::Textbox(t) => GraphicModel::Textbox(TextboxModel {
                id: t.id,
                x: t.origin.x,
                y: t.origin.y,
                width: t.width,
                height: t.height,
                rotation: t.rotation,
                text: t.text.clone(),
                font_size: t.font_size,
                style: t.style.clone(),
            }),
            GraphicRenderer::Image(i) => GraphicModel::Image(MediaModel {
                id: i.id,
                x: i.origin.x,
                y: i.origin.y,
                width: i.width,
                height: i.height,
                rotation: i.rotation,
                source: i.source.clone(),
                style: i.style.clone(),
            }),
            GraphicRenderer::Video(v) => GraphicModel::Video(MediaModel {
                id: v.id,
                x: v.origin.x,
                y: v.origin.y,
                width: v.width,
                height: v.height,
                rotation: v.rotation,
                source: v.source.clone(),
                style: v.style.clone(),
            }),
        }
    }
}

impl From<GraphicModel> for GraphicRenderer {
    fn from(model: GraphicModel) -> Self {
        match model {
            GraphicModel::Rectangle(m) => Rectangle::reconstruct(
                m.id,
                Point::new(m.x, m.y),
                m.width,
                m.height,
                m.rotation,
                m.style,
            )
            .into(),
            GraphicModel::Ellipse(m) => Ellipse::reconstruct(
                m.id,
                Point::new(m.cx, m.cy),
                m.rx,
                m.ry,
                m.rotation,
                m.style,
            )
            .into(),
            GraphicModel::Curve(m) => Curve::reconstruct(m.id, m.anchors, m.rotation, m.style).into(),
            GraphicModel::Textbox(m) => Textbox::reconstruct(
                m.id,
                Point::new(m.x, m.y),
                m.width,
                m.height,
                m.rotation,
                m.text,
                m.font_size,
                m.style,
            )
            .into(),
            GraphicModel::Image(m) => Image::reconstruct(
                m.id,
                Point::new(m.x, m.y),
                m.width,
                m.height,
                m.rotation,
                m.source,
                m.style,
            )
            .into(),
            GraphicModel::Video(m) => Video::reconstruct(
                m.id,
                Point::new(m.x, m.y),
                m.width,
                m.height,
                m.rotation,
                m.source,
                m.style,
            )
            .into(),
        }
    }
}
