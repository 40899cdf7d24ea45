//! Image and video tools.
//!
//! The media source is resolved before the tool mounts: the host is asked
//! through a [`MediaPrompt`] (file picker, URL dialog) and the tool then
//! draws like any box-shaped graphic.

use super::{EditorTool, ShapeTool, ToolContext, ToolKind};
use crate::creator::MediaSeed;
use crate::graphics::GraphicKind;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

/// Boxed future for host prompts (not `Send`; the editor is single-threaded).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host-side source of image and video media.
pub trait MediaPrompt {
    /// Ask the user for media of `kind`. Resolves to `None` on cancel.
    fn request(&self, kind: GraphicKind) -> BoxFuture<'_, Option<MediaSeed>>;
}

/// Draws an image or video once media has been chosen. A tool whose prompt
/// was cancelled mounts nothing.
#[derive(Debug)]
pub struct MediaTool {
    kind: GraphicKind,
    inner: Option<ShapeTool>,
}

impl MediaTool {
    /// Resolve media for `kind` through `prompt`.
    pub async fn prepare(kind: GraphicKind, prompt: &dyn MediaPrompt) -> Self {
        match prompt.request(kind).await {
            Some(seed) => {
                log::debug!("Media for {kind} tool: {}x{}", seed.width, seed.height);
                Self::with_seed(kind, seed)
            }
            None => {
                log::debug!("Media prompt for {kind} cancelled");
                Self::inert(kind)
            }
        }
    }

    pub fn with_seed(kind: GraphicKind, seed: MediaSeed) -> Self {
        Self {
            kind,
            inner: Some(ShapeTool::with_seed(kind, seed)),
        }
    }

    /// A tool with no media.
    pub fn inert(kind: GraphicKind) -> Self {
        Self { kind, inner: None }
    }

    pub fn is_inert(&self) -> bool {
        self.inner.is_none()
    }

    pub fn seed(&self) -> Option<&MediaSeed> {
        self.inner.as_ref().and_then(ShapeTool::seed)
    }
}

impl EditorTool for MediaTool {
    fn kind(&self) -> ToolKind {
        ToolKind::for_graphic(self.kind)
    }

    fn mount(&mut self, ctx: &Rc<ToolContext>) {
        match &mut self.inner {
            Some(tool) => tool.mount(ctx),
            None => log::debug!("Mounting inert {} tool", self.kind),
        }
    }

    fn unmount(&mut self) {
        if let Some(tool) = &mut self.inner {
            tool.unmount();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Modifiers;
    use crate::slide::SlideSurface;
    use crate::tools::testing::{context, pointer};
    use crate::tools::{GESTURE_UP, SLIDE_DOWN};
    use kurbo::Point;

    struct FixedPrompt(Option<MediaSeed>);

    impl MediaPrompt for FixedPrompt {
        fn request(&self, _kind: GraphicKind) -> BoxFuture<'_, Option<MediaSeed>> {
            let seed = self.0.clone();
            Box::pin(async move { seed })
        }
    }

    #[test]
    fn test_click_places_image_at_natural_size() {
        let prompt = FixedPrompt(Some(MediaSeed::url("https://example.com/cat.png", 640.0, 480.0)));
        let mut tool = pollster::block_on(MediaTool::prepare(GraphicKind::Image, &prompt));
        assert!(!tool.is_inert());
        assert_eq!(tool.kind(), ToolKind::Image);

        let (ctx, slide_id) = context();
        tool.mount(&ctx);
        let click = pointer(slide_id, Point::new(100.0, 100.0), Modifiers::NONE, None);
        ctx.bus().dispatch(SLIDE_DOWN, &click);
        ctx.bus().dispatch(GESTURE_UP, &click);

        let slides = ctx.slides();
        let slide = slides.get(slide_id).unwrap();
        let image = slide.graphics().next().unwrap();
        assert_eq!(image.kind(), GraphicKind::Image);
        assert!((image.width() - 640.0).abs() < f64::EPSILON);
        assert!((image.height() - 480.0).abs() < f64::EPSILON);
        assert!(slide.is_focused(image.id()));
    }

    #[test]
    fn test_cancelled_prompt_mounts_nothing() {
        let prompt = FixedPrompt(None);
        let mut tool = pollster::block_on(MediaTool::prepare(GraphicKind::Video, &prompt));
        assert!(tool.is_inert());
        assert_eq!(tool.kind(), ToolKind::Video);

        let (ctx, _) = context();
        tool.mount(&ctx);
        assert!(ctx.bus().registrations().is_empty());
        tool.unmount();
    }
}
