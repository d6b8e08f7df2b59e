//! Interfaces of the externally-owned entities a display list references.
//!
//! A list never owns any of these. It holds `Weak` references taken at record
//! time, so the same node, functor, image or vector content can appear in many
//! lists (typically one per frame it was drawn in) without its lifetime being
//! extended by any of them. Everything here is `Send + Sync` because the list
//! is recorded on one thread and synced, prepared and drawn on another.

use crate::geometry::Rect;
use crate::transform::Transform;
use crate::tree_info::TreeInfo;

/// Identifier of an externally-owned image resource.
pub type ImageId = u64;

/// RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
}

/// Playback target for recorded operations.
///
/// This is where the pixel work lives; lists only call into it.
pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn concat(&mut self, transform: &Transform);
    /// Start an offscreen layer covering `bounds`, composited on `restore`.
    fn save_layer(&mut self, bounds: Rect);
    fn clip_rect(&mut self, rect: Rect);
    fn draw_rect(&mut self, rect: Rect, color: Color);
    fn draw_image(&mut self, image: ImageId, rect: Rect);
    fn draw_text(&mut self, text: &str, rect: Rect, color: Color);
}

/// A child scene node that lists can position and draw.
pub trait RenderNode: Send + Sync {
    /// Debug name, used in log output.
    fn name(&self) -> &str;

    /// Whether the node is drawn by the nearest projection-receiving ancestor
    /// instead of in place.
    fn projects_backwards(&self) -> bool {
        false
    }

    /// Draw the node's own content.
    fn draw(&self, canvas: &mut dyn Canvas);
}

/// An external platform-drawing callback.
pub trait Functor: Send + Sync {
    /// Content-sync hook, called once per frame before preparation.
    fn sync(&self);

    fn draw(&self, canvas: &mut dyn Canvas, bounds: Rect);
}

/// An externally-owned image whose pixels can change between frames.
pub trait MutableImage: Send + Sync {
    fn id(&self) -> ImageId;

    /// Upload or otherwise synchronize the image ahead of drawing.
    ///
    /// Returns `true` when the change requires the owning node to be
    /// invalidated. Implementations that fail to upload may clear
    /// `info.prepare_textures` to stop further uploads this traversal.
    fn prepare(&self, info: &mut TreeInfo) -> bool;

    /// Drop whatever `prepare` pinned for this traversal. Called on every
    /// image already prepared when a later upload fails.
    fn release(&self) {}
}

/// Animated vector content that needs per-frame update notification.
pub trait VectorContent: Send + Sync {
    /// Content-sync hook, called once per frame before preparation.
    fn sync_properties(&self);

    /// Whether the content changed since it was last drawn.
    fn is_dirty(&self) -> bool;

    /// Tell the content whether its pending property change will be consumed
    /// by the upcoming draw.
    fn set_property_change_will_be_consumed(&self, consumed: bool);

    fn draw(&self, canvas: &mut dyn Canvas, bounds: Rect);
}
