//! Producer-side recording into a [`DisplayList`].

use std::sync::Arc;

use crate::content::{Color, Functor, ImageId, MutableImage, RenderNode, VectorContent};
use crate::geometry::Rect;
use crate::transform::Transform;

use super::arena::DrawableHandle;
use super::commands::DrawOp;
use super::drawable::{FunctorDrawable, NodeDrawable};
use super::DisplayList;

/// Records drawing operations into a list.
///
/// The recorder tracks the canvas transform the same way playback will
/// rebuild it, so child nodes and functors capture the matrix they were
/// recorded under. Everything is appended; nothing recorded can be removed
/// before the list is reset.
///
/// # Example
///
/// ```ignore
/// let mut list = DisplayList::new(Rect::new(0.0, 0.0, 100.0, 100.0));
/// let mut rec = list.record();
/// rec.draw_rect(Rect::new(0.0, 0.0, 100.0, 100.0), Color::WHITE);
/// rec.save();
/// rec.translate(10.0, 10.0);
/// rec.draw_node(&child);
/// rec.restore();
/// rec.finish();
/// ```
pub struct Recorder<'a> {
    list: &'a mut DisplayList,
    matrix: Transform,
    save_stack: Vec<Transform>,
}

impl<'a> Recorder<'a> {
    pub(crate) fn new(list: &'a mut DisplayList) -> Self {
        Self {
            list,
            matrix: Transform::IDENTITY,
            save_stack: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Canvas state
    // -------------------------------------------------------------------------

    pub fn save(&mut self) {
        self.save_stack.push(self.matrix);
        self.list.push_op(DrawOp::Save);
    }

    /// # Panics
    ///
    /// Panics without a matching `save`.
    pub fn restore(&mut self) {
        let Some(matrix) = self.save_stack.pop() else {
            panic!("restore without matching save");
        };
        self.matrix = matrix;
        self.list.push_op(DrawOp::Restore);
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.concat(Transform::translate(dx, dy));
    }

    /// Apply `transform` after the current one (in local coordinates).
    pub fn concat(&mut self, transform: Transform) {
        self.matrix = self.matrix.then(&transform);
        self.list.push_op(DrawOp::Concat(transform));
    }

    pub fn clip_rect(&mut self, rect: Rect) {
        self.list.push_op(DrawOp::ClipRect(rect));
    }

    /// Transform that child drawables recorded now will capture.
    pub fn current_matrix(&self) -> Transform {
        self.matrix
    }

    /// Number of `save` calls not yet matched by `restore`.
    pub fn save_count(&self) -> usize {
        self.save_stack.len()
    }

    /// Mark the list as the surface backward-projecting descendants draw into.
    pub fn set_projection_receiver(&mut self, receiver: bool) {
        self.list.set_projection_receiver(receiver);
    }

    // -------------------------------------------------------------------------
    // Plain content
    // -------------------------------------------------------------------------

    pub fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.list.push_op(DrawOp::Rect { rect, color });
    }

    pub fn draw_text(&mut self, text: impl Into<String>, rect: Rect, color: Color) {
        self.list.push_op(DrawOp::Text {
            text: text.into(),
            rect,
            color,
        });
    }

    /// Draw an immutable image by id.
    pub fn draw_image(&mut self, image: ImageId, rect: Rect) {
        self.list.push_op(DrawOp::Image { image, rect });
    }

    /// Draw an image whose pixels may change, registering it for upload in
    /// the prepare pass.
    pub fn draw_mutable_image(&mut self, image: &Arc<dyn MutableImage>, rect: Rect) {
        self.list.add_mutable_image(image);
        self.list.push_op(DrawOp::Image {
            image: image.id(),
            rect,
        });
    }

    // -------------------------------------------------------------------------
    // External entities
    // -------------------------------------------------------------------------

    /// Draw a child node at the current transform.
    pub fn draw_node(&mut self, node: &Arc<dyn RenderNode>) -> DrawableHandle<NodeDrawable> {
        let handle = self.list.add_child_node(NodeDrawable::new(node, self.matrix));
        log::trace!("recorded child '{}' as {:?}", node.name(), handle);
        self.list.push_op(DrawOp::Node(handle));
        handle
    }

    /// Invoke a functor over `bounds` at the current transform.
    pub fn draw_functor(
        &mut self,
        functor: &Arc<dyn Functor>,
        bounds: Rect,
    ) -> DrawableHandle<FunctorDrawable> {
        let handle = self.list.add_functor(FunctorDrawable::new(functor, bounds, self.matrix));
        self.list.push_op(DrawOp::Functor(handle));
        handle
    }

    pub fn draw_vector_content(&mut self, content: &Arc<dyn VectorContent>, bounds: Rect) {
        let index = self.list.add_vector_content(content);
        self.list.push_op(DrawOp::VectorContent { index, bounds });
    }

    /// End the recording pass, closing any saves left open.
    pub fn finish(mut self) {
        while !self.save_stack.is_empty() {
            self.restore();
        }
    }
}
