//! Recorded drawing operations and their playback.

use std::sync::Weak;

use crate::content::{Canvas, Color, ImageId, VectorContent};
use crate::error::ListError;
use crate::geometry::Rect;
use crate::transform::Transform;

use super::arena::{DrawableArena, DrawableHandle};
use super::drawable::{FunctorDrawable, NodeDrawable};

/// A single recorded operation.
///
/// Coordinates are in the space of the canvas state at the point the op was
/// recorded; `Save`/`Restore`/`Concat` reproduce that state on playback.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    Concat(Transform),
    ClipRect(Rect),
    Rect {
        rect: Rect,
        color: Color,
    },
    Text {
        text: String,
        rect: Rect,
        color: Color,
    },
    Image {
        image: ImageId,
        rect: Rect,
    },
    /// Draw a child node through its drawable in the list's arena
    Node(DrawableHandle<NodeDrawable>),
    /// Invoke a functor through its drawable in the list's arena
    Functor(DrawableHandle<FunctorDrawable>),
    /// Draw the vector content at this index of the list's vector references
    VectorContent {
        index: usize,
        bounds: Rect,
    },
}

/// Per-playback switches decided by the owning tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackOptions {
    /// Route functor calls through an offscreen layer
    pub functors_need_layer: bool,
    /// Leave out nodes that project into an ancestor
    pub skip_projected: bool,
}

/// Append-only sequence of [`DrawOp`]s.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    ops: Vec<DrawOp>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ops: Vec::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drop every recorded op, keeping the allocation.
    pub fn reset(&mut self) {
        self.ops.clear();
    }

    pub fn capacity(&self) -> usize {
        self.ops.capacity()
    }

    /// Bytes reserved for ops (not counting heap data owned by text ops).
    pub fn allocated_bytes(&self) -> usize {
        self.ops.capacity() * std::mem::size_of::<DrawOp>()
    }

    /// Replay every op onto `canvas`.
    ///
    /// `arena` and `vectors` must be the ones the ops were recorded against.
    pub fn playback(
        &self,
        canvas: &mut dyn Canvas,
        arena: &DrawableArena,
        vectors: &[Weak<dyn VectorContent>],
        options: &PlaybackOptions,
    ) {
        for op in &self.ops {
            match op {
                DrawOp::Save => canvas.save(),
                DrawOp::Restore => canvas.restore(),
                DrawOp::Concat(transform) => canvas.concat(transform),
                DrawOp::ClipRect(rect) => canvas.clip_rect(*rect),
                DrawOp::Rect { rect, color } => canvas.draw_rect(*rect, *color),
                DrawOp::Text { text, rect, color } => canvas.draw_text(text, *rect, *color),
                DrawOp::Image { image, rect } => canvas.draw_image(*image, *rect),
                DrawOp::Node(handle) => arena.get(*handle).draw(canvas, options),
                DrawOp::Functor(handle) => arena.get(*handle).draw(canvas, options),
                DrawOp::VectorContent { index, bounds } => {
                    let content = vectors
                        .get(*index)
                        .and_then(Weak::upgrade)
                        .unwrap_or_else(|| {
                            panic!("{}", ListError::DeadReference("vector content"))
                        });
                    content.draw(canvas, *bounds);
                }
            }
        }
    }
}
