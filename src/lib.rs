//! Arena-backed display lists for a retained-mode scene graph.
//!
//! A [`DisplayList`] records one frame of drawing for a scene node, together
//! with the child nodes, functors, mutable images and vector content that
//! drawing refers to. The producer records it; the consumer syncs, prepares
//! and plays it back; a [`ReuseController`] decides whether a retired list is
//! reset and recorded into again instead of reallocated.

pub mod config;
pub mod content;
pub mod error;
pub mod geometry;
pub mod list;
pub mod transform;
pub mod tree_info;

// Debug counters, no-ops unless the `list-stats` feature is enabled
pub mod list_stats;

#[cfg(test)]
mod testing;

pub use config::ListConfig;
pub use error::{ListError, Result};
pub use list::{DisplayList, Recorder, ReuseController};

pub mod prelude {
    pub use crate::config::ListConfig;
    pub use crate::content::{
        Canvas, Color, Functor, ImageId, MutableImage, RenderNode, VectorContent,
    };
    pub use crate::error::{ListError, Result};
    pub use crate::geometry::Rect;
    pub use crate::list::{
        DisplayList, DrawOp, DrawableHandle, FunctorDrawable, ListOwner, NodeDrawable,
        PlaybackOptions, Recorder, RenderContext, ReuseController, ReuseDecision,
    };
    pub use crate::transform::Transform;
    pub use crate::tree_info::{DamageAccumulator, TraversalMode, TreeFlags, TreeInfo};
}
