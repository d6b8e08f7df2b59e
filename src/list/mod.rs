//! The recorded display list.
//!
//! A [`DisplayList`] captures one frame of drawing for a scene node: the
//! [`CommandBuffer`] of operations, the drawables those operations reference
//! (allocated in a per-list [`DrawableArena`]), and typed collections of the
//! external entities involved so they can be synced and prepared without
//! walking the command buffer.
//!
//! ## Frame cycle
//!
//! A list is used by two roles that never run concurrently on the same list:
//!
//! 1. **Producer** – `reset` (or `new`), then records through [`Recorder`].
//! 2. **Consumer** – `sync_contents`, `prepare_list_and_children`, `playback`.
//!
//! When the owning node retires the list, the [`ReuseController`] decides
//! whether it is reset and kept for the next frame or dropped.
//!
//! ## Lifetimes
//!
//! Drawables are freed only in bulk, when the arena is rewound by `reset` or
//! dropped with the list. Anything that refers to them (the command buffer
//! and the child collections) is cleared before the rewind, and is declared
//! before the arena so it is dropped first as well.

mod arena;
mod commands;
mod drawable;
mod recorder;
mod reuse;

use std::collections::HashSet;
use std::mem;
use std::sync::{Arc, Weak};

pub use arena::{ArenaDrawable, DrawableArena, DrawableHandle};
pub use commands::{CommandBuffer, DrawOp, PlaybackOptions};
pub use drawable::{Drawable, FunctorDrawable, NodeDrawable};
pub use recorder::Recorder;
pub use reuse::{ListOwner, RenderContext, ReuseController, ReuseDecision};

use crate::config::ListConfig;
use crate::content::{Canvas, MutableImage, RenderNode, VectorContent};
use crate::error::ListError;
use crate::geometry::Rect;
use crate::list_stats;
use crate::tree_info::{TreeFlags, TreeInfo};

/// One frame's worth of recorded drawing for a scene node.
#[derive(Debug)]
pub struct DisplayList {
    bounds: Rect,
    /// Whether backward-projecting descendants are drawn into this list
    projection_receiver: bool,
    /// Set by the prepare pass when a descendant projects into this list
    projected_subtree: bool,

    // Everything from here to `arena` may hold drawable handles.
    commands: CommandBuffer,
    /// Child nodes in recording order
    child_nodes: Vec<DrawableHandle<NodeDrawable>>,
    /// Functors in recording order
    child_functors: Vec<DrawableHandle<FunctorDrawable>>,
    mutable_images: Vec<Weak<dyn MutableImage>>,
    vector_contents: Vec<Weak<dyn VectorContent>>,

    arena: DrawableArena,
}

impl DisplayList {
    /// Create an empty list with default capacities.
    pub fn new(bounds: Rect) -> Self {
        Self::with_config(bounds, &ListConfig::default())
    }

    /// Create an empty list with the capacities from `config`.
    pub fn with_config(bounds: Rect, config: &ListConfig) -> Self {
        list_stats::record_list_created();
        Self {
            bounds,
            projection_receiver: false,
            projected_subtree: false,
            commands: CommandBuffer::with_capacity(config.initial_command_capacity),
            child_nodes: Vec::with_capacity(config.initial_child_capacity),
            child_functors: Vec::with_capacity(config.initial_child_capacity),
            mutable_images: Vec::with_capacity(config.initial_child_capacity),
            vector_contents: Vec::with_capacity(config.initial_child_capacity),
            arena: DrawableArena::with_capacity(config.initial_arena_capacity),
        }
    }

    /// Make this list behave as if it were newly created with `bounds`.
    ///
    /// All storage keeps its capacity, so a reused list records the next frame
    /// without allocating as long as it is no busier than the previous ones.
    pub fn reset(&mut self, bounds: Rect) {
        log::debug!(
            "reset display list: {} ops, {} drawables, {} children",
            self.commands.len(),
            self.arena.len(),
            self.child_nodes.len()
        );

        // Holders of drawable handles go first, then the drawables themselves.
        self.commands.reset();
        self.child_nodes.clear();
        self.child_functors.clear();
        self.mutable_images.clear();
        self.vector_contents.clear();
        self.arena.rewind();

        self.bounds = bounds;
        self.projection_receiver = false;
        self.projected_subtree = false;
        list_stats::record_list_reset();
    }

    /// Start (or continue) recording into this list.
    pub fn record(&mut self) -> Recorder<'_> {
        Recorder::new(self)
    }

    /// Construct a drawable in the list's arena.
    ///
    /// The handle is valid until the next `reset` of this list and must not
    /// be kept past it.
    pub fn allocate_drawable<T: ArenaDrawable>(&mut self, value: T) -> DrawableHandle<T> {
        self.arena.allocate(value)
    }

    /// Resolve a handle returned by this list in the current epoch.
    pub fn drawable<T: ArenaDrawable>(&self, handle: DrawableHandle<T>) -> &T {
        self.arena.get(handle)
    }

    /// Lists are always the arena-backed recording kind.
    pub fn is_recording_list(&self) -> bool {
        true
    }

    /// True if nothing was recorded since creation or the last reset.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// True if this list directly contains a functor.
    pub fn has_functor(&self) -> bool {
        !self.child_functors.is_empty()
    }

    /// True if this list directly contains vector content.
    pub fn has_vector_content(&self) -> bool {
        !self.vector_contents.is_empty()
    }

    /// Notify every functor and vector content in this list to sync state.
    ///
    /// Only the owning node's sync step calls this, after recording has
    /// finished and before the prepare pass.
    pub fn sync_contents(&self) {
        for &handle in &self.child_functors {
            self.arena.get(handle).sync();
        }
        for content in &self.vector_contents {
            upgrade_vector(content).sync_properties();
        }
    }

    /// Prepare this list and recurse into its children.
    ///
    /// Mutable images are uploaded first (when `info.prepare_textures` is
    /// set), then `child_fn` is called for each child node in recording
    /// order with the child's recorded transform pushed onto `info.damage`.
    /// `functors_need_layer` is handed to `child_fn` unchanged.
    ///
    /// Returns `true` if any image or child reported that the owning node
    /// must be invalidated.
    pub fn prepare_list_and_children<F>(
        &mut self,
        info: &mut TreeInfo,
        functors_need_layer: bool,
        mut child_fn: F,
    ) -> bool
    where
        F: FnMut(&Arc<dyn RenderNode>, &mut TreeInfo, bool) -> bool,
    {
        list_stats::record_prepare_pass();
        let mut invalidated = false;

        if self.has_functor() {
            info.flags |= TreeFlags::HAS_FUNCTORS;
        }

        if info.prepare_textures {
            for (prepared, image) in self.mutable_images.iter().enumerate() {
                let image = upgrade_image(image);
                invalidated |= image.prepare(info);
                if !info.prepare_textures {
                    log::warn!(
                        "image {} stopped texture preparation for frame {}",
                        image.id(),
                        info.frame_number
                    );
                    for pinned in &self.mutable_images[..=prepared] {
                        upgrade_image(pinned).release();
                    }
                    break;
                }
            }
        }

        let mut projected_here = false;
        let mut projected_below = false;
        for &handle in &self.child_nodes {
            let drawable = self.arena.get(handle);
            projected_here |= drawable.projects_backwards();
            let node = drawable.node();
            log::trace!("prepare child '{}'", node.name());

            info.damage.push_transform(&drawable.recorded_matrix());
            info.flags.remove(TreeFlags::HAS_BACKWARD_PROJECTED_NODES);
            invalidated |= child_fn(&node, info, functors_need_layer);
            projected_below |= info.flags.contains(TreeFlags::HAS_BACKWARD_PROJECTED_NODES);
            info.damage.pop_transform();
        }

        // A receiver absorbs the projections from below; everything else
        // passes them up to the next receiver.
        if self.projection_receiver {
            self.projected_subtree = projected_below;
            info.flags.set(TreeFlags::HAS_BACKWARD_PROJECTED_NODES, projected_here);
        } else {
            info.flags.set(
                TreeFlags::HAS_BACKWARD_PROJECTED_NODES,
                projected_here || projected_below,
            );
        }

        for content in &self.vector_contents {
            let content = upgrade_vector(content);
            if content.is_dirty() {
                info.flags |= TreeFlags::VECTOR_CONTENT_DIRTY;
            }
            content.set_property_change_will_be_consumed(true);
        }

        invalidated
    }

    /// Call `update_fn` once per distinct child node, in recording order.
    pub fn update_children<F>(&self, mut update_fn: F)
    where
        F: FnMut(&Arc<dyn RenderNode>),
    {
        let mut seen = HashSet::with_capacity(self.child_nodes.len());
        for &handle in &self.child_nodes {
            let drawable = self.arena.get(handle);
            if seen.insert(drawable.node_addr()) {
                update_fn(&drawable.node());
            }
        }
    }

    /// Replay the recorded operations onto `canvas`.
    pub fn playback(&self, canvas: &mut dyn Canvas, options: &PlaybackOptions) {
        self.commands.playback(canvas, &self.arena, &self.vector_contents, options);
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn is_projection_receiver(&self) -> bool {
        self.projection_receiver
    }

    /// Whether the last prepare pass found descendants projecting into this
    /// list. Always `false` for lists that are not projection receivers.
    pub fn has_projected_subtree(&self) -> bool {
        self.projected_subtree
    }

    pub fn commands(&self) -> &CommandBuffer {
        &self.commands
    }

    pub fn arena(&self) -> &DrawableArena {
        &self.arena
    }

    /// Child node drawables in recording order.
    pub fn child_nodes(&self) -> impl Iterator<Item = &NodeDrawable> {
        self.child_nodes.iter().map(|&handle| self.arena.get(handle))
    }

    /// Functor drawables in recording order.
    pub fn functors(&self) -> impl Iterator<Item = &FunctorDrawable> {
        self.child_functors.iter().map(|&handle| self.arena.get(handle))
    }

    pub fn child_count(&self) -> usize {
        self.child_nodes.len()
    }

    pub fn functor_count(&self) -> usize {
        self.child_functors.len()
    }

    pub fn mutable_images(&self) -> &[Weak<dyn MutableImage>] {
        &self.mutable_images
    }

    pub fn vector_contents(&self) -> &[Weak<dyn VectorContent>] {
        &self.vector_contents
    }

    /// Bytes held by all internal storage, whether in use or not.
    pub fn retained_bytes(&self) -> usize {
        self.arena.allocated_bytes()
            + self.commands.allocated_bytes()
            + self.child_nodes.capacity() * mem::size_of::<DrawableHandle<NodeDrawable>>()
            + self.child_functors.capacity() * mem::size_of::<DrawableHandle<FunctorDrawable>>()
            + self.mutable_images.capacity() * mem::size_of::<Weak<dyn MutableImage>>()
            + self.vector_contents.capacity() * mem::size_of::<Weak<dyn VectorContent>>()
    }

    // -- Recording support --

    pub(crate) fn push_op(&mut self, op: DrawOp) {
        self.commands.append(op);
    }

    pub(crate) fn set_projection_receiver(&mut self, receiver: bool) {
        self.projection_receiver = receiver;
    }

    pub(crate) fn add_child_node(
        &mut self,
        drawable: NodeDrawable,
    ) -> DrawableHandle<NodeDrawable> {
        let handle = self.arena.allocate(drawable);
        self.child_nodes.push(handle);
        handle
    }

    pub(crate) fn add_functor(
        &mut self,
        drawable: FunctorDrawable,
    ) -> DrawableHandle<FunctorDrawable> {
        let handle = self.arena.allocate(drawable);
        self.child_functors.push(handle);
        handle
    }

    /// Register a mutable image once, however often it is drawn.
    pub(crate) fn add_mutable_image(&mut self, image: &Arc<dyn MutableImage>) {
        let weak = Arc::downgrade(image);
        if !self.mutable_images.iter().any(|known| known.ptr_eq(&weak)) {
            self.mutable_images.push(weak);
        }
    }

    /// Register vector content once and return its index.
    pub(crate) fn add_vector_content(&mut self, content: &Arc<dyn VectorContent>) -> usize {
        let weak = Arc::downgrade(content);
        if let Some(index) = self
            .vector_contents
            .iter()
            .position(|known| known.ptr_eq(&weak))
        {
            return index;
        }
        self.vector_contents.push(weak);
        self.vector_contents.len() - 1
    }
}

fn upgrade_image(image: &Weak<dyn MutableImage>) -> Arc<dyn MutableImage> {
    image
        .upgrade()
        .unwrap_or_else(|| panic!("{}", ListError::DeadReference("mutable image")))
}

fn upgrade_vector(content: &Weak<dyn VectorContent>) -> Arc<dyn VectorContent> {
    content
        .upgrade()
        .unwrap_or_else(|| panic!("{}", ListError::DeadReference("vector content")))
}
