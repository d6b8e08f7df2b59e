//! Linear storage for the drawables a list allocates while recording.
//!
//! The arena hands out [`DrawableHandle`]s instead of references. A handle is
//! a slot index plus the arena epoch it was allocated in, so:
//!
//! - Growing the backing storage never invalidates a handle (nothing points
//!   into the buffer itself).
//! - Drawables are never freed one by one. `rewind` drops them all at once and
//!   bumps the epoch, which turns every outstanding handle stale.
//! - A stale handle is detected on access instead of reading a slot that now
//!   belongs to the next frame.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem;

use crate::error::{ListError, Result};
use crate::list_stats;

use super::drawable::Drawable;

/// A drawable type that can live in a [`DrawableArena`].
pub trait ArenaDrawable: Sized {
    /// Human readable kind, used in error messages.
    const KIND: &'static str;

    fn into_drawable(self) -> Drawable;

    fn from_drawable(drawable: &Drawable) -> Option<&Self>;
}

/// Typed, epoch-bound handle to a drawable in a [`DrawableArena`].
///
/// Valid from the allocation until the next `rewind`/`release` of the arena
/// that produced it.
pub struct DrawableHandle<T> {
    index: u32,
    epoch: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DrawableHandle<T> {
    fn new(index: u32, epoch: u32) -> Self {
        Self {
            index,
            epoch,
            _marker: PhantomData,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }
}

impl<T> Clone for DrawableHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DrawableHandle<T> {}

impl<T> PartialEq for DrawableHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.epoch == other.epoch
    }
}

impl<T> Eq for DrawableHandle<T> {}

impl<T> Hash for DrawableHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.epoch.hash(state);
    }
}

impl<T> fmt::Debug for DrawableHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawableHandle")
            .field("index", &self.index)
            .field("epoch", &self.epoch)
            .finish()
    }
}

/// Bump allocator for list drawables, freed in bulk.
#[derive(Debug, Default)]
pub struct DrawableArena {
    slots: Vec<Drawable>,
    epoch: u32,
}

impl DrawableArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            epoch: 0,
        }
    }

    /// Move `value` into the arena and return a handle to it.
    pub fn allocate<T: ArenaDrawable>(&mut self, value: T) -> DrawableHandle<T> {
        let index = u32::try_from(self.slots.len()).unwrap_or_else(|_| {
            panic!("drawable arena exceeded {} slots", u32::MAX);
        });
        self.slots.push(value.into_drawable());
        list_stats::record_drawable_allocated();
        DrawableHandle::new(index, self.epoch)
    }

    /// Resolve a handle allocated in the current epoch.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or was not produced by this arena for a
    /// `T`. Both are caller bugs, not runtime conditions.
    pub fn get<T: ArenaDrawable>(&self, handle: DrawableHandle<T>) -> &T {
        self.try_get(handle).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Checked form of [`get`](Self::get).
    pub fn try_get<T: ArenaDrawable>(&self, handle: DrawableHandle<T>) -> Result<&T> {
        if handle.epoch != self.epoch {
            return Err(ListError::StaleHandle {
                handle_epoch: handle.epoch,
                arena_epoch: self.epoch,
            });
        }
        self.slots
            .get(handle.index as usize)
            .and_then(T::from_drawable)
            .ok_or(ListError::ForeignHandle {
                index: handle.index,
                expected: T::KIND,
            })
    }

    /// Drop every drawable at once, keeping the backing storage.
    ///
    /// All handles from the previous epoch become stale.
    pub fn rewind(&mut self) {
        self.slots.clear();
        self.advance_epoch();
    }

    /// Drop every drawable and return the backing storage.
    pub fn release(&mut self) {
        self.slots = Vec::new();
        self.advance_epoch();
    }

    /// Epochs never wrap; a wrapped epoch would revive ancient handles.
    fn advance_epoch(&mut self) {
        self.epoch = self
            .epoch
            .checked_add(1)
            .unwrap_or_else(|| panic!("drawable arena epoch exhausted"));
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drawables the arena can hold before it has to grow.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Bytes reserved by the backing storage.
    pub fn allocated_bytes(&self) -> usize {
        self.slots.capacity() * mem::size_of::<Drawable>()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::content::{Functor, RenderNode};
    use crate::geometry::Rect;
    use crate::list::drawable::{FunctorDrawable, NodeDrawable};
    use crate::testing::{TestFunctor, TestNode};
    use crate::transform::Transform;

    fn node_drawable(node: &Arc<TestNode>) -> NodeDrawable {
        let node: Arc<dyn RenderNode> = node.clone();
        NodeDrawable::new(&node, Transform::IDENTITY)
    }

    #[test]
    fn test_allocate_and_get() {
        let node = TestNode::new("a");
        let mut arena = DrawableArena::new();
        let handle = arena.allocate(node_drawable(&node));

        assert_eq!(arena.len(), 1);
        assert_eq!(handle.index(), 0);
        assert_eq!(arena.get(handle).node().name(), "a");
    }

    #[test]
    fn test_handles_survive_growth() {
        let node = TestNode::new("a");
        let mut arena = DrawableArena::with_capacity(1);
        let first = arena.allocate(node_drawable(&node));
        for _ in 0..64 {
            arena.allocate(node_drawable(&node));
        }
        assert!(arena.capacity() >= 65);
        assert!(arena.try_get(first).is_ok());
    }

    #[test]
    fn test_rewind_keeps_capacity_and_invalidates_handles() {
        let node = TestNode::new("a");
        let mut arena = DrawableArena::new();
        let handle = arena.allocate(node_drawable(&node));
        arena.allocate(node_drawable(&node));
        let capacity = arena.capacity();

        arena.rewind();

        assert!(arena.is_empty());
        assert_eq!(arena.capacity(), capacity);
        assert_eq!(arena.epoch(), 1);
        assert_eq!(
            arena.try_get(handle).unwrap_err(),
            ListError::StaleHandle {
                handle_epoch: 0,
                arena_epoch: 1
            }
        );
    }

    #[test]
    fn test_rewind_does_not_touch_external_entities() {
        let node = TestNode::new("a");
        let mut arena = DrawableArena::new();
        arena.allocate(node_drawable(&node));
        arena.rewind();
        assert_eq!(Arc::strong_count(&node), 1);
        assert_eq!(Arc::weak_count(&node), 0);
    }

    #[test]
    fn test_release_frees_storage() {
        let node = TestNode::new("a");
        let mut arena = DrawableArena::with_capacity(16);
        arena.allocate(node_drawable(&node));
        arena.release();
        assert_eq!(arena.capacity(), 0);
        assert_eq!(arena.allocated_bytes(), 0);
    }

    #[test]
    fn test_wrong_kind_is_foreign() {
        let node = TestNode::new("a");
        let functor = TestFunctor::new();
        let mut arena = DrawableArena::new();
        let node_handle = arena.allocate(node_drawable(&node));

        let functor_dyn: Arc<dyn Functor> = functor.clone();
        arena.allocate(FunctorDrawable::new(
            &functor_dyn,
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Transform::IDENTITY,
        ));

        let forged: DrawableHandle<FunctorDrawable> = DrawableHandle::new(node_handle.index(), 0);
        assert!(matches!(
            arena.try_get(forged),
            Err(ListError::ForeignHandle { index: 0, .. })
        ));
    }

    #[test]
    #[should_panic(expected = "drawable arena epoch exhausted")]
    fn test_epoch_never_wraps() {
        let mut arena = DrawableArena {
            slots: Vec::new(),
            epoch: u32::MAX,
        };
        arena.rewind();
    }

    #[test]
    #[should_panic(expected = "stale drawable handle")]
    fn test_get_stale_panics() {
        let node = TestNode::new("a");
        let mut arena = DrawableArena::new();
        let handle = arena.allocate(node_drawable(&node));
        arena.rewind();
        let _ = arena.get(handle);
    }
}
