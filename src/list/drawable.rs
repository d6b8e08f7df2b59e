//! Drawables embedded in a recorded list.
//!
//! Each drawable stands for one appearance of an external entity in the
//! recorded sequence, together with the state captured when it was recorded.
//! They live in the list's [`DrawableArena`](super::arena::DrawableArena) and
//! are not mutated after the recording pass, except that functors are synced
//! through [`FunctorDrawable::sync`].

use std::sync::{Arc, Weak};

use crate::content::{Canvas, Functor, RenderNode};
use crate::error::{ListError, Result};
use crate::geometry::Rect;
use crate::transform::Transform;

use super::arena::ArenaDrawable;
use super::commands::PlaybackOptions;

/// A child scene node positioned in the list.
#[derive(Debug, Clone)]
pub struct NodeDrawable {
    node: Weak<dyn RenderNode>,
    /// Canvas transform at the moment the node was recorded. Playback gets
    /// the same transform from the command stream; this copy serves the
    /// prepare pass.
    recorded_matrix: Transform,
    projects_backwards: bool,
}

impl NodeDrawable {
    pub fn new(node: &Arc<dyn RenderNode>, recorded_matrix: Transform) -> Self {
        Self {
            node: Arc::downgrade(node),
            recorded_matrix,
            projects_backwards: node.projects_backwards(),
        }
    }

    /// The referenced node.
    ///
    /// # Panics
    ///
    /// Panics if the node was dropped while the list still references it.
    pub fn node(&self) -> Arc<dyn RenderNode> {
        self.try_node().unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_node(&self) -> Result<Arc<dyn RenderNode>> {
        self.node.upgrade().ok_or(ListError::DeadReference("render node"))
    }

    pub fn recorded_matrix(&self) -> Transform {
        self.recorded_matrix
    }

    /// Whether the node projected into an ancestor when it was recorded.
    pub fn projects_backwards(&self) -> bool {
        self.projects_backwards
    }

    /// Address of the referenced node, for identity comparisons only.
    pub(crate) fn node_addr(&self) -> *const () {
        self.node.as_ptr().cast::<()>()
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, options: &PlaybackOptions) {
        if self.projects_backwards && options.skip_projected {
            return;
        }
        let node = self.node();
        log::trace!("playback node '{}'", node.name());

        canvas.save();
        node.draw(canvas);
        canvas.restore();
    }
}

/// An invocation of an external platform-drawing callback.
#[derive(Debug, Clone)]
pub struct FunctorDrawable {
    functor: Weak<dyn Functor>,
    bounds: Rect,
    recorded_matrix: Transform,
}

impl FunctorDrawable {
    pub fn new(functor: &Arc<dyn Functor>, bounds: Rect, recorded_matrix: Transform) -> Self {
        Self {
            functor: Arc::downgrade(functor),
            bounds,
            recorded_matrix,
        }
    }

    /// # Panics
    ///
    /// Panics if the functor was dropped while the list still references it.
    pub fn functor(&self) -> Arc<dyn Functor> {
        self.functor
            .upgrade()
            .unwrap_or_else(|| panic!("{}", ListError::DeadReference("functor")))
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn recorded_matrix(&self) -> Transform {
        self.recorded_matrix
    }

    /// Forward the content-sync hook to the functor.
    pub fn sync(&self) {
        self.functor().sync();
    }

    /// Invoke the functor, through an offscreen layer when the owning tree
    /// says functors cannot draw straight into the target.
    pub fn draw(&self, canvas: &mut dyn Canvas, options: &PlaybackOptions) {
        let functor = self.functor();

        canvas.save();
        if options.functors_need_layer {
            canvas.save_layer(self.bounds);
            functor.draw(canvas, self.bounds);
            canvas.restore();
        } else {
            functor.draw(canvas, self.bounds);
        }
        canvas.restore();
    }
}

/// Every kind of drawable a list can allocate.
#[derive(Debug, Clone)]
pub enum Drawable {
    Node(NodeDrawable),
    Functor(FunctorDrawable),
}

impl ArenaDrawable for NodeDrawable {
    const KIND: &'static str = "node drawable";

    fn into_drawable(self) -> Drawable {
        Drawable::Node(self)
    }

    fn from_drawable(drawable: &Drawable) -> Option<&Self> {
        match drawable {
            Drawable::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl ArenaDrawable for FunctorDrawable {
    const KIND: &'static str = "functor drawable";

    fn into_drawable(self) -> Drawable {
        Drawable::Functor(self)
    }

    fn from_drawable(drawable: &Drawable) -> Option<&Self> {
        match drawable {
            Drawable::Functor(functor) => Some(functor),
            _ => None,
        }
    }
}
