//! Test doubles for the external entities a list references.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::content::{Canvas, Color, Functor, ImageId, MutableImage, RenderNode, VectorContent};
use crate::geometry::Rect;
use crate::list::ListOwner;
use crate::transform::Transform;
use crate::tree_info::TreeInfo;

/// Color the vector double paints with, to tell it apart from functors.
pub const VECTOR_COLOR: Color = Color::rgb(0.0, 1.0, 0.0);

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    Save,
    Restore,
    Concat(Transform),
    SaveLayer(Rect),
    ClipRect(Rect),
    Rect(Rect, Color),
    Image(ImageId, Rect),
    Text(String, Rect),
}

/// Canvas that logs every call.
#[derive(Debug, Default)]
pub struct LogCanvas {
    pub ops: Vec<CanvasOp>,
}

impl Canvas for LogCanvas {
    fn save(&mut self) {
        self.ops.push(CanvasOp::Save);
    }

    fn restore(&mut self) {
        self.ops.push(CanvasOp::Restore);
    }

    fn concat(&mut self, transform: &Transform) {
        self.ops.push(CanvasOp::Concat(*transform));
    }

    fn save_layer(&mut self, bounds: Rect) {
        self.ops.push(CanvasOp::SaveLayer(bounds));
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.ops.push(CanvasOp::ClipRect(rect));
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(CanvasOp::Rect(rect, color));
    }

    fn draw_image(&mut self, image: ImageId, rect: Rect) {
        self.ops.push(CanvasOp::Image(image, rect));
    }

    fn draw_text(&mut self, text: &str, rect: Rect, _color: Color) {
        self.ops.push(CanvasOp::Text(text.to_string(), rect));
    }
}

/// Node that draws its name as text at the origin.
#[derive(Debug)]
pub struct TestNode {
    name: String,
    projects_backwards: AtomicBool,
}

impl TestNode {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            projects_backwards: AtomicBool::new(false),
        })
    }

    pub fn set_projects_backwards(&self, value: bool) {
        self.projects_backwards.store(value, Ordering::Relaxed);
    }
}

impl RenderNode for TestNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn projects_backwards(&self) -> bool {
        self.projects_backwards.load(Ordering::Relaxed)
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.draw_text(&self.name, Rect::ZERO, Color::BLACK);
    }
}

/// Functor that fills its bounds in white and counts calls.
#[derive(Debug, Default)]
pub struct TestFunctor {
    syncs: AtomicUsize,
    draws: AtomicUsize,
}

impl TestFunctor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sync_count(&self) -> usize {
        self.syncs.load(Ordering::Relaxed)
    }

    pub fn draw_count(&self) -> usize {
        self.draws.load(Ordering::Relaxed)
    }
}

impl Functor for TestFunctor {
    fn sync(&self) {
        self.syncs.fetch_add(1, Ordering::Relaxed);
    }

    fn draw(&self, canvas: &mut dyn Canvas, bounds: Rect) {
        self.draws.fetch_add(1, Ordering::Relaxed);
        canvas.draw_rect(bounds, Color::WHITE);
    }
}

#[derive(Debug)]
pub struct TestImage {
    id: ImageId,
    prepares: AtomicUsize,
    releases: AtomicUsize,
    invalidates: AtomicBool,
    fail_upload: AtomicBool,
}

impl TestImage {
    pub fn new(id: ImageId) -> Arc<Self> {
        Arc::new(Self {
            id,
            prepares: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
            invalidates: AtomicBool::new(false),
            fail_upload: AtomicBool::new(false),
        })
    }

    pub fn set_invalidates(&self, value: bool) {
        self.invalidates.store(value, Ordering::Relaxed);
    }

    pub fn set_fail_upload(&self, value: bool) {
        self.fail_upload.store(value, Ordering::Relaxed);
    }

    pub fn prepare_count(&self) -> usize {
        self.prepares.load(Ordering::Relaxed)
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::Relaxed)
    }
}

impl MutableImage for TestImage {
    fn id(&self) -> ImageId {
        self.id
    }

    fn prepare(&self, info: &mut TreeInfo) -> bool {
        self.prepares.fetch_add(1, Ordering::Relaxed);
        if self.fail_upload.load(Ordering::Relaxed) {
            info.prepare_textures = false;
        }
        self.invalidates.load(Ordering::Relaxed)
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
pub struct TestVector {
    syncs: AtomicUsize,
    dirty: AtomicBool,
    consumed: AtomicBool,
}

impl TestVector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_dirty(&self, value: bool) {
        self.dirty.store(value, Ordering::Relaxed);
    }

    pub fn sync_count(&self) -> usize {
        self.syncs.load(Ordering::Relaxed)
    }

    pub fn consumed(&self) -> bool {
        self.consumed.load(Ordering::Relaxed)
    }
}

impl VectorContent for TestVector {
    fn sync_properties(&self) {
        self.syncs.fetch_add(1, Ordering::Relaxed);
    }

    fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    fn set_property_change_will_be_consumed(&self, consumed: bool) {
        self.consumed.store(consumed, Ordering::Relaxed);
    }

    fn draw(&self, canvas: &mut dyn Canvas, bounds: Rect) {
        canvas.draw_rect(bounds, VECTOR_COLOR);
    }
}

#[derive(Debug)]
pub struct TestOwner {
    attached: bool,
    session: u64,
}

impl TestOwner {
    pub fn new(attached: bool, session: u64) -> Self {
        Self { attached, session }
    }
}

impl ListOwner for TestOwner {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn session(&self) -> u64 {
        self.session
    }
}
