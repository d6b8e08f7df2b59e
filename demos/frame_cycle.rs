//! Records a small scene on one thread and prepares and plays it on another,
//! handing retired lists back to the producer for reuse.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example frame_cycle --features list-stats
//! ```

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use displaylist::list_stats;
use displaylist::prelude::*;

const FRAMES: u64 = 6;

/// Canvas that logs calls instead of drawing pixels.
#[derive(Default)]
struct LogCanvas {
    depth: usize,
    calls: usize,
}

impl LogCanvas {
    fn log(&mut self, what: std::fmt::Arguments<'_>) {
        self.calls += 1;
        log::trace!("{:indent$}{}", "", what, indent = self.depth * 2);
    }
}

impl Canvas for LogCanvas {
    fn save(&mut self) {
        self.log(format_args!("save"));
        self.depth += 1;
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.log(format_args!("restore"));
    }

    fn concat(&mut self, transform: &Transform) {
        self.log(format_args!("concat {:?}", transform.data));
    }

    fn save_layer(&mut self, bounds: Rect) {
        self.log(format_args!("save_layer {bounds:?}"));
        self.depth += 1;
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.log(format_args!("clip {rect:?}"));
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.log(format_args!("rect {rect:?} {color:?}"));
    }

    fn draw_image(&mut self, image: ImageId, rect: Rect) {
        self.log(format_args!("image #{image} {rect:?}"));
    }

    fn draw_text(&mut self, text: &str, rect: Rect, _color: Color) {
        self.log(format_args!("text {text:?} {rect:?}"));
    }
}

struct Label {
    text: String,
}

impl RenderNode for Label {
    fn name(&self) -> &str {
        &self.text
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.draw_text(&self.text, Rect::new(0.0, 0.0, 80.0, 16.0), Color::WHITE);
    }
}

/// Stands in for a platform callback such as an embedded web view.
#[derive(Default)]
struct Embed {
    syncs: AtomicU32,
}

impl Functor for Embed {
    fn sync(&self) {
        self.syncs.fetch_add(1, Ordering::Relaxed);
    }

    fn draw(&self, canvas: &mut dyn Canvas, bounds: Rect) {
        canvas.draw_rect(bounds, Color::rgb(0.2, 0.2, 0.3));
    }
}

/// Image whose contents change every other frame.
struct Thumbnail {
    version: AtomicU64,
    uploaded: AtomicU64,
}

impl MutableImage for Thumbnail {
    fn id(&self) -> ImageId {
        42
    }

    fn prepare(&self, _info: &mut TreeInfo) -> bool {
        let version = self.version.load(Ordering::Relaxed);
        self.uploaded.swap(version, Ordering::Relaxed) != version
    }
}

struct Owner {
    session: u64,
}

impl ListOwner for Owner {
    fn is_attached(&self) -> bool {
        true
    }

    fn session(&self) -> u64 {
        self.session
    }
}

struct Scene {
    title: Arc<dyn RenderNode>,
    status: Arc<dyn RenderNode>,
    embed: Arc<Embed>,
    thumbnail: Arc<Thumbnail>,
}

impl Scene {
    fn new() -> Self {
        Self {
            title: Arc::new(Label {
                text: "title".to_string(),
            }),
            status: Arc::new(Label {
                text: "status".to_string(),
            }),
            embed: Arc::new(Embed::default()),
            thumbnail: Arc::new(Thumbnail {
                version: AtomicU64::new(1),
                uploaded: AtomicU64::new(0),
            }),
        }
    }

    fn record(&self, list: &mut DisplayList, frame: u64) {
        let thumbnail: Arc<dyn MutableImage> = self.thumbnail.clone();
        let embed: Arc<dyn Functor> = self.embed.clone();
        let mut rec = list.record();
        rec.draw_rect(Rect::new(0.0, 0.0, 320.0, 32.0), Color::rgb(0.1, 0.1, 0.15));
        rec.save();
        rec.translate(8.0, 8.0);
        rec.draw_node(&self.title);
        rec.translate(96.0, 0.0);
        rec.draw_node(&self.status);
        rec.restore();
        rec.draw_mutable_image(&thumbnail, Rect::new(200.0, 4.0, 24.0, 24.0));
        if frame % 3 == 0 {
            rec.draw_functor(&embed, Rect::new(240.0, 0.0, 80.0, 32.0));
        }
        rec.finish();
    }
}

fn main() {
    env_logger::init();

    let config = ListConfig::new().max_retained_bytes(64 * 1024);
    if let Err(err) = config.validate() {
        log::error!("{err}");
        return;
    }

    let scene = Arc::new(Scene::new());
    let (frame_tx, frame_rx) = mpsc::channel::<(u64, DisplayList)>();
    let (retired_tx, retired_rx) = mpsc::channel::<Option<DisplayList>>();

    let producer = {
        let scene = scene.clone();
        let config = config.clone();
        thread::spawn(move || {
            let mut spare: Option<DisplayList> = None;
            for frame in 0..FRAMES {
                let bounds = Rect::new(0.0, 0.0, 320.0, 32.0);
                let mut list = match spare.take() {
                    Some(mut list) => {
                        list.reset(bounds);
                        list
                    }
                    None => DisplayList::with_config(bounds, &config),
                };
                scene.record(&mut list, frame);
                scene.thumbnail.version.fetch_add(frame % 2, Ordering::Relaxed);

                if frame_tx.send((frame, list)).is_err() {
                    break;
                }
                match retired_rx.recv() {
                    Ok(kept) => spare = kept,
                    Err(_) => break,
                }
            }
        })
    };

    let controller = ReuseController::new(&config);
    let mut session = 1;
    let mut owner = Owner { session };
    for (frame, mut list) in frame_rx {
        list.sync_contents();

        // Functors draw through a layer on frames where the list holds one.
        let functors_need_layer = list.has_functor();
        let mut info = TreeInfo::new(TraversalMode::Full, frame);
        let invalidated =
            list.prepare_list_and_children(&mut info, functors_need_layer, |node, info, need_layer| {
                info.damage.dirty(Rect::new(0.0, 0.0, 80.0, 16.0));
                log::debug!("prepared '{}' (functor layer: {need_layer})", node.name());
                false
            });

        let mut canvas = LogCanvas::default();
        let options = PlaybackOptions {
            functors_need_layer,
            ..PlaybackOptions::default()
        };
        list.playback(&mut canvas, &options);
        log::info!(
            "frame {frame}: {} ops, {} canvas calls, damage {:?}, invalidated={invalidated}",
            list.commands().len(),
            canvas.calls,
            info.damage.damage_bounds()
        );

        // The surface is recreated halfway through; lists recorded before
        // that are discarded until the owner syncs under the new session.
        if frame == FRAMES / 2 {
            session += 1;
        }
        let kept = controller.retire(list, &owner, &RenderContext::new(session));
        owner.session = session;
        log::info!("frame {frame}: list kept = {}", kept.is_some());
        list_stats::end_frame();

        if retired_tx.send(kept).is_err() {
            break;
        }
    }

    if producer.join().is_err() {
        log::error!("producer thread panicked");
    }
    log::info!(
        "embed synced {} times",
        scene.embed.syncs.load(Ordering::Relaxed)
    );
}
