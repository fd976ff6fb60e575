mod arm;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use glhelper_engine::gl::{HeadlessSurface, RendererContext};
use glhelper_engine::hooks::create_frame_scheduler;
use glhelper_engine::logging::{init_logging, LoggingConfig};

use arm::{ArmPose, ArmScene};

const DEFAULT_FRAMES: u64 = 120;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let frames = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<u64>().with_context(|| format!("frame count: {arg:?}"))?,
        None => DEFAULT_FRAMES,
    };

    let mut surface = HeadlessSurface::new(800, 600);
    let ctx = RendererContext::new(&mut surface).context("renderer init")?;
    let scene = Rc::new(RefCell::new(ArmScene::new(ctx)?));

    let scheduler = create_frame_scheduler::<ArmPose>();
    let failure: Rc<RefCell<Option<anyhow::Error>>> = Rc::new(RefCell::new(None));

    // ── render: draw the arm for whatever pose was emitted ────────────────
    let render = scheduler.render();
    let _draw = {
        let scene = Rc::clone(&scene);
        let failure = Rc::clone(&failure);
        render.add_event_listener(move |pose| {
            if let Err(e) = scene.borrow_mut().draw(pose) {
                log::error!("frame failed: {e:#}");
                failure.borrow_mut().get_or_insert(e);
            }
        })
    };

    // ── update: advance the joints, then request a redraw ─────────────────
    let pose = Rc::new(Cell::new(ArmPose::default()));
    let _animate = {
        let pose = Rc::clone(&pose);
        let render = render.clone();
        let update = scheduler.update();
        let channel = update.clone();
        let failure = Rc::clone(&failure);
        channel.add_event_listener(move |time| {
            if failure.borrow().is_some() {
                update.stop();
                return;
            }
            let mut next = pose.get();
            next.advance();
            pose.set(next);
            log::trace!("frame {} dt={:.4}", time.frame_index, time.dt);
            render.emit(&next);
        })
    };

    render.emit(&pose.get());
    let ticked = scheduler.run(Some(frames), Duration::ZERO);
    scheduler.shutdown();

    if let Some(e) = failure.borrow_mut().take() {
        return Err(e.context("arm demo aborted"));
    }

    let scene = scene.borrow();
    let gl = scene.context().gl();
    let errors = gl.errors();
    if !errors.is_empty() {
        bail!("{} GL calls rejected, first: {}", errors.len(), errors[0]);
    }

    let draws = gl.draw_count();
    log::info!(
        "arm demo: {ticked} frames, {draws} draws, {} GL calls, final pose {:?}",
        gl.calls().len(),
        pose.get()
    );
    println!("rendered {} frames ({draws} draw calls, 0 errors)", ticked + 1);
    Ok(())
}
