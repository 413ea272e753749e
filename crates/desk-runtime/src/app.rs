use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use desk_layout::{DeskLayout, SaveDebouncer};
use desk_physics::{
    AmbientStepper, DeskWorld, DropOutcome, InteractionContext, ObjectId, Vec2,
};
use tracing::{debug, info, warn};

/// Share of the remaining gap a dropping object covers each frame.
const DROP_RATE: f32 = 0.3;
/// Frames the scripted drag spends crossing the desk.
const DRAG_FRAMES: u32 = 90;
const PROGRESS_EVERY: u32 = 120;

pub struct SessionConfig {
    pub frames: u32,
    pub frame: Duration,
    /// Sleep between frames instead of running on a simulated clock.
    pub realtime: bool,
}

/// Where the scripted drag is.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Script {
    Grab,
    Drag { id: ObjectId, from: Vec2, to: Vec2, frame: u32 },
    Done,
}

pub struct Session {
    world: DeskWorld,
    ctx: InteractionContext,
    stepper: AmbientStepper,
    saver: SaveDebouncer,
    script: Script,
    save: Option<PathBuf>,
}

impl Session {
    pub fn new(layout: DeskLayout, save: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            world: layout.into_world()?,
            ctx: InteractionContext::new(),
            stepper: AmbientStepper::new(),
            saver: SaveDebouncer::default(),
            script: Script::Grab,
            save,
        })
    }

    #[must_use]
    pub fn world(&self) -> &DeskWorld {
        &self.world
    }

    /// Swap in a freshly loaded layout and restart the script.
    pub fn reload(&mut self, layout: DeskLayout) -> Result<()> {
        self.world = layout.into_world()?;
        self.ctx = InteractionContext::new();
        self.stepper = AmbientStepper::new();
        self.script = Script::Grab;
        info!(objects = self.world.len(), "layout reloaded");
        Ok(())
    }

    /// One render frame at time `now`.
    pub fn frame(&mut self, now: Duration) -> Result<()> {
        self.advance_script(now)?;
        self.world.animate_drops(DROP_RATE);

        if let Some(report) = self.stepper.advance(&mut self.world, &self.ctx, now) {
            for id in &report.tipped_over {
                info!(%id, "object fell over");
            }
            if report.moved > 0 || !report.tipped_over.is_empty() {
                self.saver.request(now);
            }
        }

        if self.saver.poll(now) {
            self.write_snapshot()?;
        }
        Ok(())
    }

    /// Write any save still waiting for its debounce delay.
    pub fn flush(&mut self) -> Result<()> {
        if self.saver.is_pending() {
            self.write_snapshot()?;
        }
        Ok(())
    }

    fn write_snapshot(&mut self) -> Result<()> {
        self.saver = SaveDebouncer::default();
        if let Some(path) = &self.save {
            DeskLayout::from_world(&self.world).to_path(path)?;
            debug!(path = %path.display(), "layout saved");
        }
        Ok(())
    }

    /// Grab the first object, carry it across to the mirrored side of the
    /// desk, then drop it.
    fn advance_script(&mut self, now: Duration) -> Result<()> {
        self.script = match self.script {
            Script::Grab => {
                let Some((id, obj)) = self.world.iter().next() else {
                    return Ok(());
                };
                let (kind, from) = (obj.kind, obj.xz());
                let to = Vec2::new(-from.x, from.y);
                let mode = self.ctx.begin_drag(&mut self.world, id, from, now)?;
                info!(%id, %kind, ?mode, "scripted drag started");
                Script::Drag { id, from, to, frame: 0 }
            }
            Script::Drag { id, from, to, frame } if frame < DRAG_FRAMES => {
                let t = (frame + 1) as f32 / DRAG_FRAMES as f32;
                let drag = self.ctx.drag_to(&mut self.world, from.lerp(to, t), now)?;
                if drag.contacts > 0 {
                    debug!(contacts = drag.contacts, resistance = drag.resistance, "drag contact");
                }
                Script::Drag { id, from, to, frame: frame + 1 }
            }
            Script::Drag { id, .. } => {
                match self.ctx.release(&mut self.world)? {
                    DropOutcome::Holder(slot) => info!(%id, holder = %slot.holder, "dropped into holder"),
                    DropOutcome::Resting { target_y, on } => {
                        info!(%id, target_y, on = ?on, "dropped");
                    }
                }
                self.saver.request(now);
                Script::Done
            }
            Script::Done => Script::Done,
        };
        Ok(())
    }
}

/// Drive a session for the configured number of frames.
pub fn run(
    session: &mut Session,
    config: &SessionConfig,
    mut reload: impl FnMut() -> Option<DeskLayout>,
) -> Result<()> {
    info!(frames = config.frames, frame_ms = config.frame.as_millis(), "session started");
    for index in 0..config.frames {
        if let Some(layout) = reload() {
            if let Err(e) = session.reload(layout) {
                warn!("keeping previous layout: {e:#}");
            }
        }

        let now = config.frame * index;
        session.frame(now)?;

        if (index + 1) % PROGRESS_EVERY == 0 {
            info!(frame = index + 1, objects = session.world().len(), "progress");
        }
        if config.realtime {
            std::thread::sleep(config.frame);
        }
    }
    session.flush()?;
    info!("session finished");
    Ok(())
}
