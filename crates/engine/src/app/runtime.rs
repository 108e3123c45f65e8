use std::time::Duration;

use tracing::debug;

use super::input::{InputAction, InputLatch};
use super::scene::{InputSnapshot, Scene, SceneCommand, SceneWorld};

/// Runs one fixed simulation step against `world`.
///
/// Timer firings, the scene update, overlap reports and field exits are
/// delivered strictly one after another; pending spawns/despawns are
/// applied between each phase so later phases see a settled world.
pub fn run_scene_tick<S: Scene + ?Sized>(
    scene: &mut S,
    world: &mut SceneWorld,
    fixed_dt: Duration,
    input: &InputSnapshot,
) -> SceneCommand {
    let dt_seconds = fixed_dt.as_secs_f32();

    for tag in world.advance_timers(fixed_dt) {
        scene.on_timer(tag, world);
    }
    world.apply_pending();

    let command = scene.update(dt_seconds, input, world);
    world.apply_pending();

    world.step_physics(dt_seconds);
    for event in world.collect_overlaps() {
        scene.on_overlap(event, world);
    }
    world.apply_pending();

    for entity in world.collect_left_field() {
        scene.on_left_field(entity, world);
    }
    world.apply_pending();

    command
}

pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.world.apply_pending();
        self.is_loaded = true;
    }

    pub(crate) fn tick(&mut self, fixed_dt: Duration, input: &InputSnapshot) -> SceneCommand {
        run_scene_tick(self.scene.as_mut(), &mut self.world, fixed_dt, input)
    }

    pub(crate) fn render(&mut self) {
        self.scene.render(&self.world);
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title(&self.world)
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            self.scene.unload(&mut self.world);
            self.world.clear();
            self.is_loaded = false;
        }
    }
}

/// Windowless frame driver with a deterministic clock. Held actions are
/// fed through the same latch the window loop uses, so press edges behave
/// identically.
pub struct HeadlessDriver<S: Scene> {
    scene: S,
    world: SceneWorld,
    latch: InputLatch,
    fixed_dt: Duration,
    ticks: u64,
}

impl<S: Scene> HeadlessDriver<S> {
    pub fn new(mut scene: S, fixed_dt: Duration) -> Self {
        let mut world = SceneWorld::default();
        scene.load(&mut world);
        world.apply_pending();
        Self {
            scene,
            world,
            latch: InputLatch::default(),
            fixed_dt,
            ticks: 0,
        }
    }

    pub fn step(&mut self, held: &[InputAction]) -> SceneCommand {
        self.latch.set_held(held);
        let snapshot = self.latch.snapshot_for_tick();
        self.ticks = self.ticks.saturating_add(1);
        run_scene_tick(&mut self.scene, &mut self.world, self.fixed_dt, &snapshot)
    }

    /// Runs `ticks` steps with the same held set; stops early on
    /// `SceneCommand::Quit`.
    pub fn run(&mut self, ticks: u32, held: &[InputAction]) -> SceneCommand {
        for _ in 0..ticks {
            if self.step(held) == SceneCommand::Quit {
                debug!(tick = self.ticks, "headless_quit");
                return SceneCommand::Quit;
            }
        }
        SceneCommand::None
    }

    pub fn fixed_dt(&self) -> Duration {
        self.fixed_dt
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub fn into_parts(mut self) -> (S, SceneWorld) {
        self.scene.unload(&mut self.world);
        (self.scene, self.world)
    }
}
