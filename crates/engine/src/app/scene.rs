use std::ops::{Add, Mul, Sub};
use std::time::Duration;

use super::input::{ActionStates, InputAction};
use super::physics::{self, Body, CollisionGroup, OverlapEvent, Rect};
use super::timer::{TimerId, TimerQueue, TimerTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    pressed: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(quit_requested: bool, actions: ActionStates, pressed: ActionStates) -> Self {
        Self {
            quit_requested,
            actions,
            pressed,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// True only on the tick where `action` went from up to down.
    pub fn just_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set(action, true);
        self.pressed.set(action, true);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction, or `fallback` when the length is
    /// zero or not finite.
    pub fn normalize_or(self, fallback: Vec2) -> Vec2 {
        let length = self.length();
        if length > 0.0 && length.is_finite() {
            Vec2 {
                x: self.x / length,
                y: self.y / length,
            }
        } else {
            fallback
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Transform {
    pub position: Vec2,
}

impl Transform {
    pub const fn at(position: Vec2) -> Self {
        Self { position }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderableKind {
    Placeholder,
    Sprite(String),
}

#[derive(Debug, Clone)]
pub struct RenderableDesc {
    pub kind: RenderableKind,
    pub debug_name: &'static str,
    pub scale: f32,
    /// Fill color used when no sprite is available.
    pub tint: [u8; 4],
}

impl RenderableDesc {
    pub fn placeholder(debug_name: &'static str) -> Self {
        Self {
            kind: RenderableKind::Placeholder,
            debug_name,
            scale: 1.0,
            tint: [220, 220, 240, 255],
        }
    }
}

/// Full-field image drawn beneath every entity, anchored top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Backdrop {
    pub sprite_key: String,
    pub scale: f32,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub transform: Transform,
    pub velocity: Vec2,
    pub body: Body,
    pub renderable: RenderableDesc,
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

const DEFAULT_FIELD: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

#[derive(Debug)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    pending_spawns: Vec<Entity>,
    pending_despawns: Vec<EntityId>,
    field: Rect,
    world_bounds: Rect,
    overlap_watches: Vec<(CollisionGroup, CollisionGroup)>,
    timers: TimerQueue,
    backdrop: Option<Backdrop>,
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self {
            allocator: EntityIdAllocator::default(),
            entities: Vec::new(),
            pending_spawns: Vec::new(),
            pending_despawns: Vec::new(),
            field: DEFAULT_FIELD,
            world_bounds: DEFAULT_FIELD,
            overlap_watches: Vec::new(),
            timers: TimerQueue::default(),
            backdrop: None,
        }
    }
}

impl SceneWorld {
    pub fn spawn(&mut self, transform: Transform, renderable: RenderableDesc) -> EntityId {
        self.spawn_body(transform, renderable, Body::default())
    }

    /// Queues a new entity; it joins `entities()` on the next
    /// `apply_pending`, but setters already accept its id.
    pub fn spawn_body(
        &mut self,
        transform: Transform,
        renderable: RenderableDesc,
        body: Body,
    ) -> EntityId {
        let id = self.allocator.allocate();
        self.pending_spawns.push(Entity {
            id,
            transform,
            velocity: Vec2::ZERO,
            body,
            renderable,
        });
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        let exists_now = self.entities.iter().any(|entity| entity.id == id);
        let pending_spawn = self.pending_spawns.iter().any(|entity| entity.id == id);
        if !exists_now && !pending_spawn {
            return false;
        }
        self.pending_despawns.push(id);
        true
    }

    pub fn is_pending_despawn(&self, id: EntityId) -> bool {
        self.pending_despawns.contains(&id)
    }

    pub fn apply_pending(&mut self) {
        if !self.pending_despawns.is_empty() {
            self.pending_despawns.sort_by_key(|id| id.0);
            self.pending_despawns.dedup();
            let pending = &self.pending_despawns;
            let keep = |entity: &Entity| {
                pending
                    .binary_search_by_key(&entity.id.0, |id| id.0)
                    .is_err()
            };
            self.entities.retain(keep);
            self.pending_spawns.retain(keep);
            self.pending_despawns.clear();
        }

        if !self.pending_spawns.is_empty() {
            self.entities.append(&mut self.pending_spawns);
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending_spawns.clear();
        self.pending_despawns.clear();
        self.overlap_watches.clear();
        self.timers.clear();
        self.backdrop = None;
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    fn live_or_pending_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .chain(self.pending_spawns.iter_mut())
            .find(|entity| entity.id == id)
    }

    pub fn position(&self, id: EntityId) -> Option<Vec2> {
        self.entities
            .iter()
            .chain(self.pending_spawns.iter())
            .find(|entity| entity.id == id)
            .map(|entity| entity.transform.position)
    }

    pub fn set_velocity(&mut self, id: EntityId, velocity: Vec2) -> bool {
        match self.live_or_pending_mut(id) {
            Some(entity) => {
                entity.velocity = velocity;
                true
            }
            None => false,
        }
    }

    pub fn set_collide_world_bounds(&mut self, id: EntityId, enabled: bool) -> bool {
        match self.live_or_pending_mut(id) {
            Some(entity) => {
                entity.body.collide_world_bounds = enabled;
                true
            }
            None => false,
        }
    }

    pub fn set_sprite(&mut self, id: EntityId, sprite_key: &str) -> bool {
        match self.live_or_pending_mut(id) {
            Some(entity) => {
                entity.renderable.kind = RenderableKind::Sprite(sprite_key.to_string());
                true
            }
            None => false,
        }
    }

    pub fn field(&self) -> Rect {
        self.field
    }

    pub fn set_field(&mut self, field: Rect) {
        self.field = field;
    }

    pub fn world_bounds(&self) -> Rect {
        self.world_bounds
    }

    pub fn set_world_bounds(&mut self, bounds: Rect) {
        self.world_bounds = bounds;
    }

    pub fn backdrop(&self) -> Option<&Backdrop> {
        self.backdrop.as_ref()
    }

    pub fn set_backdrop(&mut self, backdrop: Option<Backdrop>) {
        self.backdrop = backdrop;
    }

    /// Requests an `OverlapEvent` for every pair from `group_a` x `group_b`
    /// whose boxes intersect after a physics step.
    pub fn watch_overlap(&mut self, group_a: CollisionGroup, group_b: CollisionGroup) {
        if !self.overlap_watches.contains(&(group_a, group_b)) {
            self.overlap_watches.push((group_a, group_b));
        }
    }

    pub fn add_repeating_timer(&mut self, interval: Duration, tag: TimerTag) -> TimerId {
        self.timers.add_repeating(interval, tag)
    }

    pub fn advance_timers(&mut self, dt: Duration) -> Vec<TimerTag> {
        self.timers.advance(dt)
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    pub fn elapsed(&self) -> Duration {
        self.timers.elapsed()
    }

    pub fn step_physics(&mut self, dt_seconds: f32) {
        physics::integrate(&mut self.entities, dt_seconds, self.world_bounds);
    }

    pub fn collect_overlaps(&self) -> Vec<OverlapEvent> {
        if self.overlap_watches.is_empty() {
            return Vec::new();
        }
        physics::overlapping_pairs(&self.entities, &self.overlap_watches, |id| {
            self.is_pending_despawn(id)
        })
    }

    pub fn collect_left_field(&self) -> Vec<EntityId> {
        physics::outside_field(&self.entities, self.field)
            .into_iter()
            .filter(|id| !self.is_pending_despawn(*id))
            .collect()
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn on_timer(&mut self, _tag: TimerTag, _world: &mut SceneWorld) {}
    fn on_overlap(&mut self, _event: OverlapEvent, _world: &mut SceneWorld) {}
    fn on_left_field(&mut self, _entity: EntityId, _world: &mut SceneWorld) {}
    fn render(&mut self, world: &SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}
