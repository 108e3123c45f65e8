use super::scene::{Entity, EntityId, Vec2};

/// Axis-aligned rectangle in field coordinates (x right, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Clamps a box centered at `center` so that it lies inside `self`.
    /// Boxes wider than the rect end up centered on it.
    pub fn clamp_box(&self, center: Vec2, half_extents: Vec2) -> Vec2 {
        Vec2 {
            x: clamp_axis(center.x, half_extents.x, self.x, self.right()),
            y: clamp_axis(center.y, half_extents.y, self.y, self.bottom()),
        }
    }

    fn box_fully_outside(&self, center: Vec2, half_extents: Vec2) -> bool {
        center.x + half_extents.x < self.x
            || center.x - half_extents.x > self.right()
            || center.y + half_extents.y < self.y
            || center.y - half_extents.y > self.bottom()
    }
}

fn clamp_axis(center: f32, half: f32, min: f32, max: f32) -> f32 {
    let lo = min + half;
    let hi = max - half;
    if lo > hi {
        return (min + max) * 0.5;
    }
    center.clamp(lo, hi)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionGroup(pub u16);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub half_extents: Vec2,
    pub group: Option<CollisionGroup>,
    pub collide_world_bounds: bool,
    pub cull_outside_field: bool,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            half_extents: Vec2 { x: 0.5, y: 0.5 },
            group: None,
            collide_world_bounds: false,
            cull_outside_field: false,
        }
    }
}

/// One overlapping pair; `a` belongs to the first group of the watch and
/// `b` to the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapEvent {
    pub a: EntityId,
    pub b: EntityId,
    pub group_a: CollisionGroup,
    pub group_b: CollisionGroup,
}

pub(crate) fn integrate(entities: &mut [Entity], dt_seconds: f32, world_bounds: Rect) {
    for entity in entities {
        let position = &mut entity.transform.position;
        position.x += entity.velocity.x * dt_seconds;
        position.y += entity.velocity.y * dt_seconds;
        if entity.body.collide_world_bounds {
            *position = world_bounds.clamp_box(*position, entity.body.half_extents);
        }
    }
}

fn boxes_overlap(a: &Entity, b: &Entity) -> bool {
    let pa = a.transform.position;
    let pb = b.transform.position;
    let ha = a.body.half_extents;
    let hb = b.body.half_extents;
    (pa.x - pb.x).abs() < ha.x + hb.x && (pa.y - pb.y).abs() < ha.y + hb.y
}

/// Brute-force pair scan; the scenes this engine hosts keep entity counts
/// in the hundreds.
pub(crate) fn overlapping_pairs(
    entities: &[Entity],
    watches: &[(CollisionGroup, CollisionGroup)],
    is_pending_despawn: impl Fn(EntityId) -> bool,
) -> Vec<OverlapEvent> {
    let mut events = Vec::new();
    for &(group_a, group_b) in watches {
        for a in entities
            .iter()
            .filter(|entity| entity.body.group == Some(group_a))
        {
            if is_pending_despawn(a.id) {
                continue;
            }
            for b in entities
                .iter()
                .filter(|entity| entity.body.group == Some(group_b))
            {
                if a.id == b.id || is_pending_despawn(b.id) {
                    continue;
                }
                if boxes_overlap(a, b) {
                    events.push(OverlapEvent {
                        a: a.id,
                        b: b.id,
                        group_a,
                        group_b,
                    });
                }
            }
        }
    }
    events
}

pub(crate) fn outside_field(entities: &[Entity], field: Rect) -> Vec<EntityId> {
    entities
        .iter()
        .filter(|entity| entity.body.cull_outside_field)
        .filter(|entity| field.box_fully_outside(entity.transform.position, entity.body.half_extents))
        .map(|entity| entity.id)
        .collect()
}
