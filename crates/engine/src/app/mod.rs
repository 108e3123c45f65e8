mod input;
mod loop_runner;
mod metrics;
mod physics;
mod rendering;
mod runtime;
mod scene;
mod timer;

pub use input::{ActionStates, InputAction, InputLatch};
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use physics::{Body, CollisionGroup, OverlapEvent, Rect};
pub use rendering::{RenderError, Renderer, PLACEHOLDER_HALF_SIZE_PX};
pub use runtime::{run_scene_tick, HeadlessDriver};
pub use scene::{
    Backdrop, Entity, EntityId, EntityIdAllocator, InputSnapshot, RenderableDesc, RenderableKind,
    Scene, SceneCommand, SceneWorld, Transform, Vec2,
};
pub use timer::{TimerId, TimerQueue, TimerTag};
