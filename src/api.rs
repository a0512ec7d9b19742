use glam::Vec3;

use crate::bounds::Bounds;
use crate::types::{BodyId, ColliderId, CollisionInfo};

/// Body state/integrator contract consumed by the world.
///
/// The world never integrates gravity or velocity itself; it calls into the
/// body at fixed points of the step and hands the accumulated corrections
/// back for the body to resolve. Net correction of an accumulator box is
/// `min() + max()` per axis.
pub trait RigidBody {
    fn linear_velocity(&self) -> Vec3;
    fn set_linear_velocity(&mut self, velocity: Vec3);

    /// Mass in arbitrary units. Non-positive is treated as 1 by the
    /// response; kinematic bodies are treated as infinitely heavy.
    fn mass(&self) -> f32;

    /// Kinematic bodies move only under host control and never receive
    /// position or velocity corrections.
    fn is_kinematic(&self) -> bool;

    fn gravity_scale(&self) -> f32 {
        1.0
    }

    /// Pre-step hook, called once per step before pairing.
    fn physics_update(&mut self) {}

    /// Estimated displacement over `step`, used to sweep broadphase bounds.
    fn move_vector(&self, step: f32) -> Vec3;

    /// Integrate position over `step`. Returns the displacement actually
    /// applied so the world can keep attached collider poses coherent.
    fn apply_move(&mut self, step: f32) -> Vec3;

    /// Resolve the accumulated position and velocity corrections. Returns
    /// the net positional change applied.
    fn solve_correction(&mut self, position: Bounds, velocity: Bounds) -> Vec3;
}

/// Enter/stay/exit callbacks fired at the end of a step, on the entity that
/// owns `collider`. All handlers default to no-ops; implement the ones the
/// host cares about.
pub trait EventSink {
    fn trigger_enter(&mut self, _collider: ColliderId, _other: ColliderId) {}
    fn trigger_stay(&mut self, _collider: ColliderId, _other: ColliderId) {}
    fn trigger_exit(&mut self, _collider: ColliderId, _other: ColliderId) {}

    fn collision_enter(&mut self, _collider: ColliderId, _collision: &CollisionInfo) {}
    fn collision_stay(&mut self, _collider: ColliderId, _collision: &CollisionInfo) {}
    fn collision_exit(&mut self, _collider: ColliderId, _collision: &CollisionInfo) {}
}

/// Buffered event, as captured by [`EventRecorder`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PhysicsEvent {
    TriggerEnter { collider: ColliderId, other: ColliderId },
    TriggerStay { collider: ColliderId, other: ColliderId },
    TriggerExit { collider: ColliderId, other: ColliderId },
    CollisionEnter { collider: ColliderId, other: ColliderId },
    CollisionStay { collider: ColliderId, other: ColliderId },
    CollisionExit { collider: ColliderId, other: ColliderId },
}

/// Sink that buffers events for draining after the step; contact data is
/// dropped, implement [`EventSink`] directly if the host needs it.
#[derive(Default)]
pub struct EventRecorder {
    events: Vec<PhysicsEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[PhysicsEvent] {
        &self.events
    }

    /// Drain and return the accumulated events.
    pub fn drain(&mut self) -> Vec<PhysicsEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for EventRecorder {
    fn trigger_enter(&mut self, collider: ColliderId, other: ColliderId) {
        self.events.push(PhysicsEvent::TriggerEnter { collider, other });
    }

    fn trigger_stay(&mut self, collider: ColliderId, other: ColliderId) {
        self.events.push(PhysicsEvent::TriggerStay { collider, other });
    }

    fn trigger_exit(&mut self, collider: ColliderId, other: ColliderId) {
        self.events.push(PhysicsEvent::TriggerExit { collider, other });
    }

    fn collision_enter(&mut self, collider: ColliderId, collision: &CollisionInfo) {
        self.events.push(PhysicsEvent::CollisionEnter {
            collider,
            other: collision.collider,
        });
    }

    fn collision_stay(&mut self, collider: ColliderId, collision: &CollisionInfo) {
        self.events.push(PhysicsEvent::CollisionStay {
            collider,
            other: collision.collider,
        });
    }

    fn collision_exit(&mut self, collider: ColliderId, collision: &CollisionInfo) {
        self.events.push(PhysicsEvent::CollisionExit {
            collider,
            other: collision.collider,
        });
    }
}

/// Minimal view of a scene-graph node, for resolving which body a collider
/// inherits motion from.
pub trait SceneNode {
    /// Body registered on this node itself, if any.
    fn body(&self) -> Option<BodyId>;
    fn parent(&self) -> Option<&Self>;
}

/// Walk `node` and its ancestors and return the nearest body found.
/// A collider whose chain reaches the root without one is immovable.
pub fn find_attached_body<N: SceneNode + ?Sized>(node: &N) -> Option<BodyId> {
    let mut current = Some(node);
    while let Some(n) = current {
        if let Some(body) = n.body() {
            return Some(body);
        }
        current = n.parent();
    }
    None
}
