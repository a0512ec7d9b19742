use std::collections::BTreeMap;

use glam::Vec3;
use log::{debug, trace};

use crate::api::{EventSink, RigidBody};
use crate::bounds::Bounds;
use crate::narrowphase::{Contact, Narrowphase};
use crate::types::*;

/// Per-collider simulation record. Slots are never moved; a freed slot is
/// reused by a later registration, so indices held by pair lists stay valid
/// for the whole step.
struct Shape {
    collider: Collider,
    alive: bool,
    /// This step's bounds, swept by the body's estimated motion.
    move_bounds: Bounds,
    /// Actor of the attached body, re-cached each step (None if unattached
    /// or the body is gone).
    actor: Option<BodyId>,
    triggers_prev: Vec<ColliderId>,
    triggers_new: Vec<ColliderId>,
    collisions_prev: Vec<CollisionInfo>,
    collisions_new: Vec<CollisionInfo>,
}

impl Shape {
    fn new(collider: Collider) -> Self {
        Shape {
            collider,
            alive: true,
            move_bounds: Bounds::ZERO,
            actor: None,
            triggers_prev: Vec::new(),
            triggers_new: Vec::new(),
            collisions_prev: Vec::new(),
            collisions_new: Vec::new(),
        }
    }
}

/// Per-body accumulator of pending corrections for the current step. The
/// two bounds grow via encapsulation as simultaneous contacts register
/// correction vectors; the net applied correction is `min + max` per axis.
struct Actor<B> {
    body: B,
    alive: bool,
    correct_position: Bounds,
    correct_velocity: Bounds,
    /// Displacement applied by the last integrate/solve call, used to keep
    /// attached collider poses coherent.
    moved: Vec3,
}

/// Rigid-body world: collider and body registries plus the per-step
/// pipeline (broadphase pairing, integration, narrowphase + response,
/// correction handoff, event dispatch).
///
/// One `step` call runs the whole pipeline synchronously. Registration
/// during a step is impossible by construction (the step borrows the world
/// mutably); unregistered entries are erased by the compaction pass at the
/// start of the next step.
pub struct PhysicsWorld<B> {
    pub cfg: WorldConfig,

    shapes: Vec<Shape>,
    actors: BTreeMap<BodyId, Actor<B>>,
    next_body: u32,

    // Pair lists rebuilt by the broadphase each step
    pairs: Vec<(usize, usize)>,
    trigger_pairs: Vec<(usize, usize)>,
}

impl<B: RigidBody> PhysicsWorld<B> {
    pub fn new(cfg: WorldConfig) -> Self {
        Self {
            cfg,
            shapes: Vec::new(),
            actors: BTreeMap::new(),
            next_body: 0,
            pairs: Vec::new(),
            trigger_pairs: Vec::new(),
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.cfg.gravity
    }

    // --- Registration ------------------------------------------------------

    pub fn register_body(&mut self, body: B) -> BodyId {
        let id = BodyId(self.next_body);
        self.next_body += 1;
        self.actors.insert(
            id,
            Actor {
                body,
                alive: true,
                correct_position: Bounds::ZERO,
                correct_velocity: Bounds::ZERO,
                moved: Vec3::ZERO,
            },
        );
        debug!("registered body {id:?}");
        id
    }

    /// Mark a body for removal; unknown ids are a no-op. The actor is
    /// erased at the next step's compaction pass.
    pub fn unregister_body(&mut self, id: BodyId) {
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.alive = false;
        }
    }

    pub fn body(&self, id: BodyId) -> Option<&B> {
        self.actors.get(&id).filter(|a| a.alive).map(|a| &a.body)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut B> {
        self.actors
            .get_mut(&id)
            .filter(|a| a.alive)
            .map(|a| &mut a.body)
    }

    /// Register a collider and return its slot handle. A collider carrying
    /// a key that is already registered is a no-op returning the existing
    /// handle; otherwise the first freed slot is reused, else a new slot is
    /// appended.
    pub fn register_collider(&mut self, collider: Collider) -> ColliderId {
        if let Some(key) = collider.key {
            for (index, shape) in self.shapes.iter().enumerate() {
                if shape.alive && shape.collider.key == Some(key) {
                    return ColliderId(index as u32);
                }
            }
        }

        let index = match self.shapes.iter().position(|s| !s.alive) {
            Some(free) => {
                self.shapes[free] = Shape::new(collider);
                free
            }
            None => {
                self.shapes.push(Shape::new(collider));
                self.shapes.len() - 1
            }
        };
        let id = ColliderId(index as u32);
        debug!("registered collider {id:?}");
        id
    }

    /// Mark a collider slot for removal; unknown ids are a no-op.
    pub fn unregister_collider(&mut self, id: ColliderId) {
        if let Some(shape) = self.shapes.get_mut(id.0 as usize) {
            shape.alive = false;
        }
    }

    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.shapes
            .get(id.0 as usize)
            .filter(|s| s.alive)
            .map(|s| &s.collider)
    }

    pub fn collider_mut(&mut self, id: ColliderId) -> Option<&mut Collider> {
        self.shapes
            .get_mut(id.0 as usize)
            .filter(|s| s.alive)
            .map(|s| &mut s.collider)
    }

    /// Push a pose update from the owning node (host-driven motion).
    pub fn set_pose(&mut self, id: ColliderId, pose: Pose) {
        if let Some(collider) = self.collider_mut(id) {
            collider.pose = pose;
        }
    }

    /// Number of live collider slots.
    pub fn collider_count(&self) -> usize {
        self.shapes.iter().filter(|s| s.alive).count()
    }

    // --- Step pipeline -----------------------------------------------------

    /// Advance the simulation by `step` seconds, firing enter/stay/exit
    /// events on `sink` at the end.
    pub fn step<S: EventSink>(&mut self, step: f32, sink: &mut S) {
        self.initialize(step);
        self.broad_phase();
        trace!(
            "step: {} shapes, {} collision pairs, {} trigger pairs",
            self.collider_count(),
            self.pairs.len(),
            self.trigger_pairs.len()
        );
        self.integrate(step);
        self.check_triggers();
        self.check_collisions();
        self.solve_corrections();
        self.dispatch_events(sink);
    }

    /// Compact removed entries, run the bodies' pre-step hooks, reset the
    /// correction accumulators and rebuild each shape's swept bounds.
    fn initialize(&mut self, step: f32) {
        self.compact();

        for actor in self.actors.values_mut() {
            actor.body.physics_update();
            actor.correct_position = Bounds::ZERO;
            actor.correct_velocity = Bounds::ZERO;
            actor.moved = Vec3::ZERO;
        }

        let actors = &self.actors;
        for shape in self.shapes.iter_mut().filter(|s| s.alive) {
            shape.triggers_new.clear();
            shape.collisions_new.clear();

            shape.actor = shape.collider.body.filter(|id| actors.contains_key(id));

            let bounds = shape.collider.world_bounds();
            let mut move_bounds = bounds;
            if let Some(id) = shape.actor {
                let swept = bounds.translated(actors[&id].body.move_vector(step));
                move_bounds.encapsulate(swept.min());
                move_bounds.encapsulate(swept.max());
            }
            shape.move_bounds = move_bounds;
        }
    }

    fn compact(&mut self) {
        let dead = self.actors.values().filter(|a| !a.alive).count();
        if dead > 0 {
            debug!("compacting {dead} removed bodies");
            self.actors.retain(|_, actor| actor.alive);
        }
        // Freed collider slots keep their position (handles are indices)
        // but drop their buffered state.
        for shape in &mut self.shapes {
            if !shape.alive {
                shape.triggers_prev.clear();
                shape.triggers_new.clear();
                shape.collisions_prev.clear();
                shape.collisions_new.clear();
            }
        }
    }

    /// All-pairs scan over swept bounds; same-body pairs are self-collision
    /// of a compound body and never formed.
    fn broad_phase(&mut self) {
        self.pairs.clear();
        self.trigger_pairs.clear();

        for i in 0..self.shapes.len() {
            if !self.shapes[i].alive {
                continue;
            }
            for j in (i + 1)..self.shapes.len() {
                if !self.shapes[j].alive {
                    continue;
                }
                if !self.shapes[i]
                    .move_bounds
                    .intersects(&self.shapes[j].move_bounds)
                {
                    continue;
                }
                if let (Some(a), Some(b)) =
                    (self.shapes[i].collider.body, self.shapes[j].collider.body)
                {
                    if a == b {
                        continue;
                    }
                }
                if self.shapes[i].collider.is_trigger || self.shapes[j].collider.is_trigger {
                    self.trigger_pairs.push((i, j));
                } else {
                    self.pairs.push((i, j));
                }
            }
        }
    }

    fn integrate(&mut self, step: f32) {
        for actor in self.actors.values_mut() {
            actor.moved = actor.body.apply_move(step);
        }
        self.translate_attached();
    }

    /// Carry the bodies' latest displacement over to their attached
    /// colliders so narrowphase and later steps see coherent poses.
    fn translate_attached(&mut self) {
        let actors = &self.actors;
        for shape in self.shapes.iter_mut().filter(|s| s.alive) {
            if let Some(actor) = shape.actor.and_then(|id| actors.get(&id)) {
                shape.collider.pose.position += actor.moved;
            }
        }
    }

    fn check_triggers(&mut self) {
        let pairs = std::mem::take(&mut self.trigger_pairs);
        for &(i, j) in &pairs {
            if Narrowphase::overlap(&self.shapes[i].collider, &self.shapes[j].collider) {
                self.shapes[i].triggers_new.push(ColliderId(j as u32));
                self.shapes[j].triggers_new.push(ColliderId(i as u32));
            }
        }
        self.trigger_pairs = pairs;
    }

    fn check_collisions(&mut self) {
        let pairs = std::mem::take(&mut self.pairs);
        for &(i, j) in &pairs {
            let Some(contact) =
                Narrowphase::contact(&self.shapes[i].collider, &self.shapes[j].collider)
            else {
                continue;
            };

            self.resolve(i, j, &contact);

            self.shapes[i].collisions_new.push(CollisionInfo {
                collider: ColliderId(j as u32),
                contacts: vec![ContactPoint {
                    point: contact.point,
                    normal: contact.normal,
                }],
            });
            self.shapes[j].collisions_new.push(CollisionInfo {
                collider: ColliderId(i as u32),
                contacts: vec![ContactPoint {
                    point: contact.point,
                    normal: -contact.normal,
                }],
            });
        }
        self.pairs = pairs;
    }

    /// Effective mass and velocity of a shape's actor for the response.
    /// Kinematic and unattached sides are infinitely heavy.
    fn response_profile(&self, actor: Option<BodyId>) -> (f32, Vec3) {
        match actor.and_then(|id| self.actors.get(&id)) {
            Some(a) if !a.body.is_kinematic() => {
                let mass = a.body.mass();
                (
                    if mass > 0.0 { mass } else { 1.0 },
                    a.body.linear_velocity(),
                )
            }
            Some(a) => (f32::INFINITY, a.body.linear_velocity()),
            None => (f32::INFINITY, Vec3::ZERO),
        }
    }

    /// Push mass-weighted position and velocity corrections for a contact
    /// into both actors' accumulators. Each side absorbs the fraction of
    /// the separation proportional to the *other* side's mass share; the
    /// impulse is applied only to a closing pair.
    fn resolve(&mut self, i: usize, j: usize, contact: &Contact) {
        let bounce = self.shapes[i].collider.bounciness * self.shapes[j].collider.bounciness;
        let actor_a = self.shapes[i].actor;
        let actor_b = self.shapes[j].actor;

        let (mass_a, vel_a) = self.response_profile(actor_a);
        let (mass_b, vel_b) = self.response_profile(actor_b);
        let total = mass_a + mass_b;
        // A finite mass against an infinite one divides to weight 0, which
        // hands the whole correction to the finite side.
        let weight_a = if mass_a.is_finite() { mass_a / total } else { 1.0 };
        let weight_b = if mass_b.is_finite() { mass_b / total } else { 1.0 };

        let normal = contact.normal;

        if mass_a.is_finite() {
            if let Some(actor) = actor_a.and_then(|id| self.actors.get_mut(&id)) {
                actor
                    .correct_position
                    .encapsulate(-normal * (contact.penetration * weight_b));
            }
        }
        if mass_b.is_finite() {
            if let Some(actor) = actor_b.and_then(|id| self.actors.get_mut(&id)) {
                actor
                    .correct_position
                    .encapsulate(normal * (contact.penetration * weight_a));
            }
        }

        let rel_n = (vel_a - vel_b).dot(normal);
        if rel_n > 0.0 {
            let impulse = -(1.0 + bounce) * rel_n * normal;
            if mass_a.is_finite() {
                if let Some(actor) = actor_a.and_then(|id| self.actors.get_mut(&id)) {
                    actor.correct_velocity.encapsulate(impulse * weight_b);
                }
            }
            if mass_b.is_finite() {
                if let Some(actor) = actor_b.and_then(|id| self.actors.get_mut(&id)) {
                    actor.correct_velocity.encapsulate(-impulse * weight_a);
                }
            }
        }
    }

    /// Hand the accumulated corrections to each body to resolve.
    fn solve_corrections(&mut self) {
        for actor in self.actors.values_mut() {
            actor.moved = actor
                .body
                .solve_correction(actor.correct_position, actor.correct_velocity);
        }
        self.translate_attached();
    }

    /// Diff this step's trigger/collision lists against the previous step's
    /// and fire enter/stay/exit; then the new lists become the previous.
    fn dispatch_events<S: EventSink>(&mut self, sink: &mut S) {
        for (index, shape) in self.shapes.iter_mut().enumerate() {
            if !shape.alive {
                continue;
            }
            let me = ColliderId(index as u32);

            for &other in &shape.triggers_new {
                if let Some(pos) = shape.triggers_prev.iter().position(|&o| o == other) {
                    shape.triggers_prev.remove(pos);
                } else {
                    sink.trigger_enter(me, other);
                }
                sink.trigger_stay(me, other);
            }
            for &other in &shape.triggers_prev {
                sink.trigger_exit(me, other);
            }
            shape.triggers_prev.clear();
            std::mem::swap(&mut shape.triggers_prev, &mut shape.triggers_new);

            // Collisions diff the same way, keyed by the partner collider.
            for collision in &shape.collisions_new {
                if let Some(pos) = shape
                    .collisions_prev
                    .iter()
                    .position(|c| c.collider == collision.collider)
                {
                    shape.collisions_prev.remove(pos);
                } else {
                    sink.collision_enter(me, collision);
                }
                sink.collision_stay(me, collision);
            }
            for collision in &shape.collisions_prev {
                sink.collision_exit(me, collision);
            }
            shape.collisions_prev.clear();
            std::mem::swap(&mut shape.collisions_prev, &mut shape.collisions_new);
        }
    }

    // --- Queries -----------------------------------------------------------

    /// Closest collider whose world bounds the ray strikes within
    /// `[0, max_distance]`. Spheres are tested by their bounds as well, an
    /// accepted approximation.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        self.raycast_filtered(origin, direction, max_distance, |_, _| true)
    }

    /// Raycast restricted to colliders accepted by `filter`.
    pub fn raycast_filtered<F>(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: F,
    ) -> Option<RaycastHit>
    where
        F: Fn(ColliderId, &Collider) -> bool,
    {
        const EPS: f32 = 1e-6;
        if max_distance <= 0.0 {
            return None;
        }
        if direction.x.abs() < EPS && direction.y.abs() < EPS && direction.z.abs() < EPS {
            return None;
        }

        let mut best: Option<RaycastHit> = None;
        for (index, shape) in self.shapes.iter().enumerate() {
            if !shape.alive {
                continue;
            }
            let id = ColliderId(index as u32);
            if !filter(id, &shape.collider) {
                continue;
            }
            let bounds = shape.collider.world_bounds();
            let Some(distance) = Narrowphase::ray_bounds(origin, direction, &bounds, max_distance)
            else {
                continue;
            };
            if best.as_ref().is_some_and(|hit| hit.distance <= distance) {
                continue;
            }
            let point = origin + direction * distance;
            best = Some(RaycastHit {
                collider: id,
                point,
                normal: Narrowphase::bounds_hit_normal(&bounds, point, direction),
                distance,
            });
        }
        best
    }
}

impl<B: RigidBody> Default for PhysicsWorld<B> {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{EventRecorder, PhysicsEvent};

    const DT: f32 = 1.0 / 60.0;

    /// Minimal linear-motion body: gravity into velocity, velocity into
    /// position, net correction read back as min + max of the accumulators.
    #[derive(Default)]
    struct TestBody {
        velocity: Vec3,
        mass: f32,
        kinematic: bool,
        gravity: Vec3,
        position: Vec3,
        last_correction: Vec3,
    }

    impl TestBody {
        fn with_mass(mass: f32) -> Self {
            TestBody {
                mass,
                ..Default::default()
            }
        }

        fn kinematic() -> Self {
            TestBody {
                kinematic: true,
                mass: 1.0,
                ..Default::default()
            }
        }
    }

    impl RigidBody for TestBody {
        fn linear_velocity(&self) -> Vec3 {
            self.velocity
        }

        fn set_linear_velocity(&mut self, velocity: Vec3) {
            self.velocity = velocity;
        }

        fn mass(&self) -> f32 {
            self.mass
        }

        fn is_kinematic(&self) -> bool {
            self.kinematic
        }

        fn move_vector(&self, step: f32) -> Vec3 {
            self.velocity * step
        }

        fn apply_move(&mut self, step: f32) -> Vec3 {
            if !self.kinematic {
                self.velocity += self.gravity * self.gravity_scale() * step;
            }
            let delta = self.velocity * step;
            self.position += delta;
            delta
        }

        fn solve_correction(&mut self, position: Bounds, velocity: Bounds) -> Vec3 {
            let delta = position.min() + position.max();
            self.position += delta;
            self.last_correction = delta;
            self.velocity += velocity.min() + velocity.max();
            delta
        }
    }

    fn world() -> PhysicsWorld<TestBody> {
        PhysicsWorld::default()
    }

    #[test]
    fn test_register_collider_idempotent_by_key() {
        let mut w = world();
        let a = w.register_collider(Collider::sphere(Vec3::ZERO, 0.5).with_key(42));
        let b = w.register_collider(Collider::sphere(Vec3::ZERO, 0.5).with_key(42));
        assert_eq!(a, b);
        assert_eq!(w.collider_count(), 1);
    }

    #[test]
    fn test_slot_reuse_after_unregister() {
        let mut w = world();
        let a = w.register_collider(Collider::sphere(Vec3::ZERO, 0.5));
        let _b = w.register_collider(Collider::sphere(Vec3::new(5.0, 0.0, 0.0), 0.5));
        w.unregister_collider(a);
        assert!(w.collider(a).is_none());
        assert_eq!(w.collider_count(), 1);

        let c = w.register_collider(Collider::aabb(Vec3::ZERO, Vec3::splat(0.5)));
        assert_eq!(c, a);
        assert_eq!(w.collider_count(), 2);
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let mut w = world();
        w.unregister_body(BodyId(99));
        w.unregister_collider(ColliderId(99));
        let id = w.register_collider(Collider::sphere(Vec3::ZERO, 0.5));
        w.unregister_collider(id);
        w.unregister_collider(id);
        assert_eq!(w.collider_count(), 0);
    }

    #[test]
    fn test_broad_phase_skips_disjoint_pairs() {
        let mut w = world();
        w.register_collider(Collider::sphere(Vec3::ZERO, 0.5));
        w.register_collider(Collider::sphere(Vec3::new(10.0, 0.0, 0.0), 0.5));
        let mut recorder = EventRecorder::new();
        w.step(DT, &mut recorder);
        assert!(w.pairs.is_empty());
        assert!(w.trigger_pairs.is_empty());
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_self_collision_excluded() {
        let mut w = world();
        let body = w.register_body(TestBody::with_mass(1.0));
        w.register_collider(Collider::sphere(Vec3::ZERO, 0.5).with_body(body));
        w.register_collider(Collider::sphere(Vec3::new(0.2, 0.0, 0.0), 0.5).with_body(body));
        let mut recorder = EventRecorder::new();
        w.step(DT, &mut recorder);
        assert!(w.pairs.is_empty());
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_mass_weighted_correction() {
        let mut w = world();
        let light = w.register_body(TestBody::with_mass(1.0));
        let heavy = w.register_body(TestBody::with_mass(3.0));
        w.register_collider(Collider::sphere(Vec3::ZERO, 0.5).with_body(light));
        w.register_collider(
            Collider::aabb(Vec3::ZERO, Vec3::splat(0.5))
                .at(Vec3::new(0.8, 0.0, 0.0))
                .with_body(heavy),
        );
        w.step(DT, &mut EventRecorder::new());

        // Penetration 0.2 split 3:1 toward the lighter side
        let a = w.body(light).unwrap().last_correction;
        let b = w.body(heavy).unwrap().last_correction;
        assert!((a.x + 0.15).abs() < 1e-5, "light correction {a:?}");
        assert!((b.x - 0.05).abs() < 1e-5, "heavy correction {b:?}");
        assert!((a.length() / b.length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_kinematic_never_corrected() {
        let mut w = world();
        let sphere_body = w.register_body(TestBody::with_mass(1.0));
        let wall_body = w.register_body(TestBody::kinematic());
        w.register_collider(Collider::sphere(Vec3::ZERO, 0.5).with_body(sphere_body));
        w.register_collider(
            Collider::aabb(Vec3::ZERO, Vec3::splat(0.5))
                .at(Vec3::new(0.8, 0.0, 0.0))
                .with_body(wall_body),
        );
        w.step(DT, &mut EventRecorder::new());

        let wall = w.body(wall_body).unwrap();
        assert_eq!(wall.last_correction, Vec3::ZERO);
        assert_eq!(wall.velocity, Vec3::ZERO);
        // The finite side takes the whole separation
        let sphere = w.body(sphere_body).unwrap();
        assert!((sphere.last_correction.x + 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_bounce_reflects_closing_velocity() {
        let mut w = world();
        let body = w.register_body(TestBody {
            mass: 1.0,
            velocity: Vec3::new(2.0, 0.0, 0.0),
            ..Default::default()
        });
        w.register_collider(
            Collider::sphere(Vec3::ZERO, 0.5)
                .with_body(body)
                .with_bounciness(1.0),
        );
        // Static box to the right, no body: immovable
        let wall = w.register_collider(
            Collider::aabb(Vec3::ZERO, Vec3::splat(0.5))
                .at(Vec3::new(0.8, 0.0, 0.0))
                .with_bounciness(1.0),
        );
        let mut recorder = EventRecorder::new();
        w.step(DT, &mut recorder);

        // Full reflection at bounce 1: v' = v - (1 + 1) * v
        let v = w.body(body).unwrap().velocity;
        assert!((v.x + 2.0).abs() < 1e-4, "velocity {v:?}");
        let events = recorder.drain();
        assert!(events.iter().any(|e| matches!(
            e,
            PhysicsEvent::CollisionEnter { other, .. } if *other == wall
        )));
    }

    #[test]
    fn test_separating_overlap_still_reports_contact() {
        let mut w = world();
        let body = w.register_body(TestBody {
            mass: 1.0,
            velocity: Vec3::new(-2.0, 0.0, 0.0),
            ..Default::default()
        });
        w.register_collider(Collider::sphere(Vec3::ZERO, 0.5).with_body(body));
        w.register_collider(
            Collider::aabb(Vec3::ZERO, Vec3::splat(0.5)).at(Vec3::new(0.8, 0.0, 0.0)),
        );
        let mut recorder = EventRecorder::new();
        w.step(DT, &mut recorder);

        // Geometric overlap reports and separates, but a separating pair
        // takes no impulse
        let body = w.body(body).unwrap();
        assert!((body.velocity.x + 2.0).abs() < 1e-5);
        assert!(body.last_correction.x < 0.0);
        assert!(recorder
            .events()
            .iter()
            .any(|e| matches!(e, PhysicsEvent::CollisionEnter { .. })));
    }

    #[test]
    fn test_trigger_event_lifecycle() {
        let mut w = world();
        let zone = w.register_collider(Collider::aabb(Vec3::ZERO, Vec3::splat(0.5)).trigger());
        let probe = w.register_collider(Collider::sphere(Vec3::ZERO, 0.5).at(Vec3::new(5.0, 0.0, 0.0)));
        let mut recorder = EventRecorder::new();

        w.step(DT, &mut recorder);
        assert!(recorder.drain().is_empty());

        // Overlap: enter fires, and entering implies a same-step stay
        w.set_pose(probe, Pose::from_position(Vec3::new(0.6, 0.0, 0.0)));
        w.step(DT, &mut recorder);
        assert_eq!(
            recorder.drain(),
            vec![
                PhysicsEvent::TriggerEnter { collider: zone, other: probe },
                PhysicsEvent::TriggerStay { collider: zone, other: probe },
                PhysicsEvent::TriggerEnter { collider: probe, other: zone },
                PhysicsEvent::TriggerStay { collider: probe, other: zone },
            ]
        );

        // Still overlapping: stay only
        w.step(DT, &mut recorder);
        assert_eq!(
            recorder.drain(),
            vec![
                PhysicsEvent::TriggerStay { collider: zone, other: probe },
                PhysicsEvent::TriggerStay { collider: probe, other: zone },
            ]
        );

        // Separated: exit only
        w.set_pose(probe, Pose::from_position(Vec3::new(5.0, 0.0, 0.0)));
        w.step(DT, &mut recorder);
        assert_eq!(
            recorder.drain(),
            vec![
                PhysicsEvent::TriggerExit { collider: zone, other: probe },
                PhysicsEvent::TriggerExit { collider: probe, other: zone },
            ]
        );

        // And nothing afterwards
        w.step(DT, &mut recorder);
        assert!(recorder.drain().is_empty());
    }

    #[test]
    fn test_trigger_pair_never_collides_physically() {
        let mut w = world();
        let body = w.register_body(TestBody::with_mass(1.0));
        w.register_collider(Collider::sphere(Vec3::ZERO, 0.5).with_body(body));
        w.register_collider(
            Collider::aabb(Vec3::ZERO, Vec3::splat(0.5))
                .at(Vec3::new(0.8, 0.0, 0.0))
                .trigger(),
        );
        let mut recorder = EventRecorder::new();
        w.step(DT, &mut recorder);

        assert_eq!(w.body(body).unwrap().last_correction, Vec3::ZERO);
        let events = recorder.drain();
        assert!(events
            .iter()
            .all(|e| !matches!(e, PhysicsEvent::CollisionEnter { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, PhysicsEvent::TriggerEnter { .. })));
    }

    #[test]
    fn test_corrections_clamp_to_extreme_not_sum() {
        let mut w = world();
        let body = w.register_body(TestBody::with_mass(1.0));
        w.register_collider(Collider::sphere(Vec3::ZERO, 0.5).with_body(body));
        // Two coincident immovable boxes produce two identical corrections;
        // the accumulator keeps the extreme, not the sum
        w.register_collider(
            Collider::aabb(Vec3::ZERO, Vec3::splat(0.5)).at(Vec3::new(0.8, 0.0, 0.0)),
        );
        w.register_collider(
            Collider::aabb(Vec3::ZERO, Vec3::splat(0.5)).at(Vec3::new(0.8, 0.0, 0.0)),
        );
        w.step(DT, &mut EventRecorder::new());

        let correction = w.body(body).unwrap().last_correction;
        assert!((correction.x + 0.2).abs() < 1e-5, "correction {correction:?}");
    }

    #[test]
    fn test_compaction_drops_dead_entries() {
        let mut w = world();
        let body = w.register_body(TestBody::with_mass(1.0));
        let collider = w.register_collider(Collider::sphere(Vec3::ZERO, 0.5).with_body(body));
        w.unregister_body(body);
        assert!(w.body(body).is_none());

        // The shape survives and is treated as unattached from now on
        let mut recorder = EventRecorder::new();
        w.step(DT, &mut recorder);
        assert!(w.actors.is_empty());
        assert!(w.collider(collider).is_some());
    }

    // --- Raycast -----------------------------------------------------------

    #[test]
    fn test_raycast_hit_scenario() {
        let mut w = world();
        let target =
            w.register_collider(Collider::aabb(Vec3::ZERO, Vec3::ONE).at(Vec3::new(0.0, 0.0, 5.0)));
        let hit = w.raycast(Vec3::ZERO, Vec3::Z, 100.0).unwrap();
        assert_eq!(hit.collider, target);
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!((hit.point - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);
        assert_eq!(hit.normal, Vec3::NEG_Z);
    }

    #[test]
    fn test_raycast_miss_and_degenerate_input() {
        let mut w = world();
        w.register_collider(Collider::aabb(Vec3::ZERO, Vec3::ONE).at(Vec3::new(0.0, 0.0, 5.0)));
        assert!(w.raycast(Vec3::ZERO, Vec3::X, 100.0).is_none());
        assert!(w.raycast(Vec3::ZERO, Vec3::ZERO, 100.0).is_none());
        assert!(w.raycast(Vec3::ZERO, Vec3::Z, 0.0).is_none());
        assert!(w.raycast(Vec3::ZERO, Vec3::Z, -1.0).is_none());
        // Out of range
        assert!(w.raycast(Vec3::ZERO, Vec3::Z, 3.5).is_none());
    }

    #[test]
    fn test_raycast_closest_wins_and_filter() {
        let mut w = world();
        let near =
            w.register_collider(Collider::aabb(Vec3::ZERO, Vec3::ONE).at(Vec3::new(0.0, 0.0, 5.0)));
        let far = w
            .register_collider(Collider::aabb(Vec3::ZERO, Vec3::ONE).at(Vec3::new(0.0, 0.0, 10.0)));
        let hit = w.raycast(Vec3::ZERO, Vec3::Z, 100.0).unwrap();
        assert_eq!(hit.collider, near);

        let hit = w
            .raycast_filtered(Vec3::ZERO, Vec3::Z, 100.0, |id, _| id != near)
            .unwrap();
        assert_eq!(hit.collider, far);
    }

    #[test]
    fn test_raycast_from_inside_hits_at_zero() {
        let mut w = world();
        w.register_collider(Collider::aabb(Vec3::ZERO, Vec3::ONE));
        let hit = w.raycast(Vec3::ZERO, Vec3::Z, 100.0).unwrap();
        assert_eq!(hit.distance, 0.0);
        assert_eq!(hit.point, Vec3::ZERO);
    }

    #[test]
    fn test_raycast_tests_sphere_by_bounds() {
        let mut w = world();
        w.register_collider(Collider::sphere(Vec3::ZERO, 0.5).at(Vec3::new(0.0, 0.0, 5.0)));
        // Passes through the bounds corner outside the exact sphere surface;
        // the bounds approximation still reports a hit
        let hit = w.raycast(Vec3::new(0.45, 0.45, 0.0), Vec3::Z, 100.0);
        assert!(hit.is_some());
    }

    #[test]
    fn test_raycast_ignores_dead_slots() {
        let mut w = world();
        let id =
            w.register_collider(Collider::aabb(Vec3::ZERO, Vec3::ONE).at(Vec3::new(0.0, 0.0, 5.0)));
        w.unregister_collider(id);
        assert!(w.raycast(Vec3::ZERO, Vec3::Z, 100.0).is_none());
    }

    // --- End to end --------------------------------------------------------

    #[test]
    fn test_falling_sphere_comes_to_rest_on_floor() {
        let mut w = world();
        let body = w.register_body(TestBody {
            mass: 1.0,
            gravity: w.gravity(),
            ..Default::default()
        });
        let sphere = w.register_collider(
            Collider::sphere(Vec3::ZERO, 0.5)
                .at(Vec3::new(0.0, 2.0, 0.0))
                .with_body(body)
                .with_bounciness(0.0),
        );
        w.register_collider(
            Collider::aabb(Vec3::ZERO, Vec3::new(5.0, 0.5, 5.0)).with_bounciness(0.0),
        );

        let mut recorder = EventRecorder::new();
        let mut touched = false;
        for _ in 0..240 {
            w.step(DT, &mut recorder);
            touched |= recorder
                .drain()
                .iter()
                .any(|e| matches!(e, PhysicsEvent::CollisionEnter { .. }));
        }

        assert!(touched, "sphere never reached the floor");
        // Resting height: floor top 0.5 + radius 0.5
        let y = w.collider(sphere).unwrap().pose.position.y;
        assert!((y - 1.0).abs() < 0.05, "resting height {y}");
        let v = w.body(body).unwrap().velocity;
        assert!(v.length() < 0.5, "residual velocity {v:?}");
    }
}
