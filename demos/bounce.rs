use glam::Vec3;
use klonk::*;

/// Linear-motion body for the demo: gravity into velocity, velocity into
/// position, corrections read back as min + max of the accumulators.
struct Ball {
    velocity: Vec3,
    gravity: Vec3,
}

impl RigidBody for Ball {
    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn mass(&self) -> f32 {
        1.0
    }

    fn is_kinematic(&self) -> bool {
        false
    }

    fn move_vector(&self, step: f32) -> Vec3 {
        self.velocity * step
    }

    fn apply_move(&mut self, step: f32) -> Vec3 {
        self.velocity += self.gravity * self.gravity_scale() * step;
        self.velocity * step
    }

    fn solve_correction(&mut self, position: Bounds, velocity: Bounds) -> Vec3 {
        self.velocity += velocity.min() + velocity.max();
        position.min() + position.max()
    }
}

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init()
        .unwrap();

    let mut world = PhysicsWorld::new(WorldConfig::default());
    let gravity = world.gravity();

    let body = world.register_body(Ball {
        velocity: Vec3::ZERO,
        gravity,
    });
    let ball = world.register_collider(
        Collider::sphere(Vec3::ZERO, 0.5)
            .at(Vec3::new(0.0, 4.0, 0.0))
            .with_body(body)
            .with_bounciness(0.9),
    );
    world.register_collider(
        Collider::aabb(Vec3::ZERO, Vec3::new(10.0, 0.5, 10.0)).with_bounciness(0.9),
    );

    let mut recorder = EventRecorder::new();
    for frame in 0..240 {
        world.step(1.0 / 60.0, &mut recorder);
        for event in recorder.drain() {
            if let PhysicsEvent::CollisionEnter { collider, other } = event {
                println!("frame {frame:3}: {collider:?} hit {other:?}");
            }
        }
        if frame % 30 == 0 {
            let y = world.collider(ball).unwrap().pose.position.y;
            println!("frame {frame:3}: ball at y={y:.3}");
        }
    }
}
