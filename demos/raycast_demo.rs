use glam::Vec3;
use klonk::*;

/// Bodiless scene: raycasts only need registered colliders.
struct NoBody;

impl RigidBody for NoBody {
    fn linear_velocity(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn set_linear_velocity(&mut self, _velocity: Vec3) {}

    fn mass(&self) -> f32 {
        0.0
    }

    fn is_kinematic(&self) -> bool {
        true
    }

    fn move_vector(&self, _step: f32) -> Vec3 {
        Vec3::ZERO
    }

    fn apply_move(&mut self, _step: f32) -> Vec3 {
        Vec3::ZERO
    }

    fn solve_correction(&mut self, _position: Bounds, _velocity: Bounds) -> Vec3 {
        Vec3::ZERO
    }
}

fn main() {
    let mut world: PhysicsWorld<NoBody> = PhysicsWorld::default();

    let wall = world.register_collider(Collider::aabb(Vec3::ZERO, Vec3::ONE).at(Vec3::new(0.0, 0.0, 5.0)));
    let ball = world.register_collider(Collider::sphere(Vec3::ZERO, 0.5).at(Vec3::new(3.0, 0.0, 5.0)));
    println!("scene: wall={wall:?} ball={ball:?}");

    for direction in [Vec3::Z, Vec3::new(0.6, 0.0, 0.8), Vec3::X, Vec3::NEG_Z] {
        match world.raycast(Vec3::ZERO, direction, 100.0) {
            Some(hit) => println!(
                "dir ({:+.1},{:+.1},{:+.1}) -> {:?} at d={:.3} p=({:.2},{:.2},{:.2}) n=({:+.0},{:+.0},{:+.0})",
                direction.x, direction.y, direction.z,
                hit.collider, hit.distance,
                hit.point.x, hit.point.y, hit.point.z,
                hit.normal.x, hit.normal.y, hit.normal.z,
            ),
            None => println!(
                "dir ({:+.1},{:+.1},{:+.1}) -> no hit",
                direction.x, direction.y, direction.z
            ),
        }
    }

    // Skip the wall and look again
    let hit = world.raycast_filtered(Vec3::ZERO, Vec3::Z, 100.0, |id, _| id != wall);
    println!("behind the wall: {hit:?}");
}
