use glam::{Quat, Vec3};

use crate::bounds::Bounds;

/// User-defined opaque key carried by a collider (e.g., pack your entity id).
/// Registration treats two colliders with the same key as the same collider.
pub type ColKey = u64;

/// Handle to a registered collider: a slot index into the world's shape store.
///
/// Slots are invalidated on unregister and lazily reused by later
/// registrations, so a stale id may come to alias a newer collider.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColliderId(pub u32);

/// Handle to a registered rigid body.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyId(pub u32);

/// World pose of a collider's owning node: the narrow slice of the host's
/// spatial transform this layer consumes. Parent-child composition stays on
/// the host side; hand the composed world pose to the collider.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Pose {
            position,
            ..Pose::IDENTITY
        }
    }

    /// Local point to world space (scale, rotate, translate).
    pub fn point_to_world(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * point)
    }

    /// Local vector to world space (scale and rotate, no translation).
    pub fn vector_to_world(&self, vector: Vec3) -> Vec3 {
        self.rotation * (self.scale * vector)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Pose::IDENTITY
    }
}

/// Supported collider shapes, in the collider's local space.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeKind {
    /// Centered sphere. Scale is ignored on the radius.
    Sphere { center: Vec3, radius: f32 },
    /// Centered axis-aligned box (`size` = half extents along each axis).
    Aabb { center: Vec3, size: Vec3 },
}

/// A collider registered with the world.
///
/// The world owns the record; the host keeps the [`ColliderId`] and pushes
/// pose updates when the owning node moves outside of body integration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Collider {
    pub kind: ShapeKind,
    pub pose: Pose,
    /// Overlap events only, no physical response.
    pub is_trigger: bool,
    /// Restitution; a pair bounces with the product of both sides.
    pub bounciness: f32,
    /// Body this collider inherits motion and response from, if any.
    /// A collider with no reachable body is immovable.
    pub body: Option<BodyId>,
    /// Optional identity key; registration is idempotent per key.
    pub key: Option<ColKey>,
}

impl Collider {
    pub fn new(kind: ShapeKind) -> Self {
        Collider {
            kind,
            pose: Pose::IDENTITY,
            is_trigger: false,
            bounciness: 0.75,
            body: None,
            key: None,
        }
    }

    /// Convenience: sphere collider at the identity pose.
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Collider::new(ShapeKind::Sphere { center, radius })
    }

    /// Convenience: box collider at the identity pose (`size` = half extents).
    pub fn aabb(center: Vec3, size: Vec3) -> Self {
        Collider::new(ShapeKind::Aabb { center, size })
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.pose = Pose::from_position(position);
        self
    }

    pub fn with_body(mut self, body: BodyId) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_key(mut self, key: ColKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    pub fn with_bounciness(mut self, bounciness: f32) -> Self {
        self.bounciness = bounciness;
        self
    }

    /// World-space bounds of the shape under its current pose.
    ///
    /// Sphere extents stay `(r, r, r)` regardless of scale; box extents are
    /// the transformed half extents, taken componentwise absolute so a
    /// rotated pose still yields a well-formed box.
    pub fn world_bounds(&self) -> Bounds {
        match self.kind {
            ShapeKind::Sphere { center, radius } => Bounds::new(
                self.pose.point_to_world(center),
                Vec3::splat(radius),
            ),
            ShapeKind::Aabb { center, size } => Bounds::new(
                self.pose.point_to_world(center),
                self.pose.vector_to_world(size).abs(),
            ),
        }
    }
}

/// One contact point of a collision event. The normal points from the
/// owning collider toward the partner in [`CollisionInfo::collider`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactPoint {
    pub point: Vec3,
    pub normal: Vec3,
}

/// Collision event payload: the partner collider and the contact points
/// found this step (a single representative point today).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionInfo {
    pub collider: ColliderId,
    pub contacts: Vec<ContactPoint>,
}

/// Closest hit reported by a raycast.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RaycastHit {
    pub collider: ColliderId,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// World-level configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldConfig {
    /// Gravity published to hosts; bodies decide whether to consume it.
    pub gravity: Vec3,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            gravity: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}
