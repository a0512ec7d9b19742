use glam::Vec3;

use crate::bounds::Bounds;
use crate::types::{Collider, ShapeKind};

/// Contact between two shapes. The normal is unit length and points from
/// the first shape into the second.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    pub normal: Vec3,
    pub penetration: f32,
    /// Representative contact point (approximate for box pairs).
    pub point: Vec3,
}

impl Contact {
    /// Same contact seen from the other shape.
    pub fn flipped(self) -> Contact {
        Contact {
            normal: -self.normal,
            ..self
        }
    }
}

/// Degenerate-distance fallback: coincident centers have no meaningful
/// normal, so resolution picks a stable axis.
const DEGENERATE_EPS: f32 = 1e-6;

/// Narrowphase primitive tests over world-space geometry.
///
/// Pair dispatch is a `match` over the two shape kinds; a new kind extends
/// the two dispatch tables here and nothing else.
pub struct Narrowphase;

impl Narrowphase {
    /// Pure overlap predicate for a shape pair, no contact data.
    pub fn overlap(a: &Collider, b: &Collider) -> bool {
        match (a.kind, b.kind) {
            (
                ShapeKind::Sphere { center: ca, radius: ra },
                ShapeKind::Sphere { center: cb, radius: rb },
            ) => Self::overlap_sphere_sphere(
                a.pose.point_to_world(ca),
                ra,
                b.pose.point_to_world(cb),
                rb,
            ),
            (ShapeKind::Aabb { .. }, ShapeKind::Aabb { .. }) => {
                a.world_bounds().intersects(&b.world_bounds())
            }
            (ShapeKind::Sphere { center, radius }, ShapeKind::Aabb { .. }) => {
                Self::overlap_sphere_aabb(a.pose.point_to_world(center), radius, &b.world_bounds())
            }
            (ShapeKind::Aabb { .. }, ShapeKind::Sphere { center, radius }) => {
                Self::overlap_sphere_aabb(b.pose.point_to_world(center), radius, &a.world_bounds())
            }
        }
    }

    /// Contact for a shape pair, normal pointing from `a` into `b`.
    pub fn contact(a: &Collider, b: &Collider) -> Option<Contact> {
        match (a.kind, b.kind) {
            (
                ShapeKind::Sphere { center: ca, radius: ra },
                ShapeKind::Sphere { center: cb, radius: rb },
            ) => Self::contact_sphere_sphere(
                a.pose.point_to_world(ca),
                ra,
                b.pose.point_to_world(cb),
                rb,
            ),
            (ShapeKind::Aabb { .. }, ShapeKind::Aabb { .. }) => {
                Self::contact_aabb_aabb(&a.world_bounds(), &b.world_bounds())
            }
            (ShapeKind::Sphere { center, radius }, ShapeKind::Aabb { .. }) => {
                Self::contact_sphere_aabb(a.pose.point_to_world(center), radius, &b.world_bounds())
            }
            (ShapeKind::Aabb { .. }, ShapeKind::Sphere { center, radius }) => {
                Self::contact_sphere_aabb(b.pose.point_to_world(center), radius, &a.world_bounds())
                    .map(Contact::flipped)
            }
        }
    }

    // --- Primitives --------------------------------------------------------

    pub fn overlap_sphere_sphere(ca: Vec3, ra: f32, cb: Vec3, rb: f32) -> bool {
        let rsum = ra + rb;
        ca.distance_squared(cb) <= rsum * rsum
    }

    pub fn overlap_sphere_aabb(center: Vec3, radius: f32, bounds: &Bounds) -> bool {
        let closest = bounds.closest_point(center);
        (center - closest).length_squared() <= radius * radius
    }

    pub fn contact_sphere_sphere(ca: Vec3, ra: f32, cb: Vec3, rb: f32) -> Option<Contact> {
        let delta = cb - ca;
        let dist_sq = delta.length_squared();
        let rsum = ra + rb;
        if dist_sq > rsum * rsum {
            return None;
        }
        let dist = dist_sq.sqrt();
        let normal = if dist > DEGENERATE_EPS {
            delta / dist
        } else {
            Vec3::X
        };
        Some(Contact {
            normal,
            penetration: rsum - dist,
            point: ca + normal * ra,
        })
    }

    /// Sphere-vs-box contact, normal pointing from the sphere into the box.
    /// A sphere center inside the box degenerates to zero distance and full
    /// radius penetration.
    pub fn contact_sphere_aabb(center: Vec3, radius: f32, bounds: &Bounds) -> Option<Contact> {
        let closest = bounds.closest_point(center);
        let to_center = center - closest;
        let dist_sq = to_center.length_squared();
        if dist_sq > radius * radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        let normal = if dist > DEGENERATE_EPS {
            -to_center / dist
        } else {
            Vec3::X
        };
        Some(Contact {
            normal,
            penetration: radius - dist,
            point: closest,
        })
    }

    /// Box-vs-box contact along the axis of least penetration.
    pub fn contact_aabb_aabb(a: &Bounds, b: &Bounds) -> Option<Contact> {
        let d = b.center - a.center;
        let overlap = a.extents + b.extents - d.abs();
        if overlap.x < 0.0 || overlap.y < 0.0 || overlap.z < 0.0 {
            return None;
        }

        let sign = |v: f32| if v >= 0.0 { 1.0 } else { -1.0 };
        let mut penetration = overlap.x;
        let mut normal = Vec3::new(sign(d.x), 0.0, 0.0);
        if overlap.y < penetration {
            penetration = overlap.y;
            normal = Vec3::new(0.0, sign(d.y), 0.0);
        }
        if overlap.z < penetration {
            penetration = overlap.z;
            normal = Vec3::new(0.0, 0.0, sign(d.z));
        }

        Some(Contact {
            normal,
            penetration,
            point: b.closest_point(a.center),
        })
    }

    // --- Rays --------------------------------------------------------------

    /// Slab test of a ray against a box. Returns the entry distance within
    /// `[0, max_distance]`; an origin inside the box reports distance 0.
    pub fn ray_bounds(
        origin: Vec3,
        direction: Vec3,
        bounds: &Bounds,
        max_distance: f32,
    ) -> Option<f32> {
        const EPS: f32 = 1e-6;
        let bmin = bounds.min();
        let bmax = bounds.max();
        let mut tmin = 0.0f32;
        let mut tmax = max_distance;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            if d.abs() < EPS {
                // Parallel to the slab: inside it or never
                if o < bmin[axis] || o > bmax[axis] {
                    return None;
                }
            } else {
                let inv = 1.0 / d;
                let t1 = (bmin[axis] - o) * inv;
                let t2 = (bmax[axis] - o) * inv;
                let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
                tmin = tmin.max(near);
                tmax = tmax.min(far);
                if tmin > tmax {
                    return None;
                }
            }
        }

        Some(tmin)
    }

    /// Normal at a ray hit on a box, by proximity of the hit point to a
    /// face; ambiguous hits fall back to the negated ray direction.
    pub fn bounds_hit_normal(bounds: &Bounds, point: Vec3, direction: Vec3) -> Vec3 {
        const FACE_EPS: f32 = 1e-3;
        let bmin = bounds.min();
        let bmax = bounds.max();
        if (point.x - bmin.x).abs() < FACE_EPS {
            Vec3::NEG_X
        } else if (point.x - bmax.x).abs() < FACE_EPS {
            Vec3::X
        } else if (point.y - bmin.y).abs() < FACE_EPS {
            Vec3::NEG_Y
        } else if (point.y - bmax.y).abs() < FACE_EPS {
            Vec3::Y
        } else if (point.z - bmin.z).abs() < FACE_EPS {
            Vec3::NEG_Z
        } else if (point.z - bmax.z).abs() < FACE_EPS {
            Vec3::Z
        } else {
            -direction.normalize_or_zero()
        }
    }
}
