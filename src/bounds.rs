use glam::Vec3;

/// Axis-aligned box stored as center + half extents.
///
/// A zero-sized box is valid and represents a single point; the correction
/// accumulators in the world rely on that to start from the origin.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub center: Vec3,
    pub extents: Vec3,
}

impl Bounds {
    /// Zero-sized box at the origin.
    pub const ZERO: Bounds = Bounds {
        center: Vec3::ZERO,
        extents: Vec3::ZERO,
    };

    pub fn new(center: Vec3, extents: Vec3) -> Self {
        Self { center, extents }
    }

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            extents: (max - min) * 0.5,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }

    /// Closed-interval box intersection test.
    pub fn intersects(&self, other: &Bounds) -> bool {
        let (amin, amax) = (self.min(), self.max());
        let (bmin, bmax) = (other.min(), other.max());
        amin.x <= bmax.x
            && bmin.x <= amax.x
            && amin.y <= bmax.y
            && bmin.y <= amax.y
            && amin.z <= bmax.z
            && bmin.z <= amax.z
    }

    /// Point on or inside the box closest to `point`.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min(), self.max())
    }

    /// Grow the box in place so that it contains `point`.
    pub fn encapsulate(&mut self, point: Vec3) {
        let min = self.min().min(point);
        let max = self.max().max(point);
        self.center = (min + max) * 0.5;
        self.extents = (max - min) * 0.5;
    }

    /// Copy of the box shifted by `delta`.
    pub fn translated(&self, delta: Vec3) -> Bounds {
        Bounds {
            center: self.center + delta,
            extents: self.extents,
        }
    }
}
