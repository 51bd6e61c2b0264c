use crate::geometry::{BoundingBox, add, scale};

/// A ray given by its origin and direction. The direction does not need to be
/// normalized; hit distances are expressed in multiples of it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: [f64; 3],
    pub direction: [f64; 3],
}

impl Ray {
    pub fn new(origin: [f64; 3], direction: [f64; 3]) -> Self {
        Self { origin, direction }
    }

    pub fn point_at(&self, t: f64) -> [f64; 3] {
        add(self.origin, scale(self.direction, t))
    }

    /// Slab test against an axis-aligned box.
    ///
    /// Returns the entry and exit distances `(t_near, t_far)` along the ray if
    /// the infinite line overlaps the box and the exit lies in front of the
    /// origin. `t_near` may be negative when the origin is inside the box.
    /// Inverted boxes never overlap.
    pub fn intersect_box(&self, bbox: &BoundingBox) -> Option<(f64, f64)> {
        if !bbox.is_valid() {
            return None;
        }

        let lo = bbox.min_vertex();
        let hi = bbox.max_vertex();
        let mut t_near = f64::NEG_INFINITY;
        let mut t_far = f64::INFINITY;

        for axis in 0..3 {
            let o = self.origin[axis];
            let d = self.direction[axis];

            // Parallel to this slab: either always inside it or never.
            if d == 0.0 {
                if o < lo[axis] || o > hi[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let t1 = (lo[axis] - o) * inv;
            let t2 = (hi[axis] - o) * inv;
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
        }

        if t_near > t_far || t_far < 0.0 {
            return None;
        }
        Some((t_near, t_far))
    }
}
