use super::{DEPTH_LIMIT, DETERMINANT_EPSILON, EPSILON, INVALID_INDEX, KdTree};
use crate::geometry::{cross, dot, sub};
use crate::ray::Ray;

/// Outcome of a closest-hit query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraverseResult {
    /// Index of the hit triangle in the list passed to `build`, `None` on a miss.
    pub triangle_index: Option<usize>,
    /// Ray parameter of the hit.
    pub distance: f64,
    pub intersection_point: [f64; 3],
    /// Barycentric coordinates `(w, u, v)` with respect to `(v0, v1, v2)`.
    pub barycentric: [f64; 3],
}

impl TraverseResult {
    pub fn miss() -> Self {
        Self {
            triangle_index: None,
            distance: f64::INFINITY,
            intersection_point: [0.0; 3],
            barycentric: [0.0; 3],
        }
    }

    pub fn is_hit(&self) -> bool {
        self.triangle_index.is_some()
    }
}

#[derive(Clone, Copy)]
struct StackEntry {
    node: u32,
    far: f64,
}

/// Fixed-capacity stack living on the caller's frame.
struct TraversalStack {
    entries: [StackEntry; DEPTH_LIMIT + 1],
    len: usize,
}

impl TraversalStack {
    fn new() -> Self {
        Self {
            entries: [StackEntry { node: INVALID_INDEX, far: 0.0 }; DEPTH_LIMIT + 1],
            len: 0,
        }
    }

    #[inline]
    fn push(&mut self, node: u32, far: f64) {
        debug_assert!(self.len < self.entries.len(), "traversal stack overflow");
        self.entries[self.len] = StackEntry { node, far };
        self.len += 1;
    }

    #[inline]
    fn pop(&mut self) -> Option<StackEntry> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.entries[self.len])
    }
}

struct LeafHit {
    triangle: u32,
    t: f64,
    u: f64,
    v: f64,
}

impl KdTree {
    /// Finds the closest triangle hit by `ray`.
    ///
    /// Nodes are visited front to back, so the first leaf producing a hit
    /// inside its own ray interval holds the closest one.
    pub fn traverse(&self, ray: &Ray) -> TraverseResult {
        let Some(root_box) = self.bounding_boxes.first() else {
            return TraverseResult::miss();
        };
        let Some((t_near, t_far)) = ray.intersect_box(root_box) else {
            return TraverseResult::miss();
        };

        let mut t_near = t_near.max(0.0);
        let mut t_far = t_far + EPSILON;

        let mut node = self.nodes[0];
        let mut stack = TraversalStack::new();

        loop {
            while let Some(axis) = node.split_axis() {
                let direction = ray.direction[axis];
                let side = direction.is_sign_negative() as usize;
                let near = node.children[side];
                let far = node.children[1 - side];

                let mut t_split = (node.distance - ray.origin[axis]) / direction;
                // Ray travelling inside the split plane: visit both sides.
                if t_split.is_nan() {
                    t_split = t_far;
                }

                if t_split < t_near {
                    node = self.nodes[far as usize];
                } else if t_split > t_far {
                    node = self.nodes[near as usize];
                } else {
                    stack.push(far, t_far);
                    node = self.nodes[near as usize];
                    t_far = t_split;
                }
            }

            if !node.is_empty() {
                let indices = &self.indices[node.start as usize..node.end as usize];
                if let Some(hit) = self.intersect_leaf(ray, indices, t_far) {
                    if hit.t + EPSILON >= t_near {
                        return TraverseResult {
                            triangle_index: Some(hit.triangle as usize),
                            distance: hit.t,
                            intersection_point: ray.point_at(hit.t),
                            barycentric: [1.0 - hit.u - hit.v, hit.u, hit.v],
                        };
                    }
                }
            }

            let Some(entry) = stack.pop() else {
                return TraverseResult::miss();
            };
            node = self.nodes[entry.node as usize];
            t_near = t_far - EPSILON;
            t_far = entry.far + EPSILON;
        }
    }

    /// Möller–Trumbore against every triangle of a leaf, keeping the closest
    /// hit in `(EPSILON, t_far]`. Barycentric bounds are inclusive, so rays
    /// through edges and vertices hit; on exact ties the first triangle wins.
    fn intersect_leaf(&self, ray: &Ray, indices: &[u32], t_far: f64) -> Option<LeafHit> {
        let mut best: Option<LeafHit> = None;
        let mut min_distance = f64::INFINITY;

        for &triangle in indices {
            let data = &self.intersection_data[triangle as usize];

            let pvec = cross(ray.direction, data.edge2);
            let det = dot(data.edge1, pvec);
            if det.abs() < DETERMINANT_EPSILON {
                continue;
            }
            let inv_det = 1.0 / det;

            let tvec = sub(ray.origin, data.v0);
            let u = dot(tvec, pvec) * inv_det;
            if !(0.0..=1.0).contains(&u) {
                continue;
            }

            let qvec = cross(tvec, data.edge1);
            let v = dot(ray.direction, qvec) * inv_det;
            if v < 0.0 || u + v > 1.0 {
                continue;
            }

            let t = dot(data.edge2, qvec) * inv_det;
            if t < min_distance && t <= t_far && t > EPSILON {
                min_distance = t;
                best = Some(LeafHit { triangle, t, u, v });
            }
        }

        best
    }
}
