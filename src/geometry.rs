//! Geometric primitives used by the k-d tree: vector helpers on `[f64; 3]`,
//! triangles, their precomputed intersection data and axis-aligned boxes.

use crate::error::GeometryError;
use rand::Rng;

/// Number of `f64` values describing one triangle in a flat vertex buffer.
pub const FLOATS_PER_TRIANGLE: usize = 9;

#[inline]
pub fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn min(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0].min(b[0]), a[1].min(b[1]), a[2].min(b[2])]
}

#[inline]
pub fn max(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])]
}

#[inline]
pub fn length(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// Returns `a` scaled to unit length, or `a` unchanged if it has zero length.
pub fn normalize(a: [f64; 3]) -> [f64; 3] {
    let len = length(a);
    if len == 0.0 {
        return a;
    }
    scale(a, 1.0 / len)
}

/// A triangle given by its three vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub v: [[f64; 3]; 3],
}

impl Triangle {
    pub fn new(v0: [f64; 3], v1: [f64; 3], v2: [f64; 3]) -> Self {
        Self { v: [v0, v1, v2] }
    }

    pub fn min_vertex(&self) -> [f64; 3] {
        min(self.v[0], min(self.v[1], self.v[2]))
    }

    pub fn max_vertex(&self) -> [f64; 3] {
        max(self.v[0], max(self.v[1], self.v[2]))
    }

    pub fn edge1(&self) -> [f64; 3] {
        sub(self.v[1], self.v[0])
    }

    pub fn edge2(&self) -> [f64; 3] {
        sub(self.v[2], self.v[0])
    }

    /// Unit normal following the winding `v0 -> v1 -> v2`.
    pub fn normal(&self) -> [f64; 3] {
        normalize(cross(self.edge1(), self.edge2()))
    }

    pub fn area(&self) -> f64 {
        0.5 * length(cross(self.edge1(), self.edge2()))
    }

    pub fn centroid(&self) -> [f64; 3] {
        scale(add(add(self.v[0], self.v[1]), self.v[2]), 1.0 / 3.0)
    }

    /// Point at barycentric coordinates `(w, u, v)`, i.e. `w*v0 + u*v1 + v*v2`.
    pub fn point_at(&self, barycentric: [f64; 3]) -> [f64; 3] {
        add(
            add(scale(self.v[0], barycentric[0]), scale(self.v[1], barycentric[1])),
            scale(self.v[2], barycentric[2]),
        )
    }
}

/// Precomputed form of a triangle for Möller–Trumbore intersection tests.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionData {
    pub v0: [f64; 3],
    pub edge1: [f64; 3],
    pub edge2: [f64; 3],
}

impl From<&Triangle> for IntersectionData {
    fn from(t: &Triangle) -> Self {
        Self {
            v0: t.v[0],
            edge1: t.edge1(),
            edge2: t.edge2(),
        }
    }
}

/// Axis-aligned bounding box stored as center and half size.
///
/// A box with a negative half size on any axis is inverted (empty); it is what
/// the tree reports as scene bounds when built from no triangles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub center: [f64; 3],
    pub half_size: [f64; 3],
}

impl BoundingBox {
    pub fn new(center: [f64; 3], half_size: [f64; 3]) -> Self {
        Self { center, half_size }
    }

    pub fn from_corners(min: [f64; 3], max: [f64; 3]) -> Self {
        Self {
            center: scale(add(min, max), 0.5),
            half_size: scale(sub(max, min), 0.5),
        }
    }

    pub fn min_vertex(&self) -> [f64; 3] {
        sub(self.center, self.half_size)
    }

    pub fn max_vertex(&self) -> [f64; 3] {
        add(self.center, self.half_size)
    }

    pub fn is_valid(&self) -> bool {
        self.half_size.iter().all(|&h| h >= 0.0)
    }

    pub fn surface_area(&self) -> f64 {
        let [x, y, z] = scale(self.half_size, 2.0);
        2.0 * (x * y + y * z + z * x)
    }

    pub fn contains_point(&self, p: [f64; 3], tolerance: f64) -> bool {
        let lo = self.min_vertex();
        let hi = self.max_vertex();
        (0..3).all(|i| p[i] >= lo[i] - tolerance && p[i] <= hi[i] + tolerance)
    }

    pub fn contains_box(&self, other: &BoundingBox, tolerance: f64) -> bool {
        self.contains_point(other.min_vertex(), tolerance)
            && self.contains_point(other.max_vertex(), tolerance)
    }

    /// Slices the box at `position` along `axis` into a lower and an upper part.
    pub fn split(&self, axis: usize, position: f64) -> (BoundingBox, BoundingBox) {
        let lo = self.min_vertex();
        let hi = self.max_vertex();
        let mut left_max = hi;
        left_max[axis] = position;
        let mut right_min = lo;
        right_min[axis] = position;
        (
            BoundingBox::from_corners(lo, left_max),
            BoundingBox::from_corners(right_min, hi),
        )
    }
}

/// Parses a flat vertex buffer (`x0, y0, z0, x1, ...`, nine values per triangle).
pub fn triangles_from_flat(vertices: &[f64]) -> Result<Vec<Triangle>, GeometryError> {
    if vertices.len() % FLOATS_PER_TRIANGLE != 0 {
        return Err(GeometryError::FlatBufferLength { len: vertices.len() });
    }

    vertices
        .chunks_exact(FLOATS_PER_TRIANGLE)
        .enumerate()
        .map(|(triangle, c)| {
            if let Some(&value) = c.iter().find(|v| !v.is_finite()) {
                return Err(GeometryError::NonFiniteVertex { triangle, value });
            }
            Ok(Triangle::new([c[0], c[1], c[2]], [c[3], c[4], c[5]], [c[6], c[7], c[8]]))
        })
        .collect()
}

/// Generates `count` triangles with all vertices inside `bounds`.
///
/// Each triangle is built around a random anchor point with edges of at most
/// `max_edge` per axis, and is redrawn until its area is at least `min_area`.
pub fn random_triangles<R: Rng>(
    rng: &mut R,
    count: usize,
    bounds: &BoundingBox,
    max_edge: f64,
    min_area: f64,
) -> Vec<Triangle> {
    let lo = bounds.min_vertex();
    let hi = bounds.max_vertex();
    let mut triangles = Vec::with_capacity(count);

    let max_attempts = count * 1000;
    let mut attempts = 0;

    while triangles.len() < count && attempts < max_attempts {
        attempts += 1;
        let anchor = [
            lo[0] + rng.r#gen::<f64>() * (hi[0] - lo[0]),
            lo[1] + rng.r#gen::<f64>() * (hi[1] - lo[1]),
            lo[2] + rng.r#gen::<f64>() * (hi[2] - lo[2]),
        ];
        let mut vertex = || {
            let mut p = [0.0; 3];
            for i in 0..3 {
                let offset = rng.gen_range(-max_edge..=max_edge);
                p[i] = (anchor[i] + offset).clamp(lo[i], hi[i]);
            }
            p
        };
        let t = Triangle::new(vertex(), vertex(), vertex());
        if t.area() >= min_area {
            triangles.push(t);
        }
    }

    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_box_corners_and_area() {
        let b = BoundingBox::from_corners([0.0, 0.0, 0.0], [1.0, 2.0, 3.0]);
        assert_eq!(b.center, [0.5, 1.0, 1.5]);
        assert_eq!(b.half_size, [0.5, 1.0, 1.5]);
        assert_eq!(b.min_vertex(), [0.0, 0.0, 0.0]);
        assert_eq!(b.max_vertex(), [1.0, 2.0, 3.0]);
        // 2 * (1*2 + 2*3 + 3*1) = 22
        assert!((b.surface_area() - 22.0).abs() < 1e-12);
    }

    #[test]
    fn test_box_split() {
        let b = BoundingBox::from_corners([0.0, 0.0, 0.0], [4.0, 1.0, 1.0]);
        let (l, r) = b.split(0, 1.0);
        assert_eq!(l.min_vertex(), [0.0, 0.0, 0.0]);
        assert_eq!(l.max_vertex(), [1.0, 1.0, 1.0]);
        assert_eq!(r.min_vertex(), [1.0, 0.0, 0.0]);
        assert_eq!(r.max_vertex(), [4.0, 1.0, 1.0]);
        assert!(b.contains_box(&l, 0.0));
        assert!(b.contains_box(&r, 0.0));
    }

    #[test]
    fn test_inverted_box_is_invalid() {
        let b = BoundingBox::from_corners([f64::MAX; 3], [-f64::MAX; 3]);
        assert!(!b.is_valid());
        assert!(BoundingBox::from_corners([0.0; 3], [0.0; 3]).is_valid());
    }

    #[test]
    fn test_triangle_derived_values() {
        let t = Triangle::new([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
        assert_eq!(t.min_vertex(), [0.0, 0.0, 0.0]);
        assert_eq!(t.max_vertex(), [2.0, 2.0, 0.0]);
        assert_eq!(t.normal(), [0.0, 0.0, 1.0]);
        assert!((t.area() - 2.0).abs() < 1e-12);

        let data = IntersectionData::from(&t);
        assert_eq!(data.v0, [0.0, 0.0, 0.0]);
        assert_eq!(data.edge1, [2.0, 0.0, 0.0]);
        assert_eq!(data.edge2, [0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_triangles_from_flat() {
        let flat = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let tris = triangles_from_flat(&flat).expect("valid buffer");
        assert_eq!(tris.len(), 1);
        assert_eq!(tris[0].v[1], [1.0, 0.0, 0.0]);

        assert!(matches!(
            triangles_from_flat(&flat[..8]),
            Err(GeometryError::FlatBufferLength { len: 8 })
        ));

        let mut bad = flat;
        bad[4] = f64::NAN;
        assert!(matches!(
            triangles_from_flat(&bad),
            Err(GeometryError::NonFiniteVertex { triangle: 0, .. })
        ));
    }

    #[test]
    fn test_random_triangles_inside_bounds() {
        let bounds = BoundingBox::from_corners([0.0; 3], [1.0; 3]);
        let mut rng = StdRng::seed_from_u64(7);
        let tris = random_triangles(&mut rng, 50, &bounds, 0.2, 1e-3);
        assert_eq!(tris.len(), 50);
        for t in &tris {
            assert!(t.area() >= 1e-3);
            for v in &t.v {
                assert!(bounds.contains_point(*v, 0.0));
            }
        }
    }
}
