use crate::geometry::{BoundingBox, IntersectionData, Triangle};

mod build;
mod stats;
mod traverse;

pub use build::BuildConfig;
pub use stats::Statistics;
pub use traverse::TraverseResult;

/// Hard ceiling for the build depth. The traversal stack holds
/// `DEPTH_LIMIT + 1` entries.
pub const DEPTH_LIMIT: usize = 128;
/// Nodes holding fewer triangles than this are never split.
pub const MIN_TRIANGLES_TO_SUBDIVIDE: usize = 12;
/// Tolerance for plane rejection, corner padding, hit distances and
/// the interval padding applied when resuming traversal.
pub const EPSILON: f64 = 1.0e-6;
/// Ray/triangle determinants with a smaller magnitude count as parallel.
pub const DETERMINANT_EPSILON: f64 = 1.0e-12;
/// Child index of leaf nodes.
pub const INVALID_INDEX: u32 = u32::MAX;
/// Split axis of leaf nodes.
pub const INVALID_AXIS: u8 = u8::MAX;

pub(crate) const AXIS_NAMES: [&str; 3] = ["X", "Y", "Z"];

/// A node of the flat k-d tree.
///
/// Internal nodes have a split `axis` in `0..3`, a split position `distance`
/// and two valid `children`. Leaves have `axis == INVALID_AXIS`, both children
/// set to `INVALID_INDEX`, and reference `indices[start..end]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    pub children: [u32; 2],
    pub start: u32,
    pub end: u32,
    pub distance: f64,
    pub axis: u8,
}

impl Node {
    fn leaf(start: u32, end: u32) -> Self {
        Node {
            children: [INVALID_INDEX, INVALID_INDEX],
            start,
            end,
            distance: 0.0,
            axis: INVALID_AXIS,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.axis == INVALID_AXIS
    }

    pub fn split_axis(&self) -> Option<usize> {
        if self.is_leaf() { None } else { Some(self.axis as usize) }
    }

    /// Number of triangle references in this node's index range.
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// A k-d tree over a static list of triangles, answering closest-hit ray queries.
///
/// The tree is built once with [`KdTree::build`] and is read-only afterwards;
/// [`KdTree::traverse`] only needs `&self` and can run from many threads at once.
#[derive(Clone, Debug, Default)]
pub struct KdTree {
    triangles: Vec<Triangle>,
    intersection_data: Vec<IntersectionData>,
    nodes: Vec<Node>,
    bounding_boxes: Vec<BoundingBox>,
    indices: Vec<u32>,
    scene_bounding_box: Option<BoundingBox>,
    max_depth: usize,
    max_build_depth: usize,
}

impl KdTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every array owned by the tree.
    pub fn clean_up(&mut self) {
        self.triangles.clear();
        self.intersection_data.clear();
        self.nodes.clear();
        self.bounding_boxes.clear();
        self.indices.clear();
        self.scene_bounding_box = None;
        self.max_depth = 0;
        self.max_build_depth = 0;
    }

    /// True when the tree holds no triangles (never built, cleaned up, or built empty).
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle(&self, index: usize) -> Option<&Triangle> {
        self.triangles.get(index)
    }

    pub fn intersection_data(&self) -> &[IntersectionData] {
        &self.intersection_data
    }

    /// Nodes in build order; the root is at index 0.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node bounding boxes, indexed like [`KdTree::nodes`].
    pub fn bounding_boxes(&self) -> &[BoundingBox] {
        &self.bounding_boxes
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Triangle indices referenced by a node.
    pub fn leaf_triangles(&self, node: usize) -> &[u32] {
        let n = &self.nodes[node];
        &self.indices[n.start as usize..n.end as usize]
    }

    /// Bounds of all triangles, `None` before the first build.
    pub fn scene_bounding_box(&self) -> Option<&BoundingBox> {
        self.scene_bounding_box.as_ref()
    }

    /// Build depth limit after clamping to [`DEPTH_LIMIT`].
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
