use super::{DEPTH_LIMIT, EPSILON, KdTree, MIN_TRIANGLES_TO_SUBDIVIDE, Node};
use crate::geometry::{BoundingBox, IntersectionData, Triangle, add, max, min, sub};

/// Parameters of a tree build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildConfig {
    /// Deepest level at which nodes may still be split. Clamped to [`DEPTH_LIMIT`].
    pub max_depth: usize,
    /// Nodes with fewer triangles stay leaves.
    pub min_triangles_to_subdivide: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_depth: 16,
            min_triangles_to_subdivide: MIN_TRIANGLES_TO_SUBDIVIDE,
        }
    }
}

impl BuildConfig {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    pub fn with_min_triangles_to_subdivide(mut self, count: usize) -> Self {
        self.min_triangles_to_subdivide = count;
        self
    }
}

/// Buffers reused by every recursive split of one build.
#[derive(Default)]
struct Scratch {
    min_points: Vec<[f64; 3]>,
    max_points: Vec<[f64; 3]>,
    left: Vec<u32>,
    right: Vec<u32>,
}

impl KdTree {
    /// Builds the tree from scratch, discarding any previous content.
    pub fn build(&mut self, triangles: &[Triangle], max_depth: usize) {
        self.build_with(triangles, BuildConfig::new(max_depth));
    }

    pub fn build_with(&mut self, triangles: &[Triangle], config: BuildConfig) {
        self.clean_up();
        debug_assert!(triangles.len() < u32::MAX as usize, "too many triangles for u32 indices");

        self.triangles = triangles.to_vec();
        self.max_depth = config.max_depth.min(DEPTH_LIMIT);
        log::debug!(
            "Building kd-tree over {} triangles, max depth {}",
            self.triangles.len(),
            self.max_depth
        );

        self.build_root_node();

        let mut scratch = Scratch::default();
        scratch.min_points.reserve(self.triangles.len());
        scratch.max_points.reserve(self.triangles.len());
        self.split_node(0, 0, config.min_triangles_to_subdivide, &mut scratch);

        log::info!("kd-tree built: {}", self.nodes_statistics());
    }

    fn build_root_node(&mut self) {
        let mut lo = [f64::MAX; 3];
        let mut hi = [-f64::MAX; 3];

        self.intersection_data.reserve(self.triangles.len());
        for t in &self.triangles {
            for v in &t.v {
                lo = min(lo, *v);
                hi = max(hi, *v);
            }
            self.intersection_data.push(IntersectionData::from(t));
        }

        let count = self.triangles.len() as u32;
        let root_box = BoundingBox::from_corners(lo, hi);
        self.indices = (0..count).collect();
        self.nodes.push(Node::leaf(0, count));
        self.bounding_boxes.push(root_box);
        self.scene_bounding_box = Some(root_box);
    }

    fn split_node(&mut self, node_index: usize, depth: usize, min_triangles: usize, scratch: &mut Scratch) {
        let node = self.nodes[node_index];
        let count = node.len();
        if depth > self.max_depth || count < min_triangles {
            return;
        }
        self.max_build_depth = self.max_build_depth.max(depth);

        let bbox = self.bounding_boxes[node_index];

        scratch.min_points.clear();
        scratch.max_points.clear();
        for &ti in &self.indices[node.start as usize..node.end as usize] {
            let t = &self.triangles[ti as usize];
            scratch.min_points.push(sub(t.min_vertex(), [EPSILON; 3]));
            scratch.max_points.push(add(t.max_vertex(), [EPSILON; 3]));
        }

        let mut split_cost = [f64::INFINITY; 3];
        let mut split_position = [0.0; 3];
        let mut split_found = false;

        for axis in 0..3 {
            scratch.min_points.sort_by(|a, b| a[axis].total_cmp(&b[axis]));
            scratch.max_points.sort_by(|a, b| a[axis].total_cmp(&b[axis]));

            for points in [&scratch.min_points, &scratch.max_points] {
                for i in 1..count.saturating_sub(1) {
                    let position = points[i][axis];
                    let cost = estimate_cost(&bbox, axis, position, i, count - i);
                    if cost < split_cost[axis] {
                        split_cost[axis] = cost;
                        split_position[axis] = position;
                        split_found = true;
                    }
                }
            }
        }

        if !split_found {
            return;
        }

        let target = split_cost[0].min(split_cost[1]).min(split_cost[2]);
        let Some(axis) = (0..3).find(|&a| split_cost[a] == target) else {
            return;
        };

        self.split_boxes(node_index, axis, split_position[axis]);
        self.distribute_triangles(node_index, scratch);

        let [left, right] = self.nodes[node_index].children;
        self.split_node(left as usize, depth + 1, min_triangles, scratch);
        self.split_node(right as usize, depth + 1, min_triangles, scratch);
    }

    /// Turns a leaf into an internal node with two empty children whose boxes
    /// are the halves of the parent box.
    fn split_boxes(&mut self, node_index: usize, axis: usize, position: f64) {
        let (left_box, right_box) = self.bounding_boxes[node_index].split(axis, position);

        let left = self.nodes.len() as u32;
        self.nodes.push(Node::leaf(0, 0));
        self.bounding_boxes.push(left_box);
        self.nodes.push(Node::leaf(0, 0));
        self.bounding_boxes.push(right_box);

        let node = &mut self.nodes[node_index];
        node.axis = axis as u8;
        node.distance = position;
        node.children = [left, left + 1];
    }

    /// Appends the children's index ranges. Triangles touching the plane go to both.
    fn distribute_triangles(&mut self, node_index: usize, scratch: &mut Scratch) {
        let node = self.nodes[node_index];
        let axis = node.axis as usize;

        scratch.left.clear();
        scratch.right.clear();
        for &ti in &self.indices[node.start as usize..node.end as usize] {
            let t = &self.triangles[ti as usize];
            if t.min_vertex()[axis] > node.distance {
                scratch.right.push(ti);
            } else if t.max_vertex()[axis] < node.distance {
                scratch.left.push(ti);
            } else {
                scratch.right.push(ti);
                scratch.left.push(ti);
            }
        }

        let [left, right] = node.children;
        for (child, list) in [(left, &scratch.left), (right, &scratch.right)] {
            let start = self.indices.len() as u32;
            self.indices.extend_from_slice(list);
            let child = &mut self.nodes[child as usize];
            child.start = start;
            child.end = start + list.len() as u32;
        }
    }
}

/// Area-weighted cost of splitting `bbox` at `plane` along `axis`, or infinity
/// when the plane lies within `EPSILON` of the box boundary.
fn estimate_cost(bbox: &BoundingBox, axis: usize, plane: f64, left_count: usize, right_count: usize) -> f64 {
    let lo = bbox.min_vertex();
    let hi = bbox.max_vertex();
    if plane <= lo[axis] + EPSILON || plane >= hi[axis] - EPSILON {
        return f64::INFINITY;
    }

    let (left, right) = bbox.split(axis, plane);
    let total = bbox.surface_area();
    let left_ratio = left.surface_area() / total;
    let right_ratio = right.surface_area() / total;
    left_ratio * left_count as f64 + right_ratio * right_count as f64
}
