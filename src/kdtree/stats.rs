use super::{AXIS_NAMES, KdTree, Node};
use std::fmt;
use std::fmt::Write;

/// Aggregate counts describing the shape of a built tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    pub total_nodes: usize,
    pub leaf_nodes: usize,
    pub empty_leaf_nodes: usize,
    /// Number of input triangles.
    pub total_triangles: usize,
    /// Triangle references summed over all leaves. Straddling triangles are
    /// counted once per leaf, so this is at least `total_triangles`.
    pub distributed_triangles: usize,
    /// Largest leaf.
    pub max_triangles_per_node: usize,
    /// Smallest non-empty leaf, 0 when no leaf holds triangles.
    pub min_triangles_per_node: usize,
    /// Deepest level at which a split was attempted.
    pub max_depth: usize,
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes ({} leaves, {} empty), {} triangles distributed as {} references, \
             {}..{} per leaf, depth {}",
            self.total_nodes,
            self.leaf_nodes,
            self.empty_leaf_nodes,
            self.total_triangles,
            self.distributed_triangles,
            self.min_triangles_per_node,
            self.max_triangles_per_node,
            self.max_depth
        )
    }
}

impl KdTree {
    pub fn nodes_statistics(&self) -> Statistics {
        let mut result = Statistics {
            total_nodes: self.nodes.len(),
            total_triangles: self.triangles.len(),
            max_depth: self.max_build_depth,
            min_triangles_per_node: usize::MAX,
            ..Statistics::default()
        };

        for node in self.nodes.iter().filter(|n| n.is_leaf()) {
            result.leaf_nodes += 1;
            if node.is_empty() {
                result.empty_leaf_nodes += 1;
                continue;
            }
            result.max_triangles_per_node = result.max_triangles_per_node.max(node.len());
            result.min_triangles_per_node = result.min_triangles_per_node.min(node.len());
            result.distributed_triangles += node.len();
        }

        if result.min_triangles_per_node == usize::MAX {
            result.min_triangles_per_node = 0;
        }
        result
    }

    /// Human-readable dump of the tree shape, one line per node.
    pub fn structure(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.nodes.first() {
            self.write_structure(&mut out, root, "");
        }
        out
    }

    /// Writes [`KdTree::structure`] to the log at info level.
    pub fn print_structure(&self) {
        for line in self.structure().lines() {
            log::info!("{line}");
        }
    }

    fn write_structure(&self, out: &mut String, node: &Node, tag: &str) {
        match node.split_axis() {
            Some(axis) => {
                let _ = writeln!(out, "{} {}, {:.2}", tag, AXIS_NAMES[axis], node.distance);
                let child_tag = format!("{tag}--|");
                for child in node.children {
                    self.write_structure(out, &self.nodes[child as usize], &child_tag);
                }
            }
            None => {
                let _ = writeln!(out, "{} {} tris", tag, node.len());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Triangle;

    fn row(count: usize) -> Vec<Triangle> {
        (0..count)
            .map(|i| {
                let x = i as f64 * 2.0;
                Triangle::new([x, 0.0, 0.0], [x + 0.5, 1.0, 0.0], [x, 0.0, 1.0])
            })
            .collect()
    }

    #[test]
    fn test_statistics_of_empty_tree() {
        let mut tree = KdTree::new();
        tree.build(&[], 8);
        let stats = tree.nodes_statistics();
        assert_eq!(stats.total_nodes, 1);
        assert_eq!(stats.leaf_nodes, 1);
        assert_eq!(stats.empty_leaf_nodes, 1);
        assert_eq!(stats.total_triangles, 0);
        assert_eq!(stats.distributed_triangles, 0);
        assert_eq!(stats.min_triangles_per_node, 0);
        assert_eq!(stats.max_triangles_per_node, 0);
    }

    #[test]
    fn test_statistics_of_split_tree() {
        let tris = row(40);
        let mut tree = KdTree::new();
        tree.build(&tris, 6);
        let stats = tree.nodes_statistics();

        assert_eq!(stats.total_nodes, tree.nodes().len());
        assert_eq!(stats.total_triangles, 40);
        assert!(stats.distributed_triangles >= 40);
        // Binary tree: leaves = internal + 1
        assert_eq!(stats.leaf_nodes * 2 - 1, stats.total_nodes);
        assert!(stats.max_depth <= 6);
        assert!(stats.min_triangles_per_node <= stats.max_triangles_per_node);
        assert!(stats.max_triangles_per_node > 0);
    }

    #[test]
    fn test_structure_dump() {
        let mut tree = KdTree::new();
        tree.build(&row(3), 4);
        assert_eq!(tree.structure(), " 3 tris\n");

        tree.build(&row(24), 0);
        let dump = tree.structure();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(" X, "), "unexpected root line {:?}", lines[0]);
        assert!(lines[1].starts_with("--| ") && lines[1].ends_with(" tris"));
        assert!(lines[2].starts_with("--| ") && lines[2].ends_with(" tris"));
    }

    #[test]
    fn test_structure_of_unbuilt_tree_is_empty() {
        assert!(KdTree::new().structure().is_empty());
    }
}
