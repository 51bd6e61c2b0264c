use crate::geometry::triangles_from_flat;
use crate::kdtree::{KdTree, Statistics, TraverseResult};
use crate::ray::Ray;
use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(typescript_custom_section)]
const TS_CONSTANTS_KDTREE: &'static str = r#"
export const DEPTH_LIMIT = 128;
export const FLOATS_PER_TRIANGLE = 9;
"#;

// --- Hit ---

/// WASM wrapper for a successful closest-hit query.
#[wasm_bindgen(js_name = Hit3D)]
pub struct Hit3D {
    triangle_index: usize,
    inner: TraverseResult,
}

#[wasm_bindgen(js_class = Hit3D)]
impl Hit3D {
    #[wasm_bindgen(getter)]
    pub fn triangle_index(&self) -> usize { self.triangle_index }
    #[wasm_bindgen(getter)]
    pub fn distance(&self) -> f64 { self.inner.distance }
    #[wasm_bindgen(getter)]
    pub fn point(&self) -> Vec<f64> { self.inner.intersection_point.to_vec() }
    #[wasm_bindgen(getter)]
    pub fn barycentric(&self) -> Vec<f64> { self.inner.barycentric.to_vec() }
}

// --- KdTree ---

/// WASM wrapper for the k-d tree. Triangles are passed as a flat vertex buffer
/// with nine values per triangle.
#[wasm_bindgen(js_name = KdTree3D)]
pub struct KdTree3D {
    inner: KdTree,
}

#[wasm_bindgen(js_class = KdTree3D)]
impl KdTree3D {
    #[wasm_bindgen(constructor)]
    pub fn new(vertices: &[f64], max_depth: usize) -> Result<KdTree3D, JsError> {
        let mut tree = KdTree3D { inner: KdTree::new() };
        tree.rebuild(vertices, max_depth)?;
        Ok(tree)
    }

    pub fn rebuild(&mut self, vertices: &[f64], max_depth: usize) -> Result<(), JsError> {
        let triangles = triangles_from_flat(vertices)?;
        self.inner.build(&triangles, max_depth);
        Ok(())
    }

    pub fn clean_up(&mut self) { self.inner.clean_up(); }

    pub fn traverse(&self, ox: f64, oy: f64, oz: f64, dx: f64, dy: f64, dz: f64) -> Option<Hit3D> {
        let result = self.inner.traverse(&Ray::new([ox, oy, oz], [dx, dy, dz]));
        result.triangle_index.map(|triangle_index| Hit3D { triangle_index, inner: result })
    }

    #[wasm_bindgen(getter)]
    pub fn count_triangles(&self) -> usize { self.inner.triangles().len() }
    #[wasm_bindgen(getter)]
    pub fn count_nodes(&self) -> usize { self.inner.nodes().len() }

    /// Scene bounds as `[min_x, min_y, min_z, max_x, max_y, max_z]`, empty before a build.
    #[wasm_bindgen(getter)]
    pub fn bounds(&self) -> Vec<f64> {
        match self.inner.scene_bounding_box() {
            Some(b) => b.min_vertex().into_iter().chain(b.max_vertex()).collect(),
            None => Vec::new(),
        }
    }

    /// Tree statistics as a plain object with camelCase keys.
    pub fn statistics(&self) -> Result<Object, JsValue> {
        statistics_to_object(&self.inner.nodes_statistics())
    }

    pub fn structure(&self) -> String { self.inner.structure() }
}

fn statistics_to_object(stats: &Statistics) -> Result<Object, JsValue> {
    let obj = Object::new();
    let fields = [
        ("totalNodes", stats.total_nodes),
        ("leafNodes", stats.leaf_nodes),
        ("emptyLeafNodes", stats.empty_leaf_nodes),
        ("totalTriangles", stats.total_triangles),
        ("distributedTriangles", stats.distributed_triangles),
        ("maxTrianglesPerNode", stats.max_triangles_per_node),
        ("minTrianglesPerNode", stats.min_triangles_per_node),
        ("maxDepth", stats.max_depth),
    ];
    for (key, value) in fields {
        Reflect::set(&obj, &key.into(), &JsValue::from_f64(value as f64))?;
    }
    Ok(obj)
}
