use thiserror::Error;

/// Errors raised while turning external vertex data into triangles.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("flat vertex buffer has {len} values, expected a multiple of 9")]
    FlatBufferLength { len: usize },

    #[error("triangle {triangle} has a non-finite coordinate ({value})")]
    NonFiniteVertex { triangle: usize, value: f64 },
}
